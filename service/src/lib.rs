//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
#[cfg(test)]
pub(crate) mod fixture;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use common::operations::{By, Start};
use derive_more::{Debug, Display, Error};

#[cfg(doc)]
use infra::{Database, Notifier};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] decoding key verifying owner session tokens.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [`task::GenerateRents`] configuration.
    pub generate_rents: task::generate_rents::Config,

    /// [`task::SendReminders`] configuration.
    pub send_reminders: task::send_reminders::Config,

    /// [`task::SweepRentStatuses`] configuration.
    pub sweep_rent_statuses: task::sweep_rent_statuses::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Nt> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Notifier`] of this [`Service`].
    notifier: Nt,
}

impl<Db, Nt> Service<Db, Nt> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        notifier: Nt,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<task::GenerateRents<Self>, task::generate_rents::Config>,
                >,
                Ok = (),
                Err: Error,
            > + Task<
                Start<
                    By<task::SendReminders<Self>, task::send_reminders::Config>,
                >,
                Ok = (),
                Err: Error,
            > + Task<
                Start<
                    By<
                        task::SweepRentStatuses<Self>,
                        task::sweep_rent_statuses::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            notifier,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().generate_rents))).await
        });
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().send_reminders))).await
        });
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().sweep_rent_statuses)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Notifier`] of this [`Service`].
    #[must_use]
    pub fn notifier(&self) -> &Nt {
        &self.notifier
    }
}

#[cfg(test)]
impl Service<infra::database::Memory, infra::notification::Recorder> {
    /// Secret the test session tokens are signed with.
    const JWT_SECRET: &'static [u8] = b"super secret";

    /// Creates a new in-memory [`Service`].
    pub(crate) fn in_memory() -> Self {
        use std::time::Duration;

        Self {
            config: Config {
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    Self::JWT_SECRET,
                ),
                generate_rents: task::generate_rents::Config {
                    interval: Duration::from_secs(60 * 60),
                },
                send_reminders: task::send_reminders::Config {
                    interval: Duration::from_secs(60 * 60),
                },
                sweep_rent_statuses: task::sweep_rent_statuses::Config {
                    interval: Duration::from_secs(60 * 60),
                },
            },
            database: infra::database::Memory::default(),
            notifier: infra::notification::Recorder::default(),
        }
    }

    /// Issues a signed session token of the provided owner, expiring at the
    /// given moment.
    pub(crate) fn issue_token(
        &self,
        owner_id: domain::owner::Id,
        expires_at: domain::owner::session::ExpirationDateTime,
    ) -> domain::owner::session::Token {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &domain::owner::Session {
                owner_id,
                expires_at,
            },
            &jsonwebtoken::EncodingKey::from_secret(Self::JWT_SECRET),
        )
        .unwrap()
        .parse()
        .unwrap()
    }
}

/// Shortcut for the error of starting a [`Task`].
type TaskStartError<Svc, T, Args> = <Svc as Task<Start<By<T, Args>>>>::Err;

/// Error of starting a [`Service`].
#[derive(Debug, Display, Error)]
pub enum StartupError<Svc>
where
    Svc: Task<
            Start<By<task::GenerateRents<Svc>, task::generate_rents::Config>>,
        > + Task<
            Start<By<task::SendReminders<Svc>, task::send_reminders::Config>>,
        > + Task<
            Start<
                By<
                    task::SweepRentStatuses<Svc>,
                    task::sweep_rent_statuses::Config,
                >,
            >,
        >,
{
    /// [`task::GenerateRents`] failed to start.
    GenerateRentsTask(
        TaskStartError<
            Svc,
            task::GenerateRents<Svc>,
            task::generate_rents::Config,
        >,
    ),

    /// [`task::SendReminders`] failed to start.
    SendRemindersTask(
        TaskStartError<
            Svc,
            task::SendReminders<Svc>,
            task::send_reminders::Config,
        >,
    ),

    /// [`task::SweepRentStatuses`] failed to start.
    SweepRentStatusesTask(
        TaskStartError<
            Svc,
            task::SweepRentStatuses<Svc>,
            task::sweep_rent_statuses::Config,
        >,
    ),
}
