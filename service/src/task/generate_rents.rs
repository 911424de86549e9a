//! [`GenerateRents`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::{
    operations::{By, Perform, Start},
    DateTime,
};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{command, infra::database, Command, Service};

#[cfg(doc)]
use crate::domain::Rent;

use super::Task;

/// Configuration for [`GenerateRents`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between [`Rent`] issuing runs.
    pub interval: time::Duration,
}

/// [`Task`] for periodically issuing the current billing period's
/// [`Rent`]s.
#[derive(Clone, Copy, Debug)]
pub struct GenerateRents<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Nt> Task<Start<By<GenerateRents<Self>, Config>>> for Service<Db, Nt>
where
    GenerateRents<Service<Db, Nt>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<GenerateRents<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = GenerateRents {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::GenerateRents` failed: {e}");
            });
        }
    }
}

impl<Db, Nt> Task<Perform<()>> for GenerateRents<Service<Db, Nt>>
where
    Service<Db, Nt>: Command<
        command::GenerateRents,
        Ok = command::generate_rents::Output,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let today = DateTime::now().date();
        let output = self
            .service
            .execute(command::GenerateRents { today })
            .await
            .map_err(tracerr::wrap!())?;
        for (tenant_id, e) in output.errors {
            log::error!(
                "failed to issue a `Rent` of `Tenant(id: {tenant_id})`: {e}",
            );
        }
        Ok(())
    }
}

/// Error of [`GenerateRents`] execution.
pub type ExecutionError = Traced<database::Error>;
