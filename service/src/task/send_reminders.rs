//! [`SendReminders`] [`Task`].

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
use crate::domain::Tenant;

use super::Task;

/// Configuration for [`SendReminders`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between reminder delivery runs.
    pub interval: time::Duration,
}

/// [`Task`] for periodically reminding [`Tenant`]s of expiring agreements
/// and upcoming electricity meter readings.
#[derive(Clone, Copy, Debug)]
pub struct SendReminders<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Nt> Task<Start<By<SendReminders<Self>, Config>>> for Service<Db, Nt>
where
    SendReminders<Service<Db, Nt>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<SendReminders<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = SendReminders {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::SendReminders` failed: {e}");
            });
        }
    }
}

impl<Db, Nt> Task<Perform<()>> for SendReminders<Service<Db, Nt>>
where
    Service<Db, Nt>: Command<
        command::SendReminders,
        Ok = command::send_reminders::Output,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let today = DateTime::now().date();
        let output = self
            .service
            .execute(command::SendReminders { today })
            .await
            .map_err(tracerr::wrap!())?;
        for (tenant_id, e) in output.errors {
            log::error!("failed to remind `Tenant(id: {tenant_id})`: {e}");
        }
        Ok(())
    }
}

/// Error of [`SendReminders`] execution.
pub type ExecutionError = Traced<database::Error>;
