//! [`SweepRentStatuses`] [`Task`].

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
use crate::domain::{rent::Status, Rent};

use super::Task;

/// Configuration for [`SweepRentStatuses`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between [`Rent`] [`Status`] sweeps.
    pub interval: time::Duration,
}

/// [`Task`] for periodically reconciling [`Rent`] [`Status`]es with their
/// grace deadlines.
#[derive(Clone, Copy, Debug)]
pub struct SweepRentStatuses<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Nt> Task<Start<By<SweepRentStatuses<Self>, Config>>>
    for Service<Db, Nt>
where
    SweepRentStatuses<Service<Db, Nt>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<SweepRentStatuses<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = SweepRentStatuses {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::SweepRentStatuses` failed: {e}");
            });
        }
    }
}

impl<Db, Nt> Task<Perform<()>> for SweepRentStatuses<Service<Db, Nt>>
where
    Service<Db, Nt>: Command<
        command::SweepRentStatuses,
        Ok = u32,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let today = DateTime::now().date();
        self.service
            .execute(command::SweepRentStatuses { owner: None, today })
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

/// Error of [`SweepRentStatuses`] execution.
pub type ExecutionError = Traced<database::Error>;
