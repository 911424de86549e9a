//! In-memory [`Notifier`] implementation for tests.

use std::sync::{Arc, Mutex};

use common::operations::Notify;
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{notification::Email, tenant},
    infra::notification,
};
#[cfg(doc)]
use crate::infra::Notifier;

/// [`Notifier`] recording sent [`Email`]s instead of delivering them.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    /// [`Email`]s sent via this [`Recorder`].
    sent: Arc<Mutex<Vec<Email>>>,

    /// Addresses any delivery to which fails.
    failing: Arc<Mutex<Vec<tenant::Email>>>,
}

impl Recorder {
    /// Returns a snapshot of all the [`Email`]s sent via this [`Recorder`].
    #[must_use]
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }

    /// Marks the provided `address` as undeliverable.
    pub fn fail_for(&self, address: tenant::Email) {
        self.failing.lock().unwrap().push(address);
    }
}

impl notification::Notifier<Notify<Email>> for Recorder {
    type Ok = ();
    type Err = Traced<notification::Error>;

    async fn execute(
        &self,
        Notify(email): Notify<Email>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.failing.lock().unwrap().contains(&email.to) {
            return Err(tracerr::new!(notification::Error::Recorder(Error)));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// [`Recorder`] [`Error`] of a refused delivery.
#[derive(Clone, Copy, Debug, Display, StdError)]
#[display("delivery refused")]
pub struct Error;
