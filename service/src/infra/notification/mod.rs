//! [`Notifier`]-related implementations.

#[cfg(test)]
pub mod recorder;
#[cfg(feature = "smtp")]
pub mod smtp;

use derive_more::{Display, Error as StdError, From};

#[cfg(test)]
pub use self::recorder::Recorder;
#[cfg(feature = "smtp")]
pub use self::smtp::Smtp;

/// Notification delivery operation.
pub use common::Handler as Notifier;

/// [`Notifier`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(test)]
    /// [`Recorder`] error.
    Recorder(recorder::Error),

    #[cfg(feature = "smtp")]
    /// [`Smtp`] error.
    Smtp(smtp::Error),
}
