//! Outbound notification definitions.

use crate::domain::tenant;

/// Email notification to be delivered to a tenant's address.
#[derive(Clone, Debug)]
pub struct Email {
    /// Address this [`Email`] is sent to.
    pub to: tenant::Email,

    /// Subject line of this [`Email`].
    pub subject: String,

    /// Plain text body of this [`Email`].
    pub body: String,
}
