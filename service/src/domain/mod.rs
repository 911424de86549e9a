//! Domain definitions.

pub mod notification;
pub mod owner;
pub mod rent;
pub mod tenant;

pub use self::{rent::Rent, tenant::Tenant};
