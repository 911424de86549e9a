//! Read entities definitions.

pub mod rent;
pub mod tenant;
