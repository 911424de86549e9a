//! [`Query`] collection related to a single [`Rent`].

use common::operations::By;

use crate::domain::{rent, Rent};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Rent`] by its [`rent::Id`].
pub type ById = DatabaseQuery<By<Option<Rent>, rent::Id>>;
