//! [`Query`] collection related to the multiple [`Rent`]s.

use common::operations::By;

#[cfg(doc)]
use crate::domain::Rent;
use crate::{domain::owner, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a list of [`Rent`]s.
pub type List =
    DatabaseQuery<By<read::rent::list::Page, read::rent::list::Selector>>;

/// Queries total count of an [`owner`]'s [`Rent`]s.
pub type TotalCount =
    DatabaseQuery<By<read::rent::list::TotalCount, owner::Id>>;
