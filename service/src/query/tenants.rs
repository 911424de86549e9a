//! [`Query`] collection related to the multiple [`Tenant`]s.

use common::operations::By;

#[cfg(doc)]
use crate::domain::Tenant;
use crate::{domain::owner, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a list of [`Tenant`]s.
pub type List =
    DatabaseQuery<By<read::tenant::list::Page, read::tenant::list::Selector>>;

/// Queries total count of an [`owner`]'s [`Tenant`]s.
pub type TotalCount =
    DatabaseQuery<By<read::tenant::list::TotalCount, owner::Id>>;
