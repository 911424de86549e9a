//! [`Rent`] read model definition.
//!
//! [`Rent`]: crate::domain::Rent

#[cfg(doc)]
use crate::domain::{Rent, Tenant};
use crate::domain::{owner, rent, tenant};

/// Billing period [`Rent`]s are issued for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Period {
    /// [`rent::Month`] of the period.
    pub month: rent::Month,

    /// [`rent::Year`] of the period.
    pub year: rent::Year,
}

/// Selector of a single [`Tenant`]'s [`Rent`] issued for a billing
/// [`Period`].
#[derive(Clone, Copy, Debug)]
pub struct TenantPeriod {
    /// ID of the [`Tenant`].
    pub tenant_id: tenant::Id,

    /// Billing [`Period`] the [`Rent`] is issued for.
    pub period: Period,
}

/// Selector of [`Rent`]s having received no payment yet ([`Pending`] or
/// [`Overdue`]).
///
/// [`Overdue`]: rent::Status::Overdue
/// [`Pending`]: rent::Status::Pending
#[derive(Clone, Copy, Debug, Default)]
pub struct Unpaid {
    /// Optional [`owner`] to narrow the selection to.
    pub owner: Option<owner::Id>,
}

pub mod list {
    //! [`Rent`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    #[cfg(doc)]
    use crate::domain::Rent;
    use crate::domain::{owner, rent, tenant};

    use super::Period;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = rent::Id;

    /// Cursor pointing to a specific [`Rent`] in a list.
    pub type Cursor = rent::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the [`owner`] whose [`Rent`]s are listed.
        pub owner: owner::Id,

        /// Optional [`tenant`] to narrow the selection to.
        pub tenant: Option<tenant::Id>,

        /// Optional billing [`Period`] to narrow the selection to.
        pub period: Option<Period>,

        /// Optional [`rent::Status`] to narrow the selection to.
        pub status: Option<rent::Status>,
    }

    /// Total count of an owner's [`Rent`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
