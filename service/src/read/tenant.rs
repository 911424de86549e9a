//! [`Tenant`] read model definition.
//!
//! [`Tenant`]: crate::domain::Tenant

pub mod list {
    //! [`Tenant`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    #[cfg(doc)]
    use crate::domain::Tenant;
    use crate::domain::{owner, tenant};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = tenant::Id;

    /// Cursor pointing to a specific [`Tenant`] in a list.
    pub type Cursor = tenant::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug)]
    pub struct Filter {
        /// ID of the [`owner`] whose [`Tenant`]s are listed.
        pub owner: owner::Id,

        /// [`tenant::Name`] (or its part) to fuzzy search for.
        pub name: Option<tenant::Name>,
    }

    /// Total count of an owner's [`Tenant`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
