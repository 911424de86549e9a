//! GraphQL API definitions.

mod mutation;
mod query;
pub mod rent;
pub mod scalar;
mod subscription;
pub mod tenant;

use crate::define_error;

pub use self::{
    mutation::Mutation, query::Query, rent::Rent, subscription::Subscription,
    tenant::Tenant,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum PaginationError {
        #[code = "AMBIGUOUS_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "Ambiguous pagination arguments"]
        Ambiguous,
    }
}
