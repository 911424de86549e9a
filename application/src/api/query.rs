//! GraphQL [`Query`]s definitions.

use common::DateTime;
use itertools::Itertools as _;
use juniper::graphql_object;
use service::{command, domain, query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Tenant` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `TENANT_NOT_EXISTS` - the `Tenant` with the specified ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "tenant",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn tenant(
        id: api::tenant::Id,
        ctx: &Context,
    ) -> Result<api::tenant::list::Edge, Error> {
        Self::tenants(None, Some(id.into()), None, Some(id.into()), None, ctx)
            .await?
            .edges()
            .into_iter()
            .filter(|e| e.cursor().0 == id.into())
            .exactly_one()
            .map_err(|_| TenantError::NotExists.into())
            .map_err(ctx.error())
    }

    /// Fetches the page of the authenticated owner's `Tenant`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PAGINATION_AMBIGUOUS` - the pagination arguments are ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "tenants",
            last = ?last,
            name = ?name.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn tenants(
        first: Option<i32>,
        after: Option<api::tenant::list::Cursor>,
        last: Option<i32>,
        before: Option<api::tenant::list::Cursor>,
        name: Option<api::tenant::Name>,
        ctx: &Context,
    ) -> Result<api::tenant::list::Connection, Error> {
        const DEFAULT_PAGE_SIZE: i32 = 10;

        let arguments = read::tenant::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;

        let my_id = ctx.current_session().await?.owner_id;

        ctx.service()
            .execute(query::tenants::List::by(read::tenant::list::Selector {
                arguments,
                filter: read::tenant::list::Filter {
                    owner: my_id,
                    name: name.map(Into::into),
                },
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Rent` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RENT_NOT_EXISTS` - the `Rent` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "rent",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn rent(
        id: api::rent::Id,
        ctx: &Context,
    ) -> Result<api::rent::list::Edge, Error> {
        Self::rents(
            None,
            Some(id.into()),
            None,
            Some(id.into()),
            None,
            None,
            None,
            None,
            ctx,
        )
        .await?
        .edges()
        .into_iter()
        .filter(|e| e.cursor().0 == id.into())
        .exactly_one()
        .map_err(|_| RentError::NotExists.into())
        .map_err(ctx.error())
    }

    /// Fetches the page of the authenticated owner's `Rent`s.
    ///
    /// Overdue statuses are refreshed before the page is read, so the
    /// returned records never contain a `PENDING` `Rent` whose grace period
    /// is over.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PAGINATION_AMBIGUOUS` - the pagination arguments are ambiguous;
    /// - `INVALID_BILLING_PERIOD` - the specified `month`/`year` pair does
    ///                              not form a valid billing period.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "rents",
            last = ?last,
            month = ?month,
            otel.name = Self::SPAN_NAME,
            status = ?status,
            tenant = ?tenant,
            year = ?year,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn rents(
        first: Option<i32>,
        after: Option<api::rent::list::Cursor>,
        last: Option<i32>,
        before: Option<api::rent::list::Cursor>,
        tenant: Option<api::tenant::Id>,
        month: Option<i32>,
        year: Option<i32>,
        status: Option<api::rent::Status>,
        ctx: &Context,
    ) -> Result<api::rent::list::Connection, Error> {
        const DEFAULT_PAGE_SIZE: i32 = 10;

        let arguments = read::rent::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;

        let period = match (month, year) {
            (Some(month), Some(year)) => Some(read::rent::Period {
                month: u8::try_from(month)
                    .ok()
                    .and_then(domain::rent::Month::new)
                    .ok_or_else(|| PeriodError::Invalid.into())
                    .map_err(ctx.error())?,
                year: year
                    .try_into()
                    .map_err(|_| PeriodError::Invalid.into())
                    .map_err(ctx.error())?,
            }),
            (None, None) => None,
            (Some(_), None) | (None, Some(_)) => {
                return Err(PeriodError::Invalid.into());
            }
        };

        let my_id = ctx.current_session().await?.owner_id;

        _ = ctx
            .service()
            .execute(command::SweepRentStatuses {
                owner: Some(my_id),
                today: DateTime::now().date(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::rents::List::by(read::rent::list::Selector {
                arguments,
                filter: read::rent::list::Filter {
                    owner: my_id,
                    tenant: tenant.map(Into::into),
                    period,
                    status: status.map(Into::into),
                },
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum PeriodError {
        #[code = "INVALID_BILLING_PERIOD"]
        #[status = BAD_REQUEST]
        #[message = "Billing period requires a valid `month` (1..=12) and \
                     `year` specified together"]
        Invalid,
    }
}

define_error! {
    enum RentError {
        #[code = "RENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Rent` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum TenantError {
        #[code = "TENANT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Tenant` with the specified ID does not exist"]
        NotExists,
    }
}
