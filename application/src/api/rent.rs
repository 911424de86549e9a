//! [`Rent`]-related definitions.

use common::{DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::{domain, query, Query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A monthly [`Rent`] record issued to a `Tenant`.
#[derive(Clone, Debug, From)]
pub struct Rent {
    /// ID of this [`Rent`].
    pub id: Id,

    /// [`domain::Rent`] representing this [`Rent`].
    rent: OnceCell<domain::Rent>,
}

impl From<domain::Rent> for Rent {
    fn from(rent: domain::Rent) -> Self {
        Self {
            id: rent.id.into(),
            rent: OnceCell::new_with(Some(rent)),
        }
    }
}

impl Rent {
    /// Creates a new [`Rent`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Rent`] with the provided ID exists and
    /// belongs to the authenticated owner, otherwise accessing this [`Rent`]
    /// will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            rent: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Rent`] representing this [`Rent`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Rent`] doesn't exist or belongs to another
    /// owner.
    async fn rent(&self, ctx: &Context) -> Result<&domain::Rent, Error> {
        let id = self.id.into();
        self.rent
            .get_or_try_init(|| async {
                let my_id = ctx.current_session().await?.owner_id;
                ctx.service()
                    .execute(query::rent::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .await?
                    .filter(|r| r.owner_id == my_id)
                    .ok_or_else(|| api::query::RentError::NotExists.into())
            })
            .await
    }
}

/// A monthly `Rent` record issued to a `Tenant`.
#[graphql_object(context = Context)]
impl Rent {
    /// Unique identifier of this `Rent`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `Tenant` this `Rent` is issued to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.tenant",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn tenant(&self, ctx: &Context) -> Result<api::Tenant, Error> {
        let tenant_id = self.rent(ctx).await?.tenant_id;
        #[expect(
            unsafe_code,
            reason = "`Rent` loaded from repository guarantees `Tenant` \
                      existence"
        )]
        let tenant = unsafe { api::Tenant::new_unchecked(tenant_id) };
        Ok(tenant)
    }

    /// Month of the billing period this `Rent` is issued for, `1..=12`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.month",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn month(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.rent(ctx).await?.month.u8().into())
    }

    /// Year of the billing period this `Rent` is issued for.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.year",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn year(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.rent(ctx).await?.year.into())
    }

    /// Total amount payable for this `Rent`, including carried over dues and
    /// electricity charges.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.amount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn amount(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.rent(ctx).await?.amount)
    }

    /// Unpaid dues carried over from the previous billing periods.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.previousDue",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn previous_due(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.rent(ctx).await?.previous_due)
    }

    /// Amount paid towards this `Rent` so far.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.paidAmount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn paid_amount(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.rent(ctx).await?.paid_amount)
    }

    /// Amount carried over to the next billing period.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.dueNextMonth",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn due_next_month(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.rent(ctx).await?.due_next_month)
    }

    /// `DateTime` this `Rent` is due at.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.dueDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn due_date(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.rent(ctx).await?.due_date.coerce())
    }

    /// Payment status of this `Rent`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.rent(ctx).await?.status.into())
    }

    /// Electricity charges of this `Rent`, if metered billing is enabled for
    /// the `Tenant`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.electricity",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn electricity(
        &self,
        ctx: &Context,
    ) -> Result<Option<Electricity>, Error> {
        Ok(self.rent(ctx).await?.electricity.map(Into::into))
    }

    /// `DateTime` when this `Rent` was fully paid, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.paidAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn paid_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.rent(ctx).await?.paid_at.map(|at| at.coerce()))
    }

    /// Method the final payment of this `Rent` was made with, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.paymentMethod",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn payment_method(
        &self,
        ctx: &Context,
    ) -> Result<Option<PaymentMethod>, Error> {
        Ok(self.rent(ctx).await?.payment_method.map(Into::into))
    }

    /// `DateTime` when this `Rent` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rent.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.rent(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Rent`.
#[derive(Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[from(domain::rent::Id)]
#[into(domain::rent::Id)]
#[graphql(name = "RentId", transparent)]
pub struct Id(Uuid);

/// Non-negative number of consumed electricity units.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "RentUnits",
    with = scalar::Via::<domain::rent::Units>,
)]
pub struct Units(domain::rent::Units);

/// Payment status of a `Rent`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "RentStatus")]
pub enum Status {
    /// No payment received yet, due date not passed.
    Pending,

    /// Partially paid.
    Partial,

    /// No full payment received and the due date (plus the grace period) has
    /// passed.
    Overdue,

    /// Fully paid.
    Paid,
}

impl From<domain::rent::Status> for Status {
    fn from(status: domain::rent::Status) -> Self {
        use domain::rent::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Partial => Self::Partial,
            S::Overdue => Self::Overdue,
            S::Paid => Self::Paid,
        }
    }
}

impl From<Status> for domain::rent::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => Self::Pending,
            Status::Partial => Self::Partial,
            Status::Overdue => Self::Overdue,
            Status::Paid => Self::Paid,
        }
    }
}

/// Method a `Rent` payment is made with.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "RentPaymentMethod")]
pub enum PaymentMethod {
    /// Cash payment.
    Cash,

    /// UPI transfer.
    Upi,

    /// Bank transfer.
    BankTransfer,

    /// Card payment.
    Card,

    /// Any other method.
    Other,
}

impl From<domain::rent::PaymentMethod> for PaymentMethod {
    fn from(method: domain::rent::PaymentMethod) -> Self {
        use domain::rent::PaymentMethod as M;
        match method {
            M::Cash => Self::Cash,
            M::Upi => Self::Upi,
            M::BankTransfer => Self::BankTransfer,
            M::Card => Self::Card,
            M::Other => Self::Other,
        }
    }
}

impl From<PaymentMethod> for domain::rent::PaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Upi => Self::Upi,
            PaymentMethod::BankTransfer => Self::BankTransfer,
            PaymentMethod::Card => Self::Card,
            PaymentMethod::Other => Self::Other,
        }
    }
}

/// Billing period the first `Rent` of a `Tenant` is issued for.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "RentTarget")]
pub enum Target {
    /// Billing period containing the agreement start.
    CurrentMonth,

    /// Billing period following the agreement start.
    NextMonth,
}

impl From<Target> for domain::rent::Target {
    fn from(target: Target) -> Self {
        match target {
            Target::CurrentMonth => Self::CurrentMonth,
            Target::NextMonth => Self::NextMonth,
        }
    }
}

/// Electricity charges of a `Rent`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "RentElectricity", context = Context)]
pub struct Electricity {
    /// Cost of a single consumed electricity unit.
    pub unit_cost: Money,

    /// Consumed electricity units, once the meter reading is recorded.
    pub units_consumed: Option<Units>,

    /// Total electricity charge of the billing period.
    pub amount: Money,

    /// Indicator whether the charge is already calculated from a meter
    /// reading.
    pub calculated: bool,
}

impl From<domain::rent::Electricity> for Electricity {
    fn from(electricity: domain::rent::Electricity) -> Self {
        Self {
            unit_cost: electricity.unit_cost,
            units_consumed: electricity.units_consumed.map(Into::into),
            amount: electricity.amount,
            calculated: electricity.calculated,
        }
    }
}

pub mod list {
    //! Definitions related to [`Rent`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::{query, read, Query as _};

    use crate::{api::scalar, AsError, Context, Error};

    use super::{Id, Rent};

    /// Cursor for the `Rent` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::rent::list::Cursor)]
    #[graphql(
        name = "RentListCursor",
        with = scalar::Via::<read::rent::list::Cursor>,
    )]
    pub struct Cursor(pub read::rent::list::Cursor);

    /// Edge in the [`Rent`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::rent::list::Edge);

    /// Edge in the `Rent` list.
    #[graphql_object(name = "RentListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `RentListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `RentListEdge`.
        #[must_use]
        pub fn node(&self) -> Rent {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees `Rent` \
                          existence"
            )]
            unsafe {
                Rent::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`Rent`] list.
    #[derive(Clone, Debug, From, Into)]
    pub struct Connection(read::rent::list::Connection);

    /// Connection of the `Rent` list.
    #[graphql_object(name = "RentListConnection", context = Context)]
    impl Connection {
        /// Edges in this `RentListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.0.edges.iter().copied().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.0.page_info(),
                start_cursor: self.0.edges.first().map(|e| e.cursor.into()),
                end_cursor: self.0.edges.last().map(|e| e.cursor.into()),
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::rent::list::PageInfo`].
        info: read::rent::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,

        /// End cursor of the page.
        end_cursor: Option<Cursor>,
    }

    /// Information about a `RentListConnection` page.
    #[graphql_object(name = "RentListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> &Option<Cursor> {
            &self.start_cursor
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> &Option<Cursor> {
            &self.end_cursor
        }

        /// Total count of the authenticated owner's `Rent`s.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            let my_id = ctx.current_session().await?.owner_id;

            ctx.service()
                .execute(query::rents::TotalCount::by(my_id))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }
}
