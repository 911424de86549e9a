//! [`Tenant`]-related definitions.

use std::num::TryFromIntError;

use common::{DateTime, Money, Percent};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLObject,
    GraphQLScalar,
};
use service::{domain, query, Query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A [`Tenant`] renting from an owner.
#[derive(Clone, Debug, From)]
pub struct Tenant {
    /// ID of this [`Tenant`].
    pub id: Id,

    /// [`domain::Tenant`] representing this [`Tenant`].
    tenant: OnceCell<domain::Tenant>,
}

impl From<domain::Tenant> for Tenant {
    fn from(tenant: domain::Tenant) -> Self {
        Self {
            id: tenant.id.into(),
            tenant: OnceCell::new_with(Some(tenant)),
        }
    }
}

impl Tenant {
    /// Creates a new [`Tenant`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Tenant`] with the provided ID exists and
    /// belongs to the authenticated owner, otherwise accessing this
    /// [`Tenant`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            tenant: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Tenant`] representing this [`Tenant`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Tenant`] doesn't exist or belongs to another
    /// owner.
    async fn tenant(&self, ctx: &Context) -> Result<&domain::Tenant, Error> {
        let id = self.id.into();
        self.tenant
            .get_or_try_init(|| async {
                let my_id = ctx.current_session().await?.owner_id;
                ctx.service()
                    .execute(query::tenant::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .await?
                    .filter(|t| t.owner_id == my_id)
                    .ok_or_else(|| api::query::TenantError::NotExists.into())
            })
            .await
    }
}

/// A `Tenant` renting from the authenticated owner.
#[graphql_object(context = Context)]
impl Tenant {
    /// Unique identifier of this `Tenant`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `Tenant`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.tenant(ctx).await?.name.clone().into())
    }

    /// Email address of this `Tenant`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn email(&self, ctx: &Context) -> Result<Option<Email>, Error> {
        Ok(self.tenant(ctx).await?.email.clone().map(Into::into))
    }

    /// Phone number of this `Tenant`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.phone",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn phone(&self, ctx: &Context) -> Result<Phone, Error> {
        Ok(self.tenant(ctx).await?.phone.clone().into())
    }

    /// WhatsApp number of this `Tenant`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.whatsapp",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn whatsapp(&self, ctx: &Context) -> Result<Phone, Error> {
        Ok(self.tenant(ctx).await?.whatsapp.clone().into())
    }

    /// Physical address of this `Tenant`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.address",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn address(
        &self,
        ctx: &Context,
    ) -> Result<Option<Address>, Error> {
        Ok(self.tenant(ctx).await?.address.clone().map(Into::into))
    }

    /// Photo of this `Tenant`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.photo",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn photo(&self, ctx: &Context) -> Result<Option<Media>, Error> {
        Ok(self.tenant(ctx).await?.photo.clone().map(Into::into))
    }

    /// Scanned rental agreement document of this `Tenant`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.agreementFile",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn agreement_file(
        &self,
        ctx: &Context,
    ) -> Result<Option<Media>, Error> {
        Ok(self.tenant(ctx).await?.agreement_file.clone().map(Into::into))
    }

    /// Billing terms of this `Tenant`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.billing",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn billing(&self, ctx: &Context) -> Result<Billing, Error> {
        Ok(self.tenant(ctx).await?.billing.into())
    }

    /// Periodic rent increase terms of this `Tenant`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.increase",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn increase(
        &self,
        ctx: &Context,
    ) -> Result<Option<Increase>, Error> {
        Ok(self.tenant(ctx).await?.increase.map(Into::into))
    }

    /// Electricity billing terms of this `Tenant`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.electricity",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn electricity(
        &self,
        ctx: &Context,
    ) -> Result<Option<Electricity>, Error> {
        Ok(self.tenant(ctx).await?.electricity.map(Into::into))
    }

    /// Rental agreement of this `Tenant`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.agreement",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn agreement(&self, ctx: &Context) -> Result<Agreement, Error> {
        Ok(self.tenant(ctx).await?.agreement.into())
    }

    /// Indicator whether the owner is notified before this `Tenant`'s
    /// agreement expires.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.notifyBeforeAgreementEnd",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn notify_before_agreement_end(
        &self,
        ctx: &Context,
    ) -> Result<bool, Error> {
        Ok(self.tenant(ctx).await?.notify_before_agreement_end)
    }

    /// `DateTime` when this `Tenant` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Tenant.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.tenant(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Tenant`.
#[derive(Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[from(domain::tenant::Id)]
#[into(domain::tenant::Id)]
#[graphql(name = "TenantId", transparent)]
pub struct Id(Uuid);

/// Name of a `Tenant`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "TenantName",
    with = scalar::Via::<domain::tenant::Name>,
)]
pub struct Name(domain::tenant::Name);

/// Email address of a `Tenant`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "TenantEmail",
    with = scalar::Via::<domain::tenant::Email>,
)]
pub struct Email(domain::tenant::Email);

/// Phone number of a `Tenant`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "TenantPhone",
    with = scalar::Via::<domain::tenant::Phone>,
)]
pub struct Phone(domain::tenant::Phone);

/// Physical address of a `Tenant`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "TenantAddress",
    with = scalar::Via::<domain::tenant::Address>,
)]
pub struct Address(domain::tenant::Address);

/// Day of month (`1..=28`) a `Tenant`'s rent is billed on.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "TenantBillingDay",
    with = scalar::Via::<domain::tenant::BillingDay>,
)]
pub struct BillingDay(domain::tenant::BillingDay);

/// Number of `TenantIncreaseCycle`s after which a rent increase applies.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "TenantIncreaseAfter",
    with = scalar::Via::<domain::tenant::EffectiveAfter>,
)]
pub struct EffectiveAfter(domain::tenant::EffectiveAfter);

/// Granularity a `TenantIncrease` is counted in.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "TenantIncreaseCycle")]
pub enum Cycle {
    /// Increase applies after a number of months.
    Monthly,

    /// Increase applies after a number of years.
    Yearly,
}

impl From<domain::tenant::Cycle> for Cycle {
    fn from(cycle: domain::tenant::Cycle) -> Self {
        use domain::tenant::Cycle as C;
        match cycle {
            C::Monthly => Self::Monthly,
            C::Yearly => Self::Yearly,
        }
    }
}

impl From<Cycle> for domain::tenant::Cycle {
    fn from(cycle: Cycle) -> Self {
        match cycle {
            Cycle::Monthly => Self::Monthly,
            Cycle::Yearly => Self::Yearly,
        }
    }
}

/// File stored in an external media storage.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "TenantMedia", context = Context)]
pub struct Media {
    /// URL the file is served at.
    pub url: String,

    /// Identifier of the file in the media storage.
    pub public_id: String,
}

impl From<domain::tenant::Media> for Media {
    fn from(media: domain::tenant::Media) -> Self {
        Self {
            url: media.url.into(),
            public_id: media.public_id.into(),
        }
    }
}

/// Billing terms of a `Tenant`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "TenantBilling", context = Context)]
pub struct Billing {
    /// Monthly rent amount.
    pub monthly_rent: Money,

    /// Advance deposit held by the owner.
    pub advance: Money,

    /// Day of month the rent is billed on.
    pub day: BillingDay,

    /// Days after the due date before a `Rent` becomes overdue.
    pub grace_period_days: i32,
}

impl From<domain::tenant::Billing> for Billing {
    fn from(billing: domain::tenant::Billing) -> Self {
        Self {
            monthly_rent: billing.monthly_rent,
            advance: billing.advance,
            day: billing.day.into(),
            grace_period_days: billing.grace_period.into(),
        }
    }
}

/// Periodic rent increase terms of a `Tenant`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "TenantIncrease", context = Context)]
pub struct Increase {
    /// Percentage the rent increases by.
    pub percentage: Percent,

    /// Number of `cycle`s after which the increase applies.
    pub after: EffectiveAfter,

    /// Granularity the increase is counted in.
    pub cycle: Cycle,
}

impl From<domain::tenant::Increase> for Increase {
    fn from(increase: domain::tenant::Increase) -> Self {
        Self {
            percentage: increase.percentage,
            after: increase.after.into(),
            cycle: increase.cycle.into(),
        }
    }
}

/// Electricity billing terms of a `Tenant`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "TenantElectricity", context = Context)]
pub struct Electricity {
    /// Cost of a single consumed electricity unit.
    pub unit_cost: Money,

    /// Indicator whether the owner is reminded to record the meter reading
    /// before billing.
    pub notify_before_billing: bool,
}

impl From<domain::tenant::Electricity> for Electricity {
    fn from(electricity: domain::tenant::Electricity) -> Self {
        Self {
            unit_cost: electricity.unit_cost,
            notify_before_billing: electricity.notify_before_billing,
        }
    }
}

/// Duration of a `TenantAgreement` expressed in calendar units.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "TenantTenure", context = Context)]
pub struct Tenure {
    /// Whole years of the tenure.
    pub years: i32,

    /// Whole months of the tenure.
    pub months: i32,

    /// Remaining days of the tenure.
    pub days: i32,
}

impl From<domain::tenant::Tenure> for Tenure {
    fn from(tenure: domain::tenant::Tenure) -> Self {
        Self {
            years: tenure.years.into(),
            months: tenure.months.into(),
            days: tenure.days.into(),
        }
    }
}

/// Rental agreement of a `Tenant`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "TenantAgreement", context = Context)]
pub struct Agreement {
    /// `DateTime` when the agreement starts.
    pub starts_at: DateTime,

    /// Duration of the agreement.
    pub tenure: Tenure,

    /// `DateTime` when the agreement expires.
    pub expires_at: DateTime,
}

impl From<domain::tenant::Agreement> for Agreement {
    fn from(agreement: domain::tenant::Agreement) -> Self {
        Self {
            starts_at: agreement.start.coerce(),
            tenure: agreement.tenure.into(),
            expires_at: agreement.expiry().coerce(),
        }
    }
}

/// Input describing a file stored in an external media storage.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "TenantMediaInput")]
pub struct MediaInput {
    /// URL the file is served at.
    pub url: String,

    /// Identifier of the file in the media storage.
    pub public_id: String,
}

impl From<MediaInput> for domain::tenant::Media {
    fn from(input: MediaInput) -> Self {
        Self {
            url: input.url.into(),
            public_id: input.public_id.into(),
        }
    }
}

/// Input describing `TenantBilling` terms.
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
#[graphql(name = "TenantBillingInput")]
pub struct BillingInput {
    /// Monthly rent amount.
    pub monthly_rent: Money,

    /// Advance deposit held by the owner.
    pub advance: Money,

    /// Day of month the rent is billed on.
    pub day: BillingDay,

    /// Days after the due date before a `Rent` becomes overdue.
    ///
    /// Defaults to zero.
    pub grace_period_days: Option<i32>,
}

impl TryFrom<BillingInput> for domain::tenant::Billing {
    type Error = TryFromIntError;

    fn try_from(input: BillingInput) -> Result<Self, Self::Error> {
        Ok(Self {
            monthly_rent: input.monthly_rent,
            advance: input.advance,
            day: input.day.into(),
            grace_period: input.grace_period_days.unwrap_or(0).try_into()?,
        })
    }
}

/// Input describing `TenantIncrease` terms.
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
#[graphql(name = "TenantIncreaseInput")]
pub struct IncreaseInput {
    /// Percentage the rent increases by.
    pub percentage: Percent,

    /// Number of `cycle`s after which the increase applies.
    ///
    /// Defaults to one.
    pub after: Option<EffectiveAfter>,

    /// Granularity the increase is counted in.
    pub cycle: Cycle,
}

impl From<IncreaseInput> for domain::tenant::Increase {
    fn from(input: IncreaseInput) -> Self {
        Self {
            percentage: input.percentage,
            after: input.after.map(Into::into).unwrap_or_default(),
            cycle: input.cycle.into(),
        }
    }
}

/// Input describing `TenantElectricity` terms.
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
#[graphql(name = "TenantElectricityInput")]
pub struct ElectricityInput {
    /// Cost of a single consumed electricity unit.
    pub unit_cost: Money,

    /// Indicator whether the owner is reminded to record the meter reading
    /// before billing.
    ///
    /// Defaults to `true`.
    pub notify_before_billing: Option<bool>,
}

impl From<ElectricityInput> for domain::tenant::Electricity {
    fn from(input: ElectricityInput) -> Self {
        Self {
            unit_cost: input.unit_cost,
            notify_before_billing: input.notify_before_billing.unwrap_or(true),
        }
    }
}

/// Input describing a `TenantTenure`.
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
#[graphql(name = "TenantTenureInput")]
pub struct TenureInput {
    /// Whole years of the tenure.
    pub years: Option<i32>,

    /// Whole months of the tenure.
    pub months: Option<i32>,

    /// Remaining days of the tenure.
    pub days: Option<i32>,
}

impl TryFrom<TenureInput> for domain::tenant::Tenure {
    type Error = TryFromIntError;

    fn try_from(input: TenureInput) -> Result<Self, Self::Error> {
        Ok(Self {
            years: input.years.unwrap_or(0).try_into()?,
            months: input.months.unwrap_or(0).try_into()?,
            days: input.days.unwrap_or(0).try_into()?,
        })
    }
}

/// Input describing a `TenantAgreement`.
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
#[graphql(name = "TenantAgreementInput")]
pub struct AgreementInput {
    /// `DateTime` when the agreement starts.
    pub starts_at: DateTime,

    /// Duration of the agreement.
    pub tenure: TenureInput,
}

impl TryFrom<AgreementInput> for domain::tenant::Agreement {
    type Error = TryFromIntError;

    fn try_from(input: AgreementInput) -> Result<Self, Self::Error> {
        Ok(Self {
            start: input.starts_at.coerce(),
            tenure: input.tenure.try_into()?,
        })
    }
}

pub mod list {
    //! Definitions related to [`Tenant`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::{query, read, Query as _};

    use crate::{api::scalar, AsError, Context, Error};

    use super::{Id, Tenant};

    /// Cursor for the `Tenant` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::tenant::list::Cursor)]
    #[graphql(
        name = "TenantListCursor",
        with = scalar::Via::<read::tenant::list::Cursor>,
    )]
    pub struct Cursor(pub read::tenant::list::Cursor);

    /// Edge in the [`Tenant`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::tenant::list::Edge);

    /// Edge in the `Tenant` list.
    #[graphql_object(name = "TenantListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `TenantListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `TenantListEdge`.
        #[must_use]
        pub fn node(&self) -> Tenant {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees `Tenant` \
                          existence"
            )]
            unsafe {
                Tenant::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`Tenant`] list.
    #[derive(Clone, Debug, From, Into)]
    pub struct Connection(read::tenant::list::Connection);

    /// Connection of the `Tenant` list.
    #[graphql_object(name = "TenantListConnection", context = Context)]
    impl Connection {
        /// Edges in this `TenantListConnection`.
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
        /// Underlying [`read::tenant::list::PageInfo`].
        info: read::tenant::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,

        /// End cursor of the page.
        end_cursor: Option<Cursor>,
    }

    /// Information about a `TenantListConnection` page.
    #[graphql_object(name = "TenantListPageInfo", context = Context)]
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

        /// Total count of the authenticated owner's `Tenant`s.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            let my_id = ctx.current_session().await?.owner_id;

            ctx.service()
                .execute(query::tenants::TotalCount::by(my_id))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }
}
