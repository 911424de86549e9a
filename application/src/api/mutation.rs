//! GraphQL [`Mutation`]s definitions.

use common::{DateTime, Money};
use juniper::{graphql_object, Nullable};
use service::{command, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

/// Converts a three-state [`Nullable`] argument into the double-[`Option`]
/// shape accepted by update commands: an omitted argument keeps the stored
/// value, an explicit `null` clears it.
fn patch<T, D: From<T>>(value: Nullable<T>) -> Option<Option<D>> {
    match value {
        Nullable::ImplicitNull => None,
        Nullable::ExplicitNull => Some(None),
        Nullable::Some(v) => Some(Some(v.into())),
    }
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `Tenant` of the authenticated owner, issuing their
    /// first `Rent` record for the billing period chosen by `firstRent`.
    #[tracing::instrument(
        skip_all,
        fields(
            address = ?address,
            agreement = ?agreement,
            agreement_file = ?agreement_file,
            billing = ?billing,
            electricity = ?electricity,
            email = ?email,
            first_rent = ?first_rent,
            gql.name = "createTenant",
            increase = ?increase,
            name = %name,
            notify_before_agreement_end = ?notify_before_agreement_end,
            otel.name = Self::SPAN_NAME,
            phone = %phone,
            photo = ?photo,
            whatsapp = ?whatsapp,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn create_tenant(
        name: api::tenant::Name,
        email: Option<api::tenant::Email>,
        phone: api::tenant::Phone,
        whatsapp: Option<api::tenant::Phone>,
        address: Option<api::tenant::Address>,
        photo: Option<api::tenant::MediaInput>,
        agreement_file: Option<api::tenant::MediaInput>,
        billing: api::tenant::BillingInput,
        increase: Option<api::tenant::IncreaseInput>,
        electricity: Option<api::tenant::ElectricityInput>,
        agreement: api::tenant::AgreementInput,
        notify_before_agreement_end: Option<bool>,
        first_rent: Option<api::rent::Target>,
        ctx: &Context,
    ) -> Result<api::Tenant, Error> {
        let billing = billing.try_into().map_err(AsError::into_error)?;
        let agreement = agreement.try_into().map_err(AsError::into_error)?;

        let my_id = ctx.current_session().await?.owner_id;

        ctx.service()
            .execute(command::CreateTenant {
                owner_id: my_id,
                name: name.into(),
                email: email.map(Into::into),
                phone: phone.into(),
                whatsapp: whatsapp.map(Into::into),
                address: address.map(Into::into),
                photo: photo.map(Into::into),
                agreement_file: agreement_file.map(Into::into),
                billing,
                increase: increase.map(Into::into),
                electricity: electricity.map(Into::into),
                agreement,
                notify_before_agreement_end: notify_before_agreement_end
                    .unwrap_or(true),
                first_rent: first_rent.map(Into::into).unwrap_or_default(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the `Tenant` with the provided ID, resyncing their unpaid
    /// `Rent`s with the new terms.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `TENANT_NOT_EXISTS` - the `Tenant` with the provided ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            address = ?address,
            billing = ?billing,
            electricity = ?electricity,
            email = ?email,
            gql.name = "updateTenant",
            id = %id,
            increase = ?increase,
            name = ?name.as_ref().map(ToString::to_string),
            notify_before_agreement_end = ?notify_before_agreement_end,
            otel.name = Self::SPAN_NAME,
            phone = ?phone.as_ref().map(ToString::to_string),
            photo = ?photo,
            whatsapp = ?whatsapp.as_ref().map(ToString::to_string),
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn update_tenant(
        id: api::tenant::Id,
        name: Option<api::tenant::Name>,
        email: Nullable<api::tenant::Email>,
        phone: Option<api::tenant::Phone>,
        whatsapp: Option<api::tenant::Phone>,
        address: Nullable<api::tenant::Address>,
        photo: Nullable<api::tenant::MediaInput>,
        billing: Option<api::tenant::BillingInput>,
        increase: Nullable<api::tenant::IncreaseInput>,
        electricity: Nullable<api::tenant::ElectricityInput>,
        notify_before_agreement_end: Option<bool>,
        ctx: &Context,
    ) -> Result<api::Tenant, Error> {
        let billing = billing
            .map(TryInto::try_into)
            .transpose()
            .map_err(AsError::into_error)?;

        let my_id = ctx.current_session().await?.owner_id;

        let tenant = ctx
            .service()
            .execute(command::UpdateTenant {
                tenant_id: id.into(),
                owner_id: my_id,
                name: name.map(Into::into),
                email: patch(email),
                phone: phone.map(Into::into),
                whatsapp: whatsapp.map(Into::into),
                address: patch(address),
                photo: patch(photo),
                billing,
                increase: patch(increase),
                electricity: patch(electricity),
                notify_before_agreement_end,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        _ = ctx
            .service()
            .execute(command::SyncTenantRents {
                tenant_id: tenant.id,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(tenant.into())
    }

    /// Updates the rental agreement of the `Tenant` with the provided ID,
    /// resyncing their unpaid `Rent`s with the new terms.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `TENANT_NOT_EXISTS` - the `Tenant` with the provided ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            agreement_file = ?agreement_file,
            gql.name = "updateTenantAgreement",
            id = %id,
            otel.name = Self::SPAN_NAME,
            starts_at = ?starts_at.as_ref().map(DateTime::to_rfc3339),
            tenure = ?tenure,
        ),
    )]
    pub async fn update_tenant_agreement(
        id: api::tenant::Id,
        starts_at: Option<DateTime>,
        tenure: Option<api::tenant::TenureInput>,
        agreement_file: Nullable<api::tenant::MediaInput>,
        ctx: &Context,
    ) -> Result<api::Tenant, Error> {
        let tenure = tenure
            .map(TryInto::try_into)
            .transpose()
            .map_err(AsError::into_error)?;

        let my_id = ctx.current_session().await?.owner_id;

        let tenant = ctx
            .service()
            .execute(command::UpdateTenantAgreement {
                tenant_id: id.into(),
                owner_id: my_id,
                start: starts_at.map(DateTime::coerce),
                tenure,
                agreement_file: patch(agreement_file),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        _ = ctx
            .service()
            .execute(command::SyncTenantRents {
                tenant_id: tenant.id,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(tenant.into())
    }

    /// Deletes the `Tenant` with the provided ID along with all their `Rent`
    /// records.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `TENANT_NOT_EXISTS` - the `Tenant` with the provided ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteTenant",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_tenant(
        id: api::tenant::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.owner_id;

        ctx.service()
            .execute(command::DeleteTenant {
                tenant_id: id.into(),
                owner_id: my_id,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Registers a partial payment towards the `Rent` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RENT_NOT_EXISTS` - the `Rent` with the provided ID does not exist;
    /// - `RENT_ALREADY_SETTLED` - the `Rent` with the provided ID is already
    ///                            fully paid;
    /// - `RENT_OVERPAID` - the payment overshoots the payable amount;
    /// - `INVALID_AMOUNT` - the payment amount is not positive;
    /// - `CURRENCY_MISMATCH` - the payment is made in a wrong currency.
    #[tracing::instrument(
        skip_all,
        fields(
            amount = %amount,
            gql.name = "payRent",
            id = %id,
            method = ?method,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn pay_rent(
        id: api::rent::Id,
        amount: Money,
        method: api::rent::PaymentMethod,
        ctx: &Context,
    ) -> Result<api::Rent, Error> {
        let my_id = ctx.current_session().await?.owner_id;

        ctx.service()
            .execute(command::PayRent {
                rent_id: id.into(),
                owner_id: my_id,
                amount,
                method: method.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Settles the `Rent` with the provided ID in full, whatever amount
    /// remains payable.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RENT_NOT_EXISTS` - the `Rent` with the provided ID does not exist;
    /// - `RENT_ALREADY_SETTLED` - the `Rent` with the provided ID is already
    ///                            fully paid.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "settleRent",
            id = %id,
            method = ?method,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn settle_rent(
        id: api::rent::Id,
        method: api::rent::PaymentMethod,
        ctx: &Context,
    ) -> Result<api::Rent, Error> {
        let my_id = ctx.current_session().await?.owner_id;

        ctx.service()
            .execute(command::SettleRent {
                rent_id: id.into(),
                owner_id: my_id,
                method: method.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Records a meter reading for the `Rent` with the provided ID,
    /// calculating its electricity charge.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RENT_NOT_EXISTS` - the `Rent` with the provided ID does not exist;
    /// - `ELECTRICITY_NOT_ENABLED` - the `Rent` was issued without
    ///                               electricity billing;
    /// - `ELECTRICITY_ALREADY_CALCULATED` - the `Rent` has its electricity
    ///                                      charge calculated already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "recordMeterReading",
            id = %id,
            otel.name = Self::SPAN_NAME,
            units = %units,
        ),
    )]
    pub async fn record_meter_reading(
        id: api::rent::Id,
        units: api::rent::Units,
        ctx: &Context,
    ) -> Result<api::Rent, Error> {
        let my_id = ctx.current_session().await?.owner_id;

        ctx.service()
            .execute(command::RecordMeterReading {
                rent_id: id.into(),
                owner_id: my_id,
                units: units.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::update_tenant::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "TENANT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Tenant` with the provided ID is not exists"]
                TenantNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::TenantNotExists(_) => Error::TenantNotExists.into(),
        })
    }
}

impl AsError for command::update_tenant_agreement::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "TENANT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Tenant` with the provided ID is not exists"]
                TenantNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::TenantNotExists(_) => Error::TenantNotExists.into(),
        })
    }
}

impl AsError for command::delete_tenant::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "TENANT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Tenant` with the provided ID is not exists"]
                TenantNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::TenantNotExists(_) => Error::TenantNotExists.into(),
        })
    }
}

impl AsError for command::sync_tenant_rents::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::TenantNotExists(_) => None,
        }
    }
}

impl AsError for command::pay_rent::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "RENT_ALREADY_SETTLED"]
                #[status = CONFLICT]
                #[message = "`Rent` with the provided ID is already settled"]
                AlreadySettled,

                #[code = "CURRENCY_MISMATCH"]
                #[status = BAD_REQUEST]
                #[message = "Payment is made in a wrong currency"]
                CurrencyMismatch,

                #[code = "RENT_OVERPAID"]
                #[status = CONFLICT]
                #[message = "Payment overshoots the payable amount"]
                ExceedsPayable,

                #[code = "INVALID_AMOUNT"]
                #[status = BAD_REQUEST]
                #[message = "Payment amount must be positive"]
                InvalidAmount,

                #[code = "RENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Rent` with the provided ID is not exists"]
                RentNotExists,
            }
        }

        Some(match self {
            Self::AlreadySettled(_) => Error::AlreadySettled.into(),
            Self::CurrencyMismatch(_) => Error::CurrencyMismatch.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::ExceedsPayable(_) => Error::ExceedsPayable.into(),
            Self::InvalidAmount(_) => Error::InvalidAmount.into(),
            Self::RentNotExists(_) => Error::RentNotExists.into(),
        })
    }
}

impl AsError for command::settle_rent::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "RENT_ALREADY_SETTLED"]
                #[status = CONFLICT]
                #[message = "`Rent` with the provided ID is already settled"]
                AlreadySettled,

                #[code = "RENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Rent` with the provided ID is not exists"]
                RentNotExists,
            }
        }

        Some(match self {
            Self::AlreadySettled(_) => Error::AlreadySettled.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::RentNotExists(_) => Error::RentNotExists.into(),
        })
    }
}

impl AsError for command::record_meter_reading::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ELECTRICITY_ALREADY_CALCULATED"]
                #[status = CONFLICT]
                #[message = "`Rent` with the provided ID has its electricity \
                             charge calculated already"]
                AlreadyCalculated,

                #[code = "ELECTRICITY_NOT_ENABLED"]
                #[status = BAD_REQUEST]
                #[message = "`Rent` with the provided ID was issued without \
                             electricity billing"]
                ElectricityNotEnabled,

                #[code = "RENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Rent` with the provided ID is not exists"]
                RentNotExists,
            }
        }

        Some(match self {
            Self::AlreadyCalculated(_) => Error::AlreadyCalculated.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::ElectricityNotEnabled(_) => {
                Error::ElectricityNotEnabled.into()
            }
            Self::RentNotExists(_) => Error::RentNotExists.into(),
        })
    }
}
