//! [`Command`] for creating a new [`Tenant`].

use common::{
    operations::{By, Commit, Insert, Transact, Transacted},
    DateTime, Money,
};
use rust_decimal::Decimal;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::tenant::{
    Address, Agreement, Billing, Electricity, Email, Increase, Media, Name,
    Phone,
};
use crate::{
    domain::{owner, rent, tenant, Rent, Tenant},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Tenant`].
///
/// Unless the [`Agreement`] has already expired, the first [`Rent`] of the
/// [`Tenant`] is issued along, for the billing period the [`rent::Target`]
/// resolves to.
#[derive(Clone, Debug)]
pub struct CreateTenant {
    /// ID of the [`owner`] a new [`Tenant`] rents from.
    pub owner_id: owner::Id,

    /// [`Name`] of a new [`Tenant`].
    pub name: tenant::Name,

    /// [`Email`] of a new [`Tenant`].
    pub email: Option<tenant::Email>,

    /// [`Phone`] of a new [`Tenant`].
    pub phone: tenant::Phone,

    /// WhatsApp [`Phone`] of a new [`Tenant`].
    ///
    /// Defaults to the regular [`Phone`] when not provided.
    pub whatsapp: Option<tenant::Phone>,

    /// [`Address`] of the rented property.
    pub address: Option<tenant::Address>,

    /// Photo of a new [`Tenant`], as an already uploaded [`Media`] file.
    pub photo: Option<tenant::Media>,

    /// Scanned rental agreement document, as an already uploaded [`Media`]
    /// file.
    pub agreement_file: Option<tenant::Media>,

    /// [`Billing`] terms of a new [`Tenant`].
    pub billing: tenant::Billing,

    /// Periodic rent [`Increase`] terms of a new [`Tenant`].
    pub increase: Option<tenant::Increase>,

    /// [`Electricity`] billing terms of a new [`Tenant`].
    pub electricity: Option<tenant::Electricity>,

    /// Rental [`Agreement`] of a new [`Tenant`].
    pub agreement: tenant::Agreement,

    /// Indicator whether a new [`Tenant`] wants to be notified before the
    /// [`Agreement`] expires.
    pub notify_before_agreement_end: bool,

    /// Billing period to issue the first [`Rent`] for.
    pub first_rent: rent::Target,
}

impl<Db, Nt> Command<CreateTenant> for Service<Db, Nt>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Tenant>, Err = Traced<database::Error>>
        + Database<Insert<Rent>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Tenant;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateTenant) -> Result<Self::Ok, Self::Err> {
        let CreateTenant {
            owner_id,
            name,
            email,
            phone,
            whatsapp,
            address,
            photo,
            agreement_file,
            billing,
            increase,
            electricity,
            agreement,
            notify_before_agreement_end,
            first_rent,
        } = cmd;

        let whatsapp = whatsapp.unwrap_or_else(|| phone.clone());
        let tenant = Tenant {
            id: tenant::Id::new(),
            owner_id,
            name,
            email,
            phone,
            whatsapp,
            address,
            photo,
            agreement_file,
            billing,
            increase,
            electricity,
            agreement,
            notify_before_agreement_end,
            expiry_reminder_sent: false,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;

        tx.execute(Insert(tenant.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let today = DateTime::now().date();
        if today <= tenant.agreement.expiry().date() {
            let (month, year) = first_rent.period(today);
            let no_carry = Money {
                amount: Decimal::ZERO,
                currency: tenant.billing.monthly_rent.currency,
            };
            tx.execute(Insert(Rent::issue(&tenant, month, year, no_carry)))
                .await
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(tenant)
    }
}

/// Error of [`CreateTenant`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
mod spec {
    use common::operations::Select;

    use crate::fixture;

    use super::*;

    fn cmd(owner_id: owner::Id) -> CreateTenant {
        let proto = fixture::tenant(owner_id);
        CreateTenant {
            owner_id,
            name: proto.name,
            email: None,
            phone: proto.phone,
            whatsapp: None,
            address: None,
            photo: None,
            agreement_file: None,
            billing: proto.billing,
            increase: None,
            electricity: None,
            agreement: tenant::Agreement {
                start: proto.agreement.start,
                tenure: tenant::Tenure {
                    years: 99,
                    ..tenant::Tenure::default()
                },
            },
            notify_before_agreement_end: true,
            first_rent: rent::Target::default(),
        }
    }

    #[tokio::test]
    async fn stores_tenant() {
        let service = Service::in_memory();
        let owner_id = owner::Id::new();

        let tenant = service.execute(cmd(owner_id)).await.unwrap();

        let stored = service
            .database()
            .execute(Select(By::<Option<Tenant>, _>::new(tenant.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.owner_id, owner_id);
        assert_eq!(stored.name, tenant.name);
        assert!(!stored.expiry_reminder_sent);
    }

    #[tokio::test]
    async fn defaults_whatsapp_to_phone() {
        let service = Service::in_memory();

        let tenant = service.execute(cmd(owner::Id::new())).await.unwrap();

        assert_eq!(tenant.whatsapp, tenant.phone);
    }

    #[tokio::test]
    async fn issues_first_rent_for_next_month() {
        let service = Service::in_memory();

        let tenant = service.execute(cmd(owner::Id::new())).await.unwrap();

        let rents = service
            .database()
            .execute(Select(By::<Vec<Rent>, _>::new(tenant.id)))
            .await
            .unwrap();
        let (month, year) =
            rent::Target::NextMonth.period(DateTime::now().date());
        assert_eq!(rents.len(), 1);
        assert_eq!(rents[0].month, month);
        assert_eq!(rents[0].year, year);
        assert_eq!(rents[0].amount, tenant.billing.monthly_rent);
        assert_eq!(rents[0].previous_due, fixture::inr("0"));
        assert_eq!(rents[0].status, rent::Status::Pending);
    }

    #[tokio::test]
    async fn issues_first_rent_for_current_month() {
        let service = Service::in_memory();
        let mut cmd = cmd(owner::Id::new());
        cmd.first_rent = rent::Target::CurrentMonth;

        let tenant = service.execute(cmd).await.unwrap();

        let rents = service
            .database()
            .execute(Select(By::<Vec<Rent>, _>::new(tenant.id)))
            .await
            .unwrap();
        let (month, year) =
            rent::Target::CurrentMonth.period(DateTime::now().date());
        assert_eq!(rents.len(), 1);
        assert_eq!(rents[0].month, month);
        assert_eq!(rents[0].year, year);
    }

    #[tokio::test]
    async fn skips_first_rent_past_expiry() {
        let service = Service::in_memory();
        let mut cmd = cmd(owner::Id::new());
        cmd.agreement.tenure = tenant::Tenure {
            years: 1,
            ..tenant::Tenure::default()
        };

        let tenant = service.execute(cmd).await.unwrap();

        let rents = service
            .database()
            .execute(Select(By::<Vec<Rent>, _>::new(tenant.id)))
            .await
            .unwrap();
        assert!(rents.is_empty());
    }
}
