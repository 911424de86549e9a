//! [`Command`] for updating a [`Tenant`] profile.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::tenant::{
    Address, Billing, Electricity, Email, Increase, Media, Name, Phone,
};
use crate::{
    domain::{owner, tenant, Tenant},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`Tenant`] profile.
///
/// Already issued rents are not touched: the [`SyncTenantRents`] [`Command`]
/// realigns them separately.
///
/// [`SyncTenantRents`]: super::SyncTenantRents
#[derive(Clone, Debug)]
pub struct UpdateTenant {
    /// ID of the [`Tenant`] to update.
    pub tenant_id: tenant::Id,

    /// ID of the [`owner`] the [`Tenant`] is expected to rent from.
    pub owner_id: owner::Id,

    /// New [`Name`] of the [`Tenant`].
    pub name: Option<tenant::Name>,

    /// New [`Email`] of the [`Tenant`].
    ///
    /// Inner [`None`] indicating [`Email`] deletion.
    pub email: Option<Option<tenant::Email>>,

    /// New [`Phone`] of the [`Tenant`].
    pub phone: Option<tenant::Phone>,

    /// New WhatsApp [`Phone`] of the [`Tenant`].
    pub whatsapp: Option<tenant::Phone>,

    /// New [`Address`] of the rented property.
    ///
    /// Inner [`None`] indicating [`Address`] deletion.
    pub address: Option<Option<tenant::Address>>,

    /// New photo of the [`Tenant`], as an already uploaded [`Media`] file.
    ///
    /// Inner [`None`] indicating photo deletion.
    pub photo: Option<Option<tenant::Media>>,

    /// New [`Billing`] terms of the [`Tenant`].
    pub billing: Option<tenant::Billing>,

    /// New rent [`Increase`] terms of the [`Tenant`].
    ///
    /// Inner [`None`] indicating [`Increase`] terms removal.
    pub increase: Option<Option<tenant::Increase>>,

    /// New [`Electricity`] billing terms of the [`Tenant`].
    ///
    /// Inner [`None`] indicating [`Electricity`] billing removal.
    pub electricity: Option<Option<tenant::Electricity>>,

    /// New indicator whether the [`Tenant`] wants to be notified before the
    /// agreement expires.
    pub notify_before_agreement_end: Option<bool>,
}

impl<Db, Nt> Command<UpdateTenant> for Service<Db, Nt>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Tenant>, tenant::Id>>,
            Ok = Option<Tenant>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Tenant, tenant::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Tenant>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Tenant;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateTenant) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateTenant {
            tenant_id,
            owner_id,
            name,
            email,
            phone,
            whatsapp,
            address,
            photo,
            billing,
            increase,
            electricity,
            notify_before_agreement_end,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Tenant`.
        tx.execute(Lock(By::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut tenant = tx
            .execute(Select(By::<Option<Tenant>, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|t| t.owner_id == owner_id)
            .ok_or(E::TenantNotExists(tenant_id))
            .map_err(tracerr::wrap!())?;

        if let Some(name) = name {
            tenant.name = name;
        }
        if let Some(email) = email {
            tenant.email = email;
        }
        if let Some(phone) = phone {
            tenant.phone = phone;
        }
        if let Some(whatsapp) = whatsapp {
            tenant.whatsapp = whatsapp;
        }
        if let Some(address) = address {
            tenant.address = address;
        }
        if let Some(photo) = photo {
            tenant.photo = photo;
        }
        if let Some(billing) = billing {
            tenant.billing = billing;
        }
        if let Some(increase) = increase {
            tenant.increase = increase;
        }
        if let Some(electricity) = electricity {
            tenant.electricity = electricity;
        }
        if let Some(notify) = notify_before_agreement_end {
            tenant.notify_before_agreement_end = notify;
        }

        tx.execute(Update(tenant.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(tenant)
    }
}

/// Error of [`UpdateTenant`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Tenant`] doesn't exist.
    #[display("`Tenant(id: {_0})` does not exist")]
    #[from(ignore)]
    TenantNotExists(#[error(not(source))] tenant::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::fixture;

    use super::*;

    fn noop(tenant_id: tenant::Id, owner_id: owner::Id) -> UpdateTenant {
        UpdateTenant {
            tenant_id,
            owner_id,
            name: None,
            email: None,
            phone: None,
            whatsapp: None,
            address: None,
            photo: None,
            billing: None,
            increase: None,
            electricity: None,
            notify_before_agreement_end: None,
        }
    }

    #[tokio::test]
    async fn updates_provided_fields() {
        let service = Service::in_memory();
        let tenant = fixture::tenant(owner::Id::new());
        service
            .database()
            .execute(Insert(tenant.clone()))
            .await
            .unwrap();

        let mut billing = tenant.billing;
        billing.monthly_rent = fixture::inr("12000");
        let updated = service
            .execute(UpdateTenant {
                name: Some(tenant::Name::new("Arjun Mehta").unwrap()),
                billing: Some(billing),
                ..noop(tenant.id, tenant.owner_id)
            })
            .await
            .unwrap();

        assert_eq!(updated.name, tenant::Name::new("Arjun Mehta").unwrap());
        assert_eq!(updated.billing.monthly_rent, fixture::inr("12000"));
        assert_eq!(updated.phone, tenant.phone);

        let stored = service
            .database()
            .execute(Select(By::<Option<Tenant>, _>::new(tenant.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.billing.monthly_rent, fixture::inr("12000"));
    }

    #[tokio::test]
    async fn clears_inner_none_fields() {
        let service = Service::in_memory();
        let mut tenant = fixture::tenant(owner::Id::new());
        tenant.email =
            Some(tenant::Email::new("ravi.kumar@example.com").unwrap());
        tenant.electricity = Some(fixture::electricity());
        service
            .database()
            .execute(Insert(tenant.clone()))
            .await
            .unwrap();

        let updated = service
            .execute(UpdateTenant {
                email: Some(None),
                electricity: Some(None),
                ..noop(tenant.id, tenant.owner_id)
            })
            .await
            .unwrap();

        assert!(updated.email.is_none());
        assert!(updated.electricity.is_none());
    }

    #[tokio::test]
    async fn leaves_omitted_fields_as_is() {
        let service = Service::in_memory();
        let mut tenant = fixture::tenant(owner::Id::new());
        tenant.email =
            Some(tenant::Email::new("ravi.kumar@example.com").unwrap());
        service
            .database()
            .execute(Insert(tenant.clone()))
            .await
            .unwrap();

        let updated = service
            .execute(noop(tenant.id, tenant.owner_id))
            .await
            .unwrap();

        assert_eq!(updated.name, tenant.name);
        assert_eq!(updated.email, tenant.email);
        assert_eq!(
            updated.billing.monthly_rent,
            tenant.billing.monthly_rent,
        );
    }

    #[tokio::test]
    async fn rejects_unknown_tenant() {
        let service = Service::in_memory();

        let err = service
            .execute(noop(tenant::Id::new(), owner::Id::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::TenantNotExists(_),
        ));
    }

    #[tokio::test]
    async fn rejects_foreign_owner() {
        let service = Service::in_memory();
        let tenant = fixture::tenant(owner::Id::new());
        service
            .database()
            .execute(Insert(tenant.clone()))
            .await
            .unwrap();

        let err = service
            .execute(noop(tenant.id, owner::Id::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::TenantNotExists(_),
        ));
    }
}
