//! [`Command`] for deleting a [`Tenant`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{owner, tenant, Rent, Tenant},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Tenant`] along with all its [`Rent`]s.
#[derive(Clone, Copy, Debug)]
pub struct DeleteTenant {
    /// ID of the [`Tenant`] to delete.
    pub tenant_id: tenant::Id,

    /// ID of the [`owner`] the [`Tenant`] is expected to rent from.
    pub owner_id: owner::Id,
}

impl<Db, Nt> Command<DeleteTenant> for Service<Db, Nt>
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
        > + Database<
            Delete<By<Rent, tenant::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Tenant, tenant::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteTenant) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteTenant {
            tenant_id,
            owner_id,
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

        tx.execute(Select(By::<Option<Tenant>, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|t| t.owner_id == owner_id)
            .ok_or(E::TenantNotExists(tenant_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        tx.execute(Delete(By::<Rent, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Delete(By::<Tenant, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(())
    }
}

/// Error of [`DeleteTenant`] [`Command`] execution.
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

    #[tokio::test]
    async fn deletes_tenant_with_rents() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        db.execute(Insert(fixture::rent(&tenant, 1, 2024)))
            .await
            .unwrap();
        db.execute(Insert(fixture::rent(&tenant, 2, 2024)))
            .await
            .unwrap();

        service
            .execute(DeleteTenant {
                tenant_id: tenant.id,
                owner_id: tenant.owner_id,
            })
            .await
            .unwrap();

        let stored = db
            .execute(Select(By::<Option<Tenant>, _>::new(tenant.id)))
            .await
            .unwrap();
        assert!(stored.is_none());
        let rents = db
            .execute(Select(By::<Vec<Rent>, _>::new(tenant.id)))
            .await
            .unwrap();
        assert!(rents.is_empty());
    }

    #[tokio::test]
    async fn leaves_other_tenants_untouched() {
        let service = Service::in_memory();
        let db = service.database();
        let owner_id = owner::Id::new();
        let deleted = fixture::tenant(owner_id);
        let kept = fixture::tenant(owner_id);
        db.execute(Insert(deleted.clone())).await.unwrap();
        db.execute(Insert(kept.clone())).await.unwrap();
        db.execute(Insert(fixture::rent(&kept, 1, 2024)))
            .await
            .unwrap();

        service
            .execute(DeleteTenant {
                tenant_id: deleted.id,
                owner_id,
            })
            .await
            .unwrap();

        let rents = db
            .execute(Select(By::<Vec<Rent>, _>::new(kept.id)))
            .await
            .unwrap();
        assert_eq!(rents.len(), 1);
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
            .execute(DeleteTenant {
                tenant_id: tenant.id,
                owner_id: owner::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::TenantNotExists(_),
        ));
    }
}
