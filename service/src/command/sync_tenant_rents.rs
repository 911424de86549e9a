//! [`Command`] for realigning [`Rent`]s with their [`Tenant`]'s terms.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{rent, tenant, Rent, Tenant},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for realigning [`Rent`]s of a [`Tenant`] with its current
/// terms.
///
/// Every not-yet-[`Paid`] [`Rent`] of the [`Tenant`] is rewritten: the
/// payable amount is recalculated from the effective rent (keeping the
/// stored carry), and the electricity snapshot is reset fresh from the
/// current terms. Payment progress and [`Paid`] [`Rent`]s are never
/// touched.
///
/// [`Paid`]: rent::Status::Paid
#[derive(Clone, Copy, Debug, From)]
pub struct SyncTenantRents {
    /// ID of the [`Tenant`] whose [`Rent`]s should be realigned.
    pub tenant_id: tenant::Id,
}

impl<Db, Nt> Command<SyncTenantRents> for Service<Db, Nt>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Tenant>, tenant::Id>>,
            Ok = Option<Tenant>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Rent>, tenant::Id>>,
            Ok = Vec<Rent>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Rent>, rent::Id>>,
            Ok = Option<Rent>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Tenant, tenant::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Rent>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
    Transacted<Db>:
        Database<Lock<By<Rent, rent::Id>>, Err = Traced<database::Error>>,
{
    type Ok = u32;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SyncTenantRents,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SyncTenantRents { tenant_id } = cmd;

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

        let tenant = tx
            .execute(Select(By::<Option<Tenant>, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TenantNotExists(tenant_id))
            .map_err(tracerr::wrap!())?;

        let rents = tx
            .execute(Select(By::<Vec<Rent>, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut synced = 0;
        for rent in rents {
            if rent.status == rent::Status::Paid {
                continue;
            }

            // Serialize with payments upon the same `Rent`.
            tx.execute(Lock(By::new(rent.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            let resynced = tx
                .execute(Select(By::<Option<Rent>, _>::new(rent.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|r| r.status != rent::Status::Paid)
                .map(|mut r| {
                    r.resync(&tenant);
                    r
                });
            let Some(resynced) = resynced else {
                continue;
            };

            tx.execute(Update(resynced))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            synced += 1;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(synced)
    }
}

/// Error of [`SyncTenantRents`] [`Command`] execution.
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

    use crate::{domain::owner, fixture};

    use super::*;

    #[tokio::test]
    async fn rewrites_unpaid_records_keeping_carry() {
        let service = Service::in_memory();
        let db = service.database();
        let mut tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let rent = Rent::issue(
            &tenant,
            rent::Month::new(1).unwrap(),
            2024,
            fixture::inr("200"),
        );
        db.execute(Insert(rent.clone())).await.unwrap();

        tenant.billing.monthly_rent = fixture::inr("12000");
        db.execute(Insert(tenant.clone())).await.unwrap();

        let synced = service
            .execute(SyncTenantRents {
                tenant_id: tenant.id,
            })
            .await
            .unwrap();
        assert_eq!(synced, 1);

        let stored = db
            .execute(Select(By::<Option<Rent>, _>::new(rent.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.amount, fixture::inr("12200"));
        assert_eq!(stored.previous_due, fixture::inr("200"));
    }

    #[tokio::test]
    async fn refreshes_electricity_snapshot() {
        let service = Service::in_memory();
        let db = service.database();
        let mut tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let rent = fixture::rent(&tenant, 1, 2024);
        assert!(rent.electricity.is_none());
        db.execute(Insert(rent.clone())).await.unwrap();

        tenant.electricity = Some(fixture::electricity());
        db.execute(Insert(tenant.clone())).await.unwrap();

        let synced = service
            .execute(SyncTenantRents {
                tenant_id: tenant.id,
            })
            .await
            .unwrap();
        assert_eq!(synced, 1);

        let stored = db
            .execute(Select(By::<Option<Rent>, _>::new(rent.id)))
            .await
            .unwrap()
            .unwrap();
        let electricity = stored.electricity.unwrap();
        assert_eq!(electricity.unit_cost, fixture::inr("8"));
        assert!(!electricity.calculated);
        assert!(!stored.reminder_sent);
    }

    #[tokio::test]
    async fn keeps_payment_progress() {
        let service = Service::in_memory();
        let db = service.database();
        let mut tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let mut rent = fixture::rent(&tenant, 1, 2024);
        rent.paid_amount = fixture::inr("3000");
        rent.due_next_month = fixture::inr("7000");
        rent.status = rent::Status::Partial;
        db.execute(Insert(rent.clone())).await.unwrap();

        tenant.billing.monthly_rent = fixture::inr("12000");
        db.execute(Insert(tenant.clone())).await.unwrap();

        let synced = service
            .execute(SyncTenantRents {
                tenant_id: tenant.id,
            })
            .await
            .unwrap();
        assert_eq!(synced, 1);

        let stored = db
            .execute(Select(By::<Option<Rent>, _>::new(rent.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.amount, fixture::inr("12000"));
        assert_eq!(stored.paid_amount, fixture::inr("3000"));
        assert_eq!(stored.due_next_month, fixture::inr("7000"));
        assert_eq!(stored.status, rent::Status::Partial);
    }

    #[tokio::test]
    async fn leaves_paid_records_untouched() {
        let service = Service::in_memory();
        let db = service.database();
        let mut tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let mut rent = fixture::rent(&tenant, 1, 2024);
        rent.paid_amount = rent.amount;
        rent.status = rent::Status::Paid;
        db.execute(Insert(rent.clone())).await.unwrap();

        tenant.billing.monthly_rent = fixture::inr("12000");
        db.execute(Insert(tenant.clone())).await.unwrap();

        let synced = service
            .execute(SyncTenantRents {
                tenant_id: tenant.id,
            })
            .await
            .unwrap();
        assert_eq!(synced, 0);

        let stored = db
            .execute(Select(By::<Option<Rent>, _>::new(rent.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.amount, fixture::inr("10000"));
    }

    #[tokio::test]
    async fn rejects_unknown_tenant() {
        let service = Service::in_memory();

        let err = service
            .execute(SyncTenantRents {
                tenant_id: tenant::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::TenantNotExists(_),
        ));
    }
}
