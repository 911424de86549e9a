//! [`Command`] for recomputing overdue [`Rent`] statuses.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use tracerr::Traced;

use crate::{
    domain::{owner, rent, tenant, Rent, Tenant},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for recomputing the payment [`Status`] of not-yet-paid
/// [`Rent`]s against their grace period.
///
/// Only [`Pending`] and [`Overdue`] records are considered, [`Partial`] and
/// [`Paid`] ones are never touched. A record turns [`Overdue`] once `today`
/// passes its due date extended by the [`Tenant`]'s grace period, by
/// calendar date (UTC), and turns back [`Pending`] when it no longer does.
/// Records are rewritten only when the [`Status`] actually changes.
///
/// [`Overdue`]: rent::Status::Overdue
/// [`Paid`]: rent::Status::Paid
/// [`Partial`]: rent::Status::Partial
/// [`Pending`]: rent::Status::Pending
/// [`Status`]: rent::Status
#[derive(Clone, Copy, Debug)]
pub struct SweepRentStatuses {
    /// Scope of the sweep.
    ///
    /// [`None`] sweeps [`Rent`]s of all owners.
    pub owner: Option<owner::Id>,

    /// Date the grace periods are checked against.
    pub today: time::Date,
}

impl<Db, Nt> Command<SweepRentStatuses> for Service<Db, Nt>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Vec<Rent>, read::rent::Unpaid>>,
            Ok = Vec<Rent>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<Rent>, rent::Id>>,
            Ok = Option<Rent>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Tenant>, tenant::Id>>,
            Ok = Option<Tenant>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Rent, rent::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Rent>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = u32;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SweepRentStatuses,
    ) -> Result<Self::Ok, Self::Err> {
        let SweepRentStatuses { owner, today } = cmd;

        let rents = self
            .database()
            .execute(Select(By::new(read::rent::Unpaid { owner })))
            .await
            .map_err(tracerr::wrap!())?;

        let mut updated = 0;
        for rent in rents {
            let tx = self
                .database()
                .execute(Transact)
                .await
                .map_err(tracerr::wrap!())?;

            // Serialize with payments upon the same `Rent`.
            tx.execute(Lock(By::new(rent.id)))
                .await
                .map_err(tracerr::wrap!())
                .map(drop)?;

            let Some(mut current) = tx
                .execute(Select(By::new(rent.id)))
                .await
                .map_err(tracerr::wrap!())?
                .filter(|r| {
                    matches!(
                        r.status,
                        rent::Status::Pending | rent::Status::Overdue,
                    )
                })
            else {
                continue;
            };

            let Some(tenant) = tx
                .execute(Select(By::new(current.tenant_id)))
                .await
                .map_err(tracerr::wrap!())?
            else {
                continue;
            };

            let grace_end = current.grace_end(tenant.billing.grace_period);
            let status = if today > grace_end {
                rent::Status::Overdue
            } else {
                rent::Status::Pending
            };
            if status == current.status {
                continue;
            }

            current.status = status;
            tx.execute(Update(current))
                .await
                .map_err(tracerr::wrap!())?;
            tx.execute(Commit)
                .await
                .map_err(tracerr::wrap!())?;
            updated += 1;
        }

        Ok(updated)
    }
}

/// Error of [`SweepRentStatuses`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::fixture;

    use super::*;

    #[tokio::test]
    async fn marks_overdue_once_grace_passes() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        // Due on 2024-03-01 with a 5 day grace period.
        let rent = fixture::rent(&tenant, 3, 2024);
        db.execute(Insert(rent.clone())).await.unwrap();

        let updated = service
            .execute(SweepRentStatuses {
                owner: None,
                today: fixture::date(2024, 3, 7),
            })
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let swept = db
            .execute(Select(By::<Option<Rent>, _>::new(rent.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(swept.status, rent::Status::Overdue);

        let again = service
            .execute(SweepRentStatuses {
                owner: None,
                today: fixture::date(2024, 3, 7),
            })
            .await
            .unwrap();
        assert_eq!(again, 0);
    }

    #[tokio::test]
    async fn keeps_pending_until_grace_passes() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let rent = fixture::rent(&tenant, 3, 2024);
        db.execute(Insert(rent.clone())).await.unwrap();

        for day in [4, 6] {
            let updated = service
                .execute(SweepRentStatuses {
                    owner: None,
                    today: fixture::date(2024, 3, day),
                })
                .await
                .unwrap();
            assert_eq!(updated, 0, "day {day} is still within grace");
        }

        let swept = db
            .execute(Select(By::<Option<Rent>, _>::new(rent.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(swept.status, rent::Status::Pending);
    }

    #[tokio::test]
    async fn returns_to_pending_when_grace_extended() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let mut rent = fixture::rent(&tenant, 3, 2024);
        rent.status = rent::Status::Overdue;
        db.execute(Insert(rent.clone())).await.unwrap();

        let mut relaxed = tenant.clone();
        relaxed.billing.grace_period = 30;
        db.execute(Insert(relaxed)).await.unwrap();

        let updated = service
            .execute(SweepRentStatuses {
                owner: None,
                today: fixture::date(2024, 3, 7),
            })
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let swept = db
            .execute(Select(By::<Option<Rent>, _>::new(rent.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(swept.status, rent::Status::Pending);
    }

    #[tokio::test]
    async fn never_touches_partial_or_paid() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let mut partial = fixture::rent(&tenant, 3, 2024);
        partial.status = rent::Status::Partial;
        db.execute(Insert(partial.clone())).await.unwrap();
        let mut paid = fixture::rent(&tenant, 4, 2024);
        paid.status = rent::Status::Paid;
        db.execute(Insert(paid.clone())).await.unwrap();

        let updated = service
            .execute(SweepRentStatuses {
                owner: None,
                today: fixture::date(2024, 6, 1),
            })
            .await
            .unwrap();
        assert_eq!(updated, 0);

        let partial = db
            .execute(Select(By::<Option<Rent>, _>::new(partial.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(partial.status, rent::Status::Partial);
        let paid = db
            .execute(Select(By::<Option<Rent>, _>::new(paid.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(paid.status, rent::Status::Paid);
    }

    #[tokio::test]
    async fn scopes_to_the_provided_owner() {
        let service = Service::in_memory();
        let db = service.database();
        let visited = fixture::tenant(owner::Id::new());
        let other = fixture::tenant(owner::Id::new());
        db.execute(Insert(visited.clone())).await.unwrap();
        db.execute(Insert(other.clone())).await.unwrap();
        let visited_rent = fixture::rent(&visited, 3, 2024);
        let other_rent = fixture::rent(&other, 3, 2024);
        db.execute(Insert(visited_rent.clone())).await.unwrap();
        db.execute(Insert(other_rent.clone())).await.unwrap();

        let updated = service
            .execute(SweepRentStatuses {
                owner: Some(visited.owner_id),
                today: fixture::date(2024, 3, 7),
            })
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let untouched = db
            .execute(Select(By::<Option<Rent>, _>::new(other_rent.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.status, rent::Status::Pending);
    }
}
