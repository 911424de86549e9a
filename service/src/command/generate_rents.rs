//! [`Command`] for issuing the current billing period's [`Rent`]s.

use common::{
    operations::{
        By, Commit, Delete, Insert, Lock, Select, Transact, Transacted,
    },
    Money,
};
use derive_more::From;
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{rent, tenant, Rent, Tenant},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for issuing [`Rent`]s of the billing period `today` falls
/// into, for all [`Tenant`]s of all owners.
///
/// A [`Tenant`] is skipped when its agreement has expired, or when the
/// period's [`Rent`] exists already, making the run safely repeatable. The
/// unpaid remainder of the previous period's [`Rent`] is carried into the
/// new one, and the previous [`Rent`] is deleted in the same transaction.
///
/// Failures are isolated per [`Tenant`] and aggregated in the [`Output`],
/// never aborting the whole run.
#[derive(Clone, Copy, Debug, From)]
pub struct GenerateRents {
    /// Date the billing period is resolved against.
    pub today: time::Date,
}

/// Output of [`GenerateRents`] [`Command`].
#[derive(Debug)]
pub struct Output {
    /// Number of issued [`Rent`]s.
    pub created: u32,

    /// Failures of individual [`Tenant`]s.
    pub errors: Vec<(tenant::Id, Traced<database::Error>)>,
}

impl<Db, Nt> Command<GenerateRents> for Service<Db, Nt>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Vec<Tenant>, ()>>,
            Ok = Vec<Tenant>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<Rent>, read::rent::TenantPeriod>>,
            Ok = Option<Rent>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Tenant, tenant::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Insert<Rent>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Delete<By<Rent, rent::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: GenerateRents) -> Result<Self::Ok, Self::Err> {
        let GenerateRents { today } = cmd;

        let (month, year) = rent::Target::CurrentMonth.period(today);

        let tenants = self
            .database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::wrap!())?;

        let mut created = 0;
        let mut errors = Vec::new();
        for tenant in tenants {
            let tenant_id = tenant.id;
            let issued = async {
                if today > tenant.agreement.expiry().date() {
                    return Ok(false);
                }

                let tx = self
                    .database()
                    .execute(Transact)
                    .await
                    .map_err(tracerr::wrap!())?;

                // Avoid concurrent generation for the same `Tenant`.
                tx.execute(Lock(By::new(tenant.id)))
                    .await
                    .map_err(tracerr::wrap!())
                    .map(drop)?;

                let period = read::rent::Period { month, year };
                let existing = tx
                    .execute(Select(By::new(read::rent::TenantPeriod {
                        tenant_id: tenant.id,
                        period,
                    })))
                    .await
                    .map_err(tracerr::wrap!())?;
                if existing.is_some() {
                    // This period's `Rent` has been issued already.
                    return Ok(false);
                }

                let (prev_month, prev_year) = month.previous(year);
                let previous = tx
                    .execute(Select(By::new(read::rent::TenantPeriod {
                        tenant_id: tenant.id,
                        period: read::rent::Period {
                            month: prev_month,
                            year: prev_year,
                        },
                    })))
                    .await
                    .map_err(tracerr::wrap!())?;

                let previous_due = previous
                    .as_ref()
                    .filter(|prev| prev.status != rent::Status::Paid)
                    .map_or(
                        Money {
                            amount: Decimal::ZERO,
                            currency: tenant.billing.monthly_rent.currency,
                        },
                        |prev| prev.due_next_month,
                    );

                tx.execute(Insert(Rent::issue(
                    &tenant,
                    month,
                    year,
                    previous_due,
                )))
                .await
                .map_err(tracerr::wrap!())?;

                if let Some(prev) = previous {
                    // The carry has moved into the new `Rent`.
                    tx.execute(Delete(By::new(prev.id)))
                        .await
                        .map_err(tracerr::wrap!())?;
                }

                tx.execute(Commit)
                    .await
                    .map_err(tracerr::wrap!())?;

                Ok::<_, Traced<database::Error>>(true)
            }
            .await;

            match issued {
                Ok(true) => created += 1,
                Ok(false) => {}
                Err(e) => errors.push((tenant_id, e)),
            }
        }

        Ok(Output { created, errors })
    }
}

/// Error of [`GenerateRents`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
mod spec {
    use crate::{domain::owner, fixture};

    use super::*;

    #[tokio::test]
    async fn issues_rent_for_current_month() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();

        let out = service
            .execute(GenerateRents {
                today: fixture::date(2024, 3, 15),
            })
            .await
            .unwrap();
        assert_eq!(out.created, 1);
        assert!(out.errors.is_empty());

        let rents = db
            .execute(Select(By::<Vec<Rent>, _>::new(tenant.id)))
            .await
            .unwrap();
        assert_eq!(rents.len(), 1);
        assert_eq!(rents[0].month, rent::Month::new(3).unwrap());
        assert_eq!(rents[0].year, 2024);
        assert_eq!(rents[0].amount, fixture::inr("10000"));
        assert_eq!(rents[0].status, rent::Status::Pending);
        assert_eq!(rents[0].due_date.date(), fixture::date(2024, 3, 1));
    }

    #[tokio::test]
    async fn repeated_run_is_idempotent() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();

        let today = fixture::date(2024, 3, 15);
        let first = service.execute(GenerateRents { today }).await.unwrap();
        assert_eq!(first.created, 1);

        let second = service.execute(GenerateRents { today }).await.unwrap();
        assert_eq!(second.created, 0);
        assert!(second.errors.is_empty());

        let rents = db
            .execute(Select(By::<Vec<Rent>, _>::new(tenant.id)))
            .await
            .unwrap();
        assert_eq!(rents.len(), 1);
    }

    #[tokio::test]
    async fn skips_expired_agreement() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();

        // The fixture agreement runs out on 2026-01-01.
        let out = service
            .execute(GenerateRents {
                today: fixture::date(2026, 2, 1),
            })
            .await
            .unwrap();
        assert_eq!(out.created, 0);

        let rents = db
            .execute(Select(By::<Vec<Rent>, _>::new(tenant.id)))
            .await
            .unwrap();
        assert!(rents.is_empty());
    }

    #[tokio::test]
    async fn carries_unpaid_due_and_drops_previous_record() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let mut january = fixture::rent(&tenant, 1, 2024);
        january.paid_amount = fixture::inr("6000");
        january.due_next_month = fixture::inr("4000");
        january.status = rent::Status::Partial;
        db.execute(Insert(january.clone())).await.unwrap();

        let out = service
            .execute(GenerateRents {
                today: fixture::date(2024, 2, 10),
            })
            .await
            .unwrap();
        assert_eq!(out.created, 1);

        let rents = db
            .execute(Select(By::<Vec<Rent>, _>::new(tenant.id)))
            .await
            .unwrap();
        assert_eq!(rents.len(), 1);
        assert_eq!(rents[0].month, rent::Month::new(2).unwrap());
        assert_eq!(rents[0].previous_due, fixture::inr("4000"));
        assert_eq!(rents[0].amount, fixture::inr("14000"));
    }

    #[tokio::test]
    async fn ignores_paid_previous_due() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let mut january = fixture::rent(&tenant, 1, 2024);
        january.paid_amount = january.amount;
        january.due_next_month = fixture::inr("0");
        january.status = rent::Status::Paid;
        db.execute(Insert(january.clone())).await.unwrap();

        let out = service
            .execute(GenerateRents {
                today: fixture::date(2024, 2, 10),
            })
            .await
            .unwrap();
        assert_eq!(out.created, 1);

        let rents = db
            .execute(Select(By::<Vec<Rent>, _>::new(tenant.id)))
            .await
            .unwrap();
        assert_eq!(rents.len(), 1);
        assert_eq!(rents[0].previous_due, fixture::inr("0"));
        assert_eq!(rents[0].amount, fixture::inr("10000"));
    }

    #[tokio::test]
    async fn isolates_tenant_failures() {
        let service = Service::in_memory();
        let db = service.database();
        let owner_id = owner::Id::new();
        let broken = fixture::tenant(owner_id);
        let healthy = fixture::tenant(owner_id);
        db.execute(Insert(broken.clone())).await.unwrap();
        db.execute(Insert(healthy.clone())).await.unwrap();
        db.break_rent_inserts_for(broken.id);

        let out = service
            .execute(GenerateRents {
                today: fixture::date(2024, 3, 15),
            })
            .await
            .unwrap();

        assert_eq!(out.created, 1);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].0, broken.id);

        let rents = db
            .execute(Select(By::<Vec<Rent>, _>::new(healthy.id)))
            .await
            .unwrap();
        assert_eq!(rents.len(), 1);
    }
}
