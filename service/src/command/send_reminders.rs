//! [`Command`] for sending due reminder [`Email`]s.

use common::operations::{
    By, Commit, Lock, Notify, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{notification::Email, rent, tenant, Rent, Tenant},
    infra::{database, notification, Database, Notifier},
    read,
    Service,
};

use super::Command;

/// [`Command`] for sending due reminder [`Email`]s to [`Tenant`]s.
///
/// Covers two kinds of reminders:
/// - agreement expiry, for [`Tenant`]s whose agreement runs out within the
///   next 30 days, sent once per agreement;
/// - electricity meter reading, for the current period's [`Rent`]s with an
///   uncalculated reading, due tomorrow or earlier, sent once per [`Rent`].
///
/// One-shot flags are recorded only after the transport confirms a
/// delivery, so a failed delivery is retried on the next run. Failures are
/// isolated per recipient and aggregated in the [`Output`].
#[derive(Clone, Copy, Debug, From)]
pub struct SendReminders {
    /// Date the reminder windows are resolved against.
    pub today: time::Date,
}

/// Output of [`SendReminders`] [`Command`].
#[derive(Debug)]
pub struct Output {
    /// Number of delivered agreement expiry reminders.
    pub agreement: u32,

    /// Number of delivered meter reading reminders.
    pub electricity: u32,

    /// Failures of individual deliveries.
    pub errors: Vec<(tenant::Id, Traced<DeliveryError>)>,
}

impl<Db, Nt> Command<SendReminders> for Service<Db, Nt>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Vec<Tenant>, ()>>,
            Ok = Vec<Tenant>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Rent>, read::rent::Period>>,
            Ok = Vec<Rent>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Tenant>, tenant::Id>>,
            Ok = Option<Tenant>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Tenant, tenant::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Tenant>, tenant::Id>>,
            Ok = Option<Tenant>,
            Err = Traced<database::Error>,
        > + Database<Update<Tenant>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Rent, rent::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Rent>, rent::Id>>,
            Ok = Option<Rent>,
            Err = Traced<database::Error>,
        > + Database<Update<Rent>, Ok = (), Err = Traced<database::Error>>,
    Nt: Notifier<Notify<Email>, Ok = (), Err = Traced<notification::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SendReminders) -> Result<Self::Ok, Self::Err> {
        let SendReminders { today } = cmd;

        let mut agreement = 0;
        let mut electricity = 0;
        let mut errors = Vec::new();

        let tenants = self
            .database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        for tenant in tenants {
            if !tenant.notify_before_agreement_end
                || tenant.expiry_reminder_sent
            {
                continue;
            }
            let Some(email) = tenant.email.clone() else {
                continue;
            };
            let expiry = tenant.agreement.expiry().date();
            let days_left = (expiry - today).whole_days();
            if !(0..=30).contains(&days_left) {
                continue;
            }

            let tenant_id = tenant.id;
            let delivered = async {
                self.notifier()
                    .execute(Notify(Email {
                        to: email,
                        subject: "Agreement Expiry Reminder".into(),
                        body: format!(
                            "Hello {name},\n\n\
                             Your rental agreement expires on {expiry}.\n\
                             Please contact the owner if you wish to \
                             renew.\n\n\
                             Regards,\nRentFlow",
                            name = tenant.name,
                        ),
                    }))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> DeliveryError))?;

                let tx = self
                    .database()
                    .execute(Transact)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> DeliveryError))?;

                // Avoid concurrent actions upon the same `Tenant`.
                tx.execute(Lock(By::new(tenant.id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> DeliveryError))
                    .map(drop)?;

                let reminded = tx
                    .execute(Select(By::new(tenant.id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> DeliveryError))?;
                if let Some(mut t) = reminded {
                    t.expiry_reminder_sent = true;
                    tx.execute(Update(t)).await.map_err(
                        tracerr::map_from_and_wrap!(=> DeliveryError),
                    )?;
                    tx.execute(Commit).await.map_err(
                        tracerr::map_from_and_wrap!(=> DeliveryError),
                    )?;
                }
                Ok::<_, Traced<DeliveryError>>(())
            }
            .await;

            match delivered {
                Ok(()) => agreement += 1,
                Err(e) => errors.push((tenant_id, e)),
            }
        }

        let (month, year) = rent::Target::CurrentMonth.period(today);
        let rents = self
            .database()
            .execute(Select(By::new(read::rent::Period { month, year })))
            .await
            .map_err(tracerr::wrap!())?;
        for rent in rents {
            let Some(snapshot) = rent.electricity else {
                continue;
            };
            if snapshot.calculated || rent.reminder_sent {
                continue;
            }
            if (rent.due_date.date() - today).whole_days() > 1 {
                continue;
            }

            let tenant_id = rent.tenant_id;
            let delivered = async {
                let tenant = self
                    .database()
                    .execute(Select(By::new(rent.tenant_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> DeliveryError))?;
                let Some(tenant) = tenant else {
                    return Ok(false);
                };
                if !tenant
                    .electricity
                    .is_some_and(|terms| terms.notify_before_billing)
                {
                    return Ok(false);
                }
                let Some(email) = tenant.email.clone() else {
                    return Ok(false);
                };

                self.notifier()
                    .execute(Notify(Email {
                        to: email,
                        subject: "Electricity Meter Reading Reminder".into(),
                        body: format!(
                            "Hello {name},\n\n\
                             Please submit your electricity meter \
                             reading.\n\
                             Rent due date: {due}.\n\n\
                             Regards,\nRentFlow",
                            name = tenant.name,
                            due = rent.due_date.date(),
                        ),
                    }))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> DeliveryError))?;

                let tx = self
                    .database()
                    .execute(Transact)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> DeliveryError))?;

                // Avoid concurrent actions upon the same `Rent`.
                tx.execute(Lock(By::new(rent.id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> DeliveryError))
                    .map(drop)?;

                let reminded = tx
                    .execute(Select(By::new(rent.id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> DeliveryError))?;
                if let Some(mut r) = reminded {
                    r.reminder_sent = true;
                    tx.execute(Update(r)).await.map_err(
                        tracerr::map_from_and_wrap!(=> DeliveryError),
                    )?;
                    tx.execute(Commit).await.map_err(
                        tracerr::map_from_and_wrap!(=> DeliveryError),
                    )?;
                }
                Ok::<_, Traced<DeliveryError>>(true)
            }
            .await;

            match delivered {
                Ok(true) => electricity += 1,
                Ok(false) => {}
                Err(e) => errors.push((tenant_id, e)),
            }
        }

        Ok(Output {
            agreement,
            electricity,
            errors,
        })
    }
}

/// Error of [`SendReminders`] [`Command`] execution.
pub type ExecutionError = database::Error;

/// Error of delivering a single reminder [`Email`].
#[derive(Debug, Display, Error, From)]
pub enum DeliveryError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Notifier`] error.
    #[display("`Notifier` operation failed: {_0}")]
    Notify(notification::Error),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{domain::owner, fixture};

    use super::*;

    #[tokio::test]
    async fn reminds_of_expiring_agreement() {
        let service = Service::in_memory();
        let db = service.database();
        // The fixture agreement runs out on 2026-01-01.
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();

        let out = service
            .execute(SendReminders {
                today: fixture::date(2025, 12, 2),
            })
            .await
            .unwrap();
        assert_eq!(out.agreement, 1);
        assert!(out.errors.is_empty());

        let sent = service.notifier().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Agreement Expiry Reminder");

        let stored = db
            .execute(Select(By::<Option<Tenant>, _>::new(tenant.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.expiry_reminder_sent);

        let again = service
            .execute(SendReminders {
                today: fixture::date(2025, 12, 3),
            })
            .await
            .unwrap();
        assert_eq!(again.agreement, 0);
    }

    #[tokio::test]
    async fn respects_agreement_window() {
        for (today, fires) in [
            (fixture::date(2025, 12, 1), false),
            (fixture::date(2025, 12, 20), true),
            (fixture::date(2026, 1, 1), true),
            (fixture::date(2026, 1, 2), false),
        ] {
            let service = Service::in_memory();
            let tenant = fixture::tenant(owner::Id::new());
            service
                .database()
                .execute(Insert(tenant))
                .await
                .unwrap();

            let out = service
                .execute(SendReminders { today })
                .await
                .unwrap();
            assert_eq!(out.agreement, u32::from(fires), "on {today}");
        }
    }

    #[tokio::test]
    async fn skips_agreement_reminder_without_optin() {
        let service = Service::in_memory();
        let db = service.database();
        let owner_id = owner::Id::new();
        let mut opted_out = fixture::tenant(owner_id);
        opted_out.notify_before_agreement_end = false;
        let mut reminded = fixture::tenant(owner_id);
        reminded.expiry_reminder_sent = true;
        let mut unreachable = fixture::tenant(owner_id);
        unreachable.email = None;
        for tenant in [opted_out, reminded, unreachable] {
            db.execute(Insert(tenant)).await.unwrap();
        }

        let out = service
            .execute(SendReminders {
                today: fixture::date(2025, 12, 2),
            })
            .await
            .unwrap();

        assert_eq!(out.agreement, 0);
        assert!(service.notifier().sent().is_empty());
    }

    #[tokio::test]
    async fn reminds_of_meter_reading() {
        let service = Service::in_memory();
        let db = service.database();
        let mut tenant = fixture::tenant(owner::Id::new());
        tenant.electricity = Some(fixture::electricity());
        db.execute(Insert(tenant.clone())).await.unwrap();
        // Due on 2024-03-01.
        let rent = fixture::rent(&tenant, 3, 2024);
        db.execute(Insert(rent.clone())).await.unwrap();

        let out = service
            .execute(SendReminders {
                today: fixture::date(2024, 3, 1),
            })
            .await
            .unwrap();
        assert_eq!(out.electricity, 1);

        let sent = service.notifier().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Electricity Meter Reading Reminder");

        let stored = db
            .execute(Select(By::<Option<Rent>, _>::new(rent.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.reminder_sent);

        let again = service
            .execute(SendReminders {
                today: fixture::date(2024, 3, 1),
            })
            .await
            .unwrap();
        assert_eq!(again.electricity, 0);
    }

    #[tokio::test]
    async fn reminds_of_past_due_uncalculated_reading() {
        let service = Service::in_memory();
        let db = service.database();
        let mut tenant = fixture::tenant(owner::Id::new());
        tenant.electricity = Some(fixture::electricity());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let rent = fixture::rent(&tenant, 3, 2024);
        db.execute(Insert(rent.clone())).await.unwrap();

        let out = service
            .execute(SendReminders {
                today: fixture::date(2024, 3, 10),
            })
            .await
            .unwrap();

        assert_eq!(out.electricity, 1);
    }

    #[tokio::test]
    async fn skips_meter_reminder_without_optin() {
        let service = Service::in_memory();
        let db = service.database();
        let owner_id = owner::Id::new();

        let mut calculated = fixture::tenant(owner_id);
        calculated.electricity = Some(fixture::electricity());
        calculated.billing.day = tenant::BillingDay::new(28).unwrap();
        db.execute(Insert(calculated.clone())).await.unwrap();
        let mut calculated_rent = fixture::rent(&calculated, 3, 2024);
        if let Some(e) = calculated_rent.electricity.as_mut() {
            e.calculated = true;
        }
        db.execute(Insert(calculated_rent)).await.unwrap();

        let mut opted_out = fixture::tenant(owner_id);
        opted_out.electricity = Some(fixture::electricity());
        opted_out.billing.day = tenant::BillingDay::new(28).unwrap();
        db.execute(Insert(opted_out.clone())).await.unwrap();
        let opted_out_rent = fixture::rent(&opted_out, 3, 2024);
        db.execute(Insert(opted_out_rent)).await.unwrap();
        // The rule flips after the `Rent` got issued.
        opted_out.electricity = Some(tenant::Electricity {
            notify_before_billing: false,
            ..fixture::electricity()
        });
        db.execute(Insert(opted_out.clone())).await.unwrap();

        let mut unreachable = fixture::tenant(owner_id);
        unreachable.electricity = Some(fixture::electricity());
        unreachable.billing.day = tenant::BillingDay::new(28).unwrap();
        unreachable.email = None;
        db.execute(Insert(unreachable.clone())).await.unwrap();
        let unreachable_rent = fixture::rent(&unreachable, 3, 2024);
        db.execute(Insert(unreachable_rent)).await.unwrap();

        // Not due soon enough on the 10th, opted out on the 27th.
        for day in [10, 27] {
            let out = service
                .execute(SendReminders {
                    today: fixture::date(2024, 3, day),
                })
                .await
                .unwrap();
            assert_eq!(out.electricity, 0, "on 2024-03-{day}");
        }
        assert!(service.notifier().sent().is_empty());
    }

    #[tokio::test]
    async fn isolates_delivery_failures() {
        let service = Service::in_memory();
        let db = service.database();
        let owner_id = owner::Id::new();
        let mut failing = fixture::tenant(owner_id);
        failing.email =
            Some(tenant::Email::new("failing@example.com").unwrap());
        let mut fine = fixture::tenant(owner_id);
        fine.email = Some(tenant::Email::new("fine@example.com").unwrap());
        db.execute(Insert(failing.clone())).await.unwrap();
        db.execute(Insert(fine.clone())).await.unwrap();
        service
            .notifier()
            .fail_for(tenant::Email::new("failing@example.com").unwrap());

        let out = service
            .execute(SendReminders {
                today: fixture::date(2025, 12, 2),
            })
            .await
            .unwrap();

        assert_eq!(out.agreement, 1);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].0, failing.id);

        let unflagged = db
            .execute(Select(By::<Option<Tenant>, _>::new(failing.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(!unflagged.expiry_reminder_sent);
        let flagged = db
            .execute(Select(By::<Option<Tenant>, _>::new(fine.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(flagged.expiry_reminder_sent);
    }
}
