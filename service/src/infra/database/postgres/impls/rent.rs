//! [`Rent`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::{owner, rent, tenant, Rent},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C, IDs> Database<Select<By<HashMap<rent::Id, Rent>, IDs>>> for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[rent::Id]>,
{
    type Ok = HashMap<rent::Id, Rent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<rent::Id, Rent>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[rent::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, owner_id, tenant_id, \
                   month, year, \
                   amount, amount_currency, \
                   previous_due, previous_due_currency, \
                   paid_amount, paid_amount_currency, \
                   due_next_month, due_next_month_currency, \
                   due_date, status, \
                   electricity_unit_cost, electricity_unit_cost_currency, \
                   electricity_units, \
                   electricity_amount, electricity_amount_currency, \
                   electricity_calculated, \
                   reminder_sent, paid_at, payment_method, \
                   created_at \
            FROM rents \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                (
                    id,
                    Rent {
                        id,
                        owner_id: row.get("owner_id"),
                        tenant_id: row.get("tenant_id"),
                        month: rent::Month::new(
                            u8::try_from(row.get::<_, i32>("month"))
                                .expect("`month` overflow"),
                        )
                        .expect("`month` is in `1..=12` range"),
                        year: u16::try_from(row.get::<_, i32>("year"))
                            .expect("`year` overflow"),
                        amount: Money {
                            amount: row.get("amount"),
                            currency: row.get("amount_currency"),
                        },
                        previous_due: Money {
                            amount: row.get("previous_due"),
                            currency: row.get("previous_due_currency"),
                        },
                        paid_amount: Money {
                            amount: row.get("paid_amount"),
                            currency: row.get("paid_amount_currency"),
                        },
                        due_next_month: Money {
                            amount: row.get("due_next_month"),
                            currency: row.get("due_next_month_currency"),
                        },
                        due_date: row.get("due_date"),
                        status: row.get("status"),
                        electricity: row
                            .get::<_, Option<_>>("electricity_unit_cost")
                            .map(|amount| rent::Electricity {
                                unit_cost: Money {
                                    amount,
                                    currency: row.get(
                                        "electricity_unit_cost_currency",
                                    ),
                                },
                                units_consumed: row.get("electricity_units"),
                                amount: Money {
                                    amount: row.get("electricity_amount"),
                                    currency: row
                                        .get("electricity_amount_currency"),
                                },
                                calculated: row.get("electricity_calculated"),
                            }),
                        reminder_sent: row.get("reminder_sent"),
                        paid_at: row.get("paid_at"),
                        payment_method: row.get("payment_method"),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Rent>, rent::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<rent::Id, Rent>, [rent::Id; 1]>>,
        Ok = HashMap<rent::Id, Rent>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Rent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Rent>, rent::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Option<Rent>, read::rent::TenantPeriod>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Rent>, rent::Id>>,
        Ok = Option<Rent>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Rent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Rent>, read::rent::TenantPeriod>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sel = by.into_inner();
        let month = i32::from(sel.period.month.u8());
        let year = i32::from(sel.period.year);

        const SQL: &str = "\
            SELECT id \
            FROM rents \
            WHERE tenant_id = $1::UUID \
              AND month = $2::INT4 \
              AND year = $3::INT4 \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&sel.tenant_id, &month, &year])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let rent_id = row.get::<_, rent::Id>("id");
        self.execute(Select(By::new(rent_id)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Rent>, tenant::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<rent::Id, Rent>, Vec<rent::Id>>>,
        Ok = HashMap<rent::Id, Rent>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Rent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rent>, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM rents \
            WHERE tenant_id = $1::UUID";
        let ids = self
            .query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<rent::Id>>();
        Ok(self
            .execute(Select(By::new(ids)))
            .await
            .map_err(tracerr::wrap!())?
            .into_values()
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Rent>, read::rent::Period>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<rent::Id, Rent>, Vec<rent::Id>>>,
        Ok = HashMap<rent::Id, Rent>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Rent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rent>, read::rent::Period>>,
    ) -> Result<Self::Ok, Self::Err> {
        let period = by.into_inner();
        let month = i32::from(period.month.u8());
        let year = i32::from(period.year);

        const SQL: &str = "\
            SELECT id \
            FROM rents \
            WHERE month = $1::INT4 \
              AND year = $2::INT4";
        let ids = self
            .query(SQL, &[&month, &year])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<rent::Id>>();
        Ok(self
            .execute(Select(By::new(ids)))
            .await
            .map_err(tracerr::wrap!())?
            .into_values()
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Rent>, read::rent::Unpaid>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<rent::Id, Rent>, Vec<rent::Id>>>,
        Ok = HashMap<rent::Id, Rent>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Rent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rent>, read::rent::Unpaid>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sel = by.into_inner();
        let pending = rent::Status::Pending;
        let overdue = rent::Status::Overdue;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&pending, &overdue];

        let owner_idx = sel.owner.as_ref().map(|o| {
            ps.push(o);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM rents \
             WHERE status IN ($1::INT2, $2::INT2) \
                   {owner_filtering}",
            owner_filtering =
                owner_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND owner_id = ${idx}::UUID"))
                }),
        );
        let ids = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<rent::Id>>();
        Ok(self
            .execute(Select(By::new(ids)))
            .await
            .map_err(tracerr::wrap!())?
            .into_values()
            .collect())
    }
}

impl<C> Database<Insert<Rent>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Rent>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(rent): Insert<Rent>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(rent)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Rent>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(rent): Update<Rent>,
    ) -> Result<Self::Ok, Self::Err> {
        let Rent {
            id,
            owner_id,
            tenant_id,
            month,
            year,
            amount,
            previous_due,
            paid_amount,
            due_next_month,
            due_date,
            status,
            electricity,
            reminder_sent,
            paid_at,
            payment_method,
            created_at,
        } = rent;

        let month = i32::from(month.u8());
        let year = i32::from(year);
        let electricity_unit_cost = electricity.map(|e| e.unit_cost.amount);
        let electricity_unit_cost_currency =
            electricity.map(|e| e.unit_cost.currency);
        let electricity_units = electricity.and_then(|e| e.units_consumed);
        let electricity_amount = electricity.map(|e| e.amount.amount);
        let electricity_amount_currency =
            electricity.map(|e| e.amount.currency);
        let electricity_calculated = electricity.map(|e| e.calculated);

        const SQL: &str = "\
            INSERT INTO rents (\
                id, owner_id, tenant_id, \
                month, year, \
                amount, amount_currency, \
                previous_due, previous_due_currency, \
                paid_amount, paid_amount_currency, \
                due_next_month, due_next_month_currency, \
                due_date, status, \
                electricity_unit_cost, electricity_unit_cost_currency, \
                electricity_units, \
                electricity_amount, electricity_amount_currency, \
                electricity_calculated, \
                reminder_sent, paid_at, payment_method, \
                created_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::INT4, $5::INT4, \
                $6::NUMERIC, $7::INT2, \
                $8::NUMERIC, $9::INT2, \
                $10::NUMERIC, $11::INT2, \
                $12::NUMERIC, $13::INT2, \
                $14::TIMESTAMPTZ, $15::INT2, \
                $16::NUMERIC, $17::INT2, \
                $18::NUMERIC, \
                $19::NUMERIC, $20::INT2, \
                $21::BOOLEAN, \
                $22::BOOLEAN, $23::TIMESTAMPTZ, $24::INT2, \
                $25::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET owner_id = EXCLUDED.owner_id, \
                tenant_id = EXCLUDED.tenant_id, \
                month = EXCLUDED.month, \
                year = EXCLUDED.year, \
                amount = EXCLUDED.amount, \
                amount_currency = EXCLUDED.amount_currency, \
                previous_due = EXCLUDED.previous_due, \
                previous_due_currency = EXCLUDED.previous_due_currency, \
                paid_amount = EXCLUDED.paid_amount, \
                paid_amount_currency = EXCLUDED.paid_amount_currency, \
                due_next_month = EXCLUDED.due_next_month, \
                due_next_month_currency = EXCLUDED.due_next_month_currency, \
                due_date = EXCLUDED.due_date, \
                status = EXCLUDED.status, \
                electricity_unit_cost = EXCLUDED.electricity_unit_cost, \
                electricity_unit_cost_currency = \
                    EXCLUDED.electricity_unit_cost_currency, \
                electricity_units = EXCLUDED.electricity_units, \
                electricity_amount = EXCLUDED.electricity_amount, \
                electricity_amount_currency = \
                    EXCLUDED.electricity_amount_currency, \
                electricity_calculated = EXCLUDED.electricity_calculated, \
                reminder_sent = EXCLUDED.reminder_sent, \
                paid_at = EXCLUDED.paid_at, \
                payment_method = EXCLUDED.payment_method, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &tenant_id,
                &month,
                &year,
                &amount.amount,
                &amount.currency,
                &previous_due.amount,
                &previous_due.currency,
                &paid_amount.amount,
                &paid_amount.currency,
                &due_next_month.amount,
                &due_next_month.currency,
                &due_date,
                &status,
                &electricity_unit_cost,
                &electricity_unit_cost_currency,
                &electricity_units,
                &electricity_amount,
                &electricity_amount_currency,
                &electricity_calculated,
                &reminder_sent,
                &paid_at,
                &payment_method,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Rent, rent::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Rent, rent::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM rents \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Rent, tenant::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Rent, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let tenant_id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM rents \
            WHERE tenant_id = $1::UUID";
        self.exec(SQL, &[&tenant_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Rent, rent::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Rent, rent::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: rent::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO rents_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<Select<By<read::rent::list::Page, read::rent::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::rent::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::rent::list::Page, read::rent::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rent::list::Selector {
            arguments,
            filter:
                read::rent::list::Filter {
                    owner,
                    tenant,
                    period,
                    status,
                },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &owner];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let tenant_idx = tenant.as_ref().map(|t| {
            ps.push(t);
            ps.len()
        });

        let month = period.map(|p| i32::from(p.month.u8()));
        let month_idx = month.as_ref().map(|m| {
            ps.push(m);
            ps.len()
        });
        let year = period.map(|p| i32::from(p.year));
        let year_idx = year.as_ref().map(|y| {
            ps.push(y);
            ps.len()
        });

        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM rents \
             WHERE owner_id = $2::UUID \
                   {cursor} \
                   {tenant_filtering} \
                   {period_filtering} \
                   {status_filtering} \
             ORDER BY due_date {order}, id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!(
                    "AND (due_date, id) {op} \
                     (SELECT due_date, id FROM rents \
                      WHERE id = ${idx}::UUID)"
                ))
            }),
            order = arguments.kind().order().sql(),
            tenant_filtering =
                tenant_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND tenant_id = ${idx}::UUID"))
                }),
            period_filtering = month_idx
                .zip(year_idx)
                .into_iter()
                .format_with("", |(month, year), f| {
                    f(&format_args!(
                        "AND month = ${month}::INT4 AND year = ${year}::INT4"
                    ))
                }),
            status_filtering =
                status_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND status = ${idx}::INT2"))
                }),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id = row.get("id");
                (id, id)
            })
            .collect::<Vec<_>>();

        Ok(read::rent::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::rent::list::TotalCount, owner::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::rent::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::rent::list::TotalCount, owner::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();

        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM rents \
            WHERE owner_id = $1::UUID";
        self.query_opt(SQL, &[&owner])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}
