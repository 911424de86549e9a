//! [`Tenant`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::{owner, tenant, Tenant},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read,
};

impl<C, IDs> Database<Select<By<HashMap<tenant::Id, Tenant>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[tenant::Id]>,
{
    type Ok = HashMap<tenant::Id, Tenant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<tenant::Id, Tenant>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[tenant::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, owner_id, name, \
                   email, phone, whatsapp, address, \
                   photo_url, photo_public_id, \
                   agreement_file_url, agreement_file_public_id, \
                   monthly_rent, monthly_rent_currency, \
                   advance, advance_currency, \
                   billing_day, grace_period, \
                   increase_percent, increase_after, increase_cycle, \
                   electricity_unit_cost, electricity_unit_cost_currency, \
                   electricity_notify_before_billing, \
                   agreement_start, tenure_years, tenure_months, tenure_days, \
                   notify_before_agreement_end, expiry_reminder_sent, \
                   created_at \
            FROM tenants \
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
                    Tenant {
                        id,
                        owner_id: row.get("owner_id"),
                        name: row.get("name"),
                        email: row.get("email"),
                        phone: row.get("phone"),
                        whatsapp: row.get("whatsapp"),
                        address: row.get("address"),
                        photo: row.get::<_, Option<_>>("photo_url").map(
                            |url| tenant::Media {
                                url,
                                public_id: row.get("photo_public_id"),
                            },
                        ),
                        agreement_file: row
                            .get::<_, Option<_>>("agreement_file_url")
                            .map(|url| tenant::Media {
                                url,
                                public_id: row.get("agreement_file_public_id"),
                            }),
                        billing: tenant::Billing {
                            monthly_rent: Money {
                                amount: row.get("monthly_rent"),
                                currency: row.get("monthly_rent_currency"),
                            },
                            advance: Money {
                                amount: row.get("advance"),
                                currency: row.get("advance_currency"),
                            },
                            day: tenant::BillingDay::new(
                                u8::try_from(row.get::<_, i32>("billing_day"))
                                    .expect("`billing_day` overflow"),
                            )
                            .expect("`billing_day` is in `1..=28` range"),
                            grace_period: u16::try_from(
                                row.get::<_, i32>("grace_period"),
                            )
                            .expect("`grace_period` overflow"),
                        },
                        increase: row
                            .get::<_, Option<_>>("increase_percent")
                            .map(|percentage| tenant::Increase {
                                percentage,
                                after: tenant::EffectiveAfter::new(
                                    u16::try_from(
                                        row.get::<_, i32>("increase_after"),
                                    )
                                    .expect("`increase_after` overflow"),
                                )
                                .expect("`increase_after` is positive"),
                                cycle: row.get("increase_cycle"),
                            }),
                        electricity: row
                            .get::<_, Option<_>>("electricity_unit_cost")
                            .map(|amount| tenant::Electricity {
                                unit_cost: Money {
                                    amount,
                                    currency: row.get(
                                        "electricity_unit_cost_currency",
                                    ),
                                },
                                notify_before_billing: row
                                    .get("electricity_notify_before_billing"),
                            }),
                        agreement: tenant::Agreement {
                            start: row.get("agreement_start"),
                            tenure: tenant::Tenure {
                                years: u16::try_from(
                                    row.get::<_, i32>("tenure_years"),
                                )
                                .expect("`tenure_years` overflow"),
                                months: u16::try_from(
                                    row.get::<_, i32>("tenure_months"),
                                )
                                .expect("`tenure_months` overflow"),
                                days: u16::try_from(
                                    row.get::<_, i32>("tenure_days"),
                                )
                                .expect("`tenure_days` overflow"),
                            },
                        },
                        notify_before_agreement_end: row
                            .get("notify_before_agreement_end"),
                        expiry_reminder_sent: row.get("expiry_reminder_sent"),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Tenant>, tenant::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<tenant::Id, Tenant>, [tenant::Id; 1]>>,
        Ok = HashMap<tenant::Id, Tenant>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Tenant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Tenant>, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Tenant>, ()>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<tenant::Id, Tenant>, Vec<tenant::Id>>>,
        Ok = HashMap<tenant::Id, Tenant>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Tenant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Tenant>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id \
            FROM tenants";
        let ids = self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<tenant::Id>>();
        Ok(self
            .execute(Select(By::new(ids)))
            .await
            .map_err(tracerr::wrap!())?
            .into_values()
            .collect())
    }
}

impl<C> Database<Insert<Tenant>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Tenant>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(tenant): Insert<Tenant>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(tenant)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Tenant>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(tenant): Update<Tenant>,
    ) -> Result<Self::Ok, Self::Err> {
        let Tenant {
            id,
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
            expiry_reminder_sent,
            created_at,
        } = tenant;

        let (photo_url, photo_public_id) =
            photo.map(|m| (m.url, m.public_id)).unzip();
        let (agreement_file_url, agreement_file_public_id) =
            agreement_file.map(|m| (m.url, m.public_id)).unzip();
        let billing_day = i32::from(billing.day.u8());
        let grace_period = i32::from(billing.grace_period);
        let increase_percent = increase.map(|i| i.percentage);
        let increase_after = increase.map(|i| i32::from(i.after.u16()));
        let increase_cycle = increase.map(|i| i.cycle);
        let electricity_unit_cost = electricity.map(|e| e.unit_cost.amount);
        let electricity_unit_cost_currency =
            electricity.map(|e| e.unit_cost.currency);
        let electricity_notify_before_billing =
            electricity.map(|e| e.notify_before_billing);
        let tenure_years = i32::from(agreement.tenure.years);
        let tenure_months = i32::from(agreement.tenure.months);
        let tenure_days = i32::from(agreement.tenure.days);

        const SQL: &str = "\
            INSERT INTO tenants (\
                id, owner_id, name, \
                email, phone, whatsapp, address, \
                photo_url, photo_public_id, \
                agreement_file_url, agreement_file_public_id, \
                monthly_rent, monthly_rent_currency, \
                advance, advance_currency, \
                billing_day, grace_period, \
                increase_percent, increase_after, increase_cycle, \
                electricity_unit_cost, electricity_unit_cost_currency, \
                electricity_notify_before_billing, \
                agreement_start, tenure_years, tenure_months, tenure_days, \
                notify_before_agreement_end, expiry_reminder_sent, \
                created_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, \
                $4::VARCHAR, $5::VARCHAR, $6::VARCHAR, $7::VARCHAR, \
                $8::VARCHAR, $9::VARCHAR, \
                $10::VARCHAR, $11::VARCHAR, \
                $12::NUMERIC, $13::INT2, \
                $14::NUMERIC, $15::INT2, \
                $16::INT4, $17::INT4, \
                $18::NUMERIC, $19::INT4, $20::INT2, \
                $21::NUMERIC, $22::INT2, \
                $23::BOOLEAN, \
                $24::TIMESTAMPTZ, $25::INT4, $26::INT4, $27::INT4, \
                $28::BOOLEAN, $29::BOOLEAN, \
                $30::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET owner_id = EXCLUDED.owner_id, \
                name = EXCLUDED.name, \
                email = EXCLUDED.email, \
                phone = EXCLUDED.phone, \
                whatsapp = EXCLUDED.whatsapp, \
                address = EXCLUDED.address, \
                photo_url = EXCLUDED.photo_url, \
                photo_public_id = EXCLUDED.photo_public_id, \
                agreement_file_url = EXCLUDED.agreement_file_url, \
                agreement_file_public_id = \
                    EXCLUDED.agreement_file_public_id, \
                monthly_rent = EXCLUDED.monthly_rent, \
                monthly_rent_currency = EXCLUDED.monthly_rent_currency, \
                advance = EXCLUDED.advance, \
                advance_currency = EXCLUDED.advance_currency, \
                billing_day = EXCLUDED.billing_day, \
                grace_period = EXCLUDED.grace_period, \
                increase_percent = EXCLUDED.increase_percent, \
                increase_after = EXCLUDED.increase_after, \
                increase_cycle = EXCLUDED.increase_cycle, \
                electricity_unit_cost = EXCLUDED.electricity_unit_cost, \
                electricity_unit_cost_currency = \
                    EXCLUDED.electricity_unit_cost_currency, \
                electricity_notify_before_billing = \
                    EXCLUDED.electricity_notify_before_billing, \
                agreement_start = EXCLUDED.agreement_start, \
                tenure_years = EXCLUDED.tenure_years, \
                tenure_months = EXCLUDED.tenure_months, \
                tenure_days = EXCLUDED.tenure_days, \
                notify_before_agreement_end = \
                    EXCLUDED.notify_before_agreement_end, \
                expiry_reminder_sent = EXCLUDED.expiry_reminder_sent, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &name,
                &email,
                &phone,
                &whatsapp,
                &address,
                &photo_url,
                &photo_public_id,
                &agreement_file_url,
                &agreement_file_public_id,
                &billing.monthly_rent.amount,
                &billing.monthly_rent.currency,
                &billing.advance.amount,
                &billing.advance.currency,
                &billing_day,
                &grace_period,
                &increase_percent,
                &increase_after,
                &increase_cycle,
                &electricity_unit_cost,
                &electricity_unit_cost_currency,
                &electricity_notify_before_billing,
                &agreement.start,
                &tenure_years,
                &tenure_months,
                &tenure_days,
                &notify_before_agreement_end,
                &expiry_reminder_sent,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Tenant, tenant::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Tenant, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM tenants \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Tenant, tenant::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Tenant, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: tenant::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO tenants_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<Select<By<read::tenant::list::Page, read::tenant::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::tenant::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::tenant::list::Page, read::tenant::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::tenant::list::Selector {
            arguments,
            filter: read::tenant::list::Filter { owner, name },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &owner];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let name_idx = name.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });

        let name_pattern = name.as_ref().map(|n| FuzzPattern::new(n.as_ref()));
        let name_pattern_idx = name_pattern.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM tenants \
             WHERE owner_id = $2::UUID \
                   {cursor} \
                   {name_filtering} \
             ORDER BY {name_ordering} \
                      id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = arguments.kind().order().sql(),
            name_filtering =
                name_pattern_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "AND LOWER(name) SIMILAR TO LOWER(${idx}::VARCHAR)"
                    ))
                }),
            name_ordering = name_idx.into_iter().format_with("", |idx, f| {
                let order = arguments.kind().order().sql();
                f(&format_args!(
                    "LEVENSHTEIN(name, ${idx}::VARCHAR, 1, 1, 0) {order},"
                ))
            })
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

        Ok(read::tenant::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::tenant::list::TotalCount, owner::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::tenant::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::tenant::list::TotalCount, owner::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();

        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM tenants \
            WHERE owner_id = $1::UUID";
        self.query_opt(SQL, &[&owner])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}
