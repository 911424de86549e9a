//! [`Command`] for recording the meter reading of a [`Rent`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{owner, rent, Rent},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording the electricity meter reading of a [`Rent`].
///
/// The billed amount, the consumed [`Units`] multiplied by the snapshotted
/// unit cost, folds into the payable [`Rent::amount`] exactly once. Repeated
/// readings are rejected, and so are readings of [`Rent`]s issued without
/// electricity billing.
///
/// [`Units`]: rent::Units
#[derive(Clone, Copy, Debug)]
pub struct RecordMeterReading {
    /// ID of the [`Rent`] to record the reading of.
    pub rent_id: rent::Id,

    /// ID of the [`owner`] recording the reading.
    pub owner_id: owner::Id,

    /// Consumed [`Units`] read from the meter.
    ///
    /// [`Units`]: rent::Units
    pub units: rent::Units,
}

impl<Db, Nt> Command<RecordMeterReading> for Service<Db, Nt>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Rent, rent::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Rent>, rent::Id>>,
            Ok = Option<Rent>,
            Err = Traced<database::Error>,
        > + Database<Update<Rent>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Rent;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RecordMeterReading,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordMeterReading {
            rent_id,
            owner_id,
            units,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent readings upon the same `Rent`.
        tx.execute(Lock(By::new(rent_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut rent = tx
            .execute(Select(By::new(rent_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|r| r.owner_id == owner_id)
            .ok_or(E::RentNotExists(rent_id))
            .map_err(tracerr::wrap!())?;

        let Some(mut electricity) = rent.electricity else {
            return Err(tracerr::new!(E::ElectricityNotEnabled(rent_id)));
        };
        if electricity.calculated {
            return Err(tracerr::new!(E::AlreadyCalculated(rent_id)));
        }

        electricity.units_consumed = Some(units);
        electricity.amount = Money {
            amount: units.into_inner() * electricity.unit_cost.amount,
            currency: electricity.unit_cost.currency,
        };
        electricity.calculated = true;
        rent.amount.amount += electricity.amount.amount;
        rent.electricity = Some(electricity);

        tx.execute(Update(rent.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(rent)
    }
}

/// Error of [`RecordMeterReading`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Rent`]'s electricity amount is already calculated.
    #[display("`Rent(id: {_0})` has its electricity calculated already")]
    #[from(ignore)]
    AlreadyCalculated(#[error(not(source))] rent::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Rent`] was issued without electricity billing.
    #[display("`Rent(id: {_0})` has no electricity billing")]
    #[from(ignore)]
    ElectricityNotEnabled(#[error(not(source))] rent::Id),

    /// [`Rent`] with the provided ID does not exist.
    #[display("`Rent(id: {_0})` does not exist")]
    #[from(ignore)]
    RentNotExists(#[error(not(source))] rent::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::fixture;

    use super::*;

    fn units(units: &str) -> rent::Units {
        rent::Units::new(units.parse().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn folds_reading_into_amount() {
        let service = Service::in_memory();
        let db = service.database();
        let mut tenant = fixture::tenant(owner::Id::new());
        tenant.electricity = Some(fixture::electricity());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let rent = fixture::rent(&tenant, 3, 2024);
        db.execute(Insert(rent.clone())).await.unwrap();

        let billed = service
            .execute(RecordMeterReading {
                rent_id: rent.id,
                owner_id: tenant.owner_id,
                units: units("100"),
            })
            .await
            .unwrap();

        assert_eq!(billed.amount, fixture::inr("10800"));
        let electricity = billed.electricity.unwrap();
        assert_eq!(electricity.units_consumed, Some(units("100")));
        assert_eq!(electricity.amount, fixture::inr("800"));
        assert!(electricity.calculated);

        let stored = db
            .execute(Select(By::<Option<Rent>, _>::new(rent.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.amount, fixture::inr("10800"));
    }

    #[tokio::test]
    async fn rejects_second_reading() {
        let service = Service::in_memory();
        let db = service.database();
        let mut tenant = fixture::tenant(owner::Id::new());
        tenant.electricity = Some(fixture::electricity());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let rent = fixture::rent(&tenant, 3, 2024);
        db.execute(Insert(rent.clone())).await.unwrap();

        let reading = RecordMeterReading {
            rent_id: rent.id,
            owner_id: tenant.owner_id,
            units: units("100"),
        };
        let billed = service.execute(reading).await.unwrap();
        assert_eq!(billed.amount, fixture::inr("10800"));

        let err = service.execute(reading).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AlreadyCalculated(_),
        ));

        let stored = db
            .execute(Select(By::<Option<Rent>, _>::new(rent.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.amount, fixture::inr("10800"));
    }

    #[tokio::test]
    async fn rejects_without_electricity_billing() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let rent = fixture::rent(&tenant, 3, 2024);
        db.execute(Insert(rent.clone())).await.unwrap();

        let err = service
            .execute(RecordMeterReading {
                rent_id: rent.id,
                owner_id: tenant.owner_id,
                units: units("100"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ElectricityNotEnabled(_),
        ));
    }

    #[tokio::test]
    async fn rejects_foreign_owner() {
        let service = Service::in_memory();
        let db = service.database();
        let mut tenant = fixture::tenant(owner::Id::new());
        tenant.electricity = Some(fixture::electricity());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let rent = fixture::rent(&tenant, 3, 2024);
        db.execute(Insert(rent.clone())).await.unwrap();

        let err = service
            .execute(RecordMeterReading {
                rent_id: rent.id,
                owner_id: owner::Id::new(),
                units: units("100"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::RentNotExists(_)));
    }
}
