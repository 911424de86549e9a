//! [`Command`] for settling a [`Rent`] in full.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{owner, rent, Rent},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for settling a [`Rent`] in full.
///
/// The whole payable amount is reconciled at once: the [`Rent`] turns
/// [`Paid`] with nothing left to carry into the next billing period.
///
/// [`Paid`]: rent::Status::Paid
#[derive(Clone, Copy, Debug)]
pub struct SettleRent {
    /// ID of the [`Rent`] to be settled.
    pub rent_id: rent::Id,

    /// ID of the [`owner`] settling the [`Rent`].
    pub owner_id: owner::Id,

    /// [`PaymentMethod`] the settlement was made with.
    ///
    /// [`PaymentMethod`]: rent::PaymentMethod
    pub method: rent::PaymentMethod,
}

impl<Db, Nt> Command<SettleRent> for Service<Db, Nt>
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

    async fn execute(&self, cmd: SettleRent) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SettleRent {
            rent_id,
            owner_id,
            method,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent payments upon the same `Rent`.
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

        if rent.status == rent::Status::Paid {
            return Err(tracerr::new!(E::AlreadySettled(rent_id)));
        }

        rent.paid_amount = rent.amount;
        rent.due_next_month = Money {
            amount: Decimal::ZERO,
            currency: rent.amount.currency,
        };
        rent.status = rent::Status::Paid;
        rent.paid_at = Some(DateTime::now().coerce());
        rent.payment_method = Some(method);

        tx.execute(Update(rent.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(rent)
    }
}

/// Error of [`SettleRent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Rent`] is already settled.
    #[display("`Rent(id: {_0})` is already settled")]
    #[from(ignore)]
    AlreadySettled(#[error(not(source))] rent::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

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

    #[tokio::test]
    async fn settles_in_full() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let rent = fixture::rent(&tenant, 3, 2024);
        db.execute(Insert(rent.clone())).await.unwrap();

        let settled = service
            .execute(SettleRent {
                rent_id: rent.id,
                owner_id: tenant.owner_id,
                method: rent::PaymentMethod::Upi,
            })
            .await
            .unwrap();

        assert_eq!(settled.status, rent::Status::Paid);
        assert_eq!(settled.paid_amount, fixture::inr("10000"));
        assert_eq!(settled.due_next_month, fixture::inr("0"));
        assert!(settled.paid_at.is_some());
        assert_eq!(settled.payment_method, Some(rent::PaymentMethod::Upi));

        let stored = db
            .execute(Select(By::<Option<Rent>, _>::new(rent.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, rent::Status::Paid);
    }

    #[tokio::test]
    async fn settles_partially_paid_record() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let mut rent = fixture::rent(&tenant, 3, 2024);
        rent.paid_amount = fixture::inr("6000");
        rent.due_next_month = fixture::inr("4000");
        rent.status = rent::Status::Partial;
        db.execute(Insert(rent.clone())).await.unwrap();

        let settled = service
            .execute(SettleRent {
                rent_id: rent.id,
                owner_id: tenant.owner_id,
                method: rent::PaymentMethod::Cash,
            })
            .await
            .unwrap();

        assert_eq!(settled.status, rent::Status::Paid);
        assert_eq!(settled.paid_amount, fixture::inr("10000"));
        assert_eq!(settled.due_next_month, fixture::inr("0"));
    }

    #[tokio::test]
    async fn rejects_already_settled() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let mut rent = fixture::rent(&tenant, 3, 2024);
        rent.status = rent::Status::Paid;
        db.execute(Insert(rent.clone())).await.unwrap();

        let err = service
            .execute(SettleRent {
                rent_id: rent.id,
                owner_id: tenant.owner_id,
                method: rent::PaymentMethod::Cash,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::AlreadySettled(_)));
    }

    #[tokio::test]
    async fn rejects_unknown_rent() {
        let service = Service::in_memory();

        let err = service
            .execute(SettleRent {
                rent_id: rent::Id::new(),
                owner_id: owner::Id::new(),
                method: rent::PaymentMethod::Cash,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::RentNotExists(_)));
    }

    #[tokio::test]
    async fn rejects_foreign_owner() {
        let service = Service::in_memory();
        let db = service.database();
        let tenant = fixture::tenant(owner::Id::new());
        db.execute(Insert(tenant.clone())).await.unwrap();
        let rent = fixture::rent(&tenant, 3, 2024);
        db.execute(Insert(rent.clone())).await.unwrap();

        let err = service
            .execute(SettleRent {
                rent_id: rent.id,
                owner_id: owner::Id::new(),
                method: rent::PaymentMethod::Cash,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::RentNotExists(_)));
    }
}
