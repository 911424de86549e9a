//! [`Command`] for applying a payment towards a [`Rent`].

use common::{
    money::Currency,
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

/// [`Command`] for applying a partial (or final) payment towards a
/// [`Rent`].
///
/// Payments accumulate: once the whole payable amount is covered, the
/// [`Rent`] turns [`Paid`], otherwise it stays [`Partial`] with the
/// remainder exposed as [`due_next_month`]. A payment overshooting the
/// payable amount is rejected without any effect.
///
/// [`Paid`]: rent::Status::Paid
/// [`Partial`]: rent::Status::Partial
/// [`due_next_month`]: Rent::due_next_month
#[derive(Clone, Copy, Debug)]
pub struct PayRent {
    /// ID of the [`Rent`] to pay towards.
    pub rent_id: rent::Id,

    /// ID of the [`owner`] receiving the payment.
    pub owner_id: owner::Id,

    /// Paid amount.
    pub amount: Money,

    /// [`PaymentMethod`] the payment was made with.
    ///
    /// [`PaymentMethod`]: rent::PaymentMethod
    pub method: rent::PaymentMethod,
}

impl<Db, Nt> Command<PayRent> for Service<Db, Nt>
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

    async fn execute(&self, cmd: PayRent) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PayRent {
            rent_id,
            owner_id,
            amount,
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
        if amount.amount <= Decimal::ZERO {
            return Err(tracerr::new!(E::InvalidAmount(amount.amount)));
        }
        if amount.currency != rent.amount.currency {
            return Err(tracerr::new!(E::CurrencyMismatch(
                rent.amount.currency,
            )));
        }
        if rent.paid_amount.amount + amount.amount > rent.amount.amount {
            return Err(tracerr::new!(E::ExceedsPayable(rent_id)));
        }

        rent.paid_amount.amount += amount.amount;
        rent.payment_method = Some(method);
        let due = rent.amount.amount - rent.paid_amount.amount;
        if due > Decimal::ZERO {
            rent.status = rent::Status::Partial;
            rent.due_next_month = Money {
                amount: due,
                currency: rent.amount.currency,
            };
        } else {
            rent.status = rent::Status::Paid;
            rent.due_next_month = Money {
                amount: Decimal::ZERO,
                currency: rent.amount.currency,
            };
            rent.paid_at = Some(DateTime::now().coerce());
        }

        tx.execute(Update(rent.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(rent)
    }
}

/// Error of [`PayRent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Rent`] is already settled.
    #[display("`Rent(id: {_0})` is already settled")]
    #[from(ignore)]
    AlreadySettled(#[error(not(source))] rent::Id),

    /// Payment is made in a wrong [`Currency`].
    #[display("`Money` currency mismatch, `{_0}` expected")]
    #[from(ignore)]
    CurrencyMismatch(#[error(not(source))] Currency),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Payment overshoots the payable amount.
    #[display("`Rent(id: {_0})` would be overpaid")]
    #[from(ignore)]
    ExceedsPayable(#[error(not(source))] rent::Id),

    /// Payment amount is not positive.
    #[display("`{_0}` is not a valid payment amount")]
    #[from(ignore)]
    InvalidAmount(#[error(not(source))] Decimal),

    /// [`Rent`] with the provided ID does not exist.
    #[display("`Rent(id: {_0})` does not exist")]
    #[from(ignore)]
    RentNotExists(#[error(not(source))] rent::Id),
}
