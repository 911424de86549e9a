//! [`Rent`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{owner, tenant, Tenant};

/// Monthly rent record of a [`Tenant`].
#[derive(Clone, Debug)]
pub struct Rent {
    /// ID of this [`Rent`].
    pub id: Id,

    /// ID of the [`owner`] this [`Rent`] is payable to.
    pub owner_id: owner::Id,

    /// ID of the [`Tenant`] this [`Rent`] is billed to.
    pub tenant_id: tenant::Id,

    /// [`Month`] this [`Rent`] is billed for.
    pub month: Month,

    /// [`Year`] this [`Rent`] is billed for.
    pub year: Year,

    /// Total payable amount of this [`Rent`].
    ///
    /// Includes the [`previous_due`] carry and, once calculated, the
    /// [`Electricity::amount`].
    ///
    /// [`previous_due`]: Rent::previous_due
    pub amount: Money,

    /// Unpaid remainder carried over from the previous billing period.
    pub previous_due: Money,

    /// Cumulative amount paid towards this [`Rent`] so far.
    ///
    /// Never exceeds [`Rent::amount`].
    pub paid_amount: Money,

    /// Remainder to be carried into the next billing period.
    ///
    /// Non-zero only while this [`Rent`] is partially paid.
    pub due_next_month: Money,

    /// [`DateTime`] this [`Rent`] is due on, midnight UTC of the tenant's
    /// billing day.
    pub due_date: DueDateTime,

    /// Payment [`Status`] of this [`Rent`].
    pub status: Status,

    /// [`Electricity`] billing state of this [`Rent`].
    ///
    /// Absent when electricity was not billed to the [`Tenant`] at issue
    /// time.
    pub electricity: Option<Electricity>,

    /// Indicator whether the meter reading reminder has been sent already.
    ///
    /// Pre-suppressed at issue time for tenants not wanting the reminder.
    pub reminder_sent: bool,

    /// [`DateTime`] when this [`Rent`] was fully settled, if it was.
    pub paid_at: Option<PaymentDateTime>,

    /// [`PaymentMethod`] the last payment was made with, if any.
    pub payment_method: Option<PaymentMethod>,

    /// [`DateTime`] when this [`Rent`] was issued.
    pub created_at: CreationDateTime,
}

impl Rent {
    /// Issues a new [`Rent`] of the provided [`Tenant`] for the specified
    /// billing period.
    ///
    /// The payable amount starts as the tenant's effective rent plus the
    /// provided `previous_due` carry, rounded to whole currency units with
    /// midpoints rounded away from zero. The meter reading reminder is
    /// pre-suppressed for tenants not wanting it.
    #[must_use]
    pub fn issue(
        tenant: &Tenant,
        month: Month,
        year: Year,
        previous_due: Money,
    ) -> Self {
        let effective = tenant.effective_rent(month, year);
        Self {
            id: Id::new(),
            owner_id: tenant.owner_id,
            tenant_id: tenant.id,
            month,
            year,
            amount: Money {
                amount: (effective.amount + previous_due.amount)
                    .round_dp_with_strategy(
                        0,
                        RoundingStrategy::MidpointAwayFromZero,
                    ),
                currency: effective.currency,
            },
            previous_due,
            paid_amount: Money {
                amount: Decimal::ZERO,
                currency: effective.currency,
            },
            due_next_month: Money {
                amount: Decimal::ZERO,
                currency: effective.currency,
            },
            due_date: tenant.billing.due_date(month, year),
            status: Status::Pending,
            electricity: tenant.electricity.map(Electricity::pending),
            reminder_sent: !tenant
                .electricity
                .is_some_and(|terms| terms.notify_before_billing),
            paid_at: None,
            payment_method: None,
            created_at: CreationDateTime::now(),
        }
    }

    /// Re-aligns this [`Rent`] with the provided [`Tenant`]'s current terms.
    ///
    /// The payable amount is recalculated from the effective rent and the
    /// stored [`previous_due`] carry, and the [`Electricity`] state is
    /// snapshotted anew. Payment progress ([`paid_amount`],
    /// [`due_next_month`], [`status`]) is left untouched.
    ///
    /// [`due_next_month`]: Rent::due_next_month
    /// [`paid_amount`]: Rent::paid_amount
    /// [`previous_due`]: Rent::previous_due
    /// [`status`]: Rent::status
    pub fn resync(&mut self, tenant: &Tenant) {
        let effective = tenant.effective_rent(self.month, self.year);
        self.amount = Money {
            amount: (effective.amount + self.previous_due.amount)
                .round_dp_with_strategy(
                    0,
                    RoundingStrategy::MidpointAwayFromZero,
                ),
            currency: effective.currency,
        };
        self.electricity = tenant.electricity.map(Electricity::pending);
        self.reminder_sent = !tenant
            .electricity
            .is_some_and(|terms| terms.notify_before_billing);
    }

    /// Returns the last calendar date (UTC) the provided grace period still
    /// covers this [`Rent`] on.
    #[must_use]
    pub fn grace_end(&self, grace_period: tenant::GraceDays) -> time::Date {
        self.due_date
            .date()
            .checked_add(time::Duration::days(i64::from(grace_period)))
            .unwrap_or(time::Date::MAX)
    }
}

/// ID of a [`Rent`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Month of a year a [`Rent`] is billed for, `1..=12`.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Month(u8);

impl Month {
    /// Creates a new [`Month`] if the given `month` fits `1..=12`.
    #[must_use]
    pub fn new(month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self(month))
    }

    /// Returns the [`u8`] representation of this [`Month`].
    #[must_use]
    pub const fn u8(self) -> u8 {
        self.0
    }

    /// Returns the billing period immediately preceding the provided one.
    #[must_use]
    pub fn previous(self, year: Year) -> (Self, Year) {
        if self.0 == 1 {
            (Self(12), year.saturating_sub(1))
        } else {
            (Self(self.0 - 1), year)
        }
    }
}

/// Year a [`Rent`] is billed for.
pub type Year = u16;

/// Billing period choice for the first [`Rent`] of a newly created
/// [`Tenant`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Target {
    /// Month the [`Tenant`] is created in.
    CurrentMonth,

    /// Month following the one the [`Tenant`] is created in.
    #[default]
    NextMonth,
}

impl Target {
    /// Resolves the billing period this [`Target`] points at, relative to
    /// the provided date.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn period(self, today: time::Date) -> (Month, Year) {
        let (month, year) = (u8::from(today.month()), today.year());
        let (month, year) = match self {
            Self::CurrentMonth => (month, year),
            Self::NextMonth if month == 12 => (1, year + 1),
            Self::NextMonth => (month + 1, year),
        };
        (
            Month::new(month).expect("in `1..=12` range"),
            Year::try_from(year).expect("fits `Year`"),
        )
    }
}

/// Non-negative number of consumed electricity units.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Units(Decimal);

impl Units {
    /// Creates a new [`Units`] if the given `units` is valid (non-negative).
    #[must_use]
    pub fn new(units: Decimal) -> Option<Self> {
        (units >= Decimal::ZERO).then_some(Self(units))
    }

    /// Returns the inner [`Decimal`] of this [`Units`].
    #[must_use]
    pub const fn into_inner(self) -> Decimal {
        self.0
    }
}

impl FromStr for Units {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Decimal>()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Units`")
    }
}

define_kind! {
    #[doc = "Payment status of a [`Rent`]."]
    enum Status {
        #[doc = "No payment received, due date (plus grace) not passed yet."]
        Pending = 1,

        #[doc = "Part of the payable amount received."]
        Partial = 2,

        #[doc = "No payment received and the grace period has passed."]
        Overdue = 3,

        #[doc = "Payable amount fully settled."]
        Paid = 4,
    }
}

define_kind! {
    #[doc = "Method a [`Rent`] payment was made with."]
    enum PaymentMethod {
        #[doc = "Cash payment."]
        Cash = 1,

        #[doc = "UPI transfer."]
        Upi = 2,

        #[doc = "Bank transfer."]
        BankTransfer = 3,

        #[doc = "Card payment."]
        Card = 4,

        #[doc = "Any other method."]
        Other = 5,
    }
}

/// Electricity billing state of a [`Rent`].
///
/// Snapshotted from the [`tenant::Electricity`] terms when the [`Rent`] is
/// issued, so later changes of the terms never affect already issued rents.
#[derive(Clone, Copy, Debug)]
pub struct Electricity {
    /// Price of a single consumed unit.
    pub unit_cost: Money,

    /// [`Units`] recorded from the meter, if recorded already.
    pub units_consumed: Option<Units>,

    /// Billed amount, the [`unit_cost`] multiplied by the consumed units.
    ///
    /// Zero until calculated.
    ///
    /// [`unit_cost`]: Electricity::unit_cost
    pub amount: Money,

    /// Indicator whether the billed amount has been calculated and folded
    /// into the [`Rent::amount`].
    pub calculated: bool,
}

impl Electricity {
    /// Creates a fresh, not yet calculated, [`Electricity`] snapshot of the
    /// provided [`tenant::Electricity`] terms.
    #[must_use]
    pub fn pending(terms: tenant::Electricity) -> Self {
        Self {
            unit_cost: terms.unit_cost,
            units_consumed: None,
            amount: Money {
                amount: Decimal::ZERO,
                currency: terms.unit_cost.currency,
            },
            calculated: false,
        }
    }
}

/// Marker type indicating a [`Rent`] due.
#[derive(Clone, Copy, Debug)]
pub struct Due;

/// Marker type indicating a [`Rent`] payment.
#[derive(Clone, Copy, Debug)]
pub struct Payment;

/// [`DateTime`] a [`Rent`] is due on.
pub type DueDateTime = DateTimeOf<(Rent, Due)>;

/// [`DateTime`] when a [`Rent`] was fully settled.
pub type PaymentDateTime = DateTimeOf<(Rent, Payment)>;

/// [`DateTime`] when a [`Rent`] was issued.
pub type CreationDateTime = DateTimeOf<(Rent, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, Percent};

    use super::*;

    fn date(year: i32, month: u8, day: u8) -> time::Date {
        time::Date::from_calendar_date(
            year,
            time::Month::try_from(month).unwrap(),
            day,
        )
        .unwrap()
    }

    fn inr(amount: &str) -> Money {
        Money {
            amount: amount.parse().unwrap(),
            currency: Currency::Inr,
        }
    }

    fn tenant(electricity: Option<tenant::Electricity>) -> Tenant {
        Tenant {
            id: tenant::Id::new(),
            owner_id: owner::Id::new(),
            name: tenant::Name::new("Ravi Kumar").unwrap(),
            email: None,
            phone: tenant::Phone::new("9876543210").unwrap(),
            whatsapp: tenant::Phone::new("9876543210").unwrap(),
            address: None,
            photo: None,
            agreement_file: None,
            billing: tenant::Billing {
                monthly_rent: inr("1000"),
                advance: inr("0"),
                day: tenant::BillingDay::new(5).unwrap(),
                grace_period: 5,
            },
            increase: None,
            electricity,
            agreement: tenant::Agreement {
                start: tenant::StartDateTime::from_date(date(2024, 1, 1)),
                tenure: tenant::Tenure {
                    years: 2,
                    ..tenant::Tenure::default()
                },
            },
            notify_before_agreement_end: true,
            expiry_reminder_sent: false,
            created_at: tenant::CreationDateTime::now(),
        }
    }

    mod issue {
        use super::*;

        #[test]
        fn starts_pending() {
            let rent = Rent::issue(
                &tenant(None),
                Month::new(3).unwrap(),
                2024,
                inr("0"),
            );

            assert_eq!(rent.status, Status::Pending);
            assert_eq!(rent.amount, inr("1000"));
            assert_eq!(rent.paid_amount, inr("0"));
            assert_eq!(rent.due_next_month, inr("0"));
            assert_eq!(rent.due_date.date(), date(2024, 3, 5));
            assert!(rent.paid_at.is_none());
            assert!(rent.payment_method.is_none());
        }

        #[test]
        fn carries_previous_due() {
            let rent = Rent::issue(
                &tenant(None),
                Month::new(3).unwrap(),
                2024,
                inr("250.5"),
            );

            assert_eq!(rent.amount, inr("1251"));
            assert_eq!(rent.previous_due, inr("250.5"));
        }

        #[test]
        fn snapshots_electricity_terms() {
            let rent = Rent::issue(
                &tenant(Some(tenant::Electricity {
                    unit_cost: inr("8"),
                    notify_before_billing: true,
                })),
                Month::new(3).unwrap(),
                2024,
                inr("0"),
            );

            let electricity = rent.electricity.unwrap();
            assert_eq!(electricity.unit_cost, inr("8"));
            assert!(electricity.units_consumed.is_none());
            assert_eq!(electricity.amount, inr("0"));
            assert!(!electricity.calculated);
            assert!(!rent.reminder_sent);
        }

        #[test]
        fn pre_suppresses_unwanted_reminder() {
            let no_terms = Rent::issue(
                &tenant(None),
                Month::new(3).unwrap(),
                2024,
                inr("0"),
            );
            assert!(no_terms.reminder_sent);

            let no_notify = Rent::issue(
                &tenant(Some(tenant::Electricity {
                    unit_cost: inr("8"),
                    notify_before_billing: false,
                })),
                Month::new(3).unwrap(),
                2024,
                inr("0"),
            );
            assert!(no_notify.reminder_sent);
        }
    }

    mod resync {
        use super::*;

        #[test]
        fn preserves_payment_progress() {
            let mut rent = Rent::issue(
                &tenant(None),
                Month::new(3).unwrap(),
                2024,
                inr("200"),
            );
            rent.paid_amount = inr("300");
            rent.due_next_month = inr("900");
            rent.status = Status::Partial;

            let mut updated = tenant(Some(tenant::Electricity {
                unit_cost: inr("9"),
                notify_before_billing: true,
            }));
            updated.billing.monthly_rent = inr("1500");
            rent.resync(&updated);

            assert_eq!(rent.amount, inr("1700"));
            assert_eq!(rent.previous_due, inr("200"));
            assert_eq!(rent.paid_amount, inr("300"));
            assert_eq!(rent.due_next_month, inr("900"));
            assert_eq!(rent.status, Status::Partial);
            assert_eq!(rent.electricity.unwrap().unit_cost, inr("9"));
            assert!(!rent.reminder_sent);
        }
    }

    mod target {
        use super::*;

        #[test]
        fn resolves_current_month() {
            assert_eq!(
                Target::CurrentMonth.period(date(2024, 7, 20)),
                (Month::new(7).unwrap(), 2024),
            );
        }

        #[test]
        fn resolves_next_month() {
            assert_eq!(
                Target::NextMonth.period(date(2024, 7, 20)),
                (Month::new(8).unwrap(), 2024),
            );
        }

        #[test]
        fn rolls_over_december() {
            assert_eq!(
                Target::NextMonth.period(date(2024, 12, 31)),
                (Month::new(1).unwrap(), 2025),
            );
        }
    }

    mod month {
        use super::*;

        #[test]
        fn bounds() {
            assert!(Month::new(0).is_none());
            assert!(Month::new(1).is_some());
            assert!(Month::new(12).is_some());
            assert!(Month::new(13).is_none());
        }

        #[test]
        fn previous_rolls_over_january() {
            assert_eq!(
                Month::new(1).unwrap().previous(2024),
                (Month::new(12).unwrap(), 2023),
            );
            assert_eq!(
                Month::new(6).unwrap().previous(2024),
                (Month::new(5).unwrap(), 2024),
            );
        }
    }

    mod units {
        use super::*;

        #[test]
        fn rejects_negative() {
            assert!(Units::new(Decimal::NEGATIVE_ONE).is_none());
        }

        #[test]
        fn accepts_zero() {
            assert!(Units::new(Decimal::ZERO).is_some());
        }
    }

    mod grace_end {
        use super::*;

        #[test]
        fn extends_due_date() {
            let rent = Rent::issue(
                &tenant(None),
                Month::new(3).unwrap(),
                2024,
                inr("0"),
            );

            assert_eq!(rent.grace_end(5), date(2024, 3, 10));
            assert_eq!(rent.grace_end(0), date(2024, 3, 5));
        }
    }
}
