//! [`Tenant`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{owner, rent};

/// Tenant renting a property from an owner.
#[derive(Clone, Debug)]
pub struct Tenant {
    /// ID of this [`Tenant`].
    pub id: Id,

    /// ID of the [`owner`] this [`Tenant`] rents from.
    pub owner_id: owner::Id,

    /// [`Name`] of this [`Tenant`].
    pub name: Name,

    /// [`Email`] of this [`Tenant`], if any.
    pub email: Option<Email>,

    /// [`Phone`] of this [`Tenant`].
    pub phone: Phone,

    /// [`Phone`] this [`Tenant`] is reachable on via WhatsApp.
    pub whatsapp: Phone,

    /// [`Address`] of the rented property, if provided.
    pub address: Option<Address>,

    /// Photo of this [`Tenant`], if uploaded.
    pub photo: Option<Media>,

    /// Scanned rental agreement document, if uploaded.
    pub agreement_file: Option<Media>,

    /// [`Billing`] terms of this [`Tenant`].
    pub billing: Billing,

    /// Periodic rent [`Increase`] terms, if agreed on.
    pub increase: Option<Increase>,

    /// [`Electricity`] billing terms.
    ///
    /// Electricity is not billed to this [`Tenant`] when absent.
    pub electricity: Option<Electricity>,

    /// Rental [`Agreement`] of this [`Tenant`].
    pub agreement: Agreement,

    /// Indicator whether this [`Tenant`] wants to be notified before the
    /// [`Agreement`] expires.
    pub notify_before_agreement_end: bool,

    /// Indicator whether the [`Agreement`] expiration reminder has been sent
    /// already.
    pub expiry_reminder_sent: bool,

    /// [`DateTime`] when this [`Tenant`] was created.
    pub created_at: CreationDateTime,
}

impl Tenant {
    /// Returns the monthly rent of this [`Tenant`] effective in the provided
    /// billing period, with the configured [`Increase`] applied.
    ///
    /// The increase is a single flat bump: once the configured number of
    /// [`Cycle`]s has elapsed since the [`Agreement`] start, every later
    /// period is billed the base [`Billing::monthly_rent`] raised by the
    /// percentage. The raise is recomputed from the base anew each period,
    /// so it's perpetually reapplied but never compounds. Raised amounts
    /// are rounded to whole currency units, with midpoints rounded away
    /// from zero.
    #[must_use]
    pub fn effective_rent(
        &self,
        month: rent::Month,
        year: rent::Year,
    ) -> Money {
        let base = self.billing.monthly_rent;
        let Some(increase) = self.increase else {
            return base;
        };

        let start = self.agreement.start.date();
        let elapsed = (i32::from(year) - start.year()) * 12
            + i32::from(month.u8())
            - i32::from(u8::from(start.month()));
        let threshold = i32::from(increase.after.u16())
            * match increase.cycle {
                Cycle::Monthly => 1,
                Cycle::Yearly => 12,
            };
        if elapsed < threshold {
            return base;
        }

        let raise = base.amount * increase.percentage.into_inner()
            / Decimal::ONE_HUNDRED;
        Money {
            amount: (base.amount + raise).round_dp_with_strategy(
                0,
                RoundingStrategy::MidpointAwayFromZero,
            ),
            currency: base.currency,
        }
    }
}

/// ID of a [`Tenant`].
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

/// Name of a [`Tenant`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `name` must be a valid [`Name`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && (2..=100).contains(&name.len())
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`Tenant`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(str, String)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `email` must be a valid [`Email`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Creates a new [`Email`] if the given `email` is valid.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Option<Self> {
        let email = email.into();
        Self::check(&email).then_some(Self(email))
    }

    /// Checks whether the given `email` is a valid [`Email`].
    fn check(email: impl AsRef<str>) -> bool {
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                "^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+\
                 @[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\
                 (?:\\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
            )
            .expect("valid regex")
        });

        REGEX.is_match(email.as_ref())
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a [`Tenant`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(str, String)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `phone` must be a valid [`Phone`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    /// Creates a new [`Phone`] if the given `phone` is valid.
    #[must_use]
    pub fn new(phone: impl Into<String>) -> Option<Self> {
        let phone = phone.into();
        Self::check(&phone).then_some(Self(phone))
    }

    /// Checks whether the given `phone` is a valid [`Phone`].
    fn check(phone: impl AsRef<str>) -> bool {
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^([+]\d{1,3}[-\s]?)?\d{5}[-\s]?\d{5}$")
                .expect("valid regex")
        });

        REGEX.is_match(phone.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Address of a property rented by a [`Tenant`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(str, String)]
pub struct Address(String);

impl Address {
    /// Creates a new [`Address`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `address` must be a valid [`Address`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Address`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Address`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.trim() == address
            && !address.is_empty()
            && address.len() <= 200
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Address`")
    }
}

/// File stored in an external media storage.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Media {
    /// Public URL the file is served at.
    pub url: MediaUrl,

    /// ID of the file in the storage it lives in.
    pub public_id: MediaPublicId,
}

/// Public URL of a [`Media`] file.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(str, String)]
pub struct MediaUrl(String);

/// ID of a [`Media`] file in the storage it lives in.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(str, String)]
pub struct MediaPublicId(String);

/// Billing terms of a [`Tenant`].
#[derive(Clone, Copy, Debug)]
pub struct Billing {
    /// Base monthly rent, before any [`Increase`] is applied.
    pub monthly_rent: Money,

    /// Advance deposit paid upfront.
    pub advance: Money,

    /// [`BillingDay`] the rent becomes due on.
    pub day: BillingDay,

    /// Number of days after the due date before an unpaid rent counts as
    /// overdue.
    pub grace_period: GraceDays,
}

impl Billing {
    /// Returns the [`rent::DueDateTime`] falling in the provided billing
    /// period, derived from the configured [`BillingDay`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn due_date(
        &self,
        month: rent::Month,
        year: rent::Year,
    ) -> rent::DueDateTime {
        DateTimeOf::from_date(
            time::Date::from_calendar_date(
                i32::from(year),
                time::Month::try_from(month.u8()).expect("in `1..=12` range"),
                self.day.u8(),
            )
            .expect("`BillingDay` is in `1..=28` range"),
        )
    }
}

/// Day of month, `1..=28`, a [`Tenant`]'s rent becomes due on.
///
/// Capped at 28 so that the day exists in every month of every year.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub struct BillingDay(u8);

impl BillingDay {
    /// Creates a new [`BillingDay`] if the given `day` fits `1..=28`.
    #[must_use]
    pub fn new(day: u8) -> Option<Self> {
        (1..=28).contains(&day).then_some(Self(day))
    }

    /// Returns the [`u8`] representation of this [`BillingDay`].
    #[must_use]
    pub const fn u8(self) -> u8 {
        self.0
    }
}

impl Default for BillingDay {
    /// First day of a month.
    fn default() -> Self {
        Self(1)
    }
}

impl FromStr for BillingDay {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `BillingDay`")
    }
}

/// Number of days after the due date before an unpaid rent counts as overdue.
pub type GraceDays = u16;

/// Periodic rent increase terms of a [`Tenant`].
#[derive(Clone, Copy, Debug)]
pub struct Increase {
    /// [`Percent`] of the base [`Billing::monthly_rent`] added per
    /// application.
    pub percentage: Percent,

    /// Number of [`Cycle`]s elapsing between applications.
    pub after: EffectiveAfter,

    /// [`Cycle`] the applications are counted in.
    pub cycle: Cycle,
}

/// Number of [`Increase`] [`Cycle`]s elapsing between applications.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub struct EffectiveAfter(u16);

impl EffectiveAfter {
    /// Creates a new [`EffectiveAfter`] if the given `num` is valid (`>= 1`).
    #[must_use]
    pub fn new(num: u16) -> Option<Self> {
        (num >= 1).then_some(Self(num))
    }

    /// Returns the [`u16`] representation of this [`EffectiveAfter`].
    #[must_use]
    pub const fn u16(self) -> u16 {
        self.0
    }
}

impl Default for EffectiveAfter {
    /// Every single [`Cycle`].
    fn default() -> Self {
        Self(1)
    }
}

impl FromStr for EffectiveAfter {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u16>()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `EffectiveAfter`")
    }
}

define_kind! {
    #[doc = "Cycle a rent [`Increase`] is counted in."]
    enum Cycle {
        #[doc = "Increase counted every month."]
        Monthly = 1,

        #[doc = "Increase counted every year."]
        Yearly = 2,
    }
}

/// Electricity billing terms of a [`Tenant`].
#[derive(Clone, Copy, Debug)]
pub struct Electricity {
    /// Price of a single consumed unit.
    pub unit_cost: Money,

    /// Indicator whether a meter reading reminder should be sent before
    /// billing.
    pub notify_before_billing: bool,
}

/// Rental agreement between an owner and a [`Tenant`].
#[derive(Clone, Copy, Debug)]
pub struct Agreement {
    /// [`DateTime`] when this [`Agreement`] starts.
    pub start: StartDateTime,

    /// [`Tenure`] of this [`Agreement`].
    pub tenure: Tenure,
}

impl Agreement {
    /// Returns the [`DateTime`] when this [`Agreement`] expires.
    ///
    /// [`Tenure`] units are applied stepwise: years first, then months, then
    /// days. Year and month steps land on the original day-of-month counted
    /// from the first day of the target month, so a day out of range for the
    /// target month rolls forward into the following one instead of being
    /// clamped. Out-of-range results saturate at the calendar maximum.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn expiry(&self) -> ExpirationDateTime {
        let start = time::OffsetDateTime::from(self.start);

        let date = rolling_date(
            start.year() + i32::from(self.tenure.years),
            start.month(),
            start.day(),
        );

        let month0 = i32::from(u8::from(date.month())) - 1
            + i32::from(self.tenure.months);
        let date = rolling_date(
            date.year() + month0.div_euclid(12),
            time::Month::try_from(
                u8::try_from(month0.rem_euclid(12) + 1)
                    .expect("in `1..=12` range"),
            )
            .expect("in `1..=12` range"),
            date.day(),
        );

        let date = date
            .checked_add(time::Duration::days(i64::from(self.tenure.days)))
            .unwrap_or(time::Date::MAX);

        time::PrimitiveDateTime::new(date, start.time())
            .assume_utc()
            .try_into()
            .expect("infallible")
    }
}

/// Returns the date the provided number of `day`s into the month, rolling
/// past its end into the following months, and saturating at the calendar
/// maximum.
fn rolling_date(year: i32, month: time::Month, day: u8) -> time::Date {
    time::Date::from_calendar_date(year, month, 1)
        .ok()
        .and_then(|first| {
            first.checked_add(time::Duration::days(i64::from(day) - 1))
        })
        .unwrap_or(time::Date::MAX)
}

/// Duration of an [`Agreement`] expressed in calendar units.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Tenure {
    /// Whole years.
    pub years: u16,

    /// Whole months.
    pub months: u16,

    /// Remaining days.
    pub days: u16,
}

/// Marker type indicating an [`Agreement`] start.
#[derive(Clone, Copy, Debug)]
pub struct Start;

/// Marker type indicating an [`Agreement`] expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// [`DateTime`] when a [`Tenant`]'s [`Agreement`] starts.
pub type StartDateTime = DateTimeOf<(Tenant, Start)>;

/// [`DateTime`] when a [`Tenant`]'s [`Agreement`] expires.
pub type ExpirationDateTime = DateTimeOf<(Tenant, Expiration)>;

/// [`DateTime`] when a [`Tenant`] was created.
pub type CreationDateTime = DateTimeOf<(Tenant, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::money::Currency;

    use super::*;

    fn date(year: i32, month: u8, day: u8) -> time::Date {
        time::Date::from_calendar_date(
            year,
            time::Month::try_from(month).unwrap(),
            day,
        )
        .unwrap()
    }

    fn inr(amount: i64) -> Money {
        Money {
            amount: Decimal::from(amount),
            currency: Currency::Inr,
        }
    }

    fn tenant(
        monthly_rent: Money,
        increase: Option<Increase>,
        start: time::Date,
    ) -> Tenant {
        Tenant {
            id: Id::new(),
            owner_id: owner::Id::new(),
            name: Name::new("John Doe").unwrap(),
            email: None,
            phone: Phone::new("9876543210").unwrap(),
            whatsapp: Phone::new("9876543210").unwrap(),
            address: None,
            photo: None,
            agreement_file: None,
            billing: Billing {
                monthly_rent,
                advance: inr(0),
                day: BillingDay::default(),
                grace_period: 5,
            },
            increase,
            electricity: None,
            agreement: Agreement {
                start: StartDateTime::from_date(start),
                tenure: Tenure {
                    years: 1,
                    ..Tenure::default()
                },
            },
            notify_before_agreement_end: true,
            expiry_reminder_sent: false,
            created_at: CreationDateTime::now(),
        }
    }

    mod expiry {
        use super::*;

        fn expiry_date(start: time::Date, tenure: Tenure) -> time::Date {
            Agreement {
                start: StartDateTime::from_date(start),
                tenure,
            }
            .expiry()
            .date()
        }

        #[test]
        fn applies_months() {
            assert_eq!(
                expiry_date(
                    date(2024, 1, 15),
                    Tenure {
                        months: 11,
                        ..Tenure::default()
                    },
                ),
                date(2024, 12, 15),
            );
        }

        #[test]
        fn rolls_over_short_months() {
            assert_eq!(
                expiry_date(
                    date(2024, 1, 31),
                    Tenure {
                        months: 1,
                        ..Tenure::default()
                    },
                ),
                date(2024, 3, 2),
            );
        }

        #[test]
        fn rolls_over_leap_day() {
            assert_eq!(
                expiry_date(
                    date(2024, 2, 29),
                    Tenure {
                        years: 1,
                        ..Tenure::default()
                    },
                ),
                date(2025, 3, 1),
            );
        }

        #[test]
        fn applies_all_units() {
            assert_eq!(
                expiry_date(
                    date(2023, 6, 10),
                    Tenure {
                        years: 1,
                        months: 2,
                        days: 5,
                    },
                ),
                date(2024, 8, 15),
            );
        }

        #[test]
        fn zero_tenure_is_start() {
            assert_eq!(
                expiry_date(date(2024, 5, 20), Tenure::default()),
                date(2024, 5, 20),
            );
        }

        #[test]
        fn month_step_uses_rolled_day() {
            // A leap day rolled over by the year step lands on the 1st, and
            // the month step counts from there.
            assert_eq!(
                expiry_date(
                    date(2024, 2, 29),
                    Tenure {
                        years: 1,
                        months: 1,
                        ..Tenure::default()
                    },
                ),
                date(2025, 4, 1),
            );
        }
    }

    mod effective_rent {
        use super::*;

        fn yearly_increase(percentage: u32) -> Option<Increase> {
            Some(Increase {
                percentage: Percent::new(Decimal::from(percentage)).unwrap(),
                after: EffectiveAfter::default(),
                cycle: Cycle::Yearly,
            })
        }

        #[test]
        fn base_without_increase() {
            let tenant = tenant(inr(1000), None, date(2024, 1, 1));
            assert_eq!(
                tenant.effective_rent(rent::Month::new(6).unwrap(), 2030),
                inr(1000),
            );
        }

        #[test]
        fn base_before_first_cycle_elapses() {
            let tenant =
                tenant(inr(1000), yearly_increase(10), date(2024, 1, 1));
            assert_eq!(
                tenant.effective_rent(rent::Month::new(12).unwrap(), 2024),
                inr(1000),
            );
        }

        #[test]
        fn raises_at_cycle_boundary() {
            let tenant =
                tenant(inr(1000), yearly_increase(10), date(2024, 1, 1));
            assert_eq!(
                tenant.effective_rent(rent::Month::new(1).unwrap(), 2025),
                inr(1100),
            );
        }

        #[test]
        fn reapplies_flat_bump_without_compounding() {
            let tenant =
                tenant(inr(1000), yearly_increase(10), date(2024, 1, 1));
            assert_eq!(
                tenant.effective_rent(rent::Month::new(1).unwrap(), 2026),
                inr(1100),
            );
            assert_eq!(
                tenant.effective_rent(rent::Month::new(6).unwrap(), 2030),
                inr(1100),
            );
        }

        #[test]
        fn counts_monthly_cycles() {
            let tenant = tenant(
                inr(1000),
                Some(Increase {
                    percentage: Percent::new(Decimal::from(10)).unwrap(),
                    after: EffectiveAfter::new(6).unwrap(),
                    cycle: Cycle::Monthly,
                }),
                date(2024, 1, 1),
            );
            assert_eq!(
                tenant.effective_rent(rent::Month::new(6).unwrap(), 2024),
                inr(1000),
            );
            assert_eq!(
                tenant.effective_rent(rent::Month::new(7).unwrap(), 2024),
                inr(1100),
            );
        }

        #[test]
        fn rounds_midpoint_away_from_zero() {
            let tenant =
                tenant(inr(990), yearly_increase(5), date(2024, 1, 1));
            // 990 + 49.5 = 1039.5
            assert_eq!(
                tenant.effective_rent(rent::Month::new(1).unwrap(), 2025),
                inr(1040),
            );
        }

        #[test]
        fn base_before_agreement_start() {
            let tenant =
                tenant(inr(1000), yearly_increase(10), date(2024, 6, 1));
            assert_eq!(
                tenant.effective_rent(rent::Month::new(1).unwrap(), 2024),
                inr(1000),
            );
        }
    }

    mod name {
        use super::*;

        #[test]
        fn accepts_regular() {
            assert!(Name::new("Ravi Kumar").is_some());
        }

        #[test]
        fn rejects_untrimmed() {
            assert!(Name::new(" Ravi").is_none());
            assert!(Name::new("Ravi ").is_none());
        }

        #[test]
        fn rejects_out_of_bounds() {
            assert!(Name::new("R").is_none());
            assert!(Name::new("R".repeat(101)).is_none());
        }
    }

    mod phone {
        use super::*;

        #[test]
        fn accepts_regular() {
            for phone in
                ["9876543210", "98765 43210", "+91 9876543210", "+919876543210"]
            {
                assert!(Phone::new(phone).is_some(), "rejected `{phone}`");
            }
        }

        #[test]
        fn rejects_malformed() {
            for phone in ["98765", "not a phone", "98765432100000"] {
                assert!(Phone::new(phone).is_none(), "accepted `{phone}`");
            }
        }
    }

    mod email {
        use super::*;

        #[test]
        fn accepts_regular() {
            assert!(Email::new("ravi.kumar@example.com").is_some());
        }

        #[test]
        fn rejects_malformed() {
            for email in ["ravi", "ravi@", "@example.com", "a b@example.com"] {
                assert!(Email::new(email).is_none(), "accepted `{email}`");
            }
        }
    }

    mod billing_day {
        use super::*;

        #[test]
        fn bounds() {
            assert!(BillingDay::new(0).is_none());
            assert!(BillingDay::new(1).is_some());
            assert!(BillingDay::new(28).is_some());
            assert!(BillingDay::new(29).is_none());
        }
    }
}
