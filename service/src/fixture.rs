//! Shared fixtures for [`Service`] tests.
//!
//! [`Service`]: crate::Service

use common::{money::Currency, Money};

use crate::domain::{owner, rent, tenant, Rent, Tenant};

/// Builds a [`time::Date`] out of the provided calendar parts.
pub(crate) fn date(year: i32, month: u8, day: u8) -> time::Date {
    time::Date::from_calendar_date(
        year,
        time::Month::try_from(month).unwrap(),
        day,
    )
    .unwrap()
}

/// Builds an INR [`Money`] out of the provided decimal literal.
pub(crate) fn inr(amount: &str) -> Money {
    Money {
        amount: amount.parse().unwrap(),
        currency: Currency::Inr,
    }
}

/// Builds a [`Tenant`] of the provided [`owner`].
///
/// Rents 10000 INR monthly, due on the 1st with a 5 day grace period, under
/// an agreement running from 2024-01-01 to 2026-01-01, with no rent
/// increase and no electricity billing.
pub(crate) fn tenant(owner_id: owner::Id) -> Tenant {
    Tenant {
        id: tenant::Id::new(),
        owner_id,
        name: tenant::Name::new("Ravi Kumar").unwrap(),
        email: Some(tenant::Email::new("ravi.kumar@example.com").unwrap()),
        phone: tenant::Phone::new("9876543210").unwrap(),
        whatsapp: tenant::Phone::new("9876543210").unwrap(),
        address: None,
        photo: None,
        agreement_file: None,
        billing: tenant::Billing {
            monthly_rent: inr("10000"),
            advance: inr("0"),
            day: tenant::BillingDay::default(),
            grace_period: 5,
        },
        increase: None,
        electricity: None,
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

/// Builds [`tenant::Electricity`] terms of 8 INR per unit, asking for the
/// meter reading reminder.
pub(crate) fn electricity() -> tenant::Electricity {
    tenant::Electricity {
        unit_cost: inr("8"),
        notify_before_billing: true,
    }
}

/// Issues a [`Rent`] of the provided [`Tenant`] for the given period, with
/// no previous due carried.
pub(crate) fn rent(tenant: &Tenant, month: u8, year: rent::Year) -> Rent {
    Rent::issue(tenant, rent::Month::new(month).unwrap(), year, inr("0"))
}
