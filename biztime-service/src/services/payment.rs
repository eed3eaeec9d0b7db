//! Paid-date transitions.
//!
//! `paid_date` only moves when the `paid` flag actually changes. Re-sending
//! the flag an invoice already has keeps whatever date is stored.

use chrono::{NaiveDate, Utc};

/// How an update moves the `paid` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentTransition {
    /// unpaid -> paid
    Paid,
    /// paid -> unpaid
    Unpaid,
    Unchanged,
}

impl PaymentTransition {
    pub fn between(previous_paid: bool, new_paid: bool) -> Self {
        match (previous_paid, new_paid) {
            (false, true) => PaymentTransition::Paid,
            (true, false) => PaymentTransition::Unpaid,
            _ => PaymentTransition::Unchanged,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentTransition::Paid => "paid",
            PaymentTransition::Unpaid => "unpaid",
            PaymentTransition::Unchanged => "unchanged",
        }
    }
}

/// Next `paid_date` for an invoice, using today's UTC date when it becomes paid.
pub fn resolve_paid_date(
    previous_paid: bool,
    previous_paid_date: Option<NaiveDate>,
    new_paid: bool,
) -> Option<NaiveDate> {
    resolve_paid_date_on(
        previous_paid,
        previous_paid_date,
        new_paid,
        Utc::now().date_naive(),
    )
}

/// [`resolve_paid_date`] with an explicit clock.
pub fn resolve_paid_date_on(
    previous_paid: bool,
    previous_paid_date: Option<NaiveDate>,
    new_paid: bool,
    today: NaiveDate,
) -> Option<NaiveDate> {
    match PaymentTransition::between(previous_paid, new_paid) {
        PaymentTransition::Paid => Some(today),
        PaymentTransition::Unpaid => None,
        PaymentTransition::Unchanged => previous_paid_date,
    }
}
