//! ASC 842 amortization schedule.
//!
//! Rolls the lease liability forward with the effective interest method
//! and the right-of-use asset forward according to the classification:
//!
//! - **Operating**: a single straight-line lease cost every month. ROU
//!   amortization is the plug `straight_line - interest`.
//! - **Finance**: ROU amortizes straight-line over the term; total expense is
//!   interest + amortization and therefore front-loaded.
//!
//! Every amount is rounded to the cent per period. The last row absorbs
//! cumulative rounding drift so that both balances finish at exactly zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::time_value::monthly_discount_rate;
use crate::types::{round_money, Money, Rate};

use super::present_value::{
    calculate_lease_liability_for_payments, lease_payment_stream, rou_asset_from_liability,
};
use super::terms::{LeaseClassification, LeaseTerms, Period};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A single month of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Period number (1-indexed)
    pub period: u32,
    pub period_year: i32,
    pub period_month: u32,
    pub lease_liability_beginning: Money,
    pub lease_payment: Money,
    pub interest_expense: Money,
    pub principal_reduction: Money,
    pub lease_liability_ending: Money,
    pub rou_asset_beginning: Money,
    pub amortization_expense: Money,
    pub rou_asset_ending: Money,
    /// Lease cost recognized in the period
    pub total_expense: Money,
}

/// Totals over the whole schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asc842Summary {
    pub classification: LeaseClassification,
    pub initial_lease_liability: Money,
    pub initial_rou_asset: Money,
    /// Undiscounted base-rent stream plus prepaid rent
    pub total_lease_payments: Money,
    pub total_lease_cost: Money,
    pub total_interest_expense: Money,
    pub total_amortization_expense: Money,
    /// Monthly lease cost for operating leases. Every row carries this amount
    /// except the final one, which absorbs the cent-rounding drift of the
    /// straight-line division so that both balances close at zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_straight_line_expense: Option<Money>,
}

/// Summary plus month-by-month rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asc842Schedule {
    pub summary: Asc842Summary,
    pub schedule: Vec<AmortizationRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the ASC 842 schedule for a lease.
///
/// `escalated_payments` is the base-rent stream from the payment schedule
/// (see [`super::payment_schedule::base_rent_payment_stream`]). When absent,
/// every month pays `base_rent_monthly`. The initial liability is the present
/// value of whichever stream is used.
///
/// Returns `None` when `discount_rate <= 0` or `lease_term_months == 0`; that
/// is the normal "no ASC 842 data yet" state, not an error.
pub fn generate_asc842_schedule(
    terms: &LeaseTerms,
    escalated_payments: Option<&[Money]>,
) -> Option<Asc842Schedule> {
    let initial_liability = calculate_lease_liability_for_payments(terms, escalated_payments)?;
    let initial_rou = rou_asset_from_liability(terms, initial_liability);
    let payments = lease_payment_stream(terms, escalated_payments);
    let monthly_rate = monthly_discount_rate(terms.discount_rate);
    let term = Decimal::from(terms.lease_term_months);

    let total_lease_payments = payments.iter().copied().sum::<Money>() + terms.prepaid_rent;

    let straight_line = match terms.classification {
        LeaseClassification::Operating => Some(round_money(
            (total_lease_payments + terms.initial_direct_costs - terms.lease_incentives_received)
                / term,
        )),
        LeaseClassification::Finance => None,
    };
    let finance_amortization = round_money(initial_rou / term);

    let schedule = roll_forward(
        terms,
        &payments,
        initial_liability,
        initial_rou,
        monthly_rate,
        straight_line,
        finance_amortization,
    );

    let summary = Asc842Summary {
        classification: terms.classification,
        initial_lease_liability: initial_liability,
        initial_rou_asset: initial_rou,
        total_lease_payments,
        total_lease_cost: schedule.iter().map(|r| r.total_expense).sum(),
        total_interest_expense: schedule.iter().map(|r| r.interest_expense).sum(),
        total_amortization_expense: schedule.iter().map(|r| r.amortization_expense).sum(),
        monthly_straight_line_expense: straight_line,
    };

    debug!(
        classification = ?terms.classification,
        rows = schedule.len(),
        initial_liability = %initial_liability,
        initial_rou = %initial_rou,
        "asc 842 schedule generated"
    );

    Some(Asc842Schedule { summary, schedule })
}

// ---------------------------------------------------------------------------
// Roll-forward
// ---------------------------------------------------------------------------

fn roll_forward(
    terms: &LeaseTerms,
    payments: &[Money],
    initial_liability: Money,
    initial_rou: Money,
    monthly_rate: Rate,
    straight_line: Option<Money>,
    finance_amortization: Money,
) -> Vec<AmortizationRow> {
    let n = payments.len();
    let first = Period::from_date(terms.commencement_date);
    let mut schedule = Vec::with_capacity(n);

    let mut liability = initial_liability;
    let mut rou = initial_rou;

    for (i, &payment) in payments.iter().enumerate() {
        let is_last = i + 1 == n;
        let period = first.plus_months(i as u32);
        let liability_beginning = liability;
        let rou_beginning = rou;

        // Last period: principal clears the balance and interest takes the drift
        let (interest, principal) = if is_last {
            (payment - liability_beginning, liability_beginning)
        } else {
            let interest = round_money(liability_beginning * monthly_rate);
            (interest, payment - interest)
        };
        liability = liability_beginning - principal;

        let amortization = if is_last {
            rou_beginning
        } else {
            match straight_line {
                Some(expense) => expense - interest,
                None => finance_amortization,
            }
        };
        rou = rou_beginning - amortization;

        let total_expense = match straight_line {
            Some(expense) if !is_last => expense,
            _ => interest + amortization,
        };

        schedule.push(AmortizationRow {
            period: (i + 1) as u32,
            period_year: period.year,
            period_month: period.month,
            lease_liability_beginning: liability_beginning,
            lease_payment: payment,
            interest_expense: interest,
            principal_reduction: principal,
            lease_liability_ending: liability,
            rou_asset_beginning: rou_beginning,
            amortization_expense: amortization,
            rou_asset_ending: rou,
            total_expense,
        });
    }

    schedule
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
