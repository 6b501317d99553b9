//! Month-by-month cash schedule for a lease.
//!
//! Expands [`LeaseTerms`] and [`EscalationRule`]s into one
//! [`PaymentScheduleEntry`] per (calendar month, cost category). Base rent is
//! escalated and abated; CAM, insurance, utilities and other costs are flat;
//! property tax is spread according to its billing frequency. There is no
//! day-level proration: a month is either fully scheduled or absent.
//!
//! The output is a pure function of its inputs, so a caller can delete and
//! regenerate a persisted schedule at any time without drift.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::LeaseEngineError;
use crate::types::{round_money, Money};
use crate::LeaseEngineResult;

use super::terms::{EscalationRule, LeaseTerms, Period, PropertyTaxFrequency, RentStep};

const MONTHS_PER_CYCLE: u32 = 12;
const SEMI_ANNUAL_MONTHS: u32 = 6;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Cost category of a scheduled amount. Declaration order is output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    BaseRent,
    Cam,
    PropertyTax,
    Insurance,
    Utilities,
    Other,
}

impl PaymentType {
    pub const ALL: [PaymentType; 6] = [
        PaymentType::BaseRent,
        PaymentType::Cam,
        PaymentType::PropertyTax,
        PaymentType::Insurance,
        PaymentType::Utilities,
        PaymentType::Other,
    ];

    /// Whether the category is a lease component for ASC 842 measurement.
    pub fn is_lease_component(self) -> bool {
        self == PaymentType::BaseRent
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentType::BaseRent => "base_rent",
            PaymentType::Cam => "cam",
            PaymentType::PropertyTax => "property_tax",
            PaymentType::Insurance => "insurance",
            PaymentType::Utilities => "utilities",
            PaymentType::Other => "other",
        }
    }
}

/// How escalation rules recur over the lease term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationRecurrence {
    /// `annual` rules reapply every 12 months from their effective date,
    /// `biennial` every 24, `at_renewal` once.
    #[default]
    ByFrequency,
    /// Every stored rule is a single step on its effective date; `frequency`
    /// is descriptive only.
    SingleStep,
}

/// One scheduled amount for one category in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    pub period_year: i32,
    pub period_month: u32,
    pub payment_type: PaymentType,
    pub scheduled_amount: Money,
}

impl PaymentScheduleEntry {
    pub fn period(&self) -> Period {
        Period {
            year: self.period_year,
            month: self.period_month,
        }
    }
}

/// Totals over a generated schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentScheduleSummary {
    pub total_scheduled: Money,
    pub totals_by_type: BTreeMap<PaymentType, Money>,
    pub annual_totals: Vec<AnnualTotal>,
}

/// Scheduled cash for one calendar year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualTotal {
    pub year: i32,
    pub base_rent: Money,
    pub operating_costs: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledStep {
    period: Period,
    rule_index: usize,
    step: RentStep,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate the monthly payment schedule using frequency-driven recurrence.
pub fn generate_payment_schedule(
    terms: &LeaseTerms,
    escalations: &[EscalationRule],
) -> LeaseEngineResult<Vec<PaymentScheduleEntry>> {
    generate_payment_schedule_with(terms, escalations, EscalationRecurrence::ByFrequency)
}

/// Generate the monthly payment schedule under an explicit recurrence policy.
pub fn generate_payment_schedule_with(
    terms: &LeaseTerms,
    escalations: &[EscalationRule],
    recurrence: EscalationRecurrence,
) -> LeaseEngineResult<Vec<PaymentScheduleEntry>> {
    terms.validate()?;

    let first = Period::from_date(terms.commencement_date);
    let last = Period::from_date(terms.expiration_date);
    let rent_start = Period::from_date(terms.rent_commencement());
    let steps = escalation_steps(escalations, first, last, recurrence);

    let mut entries = Vec::with_capacity(terms.calendar_months() as usize * 2);
    let mut rent = round_money(terms.base_rent_monthly);
    let mut next_step = 0;

    for (index, period) in first.through(last).enumerate() {
        while next_step < steps.len() && steps[next_step].period <= period {
            let scheduled = steps[next_step];
            let escalated = scheduled.step.apply(rent).ok_or_else(|| {
                LeaseEngineError::InvalidInput {
                    field: "escalations".into(),
                    reason: format!(
                        "escalation rule {} overflows base rent in {period}",
                        scheduled.rule_index
                    ),
                }
            })?;
            rent = round_money(escalated);
            trace!(
                period = %period,
                rule = scheduled.rule_index,
                rent = %rent,
                "escalation applied"
            );
            next_step += 1;
        }

        let cycle_month = (index as u32 % MONTHS_PER_CYCLE) + 1;
        for payment_type in PaymentType::ALL {
            let amount = match payment_type {
                PaymentType::BaseRent => base_rent_for(terms, period, rent_start, rent),
                PaymentType::Cam => flat(terms.cam_monthly),
                PaymentType::PropertyTax => property_tax_for(terms, cycle_month),
                PaymentType::Insurance => flat(terms.insurance_monthly),
                PaymentType::Utilities => flat(terms.utilities_monthly),
                PaymentType::Other => flat(terms.other_monthly_costs),
            };
            if let Some(scheduled_amount) = amount {
                entries.push(PaymentScheduleEntry {
                    period_year: period.year,
                    period_month: period.month,
                    payment_type,
                    scheduled_amount,
                });
            }
        }
    }

    debug!(
        months = terms.calendar_months(),
        rows = entries.len(),
        escalation_steps = steps.len(),
        "payment schedule generated"
    );
    Ok(entries)
}

/// Escalated base-rent stream over the lease term, one amount per month from
/// the commencement month. Months with no base-rent row (before rent
/// commencement, or past the scheduled calendar range) contribute zero.
pub fn base_rent_payment_stream(entries: &[PaymentScheduleEntry], terms: &LeaseTerms) -> Vec<Money> {
    let by_period: HashMap<Period, Money> = entries
        .iter()
        .filter(|e| e.payment_type == PaymentType::BaseRent)
        .map(|e| (e.period(), e.scheduled_amount))
        .collect();

    let first = Period::from_date(terms.commencement_date);
    (0..terms.lease_term_months)
        .map(|i| {
            by_period
                .get(&first.plus_months(i))
                .copied()
                .unwrap_or(Decimal::ZERO)
        })
        .collect()
}

/// Totals by category and by calendar year.
pub fn summarize_payment_schedule(entries: &[PaymentScheduleEntry]) -> PaymentScheduleSummary {
    let mut totals_by_type: BTreeMap<PaymentType, Money> = BTreeMap::new();
    let mut by_year: BTreeMap<i32, (Money, Money)> = BTreeMap::new();

    for entry in entries {
        *totals_by_type.entry(entry.payment_type).or_default() += entry.scheduled_amount;
        let year = by_year.entry(entry.period_year).or_default();
        if entry.payment_type.is_lease_component() {
            year.0 += entry.scheduled_amount;
        } else {
            year.1 += entry.scheduled_amount;
        }
    }

    let annual_totals = by_year
        .into_iter()
        .map(|(year, (base_rent, operating_costs))| AnnualTotal {
            year,
            base_rent,
            operating_costs,
            total: base_rent + operating_costs,
        })
        .collect();

    PaymentScheduleSummary {
        total_scheduled: totals_by_type.values().copied().sum(),
        totals_by_type,
        annual_totals,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Expand rules into dated steps through `horizon`, ordered by period and
/// then by effective date. Rules missing the field their type needs are
/// skipped.
///
/// A recurring rule dated before `start` contributes only its latest
/// occurrence at or before `start`; earlier anniversaries are taken to be
/// reflected in the base rent already.
fn escalation_steps(
    rules: &[EscalationRule],
    start: Period,
    horizon: Period,
    recurrence: EscalationRecurrence,
) -> Vec<ScheduledStep> {
    let mut ordered: Vec<(usize, &EscalationRule)> = rules.iter().enumerate().collect();
    ordered.sort_by_key(|(i, r)| (r.effective_date, *i));

    let mut steps = Vec::new();
    for (rule_index, rule) in ordered {
        let Some(step) = rule.rent_step() else {
            debug!(
                rule = rule_index,
                escalation_type = ?rule.escalation_type,
                "skipping escalation rule without an increase value"
            );
            continue;
        };
        let interval = match recurrence {
            EscalationRecurrence::ByFrequency => rule.frequency.interval_months(),
            EscalationRecurrence::SingleStep => None,
        };

        let mut period = Period::from_date(rule.effective_date);
        if let Some(months) = interval {
            while period.plus_months(months) <= start {
                period = period.plus_months(months);
            }
        }
        while period <= horizon {
            steps.push(ScheduledStep {
                period,
                rule_index,
                step,
            });
            match interval {
                Some(months) => period = period.plus_months(months),
                None => break,
            }
        }
    }

    // stable: equal periods keep effective-date order
    steps.sort_by_key(|s| s.period);
    steps
}

fn base_rent_for(
    terms: &LeaseTerms,
    period: Period,
    rent_start: Period,
    nominal_rent: Money,
) -> Option<Money> {
    if period < rent_start || nominal_rent.is_zero() {
        return None;
    }
    let months_into_rent = period.months_since(rent_start);
    if months_into_rent < i64::from(terms.rent_abatement_months) {
        Some(round_money(terms.rent_abatement_amount))
    } else {
        Some(nominal_rent)
    }
}

fn flat(monthly: Money) -> Option<Money> {
    if monthly.is_zero() {
        None
    } else {
        Some(round_money(monthly))
    }
}

/// Property tax for month `cycle_month` (1-12) of a commencement-anchored
/// cycle. The closing installment of each cycle takes the rounding remainder
/// so every cycle sums to the annual figure exactly.
fn property_tax_for(terms: &LeaseTerms, cycle_month: u32) -> Option<Money> {
    let annual = round_money(terms.property_tax_annual);
    if annual.is_zero() {
        return None;
    }
    let installments = match terms.property_tax_frequency {
        PropertyTaxFrequency::Monthly => MONTHS_PER_CYCLE,
        PropertyTaxFrequency::SemiAnnual => MONTHS_PER_CYCLE / SEMI_ANNUAL_MONTHS,
        PropertyTaxFrequency::Annual => 1,
    };
    let spacing = MONTHS_PER_CYCLE / installments;
    if cycle_month % spacing != 0 {
        return None;
    }

    let installment = round_money(annual / Decimal::from(installments));
    if cycle_month == MONTHS_PER_CYCLE {
        Some(annual - installment * Decimal::from(installments - 1))
    } else {
        Some(installment)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
