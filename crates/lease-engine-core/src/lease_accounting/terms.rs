//! Lease commercial terms, escalation rules and calendar-month periods.
//!
//! Everything downstream (payment schedules, present value, amortization and
//! journal entries) is derived from a [`LeaseTerms`] value plus an optional
//! list of [`EscalationRule`]s. Dates are calendar days with no timezone and
//! all scheduling is done at whole-month granularity.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LeaseEngineError;
use crate::types::{Money, Rate};
use crate::LeaseEngineResult;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// ASC 842 lease classification. Supplied by the caller, never derived here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseClassification {
    #[default]
    Operating,
    Finance,
}

/// How the annual property tax figure is spread across the schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyTaxFrequency {
    #[default]
    Monthly,
    SemiAnnual,
    Annual,
}

/// Kind of rent escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationType {
    FixedPercentage,
    FixedAmount,
    /// Index-linked. The caller supplies an assumed percentage because the
    /// actual index value is unknown when the schedule is generated; the
    /// schedule must be regenerated once real index data is available.
    Cpi,
}

/// How often an escalation step recurs from its effective date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationFrequency {
    Annual,
    Biennial,
    AtRenewal,
}

impl EscalationFrequency {
    /// Months between recurrences, `None` when the step never recurs.
    pub fn interval_months(self) -> Option<u32> {
        match self {
            EscalationFrequency::Annual => Some(12),
            EscalationFrequency::Biennial => Some(24),
            EscalationFrequency::AtRenewal => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Commercial terms of a lease or sublease.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseTerms {
    /// Lease commencement date
    pub commencement_date: NaiveDate,
    /// Date base rent starts accruing (defaults to commencement)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_commencement_date: Option<NaiveDate>,
    /// Lease expiration date
    pub expiration_date: NaiveDate,
    /// Lease term in months used for ASC 842 measurement
    pub lease_term_months: u32,
    /// Nominal monthly base rent before escalations
    pub base_rent_monthly: Money,
    #[serde(default)]
    pub cam_monthly: Money,
    #[serde(default)]
    pub insurance_monthly: Money,
    #[serde(default)]
    pub property_tax_annual: Money,
    #[serde(default)]
    pub property_tax_frequency: PropertyTaxFrequency,
    #[serde(default)]
    pub utilities_monthly: Money,
    #[serde(default)]
    pub other_monthly_costs: Money,
    /// Number of months of abated base rent from rent commencement
    #[serde(default)]
    pub rent_abatement_months: u32,
    /// Base rent charged during abated months (usually zero)
    #[serde(default)]
    pub rent_abatement_amount: Money,
    /// Annual discount rate / IBR as a decimal fraction
    #[serde(default)]
    pub discount_rate: Rate,
    #[serde(default)]
    pub initial_direct_costs: Money,
    #[serde(default)]
    pub lease_incentives_received: Money,
    #[serde(default)]
    pub prepaid_rent: Money,
    #[serde(default)]
    pub classification: LeaseClassification,
}

impl LeaseTerms {
    /// Effective rent commencement date.
    pub fn rent_commencement(&self) -> NaiveDate {
        self.rent_commencement_date.unwrap_or(self.commencement_date)
    }

    /// Whether the terms carry enough data for an ASC 842 measurement.
    pub fn has_asc842_inputs(&self) -> bool {
        self.discount_rate > Decimal::ZERO && self.lease_term_months > 0
    }

    /// Calendar months from the commencement month through the expiration
    /// month, inclusive.
    pub fn calendar_months(&self) -> u32 {
        let first = Period::from_date(self.commencement_date);
        let last = Period::from_date(self.expiration_date);
        (last.months_since(first) + 1).max(0) as u32
    }

    pub(crate) fn validate(&self) -> LeaseEngineResult<()> {
        if self.expiration_date <= self.commencement_date {
            return Err(LeaseEngineError::InvalidInput {
                field: "expiration_date".into(),
                reason: format!(
                    "Expiration {} must be after commencement {}",
                    self.expiration_date, self.commencement_date
                ),
            });
        }
        if let Some(rent_start) = self.rent_commencement_date {
            if rent_start < self.commencement_date {
                return Err(LeaseEngineError::InvalidInput {
                    field: "rent_commencement_date".into(),
                    reason: format!(
                        "Rent commencement {} precedes lease commencement {}",
                        rent_start, self.commencement_date
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A scheduled change to base rent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationRule {
    #[serde(rename = "type")]
    pub escalation_type: EscalationType,
    /// First date the step takes effect
    pub effective_date: NaiveDate,
    /// Used by `fixed_percentage` and `cpi` (0.03 = 3%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_increase: Option<Rate>,
    /// Used by `fixed_amount`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_increase: Option<Money>,
    pub frequency: EscalationFrequency,
}

/// A single escalation step applied to the running base rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RentStep {
    Percentage(Rate),
    Amount(Money),
}

impl RentStep {
    /// The escalated rent, or `None` when it exceeds the decimal range.
    pub(crate) fn apply(self, rent: Money) -> Option<Money> {
        match self {
            RentStep::Percentage(pct) => rent.checked_mul(Decimal::ONE.checked_add(pct)?),
            RentStep::Amount(amount) => rent.checked_add(amount),
        }
    }
}

impl EscalationRule {
    /// The step this rule applies, or `None` when the field its type needs is
    /// missing (a malformed row that is skipped rather than reinterpreted).
    pub(crate) fn rent_step(&self) -> Option<RentStep> {
        match self.escalation_type {
            EscalationType::FixedPercentage | EscalationType::Cpi => {
                self.percentage_increase.map(RentStep::Percentage)
            }
            EscalationType::FixedAmount => self.amount_increase.map(RentStep::Amount),
        }
    }
}

// ---------------------------------------------------------------------------
// Calendar periods
// ---------------------------------------------------------------------------

/// A calendar month. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> LeaseEngineResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(LeaseEngineError::DateError(format!(
                "Month {month} of {year} is outside 1-12"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: (ordinal.rem_euclid(12) + 1) as u32,
        }
    }

    /// The period `months` months after this one.
    pub fn plus_months(self, months: u32) -> Self {
        Self::from_ordinal(self.ordinal() + i64::from(months))
    }

    /// Signed number of months from `earlier` to `self`.
    pub fn months_since(self, earlier: Period) -> i64 {
        self.ordinal() - earlier.ordinal()
    }

    pub fn first_day(self) -> LeaseEngineResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(|| {
            LeaseEngineError::DateError(format!("No calendar date for {}-{:02}", self.year, self.month))
        })
    }

    /// Every period from `self` through `last`, inclusive.
    pub fn through(self, last: Period) -> impl Iterator<Item = Period> {
        (self.ordinal()..=last.ordinal()).map(Period::from_ordinal)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}
