//! End-to-end lease analysis.
//!
//! Runs the whole pipeline for one lease: payment schedule, escalated
//! base-rent stream, ASC 842 schedule, initial and monthly journal entries.
//! The result is wrapped in the standard computation envelope so callers see
//! the assumptions and any warnings alongside the numbers.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info_span, warn};

use crate::types::{with_metadata, ComputationOutput, Money};
use crate::LeaseEngineResult;

use super::amortization::{generate_asc842_schedule, Asc842Schedule};
use super::journal_entries::{
    generate_monthly_journal_entries, initial_entries_for_liability, AccountMapping, JournalEntry,
};
use super::payment_schedule::{
    base_rent_payment_stream, generate_payment_schedule_with, summarize_payment_schedule,
    EscalationRecurrence, PaymentScheduleEntry, PaymentScheduleSummary,
};
use super::terms::{EscalationRule, EscalationType, LeaseTerms};

/// Everything needed to analyze one lease.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseAnalysisInput {
    pub terms: LeaseTerms,
    #[serde(default)]
    pub escalations: Vec<EscalationRule>,
    #[serde(default)]
    pub account_mapping: AccountMapping,
    #[serde(default)]
    pub escalation_recurrence: EscalationRecurrence,
}

/// Full output of [`analyze_lease`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseAnalysis {
    pub payment_schedule: Vec<PaymentScheduleEntry>,
    pub payment_summary: PaymentScheduleSummary,
    /// Base-rent stream over the lease term fed into the ASC 842 schedule
    pub lease_payments: Vec<Money>,
    /// `None` until a discount rate and lease term are available
    pub asc842: Option<Asc842Schedule>,
    pub initial_journal_entries: Vec<JournalEntry>,
    pub monthly_journal_entries: Vec<JournalEntry>,
}

/// Analyze a lease end to end.
pub fn analyze_lease(
    input: &LeaseAnalysisInput,
) -> LeaseEngineResult<ComputationOutput<LeaseAnalysis>> {
    let start = Instant::now();
    let _span = info_span!("analyze_lease", commencement = %input.terms.commencement_date).entered();
    let terms = &input.terms;
    let warnings = analysis_warnings(input);
    for w in &warnings {
        warn!("{w}");
    }

    let payment_schedule =
        generate_payment_schedule_with(terms, &input.escalations, input.escalation_recurrence)?;
    let payment_summary = summarize_payment_schedule(&payment_schedule);
    let lease_payments = base_rent_payment_stream(&payment_schedule, terms);

    let asc842 = generate_asc842_schedule(terms, Some(&lease_payments));
    let (initial_journal_entries, monthly_journal_entries) = match &asc842 {
        Some(schedule) => (
            initial_entries_for_liability(
                terms,
                schedule.summary.initial_lease_liability,
                &input.account_mapping,
            )?,
            generate_monthly_journal_entries(
                &schedule.schedule,
                terms.classification,
                &input.account_mapping,
            )?,
        ),
        None => (Vec::new(), Vec::new()),
    };

    let output = LeaseAnalysis {
        payment_schedule,
        payment_summary,
        lease_payments,
        asc842,
        initial_journal_entries,
        monthly_journal_entries,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "ASC 842 lease schedule: effective interest liability, monthly rate = annual / 12",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Data-quality warnings for a lease request: missing ASC 842 inputs, a term
/// that disagrees with the calendar dates, skipped escalation rules and CPI
/// placeholders.
pub fn analysis_warnings(input: &LeaseAnalysisInput) -> Vec<String> {
    let terms = &input.terms;
    let mut warnings = Vec::new();

    if !terms.has_asc842_inputs() {
        warnings.push(format!(
            "ASC 842 data unavailable: discount_rate ({}) and lease_term_months ({}) must both be positive",
            terms.discount_rate, terms.lease_term_months
        ));
    }

    let calendar_months = terms.calendar_months();
    if terms.lease_term_months > 0 && terms.lease_term_months != calendar_months {
        warnings.push(format!(
            "lease_term_months ({}) differs from the {} calendar months between commencement and expiration",
            terms.lease_term_months, calendar_months
        ));
    }

    for (i, rule) in input.escalations.iter().enumerate() {
        if rule.rent_step().is_none() {
            warnings.push(format!(
                "Escalation rule {i} ({:?}, effective {}) has no increase value and was skipped",
                rule.escalation_type, rule.effective_date
            ));
        } else if rule.escalation_type == EscalationType::Cpi {
            warnings.push(format!(
                "Escalation rule {i} is CPI-linked; the assumed {} increase is a placeholder and the schedule must be regenerated once the actual index is known",
                rule.percentage_increase.unwrap_or_default()
            ));
        }
    }

    warnings
}
