use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use lease_engine_core::lease_accounting::{
    self as lease, AccountMapping, AmortizationRow, JournalEntry, LeaseAnalysisInput,
    LeaseClassification, LeaseTerms, PaymentScheduleEntry,
};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct Asc842Request {
    terms: LeaseTerms,
    #[serde(default)]
    escalated_payments: Option<Vec<Decimal>>,
}

#[derive(Deserialize)]
struct InitialEntriesRequest {
    terms: LeaseTerms,
    #[serde(default)]
    account_mapping: AccountMapping,
}

#[derive(Deserialize)]
struct MonthlyEntryRequest {
    row: AmortizationRow,
    classification: LeaseClassification,
    #[serde(default)]
    account_mapping: AccountMapping,
}

#[derive(Deserialize)]
struct OperatingCostRequest {
    period_year: i32,
    period_month: u32,
    entries: Vec<PaymentScheduleEntry>,
    #[serde(default)]
    account_mapping: AccountMapping,
}

// ---------------------------------------------------------------------------
// Payment schedule
// ---------------------------------------------------------------------------

/// Input: `{ terms, escalations?, escalation_recurrence? }`
#[napi]
pub fn generate_payment_schedule(input_json: String) -> NapiResult<String> {
    let input: LeaseAnalysisInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lease::generate_payment_schedule_with(
        &input.terms,
        &input.escalations,
        input.escalation_recurrence,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Present value
// ---------------------------------------------------------------------------

/// Returns a decimal string, or `null` when rate or term is missing.
#[napi]
pub fn calculate_lease_liability(terms_json: String) -> NapiResult<String> {
    let terms: LeaseTerms = serde_json::from_str(&terms_json).map_err(to_napi_error)?;
    serde_json::to_string(&lease::calculate_lease_liability(&terms)).map_err(to_napi_error)
}

#[napi]
pub fn calculate_rou_asset(terms_json: String) -> NapiResult<String> {
    let terms: LeaseTerms = serde_json::from_str(&terms_json).map_err(to_napi_error)?;
    serde_json::to_string(&lease::calculate_rou_asset(&terms)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

/// Input: `{ terms, escalated_payments? }`. Returns `null` when rate or term
/// is missing.
#[napi]
pub fn generate_asc842_schedule(input_json: String) -> NapiResult<String> {
    let input: Asc842Request = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lease::generate_asc842_schedule(&input.terms, input.escalated_payments.as_deref());
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Journal entries
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_initial_journal_entries(input_json: String) -> NapiResult<String> {
    let input: InitialEntriesRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lease::generate_initial_journal_entries(&input.terms, &input.account_mapping)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn generate_monthly_journal_entry(input_json: String) -> NapiResult<String> {
    let input: MonthlyEntryRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lease::generate_monthly_journal_entry(
        &input.row,
        input.classification,
        &input.account_mapping,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Returns the entry, or `null` when nothing non-lease is due that month.
#[napi]
pub fn generate_operating_cost_entry(input_json: String) -> NapiResult<String> {
    let input: OperatingCostRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lease::generate_operating_cost_entry(
        input.period_year,
        input.period_month,
        &input.entries,
        &input.account_mapping,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Throws with the debit and credit totals when the entry does not balance.
#[napi]
pub fn validate_journal_entry(entry_json: String) -> NapiResult<()> {
    let entry: JournalEntry = serde_json::from_str(&entry_json).map_err(to_napi_error)?;
    lease::validate_journal_entry(&entry).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_lease(input_json: String) -> NapiResult<String> {
    let input: LeaseAnalysisInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lease::analyze_lease(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
