//! ASC 842 lease calculation engine.
//!
//! Evaluated leaves first: [`payment_schedule`] and [`present_value`] feed
//! [`amortization`], which feeds [`journal_entries`]. [`analysis`] runs the
//! whole pipeline for one lease.

pub mod amortization;
pub mod analysis;
pub mod journal_entries;
pub mod payment_schedule;
pub mod present_value;
pub mod terms;

pub use amortization::{generate_asc842_schedule, AmortizationRow, Asc842Schedule, Asc842Summary};
pub use analysis::{analysis_warnings, analyze_lease, LeaseAnalysis, LeaseAnalysisInput};
pub use journal_entries::{
    generate_initial_journal_entries, generate_monthly_journal_entries,
    generate_monthly_journal_entry, generate_operating_cost_entry, validate_journal_entry,
    initial_entries_for_liability, AccountMapping, AccountRole, JournalEntry, JournalLine,
};
pub use payment_schedule::{
    base_rent_payment_stream, generate_payment_schedule, generate_payment_schedule_with,
    summarize_payment_schedule, AnnualTotal, EscalationRecurrence, PaymentScheduleEntry,
    PaymentScheduleSummary, PaymentType,
};
pub use present_value::{
    calculate_lease_liability, calculate_lease_liability_for_payments, calculate_rou_asset,
    rou_asset_from_liability,
};
pub use terms::{
    EscalationFrequency, EscalationRule, EscalationType, LeaseClassification, LeaseTerms, Period,
    PropertyTaxFrequency,
};
