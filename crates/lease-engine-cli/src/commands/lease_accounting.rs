use std::collections::BTreeSet;
use std::time::Instant;

use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use lease_engine_core::lease_accounting::{
    analysis_warnings, analyze_lease, base_rent_payment_stream, calculate_lease_liability,
    calculate_lease_liability_for_payments, calculate_rou_asset, generate_asc842_schedule,
    generate_initial_journal_entries, generate_monthly_journal_entries,
    generate_operating_cost_entry, generate_payment_schedule_with, initial_entries_for_liability,
    rou_asset_from_liability, summarize_payment_schedule, EscalationRecurrence, LeaseAnalysisInput,
    LeaseTerms, PaymentScheduleEntry, PaymentScheduleSummary,
};
use lease_engine_core::types::{with_metadata, Money};

use crate::input;

type CmdResult = Result<Value, Box<dyn std::error::Error>>;

/// Arguments shared by every lease command
#[derive(Args)]
pub struct LeaseArgs {
    /// Path to JSON input file: bare lease terms, or a request with `terms`,
    /// `escalations` and `account_mapping`
    #[arg(long)]
    pub input: Option<String>,

    /// Apply each escalation rule once on its effective date, ignoring its frequency
    #[arg(long)]
    pub single_step_escalations: bool,

    /// Measure against a flat base_rent_monthly instead of the scheduled
    /// (escalated and abated) base-rent stream
    #[arg(long)]
    pub flat_rent: bool,
}

/// Arguments for commands that post journal entries
#[derive(Args)]
pub struct EntriesArgs {
    #[command(flatten)]
    pub lease: LeaseArgs,

    /// Account mapping file (JSON, or YAML for .yml/.yaml); overrides any
    /// `account_mapping` in the input
    #[arg(long)]
    pub mapping: Option<String>,
}

/// Arguments for monthly journal entries
#[derive(Args)]
pub struct MonthlyEntriesArgs {
    #[command(flatten)]
    pub entries: EntriesArgs,

    /// Also post CAM / tax / insurance / utilities for each month
    #[arg(long)]
    pub include_operating_costs: bool,
}

#[derive(Serialize)]
struct Measurement {
    lease_liability: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rou_asset: Option<Decimal>,
}

#[derive(Serialize)]
struct PaymentScheduleOutput {
    entries: Vec<PaymentScheduleEntry>,
    summary: PaymentScheduleSummary,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn run_payment_schedule(args: LeaseArgs) -> CmdResult {
    let start = Instant::now();
    let request = load_request(&args, None)?;
    let entries = schedule_for(&request)?;
    let summary = summarize_payment_schedule(&entries);
    let output = with_metadata(
        "Monthly payment schedule by category with escalations and abatement",
        &request,
        analysis_warnings(&request),
        elapsed_us(start),
        PaymentScheduleOutput { entries, summary },
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_lease_liability(args: LeaseArgs) -> CmdResult {
    let start = Instant::now();
    let request = load_request(&args, None)?;
    let lease_liability = match lease_payments(&args, &request)? {
        Some(stream) => calculate_lease_liability_for_payments(&request.terms, Some(&stream)),
        None => calculate_lease_liability(&request.terms),
    };
    let output = with_metadata(
        "Lease liability: PV of base rent in arrears at discount_rate / 12",
        &request,
        analysis_warnings(&request),
        elapsed_us(start),
        Measurement {
            lease_liability,
            rou_asset: None,
        },
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_rou_asset(args: LeaseArgs) -> CmdResult {
    let start = Instant::now();
    let request = load_request(&args, None)?;
    let terms = &request.terms;
    let (lease_liability, rou_asset) = match lease_payments(&args, &request)? {
        Some(stream) => {
            let liability = calculate_lease_liability_for_payments(terms, Some(&stream));
            (liability, liability.map(|l| rou_asset_from_liability(terms, l)))
        }
        None => (calculate_lease_liability(terms), calculate_rou_asset(terms)),
    };
    let output = with_metadata(
        "ROU asset = lease liability + initial direct costs + prepaid rent - incentives",
        &request,
        analysis_warnings(&request),
        elapsed_us(start),
        Measurement {
            lease_liability,
            rou_asset,
        },
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_asc842_schedule(args: LeaseArgs) -> CmdResult {
    let start = Instant::now();
    let request = load_request(&args, None)?;
    let stream = lease_payments(&args, &request)?;
    let schedule = generate_asc842_schedule(&request.terms, stream.as_deref());
    let output = with_metadata(
        "ASC 842 amortization: effective interest liability, straight-line (operating) \
         or straight-line ROU amortization (finance)",
        &request,
        analysis_warnings(&request),
        elapsed_us(start),
        schedule,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_initial_entries(args: EntriesArgs) -> CmdResult {
    let start = Instant::now();
    let request = load_request(&args.lease, args.mapping.as_deref())?;
    let terms = &request.terms;
    let mapping = &request.account_mapping;
    let entries = match lease_payments(&args.lease, &request)? {
        Some(stream) => match calculate_lease_liability_for_payments(terms, Some(&stream)) {
            Some(liability) => initial_entries_for_liability(terms, liability, mapping)?,
            None => Vec::new(),
        },
        None => generate_initial_journal_entries(terms, mapping)?,
    };
    let output = with_metadata(
        "Initial recognition: ROU asset against lease liability, IDC, prepaid rent and incentives",
        &request,
        analysis_warnings(&request),
        elapsed_us(start),
        entries,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_monthly_entries(args: MonthlyEntriesArgs) -> CmdResult {
    let start = Instant::now();
    let lease_args = &args.entries.lease;
    let request = load_request(lease_args, args.entries.mapping.as_deref())?;
    let terms = &request.terms;
    let mapping = &request.account_mapping;

    let stream = lease_payments(lease_args, &request)?;
    let mut entries = match generate_asc842_schedule(terms, stream.as_deref()) {
        Some(schedule) => {
            generate_monthly_journal_entries(&schedule.schedule, terms.classification, mapping)?
        }
        None => Vec::new(),
    };

    if args.include_operating_costs {
        let scheduled = schedule_for(&request)?;
        let periods: BTreeSet<(i32, u32)> = scheduled
            .iter()
            .map(|e| (e.period_year, e.period_month))
            .collect();
        for (year, month) in periods {
            if let Some(entry) = generate_operating_cost_entry(year, month, &scheduled, mapping)? {
                entries.push(entry);
            }
        }
        entries.sort_by_key(|e| e.date);
    }

    let output = with_metadata(
        "Monthly lease journal entries",
        &request,
        analysis_warnings(&request),
        elapsed_us(start),
        entries,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_analyze(args: EntriesArgs) -> CmdResult {
    let request = load_request(&args.lease, args.mapping.as_deref())?;
    let result = analyze_lease(&request)?;
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read the request from `--input` or piped stdin and apply flag overrides.
fn load_request(
    args: &LeaseArgs,
    mapping_path: Option<&str>,
) -> Result<LeaseAnalysisInput, Box<dyn std::error::Error>> {
    let data = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for lease commands".into());
    };

    let mut request: LeaseAnalysisInput = if data.get("terms").is_some() {
        serde_json::from_value(data)?
    } else {
        let terms: LeaseTerms = serde_json::from_value(data)?;
        LeaseAnalysisInput {
            terms,
            escalations: Vec::new(),
            account_mapping: Default::default(),
            escalation_recurrence: EscalationRecurrence::default(),
        }
    };

    if args.single_step_escalations {
        request.escalation_recurrence = EscalationRecurrence::SingleStep;
    }
    if let Some(path) = mapping_path {
        request.account_mapping = input::file::read_account_mapping(path)?;
    }
    debug!(
        escalations = request.escalations.len(),
        recurrence = ?request.escalation_recurrence,
        "lease request loaded"
    );
    Ok(request)
}

fn schedule_for(
    request: &LeaseAnalysisInput,
) -> Result<Vec<PaymentScheduleEntry>, Box<dyn std::error::Error>> {
    Ok(generate_payment_schedule_with(
        &request.terms,
        &request.escalations,
        request.escalation_recurrence,
    )?)
}

/// The scheduled base-rent stream, or `None` under `--flat-rent`.
fn lease_payments(
    args: &LeaseArgs,
    request: &LeaseAnalysisInput,
) -> Result<Option<Vec<Money>>, Box<dyn std::error::Error>> {
    if args.flat_rent {
        return Ok(None);
    }
    let entries = schedule_for(request)?;
    Ok(Some(base_rent_payment_stream(&entries, &request.terms)))
}

fn elapsed_us(start: Instant) -> u64 {
    start.elapsed().as_micros() as u64
}
