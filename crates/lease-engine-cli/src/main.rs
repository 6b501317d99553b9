mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::lease_accounting::{EntriesArgs, LeaseArgs, MonthlyEntriesArgs};

/// ASC 842 lease calculations
#[derive(Parser)]
#[command(
    name = "lease842",
    version,
    about = "ASC 842 lease schedules, measurements and journal entries",
    long_about = "A CLI for ASC 842 lease accounting with decimal precision. Generates \
                  monthly payment schedules, measures the lease liability and ROU asset, \
                  builds the amortization schedule and posts balanced journal entries. \
                  Set RUST_LOG=debug for diagnostics on stderr."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment schedule by category
    PaymentSchedule(LeaseArgs),
    /// Initial lease liability (PV of base rent)
    LeaseLiability(LeaseArgs),
    /// Initial right-of-use asset
    RouAsset(LeaseArgs),
    /// Month-by-month ASC 842 amortization schedule
    Asc842Schedule(LeaseArgs),
    /// Journal entries recognizing the lease at commencement
    InitialEntries(EntriesArgs),
    /// Monthly journal entries over the lease term
    MonthlyEntries(MonthlyEntriesArgs),
    /// Full analysis: schedule, ASC 842 measurement and journal entries
    Analyze(EntriesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Diagnostics go to stderr so stdout stays machine-readable.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::PaymentSchedule(args) => commands::lease_accounting::run_payment_schedule(args),
        Commands::LeaseLiability(args) => commands::lease_accounting::run_lease_liability(args),
        Commands::RouAsset(args) => commands::lease_accounting::run_rou_asset(args),
        Commands::Asc842Schedule(args) => commands::lease_accounting::run_asc842_schedule(args),
        Commands::InitialEntries(args) => commands::lease_accounting::run_initial_entries(args),
        Commands::MonthlyEntries(args) => commands::lease_accounting::run_monthly_entries(args),
        Commands::Analyze(args) => commands::lease_accounting::run_analyze(args),
        Commands::Version => {
            println!("lease842 {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
