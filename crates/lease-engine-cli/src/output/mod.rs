pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Whether an array holds journal entries (objects with debit and credit lines).
fn is_journal(arr: &[Value]) -> bool {
    arr.first()
        .and_then(Value::as_object)
        .is_some_and(|m| m.contains_key("debits") && m.contains_key("credits"))
}

/// Flatten journal entries into one row per line:
/// date, description, side, account_role, account, amount, memo.
fn journal_rows(entries: &[Value]) -> Vec<[String; 7]> {
    let mut rows = Vec::new();
    for entry in entries {
        let date = field(entry, "date");
        let description = field(entry, "description");
        for side in ["debits", "credits"] {
            let Some(Value::Array(lines)) = entry.get(side) else {
                continue;
            };
            let label = if side == "debits" { "Dr" } else { "Cr" };
            for line in lines {
                rows.push([
                    date.clone(),
                    description.clone(),
                    label.to_string(),
                    field(line, "account_role"),
                    field(line, "account"),
                    field(line, "amount"),
                    field(line, "memo"),
                ]);
            }
        }
    }
    rows
}

const JOURNAL_HEADERS: [&str; 7] = [
    "date",
    "description",
    "side",
    "account_role",
    "account",
    "amount",
    "memo",
];

fn field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
