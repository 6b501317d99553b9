use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority, in the
/// result itself and then in any ASC 842 summary, then fall back to the first
/// field in the result object. Entry lists print their length.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "rou_asset",
        "lease_liability",
        "initial_lease_liability",
        "monthly_straight_line_expense",
        "total_lease_cost",
        "total_scheduled",
    ];

    let candidates = [
        Some(result_obj),
        result_obj.get("summary"),
        result_obj.get("asc842").and_then(|a| a.get("summary")),
    ];

    for obj in candidates.into_iter().flatten() {
        if let Value::Object(map) = obj {
            for key in &priority_keys {
                if let Some(val) = map.get(*key) {
                    if !val.is_null() {
                        println!("{}", format_minimal(val));
                        return;
                    }
                }
            }
        }
    }

    match result_obj {
        Value::Array(arr) => println!("{} entries", arr.len()),
        Value::Object(map) => {
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
            }
        }
        other => println!("{}", format_minimal(other)),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
