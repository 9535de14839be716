use serde::Serialize;

use crate::domain::models::{JsonOut, Record};

/// Emit the `{"ok": true, "data": ...}` envelope on stdout.
pub fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&JsonOut { ok: true, data })?
    );
    Ok(())
}

/// JSON envelope or a single plain line, depending on the output mode.
pub fn print_one<T: Serialize>(
    json: bool,
    data: &T,
    line: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    if json {
        print_json(data)
    } else {
        println!("{}", line());
        Ok(())
    }
}

/// Text listing: a blank opening line, then one indexed entry per record.
pub fn print_plugin_listing(records: &[Record], verbose: bool) {
    println!();
    for (index, record) in records.iter().enumerate() {
        if verbose {
            print_record_verbose(index, record);
        } else {
            println!("{}", record_row(index, record));
        }
    }
}

/// One summary row per record: index, name, description.
fn record_row(index: usize, record: &Record) -> String {
    format!(
        "{}\t{}\t{}",
        index,
        field_str(record, "name"),
        field_str(record, "description")
    )
}

/// Every attribute as an indented `key: value` line; an accumulated
/// `parameters` array gets its own section, one parameter per line.
fn print_record_verbose(index: usize, record: &Record) {
    println!("{}\t{}", index, field_str(record, "name"));
    for (key, value) in record {
        if key == "parameters" {
            continue;
        }
        println!("  {}: {}", key, display_value(value));
    }
    if let Some(serde_json::Value::Array(params)) = record.get("parameters") {
        println!("  parameters ({}):", params.len());
        for param in params {
            println!("    {param}");
        }
    }
}

fn field_str<'a>(record: &'a Record, key: &str) -> &'a str {
    record
        .get(key)
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
