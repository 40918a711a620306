// export/literal.rs
// Renders values and identifiers as SQL literals for the replay script.

use crate::db::models::Value;
use std::fmt::Write;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Double-quotes an identifier, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quotes text, doubling any embedded quote.
pub fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Numeric(text) => text.clone(),
        Value::Text(s) => quote_text(s),
        Value::Date(d) => quote_text(&d.format(DATE_FORMAT).to_string()),
        Value::Timestamp(ts) => quote_text(&ts.format(TIMESTAMP_FORMAT).to_string()),
        Value::TimestampTz(ts) => quote_text(&format!("{}+00:00", ts.format(TIMESTAMP_FORMAT))),
        Value::Time(t) => quote_text(&t.format(TIME_FORMAT).to_string()),
        Value::Uuid(u) => quote_text(&u.hyphenated().to_string()),
        Value::Json(text) => quote_text(text),
        Value::Bytes(bytes) => format_blob(bytes),
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        quote_text("NaN")
    } else if f.is_infinite() {
        quote_text(if f > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        // Debug keeps the fractional part on whole numbers ("2.0", not "2")
        format!("{:?}", f)
    }
}

fn format_blob(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("X'");
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out.push('\'');
    out
}

/// One `INSERT` statement for a single row, newline-terminated.
pub fn format_insert(table: &str, row: &[Value]) -> String {
    let values = row.iter().map(format_value).collect::<Vec<_>>().join(", ");
    format!("INSERT INTO {} VALUES ({});\n", quote_identifier(table), values)
}

pub fn format_delete(table: &str) -> String {
    format!("DELETE FROM {};\n", quote_identifier(table))
}
