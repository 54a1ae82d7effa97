use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// One rate-limit record as pushed by the control plane for the 3-column table.
///
/// Records must be JSON objects, and a record carrying both spellings of a
/// field (`id` and `Id`) is a duplicate: either way the whole frame is
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneSample {
    #[serde(default, alias = "Id")]
    pub id: Value,
    #[serde(default, alias = "Last")]
    pub last: Value,
    #[serde(default, alias = "Excess")]
    pub excess: Value,
}

/// One rate-limit record for the 4-column table.
///
/// The control plane marshals its entries with Go's default field names
/// (`Key`, `Zone`, `Last`, `Excess`), so both spellings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneKeySample {
    #[serde(default, alias = "Key")]
    pub key: Value,
    #[serde(default, alias = "Zone")]
    pub zone: Value,
    #[serde(default, alias = "Last")]
    pub last: Value,
    #[serde(default, alias = "Excess")]
    pub excess: Value,
}

pub fn parse_instances(payload: &str) -> Result<Vec<String>> {
    Ok(serde_json::from_str(payload)?)
}

pub fn parse_zone_samples(payload: &str) -> Result<Vec<ZoneSample>> {
    Ok(serde_json::from_str(payload)?)
}

pub fn parse_zone_key_samples(payload: &str) -> Result<Vec<ZoneKeySample>> {
    Ok(serde_json::from_str(payload)?)
}

/// Text a browser shows after `cell.textContent = value`.
///
/// Strings pass through untouched, `null` (and missing fields) become empty,
/// numbers use the shortest decimal form without a trailing `.0`, arrays are
/// joined with commas and objects collapse to `[object Object]`.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::Array(items) => items
            .iter()
            .map(cell_text)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) => js_number_text(f),
        None => n.to_string(),
    }
}

/// `Number.prototype.toString()`: shortest round-trip digits, plain notation
/// for exponents in `-7..21`, `1e+21` / `1.5e-7` style outside.
fn js_number_text(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    // `{:e}` gives the shortest digits, e.g. "-1.5e300"
    let sci = format!("{:e}", f.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return f.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return f.to_string();
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    let n = exp + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        format!("{}.{}", &digits[..n as usize], &digits[n as usize..])
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{}", (n - 1).abs())
        } else {
            format!("{first}.{rest}e{sign}{}", (n - 1).abs())
        }
    };

    if f < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}
