//! Lenient numeric input
//!
//! Gram quantities and nutrient densities arrive as whatever the user typed or
//! a provider returned: a number, a string, or nothing at all. Everything is
//! coerced to `f64` at the point of use, with unusable values counting as zero.

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// A numeric field as entered
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl NumericInput {
    /// Coerce to a number; malformed, empty, missing or non-finite values become 0.0
    pub fn value(&self) -> f64 {
        let parsed = match self {
            NumericInput::Number(n) => Some(*n),
            NumericInput::Text(s) => parse_leading_float(s),
            NumericInput::Missing => None,
        };
        match parsed {
            Some(n) if n.is_finite() => n,
            _ => 0.0,
        }
    }

    /// Whether the field holds something that coerces to a real number
    pub fn is_numeric(&self) -> bool {
        match self {
            NumericInput::Number(n) => n.is_finite(),
            NumericInput::Text(s) => parse_leading_float(s).is_some_and(f64::is_finite),
            NumericInput::Missing => false,
        }
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

impl From<Option<f64>> for NumericInput {
    fn from(value: Option<f64>) -> Self {
        value.map_or(NumericInput::Missing, NumericInput::Number)
    }
}

impl ToSql for NumericInput {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            NumericInput::Number(n) => ToSqlOutput::from(*n),
            NumericInput::Text(s) => ToSqlOutput::from(s.as_str()),
            NumericInput::Missing => ToSqlOutput::from(rusqlite::types::Null),
        })
    }
}

impl FromSql for NumericInput {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => NumericInput::Missing,
            ValueRef::Integer(i) => NumericInput::Number(i as f64),
            ValueRef::Real(f) => NumericInput::Number(f),
            ValueRef::Text(t) => NumericInput::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(_) => NumericInput::Missing,
        })
    }
}

/// Parse the longest numeric prefix of `s`, skipping leading whitespace.
///
/// `"150"` -> 150, `" 12.5g"` -> 12.5, `"1e2kcal"` -> 100, `"abc"` -> None.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let trimmed = s.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        end = frac_end;
    }

    if mantissa_digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    trimmed[..end].parse::<f64>().ok()
}
