//! Field-level codecs: integer-cents currency, DDMMYY dates, fixed-width text.
//!
//! Decoding is deliberately tolerant: bank return files are frequently
//! malformed and every helper degrades to a documented default (0, empty
//! string, "000000") instead of failing. Callers that need validation must
//! pre-check.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{CnabError, Result};

/// Padding rule for a fixed-width field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pad {
    /// Numeric fields: pad left with '0'.
    LeftZero,
    /// Text fields: pad right with ' '.
    RightSpace,
}

/// Decodes a zero-padded digit run as integer cents. Returns 0 when the
/// substring is shorter than `width` or not a plain non-negative integer.
pub fn decode_currency_cents(raw: &str, width: usize) -> i64 {
    let Some(digits) = raw.get(..width) else {
        return 0;
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    digits.parse().unwrap_or(0)
}

pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Cents from an exact decimal amount, rounded to the nearest integer.
pub fn decimal_to_cents(amount: Decimal) -> i64 {
    (amount * Decimal::from(100)).round().to_i64().unwrap_or(0)
}

/// Cents from a currency string in any of the accepted shapes:
/// `"R$ 1.234,56"`, `"1.234,56"`, `"1234,56"`, `"1234.56"`, `"1234"`.
/// Returns 0 on anything unparseable.
pub fn currency_to_cents(raw: &str) -> i64 {
    match normalize_currency(raw) {
        Some(normalized) => normalized
            .parse::<Decimal>()
            .map(decimal_to_cents)
            .unwrap_or(0),
        None => 0,
    }
}

/// Strips the currency symbol and normalizes the decimal separator to '.'.
/// `None` when the cleaned string is not digits plus separators.
fn normalize_currency(raw: &str) -> Option<String> {
    let cleaned = raw.replace("R$", "").replace(' ', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    let shape = Regex::new(r"^-?\d[\d.,]*$").ok()?;
    if !shape.is_match(cleaned) {
        return None;
    }
    let normalized = if cleaned.contains(',') && cleaned.contains('.') {
        // Brazilian thousands form: 1.234,56
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.matches(',').count() == 1 {
        cleaned.replace(',', ".")
    } else {
        cleaned.to_string()
    };
    Some(normalized)
}

/// Truncates to `width` when longer, pads with the given rule when shorter.
/// Truncation is silent, as the fixed-width format demands.
pub fn encode_fixed_width(value: &str, width: usize, pad: Pad) -> String {
    match pad {
        Pad::LeftZero => {
            let mut s: String = if value.chars().count() < width {
                "0".repeat(width - value.chars().count()) + value
            } else {
                value.to_string()
            };
            s.truncate(
                s.char_indices()
                    .nth(width)
                    .map(|(i, _)| i)
                    .unwrap_or(s.len()),
            );
            s
        }
        Pad::RightSpace => {
            let mut s: String = value.chars().take(width).collect();
            while s.chars().count() < width {
                s.push(' ');
            }
            s
        }
    }
}

/// Writes cents zero-padded to `width` digits. A value that needs more
/// digits than the field has is a monetary corruption risk, not a
/// formatting detail, so it is an error rather than a silent truncation.
pub fn encode_cents(cents: i64, width: usize, field: &'static str) -> Result<String> {
    let digits = cents.to_string();
    if cents < 0 || digits.len() > width {
        return Err(CnabError::FieldOverflow {
            field,
            width,
            cents,
        });
    }
    Ok(encode_fixed_width(&digits, width, Pad::LeftZero))
}

/// DDMMYY field text to the DD/MM/YYYY display form. Blank input decodes
/// to an empty string; an undateable value passes through unchanged.
pub fn decode_date_ddmmyy(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(raw, "%d%m%y") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// DD/MM/YYYY display form back to 6 raw digits. A value that is already
/// 6 digits passes through; everything else becomes the "000000" no-date
/// sentinel.
pub fn encode_date_to_ddmmyy(display: &str) -> String {
    let display = display.trim();
    if display.contains('/') && display.len() == 10 {
        let parts: Vec<&str> = display.split('/').collect();
        if parts.len() == 3 {
            let day = encode_fixed_width(parts[0], 2, Pad::LeftZero);
            let month = encode_fixed_width(parts[1], 2, Pad::LeftZero);
            let tail: String = parts[2].chars().rev().take(2).collect();
            let year: String = tail.chars().rev().collect();
            return format!("{day}{month}{year}");
        }
    }
    if display.len() == 6 && display.bytes().all(|b| b.is_ascii_digit()) {
        return display.to_string();
    }
    "000000".to_string()
}
