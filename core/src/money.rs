//! Conversion of upstream currency amounts into integer cents.
//!
//! # Design
//! The upstream encodes money as decimal strings ("2.99") and, for some
//! totals, as bare JSON numbers (`22.06`). Both are converted from their exact
//! textual form: numbers are captured as raw JSON text, never parsed into
//! `f64`. Strings must carry exactly two fractional digits. JSON numbers drop
//! trailing zeros, so they may carry zero, one or two.

use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;
use thiserror::Error;

/// Reasons a currency value could not be converted into cents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CentsError {
    #[error("empty amount")]
    Empty,

    #[error("malformed amount {0:?}: expected digits with exactly two fractional digits")]
    Malformed(String),

    #[error("amount {0:?} has more than two fractional digits")]
    TooPrecise(String),

    #[error("amount {0:?} does not fit in 64 bits of cents")]
    Overflow(String),
}

/// Convert a two-decimal string such as `"2.99"` into cents (`299`).
///
/// An optional leading `-` is accepted. Anything else that is not
/// `digits "." digit digit` is rejected.
pub fn cents_from_str(raw: &str) -> Result<i64, CentsError> {
    let (negative, unsigned) = split_sign(raw)?;
    let Some((whole, frac)) = unsigned.split_once('.') else {
        return Err(CentsError::Malformed(raw.to_string()));
    };
    if whole.is_empty() || frac.len() != 2 || !all_digits(whole) || !all_digits(frac) {
        return Err(CentsError::Malformed(raw.to_string()));
    }
    combine(raw, negative, whole, frac)
}

/// Convert the textual form of a JSON number into cents.
///
/// `"22.06"` → 2206, `"12.5"` → 1250, `"3"` → 300.
pub fn cents_from_number(raw: &str) -> Result<i64, CentsError> {
    let (negative, unsigned) = split_sign(raw)?;
    let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() || !all_digits(whole) || !all_digits(frac) {
        return Err(CentsError::Malformed(raw.to_string()));
    }
    if frac.len() > 2 {
        return Err(CentsError::TooPrecise(raw.to_string()));
    }
    let mut padded = String::with_capacity(2);
    padded.push_str(frac);
    while padded.len() < 2 {
        padded.push('0');
    }
    combine(raw, negative, whole, &padded)
}

fn split_sign(raw: &str) -> Result<(bool, &str), CentsError> {
    if raw.is_empty() {
        return Err(CentsError::Empty);
    }
    Ok(match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    })
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn combine(raw: &str, negative: bool, whole: &str, frac: &str) -> Result<i64, CentsError> {
    let digits = format!("{whole}{frac}");
    let magnitude: i64 = digits
        .parse()
        .map_err(|_| CentsError::Overflow(raw.to_string()))?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// A currency amount as the upstream sends it: either a decimal string or a
/// bare JSON number. Numbers keep the literal text from the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amount {
    Text(String),
    Number(String),
}

impl Amount {
    pub fn to_cents(&self) -> Result<i64, CentsError> {
        match self {
            Amount::Text(s) => cents_from_str(s),
            Amount::Number(n) => cents_from_number(n),
        }
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Text(String::new())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Parsing into serde_json::Number would round through f64.
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let text = raw.get().trim();
        if text.starts_with('"') {
            serde_json::from_str(text)
                .map(Amount::Text)
                .map_err(serde::de::Error::custom)
        } else {
            Ok(Amount::Number(text.to_string()))
        }
    }
}
