//! Monetary amounts and their display format.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Maximum fraction digits kept when rendering an amount.
const MAX_FRACTION_DIGITS: usize = 3;

/// A finite monetary amount in major currency units (e.g. `1000.5` USD).
///
/// Catalog rows store prices either as JSON numbers or as numeric strings, so
/// deserialization accepts both.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl ValueObject for Amount {}

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    /// Build an amount from a float, rejecting NaN and infinities.
    pub fn new(value: f64) -> DomainResult<Self> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(DomainError::validation(format!("amount must be finite, got {value}")))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Self(f64::from(value))
    }
}

impl TryFrom<f64> for Amount {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Amount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = trimmed
            .parse::<f64>()
            .map_err(|e| DomainError::validation(format!("invalid amount '{trimmed}': {e}")))?;
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Amount::new(n).map_err(serde::de::Error::custom),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, self.0.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
        let frac_part = frac_part.trim_end_matches('0');

        let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();
        if self.0.is_sign_negative() && !is_zero {
            f.write_str("-")?;
        }
        f.write_str(&group_thousands(int_part))?;
        if !frac_part.is_empty() {
            write!(f, ".{frac_part}")?;
        }
        Ok(())
    }
}

/// Render an amount as `"<CURRENCY> <grouped amount>"`, e.g. `"KES 1,234,567"`.
///
/// Integer digits are grouped in threes with `,`; up to three fraction digits are
/// kept and trailing zeros dropped.
pub fn format_currency(amount: Amount, currency: &str) -> String {
    format!("{currency} {amount}")
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
