use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical `+<digits>` phone number. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    /// Normalizes `raw`, returning `None` when it holds no phone number.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_phone(raw);
        if normalized.is_empty() {
            return None;
        }
        Some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `other` appears anywhere inside this number.
    pub fn contains(&self, other: &NormalizedPhone) -> bool {
        self.0.contains(other.as_str())
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NormalizedPhone {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::InvalidPhone(s.to_string()))
    }
}

impl TryFrom<String> for NormalizedPhone {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NormalizedPhone> for String {
    fn from(value: NormalizedPhone) -> Self {
        value.0
    }
}

/// Reduces a text fragment to `+<digits>`.
///
/// Everything before the first `+` is dropped, as is every later character
/// that is not an ASCII digit (a second `+` included). Returns an empty string
/// when the fragment has no `+` or no digits follow it. Both the CSV loader
/// and the page extractor go through this function.
pub fn normalize_phone(raw: &str) -> String {
    let Some(start) = raw.find('+') else {
        return String::new();
    };

    let mut out = String::with_capacity(raw.len() - start);
    out.push('+');
    for ch in raw[start + 1..].chars() {
        if ch.is_ascii_digit() {
            out.push(ch);
        }
    }

    if out.len() == 1 {
        return String::new();
    }
    out
}
