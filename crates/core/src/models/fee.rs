use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A fee or template variable value. Inputs arrive either as JSON numbers or
/// as strings; numeric strings are resolved to `Numeric` once, here, so
/// downstream code never re-parses them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeeValue {
    Numeric(f64),
    Text(String),
}

impl FeeValue {
    pub fn resolve(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => FeeValue::Numeric(value),
            _ => FeeValue::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeeValue::Numeric(value) => Some(*value),
            FeeValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FeeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeValue::Numeric(value) => write!(f, "{:.2}", value),
            FeeValue::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFeeValue {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for FeeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawFeeValue::deserialize(deserializer)? {
            RawFeeValue::Number(value) => FeeValue::Numeric(value),
            RawFeeValue::Text(text) => FeeValue::resolve(&text),
        })
    }
}
