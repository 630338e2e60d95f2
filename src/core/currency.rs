use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Currencies accepted by the SNAP endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Indonesian Rupiah
    #[default]
    IDR,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::IDR => write!(f, "IDR"),
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IDR" => Ok(Currency::IDR),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}

/// SNAP money object: `{"value": "10000.00", "currency": "IDR"}`
///
/// Values travel as strings with exactly two decimal places. Incoming
/// payloads sometimes carry a bare number or `null`; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Amount {
    #[serde(default, deserialize_with = "lenient_value")]
    pub value: String,
    #[serde(default = "default_currency", deserialize_with = "lenient_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    Currency::IDR.to_string()
}

fn lenient_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_currency<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_currency))
}

impl Amount {
    /// Build an amount in the given currency, formatted to two decimals
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self {
            value: format_snap_value(value),
            currency: currency.to_string(),
        }
    }

    /// Build an IDR amount
    pub fn idr(value: Decimal) -> Self {
        Self::new(value, Currency::IDR)
    }

    /// Numeric value, zero when absent or unparseable
    pub fn decimal_value(&self) -> Decimal {
        Decimal::from_str(self.value.trim()).unwrap_or(Decimal::ZERO)
    }
}

/// Format a value the way SNAP expects (`"10000.00"`)
pub fn format_snap_value(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}
