use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_PRICE_FIELD: &str = "price";

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];
const CURRENCY_CODES: [&str; 9] = ["usd", "us", "eur", "gbp", "jpy", "cad", "aud", "ca", "au"];

/// An opaque catalog record. Only the price field is interpreted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogItem(pub Map<String, Value>);

impl CatalogItem {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Parsed price, or `None` when the field is missing or not a
    /// non-negative finite amount.
    pub fn price(&self, price_field: &str) -> Option<f64> {
        self.0.get(price_field).and_then(parse_price)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for CatalogItem {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

pub fn parse_price(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_price_text(text),
        _ => None,
    }?;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

fn parse_price_text(raw: &str) -> Option<f64> {
    let text = raw.trim();
    let start = text.find(|ch: char| ch.is_ascii_digit())?;
    let (prefix, rest) = text.split_at(start);
    if prefix.trim_end().ends_with('-') || !is_currency_marker(prefix) {
        return None;
    }

    let end = rest
        .find(|ch: char| !(ch.is_ascii_digit() || ch == ',' || ch == '.'))
        .unwrap_or(rest.len());
    let (number, suffix) = rest.split_at(end);
    if !is_currency_marker(suffix) {
        return None;
    }

    number.replace(',', "").parse::<f64>().ok()
}

fn is_currency_marker(text: &str) -> bool {
    let stripped = text
        .chars()
        .filter(|ch| !ch.is_whitespace() && !CURRENCY_SYMBOLS.contains(ch))
        .collect::<String>()
        .to_ascii_lowercase();
    stripped.is_empty() || CURRENCY_CODES.contains(&stripped.as_str())
}
