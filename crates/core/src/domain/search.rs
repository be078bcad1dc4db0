use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::price::{PriceFields, PriceIntent};

pub const DEFAULT_RESULT_LIMIT: u32 = 5;

/// Reconciled arguments for one catalog search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolArguments {
    pub query: String,
    pub limit: u32,
    #[serde(flatten)]
    pub price: PriceIntent,
}

impl ToolArguments {
    pub fn new(query: impl Into<String>, limit: u32, price: PriceIntent) -> Self {
        Self { query: query.into(), limit: limit.max(1), price }
    }

    pub fn with_query(self, query: impl Into<String>) -> Self {
        Self { query: query.into(), ..self }
    }

    pub fn with_price(self, price: PriceIntent) -> Self {
        Self { price, ..self }
    }
}

/// Arguments as the generation backend proposed them, before any guardrail.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProposedArguments {
    pub query: Option<String>,
    pub limit: Option<u32>,
    pub price_fields: PriceFields,
}

impl ProposedArguments {
    /// Reads a decoded argument object. Unknown keys are ignored and values of
    /// the wrong shape read as absent.
    pub fn from_object(object: &serde_json::Map<String, Value>) -> Self {
        let query = object.get("query").and_then(Value::as_str).map(str::to_string);
        let limit = object.get("limit").and_then(truthy_limit);
        let price_fields = PriceFields {
            mode: object
                .get("price_mode")
                .and_then(Value::as_str)
                .and_then(crate::domain::price::PriceMode::parse),
            min: object.get("min_price").and_then(loose_number),
            max: object.get("max_price").and_then(loose_number),
            exact: object.get("exact_price").and_then(loose_number),
            target: object.get("target_price").and_then(loose_number),
            min_inclusive: object.get("min_inclusive").and_then(loose_bool),
            max_inclusive: object.get("max_inclusive").and_then(loose_bool),
        };
        Self { query, limit, price_fields }
    }

    pub fn proposed_price(&self) -> PriceIntent {
        PriceIntent::from_fields(&self.price_fields)
    }
}

/// Outcome of one catalog search, serialized verbatim into the tool result
/// message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub original_query: String,
    pub query_used: String,
    pub fallback_used: bool,
    #[serde(flatten)]
    pub price: PriceIntent,
    pub count: usize,
    pub items: Vec<Value>,
}

fn truthy_limit(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    if !raw.is_finite() || raw < 1.0 {
        return None;
    }
    Some(raw.trunc().min(f64::from(u32::MAX)) as u32)
}

fn loose_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            text.trim().trim_start_matches(['$', '€', '£']).trim().parse::<f64>().ok()
        }
        _ => None,
    }
}

fn loose_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => text.trim().to_ascii_lowercase().parse::<bool>().ok(),
        _ => None,
    }
}
