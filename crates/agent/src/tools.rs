use std::sync::OnceLock;

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use gamescout_core::domain::{PriceMode, ProposedArguments, ToolCall};
use gamescout_core::{CatalogError, CatalogQueryExecutor};

use crate::guardrails::{GuardrailDecision, GuardrailPolicy};

pub const SEARCH_GAMES: &str = "search_games";

/// Closed set of tools the orchestrator can dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolKind {
    SearchGames,
    Unknown(String),
}

impl ToolKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            SEARCH_GAMES => Self::SearchGames,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::SearchGames => SEARCH_GAMES,
            Self::Unknown(name) => name,
        }
    }
}

/// Tool definitions offered to the generation backend, built once.
pub fn tool_schemas() -> &'static Value {
    static SCHEMAS: OnceLock<Value> = OnceLock::new();
    SCHEMAS.get_or_init(|| Value::Array(vec![search_games_schema()]))
}

fn search_games_schema() -> Value {
    let modes = PriceMode::ALL.iter().map(PriceMode::as_str).collect::<Vec<_>>();
    json!({
        "type": "function",
        "function": {
            "name": SEARCH_GAMES,
            "description":
                "Search the game catalog. Only set price fields when the user stated a price.",
            "parameters": {
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Keywords describing the games."},
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "How many results to return."
                    },
                    "price_mode": {"type": "string", "enum": modes},
                    "min_price": {"type": "number"},
                    "max_price": {"type": "number"},
                    "exact_price": {"type": "number"},
                    "target_price": {"type": "number"},
                    "min_inclusive": {"type": "boolean"},
                    "max_inclusive": {"type": "boolean"}
                },
                "required": ["query"]
            }
        }
    })
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ArgumentDecodeError {
    #[error("tool arguments are not valid JSON: {0}")]
    InvalidJson(String),
    #[error("tool arguments must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Tool-call arguments arrive as an object or as a JSON-encoded string.
/// Null and blank strings are an empty argument set.
pub fn decode_arguments(raw: &Value) -> Result<Map<String, Value>, ArgumentDecodeError> {
    match raw {
        Value::Object(object) => Ok(object.clone()),
        Value::Null => Ok(Map::new()),
        Value::String(text) if text.trim().is_empty() => Ok(Map::new()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(object)) => Ok(object),
            Ok(Value::Null) => Ok(Map::new()),
            Ok(other) => Err(ArgumentDecodeError::NotAnObject(kind(&other))),
            Err(error) => Err(ArgumentDecodeError::InvalidJson(error.to_string())),
        },
        other => Err(ArgumentDecodeError::NotAnObject(kind(other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Runs resolved tool calls: guardrail reconciliation, then the catalog query.
#[derive(Clone)]
pub struct ToolExecutor {
    guardrails: GuardrailPolicy,
    catalog: CatalogQueryExecutor,
}

impl ToolExecutor {
    pub fn new(guardrails: GuardrailPolicy, catalog: CatalogQueryExecutor) -> Self {
        Self { guardrails, catalog }
    }

    pub fn guardrails(&self) -> &GuardrailPolicy {
        &self.guardrails
    }

    pub fn catalog(&self) -> &CatalogQueryExecutor {
        &self.catalog
    }

    /// Returns the JSON content of the tool message answering `call`.
    pub async fn execute(
        &self,
        call: &ToolCall,
        user_text: &str,
        correlation_id: &str,
    ) -> Result<Value, CatalogError> {
        match ToolKind::from_name(&call.name) {
            ToolKind::SearchGames => self.search_games(call, user_text, correlation_id).await,
            ToolKind::Unknown(name) => {
                warn!(
                    event_name = "chat.tool.unknown",
                    correlation_id,
                    tool = %name,
                    "model requested an unknown tool"
                );
                Ok(json!({ "error": format!("unknown tool `{name}`"), "tool": name }))
            }
        }
    }

    async fn search_games(
        &self,
        call: &ToolCall,
        user_text: &str,
        correlation_id: &str,
    ) -> Result<Value, CatalogError> {
        let object = decode_arguments(&call.arguments).unwrap_or_else(|error| {
            warn!(
                event_name = "chat.tool.arguments_malformed",
                correlation_id,
                tool_call_id = %call.id,
                error = %error,
                "tool arguments could not be decoded; using an empty argument set"
            );
            Map::new()
        });

        let proposal = ProposedArguments::from_object(&object);
        let reconciliation = self.guardrails.reconcile(user_text, &proposal);
        log_decision(&reconciliation.decision, correlation_id);

        let result = self.catalog.search(&reconciliation.arguments, correlation_id).await?;
        info!(
            event_name = "chat.tool.executed",
            correlation_id,
            tool = SEARCH_GAMES,
            tool_call_id = %call.id,
            query_used = %result.query_used,
            price_mode = result.price.mode().as_str(),
            count = result.count,
            "tool call executed"
        );

        serde_json::to_value(&result).map_err(|error| CatalogError::Decode(error.to_string()))
    }
}

fn log_decision(decision: &GuardrailDecision, correlation_id: &str) {
    match decision {
        GuardrailDecision::Accepted => {}
        GuardrailDecision::Discarded { reason_code } => info!(
            event_name = "guardrail.price.discarded",
            correlation_id,
            reason_code,
            "model price fields discarded"
        ),
        GuardrailDecision::Overridden { reason_code } => info!(
            event_name = "guardrail.price.overridden",
            correlation_id,
            reason_code,
            "model price fields replaced by user text"
        ),
    }
}
