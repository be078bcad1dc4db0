use gamescout_agent::{GateTrigger, KeywordReducer, PriceIntentParser, ToolGate};
use gamescout_core::config::{AppConfig, LoadOptions};
use gamescout_core::domain::PriceIntent;
use serde::Serialize;

use super::{CommandResult, EXIT_CONFIG};

#[derive(Debug, Serialize)]
struct ExplainReport {
    text: String,
    price: PriceIntent,
    matched_rule: Option<&'static str>,
    reduced_query: String,
    tool_required: bool,
    gate_trigger: Option<GateTrigger>,
}

/// Shows what the deterministic layer makes of one message, without contacting
/// any backend.
pub fn run(text: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "explain",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let parser = PriceIntentParser::new();
    let gate = ToolGate::from_config(&config.guard);
    let trigger = gate.evaluate(text);
    let report = ExplainReport {
        text: text.to_string(),
        price: parser.parse(text),
        matched_rule: parser.matched_rule(text),
        reduced_query: KeywordReducer::new().reduce(text),
        tool_required: trigger.is_some(),
        gate_trigger: trigger,
    };

    let message = format!(
        "price mode `{}`, query `{}`, search {}",
        report.price.mode().as_str(),
        report.reduced_query,
        if report.tool_required { "required" } else { "optional" }
    );
    CommandResult::success_with("explain", message, serde_json::to_value(&report).ok())
}
