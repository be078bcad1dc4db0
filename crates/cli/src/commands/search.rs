use gamescout_agent::{GuardrailDecision, GuardrailPolicy};
use gamescout_catalog::backend_from_config;
use gamescout_core::config::{AppConfig, LoadOptions};
use gamescout_core::domain::{ProposedArguments, SearchResult, ToolArguments};
use gamescout_core::{CatalogQueryExecutor, ExecutorSettings};
use serde::Serialize;
use uuid::Uuid;

use super::{CommandResult, EXIT_CATALOG, EXIT_CONFIG, EXIT_RUNTIME};

#[derive(Debug, Serialize)]
struct SearchReport {
    correlation_id: String,
    backend: &'static str,
    decision: GuardrailDecision,
    arguments: ToolArguments,
    result: SearchResult,
}

/// Runs the guarded catalog search a tool call for `text` would run, using the
/// message itself as the proposed query.
pub fn run(text: &str, limit: Option<u32>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "search",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let backend = match backend_from_config(&config.catalog) {
        Ok(backend) => backend,
        Err(error) => {
            return CommandResult::failure(
                "search",
                "catalog_setup",
                format!("catalog backend setup failed: {error}"),
                EXIT_CATALOG,
            );
        }
    };

    let policy = GuardrailPolicy::from_config(&config.guard);
    let proposal =
        ProposedArguments { query: Some(text.to_string()), limit, ..ProposedArguments::default() };
    let reconciliation = policy.reconcile(text, &proposal);
    let executor = CatalogQueryExecutor::new(backend, ExecutorSettings::from_config(&config));
    let correlation_id = Uuid::new_v4().to_string();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "search",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            );
        }
    };

    match runtime.block_on(executor.search(&reconciliation.arguments, &correlation_id)) {
        Ok(result) => {
            let message = format!(
                "{} result(s) for `{}`{}",
                result.count,
                result.query_used,
                if result.fallback_used { " (fallback)" } else { "" }
            );
            let report = SearchReport {
                correlation_id,
                backend: executor.backend().name(),
                decision: reconciliation.decision,
                arguments: reconciliation.arguments,
                result,
            };
            CommandResult::success_with("search", message, serde_json::to_value(&report).ok())
        }
        Err(error) => CommandResult::failure(
            "search",
            "catalog_search",
            format!("catalog search failed: {error}"),
            EXIT_CATALOG,
        ),
    }
}
