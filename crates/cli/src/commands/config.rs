use std::env;
use std::fs;
use std::path::Path;

use gamescout_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let api_key = config
        .llm
        .api_key
        .as_ref()
        .map(|key| redact_secret(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    let gate_keywords = config
        .guard
        .gate_keywords
        .as_ref()
        .map(|keywords| keywords.join(","))
        .unwrap_or_else(|| "<built-in>".to_string());

    let entries = vec![
        entry("llm.provider", format!("{:?}", config.llm.provider), &["GAMESCOUT_LLM_PROVIDER"]),
        entry("llm.base_url", config.llm.base_url.clone(), &["GAMESCOUT_LLM_BASE_URL"]),
        entry("llm.model", config.llm.model.clone(), &["GAMESCOUT_LLM_MODEL"]),
        entry("llm.api_key", api_key, &["GAMESCOUT_LLM_API_KEY"]),
        entry(
            "llm.timeout_secs",
            config.llm.timeout_secs.to_string(),
            &["GAMESCOUT_LLM_TIMEOUT_SECS"],
        ),
        entry(
            "llm.temperature",
            config.llm.temperature.to_string(),
            &["GAMESCOUT_LLM_TEMPERATURE"],
        ),
        entry("catalog.base_url", config.catalog.base_url.clone(), &["GAMESCOUT_CATALOG_BASE_URL"]),
        entry(
            "catalog.search_path",
            config.catalog.search_path.clone(),
            &["GAMESCOUT_CATALOG_SEARCH_PATH"],
        ),
        entry(
            "catalog.timeout_secs",
            config.catalog.timeout_secs.to_string(),
            &["GAMESCOUT_CATALOG_TIMEOUT_SECS"],
        ),
        entry(
            "catalog.price_field",
            config.catalog.price_field.clone(),
            &["GAMESCOUT_CATALOG_PRICE_FIELD"],
        ),
        entry(
            "catalog.use_fixtures",
            config.catalog.use_fixtures.to_string(),
            &["GAMESCOUT_CATALOG_USE_FIXTURES"],
        ),
        entry(
            "guard.default_limit",
            config.guard.default_limit.to_string(),
            &["GAMESCOUT_GUARD_DEFAULT_LIMIT"],
        ),
        entry(
            "guard.max_limit",
            config.guard.max_limit.map_or_else(|| "<unbounded>".to_string(), |cap| cap.to_string()),
            &["GAMESCOUT_GUARD_MAX_LIMIT"],
        ),
        entry(
            "guard.overfetch_limit",
            config.guard.overfetch_limit.to_string(),
            &["GAMESCOUT_GUARD_OVERFETCH_LIMIT"],
        ),
        entry(
            "guard.exact_tolerance",
            config.guard.exact_tolerance.to_string(),
            &["GAMESCOUT_GUARD_EXACT_TOLERANCE"],
        ),
        entry("guard.gate_keywords", gate_keywords, &["GAMESCOUT_GUARD_GATE_KEYWORDS"]),
        entry(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["GAMESCOUT_SERVER_BIND_ADDRESS"],
        ),
        entry("server.port", config.server.port.to_string(), &["GAMESCOUT_SERVER_PORT"]),
        entry(
            "server.health_check_port",
            config.server.health_check_port.to_string(),
            &["GAMESCOUT_SERVER_HEALTH_CHECK_PORT"],
        ),
        entry(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["GAMESCOUT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        entry(
            "logging.level",
            config.logging.level.clone(),
            &["GAMESCOUT_LOGGING_LEVEL", "GAMESCOUT_LOG_LEVEL"],
        ),
        entry(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["GAMESCOUT_LOGGING_FORMAT", "GAMESCOUT_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.into_iter().map(|(key, value, env_keys)| {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        render_line(key, &value, source)
    }));

    lines.join("\n")
}

type Entry = (&'static str, String, &'static [&'static str]);

fn entry(key: &'static str, value: String, env_keys: &'static [&'static str]) -> Entry {
    (key, value, env_keys)
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
