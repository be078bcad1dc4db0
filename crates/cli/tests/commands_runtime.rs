use std::env;
use std::sync::{Mutex, OnceLock};

use gamescout_cli::commands::{config, doctor, explain, search};
use serde_json::Value;

#[test]
fn explain_reports_price_query_and_gate() {
    with_env(&[], || {
        let result = explain::run("recommend a co-op game under $15");
        assert_eq!(result.exit_code, 0, "explain never contacts a backend");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "explain");
        assert_eq!(payload["status"], "ok");
        let details = &payload["details"];
        assert_eq!(details["price"]["price_mode"], "under");
        assert_eq!(details["price"]["max_price"], 15.0);
        assert_eq!(details["price"]["max_inclusive"], false);
        assert_eq!(details["matched_rule"], "under");
        assert_eq!(details["reduced_query"], "co-op");
        assert_eq!(details["tool_required"], true);
    });
}

#[test]
fn explain_small_talk_needs_no_search() {
    with_env(&[], || {
        let result = explain::run("hello, how are you?");
        let payload = parse_payload(&result.output);

        assert_eq!(payload["details"]["price"]["price_mode"], "none");
        assert_eq!(payload["details"]["tool_required"], false);
        assert!(payload["details"]["gate_trigger"].is_null());
    });
}

#[test]
fn explain_returns_config_failure_for_invalid_provider() {
    with_env(&[("GAMESCOUT_LLM_PROVIDER", "carrier-pigeon")], || {
        let result = explain::run("co-op games");
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn search_against_fixtures_applies_user_price() {
    with_env(&[("GAMESCOUT_CATALOG_USE_FIXTURES", "true")], || {
        let result = search::run("recommend a co-op game under $15", None);
        assert_eq!(result.exit_code, 0, "fixture search should succeed");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "search");
        let details = &payload["details"];
        assert_eq!(details["backend"], "memory");
        assert_eq!(details["arguments"]["query"], "co-op");
        assert_eq!(details["result"]["fallback_used"], false);
        assert_eq!(details["result"]["count"], 3);
        assert_eq!(details["result"]["items"][0]["title"], "Lantern Duo");
    });
}

#[test]
fn search_keeps_requested_limit_by_default() {
    with_env(&[("GAMESCOUT_CATALOG_USE_FIXTURES", "true")], || {
        let result = search::run("co-op games", Some(500));
        let payload = parse_payload(&result.output);

        assert_eq!(payload["details"]["arguments"]["limit"], 500);
        assert_eq!(payload["details"]["result"]["count"], 6);
    });
}

#[test]
fn search_caps_limit_when_max_limit_is_configured() {
    with_env(
        &[("GAMESCOUT_CATALOG_USE_FIXTURES", "true"), ("GAMESCOUT_GUARD_MAX_LIMIT", "5")],
        || {
            let result = search::run("co-op games", Some(500));
            let payload = parse_payload(&result.output);

            assert_eq!(payload["details"]["arguments"]["limit"], 5);
            assert_eq!(payload["details"]["result"]["count"], 5);
        },
    );
}

#[test]
fn search_reports_unreachable_catalog() {
    with_env(&[("GAMESCOUT_CATALOG_BASE_URL", "http://127.0.0.1:1")], || {
        let result = search::run("co-op games", None);
        assert_eq!(result.exit_code, 4, "expected catalog failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "catalog_search");
    });
}

#[test]
fn config_redacts_api_key_and_attributes_env_source() {
    with_env(
        &[("GAMESCOUT_LLM_PROVIDER", "openai"), ("GAMESCOUT_LLM_API_KEY", "sk-very-secret")],
        || {
            let output = config::run();

            assert!(
                output.contains("- llm.api_key = sk-*** (source: env (GAMESCOUT_LLM_API_KEY))")
            );
            assert!(!output.contains("very-secret"));
            assert!(
                output.contains("- llm.provider = OpenAi (source: env (GAMESCOUT_LLM_PROVIDER))")
            );
        },
    );
}

#[test]
fn doctor_passes_with_fixture_catalog() {
    with_env(&[("GAMESCOUT_CATALOG_USE_FIXTURES", "true")], || {
        let (output, passed) = doctor::run(true);
        assert!(passed);

        let payload = parse_payload(&output);
        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(payload["checks"][2]["name"], "catalog_reachability");
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_invalid() {
    with_env(&[("GAMESCOUT_LLM_PROVIDER", "openai")], || {
        let (output, passed) = doctor::run(false);
        assert!(!passed);

        assert!(output.starts_with("doctor: one or more readiness checks failed"));
        assert!(output.contains("- [fail] config_validation"));
        assert!(output.contains("- [skip] catalog_reachability"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "GAMESCOUT_LLM_PROVIDER",
        "GAMESCOUT_LLM_API_KEY",
        "GAMESCOUT_LLM_BASE_URL",
        "GAMESCOUT_LLM_MODEL",
        "GAMESCOUT_LLM_TIMEOUT_SECS",
        "GAMESCOUT_LLM_TEMPERATURE",
        "GAMESCOUT_CATALOG_BASE_URL",
        "GAMESCOUT_CATALOG_SEARCH_PATH",
        "GAMESCOUT_CATALOG_TIMEOUT_SECS",
        "GAMESCOUT_CATALOG_PRICE_FIELD",
        "GAMESCOUT_CATALOG_USE_FIXTURES",
        "GAMESCOUT_GUARD_DEFAULT_LIMIT",
        "GAMESCOUT_GUARD_MAX_LIMIT",
        "GAMESCOUT_GUARD_OVERFETCH_LIMIT",
        "GAMESCOUT_GUARD_EXACT_TOLERANCE",
        "GAMESCOUT_GUARD_GATE_KEYWORDS",
        "GAMESCOUT_SERVER_BIND_ADDRESS",
        "GAMESCOUT_SERVER_PORT",
        "GAMESCOUT_SERVER_HEALTH_CHECK_PORT",
        "GAMESCOUT_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "GAMESCOUT_LOGGING_LEVEL",
        "GAMESCOUT_LOGGING_FORMAT",
        "GAMESCOUT_LOG_LEVEL",
        "GAMESCOUT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
