use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::warn;

use gamescout_core::config::CatalogConfig;
use gamescout_core::{CatalogBackend, CatalogError, CatalogItem};

const ITEM_ARRAY_KEYS: [&str; 3] = ["items", "results", "games"];
const ERROR_BODY_LIMIT: usize = 512;

/// Catalog search over HTTP: `GET {base_url}{search_path}?q=..&limit=..`.
#[derive(Clone, Debug)]
pub struct HttpCatalogBackend {
    client: Client,
    search_url: String,
}

impl HttpCatalogBackend {
    pub fn new(client: Client, base_url: &str, search_path: &str) -> Self {
        let search_url = format!("{}{}", base_url.trim_end_matches('/'), search_path);
        Self { client, search_url }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| CatalogError::Transport(error.to_string()))?;
        Ok(Self::new(client, &config.base_url, &config.search_path))
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl CatalogBackend for HttpCatalogBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogItem>, CatalogError> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|error| {
                warn!(
                    event_name = "catalog.http.request_failed",
                    url = %self.search_url,
                    error = %error,
                    "catalog request failed"
                );
                CatalogError::Transport(error.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > ERROR_BODY_LIMIT {
                let cut = (0..=ERROR_BODY_LIMIT).rev().find(|idx| body.is_char_boundary(*idx));
                body.truncate(cut.unwrap_or(0));
            }
            return Err(CatalogError::Status { status: status.as_u16(), body });
        }

        let payload: Value =
            response.json().await.map_err(|error| CatalogError::Decode(error.to_string()))?;
        decode_items(payload)
    }
}

/// Accepts a bare array of items or an object holding the array under
/// `items`, `results` or `games`. Non-object entries are skipped.
pub fn decode_items(payload: Value) -> Result<Vec<CatalogItem>, CatalogError> {
    let entries = match payload {
        Value::Array(entries) => entries,
        Value::Object(mut object) => ITEM_ARRAY_KEYS
            .iter()
            .find_map(|key| match object.remove(*key) {
                Some(Value::Array(entries)) => Some(entries),
                _ => None,
            })
            .ok_or_else(|| {
                CatalogError::Decode(
                    "response object has no `items`, `results` or `games` array".to_string(),
                )
            })?,
        other => {
            return Err(CatalogError::Decode(format!(
                "expected an array or object of items, got {}",
                json_kind(&other)
            )))
        }
    };

    Ok(entries.into_iter().filter_map(CatalogItem::from_value).collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
