use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::domain::{CatalogItem, PriceIntent, SearchResult, ToolArguments, DEFAULT_PRICE_FIELD};
use crate::errors::ApplicationError;

pub const DEFAULT_OVERFETCH_LIMIT: usize = 50;
pub const DEFAULT_EXACT_TOLERANCE: f64 = 0.01;
const OVERFETCH_FACTOR: usize = 4;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog backend unreachable: {0}")]
    Transport(String),
    #[error("catalog backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
}

impl From<CatalogError> for ApplicationError {
    fn from(error: CatalogError) -> Self {
        Self::Integration(error.to_string())
    }
}

/// Keyword search over an external game catalog. An empty query means
/// "match everything".
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogItem>, CatalogError>;

    async fn health_check(&self) -> Result<(), CatalogError> {
        self.search("", 1).await.map(|_| ())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExecutorSettings {
    pub overfetch_limit: usize,
    pub exact_tolerance: f64,
    pub price_field: String,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            overfetch_limit: DEFAULT_OVERFETCH_LIMIT,
            exact_tolerance: DEFAULT_EXACT_TOLERANCE,
            price_field: DEFAULT_PRICE_FIELD.to_string(),
        }
    }
}

impl ExecutorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            overfetch_limit: config.guard.overfetch_limit as usize,
            exact_tolerance: config.guard.exact_tolerance,
            price_field: config.catalog.price_field.clone(),
        }
    }

    pub fn fetch_count(&self, limit: u32) -> usize {
        self.overfetch_limit.max(OVERFETCH_FACTOR.saturating_mul(limit as usize))
    }
}

/// Runs one reconciled search: over-fetch, empty-query fallback, price
/// filter, mode ranking, truncation.
#[derive(Clone)]
pub struct CatalogQueryExecutor {
    backend: Arc<dyn CatalogBackend>,
    settings: ExecutorSettings,
}

impl CatalogQueryExecutor {
    pub fn new(backend: Arc<dyn CatalogBackend>, settings: ExecutorSettings) -> Self {
        Self { backend, settings }
    }

    pub fn backend(&self) -> &Arc<dyn CatalogBackend> {
        &self.backend
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    pub async fn search(
        &self,
        arguments: &ToolArguments,
        correlation_id: &str,
    ) -> Result<SearchResult, CatalogError> {
        let fetch_count = self.settings.fetch_count(arguments.limit);
        let original_query = arguments.query.clone();

        let mut items = self.backend.search(&original_query, fetch_count).await?;
        let mut query_used = original_query.clone();
        let mut fallback_used = false;

        if items.is_empty() && !original_query.trim().is_empty() {
            info!(
                event_name = "catalog.search.fallback",
                correlation_id,
                backend = self.backend.name(),
                original_query = %original_query,
                "no catalog hits for keywords; retrying with match-all query"
            );
            items = self.backend.search("", fetch_count).await?;
            query_used = String::new();
            fallback_used = true;
        }

        let fetched = items.len();
        let mut priced = items
            .into_iter()
            .filter_map(|item| item.price(&self.settings.price_field).map(|price| (price, item)))
            .filter(|(price, _)| {
                price_matches(&arguments.price, *price, self.settings.exact_tolerance)
            })
            .collect::<Vec<_>>();

        priced.sort_by(|(left, _), (right, _)| {
            rank_key(&arguments.price, *left).total_cmp(&rank_key(&arguments.price, *right))
        });
        priced.truncate(arguments.limit as usize);

        debug!(
            event_name = "catalog.search.completed",
            correlation_id,
            price_mode = arguments.price.mode().as_str(),
            fetched,
            returned = priced.len(),
            fallback_used,
            "catalog search completed"
        );

        let items = priced.into_iter().map(|(_, item)| item.into_value()).collect::<Vec<_>>();
        Ok(SearchResult {
            original_query,
            query_used,
            fallback_used,
            price: arguments.price,
            count: items.len(),
            items,
        })
    }
}

pub fn price_matches(intent: &PriceIntent, price: f64, tolerance: f64) -> bool {
    match *intent {
        PriceIntent::None | PriceIntent::Closest { .. } => true,
        PriceIntent::Exact { value } => (price - value).abs() <= tolerance,
        PriceIntent::Range { min, max } => price >= min && price <= max,
        PriceIntent::Above { min, min_inclusive } => {
            if min_inclusive {
                price >= min
            } else {
                price > min
            }
        }
        PriceIntent::Under { max, max_inclusive } => {
            if max_inclusive {
                price <= max
            } else {
                price < max
            }
        }
    }
}

fn rank_key(intent: &PriceIntent, price: f64) -> f64 {
    match *intent {
        PriceIntent::Closest { target } => (price - target).abs(),
        PriceIntent::Under { max, .. } => max - price,
        PriceIntent::Above { min, .. } => price - min,
        PriceIntent::None | PriceIntent::Range { .. } | PriceIntent::Exact { .. } => price,
    }
}
