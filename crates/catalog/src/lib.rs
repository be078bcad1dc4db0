//! Catalog backend adapters.

pub mod fixtures;
pub mod http;
pub mod memory;

use std::sync::Arc;

use gamescout_core::config::CatalogConfig;
use gamescout_core::{CatalogBackend, CatalogError};

pub use fixtures::{demo_backend, demo_games};
pub use http::{decode_items, HttpCatalogBackend};
pub use memory::InMemoryCatalogBackend;

/// The demo catalog when fixtures are enabled, the HTTP backend otherwise.
pub fn backend_from_config(
    config: &CatalogConfig,
) -> Result<Arc<dyn CatalogBackend>, CatalogError> {
    if config.use_fixtures {
        return Ok(Arc::new(demo_backend()));
    }
    Ok(Arc::new(HttpCatalogBackend::from_config(config)?))
}
