use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use gamescout_core::{CatalogBackend, CatalogError, CatalogItem};

/// Catalog held in process. A query matches an item when every query token
/// occurs in one of the item's string fields (or string array entries).
#[derive(Default)]
pub struct InMemoryCatalogBackend {
    items: RwLock<Vec<CatalogItem>>,
}

impl InMemoryCatalogBackend {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items: RwLock::new(items) }
    }

    pub async fn insert(&self, item: CatalogItem) {
        let mut items = self.items.write().await;
        items.push(item);
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl CatalogBackend for InMemoryCatalogBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogItem>, CatalogError> {
        let tokens =
            query.split_whitespace().map(|token| token.to_lowercase()).collect::<Vec<_>>();
        let items = self.items.read().await;

        Ok(items
            .iter()
            .filter(|item| {
                let haystack = searchable_text(item);
                tokens.iter().all(|token| haystack.contains(token.as_str()))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), CatalogError> {
        Ok(())
    }
}

fn searchable_text(item: &CatalogItem) -> String {
    let mut text = String::new();
    for value in item.0.values() {
        match value {
            Value::String(field) => push_field(&mut text, field),
            Value::Array(entries) => entries
                .iter()
                .filter_map(Value::as_str)
                .for_each(|entry| push_field(&mut text, entry)),
            _ => {}
        }
    }
    text
}

fn push_field(text: &mut String, field: &str) {
    text.push(' ');
    text.push_str(&field.to_lowercase());
}
