use serde_json::{json, Value};

use gamescout_core::CatalogItem;

use crate::memory::InMemoryCatalogBackend;

/// Built-in demo catalog served when `catalog.use_fixtures` is set.
pub fn demo_games() -> Vec<CatalogItem> {
    demo_records().into_iter().filter_map(CatalogItem::from_value).collect()
}

pub fn demo_backend() -> InMemoryCatalogBackend {
    InMemoryCatalogBackend::new(demo_games())
}

fn demo_records() -> Vec<Value> {
    vec![
        json!({"id": "g-001", "title": "Orbit Kitchen", "genre": "party",
               "tags": ["co-op", "local", "cooking"],
               "platforms": ["pc", "switch"], "price": 19.99}),
        json!({"id": "g-002", "title": "Lantern Duo", "genre": "puzzle",
               "tags": ["co-op", "online", "story"], "platforms": ["pc"], "price": "14.99 USD"}),
        json!({"id": "g-003", "title": "Mossy Keep", "genre": "strategy",
               "tags": ["co-op", "tower defense"], "platforms": ["pc", "ps5"], "price": 9.5}),
        json!({"id": "g-004", "title": "Hex Rally", "genre": "racing",
               "tags": ["multiplayer", "arcade"], "platforms": ["pc", "xbox"], "price": "$24.00"}),
        json!({"id": "g-005", "title": "Tidal Chess", "genre": "board",
               "tags": ["turn-based", "online"], "platforms": ["pc"], "price": "contact us"}),
        json!({"id": "g-006", "title": "Free Frog", "genre": "platformer",
               "tags": ["single-player", "casual"], "platforms": ["mobile"], "price": 0}),
        json!({"id": "g-007", "title": "Starfall Tactics", "genre": "strategy",
               "tags": ["turn-based", "sci-fi", "single-player"],
               "platforms": ["pc"], "price": 39.99}),
        json!({"id": "g-008", "title": "Cinder Pass", "genre": "rpg",
               "tags": ["open world", "fantasy", "single-player"],
               "platforms": ["ps5", "xbox"], "price": "€59.99"}),
        json!({"id": "g-009", "title": "Paper Pilots", "genre": "arcade",
               "tags": ["co-op", "couch", "casual"], "platforms": ["switch"], "price": 12.0}),
        json!({"id": "g-010", "title": "Night Shift Bistro", "genre": "simulation",
               "tags": ["management", "cozy"], "platforms": ["pc", "switch"], "price": 21.5}),
        json!({"id": "g-011", "title": "Gravel & Glory", "genre": "racing",
               "tags": ["co-op", "split-screen"], "platforms": ["pc", "ps5"], "price": 29.99}),
        json!({"id": "g-012", "title": "Quiet Orchard", "genre": "simulation",
               "tags": ["cozy", "farming", "single-player"],
               "platforms": ["pc", "mobile"], "price": 17.99}),
        json!({"id": "g-013", "title": "Bastion Breakers", "genre": "action",
               "tags": ["roguelike", "co-op", "online"], "platforms": ["pc"], "price": 24.99}),
        json!({"id": "g-014", "title": "Deep Signal", "genre": "horror",
               "tags": ["story", "single-player"], "platforms": ["pc", "ps5"], "price": "£19.00"}),
        json!({"id": "g-015", "title": "Pocket Kingdoms", "genre": "strategy",
               "tags": ["4x", "turn-based"], "platforms": ["mobile"], "price": "1,299.00"}),
        json!({"id": "g-016", "title": "Cloud Courier", "genre": "adventure",
               "tags": ["relaxing", "exploration"], "platforms": ["switch"], "price": "-5.00"}),
    ]
}
