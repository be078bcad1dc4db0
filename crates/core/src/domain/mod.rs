pub mod item;
pub mod message;
pub mod price;
pub mod search;

pub use item::{parse_price, CatalogItem, DEFAULT_PRICE_FIELD};
pub use message::{ChatMessage, Conversation, Role, ToolCall};
pub use price::{PriceFields, PriceIntent, PriceMode};
pub use search::{ProposedArguments, SearchResult, ToolArguments, DEFAULT_RESULT_LIMIT};
