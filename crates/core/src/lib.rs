pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;

pub use catalog::{CatalogBackend, CatalogError, CatalogQueryExecutor, ExecutorSettings};
pub use domain::{
    CatalogItem, ChatMessage, Conversation, PriceIntent, PriceMode, ProposedArguments, Role,
    SearchResult, ToolArguments, ToolCall,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
