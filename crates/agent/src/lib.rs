//! Agent Runtime - grounded catalog chat
//!
//! This crate holds the deterministic side of the assistant. The model is
//! consulted for wording, but whether a search runs, which price filter it
//! uses and which games come back are decided here:
//! - Extract a price constraint from the user's own words (`intent`)
//! - Reduce free text to catalog keywords (`keywords`)
//! - Decide whether a catalog search is mandatory (`gate`)
//! - Reconcile model-proposed arguments with the user's text (`guardrails`)
//! - Dispatch tool calls to the catalog (`tools`)
//! - Talk to the generation backend (`llm`)
//!
//! # Architecture
//!
//! `AgentRuntime` (see `runtime`) runs one request through the flow defined in
//! `gamescout_core::flows`:
//! 1. **First completion** - conversation plus tool schema go to the model
//! 2. **Tool execution** - proposed or synthesized `search_games` calls run
//!    through the guardrails and the catalog query executor
//! 3. **Final completion** - the model answers from the tool results with
//!    tools disabled
//!
//! # Safety Principle
//!
//! The model never sets a price filter. A price constraint exists only when
//! the user's latest message states one.

pub mod gate;
pub mod guardrails;
pub mod intent;
pub mod keywords;
pub mod llm;
pub mod runtime;
pub mod tools;

pub use gate::{GateTrigger, ToolGate};
pub use guardrails::{GuardrailDecision, GuardrailPolicy, Reconciliation};
pub use intent::PriceIntentParser;
pub use keywords::KeywordReducer;
pub use llm::{Completion, HttpLlmClient, LlmClient, LlmError};
pub use runtime::{AgentRuntime, ChatReply, InboundMessage};
pub use tools::{decode_arguments, tool_schemas, ToolExecutor, ToolKind};
