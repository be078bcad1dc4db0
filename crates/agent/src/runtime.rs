use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use gamescout_core::config::AppConfig;
use gamescout_core::domain::{ChatMessage, Conversation, Role, ToolCall, DEFAULT_RESULT_LIMIT};
use gamescout_core::flows::{FlowContext, FlowEngine, FlowEvent, FlowState, GroundedChatFlow};
use gamescout_core::{ApplicationError, CatalogQueryExecutor, DomainError, ExecutorSettings};

use crate::gate::ToolGate;
use crate::guardrails::GuardrailPolicy;
use crate::llm::{Completion, LlmClient};
use crate::tools::{tool_schemas, ToolExecutor, SEARCH_GAMES};

pub const SYNTHETIC_CALL_ID: &str = "call_synthetic_0";

pub const FINAL_INSTRUCTION: &str = "Answer the user now using only the tool results above. \
Do not call any more tools. If the results are empty, say that nothing in the catalog matched.";

/// One caller-supplied message, validated before any backend is contacted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub role: String,
    pub content: Value,
}

impl InboundMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self { role: role.to_string(), content: Value::String(content.to_string()) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    pub model: String,
}

/// Drives the two-phase grounded exchange for a single request.
pub struct AgentRuntime {
    llm: Arc<dyn LlmClient>,
    tools: ToolExecutor,
    gate: ToolGate,
    flow: FlowEngine<GroundedChatFlow>,
    system_prompt: String,
}

impl AgentRuntime {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: ToolExecutor,
        gate: ToolGate,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self { llm, tools, gate, flow: FlowEngine::default(), system_prompt: system_prompt.into() }
    }

    pub fn from_config(
        config: &AppConfig,
        llm: Arc<dyn LlmClient>,
        catalog: Arc<dyn gamescout_core::CatalogBackend>,
    ) -> Self {
        let executor = CatalogQueryExecutor::new(catalog, ExecutorSettings::from_config(config));
        let tools = ToolExecutor::new(GuardrailPolicy::from_config(&config.guard), executor);
        let gate = ToolGate::from_config(&config.guard);
        Self::new(llm, tools, gate, config.guard.system_prompt.clone())
    }

    pub fn tools(&self) -> &ToolExecutor {
        &self.tools
    }

    pub async fn handle_chat(
        &self,
        messages: Vec<InboundMessage>,
        correlation_id: &str,
    ) -> Result<ChatReply, ApplicationError> {
        let mut state = self.flow.initial_state();

        let inbound = match validate_messages(messages) {
            Ok(inbound) => inbound,
            Err(error) => {
                self.advance(&state, FlowEvent::RequestRejected, 0, correlation_id)?;
                warn!(
                    event_name = "chat.request.rejected",
                    correlation_id,
                    error = %error,
                    "chat request rejected"
                );
                return Err(error);
            }
        };
        state = self.advance(&state, FlowEvent::RequestAccepted, 0, correlation_id)?;

        let mut conversation = Conversation::default();
        if !self.system_prompt.trim().is_empty() {
            conversation.push(ChatMessage::system(self.system_prompt.clone()));
        }
        inbound.into_iter().for_each(|message| conversation.push(message));

        let user_text = conversation.latest_user_text().unwrap_or_default().to_string();
        let trigger = self.gate.evaluate(&user_text);
        info!(
            event_name = "chat.request.accepted",
            correlation_id,
            messages = conversation.len(),
            tool_required = trigger.is_some(),
            "chat request accepted"
        );

        let first =
            self.complete(&state, &conversation, Some(tool_schemas()), correlation_id).await?;
        let mut assistant = first.message;
        let mut tool_calls = std::mem::take(&mut assistant.tool_calls)
            .into_iter()
            .enumerate()
            .map(|(index, call)| with_call_id(call, index))
            .collect::<Vec<_>>();

        if tool_calls.is_empty() && trigger.is_some() {
            info!(
                event_name = "chat.tool.synthesized",
                correlation_id,
                trigger = ?trigger,
                "model skipped a mandatory search; synthesizing one"
            );
            tool_calls.push(synthesized_call(&user_text));
        }
        assistant.tool_calls = tool_calls.clone();
        conversation.push(assistant.clone());

        state = self.advance(
            &state,
            FlowEvent::FirstCompletionReceived,
            tool_calls.len(),
            correlation_id,
        )?;
        if state == FlowState::Done {
            return Ok(ChatReply { answer: assistant.content, model: first.model });
        }

        for call in &tool_calls {
            let content = match self.tools.execute(call, &user_text, correlation_id).await {
                Ok(content) => content,
                Err(error) => {
                    self.fail(&state, correlation_id, &error.to_string())?;
                    return Err(error.into());
                }
            };
            conversation.push(ChatMessage::tool_result(call, content.to_string()));
        }
        state = self.advance(&state, FlowEvent::ToolResultsAppended, 0, correlation_id)?;

        conversation.push(ChatMessage::system(FINAL_INSTRUCTION));
        let last = self.complete(&state, &conversation, None, correlation_id).await?;
        self.advance(&state, FlowEvent::FinalCompletionReceived, 0, correlation_id)?;

        info!(
            event_name = "chat.request.completed",
            correlation_id,
            tool_calls = tool_calls.len(),
            model = %last.model,
            "chat request completed"
        );
        Ok(ChatReply { answer: last.message.content, model: last.model })
    }

    async fn complete(
        &self,
        state: &FlowState,
        conversation: &Conversation,
        tools: Option<&Value>,
        correlation_id: &str,
    ) -> Result<Completion, ApplicationError> {
        match self.llm.complete(conversation.messages(), tools).await {
            Ok(completion) => Ok(completion),
            Err(error) => {
                self.fail(state, correlation_id, &error.to_string())?;
                Err(error.into())
            }
        }
    }

    fn fail(
        &self,
        state: &FlowState,
        correlation_id: &str,
        error: &str,
    ) -> Result<(), ApplicationError> {
        warn!(event_name = "chat.backend.failed", correlation_id, error, "backend call failed");
        self.advance(state, FlowEvent::BackendFailed, 0, correlation_id).map(|_| ())
    }

    fn advance(
        &self,
        state: &FlowState,
        event: FlowEvent,
        resolved_tool_calls: usize,
        correlation_id: &str,
    ) -> Result<FlowState, ApplicationError> {
        let context = FlowContext::with_tool_calls(resolved_tool_calls);
        self.flow
            .apply_traced(state, &event, &context, correlation_id)
            .map(|outcome| outcome.to)
            .map_err(|error| ApplicationError::from(DomainError::from(error)))
    }
}

fn validate_messages(messages: Vec<InboundMessage>) -> Result<Vec<ChatMessage>, ApplicationError> {
    if messages.is_empty() {
        return Err(ApplicationError::ClientInput("messages must not be empty".to_string()));
    }

    messages
        .into_iter()
        .enumerate()
        .map(|(index, message)| {
            let role = Role::parse_inbound(&message.role).ok_or_else(|| {
                ApplicationError::ClientInput(format!(
                    "messages[{index}].role `{}` is not one of user|assistant|system",
                    message.role
                ))
            })?;
            match message.content {
                Value::String(content) => Ok(ChatMessage::new(role, content)),
                _ => Err(ApplicationError::ClientInput(format!(
                    "messages[{index}].content must be a string"
                ))),
            }
        })
        .collect()
}

fn with_call_id(mut call: ToolCall, index: usize) -> ToolCall {
    if call.id.trim().is_empty() {
        call.id = format!("call_{index}");
    }
    call
}

fn synthesized_call(user_text: &str) -> ToolCall {
    ToolCall {
        id: SYNTHETIC_CALL_ID.to_string(),
        name: SEARCH_GAMES.to_string(),
        arguments: json!({ "query": user_text, "limit": DEFAULT_RESULT_LIMIT }),
    }
}
