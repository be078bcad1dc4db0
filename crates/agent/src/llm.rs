use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use gamescout_core::config::{LlmConfig, LlmProvider};
use gamescout_core::domain::{ChatMessage, Role, ToolCall};
use gamescout_core::ApplicationError;

const ERROR_BODY_LIMIT: usize = 512;

/// One completion from the generation backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    pub message: ChatMessage,
    pub model: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("generation backend unreachable: {0}")]
    Transport(String),
    #[error("generation backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation backend response could not be decoded: {0}")]
    Decode(String),
}

impl From<LlmError> for ApplicationError {
    fn from(error: LlmError) -> Self {
        Self::Integration(error.to_string())
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// `tools` is `None` when tool calls are disabled for this completion.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&Value>,
    ) -> Result<Completion, LlmError>;
}

/// Non-streaming chat completion client speaking the Ollama or the
/// OpenAI-compatible wire dialect.
#[derive(Clone, Debug)]
pub struct HttpLlmClient {
    client: Client,
    provider: LlmProvider,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
    temperature: f32,
}

impl HttpLlmClient {
    pub fn new(client: Client, config: &LlmConfig) -> Self {
        Self {
            client,
            provider: config.provider,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| LlmError::Transport(error.to_string()))?;
        Ok(Self::new(client, config))
    }

    pub fn endpoint(&self) -> String {
        match self.provider {
            LlmProvider::Ollama => format!("{}/api/chat", self.base_url),
            LlmProvider::OpenAi => format!("{}/v1/chat/completions", self.base_url),
        }
    }

    fn request_body(&self, messages: &[ChatMessage], tools: Option<&Value>) -> Value {
        let wire_messages = messages
            .iter()
            .map(|message| encode_message(self.provider, message))
            .collect::<Vec<_>>();

        let mut body = match self.provider {
            LlmProvider::Ollama => json!({
                "model": self.model,
                "messages": wire_messages,
                "stream": false,
                "options": { "temperature": self.temperature },
            }),
            LlmProvider::OpenAi => json!({
                "model": self.model,
                "messages": wire_messages,
                "stream": false,
                "temperature": self.temperature,
            }),
        };
        if let (Some(tools), Some(object)) = (tools, body.as_object_mut()) {
            object.insert("tools".to_string(), tools.clone());
        }
        body
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&Value>,
    ) -> Result<Completion, LlmError> {
        let url = self.endpoint();
        let mut request = self.client.post(&url).json(&self.request_body(messages, tools));
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        debug!(
            event_name = "llm.request.sent",
            url = %url,
            messages = messages.len(),
            tools_enabled = tools.is_some(),
            "sending chat completion request"
        );

        let response = request.send().await.map_err(|error| {
            warn!(
                event_name = "llm.request.failed",
                url = %url,
                error = %error,
                "llm request failed"
            );
            LlmError::Transport(error.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > ERROR_BODY_LIMIT {
                let cut = (0..=ERROR_BODY_LIMIT).rev().find(|idx| body.is_char_boundary(*idx));
                body.truncate(cut.unwrap_or(0));
            }
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let payload: Value =
            response.json().await.map_err(|error| LlmError::Decode(error.to_string()))?;
        decode_completion(self.provider, &payload, &self.model)
    }
}

fn encode_message(provider: LlmProvider, message: &ChatMessage) -> Value {
    let mut wire = Map::new();
    wire.insert("role".to_string(), json!(message.role.as_str()));
    wire.insert("content".to_string(), json!(message.content));

    if !message.tool_calls.is_empty() {
        let calls = message
            .tool_calls
            .iter()
            .map(|call| match provider {
                LlmProvider::Ollama => json!({
                    "function": {
                        "name": call.name,
                        "arguments": arguments_as_object(&call.arguments)
                    }
                }),
                LlmProvider::OpenAi => json!({
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.name,
                        "arguments": arguments_as_string(&call.arguments)
                    }
                }),
            })
            .collect::<Vec<_>>();
        wire.insert("tool_calls".to_string(), Value::Array(calls));
    }

    if message.role == Role::Tool {
        match provider {
            LlmProvider::Ollama => {
                if let Some(name) = &message.name {
                    wire.insert("tool_name".to_string(), json!(name));
                }
            }
            LlmProvider::OpenAi => {
                if let Some(id) = &message.tool_call_id {
                    wire.insert("tool_call_id".to_string(), json!(id));
                }
            }
        }
    }

    Value::Object(wire)
}

fn arguments_as_object(arguments: &Value) -> Value {
    match arguments {
        Value::String(text) => serde_json::from_str::<Value>(text)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({})),
        Value::Object(_) => arguments.clone(),
        _ => json!({}),
    }
}

fn arguments_as_string(arguments: &Value) -> Value {
    match arguments {
        Value::String(_) => arguments.clone(),
        Value::Null => json!("{}"),
        other => json!(other.to_string()),
    }
}

/// Parses a completion payload. Tool calls keep their raw arguments and an
/// empty id when the backend sends none.
pub fn decode_completion(
    provider: LlmProvider,
    payload: &Value,
    fallback_model: &str,
) -> Result<Completion, LlmError> {
    let message = match provider {
        LlmProvider::Ollama => payload.get("message"),
        LlmProvider::OpenAi => payload
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message")),
    }
    .and_then(Value::as_object)
    .ok_or_else(|| LlmError::Decode("response carries no message".to_string()))?;

    let content = message.get("content").and_then(Value::as_str).unwrap_or_default();
    let tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| calls.iter().filter_map(decode_tool_call).collect())
        .unwrap_or_default();

    let model = payload
        .get("model")
        .and_then(Value::as_str)
        .filter(|model| !model.is_empty())
        .unwrap_or(fallback_model)
        .to_string();

    let mut assistant = ChatMessage::assistant(content);
    assistant.tool_calls = tool_calls;
    Ok(Completion { message: assistant, model })
}

fn decode_tool_call(raw: &Value) -> Option<ToolCall> {
    let function = raw.get("function")?;
    let name = function.get("name").and_then(Value::as_str)?.to_string();
    let id = raw.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
    let arguments = function.get("arguments").cloned().unwrap_or(Value::Null);
    Some(ToolCall { id, name, arguments })
}
