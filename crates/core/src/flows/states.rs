use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowType {
    GroundedChat,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowState {
    Start,
    AwaitingFirstCompletion,
    ExecutingTools,
    AwaitingFinalCompletion,
    Done,
    Failed,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEvent {
    RequestAccepted,
    RequestRejected,
    FirstCompletionReceived,
    ToolResultsAppended,
    FinalCompletionReceived,
    BackendFailed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlowContext {
    pub resolved_tool_calls: usize,
}

impl FlowContext {
    pub fn with_tool_calls(resolved_tool_calls: usize) -> Self {
        Self { resolved_tool_calls }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    RequestFirstCompletion,
    ExecuteToolCalls,
    RequestFinalCompletion,
    ReturnAnswer,
    ReturnError,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: FlowState,
    pub to: FlowState,
    pub event: FlowEvent,
    pub actions: Vec<FlowAction>,
}
