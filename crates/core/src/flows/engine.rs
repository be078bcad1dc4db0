use thiserror::Error;
use tracing::{debug, warn};

use crate::flows::states::{
    FlowAction, FlowContext, FlowEvent, FlowState, FlowType, TransitionOutcome,
};

pub trait FlowDefinition {
    fn flow_type(&self) -> FlowType;
    fn initial_state(&self) -> FlowState;
    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// The two-phase exchange: first completion, optional tool execution, final
/// completion.
#[derive(Clone, Debug, Default)]
pub struct GroundedChatFlow;

impl FlowDefinition for GroundedChatFlow {
    fn flow_type(&self) -> FlowType {
        FlowType::GroundedChat
    }

    fn initial_state(&self) -> FlowState {
        FlowState::Start
    }

    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_grounded_chat(current, event, context)
    }
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn flow_type(&self) -> FlowType {
        self.flow.flow_type()
    }

    pub fn initial_state(&self) -> FlowState {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event, context)
    }

    pub fn apply_traced(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
        correlation_id: &str,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        let result = self.apply(current, event, context);
        match &result {
            Ok(outcome) => debug!(
                event_name = "chat.flow.transition",
                correlation_id,
                from = ?outcome.from,
                to = ?outcome.to,
                flow_event = ?outcome.event,
                "flow transition applied"
            ),
            Err(error) => warn!(
                event_name = "chat.flow.transition_rejected",
                correlation_id,
                error = %error,
                "flow transition rejected"
            ),
        }
        result
    }
}

impl Default for FlowEngine<GroundedChatFlow> {
    fn default() -> Self {
        Self::new(GroundedChatFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("flow already finished in {state:?}; event {event:?} ignored")]
    Terminal { state: FlowState, event: FlowEvent },
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: FlowState, event: FlowEvent },
}

fn transition_grounded_chat(
    current: &FlowState,
    event: &FlowEvent,
    context: &FlowContext,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use FlowAction::{
        ExecuteToolCalls, RequestFinalCompletion, RequestFirstCompletion, ReturnAnswer, ReturnError,
    };
    use FlowEvent::{
        BackendFailed, FinalCompletionReceived, FirstCompletionReceived, RequestAccepted,
        RequestRejected, ToolResultsAppended,
    };
    use FlowState::{
        AwaitingFinalCompletion, AwaitingFirstCompletion, Done, ExecutingTools, Failed, Start,
    };

    if current.is_terminal() {
        return Err(FlowTransitionError::Terminal { state: current.clone(), event: event.clone() });
    }

    let (to, actions) = match (current, event) {
        (Start, RequestAccepted) => (AwaitingFirstCompletion, vec![RequestFirstCompletion]),
        (Start, RequestRejected) => (Failed, vec![ReturnError]),
        (AwaitingFirstCompletion, FirstCompletionReceived) => {
            if context.resolved_tool_calls == 0 {
                (Done, vec![ReturnAnswer])
            } else {
                (ExecutingTools, vec![ExecuteToolCalls])
            }
        }
        (ExecutingTools, ToolResultsAppended) => {
            (AwaitingFinalCompletion, vec![RequestFinalCompletion])
        }
        (AwaitingFinalCompletion, FinalCompletionReceived) => (Done, vec![ReturnAnswer]),
        (_, BackendFailed) => (Failed, vec![ReturnError]),
        _ => {
            return Err(FlowTransitionError::InvalidTransition {
                state: current.clone(),
                event: event.clone(),
            });
        }
    };

    Ok(TransitionOutcome { from: current.clone(), to, event: event.clone(), actions })
}
