//! Agent orchestration loop
//!
//! Deciding → confirming → executing, until the reasoning service answers
//! in plain text or the operator declines. Frontends get status updates
//! through a callback; the loop handles the rest.

use tracing::Instrument;

use crate::action::{ActionContext, ActionKind, ActionRegistry};
use crate::config::AgentConfig;
use crate::decision::decide;
use crate::error::AgentError;
use crate::gate::ConfirmationGate;
use crate::llm::ReasoningService;
use crate::operator::Operator;
use crate::state::{ActionCall, ConversationState, Decision};

/// Events emitted during a run for UI updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// Waiting on the reasoning service for decision number `step`
    Deciding { step: usize },
    /// The reasoning service wants to run an action
    Proposed(ActionKind),
    /// The operator declined
    Rejected(ActionKind),
    /// An accepted action is running
    Executing(ActionKind),
    /// Action completed
    ActionResult { kind: ActionKind, preview: String },
    /// Final answer
    Finished(String),
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    Finished {
        answer: String,
        state: ConversationState,
    },
    /// The operator declined `rejected`. History is as it was before the
    /// proposal.
    Aborted {
        rejected: ActionKind,
        state: ConversationState,
    },
}

impl RunOutcome {
    pub fn state(&self) -> &ConversationState {
        match self {
            RunOutcome::Finished { state, .. } | RunOutcome::Aborted { state, .. } => state,
        }
    }
}

enum Phase {
    Deciding,
    Confirming(ActionCall),
    Executing(ActionCall),
}

const PREVIEW_CHARS: usize = 100;

/// Run the loop until it finishes or the operator declines.
///
/// Errors from the reasoning service, the operator or an action end the run
/// and are returned as they are; nothing is retried.
pub async fn run_agent<F>(
    config: &AgentConfig,
    reasoner: &dyn ReasoningService,
    registry: &ActionRegistry,
    gate: &mut dyn ConfirmationGate,
    operator: &mut dyn Operator,
    state: ConversationState,
    on_event: F,
) -> Result<RunOutcome, AgentError>
where
    F: FnMut(AgentEvent) + Send,
{
    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id, model = reasoner.model());
    drive(config, reasoner, registry, gate, operator, state, on_event)
        .instrument(span)
        .await
}

async fn drive<F>(
    config: &AgentConfig,
    reasoner: &dyn ReasoningService,
    registry: &ActionRegistry,
    gate: &mut dyn ConfirmationGate,
    operator: &mut dyn Operator,
    mut state: ConversationState,
    mut on_event: F,
) -> Result<RunOutcome, AgentError>
where
    F: FnMut(AgentEvent) + Send,
{
    tracing::info!(input = %state.input, return_direct = state.return_direct, "run started");
    let mut phase = Phase::Deciding;

    loop {
        phase = match phase {
            Phase::Deciding => {
                on_event(AgentEvent::Deciding {
                    step: state.steps().len() + 1,
                });

                match decide(reasoner, registry, &state, &config.instructions).await? {
                    Decision::Finish(answer) => {
                        tracing::info!(steps = state.steps().len(), "run finished");
                        on_event(AgentEvent::Finished(answer.clone()));
                        return Ok(RunOutcome::Finished { answer, state });
                    }
                    Decision::Invoke(call) => {
                        if let Some(limit) = config.max_steps {
                            if state.steps().len() >= limit {
                                tracing::warn!(limit, action = %call.kind, "step limit reached");
                                return Err(AgentError::StepLimit(limit));
                            }
                        }
                        tracing::info!(action = %call.kind, call_id = %call.call_id, "action proposed");
                        on_event(AgentEvent::Proposed(call.kind));
                        Phase::Confirming(call)
                    }
                }
            }

            Phase::Confirming(call) => {
                if gate.confirm(operator, &call)? {
                    Phase::Executing(call)
                } else {
                    tracing::warn!(action = %call.kind, "operator declined action, aborting run");
                    on_event(AgentEvent::Rejected(call.kind));
                    return Ok(RunOutcome::Aborted {
                        rejected: call.kind,
                        state,
                    });
                }
            }

            Phase::Executing(call) => {
                let kind = call.kind;
                on_event(AgentEvent::Executing(kind));

                let mut ctx = ActionContext {
                    reasoner,
                    operator: &mut *operator,
                };
                let result = registry
                    .get(kind)
                    .run(&mut ctx)
                    .await
                    .map_err(|source| AgentError::Action { kind, source })?;

                tracing::info!(action = %kind, bytes = result.len(), "action completed");
                on_event(AgentEvent::ActionResult {
                    kind,
                    preview: preview(&result),
                });

                if state.return_direct {
                    state.record(call, result.clone());
                    on_event(AgentEvent::Finished(result.clone()));
                    return Ok(RunOutcome::Finished {
                        answer: result,
                        state,
                    });
                }
                state.record(call, result);
                Phase::Deciding
            }
        };
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let short: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", short)
    } else {
        text.to_string()
    }
}
