
use azure_agents_model::{ModelFinishReason, ModelMessage, ToolCallRequest, ToolCallResult};
use serde::de::DeserializeOwned;
use tracing::Instrument;

use crate::conversation::{Conversation, Item, TranscriptSource};
use crate::guardrail::GuardrailTripped;
use crate::handoff::HandoffRecord;
use crate::model_client::ModelClientResponse;
use crate::{Agent, RunError};

/// Limits applied to a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum number of model turns before the run fails.
    pub max_turns: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { max_turns: 10 }
    }
}

/// How a run ended, when it didn't fail.
#[derive(Clone, Debug)]
pub enum RunOutcome {
    /// The agents produced a final answer.
    Completed(RunResult),
    /// An input guardrail rejected the input before any turn.
    Blocked(GuardrailTripped),
}

impl RunOutcome {
    /// Returns the result if the run completed.
    #[inline]
    pub fn into_completed(self) -> Option<RunResult> {
        match self {
            RunOutcome::Completed(result) => Some(result),
            RunOutcome::Blocked(_) => None,
        }
    }

    /// Returns `true` if a guardrail blocked the input.
    #[inline]
    pub fn is_blocked(&self) -> bool {
        matches!(self, RunOutcome::Blocked(_))
    }
}

/// The result of a completed run.
#[derive(Clone, Debug)]
pub struct RunResult {
    /// Text of the last assistant message.
    pub final_output: String,
    /// Name of the agent that produced the final output.
    pub last_agent: String,
    /// Control transfers in the order they happened.
    pub handoffs: Vec<HandoffRecord>,
    /// Number of model turns taken.
    pub turns: usize,
    /// Everything exchanged during the run, without system messages.
    pub conversation: Conversation,
}

impl RunResult {
    /// Decodes the final output as JSON.
    ///
    /// A Markdown code fence around the document is tolerated.
    pub fn final_output_as<T: DeserializeOwned>(&self) -> Result<T, RunError> {
        let text = strip_code_fence(&self.final_output);
        serde_json::from_str(text).map_err(|err| RunError::InvalidOutput {
            agent: self.last_agent.clone(),
            reason: err.to_string(),
        })
    }
}

fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Skip the info string, e.g. "json".
    match rest.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => rest.trim(),
    }
}

/// Drives agents until one of them produces a final answer.
///
/// Runs are independent: a runner keeps no state between them.
#[derive(Clone, Debug, Default)]
pub struct Runner {
    config: RunConfig,
}

impl Runner {
    /// Creates a runner with the given limits.
    #[inline]
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Returns the limits of this runner.
    #[inline]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs `agent` on a single user input.
    ///
    /// The agent's input guardrails are checked first. Then each turn
    /// sends the conversation to the current agent's model and executes
    /// the requested tools, until the model answers without calling any.
    pub async fn run(
        &self,
        agent: &Agent,
        input: &str,
    ) -> Result<RunOutcome, RunError> {
        let span = info_span!("run", agent = %agent.name());
        self.run_inner(agent, input).instrument(span).await
    }

    async fn run_inner(
        &self,
        agent: &Agent,
        input: &str,
    ) -> Result<RunOutcome, RunError> {
        if let Some(tripped) = check_input_guardrails(agent, input).await? {
            info!("input blocked by guardrail `{}`", tripped.guardrail);
            return Ok(RunOutcome::Blocked(tripped));
        }

        let mut current = agent.clone();
        let mut conversation = Conversation::default();
        let mut handoffs = vec![];
        conversation.push(Item::user(input, current.name()));

        for turn in 1..=self.config.max_turns {
            let req = current.build_request(&conversation);
            debug!(
                "turn {turn}: sending {} messages to `{}`",
                req.messages.len(),
                current.name()
            );
            let ModelClientResponse {
                transcript,
                opaque_msg,
                tool_calls,
                finish_reason,
            } = current
                .model_client()
                .send_request(req)
                .await
                .map_err(RunError::Model)?;

            let msg = match opaque_msg {
                Some(opaque_msg) => ModelMessage::Opaque(opaque_msg),
                None => ModelMessage::Assistant(transcript.clone()),
            };
            conversation.push(Item {
                msg,
                transcript: transcript.clone(),
                source: TranscriptSource::Assistant,
                agent: current.name().to_owned(),
            });

            if tool_calls.is_empty() {
                if finish_reason == Some(ModelFinishReason::Length) {
                    warn!("final output of `{}` was truncated", current.name());
                }
                return Ok(RunOutcome::Completed(RunResult {
                    final_output: transcript,
                    last_agent: current.name().to_owned(),
                    handoffs,
                    turns: turn,
                    conversation,
                }));
            }

            if let Some(target) =
                dispatch_tool_calls(&current, tool_calls, &mut conversation)
                    .await
            {
                info!("handoff from `{}` to `{}`", current.name(), target.name());
                handoffs.push(HandoffRecord {
                    from_agent: current.name().to_owned(),
                    to_agent: target.name().to_owned(),
                });
                current = target;
            }
        }

        warn!("giving up after {} turns", self.config.max_turns);
        Err(RunError::MaxTurnsExceeded(self.config.max_turns))
    }
}

async fn check_input_guardrails(
    agent: &Agent,
    input: &str,
) -> Result<Option<GuardrailTripped>, RunError> {
    for guardrail in agent.input_guardrails() {
        let output = guardrail
            .check(input)
            .instrument(debug_span!("guardrail", name = guardrail.name()))
            .await?;
        if output.tripwire_triggered {
            return Ok(Some(GuardrailTripped {
                guardrail: guardrail.name().to_owned(),
                output,
            }));
        }
    }
    Ok(None)
}

/// Answers every tool call in request order and returns the handoff
/// target, if the model asked for one.
async fn dispatch_tool_calls(
    agent: &Agent,
    tool_calls: Vec<ToolCallRequest>,
    conversation: &mut Conversation,
) -> Option<Agent> {
    let mut handoff_target: Option<Agent> = None;

    for req in tool_calls {
        let id = req.id.clone();
        let content = if let Some(handoff) = agent.find_handoff(&req.name) {
            if handoff_target.is_none() {
                handoff_target = Some(handoff.target().clone());
                handoff.reply()
            } else {
                warn!("ignoring extra handoff `{}`", req.name);
                "Multiple handoffs detected, ignoring this one.".to_owned()
            }
        } else {
            match agent.tool_executor().execute(req).await {
                Ok(content) => content,
                Err(err) => {
                    warn!("tool call {id} failed: {err}");
                    format!("Error: {err}")
                }
            }
        };

        conversation.push(Item {
            msg: ModelMessage::Tool(ToolCallResult {
                id,
                content: content.clone(),
            }),
            transcript: content,
            source: TranscriptSource::Tool,
            agent: agent.name().to_owned(),
        });
    }

    handoff_target
}
