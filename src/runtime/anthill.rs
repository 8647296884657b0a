//! Anthill - the turn controller
//!
//! Drives a run through its states:
//! - `Requesting`: render instructions, request a completion, normalize it, append it
//! - `Dispatching`: execute the completion's tool invocations as one batch
//! - `Handoff`: switch the active agent between batch commit and the next request
//! - `Done`: emit the [`Response`]
//!
//! A single engine ([`Anthill::run_and_stream`]) serves both entry points; [`Anthill::run`]
//! drains it.

use std::pin::Pin;
use std::sync::Arc;

use async_stream::try_stream;
use futures::stream::Stream;
use futures::StreamExt;

use crate::agent::{Agent, AgentRegistry, DefaultInstructionBuilder, InstructionBuilder};
use crate::config::RunOptions;
use crate::core::{
    ContextVariables, Message, Response, RunError, RunEvent, RunResult, StopReason, TurnState,
};
use crate::llm::{normalize, CompletionAdapter, CompletionRequest, StreamAccumulator};
use crate::tools::ToolDispatcher;

/// Stream of run events ending with [`RunEvent::Response`]
pub type RunStream<'a> = Pin<Box<dyn Stream<Item = RunResult<RunEvent>> + Send + 'a>>;

/// Multi-agent turn runner
///
/// Holds no per-run state; any number of runs can be driven concurrently from one
/// instance.
///
/// # Example
///
/// ```ignore
/// let agents = AgentRegistry::new()
///     .with_agent(Agent::new("Triage Agent", "gpt-4o").with_handoff("Sales Agent"))
///     .with_agent(Agent::new("Sales Agent", "gpt-4o"));
///
/// let anthill = Anthill::new(adapter, agents);
/// let response = anthill
///     .run("Triage Agent", vec![Message::user("hi")], ContextVariables::new(), RunOptions::new())
///     .await?;
/// ```
#[derive(Clone)]
pub struct Anthill {
    adapter: Arc<dyn CompletionAdapter>,
    agents: Arc<AgentRegistry>,
    instructions: Arc<dyn InstructionBuilder>,
}

impl Anthill {
    /// Create a runner over an adapter and a team of agents
    pub fn new(adapter: Arc<dyn CompletionAdapter>, agents: AgentRegistry) -> Self {
        Self {
            adapter,
            agents: Arc::new(agents),
            instructions: Arc::new(DefaultInstructionBuilder),
        }
    }

    /// Replace the instruction builder
    pub fn with_instruction_builder<B: InstructionBuilder + 'static>(mut self, builder: B) -> Self {
        self.instructions = Arc::new(builder);
        self
    }

    /// The agent team
    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    /// The completion adapter
    pub fn adapter(&self) -> &Arc<dyn CompletionAdapter> {
        &self.adapter
    }

    /// Build the completion request for `agent` over the current history
    pub fn build_request(
        &self,
        agent: &Agent,
        history: &[Message],
        context: &ContextVariables,
        options: &RunOptions,
    ) -> CompletionRequest {
        completion_request(self.instructions.as_ref(), agent, history, context, options)
    }

    /// Run to completion and return the [`Response`]
    ///
    /// With `options.stream` set, completions are requested as delta streams and folded;
    /// the deltas themselves are discarded.
    pub async fn run(
        &self,
        agent: &str,
        messages: Vec<Message>,
        context_variables: ContextVariables,
        options: RunOptions,
    ) -> RunResult<Response> {
        let mut events = self.run_and_stream(agent, messages, context_variables, options);
        while let Some(event) = events.next().await {
            if let RunEvent::Response(response) = event? {
                return Ok(response);
            }
        }
        Err(RunError::adapter(anyhow::anyhow!(
            "Run ended without a response"
        )))
    }

    /// Run lazily, yielding events as they happen
    ///
    /// Streamed completions are framed by `Start` / `End` with every raw delta yielded in
    /// between. Every appended message is yielded as `Message`; the final item is
    /// `Response`. Dropping the stream abandons the run; batches already committed stay
    /// committed.
    pub fn run_and_stream<'a>(
        &'a self,
        agent: &str,
        messages: Vec<Message>,
        context_variables: ContextVariables,
        options: RunOptions,
    ) -> RunStream<'a> {
        let start = agent.to_string();

        Box::pin(try_stream! {
            let mut active = self.agents.resolve(&start)?;
            let mut context = context_variables;
            let mut history = messages;
            let init_len = history.len();
            let mut turns = 0usize;
            let mut state = TurnState::Requesting;
            let mut stop = StopReason::NoToolCalls;
            let mut pending_handoff: Option<String> = None;

            tracing::info!(
                "[Anthill] Run started with '{}' ({} messages, max_turns={:?})",
                active.name,
                init_len,
                options.max_turns
            );

            loop {
                tracing::debug!("[Anthill] State: {}", state);

                match state {
                    TurnState::Requesting => {
                        if !options.turn_allowed(turns) {
                            tracing::info!("[Anthill] Turn budget exhausted after {} turns", turns);
                            stop = StopReason::MaxTurns;
                            state = TurnState::Done;
                            continue;
                        }

                        turns += 1;
                        tracing::info!("[Anthill] Turn {} with '{}'", turns, active.name);

                        let request = self.build_request(&active, &history, &context, &options);
                        if options.debug {
                            tracing::debug!(
                                "[Anthill] Request: {}",
                                serde_json::to_string(&request).unwrap_or_default()
                            );
                        }

                        let message = if options.stream {
                            let mut deltas = self
                                .adapter
                                .stream(request)
                                .await
                                .map_err(RunError::adapter)?;

                            yield RunEvent::Start { sender: active.name.clone() };
                            let mut accumulator = StreamAccumulator::new();
                            while let Some(delta) = deltas.next().await {
                                let delta = match delta {
                                    Ok(delta) => delta,
                                    Err(e) => {
                                        yield RunEvent::End;
                                        Err::<_, RunError>(RunError::adapter(e))?
                                    }
                                };
                                yield RunEvent::Delta {
                                    sender: active.name.clone(),
                                    delta: delta.clone(),
                                };
                                accumulator.push(&delta);
                            }
                            yield RunEvent::End;

                            tracing::debug!(
                                "[Anthill] Stream complete: {} deltas, {} tool calls",
                                accumulator.delta_count(),
                                accumulator.tool_call_count()
                            );
                            accumulator.finish(&active.name)?
                        } else {
                            let raw = self
                                .adapter
                                .complete(request)
                                .await
                                .map_err(RunError::adapter)?;
                            normalize(raw, &active.name)
                        };

                        if options.debug {
                            tracing::debug!(
                                "[Anthill] Received completion: {}",
                                serde_json::to_string(&message).unwrap_or_default()
                            );
                        }

                        let has_tool_calls = message.has_tool_calls();
                        history.push(message.clone());
                        yield RunEvent::Message(message);

                        state = if !has_tool_calls {
                            stop = StopReason::NoToolCalls;
                            TurnState::Done
                        } else if !options.execute_tools {
                            stop = StopReason::ToolsDisabled;
                            TurnState::Done
                        } else {
                            TurnState::Dispatching
                        };
                    }

                    TurnState::Dispatching => {
                        let calls = history
                            .last()
                            .map(|m| m.tool_calls.clone())
                            .unwrap_or_default();

                        let outcome =
                            ToolDispatcher::dispatch(&calls, &active, &self.agents, &context).await?;

                        for message in outcome.messages {
                            history.push(message.clone());
                            yield RunEvent::Message(message);
                        }
                        context.merge(&outcome.context_variables);

                        state = match outcome.agent {
                            Some(next) => {
                                pending_handoff = Some(next);
                                TurnState::Handoff
                            }
                            None => TurnState::Requesting,
                        };
                    }

                    TurnState::Handoff => {
                        if let Some(next) = pending_handoff.take() {
                            let next = self.agents.resolve(&next)?;
                            tracing::info!("[Anthill] Handoff: {} -> {}", active.name, next.name);
                            active = next;
                        }
                        state = TurnState::Requesting;
                    }

                    TurnState::Done => break,
                }
            }

            tracing::info!(
                "[Anthill] Run finished with '{}' after {} turns ({:?})",
                active.name,
                turns,
                stop
            );

            yield RunEvent::Response(Response {
                messages: history.split_off(init_len),
                agent: active.name.clone(),
                context_variables: context,
            });
        })
    }
}

/// Render `agent`'s instructions and tools into a request over `history`
pub(crate) fn completion_request(
    builder: &dyn InstructionBuilder,
    agent: &Agent,
    history: &[Message],
    context: &ContextVariables,
    options: &RunOptions,
) -> CompletionRequest {
    let tools = agent.tool_schemas();
    let instructions = agent.instructions.render(context);
    let system = builder.build(&agent.name, &instructions, &agent.team(), &tools);

    CompletionRequest {
        model: options
            .model_override
            .clone()
            .unwrap_or_else(|| agent.model.clone()),
        messages: history.to_vec(),
        system,
        tools,
        tool_choice: agent.tool_choice.clone(),
        params: agent.completion_args.clone(),
    }
}

impl std::fmt::Debug for Anthill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anthill")
            .field("adapter", &self.adapter.provider_name())
            .field("agents", &self.agents)
            .finish()
    }
}
