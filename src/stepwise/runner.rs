//! StepRunner - step-wise reasoning loop
//!
//! Each completion is one JSON [`Step`]. Completion failures and unparsable steps are
//! retried under a [`RetryPolicy`]; when every attempt fails the run still ends with a
//! well-formed [`Response`] whose last message is an `Error` step.

use std::sync::Arc;

use anyhow::{bail, Context};
use futures::StreamExt;

use super::prompt::StepInstructionBuilder;
use super::step::Step;
use crate::agent::{Agent, AgentRegistry, InstructionBuilder};
use crate::config::{RetryPolicy, RunOptions};
use crate::core::{ContextVariables, Message, Response, RunResult, StopReason, ToolInvocation};
use crate::hooks::{HookContext, NoopHooks, StepHooks};
use crate::llm::{CompletionAdapter, CompletionRequest, RawCompletion, StreamAccumulator};
use crate::runtime::anthill::completion_request;
use crate::tools::ToolDispatcher;

/// Step-wise runner with retries and hook checkpoints
pub struct StepRunner {
    adapter: Arc<dyn CompletionAdapter>,
    agents: Arc<AgentRegistry>,
    instructions: Arc<dyn InstructionBuilder>,
    hooks: Arc<dyn StepHooks>,
    retry: RetryPolicy,
}

impl StepRunner {
    /// Create a runner with the step prompt, no hooks and the default retry policy
    pub fn new(adapter: Arc<dyn CompletionAdapter>, agents: AgentRegistry) -> Self {
        Self {
            adapter,
            agents: Arc::new(agents),
            instructions: Arc::new(StepInstructionBuilder),
            hooks: Arc::new(NoopHooks),
            retry: RetryPolicy::default(),
        }
    }

    /// Install checkpoint hooks
    pub fn with_hooks<H: StepHooks + 'static>(mut self, hooks: H) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
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

    /// Run until the model (or a hook) produces a final step or the turn budget runs out
    ///
    /// Tool and handoff errors propagate; completion errors never do.
    pub async fn run(
        &self,
        agent: &str,
        messages: Vec<Message>,
        context_variables: ContextVariables,
        options: RunOptions,
    ) -> RunResult<Response> {
        let mut active = self.agents.resolve(agent)?;
        let mut context = context_variables;
        let mut history = messages;
        let init_len = history.len();
        let mut turns = 0usize;
        let mut stop = StopReason::MaxTurns;

        tracing::info!("[StepRunner] Run started with '{}'", active.name);

        let seeded = self.hooks.before_first_step(
            &HookContext::before_first_step(&active, &history, &context).with_run_start(init_len),
        );
        if let Some(step) = seeded {
            tracing::debug!("[StepRunner] First step seeded by hook: {}", step.title);
            history.push(step.to_message(&active.name));
        }

        while options.turn_allowed(turns) {
            turns += 1;
            let step = self.next_step(&active, &history, &context, &options).await;
            tracing::info!(
                "[StepRunner] Step {} ({}): {} [{:?}]",
                turns,
                active.name,
                step.title,
                step.next_action
            );

            if step.is_final() {
                if step.tool().is_some() {
                    tracing::warn!("[StepRunner] Ignoring tool on final step '{}'", step.title);
                }

                let checked = self.hooks.before_final_step(
                    &HookContext::before_final_step(&active, &history, &context, &step)
                        .with_run_start(init_len),
                );
                match checked {
                    Some(extra) if !extra.is_final() => {
                        tracing::info!("[StepRunner] Final step deferred by hook: {}", extra.title);
                        history.push(step.to_message(&active.name));
                        history.push(extra.to_message(&active.name));
                        continue;
                    }
                    Some(replacement) => {
                        tracing::info!(
                            "[StepRunner] Final step replaced by hook: {}",
                            replacement.title
                        );
                        history.push(replacement.to_message(&active.name));
                    }
                    None => history.push(step.to_message(&active.name)),
                }
                stop = StopReason::FinalStep;
                break;
            }

            let tool_name = match step.tool() {
                Some(name) => name.to_string(),
                None => {
                    history.push(step.to_message(&active.name));
                    continue;
                }
            };

            if !options.execute_tools {
                tracing::info!("[StepRunner] Tools disabled, stopping at '{}'", tool_name);
                history.push(step.to_message(&active.name));
                stop = StopReason::ToolsDisabled;
                break;
            }

            let invocation = ToolInvocation::new(tool_name.as_str(), step.tool_arguments());
            let offered = if invocation.is_transfer() {
                !active.handoffs.is_empty()
            } else {
                active.tools.get(&tool_name).is_some()
            };
            if !offered {
                tracing::warn!("[StepRunner] Wrong tool '{}' for '{}'", tool_name, active.name);
                history.push(step.to_message(&active.name));
                let correction = Step::wrong_tool(&tool_name, &active.tools.tool_names());
                history.push(correction.to_message(&active.name));
                continue;
            }

            let mut message = step.to_message(&active.name);
            message.tool_calls.push(invocation.clone());
            history.push(message);

            let intercepted = self.hooks.before_tool_call(
                &HookContext::before_tool_call(
                    &active,
                    &history,
                    &context,
                    &step,
                    &tool_name,
                    &invocation.arguments,
                )
                .with_run_start(init_len),
            );
            if let Some(synthetic) = intercepted {
                tracing::info!("[StepRunner] Tool '{}' short-circuited by hook", tool_name);
                history.push(synthetic.to_message(&active.name));
                continue;
            }

            let outcome = ToolDispatcher::dispatch(
                std::slice::from_ref(&invocation),
                &active,
                &self.agents,
                &context,
            )
            .await?;
            history.extend(outcome.messages);
            context.merge(&outcome.context_variables);

            if let Some(next) = outcome.agent {
                let next = self.agents.resolve(&next)?;
                tracing::info!("[StepRunner] Handoff: {} -> {}", active.name, next.name);
                active = next;
            }
        }

        tracing::info!(
            "[StepRunner] Run finished with '{}' after {} steps ({:?})",
            active.name,
            turns,
            stop
        );

        Ok(Response {
            messages: history.split_off(init_len),
            agent: active.name.clone(),
            context_variables: context,
        })
    }

    /// Obtain one valid step, retrying per policy; never fails
    async fn next_step(
        &self,
        agent: &Agent,
        history: &[Message],
        context: &ContextVariables,
        options: &RunOptions,
    ) -> Step {
        let attempts = self.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let request =
                completion_request(self.instructions.as_ref(), agent, history, context, options);
            if options.debug {
                tracing::debug!(
                    "[StepRunner] Request: {}",
                    serde_json::to_string(&request).unwrap_or_default()
                );
            }

            match self.request_step(request, options.stream).await {
                Ok(step) => return step,
                Err(e) => {
                    tracing::warn!(
                        "[StepRunner] Attempt {}/{} failed: {:#}",
                        attempt,
                        attempts,
                        e
                    );
                    last_error = format!("{:#}", e);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.retry.delay()).await;
            }
        }

        tracing::error!("[StepRunner] Giving up after {} attempts", attempts);
        Step::error(attempts, &last_error)
    }

    async fn request_step(&self, request: CompletionRequest, stream: bool) -> anyhow::Result<Step> {
        let text = if stream {
            let mut deltas = self.adapter.stream(request).await?;
            let mut accumulator = StreamAccumulator::new();
            while let Some(delta) = deltas.next().await {
                accumulator.push(&delta?);
            }
            accumulator.content().to_string()
        } else {
            match self.adapter.complete(request).await? {
                RawCompletion::Reply(text) => text,
                RawCompletion::Empty => bail!("Empty completion"),
                other => bail!("Expected a JSON step, got {:?}", other),
            }
        };

        Step::parse(&text).with_context(|| format!("Invalid step: {}", text))
    }
}

impl std::fmt::Debug for StepRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRunner")
            .field("adapter", &self.adapter.provider_name())
            .field("agents", &self.agents)
            .field("retry", &self.retry)
            .finish()
    }
}
