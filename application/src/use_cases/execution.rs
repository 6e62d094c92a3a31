//! Execution Dispatcher
//!
//! Carries out the selected proposal's workflow. With a single executor every
//! step goes to that agent; with the collaborative executor each step goes to
//! the agent named by its actor.

use crate::config::DiscussionConfig;
use crate::ports::agent_adapter::AgentAdapter;
use crate::registry::AgentRegistry;
use crate::use_cases::shared::guarded_call;
use conclave_domain::{ExecutionResult, Executor, Proposal, StepOutcome, WorkflowStep};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ExecutionDispatcher {
    registry: Arc<AgentRegistry>,
    config: DiscussionConfig,
}

impl ExecutionDispatcher {
    pub fn new(registry: Arc<AgentRegistry>, config: DiscussionConfig) -> Self {
        Self { registry, config }
    }

    /// Run every step of `proposal`. Outcomes are always in step order.
    pub async fn execute(&self, proposal: &Proposal) -> ExecutionResult {
        let steps = proposal.ordered_steps();
        info!(
            executor = %proposal.executor,
            steps = steps.len(),
            "Executing workflow"
        );

        let outcomes = match &proposal.executor {
            Executor::Agent(id) => match self.registry.get(id) {
                Some(agent) => {
                    let mut outcomes = Vec::with_capacity(steps.len());
                    for step in &steps {
                        let step = step.readdressed(id);
                        outcomes.push(self.run_step(agent.as_ref(), &step).await);
                    }
                    outcomes
                }
                None => {
                    warn!(executor = %id, "Executor is not registered");
                    steps
                        .iter()
                        .map(|step| StepOutcome::failure(step, format!("actor not found: {id}")))
                        .collect()
                }
            },
            Executor::All => {
                let mut outcomes = Vec::with_capacity(steps.len());
                for batch in self.batches(&steps) {
                    if batch.len() == 1 {
                        outcomes.push(self.dispatch(&batch[0]).await);
                    } else {
                        debug!(steps = batch.len(), "Dispatching independent steps concurrently");
                        outcomes.extend(join_all(batch.iter().map(|s| self.dispatch(s))).await);
                    }
                }
                outcomes
            }
        };

        let result = ExecutionResult::new(
            proposal.summary.clone(),
            proposal.executor.clone(),
            outcomes,
        );
        info!(
            status = %result.status,
            succeeded = result.succeeded(),
            failed = result.failed(),
            "Workflow finished"
        );
        result
    }

    /// Split steps into runs that may execute together.
    ///
    /// A run grows while each next step is independent and its actor is not
    /// already in the run; any other step forms a run of its own.
    fn batches<'s>(&self, steps: &'s [WorkflowStep]) -> Vec<&'s [WorkflowStep]> {
        let mut batches = Vec::new();
        let mut start = 0;
        for end in 1..=steps.len() {
            let extends = end < steps.len()
                && self.config.allow_parallel_steps
                && steps[end].independent
                && steps[start..end]
                    .iter()
                    .all(|s| s.independent && s.actor != steps[end].actor);
            if !extends {
                batches.push(&steps[start..end]);
                start = end;
            }
        }
        batches
    }

    async fn dispatch(&self, step: &WorkflowStep) -> StepOutcome {
        match self.registry.get(&step.actor) {
            Some(agent) => self.run_step(agent.as_ref(), step).await,
            None => {
                warn!(actor = %step.actor, step = step.index, "Step actor is not registered");
                StepOutcome::failure(step, format!("actor not found: {}", step.actor))
            }
        }
    }

    async fn run_step(&self, agent: &dyn AgentAdapter, step: &WorkflowStep) -> StepOutcome {
        match guarded_call(self.config.call_timeout, agent.execute_step(step)).await {
            Ok(output) => {
                debug!(actor = %step.actor, step = step.index, "Step completed");
                StepOutcome::success(step, output)
            }
            Err(e) => {
                warn!(actor = %step.actor, step = step.index, "Step failed: {}", e);
                StepOutcome::failure(step, e.to_string())
            }
        }
    }
}
