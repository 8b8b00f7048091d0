//! Step executor
//!
//! Runs the resolved tasks of one step against their agents and returns the
//! last task's raw output. Within a sequential batch, each task receives the
//! previous task's output as context.

use std::time::Instant;

use citycrew_agent::TaskRequest;

use crate::config::ResolvedTask;
use crate::error::WorkflowError;
use crate::registry::AgentRegistry;
use crate::workflow::StepResult;

/// Ordering policy for tasks within a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Process {
    #[default]
    Sequential,
}

#[derive(Debug, Clone, Default)]
pub struct StepExecutor {
    process: Process,
}

impl StepExecutor {
    pub fn new(process: Process) -> Self {
        Self { process }
    }

    pub fn process(&self) -> Process {
        self.process
    }

    /// Execute `tasks` in listed order. Blocks until the last one finishes.
    pub async fn run(
        &self,
        step: &str,
        tasks: &[ResolvedTask],
        registry: &AgentRegistry,
    ) -> Result<StepResult, WorkflowError> {
        if tasks.is_empty() {
            return Err(WorkflowError::Config(format!("Step '{}' has no tasks", step)));
        }

        // Resolve every agent before running anything
        let agents = tasks
            .iter()
            .map(|task| registry.require(&task.agent))
            .collect::<Result<Vec<_>, _>>()?;

        let start = Instant::now();
        let mut previous: Option<String> = None;

        match self.process {
            Process::Sequential => {
                for (task, agent) in tasks.iter().zip(agents) {
                    let mut request = TaskRequest::new(&task.description, &task.expected_output);
                    if let Some(context) = previous.take() {
                        request = request.with_context(context);
                    }

                    tracing::info!(step, agent = %task.agent, "Running task");
                    tracing::debug!(step, description = %task.description, "Task description");

                    let output = agent
                        .runner
                        .run(&request)
                        .await
                        .map_err(|source| WorkflowError::Execution {
                            step: step.to_string(),
                            source,
                        })?;

                    previous = Some(output);
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let agent = tasks.last().map(|t| t.agent.clone()).unwrap_or_default();

        Ok(StepResult {
            step: step.to_string(),
            agent,
            output: previous.unwrap_or_default(),
            duration_ms,
        })
    }
}
