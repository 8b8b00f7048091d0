//! Workflow execution engine
//!
//! Drives the three-step city workflow:
//! - choose a city (fixed instruction, city agent)
//! - find famous things about it (task template with `{{city}}`)
//! - explain them (task template with `{{city}}` and `{{famous_things}}`)
//!
//! The two templated tasks are picked from the tasks document by name
//! (`famous`, `explanation`), falling back to the second and third entries
//! when no task carries the name. Each runs with its own assigned agent.
//!
//! Later task descriptions depend on earlier outputs, so each step is
//! materialised only once the previous step has finished. Every transition
//! takes the accumulated [`WorkflowState`] and returns the next phase with
//! the updated state.

use std::path::{Path, PathBuf};

use crate::config::{load_agents, load_tasks, ResolvedTask, TaskSpec};
use crate::error::WorkflowError;
use crate::executor::StepExecutor;
use crate::prompts;
use crate::registry::{AgentFactory, AgentRegistry};
use crate::template;
use crate::workflow::{Phase, StepResult, WorkflowOutcome, WorkflowRoles, WorkflowState};

/// Fallback entry of the famous-things task when none is named
const FAMOUS_TASK_POSITION: usize = 1;

/// Fallback entry of the explanation task when none is named
const EXPLANATION_TASK_POSITION: usize = 2;

/// The templated tasks as read for one step
struct StepTasks {
    famous: TaskSpec,
    explanation: TaskSpec,
}

/// The result of applying one transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub phase: Phase,
    pub state: WorkflowState,
    /// The step executed by this transition, if any
    pub step: Option<StepResult>,
}

/// Workflow execution engine
pub struct WorkflowEngine {
    /// Agents for this run
    registry: AgentRegistry,

    /// Tasks document, re-read whenever a step needs its template
    tasks_path: PathBuf,

    /// City agent and the names of the templated tasks
    roles: WorkflowRoles,

    executor: StepExecutor,
}

impl WorkflowEngine {
    /// Create a new workflow engine
    pub fn new(registry: AgentRegistry, tasks_path: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            tasks_path: tasks_path.into(),
            roles: WorkflowRoles::default(),
            executor: StepExecutor::default(),
        }
    }

    /// Load agents, build the registry and create the engine
    pub fn from_config(
        agents_path: &Path,
        tasks_path: &Path,
        factory: &dyn AgentFactory,
    ) -> Result<Self, WorkflowError> {
        let specs = load_agents(agents_path)?;
        let registry = AgentRegistry::build(&specs, factory)?;

        tracing::info!(agents = ?registry.names(), "Agent registry built");

        Ok(Self::new(registry, tasks_path))
    }

    /// Override the city agent and the task names used for each step
    pub fn with_roles(mut self, roles: WorkflowRoles) -> Self {
        self.roles = roles;
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn roles(&self) -> &WorkflowRoles {
        &self.roles
    }

    /// Check every agent and task reference before anything runs
    pub fn validate(&self) -> Result<(), WorkflowError> {
        self.registry.require(&self.roles.city)?;

        let tasks = load_tasks(&self.tasks_path)?;
        for task in &tasks {
            self.registry.require(&task.agent)?;
        }

        self.select_tasks(&tasks)?;

        Ok(())
    }

    /// Run the workflow from `Init` to `Done`
    pub async fn run(&self) -> Result<WorkflowOutcome, WorkflowError> {
        self.validate()?;

        let mut phase = Phase::Init;
        let mut state = WorkflowState::default();
        let mut steps = Vec::new();

        loop {
            let from = phase.name();
            let Transition {
                phase: next,
                state: next_state,
                step,
            } = self.transition(phase, state).await?;

            tracing::info!(from, to = next.name(), "Workflow transition");
            steps.extend(step);

            if let Phase::Done { explanation } = next {
                return Ok(WorkflowOutcome {
                    city: next_state.city.unwrap_or_default(),
                    famous_things: next_state.famous_things.unwrap_or_default(),
                    explanation,
                    steps,
                });
            }

            phase = next;
            state = next_state;
        }
    }

    /// Apply the single transition leaving `phase`
    pub async fn transition(
        &self,
        phase: Phase,
        state: WorkflowState,
    ) -> Result<Transition, WorkflowError> {
        match phase {
            Phase::Init => {
                let task = ResolvedTask {
                    description: prompts::CITY_TASK.to_string(),
                    expected_output: prompts::CITY_EXPECTED_OUTPUT.to_string(),
                    agent: self.roles.city.clone(),
                };
                let step = self.run_step("city", task).await?;
                let city = clean_output(&step);

                Ok(Transition {
                    phase: Phase::CityChosen,
                    state: WorkflowState {
                        city: Some(city),
                        ..state
                    },
                    step: Some(step),
                })
            }

            Phase::CityChosen => {
                let spec = self.load_step_tasks()?.famous;
                let task = spec.resolve(state.city.as_deref(), None);
                let step = self.run_step("famous", task).await?;
                let famous_things = clean_output(&step);

                Ok(Transition {
                    phase: Phase::FamousFound,
                    state: WorkflowState {
                        famous_things: Some(famous_things),
                        ..state
                    },
                    step: Some(step),
                })
            }

            Phase::FamousFound => {
                let spec = self.load_step_tasks()?.explanation;
                let task = spec.resolve(state.city.as_deref(), state.famous_things.as_deref());
                let step = self.run_step("explanation", task).await?;

                Ok(Transition {
                    phase: Phase::Explained {
                        explanation: step.output.clone(),
                    },
                    state,
                    step: Some(step),
                })
            }

            Phase::Explained { explanation } => Ok(Transition {
                phase: Phase::Done { explanation },
                state,
                step: None,
            }),

            done @ Phase::Done { .. } => Ok(Transition {
                phase: done,
                state,
                step: None,
            }),
        }
    }

    /// Re-read the tasks document and pick the famous and explanation tasks
    fn load_step_tasks(&self) -> Result<StepTasks, WorkflowError> {
        let tasks = load_tasks(&self.tasks_path)?;
        let (famous, explanation) = self.select_tasks(&tasks)?;

        Ok(StepTasks {
            famous: tasks[famous].clone(),
            explanation: tasks[explanation].clone(),
        })
    }

    /// Indices of the famous and explanation tasks within `tasks`
    fn select_tasks(&self, tasks: &[TaskSpec]) -> Result<(usize, usize), WorkflowError> {
        let famous = self.select_task(tasks, &self.roles.famous_task, FAMOUS_TASK_POSITION)?;
        let explanation =
            self.select_task(tasks, &self.roles.explanation_task, EXPLANATION_TASK_POSITION)?;

        if famous == explanation {
            return Err(WorkflowError::Config(format!(
                "Tasks '{}' and '{}' both resolve to entry {} in {}",
                self.roles.famous_task,
                self.roles.explanation_task,
                famous + 1,
                self.tasks_path.display()
            )));
        }

        Ok((famous, explanation))
    }

    fn select_task(
        &self,
        tasks: &[TaskSpec],
        name: &str,
        position: usize,
    ) -> Result<usize, WorkflowError> {
        find_task(tasks, name, position).ok_or_else(|| {
            WorkflowError::Config(format!(
                "No '{}' task in {}: no task has that name and there is no entry {}",
                name,
                self.tasks_path.display(),
                position + 1
            ))
        })
    }

    async fn run_step(&self, step: &str, task: ResolvedTask) -> Result<StepResult, WorkflowError> {
        let leftover = template::unresolved_placeholders(&task.description);
        if !leftover.is_empty() {
            tracing::warn!(step, placeholders = ?leftover, "Unresolved placeholders in task description");
        }

        self.executor
            .run(step, std::slice::from_ref(&task), &self.registry)
            .await
    }
}

/// Index of the task named `name`, else the task at `position`
fn find_task(tasks: &[TaskSpec], name: &str, position: usize) -> Option<usize> {
    tasks
        .iter()
        .position(|t| t.name.as_deref() == Some(name))
        .or_else(|| (position < tasks.len()).then_some(position))
}

/// Trim a step's output for use as a substitution value
fn clean_output(step: &StepResult) -> String {
    let value = step.output.trim().to_string();
    if value.is_empty() {
        tracing::warn!(step = %step.step, "Step produced an empty result");
    }
    value
}
