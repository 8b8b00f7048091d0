//! Workflow state and phase definitions
//!
//! A run moves strictly forward through
//! `Init → CityChosen → FamousFound → Explained → Done`.
//! [`WorkflowState`] is the only data carried from one step to the next.

use std::fmt;

/// Data accumulated across steps of a single run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowState {
    pub city: Option<String>,
    pub famous_things: Option<String>,
}

/// Where a run currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Init,
    CityChosen,
    FamousFound,
    Explained { explanation: String },
    Done { explanation: String },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::CityChosen => "CITY_CHOSEN",
            Self::FamousFound => "FAMOUS_FOUND",
            Self::Explained { .. } => "EXPLAINED",
            Self::Done { .. } => "DONE",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which agent picks the city, and which tasks drive the later steps
///
/// The famous and explanation tasks are looked up by their `name` in the
/// tasks document. Each runs with the agent assigned to it there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRoles {
    /// Agent that picks the city
    pub city: String,

    /// Name of the task that finds famous things
    pub famous_task: String,

    /// Name of the task that explains them
    pub explanation_task: String,
}

impl Default for WorkflowRoles {
    fn default() -> Self {
        Self {
            city: "city_agent".to_string(),
            famous_task: "famous".to_string(),
            explanation_task: "explanation".to_string(),
        }
    }
}

/// Result of executing one workflow step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    /// Step label ("city", "famous", "explanation")
    pub step: String,

    /// Agent that produced the output
    pub agent: String,

    /// Raw output, untrimmed
    pub output: String,

    /// Duration of execution
    pub duration_ms: u64,
}

/// Everything a completed run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutcome {
    pub city: String,
    pub famous_things: String,
    pub explanation: String,
    pub steps: Vec<StepResult>,
}

impl WorkflowOutcome {
    pub fn total_duration_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }
}
