//! Three-step city workflow driven by persona agents
//!
//! This crate provides:
//! - Agent and task definitions loaded from YAML/TOML
//! - Placeholder substitution for task descriptions
//! - An agent registry built once per run
//! - A sequential step executor
//! - The workflow engine: choose a city, find famous things, explain them
//!
//! # Example
//!
//! ```rust,ignore
//! use citycrew::{GeminiAgentFactory, WorkflowEngine};
//! use citycrew_agent::{Credentials, LlmSettings};
//!
//! let factory = GeminiAgentFactory::new(LlmSettings::default(), Credentials::load()?);
//! let engine = WorkflowEngine::from_config(
//!     Path::new("config/agents.yaml"),
//!     Path::new("config/tasks.yaml"),
//!     &factory,
//! )?;
//!
//! let outcome = engine.run().await?;
//! println!("{}", outcome.explanation);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod prompts;
pub mod registry;
pub mod template;
pub mod workflow;

pub use config::{AgentSpec, ResolvedTask, TaskSpec};
pub use engine::{Transition, WorkflowEngine};
pub use error::WorkflowError;
pub use executor::{Process, StepExecutor};
pub use registry::{AgentFactory, AgentRegistry, GeminiAgentFactory, RegisteredAgent};
pub use workflow::{Phase, StepResult, WorkflowOutcome, WorkflowRoles, WorkflowState};
