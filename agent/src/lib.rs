//! Persona agents with Gemini and web search support
//!
//! This crate provides:
//! - `Agent`: a role/goal/backstory persona driving a tool-calling LLM loop
//! - `TaskRunner`: the seam workflow controllers call to run one task
//! - `GeminiClient`: the `Llm` backend
//! - `SearchTool` over a pluggable `SearchBackend` (Serper)
//! - Credential and endpoint configuration

pub mod agent;
pub mod config;
pub mod llm;
pub mod search;

pub use agent::{Agent, Persona, TaskRequest, TaskRunner, Tool};
pub use config::{Credentials, LlmSettings};
pub use llm::{GeminiClient, Llm};
pub use search::{SearchBackend, SearchTool, SerperBackend};
