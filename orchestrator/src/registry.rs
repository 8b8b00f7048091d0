//! Agent registry
//!
//! Built once per workflow run from the agents document: one runner per
//! [`AgentSpec`], keyed by name. Tool capabilities are attached only to the
//! agents that list them.

use std::collections::HashMap;
use std::sync::Arc;

use citycrew_agent::{
    Agent, Credentials, GeminiClient, LlmSettings, Persona, SearchTool, SerperBackend, TaskRunner,
};

use crate::config::AgentSpec;
use crate::error::WorkflowError;

/// Name of the web search tool capability in agent definitions
pub const SEARCH_TOOL: &str = "search";

/// Constructs a runnable agent from its definition
pub trait AgentFactory: Send + Sync {
    fn build(&self, spec: &AgentSpec) -> Result<Arc<dyn TaskRunner>, WorkflowError>;
}

/// A definition paired with its constructed runner
#[derive(Clone)]
pub struct RegisteredAgent {
    pub spec: AgentSpec,
    pub runner: Arc<dyn TaskRunner>,
}

/// Registry of available agents
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, RegisteredAgent>,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Build one agent per definition. Duplicate names are rejected.
    pub fn build(specs: &[AgentSpec], factory: &dyn AgentFactory) -> Result<Self, WorkflowError> {
        let mut registry = Self::new();

        for spec in specs {
            if registry.contains(&spec.name) {
                return Err(WorkflowError::Config(format!(
                    "Duplicate agent name: {}",
                    spec.name
                )));
            }

            let runner = factory.build(spec)?;
            tracing::debug!(agent = %spec.name, tools = ?spec.tools, "Registered agent");
            registry.register(spec.clone(), runner)?;
        }

        Ok(registry)
    }

    /// Register a new agent
    pub fn register(
        &mut self,
        spec: AgentSpec,
        runner: Arc<dyn TaskRunner>,
    ) -> Result<(), WorkflowError> {
        if self.contains(&spec.name) {
            return Err(WorkflowError::Config(format!(
                "Duplicate agent name: {}",
                spec.name
            )));
        }

        self.agents
            .insert(spec.name.clone(), RegisteredAgent { spec, runner });
        Ok(())
    }

    /// Get an agent by name
    pub fn get(&self, name: &str) -> Option<&RegisteredAgent> {
        self.agents.get(name)
    }

    /// Get an agent by name, or fail with a lookup error
    pub fn require(&self, name: &str) -> Result<&RegisteredAgent, WorkflowError> {
        self.get(name)
            .ok_or_else(|| WorkflowError::AgentNotFound(name.to_string()))
    }

    /// Check if an agent exists
    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// List all agent names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.agents.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Builds Gemini-backed agents, attaching Serper search where requested
pub struct GeminiAgentFactory {
    settings: LlmSettings,
    credentials: Credentials,
}

impl GeminiAgentFactory {
    pub fn new(settings: LlmSettings, credentials: Credentials) -> Self {
        Self {
            settings,
            credentials,
        }
    }

    /// Construct the concrete agent for a definition
    pub fn build_agent(&self, spec: &AgentSpec) -> Result<Agent, WorkflowError> {
        let model = spec.model.as_deref().unwrap_or(&self.settings.model);

        let llm = GeminiClient::new(&self.settings.base_url, &self.credentials.model_api_key, model)
            .map_err(|e| WorkflowError::Config(format!("agent '{}': {:#}", spec.name, e)))?;

        let persona = Persona::new(&spec.role, &spec.goal, &spec.backstory);
        let mut agent = Agent::new(persona, Arc::new(llm))
            .with_temperature(spec.temperature)
            .with_verbose(spec.verbose);

        for tool in &spec.tools {
            match tool.as_str() {
                SEARCH_TOOL => {
                    let backend = SerperBackend::new(&self.credentials.search_api_key).map_err(|e| {
                        WorkflowError::Config(format!(
                            "agent '{}': cannot construct search tool: {:#}",
                            spec.name, e
                        ))
                    })?;
                    agent = agent.with_tool(Arc::new(SearchTool::new(Arc::new(backend))));
                }
                other => {
                    return Err(WorkflowError::Config(format!(
                        "agent '{}': unknown tool '{}'",
                        spec.name, other
                    )));
                }
            }
        }

        Ok(agent)
    }
}

impl AgentFactory for GeminiAgentFactory {
    fn build(&self, spec: &AgentSpec) -> Result<Arc<dyn TaskRunner>, WorkflowError> {
        Ok(Arc::new(self.build_agent(spec)?))
    }
}
