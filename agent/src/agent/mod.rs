//! Agent module - persona-driven LLM with tool-calling capabilities
//!
//! This implements the "tool-using agent loop" where:
//! 1. A task is rendered into a user turn under the agent's persona
//! 2. LLM receives the turn along with available tools
//! 3. LLM decides whether to call tools or respond directly
//! 4. If tools are called, results are fed back to LLM
//! 5. Loop continues until LLM responds without tool calls

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::llm::{ChatRequest, Llm, Message};

pub mod tools;
pub use tools::Tool;

/// Maximum number of tool-calling iterations to prevent infinite loops
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Who the agent is: rendered into the system instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl Persona {
    pub fn new(role: impl Into<String>, goal: impl Into<String>, backstory: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// Render the system instruction for this persona
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role.trim(),
            self.backstory.trim(),
            self.goal.trim()
        )
    }
}

/// A single unit of work handed to an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub description: String,
    pub expected_output: String,
    /// Output of the previous task in the same batch, if any
    pub context: Option<String>,
}

impl TaskRequest {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            context: None,
        }
    }

    /// Attach context from earlier work
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Render the user turn sent to the model
    pub fn prompt(&self) -> String {
        let mut prompt = format!(
            "Current Task: {}\n\nThis is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            self.description.trim(),
            self.expected_output.trim()
        );

        if let Some(context) = &self.context {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(context.trim());
        }

        prompt
    }
}

/// Something that can run a task to completion and return its raw text
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run(&self, task: &TaskRequest) -> Result<String>;
}

/// An agent that can use tools
pub struct Agent {
    persona: Persona,
    llm: Arc<dyn Llm>,
    tools: Vec<Arc<dyn Tool>>,
    temperature: Option<f32>,
    max_iterations: usize,
    verbose: bool,
}

impl Agent {
    /// Create a new agent
    pub fn new(persona: Persona, llm: Arc<dyn Llm>) -> Self {
        Self {
            persona,
            llm,
            tools: Vec::new(),
            temperature: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            verbose: false,
        }
    }

    /// Attach a tool capability
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set sampling temperature
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set maximum iterations for tool-calling loop
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Enable verbose timing output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Get available tool names
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Get the current model name
    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Run a single task through the agent, handling tool calls
    pub async fn execute(&self, task: &TaskRequest) -> Result<String> {
        let total_start = Instant::now();
        let tools = tools::tool_specs(&self.tools);

        let mut request = ChatRequest {
            system: Some(self.persona.system_prompt()),
            messages: vec![Message::user(task.prompt())],
            tools,
            temperature: self.temperature,
        };

        tracing::info!(
            role = %self.persona.role,
            model = %self.llm.model(),
            tools = request.tools.len(),
            "Agent starting task"
        );

        for iteration in 1..=self.max_iterations {
            tracing::debug!("Agent iteration {}", iteration);

            let call_start = Instant::now();
            let reply = self
                .llm
                .chat(&request)
                .await
                .with_context(|| format!("Agent '{}' failed to get a reply", self.persona.role))?;

            if self.verbose {
                let kind = if reply.tool_calls.is_empty() {
                    "final".to_string()
                } else {
                    format!("{} tool call(s)", reply.tool_calls.len())
                };
                eprintln!(
                    "[{:>7}ms] {} response ({})",
                    call_start.elapsed().as_millis(),
                    self.llm.model(),
                    kind
                );
            }

            if reply.tool_calls.is_empty() {
                if self.verbose {
                    eprintln!(
                        "[{:>7}ms] Total ({} iteration{})",
                        total_start.elapsed().as_millis(),
                        iteration,
                        if iteration == 1 { "" } else { "s" }
                    );
                }
                tracing::info!(role = %self.persona.role, iterations = iteration, "Agent finished task");
                return Ok(reply.content);
            }

            tracing::info!("Agent making {} tool call(s)", reply.tool_calls.len());

            request
                .messages
                .push(Message::assistant(reply.content.clone(), reply.tool_calls.clone()));

            for tool_call in &reply.tool_calls {
                let tool_start = Instant::now();
                let result = match tools::execute_tool_call(&self.tools, tool_call).await {
                    Ok(output) => output,
                    Err(e) => format!("Error calling tool {}: {}", tool_call.name, e),
                };

                if self.verbose {
                    eprintln!("[{:>7}ms] → {}", tool_start.elapsed().as_millis(), tool_call.name);
                }

                request.messages.push(Message::tool(&tool_call.name, result));
            }
        }

        tracing::warn!("Agent reached max iterations ({}), stopping", self.max_iterations);
        bail!(
            "Agent '{}' reached maximum iterations ({}) without completing",
            self.persona.role,
            self.max_iterations
        )
    }
}

#[async_trait]
impl TaskRunner for Agent {
    async fn run(&self, task: &TaskRequest) -> Result<String> {
        self.execute(task).await
    }
}
