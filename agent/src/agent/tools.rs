//! Tool-related utilities for the Agent
//!
//! This module contains:
//! - The `Tool` trait implemented by capabilities an agent may call
//! - Cleaning JSON schemas for function-calling compatibility
//! - Executing tool calls by name

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use schemars::JsonSchema;

use crate::llm::{ToolCall, ToolSpec};

/// A capability the model may invoke during a task
#[async_trait]
pub trait Tool: Send + Sync {
    /// Function name exposed to the model
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does
    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn parameters(&self) -> serde_json::Value;

    /// Run the tool with the model-supplied arguments
    async fn call(&self, arguments: serde_json::Value) -> Result<String>;
}

/// Build the parameters schema for an argument type
pub fn parameters_schema<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    let value = serde_json::to_value(&schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}));
    clean_schema(&value)
}

/// Clean up a JSON schema for function-calling compatibility
/// Removes $schema, title, and other fields the API rejects
pub fn clean_schema(schema: &serde_json::Value) -> serde_json::Value {
    match schema {
        serde_json::Value::Object(obj) => {
            let mut cleaned = serde_json::Map::new();
            for (key, value) in obj {
                match key.as_str() {
                    "$schema" | "title" | "additionalProperties" => continue,
                    "properties" | "$defs" | "definitions" => {
                        cleaned.insert(key.clone(), clean_schema_map(value));
                    }
                    _ => {
                        cleaned.insert(key.clone(), clean_schema(value));
                    }
                }
            }
            serde_json::Value::Object(cleaned)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(clean_schema).collect())
        }
        other => other.clone(),
    }
}

/// Clean every schema in a name -> schema map. The names themselves are data
/// and are kept even when they collide with stripped keywords.
fn clean_schema_map(map: &serde_json::Value) -> serde_json::Value {
    match map {
        serde_json::Value::Object(obj) => serde_json::Value::Object(
            obj.iter()
                .map(|(name, schema)| (name.clone(), clean_schema(schema)))
                .collect(),
        ),
        other => clean_schema(other),
    }
}

/// Convert tools to declarations for the model
pub fn tool_specs(tools: &[Arc<dyn Tool>]) -> Vec<ToolSpec> {
    tools
        .iter()
        .map(|tool| ToolSpec {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            parameters: tool.parameters(),
        })
        .collect()
}

/// Execute a tool call and return the result as a string
pub async fn execute_tool_call(tools: &[Arc<dyn Tool>], tool_call: &ToolCall) -> Result<String> {
    let name = &tool_call.name;

    let tool = tools
        .iter()
        .find(|t| t.name() == name)
        .ok_or_else(|| anyhow!("Unknown tool: {}", name))?;

    tracing::info!("Executing tool: {} with args: {}", name, tool_call.arguments);

    let output = tool.call(tool_call.arguments.clone()).await?;

    tracing::debug!(
        "Tool {} returned: {}...",
        name,
        output.chars().take(100).collect::<String>()
    );

    Ok(output)
}
