//! Web search capability
//!
//! A trait-based abstraction for search backends plus a [`SearchTool`]
//! that exposes any backend to the agent's tool-calling loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agent::tools::{parameters_schema, Tool};

pub mod serper;

pub use serper::SerperBackend;

/// Default number of results returned to the model
pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// A single web search result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The title of the result
    pub title: String,
    /// The URL of the result
    pub url: String,
    /// A description or snippet of the result
    pub description: String,
}

/// A collection of search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    /// The search query that was executed
    pub query: String,
    /// The search results
    pub results: Vec<SearchResult>,
    /// The backend that was used
    pub backend: String,
}

impl SearchResults {
    /// Render results as numbered plain text for the model
    pub fn to_text(&self) -> String {
        if self.results.is_empty() {
            return format!("No results found for '{}'.", self.query);
        }

        let mut out = format!("Search results for '{}':\n", self.query);
        for (i, r) in self.results.iter().enumerate() {
            out.push_str(&format!(
                "\n{}. {}\n   {}\n   {}\n",
                i + 1,
                r.title,
                r.url,
                r.description
            ));
        }
        out
    }
}

/// Trait for search backends
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Perform a web search
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults>;
}

/// Arguments the model supplies to the search tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchArgs {
    /// The search query to look up on the web
    pub query: String,
}

/// Exposes a [`SearchBackend`] as an agent tool
pub struct SearchTool {
    backend: Arc<dyn SearchBackend>,
    limit: usize,
}

impl SearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            limit: DEFAULT_RESULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the internet for up-to-date information. Returns titles, links and snippets."
    }

    fn parameters(&self) -> serde_json::Value {
        parameters_schema::<SearchArgs>()
    }

    async fn call(&self, arguments: serde_json::Value) -> Result<String> {
        let args: SearchArgs =
            serde_json::from_value(arguments).context("Invalid web_search arguments")?;

        tracing::info!(backend = self.backend.name(), query = %args.query, "Web search");

        let results = self.backend.search(&args.query, self.limit).await?;
        Ok(results.to_text())
    }
}
