//! Serper backend
//!
//! Implements the SearchBackend trait using the Serper Google search API.
//! See: https://serper.dev

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{SearchBackend, SearchResult, SearchResults};

/// Default Serper API endpoint
pub const DEFAULT_SERPER_URL: &str = "https://google.serper.dev/search";

/// Serper backend
pub struct SerperBackend {
    client: Client,
    url: String,
    api_key: String,
}

impl SerperBackend {
    /// Create a backend; fails if the credential is empty
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_url(DEFAULT_SERPER_URL, api_key)
    }

    pub fn with_url(url: &str, api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            bail!("Serper API key is empty");
        }

        let client = Client::builder()
            .user_agent("citycrew/0.1")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

// Serper API response types
#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, Deserialize)]
struct SerperResult {
    title: String,
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}

impl SerperResponse {
    fn into_results(self, query: &str, limit: usize) -> SearchResults {
        let results = self
            .organic
            .into_iter()
            .take(limit)
            .map(|r| SearchResult {
                title: r.title,
                url: r.link,
                description: r.snippet.unwrap_or_default(),
            })
            .collect();

        SearchResults {
            query: query.to_string(),
            results,
            backend: "serper".to_string(),
        }
    }
}

#[async_trait]
impl SearchBackend for SerperBackend {
    fn name(&self) -> &str {
        "serper"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults> {
        let response = self
            .client
            .post(&self.url)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest { q: query, num: limit })
            .send()
            .await
            .context("Failed to send HTTP request to Serper")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Serper error {}: {}", status, text));
        }

        let serper_response: SerperResponse = response
            .json()
            .await
            .context("Failed to parse Serper response")?;

        Ok(serper_response.into_results(query, limit))
    }
}
