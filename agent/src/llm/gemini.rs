//! Gemini LLM implementation
//!
//! Talks to the `generateContent` REST endpoint directly over HTTP.
//! See: https://ai.google.dev/api/generate-content

use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ChatReply, ChatRequest, Llm, Message, Role, ToolCall, ToolSpec};

/// Gemini client wrapper
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// `base_url` is the API root, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            bail!("Gemini API key is empty");
        }

        let client = Client::builder()
            .user_agent("citycrew/0.1")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl Llm for GeminiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        let body = GenerateContentRequest::from_chat(request);

        tracing::debug!(
            model = %self.model,
            turns = body.contents.len(),
            tools = request.tools.len(),
            "Sending Gemini request"
        );

        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send HTTP request to Gemini")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error {}: {}", status, text));
        }

        let raw_body = response.text().await.context("Failed to get response text")?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&raw_body).context("Failed to parse Gemini response")?;

        tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Gemini responded");

        parsed.into_reply()
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Gemini API wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclarations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations {
    function_declarations: Vec<ToolSpec>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

impl GenerateContentRequest {
    fn from_chat(request: &ChatRequest) -> Self {
        let system_instruction = request.system.as_ref().map(|system| Content {
            role: None,
            parts: vec![Part::text(system.clone())],
        });

        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![ToolDeclarations {
                function_declarations: request.tools.clone(),
            }]
        };

        Self {
            system_instruction,
            contents: to_contents(&request.messages),
            tools,
            generation_config: request
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        }
    }
}

/// Map conversation turns to Gemini contents
///
/// Consecutive tool results are folded into a single user turn, one
/// `functionResponse` part per result, matching the calls that produced them.
fn to_contents(messages: &[Message]) -> Vec<Content> {
    let mut contents: Vec<Content> = Vec::new();

    for message in messages {
        match message.role {
            Role::User => contents.push(Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(message.content.clone())],
            }),
            Role::Assistant => {
                let mut parts = Vec::new();
                if !message.content.is_empty() {
                    parts.push(Part::text(message.content.clone()));
                }
                for call in &message.tool_calls {
                    parts.push(Part {
                        function_call: Some(FunctionCall {
                            name: call.name.clone(),
                            args: call.arguments.clone(),
                        }),
                        ..Default::default()
                    });
                }
                contents.push(Content {
                    role: Some("model".to_string()),
                    parts,
                });
            }
            Role::Tool => {
                let part = Part {
                    function_response: Some(FunctionResponse {
                        name: message.tool_name.clone().unwrap_or_default(),
                        response: serde_json::json!({ "content": message.content }),
                    }),
                    ..Default::default()
                };

                let extends_previous = contents.last().is_some_and(|last| {
                    last.role.as_deref() == Some("user")
                        && last.parts.iter().all(|p| p.function_response.is_some())
                });

                match contents.last_mut() {
                    Some(last) if extends_previous => last.parts.push(part),
                    _ => contents.push(Content {
                        role: Some("user".to_string()),
                        parts: vec![part],
                    }),
                }
            }
        }
    }

    contents
}

impl GenerateContentResponse {
    fn into_reply(self) -> Result<ChatReply> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Gemini returned no candidates"))?;

        let Some(content) = candidate.content else {
            return Err(anyhow!(
                "Gemini candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ));
        };

        let mut reply = ChatReply::default();
        for part in content.parts {
            if let Some(text) = part.text {
                reply.content.push_str(&text);
            }
            if let Some(call) = part.function_call {
                reply.tool_calls.push(ToolCall {
                    name: call.name,
                    arguments: call.args,
                });
            }
        }

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            system: Some("You are a guide".to_string()),
            messages: vec![Message::user("Tell me about Jaipur")],
            tools: vec![ToolSpec {
                name: "web_search".to_string(),
                description: "Search the web".to_string(),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }],
            temperature: Some(0.2),
        };

        let value = serde_json::to_value(GenerateContentRequest::from_chat(&request)).unwrap();

        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "You are a guide");
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "Tell me about Jaipur");
        assert_eq!(
            value["tools"][0]["functionDeclarations"][0]["name"],
            "web_search"
        );
        assert!((value["generationConfig"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_empty_tools_omitted() {
        let request = ChatRequest {
            messages: vec![Message::user("hi")],
            ..Default::default()
        };

        let value = serde_json::to_value(GenerateContentRequest::from_chat(&request)).unwrap();

        assert!(value.get("tools").is_none());
        assert!(value.get("systemInstruction").is_none());
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn test_tool_results_grouped() {
        let call_a = ToolCall {
            name: "web_search".to_string(),
            arguments: serde_json::json!({"query": "a"}),
        };
        let call_b = ToolCall {
            name: "web_search".to_string(),
            arguments: serde_json::json!({"query": "b"}),
        };
        let messages = vec![
            Message::user("q"),
            Message::assistant("", vec![call_a, call_b]),
            Message::tool("web_search", "result a"),
            Message::tool("web_search", "result b"),
        ];

        let contents = to_contents(&messages);

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1].role.as_deref(), Some("model"));
        assert_eq!(contents[1].parts.len(), 2);
        assert_eq!(contents[2].role.as_deref(), Some("user"));
        assert_eq!(contents[2].parts.len(), 2);
        let response = contents[2].parts[1].function_response.as_ref().unwrap();
        assert_eq!(response.response["content"], "result b");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Let me search. "},
                        {"functionCall": {"name": "web_search", "args": {"query": "Jaipur"}}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#;

        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let reply = parsed.into_reply().unwrap();

        assert_eq!(reply.content, "Let me search. ");
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].arguments["query"], "Jaipur");
    }

    #[test]
    fn test_response_without_candidates_is_error() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.into_reply().is_err());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(GeminiClient::new("https://example.test", "  ", "gemini-2.0-flash").is_err());
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new("https://example.test/v1beta/", "key", "gemini-2.0-flash")
            .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
