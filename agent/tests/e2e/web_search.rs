//! E2E test: Serper web search, directly and as an agent tool

use std::sync::Arc;

use citycrew_agent::{
    Agent, GeminiClient, Persona, SearchBackend, SearchTool, SerperBackend, TaskRequest, TaskRunner,
};

use crate::prerequisites::{credentials, settings};

#[tokio::test]
#[ignore = "requires SERPER_API_KEY and network"]
async fn test_serper_returns_results() {
    let backend = SerperBackend::new(&credentials().search_api_key).expect("Failed to build backend");

    let results = backend
        .search("famous landmarks in Jaipur", 3)
        .await
        .expect("Search failed");

    println!("{}", results.to_text());
    assert_eq!(results.backend, "serper");
    assert!(!results.results.is_empty());
    assert!(results.results.len() <= 3);
}

#[tokio::test]
#[ignore = "requires GEMINI_API_KEY, SERPER_API_KEY and network"]
async fn test_agent_with_search_tool() {
    let settings = settings();
    let credentials = credentials();
    let llm = GeminiClient::new(&settings.base_url, &credentials.model_api_key, &settings.model)
        .expect("Failed to build Gemini client");
    let backend =
        SerperBackend::new(&credentials.search_api_key).expect("Failed to build backend");

    let agent = Agent::new(
        Persona::new(
            "Travel Researcher",
            "Find what a city is famous for",
            "You check facts with web search before answering.",
        ),
        Arc::new(llm),
    )
    .with_tool(Arc::new(SearchTool::new(Arc::new(backend))));

    assert_eq!(agent.tool_names(), ["web_search"]);

    let task = TaskRequest::new(
        "Find the two things Jaipur is most famous for. Use web search.",
        "Two famous things, one per line.",
    );
    let output = agent.run(&task).await.expect("Agent run failed");
    println!("{}", output);

    assert!(!output.trim().is_empty());
}
