//! Verify E2E test prerequisites before running tests

use citycrew_agent::{Credentials, LlmSettings};

/// Gemini settings, honouring GEMINI_BASE_URL and GEMINI_MODEL
pub fn settings() -> LlmSettings {
    LlmSettings {
        base_url: std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| LlmSettings::default_base_url()),
        model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| LlmSettings::default_model()),
    }
}

/// Load both API keys, panicking with a readable message when missing
pub fn credentials() -> Credentials {
    match Credentials::load() {
        Ok(credentials) => credentials,
        Err(e) => panic!("Credentials not available: {}", e),
    }
}

#[test]
#[ignore = "prerequisites check - run first"]
fn test_prerequisites() {
    println!("\n=== E2E Prerequisites Check ===\n");

    let result = Credentials::load();
    println!(
        "API keys: {}",
        if result.is_ok() { "✓ Found" } else { "✗ Missing" }
    );
    println!("Model: {}", settings().model);
    println!();

    assert!(
        result.is_ok(),
        "Set GEMINI_API_KEY and SERPER_API_KEY in the environment or a .env file"
    );
}
