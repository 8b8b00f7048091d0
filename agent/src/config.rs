//! Configuration loading
//!
//! Credentials come from the process environment first, then from a `.env`
//! file found by walking up from the current directory (or the global
//! `~/.config/citycrew/.env`). Environment values always win.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable holding the model API key
pub const MODEL_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable holding the search API key
pub const SEARCH_API_KEY_VAR: &str = "SERPER_API_KEY";

/// Find a config file by walking up the directory tree, then checking global config.
///
/// Search order:
/// 1. Current directory and parent directories (walking up to root)
/// 2. Global config at ~/.config/citycrew/
pub fn find_config_file(filename: &str) -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("citycrew").join(filename);
        if global_path.exists() {
            return Some(global_path);
        }
    }

    None
}

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments.
/// Surrounding single or double quotes are stripped from values.
pub fn parse_dotenv(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let mut value = value.trim();
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }

        vars.insert(key.trim().to_string(), value.to_string());
    }

    vars
}

/// Load a `.env` file from a specific path
pub fn load_dotenv_from_path(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_dotenv(&content))
}

/// The two credentials required at startup
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub model_api_key: String,
    pub search_api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("model_api_key", &"<redacted>")
            .field("search_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Load credentials from the environment, falling back to `.env`
    pub fn load() -> Result<Self> {
        let dotenv = match find_config_file(".env") {
            Some(path) => {
                tracing::debug!("Loading .env from: {}", path.display());
                load_dotenv_from_path(&path)?
            }
            None => {
                tracing::debug!("No .env found");
                HashMap::new()
            }
        };

        Self::resolve(|key| std::env::var(key).ok(), &dotenv)
    }

    /// Resolve both keys from an environment lookup and parsed `.env` values.
    /// Missing or blank values are an error.
    pub fn resolve(
        env: impl Fn(&str) -> Option<String>,
        dotenv: &HashMap<String, String>,
    ) -> Result<Self> {
        let lookup = |key: &str| -> Result<String> {
            let value = env(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| dotenv.get(key).filter(|v| !v.trim().is_empty()).cloned());

            match value {
                Some(v) => Ok(v.trim().to_string()),
                None => bail!("{} is not set (environment or .env)", key),
            }
        };

        Ok(Self {
            model_api_key: lookup(MODEL_API_KEY_VAR)?,
            search_api_key: lookup(SEARCH_API_KEY_VAR)?,
        })
    }
}

/// LLM endpoint settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
}

impl LlmSettings {
    pub fn default_base_url() -> String {
        "https://generativelanguage.googleapis.com/v1beta".to_string()
    }

    pub fn default_model() -> String {
        "gemini-2.0-flash".to_string()
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            model: Self::default_model(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv() {
        let vars = parse_dotenv(
            r#"
            # secrets
            GEMINI_API_KEY="abc123"
            export SERPER_API_KEY='xyz'
            EMPTY=
            not a pair
            "#,
        );

        assert_eq!(vars["GEMINI_API_KEY"], "abc123");
        assert_eq!(vars["SERPER_API_KEY"], "xyz");
        assert_eq!(vars["EMPTY"], "");
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn test_environment_wins_over_dotenv() {
        let mut dotenv = HashMap::new();
        dotenv.insert(MODEL_API_KEY_VAR.to_string(), "from-file".to_string());
        dotenv.insert(SEARCH_API_KEY_VAR.to_string(), "search-file".to_string());

        let creds = Credentials::resolve(
            |key| (key == MODEL_API_KEY_VAR).then(|| "from-env".to_string()),
            &dotenv,
        )
        .unwrap();

        assert_eq!(creds.model_api_key, "from-env");
        assert_eq!(creds.search_api_key, "search-file");
    }

    #[test]
    fn test_missing_key_is_error() {
        let mut dotenv = HashMap::new();
        dotenv.insert(MODEL_API_KEY_VAR.to_string(), "key".to_string());
        dotenv.insert(SEARCH_API_KEY_VAR.to_string(), "   ".to_string());

        let err = Credentials::resolve(|_| None, &dotenv).unwrap_err();
        assert!(err.to_string().contains(SEARCH_API_KEY_VAR));
    }

    #[test]
    fn test_load_dotenv_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "GEMINI_API_KEY=k1\nSERPER_API_KEY=k2\n").unwrap();

        let vars = load_dotenv_from_path(&path).unwrap();
        let creds = Credentials::resolve(|_| None, &vars).unwrap();

        assert_eq!(creds.model_api_key, "k1");
        assert_eq!(creds.search_api_key, "k2");
    }

    #[test]
    fn test_debug_redacts_keys() {
        let creds = Credentials {
            model_api_key: "secret-a".to_string(),
            search_api_key: "secret-b".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret"));
    }
}
