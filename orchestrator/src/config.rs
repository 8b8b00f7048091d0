//! Agent and task definitions loaded from YAML or TOML documents
//!
//! Agents document:
//!
//! ```yaml
//! agents:
//!   - name: famous_agent
//!     role: Travel Researcher
//!     goal: Find what a city is famous for
//!     backstory: You have visited every corner of India.
//!     verbose: true
//!     tools: [search]
//! ```
//!
//! Tasks document:
//!
//! ```yaml
//! tasks:
//!   - description: Find two famous things about {{city}}.
//!     expected_output: Two famous things, one per line.
//!     agent: famous_agent
//! ```

use std::path::Path;

use citycrew_agent::Credentials;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::template;

/// Definition of one agent persona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique identifier, referenced by tasks
    pub name: String,

    pub role: String,

    pub goal: String,

    pub backstory: String,

    /// Print per-call timing to stderr
    #[serde(default)]
    pub verbose: bool,

    /// Tool capabilities to attach (e.g. "search")
    #[serde(default)]
    pub tools: Vec<String>,

    /// Override the default model for this agent
    #[serde(default)]
    pub model: Option<String>,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Definition of one task, with an unresolved description template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Optional label, for logs only
    #[serde(default)]
    pub name: Option<String>,

    /// Description template (may contain `{{city}}` and `{{famous_things}}`)
    pub description: String,

    pub expected_output: String,

    /// Name of the assigned agent
    pub agent: String,
}

/// A task whose description has been substituted, ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTask {
    pub description: String,
    pub expected_output: String,
    pub agent: String,
}

impl TaskSpec {
    /// Produce a resolved copy; the template itself is left untouched
    pub fn resolve(&self, city: Option<&str>, famous_things: Option<&str>) -> ResolvedTask {
        ResolvedTask {
            description: template::substitute(&self.description, city, famous_things),
            expected_output: self.expected_output.clone(),
            agent: self.agent.clone(),
        }
    }

    /// Label used in logs
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.agent)
    }
}

#[derive(Debug, Deserialize)]
struct AgentsDocument {
    agents: Vec<AgentSpec>,
}

#[derive(Debug, Deserialize)]
struct TasksDocument {
    tasks: Vec<TaskSpec>,
}

/// Supported document syntaxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// `.toml` files are TOML, everything else is YAML
    pub fn from_path(path: &Path) -> Self {
        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::Toml
        } else {
            Self::Yaml
        }
    }

    fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, WorkflowError> {
    tracing::debug!("Loading {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| WorkflowError::io(path, e))?;
    DocumentFormat::from_path(path)
        .parse(&content)
        .map_err(|message| WorkflowError::parse(path, message))
}

/// Parse an agents document from a string
pub fn parse_agents(content: &str, format: DocumentFormat) -> Result<Vec<AgentSpec>, String> {
    format.parse::<AgentsDocument>(content).map(|doc| doc.agents)
}

/// Parse a tasks document from a string
pub fn parse_tasks(content: &str, format: DocumentFormat) -> Result<Vec<TaskSpec>, String> {
    format.parse::<TasksDocument>(content).map(|doc| doc.tasks)
}

/// Load agent definitions. Reads the file on every call.
pub fn load_agents(path: &Path) -> Result<Vec<AgentSpec>, WorkflowError> {
    let doc: AgentsDocument = load_document(path)?;
    Ok(doc.agents)
}

/// Load task definitions. Reads the file on every call.
pub fn load_tasks(path: &Path) -> Result<Vec<TaskSpec>, WorkflowError> {
    let doc: TasksDocument = load_document(path)?;
    Ok(doc.tasks)
}

/// Load both API keys from the environment or `.env`.
/// A missing or blank key is a configuration error.
pub fn load_credentials() -> Result<Credentials, WorkflowError> {
    Credentials::load().map_err(WorkflowError::credentials)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const AGENTS_YAML: &str = r#"
agents:
  - name: city_agent
    role: City Picker
    goal: Pick a city
    backstory: Knows India well.
  - name: famous_agent
    role: Researcher
    goal: Find famous things
    backstory: Loves landmarks.
    verbose: true
    tools: [search]
    temperature: 0.3
"#;

    #[test]
    fn test_parse_agents_yaml() {
        let agents = parse_agents(AGENTS_YAML, DocumentFormat::Yaml).unwrap();

        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].name, "city_agent");
        assert!(!agents[0].verbose);
        assert!(agents[0].tools.is_empty());
        assert!(agents[1].verbose);
        assert_eq!(agents[1].tools, vec!["search"]);
        assert_eq!(agents[1].temperature, Some(0.3));
    }

    #[test]
    fn test_parse_tasks_toml() {
        let toml = r#"
            [[tasks]]
            name = "famous"
            description = "Find two famous things about {{city}}."
            expected_output = "Two things"
            agent = "famous_agent"
        "#;

        let tasks = parse_tasks(toml, DocumentFormat::Toml).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].label(), "famous");
        assert_eq!(tasks[0].agent, "famous_agent");
    }

    #[test]
    fn test_missing_required_key() {
        let yaml = r#"
agents:
  - name: city_agent
    role: City Picker
    backstory: No goal given.
"#;
        let err = parse_agents(yaml, DocumentFormat::Yaml).unwrap_err();
        assert!(err.contains("goal"));

        let yaml = "tasks:\n  - description: d\n    agent: a\n";
        let err = parse_tasks(yaml, DocumentFormat::Yaml).unwrap_err();
        assert!(err.contains("expected_output"));
    }

    #[test]
    fn test_missing_top_level_list() {
        assert!(parse_agents("tasks: []", DocumentFormat::Yaml).is_err());
    }

    #[test]
    fn test_resolve_leaves_template_untouched() {
        let spec = TaskSpec {
            name: None,
            description: "Explain {{famous_things}} in {{city}}".to_string(),
            expected_output: "Text".to_string(),
            agent: "explanation_agent".to_string(),
        };

        let resolved = spec.resolve(Some("Jaipur"), Some("Hawa Mahal"));

        assert_eq!(resolved.description, "Explain Hawa Mahal in Jaipur");
        assert_eq!(resolved.agent, "explanation_agent");
        assert_eq!(spec.description, "Explain {{famous_things}} in {{city}}");
        assert_eq!(spec.label(), "explanation_agent");
    }

    #[test]
    fn test_load_from_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.yaml");
        std::fs::write(&path, AGENTS_YAML).unwrap();

        let first = load_agents(&path).unwrap();
        let second = load_agents(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(load_tasks(&missing), Err(WorkflowError::Io { .. })));

        let malformed = dir.path().join("tasks.yaml");
        std::fs::write(&malformed, "tasks: [unclosed").unwrap();
        assert!(matches!(load_tasks(&malformed), Err(WorkflowError::Parse { .. })));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a/tasks.toml")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("a/tasks.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a/tasks.yml")), DocumentFormat::Yaml);
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let mut dotenv = HashMap::new();
        dotenv.insert("SERPER_API_KEY".to_string(), "search-key".to_string());

        let err = Credentials::resolve(|_| None, &dotenv)
            .map_err(WorkflowError::credentials)
            .unwrap_err();

        assert!(matches!(&err, WorkflowError::Config(msg) if msg.contains("GEMINI_API_KEY")));
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
