use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chat entry appended after a successful generate/refine round trip.
pub const ACK_MESSAGE: &str = "I've updated the YAML based on your request.";
/// Chat entry appended when a request fails for any reason.
pub const FAILURE_MESSAGE: &str = "Sorry, I encountered an error processing your request.";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub origin: Origin,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::User,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::System,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Generate,
    Refine,
}

impl Mode {
    /// Path of the service endpoint handling this mode.
    pub fn path(self) -> &'static str {
        match self {
            Mode::Generate => "/api/generate-yaml",
            Mode::Refine => "/api/refine-yaml",
        }
    }
}

/// Body sent to the YAML service. `current_yaml` is only present in refine mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_yaml: Option<String>,
}

impl ServiceRequest {
    pub fn generate(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            current_yaml: None,
        }
    }

    pub fn refine(text: impl Into<String>, current_yaml: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            current_yaml: Some(current_yaml.into()),
        }
    }

    pub fn mode(&self) -> Mode {
        if self.current_yaml.is_some() {
            Mode::Refine
        } else {
            Mode::Generate
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YamlResponse {
    pub yaml: String,
    pub validation: ValidationResult,
    // Only returned by the generate endpoint; informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_requirements: Option<serde_json::Value>,
}

/// Final state printed by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub yaml: String,
    pub validation: ValidationResult,
    pub transcript: Vec<Message>,
}
