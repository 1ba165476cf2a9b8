//! Shared types for baykat-core

use serde::{Deserialize, Serialize};

/// Response language. Wire codes are lowercase ISO-639-1 (`fr`, `en`, `wo`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
    Wo,
}

impl Language {
    /// Parse a language code, tolerating case. Unknown codes fall back to French.
    pub fn from_code(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "en" => Self::En,
            "wo" => Self::Wo,
            _ => Self::Fr,
        }
    }

    /// Human-readable label used in prompts (e.g. `[Langue: Wolof]`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fr => "Français",
            Self::En => "English",
            Self::Wo => "Wolof",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fr => write!(f, "fr"),
            Self::En => write!(f, "en"),
            Self::Wo => write!(f, "wo"),
        }
    }
}

/// Routing topic. Each topic is served by exactly one specialist agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Weather,
    Agro,
    Market,
}

impl Topic {
    /// Fixed iteration order. Routing and `agents_used` listings follow this
    /// order so identical inputs always produce identical output.
    pub const ALL: [Topic; 3] = [Topic::Weather, Topic::Agro, Topic::Market];

    pub fn agent_name(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Agro => "agro",
            Self::Market => "market",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.agent_name())
    }
}

/// Transport the request arrived on. Affects prompt verbosity and reply length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Web,
    Sms,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Web => write!(f, "web"),
            Self::Sms => write!(f, "sms"),
        }
    }
}

/// An inbound question plus optional hints. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub channel: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            city: None,
            language: None,
            session_id: None,
            channel: Channel::Web,
            user_id: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Per-request context handed to each routed agent.
#[derive(Debug, Clone)]
pub struct AgentContext {
    pub city: Option<String>,
    /// Language directive the agent should answer in. Already resolved:
    /// requests without an explicit language get an English directive and the
    /// detector runs on the final text afterwards.
    pub language: Language,
    pub channel: Channel,
}

/// One agent's answer. Lives only for the duration of the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent: Topic,
    pub response: String,
    pub language: Language,
}

/// Request-scoped metadata echoed back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub channel: Channel,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Final answer shape. Every orchestration path produces this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub response: String,
    pub language: Language,
    pub agents_used: Vec<String>,
    pub metadata: Metadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes_roundtrip() {
        assert_eq!(Language::from_code("fr"), Language::Fr);
        assert_eq!(Language::from_code("EN"), Language::En);
        assert_eq!(Language::from_code("wo"), Language::Wo);
        assert_eq!(Language::from_code("zh"), Language::Fr);
        assert_eq!(Language::Wo.to_string(), "wo");
    }

    #[test]
    fn test_topic_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Topic::Weather).unwrap(), "\"weather\"");
        assert_eq!(serde_json::to_string(&Topic::Market).unwrap(), "\"market\"");
    }

    #[test]
    fn test_request_defaults_to_web_channel() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "salut"}"#).unwrap();
        assert_eq!(req.channel, Channel::Web);
        assert!(req.language.is_none());
    }
}
