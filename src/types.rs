use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend persona a message is routed to. `Default` answers anything that
/// is not claimed by a slash command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    #[default]
    Default,
    Code,
    Search,
    Explain,
    Help,
}

impl AgentId {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Default => "default",
            AgentId::Code => "code",
            AgentId::Search => "search",
            AgentId::Explain => "explain",
            AgentId::Help => "help",
        }
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversation log.
///
/// `id` is the only legal key for in-place updates; everything on a user
/// message is frozen at creation, and an assistant message is mutable only
/// while `streaming` is true.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub streaming: bool,
    pub agent: Option<AgentId>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, agent: AgentId) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
            streaming: false,
            agent: Some(agent),
        }
    }

    /// Empty assistant entry that the event stream fills in token by token.
    pub fn assistant_placeholder(agent: AgentId) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: String::new(),
            created_at: Utc::now(),
            streaming: true,
            agent: Some(agent),
        }
    }
}

/// Role/content pair as the backend expects prior turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Body of the streaming chat request, one per turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<HistoryEntry>,
    pub agent: AgentId,
}

/// One decoded frame of the chat response stream, in arrival order. The
/// sequence for a turn is finite and not restartable; a new request
/// produces a fresh sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Token {
        text: String,
    },
    AgentSelected {
        agent: AgentId,
        name: String,
        description: String,
    },
    Done {
        processing_time_ms: u64,
    },
    Error {
        message: String,
        code: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub agents_loaded: bool,
    pub agent_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentRoster {
    pub agents: Vec<AgentInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_serializes_lowercase() {
        let value = serde_json::to_value(AgentId::Code).unwrap();
        assert_eq!(value, serde_json::json!("code"));

        let parsed: AgentId = serde_json::from_str("\"explain\"").unwrap();
        assert_eq!(parsed, AgentId::Explain);
    }

    #[test]
    fn test_chat_request_wire_shape() {
        let request = ChatRequest {
            message: "write a function".to_string(),
            history: vec![HistoryEntry {
                role: Role::User,
                content: "hi".to_string(),
            }],
            agent: AgentId::Code,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["message"], "write a function");
        assert_eq!(value["agent"], "code");
        assert_eq!(value["history"][0]["role"], "user");
        assert_eq!(value["history"][0]["content"], "hi");
    }

    #[test]
    fn test_message_constructors_assign_unique_ids() {
        let user = ChatMessage::user("hello", AgentId::Default);
        let assistant = ChatMessage::assistant_placeholder(AgentId::Default);

        assert!(!user.id.is_empty());
        assert_ne!(user.id, assistant.id);
        assert!(!user.streaming);
        assert!(assistant.streaming);
        assert!(assistant.content.is_empty());
        assert_eq!(assistant.role, Role::Assistant);
    }
}
