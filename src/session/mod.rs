// --- VOICE SESSION GLUE ---
// Thin capability layer over the external conversational-AI provider.
// Everything substantive (turn-taking, speech recognition, responses)
// happens on the provider side; this module only moves frames.

pub mod tools;
mod ws;

pub use tools::ToolRegistry;
pub use ws::WsSession;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnecting => "disconnecting",
            ConnectionStatus::Disconnected => "disconnected",
        }
    }
}

/// One conversational turn as delivered to the transcript.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    /// "user" or "ai", straight from the provider's source field.
    pub sender: String,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, sender: impl Into<String>) -> Self {
        // Clock granularity can be coarse; the counter keeps ids unique
        // for turns landing inside the same tick
        static SEQ: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
        let seq = SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self {
            id: format!("{:x}-{:x}", nanos, seq),
            text: text.into(),
            sender: sender.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub api_host: String,
    pub agent_id: String,
    /// Forwarded to the agent as a dynamic variable.
    pub platform: String,
}

/// Session lifecycle as the GUI sees it. The shell owns one implementation
/// at a time and polls `status` every frame.
pub trait VoiceSession {
    fn start(&self) -> anyhow::Result<()>;
    fn stop(&self) -> anyhow::Result<()>;
    fn status(&self) -> ConnectionStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_get_distinct_ids_and_rfc3339_timestamps() {
        let a = ChatMessage::new("hello", "user");
        let b = ChatMessage::new("hi", "ai");
        assert_ne!(a.id, b.id);
        assert!(chrono::DateTime::parse_from_rfc3339(&a.timestamp).is_ok());
        assert_eq!(b.sender, "ai");
    }

    #[test]
    fn ids_stay_unique_under_a_burst_of_turns() {
        let ids: std::collections::HashSet<String> = (0..256)
            .map(|_| ChatMessage::new("turn", "user").id)
            .collect();
        assert_eq!(ids.len(), 256);
    }
}
