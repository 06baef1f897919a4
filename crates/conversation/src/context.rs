//! Conversation context and message types

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xeno_voice_core::{Emotion, Language};

/// Role in a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub emotion: Emotion,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>, emotion: Emotion) -> Self {
        Self {
            role,
            content: content.into(),
            emotion,
            timestamp: Utc::now(),
        }
    }
}

/// Per-user dialogue state
///
/// Message and sentiment histories are FIFO-bounded at the configured cap;
/// entities accumulate across turns until overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    pub user_id: String,
    pub messages: VecDeque<Message>,
    pub current_topic: Option<String>,
    pub entities: HashMap<String, String>,
    pub sentiment_history: VecDeque<Emotion>,
    pub language: Language,
    pub started_at: DateTime<Utc>,
    history_cap: usize,
}

impl ConversationContext {
    pub fn new(user_id: impl Into<String>, language: Language, history_cap: usize) -> Self {
        Self {
            user_id: user_id.into(),
            messages: VecDeque::with_capacity(history_cap),
            current_topic: None,
            entities: HashMap::new(),
            sentiment_history: VecDeque::with_capacity(history_cap),
            language,
            started_at: Utc::now(),
            history_cap,
        }
    }

    /// Append a turn, evicting the oldest once the cap is reached
    pub fn push_message(&mut self, message: Message) {
        if self.messages.len() >= self.history_cap {
            self.messages.pop_front();
        }
        if self.sentiment_history.len() >= self.history_cap {
            self.sentiment_history.pop_front();
        }
        self.sentiment_history.push_back(message.emotion);
        self.messages.push_back(message);
    }

    /// Most recent turn, if any
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.back()
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap
    }
}
