//! Conversation manager: lazy per-user contexts with bounded lifetime

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;
use xeno_voice_core::{Emotion, Language};

use crate::context::{ConversationContext, Message, MessageRole};

/// Keywords that populate the `date` entity
const DATE_KEYWORDS: &[&str] = &["today", "tomorrow", "yesterday", "next week", "next month"];
/// Keywords that populate the `time` entity
const TIME_KEYWORDS: &[&str] = &["morning", "afternoon", "evening", "night", "noon"];
/// Overlap below this ratio counts as a topic change
const TOPIC_OVERLAP_THRESHOLD: f32 = 0.3;

/// First "Capitalized Capitalized" two-token pattern
static PERSON_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z][a-z]+ [A-Z][a-z]+)\b").expect("valid person regex"));

/// Manager configuration
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Messages retained per context
    pub history_cap: usize,
    /// Maximum tracked contexts (least recently used evicted beyond this)
    pub max_users: usize,
    /// Idle duration after which a context is evictable
    pub context_ttl: Duration,
    /// Language assigned to new contexts
    pub default_language: Language,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            history_cap: 10,
            max_users: 256,
            context_ttl: Duration::from_secs(3600),
            default_language: Language::default(),
        }
    }
}

struct TrackedContext {
    context: ConversationContext,
    last_access: Instant,
}

/// Tracks one [`ConversationContext`] per user
pub struct ConversationManager {
    config: ManagerConfig,
    contexts: RwLock<HashMap<String, TrackedContext>>,
}

impl ConversationManager {
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            contexts: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of a user's context, lazily creating an empty one
    pub fn context(&self, user_id: &str) -> ConversationContext {
        let mut contexts = self.contexts.write();
        self.touch(&mut contexts, user_id).context.clone()
    }

    /// Append a turn to the user's bounded history
    pub fn add_message(&self, user_id: &str, role: MessageRole, content: &str, emotion: Emotion) {
        let mut contexts = self.contexts.write();
        let tracked = self.touch(&mut contexts, user_id);
        tracked
            .context
            .push_message(Message::new(role, content, emotion));
        debug!(
            user_id,
            role = %role,
            emotion = %emotion,
            turns = tracked.context.messages.len(),
            "message added"
        );
    }

    /// Extract entities from `text`, overlaying them onto the context's
    /// accumulated entity map, and return the merged map.
    ///
    /// Within a single call, later matches overwrite earlier ones of the
    /// same kind.
    pub fn extract_entities(&self, user_id: &str, text: &str) -> HashMap<String, String> {
        let lower = text.to_lowercase();

        let mut contexts = self.contexts.write();
        let entities = &mut self.touch(&mut contexts, user_id).context.entities;

        for keyword in DATE_KEYWORDS {
            if lower.contains(keyword) {
                entities.insert("date".to_string(), keyword.to_string());
            }
        }
        for keyword in TIME_KEYWORDS {
            if lower.contains(keyword) {
                entities.insert("time".to_string(), keyword.to_string());
            }
        }
        if let Some(m) = PERSON_PATTERN.find(text) {
            entities.insert("person".to_string(), m.as_str().to_string());
        }

        entities.clone()
    }

    /// Heuristic topic drift check against the most recent turn
    ///
    /// True on the very first message; thereafter true iff the lexical
    /// overlap `|intersection| / |new words|` falls below 0.3. Wordless
    /// new text with prior history is not evidence of drift.
    pub fn detect_topic_change(&self, user_id: &str, text: &str) -> bool {
        let previous = {
            let mut contexts = self.contexts.write();
            self.touch(&mut contexts, user_id)
                .context
                .last_message()
                .map(|m| m.content.clone())
        };
        let Some(previous) = previous else {
            return true;
        };

        let new_words = word_set(text);
        if new_words.is_empty() {
            return false;
        }
        let old_words = word_set(&previous);
        let intersection = new_words.intersection(&old_words).count();
        let overlap = intersection as f32 / new_words.len() as f32;
        overlap < TOPIC_OVERLAP_THRESHOLD
    }

    /// Set the current topic label for a user
    pub fn set_topic(&self, user_id: &str, topic: impl Into<String>) {
        let mut contexts = self.contexts.write();
        self.touch(&mut contexts, user_id).context.current_topic = Some(topic.into());
    }

    /// Human-readable one-line summary of a user's context
    ///
    /// A read-only view: an unknown user gets the no-history string
    /// without a context being created or anyone's access time refreshed.
    pub fn context_summary(&self, user_id: &str) -> String {
        let contexts = self.contexts.read();
        let Some(context) = contexts.get(user_id).map(|t| &t.context) else {
            return "No conversation history".to_string();
        };
        if context.messages.is_empty() {
            return "No conversation history".to_string();
        }

        let mut parts = Vec::new();
        if let Some(topic) = &context.current_topic {
            parts.push(format!("Topic: {topic}"));
        }
        if !context.entities.is_empty() {
            let mut pairs: Vec<_> = context
                .entities
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            pairs.sort();
            parts.push(format!("Entities: {}", pairs.join(", ")));
        }
        if !context.sentiment_history.is_empty() {
            let recent: Vec<&str> = context
                .sentiment_history
                .iter()
                .rev()
                .take(3)
                .rev()
                .map(|e| e.as_str())
                .collect();
            parts.push(format!("Recent sentiment: {}", recent.join(", ")));
        }
        parts.join(" | ")
    }

    /// Drop contexts idle longer than the configured TTL
    pub fn evict_idle(&self) -> usize {
        let ttl = self.config.context_ttl;
        let mut contexts = self.contexts.write();
        let before = contexts.len();
        contexts.retain(|_, tracked| tracked.last_access.elapsed() < ttl);
        before - contexts.len()
    }

    /// Number of tracked contexts
    pub fn tracked_users(&self) -> usize {
        self.contexts.read().len()
    }

    /// Refresh a user's access time, creating the context if absent and
    /// evicting the least recently used context beyond the cap.
    fn touch<'a>(
        &self,
        contexts: &'a mut HashMap<String, TrackedContext>,
        user_id: &str,
    ) -> &'a mut TrackedContext {
        if !contexts.contains_key(user_id) && contexts.len() >= self.config.max_users {
            if let Some(oldest) = contexts
                .iter()
                .min_by_key(|(_, t)| t.last_access)
                .map(|(id, _)| id.clone())
            {
                debug!(user_id = %oldest, "evicting least recently used context");
                contexts.remove(&oldest);
            }
        }

        let config = &self.config;
        let tracked = contexts.entry(user_id.to_string()).or_insert_with(|| TrackedContext {
            context: ConversationContext::new(
                user_id,
                config.default_language,
                config.history_cap,
            ),
            last_access: Instant::now(),
        });
        tracked.last_access = Instant::now();
        tracked
    }
}

impl Default for ConversationManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

/// Lower-cased word set for overlap comparison
fn word_set(text: &str) -> HashSet<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_creation() {
        let manager = ConversationManager::default();
        assert_eq!(manager.tracked_users(), 0);
        let ctx = manager.context("alice");
        assert_eq!(ctx.user_id, "alice");
        assert!(ctx.messages.is_empty());
        assert_eq!(manager.tracked_users(), 1);
    }

    #[test]
    fn test_history_cap_fifo() {
        let manager = ConversationManager::default();
        for i in 0..15 {
            manager.add_message(
                "alice",
                MessageRole::User,
                &format!("message {i}"),
                Emotion::Neutral,
            );
        }
        let ctx = manager.context("alice");
        assert_eq!(ctx.messages.len(), 10);
        assert_eq!(ctx.messages.front().unwrap().content, "message 5");
    }

    #[test]
    fn test_extract_entities_accumulates() {
        let manager = ConversationManager::default();
        let first = manager.extract_entities("alice", "remind me tomorrow morning");
        assert_eq!(first.get("date").map(String::as_str), Some("tomorrow"));
        assert_eq!(first.get("time").map(String::as_str), Some("morning"));

        // Date persists from the earlier turn; person is added.
        let second = manager.extract_entities("alice", "call John Smith");
        assert_eq!(second.get("date").map(String::as_str), Some("tomorrow"));
        assert_eq!(second.get("person").map(String::as_str), Some("John Smith"));
    }

    #[test]
    fn test_extract_entities_overwrite_same_kind() {
        let manager = ConversationManager::default();
        manager.extract_entities("alice", "maybe today");
        let merged = manager.extract_entities("alice", "actually next week");
        assert_eq!(merged.get("date").map(String::as_str), Some("next week"));
    }

    #[test]
    fn test_topic_change_first_message() {
        let manager = ConversationManager::default();
        assert!(manager.detect_topic_change("alice", "turn on the lights"));
    }

    #[test]
    fn test_topic_change_low_overlap() {
        let manager = ConversationManager::default();
        manager.add_message(
            "alice",
            MessageRole::User,
            "turn on the kitchen lights",
            Emotion::Neutral,
        );
        assert!(manager.detect_topic_change("alice", "what is the weather forecast"));
        assert!(!manager.detect_topic_change("alice", "turn off the kitchen lights"));
    }

    #[test]
    fn test_topic_change_wordless_text() {
        let manager = ConversationManager::default();
        manager.add_message("alice", MessageRole::User, "hello there", Emotion::Neutral);
        assert!(!manager.detect_topic_change("alice", "!!"));
    }

    #[test]
    fn test_summary_empty() {
        let manager = ConversationManager::default();
        assert_eq!(manager.context_summary("alice"), "No conversation history");
    }

    #[test]
    fn test_summary_sections() {
        let manager = ConversationManager::default();
        manager.add_message("alice", MessageRole::User, "see you tomorrow", Emotion::Happy);
        manager.extract_entities("alice", "see you tomorrow");
        manager.set_topic("alice", "scheduling");

        let summary = manager.context_summary("alice");
        assert!(summary.contains("Topic: scheduling"));
        assert!(summary.contains("Entities: date=tomorrow"));
        assert!(summary.contains("Recent sentiment: happy"));
        assert!(summary.contains(" | "));
    }

    #[test]
    fn test_summary_unknown_user_creates_nothing() {
        let manager = ConversationManager::new(ManagerConfig {
            max_users: 1,
            ..Default::default()
        });
        manager.add_message("a", MessageRole::User, "hi", Emotion::Neutral);

        // A summary lookup must not allocate a context or evict "a".
        assert_eq!(manager.context_summary("ghost"), "No conversation history");
        assert_eq!(manager.tracked_users(), 1);
        assert_eq!(manager.context("a").messages.len(), 1);
    }

    #[test]
    fn test_lru_eviction() {
        let manager = ConversationManager::new(ManagerConfig {
            max_users: 2,
            ..Default::default()
        });
        manager.add_message("a", MessageRole::User, "hi", Emotion::Neutral);
        manager.add_message("b", MessageRole::User, "hi", Emotion::Neutral);
        // "a" is now least recently used and gets evicted for "c".
        manager.add_message("c", MessageRole::User, "hi", Emotion::Neutral);

        assert_eq!(manager.tracked_users(), 2);
        assert!(manager.context("a").messages.is_empty());
    }

    #[test]
    fn test_evict_idle() {
        let manager = ConversationManager::new(ManagerConfig {
            context_ttl: Duration::from_secs(0),
            ..Default::default()
        });
        manager.add_message("a", MessageRole::User, "hi", Emotion::Neutral);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(manager.evict_idle(), 1);
        assert_eq!(manager.tracked_users(), 0);
    }
}
