//! Multi-turn conversation context tracking
//!
//! One bounded context per user, created lazily on first message:
//! - FIFO-capped message and sentiment histories
//! - Accumulating entity map (date/time/person heuristics)
//! - Lexical-overlap topic drift detection
//! - LRU + idle-TTL bounding of the tracked user set

pub mod context;
pub mod manager;

pub use context::{ConversationContext, Message, MessageRole};
pub use manager::{ConversationManager, ManagerConfig};
