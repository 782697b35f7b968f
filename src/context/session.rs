#![allow(clippy::missing_errors_doc)]
//! Per-session conversational memory backed by a TTL cache.
//!
//! Each session is one JSON blob under `context:{session_id}`. Every mutation
//! reads the whole blob, modifies it and writes it back with a fresh 24-hour
//! expiry. The cache offers no compare-and-swap, so two concurrent writers on
//! the same session are not linearized here: the last write wins. Callers
//! needing strict per-session ordering must serialize their calls.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::cache::CacheStore;
use crate::core::models::{ChatMessage, SessionContext};
use crate::errors::RelayError;

/// Maximum number of turns kept in `conversation_history`.
pub const MAX_HISTORY_MESSAGES: usize = 20;

/// Entry lifetime, refreshed on every write.
pub const CONTEXT_TTL_SECONDS: u64 = 60 * 60 * 24;

const KEY_PREFIX: &str = "context:";

/// Prefix of the synthetic system turn carrying a stored summary.
pub const SUMMARY_PREFIX: &str = "Previous conversation summary: ";

#[must_use]
pub fn context_key(session_id: &str) -> String {
    format!("{KEY_PREFIX}{session_id}")
}

/// Keep only the newest `cap` turns, preserving chronological order.
pub fn trim_history(history: &mut Vec<ChatMessage>, cap: usize) {
    if history.len() > cap {
        let overflow = history.len() - cap;
        history.drain(..overflow);
    }
}

pub struct SessionContextManager {
    cache: Arc<dyn CacheStore>,
    max_messages: usize,
}

impl SessionContextManager {
    #[must_use]
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self {
            cache,
            max_messages: MAX_HISTORY_MESSAGES,
        }
    }

    #[must_use]
    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Load the session context, or a fresh empty one when absent.
    ///
    /// Never fails: an unreachable cache or a corrupt blob is logged and
    /// treated as a miss.
    pub async fn get_context(&self, session_id: &str) -> SessionContext {
        let key = context_key(session_id);
        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<SessionContext>(&raw) {
                Ok(context) => context,
                Err(e) => {
                    warn!("Discarding unreadable context for {}: {}", session_id, e);
                    SessionContext::empty()
                }
            },
            Ok(None) => {
                debug!("No cached context for {}, starting empty", session_id);
                SessionContext::empty()
            }
            Err(e) => {
                warn!("Failed to read context for {}: {}", session_id, e);
                SessionContext::empty()
            }
        }
    }

    /// Persist the whole context, overwriting any previous value.
    pub async fn save_context(
        &self,
        session_id: &str,
        context: &SessionContext,
    ) -> Result<(), RelayError> {
        let raw = serde_json::to_string(context)?;
        self.cache
            .set(&context_key(session_id), raw, CONTEXT_TTL_SECONDS)
            .await
    }

    /// Append a turn, trimming the window to the newest entries.
    ///
    /// A missing timestamp defaults to now; `ticket_id` only ever sets the
    /// back-reference, it never clears an existing one.
    pub async fn add_message(
        &self,
        session_id: &str,
        message: ChatMessage,
        ticket_id: Option<u64>,
    ) -> Result<SessionContext, RelayError> {
        let mut context = self.get_context(session_id).await;
        let now = Utc::now();

        context.conversation_history.push(ChatMessage {
            timestamp: Some(message.timestamp.unwrap_or(now)),
            ..message
        });
        context.last_interaction = now;
        if let Some(ticket_id) = ticket_id {
            context.ticket_id = Some(ticket_id);
        }
        trim_history(&mut context.conversation_history, self.max_messages);

        self.save_context(session_id, &context).await?;
        Ok(context)
    }

    /// History for downstream consumers, led by the stored summary if any.
    pub async fn get_conversation_history(&self, session_id: &str) -> Vec<ChatMessage> {
        let context = self.get_context(session_id).await;
        match context.summary {
            Some(summary) => {
                let mut history = Vec::with_capacity(context.conversation_history.len() + 1);
                history.push(ChatMessage::system(format!("{SUMMARY_PREFIX}{summary}")));
                history.extend(context.conversation_history);
                history
            }
            None => context.conversation_history,
        }
    }

    pub async fn set_summary(&self, session_id: &str, summary: &str) -> Result<(), RelayError> {
        let mut context = self.get_context(session_id).await;
        context.summary = Some(summary.to_string());
        self.save_context(session_id, &context).await
    }

    pub async fn set_current_queue(
        &self,
        session_id: &str,
        queue_name: &str,
    ) -> Result<(), RelayError> {
        let mut context = self.get_context(session_id).await;
        context.current_queue = Some(queue_name.to_string());
        self.save_context(session_id, &context).await
    }

    pub async fn get_current_queue(&self, session_id: &str) -> Option<String> {
        self.get_context(session_id).await.current_queue
    }

    /// Add a tag; a tag already present leaves the context untouched.
    pub async fn add_tag(&self, session_id: &str, tag: &str) -> Result<(), RelayError> {
        let mut context = self.get_context(session_id).await;
        if context.tags.iter().any(|t| t == tag) {
            return Ok(());
        }
        context.tags.push(tag.to_string());
        self.save_context(session_id, &context).await
    }

    /// Remove a tag; an absent tag leaves the context untouched.
    pub async fn remove_tag(&self, session_id: &str, tag: &str) -> Result<(), RelayError> {
        let mut context = self.get_context(session_id).await;
        let before = context.tags.len();
        context.tags.retain(|t| t != tag);
        if context.tags.len() == before {
            return Ok(());
        }
        self.save_context(session_id, &context).await
    }

    pub async fn get_tags(&self, session_id: &str) -> Vec<String> {
        self.get_context(session_id).await.tags
    }

    pub async fn clear_context(&self, session_id: &str) -> Result<(), RelayError> {
        self.cache.del(&context_key(session_id)).await
    }

    /// Number of turns currently held for the session.
    pub async fn get_context_size(&self, session_id: &str) -> usize {
        self.get_context(session_id).await.conversation_history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_history_keeps_newest_in_order() {
        let mut history: Vec<ChatMessage> =
            (0..5).map(|i| ChatMessage::user(format!("m{i}"))).collect();
        trim_history(&mut history, 3);
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn test_trim_history_under_cap_is_noop() {
        let mut history = vec![ChatMessage::user("only")];
        trim_history(&mut history, 3);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_context_key() {
        assert_eq!(context_key("ticket-42"), "context:ticket-42");
    }
}
