//! Outbound chat-transport pipeline: address resolution, reply quoting,
//! body templating and dispatch.
//!
//! The transport client itself, the registry of connected accounts and the
//! raw message store are collaborators expressed as traits so that the
//! dispatch logic can be exercised without a live connection.

pub mod dispatch;
pub mod format;
pub mod jid;
pub mod quote;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{RelayError, TransportFailure};

pub use dispatch::{MessageDispatcher, SendDocumentRequest, SendTextRequest};
pub use format::format_body;
pub use jid::{AddressSource, ResolvedAddress, normalize_jid, resolve};
pub use quote::{QuoteContext, QuotedMessage, QuotedReference, StoredMessage, build_quote};

/// Forwarding metadata attached to first-attempt text sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInfo {
    pub forwarding_score: u32,
    pub is_forwarded: bool,
}

impl Default for ContextInfo {
    fn default() -> Self {
        Self {
            forwarding_score: 0,
            is_forwarded: false,
        }
    }
}

/// Where a document's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Url(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundPayload {
    Text {
        text: String,
        context_info: Option<ContextInfo>,
    },
    Document {
        source: DocumentSource,
        file_name: String,
        mimetype: String,
        caption: String,
    },
}

impl OutboundPayload {
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            OutboundPayload::Text { text, .. } => Some(text),
            OutboundPayload::Document { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendOptions {
    pub quoted: Option<QuoteContext>,
}

impl SendOptions {
    #[must_use]
    pub fn quoting(quoted: Option<QuoteContext>) -> Self {
        Self { quoted }
    }
}

/// Handle returned by the transport for a sent message, passed back to callers unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentMessage {
    pub id: String,
    pub remote_jid: String,
    #[serde(default)]
    pub raw: Value,
}

/// A connected chat-transport session.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_message(
        &self,
        jid: &str,
        payload: OutboundPayload,
        options: SendOptions,
    ) -> Result<SentMessage, TransportFailure>;
}

/// Looks up the live transport session for a configured account.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    async fn session(&self, account_id: u64) -> Result<Arc<dyn Transport>, RelayError>;
}

/// Stored transport messages, keyed by the identifier the ticket layer uses.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Returns the raw JSON blob (`{ key, message }`) recorded for the message, if any.
    async fn find_raw(&self, id: &str) -> Result<Option<String>, RelayError>;
}
