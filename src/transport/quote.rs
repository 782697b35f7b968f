//! Reply-quoting context for outbound messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::MessageStore;

/// Prior message the outbound send should reply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotedReference {
    Id(String),
    Message(StoredMessage),
}

impl QuotedReference {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            QuotedReference::Id(id) => id,
            QuotedReference::Message(message) => &message.id,
        }
    }
}

impl From<&str> for QuotedReference {
    fn from(id: &str) -> Self {
        QuotedReference::Id(id.to_string())
    }
}

/// A message row already loaded by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    #[serde(default)]
    pub body: String,
}

/// The single quoted-message shape sent along with a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuotedMessage {
    ExtendedTextMessage(Value),
    Conversation(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteContext {
    pub key: Value,
    pub message: QuotedMessage,
}

/// Build the quote block from a stored raw transport message (`{ key, message }`).
///
/// Prefers the extended-text shape when present and falls back to the plain
/// `conversation` field. Returns `None` for a blob without a `message` object.
pub fn quote_from_raw(raw: &str) -> Result<Option<QuoteContext>, serde_json::Error> {
    let parsed: Value = serde_json::from_str(raw)?;
    let Some(message) = parsed.get("message").filter(|m| m.is_object()) else {
        return Ok(None);
    };
    let key = parsed.get("key").cloned().unwrap_or(Value::Null);

    let quoted = match message.get("extendedTextMessage").filter(|v| !v.is_null()) {
        Some(extended) => QuotedMessage::ExtendedTextMessage(extended.clone()),
        None => QuotedMessage::Conversation(
            message.get("conversation").cloned().unwrap_or(Value::Null),
        ),
    };

    Ok(Some(QuoteContext {
        key,
        message: quoted,
    }))
}

/// Resolve a quote reference into transport quoting context.
///
/// Every miss (blank id, unknown id, store failure, unparsable blob) yields
/// `None` and the send proceeds unquoted.
pub async fn build_quote(
    store: &dyn MessageStore,
    reference: &QuotedReference,
) -> Option<QuoteContext> {
    let id = reference.id().trim();
    if id.is_empty() {
        return None;
    }

    let raw = match store.find_raw(id).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("Quoted message {} not found, sending unquoted", id);
            return None;
        }
        Err(e) => {
            warn!("Failed to load quoted message {}: {}", id, e);
            return None;
        }
    };

    match quote_from_raw(&raw) {
        Ok(quote) => quote,
        Err(e) => {
            warn!("Quoted message {} has unparsable payload: {}", id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extended_text_shape_is_preferred() {
        let raw = json!({
            "key": {"id": "ABC", "remoteJid": "55@s.whatsapp.net", "fromMe": false},
            "message": {
                "extendedTextMessage": {"text": "hello there"},
                "conversation": "ignored"
            }
        })
        .to_string();

        let quote = quote_from_raw(&raw).unwrap().unwrap();
        assert_eq!(quote.key["id"], "ABC");
        assert_eq!(
            quote.message,
            QuotedMessage::ExtendedTextMessage(json!({"text": "hello there"}))
        );
    }

    #[test]
    fn test_conversation_shape_fallback() {
        let raw = json!({"key": {"id": "X"}, "message": {"conversation": "hi"}}).to_string();
        let quote = quote_from_raw(&raw).unwrap().unwrap();
        assert_eq!(quote.message, QuotedMessage::Conversation(json!("hi")));

        let wire = serde_json::to_value(&quote).unwrap();
        assert_eq!(wire["message"], json!({"conversation": "hi"}));
    }

    #[test]
    fn test_blob_without_message_is_absent() {
        assert!(quote_from_raw(r#"{"key": {"id": "X"}}"#).unwrap().is_none());
        assert!(quote_from_raw("not json").is_err());
    }
}
