/// Ticket relay - the outbound conversational pipeline of a customer-support
/// ticketing platform that talks to end users over a WhatsApp-style chat transport.
///
/// The crate covers three concerns:
/// 1. Resolving the transport address (JID) of a stored contact and dispatching
///    text or document messages, with reply quoting and a single resend when the
///    transport reports a stale group-encryption session
/// 2. A TTL-backed, size-bounded conversational memory per session
/// 3. Conversation summarization through an optional completion service, with a
///    deterministic fallback and keyword sentiment
///
/// # Architecture
///
/// External systems are collaborators behind traits:
/// - `transport::Transport` / `transport::SessionRegistry` for the chat transport
/// - `transport::MessageStore` for raw stored messages used in quoting
/// - `context::CacheStore` for the session cache (`context::MemoryCache` in-process)
/// - `ai::CompletionService` for the language model (`ai::OpenAiCompletionClient`)
/// - `ai::SummaryArchive` for summary audit records
/// - `fault::FaultReporter` for exception capture
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use ticket_relay::ai::{CompletionService, ConversationSummarizer};
/// use ticket_relay::context::{MemoryCache, SessionContextManager};
/// use ticket_relay::core::config::AppConfig;
/// use ticket_relay::core::models::ChatMessage;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     ticket_relay::setup_logging();
///     let config = AppConfig::from_env()?;
///
///     let sessions = SessionContextManager::new(Arc::new(MemoryCache::new()));
///     sessions
///         .add_message("ticket-42", ChatMessage::user("My order never arrived"), Some(42))
///         .await?;
///
///     let completion = config
///         .completion_client()
///         .map(|client| Arc::new(client) as Arc<dyn CompletionService>);
///     let summarizer =
///         ConversationSummarizer::new(completion).with_max_tokens(config.summary_max_tokens);
///
///     let history = sessions.get_conversation_history("ticket-42").await;
///     if summarizer.should_summarize(history.len()) {
///         let result = summarizer.create_summary(&history, Some(42)).await;
///         sessions.set_summary("ticket-42", &result.summary).await?;
///     }
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod context;
pub mod core;
pub mod errors;
pub mod fault;
pub mod prompt;
pub mod transport;
pub mod utils;

pub use errors::{RelayError, SendError, TransportFailure};

/// Configure structured logging with JSON output.
///
/// Installs a tracing-subscriber JSON formatter (with targets) on the global
/// registry. Call once at process start.
///
/// # Example
///
/// ```
/// ticket_relay::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    // A subscriber may already be installed (tests, embedding hosts).
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
