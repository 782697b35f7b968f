#![allow(clippy::missing_errors_doc)]
//! Outbound message dispatch.
//!
//! A send resolves the transport session and address, optionally builds the
//! reply quote, waits the caller's pacing delay and calls the transport once.
//! A failure carrying the stale group-encryption signature gets exactly one
//! unquoted resend; everything else surfaces as a [`SendError`] straight away.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{error, info, warn};
use url::Url;

use super::format::format_body;
use super::jid::resolve;
use super::quote::{QuotedReference, build_quote};
use super::{
    ContextInfo, DocumentSource, MessageStore, OutboundPayload, SendOptions, SentMessage,
    SessionRegistry, Transport,
};
use crate::core::config::AppConfig;
use crate::core::models::Contact;
use crate::errors::{SendError, TransportFailure};
use crate::fault::{FaultReporter, TracingFaultReporter};
use crate::utils::filename::{random_suffix, sanitize_caption};
use crate::utils::mime::document_mime;

/// Extra attempts allowed after a group-crypto failure.
pub const GROUP_CRYPTO_RETRIES: usize = 1;

#[derive(Debug, Clone)]
pub struct SendTextRequest {
    pub body: String,
    pub account_id: u64,
    pub contact: Contact,
    pub quoted: Option<QuotedReference>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct SendDocumentRequest {
    pub account_id: u64,
    pub contact: Contact,
    pub url: Option<String>,
    pub caption: String,
    pub delay_ms: Option<u64>,
}

pub struct MessageDispatcher {
    sessions: Arc<dyn SessionRegistry>,
    messages: Arc<dyn MessageStore>,
    faults: Arc<dyn FaultReporter>,
    public_folder: PathBuf,
}

async fn pace(delay_ms: Option<u64>) {
    if let Some(ms) = delay_ms.filter(|ms| *ms > 0) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

impl MessageDispatcher {
    #[must_use]
    pub fn new(
        sessions: Arc<dyn SessionRegistry>,
        messages: Arc<dyn MessageStore>,
        faults: Arc<dyn FaultReporter>,
        public_folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sessions,
            messages,
            faults,
            public_folder: public_folder.into(),
        }
    }

    /// Dispatcher wired to the tracing fault sink and the configured public folder.
    #[must_use]
    pub fn from_config(
        config: &AppConfig,
        sessions: Arc<dyn SessionRegistry>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self::new(
            sessions,
            messages,
            Arc::new(TracingFaultReporter),
            config.public_folder.clone(),
        )
    }

    #[must_use]
    pub fn public_folder(&self) -> &Path {
        &self.public_folder
    }

    async fn session(&self, account_id: u64) -> Result<Arc<dyn Transport>, SendError> {
        self.sessions.session(account_id).await.map_err(|e| {
            error!("No transport session for account {}: {}", account_id, e);
            self.faults.capture(&e);
            SendError::SessionUnavailable(account_id)
        })
    }

    /// Send a text message, quoting a prior message when one is referenced.
    pub async fn send_text(&self, request: &SendTextRequest) -> Result<SentMessage, SendError> {
        let transport = self.session(request.account_id).await?;
        let address = resolve(&request.contact);

        let quote = match &request.quoted {
            Some(reference) => build_quote(self.messages.as_ref(), reference).await,
            None => None,
        };

        pace(request.delay_ms).await;

        let text = format_body(&request.body, &request.contact);
        let first_payload = OutboundPayload::Text {
            text: text.clone(),
            context_info: Some(ContextInfo::default()),
        };
        let retry_payload = OutboundPayload::Text {
            text,
            context_info: None,
        };

        let mut attempts = 0usize;
        let strategy = FixedInterval::from_millis(0).take(GROUP_CRYPTO_RETRIES);
        let result = RetryIf::spawn(
            strategy,
            || {
                attempts += 1;
                let (payload, options) = if attempts == 1 {
                    (first_payload.clone(), SendOptions::quoting(quote.clone()))
                } else {
                    warn!(
                        "Group session out of sync for {}, resending without quote",
                        address
                    );
                    (retry_payload.clone(), SendOptions::default())
                };
                let transport = Arc::clone(&transport);
                let jid = address.jid.clone();
                async move { transport.send_message(&jid, payload, options).await }
            },
            TransportFailure::is_group_crypto,
        )
        .await;

        match result {
            Ok(sent) => {
                info!(
                    "Message {} sent to {} after {} attempt(s)",
                    sent.id, address, attempts
                );
                Ok(sent)
            }
            Err(failure) => {
                error!(
                    "Failed to send message to {} after {} attempt(s): {}",
                    address, attempts, failure
                );
                self.faults.capture(&failure);
                if attempts > 1 {
                    Err(SendError::GroupCrypto(failure.message))
                } else {
                    Err(SendError::Transport(failure.message))
                }
            }
        }
    }

    /// Local file a caption maps to: `{public}/company{id}/{caption}.pdf`.
    #[must_use]
    pub fn document_path(&self, company_id: u64, safe_caption: &str) -> PathBuf {
        self.public_folder
            .join(format!("company{company_id}"))
            .join(format!("{safe_caption}.pdf"))
    }

    async fn document_source(
        &self,
        request: &SendDocumentRequest,
        safe_caption: &str,
    ) -> Result<DocumentSource, SendError> {
        // The transport receives the caller's URL verbatim.
        if let Some(raw_url) = request.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            return match Url::parse(raw_url) {
                Ok(_) => Ok(DocumentSource::Url(raw_url.to_string())),
                Err(e) => {
                    warn!("Invalid document URL {}: {}", raw_url, e);
                    Err(SendError::NotFound(raw_url.to_string()))
                }
            };
        }

        let path = self.document_path(request.contact.company_id, safe_caption);
        tokio::fs::read(&path)
            .await
            .map(DocumentSource::Bytes)
            .map_err(|e| {
                warn!("Document {} unavailable: {}", path.display(), e);
                SendError::NotFound(path.display().to_string())
            })
    }

    /// Send a document from a URL or from the company's public folder.
    pub async fn send_document(
        &self,
        request: &SendDocumentRequest,
    ) -> Result<SentMessage, SendError> {
        let transport = self.session(request.account_id).await?;
        let address = resolve(&request.contact);

        let safe_caption = sanitize_caption(&request.caption);
        let file_name = format!("{}-{}.pdf", safe_caption, random_suffix());

        pace(request.delay_ms).await;

        let source = match self.document_source(request, &safe_caption).await {
            Ok(source) => source,
            Err(e) => {
                self.faults.capture(&e);
                return Err(e);
            }
        };

        let payload = OutboundPayload::Document {
            source,
            mimetype: document_mime(&file_name),
            file_name,
            caption: safe_caption,
        };

        match transport
            .send_message(&address.jid, payload, SendOptions::default())
            .await
        {
            Ok(sent) => {
                info!("Document {} sent to {}", sent.id, address);
                Ok(sent)
            }
            Err(failure) => {
                error!("Failed to send document to {}: {}", address, failure);
                self.faults.capture(&failure);
                Err(SendError::Transport(failure.message))
            }
        }
    }
}
