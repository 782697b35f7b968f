//! In-memory collaborator doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use ticket_relay::ai::{CompletionRequest, CompletionService, SummaryArchive};
use ticket_relay::context::CacheStore;
use ticket_relay::core::models::{Contact, SummaryRecord};
use ticket_relay::errors::{RelayError, TransportFailure};
use ticket_relay::fault::FaultReporter;
use ticket_relay::transport::{
    MessageStore, OutboundPayload, SendOptions, SentMessage, SessionRegistry, Transport,
};

#[derive(Debug, Clone)]
pub struct RecordedSend {
    pub jid: String,
    pub payload: OutboundPayload,
    pub options: SendOptions,
}

/// Transport that replays scripted outcomes in order and records every call.
/// Once the script runs out, sends succeed.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<(), TransportFailure>>>,
    calls: Mutex<Vec<RecordedSend>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<(), TransportFailure>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedSend> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_message(
        &self,
        jid: &str,
        payload: OutboundPayload,
        options: SendOptions,
    ) -> Result<SentMessage, TransportFailure> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedSend {
                jid: jid.to_string(),
                payload,
                options,
            });
            calls.len()
        };

        let outcome = self.script.lock().unwrap().pop_front().unwrap_or(Ok(()));
        outcome.map(|()| SentMessage {
            id: format!("MSG-{attempt}"),
            remote_jid: jid.to_string(),
            raw: json!({"attempt": attempt}),
        })
    }
}

/// Registry holding one transport per account id.
#[derive(Default)]
pub struct StaticRegistry {
    sessions: HashMap<u64, Arc<dyn Transport>>,
}

impl StaticRegistry {
    pub fn with(account_id: u64, transport: Arc<dyn Transport>) -> Arc<Self> {
        let mut sessions = HashMap::new();
        sessions.insert(account_id, transport);
        Arc::new(Self { sessions })
    }
}

#[async_trait]
impl SessionRegistry for StaticRegistry {
    async fn session(&self, account_id: u64) -> Result<Arc<dyn Transport>, RelayError> {
        self.sessions
            .get(&account_id)
            .cloned()
            .ok_or_else(|| RelayError::TransportError(format!("account {account_id} offline")))
    }
}

#[derive(Default)]
pub struct MemoryMessageStore {
    rows: HashMap<String, String>,
    pub fail: bool,
}

impl MemoryMessageStore {
    pub fn with_rows(rows: &[(&str, serde_json::Value)]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|(id, raw)| ((*id).to_string(), raw.to_string()))
                .collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            rows: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn find_raw(&self, id: &str) -> Result<Option<String>, RelayError> {
        if self.fail {
            return Err(RelayError::StorageError("database offline".to_string()));
        }
        Ok(self.rows.get(id).cloned())
    }
}

/// Fault sink that keeps the rendered errors.
#[derive(Default)]
pub struct RecordingFaults {
    captured: Mutex<Vec<String>>,
}

impl RecordingFaults {
    pub fn captured(&self) -> Vec<String> {
        self.captured.lock().unwrap().clone()
    }
}

impl FaultReporter for RecordingFaults {
    fn capture(&self, error: &(dyn std::error::Error + 'static)) {
        self.captured.lock().unwrap().push(error.to_string());
    }
}

/// Completion service returning a fixed answer and recording requests.
pub struct FixedCompletion {
    answer: Result<String, String>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl FixedCompletion {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CompletionService for FixedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RelayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.answer
            .clone()
            .map_err(RelayError::CompletionError)
    }
}

#[derive(Default)]
pub struct MemoryArchive {
    pub records: Mutex<Vec<SummaryRecord>>,
    pub fail: bool,
}

#[async_trait]
impl SummaryArchive for MemoryArchive {
    async fn save_summary(&self, record: SummaryRecord) -> Result<(), RelayError> {
        if self.fail {
            return Err(RelayError::StorageError("insert rejected".to_string()));
        }
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

/// Cache whose every call fails.
pub struct BrokenCache;

#[async_trait]
impl CacheStore for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, RelayError> {
        Err(RelayError::CacheError("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: u64) -> Result<(), RelayError> {
        Err(RelayError::CacheError("connection refused".to_string()))
    }

    async fn del(&self, _key: &str) -> Result<(), RelayError> {
        Err(RelayError::CacheError("connection refused".to_string()))
    }
}

pub fn contact(number: &str) -> Contact {
    Contact {
        name: "Ana Souza".to_string(),
        number: number.to_string(),
        remote_jid: None,
        is_group: false,
        company_id: 1,
    }
}
