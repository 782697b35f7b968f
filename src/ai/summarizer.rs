//! Conversation summarization with a deterministic fallback.
//!
//! Summaries come from the completion service when one is injected. Any
//! failure there degrades to a statistical summary built from message
//! counts; callers never see an error from [`ConversationSummarizer::create_summary`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::client::{CompletionRequest, CompletionService};
use crate::core::models::{ChatMessage, Role, Sentiment, SummaryRecord, SummaryResult};
use crate::errors::RelayError;
use crate::prompt::build_summary_prompt;

pub const DEFAULT_SUMMARY_THRESHOLD: usize = 30;
pub const DEFAULT_MAX_SUMMARY_TOKENS: u32 = 1000;
pub const SUMMARY_TEMPERATURE: f32 = 0.3;
pub const MAX_KEY_POINTS: usize = 5;

const EMPTY_SUMMARY_TEXT: &str = "Unable to generate a summary.";

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "obrigado",
    "ótimo",
    "bom",
    "excelente",
    "satisfeito",
    "perfeito",
    "agradecido",
    "feliz",
    "thank",
    "great",
    "good",
    "excellent",
    "perfect",
    "grateful",
    "glad",
];

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "problema",
    "erro",
    "não",
    "mal",
    "ruim",
    "pessimo",
    "insatisfeito",
    "frustrado",
    "irritado",
    "issue",
    "failure",
    "bad",
    "terrible",
    "disappointed",
    "frustrated",
    "angry",
    "broken",
];

/// Storage for the synthetic audit record written alongside a ticket.
#[async_trait]
pub trait SummaryArchive: Send + Sync {
    async fn save_summary(&self, record: SummaryRecord) -> Result<(), RelayError>;
}

/// Whether a conversation is long enough to be summarized.
#[must_use]
pub const fn should_summarize(conversation_length: usize, threshold: usize) -> bool {
    conversation_length >= threshold
}

/// Split summary text on sentence-ending punctuation, keeping the first five
/// non-empty trimmed sentences.
#[must_use]
pub fn extract_key_points(summary: &str) -> Vec<String> {
    summary
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_KEY_POINTS)
        .map(str::to_string)
        .collect()
}

/// Keyword-count sentiment over the whole transcript. Each keyword counts at
/// most once per message.
///
/// No keyword may contain another keyword of the same list, otherwise one word
/// would be counted twice.
#[must_use]
pub fn estimate_sentiment(messages: &[ChatMessage]) -> Sentiment {
    let mut positive = 0usize;
    let mut negative = 0usize;

    for msg in messages {
        let content = msg.content.to_lowercase();
        positive += POSITIVE_KEYWORDS
            .iter()
            .filter(|k| content.contains(*k))
            .count();
        negative += NEGATIVE_KEYWORDS
            .iter()
            .filter(|k| content.contains(*k))
            .count();
    }

    if negative > positive {
        Sentiment::Negative
    } else if positive > negative {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    }
}

/// Count-based summary used when no completion is available.
#[must_use]
pub fn simple_summary(messages: &[ChatMessage]) -> SummaryResult {
    let total = messages.len();
    let customer = messages.iter().filter(|m| m.role == Role::User).count();
    let replies = messages.iter().filter(|m| m.role == Role::Assistant).count();

    SummaryResult {
        summary: format!(
            "Conversation with {total} messages in total, including {customer} messages from \
             the customer and {replies} replies. The customer opened the conversation asking \
             for help, and support was provided."
        ),
        key_points: vec![
            format!("Total messages: {total}"),
            format!("Customer messages: {customer}"),
            format!("Replies: {replies}"),
        ],
        sentiment: Sentiment::Neutral,
    }
}

/// Audit row for a produced summary.
#[must_use]
pub fn summary_record(ticket_id: u64, result: &SummaryResult) -> SummaryRecord {
    SummaryRecord {
        ticket_id,
        content: format!(
            "Conversation summary: {}\n\nKey points: {}\nSentiment: {}",
            result.summary,
            result.key_points.join("; "),
            result.sentiment
        ),
        from: "system".to_string(),
        to: String::new(),
        message: serde_json::to_value(result).unwrap_or_default(),
    }
}

pub struct ConversationSummarizer {
    completion: Option<Arc<dyn CompletionService>>,
    archive: Option<Arc<dyn SummaryArchive>>,
    max_tokens_per_summary: u32,
}

impl ConversationSummarizer {
    /// `completion: None` routes every call through the deterministic fallback.
    #[must_use]
    pub fn new(completion: Option<Arc<dyn CompletionService>>) -> Self {
        Self {
            completion,
            archive: None,
            max_tokens_per_summary: DEFAULT_MAX_SUMMARY_TOKENS,
        }
    }

    #[must_use]
    pub fn with_archive(mut self, archive: Arc<dyn SummaryArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens_per_summary = max_tokens;
        self
    }

    #[must_use]
    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    #[must_use]
    pub fn should_summarize(&self, conversation_length: usize) -> bool {
        should_summarize(conversation_length, DEFAULT_SUMMARY_THRESHOLD)
    }

    /// Summarize a conversation, persisting an audit record when a ticket is given.
    pub async fn create_summary(
        &self,
        messages: &[ChatMessage],
        ticket_id: Option<u64>,
    ) -> SummaryResult {
        let result = match self.completion_summary(messages).await {
            Some(result) => result,
            None => simple_summary(messages),
        };

        if let Some(ticket_id) = ticket_id {
            self.archive_summary(ticket_id, &result).await;
        }

        result
    }

    async fn completion_summary(&self, messages: &[ChatMessage]) -> Option<SummaryResult> {
        let completion = self.completion.as_ref()?;
        let request = CompletionRequest {
            prompt: build_summary_prompt(messages),
            max_output_tokens: self.max_tokens_per_summary,
            temperature: SUMMARY_TEMPERATURE,
        };

        match completion.complete(&request).await {
            Ok(text) => {
                let summary = match text.trim() {
                    "" => EMPTY_SUMMARY_TEXT.to_string(),
                    trimmed => trimmed.to_string(),
                };
                info!("Summarized {} messages via completion service", messages.len());
                Some(SummaryResult {
                    key_points: extract_key_points(&summary),
                    sentiment: estimate_sentiment(messages),
                    summary,
                })
            }
            Err(e) => {
                warn!("Completion summary failed, using simple summary: {}", e);
                None
            }
        }
    }

    async fn archive_summary(&self, ticket_id: u64, result: &SummaryResult) {
        let Some(archive) = &self.archive else {
            return;
        };
        if let Err(e) = archive.save_summary(summary_record(ticket_id, result)).await {
            error!("Failed to save summary for ticket {}: {}", ticket_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_do_not_contain_each_other() {
        for list in [POSITIVE_KEYWORDS, NEGATIVE_KEYWORDS] {
            for a in list {
                for b in list {
                    assert!(a == b || !a.contains(b), "{a} contains {b}");
                }
            }
        }
    }

    #[test]
    fn test_extract_key_points_caps_at_five() {
        let text = "One. Two! Three? Four... Five. Six. Seven.";
        assert_eq!(
            extract_key_points(text),
            vec!["One", "Two", "Three", "Four", "Five"]
        );
    }

    #[test]
    fn test_extract_key_points_discards_empties() {
        assert!(extract_key_points("...!?  ").is_empty());
        assert_eq!(extract_key_points("No punctuation"), vec!["No punctuation"]);
    }

    #[test]
    fn test_summary_record_content() {
        let result = SummaryResult {
            summary: "Refund issued".to_string(),
            key_points: vec!["Refund issued".to_string(), "Customer happy".to_string()],
            sentiment: Sentiment::Positive,
        };
        let record = summary_record(7, &result);
        assert_eq!(record.ticket_id, 7);
        assert_eq!(record.from, "system");
        assert_eq!(
            record.content,
            "Conversation summary: Refund issued\n\nKey points: Refund issued; Customer happy\nSentiment: positive"
        );
        assert_eq!(record.message["sentiment"], "positive");
        assert_eq!(record.message["keyPoints"][1], "Customer happy");
    }
}
