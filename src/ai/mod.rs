//! Completion-service client and conversation summarization

pub mod client;
pub mod summarizer;

// Re-export main types for convenience
pub use client::{CompletionRequest, CompletionService, OpenAiCompletionClient};
pub use summarizer::{ConversationSummarizer, SummaryArchive, estimate_sentiment, should_summarize};
