use std::env;
use std::path::PathBuf;

use crate::ai::client::OpenAiCompletionClient;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_PUBLIC_FOLDER: &str = "public";
pub const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_org_id: Option<String>,
    pub openai_model: Option<String>,
    pub public_folder: PathBuf,
    pub summary_max_tokens: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_org_id: None,
            openai_model: None,
            public_folder: PathBuf::from(DEFAULT_PUBLIC_FOLDER),
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let summary_max_tokens = match env::var("SUMMARY_MAX_TOKENS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|e| format!("SUMMARY_MAX_TOKENS: {}", e))?,
            Err(_) => DEFAULT_SUMMARY_MAX_TOKENS,
        };

        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            openai_org_id: env::var("OPENAI_ORG_ID").ok(),
            openai_model: env::var("OPENAI_MODEL").ok(),
            public_folder: env::var("PUBLIC_FOLDER")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_PUBLIC_FOLDER)),
            summary_max_tokens,
        })
    }

    /// The completion-service capability. `None` when no API key is configured,
    /// which routes every summary through the deterministic fallback.
    #[must_use]
    pub fn completion_client(&self) -> Option<OpenAiCompletionClient> {
        let api_key = self.openai_api_key.clone()?;
        let model = self
            .openai_model
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
        Some(OpenAiCompletionClient::new(
            api_key,
            self.openai_org_id.clone(),
            model,
        ))
    }
}
