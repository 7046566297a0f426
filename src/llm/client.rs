use anyhow::Result;
use async_trait::async_trait;

use crate::config::Settings;
use crate::llm::gemini::GeminiClient;

/// Summary generation request payload.
pub struct SummaryRequest<'a> {
    pub transcript: &'a str,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn summarize(&self, request: SummaryRequest<'_>) -> Result<String>;
}

/// Build an LLM provider from runtime settings.
pub fn build_provider(settings: &Settings) -> Result<Box<dyn LlmProvider>> {
    match settings.llm.provider.to_lowercase().as_str() {
        "gemini" => Ok(Box::new(GeminiClient::from_settings(settings)?)),
        other => anyhow::bail!(
            "Unsupported llm.provider '{}'. Supported providers: gemini",
            other
        ),
    }
}
