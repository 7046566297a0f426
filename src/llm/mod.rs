//! LLM module for memoscribe
//!
//! Turns a raw voice-memo transcript into a structured recall summary using
//! the Gemini API. Failures here are never fatal; the pipeline falls back to
//! the raw transcript.

mod client;
mod gemini;
mod prompts;

pub use client::{build_provider, LlmProvider, SummaryRequest};
pub use gemini::GeminiClient;
pub use prompts::build_recall_prompt;
