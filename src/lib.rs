//! memoscribe - transcribe a voice memo locally, optionally summarize it with Gemini
//!
//! One invocation produces exactly one result payload on stdout; everything
//! else (detected language, warnings, errors) goes to stderr.

pub mod cli;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod transcription;

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for memoscribe
#[derive(Error, Debug)]
pub enum MemoscribeError {
    #[error("Audio file not found: {}", .0.display())]
    AudioNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcription error: {0:#}")]
    Transcription(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MemoscribeError>;
