//! Transcription module for memoscribe
//!
//! Handles speech-to-text using whisper-rs, including on-demand download of
//! the ggml model selected by its size identifier.

mod audio;
mod model;
mod whisper;

pub use model::{ensure_model, model_file_name, KNOWN_MODELS};
pub use whisper::WhisperTranscriber;

use async_trait::async_trait;
use std::path::Path;

/// Compute device selection for whisper inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeDevice {
    /// Try GPU first, fall back to CPU if unavailable
    #[default]
    Auto,
    /// Require GPU acceleration
    Gpu,
    /// Force CPU inference
    Cpu,
}

/// A time-bounded span of recognized speech text
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Segment start in seconds from the beginning of the audio
    pub start_time: f64,
    /// Segment end in seconds
    pub end_time: f64,
    /// Recognized text, as produced by the model (leading space included)
    pub text: String,
}

/// Result of transcribing one audio file
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Segments in time order, exactly as emitted by the model
    pub segments: Vec<TranscriptSegment>,
    /// Detected (or configured) source language label
    pub language: String,
    /// Confidence score for the recognition, in [0, 1]
    pub confidence: f32,
}

impl Transcript {
    /// Concatenate segment texts in order. No reordering, no deduplication;
    /// callers trim the result before presenting it.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Speech-to-text capability, abstracted so the pipeline can be exercised
/// against a stub in tests.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio file at `path` in full.
    async fn transcribe(&self, path: &Path) -> crate::Result<Transcript>;
}
