//! Whisper transcription using whisper-rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::config::Settings;
use crate::transcription::audio::load_wav;
use crate::transcription::model::ensure_model;
use crate::transcription::{ComputeDevice, Transcriber, Transcript, TranscriptSegment};

/// Whisper-based transcriber
///
/// Holds only configuration; the model context is created per transcription
/// so that constructing the transcriber never touches the model cache.
pub struct WhisperTranscriber {
    model: String,
    models_dir: PathBuf,
    language: Option<String>,
    translate: bool,
    threads: u32,
    device: ComputeDevice,
}

impl WhisperTranscriber {
    /// Create a new transcriber from invocation settings
    pub fn new(settings: &Settings) -> Self {
        let language = if settings.whisper.language.trim().is_empty() {
            None
        } else {
            Some(settings.whisper.language.trim().to_string())
        };

        Self {
            model: settings.whisper.model.clone(),
            models_dir: settings.whisper.models_dir.clone(),
            language,
            translate: settings.whisper.translate,
            threads: settings.whisper.threads,
            device: settings.whisper.device,
        }
    }

    /// Load the model context on the configured device. `Auto` tries GPU
    /// first and falls back to CPU if context creation fails.
    fn load_context(&self, model_path: &Path) -> Result<WhisperContext> {
        let path = model_path
            .to_str()
            .context("Model path is not valid UTF-8")?;

        let attempts: &[bool] = match self.device {
            ComputeDevice::Gpu => &[true],
            ComputeDevice::Cpu => &[false],
            ComputeDevice::Auto => &[true, false],
        };

        let mut last_err = None;
        for &use_gpu in attempts {
            let mut ctx_params = WhisperContextParameters::default();
            ctx_params.use_gpu = use_gpu;

            match WhisperContext::new_with_params(path, ctx_params) {
                Ok(ctx) => {
                    tracing::debug!(use_gpu, model = %self.model, "Whisper model loaded");
                    return Ok(ctx);
                }
                Err(e) => {
                    tracing::debug!(use_gpu, error = %e, "Whisper context creation failed");
                    last_err = Some(e);
                }
            }
        }

        Err(anyhow::anyhow!(
            "Failed to load Whisper model {}: {}",
            model_path.display(),
            last_err.map(|e| e.to_string()).unwrap_or_default()
        ))
    }

    fn inference_threads(&self) -> i32 {
        if self.threads > 0 {
            return self.threads as i32;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(4) as i32
    }

    fn run_inference(&self, model_path: &Path, samples: &[f32]) -> Result<Transcript> {
        let ctx = self.load_context(model_path)?;
        let mut state = ctx
            .create_state()
            .context("Failed to create Whisper state")?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_token_timestamps(true);
        params.set_suppress_blank(true);
        params.set_translate(self.translate);
        params.set_n_threads(self.inference_threads());

        if let Some(ref lang) = self.language {
            params.set_language(Some(lang));
        } else {
            // Null language triggers whisper's built-in auto-detection.
            params.set_language(None);
        }

        state
            .full(params, samples)
            .context("Whisper inference failed")?;

        let num_segments = state.full_n_segments();
        let mut segments = Vec::with_capacity(num_segments as usize);
        let mut prob_sum = 0.0f32;
        let mut prob_count = 0usize;

        for i in 0..num_segments {
            let segment = match state.get_segment(i) {
                Some(s) => s,
                None => continue,
            };

            let text = segment.to_string();
            if text.trim().is_empty() {
                continue;
            }

            // Token timestamps are in centiseconds (10ms units).
            let mut start_time = None;
            let mut end_time = 0.0f64;
            let n_tokens = segment.n_tokens();
            for t in 0..n_tokens {
                let token = match segment.get_token(t) {
                    Some(t) => t,
                    None => continue,
                };

                // Skip special tokens like [_BEG_] and <|endoftext|>.
                if let Ok(tok_text) = token.to_str() {
                    let trimmed = tok_text.trim();
                    if trimmed.is_empty() || trimmed.starts_with('[') || trimmed.starts_with('<') {
                        continue;
                    }
                } else {
                    continue;
                }

                let data = token.token_data();
                if start_time.is_none() {
                    start_time = Some(data.t0 as f64 / 100.0);
                }
                end_time = end_time.max(data.t1 as f64 / 100.0);

                prob_sum += token.token_probability();
                prob_count += 1;
            }

            segments.push(TranscriptSegment {
                start_time: start_time.unwrap_or(0.0),
                end_time,
                text,
            });
        }

        let language = match self.language {
            Some(ref lang) => lang.clone(),
            None => {
                let lang_id = state.full_lang_id_from_state();
                whisper_rs::get_lang_str(lang_id)
                    .unwrap_or("unknown")
                    .to_string()
            }
        };

        let confidence = if prob_count > 0 {
            prob_sum / prob_count as f32
        } else {
            0.0
        };

        Ok(Transcript {
            segments,
            language,
            confidence,
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, path: &Path) -> crate::Result<Transcript> {
        let model_path = ensure_model(&self.models_dir, &self.model).await?;

        let samples = load_wav(path).map_err(crate::MemoscribeError::Transcription)?;

        tracing::debug!(
            samples = samples.len(),
            seconds = samples.len() as f64 / 16_000.0,
            "Audio decoded, running inference"
        );

        self.run_inference(&model_path, &samples)
            .map_err(crate::MemoscribeError::Transcription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with(language: &str, threads: u32) -> Settings {
        let mut settings = Settings::default();
        settings.whisper.language = language.to_string();
        settings.whisper.threads = threads;
        settings
    }

    #[test]
    fn empty_language_means_auto_detect() {
        let transcriber = WhisperTranscriber::new(&settings_with("  ", 0));
        assert_eq!(transcriber.language, None);

        let transcriber = WhisperTranscriber::new(&settings_with("de", 0));
        assert_eq!(transcriber.language.as_deref(), Some("de"));
    }

    #[test]
    fn explicit_thread_count_is_respected() {
        let transcriber = WhisperTranscriber::new(&settings_with("", 7));
        assert_eq!(transcriber.inference_threads(), 7);
    }

    #[test]
    fn auto_thread_count_is_bounded() {
        let transcriber = WhisperTranscriber::new(&settings_with("", 0));
        let threads = transcriber.inference_threads();
        assert!((1..=4).contains(&threads));
    }

    #[tokio::test]
    async fn missing_audio_surfaces_transcription_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut settings = settings_with("", 0);
        settings.whisper.models_dir = tmp.path().to_path_buf();
        // Pre-seed a fake model so no download is attempted; decode fails first.
        std::fs::write(tmp.path().join("ggml-small.bin"), b"fake").unwrap();

        let transcriber = WhisperTranscriber::new(&settings);
        let err = transcriber
            .transcribe(Path::new("/nonexistent/memo.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::MemoscribeError::Transcription(_)));
    }
}
