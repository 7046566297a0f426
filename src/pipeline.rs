//! Invocation pipeline orchestration
//!
//! One call, one result: validate the input path, transcribe, optionally
//! summarize, and hand back the single payload the caller prints to stdout.
//! Summarization problems degrade to the raw transcript; only input and
//! transcription failures propagate to the top-level handler.

use std::path::Path;

use crate::config::Settings;
use crate::llm::{build_provider, LlmProvider, SummaryRequest};
use crate::transcription::{Transcriber, WhisperTranscriber};
use crate::MemoscribeError;

/// Marker written to stdout when the input path is missing or unusable,
/// so a caller reading stdout never blocks on a failed run.
pub const INPUT_FAILURE_MARKER: &str = "Error: No audio input or file not found.";

/// Marker written to stdout when transcription or processing fails.
pub const PROCESS_FAILURE_MARKER: &str = "Error: Transcription or processing failed.";

/// Run the full pipeline with the real whisper transcriber and, when enabled
/// and configured, the Gemini summarizer.
pub async fn run(settings: &Settings, audio_path: &Path) -> crate::Result<String> {
    let transcriber = WhisperTranscriber::new(settings);
    let provider = summarizer(settings);
    run_with(audio_path, &transcriber, provider.as_deref()).await
}

/// Decide once per invocation whether a summarization provider is available.
/// Missing credentials and provider construction failures warn on stderr and
/// mean "no provider", which the pipeline treats as transcript-only.
fn summarizer(settings: &Settings) -> Option<Box<dyn LlmProvider>> {
    if !settings.llm.enabled {
        return None;
    }

    if settings.llm.api_key.trim().is_empty() {
        tracing::warn!(
            "Gemini summarization enabled but no API key provided; falling back to raw transcription"
        );
        return None;
    }

    match build_provider(settings) {
        Ok(provider) => Some(provider),
        Err(e) => {
            tracing::warn!(
                "Could not build LLM provider, falling back to raw transcription: {e:#}"
            );
            None
        }
    }
}

/// Pipeline core, parameterized over the transcriber and provider so tests
/// can drive it with stubs. `provider: None` means summarization is disabled
/// or unavailable.
pub async fn run_with(
    audio_path: &Path,
    transcriber: &dyn Transcriber,
    provider: Option<&dyn LlmProvider>,
) -> crate::Result<String> {
    // Validate before any model or network work happens.
    if !audio_path.exists() {
        return Err(MemoscribeError::AudioNotFound(audio_path.to_path_buf()));
    }

    let transcript = transcriber.transcribe(audio_path).await?;

    tracing::info!(
        language = %transcript.language,
        confidence = transcript.confidence,
        segments = transcript.segments.len(),
        "Detected language"
    );

    let raw = transcript.text();
    tracing::debug!(transcript = %raw, "Raw transcription");

    let trimmed = raw.trim().to_string();

    let Some(provider) = provider else {
        return Ok(trimmed);
    };

    match provider.summarize(SummaryRequest { transcript: &raw }).await {
        Ok(summary) => Ok(summary.trim().to_string()),
        Err(e) => {
            tracing::warn!("Gemini summarization failed, falling back to raw transcription: {e:#}");
            Ok(trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::{Transcript, TranscriptSegment};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubTranscriber {
        segments: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl StubTranscriber {
        fn new(segments: Vec<&'static str>) -> Self {
            Self {
                segments,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transcriber for StubTranscriber {
        async fn transcribe(&self, _path: &Path) -> crate::Result<Transcript> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Transcript {
                segments: self
                    .segments
                    .iter()
                    .enumerate()
                    .map(|(i, text)| TranscriptSegment {
                        start_time: i as f64,
                        end_time: i as f64 + 1.0,
                        text: text.to_string(),
                    })
                    .collect(),
                language: "en".to_string(),
                confidence: 0.97,
            })
        }
    }

    enum StubResponse {
        Text(&'static str),
        Failure,
    }

    struct StubProvider {
        response: StubResponse,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(response: StubResponse) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        async fn summarize(&self, _request: SummaryRequest<'_>) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.response {
                StubResponse::Text(text) => Ok(text.to_string()),
                StubResponse::Failure => anyhow::bail!("simulated Gemini outage"),
            }
        }
    }

    fn existing_audio() -> tempfile::NamedTempFile {
        tempfile::NamedTempFile::new().unwrap()
    }

    #[tokio::test]
    async fn nonexistent_path_fails_before_transcription() {
        let transcriber = StubTranscriber::new(vec![" never used"]);
        let provider = StubProvider::new(StubResponse::Text("never used"));

        let err = run_with(
            Path::new("/definitely/not/here.wav"),
            &transcriber,
            Some(&provider),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MemoscribeError::AudioNotFound(_)));
        assert_eq!(transcriber.calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn disabled_summarization_prints_trimmed_transcript() {
        let audio = existing_audio();
        let transcriber = StubTranscriber::new(vec![" Fixed the parser,", " then ran tests. "]);

        let output = run_with(audio.path(), &transcriber, None).await.unwrap();

        assert_eq!(output, "Fixed the parser, then ran tests.");
    }

    #[tokio::test]
    async fn generation_failure_falls_back_to_transcript() {
        let audio = existing_audio();
        let transcriber = StubTranscriber::new(vec![" Debugged the cache layer."]);
        let provider = StubProvider::new(StubResponse::Failure);

        let output = run_with(audio.path(), &transcriber, Some(&provider))
            .await
            .unwrap();

        assert_eq!(output, "Debugged the cache layer.");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn successful_generation_prints_trimmed_summary_only() {
        let audio = existing_audio();
        let transcriber = StubTranscriber::new(vec![" something long and rambling"]);
        let provider = StubProvider::new(StubResponse::Text(" Hello world "));

        let output = run_with(audio.path(), &transcriber, Some(&provider))
            .await
            .unwrap();

        assert_eq!(output, "Hello world");
        assert!(!output.contains("rambling"));
    }

    #[tokio::test]
    async fn repeated_runs_are_deterministic() {
        let audio = existing_audio();
        let transcriber = StubTranscriber::new(vec![" Same", " memo."]);
        let provider = StubProvider::new(StubResponse::Text("Stable summary"));

        let first = run_with(audio.path(), &transcriber, Some(&provider))
            .await
            .unwrap();
        let second = run_with(audio.path(), &transcriber, Some(&provider))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first, "Stable summary");
    }

    /// Collects formatted log output so tests can assert on the diagnostic
    /// channel.
    #[derive(Clone, Default)]
    struct CaptureWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl CaptureWriter {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn language_diagnostic_is_emitted_but_kept_out_of_the_payload() {
        let sink = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(sink.clone())
            .with_ansi(false)
            .finish();

        let payload = tracing::subscriber::with_default(subscriber, || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let audio = existing_audio();
                let transcriber = StubTranscriber::new(vec![" Wrapped up the migration."]);
                run_with(audio.path(), &transcriber, None).await.unwrap()
            })
        });

        let logs = sink.contents();
        assert!(
            logs.contains("Detected language"),
            "expected the language diagnostic in the log output:\n{logs}"
        );
        assert!(
            logs.contains("confidence"),
            "expected the confidence score in the log output:\n{logs}"
        );

        assert_eq!(payload, "Wrapped up the migration.");
        assert!(!payload.contains("Detected language"));
    }

    #[test]
    fn summarizer_is_none_when_disabled_or_unconfigured() {
        let settings = Settings::default();
        assert!(summarizer(&settings).is_none());

        let mut enabled_without_key = Settings::default();
        enabled_without_key.llm.enabled = true;
        assert!(summarizer(&enabled_without_key).is_none());

        let mut fully_configured = Settings::default();
        fully_configured.llm.enabled = true;
        fully_configured.llm.api_key = "key".to_string();
        assert!(summarizer(&fully_configured).is_some());
    }
}
