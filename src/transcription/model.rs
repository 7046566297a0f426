//! On-demand download and caching of ggml whisper models
//!
//! Models are fetched once from the upstream whisper.cpp repository and kept
//! in the configured models directory. Downloads go to a `.part` file first
//! and are renamed into place so an interrupted fetch never leaves a
//! truncated model behind.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Model size identifiers this tool knows how to fetch.
pub const KNOWN_MODELS: &[&str] = &[
    "tiny",
    "tiny.en",
    "base",
    "base.en",
    "small",
    "small.en",
    "medium",
    "medium.en",
    "large-v3",
];

/// File name of the ggml weights for a model size identifier.
pub fn model_file_name(model: &str) -> String {
    format!("ggml-{model}.bin")
}

/// Resolve the model file for `model`, downloading it into `models_dir` on
/// first use.
pub async fn ensure_model(models_dir: &Path, model: &str) -> crate::Result<PathBuf> {
    if !KNOWN_MODELS.contains(&model) {
        return Err(crate::MemoscribeError::Config(format!(
            "Unknown whisper model '{}'. Known models: {}",
            model,
            KNOWN_MODELS.join(", ")
        )));
    }

    let model_path = models_dir.join(model_file_name(model));
    if model_path.exists() {
        return Ok(model_path);
    }

    tracing::info!(
        model,
        path = %model_path.display(),
        "Whisper model not cached, downloading"
    );

    download_model(models_dir, model, &model_path)
        .await
        .map_err(crate::MemoscribeError::Transcription)?;

    Ok(model_path)
}

async fn download_model(models_dir: &Path, model: &str, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(models_dir)
        .with_context(|| format!("Failed to create models dir: {}", models_dir.display()))?;

    let url = format!("{}/{}", MODEL_BASE_URL, model_file_name(model));

    let response = reqwest::get(&url)
        .await
        .with_context(|| format!("Model download failed: {url}"))?
        .error_for_status()
        .with_context(|| format!("Model download rejected: {url}"))?;

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Model download interrupted: {url}"))?;

    // Write to a temp file first, then rename for atomicity.
    let temp_path = dest.with_extension("part");
    let mut file = std::fs::File::create(&temp_path)
        .with_context(|| format!("Failed to create {}", temp_path.display()))?;
    file.write_all(&bytes)
        .and_then(|_| file.flush())
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    drop(file);

    std::fs::rename(&temp_path, dest)
        .with_context(|| format!("Failed to move model into {}", dest.display()))?;

    tracing::info!(bytes = bytes.len(), path = %dest.display(), "Whisper model cached");

    Ok(())
}
