//! WAV decoding for whisper input
//!
//! Whisper expects 16 kHz mono f32 samples; anything else is mixed down and
//! resampled here.

use anyhow::{Context, Result};
use std::path::Path;

/// Sample rate whisper models are trained on.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Load a WAV file and convert it to 16 kHz mono f32 samples.
pub fn load_wav(path: &Path) -> Result<Vec<f32>> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

    let spec = reader.spec();
    let channels = spec.channels as usize;

    // hound passes the header's rate field through unvalidated; a zero rate
    // would poison the resampling arithmetic below.
    if spec.sample_rate == 0 {
        anyhow::bail!(
            "Invalid WAV header (sample rate is 0): {}",
            path.display()
        );
    }

    tracing::debug!(
        sample_rate = spec.sample_rate,
        channels,
        format = ?spec.sample_format,
        bits = spec.bits_per_sample,
        "Decoding WAV input"
    );

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .filter_map(|s| s.ok())
            .map(|s| s as f32 / 32768.0)
            .collect(),
        (hound::SampleFormat::Int, 32) => reader
            .into_samples::<i32>()
            .filter_map(|s| s.ok())
            .map(|s| s as f32 / 2147483648.0)
            .collect(),
        (hound::SampleFormat::Float, 32) => {
            reader.into_samples::<f32>().filter_map(|s| s.ok()).collect()
        }
        _ => anyhow::bail!(
            "Unsupported audio format: {:?} {}bit (expected 16/32-bit WAV)",
            spec.sample_format,
            spec.bits_per_sample
        ),
    };

    if samples.is_empty() {
        anyhow::bail!("Audio file contains no samples: {}", path.display());
    }

    let samples = mix_to_mono(samples, channels);

    let samples = if spec.sample_rate != WHISPER_SAMPLE_RATE {
        resample(&samples, spec.sample_rate, WHISPER_SAMPLE_RATE)
    } else {
        samples
    };

    Ok(samples)
}

fn mix_to_mono(samples: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }

    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Simple linear resampling; good enough for speech input.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    let ratio = from_rate as f64 / to_rate as f64;
    let new_len = (samples.len() as f64 / ratio) as usize;
    let mut result = Vec::with_capacity(new_len);

    for i in 0..new_len {
        let src_pos = i as f64 * ratio;
        let src_idx = src_pos as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let sample = if src_idx + 1 < samples.len() {
            samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
        } else if src_idx < samples.len() {
            samples[src_idx]
        } else {
            0.0
        };

        result.push(sample);
    }

    result
}
