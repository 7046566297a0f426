//! Invocation settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cli::Cli;
use crate::transcription::ComputeDevice;

/// Environment variable consulted when no API key is configured elsewhere.
pub const GEMINI_API_KEY_ENV: &str = "MEMOSCRIBE_GEMINI_API_KEY";

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whisper transcription settings
    #[serde(default)]
    pub whisper: WhisperSettings,

    /// LLM summarization settings
    #[serde(default)]
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperSettings {
    /// Whisper model size identifier (tiny, base, small, medium, large-v3)
    #[serde(default = "default_model")]
    pub model: String,

    /// Directory where ggml model files are cached
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Language hint for transcription (empty = auto-detect)
    #[serde(default)]
    pub language: String,

    /// Enable translation to English
    #[serde(default)]
    pub translate: bool,

    /// Number of threads for inference (0 = auto)
    #[serde(default)]
    pub threads: u32,

    /// Compute device selection (auto, gpu, cpu)
    #[serde(default)]
    pub device: ComputeDevice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Whether to summarize the transcript with the LLM provider
    #[serde(default)]
    pub enabled: bool,

    /// LLM provider (gemini)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// API key for the provider
    #[serde(default)]
    pub api_key: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API endpoint override (empty = provider default)
    #[serde(default)]
    pub endpoint: String,
}

// Default value functions

fn default_models_dir() -> PathBuf {
    ProjectDirs::from("com", "memoscribe", "memoscribe")
        .map(|dirs| dirs.cache_dir().join("models"))
        .unwrap_or_else(|| PathBuf::from("~/.cache/memoscribe/models"))
}

fn default_model() -> String {
    "small".to_string()
}

fn default_llm_provider() -> String {
    "gemini".to_string()
}

fn default_llm_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Default for WhisperSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            models_dir: default_models_dir(),
            language: String::new(),
            translate: false,
            threads: 0,
            device: ComputeDevice::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_llm_provider(),
            api_key: String::new(),
            model: default_llm_model(),
            endpoint: String::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            whisper: WhisperSettings::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file, then apply environment
    /// overrides. The result is still subject to [`Settings::apply_cli`].
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            toml::from_str(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            tracing::debug!("No config file found, using defaults");
            Self::default()
        };

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if self.llm.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var(GEMINI_API_KEY_ENV) {
                if !key.trim().is_empty() {
                    self.llm.api_key = key;
                }
            }
        }
    }

    /// Apply CLI flag overrides. Flags win over both the config file and the
    /// environment.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(enabled) = cli.enable_gemini {
            self.llm.enabled = enabled;
        }
        if let Some(ref key) = cli.gemini_api_key {
            self.llm.api_key = key.clone();
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "memoscribe", "memoscribe")
            .context("Could not determine config directory")?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_to_small_whisper_and_disabled_gemini() {
        let settings = Settings::default();
        assert_eq!(settings.whisper.model, "small");
        assert_eq!(settings.llm.model, "gemini-2.5-flash");
        assert!(!settings.llm.enabled);
    }

    #[test]
    fn cli_flags_override_config() {
        let mut settings = Settings::default();
        settings.llm.api_key = "from-config".to_string();

        let cli = Cli::try_parse_from([
            "memoscribe",
            "memo.wav",
            "--enable-gemini=true",
            "--gemini-api-key=from-cli",
        ])
        .unwrap();

        settings.apply_cli(&cli);
        assert!(settings.llm.enabled);
        assert_eq!(settings.llm.api_key, "from-cli");
    }

    #[test]
    fn absent_cli_flags_leave_config_untouched() {
        let mut settings = Settings::default();
        settings.llm.enabled = true;
        settings.llm.api_key = "from-config".to_string();

        let cli = Cli::try_parse_from(["memoscribe", "memo.wav"]).unwrap();

        settings.apply_cli(&cli);
        assert!(settings.llm.enabled);
        assert_eq!(settings.llm.api_key, "from-config");
    }

    #[test]
    fn parses_partial_config_file() {
        let settings: Settings =
            toml::from_str("[whisper]\nmodel = \"tiny\"\n\n[llm]\nenabled = true\n").unwrap();
        assert_eq!(settings.whisper.model, "tiny");
        assert!(settings.llm.enabled);
        // Unspecified fields fall back to defaults.
        assert_eq!(settings.llm.provider, "gemini");
    }

}
