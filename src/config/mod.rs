//! Configuration module for memoscribe
//!
//! Handles loading invocation settings from a TOML file, the environment,
//! and CLI flags. Settings are built once per invocation and passed
//! explicitly to the pipeline.

mod settings;

pub use settings::Settings;
