//! CLI module for memoscribe
//!
//! Contains argument parsing; the pipeline itself lives in [`crate::pipeline`].

pub mod args;

pub use args::Cli;
