//! CLI argument definitions using clap

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// memoscribe - transcribe a voice memo, optionally summarize it with Gemini
///
/// Prints exactly one result payload to stdout: the generated summary, the raw
/// transcript, or a fixed error marker. Diagnostics go to stderr.
#[derive(Parser, Debug)]
#[command(name = "memoscribe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the audio file to transcribe (WAV)
    pub audio_file: PathBuf,

    /// Summarize the transcript with Gemini (overrides the config file)
    #[arg(long = "enable-gemini", value_name = "BOOL", action = ArgAction::Set)]
    pub enable_gemini: Option<bool>,

    /// Gemini API key (overrides config file and MEMOSCRIBE_GEMINI_API_KEY)
    #[arg(long = "gemini-api-key", value_name = "KEY")]
    pub gemini_api_key: Option<String>,

    /// Enable verbose diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Flags this tool recognizes. Anything else arriving as a flag token is
/// dropped before parsing: callers may pass flags meant for other tools and
/// the contract is to ignore them, not to fail.
const KNOWN_FLAGS: &[&str] = &[
    "--enable-gemini",
    "--gemini-api-key",
    "--verbose",
    "-v",
    "--help",
    "-h",
    "--version",
    "-V",
];

impl Cli {
    /// Parse argv, silently ignoring unrecognized flags.
    pub fn parse_lenient<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = String>,
    {
        Self::try_parse_from(filter_known_args(args))
    }
}

/// Keep the program name, positional arguments, known flags (with their
/// values), and drop every other flag token.
fn filter_known_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut kept = Vec::new();
    let mut keep_next_value = false;

    for (i, arg) in args.into_iter().enumerate() {
        if i == 0 || keep_next_value || !arg.starts_with('-') {
            keep_next_value = false;
            kept.push(arg);
            continue;
        }

        let name = arg.split('=').next().unwrap_or(arg.as_str());
        if KNOWN_FLAGS.contains(&name) {
            // A value-taking flag without an inline `=` consumes the next token.
            keep_next_value = !arg.contains('=')
                && matches!(name, "--enable-gemini" | "--gemini-api-key");
            kept.push(arg);
        }
    }

    kept
}
