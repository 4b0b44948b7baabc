//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "echowalk", version, about = "Obstacle alert engine replay tool")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/echowalk.toml")]
    pub config: PathBuf,

    /// Print utterances and logs as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded geometry-event scenario through the engine
    Replay {
        /// Scenario CSV (strict header)
        #[arg(long, value_name = "FILE")]
        scenario: PathBuf,
        /// Run on the wall clock with the threaded runtime instead of simulated time
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
        /// Simulated speaking time per character
        #[arg(long, value_name = "MS", default_value_t = 60)]
        speech_ms_per_char: u64,
        /// Keep running this long after the last event
        #[arg(long, value_name = "MS", default_value_t = 4000)]
        tail_ms: u64,
        /// Inject an ordinary utterance at a time offset, e.g. `1500:Turn left`
        #[arg(long, value_name = "MS:TEXT", value_parser = parse_say)]
        say: Vec<(u64, String)>,
    },
    /// Load and validate the config, then print the effective values
    CheckConfig,
}

fn parse_say(s: &str) -> Result<(u64, String), String> {
    let (ms, text) = s
        .split_once(':')
        .ok_or_else(|| format!("expected MS:TEXT, got '{s}'"))?;
    let ms = ms
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid time offset '{ms}': {e}"))?;
    let text = text.trim();
    if text.is_empty() {
        return Err("utterance text must not be empty".into());
    }
    Ok((ms, text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn say_parses_offset_and_text() {
        assert_eq!(parse_say("1500: Turn left").unwrap(), (1500, "Turn left".into()));
        assert_eq!(parse_say("0:a:b").unwrap(), (0, "a:b".into()));
    }

    #[test]
    fn say_rejects_malformed() {
        assert!(parse_say("Turn left").is_err());
        assert!(parse_say("x:Turn").is_err());
        assert!(parse_say("10:  ").is_err());
    }
}
