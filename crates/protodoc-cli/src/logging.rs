//! Diagnostic logging (`tracing` → stderr).
//!
//! stdout carries tool output, and in plugin mode the binary
//! `CodeGeneratorResponse`, so every log line goes to stderr.
//!
//! Level: `info` by default, `-v` debug, `-vv` trace, `-q` warn. `RUST_LOG`
//! overrides all of them.

use clap::{Args, ValueEnum};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// More diagnostics (`-v` debug, `-vv` trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable ANSI colours in log output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,
}

impl LogArgs {
    pub fn level(&self) -> Level {
        if self.quiet {
            return Level::WARN;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()))
}

/// Install the global subscriber. Call once, from `main`.
pub fn init_logging(args: &LogArgs) {
    let filter = env_filter(args.level());
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let result = match args.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact().with_ansi(!args.no_color))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_ansi(!args.no_color))
            .try_init(),
    };
    if let Err(err) = result {
        eprintln!("logging already initialised: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        log: LogArgs,
    }

    #[test]
    fn verbosity_maps_to_levels() {
        let parse = |args: &[&str]| Harness::parse_from(args).log.level();
        assert_eq!(parse(&["t"]), Level::INFO);
        assert_eq!(parse(&["t", "-v"]), Level::DEBUG);
        assert_eq!(parse(&["t", "-vv"]), Level::TRACE);
        assert_eq!(parse(&["t", "-q"]), Level::WARN);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Harness::try_parse_from(["t", "-q", "-v"]).is_err());
    }
}
