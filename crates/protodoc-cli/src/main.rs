//! Protodoc CLI
//!
//! Recovers the documentation of protobuf declarations from descriptor
//! source info:
//! - `associate`: descriptor set / request (JSON or binary) → documented tree JSON
//! - `plugin`: the same, speaking the `protoc` plugin protocol on stdin/stdout
//! - `scrub`: clean one raw comment (handy when checking comment formatting)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use protodoc_deftree::{document_request, scrub};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

mod logging;
mod plugin;

#[derive(Parser)]
#[command(name = "protodoc")]
#[command(
    author,
    version,
    about = "Protodoc: attach .proto comments to their declarations"
)]
struct Cli {
    #[command(flatten)]
    log: logging::LogArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the documentation tree for a descriptor set or plugin request.
    ///
    /// Accepts `buf build --as-file-descriptor-set` JSON, a JSON
    /// `CodeGeneratorRequest`, or their binary encodings
    /// (`protoc --include_source_info --descriptor_set_out`).
    Associate {
        /// Input descriptor (`-` for stdin).
        input: PathBuf,
        /// Only document these files (default: every file in a descriptor set,
        /// `file_to_generate` for a request).
        #[arg(long = "file")]
        files: Vec<String>,
        /// Output tree JSON (default: stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Also write the association report as JSON.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Pretty-print JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Run as a protoc plugin (request on stdin, response on stdout).
    Plugin,

    /// Scrub a raw comment read from stdin.
    Scrub,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log);

    match cli.command {
        Commands::Associate {
            input,
            files,
            out,
            report,
            pretty,
        } => cmd_associate(&input, &files, out.as_deref(), report.as_deref(), pretty),
        Commands::Plugin => plugin::run_plugin(),
        Commands::Scrub => cmd_scrub(),
    }
}

fn read_input(input: &Path) -> Result<Vec<u8>> {
    if input == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read descriptor from stdin")?;
        return Ok(buf);
    }
    fs::read(input).with_context(|| format!("failed to read descriptor: {}", input.display()))
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

fn cmd_associate(
    input: &Path,
    files: &[String],
    out: Option<&Path>,
    report_out: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let bytes = read_input(input)?;
    let request = protodoc_descriptor::load_request(&bytes, files)
        .with_context(|| format!("failed to load descriptor: {}", input.display()))?;

    let (tree, report) = document_request(&request);
    tracing::info!(
        files = report.files,
        locations = report.locations,
        applied = report.applied,
        "comments associated"
    );

    let json = to_json(&tree, pretty)?;
    match out {
        Some(path) => {
            write_output(path, &json)?;
            eprintln!("  {} {}", "→".cyan(), path.display());
        }
        None => println!("{json}"),
    }

    if let Some(path) = report_out {
        write_output(path, &to_json(&report, true)?)?;
        eprintln!("  {} {}", "→".cyan(), path.display());
    }

    eprintln!(
        "  stats: files={} comments={} applied={} package={} unresolved={} misses={} errors={}",
        report.files,
        report.locations,
        report.applied,
        report.descriptions,
        report.unresolved,
        report.tree_misses,
        report.tree_errors
    );
    if report.tree_errors > 0 {
        eprintln!(
            "  {} {} comment(s) could not be written to the tree",
            "warning:".yellow().bold(),
            report.tree_errors
        );
    }
    Ok(())
}

fn cmd_scrub() -> Result<()> {
    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .context("failed to read comment from stdin")?;
    println!("{}", scrub(&raw));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn associate_subcommand_parses_repeated_files() {
        let cli = Cli::try_parse_from([
            "protodoc",
            "associate",
            "api.json",
            "--file",
            "a.proto",
            "--file",
            "b.proto",
            "--pretty",
            "-v",
        ])
        .expect("parse");
        assert_eq!(cli.log.verbose, 1);
        match cli.command {
            Commands::Associate { files, pretty, .. } => {
                assert_eq!(files, vec!["a.proto", "b.proto"]);
                assert!(pretty);
            }
            _ => panic!("expected associate"),
        }
    }
}
