#![deny(missing_docs)]
//! The command-line protocol shared by the template binaries.
//!
//! Each binary plugs its [`Template`] into [`run`]:
//!
//! - `--version` prints the `version` field of the template manifest;
//! - `--manifest` prints the manifest JSON;
//! - `--example` prints the example Markdown;
//! - otherwise stdin (at most [`MAX_INPUT_SIZE`] bytes) is converted and the
//!   Typst source written to stdout.

/// Command-line arguments.
pub mod cli;
mod error;

pub use cli::{Action, CliArgs};
pub use error::{CliError, Result};

use clap::Parser;
use presto_typst::{Options, Template, convert_with_options};
use std::io::{Read, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Largest accepted input, in bytes.
pub const MAX_INPUT_SIZE: usize = 10 << 20;

/// Parses the process arguments and runs the protocol for `template`.
pub fn run(template: &dyn Template) -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose, args.quiet);

    match execute(template, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes logging on stderr; `RUST_LOG` overrides the flags.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    // Ignore error if a subscriber is already set (e.g. in tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runs one invocation against the real stdin and stdout.
pub fn execute(template: &dyn Template, args: &CliArgs) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.action() {
        Action::Version => {
            if let Some(version) = manifest_version(template.manifest()) {
                writeln!(out, "{version}")?;
            }
        }
        Action::Manifest => out.write_all(template.manifest().as_bytes())?,
        Action::Example => out.write_all(template.example().as_bytes())?,
        Action::Convert => {
            let options = match &args.config {
                Some(path) => load_options(path)?,
                None => Options::default(),
            };
            let input = read_input(std::io::stdin().lock(), MAX_INPUT_SIZE)?;
            tracing::debug!(bytes = input.len(), template = template.id(), "converting");
            let typst = convert_with_options(template, &input, &options);
            out.write_all(typst.as_bytes())?;
        }
    }

    out.flush()?;
    Ok(())
}

/// `version` from manifest JSON; strings print without quotes.
pub fn manifest_version(manifest: &str) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(manifest) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("manifest is not valid JSON: {err}");
            return None;
        }
    };

    match value.get("version")? {
        serde_json::Value::String(version) => Some(version.clone()),
        other => Some(other.to_string()),
    }
}

/// Reads at most `limit` bytes of UTF-8; one byte more is an error.
pub fn read_input(reader: impl Read, limit: usize) -> Result<String> {
    let mut buffer = Vec::new();
    reader.take(limit as u64 + 1).read_to_end(&mut buffer)?;
    if buffer.len() > limit {
        return Err(CliError::InputTooLarge { limit });
    }
    Ok(String::from_utf8(buffer)?)
}

/// Loads rendering options from a JSON file.
pub fn load_options(path: &Path) -> Result<Options> {
    let config_error = |message: String| CliError::Config {
        path: path.to_path_buf(),
        message,
    };
    let text = std::fs::read_to_string(path).map_err(|err| config_error(err.to_string()))?;
    let options = serde_json::from_str(&text).map_err(|err| config_error(err.to_string()))?;
    tracing::debug!(path = %path.display(), "loaded options");
    Ok(options)
}
