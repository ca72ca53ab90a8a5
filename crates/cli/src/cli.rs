//! Command-line arguments shared by every template binary.

use clap::Parser;
use std::path::PathBuf;

/// Arguments of a template binary.
///
/// Without a flag the binary converts Markdown on stdin to Typst on stdout.
#[derive(Parser, Debug, Default)]
#[command(about = "Convert Markdown on stdin to Typst on stdout", long_about = None)]
pub struct CliArgs {
    /// Print the template manifest JSON.
    #[arg(long)]
    pub manifest: bool,

    /// Print an example Markdown document.
    #[arg(long)]
    pub example: bool,

    /// Print the template version from its manifest.
    #[arg(long)]
    pub version: bool,

    /// JSON file with rendering options.
    #[arg(short, long, env = "PRESTO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// What a single invocation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `--version`.
    Version,
    /// `--manifest`.
    Manifest,
    /// `--example`.
    Example,
    /// Read stdin, write Typst.
    Convert,
}

impl CliArgs {
    /// Resolves the flags; `--version` wins over `--manifest`, which wins
    /// over `--example`.
    pub fn action(&self) -> Action {
        if self.version {
            Action::Version
        } else if self.manifest {
            Action::Manifest
        } else if self.example {
            Action::Example
        } else {
            Action::Convert
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_protocol_flags() {
        let args = CliArgs::parse_from(["gongwen", "--manifest", "--example"]);
        assert_eq!(args.action(), Action::Manifest);

        let args = CliArgs::parse_from(["gongwen", "--example", "--version"]);
        assert_eq!(args.action(), Action::Version);

        let args = CliArgs::parse_from(["gongwen"]);
        assert_eq!(args.action(), Action::Convert);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(CliArgs::try_parse_from(["gongwen", "-v", "-q"]).is_err());
    }
}
