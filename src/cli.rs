use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::finding::Mode;

/// Report rendering formats
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable report, colorized on a terminal
    #[default]
    Pretty,
    /// Machine-readable JSON report
    Json,
    /// Number of nits only
    Count,
}

/// Validate Internet-Drafts and RFCs for structural and editorial nits
#[derive(Parser, Debug, Clone)]
#[command(name = "rfcnits")]
#[command(about = "Check an Internet-Draft or RFC (.txt or .xml) for nits")]
#[command(version)]
pub struct Cli {
    /// Document to validate (.txt or .xml)
    #[arg(help = "Path to the document to validate")]
    pub path: PathBuf,

    /// Validation mode
    #[arg(short = 'm', long = "mode", value_enum)]
    pub mode: Option<Mode>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum)]
    pub output: Option<OutputFormat>,

    /// Expected document year for date checks
    #[arg(long = "year")]
    pub year: Option<i32>,

    /// Skip all remote metadata lookups
    #[arg(long = "offline")]
    pub offline: bool,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.path.exists() {
            return Err(format!("Path does not exist: {}", self.path.display()));
        }
        if !self.path.is_file() {
            return Err(format!("Not a file: {}", self.path.display()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_cli_parsing() {
        let cli = Cli::try_parse_from(["rfcnits", "draft.txt"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("draft.txt"));
        assert_eq!(cli.mode, None);
        assert_eq!(cli.output, None);
        assert!(!cli.offline);
    }

    #[test]
    fn test_mode_and_output_parsing() {
        let cli = Cli::try_parse_from([
            "rfcnits",
            "--mode",
            "forgive-checklist",
            "--output",
            "json",
            "--offline",
            "rfc.xml",
        ])
        .unwrap();
        assert_eq!(cli.mode, Some(Mode::ForgiveChecklist));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert!(cli.offline);
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        let result = Cli::try_parse_from(["rfcnits", "--mode", "strict", "draft.txt"]);
        assert!(result.is_err());
    }
}
