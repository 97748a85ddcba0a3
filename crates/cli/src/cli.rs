use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use prpm_canonical::{Format, Subtype};

/// Render target: one format, or every format with a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    One(Format),
}

impl FromStr for Target {
    type Err = prpm_canonical::CanonicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Target::All);
        }
        s.parse().map(Target::One)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::All => f.write_str("all"),
            Target::One(format) => write!(f, "{format}"),
        }
    }
}

/// Command-line interface for `prpm-convert`.
#[derive(Debug, Parser)]
#[command(
    name = "prpm-convert",
    version,
    about = "Convert AI assistant rules, agents and prompts between editor formats"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Converts a file into another format.
    Convert {
        /// Source file.
        file: PathBuf,
        /// Source format. Sniffed from the content when omitted.
        #[arg(long, value_name = "FORMAT")]
        from: Option<Format>,
        /// Target format, or `all`.
        #[arg(long, value_name = "FORMAT")]
        to: Target,
        /// Subtype hint, overriding frontmatter markers.
        #[arg(long)]
        subtype: Option<Subtype>,
        /// TOML file with per-format conversion options.
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,
        /// Package id recorded on the parsed package.
        #[arg(long, default_value = "local")]
        id: String,
        /// Package name. Defaults to the frontmatter name or the file stem.
        #[arg(long)]
        name: Option<String>,
        /// Writes the converted content here instead of stdout (single target only).
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Prints full conversion results as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Sniffs the format and subtype of a file.
    Detect {
        file: PathBuf,
        /// Prints the parsed canonical package as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Maps between legacy type strings and `(format, subtype)` pairs.
    Taxonomy {
        /// Legacy type to split, e.g. `claude-skill`.
        #[arg(conflicts_with_all = ["format", "subtype"], required_unless_present = "format")]
        legacy: Option<String>,
        #[arg(long)]
        format: Option<Format>,
        #[arg(long, requires = "format")]
        subtype: Option<Subtype>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_convert_to_all() {
        let cli = Cli::parse_from(["prpm-convert", "convert", "rule.mdc", "--from", "cursor", "--to", "all"]);
        match cli.command {
            Commands::Convert { from, to, .. } => {
                assert_eq!(from, Some(Format::Cursor));
                assert_eq!(to, Target::All);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_target() {
        assert!(Cli::try_parse_from(["prpm-convert", "convert", "x.md", "--to", "vim"]).is_err());
    }

    #[test]
    fn taxonomy_accepts_either_form() {
        assert!(Cli::try_parse_from(["prpm-convert", "taxonomy", "claude-skill"]).is_ok());
        assert!(Cli::try_parse_from([
            "prpm-convert",
            "taxonomy",
            "--format",
            "claude",
            "--subtype",
            "skill"
        ])
        .is_ok());
        assert!(Cli::try_parse_from(["prpm-convert", "taxonomy"]).is_err());
    }
}
