//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::address::PageAddress;

/// File-backed wiki CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: wiki.toml)
    #[arg(short = 'C', long, global = true, default_value = "wiki.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render a page to HTML on stdout
    #[command(visible_alias = "s")]
    Show {
        /// Page address, e.g. `physics/waves` (empty for the root)
        #[arg(default_value = "")]
        address: PageAddress,
    },

    /// Print the raw source of a page
    #[command(visible_alias = "e")]
    Edit {
        #[arg(default_value = "")]
        address: PageAddress,
    },

    /// Write page content from a file or stdin
    Save {
        address: PageAddress,

        /// Move the page to this address before writing
        #[arg(long)]
        to: Option<PageAddress>,

        /// Read content from this file instead of stdin
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Delete a page
    #[command(visible_alias = "rm")]
    Delete { address: PageAddress },

    /// List the page tree with titles
    #[command(visible_alias = "t")]
    Tree {
        #[arg(default_value = "")]
        address: PageAddress,

        /// Print JSON instead of an indented listing
        #[arg(short, long)]
        json: bool,
    },

    /// Typeset a page to PDF
    Pdf {
        address: PageAddress,

        /// Output file (default: `<slug>.pdf`)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Report which toolchain programs are available
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_and_version_flags() {
        let cli = Cli::try_parse_from(["tola-wiki", "show", "a", "-v"]).unwrap();
        assert!(cli.verbose);

        let err = Cli::try_parse_from(["tola-wiki", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_parse_save() {
        let cli = Cli::try_parse_from([
            "tola-wiki", "-C", "site/wiki.toml", "save", "a/b", "--to", "c", "-f", "page.md",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("site/wiki.toml"));
        match cli.command {
            Commands::Save { address, to, file } => {
                assert_eq!(address.as_str(), "a/b");
                assert_eq!(to.map(|t| t.as_str().to_string()), Some("c".to_string()));
                assert_eq!(file, Some(PathBuf::from("page.md")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_root_default_and_bad_address() {
        let cli = Cli::try_parse_from(["tola-wiki", "tree"]).unwrap();
        assert!(matches!(cli.command, Commands::Tree { ref address, json: false } if address.is_root()));

        assert!(Cli::try_parse_from(["tola-wiki", "show", "a//b"]).is_err());
        assert!(Cli::try_parse_from(["tola-wiki", "show", "a/_"]).is_err());
    }
}
