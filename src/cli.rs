//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Convert a word processor web export into an email-safe html body
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Config file path (default: docs2email.toml)
    #[arg(short = 'C', long, default_value = "docs2email.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Convert an export archive and write the email body and its assets
    Convert {
        /// The zip archive produced by the "web page" export
        archive: PathBuf,

        /// Output directory path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minify the html content
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        minify: Option<bool>,
    },

    /// List archive entries and report which one is the document
    Inspect {
        /// The zip archive to look into
        archive: PathBuf,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_convert(&self) -> bool {
        matches!(self.command, Commands::Convert { .. })
    }
    pub const fn is_inspect(&self) -> bool {
        matches!(self.command, Commands::Inspect { .. })
    }
}
