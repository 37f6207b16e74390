//! CLI argument definitions using clap

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser, Subcommand, ValueEnum, ValueHint};

/// Inspect, search and convert atom trees stored as JSON or binary
#[derive(Parser, Debug)]
#[command(name = "atomtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Explicit config file (TOML)
    #[arg(short, long, global = true, env = "ATOMTREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// On-disk encoding of an atom document.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Binary,
}

impl Format {
    /// `.bin`/`.atom` files are binary, everything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") | Some("atom") => Format::Binary,
            _ => Format::Json,
        }
    }
}

/// Output encoding for `convert`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Pretty,
    Binary,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show atoms as a tree
    Show {
        /// Input document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Input encoding (default: by extension)
        #[arg(long, value_enum)]
        from: Option<Format>,
    },

    /// Re-encode a document
    Convert {
        /// Input document
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Output document
        #[arg(value_hint = ValueHint::FilePath)]
        output: PathBuf,
        /// Input encoding (default: by extension)
        #[arg(long, value_enum)]
        from: Option<Format>,
        /// Output encoding (default: by output extension)
        #[arg(long, value_enum)]
        to: Option<OutputFormat>,
    },

    /// Search atoms by id or type (whole tree, pre-order)
    #[command(group(ArgGroup::new("criteria").required(true).args(["id", "atom_type"])))]
    Find {
        /// Input document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Input encoding (default: by extension)
        #[arg(long, value_enum)]
        from: Option<Format>,
        /// Atom id
        #[arg(long)]
        id: Option<String>,
        /// Atom type
        #[arg(long = "type")]
        atom_type: Option<String>,
        /// All matches instead of the first (type search only)
        #[arg(long, requires = "atom_type")]
        all: bool,
    },

    /// Node count, depth and memory estimate
    Stats {
        /// Input document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Input encoding (default: by extension)
        #[arg(long, value_enum)]
        from: Option<Format>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print config template
    Template,

    /// Show config paths
    Path,
}
