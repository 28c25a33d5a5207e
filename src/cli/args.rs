//! CLI argument definitions using clap

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Idempotent XML store for SportIdent punches
#[derive(Parser, Debug)]
#[command(name = "sixml")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Store file (default from config: punches.xml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Expected competition name
    #[arg(short, long, global = true)]
    pub name: Option<OsString>,

    /// Write the XML on a single line
    #[arg(long, global = true)]
    pub no_pretty: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the store if missing and show its competition
    Init,

    /// Record a punch
    Punch {
        /// SI station number
        station: OsString,
        /// SI card number
        card: OsString,
        /// Punch time (default: now, "%Y-%m-%d %H:%M:%S")
        time: Option<OsString>,
        /// Extra element below the punch, as TAG=TEXT (repeatable)
        #[arg(short, long = "info", value_name = "TAG=TEXT")]
        info: Vec<OsString>,
    },

    /// Print the store as XML
    Dump,

    /// Show stations, cards and punches as a tree
    Tree,

    /// Show competition name and entity counts
    Info,

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
    /// Print effective settings as TOML
    Show,
    /// Print config file locations
    Path,
}
