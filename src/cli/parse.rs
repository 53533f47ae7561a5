//! CLI parse: clap types for Vigil. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vigil CLI - Personal change monitoring
#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Track web fragments and flag when their observed value changes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Data directory holding the monitor database
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a new monitor
    Add {
        /// Page being watched
        url: String,
        /// CSS selector identifying the fragment of interest
        selector: String,
        /// User-facing label
        name: String,
    },
    /// List all monitors
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show monitor details
    Show {
        /// Monitor id
        id: u64,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Re-check a monitor's observed value
    Check {
        /// Monitor id (required unless --all is used)
        #[arg(required_unless_present = "all")]
        id: Option<u64>,
        /// Check every monitor
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
    /// Edit a monitor's fields
    Edit {
        /// Monitor id
        id: u64,
        /// Update the watched URL
        #[arg(long)]
        url: Option<String>,
        /// Update the CSS selector
        #[arg(long)]
        selector: Option<String>,
        /// Update the label
        #[arg(long)]
        name: Option<String>,
        /// Manually override the observed value (resets status to stable)
        #[arg(long)]
        value: Option<String>,
    },
    /// Delete a monitor
    Remove {
        /// Monitor id
        id: u64,
    },
    /// Suggest a CSS selector from an HTML snippet
    Suggest {
        /// HTML snippet to analyze
        #[arg(long, conflicts_with = "file")]
        html: Option<String>,
        /// Read the HTML snippet from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Assist provider to use (overrides config default)
        #[arg(long)]
        provider: Option<String>,
    },
    /// Summarize a monitor's latest change in one sentence
    Summarize {
        /// Monitor id
        id: u64,
        /// Assist provider to use (overrides config default)
        #[arg(long)]
        provider: Option<String>,
    },
}
