//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Search term (matches name, neighborhood or services)
    #[arg(default_value = "")]
    pub term: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Browse command arguments.
#[derive(Debug, Args)]
pub struct BrowseCommand {
    /// Write the page to this file on every change instead of printing
    /// the list to stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Page command arguments.
#[derive(Debug, Args)]
pub struct PageCommand {
    /// Search term to pre-fill and apply
    #[arg(default_value = "")]
    pub term: String,

    /// Output file (defaults to `display.output_path`)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// JSON file to import
    pub file: PathBuf,

    /// Collection to import into (defaults to `source.collection`)
    #[arg(long)]
    pub collection: Option<String>,

    /// Remove documents not present in the file
    #[arg(long)]
    pub replace: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Feedback command arguments.
#[derive(Debug, Args)]
pub struct FeedbackCommand {
    /// First name
    #[arg(long)]
    pub first_name: Option<String>,

    /// Last name
    #[arg(long)]
    pub last_name: Option<String>,

    /// Send without name
    #[arg(short, long)]
    pub anonymous: bool,

    /// Facility the feedback is about
    #[arg(long)]
    pub unit: Option<String>,

    /// Feedback text
    #[arg(short, long)]
    pub message: String,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
    /// HTML cards
    Html,
}
