//! Command-line interface for healthdir.
//!
//! This module provides the CLI structure for the `healthdir` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    BrowseCommand, ConfigCommand, FeedbackCommand, ImportCommand, ListCommand, OutputFormat,
    PageCommand, StatusCommand,
};

/// healthdir - Find health-care facilities
///
/// Loads the facility directory once, then filters it by name,
/// neighborhood or service and renders the matches as cards.
#[derive(Debug, Parser)]
#[command(name = "healthdir")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the directory and print the matching facilities
    List(ListCommand),

    /// Search interactively; each line read from stdin is a new search
    Browse(BrowseCommand),

    /// Write the full HTML page
    Page(PageCommand),

    /// Import JSON documents into the local database
    Import(ImportCommand),

    /// Show data source and dataset status
    Status(StatusCommand),

    /// Submit feedback
    Feedback(FeedbackCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn status_cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "healthdir");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;
        assert_eq!(status_cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(status_cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(status_cli(3, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_list_defaults() {
        let cli = Cli::try_parse_from(["healthdir", "list"]).unwrap();
        let Command::List(cmd) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(cmd.term, "");
        assert_eq!(cmd.format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_list_with_term_and_format() {
        let cli =
            Cli::try_parse_from(["healthdir", "list", "vacina", "--format", "json"]).unwrap();
        let Command::List(cmd) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(cmd.term, "vacina");
        assert_eq!(cmd.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_browse_output() {
        let cli = Cli::try_parse_from(["healthdir", "browse", "-o", "out.html"]).unwrap();
        let Command::Browse(cmd) = cli.command else {
            panic!("expected browse");
        };
        assert_eq!(cmd.output, Some(PathBuf::from("out.html")));
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::try_parse_from([
            "healthdir",
            "import",
            "unidades.json",
            "--collection",
            "outra",
            "--replace",
        ])
        .unwrap();
        let Command::Import(cmd) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(cmd.file, PathBuf::from("unidades.json"));
        assert_eq!(cmd.collection.as_deref(), Some("outra"));
        assert!(cmd.replace);
    }

    #[test]
    fn test_parse_feedback_requires_message() {
        assert!(Cli::try_parse_from(["healthdir", "feedback", "--anonymous"]).is_err());

        let cli = Cli::try_parse_from(["healthdir", "feedback", "-a", "-m", "Ótimo"]).unwrap();
        let Command::Feedback(cmd) = cli.command else {
            panic!("expected feedback");
        };
        assert!(cmd.anonymous);
        assert_eq!(cmd.message, "Ótimo");
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from(["healthdir", "config", "validate", "-f", "c.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["healthdir", "-c", "/custom/config.toml", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(["healthdir", "-q", "status", "--json"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: true })));
    }
}
