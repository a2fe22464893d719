//! CLI module - Command-line interface for earthlens
//!
//! This module provides a structured CLI using clap for argument parsing.

use clap::{Parser, Subcommand};

/// earthlens - geospatial lookup and aggregation API for the globe viewer
#[derive(Parser)]
#[command(name = "earthlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Print the effective configuration with credentials masked
    Config,

    /// Create a default config.toml in the working directory
    Init,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["earthlens"]);
        assert!(matches!(cli.command(), Commands::Serve));
    }

    #[test]
    fn test_parses_subcommands() {
        let cli = Cli::parse_from(["earthlens", "config"]);
        assert!(matches!(cli.command(), Commands::Config));

        let cli = Cli::parse_from(["earthlens", "daemon"]);
        assert!(matches!(cli.command(), Commands::Serve));
    }
}
