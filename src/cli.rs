//! CLI interface for agri-advisor.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod config;
pub mod recommend;
pub mod serve;

/// agri-advisor: crop recommendations from soil and weather readings.
#[derive(Parser)]
#[command(name = "agri-advisor")]
#[command(about = "Crop recommendations from soil and weather readings", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Runs the HTTP service.
    Serve(serve::ServeCommand),
    /// Requests one recommendation and prints the JSON response.
    Recommend(recommend::RecommendCommand),
    /// Configuration inspection.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(cmd) => cmd.execute().await,
            Commands::Recommend(cmd) => cmd.execute().await,
            Commands::Config(cmd) => cmd.execute(),
        }
    }
}
