//! `serve` command.

use anyhow::Result;
use clap::Parser;

use crate::config::{ConfigOverrides, ServiceConfig};

/// Runs the HTTP service until interrupted.
#[derive(Parser)]
pub struct ServeCommand {
    /// Configuration overrides.
    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

impl ServeCommand {
    /// Executes the serve command.
    pub async fn execute(self) -> Result<()> {
        let config = ServiceConfig::resolve(&self.overrides)?;
        crate::server::serve(config).await
    }
}
