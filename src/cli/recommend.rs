//! `recommend` command: one request without running the server.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::config::{ConfigOverrides, ServiceConfig};
use crate::server::{handle_recommend, AppState};

/// Sends one request body through the same handler the HTTP route uses.
#[derive(Parser)]
pub struct RecommendCommand {
    /// JSON file with `soil_data` and `weather_data`; `-` reads stdin.
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Configuration overrides.
    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

impl RecommendCommand {
    /// Executes the recommend command.
    pub async fn execute(self) -> Result<()> {
        let config = ServiceConfig::resolve(&self.overrides)?;
        let state = AppState::from_config(&config)?;
        let body = self.read_input()?;

        let (status, payload) = handle_recommend(&state, &body).await;
        let rendered =
            serde_json::to_string_pretty(&payload).context("Failed to render response")?;
        println!("{rendered}");

        if !status.is_success() {
            bail!("Request failed with HTTP {status}");
        }
        Ok(())
    }

    fn read_input(&self) -> Result<Vec<u8>> {
        if self.input.as_os_str() == "-" {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read request from stdin")?;
            return Ok(buffer);
        }
        std::fs::read(&self.input)
            .with_context(|| format!("Failed to read {}", self.input.display()))
    }
}
