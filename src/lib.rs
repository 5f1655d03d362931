//! # agri-advisor
//!
//! Forwards soil and weather readings to a generative-language provider and
//! returns agronomic recommendations over HTTP.
//!
//! ## Features
//!
//! - One service, pluggable provider (OpenAI chat completions or Gemini)
//! - Request validation with configurable strictness
//! - Tagged recommendation results mapped to HTTP explicitly at the boundary
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agri_advisor::config::ServiceConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ServiceConfig::resolve(&Default::default())?;
//! agri_advisor::server::serve(config).await
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod advisor;
pub mod cli;
pub mod config;
pub mod data;
pub mod server;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of agri-advisor.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
