//! Utility functions and helpers.

pub mod preflight;
pub mod settings;

pub use preflight::check_provider_credentials;
pub use settings::Settings;
