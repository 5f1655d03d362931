//! Provider and recommendation error handling.

use thiserror::Error;

use super::ai::ProviderKind;

/// Errors raised by a provider client.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// API key missing or empty at construction time.
    #[error("{provider} API key not found. Set {env_hint} environment variable")]
    ApiKeyNotFound {
        /// Provider display name.
        provider: String,
        /// Environment variables that may carry the key.
        env_hint: String,
    },

    /// Provider answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    ApiRequestFailed {
        /// HTTP status line.
        status: reqwest::StatusCode,
        /// Response body, possibly empty.
        body: String,
    },

    /// Connection, timeout or body-read failure.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response body could not be decoded into the expected shape.
    #[error("Invalid response format from {provider} API: {detail}")]
    InvalidResponseFormat {
        /// Provider display name.
        provider: String,
        /// Decoder or extraction failure.
        detail: String,
    },

    /// Response decoded but carried zero choices or candidates.
    #[error("{0} returned no choices")]
    NoCandidates(String),
}

impl ProviderError {
    /// Returns true for failures below the response-shape layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ApiRequestFailed { .. } | Self::NetworkError(_))
    }
}

/// Failed outcome of [`RecommendationAdapter::generate_recommendations`].
///
/// `Display` yields the exact strings callers of the service have always
/// received in the `recommendations` field.
///
/// [`RecommendationAdapter::generate_recommendations`]: super::RecommendationAdapter::generate_recommendations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendationError {
    /// Strict mode only: an input was not a JSON object.
    #[error("Error: soil_data and weather_data must be dictionaries")]
    NotMappings,

    /// `ph` or `temperature` missing; the wording depends on the provider.
    #[error("{}", .0.missing_fields_message())]
    MissingFields(ProviderKind),

    /// Transport-level provider failure.
    #[error("{prefix}: {message}")]
    Transport {
        /// Provider-specific tag, e.g. `API Error`.
        prefix: String,
        /// Underlying error text.
        message: String,
    },

    /// Unexpected response shape or other processing failure.
    #[error("Processing Error: {0}")]
    Processing(String),

    /// Provider returned no choices or candidates.
    #[error("No response from {0} model.")]
    NoResponse(String),
}

impl RecommendationError {
    /// Returns true when the inputs were rejected before any provider call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::NotMappings | Self::MissingFields(_))
    }
}
