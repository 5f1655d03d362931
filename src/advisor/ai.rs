//! Provider client trait and metadata definitions.

pub mod gemini;
pub mod openai;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::advisor::error::ProviderError;

/// Default HTTP request timeout for provider calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Supported generative-language providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI chat completions, bearer-token auth.
    OpenAi,
    /// Google Gemini `generateContent`, API key in the query string.
    Gemini,
}

impl ProviderKind {
    /// Human-readable provider name used in logs and messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Gemini",
        }
    }

    /// Environment variables consulted for the credential, in order.
    pub fn credential_vars(self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["OPENAI_API_KEY"],
            Self::Gemini => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
        }
    }

    /// Model used when none is configured.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-3.5-turbo",
            Self::Gemini => "gemini-pro",
        }
    }

    /// API base URL used when none is configured.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com",
            Self::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    /// Tag prefixed to transport failures in recommendation text.
    pub fn error_prefix(self) -> &'static str {
        match self {
            Self::OpenAi => "API Error",
            Self::Gemini => "Gemini API Error",
        }
    }

    /// Recommendation text when `ph` or `temperature` is missing.
    pub fn missing_fields_message(self) -> &'static str {
        match self {
            Self::OpenAi => {
                "Error: soil_data requires 'ph' and weather_data requires 'temperature'"
            }
            Self::Gemini => "Error: Missing required 'ph' or 'temperature'.",
        }
    }

    /// Title shown on the usage page.
    pub fn service_title(self) -> &'static str {
        match self {
            Self::OpenAi => "AgriGPT API",
            Self::Gemini => "AgriGemini API",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(format!(
                "unknown provider '{other}' (expected 'openai' or 'gemini')"
            )),
        }
    }
}

/// Everything needed to construct a provider client.
#[derive(Clone)]
pub struct ProviderSettings {
    /// Which provider to call.
    pub kind: ProviderKind,
    /// Credential; never logged.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// API base URL without the endpoint path.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Metadata about a provider client implementation.
#[derive(Clone, Debug)]
pub struct ProviderMetadata {
    /// Provider family.
    pub kind: ProviderKind,
    /// Model identifier.
    pub model: String,
    /// Endpoint the client posts to, without credentials.
    pub endpoint: String,
}

// ── Shared helpers for provider client implementations ──────────────

/// Builds an HTTP client with the given request timeout.
pub(crate) fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Rejects an empty credential before any client is built.
pub(crate) fn require_api_key(kind: ProviderKind, api_key: &str) -> Result<(), ProviderError> {
    if api_key.trim().is_empty() {
        return Err(ProviderError::ApiKeyNotFound {
            provider: kind.display_name().to_string(),
            env_hint: kind.credential_vars().join(" or "),
        });
    }
    Ok(())
}

/// Appends `path` to `base` regardless of a trailing slash on the base.
pub(crate) fn join_endpoint(base: &Url, path: &str) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
        .with_context(|| format!("Invalid endpoint path '{path}' for base URL {base}"))
}

/// Flattens a reqwest error and its causes into one line.
///
/// The request URL is stripped so query-string credentials never reach a
/// caller.
pub(crate) fn describe_reqwest_error(err: reqwest::Error) -> String {
    let err = err.without_url();
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Checks an HTTP response for error status and returns a structured error
/// if non-success.
pub(crate) async fn check_error_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|e| {
        tracing::debug!("Failed to read error response body: {e}");
        String::new()
    });
    Err(ProviderError::ApiRequestFailed { status, body })
}

/// Reads the full body, then decodes it.
///
/// A body that cannot be read is a network failure; a body that does not
/// decode is a shape failure.
pub(crate) async fn read_json_body<T: DeserializeOwned>(
    kind: ProviderKind,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ProviderError::NetworkError(describe_reqwest_error(e)))?;
    serde_json::from_slice(&bytes).map_err(|e| ProviderError::InvalidResponseFormat {
        provider: kind.display_name().to_string(),
        detail: e.to_string(),
    })
}

/// Logs successful text extraction from a provider response.
pub(crate) fn log_response_success(kind: ProviderKind, result: &Result<String, ProviderError>) {
    if let Ok(text) = result {
        tracing::debug!(
            response_len = text.len(),
            "Successfully extracted text content from {} API response",
            kind.display_name()
        );
        tracing::trace!(
            response_content = %text,
            "{} API response content",
            kind.display_name()
        );
    }
}

/// Trait for generative-language provider clients.
pub trait ProviderClient: Send + Sync {
    /// Sends one generation request and returns the generated text.
    fn generate<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;

    /// Returns metadata about the client implementation.
    fn metadata(&self) -> ProviderMetadata;
}

/// Builds the client for the configured provider.
///
/// Fails when the credential is empty or the HTTP client cannot be built.
pub fn create_provider_client(settings: &ProviderSettings) -> Result<Box<dyn ProviderClient>> {
    tracing::debug!(?settings, "Creating provider client");
    let client: Box<dyn ProviderClient> = match settings.kind {
        ProviderKind::OpenAi => Box::new(openai::OpenAiClient::new(settings)?),
        ProviderKind::Gemini => Box::new(gemini::GeminiClient::new(settings)?),
    };
    Ok(client)
}
