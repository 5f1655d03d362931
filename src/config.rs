//! Service configuration.
//!
//! Values resolve in this order: command-line flag, environment variable,
//! `settings.json` fallback, built-in default. Resolution happens once at
//! startup and the result is immutable afterwards.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::advisor::adapter::{AdapterOptions, Strictness};
use crate::advisor::ai::{ProviderKind, ProviderSettings, DEFAULT_REQUEST_TIMEOUT};
use crate::utils::preflight::check_provider_credentials;
use crate::utils::settings::Settings;

/// Port used when neither `--port` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 8009;

/// Host used when neither `--host` nor `HOST` is set.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Startup configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No usable credential for the selected provider.
    #[error("{provider} API key not found.\nSet one of these environment variables:\n{vars}")]
    MissingCredential {
        /// Provider display name.
        provider: String,
        /// Bullet list of accepted variables.
        vars: String,
    },

    /// A configured value could not be parsed.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Flag or environment variable name.
        key: String,
        /// Raw value.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// How adapter errors reach the HTTP caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// HTTP 200 with the error text in `recommendations`.
    Embed,
    /// Validation errors map to 400, provider errors to 502.
    Status,
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embed => write!(f, "embed"),
            Self::Status => write!(f, "status"),
        }
    }
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "embed" => Ok(Self::Embed),
            "status" => Ok(Self::Status),
            other => Err(format!(
                "unknown error policy '{other}' (expected 'embed' or 'status')"
            )),
        }
    }
}

/// Command-line overrides; every field is optional.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Provider to call: openai or gemini [env: AGRI_PROVIDER].
    #[arg(long)]
    pub provider: Option<ProviderKind>,

    /// Model identifier [env: AGRI_MODEL].
    #[arg(long)]
    pub model: Option<String>,

    /// Provider API base URL [env: AGRI_BASE_URL].
    #[arg(long)]
    pub base_url: Option<String>,

    /// Seconds before a provider request times out [env: AGRI_TIMEOUT_SECS].
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Input checking: strict or lenient [env: AGRI_STRICTNESS].
    #[arg(long)]
    pub strictness: Option<Strictness>,

    /// Answer length hint in sentences, 0 disables [env: AGRI_SENTENCE_LIMIT].
    #[arg(long)]
    pub sentence_limit: Option<u32>,

    /// Adapter error handling: embed or status [env: AGRI_ERROR_POLICY].
    #[arg(long)]
    pub error_policy: Option<ErrorPolicy>,

    /// Interface to bind [env: HOST].
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on [env: PORT].
    #[arg(long)]
    pub port: Option<u16>,
}

/// Fully resolved service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Provider client construction parameters.
    pub provider: ProviderSettings,
    /// Adapter behaviour.
    pub adapter: AdapterOptions,
    /// Mapping of adapter errors to HTTP responses.
    pub error_policy: ErrorPolicy,
    /// Interface to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl ServiceConfig {
    /// Resolves configuration from flags, the process environment and the
    /// settings file.
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let settings = Settings::load()?;
        Ok(Self::resolve_with(overrides, |key| settings.get_env_var(key))?)
    }

    /// Resolves configuration against an arbitrary variable lookup.
    pub fn resolve_with<F>(overrides: &ConfigOverrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let kind = pick(overrides.provider, &lookup, "AGRI_PROVIDER")?
            .unwrap_or(ProviderKind::OpenAi);
        let api_key = check_provider_credentials(kind, &lookup)?;

        let model = overrides
            .model
            .clone()
            .or_else(|| lookup("AGRI_MODEL"))
            .unwrap_or_else(|| kind.default_model().to_string());

        let raw_base_url = overrides
            .base_url
            .clone()
            .or_else(|| lookup("AGRI_BASE_URL"))
            .unwrap_or_else(|| kind.default_base_url().to_string());
        let base_url = parse_base_url(&raw_base_url)?;

        let timeout = match pick(overrides.timeout_secs, &lookup, "AGRI_TIMEOUT_SECS")? {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    key: "AGRI_TIMEOUT_SECS".to_string(),
                    value: "0".to_string(),
                    reason: "timeout must be at least one second".to_string(),
                })
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let strictness = pick(overrides.strictness, &lookup, "AGRI_STRICTNESS")?
            .unwrap_or_else(|| default_strictness(kind));
        let sentence_limit = match pick(overrides.sentence_limit, &lookup, "AGRI_SENTENCE_LIMIT")? {
            Some(0) => None,
            Some(limit) => Some(limit),
            None => default_sentence_limit(kind),
        };
        let error_policy =
            pick(overrides.error_policy, &lookup, "AGRI_ERROR_POLICY")?.unwrap_or(ErrorPolicy::Embed);

        let host = overrides
            .host
            .clone()
            .or_else(|| lookup("HOST"))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = pick(overrides.port, &lookup, "PORT")?.unwrap_or(DEFAULT_PORT);

        Ok(Self {
            provider: ProviderSettings {
                kind,
                api_key,
                model,
                base_url,
                timeout,
            },
            adapter: AdapterOptions {
                strictness,
                sentence_limit,
            },
            error_policy,
            host,
            port,
        })
    }

    /// Configuration summary with the credential left out.
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "provider": self.provider.kind.to_string(),
            "model": self.provider.model,
            "base_url": self.provider.base_url.as_str(),
            "timeout_secs": self.provider.timeout.as_secs(),
            "strictness": self.adapter.strictness.to_string(),
            "sentence_limit": self.adapter.sentence_limit,
            "error_policy": self.error_policy,
            "host": self.host,
            "port": self.port,
        })
    }
}

/// Flag value if given, otherwise the parsed environment value.
fn pick<T, F>(flag: Option<T>, lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    if flag.is_some() {
        return Ok(flag);
    }
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: "AGRI_BASE_URL".to_string(),
        value: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https".to_string()));
    }
    Ok(url)
}

fn default_strictness(kind: ProviderKind) -> Strictness {
    match kind {
        ProviderKind::OpenAi => Strictness::Strict,
        ProviderKind::Gemini => Strictness::Lenient,
    }
}

fn default_sentence_limit(kind: ProviderKind) -> Option<u32> {
    match kind {
        ProviderKind::OpenAi => None,
        ProviderKind::Gemini => Some(6),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn openai_defaults() {
        let config =
            ServiceConfig::resolve_with(&ConfigOverrides::default(), env(&[("OPENAI_API_KEY", "sk")]))
                .unwrap();
        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert_eq!(config.provider.model, "gpt-3.5-turbo");
        assert_eq!(config.provider.base_url.as_str(), "https://api.openai.com/");
        assert_eq!(config.provider.timeout, Duration::from_secs(30));
        assert_eq!(config.adapter.strictness, Strictness::Strict);
        assert_eq!(config.adapter.sentence_limit, None);
        assert_eq!(config.error_policy, ErrorPolicy::Embed);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8009);
    }

    #[test]
    fn gemini_defaults() {
        let config = ServiceConfig::resolve_with(
            &ConfigOverrides::default(),
            env(&[("AGRI_PROVIDER", "gemini"), ("GEMINI_API_KEY", "AIza")]),
        )
        .unwrap();
        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert_eq!(config.provider.api_key, "AIza");
        assert_eq!(config.provider.model, "gemini-pro");
        assert_eq!(config.adapter.strictness, Strictness::Lenient);
        assert_eq!(config.adapter.sentence_limit, Some(6));
    }

    #[test]
    fn flags_beat_environment() {
        let overrides = ConfigOverrides {
            provider: Some(ProviderKind::OpenAi),
            port: Some(9000),
            timeout_secs: Some(5),
            ..Default::default()
        };
        let config = ServiceConfig::resolve_with(
            &overrides,
            env(&[
                ("AGRI_PROVIDER", "gemini"),
                ("OPENAI_API_KEY", "sk"),
                ("PORT", "7000"),
                ("AGRI_TIMEOUT_SECS", "60"),
            ]),
        )
        .unwrap();
        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert_eq!(config.port, 9000);
        assert_eq!(config.provider.timeout, Duration::from_secs(5));
    }

    #[test]
    fn environment_values_are_parsed() {
        let config = ServiceConfig::resolve_with(
            &ConfigOverrides::default(),
            env(&[
                ("OPENAI_API_KEY", "sk"),
                ("PORT", "8123"),
                ("AGRI_STRICTNESS", "lenient"),
                ("AGRI_SENTENCE_LIMIT", "4"),
                ("AGRI_ERROR_POLICY", "status"),
                ("AGRI_BASE_URL", "http://127.0.0.1:9999"),
            ]),
        )
        .unwrap();
        assert_eq!(config.port, 8123);
        assert_eq!(config.adapter.strictness, Strictness::Lenient);
        assert_eq!(config.adapter.sentence_limit, Some(4));
        assert_eq!(config.error_policy, ErrorPolicy::Status);
        assert_eq!(config.provider.base_url.as_str(), "http://127.0.0.1:9999/");
    }

    #[test]
    fn zero_sentence_limit_disables_hint() {
        let config = ServiceConfig::resolve_with(
            &ConfigOverrides::default(),
            env(&[
                ("AGRI_PROVIDER", "gemini"),
                ("GOOGLE_API_KEY", "k"),
                ("AGRI_SENTENCE_LIMIT", "0"),
            ]),
        )
        .unwrap();
        assert_eq!(config.adapter.sentence_limit, None);
    }

    #[test]
    fn missing_credential_fails() {
        let err = ServiceConfig::resolve_with(&ConfigOverrides::default(), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));

        let err = ServiceConfig::resolve_with(
            &ConfigOverrides::default(),
            env(&[("OPENAI_API_KEY", "")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn invalid_values_are_reported() {
        for (key, value) in [
            ("PORT", "eighty"),
            ("AGRI_PROVIDER", "bedrock"),
            ("AGRI_TIMEOUT_SECS", "0"),
            ("AGRI_BASE_URL", "ftp://example.com"),
            ("AGRI_BASE_URL", "not a url"),
        ] {
            let err = ServiceConfig::resolve_with(
                &ConfigOverrides::default(),
                env(&[("OPENAI_API_KEY", "sk"), (key, value)]),
            )
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { .. }),
                "{key}={value} gave {err}"
            );
        }
    }

    #[test]
    fn summary_omits_key() {
        let config = ServiceConfig::resolve_with(
            &ConfigOverrides::default(),
            env(&[("OPENAI_API_KEY", "sk-very-secret")]),
        )
        .unwrap();
        let summary = config.redacted_summary().to_string();
        assert!(!summary.contains("sk-very-secret"));
        assert!(summary.contains("\"provider\":\"openai\""));
    }
}
