//! Turns soil and weather readings into a provider recommendation.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::advisor::ai::{ProviderClient, ProviderMetadata};
use crate::advisor::error::{ProviderError, RecommendationError};
use crate::advisor::prompts;
use crate::data::{SoilData, WeatherData};

/// How strictly inputs are checked before the key-presence test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strictness {
    /// Non-object inputs get a dedicated type error.
    Strict,
    /// Non-object inputs simply fail the key-presence test.
    Lenient,
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for Strictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!(
                "unknown strictness '{other}' (expected 'strict' or 'lenient')"
            )),
        }
    }
}

/// Adapter behaviour that is not tied to the provider transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Input type checking level.
    pub strictness: Strictness,
    /// Optional answer-length hint rendered into the prompt.
    pub sentence_limit: Option<u32>,
}

/// Recommendation adapter over a single provider client.
pub struct RecommendationAdapter {
    /// Provider client implementation.
    ai_client: Box<dyn ProviderClient>,
    options: AdapterOptions,
}

impl RecommendationAdapter {
    /// Creates an adapter with the given provider client.
    pub fn new(ai_client: Box<dyn ProviderClient>, options: AdapterOptions) -> Self {
        Self { ai_client, options }
    }

    /// Returns metadata about the underlying provider client.
    pub fn metadata(&self) -> ProviderMetadata {
        self.ai_client.metadata()
    }

    /// Returns the adapter options.
    pub fn options(&self) -> AdapterOptions {
        self.options
    }

    /// Checks that the readings can be sent to the provider.
    pub fn validate(
        &self,
        soil: &Value,
        weather: &Value,
    ) -> Result<(SoilData, WeatherData), RecommendationError> {
        if self.options.strictness == Strictness::Strict
            && !(soil.is_object() && weather.is_object())
        {
            return Err(RecommendationError::NotMappings);
        }

        match (SoilData::from_value(soil), WeatherData::from_value(weather)) {
            (Some(soil), Some(weather)) => Ok((soil, weather)),
            _ => Err(RecommendationError::MissingFields(self.metadata().kind)),
        }
    }

    /// Generates recommendations for one soil/weather pair.
    ///
    /// Makes at most one provider call. Every failure comes back as a
    /// [`RecommendationError`]; nothing panics or propagates.
    pub async fn generate_recommendations(
        &self,
        soil: &Value,
        weather: &Value,
    ) -> Result<String, RecommendationError> {
        let (soil, weather) = self.validate(soil, weather).inspect_err(|e| {
            debug!(error = %e, "Rejected recommendation inputs");
        })?;

        let user_prompt =
            prompts::generate_user_prompt(&soil, &weather, self.options.sentence_limit);
        let metadata = self.ai_client.metadata();
        debug!(
            provider = metadata.kind.display_name(),
            model = %metadata.model,
            prompt_len = user_prompt.len(),
            "Requesting recommendations"
        );

        let started = Instant::now();
        let outcome = self
            .ai_client
            .generate(prompts::SYSTEM_PROMPT, &user_prompt)
            .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(text) => {
                info!(
                    provider = metadata.kind.display_name(),
                    elapsed_ms,
                    response_len = text.len(),
                    "Recommendations generated"
                );
                Ok(text)
            }
            Err(err) => {
                warn!(
                    provider = metadata.kind.display_name(),
                    elapsed_ms,
                    error = %err,
                    "Provider call failed"
                );
                Err(classify(&metadata, err))
            }
        }
    }
}

fn classify(metadata: &ProviderMetadata, err: ProviderError) -> RecommendationError {
    match err {
        ProviderError::NoCandidates(_) => {
            RecommendationError::NoResponse(metadata.kind.display_name().to_string())
        }
        err if err.is_transport() => RecommendationError::Transport {
            prefix: metadata.kind.error_prefix().to_string(),
            message: err.to_string(),
        },
        err => RecommendationError::Processing(err.to_string()),
    }
}
