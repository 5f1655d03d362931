//! Google Gemini `generateContent` client implementation.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use super::{ProviderClient, ProviderKind, ProviderMetadata, ProviderSettings};
use crate::advisor::error::ProviderError;

/// Gemini request part.
#[derive(Serialize, Debug)]
struct Part {
    text: String,
}

/// Gemini request content block.
#[derive(Serialize, Debug)]
struct Content {
    parts: Vec<Part>,
}

/// Gemini request body.
#[derive(Serialize, Debug)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: String,
}

#[derive(Deserialize, Debug)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ResponseContent,
}

/// Gemini response; a missing or null `candidates` means no candidates.
#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    candidates: Vec<Candidate>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Candidate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Candidate>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    /// Endpoint without the `key` query parameter.
    endpoint: Url,
}

impl GeminiClient {
    /// Creates a new Gemini client.
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        super::require_api_key(ProviderKind::Gemini, &settings.api_key)?;
        let path = format!("v1beta/models/{}:generateContent", settings.model);
        let endpoint = super::join_endpoint(&settings.base_url, &path)?;
        debug!(endpoint = %endpoint, "Constructed Gemini API URL");

        Ok(Self {
            client: super::build_http_client(settings.timeout)?,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            endpoint,
        })
    }

    /// Gemini takes a single prompt part, so the persona leads the text.
    fn build_request(system_prompt: &str, user_prompt: &str) -> GeminiRequest {
        let text = if system_prompt.is_empty() {
            user_prompt.to_string()
        } else {
            format!("{system_prompt}\n\n{user_prompt}")
        };
        GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text }],
            }],
        }
    }

    fn authenticated_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("key", &self.api_key);
        url
    }
}

impl ProviderClient for GeminiClient {
    fn generate<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let request = Self::build_request(system_prompt, user_prompt);
            debug!(
                prompt_len = request.contents[0].parts[0].text.len(),
                "Built Gemini request payload"
            );

            info!(url = %self.endpoint, model = %self.model, "Sending request to Gemini API");

            let response = self
                .client
                .post(self.authenticated_url())
                .json(&request)
                .send()
                .await
                .map_err(|e| ProviderError::NetworkError(super::describe_reqwest_error(e)))?;

            let response = super::check_error_response(response).await?;
            let gemini_response: GeminiResponse =
                super::read_json_body(ProviderKind::Gemini, response).await?;

            debug!(
                candidate_count = gemini_response.candidates.len(),
                "Received Gemini API response"
            );

            let Some(candidate) = gemini_response.candidates.into_iter().next() else {
                return Err(ProviderError::NoCandidates("Gemini".to_string()));
            };

            let result = candidate
                .content
                .parts
                .into_iter()
                .next()
                .map(|part| part.text.trim().to_string())
                .ok_or_else(|| ProviderError::InvalidResponseFormat {
                    provider: "Gemini".to_string(),
                    detail: "candidate has no content parts".to_string(),
                });

            super::log_response_success(ProviderKind::Gemini, &result);
            result
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            kind: ProviderKind::Gemini,
            model: self.model.clone(),
            endpoint: self.endpoint.to_string(),
        }
    }
}
