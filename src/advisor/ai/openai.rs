//! OpenAI chat-completions client implementation.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use super::{ProviderClient, ProviderKind, ProviderMetadata, ProviderSettings};
use crate::advisor::error::ProviderError;

const CHAT_COMPLETIONS_PATH: &str = "v1/chat/completions";
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: i32 = 500;

/// OpenAI API request message.
#[derive(Serialize, Debug)]
struct Message {
    role: String,
    content: String,
}

/// OpenAI API request body.
#[derive(Serialize, Debug)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: i32,
}

/// OpenAI API response choice.
#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

/// OpenAI API response message.
#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: String,
}

/// OpenAI API response.
///
/// `choices` is required: a body without it is a shape error, an empty list
/// is a "no response".
#[derive(Deserialize, Debug)]
struct OpenAiResponse {
    choices: Vec<Choice>,
    model: Option<String>,
}

/// OpenAI chat-completions client.
pub struct OpenAiClient {
    /// HTTP client for API requests.
    client: Client,
    /// API key sent as a bearer token.
    api_key: String,
    /// Model identifier.
    model: String,
    /// Full chat-completions endpoint.
    endpoint: Url,
}

impl OpenAiClient {
    /// Creates a new OpenAI client.
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        super::require_api_key(ProviderKind::OpenAi, &settings.api_key)?;
        let endpoint = super::join_endpoint(&settings.base_url, CHAT_COMPLETIONS_PATH)?;
        debug!(endpoint = %endpoint, "Constructed OpenAI API URL");

        Ok(Self {
            client: super::build_http_client(settings.timeout)?,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            endpoint,
        })
    }

    fn build_request(&self, system_prompt: &str, user_prompt: &str) -> OpenAiRequest {
        let mut messages = Vec::new();
        if !system_prompt.is_empty() {
            messages.push(Message {
                role: "system".to_string(),
                content: system_prompt.to_string(),
            });
        }
        messages.push(Message {
            role: "user".to_string(),
            content: user_prompt.to_string(),
        });

        OpenAiRequest {
            model: self.model.clone(),
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

impl ProviderClient for OpenAiClient {
    fn generate<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let request = self.build_request(system_prompt, user_prompt);
            debug!(
                system_prompt_len = system_prompt.len(),
                user_prompt_len = user_prompt.len(),
                message_count = request.messages.len(),
                "Built OpenAI request payload"
            );

            info!(url = %self.endpoint, model = %self.model, "Sending request to OpenAI API");

            let response = self
                .client
                .post(self.endpoint.clone())
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| ProviderError::NetworkError(super::describe_reqwest_error(e)))?;

            let response = super::check_error_response(response).await?;
            let openai_response: OpenAiResponse =
                super::read_json_body(ProviderKind::OpenAi, response).await?;

            debug!(
                choice_count = openai_response.choices.len(),
                model = ?openai_response.model,
                "Received OpenAI API response"
            );

            let result = openai_response
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content.trim().to_string())
                .ok_or_else(|| ProviderError::NoCandidates("OpenAI".to_string()));

            super::log_response_success(ProviderKind::OpenAi, &result);
            result
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            kind: ProviderKind::OpenAi,
            model: self.model.clone(),
            endpoint: self.endpoint.to_string(),
        }
    }
}
