//! Shared test utilities for the `advisor` module.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use crate::advisor::ai::{ProviderClient, ProviderKind, ProviderMetadata};
use crate::advisor::error::ProviderError;

/// Mock provider client with a pre-programmed queue of responses.
///
/// Responses are returned in FIFO order. When the queue is exhausted,
/// subsequent calls return a network error.
///
/// Every call to [`generate`](ProviderClient::generate) records the
/// `(system_prompt, user_prompt)` pair. Use
/// [`prompt_handle`](Self::prompt_handle) to read them after the client has
/// been moved into a [`RecommendationAdapter`](super::RecommendationAdapter).
pub(crate) struct ConfigurableMockProviderClient {
    responses: Arc<Mutex<VecDeque<Result<String, ProviderError>>>>,
    metadata: ProviderMetadata,
    recorded_prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl ConfigurableMockProviderClient {
    /// Creates a new mock client that will return the given responses in order.
    pub(crate) fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            metadata: ProviderMetadata {
                kind: ProviderKind::OpenAi,
                model: "mock-model".to_string(),
                endpoint: "http://mock.invalid/v1/chat/completions".to_string(),
            },
            recorded_prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reports a different provider family in the metadata.
    pub(crate) fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.metadata.kind = kind;
        self
    }

    /// Returns a handle for inspecting which prompts were sent.
    pub(crate) fn prompt_handle(&self) -> PromptRecordHandle {
        PromptRecordHandle {
            recorded_prompts: self.recorded_prompts.clone(),
        }
    }
}

/// Shared handle to a mock client's recorded prompts.
pub(crate) struct PromptRecordHandle {
    recorded_prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl PromptRecordHandle {
    /// Returns all recorded `(system_prompt, user_prompt)` pairs.
    pub(crate) fn prompts(&self) -> Vec<(String, String)> {
        self.recorded_prompts.lock().unwrap().clone()
    }

    /// Returns the number of provider requests that were made.
    pub(crate) fn request_count(&self) -> usize {
        self.recorded_prompts.lock().unwrap().len()
    }
}

impl ProviderClient for ConfigurableMockProviderClient {
    fn generate<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        let responses = self.responses.clone();
        let recorded = self.recorded_prompts.clone();
        let sys = system_prompt.to_string();
        let usr = user_prompt.to_string();
        Box::pin(async move {
            recorded.lock().unwrap().push((sys, usr));
            responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(ProviderError::NetworkError(
                        "no more mock responses".to_string(),
                    ))
                })
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        self.metadata.clone()
    }
}

fn explode() -> Result<String, ProviderError> {
    panic!("provider exploded")
}

/// Provider client whose every call panics, for exercising fault handling.
pub(crate) struct PanickingProviderClient;

impl ProviderClient for PanickingProviderClient {
    fn generate<'a>(
        &'a self,
        _system_prompt: &'a str,
        _user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(async move { explode() })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            kind: ProviderKind::OpenAi,
            model: "panic-model".to_string(),
            endpoint: "http://panic.invalid".to_string(),
        }
    }
}
