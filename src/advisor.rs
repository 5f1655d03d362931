//! Recommendation adapter and generative-language provider clients.

pub mod adapter;
pub mod ai;
pub mod error;
pub mod prompts;

#[cfg(test)]
pub(crate) mod test_utils;

pub use adapter::{AdapterOptions, RecommendationAdapter};
pub use ai::gemini::GeminiClient;
pub use ai::openai::OpenAiClient;
pub use ai::{create_provider_client, ProviderClient, ProviderKind, ProviderMetadata};
pub use error::{ProviderError, RecommendationError};
