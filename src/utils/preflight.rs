//! Preflight validation checks for early failure detection
//!
//! The service must not start without a usable credential, so the lookup
//! happens once at startup instead of on the first request.

use crate::advisor::ProviderKind;
use crate::config::ConfigError;

/// Finds the provider credential among its environment variables.
///
/// The first non-empty value wins. Empty values count as absent.
pub fn check_provider_credentials<F>(kind: ProviderKind, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    kind.credential_vars()
        .iter()
        .find_map(|var| lookup(var).filter(|value| !value.trim().is_empty()))
        .ok_or_else(|| ConfigError::MissingCredential {
            provider: kind.display_name().to_string(),
            vars: kind
                .credential_vars()
                .iter()
                .map(|var| format!("- {var}"))
                .collect::<Vec<_>>()
                .join("\n"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn openai_key_found() {
        let key =
            check_provider_credentials(ProviderKind::OpenAi, lookup(&[("OPENAI_API_KEY", "sk-1")]))
                .unwrap();
        assert_eq!(key, "sk-1");
    }

    #[test]
    fn gemini_falls_back_to_second_variable() {
        let key = check_provider_credentials(
            ProviderKind::Gemini,
            lookup(&[("GOOGLE_API_KEY", ""), ("GEMINI_API_KEY", "AIza-2")]),
        )
        .unwrap();
        assert_eq!(key, "AIza-2");
    }

    #[test]
    fn missing_key_lists_variables() {
        let err = check_provider_credentials(ProviderKind::Gemini, lookup(&[])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Gemini API key not found"), "{message}");
        assert!(message.contains("- GOOGLE_API_KEY"));
        assert!(message.contains("- GEMINI_API_KEY"));
    }

    #[test]
    fn blank_key_is_missing() {
        let err = check_provider_credentials(
            ProviderKind::OpenAi,
            lookup(&[("OPENAI_API_KEY", "   ")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }
}
