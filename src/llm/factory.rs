//! Factory function for creating LLM provider instances

use super::{GeminiProvider, LlmProvider};
use crate::config::{LlmProviderKind, LlmSettings};
use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::info;

/// Create an LLM provider based on the configured provider kind
///
/// # Arguments
/// * `settings` - Resolved LLM settings (provider, endpoint, model, key source)
///
/// # Returns
/// A shared LlmProvider implementation
pub fn create_llm_provider(settings: &LlmSettings) -> Result<Arc<dyn LlmProvider>> {
    match settings.provider {
        LlmProviderKind::Gemini => {
            if settings.api_key_source.is_none() {
                bail!("The gemini provider requires an API key (--llm-api-key, GEMINI_API_KEY, api_key or api_key_command)");
            }
            info!(
                "Creating Gemini provider at {} (model {})",
                settings.base_url, settings.model
            );
            Ok(Arc::new(GeminiProvider::new(
                &settings.base_url,
                &settings.model,
                settings.api_key_source.clone(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ApiKeySource;

    #[test]
    fn test_gemini_without_key_is_rejected() {
        let settings = LlmSettings::defaults_for(LlmProviderKind::Gemini);
        assert!(create_llm_provider(&settings).is_err());
    }

    #[test]
    fn test_creates_configured_provider() {
        let mut settings = LlmSettings::defaults_for(LlmProviderKind::Gemini);
        settings.api_key_source = ApiKeySource::Static("key".into());
        let provider = create_llm_provider(&settings).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-1.5-flash");

        settings.model = "gemini-1.5-pro".into();
        let provider = create_llm_provider(&settings).unwrap();
        assert_eq!(provider.model(), "gemini-1.5-pro");
    }
}
