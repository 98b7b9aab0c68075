use dalal_core::Config;

use crate::{GeminiProvider, Provider};

/// Provider name implied by a model string such as `gemini/gemini-2.0-flash`.
pub fn infer_provider_from_model(model: &str) -> Option<&'static str> {
    if model.starts_with("gemini/") || model.starts_with("gemini-") {
        Some("gemini")
    } else {
        None
    }
}

/// Build the LLM provider for `config.agents.defaults.model`.
///
/// Fails when the model belongs to an unsupported provider or when the
/// provider has no API key configured.
pub fn create_provider(config: &Config) -> anyhow::Result<Box<dyn Provider>> {
    let defaults = &config.agents.defaults;
    let model = defaults.model.as_str();

    let provider_name = infer_provider_from_model(model).ok_or_else(|| {
        anyhow::anyhow!(
            "Unsupported model '{}'. Use a Gemini model such as 'gemini/gemini-2.0-flash'.",
            model
        )
    })?;

    let provider_cfg = config
        .get_provider(provider_name)
        .filter(|p| !p.api_key.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No API key for provider '{}'. Set GEMINI_API_KEY or providers.{}.apiKey in the config file.",
                provider_name,
                provider_name
            )
        })?;

    Ok(Box::new(GeminiProvider::new(
        &provider_cfg.api_key,
        provider_cfg.api_base.as_deref(),
        model,
        defaults.max_tokens,
        defaults.temperature,
    )))
}
