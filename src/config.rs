use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Pipeline configuration, resolved once by the surrounding application and
/// injected into the [`Orchestrator`](crate::Orchestrator).
///
/// Credentials are optional at load time on purpose: a deployment that only
/// ever extracts from URLs never needs an inference key. A strategy that is
/// actually dispatched without its credentials fails with a
/// `Configuration` error for that request.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExtractorConfig {
    /// Remote HTML-extraction service.
    #[serde(default)]
    pub scraper: ScraperConfig,
    /// Multi-modal inference backend used for photographed recipes.
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Remote extraction service settings.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScraperConfig {
    /// Base endpoint, e.g. "https://scraper.internal.example".
    pub base_url: Option<String>,
    /// Sent as the `x-api-key` header.
    pub api_key: Option<String>,
}

/// Inference backend settings.
#[derive(Debug, Deserialize, Clone)]
pub struct InferenceConfig {
    pub api_key: Option<String>,
    /// Overrides the backend base URL, for proxies and tests.
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_output_tokens: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    4000
}

impl ExtractorConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables with SOUS__ prefix
    ///    (e.g. SOUS__SCRAPER__API_KEY, SOUS__INFERENCE__MODEL)
    /// 2. config.toml file in the current directory
    /// 3. Bare variables from the original deployment:
    ///    EXTRACTOR_BASE_URL, EXTRACTOR_API_KEY, GEMINI_API_KEY
    /// 4. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("SOUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: ExtractorConfig = settings.try_deserialize()?;

        if config.scraper.base_url.is_none() {
            config.scraper.base_url = std::env::var("EXTRACTOR_BASE_URL").ok();
        }
        if config.scraper.api_key.is_none() {
            config.scraper.api_key = std::env::var("EXTRACTOR_API_KEY").ok();
        }
        if config.inference.api_key.is_none() {
            config.inference.api_key = std::env::var("GEMINI_API_KEY").ok();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_model(), "gemini-2.5-flash");
        assert_eq!(default_temperature(), 0.2);
        assert_eq!(default_max_tokens(), 4000);
    }

    #[test]
    fn test_defaults_leave_credentials_unset() {
        let config = ExtractorConfig::default();
        assert!(config.scraper.base_url.is_none());
        assert!(config.scraper.api_key.is_none());
        assert!(config.inference.api_key.is_none());
        assert_eq!(config.inference.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_load_without_file_does_not_panic() {
        // With no config.toml present, load falls through to env vars and
        // defaults. Missing credentials are not a load-time error.
        let result = ExtractorConfig::load();
        assert!(result.is_ok());
    }
}
