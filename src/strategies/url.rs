use crate::config::ScraperConfig;
use crate::error::ExtractError;
use crate::model::{ExtractionRequest, RequestMetadata};
use crate::strategies::ExtractionStrategy;
use async_trait::async_trait;
use log::debug;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde_json::Value;

/// Delegates URL extraction to the remote extraction service.
///
/// One GET per request, target URL as a query parameter, API key as the
/// `x-api-key` header, caller's user agent forwarded when present.
#[derive(Debug)]
pub struct UrlStrategy {
    client: Client,
    base_url: String,
    api_key: String,
}

impl UrlStrategy {
    /// Build the strategy from the injected configuration. Missing endpoint
    /// or key is a configuration error, surfaced to the request that needed
    /// the strategy rather than at startup.
    pub fn from_config(config: &ScraperConfig) -> Result<Self, ExtractError> {
        let base_url = config.base_url.clone().ok_or_else(|| {
            ExtractError::Configuration("extraction service base URL is not set".to_string())
        })?;
        let api_key = config.api_key.clone().ok_or_else(|| {
            ExtractError::Configuration("extraction service API key is not set".to_string())
        })?;

        Ok(UrlStrategy {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ExtractionStrategy for UrlStrategy {
    fn strategy_name(&self) -> &str {
        "url"
    }

    async fn fetch(
        &self,
        request: &ExtractionRequest,
        metadata: &RequestMetadata,
    ) -> Result<String, ExtractError> {
        let ExtractionRequest::Url { url } = request else {
            return Err(ExtractError::InvalidInput(
                "URL strategy received a non-URL request".to_string(),
            ));
        };

        let mut builder = self
            .client
            .get(format!("{}/extract", self.base_url))
            .query(&[("url", url.as_str())])
            .header("x-api-key", &self.api_key);

        if let Some(user_agent) = &metadata.user_agent {
            builder = builder.header(USER_AGENT, user_agent);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v["error"].as_str().map(String::from))
                .unwrap_or_else(|| format!("extraction service returned {}", status));
            return Err(ExtractError::Backend(message));
        }

        debug!("extraction service reply: {} bytes", body.len());
        Ok(body)
    }
}
