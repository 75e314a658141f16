use crate::config::InferenceConfig;
use crate::error::ExtractError;
use crate::model::{ExtractionRequest, RequestMetadata};
use crate::strategies::ExtractionStrategy;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

/// The fixed instruction prompt sent ahead of the image payloads.
///
/// Loaded from `prompt.txt` at compile time so it can be edited without
/// dealing with Rust string syntax.
pub const RECIPE_PHOTO_PROMPT: &str = include_str!("prompt.txt");

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Split a `data:image/...;base64,...` payload into its MIME type and
/// base64 data. Anything without a recognizable encoded-image prefix is
/// rejected, which lets the whole batch fail before the network call.
pub fn parse_image_payload(payload: &str) -> Result<(&str, &str), ExtractError> {
    let rest = payload.strip_prefix("data:").ok_or_else(|| {
        ExtractError::InvalidInput("image payload is not a data URL".to_string())
    })?;

    let (mime_type, data) = rest.split_once(";base64,").ok_or_else(|| {
        ExtractError::InvalidInput("image payload is not base64-encoded".to_string())
    })?;

    if !mime_type.starts_with("image/") || data.is_empty() {
        return Err(ExtractError::InvalidInput(format!(
            "unsupported image payload type '{}'",
            mime_type
        )));
    }

    Ok((mime_type, data))
}

/// Delegates photo extraction to the multi-modal inference backend.
///
/// One request carries the fixed prompt plus all 1-3 page images; there is
/// no partial-batch success. The reply is free text from a model, so it is
/// returned raw and left to the normalizer's fence/brace scanning.
pub struct ImageStrategy {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl ImageStrategy {
    pub fn from_config(config: &InferenceConfig) -> Result<Self, ExtractError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ExtractError::Configuration("inference backend API key is not set".to_string())
        })?;

        Ok(ImageStrategy {
            client: Client::new(),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }
}

#[async_trait]
impl ExtractionStrategy for ImageStrategy {
    fn strategy_name(&self) -> &str {
        "image"
    }

    async fn fetch(
        &self,
        request: &ExtractionRequest,
        _metadata: &RequestMetadata,
    ) -> Result<String, ExtractError> {
        let ExtractionRequest::Images { images } = request else {
            return Err(ExtractError::InvalidInput(
                "image strategy received a non-image request".to_string(),
            ));
        };

        // Cheap fail-fast: one bad payload aborts before paying for the
        // inference call.
        let mut parts = vec![json!({ "text": RECIPE_PHOTO_PROMPT })];
        for payload in images {
            let (mime_type, data) = parse_image_payload(payload)?;
            parts.push(json!({
                "inline_data": {
                    "mime_type": mime_type,
                    "data": data
                }
            }));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "contents": [{ "parts": parts }],
                "generationConfig": {
                    "temperature": self.temperature,
                    "maxOutputTokens": self.max_output_tokens,
                    "responseMimeType": "application/json"
                }
            }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("inference backend reply: {} bytes", text.len());

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or_else(|| format!("inference backend returned {}", status));
            return Err(ExtractError::Backend(message));
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            ExtractError::Backend(format!("inference backend reply is not JSON: {}", e))
        })?;

        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                ExtractError::Backend("inference backend reply contains no text".to_string())
            })?;

        if text.trim().is_empty() {
            return Err(ExtractError::Backend(
                "inference backend returned an empty reply".to_string(),
            ));
        }

        Ok(text.to_string())
    }
}
