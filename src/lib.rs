pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod strategies;

pub use config::ExtractorConfig;
pub use error::ExtractError;
pub use logging::{CapturingLogger, ExtractionLog, LifecycleLogger, Stage, StageLogger};
pub use model::{ExtractionRequest, Recipe, RequestMetadata};
pub use orchestrator::Orchestrator;

/// Extract a recipe from a web page URL using configuration from the
/// environment. One round trip to the extraction service, no retries.
pub async fn extract_from_url(url: &str) -> Result<Recipe, ExtractError> {
    let config = ExtractorConfig::load()
        .map_err(|e| ExtractError::Configuration(e.to_string()))?;

    Orchestrator::new(config)
        .extract(
            ExtractionRequest::Url {
                url: url.to_string(),
            },
            RequestMetadata::default(),
        )
        .await
}

/// Extract a recipe from 1-3 photographed pages, each encoded as a
/// `data:image/...;base64,` payload.
pub async fn extract_from_images(images: Vec<String>) -> Result<Recipe, ExtractError> {
    let config = ExtractorConfig::load()
        .map_err(|e| ExtractError::Configuration(e.to_string()))?;

    Orchestrator::new(config)
        .extract(ExtractionRequest::Images { images }, RequestMetadata::default())
        .await
}
