mod image;
mod url;

pub use image::{parse_image_payload, ImageStrategy, RECIPE_PHOTO_PROMPT};
pub use url::UrlStrategy;

use crate::error::ExtractError;
use crate::model::{ExtractionRequest, RequestMetadata};
use async_trait::async_trait;

/// One backend-dispatch path. Exactly one strategy handles a given request;
/// the orchestrator selects it by request variant.
///
/// `fetch` performs the single outbound call and returns the backend's raw
/// reply body. Strategies never normalize: every reply, however well-shaped
/// it claims to be, goes through the normalizer afterwards.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Strategy name used in debug logging (e.g. "url", "image").
    fn strategy_name(&self) -> &str;

    async fn fetch(
        &self,
        request: &ExtractionRequest,
        metadata: &RequestMetadata,
    ) -> Result<String, ExtractError>;
}
