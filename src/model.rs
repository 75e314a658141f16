use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The canonical recipe shape every extraction path converges on.
///
/// Constructed once per request by the normalizer and never mutated
/// afterwards. Serializes to the camelCase JSON contract consumed by the
/// cook-mode frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Total cooking time in minutes; `0` means "unknown", not "instant".
    pub total_time_minutes: u32,
    /// Free-text yield description, e.g. "24 cookies". May be empty.
    pub yields: String,
    /// Empty for image-derived recipes.
    pub source_url: String,
    /// Each entry is a self-contained "quantity + item" description.
    /// Order is display order.
    pub ingredients: Vec<String>,
    /// One atomic cooking step per entry. Order defines the step indices
    /// used by `step_ingredients`.
    pub instructions: Vec<String>,
    /// Ingredients relevant to a given step, keyed by step index.
    /// An empty map means the backend supplied no association.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub step_ingredients: BTreeMap<usize, Vec<String>>,
}

/// One extraction input: a recipe page URL, or 1-3 photographed pages.
///
/// Untagged so the caller-facing JSON contract stays `{ "url": ... }` or
/// `{ "images": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExtractionRequest {
    Url { url: String },
    Images { images: Vec<String> },
}

impl ExtractionRequest {
    /// Human-readable description of the input, used in lifecycle log
    /// entries. Image payloads are summarized by count, never echoed.
    pub fn descriptor(&self) -> String {
        match self {
            ExtractionRequest::Url { url } => url.clone(),
            ExtractionRequest::Images { images } if images.len() == 1 => "1 image".to_string(),
            ExtractionRequest::Images { images } => format!("{} images", images.len()),
        }
    }

    /// The requested page URL, when this is a URL request.
    pub fn source_url(&self) -> Option<&str> {
        match self {
            ExtractionRequest::Url { url } => Some(url),
            ExtractionRequest::Images { .. } => None,
        }
    }
}

/// Caller metadata forwarded to the backend unchanged.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    /// Forwarded as the `User-Agent` header on extraction-service calls.
    pub user_agent: Option<String>,
}
