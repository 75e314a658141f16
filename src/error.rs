use thiserror::Error;

/// Errors that can occur during recipe extraction.
///
/// All four classes collapse to a single caller-visible failure message at
/// the pipeline boundary; the variants exist so logs can tell a bad request
/// apart from a bad backend.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Malformed URL, wrong image count, or unrecognized image encoding.
    /// Detected before any network call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Required backend credentials or endpoints are missing.
    /// Detected at dispatch time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The extraction service or inference backend returned a non-success
    /// response or an unusable reply.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend replied successfully but the payload could not be
    /// salvaged into a valid recipe.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),
}

impl From<reqwest::Error> for ExtractError {
    fn from(err: reqwest::Error) -> Self {
        ExtractError::Backend(err.to_string())
    }
}
