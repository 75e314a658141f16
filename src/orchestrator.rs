use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::logging::{ExtractionLog, LifecycleLogger, Stage, StageLogger};
use crate::model::{ExtractionRequest, Recipe, RequestMetadata};
use crate::normalize::normalize;
use crate::strategies::{parse_image_payload, ExtractionStrategy, ImageStrategy, UrlStrategy};
use log::debug;
use std::sync::Arc;

/// The single entry point of the extraction pipeline.
///
/// One call to [`extract`](Orchestrator::extract) is one request:
/// validate, log, dispatch to exactly one strategy, normalize, log again.
/// The orchestrator holds no cross-request state; concurrent requests need
/// no coordination.
pub struct Orchestrator {
    config: ExtractorConfig,
    logger: Arc<dyn LifecycleLogger>,
}

impl Orchestrator {
    /// Orchestrator with the default `log`-facade lifecycle logger.
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_logger(config, Arc::new(StageLogger))
    }

    pub fn with_logger(config: ExtractorConfig, logger: Arc<dyn LifecycleLogger>) -> Self {
        Orchestrator { config, logger }
    }

    /// Run one extraction to completion.
    ///
    /// Lifecycle entries for the request share one timestamp, captured here.
    /// Validation failures log only a failed `init` entry; everything past
    /// validation logs `init`, `fetch_start`, and exactly one of
    /// `fetch_success`/`fetch_failure`. Nothing is retried.
    pub async fn extract(
        &self,
        request: ExtractionRequest,
        metadata: RequestMetadata,
    ) -> Result<Recipe, ExtractError> {
        let timestamp = crate::logging::now_iso8601();
        let descriptor = request.descriptor();

        if let Err(err) = validate(&request) {
            self.logger.record(&ExtractionLog::failure(
                Stage::Init,
                &descriptor,
                &timestamp,
                &err.to_string(),
            ));
            return Err(err);
        }

        self.logger
            .record(&ExtractionLog::stage(Stage::Init, &descriptor, &timestamp));
        self.logger.record(&ExtractionLog::stage(
            Stage::FetchStart,
            &descriptor,
            &timestamp,
        ));

        match self.dispatch(&request, &metadata).await {
            Ok(recipe) => {
                self.logger.record(&ExtractionLog::success(
                    &descriptor,
                    &timestamp,
                    recipe.clone(),
                ));
                Ok(recipe)
            }
            Err(err) => {
                self.logger.record(&ExtractionLog::failure(
                    Stage::FetchFailure,
                    &descriptor,
                    &timestamp,
                    &err.to_string(),
                ));
                Err(err)
            }
        }
    }

    /// Select the strategy by request variant, make the single backend call,
    /// and normalize the raw reply. Normalization failures are reported the
    /// same way as backend failures.
    async fn dispatch(
        &self,
        request: &ExtractionRequest,
        metadata: &RequestMetadata,
    ) -> Result<Recipe, ExtractError> {
        let strategy: Box<dyn ExtractionStrategy> = match request {
            ExtractionRequest::Url { .. } => {
                Box::new(UrlStrategy::from_config(&self.config.scraper)?)
            }
            ExtractionRequest::Images { .. } => {
                Box::new(ImageStrategy::from_config(&self.config.inference)?)
            }
        };

        debug!(
            "dispatching '{}' via {} strategy",
            request.descriptor(),
            strategy.strategy_name()
        );

        let raw = strategy.fetch(request, metadata).await?;
        normalize(&raw, request.source_url())
    }
}

/// Reject malformed input before any log entry past `init` and before any
/// network traffic.
fn validate(request: &ExtractionRequest) -> Result<(), ExtractError> {
    match request {
        ExtractionRequest::Url { url } => {
            let parsed = reqwest::Url::parse(url).map_err(|_| {
                ExtractError::InvalidInput(format!("'{}' is not a valid absolute URL", url))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ExtractError::InvalidInput(format!(
                    "unsupported URL scheme '{}'",
                    parsed.scheme()
                )));
            }
            Ok(())
        }
        ExtractionRequest::Images { images } => {
            if images.is_empty() || images.len() > 3 {
                return Err(ExtractError::InvalidInput(format!(
                    "expected 1-3 images, got {}",
                    images.len()
                )));
            }
            for payload in images {
                parse_image_payload(payload)?;
            }
            Ok(())
        }
    }
}
