use crate::model::Recipe;
use chrono::{SecondsFormat, Utc};
use log::{info, warn};
use serde::Serialize;
use std::sync::Mutex;

/// Pipeline stages, in the order they may occur for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    FetchStart,
    FetchSuccess,
    FetchFailure,
}

/// One write-once entry in the per-request audit trail.
///
/// `timestamp` is captured once at `init` and repeated verbatim on every
/// entry of the same request, so entries group trivially.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionLog {
    pub stage: Stage,
    /// The URL string, or "N images" for photo requests.
    pub request_descriptor: String,
    pub success: bool,
    /// ISO-8601, shared by all entries of one request.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_data: Option<Recipe>,
}

impl ExtractionLog {
    /// A non-terminal entry (`init` or `fetch_start`).
    pub fn stage(stage: Stage, descriptor: &str, timestamp: &str) -> Self {
        Self {
            stage,
            request_descriptor: descriptor.to_string(),
            success: false,
            timestamp: timestamp.to_string(),
            error_message: None,
            recipe_data: None,
        }
    }

    pub fn success(descriptor: &str, timestamp: &str, recipe: Recipe) -> Self {
        Self {
            stage: Stage::FetchSuccess,
            request_descriptor: descriptor.to_string(),
            success: true,
            timestamp: timestamp.to_string(),
            error_message: None,
            recipe_data: Some(recipe),
        }
    }

    pub fn failure(stage: Stage, descriptor: &str, timestamp: &str, message: &str) -> Self {
        Self {
            stage,
            request_descriptor: descriptor.to_string(),
            success: false,
            timestamp: timestamp.to_string(),
            error_message: Some(message.to_string()),
            recipe_data: None,
        }
    }
}

/// Current time as an ISO-8601 string, millisecond precision.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Observer for stage transitions.
///
/// `record` is infallible by signature: a logging problem must never abort
/// an extraction.
pub trait LifecycleLogger: Send + Sync {
    fn record(&self, entry: &ExtractionLog);
}

/// Default logger: emits each entry as a single-line JSON record through the
/// `log` facade, info on success stages, warn on failures.
#[derive(Debug, Default)]
pub struct StageLogger;

impl LifecycleLogger for StageLogger {
    fn record(&self, entry: &ExtractionLog) {
        let line = serde_json::to_string(entry).unwrap_or_else(|_| {
            format!(
                "{{\"stage\":\"{:?}\",\"requestDescriptor\":{:?}}}",
                entry.stage, entry.request_descriptor
            )
        });

        match entry.stage {
            Stage::FetchFailure => warn!("recipe extraction: {}", line),
            _ => info!("recipe extraction: {}", line),
        }
    }
}

/// In-memory logger for tests and for callers that want to return the audit
/// trail alongside the recipe.
#[derive(Debug, Default)]
pub struct CapturingLogger {
    entries: Mutex<Vec<ExtractionLog>>,
}

impl CapturingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ExtractionLog> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.entries().iter().map(|e| e.stage).collect()
    }
}

impl LifecycleLogger for CapturingLogger {
    fn record(&self, entry: &ExtractionLog) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}
