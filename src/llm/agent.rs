use super::client::Summarizer;
use super::prompts::analysis_prompt;
use crate::core::errors::ReconError;
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

pub const UNAVAILABLE_PREFIX: &str = "AI analysis unavailable";

/// Turns aggregated tool output into prose. Never fails: when the remote
/// service is down the caller gets a placeholder, and scan results stand on
/// their own.
#[derive(Clone)]
pub struct InsightAgent {
    summarizer: Arc<dyn Summarizer>,
    timeout: Duration,
}

impl InsightAgent {
    pub fn new(summarizer: Arc<dyn Summarizer>, timeout: Duration) -> Self {
        Self { summarizer, timeout }
    }

    pub async fn summarize(&self, target: &str, results: &IndexMap<String, String>) -> String {
        match self.try_summarize(target, results).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("{}", e);
                degraded(&e)
            }
        }
    }

    async fn try_summarize(&self, target: &str, results: &IndexMap<String, String>) -> Result<String, ReconError> {
        let prompt = analysis_prompt(target, results)
            .map_err(|e| ReconError::Summarization(format!("failed to render prompt: {}", e)))?;

        let analysis = timeout(self.timeout, self.summarizer.complete(&prompt))
            .await
            .map_err(|_| ReconError::Summarization(format!("no response within {}s", self.timeout.as_secs())))?
            .map_err(|e| ReconError::Summarization(format!("{:#}", e)))?;

        if analysis.trim().is_empty() {
            return Err(ReconError::Summarization("service returned an empty response".to_string()));
        }

        Ok(analysis)
    }
}

fn degraded(error: &ReconError) -> String {
    match error {
        ReconError::Summarization(reason) => format!("{}: {}", UNAVAILABLE_PREFIX, reason),
        other => format!("{}: {}", UNAVAILABLE_PREFIX, other),
    }
}
