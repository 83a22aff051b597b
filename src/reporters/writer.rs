use crate::core::models::PipelineResult;
use crate::utils::{fs::atomic_write, sanitize::sanitize_target};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// JSON export of one pipeline run.
#[derive(Debug, Serialize)]
pub struct ScanReport<'a> {
    pub target: &'a str,
    pub tools: &'a [String],
    pub scope: &'a [String],
    pub generated_at: DateTime<Utc>,
    pub result: &'a PipelineResult,
}

impl<'a> ScanReport<'a> {
    pub fn new(target: &'a str, tools: &'a [String], scope: &'a [String], result: &'a PipelineResult) -> Self {
        Self {
            target,
            tools,
            scope,
            generated_at: Utc::now(),
            result,
        }
    }
}

pub fn report_file_name(target: &str) -> String {
    format!("{}_security_report.json", sanitize_target(target))
}

/// Writes the report into `dir` and returns the path written.
pub fn write_report(dir: &Path, report: &ScanReport<'_>) -> Result<PathBuf> {
    let path = dir.join(report_file_name(report.target));
    let json = serde_json::to_string_pretty(report).context("Failed to serialize scan report")?;
    atomic_write(&path, json.as_bytes())?;
    tracing::info!("Report written to {}", path.display());
    Ok(path)
}
