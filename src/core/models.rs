use crate::tools::Tool;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed,
    Failed,
    Error,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Completed => "Completed",
            TaskStatus::Failed => "Failed",
            TaskStatus::Error => "Error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown task status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(TaskStatus::Pending),
            "Completed" => Ok(TaskStatus::Completed),
            "Failed" => Ok(TaskStatus::Failed),
            "Error" => Ok(TaskStatus::Error),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// One planned invocation of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTask {
    pub tool: Tool,
    /// Binary that gets spawned.
    pub program: String,
    /// Arguments passed verbatim, never through a shell.
    pub args: Vec<String>,
    /// Shell-quoted rendering of `program` + `args`, for logs and history.
    pub command: String,
    pub description: String,
    /// Target form handed to this tool.
    pub target: String,
    pub status: TaskStatus,
    pub output: String,
}

impl ScanTask {
    pub fn new(tool: Tool, program: String, args: Vec<String>, target: String) -> Self {
        let command = shell_words::join(std::iter::once(program.as_str()).chain(args.iter().map(String::as_str)));
        let description = format!("Run {} on {}", tool, target);

        Self {
            tool,
            program,
            args,
            command,
            description,
            target,
            status: TaskStatus::Pending,
            output: String::new(),
        }
    }

    /// Moves a pending task to its terminal state. Consumes the task so a
    /// resolved task cannot be resolved again.
    pub fn resolve(mut self, status: TaskStatus, output: String) -> Self {
        debug_assert!(!self.status.is_terminal(), "task resolved twice: {}", self.description);
        debug_assert!(status.is_terminal(), "tasks must resolve to a terminal status");
        self.status = status;
        self.output = output;
        self
    }
}

/// Persisted form of a finished task.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRecord {
    pub id: i64,
    pub target: String,
    pub tool: String,
    pub command: String,
    pub status: TaskStatus,
    pub output: String,
    pub timestamp: DateTime<Utc>,
}

/// What a pipeline run hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PipelineResult {
    Completed {
        analysis: String,
        results: IndexMap<String, String>,
    },
    Rejected {
        error: String,
    },
}

impl PipelineResult {
    pub fn rejected(error: impl Into<String>) -> Self {
        PipelineResult::Rejected { error: error.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_task_is_pending() {
        let task = ScanTask::new(
            Tool::Nmap,
            "nmap".to_string(),
            vec!["-F".to_string(), "example.com".to_string()],
            "example.com".to_string(),
        );
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.command, "nmap -F example.com");
        assert_eq!(task.description, "Run nmap on example.com");
        assert!(task.output.is_empty());
    }

    #[test]
    fn test_command_rendering_quotes_arguments() {
        let task = ScanTask::new(
            Tool::Ffuf,
            "ffuf".to_string(),
            vec!["-w".to_string(), "/tmp/my words.txt".to_string()],
            "https://example.com".to_string(),
        );
        assert_eq!(task.command, "ffuf -w '/tmp/my words.txt'");
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [TaskStatus::Pending, TaskStatus::Completed, TaskStatus::Failed, TaskStatus::Error] {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("Timeout".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_pipeline_result_shapes() {
        let mut results = IndexMap::new();
        results.insert("Run nmap on example.com".to_string(), "22/tcp open ssh".to_string());
        let completed = PipelineResult::Completed {
            analysis: "ok".to_string(),
            results,
        };
        assert_eq!(
            serde_json::to_value(&completed).unwrap(),
            serde_json::json!({
                "analysis": "ok",
                "results": { "Run nmap on example.com": "22/tcp open ssh" }
            })
        );

        let rejected = PipelineResult::rejected("Target evil.net is out of scope");
        assert_eq!(
            serde_json::to_value(&rejected).unwrap(),
            serde_json::json!({ "error": "Target evil.net is out of scope" })
        );
    }
}
