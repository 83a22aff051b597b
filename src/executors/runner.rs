use super::command::{self, CommandError, CommandResult};
use crate::core::errors::ReconResult;
use crate::core::models::{ScanTask, TaskStatus};
use crate::storage::ScanStore;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Per-task wall-clock budget.
pub const TASK_TIMEOUT: Duration = Duration::from_secs(60);

pub const TIMEOUT_MESSAGE: &str = "Timeout Error: Scan took too long!";

/// Process boundary of the runner.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, program: &str, args: &[String], limit: Duration) -> Result<CommandResult, CommandError>;
}

/// Spawns real child processes.
pub struct SystemExecutor;

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn run(&self, program: &str, args: &[String], limit: Duration) -> Result<CommandResult, CommandError> {
        command::execute(program, args, limit).await
    }
}

/// Executes one task and records the outcome before handing it back.
#[derive(Clone)]
pub struct TaskRunner {
    executor: Arc<dyn CommandExecutor>,
    store: Arc<dyn ScanStore>,
    timeout: Duration,
}

impl TaskRunner {
    pub fn new(executor: Arc<dyn CommandExecutor>, store: Arc<dyn ScanStore>) -> Self {
        Self {
            executor,
            store,
            timeout: TASK_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs `task` to a terminal status and appends exactly one record for it.
    ///
    /// Tool failures are folded into the task status; only a store failure
    /// comes back as `Err`.
    pub async fn execute(&self, task: ScanTask) -> ReconResult<ScanTask> {
        tracing::info!("Executing task: {} -> {}", task.description, task.command);

        let outcome = self.executor.run(&task.program, &task.args, self.timeout).await;
        let (status, output) = classify(&task, outcome);
        let task = task.resolve(status, output);

        let record = self.store.append(&task).await?;
        tracing::info!(
            "Task finished: {} [{}] (record #{})",
            task.description,
            task.status,
            record.id
        );

        Ok(task)
    }
}

fn classify(task: &ScanTask, outcome: Result<CommandResult, CommandError>) -> (TaskStatus, String) {
    match outcome {
        Ok(result) => {
            if !result.stderr.trim().is_empty() {
                tracing::error!("Error running {}: {}", task.tool, result.stderr.trim());
            }
            tracing::debug!("{} finished in {}ms", task.tool, result.duration_ms);

            let stdout = result.stdout.trim().to_string();
            match result.exit_code {
                Some(0) => (TaskStatus::Completed, stdout),
                Some(code) => {
                    tracing::warn!("{} exited with code {}", task.tool, code);
                    (TaskStatus::Failed, stdout)
                }
                None => {
                    let message = format!("{} was terminated by a signal", task.program);
                    tracing::error!("Execution failed: {}", message);
                    (TaskStatus::Error, message)
                }
            }
        }
        Err(CommandError::TimedOut { .. }) => {
            tracing::error!("Timeout: {} took too long to execute.", task.command);
            (TaskStatus::Failed, TIMEOUT_MESSAGE.to_string())
        }
        Err(e) => {
            tracing::error!("Execution failed: {}", e);
            (TaskStatus::Error, e.to_string())
        }
    }
}
