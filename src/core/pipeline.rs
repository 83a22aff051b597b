use super::errors::{ReconError, ReconResult};
use super::models::{PipelineResult, ScanTask};
use super::scope::{ScopeGuard, ScopePolicy};
use super::target::Target;
use crate::config::{GlobalConfig, ToolsConfig};
use crate::executors::{CommandExecutor, TaskRunner};
use crate::llm::InsightAgent;
use crate::storage::ScanStore;
use crate::tools::TaskFactory;
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub parallel: bool,
    pub max_concurrent: usize,
    pub task_timeout: Duration,
    pub scope_policy: ScopePolicy,
    pub tools: ToolsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig::from(&GlobalConfig::default())
    }
}

impl From<&GlobalConfig> for PipelineConfig {
    fn from(config: &GlobalConfig) -> Self {
        Self {
            parallel: config.scan.parallel,
            max_concurrent: config.scan.max_concurrent,
            task_timeout: config.scan.task_timeout(),
            scope_policy: config.scan.scope_policy,
            tools: config.tools.clone(),
        }
    }
}

/// Scope check, task planning, execution, persistence and analysis for one
/// scan request.
pub struct PipelineCoordinator {
    config: PipelineConfig,
    guard: ScopeGuard,
    factory: TaskFactory,
    runner: TaskRunner,
    agent: InsightAgent,
}

impl PipelineCoordinator {
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn ScanStore>,
        executor: Arc<dyn CommandExecutor>,
        agent: InsightAgent,
    ) -> Self {
        let runner = TaskRunner::new(executor, store).with_timeout(config.task_timeout);
        Self {
            guard: ScopeGuard::new(config.scope_policy),
            factory: TaskFactory::new(config.tools.clone()),
            runner,
            agent,
            config,
        }
    }

    /// Nothing is built, run or stored unless the target is valid and in
    /// scope. Once tasks start, every one of them is attempted; only a store
    /// failure aborts the run.
    pub async fn run<T, S>(&self, target: &str, tool_ids: &[T], allowed_scope: &[S]) -> ReconResult<PipelineResult>
    where
        T: AsRef<str>,
        S: AsRef<str>,
    {
        let target = match Target::parse(target) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("Rejected scan request: {}", e);
                return Ok(PipelineResult::rejected(e.to_string()));
            }
        };

        if !self.guard.check(target.bare_host(), allowed_scope) {
            let violation = ReconError::ScopeViolation(target.raw().to_string());
            tracing::warn!("Rejected scan request: {}", violation);
            return Ok(PipelineResult::rejected(violation.to_string()));
        }

        let tasks = self.factory.build(&target, tool_ids);
        tracing::info!(
            "Scanning {} with {} task(s){}",
            target.bare_host(),
            tasks.len(),
            if self.config.parallel { " in parallel" } else { "" }
        );

        let finished = if self.config.parallel {
            self.run_parallel(tasks).await?
        } else {
            self.run_sequential(tasks).await?
        };

        let results: IndexMap<String, String> = finished
            .into_iter()
            .map(|task| (task.description, task.output))
            .collect();

        let analysis = self.agent.summarize(target.raw(), &results).await;

        Ok(PipelineResult::Completed { analysis, results })
    }

    async fn run_sequential(&self, tasks: Vec<ScanTask>) -> ReconResult<Vec<ScanTask>> {
        let mut finished = Vec::with_capacity(tasks.len());
        for task in tasks {
            finished.push(self.runner.execute(task).await?);
        }
        Ok(finished)
    }

    /// Tasks run concurrently, each under its own timeout. Every task is
    /// driven to completion before a store failure is reported, so siblings
    /// still get recorded.
    async fn run_parallel(&self, tasks: Vec<ScanTask>) -> ReconResult<Vec<ScanTask>> {
        let outcomes: Vec<ReconResult<ScanTask>> = stream::iter(tasks)
            .map(|task| self.runner.execute(task))
            .buffered(self.config.max_concurrent.max(1))
            .collect()
            .await;

        outcomes.into_iter().collect()
    }
}
