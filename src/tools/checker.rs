use super::registry::Tool;
use crate::config::ToolsConfig;
use std::path::PathBuf;
use which::which;

#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub tool: Tool,
    pub binary: String,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub fn installed(&self) -> bool {
        self.path.is_some()
    }
}

pub struct ToolChecker<'a> {
    config: &'a ToolsConfig,
}

impl<'a> ToolChecker<'a> {
    pub fn new(config: &'a ToolsConfig) -> Self {
        Self { config }
    }

    pub fn check(&self, tool: Tool) -> ToolStatus {
        let binary = tool.binary(self.config);
        let path = which(&binary).ok();
        match &path {
            Some(found) => tracing::debug!("Found {}: {:?}", binary, found),
            None => tracing::debug!("{} not found on PATH", binary),
        }
        ToolStatus { tool, binary, path }
    }

    pub fn check_all(&self, tools: &[Tool]) -> Vec<ToolStatus> {
        tools.iter().map(|tool| self.check(*tool)).collect()
    }

    /// Warnings for anything that will make a requested tool fail. A missing
    /// binary is not fatal: the task still runs and is recorded as `Error`.
    pub fn preflight(&self, tools: &[Tool]) -> Vec<String> {
        let mut warnings: Vec<String> = self
            .check_all(tools)
            .into_iter()
            .filter(|status| !status.installed())
            .map(|status| format!("{} is not installed ('{}' not found on PATH)", status.tool, status.binary))
            .collect();

        if tools.contains(&Tool::Ffuf) && !self.config.wordlist.exists() {
            warnings.push(format!(
                "ffuf wordlist {} does not exist (run `reconguard tools --fetch-wordlist`)",
                self.config.wordlist.display()
            ));
        }

        warnings
    }
}
