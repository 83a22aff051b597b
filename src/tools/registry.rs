use crate::config::{ToolOverride, ToolsConfig};
use crate::core::models::ScanTask;
use crate::core::target::Target;
use std::fmt;

const TARGET_PLACEHOLDER: &str = "{target}";
const WORDLIST_PLACEHOLDER: &str = "{wordlist}";

/// Which spelling of the target a tool expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetForm {
    BareHost,
    CanonicalUrl,
}

impl TargetForm {
    pub fn render(&self, target: &Target) -> String {
        match self {
            TargetForm::BareHost => target.bare_host().to_string(),
            TargetForm::CanonicalUrl => target.canonical_url(),
        }
    }
}

/// Every external tool the pipeline knows how to drive. Adding one means a
/// new variant plus its arms below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Fast service/version port scan.
    Nmap,
    /// Content discovery against the web root.
    Ffuf,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::Nmap, Tool::Ffuf];

    pub fn id(&self) -> &'static str {
        match self {
            Tool::Nmap => "nmap",
            Tool::Ffuf => "ffuf",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL.into_iter().find(|tool| tool.id().eq_ignore_ascii_case(id))
    }

    pub fn target_form(&self) -> TargetForm {
        match self {
            Tool::Nmap => TargetForm::BareHost,
            Tool::Ffuf => TargetForm::CanonicalUrl,
        }
    }

    pub fn default_binary(&self) -> &'static str {
        self.id()
    }

    fn default_args(&self) -> &'static [&'static str] {
        match self {
            Tool::Nmap => &["-Pn", "-sV", "-T4", "-F", TARGET_PLACEHOLDER],
            Tool::Ffuf => &["-u", "{target}/FUZZ", "-w", WORDLIST_PLACEHOLDER],
        }
    }

    fn overrides<'a>(&self, config: &'a ToolsConfig) -> &'a ToolOverride {
        match self {
            Tool::Nmap => &config.nmap,
            Tool::Ffuf => &config.ffuf,
        }
    }

    /// Binary to spawn, honouring a configured override.
    pub fn binary(&self, config: &ToolsConfig) -> String {
        self.overrides(config)
            .binary
            .clone()
            .unwrap_or_else(|| self.default_binary().to_string())
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Turns a validated target and requested tool ids into runnable tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFactory {
    config: ToolsConfig,
}

impl TaskFactory {
    pub fn new(config: ToolsConfig) -> Self {
        Self { config }
    }

    /// One task per known tool id, in request order. Unknown ids are skipped.
    pub fn build<S: AsRef<str>>(&self, target: &Target, tool_ids: &[S]) -> Vec<ScanTask> {
        tool_ids
            .iter()
            .filter_map(|id| {
                let id = id.as_ref();
                let tool = Tool::from_id(id);
                if tool.is_none() {
                    tracing::warn!("Unknown tool '{}', skipping", id);
                }
                tool
            })
            .map(|tool| self.task_for(tool, target))
            .collect()
    }

    fn task_for(&self, tool: Tool, target: &Target) -> ScanTask {
        let target_value = tool.target_form().render(target);
        let wordlist = self.config.wordlist.display().to_string();

        let args = match &tool.overrides(&self.config).args {
            Some(custom) => render_args(custom.iter().map(String::as_str), &target_value, &wordlist),
            None => render_args(tool.default_args().iter().copied(), &target_value, &wordlist),
        };

        ScanTask::new(tool, tool.binary(&self.config), args, target_value)
    }
}

/// Placeholders are substituted inside single argv elements; the target can
/// never add or split arguments.
fn render_args<'a>(template: impl Iterator<Item = &'a str>, target: &str, wordlist: &str) -> Vec<String> {
    template
        .map(|arg| {
            arg.replace(TARGET_PLACEHOLDER, target)
                .replace(WORDLIST_PLACEHOLDER, wordlist)
        })
        .collect()
}
