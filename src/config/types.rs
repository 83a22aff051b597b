use crate::core::scope::ScopePolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub scan: ScanConfig,
    pub tools: ToolsConfig,
    pub llm: LlmConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Wall-clock budget of a single tool run.
    pub task_timeout_secs: u64,
    pub parallel: bool,
    pub max_concurrent: usize,
    pub scope_policy: ScopePolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            task_timeout_secs: 60,
            parallel: false,
            max_concurrent: 4,
            scope_policy: ScopePolicy::Suffix,
        }
    }
}

impl ScanConfig {
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Wordlist handed to the content-discovery fuzzer.
    pub wordlist: PathBuf,
    /// Where `tools --fetch-wordlist` downloads the wordlist from.
    pub wordlist_url: String,
    pub nmap: ToolOverride,
    pub ffuf: ToolOverride,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            wordlist: PathBuf::from("wordlists/dirb/common.txt"),
            wordlist_url: "https://raw.githubusercontent.com/danielmiessler/SecLists/master/Discovery/Web-Content/common.txt"
                .to_string(),
            nmap: ToolOverride::default(),
            ffuf: ToolOverride::default(),
        }
    }
}

/// Replaces a tool's binary or argument template. Templates use `{target}`
/// and `{wordlist}` placeholders, one argument per element.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolOverride {
    pub binary: Option<String>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Groq,
    OpenAI,
    Ollama,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "https://api.groq.com/openai",
            LlmProvider::OpenAI => "https://api.openai.com",
            LlmProvider::Ollama => "http://localhost:11434",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub base_url: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Groq,
            model: "mixtral-8x7b-32768".to_string(),
            base_url: None,
            api_key_env: "GROQ_API_KEY".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured path, else `scans.db` in the per-user data directory, else
    /// `./security_scans.db` when no home directory can be resolved.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database {
            return path.clone();
        }

        match ProjectDirs::from("io", "reconguard", "reconguard") {
            Some(dirs) => dirs.data_dir().join("scans.db"),
            None => PathBuf::from("security_scans.db"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append-only log file next to the console output. `None` disables it.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from("security_scan.log")),
        }
    }
}
