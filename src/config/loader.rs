use super::types::GlobalConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "./reconguard.toml",
    "./config/reconguard.toml",
    "~/.config/reconguard/reconguard.toml",
];

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with a custom path
    pub fn load_with_custom_path(custom_path: Option<&Path>) -> Result<GlobalConfig> {
        // An explicitly requested file must load
        if let Some(path) = custom_path {
            return Self::load_from_file(path)
                .with_context(|| format!("Failed to load config from custom path: {:?}", path));
        }

        let candidates: Vec<PathBuf> = DEFAULT_CONFIG_PATHS.iter().map(|p| Self::expand_path(p)).collect();
        Self::load_first_existing(&candidates)
    }

    /// The first existing file wins and must load; a broken file is never
    /// skipped in favour of the defaults.
    fn load_first_existing(candidates: &[PathBuf]) -> Result<GlobalConfig> {
        match candidates.iter().find(|path| path.exists()) {
            Some(path) => {
                let config = Self::load_from_file(path)
                    .with_context(|| format!("Failed to load config from {:?}", path))?;
                tracing::info!("Loaded configuration from: {:?}", path);
                Ok(config)
            }
            None => {
                tracing::info!("No configuration file found, using default settings");
                Ok(GlobalConfig::default())
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<GlobalConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: GlobalConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {:?}", path))?;

        Self::validate_config(&config)?;

        Ok(config)
    }

    fn validate_config(config: &GlobalConfig) -> Result<()> {
        if config.scan.task_timeout_secs == 0 {
            anyhow::bail!("scan.task_timeout_secs must be greater than 0");
        }

        if config.scan.max_concurrent == 0 {
            anyhow::bail!("scan.max_concurrent must be greater than 0");
        }

        if config.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be greater than 0");
        }

        if !(0.0..=2.0).contains(&config.llm.temperature) {
            anyhow::bail!("llm.temperature must be between 0.0 and 2.0");
        }

        for (name, tool) in [("nmap", &config.tools.nmap), ("ffuf", &config.tools.ffuf)] {
            if tool.binary.as_deref().is_some_and(|b| b.trim().is_empty()) {
                anyhow::bail!("tools.{}.binary cannot be empty", name);
            }

            // Without the placeholder the tool would scan something other than the checked target
            if let Some(args) = &tool.args {
                if !args.iter().any(|arg| arg.contains("{target}")) {
                    anyhow::bail!("tools.{}.args must contain a {{target}} placeholder", name);
                }
            }
        }

        Ok(())
    }

    fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home).join(rest);
            }
        }
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scope::ScopePolicy;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_custom_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
[scan]
parallel = true
max_concurrent = 2
scope_policy = "subdomain"

[tools]
wordlist = "/opt/lists/common.txt"

[tools.nmap]
binary = "/usr/local/bin/nmap"

[llm]
model = "llama-3.1-8b-instant"
timeout_secs = 10
"#;
        fs::write(&temp_file, config_content).unwrap();

        let config = ConfigLoader::load_with_custom_path(Some(temp_file.path())).unwrap();
        assert!(config.scan.parallel);
        assert_eq!(config.scan.max_concurrent, 2);
        assert_eq!(config.scan.task_timeout_secs, 60);
        assert_eq!(config.scan.scope_policy, ScopePolicy::Subdomain);
        assert_eq!(config.tools.wordlist, PathBuf::from("/opt/lists/common.txt"));
        assert_eq!(config.tools.nmap.binary.as_deref(), Some("/usr/local/bin/nmap"));
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
    }

    #[test]
    fn test_validation_errors() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[scan]\ntask_timeout_secs = 0\n").unwrap();

        let result = ConfigLoader::load_with_custom_path(Some(temp_file.path()));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("task_timeout_secs must be greater than 0"));
    }

    #[test]
    fn test_override_without_target_placeholder_is_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[tools.nmap]\nargs = [\"-F\", \"10.0.0.1\"]\n").unwrap();

        let result = ConfigLoader::load_with_custom_path(Some(temp_file.path()));
        assert!(format!("{:#}", result.unwrap_err()).contains("{target}"));
    }

    #[test]
    fn test_broken_discovered_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("reconguard.toml");
        fs::write(&broken, "[scan]\nscope_policy = \"exact\"\nmax_concurrent = 0\n").unwrap();

        let result = ConfigLoader::load_first_existing(&[dir.path().join("absent.toml"), broken]);
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("max_concurrent must be greater than 0"));
    }

    #[test]
    fn test_first_existing_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.toml");
        let second = dir.path().join("second.toml");
        fs::write(&first, "[scan]\nscope_policy = \"exact\"\n").unwrap();
        fs::write(&second, "[scan]\nscope_policy = \"subdomain\"\n").unwrap();

        let config = ConfigLoader::load_first_existing(&[dir.path().join("absent.toml"), first, second]).unwrap();
        assert_eq!(config.scan.scope_policy, ScopePolicy::Exact);
    }

    #[test]
    fn test_no_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_first_existing(&[dir.path().join("absent.toml")]).unwrap();
        assert_eq!(config.scan.scope_policy, ScopePolicy::Suffix);
    }

    #[test]
    fn test_missing_custom_path_is_an_error() {
        let result = ConfigLoader::load_with_custom_path(Some(Path::new("/nonexistent/reconguard.toml")));
        assert!(result.is_err());
    }
}
