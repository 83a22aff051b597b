use crate::core::target::Target;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "reconguard", version, about = "Scope-checked reconnaissance scans with AI summaries")]
pub struct Cli {
    /// Verbose human output
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Debug logs (implies verbose)
    #[arg(short = 'd', long = "debug", global = true, action = ArgAction::SetTrue)]
    pub debug: bool,

    /// Configuration file to use instead of the default search paths
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the scan pipeline against one target
    Scan(ScanArgs),

    /// Show stored scan records, most recent first
    History {
        /// Number of records to show
        #[arg(short = 'n', long = "limit", default_value_t = 20, conflicts_with = "all")]
        limit: usize,

        /// Show every stored record
        #[arg(long = "all", action = ArgAction::SetTrue)]
        all: bool,
    },

    /// Delete every stored scan record
    Clear {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long = "yes", action = ArgAction::SetTrue)]
        yes: bool,
    },

    /// List supported tools and whether their binaries are installed
    Tools {
        /// Download the ffuf wordlist if it is missing
        #[arg(long = "fetch-wordlist", action = ArgAction::SetTrue)]
        fetch_wordlist: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Target host, IP or URL
    #[arg(short = 't', long = "target")]
    pub target: String,

    /// Tool to run, repeatable (nmap, ffuf)
    #[arg(long = "tool", default_value = "nmap")]
    pub tools: Vec<String>,

    /// Allowed scope entry, repeatable. Defaults to the target itself
    #[arg(long = "scope")]
    pub scope: Vec<String>,

    /// Run tasks concurrently instead of one after another
    #[arg(long = "parallel", action = ArgAction::SetTrue)]
    pub parallel: bool,

    /// Directory to write a JSON report into
    #[arg(long = "report-dir")]
    pub report_dir: Option<PathBuf>,

    /// Print the pipeline result as JSON
    #[arg(long = "json", action = ArgAction::SetTrue)]
    pub json: bool,
}

impl ScanArgs {
    /// Explicit `--scope` entries, else the normalized host of the target.
    /// An unparsable target is kept as typed; the pipeline rejects it anyway.
    pub fn allowed_scope(&self) -> Vec<String> {
        if !self.scope.is_empty() {
            return self.scope.clone();
        }
        match Target::parse(&self.target) {
            Ok(target) => vec![target.bare_host().to_string()],
            Err(_) => vec![self.target.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_defaults() {
        let cli = Cli::parse_from(["reconguard", "scan", "-t", "example.com"]);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan command");
        };
        assert_eq!(args.tools, vec!["nmap"]);
        assert_eq!(args.allowed_scope(), vec!["example.com"]);
        assert!(!args.parallel);
    }

    #[test]
    fn test_scan_with_tools_and_scope() {
        let cli = Cli::parse_from([
            "reconguard", "-v", "scan", "-t", "api.example.com", "--tool", "nmap", "--tool", "ffuf", "--scope",
            "example.com", "--parallel",
        ]);
        assert!(cli.verbose);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan command");
        };
        assert_eq!(args.tools, vec!["nmap", "ffuf"]);
        assert_eq!(args.allowed_scope(), vec!["example.com"]);
        assert!(args.parallel);
    }

    #[test]
    fn test_default_scope_is_normalized_target_host() {
        let cli = Cli::parse_from(["reconguard", "scan", "-t", "https://www.Example.com/login"]);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan command");
        };
        assert_eq!(args.allowed_scope(), vec!["example.com"]);
    }

    #[test]
    fn test_tools_fetch_wordlist_flag() {
        let cli = Cli::parse_from(["reconguard", "tools", "--fetch-wordlist"]);
        assert!(matches!(cli.command, Command::Tools { fetch_wordlist: true }));
    }

    #[test]
    fn test_history_limit_conflicts_with_all() {
        assert!(Cli::try_parse_from(["reconguard", "history", "--limit", "5", "--all"]).is_err());
    }
}
