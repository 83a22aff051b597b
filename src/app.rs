use crate::{
    cli::args::{Cli, Command, ScanArgs},
    config::{ConfigLoader, GlobalConfig, LlmProvider},
    core::{
        models::PipelineResult,
        pipeline::{PipelineConfig, PipelineCoordinator},
    },
    executors::SystemExecutor,
    llm::{InsightAgent, LLMClient},
    reporters::writer::{self, ScanReport},
    storage::{ScanStore, SqliteScanStore},
    tools::{
        checker::ToolChecker,
        wordlist::{self, WordlistStatus},
        Tool,
    },
    ui::{printer, progress::ScanSpinner},
    utils::logging,
};
use anyhow::{Context, Result};
use colored::*;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

pub async fn run(cli: Cli) -> Result<()> {
    // Config first: it decides where the log file goes
    let config = ConfigLoader::load_with_custom_path(cli.config.as_deref())?;

    let level = logging::level_from_cli(&cli);
    logging::init(level, config.logging.file.as_deref())?;

    match &cli.command {
        Command::Scan(args) => scan(&config, args).await,
        Command::History { limit, all } => history(&config, *limit, *all).await,
        Command::Clear { yes } => clear(&config, *yes).await,
        Command::Tools { fetch_wordlist } => tools(&config, *fetch_wordlist).await,
    }
}

fn open_store(config: &GlobalConfig) -> Result<SqliteScanStore> {
    let path = config.storage.database_path();
    tracing::debug!("Opening scan database at {}", path.display());
    SqliteScanStore::new(&path).with_context(|| format!("Failed to open scan database {}", path.display()))
}

async fn scan(config: &GlobalConfig, args: &ScanArgs) -> Result<()> {
    tracing::info!("Starting scan for target: {}", args.target);

    let mut pipeline_config = PipelineConfig::from(config);
    if args.parallel {
        pipeline_config.parallel = true;
    }

    let requested: Vec<Tool> = args.tools.iter().filter_map(|id| Tool::from_id(id)).collect();
    printer::print_warnings(&ToolChecker::new(&config.tools).preflight(&requested));

    if config.llm.provider != LlmProvider::Ollama && config.llm.api_key().is_none() {
        tracing::warn!(
            "{} is not set; the scan will run without AI analysis",
            config.llm.api_key_env
        );
    }

    let store = Arc::new(open_store(config)?);
    let summarizer = Arc::new(LLMClient::from_env(config.llm.clone())?);
    let agent = InsightAgent::new(summarizer, config.llm.timeout());
    let coordinator = PipelineCoordinator::new(pipeline_config, store, Arc::new(SystemExecutor), agent);

    let scope = args.allowed_scope();
    let spinner = (!args.json).then(|| ScanSpinner::start(&format!("Scanning {}...", args.target)));

    let outcome = coordinator.run(&args.target, &args.tools, &scope).await;
    if let Some(spinner) = &spinner {
        match &outcome {
            Ok(PipelineResult::Completed { results, .. }) => {
                spinner.finish(&format!("{} task(s) finished", results.len()))
            }
            _ => spinner.clear(),
        }
    }
    let result = outcome.context("Scan aborted")?;

    if let Some(dir) = &args.report_dir {
        let report = ScanReport::new(&args.target, &args.tools, &scope, &result);
        let path = writer::write_report(dir, &report)?;
        if !args.json {
            println!("{} {}", "Report written to".dimmed(), path.display());
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    match &result {
        PipelineResult::Completed { analysis, results } => {
            if !args.json {
                printer::print_completed(&args.target, analysis, results);
            }
            Ok(())
        }
        PipelineResult::Rejected { error } => anyhow::bail!("{}", error),
    }
}

async fn history(config: &GlobalConfig, limit: usize, all: bool) -> Result<()> {
    let store = open_store(config)?;
    let records = if all {
        store.list_all().await?
    } else {
        store.list_recent(limit).await?
    };
    printer::print_history(&records);
    Ok(())
}

async fn clear(config: &GlobalConfig, yes: bool) -> Result<()> {
    let store = open_store(config)?;

    if !yes && !confirm("Delete every stored scan record?")? {
        println!("{}", "Aborted.".dimmed());
        return Ok(());
    }

    let removed = store.clear_all().await?;
    println!("{} {} record(s)", "Removed".green().bold(), removed);
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question.yellow().bold());
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn tools(config: &GlobalConfig, fetch_wordlist: bool) -> Result<()> {
    let statuses = ToolChecker::new(&config.tools).check_all(&Tool::ALL);
    println!("{}", printer::tools_table(&statuses));

    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let path = wordlist::resolve(&config.tools.wordlist, &cwd);

    if fetch_wordlist {
        match wordlist::ensure_wordlist(&path, &config.tools.wordlist_url).await? {
            WordlistStatus::AlreadyPresent(path) => {
                println!("{} {}", "Wordlist already present:".dimmed(), path.display())
            }
            WordlistStatus::Downloaded { path, bytes } => {
                println!("{} {} ({} bytes)", "Downloaded wordlist to".green().bold(), path.display(), bytes)
            }
        }
    } else if !path.exists() {
        printer::print_warnings(&[format!(
            "ffuf wordlist {} does not exist (run `reconguard tools --fetch-wordlist`)",
            path.display()
        )]);
    }

    Ok(())
}
