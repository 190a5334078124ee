//! FusionSpace command-line entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI arguments
//!   3. Load config
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Run the requested command until it finishes or shutdown fires

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use fusionspace::ai::AiService;
use fusionspace::ai::pipeline::WebsiteGenerator;
use fusionspace::config::{self, Config};
use fusionspace::error::AppError;
use fusionspace::server::{self, AppState};
use fusionspace::templates::{self, TemplateCategory};
use fusionspace::{chains, logger};

#[derive(Debug, Parser)]
#[command(name = "fusionspace", version, about = "Generate business websites from a plain-text description")]
struct Cli {
    /// Config file (default: config/default.toml, else built-in defaults).
    #[arg(short = 'f', long = "config", global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a website and print the HTML (or write it with --out).
    Generate {
        prompt: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Skip the analysis/design chain and use the single direct prompt.
        #[arg(long)]
        direct: bool,
    },
    /// Serve the HTTP API.
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// List the prompt-chain catalog.
    Chains {
        #[arg(long)]
        category: Option<String>,
    },
    /// List starter templates, optionally filtered.
    Templates {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Run one prompt chain and print the step results as JSON.
    RunChain {
        id: String,
        input: String,
        /// Extra template variable, `name=value`. Repeatable.
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("expected name=value, got '{s}'")),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    let cli_level = logger::level_for_verbosity(cli.verbose);
    let effective_log_level = cli_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, cli_level.is_some())?;

    info!(
        app = %config.app_name,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        default_model = config.llm.default_model.as_str(),
        gemini = config.gemini_api_key.is_some(),
        openai = config.openai_api_key.is_some(),
        "config loaded"
    );

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            ctrlc_token.cancel();
        }
    });

    match cli.command {
        Command::Generate { prompt, out, direct } => generate(&config, &prompt, out, direct, shutdown).await,
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let state = AppState::from_config(&config)?;
            server::run(&bind, state, shutdown).await
        }
        Command::Chains { category } => {
            list_chains(category.as_deref());
            Ok(())
        }
        Command::Templates { category, search } => list_templates(category.as_deref(), search.as_deref()),
        Command::RunChain { id, input, vars } => {
            let context: HashMap<String, String> = vars.into_iter().collect();
            run_chain(&config, &id, &input, &context, shutdown).await
        }
    }
}

fn require_service(config: &Config) -> Result<AiService, AppError> {
    if !config.has_any_provider() {
        return Err(AppError::Config(format!(
            "no AI provider configured; set {} or {}",
            config::GEMINI_API_KEY_ENV,
            config::OPENAI_API_KEY_ENV
        )));
    }
    Ok(AiService::from_config(config)?)
}

/// Service for the website pipeline, running on the configured `llm.default` family.
fn pipeline_service(config: &Config) -> Result<AiService, AppError> {
    Ok(require_service(config)?.with_step_model(config.llm.default_model))
}

async fn generate(
    config: &Config,
    prompt: &str,
    out: Option<PathBuf>,
    direct: bool,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let generator = WebsiteGenerator::new(pipeline_service(config)?).direct_only(direct);

    let outcome = tokio::select! {
        outcome = generator.generate(prompt) => outcome,
        _ = shutdown.cancelled() => return Err(AppError::Generation("interrupted".into())),
    };

    let resp = outcome.response;
    if !resp.success {
        return Err(AppError::Generation(resp.error.unwrap_or_else(|| "unknown error".into())));
    }

    info!(
        model = %resp.model,
        path = outcome.path.as_str(),
        fallback_reason = ?outcome.fallback_reason,
        tokens = ?resp.tokens_used,
        cost = ?resp.cost,
        "website generated"
    );

    match out {
        Some(path) => {
            tokio::fs::write(&path, resp.content.as_bytes()).await?;
            info!(path = %path.display(), bytes = resp.content.len(), "website written");
        }
        None => println!("{}", resp.content),
    }
    Ok(())
}

fn list_chains(category: Option<&str>) {
    let list: Vec<_> = match category {
        Some(c) => chains::chains_by_category(c),
        None => chains::CHAINS.iter().collect(),
    };
    for chain in list {
        println!(
            "{:<20} {:<12} {} steps  ${:.3}  {}",
            chain.id,
            chain.category,
            chain.steps.len(),
            chain.cost,
            chain.name
        );
    }
}

fn list_templates(category: Option<&str>, search: Option<&str>) -> Result<(), AppError> {
    let mut list: Vec<_> = match category {
        Some(name) => {
            let category = TemplateCategory::parse(name)
                .ok_or_else(|| AppError::Config(format!("unknown template category: {name}")))?;
            templates::templates_by_category(category)
        }
        None => templates::TEMPLATES.iter().collect(),
    };
    if let Some(query) = search {
        let hits = templates::search_templates(query);
        list.retain(|t| hits.iter().any(|h| h.id == t.id));
    }
    for t in list {
        let price = if t.is_premium { format!("${}", t.price) } else { "free".to_string() };
        println!("{:<20} {:<12} {:<6} {}", t.id, t.category.label(), price, t.name);
    }
    Ok(())
}

async fn run_chain(
    config: &Config,
    id: &str,
    input: &str,
    context: &HashMap<String, String>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let service = require_service(config)?;

    let run = tokio::select! {
        run = chains::execute_chain(&service, id, input, context) => run?,
        _ = shutdown.cancelled() => return Err(AppError::Generation("interrupted".into())),
    };

    let json = serde_json::to_string_pretty(&run)
        .map_err(|e| AppError::Generation(format!("cannot encode chain result: {e}")))?;
    println!("{json}");
    Ok(())
}
