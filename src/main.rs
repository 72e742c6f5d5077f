//! pagebrief CLI - interactive webpage summarisation
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments, process-wide setup and handling top-level errors.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use pagebrief::config::{Config, Secrets};
use pagebrief::logging::{self, DEFAULT_LOG_FILE};
use pagebrief::mail::MailSettings;
use pagebrief::prompt::{PromptLibrary, DEFAULT_PROMPT};
use pagebrief::{ui, Scraper, Session, Summarizer};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "pagebrief")]
#[command(version, about = "Interactive webpage summarisation with LLMs", long_about = None)]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log file, truncated on every run
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a webpage by URL and exit
    Summarise {
        /// URL to summarize
        url: String,
        /// Show raw extracted text instead of summary
        #[arg(long)]
        raw: bool,
        /// Name of a prompt from prompt_files
        #[arg(short, long)]
        prompt: Option<String>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "pagebrief", &mut io::stdout());
        return Ok(());
    }

    // Load .env if present
    let _ = dotenvy::dotenv();

    logging::init(&cli.log_file)?;
    info!("logging started at {}", cli.log_file.display());

    let config_path = Config::resolve_path(cli.config.as_deref());
    let config = Config::load_from(&config_path)?;
    info!("config loaded successfully from: {}", config_path.display());

    match cli.command {
        Some(Commands::Summarise {
            url,
            raw,
            prompt,
            json,
        }) => summarise_once(&config, &url, raw, prompt.as_deref(), json).await,
        Some(Commands::Completions { .. }) => Ok(()),
        None => {
            let session = build_session(&config)?;
            ui::run(session).await
        }
    }
}

fn build_session(config: &Config) -> anyhow::Result<Session> {
    let scraper = Scraper::new(&config.web_scraper_config)?;
    info!("web scraper initialized");

    let summarizer = Summarizer::from_config(&config.llms_config, &Secrets::from_env())?;

    let mail = match MailSettings::from_env() {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!(error = %e, "email delivery disabled");
            None
        }
    };

    Ok(Session::new(
        scraper,
        summarizer,
        PromptLibrary::from_config(config),
        mail,
    ))
}

async fn summarise_once(
    config: &Config,
    url: &str,
    raw: bool,
    prompt_name: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let scraper = Scraper::new(&config.web_scraper_config)?;
    eprintln!("Fetching: {}", url);
    let text = scraper.fetch_text(url).await?;
    info!(url, "page text fetched");

    if raw {
        println!("{}", text);
        eprintln!("\n--- Extracted {} characters ---", text.len());
        return Ok(());
    }

    let prompts = PromptLibrary::from_config(config);
    let prompt = match prompt_name.or(prompts.default_name()) {
        Some(name) => prompts
            .load(name)
            .with_context(|| format!("loading prompt {name:?}"))?,
        None => DEFAULT_PROMPT.to_string(),
    };

    let summarizer = Summarizer::from_config(&config.llms_config, &Secrets::from_env())?;
    eprintln!(
        "Summarising {} characters with {} ({})...\n",
        text.len(),
        summarizer.model(),
        summarizer.kind()
    );

    let summary = summarizer.summarize(url, &text, &prompt).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.text);
        eprintln!("\n{}", summary_footer(&summary.url, summary.model.as_str()).dimmed());
    }

    Ok(())
}

fn summary_footer(url: &str, model: &str) -> String {
    format!("Source: {url} · Model: {model}")
}
