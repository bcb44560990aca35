use std::io::{IsTerminal, Read};
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use titler::config::Config;
use titler::llm::openai::OpenAiInvoker;
use titler::llm::rate_limiter::RateLimiter;
use titler::pipeline::coordinator::Pipeline;
use titler::topics::model::InputText;

/// Used when no text is given on the command line, in a file, or on stdin.
const SAMPLE_TEXT: &str = "LangGraph introduces a graph-based paradigm for building LLM-powered agents.
It allows developers to create modular, debuggable, and reliable agent workflows
using nodes, edges, and state passing.";

/// titler: extract topics from text and generate blog titles for each.
#[derive(Parser)]
#[command(name = "titler", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract topics and generate two titles per topic
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Max title requests in flight at once (default: TITLER_MAX_CONCURRENCY or 10)
        #[arg(long)]
        concurrency: Option<NonZeroUsize>,

        /// Abandon the run after this many seconds (default: TITLER_RUN_TIMEOUT_SECS)
        #[arg(long)]
        timeout: Option<NonZeroU64>,

        /// Print the result as JSON instead of a formatted list
        #[arg(long)]
        json: bool,
    },

    /// Only extract topics, without generating titles
    Topics {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show the effective configuration (API key redacted)
    Status,

    /// Serve the HTTP API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: TITLER_PORT or 3000)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (default: TITLER_BIND or 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(clap::Args)]
struct InputArgs {
    /// Text to analyze (reads --file or stdin when omitted)
    text: Option<String>,

    /// Read the text to analyze from a file
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("titler=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            concurrency,
            timeout,
            json,
        } => {
            let config = Config::load()?;
            let text = read_input(&input)?;
            let pipeline = build_pipeline(&config, concurrency)?;
            let deadline = timeout
                .map(|secs| Duration::from_secs(secs.get()))
                .or(config.run_timeout);

            if !json {
                println!("{}", "titler: blog title generator".bold());
                titler::output::terminal::display_input(&text);
                println!(
                    "\nGenerating titles ({} concurrent)...",
                    pipeline.max_concurrency()
                );
            }

            let progress = (!json).then(|| spinner("Extracting topics and drafting titles"));
            let outcome = pipeline.run_with_deadline(&text, deadline).await;
            if let Some(pb) = progress {
                pb.finish_and_clear();
            }

            let result = outcome.context("Title pipeline failed")?;

            if json {
                let report =
                    titler::output::json::TitleReport::new(&config.persona.options.model, &result);
                println!("{}", report.to_json_pretty()?);
            } else {
                titler::output::terminal::display_result(&result);
                println!("{}", "Processing complete.".bold());
            }
        }

        Commands::Topics { input } => {
            let config = Config::load()?;
            let text = read_input(&input)?;
            let pipeline = build_pipeline(&config, None)?;

            titler::output::terminal::display_input(&text);
            let pb = spinner("Extracting topics");
            let outcome = pipeline.extract_topics(&text).await;
            pb.finish_and_clear();

            let topics = outcome.context("Topic extraction failed")?;
            titler::output::terminal::display_topics(&topics);
        }

        Commands::Status => {
            let config = Config::load()?;
            titler::status::show(&config);
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            let pipeline = build_pipeline(&config, None)?;
            let state = titler::web::AppState {
                pipeline,
                run_timeout: config.run_timeout,
            };
            let port = port.unwrap_or(config.port);
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            titler::web::run_server(state, port, &bind).await?;
        }
    }

    Ok(())
}

/// Wire the OpenAI-compatible invoker into both pipeline stages.
fn build_pipeline(config: &Config, concurrency: Option<NonZeroUsize>) -> Result<Pipeline> {
    config.require_api_key()?;

    let invoker = OpenAiInvoker::new(&config.base_url, config.api_key.clone(), config.request_timeout)?
        .with_rate_limiter(config.requests_per_second.and_then(RateLimiter::per_second));

    let max_concurrency = concurrency.unwrap_or(config.max_concurrency);
    info!(
        base_url = %config.base_url,
        model = %config.persona.options.model,
        max_concurrency = max_concurrency.get(),
        "Pipeline configured"
    );

    Ok(Pipeline::from_invoker(
        Arc::new(invoker),
        config.persona.clone(),
        max_concurrency,
    ))
}

/// Resolve the input text: positional argument, then --file, then piped
/// stdin, then the built-in sample.
fn read_input(args: &InputArgs) -> Result<InputText> {
    let text = if let Some(text) = &args.text {
        text.clone()
    } else if let Some(path) = &args.file {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?
    } else if !std::io::stdin().is_terminal() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read input from stdin")?;
        buf
    } else {
        SAMPLE_TEXT.to_string()
    };

    let text = InputText::new(text);
    if text.is_blank() {
        anyhow::bail!("Input text is empty, nothing to analyze");
    }
    Ok(text)
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
