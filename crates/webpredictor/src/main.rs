//! WebPredictor command-line client
//!
//! Talks to the WebPredictor API: health and scope queries, model listing,
//! CSV train/predict runs and an interactive shell.

use std::fs::File;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, Layer as _, fmt};
use webpredictor::commands::train_predict::TrainPredictArgs;
use webpredictor::commands::{self, App, Credentials};
use webpredictor::render::MessagePrinter;

/// WebPredictor API client
#[derive(Parser)]
#[command(name = "webpredictor")]
#[command(about = "Command-line client for the WebPredictor API")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API base URL (overrides the configured one)
    #[arg(long, global = true, env = "WEBPREDICTOR_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show API and model versions
    Health,

    /// Show the service description
    Welcome,

    /// List the scopes a login may request
    Scopes,

    /// List the model types available for training
    Models {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Log in, train on one CSV file and predict another
    TrainPredict(TrainPredictArgs),

    /// Start an interactive shell
    Shell,
}

fn init_logging(verbose: bool, config: &Config) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Console layer; stdout is left to command output
    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    // File layer
    let file_layer = config
        .log_file
        .as_ref()
        .map(|path| {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory {}", parent.display())
                })?;
            }
            let log_file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            anyhow::Ok(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_ansi(false)
                    .with_writer(log_file)
                    .boxed(),
            )
        })
        .transpose()?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(api_url) = &cli.api_url {
        api_url.trim_end_matches('/').clone_into(&mut config.api_base_url);
    }

    init_logging(cli.verbose, &config)?;
    info!(api_url = %config.api_base_url, "WebPredictor client starting");

    let mut app = App::new(&config)?;
    let printer = MessagePrinter::spawn(app.messages());

    let outcome = match &cli.command {
        Commands::Health => commands::health::run(&app).await,
        Commands::Welcome => commands::welcome::run(&app).await,
        Commands::Scopes => commands::scopes::run(&app).await,
        Commands::Models { credentials } => commands::models::run(&mut app, credentials).await,
        Commands::TrainPredict(args) => commands::train_predict::run(&mut app, args).await,
        Commands::Shell => commands::shell::run(&mut app).await,
    };

    printer.stop().await;
    outcome
}
