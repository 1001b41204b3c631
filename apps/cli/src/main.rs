use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ControllerOptions, HttpAnalysisBackend, RegenerateOutcome, SessionController, SubmitOutcome,
};
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod repl;

use config::load_settings;
use render::{print_session, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "bizlookup", about = "Look up a business and generate a marketing headline")]
struct Cli {
    /// Config file (defaults to ./bizlookup.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base URL of the analysis service.
    #[arg(long)]
    api_url: Option<String>,
    /// Per-request timeout in seconds; 0 disables it.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Print the session view as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one business and print the report.
    Analyze {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        /// Regenerate the headline this many times after the analysis.
        #[arg(long, default_value_t = 0)]
        regenerate: u32,
    },
    /// Run a lookup session driven by commands on stdin.
    Interactive,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }
    tracing::debug!(?settings, "resolved settings");

    let backend = HttpAnalysisBackend::new(&settings.api_base_url, settings.request_timeout())
        .context("failed to configure analysis backend")?;
    let mut controller = SessionController::new(
        Arc::new(backend),
        ControllerOptions {
            flip_delay: settings.flip_delay(),
        },
    );

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command {
        Command::Analyze {
            name,
            location,
            regenerate,
        } => run_analyze(&mut controller, name, location, regenerate, format).await,
        Command::Interactive => {
            repl::run(&mut controller, format).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_analyze(
    controller: &mut SessionController,
    name: String,
    location: String,
    regenerate: u32,
    format: OutputFormat,
) -> Result<ExitCode> {
    controller.set_business_name(name);
    controller.set_location(location);

    if let SubmitOutcome::Invalid(_) = controller.submit() {
        print_session(controller.session(), format)?;
        return Ok(ExitCode::from(2));
    }
    controller.settle().await;
    if controller.session().report.is_none() {
        print_session(controller.session(), format)?;
        return Ok(ExitCode::FAILURE);
    }

    for _ in 0..regenerate {
        if controller.regenerate_headline() != RegenerateOutcome::Dispatched {
            break;
        }
        controller.settle().await;
        if controller.session().notice.is_some() {
            break;
        }
    }

    print_session(controller.session(), format)?;
    Ok(ExitCode::SUCCESS)
}
