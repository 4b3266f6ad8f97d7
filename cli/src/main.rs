mod config;
mod presenter;
mod service;

use analysis::{AnalysisOrchestrator, AnalysisOutcome, SelectedFile, TokioRuntime};
use clap::{Parser, Subcommand};
use config::{ConfigError, Overrides};
use presenter::{TerminalPresenter, format_advisory};
use service::ReqwestAnalysisService;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tokio::task::LocalSet;

#[derive(Parser, Debug)]
#[command(name = "kneegrade")]
#[command(about = "Knee X-ray Kellgren–Lawrence grading client")]
#[command(version)]
struct Cli {
    /// Client config file (YAML)
    #[arg(short, long, env = "KNEEGRADE_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the classification service
    #[arg(long, env = "KNEEGRADE_API_BASE")]
    api_base: Option<String>,

    /// Minimum time a result takes to appear, in milliseconds
    #[arg(long, env = "KNEEGRADE_MIN_DISPLAY_MS")]
    min_display_ms: Option<u64>,

    /// Classification request timeout in milliseconds (0 disables)
    #[arg(long, env = "KNEEGRADE_REQUEST_TIMEOUT_MS")]
    request_timeout_ms: Option<u64>,

    /// Advisory request timeout in milliseconds (0 disables)
    #[arg(long, env = "KNEEGRADE_ADVISORY_TIMEOUT_MS")]
    advisory_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grade one knee X-ray image
    Analyze {
        image: PathBuf,
        /// Exit as soon as the grade is printed
        #[arg(long)]
        no_advice: bool,
    },
    /// Check that the service is up
    Health,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to read {path}: {source}")]
    Image {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_base: self.api_base.clone(),
            min_display_ms: self.min_display_ms,
            request_timeout_ms: self.request_timeout_ms,
            advisory_timeout_ms: self.advisory_timeout_ms,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    match LocalSet::new().run_until(run(cli)).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = config::load(cli.config.as_deref(), &cli.overrides())?;
    log::debug!("Using {:?}", config);

    match cli.command {
        Command::Health => {
            let service = ReqwestAnalysisService::new(config.clone())?;
            match service.health().await {
                Ok(body) => {
                    println!("{} {}", config.health_url(), body.trim());
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Analyze { image, no_advice } => analyze(config, image, no_advice).await,
    }
}

async fn analyze(
    config: analysis::OrchestratorConfig,
    image: PathBuf,
    no_advice: bool,
) -> Result<ExitCode, CliError> {
    let bytes = tokio::fs::read(&image).await.map_err(|source| CliError::Image {
        path: image.clone(),
        source,
    })?;
    let name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| image.display().to_string());

    let service = ReqwestAnalysisService::new(config.clone())?;
    let (presenter, mut advisory) = TerminalPresenter::new();
    let orchestrator = AnalysisOrchestrator::new(service, presenter, TokioRuntime::new(), config);

    let file = SelectedFile {
        name,
        media_type: String::new(),
        bytes,
    };
    if orchestrator.validate_and_stage(file).is_err() {
        return Ok(ExitCode::FAILURE);
    }

    match orchestrator.run_analysis().await {
        Ok(AnalysisOutcome::Completed(_)) => {
            if !no_advice {
                let settled = advisory
                    .wait_for(|slot| slot.as_ref().is_some_and(|a| a.is_settled()))
                    .await;
                if let Ok(slot) = settled {
                    if let Some(display) = slot.as_ref() {
                        print!("{}", format_advisory(display));
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(AnalysisOutcome::Superseded) => {
            log::warn!("Analysis was superseded");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            log::debug!("Analysis failed: {:?}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
