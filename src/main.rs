use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use renewcast::{api, config, controller, telemetry};
use config::{Config, DEFAULT_CONFIG_FILE};
use controller::{batch::is_configuration_error, run_checks, AppState, BatchRunner};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "renewcast")]
#[command(author, version, about = "Renewable-share forecasts from ENTSO-E generation data")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the latest model for every country (or one) and store the forecasts
    Run {
        /// Two-letter country code; all countries with a model when omitted
        #[arg(long)]
        country: Option<String>,
    },
    /// Verify configuration, output folders and the cache server
    Check,
    /// Serve stored predictions over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    telemetry::init_tracing(cfg.logging.json);

    match cli.command {
        Commands::Check => {
            let runner = BatchRunner::from_config(&cfg)?;
            let report = run_checks(&cfg, runner.cache()).await?;
            info!(created = report.created_dirs.len(), cache = ?report.cache_reachable, "checks done");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run { country } => {
            let runner = BatchRunner::from_config(&cfg)?;
            run_checks(&cfg, runner.cache()).await?;
            let summary = match runner.run(country.as_deref(), Local::now().naive_local()).await {
                Ok(summary) => summary,
                Err(e) if is_configuration_error(&e) => {
                    error!(error = %e, "configuration error, batch aborted");
                    return Err(e);
                }
                Err(e) => return Err(e),
            };
            for (country, reason) in &summary.failed {
                warn!(%country, %reason, "country failed");
            }
            Ok(if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Serve => {
            let addr = cfg.server.socket_addr()?;
            if cfg.server.host == "0.0.0.0" {
                warn!("server binding to 0.0.0.0, predictions are reachable from the network");
            }
            let app = api::router(AppState::new(cfg));

            info!(%addr, "starting prediction server");
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(telemetry::shutdown_signal())
                .await?;

            warn!("shutdown complete");
            Ok(ExitCode::SUCCESS)
        }
    }
}
