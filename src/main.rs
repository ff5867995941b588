use anyhow::{Context, Result};
use clap::Parser;
use lambda_runtime::{run, service_fn, Diagnostic, LambdaEvent};
use page_resizer::handler::ResizeHandler;
use page_resizer::models::{Config, JobRequest, JobResponse};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "page-resizer")]
#[command(about = "Resize page images in S3 to fit within 1000x1000")]
struct CliArgs {
    /// Process a single event JSON file instead of running under the Lambda runtime.
    #[arg(long, value_name = "PATH")]
    event: Option<PathBuf>,
}

fn read_event(path: &Path) -> Result<JobRequest> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid event JSON in {}", path.display()))
}

async fn run_once(handler: &ResizeHandler, path: &Path) -> Result<JobResponse> {
    let request = read_event(path)?;
    Ok(handler.process(request).await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "page_resizer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let config = Config::from_env()?;
    let handler = match ResizeHandler::new(&config).await {
        Ok(handler) => handler,
        Err(e) => {
            error!("Failed to initialize resizer: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(path) = args.event {
        match run_once(&handler, &path).await {
            Ok(response) => {
                println!("{}", serde_json::to_string_pretty(&response)?);
                Ok(())
            }
            Err(e) => {
                error!("Resize failed: {:#}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!("Starting page-resizer under the Lambda runtime");

        let handler = &handler;
        run(service_fn(move |event: LambdaEvent<JobRequest>| async move {
            handler
                .process(event.payload)
                .await
                .map_err(Diagnostic::from)
        }))
        .await
        .map_err(|e| anyhow::anyhow!(e))
    }
}
