//! Command-line front end for the video service.
//!
//! ```text
//! vgen [--landscape | --portrait] --user <id> [--group <id>] <prompt...>
//! vgen --list-models
//! ```
//!
//! Every option also reads its `VGEN_*` environment variable; see `vgen --help`.

use anyhow::{anyhow, bail, Context};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Parser;
use tracing::{info, warn};

use vgen_models::CallerContext;
use vgen_service::cli::Cli;
use vgen_service::telemetry::{init_metrics, init_tracing};
use vgen_service::{
    ImageSource, LogNotifier, NoImage, StaticImage, VideoCommand, VideoGenConfig, VideoService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing()?;

    if let Some(addr) = cli.metrics_addr {
        init_metrics(addr).context("failed to start metrics exporter")?;
        info!(%addr, "Serving Prometheus metrics");
    }

    let config = VideoGenConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    if cli.list_models {
        for summary in config.model_summaries() {
            println!("{}", summary);
        }
        return Ok(());
    }

    let user = cli.user.clone().context("--user (or VGEN_TARGET_USER) is required")?;
    let caller = match cli.group.clone() {
        Some(group) if !group.is_empty() => CallerContext::group(user, group),
        _ => CallerContext::private(user),
    };

    let images: Box<dyn ImageSource> = match &cli.image {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read input image {}", path.display()))?;
            Box::new(StaticImage(STANDARD.encode(bytes)))
        }
        None => Box::new(NoImage),
    };

    info!(model = %config.components.command_model, "Starting vgen");
    let service = VideoService::new(config)?;

    let command = VideoCommand::new(caller, cli.prompt()).with_shape(cli.shape());
    let outcome = tokio::select! {
        outcome = service.handle(&command, images.as_ref(), &LogNotifier) => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Received shutdown signal");
            service.gate().close();
            bail!("interrupted");
        }
    };

    if !outcome.success {
        bail!("{} ({})", outcome.message, outcome.reason_code);
    }

    println!("{}", outcome.message);
    Ok(())
}
