#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::Parser;
use graphite_reporter::builder::{GraphiteBuilder, PointBuilder};
use graphite_reporter::clients::{
    AccumulatorRateFetcher, CfLightAppInfoStore, TcpGraphiteClient, build_http_client,
};
use graphite_reporter::config::{self, load_configuration_from};
use graphite_reporter::reporter::{CycleOutcome, GraphiteReporter};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Reports noisy neighbor rates to Graphite")]
struct Cli {
    /// TOML configuration file, defaults to settings.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single reporting cycle and exit
    #[arg(long)]
    once: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    load_configuration_from(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = config::get().context("Failed to get configuration")?;

    let interval = config.parse_report_interval()?;
    let http_client = build_http_client(config.parse_http_timeout()?, config.skip_cert_verify)
        .context("Failed to create HTTP client")?;

    let accumulators = config.accumulator_addresses();
    info!(?accumulators, "initializing collector with accumulators");
    let fetcher = AccumulatorRateFetcher::new(
        http_client.clone(),
        accumulators.as_slice(),
        config.accumulator_token.clone(),
    )
    .context("Invalid accumulator address")?
    .with_report_limit(config.report_limit);

    let store = CfLightAppInfoStore::new(&config.capi_addr, http_client)
        .context("Invalid Cloud Controller address")?;

    let builder: Arc<dyn PointBuilder> = Arc::new(GraphiteBuilder::new(
        Arc::new(fetcher),
        Arc::new(store),
        config.graphite_prefix.clone(),
    ));

    let graphite_client = TcpGraphiteClient::new(&config.metrics_host, config.metrics_port)
        .with_timeout(config.parse_graphite_timeout()?);

    info!(
        graphite = graphite_client.address(),
        prefix = %config.graphite_prefix,
        "initializing graphite reporter"
    );
    let mut reporter =
        GraphiteReporter::new(builder, Box::new(graphite_client)).with_interval(interval);

    if cli.once {
        return match reporter.report_once().await {
            CycleOutcome::Sent { points } => {
                info!(points, "reporting cycle completed");
                Ok(())
            }
            outcome => anyhow::bail!("Reporting cycle failed: {:?}", outcome),
        };
    }

    let ctx = CancellationToken::new();
    let shutdown = ctx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested, finishing the current cycle");
                shutdown.cancel();
            }
            Err(err) => error!(error = %err, "failed to listen for the shutdown signal"),
        }
    });

    reporter.run(ctx).await;
    Ok(())
}
