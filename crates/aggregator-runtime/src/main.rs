//! `aggregator` binary.

use aggregator_runtime::{
    audit_filter, create_router, run_audit_log, run_store_sweeper, AggregatorConfig,
    AggregatorContainer,
};
use aggregator_telemetry::{init_telemetry, TelemetryConfig};
use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("Failed to initialize telemetry")?;
    info!(service = %telemetry.service_name, "Starting task aggregator");

    let config = AggregatorConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    let http_addr = config.http_addr;

    let container = AggregatorContainer::build(config)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let audit_handle = tokio::spawn(run_audit_log(
        container.events.subscribe(audit_filter()),
        shutdown_rx.clone(),
    ));
    let sweeper_handle = tokio::spawn(run_store_sweeper(
        container.store.clone(),
        container.config.purge_interval,
        shutdown_rx.clone(),
    ));
    let finalizer_handle = container.finalizer.clone().map(|finalizer| {
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { finalizer.run(shutdown).await })
    });

    let listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("Failed to bind {http_addr}"))?;
    info!(%http_addr, "HTTP server listening");

    let mut server_shutdown = shutdown_rx.clone();
    let app = create_router(container.app_state());
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.changed().await;
            })
            .await
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Initiating graceful shutdown...");

    if let Err(e) = shutdown_tx.send(true) {
        error!("Failed to send shutdown signal: {}", e);
    }

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "HTTP server exited with error"),
        Err(e) => error!(error = %e, "HTTP server task panicked"),
    }
    if let Err(e) = audit_handle.await {
        error!(error = %e, "Audit task panicked");
    }
    if let Err(e) = sweeper_handle.await {
        error!(error = %e, "Store sweeper task panicked");
    }
    if let Some(handle) = finalizer_handle {
        if let Err(e) = handle.await {
            error!(error = %e, "Finalizer task panicked");
        }
    }

    info!("Shutdown complete");
    Ok(())
}
