//! Fulfillment service entry point.

use app::{App, Config, bootstrap};
use stock::{StockLedger, StockRecord};
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Seeds the ledger from `INITIAL_STOCK` (`SKU:qty` pairs separated by
/// commas). Malformed entries are logged and skipped.
async fn seed_ledger(ledger: &StockLedger) {
    let Ok(raw) = std::env::var("INITIAL_STOCK") else {
        return;
    };

    for entry in raw.split(',').filter(|e| !e.trim().is_empty()) {
        let parsed = entry
            .split_once(':')
            .and_then(|(sku, qty)| qty.trim().parse::<u32>().ok().map(|q| (sku.trim(), q)));

        match parsed {
            Some((sku, quantity)) => {
                if let Err(e) = ledger.register(StockRecord::new(sku, quantity, 10, 50)).await {
                    tracing::warn!(sku, error = %e, "skipping duplicate stock entry");
                } else {
                    tracing::info!(sku, quantity, "registered product");
                }
            }
            None => tracing::warn!(entry, "skipping malformed INITIAL_STOCK entry"),
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let ledger = StockLedger::new();
    seed_ledger(&ledger).await;

    let recipient =
        std::env::var("NOTIFY_RECIPIENT").unwrap_or_else(|_| "ops@example.com".to_string());
    // The service stays alive for the process lifetime; order intake is
    // wired in by the embedding deployment.
    let App {
        service: _service,
        runner,
        ..
    } = bootstrap(&config, ledger, recipient);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner_task = tokio::spawn(async move {
        runner.run(shutdown_rx).await;
    });

    tracing::info!(
        breaker_threshold = config.breaker_threshold,
        timeout_ms = config.reserve_timeout.as_millis() as u64,
        "fulfillment service ready"
    );

    shutdown_signal().await;

    // Stop the consumer loop; it drains pending events before exiting.
    let _ = shutdown_tx.send(true);
    let _ = runner_task.await;

    tracing::info!("service shut down gracefully");
}
