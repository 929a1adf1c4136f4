//! commitment-pool-ledger server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use commitment_pool_ledger::api;
use commitment_pool_ledger::app_state::AppState;
use commitment_pool_ledger::config::{LedgerConfig, LogFormat};
use commitment_pool_ledger::domain::{EventBus, InMemoryCustody, PoolRegistry, SystemClock};
use commitment_pool_ledger::persistence::{PostgresPersistence, SnapshotSink, tasks};
use commitment_pool_ledger::service::LedgerService;

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Plain => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = LedgerConfig::from_env()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting commitment-pool-ledger");

    // Domain layer
    let registry = Arc::new(PoolRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    let mut snapshots: Option<Arc<dyn SnapshotSink>> = None;
    if config.persistence_enabled {
        let store = PostgresPersistence::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        tasks::restore_registry(&store, &registry)
            .await
            .context("restoring pool snapshots")?;
        if config.event_log_enabled {
            tasks::spawn_event_log_writer(store.clone(), &event_bus);
        }
        snapshots = Some(Arc::new(store.clone()));
        tasks::spawn_snapshot_task(
            store,
            Arc::clone(&registry),
            Duration::from_secs(config.snapshot_interval_secs),
            config.cleanup_after_days,
        );
        tracing::info!("persistence enabled");
    }

    tracing::warn!("custody is in-memory; account balances reset on restart");

    if config.operator.is_none() {
        tracing::warn!("OPERATOR_ADDRESS not set; dust sweeping is disabled");
    }

    // Service layer
    let ledger = Arc::new(
        LedgerService::new(
            registry,
            Arc::new(InMemoryCustody::new()),
            Arc::new(SystemClock),
            event_bus,
        )
        .with_operator(config.operator)
        .with_snapshots(snapshots),
    );

    let app_state = AppState::new(ledger, config.faucet_enabled);
    let app = api::build_app(app_state, Duration::from_secs(config.request_timeout_secs));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
