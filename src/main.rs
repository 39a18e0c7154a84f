//! WrldBldr Sim Export - Periodic simulation snapshot export
//!
//! The exporter:
//! - Drives a simulation and checks the export interval after each iteration
//! - Builds one record per entity with a per-cycle field order
//! - Publishes every record to a message broker (in-memory or Kafka)
//! - Keeps the latest cycle in an atomically replaced artifact when history
//!   is not retained

mod application;
mod domain;
mod infrastructure;

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::services::{
    ArtifactLifecycle, CycleOutcome, ExportTrigger, PublishSink, SnapshotExportService,
};
use crate::infrastructure::artifact_store::FileArtifactStore;
use crate::infrastructure::clock::SimulationClock;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::demo_world::DemoWorld;
use crate::infrastructure::publishers::PublisherFactory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wrldbldr_sim_export=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting WrldBldr Sim Export");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Retention: {:?}", config.export.retention_mode());
    tracing::info!("  Interval: {}s", config.export.interval_secs);
    tracing::info!(
        "  Broker: {} ({}) topic {}",
        config.broker.bootstrap_servers,
        config.broker.backend,
        config.broker.topic
    );

    // Long-lived broker handle, shared by every cycle
    let publisher = PublisherFactory::create(&config.broker).await?;
    let store = Arc::new(FileArtifactStore::new(&config.export.output_path)?);
    tracing::info!(
        "Artifact: {} (staged at {})",
        store.canonical_path().display(),
        store.staged_path().display()
    );

    let mut rng = StdRng::from_entropy();
    let world = Arc::new(DemoWorld::new(&config.simulation, &mut rng));
    let clock = Arc::new(SimulationClock::default());

    let service = SnapshotExportService::new(
        world.clone(),
        clock.clone(),
        ExportTrigger::new(config.export.interval_secs),
        PublishSink::new(
            publisher,
            config.broker.topic.clone(),
            Duration::from_millis(config.broker.publish_timeout_ms),
        ),
        ArtifactLifecycle::new(
            config.export.retention_mode(),
            config.export.artifact_format,
            store,
        ),
        config.broker.publish_concurrency,
    );
    tracing::info!("Snapshot export service initialized");

    // Ctrl+C cancels any running cycle as well as the driver loop
    let shutdown = service.shutdown_token();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received, stopping exporter...");
                shutdown.cancel();
            }
        }
    });

    let mut ticker =
        tokio::time::interval(Duration::from_millis(config.simulation.tick_millis.max(1)));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                world.step(&mut rng);
                let now = clock.advance(config.simulation.step_millis);

                match service.notify_iteration_concluded().await {
                    CycleOutcome::Skipped => {}
                    CycleOutcome::Completed(report) => {
                        tracing::debug!(
                            time_ms = now,
                            records = report.records_published,
                            "Snapshot exported"
                        );
                    }
                    CycleOutcome::Failed { report, error } => {
                        tracing::error!(
                            time_ms = now,
                            cycle_id = %report.cycle_id,
                            published = report.records_published,
                            failed = report.publish_failures,
                            "Snapshot export failed: {}",
                            error
                        );
                    }
                }
            }
            _ = shutdown.cancelled() => break,
        }
    }

    service.shutdown().await;
    Ok(())
}
