//! Traffic Runtime - long-running ingest process
//!
//! - Opens the SQLite detection store (schema applied on open)
//! - Imports detections.json once the start delay has passed
//! - Watches the file and re-imports after each burst of changes
//! - Logs a short summary on a fixed interval
//!
//! Usage:
//!   cargo run --release --bin traffic_runtime
//!
//! Environment variables:
//!   TRAFFIC_DB_PATH - SQLite database path (default: traffic.db)
//!   DETECTIONS_PATH - detections file (default: ../detections/detections.json)
//!   ANALYSIS_KIND - classification run on ingest (default: vehicle)
//!   ENABLE_WATCHER - watch the detections file (default: true)
//!   SUMMARY_INTERVAL_SECS - summary log period (default: 60)

use dotenv::dotenv;
use log::{error, info};
use std::sync::Arc;
use trafficflow::analysis::DetectionAnalysis;
use trafficflow::config::TrafficConfig;
use trafficflow::ingest::watcher::{initial_import, run_watcher};
use trafficflow::ingest::{IngestPipeline, ReloadTrigger};
use trafficflow::store::{DetectionStore, SqliteDetectionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("🚦 Traffic Runtime");

    let config = TrafficConfig::from_env();
    info!("   ├─ Database: {}", config.db_path.display());
    info!("   ├─ Detections: {}", config.detections_path.display());
    info!("   ├─ Watcher: {}", if config.enable_watcher { "ON" } else { "OFF" });
    info!("   └─ Summary interval: {}s", config.summary_interval_secs);

    info!("🔧 Opening detection store...");
    let store: Arc<dyn DetectionStore> = Arc::new(SqliteDetectionStore::open(&config.db_path)?);
    info!(
        "✅ Store ready ({} backend, {} records)",
        store.backend_type(),
        store.count()?
    );

    let pipeline = IngestPipeline::new(store.clone()).with_analysis_kind(config.analysis_kind.clone());
    info!("✅ Ingest pipeline ready (classification: {})", pipeline.analysis_kind());
    let trigger: Arc<dyn ReloadTrigger> = Arc::new(pipeline);

    let watcher_handle = if config.enable_watcher {
        let handle = tokio::spawn(run_watcher(
            config.detections_path.clone(),
            trigger.clone(),
            config.watch_config(),
            config.watch_start_delay(),
        ));
        info!("✅ Watcher scheduled (start delay: {}ms)", config.watch_start_delay_ms);
        Some(handle)
    } else {
        let path = config.detections_path.clone();
        let initial_trigger = trigger.clone();
        tokio::task::spawn_blocking(move || initial_import(&*initial_trigger, &path)).await?;
        None
    };

    let analysis = DetectionAnalysis::new(store.clone());
    let summary_interval = config.summary_interval();
    let summary_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(summary_interval);
        loop {
            ticker.tick().await;
            let summary = analysis.analysis_summary();
            info!(
                "📊 {} detections | volume {:?} | avg speed {:?} | {}",
                summary.total_detections,
                summary.total_volume,
                summary.avg_speed_by_lane,
                summary.data_quality
            );
        }
    });

    info!("🔄 Press CTRL+C to shutdown gracefully");

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("⚠️  Received CTRL+C, shutting down..."),
        Err(err) => error!("❌ Failed to listen for CTRL+C: {}", err),
    }

    summary_handle.abort();
    if let Some(handle) = watcher_handle {
        handle.abort();
    }

    info!("✅ Traffic runtime stopped");
    Ok(())
}
