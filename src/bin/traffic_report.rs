//! Traffic Report - one-shot dump of every analysis query
//!
//! Usage:
//!   cargo run --bin traffic_report -- [--db <path>] [--import <detections.json>]
//!
//! Without `--db` the report runs against a throwaway in-memory store, so
//! `--import` is the only source of records.

use dotenv::dotenv;
use log::info;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use trafficflow::analysis::DetectionAnalysis;
use trafficflow::config::TrafficConfig;
use trafficflow::ingest::watcher::log_import_outcome;
use trafficflow::ingest::IngestPipeline;
use trafficflow::store::{DetectionStore, InMemoryDetectionStore, SqliteDetectionStore};

fn parse_flag(args: &[String], flag: &str) -> Option<PathBuf> {
    args.iter()
        .position(|x| x == flag)
        .and_then(|idx| args.get(idx + 1))
        .map(PathBuf::from)
}

fn print_section<T: Serialize>(name: &str, value: &T) -> Result<(), serde_json::Error> {
    println!("== {} ==", name);
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let db_path = parse_flag(&args, "--db");
    let import_path = parse_flag(&args, "--import");

    let store: Arc<dyn DetectionStore> = match &db_path {
        Some(path) => Arc::new(SqliteDetectionStore::open(path)?),
        None => Arc::new(InMemoryDetectionStore::new()),
    };
    info!("📦 Using {} store", store.backend_type());

    if let Some(path) = &import_path {
        let config = TrafficConfig::from_env();
        let pipeline =
            IngestPipeline::new(store.clone()).with_analysis_kind(config.analysis_kind);
        info!("📥 Importing with {} classification", pipeline.analysis_kind());
        let outcome = pipeline.load(path);
        log_import_outcome(path, &outcome);
        outcome?;
    }

    let analysis = DetectionAnalysis::new(store);

    print_section("summary", &analysis.analysis_summary())?;
    print_section("total_volume", &analysis.total_volume())?;
    print_section("volume_by_lane", &analysis.volume_by_lane())?;
    print_section("hourly_patterns", &analysis.hourly_patterns())?;
    print_section("avg_speed_by_lane", &analysis.avg_speed_by_lane())?;
    print_section("bottlenecks", &analysis.bottlenecks())?;
    print_section("traffic_evolution", &analysis.traffic_evolution())?;
    print_section("speed_evolution", &analysis.speed_evolution())?;
    print_section("vehicle_type_dominance", &analysis.vehicle_type_dominance())?;
    print_section("array_data", &analysis.array_data())?;
    print_section("list_data", &analysis.list_data())?;
    print_section("tree_data", &analysis.tree_data())?;

    Ok(())
}
