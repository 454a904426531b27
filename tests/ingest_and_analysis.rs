//! End-to-end: detections.json → SQLite store → analysis queries

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use trafficflow::analysis::defaults;
use trafficflow::ingest::ReloadTrigger;
use trafficflow::{
    DetectionAnalysis, DetectionStore, ImportStatus, IngestError, IngestPipeline,
    SqliteDetectionStore,
};

fn sqlite_store(dir: &Path) -> Arc<SqliteDetectionStore> {
    Arc::new(SqliteDetectionStore::open(dir.join("traffic.db")).unwrap())
}

fn write_detections(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("detections.json");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_empty_store_total_volume() {
    let dir = tempdir().unwrap();
    let analysis = DetectionAnalysis::new(sqlite_store(dir.path()));

    let volume = serde_json::to_value(analysis.total_volume()).unwrap();
    assert_eq!(
        volume,
        serde_json::json!({
            "total": {"car": 0, "bus": 0, "truck": 0},
            "hourly": {},
            "daily": {"weekday": 0}
        })
    );
}

#[test]
fn test_single_record_totals_and_hourly() {
    let dir = tempdir().unwrap();
    let store = sqlite_store(dir.path());
    let path = write_detections(
        dir.path(),
        r#"{"detections": [
            {"timestamp_ms": 1746090900000, "date": "2025-05-01 09:15:00",
             "objects_total": {"car": 3, "bus": 1}}
        ]}"#,
    );

    IngestPipeline::new(store.clone()).load(&path).unwrap();
    let analysis = DetectionAnalysis::new(store);

    let volume = analysis.total_volume();
    assert_eq!(volume.total.len(), 2);
    assert_eq!(volume.total.get("car"), Some(&3));
    assert_eq!(volume.total.get("bus"), Some(&1));
    assert_eq!(volume.hourly.len(), 1);
    assert_eq!(volume.hourly.get("09:00"), Some(&4));
}

#[test]
fn test_slow_lane_is_bottleneck() {
    let dir = tempdir().unwrap();
    let store = sqlite_store(dir.path());
    let path = write_detections(
        dir.path(),
        r#"{"detections": [
            {"timestamp_ms": 1, "date": "2025-05-01 09:15:00",
             "objects_by_lane": {"lane_1": {"car": 2, "truck": 1}},
             "avg_speed_by_lane": {"lane_1": 10.0}}
        ]}"#,
    );

    IngestPipeline::new(store.clone()).load(&path).unwrap();
    let analysis = DetectionAnalysis::new(store);

    let speeds = analysis.avg_speed_by_lane();
    assert_eq!(speeds.len(), 1);
    assert_eq!(speeds.get("lane_1"), Some(&10.0));

    let bottlenecks = analysis.bottlenecks();
    assert_eq!(bottlenecks.len(), 1);
    assert_eq!(bottlenecks[0].lane, "lane_1");
    assert_eq!(bottlenecks[0].avg_speed, 10.0);
    assert_eq!(bottlenecks[0].total_vehicles, 3);
}

#[test]
fn test_entry_without_timestamp_is_skipped() {
    let dir = tempdir().unwrap();
    let store = sqlite_store(dir.path());
    let path = write_detections(
        dir.path(),
        r#"{"detections": [
            {"timestamp_ms": 1, "date": "2025-05-01 08:00:00", "objects_total": {"car": 1}},
            {"date": "2025-05-01 08:01:00", "objects_total": {"bus": 1}},
            {"timestamp_ms": 3, "date": "2025-05-01 08:02:00", "objects_total": {"truck": 1}}
        ]}"#,
    );

    let result = IngestPipeline::new(store.clone()).load(&path).unwrap();
    assert_eq!(result.status, ImportStatus::Imported);
    assert_eq!(result.persisted, 2);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].index, 1);
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_empty_list_is_no_data() {
    let dir = tempdir().unwrap();
    let store = sqlite_store(dir.path());
    let path = write_detections(dir.path(), r#"{"detections": []}"#);

    let result = IngestPipeline::new(store.clone()).load(&path).unwrap();
    assert!(result.no_data());
    assert_eq!(result.persisted, 0);
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_fatal_errors_surface_through_reload() {
    let dir = tempdir().unwrap();
    let store = sqlite_store(dir.path());
    let pipeline = IngestPipeline::new(store.clone());

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        pipeline.reload(&missing),
        Err(IngestError::FileNotFound(_))
    ));

    let malformed = write_detections(dir.path(), "[1, 2, 3]");
    assert!(matches!(
        pipeline.reload(&malformed),
        Err(IngestError::MalformedDocument(_))
    ));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_reimport_appends_and_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = write_detections(
        dir.path(),
        r#"{"detections": [
            {"timestamp_ms": 20, "date": "2025-05-01 10:00:00", "objects_total": {"car": 2}},
            {"timestamp_ms": 10, "date": "2025-05-01 09:00:00", "objects_total": {"bus": 1}}
        ]}"#,
    );

    {
        let store = sqlite_store(dir.path());
        let pipeline = IngestPipeline::new(store.clone()).with_analysis_kind("axle");
        pipeline.load(&path).unwrap();
        pipeline.load(&path).unwrap();
    }

    let store = sqlite_store(dir.path());
    assert_eq!(store.count().unwrap(), 4);

    let analysis = DetectionAnalysis::new(store);
    let evolution = analysis.traffic_evolution();
    assert_eq!(evolution.len(), 4);
    assert_eq!(evolution.timestamps[0], "2025-05-01 09:00:00");
    assert_eq!(evolution.bus, vec![1, 1, 0, 0]);
    assert_eq!(evolution.car, vec![0, 0, 2, 2]);

    assert_eq!(analysis.total_volume().daily.get("weekday"), Some(&6));
    assert_eq!(analysis.array_data(), vec![20, 10, 20, 10]);
}

#[test]
fn test_every_query_has_a_shape_on_empty_store() {
    let dir = tempdir().unwrap();
    let analysis = DetectionAnalysis::new(sqlite_store(dir.path()));

    assert_eq!(analysis.volume_by_lane(), defaults::lane_volumes());
    assert_eq!(analysis.hourly_patterns().len(), 24);
    assert_eq!(analysis.avg_speed_by_lane(), defaults::lane_speeds());
    assert_eq!(analysis.speed_evolution().len(), 3);
    assert_eq!(analysis.traffic_evolution().timestamps, vec!["08:00", "09:00", "10:00"]);
    assert_eq!(analysis.vehicle_type_dominance(), defaults::dominance());
    assert_eq!(analysis.analysis_summary().data_quality, "No Data");
    assert!(analysis.list_data().is_empty());

    let bottlenecks = analysis.bottlenecks();
    assert_eq!(bottlenecks.len(), 3);
    assert!(bottlenecks.iter().all(|b| b.avg_speed == 0.0));
}
