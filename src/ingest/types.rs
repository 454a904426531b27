//! Wire and record shapes for traffic detections
//!
//! `RawDetectionEntry` is what the detector writes into `detections.json`;
//! it only lives for the duration of an import. `DetectionRecord` is the
//! persisted form, with its three maps stored as JSON text.

use super::sparse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vehicle-type label → count (e.g. `{"car": 3, "bus": 1}`)
pub type VehicleCounts = BTreeMap<String, i64>;

/// Lane label → vehicle-type counts for that lane
pub type LaneCounts = BTreeMap<String, VehicleCounts>;

/// Lane label → average speed in km/h
pub type LaneSpeeds = BTreeMap<String, f64>;

/// One snapshot as written by the detector
///
/// Every field is optional on the wire; the loader decides which absences
/// are fatal for the entry (see `loader::convert_entry`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDetectionEntry {
    #[serde(default)]
    pub timestamp_ms: Option<i64>,

    #[serde(default)]
    pub date: Option<String>,

    #[serde(default, deserialize_with = "sparse::counts")]
    pub objects_total: Option<VehicleCounts>,

    #[serde(default, deserialize_with = "sparse::lane_counts")]
    pub objects_by_lane: Option<LaneCounts>,

    #[serde(default, deserialize_with = "sparse::speeds")]
    pub avg_speed_by_lane: Option<LaneSpeeds>,
}

/// A detection ready to be inserted (id not yet assigned)
#[derive(Debug, Clone, PartialEq)]
pub struct NewDetection {
    pub timestamp_ms: i64,
    pub date: Option<String>,
    pub objects_total: String,
    pub objects_by_lane: String,
    pub avg_speed_by_lane: String,
}

/// A persisted detection snapshot
///
/// The three map columns hold the RecordCodec encoding. Any of them may be
/// absent (`None`, blank, `"null"` or `"{}"`), which aggregation treats as
/// "contributes nothing".
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
    pub id: i64,
    pub timestamp_ms: i64,
    pub date: Option<String>,
    pub objects_total: Option<String>,
    pub objects_by_lane: Option<String>,
    pub avg_speed_by_lane: Option<String>,
}

impl DetectionRecord {
    /// Attach a store-assigned id to a pending detection
    pub fn from_new(id: i64, detection: NewDetection) -> Self {
        Self {
            id,
            timestamp_ms: detection.timestamp_ms,
            date: detection.date,
            objects_total: Some(detection.objects_total),
            objects_by_lane: Some(detection.objects_by_lane),
            avg_speed_by_lane: Some(detection.avg_speed_by_lane),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_detector_entry() {
        let json = r#"{
            "timestamp_ms": 1746090900000,
            "date": "2025-05-01 09:15:00",
            "objects_total": {"car": 3, "bus": 1},
            "objects_by_lane": {"lane_1": {"car": 2}, "lane_2": {"car": 1, "bus": 1}},
            "avg_speed_by_lane": {"lane_1": 42.5, "lane_2": 12.0}
        }"#;

        let entry: RawDetectionEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.timestamp_ms, Some(1746090900000));
        assert_eq!(entry.date.as_deref(), Some("2025-05-01 09:15:00"));

        let totals = entry.objects_total.unwrap();
        assert_eq!(totals.get("car"), Some(&3));
        assert_eq!(totals.get("bus"), Some(&1));

        let lanes = entry.objects_by_lane.unwrap();
        assert_eq!(lanes["lane_2"].get("bus"), Some(&1));

        let speeds = entry.avg_speed_by_lane.unwrap();
        assert_eq!(speeds.get("lane_1"), Some(&42.5));
    }

    #[test]
    fn test_missing_maps_are_absent() {
        let entry: RawDetectionEntry =
            serde_json::from_str(r#"{"timestamp_ms": 1, "date": "2025-05-01 08:00:00"}"#).unwrap();
        assert!(entry.objects_total.is_none());
        assert!(entry.objects_by_lane.is_none());
        assert!(entry.avg_speed_by_lane.is_none());
    }

    #[test]
    fn test_record_from_new_keeps_fields() {
        let pending = NewDetection {
            timestamp_ms: 10,
            date: Some("2025-05-01 10:00:00".to_string()),
            objects_total: r#"{"car":1}"#.to_string(),
            objects_by_lane: "{}".to_string(),
            avg_speed_by_lane: "{}".to_string(),
        };
        let record = DetectionRecord::from_new(7, pending.clone());
        assert_eq!(record.id, 7);
        assert_eq!(record.timestamp_ms, pending.timestamp_ms);
        assert_eq!(record.objects_total.as_deref(), Some(r#"{"car":1}"#));
        assert_eq!(record.objects_by_lane.as_deref(), Some("{}"));
    }
}
