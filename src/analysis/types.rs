//! Result shapes returned by the analysis engine
//!
//! Serialized field names match what the dashboard consumes, so a transport
//! layer can emit these values unchanged.

use crate::ingest::types::VehicleCounts;
use serde::Serialize;
use std::collections::BTreeMap;

/// `"HH:00"` bucket → vehicle count
pub type HourlyCounts = BTreeMap<String, i64>;

/// Lane label → average speed (km/h, 2 decimals)
pub type LaneAverages = BTreeMap<String, f64>;

/// Vehicle type → share of all counted vehicles (percent, 2 decimals)
pub type Dominance = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalVolume {
    pub total: VehicleCounts,
    pub hourly: HourlyCounts,
    pub daily: BTreeMap<String, i64>,
}

/// A lane whose average speed is below the bottleneck threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bottleneck {
    pub lane: String,
    pub avg_speed: f64,
    pub total_vehicles: i64,
}

/// Per-record vehicle counts in timestamp order (parallel arrays)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficEvolution {
    pub timestamps: Vec<String>,
    pub car: Vec<i64>,
    pub bus: Vec<i64>,
    pub truck: Vec<i64>,
}

impl TrafficEvolution {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            timestamps: Vec::with_capacity(capacity),
            car: Vec::with_capacity(capacity),
            bus: Vec::with_capacity(capacity),
            truck: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Per-record lane speeds in timestamp order (parallel arrays)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedEvolution {
    pub timestamps: Vec<String>,
    pub lane_1: Vec<f64>,
    pub lane_2: Vec<f64>,
    pub lane_3: Vec<f64>,
}

impl SpeedEvolution {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            timestamps: Vec::with_capacity(capacity),
            lane_1: Vec::with_capacity(capacity),
            lane_2: Vec::with_capacity(capacity),
            lane_3: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_detections: u64,
    pub total_volume: VehicleCounts,
    pub avg_speed_by_lane: LaneAverages,
    pub last_updated: String,
    pub data_quality: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bottleneck_serializes_camel_case() {
        let bottleneck = Bottleneck {
            lane: "lane_2".to_string(),
            avg_speed: 9.5,
            total_vehicles: 12,
        };
        assert_eq!(
            serde_json::to_value(&bottleneck).unwrap(),
            json!({"lane": "lane_2", "avgSpeed": 9.5, "totalVehicles": 12})
        );
    }

    #[test]
    fn test_summary_field_names() {
        let summary = AnalysisSummary {
            total_detections: 0,
            total_volume: VehicleCounts::new(),
            avg_speed_by_lane: LaneAverages::new(),
            last_updated: "2025-05-01T09:00:00".to_string(),
            data_quality: "No Data".to_string(),
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert!(value.get("totalDetections").is_some());
        assert!(value.get("avgSpeedByLane").is_some());
        assert_eq!(value["dataQuality"], "No Data");
    }
}
