//! Zero-filled datasets returned when there is nothing to aggregate
//!
//! Dashboards always get the same shape back, whether the store is empty,
//! every record is undecodable, or the store itself failed.

use super::structures::ListItem;
use super::types::{
    Dominance, HourlyCounts, LaneAverages, SpeedEvolution, TotalVolume, TrafficEvolution,
};
use crate::ingest::types::{LaneCounts, VehicleCounts};
use std::collections::BTreeMap;

pub const VEHICLE_TYPES: [&str; 3] = ["car", "bus", "truck"];
pub const LANES: [&str; 3] = ["lane_1", "lane_2", "lane_3"];
pub const EVOLUTION_TIMESTAMPS: [&str; 3] = ["08:00", "09:00", "10:00"];

/// Key of the only `daily` bucket reported by `total_volume`
pub const WEEKDAY_KEY: &str = "weekday";

pub const ARRAY_DATA: [i64; 10] = [45, 23, 78, 12, 90, 32, 56, 67, 89, 15];

pub fn totals() -> VehicleCounts {
    VEHICLE_TYPES.iter().map(|t| (t.to_string(), 0)).collect()
}

pub fn total_volume() -> TotalVolume {
    TotalVolume {
        total: totals(),
        hourly: HourlyCounts::new(),
        daily: BTreeMap::from([(WEEKDAY_KEY.to_string(), 0)]),
    }
}

pub fn lane_volumes() -> LaneCounts {
    LANES.iter().map(|lane| (lane.to_string(), totals())).collect()
}

/// All 24 hour buckets at zero
pub fn hourly_pattern() -> HourlyCounts {
    (0..24).map(|hour| (format!("{:02}:00", hour), 0)).collect()
}

pub fn lane_speeds() -> LaneAverages {
    LANES.iter().map(|lane| (lane.to_string(), 0.0)).collect()
}

pub fn dominance() -> Dominance {
    VEHICLE_TYPES.iter().map(|t| (t.to_string(), 0.0)).collect()
}

pub fn traffic_evolution() -> TrafficEvolution {
    TrafficEvolution {
        timestamps: EVOLUTION_TIMESTAMPS.iter().map(|t| t.to_string()).collect(),
        car: vec![0; 3],
        bus: vec![0; 3],
        truck: vec![0; 3],
    }
}

pub fn speed_evolution() -> SpeedEvolution {
    SpeedEvolution {
        timestamps: EVOLUTION_TIMESTAMPS.iter().map(|t| t.to_string()).collect(),
        lane_1: vec![0.0; 3],
        lane_2: vec![0.0; 3],
        lane_3: vec![0.0; 3],
    }
}

pub fn array_data() -> Vec<i64> {
    ARRAY_DATA.to_vec()
}

pub fn list_data() -> Vec<ListItem> {
    (1..=8)
        .map(|i| ListItem {
            id: i,
            date: format!("2025-05-0{} 12:00:00", i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hourly_pattern_has_every_hour() {
        let pattern = hourly_pattern();
        assert_eq!(pattern.len(), 24);
        assert_eq!(pattern.get("00:00"), Some(&0));
        assert_eq!(pattern.get("23:00"), Some(&0));
        assert!(pattern.values().all(|v| *v == 0));
    }

    #[test]
    fn test_evolution_defaults_are_parallel() {
        let traffic = traffic_evolution();
        assert_eq!(traffic.timestamps, vec!["08:00", "09:00", "10:00"]);
        assert_eq!(traffic.car.len(), 3);
        assert_eq!(traffic.truck.len(), 3);

        let speed = speed_evolution();
        assert_eq!(speed.len(), 3);
        assert_eq!(speed.lane_3, vec![0.0; 3]);
    }

    #[test]
    fn test_lane_volumes_shape() {
        let lanes = lane_volumes();
        assert_eq!(lanes.len(), 3);
        assert_eq!(lanes["lane_2"], totals());
    }

    #[test]
    fn test_list_defaults() {
        let items = list_data();
        assert_eq!(items.len(), 8);
        assert_eq!(items[0].date, "2025-05-01 12:00:00");
        assert_eq!(items[7].id, 8);
    }
}
