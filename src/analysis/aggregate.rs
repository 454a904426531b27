//! Pure aggregation over a snapshot of detection records
//!
//! Every function takes the full record slice and builds its result with
//! local accumulators. Undecodable columns contribute nothing. Functions that
//! back a dashboard query fall back to the matching default dataset when the
//! live result is empty.

use super::defaults;
use super::types::{
    Bottleneck, Dominance, HourlyCounts, LaneAverages, SpeedEvolution, TotalVolume,
    TrafficEvolution,
};
use crate::ingest::codec;
use crate::ingest::types::{DetectionRecord, LaneCounts, LaneSpeeds, VehicleCounts};
use std::collections::BTreeMap;

/// Lanes averaging strictly less than this (km/h) are bottlenecks
pub const BOTTLENECK_SPEED_THRESHOLD: f64 = 15.0;

/// Date placeholder in time series for records without one
pub const MISSING_DATE: &str = "N/A";

/// `"YYYY-MM-DD HH:MM:SS"` → `"HH:00"`
///
/// `None` for absent, blank or malformed dates.
pub fn extract_hour(date: Option<&str>) -> Option<String> {
    let date = date?;
    if date.trim().is_empty() {
        return None;
    }

    let time = date.split(' ').nth(1)?;
    let hour = time.split(':').next()?;
    if hour.is_empty() {
        return None;
    }

    Some(format!("{}:00", hour))
}

/// Round half-up to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn record_total(counts: &VehicleCounts) -> i64 {
    counts.values().fold(0i64, |acc, v| acc.saturating_add(*v))
}

fn decode_totals(record: &DetectionRecord) -> Option<VehicleCounts> {
    codec::decode(record.objects_total.as_deref())
}

fn decode_lanes(record: &DetectionRecord) -> Option<LaneCounts> {
    codec::decode(record.objects_by_lane.as_deref())
}

fn decode_speeds(record: &DetectionRecord) -> Option<LaneSpeeds> {
    codec::decode(record.avg_speed_by_lane.as_deref())
}

/// Records in ascending `timestamp_ms` (ties by id)
fn chronological(records: &[DetectionRecord]) -> Vec<&DetectionRecord> {
    let mut sorted: Vec<&DetectionRecord> = records.iter().collect();
    sorted.sort_by_key(|r| (r.timestamp_ms, r.id));
    sorted
}

/// Per-type totals, per-hour totals and the weekday figure
pub fn total_volume(records: &[DetectionRecord]) -> TotalVolume {
    if records.is_empty() {
        return defaults::total_volume();
    }

    let mut totals = VehicleCounts::new();
    let mut hourly = HourlyCounts::new();

    for record in records {
        let Some(objects) = decode_totals(record) else {
            continue;
        };

        for (label, count) in &objects {
            if *count > 0 {
                let entry = totals.entry(label.clone()).or_insert(0);
                *entry = entry.saturating_add(*count);
            }
        }

        if let Some(hour) = extract_hour(record.date.as_deref()) {
            let record_sum = record_total(&objects);
            if record_sum > 0 {
                let entry = hourly.entry(hour).or_insert(0);
                *entry = entry.saturating_add(record_sum);
            }
        }
    }

    let weekday = record_total(&totals);
    let total = if totals.is_empty() {
        defaults::totals()
    } else {
        totals
    };

    TotalVolume {
        total,
        hourly,
        daily: BTreeMap::from([(defaults::WEEKDAY_KEY.to_string(), weekday)]),
    }
}

/// Per-lane, per-type sums without default fallback
///
/// A lane that appears in any record is present, even if none of its counts
/// were positive.
fn collect_lane_volumes(records: &[DetectionRecord]) -> LaneCounts {
    let mut lanes = LaneCounts::new();

    for record in records {
        let Some(record_lanes) = decode_lanes(record) else {
            continue;
        };

        for (lane, vehicles) in record_lanes {
            let lane_totals = lanes.entry(lane).or_default();
            for (vehicle_type, count) in vehicles {
                if count > 0 {
                    let entry = lane_totals.entry(vehicle_type).or_insert(0);
                    *entry = entry.saturating_add(count);
                }
            }
        }
    }

    lanes
}

pub fn volume_by_lane(records: &[DetectionRecord]) -> LaneCounts {
    let lanes = collect_lane_volumes(records);
    if lanes.is_empty() {
        defaults::lane_volumes()
    } else {
        lanes
    }
}

pub fn hourly_patterns(records: &[DetectionRecord]) -> HourlyCounts {
    let mut pattern = HourlyCounts::new();

    for record in records {
        let Some(hour) = extract_hour(record.date.as_deref()) else {
            continue;
        };
        let Some(objects) = decode_totals(record) else {
            continue;
        };

        let record_sum = record_total(&objects);
        if record_sum > 0 {
            let entry = pattern.entry(hour).or_insert(0);
            *entry = entry.saturating_add(record_sum);
        }
    }

    if pattern.is_empty() {
        defaults::hourly_pattern()
    } else {
        pattern
    }
}

/// Per-lane mean of positive speed samples, without default fallback
fn collect_lane_speeds(records: &[DetectionRecord]) -> LaneAverages {
    let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for record in records {
        let Some(speeds) = decode_speeds(record) else {
            continue;
        };

        for (lane, speed) in speeds {
            if speed.is_finite() && speed > 0.0 {
                samples.entry(lane).or_default().push(speed);
            }
        }
    }

    samples
        .into_iter()
        .filter(|(_, speeds)| !speeds.is_empty())
        .map(|(lane, speeds)| {
            let average = speeds.iter().sum::<f64>() / speeds.len() as f64;
            (lane, round2(average))
        })
        .collect()
}

pub fn avg_speed_by_lane(records: &[DetectionRecord]) -> LaneAverages {
    let averages = collect_lane_speeds(records);
    if averages.is_empty() {
        defaults::lane_speeds()
    } else {
        averages
    }
}

/// Lanes slower than the threshold, with their total vehicle count
///
/// Ordered by lane label.
pub fn bottlenecks(avg_speeds: &LaneAverages, lane_volumes: &LaneCounts) -> Vec<Bottleneck> {
    avg_speeds
        .iter()
        .filter(|(_, speed)| **speed < BOTTLENECK_SPEED_THRESHOLD)
        .map(|(lane, speed)| Bottleneck {
            lane: lane.clone(),
            avg_speed: *speed,
            total_vehicles: lane_volumes.get(lane).map(record_total).unwrap_or(0),
        })
        .collect()
}

pub fn traffic_evolution(records: &[DetectionRecord]) -> TrafficEvolution {
    if records.is_empty() {
        return defaults::traffic_evolution();
    }

    let mut evolution = TrafficEvolution::with_capacity(records.len());
    for record in chronological(records) {
        evolution
            .timestamps
            .push(record.date.clone().unwrap_or_else(|| MISSING_DATE.to_string()));

        let objects = decode_totals(record).unwrap_or_default();
        let count = |label: &str| objects.get(label).copied().unwrap_or(0);
        evolution.car.push(count("car"));
        evolution.bus.push(count("bus"));
        evolution.truck.push(count("truck"));
    }

    evolution
}

pub fn speed_evolution(records: &[DetectionRecord]) -> SpeedEvolution {
    if records.is_empty() {
        return defaults::speed_evolution();
    }

    let mut evolution = SpeedEvolution::with_capacity(records.len());
    for record in chronological(records) {
        evolution
            .timestamps
            .push(record.date.clone().unwrap_or_else(|| MISSING_DATE.to_string()));

        let speeds = decode_speeds(record).unwrap_or_default();
        let speed = |lane: &str| speeds.get(lane).copied().unwrap_or(0.0);
        evolution.lane_1.push(speed("lane_1"));
        evolution.lane_2.push(speed("lane_2"));
        evolution.lane_3.push(speed("lane_3"));
    }

    evolution
}

/// Share of each vehicle type among all counted vehicles
///
/// Zero and negative counts are omitted; a zero grand total yields the
/// default dataset.
pub fn vehicle_type_dominance(totals: &VehicleCounts) -> Dominance {
    let grand_total = record_total(totals);
    if grand_total <= 0 {
        return defaults::dominance();
    }

    let dominance: Dominance = totals
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(vehicle_type, count)| {
            let share = *count as f64 / grand_total as f64;
            (vehicle_type.clone(), (share * 10_000.0).round() / 100.0)
        })
        .collect();

    if dominance.is_empty() {
        defaults::dominance()
    } else {
        dominance
    }
}
