//! Null-tolerant map deserializers
//!
//! The detector occasionally emits `null` for a count or a speed. Those
//! entries carry no information, so they are dropped while parsing instead
//! of failing the whole entry.

use super::types::{LaneCounts, LaneSpeeds, VehicleCounts};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

fn drop_nulls<V>(map: BTreeMap<String, Option<V>>) -> BTreeMap<String, V> {
    map.into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
}

pub fn counts<'de, D>(deserializer: D) -> Result<Option<VehicleCounts>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<i64>>> = Option::deserialize(deserializer)?;
    Ok(raw.map(drop_nulls))
}

pub fn lane_counts<'de, D>(deserializer: D) -> Result<Option<LaneCounts>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<BTreeMap<String, Option<i64>>>>> =
        Option::deserialize(deserializer)?;

    Ok(raw.map(|lanes| {
        drop_nulls(lanes)
            .into_iter()
            .map(|(lane, vehicles)| (lane, drop_nulls(vehicles)))
            .collect()
    }))
}

pub fn speeds<'de, D>(deserializer: D) -> Result<Option<LaneSpeeds>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<f64>>> = Option::deserialize(deserializer)?;
    Ok(raw.map(drop_nulls))
}
