//! DetectionAnalysis - never-failing query facade over the detection store
//!
//! Each query fetches a fresh snapshot with `find_all`, runs the matching
//! pure function from `aggregate`, and on a store failure logs the error and
//! returns that query's default dataset. No state is kept between queries.

use super::aggregate;
use super::defaults;
use super::structures::{self, ListItem, TreeNode};
use super::types::{
    AnalysisSummary, Bottleneck, Dominance, HourlyCounts, LaneAverages, SpeedEvolution,
    TotalVolume, TrafficEvolution,
};
use crate::ingest::types::{DetectionRecord, LaneCounts};
use crate::store::{DetectionStore, StoreError};
use chrono::NaiveDateTime;
use std::sync::Arc;

/// `lastUpdated` format: ISO-8601 local time without offset
pub const SUMMARY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub const DATA_QUALITY_GOOD: &str = "Good";
pub const DATA_QUALITY_NO_DATA: &str = "No Data";

/// A query could not read its snapshot
#[derive(Debug)]
pub struct AnalysisError(pub StoreError);

impl From<StoreError> for AnalysisError {
    fn from(err: StoreError) -> Self {
        AnalysisError(err)
    }
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Aggregation failed: {}", self.0)
    }
}

impl std::error::Error for AnalysisError {}

pub struct DetectionAnalysis {
    store: Arc<dyn DetectionStore>,

    /// Local wall clock (for testing with a fixed time)
    clock: Box<dyn Fn() -> NaiveDateTime + Send + Sync>,
}

impl DetectionAnalysis {
    pub fn new(store: Arc<dyn DetectionStore>) -> Self {
        Self::new_with_clock(store, Box::new(|| chrono::Local::now().naive_local()))
    }

    pub fn new_with_clock(
        store: Arc<dyn DetectionStore>,
        clock: Box<dyn Fn() -> NaiveDateTime + Send + Sync>,
    ) -> Self {
        Self { store, clock }
    }

    fn snapshot(&self) -> Result<Vec<DetectionRecord>, AnalysisError> {
        Ok(self.store.find_all()?)
    }

    fn query<T>(
        &self,
        operation: &str,
        compute: impl FnOnce(&[DetectionRecord]) -> T,
        fallback: impl FnOnce() -> T,
    ) -> T {
        match self.snapshot() {
            Ok(records) => compute(&records),
            Err(e) => {
                log::error!("❌ {}: {}", operation, e);
                fallback()
            }
        }
    }

    pub fn total_volume(&self) -> TotalVolume {
        self.query("total_volume", aggregate::total_volume, defaults::total_volume)
    }

    pub fn volume_by_lane(&self) -> LaneCounts {
        self.query(
            "volume_by_lane",
            aggregate::volume_by_lane,
            defaults::lane_volumes,
        )
    }

    pub fn hourly_patterns(&self) -> HourlyCounts {
        self.query(
            "hourly_patterns",
            aggregate::hourly_patterns,
            defaults::hourly_pattern,
        )
    }

    pub fn avg_speed_by_lane(&self) -> LaneAverages {
        self.query(
            "avg_speed_by_lane",
            aggregate::avg_speed_by_lane,
            defaults::lane_speeds,
        )
    }

    /// Lanes below the speed threshold
    ///
    /// Built from the same datasets `avg_speed_by_lane` and `volume_by_lane`
    /// return, so lanes reported at 0.0 km/h are bottlenecks too.
    pub fn bottlenecks(&self) -> Vec<Bottleneck> {
        self.query(
            "bottlenecks",
            |records| {
                let speeds = aggregate::avg_speed_by_lane(records);
                let volumes = aggregate::volume_by_lane(records);
                aggregate::bottlenecks(&speeds, &volumes)
            },
            || aggregate::bottlenecks(&defaults::lane_speeds(), &defaults::lane_volumes()),
        )
    }

    pub fn traffic_evolution(&self) -> TrafficEvolution {
        self.query(
            "traffic_evolution",
            aggregate::traffic_evolution,
            defaults::traffic_evolution,
        )
    }

    pub fn speed_evolution(&self) -> SpeedEvolution {
        self.query(
            "speed_evolution",
            aggregate::speed_evolution,
            defaults::speed_evolution,
        )
    }

    pub fn vehicle_type_dominance(&self) -> Dominance {
        aggregate::vehicle_type_dominance(&self.total_volume().total)
    }

    pub fn total_detections(&self) -> u64 {
        match self.store.count() {
            Ok(count) => count,
            Err(e) => {
                log::error!("❌ total_detections: {}", e);
                0
            }
        }
    }

    pub fn analysis_summary(&self) -> AnalysisSummary {
        let total_detections = self.total_detections();
        let data_quality = if total_detections > 0 {
            DATA_QUALITY_GOOD
        } else {
            DATA_QUALITY_NO_DATA
        };

        AnalysisSummary {
            total_detections,
            total_volume: self.total_volume().total,
            avg_speed_by_lane: self.avg_speed_by_lane(),
            last_updated: (self.clock)().format(SUMMARY_TIMESTAMP_FORMAT).to_string(),
            data_quality: data_quality.to_string(),
        }
    }

    pub fn array_data(&self) -> Vec<i64> {
        self.query("array_data", structures::array_data, defaults::array_data)
    }

    /// Backs the linked-list, doubly-linked, circular, stack and queue views
    pub fn list_data(&self) -> Vec<ListItem> {
        self.query("list_data", structures::list_data, defaults::list_data)
    }

    pub fn tree_data(&self) -> TreeNode {
        structures::tree_data()
    }
}
