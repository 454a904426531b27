//! Analysis - detection store → dashboard datasets
//!
//! `aggregate` holds the pure functions over a record snapshot;
//! `DetectionAnalysis` wraps them so that no query ever fails.

pub mod aggregate;
pub mod defaults;
pub mod engine;
pub mod structures;
pub mod types;

pub use aggregate::{extract_hour, BOTTLENECK_SPEED_THRESHOLD};
pub use engine::{AnalysisError, DetectionAnalysis};
pub use structures::{ListItem, TreeNode};
pub use types::{
    AnalysisSummary, Bottleneck, Dominance, HourlyCounts, LaneAverages, SpeedEvolution,
    TotalVolume, TrafficEvolution,
};
