//! Classification pass run over each raw entry during import
//!
//! Purely observational: the outcome is logged and never persisted.

use super::types::RawDetectionEntry;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    /// Vehicle totals plus per-lane speed diagnostics
    Vehicle,
    /// Estimated axle count from per-type multipliers
    Axle,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Vehicle => "vehicle",
            AnalysisKind::Axle => "axle",
        }
    }

    pub fn analyze(&self, entry: &RawDetectionEntry) -> Result<Classification, ClassificationError> {
        match self {
            AnalysisKind::Vehicle => analyze_vehicles(entry),
            AnalysisKind::Axle => estimate_axles(entry),
        }
    }
}

/// Case-insensitive; unknown tags are an error
impl FromStr for AnalysisKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vehicle" => Ok(AnalysisKind::Vehicle),
            "axle" => Ok(AnalysisKind::Axle),
            _ => Err(()),
        }
    }
}

/// Outcome of one classification pass
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    VehicleSummary {
        total_vehicles: i64,
        lanes_with_speed: usize,
    },
    AxleEstimate {
        axles: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationError {
    CountOverflow,
}

impl std::fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassificationError::CountOverflow => write!(f, "Vehicle count overflow"),
        }
    }
}

impl std::error::Error for ClassificationError {}

/// Axles per vehicle for a type label (unrecognized labels count as 2)
pub fn axles_per_vehicle(label: &str) -> i64 {
    match label.to_ascii_lowercase().as_str() {
        "car" => 2,
        "bus" => 3,
        "truck" => 4,
        _ => 2,
    }
}

/// Run the classification named by `kind` over one entry
///
/// Unknown kinds are a no-op and yield `Ok(None)`.
pub fn classify(
    kind: &str,
    entry: &RawDetectionEntry,
) -> Result<Option<Classification>, ClassificationError> {
    log::debug!(
        "🔍 Classifying entry (kind: {}, timestamp_ms: {:?})",
        kind,
        entry.timestamp_ms
    );

    match kind.parse::<AnalysisKind>() {
        Ok(analysis) => analysis.analyze(entry).map(Some),
        Err(()) => {
            log::debug!("Unrecognized analysis kind: {}", kind);
            Ok(None)
        }
    }
}

fn analyze_vehicles(entry: &RawDetectionEntry) -> Result<Classification, ClassificationError> {
    let mut total_vehicles: i64 = 0;
    if let Some(totals) = &entry.objects_total {
        for count in totals.values() {
            total_vehicles = total_vehicles
                .checked_add(*count)
                .ok_or(ClassificationError::CountOverflow)?;
        }
        log::debug!("Total vehicles: {}", total_vehicles);
    }

    let mut lanes_with_speed = 0;
    if let Some(speeds) = &entry.avg_speed_by_lane {
        for (lane, speed) in speeds {
            log::debug!("🛣️ Speed in {}: {:.2} km/h", lane, speed);
            lanes_with_speed += 1;
        }
    }

    Ok(Classification::VehicleSummary {
        total_vehicles,
        lanes_with_speed,
    })
}

fn estimate_axles(entry: &RawDetectionEntry) -> Result<Classification, ClassificationError> {
    let mut axles: i64 = 0;
    if let Some(totals) = &entry.objects_total {
        for (label, count) in totals {
            let contribution = count
                .checked_mul(axles_per_vehicle(label))
                .ok_or(ClassificationError::CountOverflow)?;
            axles = axles
                .checked_add(contribution)
                .ok_or(ClassificationError::CountOverflow)?;
        }
        log::debug!("Estimated axles: {}", axles);
    }

    Ok(Classification::AxleEstimate { axles })
}
