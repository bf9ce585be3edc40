// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structured record of what a run created, what it dropped, and why.

use crate::types::{ElementKind, Point3D};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Why a curve or candidate element did not become a host element.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Wall pair that is neither X- nor Y-aligned.
    DiagonalPair,
    /// Wall pair that ended with fewer than two knots.
    UnresolvedWallEnd,
    /// Axis piece between consecutive knots at or below the minimum length.
    ShortAxisSegment,
    /// Axis piece between consecutive knots that is not axis-aligned.
    SkewedAxisSegment,
    /// Window curve that is neither horizontal nor vertical.
    SkewedOpeningCurve,
    /// Door block without exactly two isolated endpoints.
    DegenerateDoorSymbol,
    /// Door with no wall line touching its endpoints; host width falls back to zero.
    MissingHostWidth,
    /// Axis curve that is neither horizontal nor vertical.
    SkewedGridCurve,
    /// Curve type the target layer does not use (arcs outside door blocks).
    UnsupportedCurve,
    /// Column layer curve that is not a polyline profile.
    OpenColumnProfile,
}

/// One dropped element with an optional model-space location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dropped {
    pub reason: DropReason,
    pub at: Option<Point3D>,
}

/// Statistics from the wall pipeline. End caps and collinear joints are
/// expected linework and are counted here instead of in the drop list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WallStats {
    pub input_lines: usize,
    pub removed_cap_lines: usize,
    pub raw_pairs: usize,
    pub duplicate_pairs: usize,
    pub removed_diagonal: usize,
    pub final_pairs: usize,
    pub knots: usize,
    pub shared_knots: usize,
    pub synthesized_knots: usize,
    /// Touching wall pairs running in the same direction (no junction knot).
    pub parallel_neighbors: usize,
    pub axis_segments: usize,
}

/// Counts of host elements created by a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreatedCounts {
    pub walls: usize,
    pub columns: usize,
    pub windows: usize,
    pub doors: usize,
    pub grids: usize,
}

impl CreatedCounts {
    pub fn record(&mut self, kind: ElementKind) {
        match kind {
            ElementKind::Wall => self.walls += 1,
            ElementKind::Column => self.columns += 1,
            ElementKind::Window => self.windows += 1,
            ElementKind::Door => self.doors += 1,
            ElementKind::Grid => self.grids += 1,
        }
    }
}

/// Result summary of one reconstruction run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReconstructionReport {
    pub created: CreatedCounts,
    pub walls: WallStats,
    pub dropped: Vec<Dropped>,
}

impl ReconstructionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drop_element(&mut self, reason: DropReason, at: Option<Point3D>) {
        warn!(?reason, ?at, "Dropped element");
        self.dropped.push(Dropped { reason, at });
    }

    /// Number of drops recorded for `reason`.
    pub fn count(&self, reason: DropReason) -> usize {
        self.dropped.iter().filter(|d| d.reason == reason).count()
    }

    pub fn total_dropped(&self) -> usize {
        self.dropped.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_by_reason() {
        let mut report = ReconstructionReport::new();
        report.drop_element(DropReason::ShortAxisSegment, None);
        report.drop_element(DropReason::ShortAxisSegment, Some(Point3D::xy(1.0, 2.0)));
        report.drop_element(DropReason::DegenerateDoorSymbol, None);

        assert_eq!(report.count(DropReason::ShortAxisSegment), 2);
        assert_eq!(report.count(DropReason::DegenerateDoorSymbol), 1);
        assert_eq!(report.count(DropReason::DiagonalPair), 0);
        assert_eq!(report.total_dropped(), 3);
    }

    #[test]
    fn test_report_serializes_reasons_in_snake_case() {
        let mut report = ReconstructionReport::new();
        report.drop_element(DropReason::MissingHostWidth, None);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"missing_host_width\""));
    }
}
