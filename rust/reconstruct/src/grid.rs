// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid sequencing: axis curves ordered into vertical and horizontal runs.

use crate::config::ReconstructionConfig;
use crate::report::{DropReason, ReconstructionReport};
use crate::tolerance::Tolerance;
use crate::types::{Orientation, Segment};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridLine {
    pub axis: Segment,
    pub orientation: Orientation,
    /// Set on the first line of each run; the host names the rest.
    pub name: Option<String>,
}

impl GridLine {
    pub fn is_primary(&self) -> bool {
        self.name.is_some()
    }
}

/// Vertical lines sorted by X, then horizontal lines sorted by Y. Curves that
/// are neither are dropped.
pub fn sequence_grid(
    segments: &[Segment],
    tol: &Tolerance,
    config: &ReconstructionConfig,
    report: &mut ReconstructionReport,
) -> Vec<GridLine> {
    let mut vertical = Vec::new();
    let mut horizontal = Vec::new();
    for segment in segments {
        match tol.endpoint_orientation(segment) {
            Some(Orientation::Vertical) => vertical.push(*segment),
            Some(Orientation::Horizontal) => horizontal.push(*segment),
            None => report.drop_element(DropReason::SkewedGridCurve, Some(segment.midpoint())),
        }
    }
    vertical.sort_by(|a, b| a.start.x.total_cmp(&b.start.x));
    horizontal.sort_by(|a, b| a.start.y.total_cmp(&b.start.y));

    let runs = [
        (vertical, Orientation::Vertical, &config.primary_vertical_grid_name),
        (horizontal, Orientation::Horizontal, &config.primary_horizontal_grid_name),
    ];
    let mut lines = Vec::with_capacity(segments.len());
    for (run, orientation, primary) in runs {
        for (i, axis) in run.into_iter().enumerate() {
            lines.push(GridLine {
                axis,
                orientation,
                name: (i == 0).then(|| primary.clone()),
            });
        }
    }

    debug!(lines = lines.len(), "Sequenced grid lines");
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Point3D};

    fn axis(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(Point3D::xy(x0, y0), Point3D::xy(x1, y1), Category::Axis)
    }

    #[test]
    fn test_grid_order_and_names() {
        let mut report = ReconstructionReport::new();
        let segments = vec![
            axis(0.0, 6000.0, 9000.0, 6000.0),
            axis(6000.0, 0.0, 6000.0, 9000.0),
            axis(0.0, 0.0, 9000.0, 0.0),
            axis(0.0, 0.0, 0.0, 9000.0),
            axis(0.0, 0.0, 9000.0, 9000.0),
        ];
        let lines = sequence_grid(
            &segments,
            &Tolerance::default(),
            &ReconstructionConfig::millimetres(),
            &mut report,
        );

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].orientation, Orientation::Vertical);
        assert_eq!(lines[0].axis.start.x, 0.0);
        assert_eq!(lines[0].name.as_deref(), Some("1"));
        assert_eq!(lines[1].axis.start.x, 6000.0);
        assert!(!lines[1].is_primary());
        assert_eq!(lines[2].orientation, Orientation::Horizontal);
        assert_eq!(lines[2].axis.start.y, 0.0);
        assert_eq!(lines[2].name.as_deref(), Some("A"));
        assert_eq!(lines[3].name, None);
        assert_eq!(report.count(DropReason::SkewedGridCurve), 1);
    }
}
