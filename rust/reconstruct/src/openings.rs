// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Window and door openings.
//!
//! Windows are drawn as several parallel lines across the wall thickness.
//! Those lines are grouped greedily: after sorting by their cross coordinate,
//! a line joins the first cluster whose first member covers the same span and
//! lies within the merge gap, otherwise it starts a new cluster. Each cluster
//! yields a host wall as thick as the cluster and one window.
//!
//! Doors are either a plain line across the opening or a block with a swing
//! (arc plus leaf line). For a block, the opening ends are the two endpoints
//! that no other sub-curve shares.

use crate::config::Thresholds;
use crate::error::{Error, Result};
use crate::report::{DropReason, ReconstructionReport};
use crate::tolerance::{point_to_segment_distance, Tolerance};
use crate::types::{Category, Orientation, Point3D, Segment, SymbolCurves};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Aligned curves merged into one physical opening.
#[derive(Debug, Clone, PartialEq)]
pub struct OpeningCluster {
    pub orientation: Orientation,
    pub members: Vec<Segment>,
}

impl OpeningCluster {
    fn new(first: Segment, orientation: Orientation) -> Self {
        Self {
            orientation,
            members: vec![first],
        }
    }

    pub fn endpoints(&self) -> Vec<Point3D> {
        self.members.iter().flat_map(|s| s.endpoints()).collect()
    }

    /// Extent across the members (the wall thickness at the opening).
    pub fn span(&self) -> f64 {
        let coords = self.endpoints().into_iter().map(|p| match self.orientation {
            Orientation::Vertical => p.x,
            Orientation::Horizontal => p.y,
        });
        let (min, max) = coords.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if min.is_finite() {
            max - min
        } else {
            0.0
        }
    }

    /// Opening width, taken from the last member.
    pub fn width(&self) -> f64 {
        self.members.last().map(Segment::length).unwrap_or(0.0)
    }

    /// Mean of all member endpoints.
    pub fn center(&self) -> Point3D {
        Point3D::centroid(&self.endpoints()).unwrap_or_default()
    }

    /// First member moved onto the cluster's center line.
    pub fn host_axis(&self) -> Segment {
        let first = self.members[0];
        let center = self.center();
        let (start, end) = match self.orientation {
            Orientation::Horizontal => (
                Point3D::new(first.start.x, center.y, first.start.z),
                Point3D::new(first.end.x, center.y, first.end.z),
            ),
            Orientation::Vertical => (
                Point3D::new(center.x, first.start.y, first.start.z),
                Point3D::new(center.x, first.end.y, first.end.z),
            ),
        };
        Segment::new(start, end, Category::Wall)
    }

    fn accepts(&self, candidate: &Segment, th: &Thresholds) -> bool {
        let tol = &th.tolerance;
        let first = &self.members[0];
        let same_span = match self.orientation {
            Orientation::Vertical => tol.same_y_span(candidate, first),
            Orientation::Horizontal => tol.same_x_span(candidate, first),
        };
        same_span && point_to_segment_distance(&first.start, candidate) < th.opening_merge_gap
    }
}

/// Split opening curves into horizontal and vertical lists, dropping the rest.
pub fn split_by_orientation(
    segments: &[Segment],
    tol: &Tolerance,
    report: &mut ReconstructionReport,
) -> (Vec<Segment>, Vec<Segment>) {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();
    for segment in segments {
        match tol.endpoint_orientation(segment) {
            Some(Orientation::Horizontal) => horizontal.push(*segment),
            Some(Orientation::Vertical) => vertical.push(*segment),
            None => report.drop_element(DropReason::SkewedOpeningCurve, Some(segment.midpoint())),
        }
    }
    (horizontal, vertical)
}

/// Greedy clustering of same-orientation curves. Every input curve ends up in
/// exactly one cluster.
pub fn cluster_segments(
    mut segments: Vec<Segment>,
    orientation: Orientation,
    th: &Thresholds,
) -> Vec<OpeningCluster> {
    segments.sort_by(|a, b| match orientation {
        Orientation::Horizontal => a.start.y.total_cmp(&b.start.y),
        Orientation::Vertical => a.start.x.total_cmp(&b.start.x),
    });

    let mut clusters: Vec<OpeningCluster> = Vec::new();
    for segment in segments {
        match clusters.iter_mut().find(|c| c.accepts(&segment, th)) {
            Some(cluster) => cluster.members.push(segment),
            None => clusters.push(OpeningCluster::new(segment, orientation)),
        }
    }
    clusters
}

/// Host wall and window for one clustered opening.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WindowPlacement {
    pub host_axis: Segment,
    pub host_width: f64,
    pub host_height: f64,
    pub center: Point3D,
    pub width: f64,
    pub height: f64,
}

/// Cluster window curves and place one window per cluster, horizontal
/// clusters first.
pub fn plan_windows(
    segments: &[Segment],
    th: &Thresholds,
    level_elevation: f64,
    report: &mut ReconstructionReport,
) -> Vec<WindowPlacement> {
    let (horizontal, vertical) = split_by_orientation(segments, &th.tolerance, report);
    let clusters = cluster_segments(horizontal, Orientation::Horizontal, th)
        .into_iter()
        .chain(cluster_segments(vertical, Orientation::Vertical, th));

    let windows: Vec<WindowPlacement> = clusters
        .map(|cluster| {
            let mut center = cluster.center();
            center.z = level_elevation + th.window_center_elevation;
            WindowPlacement {
                host_axis: cluster.host_axis(),
                host_width: cluster.span(),
                host_height: th.wall_height,
                center,
                width: cluster.width(),
                height: th.window_height,
            }
        })
        .collect();

    debug!(curves = segments.len(), windows = windows.len(), "Clustered window curves");
    windows
}

/// The two endpoints that occur exactly once among `points`.
pub fn isolated_points(points: &[Point3D], tol: &Tolerance) -> Result<(Point3D, Point3D)> {
    let isolated: Vec<Point3D> = points
        .iter()
        .filter(|p| points.iter().filter(|q| tol.same_point(p, q)).count() == 1)
        .copied()
        .collect();

    match isolated.as_slice() {
        [a, b] => Ok((*a, *b)),
        other => Err(Error::degenerate(format!(
            "door symbol has {} isolated endpoints, expected 2",
            other.len()
        ))),
    }
}

/// Shortest wall line touching either end of a door opening.
pub fn host_wall_width(opening: &Segment, wall_lines: &[Segment], tol: &Tolerance) -> Option<f64> {
    wall_lines
        .iter()
        .filter(|line| {
            tol.is_zero(point_to_segment_distance(&opening.start, line))
                || tol.is_zero(point_to_segment_distance(&opening.end, line))
        })
        .map(Segment::length)
        .reduce(f64::min)
}

/// Host wall and door for one opening.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DoorPlacement {
    pub host_axis: Segment,
    pub host_width: f64,
    pub host_height: f64,
    pub center: Point3D,
    pub width: f64,
    pub height: f64,
}

/// Door openings from plain door lines and reduced door blocks, in that order.
pub fn door_openings(
    lines: &[Segment],
    symbols: &[SymbolCurves],
    tol: &Tolerance,
    report: &mut ReconstructionReport,
) -> Vec<Segment> {
    let mut openings = lines.to_vec();
    for symbol in symbols {
        match isolated_points(&symbol.endpoints, tol) {
            Ok((start, end)) => openings.push(Segment::new(start, end, Category::Door)),
            Err(err) => {
                debug!(%err, "Skipping door block");
                let at = Point3D::centroid(&symbol.endpoints);
                report.drop_element(DropReason::DegenerateDoorSymbol, at);
            }
        }
    }
    openings
}

/// Place one door per opening in a host wall running along the opening.
pub fn plan_doors(
    openings: &[Segment],
    wall_lines: &[Segment],
    th: &Thresholds,
    report: &mut ReconstructionReport,
) -> Vec<DoorPlacement> {
    let tol = &th.tolerance;
    openings
        .iter()
        .map(|opening| {
            let host_width = host_wall_width(opening, wall_lines, tol).unwrap_or_else(|| {
                report.drop_element(DropReason::MissingHostWidth, Some(opening.midpoint()));
                0.0
            });
            DoorPlacement {
                host_axis: Segment::new(opening.start, opening.end, Category::Wall),
                host_width,
                host_height: th.wall_height,
                center: opening.midpoint(),
                width: opening.length(),
                height: th.door_height,
            }
        })
        .collect()
}
