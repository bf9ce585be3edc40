// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pairing of wall boundary lines into wall segments.
//!
//! A wall is drawn as two parallel long edges. The pairer keeps every pair of
//! wall lines that are parallel, overlap along their direction and sit closer
//! together than the maximum wall thickness, then removes mirrored duplicates
//! and everything that is not X- or Y-aligned.

use crate::config::Thresholds;
use crate::graph::KnotId;
use crate::report::{DropReason, ReconstructionReport};
use crate::tolerance::{perpendicular_separation, Tolerance};
use crate::types::{Orientation, Segment};
use smallvec::SmallVec;
use tracing::debug;

/// Two boundary lines believed to be the long edges of one wall.
#[derive(Debug, Clone)]
pub struct WallSegmentPair {
    pub bl1: Segment,
    pub bl2: Segment,
    /// Junction points, as indices into the knot arena.
    pub knots: SmallVec<[KnotId; 4]>,
}

impl WallSegmentPair {
    pub fn new(bl1: Segment, bl2: Segment) -> Self {
        Self {
            bl1,
            bl2,
            knots: SmallVec::new(),
        }
    }

    /// `Vertical` when the edges run along Y, `Horizontal` otherwise.
    pub fn orientation(&self, tol: &Tolerance) -> Orientation {
        if tol.is_zero(self.bl1.direction().x) {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    /// Midline coordinate: mean X of the edge starts for vertical walls,
    /// mean Y otherwise.
    pub fn axis_coordinate(&self, tol: &Tolerance) -> f64 {
        match self.orientation(tol) {
            Orientation::Vertical => (self.bl1.start.x + self.bl2.start.x) / 2.0,
            Orientation::Horizontal => (self.bl1.start.y + self.bl2.start.y) / 2.0,
        }
    }

    /// Perpendicular distance between the two edges.
    pub fn thickness(&self, tol: &Tolerance) -> f64 {
        match self.orientation(tol) {
            Orientation::Vertical => (self.bl1.start.x - self.bl2.start.x).abs(),
            Orientation::Horizontal => (self.bl1.start.y - self.bl2.start.y).abs(),
        }
    }

    /// Both pairs reference the same two lines, in either order.
    pub fn same_lines(&self, other: &WallSegmentPair, tol: &Tolerance) -> bool {
        (tol.same_segment(&self.bl1, &other.bl1) && tol.same_segment(&self.bl2, &other.bl2))
            || (tol.same_segment(&self.bl1, &other.bl2) && tol.same_segment(&self.bl2, &other.bl1))
    }

    pub fn add_knot(&mut self, id: KnotId) -> bool {
        if self.knots.contains(&id) {
            false
        } else {
            self.knots.push(id);
            true
        }
    }
}

/// Whether a wall line is an end cap rather than a wall edge.
pub fn is_cap_line(line: &Segment, th: &Thresholds) -> bool {
    let tol = &th.tolerance;
    let length = line.length();
    let whitelisted = th.short_edge_whitelist.iter().any(|&l| tol.eq(length, l));
    let blacklisted = th.edge_blacklist.iter().any(|&l| tol.eq(length, l));
    (length < th.min_edge_length && !whitelisted) || blacklisted
}

/// Drop end caps, keeping the input order of the survivors.
pub fn remove_cap_lines(
    lines: &[Segment],
    th: &Thresholds,
    report: &mut ReconstructionReport,
) -> Vec<Segment> {
    let mut kept = Vec::with_capacity(lines.len());
    for line in lines {
        if is_cap_line(line, th) {
            debug!(length = line.length(), at = ?line.midpoint(), "Removed cap line");
        } else {
            kept.push(*line);
        }
    }
    report.walls.removed_cap_lines = lines.len() - kept.len();
    kept
}

/// Pairing predicate: parallel, not staggered, and not far apart (but not
/// the same line either).
pub fn is_wall_pair(a: &Segment, b: &Segment, th: &Thresholds) -> bool {
    let tol = &th.tolerance;
    if !tol.is_parallel(a, b) || !tol.spans_overlap(a, b) {
        return false;
    }
    let separation = perpendicular_separation(a, b);
    separation < th.max_wall_thickness && !tol.is_zero(separation)
}

/// Full pairing stage: cap removal, ordered pairing, deduplication and the
/// orthogonal-only filter.
pub fn pair_wall_lines(
    lines: &[Segment],
    th: &Thresholds,
    report: &mut ReconstructionReport,
) -> Vec<WallSegmentPair> {
    let tol = th.tolerance;
    report.walls.input_lines = lines.len();
    let edges = remove_cap_lines(lines, th, report);

    // Every ordered pair; mirrored duplicates are removed below.
    let mut candidates = Vec::new();
    for a in &edges {
        for b in &edges {
            if is_wall_pair(a, b, th) {
                candidates.push(WallSegmentPair::new(*a, *b));
            }
        }
    }
    report.walls.raw_pairs = candidates.len();

    let mut pairs: Vec<WallSegmentPair> = Vec::with_capacity(candidates.len() / 2);
    for candidate in candidates {
        if !pairs.iter().any(|p| p.same_lines(&candidate, &tol)) {
            pairs.push(candidate);
        }
    }
    report.walls.duplicate_pairs = report.walls.raw_pairs - pairs.len();

    let before = pairs.len();
    pairs.retain(|pair| {
        let keep = tol.is_axis_aligned(&pair.bl1);
        if !keep {
            report.drop_element(DropReason::DiagonalPair, Some(pair.bl1.midpoint()));
        }
        keep
    });
    report.walls.removed_diagonal = before - pairs.len();
    report.walls.final_pairs = pairs.len();

    debug!(
        input = lines.len(),
        edges = edges.len(),
        raw = report.walls.raw_pairs,
        pairs = pairs.len(),
        "Paired wall boundary lines"
    );
    pairs
}
