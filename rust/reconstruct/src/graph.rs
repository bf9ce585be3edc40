// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall connectivity graph and axis builder.
//!
//! Junction points ("knots") live in a [`KnotArena`]; wall segments refer to
//! them by [`KnotId`] only. Knots are appended while the graph is walked and
//! their keys stay valid for the whole run, so a wall segment never holds a
//! pointer into the arena.
//!
//! ## Pipeline
//!
//! 1. Each wall segment collects its *connect points*: endpoints of one
//!    boundary line lying inside the span of the other boundary line.
//! 2. Two wall segments are neighbors when any of their connect points
//!    coincide. A vertical/horizontal neighbor pair yields one knot at the
//!    crossing of their midlines.
//! 3. Wall segments left with fewer than two knots get synthetic knots at
//!    the ends where both boundary lines stop at the same coordinate.
//! 4. Knots of each wall segment are ordered by `x + y` and consecutive knots
//!    become wall axis pieces.

use crate::config::Thresholds;
use crate::pairing::WallSegmentPair;
use crate::report::{DropReason, ReconstructionReport};
use crate::tolerance::Tolerance;
use crate::types::{Category, Orientation, Point3D, Segment};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::{debug, info};

new_key_type! {
    /// Key of a junction point in the [`KnotArena`].
    pub struct KnotId;
}

/// A junction point between wall axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knot {
    pub position: Point3D,
    /// Created for a dangling wall end rather than found at a junction.
    pub synthetic: bool,
}

/// Insertion-ordered, coordinate-deduplicated knot storage.
#[derive(Debug, Default)]
pub struct KnotArena {
    knots: SlotMap<KnotId, Knot>,
    tolerance: Tolerance,
}

impl KnotArena {
    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            knots: SlotMap::with_key(),
            tolerance,
        }
    }

    /// Return the existing knot at `position` (within tolerance on every
    /// coordinate) or append a new one. The flag is `true` when a knot was
    /// appended.
    pub fn insert_or_find(&mut self, position: Point3D, synthetic: bool) -> (KnotId, bool) {
        if let Some(id) = self.find(&position) {
            return (id, false);
        }
        (self.knots.insert(Knot { position, synthetic }), true)
    }

    pub fn find(&self, position: &Point3D) -> Option<KnotId> {
        self.knots
            .iter()
            .find(|(_, knot)| self.tolerance.same_point(&knot.position, position))
            .map(|(id, _)| id)
    }

    pub fn get(&self, id: KnotId) -> Option<&Knot> {
        self.knots.get(id)
    }

    pub fn len(&self) -> usize {
        self.knots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Knots in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (KnotId, &Knot)> {
        self.knots.iter()
    }
}

/// Straight wall ready for the host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WallPlacement {
    pub axis: Segment,
    pub thickness: f64,
    pub height: f64,
    pub base_offset: f64,
}

/// Output of the connectivity stage.
#[derive(Debug, Default)]
pub struct WallPlan {
    pub pairs: Vec<WallSegmentPair>,
    pub knots: KnotArena,
    pub walls: Vec<WallPlacement>,
}

impl WallPlan {
    /// Number of knots referenced by at least two wall segments.
    pub fn shared_knot_count(&self) -> usize {
        let mut uses: FxHashMap<KnotId, usize> = FxHashMap::default();
        for pair in &self.pairs {
            for id in &pair.knots {
                *uses.entry(*id).or_insert(0) += 1;
            }
        }
        uses.values().filter(|&&n| n >= 2).count()
    }
}

/// Endpoints of each boundary line that lie within the span of the other
/// boundary line, measured along the wall direction.
pub fn connect_points(pair: &WallSegmentPair, tol: &Tolerance) -> SmallVec<[Point3D; 4]> {
    let along = pair.orientation(tol);
    let mut points = SmallVec::new();
    for (line, other) in [(&pair.bl1, &pair.bl2), (&pair.bl2, &pair.bl1)] {
        let (min, max) = other.span(along);
        for p in line.endpoints() {
            let value = match along {
                Orientation::Vertical => p.y,
                Orientation::Horizontal => p.x,
            };
            if tol.within(value, min, max) {
                points.push(p);
            }
        }
    }
    points
}

/// First coincident pair of connect points, if any.
fn shared_point(a: &[Point3D], b: &[Point3D], tol: &Tolerance) -> Option<Point3D> {
    a.iter()
        .find(|p| b.iter().any(|q| tol.same_point(p, q)))
        .copied()
}

/// Knots for a wall end where both boundary lines stop at the same
/// coordinate, placed on the midline.
fn dangling_end_knots(pair: &WallSegmentPair, tol: &Tolerance) -> SmallVec<[Point3D; 2]> {
    let [p1, p2] = pair.bl1.endpoints();
    let [p3, p4] = pair.bl2.endpoints();
    let mut out = SmallVec::new();
    match pair.orientation(tol) {
        Orientation::Vertical => {
            let x = (p1.x + p3.x) / 2.0;
            for p in [p1, p2] {
                if tol.eq(p.y, p3.y) || tol.eq(p.y, p4.y) {
                    out.push(Point3D::xy(x, p.y));
                }
            }
        }
        Orientation::Horizontal => {
            let y = (p1.y + p3.y) / 2.0;
            for p in [p1, p2] {
                if tol.eq(p.x, p3.x) || tol.eq(p.x, p4.x) {
                    out.push(Point3D::xy(p.x, y));
                }
            }
        }
    }
    out
}

/// Build the connectivity graph over `pairs` and emit wall axis pieces.
pub fn build_walls(
    mut pairs: Vec<WallSegmentPair>,
    th: &Thresholds,
    report: &mut ReconstructionReport,
) -> WallPlan {
    let tol = th.tolerance;
    let mut knots = KnotArena::new(tol);

    let orientations: Vec<Orientation> = pairs.iter().map(|p| p.orientation(&tol)).collect();
    let axes: Vec<f64> = pairs.iter().map(|p| p.axis_coordinate(&tol)).collect();
    let contacts: Vec<SmallVec<[Point3D; 4]>> =
        pairs.iter().map(|p| connect_points(p, &tol)).collect();

    for i in 0..pairs.len() {
        for j in (i + 1)..pairs.len() {
            let Some(contact) = shared_point(&contacts[i], &contacts[j], &tol) else {
                continue;
            };
            let position = match (orientations[i], orientations[j]) {
                (Orientation::Vertical, Orientation::Horizontal) => Point3D::xy(axes[i], axes[j]),
                (Orientation::Horizontal, Orientation::Vertical) => Point3D::xy(axes[j], axes[i]),
                _ => {
                    debug!(at = ?contact, "Collinear wall joint");
                    report.walls.parallel_neighbors += 1;
                    continue;
                }
            };
            let (id, _) = knots.insert_or_find(position, false);
            pairs[i].add_knot(id);
            pairs[j].add_knot(id);
        }
    }

    for pair in pairs.iter_mut().filter(|p| p.knots.len() < 2) {
        for position in dangling_end_knots(pair, &tol) {
            let (id, _) = knots.insert_or_find(position, true);
            pair.add_knot(id);
        }
    }

    let mut walls = Vec::new();
    for pair in &pairs {
        if pair.knots.len() < 2 {
            report.drop_element(DropReason::UnresolvedWallEnd, Some(pair.bl1.midpoint()));
            continue;
        }
        let mut ordered: SmallVec<[Point3D; 4]> = pair
            .knots
            .iter()
            .filter_map(|id| knots.get(*id))
            .map(|k| k.position)
            .collect();
        ordered.sort_by(|a, b| (a.x + a.y).total_cmp(&(b.x + b.y)));

        let thickness = pair.thickness(&tol);
        for piece in ordered.windows(2) {
            let axis = Segment::new(piece[0], piece[1], Category::Wall);
            if axis.length() <= th.min_axis_length {
                report.drop_element(DropReason::ShortAxisSegment, Some(axis.midpoint()));
            } else if !tol.is_axis_aligned(&axis) {
                report.drop_element(DropReason::SkewedAxisSegment, Some(axis.midpoint()));
            } else {
                walls.push(WallPlacement {
                    axis,
                    thickness,
                    height: th.wall_height,
                    base_offset: th.wall_base_offset,
                });
            }
        }
    }

    let plan = WallPlan {
        pairs,
        knots,
        walls,
    };
    report.walls.knots = plan.knots.len();
    report.walls.shared_knots = plan.shared_knot_count();
    let synthesized = plan.knots.iter().filter(|(_, k)| k.synthetic).count();
    report.walls.synthesized_knots = synthesized;
    report.walls.axis_segments = plan.walls.len();

    info!(
        pairs = plan.pairs.len(),
        knots = plan.knots.len(),
        synthesized,
        walls = plan.walls.len(),
        "Built wall axes"
    );
    debug!(shared = report.walls.shared_knots, "Knot sharing");
    plan
}
