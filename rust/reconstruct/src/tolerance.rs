// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Equality, parallelism and distance predicates shared by every stage.
//!
//! All comparisons are absolute: two scalars are equal when they differ by
//! strictly less than the linear tolerance, two points coincide when every
//! coordinate is equal. Unit directions are compared component-wise with the
//! same tolerance, which is how drawing exports keep their round-off.

use crate::types::{Orientation, Point3D, Segment};
use serde::{Deserialize, Serialize};

/// Default coordinate tolerance in host native units.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Fixed absolute tolerance used by all geometric predicates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Tolerance {
    pub linear: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            linear: DEFAULT_TOLERANCE,
        }
    }
}

impl Tolerance {
    pub fn new(linear: f64) -> Self {
        Self { linear }
    }

    #[inline]
    pub fn eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.linear
    }

    #[inline]
    pub fn is_zero(&self, a: f64) -> bool {
        self.eq(a, 0.0)
    }

    pub fn same_point(&self, p: &Point3D, q: &Point3D) -> bool {
        self.eq(p.x, q.x) && self.eq(p.y, q.y) && self.eq(p.z, q.z)
    }

    /// Same endpoints in either order.
    pub fn same_segment(&self, a: &Segment, b: &Segment) -> bool {
        (self.same_point(&a.start, &b.start) && self.same_point(&a.end, &b.end))
            || (self.same_point(&a.start, &b.end) && self.same_point(&a.end, &b.start))
    }

    /// Directions equal up to sign.
    pub fn is_parallel(&self, a: &Segment, b: &Segment) -> bool {
        let da = a.direction();
        let db = b.direction();
        let same = self.eq(da.x, db.x) && self.eq(da.y, db.y) && self.eq(da.z, db.z);
        let opposite = self.eq(da.x, -db.x) && self.eq(da.y, -db.y) && self.eq(da.z, -db.z);
        same || opposite
    }

    /// Orientation of a segment judged from its unit direction; `None` for
    /// diagonal (or degenerate) segments.
    pub fn direction_orientation(&self, s: &Segment) -> Option<Orientation> {
        let d = s.direction();
        if d.norm() < 0.5 {
            return None;
        }
        if self.is_zero(d.x) {
            Some(Orientation::Vertical)
        } else if self.is_zero(d.y) {
            Some(Orientation::Horizontal)
        } else {
            None
        }
    }

    pub fn is_axis_aligned(&self, s: &Segment) -> bool {
        self.direction_orientation(s).is_some()
    }

    /// Orientation judged from raw endpoint coordinates: shared X is vertical,
    /// otherwise shared Y is horizontal. Used for openings and grid axes.
    pub fn endpoint_orientation(&self, s: &Segment) -> Option<Orientation> {
        if self.eq(s.start.x, s.end.x) {
            Some(Orientation::Vertical)
        } else if self.eq(s.start.y, s.end.y) {
            Some(Orientation::Horizontal)
        } else {
            None
        }
    }

    /// `value` lies inside `[min, max]` widened by the tolerance on both sides.
    #[inline]
    pub fn within(&self, value: f64, min: f64, max: f64) -> bool {
        value > min - self.linear && value < max + self.linear
    }

    /// The projections of `a` and `b` onto their shared direction overlap.
    pub fn spans_overlap(&self, a: &Segment, b: &Segment) -> bool {
        let d = a.direction();
        let project = |p: &Point3D| p.to_nalgebra().coords.dot(&d);
        let (a0, a1) = (project(&a.start), project(&a.end));
        let (b0, b1) = (project(&b.start), project(&b.end));
        let lo = a0.min(a1).max(b0.min(b1));
        let hi = a0.max(a1).min(b0.max(b1));
        lo < hi + self.linear
    }

    /// Same coordinate range along X (either endpoint order).
    pub fn same_x_span(&self, a: &Segment, b: &Segment) -> bool {
        (self.eq(a.start.x, b.start.x) && self.eq(a.end.x, b.end.x))
            || (self.eq(a.start.x, b.end.x) && self.eq(a.end.x, b.start.x))
    }

    /// Same coordinate range along Y (either endpoint order).
    pub fn same_y_span(&self, a: &Segment, b: &Segment) -> bool {
        (self.eq(a.start.y, b.start.y) && self.eq(a.end.y, b.end.y))
            || (self.eq(a.start.y, b.end.y) && self.eq(a.end.y, b.start.y))
    }
}

/// Distance from `b.start` to the infinite line through `a`.
pub fn perpendicular_separation(a: &Segment, b: &Segment) -> f64 {
    let d = a.direction();
    let offset = b.start.to_nalgebra() - a.start.to_nalgebra();
    if d.norm() < 0.5 {
        return offset.norm();
    }
    offset.cross(&d).norm()
}

/// Distance from a point to a bounded segment.
pub fn point_to_segment_distance(point: &Point3D, segment: &Segment) -> f64 {
    let a = segment.start.to_nalgebra();
    let b = segment.end.to_nalgebra();
    let p = point.to_nalgebra();
    let ab = b - a;
    let length_sq = ab.norm_squared();

    if length_sq < 1e-20 {
        return (p - a).norm();
    }

    let t = ((p - a).dot(&ab) / length_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use approx::assert_relative_eq;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(Point3D::xy(x0, y0), Point3D::xy(x1, y1), Category::Wall)
    }

    #[test]
    fn test_eq_is_strict() {
        let tol = Tolerance::default();
        assert!(tol.eq(1.0, 1.0009));
        assert!(!tol.eq(1.0, 1.0011));
    }

    #[test]
    fn test_parallel_ignores_sign() {
        let tol = Tolerance::default();
        assert!(tol.is_parallel(&seg(0.0, 0.0, 10.0, 0.0), &seg(5.0, 3.0, -2.0, 3.0)));
        assert!(!tol.is_parallel(&seg(0.0, 0.0, 10.0, 0.0), &seg(0.0, 0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_spans_overlap() {
        let tol = Tolerance::default();
        let a = seg(0.0, 0.0, 10.0, 0.0);
        assert!(tol.spans_overlap(&a, &seg(8.0, 1.0, 20.0, 1.0)));
        // touching end to end counts as overlapping
        assert!(tol.spans_overlap(&a, &seg(10.0, 1.0, 20.0, 1.0)));
        assert!(!tol.spans_overlap(&a, &seg(10.5, 1.0, 20.0, 1.0)));
        assert!(tol.spans_overlap(&seg(20.0, 1.0, 8.0, 1.0), &a));
    }

    #[test]
    fn test_perpendicular_separation() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        let b = seg(50.0, 2.5, 60.0, 2.5);
        assert_relative_eq!(perpendicular_separation(&a, &b), 2.5);
        assert_relative_eq!(perpendicular_separation(&b, &a), 2.5);
    }

    #[test]
    fn test_point_to_segment_distance_clamps() {
        let s = seg(0.0, 0.0, 10.0, 0.0);
        assert_relative_eq!(point_to_segment_distance(&Point3D::xy(5.0, 5.0), &s), 5.0);
        assert_relative_eq!(point_to_segment_distance(&Point3D::xy(13.0, 4.0), &s), 5.0);
    }

    #[test]
    fn test_orientations() {
        let tol = Tolerance::default();
        assert_eq!(
            tol.endpoint_orientation(&seg(1.0, 0.0, 1.0, 9.0)),
            Some(Orientation::Vertical)
        );
        assert_eq!(
            tol.direction_orientation(&seg(0.0, 2.0, 9.0, 2.0)),
            Some(Orientation::Horizontal)
        );
        assert_eq!(tol.direction_orientation(&seg(0.0, 0.0, 3.0, 4.0)), None);
    }
}
