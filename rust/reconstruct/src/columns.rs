// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Column footprints from closed outlines.

use crate::report::{DropReason, ReconstructionReport};
use crate::tolerance::Tolerance;
use crate::types::{Point3D, Profile, Segment};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Axis-aligned footprint of one column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ColumnFootprint {
    /// Extent along X.
    pub width: f64,
    /// Extent along Y.
    pub depth: f64,
    pub center: Point3D,
}

impl ColumnFootprint {
    /// Bounding box of the model-space vertices. `None` for an empty profile.
    pub fn from_profile(profile: &Profile) -> Option<Self> {
        let first = profile.vertices.first()?;
        let (min, max) = profile
            .vertices
            .iter()
            .fold((*first, *first), |(lo, hi), p| {
                (
                    Point3D::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                    Point3D::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
                )
            });
        Some(Self {
            width: (max.x - min.x).abs(),
            depth: (max.y - min.y).abs(),
            center: min.midpoint(&max),
        })
    }
}

/// One footprint per column profile, plus a drop for every column-layer
/// line that is not an edge of some profile.
pub fn extract_columns(
    profiles: &[Profile],
    segments: &[Segment],
    tol: &Tolerance,
    report: &mut ReconstructionReport,
) -> Vec<ColumnFootprint> {
    for loose in segments.iter().filter(|s| !is_profile_edge(s, profiles, tol)) {
        report.drop_element(DropReason::OpenColumnProfile, Some(loose.midpoint()));
    }

    let columns: Vec<ColumnFootprint> = profiles
        .iter()
        .filter_map(ColumnFootprint::from_profile)
        .collect();
    debug!(profiles = profiles.len(), columns = columns.len(), "Extracted column footprints");
    columns
}

fn is_profile_edge(segment: &Segment, profiles: &[Profile], tol: &Tolerance) -> bool {
    profiles.iter().any(|profile| {
        profile.vertices.windows(2).any(|edge| {
            let candidate = Segment::new(edge[0], edge[1], segment.category);
            tol.same_segment(segment, &candidate)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64, w: f64, d: f64) -> Profile {
        Profile {
            vertices: vec![
                Point3D::xy(x, y),
                Point3D::xy(x + w, y),
                Point3D::xy(x + w, y + d),
                Point3D::xy(x, y + d),
                Point3D::xy(x, y),
            ],
            category: Category::Column,
        }
    }

    #[test]
    fn test_footprint_of_rectangle() {
        let column = ColumnFootprint::from_profile(&square(100.0, 200.0, 400.0, 600.0)).unwrap();
        assert_relative_eq!(column.width, 400.0);
        assert_relative_eq!(column.depth, 600.0);
        assert_relative_eq!(column.center.x, 300.0);
        assert_relative_eq!(column.center.y, 500.0);
    }

    #[test]
    fn test_loose_column_lines_are_reported() {
        let tol = Tolerance::default();
        let mut report = ReconstructionReport::new();
        let profile = square(0.0, 0.0, 500.0, 500.0);
        let segments = vec![
            Segment::new(Point3D::xy(500.0, 0.0), Point3D::xy(0.0, 0.0), Category::Column),
            Segment::new(Point3D::xy(0.0, 0.0), Point3D::xy(500.0, 500.0), Category::Column),
        ];
        let columns = extract_columns(&[profile], &segments, &tol, &mut report);

        assert_eq!(columns.len(), 1);
        assert_eq!(report.count(DropReason::OpenColumnProfile), 1);
    }
}
