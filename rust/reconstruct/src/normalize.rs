// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry normalization: nested blocks and polylines in, flat
//! category-tagged model-space curves out.

use crate::drawing::{DrawingObject, Shape};
use crate::layers::LayerMap;
use crate::report::{DropReason, ReconstructionReport};
use crate::types::{Category, Point3D, Profile, Segment, SymbolCurves};
use nalgebra::Matrix4;
use tracing::debug;

/// Flat, model-space output of the normalizer.
#[derive(Debug, Clone, Default)]
pub struct NormalizedGeometry {
    /// Lines and decomposed polylines.
    pub segments: Vec<Segment>,
    /// Polylines kept whole (column outlines).
    pub profiles: Vec<Profile>,
    /// Door blocks, left unsimplified.
    pub symbols: Vec<SymbolCurves>,
}

impl NormalizedGeometry {
    pub fn segments_of(&self, category: Category) -> Vec<Segment> {
        self.segments
            .iter()
            .filter(|s| s.category == category)
            .copied()
            .collect()
    }

    pub fn profiles_of(&self, category: Category) -> Vec<Profile> {
        self.profiles
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect()
    }

    pub fn symbols_of(&self, category: Category) -> Vec<SymbolCurves> {
        self.symbols
            .iter()
            .filter(|s| s.category == category)
            .cloned()
            .collect()
    }

    /// Append another normalization result (second pick of a command).
    pub fn extend(&mut self, other: NormalizedGeometry) {
        self.segments.extend(other.segments);
        self.profiles.extend(other.profiles);
        self.symbols.extend(other.symbols);
    }
}

/// Flatten `objects` into model space, keeping only curves whose layer maps
/// to one of `wanted`.
pub fn normalize(
    objects: &[DrawingObject],
    layers: &LayerMap,
    wanted: &[Category],
    report: &mut ReconstructionReport,
) -> NormalizedGeometry {
    let mut out = NormalizedGeometry::default();
    let mut walker = Walker {
        layers,
        wanted,
        out: &mut out,
        report,
    };
    walker.walk(objects, &Matrix4::identity());

    debug!(
        segments = out.segments.len(),
        profiles = out.profiles.len(),
        symbols = out.symbols.len(),
        "Normalized drawing geometry"
    );
    out
}

struct Walker<'a> {
    layers: &'a LayerMap,
    wanted: &'a [Category],
    out: &'a mut NormalizedGeometry,
    report: &'a mut ReconstructionReport,
}

impl Walker<'_> {
    fn category_of(&self, obj: &DrawingObject) -> Category {
        obj.layer
            .as_deref()
            .and_then(|name| self.layers.get(name))
            .copied()
            .unwrap_or(Category::Unknown)
    }

    fn walk(&mut self, objects: &[DrawingObject], transform: &Matrix4<f64>) {
        for obj in objects {
            let category = self.category_of(obj);
            let wanted = self.wanted.contains(&category);

            match &obj.shape {
                Shape::Instance { placement, objects } => {
                    let composed = transform * placement.to_matrix();
                    if wanted && category == Category::Door {
                        let mut endpoints = Vec::new();
                        collect_endpoints(objects, &composed, &mut endpoints);
                        self.out.symbols.push(SymbolCurves {
                            endpoints,
                            category,
                        });
                    } else {
                        self.walk(objects, &composed);
                    }
                }
                Shape::Line { start, end } if wanted => {
                    let start = apply(transform, start);
                    let end = apply(transform, end);
                    self.push_segment(start, end, category);
                }
                Shape::PolyLine { points } if wanted => {
                    let vertices: Vec<Point3D> = points.iter().map(|p| apply(transform, p)).collect();
                    for pair in vertices.windows(2) {
                        self.push_segment(pair[0], pair[1], category);
                    }
                    self.out.profiles.push(Profile { vertices, category });
                }
                Shape::Arc { start, .. } if wanted => {
                    self.report
                        .drop_element(DropReason::UnsupportedCurve, Some(apply(transform, start)));
                }
                _ => {}
            }
        }
    }

    fn push_segment(&mut self, start: Point3D, end: Point3D, category: Category) {
        if start.distance_to(&end) < 1e-9 {
            debug!(?start, "Skipping zero-length curve");
            return;
        }
        self.out.segments.push(Segment::new(start, end, category));
    }
}

/// Endpoints of every curve below a block, composed into model space.
fn collect_endpoints(objects: &[DrawingObject], transform: &Matrix4<f64>, out: &mut Vec<Point3D>) {
    for obj in objects {
        match &obj.shape {
            Shape::Line { start, end } | Shape::Arc { start, end } => {
                out.push(apply(transform, start));
                out.push(apply(transform, end));
            }
            Shape::PolyLine { points } => {
                for pair in points.windows(2) {
                    out.push(apply(transform, &pair[0]));
                    out.push(apply(transform, &pair[1]));
                }
            }
            Shape::Instance { placement, objects } => {
                collect_endpoints(objects, &(transform * placement.to_matrix()), out);
            }
        }
    }
}

fn apply(transform: &Matrix4<f64>, p: &Point3D) -> Point3D {
    Point3D::from_nalgebra(&transform.transform_point(&p.to_nalgebra()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::Placement;
    use crate::layers::LayerRoles;
    use approx::assert_relative_eq;

    fn layers() -> LayerMap {
        LayerRoles::layer_map(["WALL", "DOOR", "COLUMN"])
    }

    #[test]
    fn test_polyline_decomposes_into_consecutive_segments() {
        let objects = vec![DrawingObject::polyline(
            "WALL",
            vec![
                Point3D::xy(0.0, 0.0),
                Point3D::xy(10.0, 0.0),
                Point3D::xy(10.0, 5.0),
            ],
        )];
        let mut report = ReconstructionReport::new();
        let out = normalize(&objects, &layers(), &[Category::Wall], &mut report);

        assert_eq!(out.segments.len(), 2);
        assert_eq!(out.segments[1].start, Point3D::xy(10.0, 0.0));
        assert_eq!(out.segments[1].end, Point3D::xy(10.0, 5.0));
        assert_eq!(out.profiles.len(), 1);
    }

    #[test]
    fn test_nested_transforms_compose() {
        let inner = DrawingObject::instance(
            None,
            Placement::translation(0.0, 100.0, 0.0),
            vec![DrawingObject::line("WALL", Point3D::xy(0.0, 0.0), Point3D::xy(1.0, 0.0))],
        );
        let outer = DrawingObject::instance(
            None,
            Placement {
                translation: [1000.0, 0.0, 0.0],
                rotation_deg: 0.0,
                scale: 2.0,
            },
            vec![inner],
        );
        let mut report = ReconstructionReport::new();
        let out = normalize(&[outer], &layers(), &[Category::Wall], &mut report);

        assert_eq!(out.segments.len(), 1);
        let s = out.segments[0];
        assert_relative_eq!(s.start.x, 1000.0);
        assert_relative_eq!(s.start.y, 200.0);
        assert_relative_eq!(s.end.x, 1002.0);
    }

    #[test]
    fn test_filters_by_category() {
        let objects = vec![
            DrawingObject::line("WALL", Point3D::xy(0.0, 0.0), Point3D::xy(1.0, 0.0)),
            DrawingObject::line("TEXT", Point3D::xy(0.0, 0.0), Point3D::xy(1.0, 0.0)),
            DrawingObject::line("COLUMN", Point3D::xy(0.0, 0.0), Point3D::xy(1.0, 0.0)),
        ];
        let mut report = ReconstructionReport::new();
        let out = normalize(&objects, &layers(), &[Category::Wall], &mut report);
        assert_eq!(out.segments.len(), 1);
        assert_eq!(out.segments[0].category, Category::Wall);
    }

    #[test]
    fn test_door_block_kept_as_symbol() {
        let block = DrawingObject::instance(
            Some("DOOR"),
            Placement::translation(50.0, 0.0, 0.0),
            vec![
                DrawingObject::arc("0", Point3D::xy(0.0, 0.0), Point3D::xy(9.0, 9.0)),
                DrawingObject::line("0", Point3D::xy(9.0, 9.0), Point3D::xy(9.0, 0.0)),
            ],
        );
        let mut report = ReconstructionReport::new();
        let out = normalize(&[block], &layers(), &[Category::Door], &mut report);

        assert!(out.segments.is_empty());
        assert_eq!(out.symbols.len(), 1);
        assert_eq!(out.symbols[0].endpoints.len(), 4);
        assert_relative_eq!(out.symbols[0].endpoints[0].x, 50.0);
    }

    #[test]
    fn test_loose_arc_is_reported() {
        let objects = vec![DrawingObject::arc(
            "WALL",
            Point3D::xy(0.0, 0.0),
            Point3D::xy(1.0, 1.0),
        )];
        let mut report = ReconstructionReport::new();
        let out = normalize(&objects, &layers(), &[Category::Wall], &mut report);
        assert!(out.segments.is_empty());
        assert_eq!(report.count(DropReason::UnsupportedCurve), 1);
    }
}
