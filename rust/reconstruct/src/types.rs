// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types shared by every reconstruction stage

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 3D point in model space (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn to_nalgebra(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn from_nalgebra(p: &Point3<f64>) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }

    pub fn distance_to(&self, other: &Point3D) -> f64 {
        (other.to_nalgebra() - self.to_nalgebra()).norm()
    }

    pub fn midpoint(&self, other: &Point3D) -> Point3D {
        Point3D::new(
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
        )
    }

    /// Arithmetic mean of a point set. `None` for an empty set.
    pub fn centroid(points: &[Point3D]) -> Option<Point3D> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (sx, sy, sz) = points
            .iter()
            .fold((0.0, 0.0, 0.0), |(x, y, z), p| (x + p.x, y + p.y, z + p.z));
        Some(Point3D::new(sx / n, sy / n, sz / n))
    }
}

/// Layer role of a curve in the imported drawing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Wall,
    Door,
    Window,
    Axis,
    Column,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Wall => "wall",
            Category::Door => "door",
            Category::Window => "window",
            Category::Axis => "axis",
            Category::Column => "column",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of element requested from the host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Wall,
    Column,
    Window,
    Door,
    Grid,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Wall => "wall",
            ElementKind::Column => "column",
            ElementKind::Window => "window",
            ElementKind::Door => "door",
            ElementKind::Grid => "grid",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orientation of an axis-aligned curve in the working plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Runs along Y (constant X).
    Vertical,
    /// Runs along X (constant Y).
    Horizontal,
}

/// An oriented straight line in model space with its layer role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub start: Point3D,
    pub end: Point3D,
    pub category: Category,
}

impl Segment {
    pub fn new(start: Point3D, end: Point3D, category: Category) -> Self {
        Self {
            start,
            end,
            category,
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn midpoint(&self) -> Point3D {
        self.start.midpoint(&self.end)
    }

    pub fn endpoints(&self) -> [Point3D; 2] {
        [self.start, self.end]
    }

    /// Unit direction from start to end; zero vector for a degenerate segment.
    pub fn direction(&self) -> Vector3<f64> {
        let d = self.end.to_nalgebra() - self.start.to_nalgebra();
        let len = d.norm();
        if len < 1e-12 {
            Vector3::zeros()
        } else {
            d / len
        }
    }

    /// Smallest and largest coordinate of the endpoints along X (`Horizontal`)
    /// or Y (`Vertical`).
    pub fn span(&self, along: Orientation) -> (f64, f64) {
        let (a, b) = match along {
            Orientation::Horizontal => (self.start.x, self.end.x),
            Orientation::Vertical => (self.start.y, self.end.y),
        };
        (a.min(b), a.max(b))
    }
}

/// A closed profile kept whole by the normalizer (column outlines).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub vertices: Vec<Point3D>,
    pub category: Category,
}

/// Composite block found on a tagged layer: the model-space endpoints of all
/// of its sub-curves, in traversal order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolCurves {
    pub endpoints: Vec<Point3D>,
    pub category: Category,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment_length_and_direction() {
        let s = Segment::new(
            Point3D::xy(0.0, 0.0),
            Point3D::xy(0.0, -10.0),
            Category::Wall,
        );
        assert_relative_eq!(s.length(), 10.0);
        let d = s.direction();
        assert_relative_eq!(d.x, 0.0);
        assert_relative_eq!(d.y, -1.0);
    }

    #[test]
    fn test_span_is_ordered() {
        let s = Segment::new(
            Point3D::xy(5.0, 40.0),
            Point3D::xy(5.0, 10.0),
            Category::Axis,
        );
        assert_eq!(s.span(Orientation::Vertical), (10.0, 40.0));
    }

    #[test]
    fn test_centroid() {
        let c = Point3D::centroid(&[
            Point3D::xy(0.0, 0.0),
            Point3D::xy(2.0, 0.0),
            Point3D::xy(2.0, 2.0),
            Point3D::xy(0.0, 2.0),
        ])
        .unwrap();
        assert_relative_eq!(c.x, 1.0);
        assert_relative_eq!(c.y, 1.0);
        assert!(Point3D::centroid(&[]).is_none());
    }
}
