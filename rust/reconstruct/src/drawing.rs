// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Imported drawing as a tree of layer-tagged curves and nested blocks.

use crate::error::{Error, Result};
use crate::types::Point3D;
use nalgebra::{Matrix4, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placement of a block instance relative to its parent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Placement {
    pub translation: [f64; 3],
    /// Rotation about the Z axis in degrees.
    pub rotation_deg: f64,
    /// Uniform scale factor.
    pub scale: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation_deg: 0.0,
            scale: 1.0,
        }
    }
}

impl Placement {
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            translation: [x, y, z],
            ..Default::default()
        }
    }

    /// Local-to-parent matrix: translate · rotate · scale.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let [tx, ty, tz] = self.translation;
        let rotation =
            Rotation3::from_axis_angle(&Vector3::z_axis(), self.rotation_deg.to_radians());
        Matrix4::new_translation(&Vector3::new(tx, ty, tz))
            * rotation.to_homogeneous()
            * Matrix4::new_scaling(self.scale)
    }
}

/// Geometry variants found in an imported drawing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Line {
        start: Point3D,
        end: Point3D,
    },
    PolyLine {
        points: Vec<Point3D>,
    },
    /// Only the endpoints of an arc take part in reconstruction.
    Arc {
        start: Point3D,
        end: Point3D,
    },
    /// Nested block with its own placement.
    Instance {
        #[serde(default)]
        placement: Placement,
        objects: Vec<DrawingObject>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawingObject {
    /// Layer (graphics style) of the object, if it carries one.
    #[serde(default)]
    pub layer: Option<String>,
    #[serde(flatten)]
    pub shape: Shape,
}

impl DrawingObject {
    pub fn line(layer: &str, start: Point3D, end: Point3D) -> Self {
        Self {
            layer: Some(layer.to_string()),
            shape: Shape::Line { start, end },
        }
    }

    pub fn polyline(layer: &str, points: Vec<Point3D>) -> Self {
        Self {
            layer: Some(layer.to_string()),
            shape: Shape::PolyLine { points },
        }
    }

    pub fn arc(layer: &str, start: Point3D, end: Point3D) -> Self {
        Self {
            layer: Some(layer.to_string()),
            shape: Shape::Arc { start, end },
        }
    }

    pub fn instance(layer: Option<&str>, placement: Placement, objects: Vec<DrawingObject>) -> Self {
        Self {
            layer: layer.map(str::to_string),
            shape: Shape::Instance { placement, objects },
        }
    }
}

/// An imported drawing (one linked CAD file).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Drawing {
    pub name: String,
    /// Declared sub-layers of the drawing.
    #[serde(default)]
    pub layers: Vec<String>,
    pub objects: Vec<DrawingObject>,
}

impl Drawing {
    pub fn new(name: impl Into<String>, objects: Vec<DrawingObject>) -> Self {
        let mut drawing = Self {
            name: name.into(),
            layers: Vec::new(),
            objects,
        };
        drawing.layers = drawing.layer_names();
        drawing
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let drawing: Drawing = serde_json::from_str(text)?;
        drawing.validate()?;
        Ok(drawing)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Declared layers followed by any other layer used by an object, in
    /// first-seen order.
    pub fn layer_names(&self) -> Vec<String> {
        let mut names = self.layers.clone();
        collect_layers(&self.objects, &mut names);
        names
    }

    /// Reject coordinates and placements that cannot be transformed.
    pub fn validate(&self) -> Result<()> {
        validate_objects(&self.objects)
    }
}

fn collect_layers(objects: &[DrawingObject], names: &mut Vec<String>) {
    for obj in objects {
        if let Some(layer) = &obj.layer {
            if !names.iter().any(|n| n == layer) {
                names.push(layer.clone());
            }
        }
        if let Shape::Instance { objects, .. } = &obj.shape {
            collect_layers(objects, names);
        }
    }
}

fn validate_objects(objects: &[DrawingObject]) -> Result<()> {
    let finite = |p: &Point3D| p.x.is_finite() && p.y.is_finite() && p.z.is_finite();
    for obj in objects {
        match &obj.shape {
            Shape::Line { start, end } | Shape::Arc { start, end } => {
                if !finite(start) || !finite(end) {
                    return Err(Error::InvalidDrawing("non-finite curve endpoint".into()));
                }
            }
            Shape::PolyLine { points } => {
                if points.len() < 2 {
                    return Err(Error::InvalidDrawing(format!(
                        "polyline with {} point(s)",
                        points.len()
                    )));
                }
                if !points.iter().all(finite) {
                    return Err(Error::InvalidDrawing("non-finite polyline vertex".into()));
                }
            }
            Shape::Instance { placement, objects } => {
                if !(placement.scale.is_finite() && placement.scale > 0.0) {
                    return Err(Error::InvalidDrawing(format!(
                        "instance scale must be positive, got {}",
                        placement.scale
                    )));
                }
                validate_objects(objects)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_placement_matrix() {
        let placement = Placement {
            translation: [10.0, 0.0, 0.0],
            rotation_deg: 90.0,
            scale: 2.0,
        };
        let p = placement.to_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-10);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_parse_tagged_shapes() {
        let json = r#"{
            "name": "plan",
            "objects": [
                { "layer": "WALL", "type": "line",
                  "start": { "x": 0, "y": 0 }, "end": { "x": 10, "y": 0 } },
                { "layer": "DOOR", "type": "instance",
                  "placement": { "translation": [5, 5, 0] },
                  "objects": [
                    { "type": "arc", "start": { "x": 0, "y": 0 }, "end": { "x": 1, "y": 1 } }
                  ] }
            ]
        }"#;
        let drawing = Drawing::from_json_str(json).unwrap();
        assert_eq!(drawing.objects.len(), 2);
        assert_eq!(drawing.layer_names(), vec!["WALL".to_string(), "DOOR".to_string()]);
        match &drawing.objects[1].shape {
            Shape::Instance { placement, objects } => {
                assert_relative_eq!(placement.scale, 1.0);
                assert_eq!(objects.len(), 1);
            }
            other => panic!("expected instance, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_short_polyline() {
        let drawing = Drawing::new(
            "bad",
            vec![DrawingObject::polyline("COLUMN", vec![Point3D::xy(0.0, 0.0)])],
        );
        assert!(matches!(drawing.validate(), Err(Error::InvalidDrawing(_))));
    }
}
