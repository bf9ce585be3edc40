// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Design constants for reconstruction, expressed in millimetres and
//! resolved once into host native units.

use crate::error::Result;
use crate::tolerance::{Tolerance, DEFAULT_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Millimetres per foot, the native length unit of most BIM hosts.
pub const MM_PER_FOOT: f64 = 304.8;

/// Configuration for the reconstruction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Native length units per millimetre. Default: feet (1 / 304.8).
    pub units_per_mm: f64,
    /// Coordinate equality tolerance in native units.
    pub coordinate_tolerance: f64,
    /// Wall lines shorter than this are end caps unless whitelisted.
    pub min_edge_length_mm: f64,
    /// Short lengths that are genuine wall edges.
    pub short_edge_whitelist_mm: Vec<f64>,
    /// Lengths that are always end caps.
    pub edge_blacklist_mm: Vec<f64>,
    /// Maximum plausible wall thickness.
    pub max_wall_thickness_mm: f64,
    /// Wall axis pieces at or below this length are discarded.
    pub min_axis_length_mm: f64,
    pub wall_height_mm: f64,
    pub wall_base_offset_mm: f64,
    /// Maximum gap between curves of one window opening.
    pub opening_merge_gap_mm: f64,
    pub window_height_mm: f64,
    /// Height of the window insertion point above the level.
    pub window_center_elevation_mm: f64,
    pub door_height_mm: f64,
    /// Name given to the first vertical grid line.
    pub primary_vertical_grid_name: String,
    /// Name given to the first horizontal grid line.
    pub primary_horizontal_grid_name: String,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            units_per_mm: 1.0 / MM_PER_FOOT,
            coordinate_tolerance: DEFAULT_TOLERANCE,
            min_edge_length_mm: 201.0,
            short_edge_whitelist_mm: vec![100.0],
            edge_blacklist_mm: vec![250.0],
            max_wall_thickness_mm: 500.0,
            min_axis_length_mm: 126.0,
            wall_height_mm: 4000.0,
            wall_base_offset_mm: 0.0,
            opening_merge_gap_mm: 500.0,
            window_height_mm: 3.0 * MM_PER_FOOT,
            window_center_elevation_mm: 3.0 * MM_PER_FOOT,
            door_height_mm: 2200.0,
            primary_vertical_grid_name: "1".into(),
            primary_horizontal_grid_name: "A".into(),
        }
    }
}

impl ReconstructionConfig {
    /// Configuration for drawings whose native unit is the millimetre.
    pub fn millimetres() -> Self {
        Self {
            units_per_mm: 1.0,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file; missing fields keep defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Convert millimetres to native units.
    pub fn native(&self, mm: f64) -> f64 {
        mm * self.units_per_mm
    }

    /// Resolve every length into native units.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            tolerance: Tolerance::new(self.coordinate_tolerance),
            min_edge_length: self.native(self.min_edge_length_mm),
            short_edge_whitelist: self
                .short_edge_whitelist_mm
                .iter()
                .map(|&mm| self.native(mm))
                .collect(),
            edge_blacklist: self
                .edge_blacklist_mm
                .iter()
                .map(|&mm| self.native(mm))
                .collect(),
            max_wall_thickness: self.native(self.max_wall_thickness_mm),
            min_axis_length: self.native(self.min_axis_length_mm),
            wall_height: self.native(self.wall_height_mm),
            wall_base_offset: self.native(self.wall_base_offset_mm),
            opening_merge_gap: self.native(self.opening_merge_gap_mm),
            window_height: self.native(self.window_height_mm),
            window_center_elevation: self.native(self.window_center_elevation_mm),
            door_height: self.native(self.door_height_mm),
            units_per_mm: self.units_per_mm,
        }
    }
}

/// Resolved thresholds in host native units.
#[derive(Debug, Clone)]
pub struct Thresholds {
    pub tolerance: Tolerance,
    pub min_edge_length: f64,
    pub short_edge_whitelist: Vec<f64>,
    pub edge_blacklist: Vec<f64>,
    pub max_wall_thickness: f64,
    pub min_axis_length: f64,
    pub wall_height: f64,
    pub wall_base_offset: f64,
    pub opening_merge_gap: f64,
    pub window_height: f64,
    pub window_center_elevation: f64,
    pub door_height: f64,
    pub units_per_mm: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        ReconstructionConfig::default().thresholds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_feet() {
        let th = ReconstructionConfig::default().thresholds();
        assert_relative_eq!(th.max_wall_thickness, 500.0 / 304.8);
        assert_relative_eq!(th.wall_height, 4000.0 / 304.8);
        assert_relative_eq!(th.window_height, 3.0);
        assert_relative_eq!(th.door_height * 304.8, 2200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_millimetre_config() {
        let th = ReconstructionConfig::millimetres().thresholds();
        assert_relative_eq!(th.min_edge_length, 201.0);
        assert_eq!(th.short_edge_whitelist, vec![100.0]);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ReconstructionConfig =
            serde_json::from_str(r#"{ "units_per_mm": 1.0, "wall_height_mm": 3000 }"#).unwrap();
        assert_relative_eq!(config.units_per_mm, 1.0);
        assert_relative_eq!(config.wall_height_mm, 3000.0);
        assert_relative_eq!(config.max_wall_thickness_mm, 500.0);
        assert_eq!(config.primary_horizontal_grid_name, "A");
    }
}
