// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pure reconstruction: normalized geometry in, element placements out.
//! Nothing here talks to the host.

use crate::columns::{extract_columns, ColumnFootprint};
use crate::config::ReconstructionConfig;
use crate::graph::{build_walls, WallPlacement, WallPlan};
use crate::grid::{sequence_grid, GridLine};
use crate::normalize::NormalizedGeometry;
use crate::openings::{door_openings, plan_doors, plan_windows, DoorPlacement, WindowPlacement};
use crate::pairing::pair_wall_lines;
use crate::report::ReconstructionReport;
use crate::types::{Category, ElementKind};
use serde::{Deserialize, Serialize};

/// Everything a run would create, grouped by element kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReconstructionPlan {
    pub columns: Vec<ColumnFootprint>,
    pub walls: Vec<WallPlacement>,
    pub windows: Vec<WindowPlacement>,
    pub grid: Vec<GridLine>,
    pub doors: Vec<DoorPlacement>,
}

impl ReconstructionPlan {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
            && self.walls.is_empty()
            && self.windows.is_empty()
            && self.grid.is_empty()
            && self.doors.is_empty()
    }
}

/// Wall pairing followed by the connectivity graph.
pub fn plan_walls(
    geometry: &NormalizedGeometry,
    config: &ReconstructionConfig,
    report: &mut ReconstructionReport,
) -> WallPlan {
    let th = config.thresholds();
    let lines = geometry.segments_of(Category::Wall);
    let pairs = pair_wall_lines(&lines, &th, report);
    build_walls(pairs, &th, report)
}

/// Run the stages producing `kinds`. Door host widths are looked up in the
/// wall-layer lines of `geometry`.
pub fn reconstruct(
    geometry: &NormalizedGeometry,
    kinds: &[ElementKind],
    config: &ReconstructionConfig,
    level_elevation: f64,
    report: &mut ReconstructionReport,
) -> ReconstructionPlan {
    let th = config.thresholds();
    let tol = th.tolerance;
    let mut plan = ReconstructionPlan::default();

    for kind in kinds {
        match kind {
            ElementKind::Column => {
                plan.columns = extract_columns(
                    &geometry.profiles_of(Category::Column),
                    &geometry.segments_of(Category::Column),
                    &tol,
                    report,
                );
            }
            ElementKind::Wall => {
                plan.walls = plan_walls(geometry, config, report).walls;
            }
            ElementKind::Window => {
                plan.windows = plan_windows(
                    &geometry.segments_of(Category::Window),
                    &th,
                    level_elevation,
                    report,
                );
            }
            ElementKind::Grid => {
                plan.grid = sequence_grid(&geometry.segments_of(Category::Axis), &tol, config, report);
            }
            ElementKind::Door => {
                let openings = door_openings(
                    &geometry.segments_of(Category::Door),
                    &geometry.symbols_of(Category::Door),
                    &tol,
                    report,
                );
                plan.doors = plan_doors(&openings, &geometry.segments_of(Category::Wall), &th, report);
            }
        }
    }
    plan
}
