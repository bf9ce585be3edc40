// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-facing commands: pick layers, reconstruct, and author the result in
//! the host.
//!
//! `Auto` maps every recognized layer of the picked drawing to its role and
//! runs all stages. The single-kind commands treat the picked layer as their
//! role; `Doors` takes a second pick for the wall layer used to size the host
//! walls. Elements are authored in a fixed order (columns, walls, windows,
//! grid, doors), one transaction per kind.

use crate::config::ReconstructionConfig;
use crate::drawing::Drawing;
use crate::error::{Error, Result};
use crate::host::{HostAuthoring, HostContext};
use crate::layers::{LayerMap, LayerRoles};
use crate::normalize::normalize;
use crate::pick::{PickService, PickedReference};
use crate::pipeline::{reconstruct, ReconstructionPlan};
use crate::report::ReconstructionReport;
use crate::types::{Category, ElementKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Auto,
    Walls,
    Windows,
    Doors,
    Columns,
    Axes,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Auto => "auto",
            Command::Walls => "walls",
            Command::Windows => "windows",
            Command::Doors => "doors",
            Command::Columns => "columns",
            Command::Axes => "axes",
        }
    }

    /// Element kinds produced, in authoring order.
    pub fn kinds(&self) -> &'static [ElementKind] {
        match self {
            Command::Auto => &[
                ElementKind::Column,
                ElementKind::Wall,
                ElementKind::Window,
                ElementKind::Grid,
                ElementKind::Door,
            ],
            Command::Walls => &[ElementKind::Wall],
            Command::Windows => &[ElementKind::Window],
            Command::Doors => &[ElementKind::Door],
            Command::Columns => &[ElementKind::Column],
            Command::Axes => &[ElementKind::Grid],
        }
    }

    /// Role of the first picked layer for single-kind commands.
    fn picked_role(&self) -> Option<Category> {
        match self {
            Command::Auto => None,
            Command::Walls => Some(Category::Wall),
            Command::Windows => Some(Category::Window),
            Command::Doors => Some(Category::Door),
            Command::Columns => Some(Category::Column),
            Command::Axes => Some(Category::Axis),
        }
    }

    fn prompt(&self) -> &'static str {
        match self {
            Command::Auto => "Select a layer of the linked drawing",
            Command::Walls => "Pick a wall line in the linked drawing",
            Command::Windows => "Pick a window line in the linked drawing",
            Command::Doors => "Pick a door in the linked drawing",
            Command::Columns => "Pick a column in the linked drawing",
            Command::Axes => "Pick an axis line in the linked drawing",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Command::Auto),
            "walls" | "wall" => Ok(Command::Walls),
            "windows" | "window" => Ok(Command::Windows),
            "doors" | "door" => Ok(Command::Doors),
            "columns" | "column" => Ok(Command::Columns),
            "axes" | "axis" | "grid" => Ok(Command::Axes),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

/// Layer name of a pick, which must exist in the picked drawing.
fn picked_layer(picked: &PickedReference) -> Result<String> {
    let layer = picked
        .layer
        .clone()
        .ok_or_else(|| Error::NoMatchingCategory("picked curve has no layer".into()))?;
    if !picked.drawing.layer_names().contains(&layer) {
        return Err(Error::NoMatchingCategory(format!(
            "layer '{layer}' is not part of drawing '{}'",
            picked.drawing.name
        )));
    }
    Ok(layer)
}

/// Pick the drawing and build the layer → role map for `command`.
fn resolve_layers<P: PickService + ?Sized>(
    command: Command,
    pick: &mut P,
) -> Result<(std::sync::Arc<Drawing>, LayerMap)> {
    let first = pick.pick(command.prompt())?;
    let layer = picked_layer(&first)?;

    let layers = match command.picked_role() {
        None => {
            let map = LayerRoles::layer_map(first.drawing.layer_names().iter().map(String::as_str));
            if map.is_empty() {
                return Err(Error::NoMatchingCategory(format!(
                    "no layer of drawing '{}' matches a known role",
                    first.drawing.name
                )));
            }
            map
        }
        Some(role) => {
            let mut map = LayerRoles::single(&layer, role);
            if command == Command::Doors {
                let second = pick.pick("Pick a wall line in the linked drawing")?;
                let wall_layer = picked_layer(&second)?;
                map.insert(wall_layer, Category::Wall);
            }
            map
        }
    };
    Ok((first.drawing, layers))
}

/// Run one command end to end.
pub fn run_command<P, H>(
    command: Command,
    pick: &mut P,
    host: &mut H,
    ctx: &HostContext,
    config: &ReconstructionConfig,
) -> Result<ReconstructionReport>
where
    P: PickService + ?Sized,
    H: HostAuthoring + ?Sized,
{
    let (drawing, layers) = resolve_layers(command, pick)?;
    let mut report = ReconstructionReport::new();

    let mut wanted: Vec<Category> = layers.values().copied().collect();
    wanted.sort_by_key(|c| c.as_str());
    wanted.dedup();
    let geometry = normalize(&drawing.objects, &layers, &wanted, &mut report);

    let plan = reconstruct(
        &geometry,
        command.kinds(),
        config,
        ctx.level.elevation,
        &mut report,
    );
    if plan.is_empty() {
        warn!(%command, drawing = %drawing.name, "Nothing to reconstruct");
    }
    author(host, ctx, &plan, command.kinds(), &mut report)?;

    info!(
        %command,
        walls = report.created.walls,
        columns = report.created.columns,
        windows = report.created.windows,
        doors = report.created.doors,
        grids = report.created.grids,
        dropped = report.total_dropped(),
        "Reconstruction finished"
    );
    Ok(report)
}

/// Create the planned elements, one transaction per kind, in `kinds` order.
pub fn author<H: HostAuthoring + ?Sized>(
    host: &mut H,
    ctx: &HostContext,
    plan: &ReconstructionPlan,
    kinds: &[ElementKind],
    report: &mut ReconstructionReport,
) -> Result<()> {
    let level = &ctx.level;
    for kind in kinds {
        host.begin_transaction(transaction_name(*kind))?;
        match kind {
            ElementKind::Column => {
                for column in &plan.columns {
                    host.create_column(column.center, level, column.width, column.depth)?;
                    report.created.record(ElementKind::Column);
                }
            }
            ElementKind::Wall => {
                for wall in &plan.walls {
                    host.create_wall(&wall.axis, level, wall.thickness, wall.height, wall.base_offset)?;
                    report.created.record(ElementKind::Wall);
                }
            }
            ElementKind::Window => {
                for window in &plan.windows {
                    let wall = host.create_wall(
                        &window.host_axis,
                        level,
                        window.host_width,
                        window.host_height,
                        0.0,
                    )?;
                    report.created.record(ElementKind::Wall);
                    host.create_window(window.center, window.width, window.height, wall, level)?;
                    report.created.record(ElementKind::Window);
                }
            }
            ElementKind::Grid => {
                for line in &plan.grid {
                    host.create_grid_line(&line.axis, line.name.as_deref())?;
                    report.created.record(ElementKind::Grid);
                }
            }
            ElementKind::Door => {
                for door in &plan.doors {
                    let wall = host.create_wall(
                        &door.host_axis,
                        level,
                        door.host_width,
                        door.host_height,
                        0.0,
                    )?;
                    report.created.record(ElementKind::Wall);
                    host.create_door(door.center, door.width, door.height, wall, level)?;
                    report.created.record(ElementKind::Door);
                }
            }
        }
        host.commit_transaction()?;
    }
    Ok(())
}

fn transaction_name(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Column => "Create columns",
        ElementKind::Wall => "Create walls",
        ElementKind::Window => "Create windows",
        ElementKind::Grid => "Create grid",
        ElementKind::Door => "Create doors",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!("auto".parse::<Command>(), Ok(Command::Auto));
        assert_eq!("Doors".parse::<Command>(), Ok(Command::Doors));
        assert_eq!("grid".parse::<Command>(), Ok(Command::Axes));
        assert!("roof".parse::<Command>().is_err());
    }

    #[test]
    fn test_auto_authoring_order() {
        assert_eq!(
            Command::Auto.kinds(),
            &[
                ElementKind::Column,
                ElementKind::Wall,
                ElementKind::Window,
                ElementKind::Grid,
                ElementKind::Door,
            ]
        );
        assert_eq!(transaction_name(ElementKind::Grid), "Create grid");
    }
}
