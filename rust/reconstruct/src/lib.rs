// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CAD2BIM Reconstruction
//!
//! Rebuilds walls, doors, windows, columns and grid lines from the
//! layer-tagged 2D linework of an imported floor plan drawing.
//!
//! The pipeline:
//! 1. Normalize nested blocks and polylines into model-space segments
//! 2. Pair parallel wall lines into wall segments
//! 3. Connect wall segments through junction knots and emit wall axes
//! 4. Cluster window lines and reduce door blocks into openings
//! 5. Take column footprints from closed outlines
//! 6. Order axis lines into a named grid
//!
//! Element creation goes through the [`HostAuthoring`] trait and user
//! selection through [`PickService`]; [`RecordingHost`] and
//! [`ScriptedPicks`] are in-memory implementations of both.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cad2bim_reconstruct::{
//!     run_command, Command, Drawing, HostContext, RecordingHost, ReconstructionConfig,
//!     ScriptedPicks,
//! };
//!
//! let drawing = Drawing::from_json_file("plan.json")?;
//! let config = ReconstructionConfig::millimetres();
//! let mut picks = ScriptedPicks::new(drawing, ["WALL"]);
//! let mut host = RecordingHost::with_default_families(config.units_per_mm);
//!
//! let report = run_command(Command::Auto, &mut picks, &mut host, &HostContext::default(), &config)?;
//! println!("{} walls", report.created.walls);
//! ```

pub mod columns;
pub mod command;
pub mod config;
pub mod drawing;
pub mod error;
pub mod graph;
pub mod grid;
pub mod host;
pub mod layers;
pub mod normalize;
pub mod openings;
pub mod pairing;
pub mod pick;
pub mod pipeline;
pub mod report;
pub mod tolerance;
pub mod types;

pub use columns::ColumnFootprint;
pub use command::{author, run_command, Command};
pub use config::{ReconstructionConfig, Thresholds, MM_PER_FOOT};
pub use drawing::{Drawing, DrawingObject, Placement, Shape};
pub use error::{Error, Result};
pub use graph::{KnotArena, KnotId, WallPlacement, WallPlan};
pub use grid::GridLine;
pub use host::{
    CreatedElement, ElementHandle, HostAuthoring, HostContext, Level, RecordingHost,
};
pub use layers::{LayerMap, LayerRoles};
pub use normalize::{normalize, NormalizedGeometry};
pub use openings::{DoorPlacement, OpeningCluster, WindowPlacement};
pub use pairing::WallSegmentPair;
pub use pick::{PickService, PickedReference, ScriptedPicks};
pub use pipeline::{reconstruct, ReconstructionPlan};
pub use report::{DropReason, Dropped, ReconstructionReport, WallStats};
pub use tolerance::Tolerance;
pub use types::{Category, ElementKind, Orientation, Point3D, Profile, Segment, SymbolCurves};
