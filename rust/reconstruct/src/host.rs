// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host authoring interface and an in-memory host that records what it was
//! asked to build.
//!
//! All lengths crossing [`HostAuthoring`] are in host native units. Type
//! names follow the catalog conventions of the target host and are
//! expressed in millimetres, rounded to three decimals:
//!
//! | kind    | type name              |
//! |---------|------------------------|
//! | wall    | `Generic - {w}mm`      |
//! | column  | `{width} x {depth}mm`  |
//! | window  | `{width} x {height}mm` |
//! | door    | `{width} x {height}mm` |

use crate::error::{Error, Result};
use crate::types::{ElementKind, Point3D, Segment};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Opaque reference to an element created by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

/// Building level the elements are placed on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Level {
    pub name: String,
    /// Elevation in native units.
    pub elevation: f64,
}

impl Default for Level {
    fn default() -> Self {
        Self {
            name: "Level 1".into(),
            elevation: 0.0,
        }
    }
}

/// Explicit per-run host state, owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    pub level: Level,
}

impl HostContext {
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

/// Element creation in a parametric host.
///
/// Creation calls are only valid between `begin_transaction` and
/// `commit_transaction`. The reconstruction engine never rolls back; when a
/// call fails the open transaction is left for the host to abort.
pub trait HostAuthoring {
    fn begin_transaction(&mut self, name: &str) -> Result<()>;

    fn commit_transaction(&mut self) -> Result<()>;

    fn create_wall(
        &mut self,
        axis: &Segment,
        level: &Level,
        width: f64,
        height: f64,
        offset: f64,
    ) -> Result<ElementHandle>;

    fn create_column(
        &mut self,
        center: Point3D,
        level: &Level,
        width: f64,
        depth: f64,
    ) -> Result<ElementHandle>;

    fn create_window(
        &mut self,
        center: Point3D,
        width: f64,
        height: f64,
        host_wall: ElementHandle,
        level: &Level,
    ) -> Result<ElementHandle>;

    fn create_door(
        &mut self,
        center: Point3D,
        width: f64,
        height: f64,
        host_wall: ElementHandle,
        level: &Level,
    ) -> Result<ElementHandle>;

    /// `name` is `None` when the host should pick the next name itself.
    fn create_grid_line(&mut self, axis: &Segment, name: Option<&str>) -> Result<ElementHandle>;
}

/// A parametric type in the host catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyType {
    pub kind: ElementKind,
    pub family: String,
    pub name: String,
    /// Duplicated by the host during a run rather than preloaded.
    pub duplicated: bool,
}

/// Element recorded by [`RecordingHost`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreatedElement {
    Wall {
        handle: ElementHandle,
        type_name: String,
        axis: Segment,
        level: String,
        width: f64,
        height: f64,
        offset: f64,
    },
    Column {
        handle: ElementHandle,
        type_name: String,
        center: Point3D,
        level: String,
    },
    Window {
        handle: ElementHandle,
        type_name: String,
        center: Point3D,
        host: ElementHandle,
        level: String,
    },
    Door {
        handle: ElementHandle,
        type_name: String,
        center: Point3D,
        host: ElementHandle,
        level: String,
    },
    Grid {
        handle: ElementHandle,
        axis: Segment,
        name: String,
    },
}

impl CreatedElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            CreatedElement::Wall { .. } => ElementKind::Wall,
            CreatedElement::Column { .. } => ElementKind::Column,
            CreatedElement::Window { .. } => ElementKind::Window,
            CreatedElement::Door { .. } => ElementKind::Door,
            CreatedElement::Grid { .. } => ElementKind::Grid,
        }
    }

    pub fn handle(&self) -> ElementHandle {
        match self {
            CreatedElement::Wall { handle, .. }
            | CreatedElement::Column { handle, .. }
            | CreatedElement::Window { handle, .. }
            | CreatedElement::Door { handle, .. }
            | CreatedElement::Grid { handle, .. } => *handle,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        match self {
            CreatedElement::Wall { type_name, .. }
            | CreatedElement::Column { type_name, .. }
            | CreatedElement::Window { type_name, .. }
            | CreatedElement::Door { type_name, .. } => Some(type_name),
            CreatedElement::Grid { .. } => None,
        }
    }
}

/// A committed transaction and the elements created inside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub name: String,
    pub elements: Vec<ElementHandle>,
}

#[derive(Debug, Clone)]
struct BaseFamily {
    family: String,
    base_type: String,
}

/// In-memory host with a type catalog, used by tests and the CLI.
#[derive(Debug)]
pub struct RecordingHost {
    units_per_mm: f64,
    base_families: FxHashMap<ElementKind, BaseFamily>,
    catalog: FxHashMap<(ElementKind, String), FamilyType>,
    elements: Vec<CreatedElement>,
    committed: Vec<TransactionRecord>,
    open: Option<TransactionRecord>,
    last_grid_name: Option<String>,
    next_handle: u64,
}

impl RecordingHost {
    /// Empty host: every typed creation fails until a family is added.
    pub fn new(units_per_mm: f64) -> Self {
        Self {
            units_per_mm,
            base_families: FxHashMap::default(),
            catalog: FxHashMap::default(),
            elements: Vec::new(),
            committed: Vec::new(),
            open: None,
            last_grid_name: None,
            next_handle: 1,
        }
    }

    /// Host preloaded with one base family per element kind.
    pub fn with_default_families(units_per_mm: f64) -> Self {
        let mut host = Self::new(units_per_mm);
        host.add_family(ElementKind::Wall, "Basic Wall", "Generic - 200mm");
        host.add_family(ElementKind::Column, "Concrete-Rectangular-Column", "450 x 600mm");
        host.add_family(ElementKind::Window, "Fixed", "915 x 1220mm");
        host.add_family(ElementKind::Door, "Single-Flush", "915 x 2134mm");
        host
    }

    /// Register `base_type` of `family` as the duplication source for `kind`.
    pub fn add_family(&mut self, kind: ElementKind, family: &str, base_type: &str) {
        self.catalog.insert(
            (kind, base_type.to_string()),
            FamilyType {
                kind,
                family: family.to_string(),
                name: base_type.to_string(),
                duplicated: false,
            },
        );
        self.base_families.insert(
            kind,
            BaseFamily {
                family: family.to_string(),
                base_type: base_type.to_string(),
            },
        );
    }

    pub fn elements(&self) -> &[CreatedElement] {
        &self.elements
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.committed
    }

    pub fn has_type(&self, kind: ElementKind, name: &str) -> bool {
        self.catalog.contains_key(&(kind, name.to_string()))
    }

    /// Types added to the catalog by duplication during this host's lifetime,
    /// sorted by kind and name.
    pub fn duplicated_types(&self) -> Vec<&FamilyType> {
        let mut types: Vec<&FamilyType> = self.catalog.values().filter(|t| t.duplicated).collect();
        types.sort_by(|a, b| (a.kind.as_str(), &a.name).cmp(&(b.kind.as_str(), &b.name)));
        types
    }

    /// Type names known for `kind`, sorted.
    pub fn type_names(&self, kind: ElementKind) -> Vec<String> {
        let mut names: Vec<String> = self
            .catalog
            .values()
            .filter(|t| t.kind == kind)
            .map(|t| t.name.clone())
            .collect();
        names.sort();
        names
    }

    fn mm(&self, native: f64) -> f64 {
        (native / self.units_per_mm * 1000.0).round() / 1000.0
    }

    fn wall_type_name(&self, width: f64) -> String {
        format!("Generic - {}mm", self.mm(width))
    }

    fn sized_type_name(&self, a: f64, b: f64) -> String {
        format!("{} x {}mm", self.mm(a), self.mm(b))
    }

    /// Existing type, or a duplicate of the kind's base family.
    fn resolve_type(&mut self, kind: ElementKind, type_name: String) -> Result<String> {
        if self.catalog.contains_key(&(kind, type_name.clone())) {
            return Ok(type_name);
        }
        let Some(base) = self.base_families.get(&kind) else {
            return Err(Error::NoMatchingFamilyType { kind, type_name });
        };
        debug!(%kind, from = %base.base_type, to = %type_name, "Duplicating family type");
        let duplicate = FamilyType {
            kind,
            family: base.family.clone(),
            name: type_name.clone(),
            duplicated: true,
        };
        self.catalog.insert((kind, type_name.clone()), duplicate);
        Ok(type_name)
    }

    fn record(&mut self, element: CreatedElement) -> Result<ElementHandle> {
        self.ensure_open(element.kind())?;
        let handle = element.handle();
        if let Some(tx) = self.open.as_mut() {
            tx.elements.push(handle);
        }
        self.elements.push(element);
        Ok(handle)
    }

    fn ensure_open(&self, kind: ElementKind) -> Result<()> {
        if self.open.is_none() {
            return Err(Error::Transaction(format!(
                "{kind} created outside a transaction"
            )));
        }
        Ok(())
    }

    fn next_handle(&mut self) -> ElementHandle {
        let handle = ElementHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn auto_grid_name(&self) -> String {
        match &self.last_grid_name {
            None => "1".into(),
            Some(prev) => next_grid_name(prev),
        }
    }
}

/// Successor of a grid name: numbers count up, a trailing letter advances.
fn next_grid_name(prev: &str) -> String {
    if let Some(next) = prev.parse::<u32>().ok().and_then(|n| n.checked_add(1)) {
        return next.to_string();
    }
    let mut chars: Vec<char> = prev.chars().collect();
    match chars.last_mut() {
        Some(c) if c.is_ascii_alphabetic() && !matches!(*c, 'z' | 'Z') => {
            *c = (*c as u8 + 1) as char;
            chars.into_iter().collect()
        }
        _ => format!("{prev}1"),
    }
}

impl HostAuthoring for RecordingHost {
    fn begin_transaction(&mut self, name: &str) -> Result<()> {
        if let Some(open) = &self.open {
            return Err(Error::Transaction(format!(
                "cannot start '{name}' while '{}' is open",
                open.name
            )));
        }
        debug!(name, "Transaction started");
        self.open = Some(TransactionRecord {
            name: name.to_string(),
            elements: Vec::new(),
        });
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        let tx = self
            .open
            .take()
            .ok_or_else(|| Error::Transaction("commit without an open transaction".into()))?;
        debug!(name = %tx.name, elements = tx.elements.len(), "Transaction committed");
        self.committed.push(tx);
        Ok(())
    }

    fn create_wall(
        &mut self,
        axis: &Segment,
        level: &Level,
        width: f64,
        height: f64,
        offset: f64,
    ) -> Result<ElementHandle> {
        self.ensure_open(ElementKind::Wall)?;
        let type_name = self.resolve_type(ElementKind::Wall, self.wall_type_name(width))?;
        let handle = self.next_handle();
        self.record(CreatedElement::Wall {
            handle,
            type_name,
            axis: *axis,
            level: level.name.clone(),
            width,
            height,
            offset,
        })
    }

    fn create_column(
        &mut self,
        center: Point3D,
        level: &Level,
        width: f64,
        depth: f64,
    ) -> Result<ElementHandle> {
        self.ensure_open(ElementKind::Column)?;
        let type_name =
            self.resolve_type(ElementKind::Column, self.sized_type_name(width, depth))?;
        let handle = self.next_handle();
        self.record(CreatedElement::Column {
            handle,
            type_name,
            center,
            level: level.name.clone(),
        })
    }

    fn create_window(
        &mut self,
        center: Point3D,
        width: f64,
        height: f64,
        host_wall: ElementHandle,
        level: &Level,
    ) -> Result<ElementHandle> {
        self.ensure_open(ElementKind::Window)?;
        let type_name =
            self.resolve_type(ElementKind::Window, self.sized_type_name(width, height))?;
        let handle = self.next_handle();
        self.record(CreatedElement::Window {
            handle,
            type_name,
            center,
            host: host_wall,
            level: level.name.clone(),
        })
    }

    fn create_door(
        &mut self,
        center: Point3D,
        width: f64,
        height: f64,
        host_wall: ElementHandle,
        level: &Level,
    ) -> Result<ElementHandle> {
        self.ensure_open(ElementKind::Door)?;
        let type_name = self.resolve_type(ElementKind::Door, self.sized_type_name(width, height))?;
        let handle = self.next_handle();
        self.record(CreatedElement::Door {
            handle,
            type_name,
            center,
            host: host_wall,
            level: level.name.clone(),
        })
    }

    fn create_grid_line(&mut self, axis: &Segment, name: Option<&str>) -> Result<ElementHandle> {
        self.ensure_open(ElementKind::Grid)?;
        let name = name.map(str::to_string).unwrap_or_else(|| self.auto_grid_name());
        let handle = self.next_handle();
        self.last_grid_name = Some(name.clone());
        self.record(CreatedElement::Grid {
            handle,
            axis: *axis,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn axis() -> Segment {
        Segment::new(Point3D::xy(0.0, 0.0), Point3D::xy(3000.0, 0.0), Category::Wall)
    }

    #[test]
    fn test_creation_requires_transaction() {
        let mut host = RecordingHost::with_default_families(1.0);
        let level = Level::default();
        let result = host.create_wall(&axis(), &level, 200.0, 4000.0, 0.0);
        assert!(matches!(result, Err(Error::Transaction(_))));
        assert!(host.elements().is_empty());
    }

    #[test]
    fn test_wall_type_is_reused_or_duplicated() {
        let mut host = RecordingHost::with_default_families(1.0);
        let level = Level::default();
        host.begin_transaction("walls").unwrap();
        host.create_wall(&axis(), &level, 200.0, 4000.0, 0.0).unwrap();
        host.create_wall(&axis(), &level, 240.0, 4000.0, 0.0).unwrap();
        host.commit_transaction().unwrap();

        assert_eq!(
            host.type_names(ElementKind::Wall),
            vec!["Generic - 200mm".to_string(), "Generic - 240mm".to_string()]
        );
        assert_eq!(host.transactions()[0].elements.len(), 2);
        let new_types: Vec<&str> = host.duplicated_types().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(new_types, vec!["Generic - 240mm"]);
    }

    #[test]
    fn test_type_names_use_millimetres() {
        let mut host = RecordingHost::with_default_families(1.0 / 304.8);
        let level = Level::default();
        host.begin_transaction("windows").unwrap();
        let wall = host.create_wall(&axis(), &level, 0.5, 10.0, 0.0).unwrap();
        host.create_window(Point3D::default(), 4.0, 3.0, wall, &level)
            .unwrap();
        host.commit_transaction().unwrap();

        assert!(host.has_type(ElementKind::Wall, "Generic - 152.4mm"));
        assert!(host.has_type(ElementKind::Window, "1219.2 x 914.4mm"));
    }

    #[test]
    fn test_missing_family_fails() {
        let mut host = RecordingHost::new(1.0);
        host.begin_transaction("columns").unwrap();
        let result = host.create_column(Point3D::default(), &Level::default(), 400.0, 400.0);
        match result {
            Err(Error::NoMatchingFamilyType { kind, type_name }) => {
                assert_eq!(kind, ElementKind::Column);
                assert_eq!(type_name, "400 x 400mm");
            }
            other => panic!("expected NoMatchingFamilyType, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_transaction_is_rejected() {
        let mut host = RecordingHost::new(1.0);
        host.begin_transaction("a").unwrap();
        assert!(host.begin_transaction("b").is_err());
        host.commit_transaction().unwrap();
        assert!(host.commit_transaction().is_err());
    }

    #[test]
    fn test_grid_auto_names() {
        assert_eq!(next_grid_name("1"), "2");
        assert_eq!(next_grid_name("9"), "10");
        assert_eq!(next_grid_name("A"), "B");
        assert_eq!(next_grid_name("Z"), "Z1");
        assert_eq!(next_grid_name("4294967295"), "42949672951");

        let mut host = RecordingHost::new(1.0);
        host.begin_transaction("grids").unwrap();
        host.create_grid_line(&axis(), Some("A")).unwrap();
        host.create_grid_line(&axis(), None).unwrap();
        host.commit_transaction().unwrap();
        let names: Vec<&str> = host
            .elements()
            .iter()
            .filter_map(|e| match e {
                CreatedElement::Grid { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
