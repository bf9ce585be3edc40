// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layer name → role lookup.

use crate::types::Category;
use rustc_hash::FxHashMap;

/// Per-run mapping from drawing layer names to roles.
pub type LayerMap = FxHashMap<String, Category>;

const WALL_NAMES: &[&str] = &["墙", "WALL", "Wall", "wall"];
const DOOR_NAMES: &[&str] = &["门", "DOOR", "Door", "door"];
const WINDOW_NAMES: &[&str] = &["窗", "WINDOW", "Window", "window"];
const AXIS_NAMES: &[&str] = &["轴线", "AXIS", "Axis", "axis"];
const COLUMN_NAMES: &[&str] = &["柱", "柱子", "COLUMN", "Column", "column"];

/// Fixed table of recognized layer spellings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerRoles;

impl LayerRoles {
    /// Role for an exact layer name, `None` when the name is not recognized.
    pub fn resolve(name: &str) -> Option<Category> {
        let table: [(&[&str], Category); 5] = [
            (WALL_NAMES, Category::Wall),
            (DOOR_NAMES, Category::Door),
            (WINDOW_NAMES, Category::Window),
            (AXIS_NAMES, Category::Axis),
            (COLUMN_NAMES, Category::Column),
        ];
        table
            .iter()
            .find(|(names, _)| names.contains(&name))
            .map(|(_, category)| *category)
    }

    /// Map every recognized layer to its role; unrecognized layers are left out.
    pub fn layer_map<'a>(names: impl IntoIterator<Item = &'a str>) -> LayerMap {
        names
            .into_iter()
            .filter_map(|name| Self::resolve(name).map(|c| (name.to_string(), c)))
            .collect()
    }

    /// Map a single picked layer to an explicit role.
    pub fn single(name: &str, role: Category) -> LayerMap {
        let mut map = LayerMap::default();
        map.insert(name.to_string(), role);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_spellings() {
        assert_eq!(LayerRoles::resolve("WALL"), Some(Category::Wall));
        assert_eq!(LayerRoles::resolve("墙"), Some(Category::Wall));
        assert_eq!(LayerRoles::resolve("柱子"), Some(Category::Column));
        assert_eq!(LayerRoles::resolve("轴线"), Some(Category::Axis));
        assert_eq!(LayerRoles::resolve("Window"), Some(Category::Window));
        assert_eq!(LayerRoles::resolve("wAll"), None);
        assert_eq!(LayerRoles::resolve("FURNITURE"), None);
    }

    #[test]
    fn test_layer_map_skips_unknown() {
        let map = LayerRoles::layer_map(["WALL", "门", "TEXT"]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("门"), Some(&Category::Door));
        assert!(map.get("TEXT").is_none());
    }
}
