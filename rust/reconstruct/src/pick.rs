// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interactive selection of a drawing and one of its layers.

use crate::drawing::Drawing;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// What the user clicked: a curve's layer inside an imported drawing.
#[derive(Debug, Clone)]
pub struct PickedReference {
    /// Layer of the picked curve; `None` if the curve carries no layer.
    pub layer: Option<String>,
    pub drawing: Arc<Drawing>,
}

/// Source of user picks.
pub trait PickService {
    fn pick(&mut self, prompt: &str) -> Result<PickedReference>;
}

/// Replays a fixed list of layer picks against one drawing.
#[derive(Debug, Clone)]
pub struct ScriptedPicks {
    drawing: Arc<Drawing>,
    layers: VecDeque<Option<String>>,
}

impl ScriptedPicks {
    pub fn new<I, S>(drawing: Drawing, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            drawing: Arc::new(drawing),
            layers: layers.into_iter().map(|l| Some(l.into())).collect(),
        }
    }

    /// Queue a pick on a curve without a layer.
    pub fn push_unlayered(&mut self) {
        self.layers.push_back(None);
    }

    pub fn remaining(&self) -> usize {
        self.layers.len()
    }
}

impl PickService for ScriptedPicks {
    fn pick(&mut self, prompt: &str) -> Result<PickedReference> {
        let layer = self
            .layers
            .pop_front()
            .ok_or_else(|| Error::NoMatchingCategory(format!("nothing picked for '{prompt}'")))?;
        debug!(prompt, ?layer, "Pick");
        Ok(PickedReference {
            layer,
            drawing: Arc::clone(&self.drawing),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_replay_in_order() {
        let mut picks = ScriptedPicks::new(Drawing::default(), ["DOOR", "WALL"]);
        assert_eq!(picks.pick("door").unwrap().layer.as_deref(), Some("DOOR"));
        assert_eq!(picks.pick("wall").unwrap().layer.as_deref(), Some("WALL"));
        assert!(matches!(picks.pick("more"), Err(Error::NoMatchingCategory(_))));
    }
}
