// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for reconstruction runs.

use crate::types::ElementKind;

/// Result type alias for reconstruction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconstructing building elements.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The picked reference did not resolve to a usable layer role.
    #[error("no matching category for pick: {0}")]
    NoMatchingCategory(String),

    /// The host could neither find nor duplicate a parametric type.
    #[error("no matching {kind} type '{type_name}' and no base family to duplicate")]
    NoMatchingFamilyType {
        kind: ElementKind,
        type_name: String,
    },

    /// Geometry that cannot yield an element (caught by the calling stage
    /// and recorded as a drop, never returned from a command).
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Host transaction misuse (creation outside a transaction, nested begin).
    #[error("transaction error: {0}")]
    Transaction(String),

    /// The input drawing could not be interpreted.
    #[error("invalid drawing: {0}")]
    InvalidDrawing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateGeometry(msg.into())
    }
}
