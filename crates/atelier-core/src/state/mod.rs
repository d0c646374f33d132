//! Immutable editor snapshots, the action reducer and undo history.

mod action;
mod history;

pub use action::{dispatch, dispatch_with, Action, SelectionMode};
pub use history::History;

pub(crate) use action::transform_nodes;

use crate::document::{Document, DocumentError, NodeId};
use crate::geometry::{AffineTransform, GeometryError};
use crate::gesture::{Gesture, GestureError};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Editor errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Gesture(#[from] GestureError),
    #[error("nothing is selected")]
    EmptySelection,
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// One discrete step of the editor.
///
/// Snapshots are shared behind `Arc` and never mutated; every edit builds a
/// new one. The document is shared between snapshots that did not touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    pub document: Arc<Document>,
    /// Selected node ids in selection order, always present in `document`.
    #[serde(default)]
    pub selection: Vec<NodeId>,
    /// Canvas to screen.
    #[serde(default)]
    pub viewport: AffineTransform,
    #[serde(default)]
    pub gesture: Gesture,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl EditorState {
    pub fn new(document: Document) -> Self {
        Self {
            document: Arc::new(document),
            selection: Vec::new(),
            viewport: AffineTransform::IDENTITY,
            gesture: Gesture::None,
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    /// Current zoom level of the viewport.
    pub fn zoom(&self) -> f64 {
        self.viewport.scale_factor()
    }

    pub fn screen_to_canvas(&self, point: Point) -> Option<Point> {
        self.viewport.invert().ok().map(|inv| inv.apply_point(point))
    }

    pub fn canvas_to_screen(&self, point: Point) -> Point {
        self.viewport.apply_point(point)
    }

    /// Selection with missing ids, the root, and duplicates removed.
    pub fn pruned_selection(&self) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        self.selection
            .iter()
            .filter(|id| self.document.contains(id) && *id != self.document.root_id())
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }

    /// `self` with its selection pruned; the same snapshot if nothing changed.
    pub fn normalized(self: &Arc<Self>) -> Arc<Self> {
        let selection = self.pruned_selection();
        if selection == self.selection {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.selection = selection;
        Arc::new(next)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
