//! The editor reducer.

use super::{EditorError, EditorResult, EditorState};
use crate::clipboard::ClipboardPayload;
use crate::config::EditorConfig;
use crate::document::{Document, DocumentError, Node, NodeId, ZOrder};
use crate::geometry::AffineTransform;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a `Select` action combines with the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Replace,
    Add,
    Toggle,
}

/// An edit request. Every action either yields a new snapshot or, when it
/// would change nothing, the very same one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Insert a node and select it.
    Insert {
        parent: NodeId,
        node: Node,
        #[serde(default)]
        index: Option<usize>,
    },
    Remove {
        ids: Vec<NodeId>,
    },
    Select {
        ids: Vec<NodeId>,
        #[serde(default)]
        mode: SelectionMode,
    },
    ClearSelection,
    /// Select every child of the root.
    SelectAll,
    SetTransform {
        id: NodeId,
        transform: AffineTransform,
    },
    /// Apply a world-space transform to the given nodes.
    TransformNodes {
        ids: Vec<NodeId>,
        transform: AffineTransform,
    },
    /// Translate the selection.
    Nudge {
        delta: Vec2,
    },
    Reorder {
        id: NodeId,
        order: ZOrder,
    },
    MoveTo {
        id: NodeId,
        parent: NodeId,
        #[serde(default)]
        index: Option<usize>,
    },
    /// Copy nodes next to their originals and select the copies.
    Duplicate {
        ids: Vec<NodeId>,
    },
    /// Instantiate a clipboard payload under `parent` (the root when absent).
    Paste {
        #[serde(default)]
        parent: Option<NodeId>,
        payload: ClipboardPayload,
    },
    SetViewport {
        transform: AffineTransform,
    },
    /// Pan by a screen-space delta.
    Pan {
        delta: Vec2,
    },
    /// Zoom by `factor`, keeping the screen point `point` fixed.
    ZoomAt {
        point: Point,
        factor: f64,
    },
}

/// Reduce `action` against `state` with the default configuration.
pub fn dispatch(state: &Arc<EditorState>, action: Action) -> EditorResult<Arc<EditorState>> {
    dispatch_with(state, action, &EditorConfig::default())
}

/// Reduce `action` against `state`.
///
/// Never mutates `state`. Actions that change nothing return `state` itself,
/// so callers can detect no-ops with [`Arc::ptr_eq`]. On error no snapshot is
/// produced.
pub fn dispatch_with(
    state: &Arc<EditorState>,
    action: Action,
    config: &EditorConfig,
) -> EditorResult<Arc<EditorState>> {
    let unchanged = || Ok(Arc::clone(state));

    match action {
        Action::Insert { parent, node, index } => {
            let id = node.id.clone();
            let mut document = (*state.document).clone();
            document.insert(&parent, node, index)?;
            Ok(with_document(state, document, Some(vec![id])))
        }
        Action::Remove { ids } => {
            if !ids.iter().any(|id| state.document.contains(id)) {
                return unchanged();
            }
            let mut document = (*state.document).clone();
            for id in &ids {
                document.remove(id);
            }
            Ok(with_document(state, document, None))
        }
        Action::Select { ids, mode } => {
            let valid = |id: &NodeId| state.document.contains(id) && id != state.document.root_id();
            let mut selection = match mode {
                SelectionMode::Replace => Vec::new(),
                SelectionMode::Add | SelectionMode::Toggle => state.selection.clone(),
            };
            for id in ids.into_iter().filter(valid) {
                match selection.iter().position(|s| *s == id) {
                    Some(pos) if mode == SelectionMode::Toggle => {
                        selection.remove(pos);
                    }
                    Some(_) => {}
                    None => selection.push(id),
                }
            }
            Ok(with_selection(state, selection))
        }
        Action::ClearSelection => Ok(with_selection(state, Vec::new())),
        Action::SelectAll => {
            let selection = state.document.root().children.clone();
            Ok(with_selection(state, selection))
        }
        Action::SetTransform { id, transform } => {
            let node = state
                .document
                .get(&id)
                .ok_or_else(|| DocumentError::NodeNotFound(id.clone()))?;
            if node.transform == transform {
                return unchanged();
            }
            let mut document = (*state.document).clone();
            document.set_transform(&id, transform)?;
            Ok(with_document(state, document, None))
        }
        Action::TransformNodes { ids, transform } => {
            if transform.is_identity() || state.document.top_level(&ids).is_empty() {
                return unchanged();
            }
            let mut document = (*state.document).clone();
            transform_nodes(&mut document, &ids, &transform, true)?;
            Ok(with_document(state, document, None))
        }
        Action::Nudge { delta } => {
            let ids = state.selection.clone();
            dispatch_with(
                state,
                Action::TransformNodes {
                    ids,
                    transform: AffineTransform::translate(delta),
                },
                config,
            )
        }
        Action::Reorder { id, order } => {
            let mut document = (*state.document).clone();
            if !document.reorder(&id, order)? {
                return unchanged();
            }
            Ok(with_document(state, document, None))
        }
        Action::MoveTo { id, parent, index } => {
            if state.document.parent_of(&id) == Some(&parent) && index.is_none() {
                return unchanged();
            }
            let mut document = (*state.document).clone();
            document.move_to(&id, &parent, index)?;
            Ok(with_document(state, document, None))
        }
        Action::Duplicate { ids } => {
            let top = state.document.top_level(&ids);
            if top.is_empty() {
                return unchanged();
            }
            let mut document = (*state.document).clone();
            let mut created = Vec::with_capacity(top.len());
            for id in &top {
                let parent = document
                    .parent_of(id)
                    .cloned()
                    .ok_or_else(|| DocumentError::RootImmutable("duplicated"))?;
                let position = document
                    .get(&parent)
                    .and_then(|p| p.children.iter().position(|c| c == id))
                    .map(|pos| pos + 1);
                let (prototypes, roots) = document.subtree_prototypes(std::slice::from_ref(id));
                created.extend(document.instantiate(&parent, &prototypes, &roots, position)?);
            }
            Ok(with_document(state, document, Some(created)))
        }
        Action::Paste { parent, payload } => {
            if payload.ids.is_empty() {
                return unchanged();
            }
            let parent = parent.unwrap_or_else(|| state.document.root_id().clone());
            let mut document = (*state.document).clone();
            let created = document.instantiate(&parent, &payload.prototypes, &payload.ids, None)?;
            Ok(with_document(state, document, Some(created)))
        }
        Action::SetViewport { transform } => {
            if transform == state.viewport {
                return unchanged();
            }
            transform.invert()?;
            Ok(with_viewport(state, transform))
        }
        Action::Pan { delta } => {
            if delta == Vec2::ZERO {
                return unchanged();
            }
            Ok(with_viewport(
                state,
                AffineTransform::translate(delta).compose(&state.viewport),
            ))
        }
        Action::ZoomAt { point, factor } => {
            let zoom = state.zoom();
            if !zoom.is_finite() || zoom <= 0.0 || !factor.is_finite() || factor <= 0.0 {
                return unchanged();
            }
            let target = config.zoom.clamp(zoom * factor);
            if (target - zoom).abs() < f64::EPSILON {
                return unchanged();
            }
            let step = target / zoom;
            let viewport = AffineTransform::scale_about(Vec2::new(step, step), point).compose(&state.viewport);
            Ok(with_viewport(state, viewport))
        }
    }
}

/// Fold a world-space transform into the local placement of the top-level
/// nodes among `ids`: `L' = P⁻¹ · W · P · L` with `P` the parent's absolute
/// transform.
///
/// Strict mode rejects singular results; otherwise they are allowed (gesture
/// previews) and nodes under a singular parent are left alone.
pub(crate) fn transform_nodes(
    document: &mut Document,
    ids: &[NodeId],
    world: &AffineTransform,
    strict: bool,
) -> EditorResult<()> {
    for id in document.top_level(ids) {
        let parent = document.parent_transform(&id)?;
        let local = document
            .get(&id)
            .map(|node| node.transform)
            .ok_or_else(|| DocumentError::NodeNotFound(id.clone()))?;
        let inverse = match parent.invert() {
            Ok(inverse) => inverse,
            Err(err) if strict => return Err(EditorError::Geometry(err)),
            Err(_) => continue,
        };
        let next = inverse.compose(world).compose(&parent).compose(&local);
        if strict {
            document.set_transform(&id, next)?;
        } else {
            document.set_transform_unchecked(&id, next)?;
        }
    }
    Ok(())
}

/// New snapshot with `document`, an optional new selection, pruned.
fn with_document(state: &Arc<EditorState>, document: Document, selection: Option<Vec<NodeId>>) -> Arc<EditorState> {
    let next = EditorState {
        document: Arc::new(document),
        selection: selection.unwrap_or_else(|| state.selection.clone()),
        viewport: state.viewport,
        gesture: state.gesture.clone(),
    };
    Arc::new(next).normalized()
}

fn with_selection(state: &Arc<EditorState>, selection: Vec<NodeId>) -> Arc<EditorState> {
    if selection == state.selection {
        return Arc::clone(state);
    }
    let mut next = (**state).clone();
    next.selection = selection;
    Arc::new(next)
}

fn with_viewport(state: &Arc<EditorState>, viewport: AffineTransform) -> Arc<EditorState> {
    let mut next = (**state).clone();
    next.viewport = viewport;
    Arc::new(next)
}
