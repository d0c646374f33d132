//! Scene graph: an arena of nodes keyed by id.

mod node;

pub use node::{
    generate_id, supports_border, supports_children, supports_corner_radius, Capabilities, Node,
    NodeId, NodeKind,
};

use crate::geometry::{self, rect, AffineTransform, GeometryError};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Document errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("parent node not found: {0}")]
    ParentNotFound(NodeId),
    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),
    #[error("{kind} node {id} cannot contain children")]
    ChildrenNotSupported { id: NodeId, kind: NodeKind },
    #[error("the root node cannot be {0}")]
    RootImmutable(&'static str),
    #[error("moving {id} under {parent} would create a cycle")]
    Cycle { id: NodeId, parent: NodeId },
    #[error("invalid document: {0}")]
    Invalid(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Z-order move within a parent's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZOrder {
    Front,
    Back,
    Forward,
    Backward,
}

/// Serialized form of a [`Document`]; validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentData {
    root_id: NodeId,
    nodes: BTreeMap<NodeId, Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    retired: Vec<NodeId>,
}

/// A design document: a tree of nodes owned by an id→node map.
///
/// A node lives exactly as long as its id is in the map. The parent index is
/// derived from the children lists and rebuilt on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DocumentData", into = "DocumentData")]
pub struct Document {
    root_id: NodeId,
    nodes: HashMap<NodeId, Node>,
    parents: HashMap<NodeId, NodeId>,
    /// Ids that were removed; they are never handed out again.
    retired: HashSet<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only a scene root.
    pub fn new() -> Self {
        Self::with_root(Node::new(NodeKind::Scene))
    }

    /// Create a document with the given root. Its children list is ignored.
    pub fn with_root(mut root: Node) -> Self {
        root.children.clear();
        let root_id = root.id.clone();
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), root);
        Self {
            root_id,
            nodes,
            parents: HashMap::new(),
            retired: HashSet::new(),
        }
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root_id
    }

    pub fn root(&self) -> &Node {
        &self.nodes[&self.root_id]
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A document with only its root is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn is_retired(&self, id: &str) -> bool {
        self.retired.contains(id)
    }

    fn require(&self, id: &str) -> DocumentResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| DocumentError::NodeNotFound(id.to_string()))
    }

    /// Insert `node` under `parent_id`, at the end or at `index` (clamped).
    pub fn insert(&mut self, parent_id: &str, node: Node, index: Option<usize>) -> DocumentResult<()> {
        let parent = self
            .nodes
            .get(parent_id)
            .ok_or_else(|| DocumentError::ParentNotFound(parent_id.to_string()))?;
        if !parent.kind.capabilities().children {
            return Err(DocumentError::ChildrenNotSupported {
                id: parent.id.clone(),
                kind: parent.kind,
            });
        }
        if self.nodes.contains_key(&node.id) || self.retired.contains(&node.id) {
            return Err(DocumentError::DuplicateId(node.id));
        }
        if !node.children.is_empty() {
            return Err(DocumentError::Invalid(format!(
                "inserted node {} must not reference children",
                node.id
            )));
        }

        let id = node.id.clone();
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            let at = index.unwrap_or(parent.children.len()).min(parent.children.len());
            parent.children.insert(at, id.clone());
        }
        self.parents.insert(id.clone(), parent_id.to_string());
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Remove a node and all its descendants. Absent ids are a no-op.
    /// Returns the removed nodes, the node itself first.
    pub fn remove(&mut self, id: &str) -> Vec<Node> {
        if id == self.root_id {
            log::warn!("Refusing to remove the document root {}", id);
            return Vec::new();
        }
        if !self.nodes.contains_key(id) {
            return Vec::new();
        }

        if let Some(parent_id) = self.parents.remove(id) {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|child| child != id);
            }
        }

        let mut removed = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                self.parents.remove(&current);
                self.retired.insert(current);
                stack.extend(node.children.iter().rev().cloned());
                removed.push(node);
            }
        }
        removed
    }

    pub fn parent_of(&self, id: &str) -> Option<&NodeId> {
        self.parents.get(id)
    }

    /// Ancestors of `id`, nearest first, root last.
    pub fn ancestors(&self, id: &str) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.parents.get(id);
        while let Some(parent) = current {
            chain.push(parent.clone());
            current = self.parents.get(parent);
        }
        chain
    }

    /// Descendants of `id` in pre-order, `id` excluded.
    pub fn descendants(&self, id: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(node) = self.nodes.get(id) else {
            return out;
        };
        let mut stack: Vec<&NodeId> = node.children.iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current.clone());
            if let Some(node) = self.nodes.get(current) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Other children of `id`'s parent, in z-order.
    pub fn siblings(&self, id: &str) -> Vec<NodeId> {
        self.parents
            .get(id)
            .and_then(|parent| self.nodes.get(parent))
            .map(|parent| parent.children.iter().filter(|c| *c != id).cloned().collect())
            .unwrap_or_default()
    }

    pub fn depth(&self, id: &str) -> Option<usize> {
        self.contains(id).then(|| self.ancestors(id).len())
    }

    /// Filter `ids` down to existing nodes that have no ancestor in `ids`,
    /// preserving order and dropping duplicates and the root.
    pub fn top_level(&self, ids: &[NodeId]) -> Vec<NodeId> {
        let set: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| self.contains(id) && **id != self.root_id)
            .filter(|id| !self.ancestors(id).iter().any(|a| set.contains(a.as_str())))
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }

    /// Composition of every transform from the root down to `id`. O(depth).
    pub fn absolute_transform(&self, id: &str) -> DocumentResult<AffineTransform> {
        let node = self.require(id)?;
        let mut result = node.transform;
        let mut current = self.parents.get(id);
        while let Some(parent_id) = current {
            let parent = self.require(parent_id)?;
            result = geometry::compose(&parent.transform, &result);
            current = self.parents.get(parent_id);
        }
        Ok(result)
    }

    /// Absolute transform of `id`'s parent frame (identity above the root).
    pub fn parent_transform(&self, id: &str) -> DocumentResult<AffineTransform> {
        self.require(id)?;
        match self.parents.get(id) {
            Some(parent) => self.absolute_transform(parent),
            None => Ok(AffineTransform::IDENTITY),
        }
    }

    /// Replace a node's placement. Singular placements are rejected.
    pub fn set_transform(&mut self, id: &str, transform: AffineTransform) -> DocumentResult<()> {
        if !transform.is_invertible() {
            return Err(GeometryError::SingularTransform {
                determinant: transform.determinant(),
            }
            .into());
        }
        self.set_transform_unchecked(id, transform)
    }

    /// Replace a node's placement without the invertibility check. Only for
    /// transient gesture previews.
    pub(crate) fn set_transform_unchecked(&mut self, id: &str, transform: AffineTransform) -> DocumentResult<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| DocumentError::NodeNotFound(id.to_string()))?;
        node.transform = transform;
        Ok(())
    }

    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> DocumentResult<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| DocumentError::NodeNotFound(id.to_string()))?;
        node.name = name.into();
        Ok(())
    }

    /// Move `id` within its parent's children. Returns whether the order changed.
    pub fn reorder(&mut self, id: &str, order: ZOrder) -> DocumentResult<bool> {
        self.require(id)?;
        let Some(parent_id) = self.parents.get(id).cloned() else {
            return Err(DocumentError::RootImmutable("reordered"));
        };
        let Some(parent) = self.nodes.get_mut(&parent_id) else {
            return Err(DocumentError::ParentNotFound(parent_id));
        };
        let children = &mut parent.children;
        let Some(pos) = children.iter().position(|c| c == id) else {
            return Err(DocumentError::Invalid(format!("{} missing from its parent", id)));
        };
        let last = children.len() - 1;
        let target = match order {
            ZOrder::Front => last,
            ZOrder::Back => 0,
            ZOrder::Forward => (pos + 1).min(last),
            ZOrder::Backward => pos.saturating_sub(1),
        };
        if target == pos {
            return Ok(false);
        }
        let child = children.remove(pos);
        children.insert(target, child);
        Ok(true)
    }

    /// Reparent `id` under `parent_id`, keeping its absolute placement.
    pub fn move_to(&mut self, id: &str, parent_id: &str, index: Option<usize>) -> DocumentResult<()> {
        if id == self.root_id {
            return Err(DocumentError::RootImmutable("moved"));
        }
        self.require(id)?;
        let parent = self
            .nodes
            .get(parent_id)
            .ok_or_else(|| DocumentError::ParentNotFound(parent_id.to_string()))?;
        if !parent.kind.capabilities().children {
            return Err(DocumentError::ChildrenNotSupported {
                id: parent.id.clone(),
                kind: parent.kind,
            });
        }
        if parent_id == id || self.ancestors(parent_id).iter().any(|a| a == id) {
            return Err(DocumentError::Cycle {
                id: id.to_string(),
                parent: parent_id.to_string(),
            });
        }

        let absolute = self.absolute_transform(id)?;
        let new_parent = self.absolute_transform(parent_id)?;
        let local = geometry::compose(&new_parent.invert()?, &absolute);

        if let Some(old_parent) = self.parents.remove(id) {
            if let Some(old) = self.nodes.get_mut(&old_parent) {
                old.children.retain(|c| c != id);
            }
        }
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            let at = index.unwrap_or(parent.children.len()).min(parent.children.len());
            parent.children.insert(at, id.to_string());
        }
        self.parents.insert(id.to_string(), parent_id.to_string());
        self.set_transform_unchecked(id, local)
    }

    /// Absolute axis-aligned bounds. Nodes without extent (groups) use the
    /// union of their descendants.
    pub fn absolute_bounding_rect(&self, id: &str) -> Option<Rect> {
        let node = self.nodes.get(id)?;
        if node.has_extent() {
            let transform = self.absolute_transform(id).ok()?;
            return Some(rect::transform_rect(node.local_bounds(), &transform));
        }
        rect::union(
            node.children
                .iter()
                .filter_map(|child| self.absolute_bounding_rect(child)),
        )
    }

    /// Absolute corner polygon of a node with extent.
    pub fn absolute_quad(&self, id: &str) -> Option<[Point; 4]> {
        let node = self.nodes.get(id)?;
        if !node.has_extent() {
            return None;
        }
        let transform = self.absolute_transform(id).ok()?;
        Some(rect::quad(node.local_bounds(), &transform))
    }

    /// Nodes in paint order (root first, pre-order).
    pub fn paint_order(&self) -> Vec<NodeId> {
        let mut order = vec![self.root_id.clone()];
        order.extend(self.descendants(&self.root_id));
        order
    }

    /// Nodes whose outline contains `point`, front-most first. Boundary
    /// points count as hits.
    pub fn hit_test_point(&self, point: Point) -> Vec<NodeId> {
        self.paint_order()
            .into_iter()
            .rev()
            .filter(|id| *id != self.root_id)
            .filter(|id| {
                self.absolute_quad(id)
                    .is_some_and(|quad| geometry::point_in_polygon(point, &quad))
            })
            .collect()
    }

    /// Nodes whose bounds overlap `envelope`, in paint order. Touching edges
    /// count, so zero-width or zero-height nodes such as straight lines can
    /// be selected.
    pub fn ids_in_envelope(&self, envelope: Rect) -> Vec<NodeId> {
        let envelope = envelope.abs();
        self.paint_order()
            .into_iter()
            .filter(|id| *id != self.root_id)
            .filter(|id| {
                self.nodes.get(id).is_some_and(Node::has_extent)
                    && self
                        .absolute_bounding_rect(id)
                        .is_some_and(|bounds| overlaps(envelope, bounds))
            })
            .collect()
    }

    /// Flattened copies of the subtrees rooted at `ids` (pre-order), plus the
    /// top-level ids that were copied.
    pub fn subtree_prototypes(&self, ids: &[NodeId]) -> (Vec<Node>, Vec<NodeId>) {
        let top = self.top_level(ids);
        let mut prototypes = Vec::new();
        for id in &top {
            if let Some(node) = self.nodes.get(id) {
                prototypes.push(node.clone());
            }
            prototypes.extend(
                self.descendants(id)
                    .iter()
                    .filter_map(|d| self.nodes.get(d))
                    .cloned(),
            );
        }
        (prototypes, top)
    }

    /// Insert fresh copies of the prototype subtrees rooted at `ids` under
    /// `parent_id`. Every copied node gets a new id. Returns the new
    /// top-level ids. All-or-nothing.
    pub fn instantiate(
        &mut self,
        parent_id: &str,
        prototypes: &[Node],
        ids: &[NodeId],
        index: Option<usize>,
    ) -> DocumentResult<Vec<NodeId>> {
        let by_id: HashMap<&str, &Node> = prototypes.iter().map(|p| (p.id.as_str(), p)).collect();
        let remap: HashMap<&str, NodeId> = prototypes
            .iter()
            .map(|p| (p.id.as_str(), generate_id()))
            .collect();

        let mut next = self.clone();
        let mut created = Vec::with_capacity(ids.len());
        for (offset, id) in ids.iter().enumerate() {
            let Some(root) = by_id.get(id.as_str()) else {
                return Err(DocumentError::Invalid(format!("prototype {} is missing", id)));
            };
            let at = index.map(|i| i + offset);
            let mut stack = vec![(parent_id.to_string(), *root, at)];
            while let Some((parent, proto, at)) = stack.pop() {
                let new_id = remap[proto.id.as_str()].clone();
                let mut copy = proto.clone();
                copy.id = new_id.clone();
                copy.children.clear();
                next.insert(&parent, copy, at)?;
                for child in proto.children.iter().rev() {
                    let Some(child_proto) = by_id.get(child.as_str()) else {
                        return Err(DocumentError::Invalid(format!("prototype {} is missing", child)));
                    };
                    stack.push((new_id.clone(), *child_proto, None));
                }
            }
            created.push(remap[id.as_str()].clone());
        }
        *self = next;
        Ok(created)
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize and validate a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<Document> for DocumentData {
    fn from(document: Document) -> Self {
        let mut retired: Vec<NodeId> = document.retired.into_iter().collect();
        retired.sort();
        Self {
            root_id: document.root_id,
            nodes: document.nodes.into_iter().collect(),
            retired,
        }
    }
}

impl TryFrom<DocumentData> for Document {
    type Error = DocumentError;

    fn try_from(data: DocumentData) -> DocumentResult<Self> {
        let nodes: HashMap<NodeId, Node> = data.nodes.into_iter().collect();
        if !nodes.contains_key(&data.root_id) {
            return Err(DocumentError::NodeNotFound(data.root_id));
        }

        let mut parents = HashMap::new();
        for (key, node) in &nodes {
            if *key != node.id {
                return Err(DocumentError::Invalid(format!("node keyed {} has id {}", key, node.id)));
            }
            if !node.children.is_empty() && !node.kind.capabilities().children {
                return Err(DocumentError::ChildrenNotSupported {
                    id: node.id.clone(),
                    kind: node.kind,
                });
            }
            for child in &node.children {
                if !nodes.contains_key(child) {
                    return Err(DocumentError::NodeNotFound(child.clone()));
                }
                if *child == data.root_id || parents.insert(child.clone(), node.id.clone()).is_some() {
                    return Err(DocumentError::Invalid(format!("{} has more than one parent", child)));
                }
            }
        }

        // Every node must hang off the root; with single parents this also
        // rules out cycles.
        let mut reachable = 1;
        let mut stack = vec![&data.root_id];
        while let Some(id) = stack.pop() {
            for child in &nodes[id].children {
                reachable += 1;
                stack.push(child);
            }
        }
        if reachable != nodes.len() {
            return Err(DocumentError::Invalid("unreachable nodes".to_string()));
        }

        Ok(Self {
            root_id: data.root_id,
            nodes,
            parents,
            retired: data.retired.into_iter().collect(),
        })
    }
}

/// Closed-interval overlap on both axes.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
