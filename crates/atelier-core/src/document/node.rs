//! Scene nodes and per-type capabilities.

use crate::geometry::AffineTransform;
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable node identifier. Unique within a document and never reused.
pub type NodeId = String;

/// Generate a fresh node identifier.
pub fn generate_id() -> NodeId {
    Uuid::new_v4().to_string()
}

/// Node type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Scene,
    Frame,
    Group,
    Rectangle,
    Ellipse,
    Line,
    Text,
    Image,
    Vector,
}

/// Editing affordances a node type supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub children: bool,
    pub corner_radius: bool,
    pub border: bool,
    pub rotation: bool,
    pub resize: bool,
}

impl Capabilities {
    const fn new(children: bool, corner_radius: bool, border: bool, rotation: bool, resize: bool) -> Self {
        Self {
            children,
            corner_radius,
            border,
            rotation,
            resize,
        }
    }
}

impl NodeKind {
    pub const ALL: [NodeKind; 9] = [
        NodeKind::Scene,
        NodeKind::Frame,
        NodeKind::Group,
        NodeKind::Rectangle,
        NodeKind::Ellipse,
        NodeKind::Line,
        NodeKind::Text,
        NodeKind::Image,
        NodeKind::Vector,
    ];

    /// The capability table. Every node type registers its affordances here.
    pub const fn capabilities(self) -> Capabilities {
        //                                     children corner  border rotate resize
        match self {
            NodeKind::Scene => Capabilities::new(true, false, false, false, false),
            NodeKind::Frame => Capabilities::new(true, true, true, true, true),
            NodeKind::Group => Capabilities::new(true, false, false, true, false),
            NodeKind::Rectangle => Capabilities::new(false, true, true, true, true),
            NodeKind::Ellipse => Capabilities::new(false, false, true, true, true),
            NodeKind::Line => Capabilities::new(false, false, true, true, true),
            NodeKind::Text => Capabilities::new(false, false, false, true, true),
            NodeKind::Image => Capabilities::new(false, true, true, true, true),
            NodeKind::Vector => Capabilities::new(false, false, true, true, true),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Scene => "scene",
            NodeKind::Frame => "frame",
            NodeKind::Group => "group",
            NodeKind::Rectangle => "rectangle",
            NodeKind::Ellipse => "ellipse",
            NodeKind::Line => "line",
            NodeKind::Text => "text",
            NodeKind::Image => "image",
            NodeKind::Vector => "vector",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn supports_children(kind: NodeKind) -> bool {
    kind.capabilities().children
}

pub fn supports_corner_radius(kind: NodeKind) -> bool {
    kind.capabilities().corner_radius
}

pub fn supports_border(kind: NodeKind) -> bool {
    kind.capabilities().border
}

/// A node in the scene graph.
///
/// Hierarchy is expressed only through `children` ids; a node never refers
/// to its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub name: String,
    /// Placement of the node's local space within its parent.
    #[serde(default)]
    pub transform: AffineTransform,
    /// Local extent, anchored at the local origin.
    #[serde(default = "zero_size")]
    pub size: Size,
    #[serde(default)]
    pub children: Vec<NodeId>,
}

fn zero_size() -> Size {
    Size::ZERO
}

impl Node {
    /// Create a node with a fresh id.
    pub fn new(kind: NodeKind) -> Self {
        Self::with_id(generate_id(), kind)
    }

    pub fn with_id(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: kind.as_str().to_string(),
            transform: AffineTransform::IDENTITY,
            size: Size::ZERO,
            children: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.size = Size::new(width, height);
        self
    }

    pub fn placed(mut self, transform: AffineTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Convenience for a translated placement.
    pub fn at(self, x: f64, y: f64) -> Self {
        self.placed(AffineTransform::translate((x, y)))
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    /// Bounds in the node's own coordinate space.
    pub fn local_bounds(&self) -> Rect {
        Rect::from_origin_size((0.0, 0.0), self.size)
    }

    pub fn has_extent(&self) -> bool {
        self.size.width > 0.0 || self.size.height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_lookups() {
        assert!(supports_children(NodeKind::Frame));
        assert!(supports_children(NodeKind::Group));
        assert!(!supports_children(NodeKind::Rectangle));
        assert!(supports_corner_radius(NodeKind::Rectangle));
        assert!(!supports_corner_radius(NodeKind::Ellipse));
        assert!(supports_border(NodeKind::Ellipse));
        assert!(!supports_border(NodeKind::Text));
    }

    #[test]
    fn test_every_kind_has_a_name() {
        for kind in NodeKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_node_json_shape() {
        let node = Node::with_id("a", NodeKind::Rectangle).sized(10.0, 20.0).at(5.0, 6.0);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "rectangle");
        assert_eq!(value["transform"][0][2], 5.0);
        assert_eq!(value["size"]["width"], 10.0);

        let minimal: Node =
            serde_json::from_str(r#"{"id":"b","type":"group"}"#).unwrap();
        assert_eq!(minimal.transform, AffineTransform::IDENTITY);
        assert!(minimal.children.is_empty());
        assert_eq!(minimal.size, Size::ZERO);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(Node::new(NodeKind::Text).id, Node::new(NodeKind::Text).id);
    }
}
