//! Spatial queries against whatever renders the scene.

use crate::document::{Document, NodeId};
use crate::geometry::AffineTransform;
use crate::input::PointerEvent;
use kurbo::{Point, Rect};
use std::sync::Arc;

/// Hit-testing and bounds lookup.
///
/// Implementations never fail: a query that cannot be answered yields an
/// empty list or `None`. Points and rectangles are in canvas space; pointer
/// events carry screen positions.
pub trait GeometryQuery {
    /// Nodes under `point`, front-most first.
    fn node_ids_from_point(&self, point: Point) -> Vec<NodeId>;

    /// Nodes overlapping `envelope`.
    fn node_ids_from_envelope(&self, envelope: Rect) -> Vec<NodeId>;

    fn node_absolute_bounding_rect(&self, id: &str) -> Option<Rect>;

    /// Nodes under a pointer event's screen position.
    fn node_ids_from_pointer_event(&self, event: &PointerEvent) -> Vec<NodeId>;

    /// Called after every published snapshot so the provider can follow the
    /// document and viewport.
    fn sync(&mut self, _document: &Arc<Document>, _viewport: &AffineTransform) {}
}

/// Provider used when no rendering backend is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopQuery;

impl GeometryQuery for NoopQuery {
    fn node_ids_from_point(&self, _point: Point) -> Vec<NodeId> {
        Vec::new()
    }

    fn node_ids_from_envelope(&self, _envelope: Rect) -> Vec<NodeId> {
        Vec::new()
    }

    fn node_absolute_bounding_rect(&self, _id: &str) -> Option<Rect> {
        None
    }

    fn node_ids_from_pointer_event(&self, _event: &PointerEvent) -> Vec<NodeId> {
        Vec::new()
    }
}

/// In-process provider answering from a document snapshot.
#[derive(Debug, Clone)]
pub struct DocumentQuery {
    document: Arc<Document>,
    viewport: AffineTransform,
}

impl DocumentQuery {
    pub fn new(document: Arc<Document>, viewport: AffineTransform) -> Self {
        Self { document, viewport }
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// Screen position to canvas position, `None` for a degenerate viewport.
    pub fn screen_to_canvas(&self, point: Point) -> Option<Point> {
        self.viewport.invert().ok().map(|inv| inv.apply_point(point))
    }
}

impl GeometryQuery for DocumentQuery {
    fn node_ids_from_point(&self, point: Point) -> Vec<NodeId> {
        self.document.hit_test_point(point)
    }

    fn node_ids_from_envelope(&self, envelope: Rect) -> Vec<NodeId> {
        self.document.ids_in_envelope(envelope)
    }

    fn node_absolute_bounding_rect(&self, id: &str) -> Option<Rect> {
        self.document.absolute_bounding_rect(id)
    }

    fn node_ids_from_pointer_event(&self, event: &PointerEvent) -> Vec<NodeId> {
        match self.screen_to_canvas(event.position()) {
            Some(point) => self.node_ids_from_point(point),
            None => Vec::new(),
        }
    }

    fn sync(&mut self, document: &Arc<Document>, viewport: &AffineTransform) {
        if !Arc::ptr_eq(&self.document, document) {
            self.document = Arc::clone(document);
        }
        self.viewport = *viewport;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Node, NodeKind};

    fn document() -> Arc<Document> {
        let mut doc = Document::new();
        let root = doc.root_id().clone();
        doc.insert(&root, Node::with_id("a", NodeKind::Rectangle).sized(10.0, 10.0), None)
            .unwrap();
        doc.insert(&root, Node::with_id("b", NodeKind::Rectangle).sized(10.0, 10.0).at(5.0, 5.0), None)
            .unwrap();
        Arc::new(doc)
    }

    #[test]
    fn test_noop_query_is_empty() {
        let query = NoopQuery;
        assert!(query.node_ids_from_point(Point::ZERO).is_empty());
        assert!(query.node_ids_from_envelope(Rect::new(0.0, 0.0, 100.0, 100.0)).is_empty());
        assert!(query.node_absolute_bounding_rect("a").is_none());
        assert!(query.node_ids_from_pointer_event(&PointerEvent::down((0.0, 0.0))).is_empty());
    }

    #[test]
    fn test_document_query_point_and_envelope() {
        let query = DocumentQuery::new(document(), AffineTransform::IDENTITY);
        assert_eq!(query.node_ids_from_point(Point::new(7.0, 7.0)), vec!["b", "a"]);
        assert_eq!(query.node_ids_from_envelope(Rect::new(12.0, 12.0, 20.0, 20.0)), vec!["b"]);
        assert_eq!(
            query.node_absolute_bounding_rect("b"),
            Some(Rect::new(5.0, 5.0, 15.0, 15.0))
        );
        assert!(query.node_absolute_bounding_rect("missing").is_none());
    }

    #[test]
    fn test_pointer_event_goes_through_viewport() {
        // zoomed 2x: screen (4,4) is canvas (2,2)
        let query = DocumentQuery::new(document(), AffineTransform::scale(2.0, 2.0));
        assert_eq!(query.node_ids_from_pointer_event(&PointerEvent::down((4.0, 4.0))), vec!["a"]);

        let broken = DocumentQuery::new(document(), AffineTransform::scale(0.0, 0.0));
        assert!(broken.node_ids_from_pointer_event(&PointerEvent::down((4.0, 4.0))).is_empty());
    }

    #[test]
    fn test_sync_follows_document() {
        let mut query = DocumentQuery::new(Arc::new(Document::new()), AffineTransform::IDENTITY);
        assert!(query.node_ids_from_point(Point::new(1.0, 1.0)).is_empty());
        let doc = document();
        query.sync(&doc, &AffineTransform::IDENTITY);
        assert!(Arc::ptr_eq(query.document(), &doc));
        assert_eq!(query.node_ids_from_point(Point::new(1.0, 1.0)), vec!["a"]);
    }
}
