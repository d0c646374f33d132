//! Node export.

use crate::clipboard::ClipboardPayload;
use crate::document::{Document, Node, NodeKind};
use crate::geometry::AffineTransform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("node not found: {0}")]
    NodeNotFound(String),
    #[error("cannot export {id} as {format}")]
    UnsupportedFormat { id: String, format: ExportFormat },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Svg,
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Exported content.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportData {
    Bytes(Vec<u8>),
    Text(String),
}

/// Something that can render nodes into files.
pub trait Exporter {
    /// Whether `export_node_as` will succeed for this node and format.
    fn can_export_node_as(&self, id: &str, format: ExportFormat) -> bool;

    /// Export a node. Asking for a format that `can_export_node_as` rejects
    /// is a caller bug and fails with [`ExportError::UnsupportedFormat`].
    fn export_node_as(&self, id: &str, format: ExportFormat) -> Result<ExportData, ExportError>;
}

/// Exports from a document snapshot: JSON subtrees and outline SVG.
#[derive(Debug, Clone)]
pub struct DocumentExporter {
    document: Arc<Document>,
}

impl DocumentExporter {
    pub fn new(document: Arc<Document>) -> Self {
        Self { document }
    }

    fn export_json(&self, id: &str) -> Result<ExportData, ExportError> {
        let payload = ClipboardPayload::from_document(&self.document, &[id.to_string()])
            .ok_or_else(|| ExportError::NodeNotFound(id.to_string()))?;
        Ok(ExportData::Text(serde_json::to_string_pretty(&payload)?))
    }

    fn export_svg(&self, id: &str) -> Result<ExportData, ExportError> {
        let bounds = self
            .document
            .absolute_bounding_rect(id)
            .ok_or_else(|| ExportError::NodeNotFound(id.to_string()))?;
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{} {} {} {}\" width=\"{}\" height=\"{}\">\n",
            bounds.x0,
            bounds.y0,
            bounds.width(),
            bounds.height(),
            bounds.width(),
            bounds.height()
        );
        let mut ids = vec![id.to_string()];
        ids.extend(self.document.descendants(id));
        for node in ids.iter().filter_map(|id| self.document.get(id)) {
            let Ok(transform) = self.document.absolute_transform(&node.id) else {
                continue;
            };
            if let Some(element) = svg_element(node, &transform) {
                svg.push_str("  ");
                svg.push_str(&element);
                svg.push('\n');
            }
        }
        svg.push_str("</svg>\n");
        Ok(ExportData::Text(svg))
    }
}

impl Exporter for DocumentExporter {
    fn can_export_node_as(&self, id: &str, format: ExportFormat) -> bool {
        if !self.document.contains(id) || id == self.document.root_id() {
            return false;
        }
        match format {
            ExportFormat::Json => true,
            ExportFormat::Svg => self.document.absolute_bounding_rect(id).is_some(),
            ExportFormat::Png | ExportFormat::Pdf => false,
        }
    }

    fn export_node_as(&self, id: &str, format: ExportFormat) -> Result<ExportData, ExportError> {
        if !self.can_export_node_as(id, format) {
            log::error!("Export of {} as {} is not supported", id, format);
            return Err(ExportError::UnsupportedFormat {
                id: id.to_string(),
                format,
            });
        }
        match format {
            ExportFormat::Json => self.export_json(id),
            ExportFormat::Svg => self.export_svg(id),
            ExportFormat::Png | ExportFormat::Pdf => Err(ExportError::UnsupportedFormat {
                id: id.to_string(),
                format,
            }),
        }
    }
}

fn svg_matrix(t: &AffineTransform) -> String {
    let [[a, b, tx], [c, d, ty]] = t.matrix;
    format!("matrix({} {} {} {} {} {})", a, c, b, d, tx, ty)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn svg_element(node: &Node, transform: &AffineTransform) -> Option<String> {
    let (w, h) = (node.size.width, node.size.height);
    let matrix = svg_matrix(transform);
    let outline = "fill=\"none\" stroke=\"black\"";
    let element = match node.kind {
        NodeKind::Scene | NodeKind::Group => return None,
        NodeKind::Frame | NodeKind::Rectangle | NodeKind::Image | NodeKind::Vector => {
            if !node.has_extent() {
                return None;
            }
            format!(
                "<rect id=\"{}\" width=\"{}\" height=\"{}\" transform=\"{}\" {}/>",
                escape(&node.id),
                w,
                h,
                matrix,
                outline
            )
        }
        NodeKind::Ellipse => format!(
            "<ellipse id=\"{}\" cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" transform=\"{}\" {}/>",
            escape(&node.id),
            w / 2.0,
            h / 2.0,
            w / 2.0,
            h / 2.0,
            matrix,
            outline
        ),
        NodeKind::Line => format!(
            "<line id=\"{}\" x1=\"0\" y1=\"0\" x2=\"{}\" y2=\"{}\" transform=\"{}\" stroke=\"black\"/>",
            escape(&node.id),
            w,
            h,
            matrix
        ),
        NodeKind::Text => format!(
            "<text id=\"{}\" transform=\"{}\">{}</text>",
            escape(&node.id),
            matrix,
            escape(&node.name)
        ),
    };
    Some(element)
}
