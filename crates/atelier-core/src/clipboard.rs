//! Clipboard codec and drag-and-drop payloads.
//!
//! Copied nodes travel as HTML: a carrier element whose attribute holds the
//! base64-encoded JSON payload, so the data survives clipboards that only
//! keep `text/html`.

use crate::document::{generate_id, Document, Node, NodeId, NodeKind};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// Attribute carrying the payload.
pub const CLIPBOARD_ATTRIBUTE: &str = "data-atelier-clipboard";

const BASE64_PREFIX: &str = "b64:";

/// Copied subtrees: flattened prototypes plus the ids of their roots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    pub payload_id: String,
    pub prototypes: Vec<Node>,
    pub ids: Vec<NodeId>,
}

impl ClipboardPayload {
    pub fn new(prototypes: Vec<Node>, ids: Vec<NodeId>) -> Self {
        Self {
            payload_id: generate_id(),
            prototypes,
            ids,
        }
    }

    /// Copy the given nodes and their descendants. `None` when none of the
    /// ids are copyable.
    pub fn from_document(document: &Document, ids: &[NodeId]) -> Option<Self> {
        let (prototypes, roots) = document.subtree_prototypes(ids);
        if roots.is_empty() {
            return None;
        }
        Some(Self::new(prototypes, roots))
    }
}

/// Wrap `payload` in its HTML carrier.
pub fn encode(payload: &ClipboardPayload) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(payload)?;
    Ok(format!(
        "<span {}=\"{}{}\"></span>",
        CLIPBOARD_ATTRIBUTE,
        BASE64_PREFIX,
        STANDARD.encode(json)
    ))
}

/// Extract a payload from clipboard HTML.
///
/// Tolerates markup the browser wraps around the carrier (`<meta>`,
/// `<html><body>`) and escaped quotes. Anything that is not a well-formed
/// payload yields `None`.
pub fn decode(html: &str) -> Option<ClipboardPayload> {
    let encoded = carrier_value(html)?;
    let bytes = match STANDARD.decode(encoded) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("Clipboard carrier is not valid base64: {}", e);
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(payload) => Some(payload),
        Err(e) => {
            log::debug!("Clipboard carrier holds no payload: {}", e);
            None
        }
    }
}

fn carrier_value(html: &str) -> Option<&str> {
    let start = html.find(CLIPBOARD_ATTRIBUTE)? + CLIPBOARD_ATTRIBUTE.len();
    let rest = html[start..].trim_start().strip_prefix('=')?.trim_start();
    let rest = ["&quot;", "\"", "'"]
        .iter()
        .find_map(|quote| rest.strip_prefix(quote))
        .unwrap_or(rest);
    let value = rest.strip_prefix(BASE64_PREFIX)?;
    let end = value
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')))
        .unwrap_or(value.len());
    Some(&value[..end])
}

/// Plain-text fallback for the clipboard: names of the copied text nodes,
/// one per line.
pub fn encode_text(payload: &ClipboardPayload) -> Option<String> {
    let lines: Vec<&str> = payload
        .prototypes
        .iter()
        .filter(|node| node.kind == NodeKind::Text && !node.name.is_empty())
        .map(|node| node.name.as_str())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Drag-and-drop payload for assets dropped onto the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataTransferPayload {
    Svg {
        name: String,
        src: String,
    },
    Image {
        name: String,
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
    },
}

impl DataTransferPayload {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a drop payload; foreign data yields `None`.
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}
