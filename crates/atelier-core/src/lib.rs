//! Atelier Core Library
//!
//! Platform-agnostic geometry, scene graph and interaction core for the
//! Atelier vector canvas editor.

pub mod clipboard;
pub mod config;
pub mod document;
pub mod editor;
pub mod export;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod query;
pub mod recorder;
pub mod snap;
pub mod state;
pub mod storage;

pub use clipboard::{ClipboardPayload, DataTransferPayload};
pub use config::EditorConfig;
pub use document::{Document, DocumentError, Node, NodeId, NodeKind, ZOrder};
pub use editor::Editor;
pub use export::{DocumentExporter, ExportData, ExportError, ExportFormat, Exporter};
pub use geometry::{AffineTransform, Axis, CardinalDirection, GeometryError};
pub use gesture::{Gesture, GestureController, GestureKind, PointerGesture, QueryTicket};
pub use input::{InputState, Modifiers, MouseButton, PointerEvent};
pub use query::{DocumentQuery, GeometryQuery, NoopQuery};
pub use recorder::Recorder;
pub use snap::{SnapGuide, SurfaceSnapping};
pub use state::{dispatch, Action, EditorError, EditorResult, EditorState, History, SelectionMode};
pub use storage::{PreferenceStore, Storage, StorageError};
