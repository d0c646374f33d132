//! The editor: owns history, the live gesture and the attached query provider.

use crate::clipboard::{self, ClipboardPayload};
use crate::config::EditorConfig;
use crate::document::{Document, NodeId};
use crate::export::DocumentExporter;
use crate::gesture::{
    Gesture, GestureController, GestureError, GestureKind, PointerGesture, QueryTicket,
};
use crate::input::{InputState, PointerEvent};
use crate::query::{GeometryQuery, NoopQuery};
use crate::recorder::Recorder;
use crate::snap::SnapGuide;
use crate::state::{
    dispatch_with, transform_nodes, Action, EditorError, EditorResult, EditorState, History,
};
use kurbo::{Rect, Vec2};
use std::sync::Arc;

/// Runtime editor state (not persisted).
///
/// Every edit goes through [`Editor::dispatch`] or a gesture. While a gesture
/// is active its ticks only update a preview snapshot; the committed history
/// changes once, on pointer-up.
pub struct Editor {
    history: History,
    config: EditorConfig,
    query: Box<dyn GeometryQuery>,
    gestures: GestureController,
    input: InputState,
    /// Snapshot shown while a gesture is active.
    preview: Option<Arc<EditorState>>,
    recorder: Recorder,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl Editor {
    /// Create an editor over `document` with the default configuration.
    pub fn new(document: Document) -> Self {
        Self::with_config(document, EditorConfig::default())
    }

    pub fn with_config(document: Document, config: EditorConfig) -> Self {
        let initial = Arc::new(EditorState::new(document));
        Self {
            history: History::new(initial).with_max_entries(config.history.max_entries),
            config,
            query: Box::new(NoopQuery),
            gestures: GestureController::new(),
            input: InputState::new(),
            preview: None,
            recorder: Recorder::with_cadence_ms(config.recorder.cadence_ms),
        }
    }

    /// Attach a geometry query provider.
    pub fn with_query(mut self, query: impl GeometryQuery + 'static) -> Self {
        self.set_query(query);
        self
    }

    pub fn set_query(&mut self, query: impl GeometryQuery + 'static) {
        self.query = Box::new(query);
        let state = Arc::clone(self.state());
        self.query.sync(&state.document, &state.viewport);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Replace the configuration. The history cap and recorder cadence take
    /// effect immediately.
    pub fn set_config(&mut self, config: EditorConfig) {
        self.history = std::mem::take(&mut self.history).with_max_entries(config.history.max_entries);
        self.recorder
            .set_cadence(std::time::Duration::from_millis(config.recorder.cadence_ms));
        self.config = config;
    }

    /// The snapshot to display: the gesture preview if one is active,
    /// otherwise the committed present.
    pub fn state(&self) -> &Arc<EditorState> {
        self.preview.as_ref().unwrap_or_else(|| self.history.present())
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut Recorder {
        &mut self.recorder
    }

    /// Start recording, beginning with the snapshot currently displayed.
    pub fn start_recording(&mut self) {
        self.recorder.start();
        let state = Arc::clone(self.state());
        self.recorder.capture(&state);
    }

    pub fn stop_recording(&mut self) {
        self.recorder.stop();
    }

    /// Hand the displayed snapshot to the query provider and the recorder.
    /// Gesture previews are throttled by the recorder cadence; committed
    /// snapshots are always captured.
    fn publish(&mut self) {
        let state = Arc::clone(self.state());
        self.query.sync(&state.document, &state.viewport);
        if self.preview.is_some() {
            self.recorder.tick(&state);
        } else {
            self.recorder.capture(&state);
        }
    }

    /// Apply an action and commit the result. Returns whether a history entry
    /// was created; no-op actions create none.
    ///
    /// Refused while a gesture is active.
    pub fn dispatch(&mut self, action: Action) -> EditorResult<bool> {
        if let Some(kind) = self.gestures.kind() {
            return Err(GestureError::InProgress(kind).into());
        }
        let next = dispatch_with(self.history.present(), action, &self.config)?;
        let committed = self.history.commit(next);
        if committed {
            self.publish();
        }
        Ok(committed)
    }

    /// Undo the last commit, abandoning any active gesture first.
    pub fn undo(&mut self) -> bool {
        self.cancel();
        let changed = self.history.undo();
        if changed {
            self.publish();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        self.cancel();
        let changed = self.history.redo();
        if changed {
            self.publish();
        }
        changed
    }

    /// Nodes under a pointer event, front-most first.
    pub fn pick(&self, event: &PointerEvent) -> Vec<NodeId> {
        self.query.node_ids_from_pointer_event(event)
    }

    pub fn snap_guide(&self) -> Option<SnapGuide> {
        self.gestures.snap_guide()
    }

    /// Combined absolute bounds of `ids`, preferring the query provider.
    fn bounds_of(&self, document: &Document, ids: &[NodeId]) -> Option<Rect> {
        ids.iter()
            .filter_map(|id| {
                self.query
                    .node_absolute_bounding_rect(id)
                    .or_else(|| document.absolute_bounding_rect(id))
            })
            .reduce(|a, b| a.union(b))
    }

    /// Start a pointer gesture over the current selection.
    pub fn pointer_down(&mut self, pointer: PointerGesture, event: &PointerEvent) -> EditorResult<()> {
        self.input.handle_pointer_event(event);
        let present = Arc::clone(self.history.present());
        let ids = present.document.top_level(&present.selection);
        if ids.is_empty() {
            return Err(EditorError::EmptySelection);
        }
        let start = present.viewport.invert()?.apply_point(event.position());
        let bounds = self
            .bounds_of(&present.document, &ids)
            .unwrap_or_else(|| Rect::from_points(start, start));
        self.gestures.begin(pointer, ids, start, bounds)?;
        Ok(())
    }

    /// Issue a ticket for a pointer move. Resolve it with
    /// [`Editor::resolve_pointer_move`] once the snap anchors are known.
    pub fn request_pointer_move(&mut self, event: &PointerEvent) -> Option<QueryTicket> {
        self.input.handle_pointer_event(event);
        let position = self.history.present().screen_to_canvas(event.position())?;
        self.gestures.ticket(position, event.modifiers())
    }

    /// Siblings of the moving nodes, whose bounds serve as snap anchors.
    pub fn snap_candidates(&self) -> Vec<NodeId> {
        let moving = self.gestures.current().ids();
        let document = &self.history.present().document;
        let mut candidates: Vec<NodeId> = Vec::new();
        for id in moving {
            for sibling in document.siblings(id) {
                if !moving.contains(&sibling) && !candidates.contains(&sibling) {
                    candidates.push(sibling);
                }
            }
        }
        candidates
    }

    /// Apply a ticket with the anchor rectangles its query produced. Returns
    /// `false` when the ticket was stale and nothing changed.
    pub fn resolve_pointer_move(&mut self, ticket: &QueryTicket, anchors: &[Rect]) -> EditorResult<bool> {
        let options = self.config.snap.options(self.history.present().zoom());
        let Some(gesture) = self.gestures.apply(ticket, anchors, &options).cloned() else {
            return Ok(false);
        };
        self.show_preview(gesture)?;
        Ok(true)
    }

    /// Request and resolve a pointer move in one step, with anchors from the
    /// attached query provider.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> EditorResult<bool> {
        let Some(ticket) = self.request_pointer_move(event) else {
            return Ok(false);
        };
        let anchors: Vec<Rect> = self
            .snap_candidates()
            .iter()
            .filter_map(|id| self.query.node_absolute_bounding_rect(id))
            .collect();
        self.resolve_pointer_move(&ticket, &anchors)
    }

    /// Finish the pointer gesture and commit it as one history entry.
    ///
    /// If the final transform cannot be applied the error is returned and the
    /// gesture stays active, so the caller can keep dragging or cancel.
    pub fn pointer_up(&mut self, event: &PointerEvent) -> EditorResult<bool> {
        self.input.handle_pointer_event(event);
        match self.gestures.kind() {
            Some(GestureKind::Translate | GestureKind::Scale | GestureKind::Rotate) => self.commit_gesture(),
            _ => Ok(false),
        }
    }

    /// Move the selection by `delta` as part of a keyboard nudge. Repeated
    /// nudges accumulate until [`Editor::end_nudge`].
    pub fn nudge(&mut self, delta: Vec2) -> EditorResult<()> {
        let present = self.history.present();
        let ids = present.document.top_level(&present.selection);
        if ids.is_empty() {
            return Err(EditorError::EmptySelection);
        }
        let gesture = self.gestures.nudge(ids, delta)?.clone();
        self.show_preview(gesture)
    }

    /// Nudge by whole keyboard steps, using the configured step sizes.
    pub fn nudge_steps(&mut self, steps: Vec2, big: bool) -> EditorResult<()> {
        let step = if big {
            self.config.nudge.big_step
        } else {
            self.config.nudge.step
        };
        self.nudge(steps * step)
    }

    /// Commit an accumulated nudge.
    pub fn end_nudge(&mut self) -> EditorResult<bool> {
        if self.gestures.kind() != Some(GestureKind::Nudge) {
            return Ok(false);
        }
        self.commit_gesture()
    }

    /// Abandon the active gesture and drop its preview. Nothing is committed.
    pub fn cancel(&mut self) -> bool {
        self.input.reset_drag();
        let cancelled = self.gestures.cancel().is_some();
        self.preview = None;
        if cancelled {
            self.publish();
        }
        cancelled
    }

    fn show_preview(&mut self, gesture: Gesture) -> EditorResult<()> {
        let present = self.history.present();
        let mut document = (*present.document).clone();
        transform_nodes(&mut document, gesture.ids(), &gesture.transform(), false)?;
        let mut preview = (**present).clone();
        preview.document = Arc::new(document);
        preview.gesture = gesture;
        self.preview = Some(Arc::new(preview));
        self.publish();
        Ok(())
    }

    fn commit_gesture(&mut self) -> EditorResult<bool> {
        let gesture = self.gestures.current().clone();
        if gesture.is_none() {
            return Ok(false);
        }
        let transform = gesture.transform();
        let next = if transform.is_identity() {
            None
        } else {
            let present = self.history.present();
            let mut document = (*present.document).clone();
            if let Err(e) = transform_nodes(&mut document, gesture.ids(), &transform, true) {
                log::warn!("Gesture {:?} could not be committed: {}", gesture.kind(), e);
                return Err(e);
            }
            let mut next = (**present).clone();
            next.document = Arc::new(document);
            next.gesture = Gesture::None;
            Some(Arc::new(next))
        };

        self.gestures.finish();
        self.preview = None;
        let committed = next.is_some_and(|next| self.history.commit(next));
        log::debug!("Gesture {:?} committed: {}", gesture.kind(), committed);
        self.publish();
        Ok(committed)
    }

    /// Clipboard HTML for the selection, or `None` when nothing is selected.
    pub fn copy(&self) -> Option<String> {
        let present = self.history.present();
        let payload = ClipboardPayload::from_document(&present.document, &present.selection)?;
        match clipboard::encode(&payload) {
            Ok(html) => Some(html),
            Err(e) => {
                log::warn!("Failed to encode clipboard payload: {}", e);
                None
            }
        }
    }

    /// Copy the selection, then remove it.
    pub fn cut(&mut self) -> EditorResult<Option<String>> {
        let Some(html) = self.copy() else {
            return Ok(None);
        };
        let ids = self.history.present().selection.clone();
        self.dispatch(Action::Remove { ids })?;
        Ok(Some(html))
    }

    /// Paste clipboard HTML into the single selected container, or the root.
    /// Foreign clipboard content is ignored and returns `false`.
    pub fn paste(&mut self, html: &str) -> EditorResult<bool> {
        let Some(payload) = clipboard::decode(html) else {
            log::debug!("Clipboard holds no nodes");
            return Ok(false);
        };
        let present = self.history.present();
        let parent = match present.selection.as_slice() {
            [id] => present
                .document
                .get(id)
                .filter(|node| node.capabilities().children)
                .map(|node| node.id.clone()),
            _ => None,
        };
        self.dispatch(Action::Paste { parent, payload })
    }

    /// Exporter over the committed document.
    pub fn exporter(&self) -> DocumentExporter {
        DocumentExporter::new(Arc::clone(&self.history.present().document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Node, NodeKind};
    use crate::export::{ExportFormat, Exporter};
    use crate::geometry::AffineTransform;
    use crate::query::DocumentQuery;
    use crate::geometry::CardinalDirection;
    use crate::state::SelectionMode;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn document() -> Document {
        let mut doc = Document::new();
        let root = doc.root_id().clone();
        doc.insert(&root, Node::with_id("a", NodeKind::Rectangle).sized(100.0, 100.0), None)
            .unwrap();
        doc.insert(&root, Node::with_id("b", NodeKind::Rectangle).sized(100.0, 100.0).at(300.0, 0.0), None)
            .unwrap();
        doc
    }

    fn editor_with_selection() -> Editor {
        let mut editor = Editor::new(document());
        editor
            .dispatch(Action::Select {
                ids: vec!["a".into()],
                mode: SelectionMode::Replace,
            })
            .unwrap();
        editor
    }

    fn translation(state: &EditorState, id: &str) -> Vec2 {
        state.document.get(id).unwrap().transform.translation()
    }

    #[test]
    fn test_drag_commits_single_history_entry() {
        let mut editor = editor_with_selection();
        assert_eq!(editor.history().undo_len(), 1);

        editor
            .pointer_down(PointerGesture::Translate, &PointerEvent::down((50.0, 50.0)))
            .unwrap();
        for x in [60.0, 70.0, 80.0] {
            assert!(editor.pointer_move(&PointerEvent::moved((x, 50.0))).unwrap());
        }
        assert_eq!(translation(editor.state(), "a"), Vec2::new(30.0, 0.0));
        assert_eq!(translation(editor.history().present(), "a"), Vec2::ZERO);
        assert!(!editor.state().gesture.is_none());
        assert_eq!(editor.history().undo_len(), 1);

        assert!(editor.pointer_up(&PointerEvent::up((80.0, 50.0))).unwrap());
        assert_eq!(editor.history().undo_len(), 2);
        assert_eq!(translation(editor.state(), "a"), Vec2::new(30.0, 0.0));
        assert!(editor.state().gesture.is_none());
        assert!(!editor.gestures().is_active());

        assert!(editor.undo());
        assert_eq!(translation(editor.state(), "a"), Vec2::ZERO);
    }

    #[test]
    fn test_cancel_reverts_without_history_entry() {
        let mut editor = editor_with_selection();
        let before = Arc::clone(editor.history().present());
        editor
            .pointer_down(PointerGesture::Translate, &PointerEvent::down((50.0, 50.0)))
            .unwrap();
        editor.pointer_move(&PointerEvent::moved((90.0, 90.0))).unwrap();

        assert!(editor.cancel());
        assert!(Arc::ptr_eq(editor.state(), &before));
        assert_eq!(editor.history().undo_len(), 1);
        assert!(!editor.pointer_up(&PointerEvent::up((90.0, 90.0))).unwrap());
        assert!(!editor.cancel());
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut editor = editor_with_selection();
        editor
            .pointer_down(PointerGesture::Translate, &PointerEvent::down((50.0, 50.0)))
            .unwrap();
        let first = editor.request_pointer_move(&PointerEvent::moved((60.0, 50.0))).unwrap();
        let second = editor.request_pointer_move(&PointerEvent::moved((90.0, 50.0))).unwrap();

        assert!(editor.resolve_pointer_move(&second, &[]).unwrap());
        assert!(!editor.resolve_pointer_move(&first, &[]).unwrap());
        assert_eq!(translation(editor.state(), "a"), Vec2::new(40.0, 0.0));

        editor.cancel();
        assert!(!editor.resolve_pointer_move(&second, &[]).unwrap());
        assert_eq!(translation(editor.state(), "a"), Vec2::ZERO);
    }

    #[test]
    fn test_drag_snaps_to_sibling_from_query() {
        let doc = document();
        let mut editor = Editor::new(doc.clone())
            .with_query(DocumentQuery::new(Arc::new(doc), AffineTransform::IDENTITY));
        editor
            .dispatch(Action::Select {
                ids: vec!["a".into()],
                mode: SelectionMode::Replace,
            })
            .unwrap();
        assert_eq!(editor.snap_candidates(), Vec::<NodeId>::new());

        editor
            .pointer_down(PointerGesture::Translate, &PointerEvent::down((50.0, 50.0)))
            .unwrap();
        assert_eq!(editor.snap_candidates(), vec!["b".to_string()]);

        // right edge lands at 298, two short of b's left edge
        editor.pointer_move(&PointerEvent::moved((248.0, 50.0))).unwrap();
        assert!(editor.snap_guide().is_some());
        assert_eq!(translation(editor.state(), "a"), Vec2::new(200.0, 0.0));

        editor.pointer_up(&PointerEvent::up((248.0, 50.0))).unwrap();
        assert_eq!(translation(editor.history().present(), "a"), Vec2::new(200.0, 0.0));
        assert!(editor.snap_guide().is_none());
    }

    #[test]
    fn test_dispatch_refused_during_gesture() {
        let mut editor = editor_with_selection();
        editor
            .pointer_down(PointerGesture::Rotate, &PointerEvent::down((0.0, 0.0)))
            .unwrap();
        let result = editor.dispatch(Action::ClearSelection);
        assert_eq!(
            result,
            Err(EditorError::Gesture(GestureError::InProgress(GestureKind::Rotate)))
        );
        let second = editor.pointer_down(PointerGesture::Translate, &PointerEvent::down((0.0, 0.0)));
        assert!(matches!(second, Err(EditorError::Gesture(GestureError::InProgress(_)))));
    }

    #[test]
    fn test_undo_during_gesture_cancels_it() {
        let mut editor = editor_with_selection();
        editor
            .pointer_down(PointerGesture::Translate, &PointerEvent::down((50.0, 50.0)))
            .unwrap();
        editor.pointer_move(&PointerEvent::moved((70.0, 50.0))).unwrap();
        assert!(editor.undo());
        assert!(!editor.gestures().is_active());
        assert!(editor.state().selection.is_empty());
        assert_eq!(translation(editor.state(), "a"), Vec2::ZERO);
    }

    #[test]
    fn test_pointer_down_needs_selection() {
        let mut editor = Editor::new(document());
        let result = editor.pointer_down(PointerGesture::Translate, &PointerEvent::down((0.0, 0.0)));
        assert_eq!(result, Err(EditorError::EmptySelection));
        assert!(!editor.gestures().is_active());
    }

    #[test]
    fn test_nudges_fold_into_one_entry() {
        let mut editor = editor_with_selection();
        editor.nudge(Vec2::new(1.0, 0.0)).unwrap();
        editor.nudge_steps(Vec2::new(0.0, 1.0), true).unwrap();
        assert_eq!(translation(editor.state(), "a"), Vec2::new(1.0, 10.0));
        assert_eq!(editor.history().undo_len(), 1);

        assert!(!editor.pointer_up(&PointerEvent::up((0.0, 0.0))).unwrap());
        assert!(editor.end_nudge().unwrap());
        assert_eq!(editor.history().undo_len(), 2);
        assert_eq!(translation(editor.history().present(), "a"), Vec2::new(1.0, 10.0));
        assert!(!editor.end_nudge().unwrap());
    }

    #[test]
    fn test_identity_gesture_commits_nothing() {
        let mut editor = editor_with_selection();
        editor
            .pointer_down(PointerGesture::Translate, &PointerEvent::down((50.0, 50.0)))
            .unwrap();
        assert!(!editor.pointer_up(&PointerEvent::up((50.0, 50.0))).unwrap());
        assert_eq!(editor.history().undo_len(), 1);
        assert!(!editor.gestures().is_active());
    }

    #[test]
    fn test_degenerate_commit_keeps_gesture() {
        init_logger();
        let mut editor = editor_with_selection();
        editor
            .pointer_down(
                PointerGesture::Scale(CardinalDirection::E),
                &PointerEvent::down((100.0, 50.0)),
            )
            .unwrap();
        // dragging the east handle onto the west edge collapses the width
        assert!(editor.pointer_move(&PointerEvent::moved((0.0, 50.0))).unwrap());
        assert!(editor.pointer_up(&PointerEvent::up((0.0, 50.0))).is_err());
        assert!(editor.gestures().is_active());
        assert_eq!(editor.history().undo_len(), 1);

        assert!(editor.pointer_move(&PointerEvent::moved((200.0, 50.0))).unwrap());
        assert!(editor.pointer_up(&PointerEvent::up((200.0, 50.0))).unwrap());
        let node = editor.state().document.get("a").unwrap();
        assert!((node.transform.matrix[0][0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_copy_paste_and_cut() {
        let mut editor = editor_with_selection();
        let html = editor.copy().unwrap();
        assert!(editor.paste(&html).unwrap());

        let state = editor.state();
        assert_eq!(state.document.root().children.len(), 3);
        assert_eq!(state.selection.len(), 1);
        assert_ne!(state.selection[0], "a");

        assert!(!editor.paste("garbage").unwrap());

        let cut = editor.cut().unwrap();
        assert!(cut.is_some());
        assert_eq!(editor.state().document.root().children.len(), 2);
        assert!(editor.state().selection.is_empty());
        assert_eq!(editor.cut().unwrap(), None);
    }

    #[test]
    fn test_paste_into_selected_container() {
        let mut doc = document();
        let root = doc.root_id().clone();
        doc.insert(&root, Node::with_id("frame", NodeKind::Frame).sized(500.0, 500.0), None)
            .unwrap();
        let mut editor = Editor::new(doc);
        editor
            .dispatch(Action::Select {
                ids: vec!["a".into()],
                mode: SelectionMode::Replace,
            })
            .unwrap();
        let html = editor.copy().unwrap();
        editor
            .dispatch(Action::Select {
                ids: vec!["frame".into()],
                mode: SelectionMode::Replace,
            })
            .unwrap();
        assert!(editor.paste(&html).unwrap());
        assert_eq!(editor.state().document.get("frame").unwrap().children.len(), 1);
    }

    #[test]
    fn test_recorder_follows_published_snapshots() {
        let mut editor = Editor::new(document());
        editor.recorder_mut().start();
        editor
            .dispatch(Action::Select {
                ids: vec!["a".into()],
                mode: SelectionMode::Replace,
            })
            .unwrap();
        editor.nudge(Vec2::new(5.0, 0.0)).unwrap();
        editor.end_nudge().unwrap();
        assert_eq!(editor.recorder().len(), 3);
        let last = editor.recorder().replay().last().unwrap();
        assert!(Arc::ptr_eq(last, editor.state()));
    }

    #[test]
    fn test_recording_keeps_start_and_commits_under_cadence() {
        let mut config = EditorConfig::default();
        config.recorder.cadence_ms = 3_600_000;
        let mut editor = Editor::with_config(document(), config);
        let initial = Arc::clone(editor.state());
        editor.start_recording();
        editor
            .dispatch(Action::Select {
                ids: vec!["a".into()],
                mode: SelectionMode::Replace,
            })
            .unwrap();
        editor.nudge(Vec2::new(5.0, 0.0)).unwrap();
        editor.nudge(Vec2::new(5.0, 0.0)).unwrap();
        assert!(editor.end_nudge().unwrap());

        let frames: Vec<_> = editor.recorder().replay().collect();
        assert_eq!(frames.len(), 3);
        assert!(Arc::ptr_eq(frames[0], &initial));
        assert!(Arc::ptr_eq(frames[2], editor.history().present()));

        assert!(editor.undo());
        let last = editor.recorder().replay().last().unwrap();
        assert!(Arc::ptr_eq(last, editor.history().present()));

        editor.stop_recording();
        assert!(!editor.recorder().is_recording());
    }

    #[test]
    fn test_config_caps_history() {
        let mut config = EditorConfig::default();
        config.history.max_entries = Some(1);
        let mut editor = Editor::with_config(document(), config);
        for id in ["a", "b", "a"] {
            editor
                .dispatch(Action::Select {
                    ids: vec![id.into()],
                    mode: SelectionMode::Replace,
                })
                .unwrap();
        }
        assert_eq!(editor.history().undo_len(), 1);

        config.history.max_entries = None;
        editor.set_config(config);
        assert_eq!(editor.config().history.max_entries, None);
    }

    #[test]
    fn test_pick_and_export_use_current_document() {
        let doc = document();
        let editor = Editor::new(doc.clone())
            .with_query(DocumentQuery::new(Arc::new(doc), AffineTransform::IDENTITY));
        assert_eq!(editor.pick(&PointerEvent::down((310.0, 10.0))), vec!["b".to_string()]);
        assert!(Editor::default().pick(&PointerEvent::down((0.0, 0.0))).is_empty());
        assert!(editor.exporter().can_export_node_as("a", ExportFormat::Svg));
    }
}
