//! Undo/redo over editor snapshots.

use super::EditorState;
use std::collections::VecDeque;
use std::sync::Arc;

/// Linear history: `past`, the `present` snapshot, and the redo `future`.
#[derive(Debug, Clone)]
pub struct History {
    past: Vec<Arc<EditorState>>,
    present: Arc<EditorState>,
    future: VecDeque<Arc<EditorState>>,
    /// Cap on `past`; the oldest entries are dropped first.
    max_entries: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Arc::new(EditorState::default()))
    }
}

impl History {
    pub fn new(initial: Arc<EditorState>) -> Self {
        Self {
            past: Vec::new(),
            present: initial.normalized(),
            future: VecDeque::new(),
            max_entries: None,
        }
    }

    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self.enforce_cap();
        self
    }

    pub fn present(&self) -> &Arc<EditorState> {
        &self.present
    }

    /// Make `state` the present, pushing the old present onto `past` and
    /// clearing `future`. The selection is pruned against the new document.
    ///
    /// Committing the present snapshot itself is a no-op and returns `false`.
    pub fn commit(&mut self, state: Arc<EditorState>) -> bool {
        if Arc::ptr_eq(&state, &self.present) {
            return false;
        }
        let state = state.normalized();
        let previous = std::mem::replace(&mut self.present, state);
        self.past.push(previous);
        self.future.clear();
        self.enforce_cap();
        true
    }

    /// Step back one entry. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    /// Step forward one entry. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push(current);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// Drop all undo and redo entries, keeping the present.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    fn enforce_cap(&mut self) {
        if let Some(max) = self.max_entries {
            if self.past.len() > max {
                let excess = self.past.len() - max;
                self.past.drain(..excess);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Node, NodeKind};
    use crate::state::{dispatch, Action};
    use kurbo::Vec2;

    fn history_with_node() -> History {
        let mut doc = Document::new();
        let root = doc.root_id().clone();
        doc.insert(&root, Node::with_id("a", NodeKind::Rectangle).sized(10.0, 10.0), None)
            .unwrap();
        History::new(Arc::new(EditorState::new(doc)))
    }

    fn apply(history: &mut History, action: Action) {
        let next = dispatch(history.present(), action).unwrap();
        history.commit(next);
    }

    #[test]
    fn test_commit_clears_future() {
        let mut history = History::default();
        let next = Arc::new(EditorState::default());
        assert!(history.commit(next));
        assert!(history.undo());
        assert!(history.can_redo());
        assert!(history.commit(Arc::new(EditorState::default())));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_commit_same_snapshot_is_noop() {
        let mut history = History::default();
        let present = Arc::clone(history.present());
        assert!(!history.commit(present));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_undo_redo_on_empty_history() {
        let mut history = History::default();
        assert!(!history.undo());
        assert!(!history.redo());
    }

    #[test]
    fn test_n_undos_restore_initial_state() {
        let mut history = history_with_node();
        let initial = Arc::clone(history.present());
        let actions = vec![
            Action::Select { ids: vec!["a".into()], mode: Default::default() },
            Action::Nudge { delta: Vec2::new(3.0, 4.0) },
            Action::Duplicate { ids: vec!["a".into()] },
            Action::Remove { ids: vec!["a".into()] },
        ];
        let n = actions.len();
        for action in actions {
            apply(&mut history, action);
        }
        assert_eq!(history.undo_len(), n);
        let last = Arc::clone(history.present());

        for _ in 0..n {
            assert!(history.undo());
        }
        assert_eq!(**history.present(), *initial);
        assert!(!history.can_undo());

        for _ in 0..n {
            assert!(history.redo());
        }
        assert_eq!(**history.present(), *last);
    }

    #[test]
    fn test_redo_after_undo_restores_pre_undo_state() {
        let mut history = history_with_node();
        apply(&mut history, Action::Select { ids: vec!["a".into()], mode: Default::default() });
        apply(&mut history, Action::Nudge { delta: Vec2::new(1.0, 0.0) });
        let before = Arc::clone(history.present());
        history.undo();
        history.redo();
        assert!(Arc::ptr_eq(history.present(), &before));
    }

    #[test]
    fn test_commit_prunes_selection() {
        let mut history = history_with_node();
        apply(&mut history, Action::Select { ids: vec!["a".into()], mode: Default::default() });

        // a snapshot built elsewhere that drops the node but keeps the selection
        let mut stale = (**history.present()).clone();
        let mut doc = (*stale.document).clone();
        doc.remove("a");
        stale.document = Arc::new(doc);
        history.commit(Arc::new(stale));
        assert!(history.present().selection.is_empty());
    }

    #[test]
    fn test_history_cap_drops_oldest() {
        let mut history = History::default().with_max_entries(Some(2));
        for _ in 0..5 {
            history.commit(Arc::new(EditorState::default()));
        }
        assert_eq!(history.undo_len(), 2);
        history.clear();
        assert!(!history.can_undo());
    }
}
