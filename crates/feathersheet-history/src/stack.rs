use std::collections::VecDeque;

/// Number of snapshots kept on each stack unless configured otherwise
pub const DEFAULT_HISTORY_DEPTH: usize = 30;

/// Undo/redo journal of whole-state snapshots.
///
/// Both stacks are bounded to `max_depth`; pushing onto a full stack drops
/// its oldest entry. Snapshots are moved in and out by value and never
/// handed out mutably while stored.
#[derive(Clone)]
pub struct HistoryManager<S: Clone> {
    /// Snapshots that can be restored by `undo`, oldest first
    undo_stack: VecDeque<S>,
    /// Snapshots that can be restored by `redo`, oldest first
    redo_stack: VecDeque<S>,
    max_depth: usize,
}

impl<S: Clone> Default for HistoryManager<S> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl<S: Clone> HistoryManager<S> {
    /// Create a journal keeping at most `max_depth` snapshots per stack
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the state as it was before a mutation
    pub fn push(&mut self, snapshot: S) {
        push_bounded(&mut self.undo_stack, snapshot, self.max_depth);
    }

    /// Record the state before a new edit; forward history is discarded
    pub fn push_edit(&mut self, snapshot: S) {
        self.push(snapshot);
        self.clear_redo();
    }

    pub fn clear_redo(&mut self) {
        self.redo_stack.clear();
    }

    /// Step back: the most recent undo snapshot replaces `current`, and
    /// the replaced state moves onto the redo stack.
    ///
    /// Returns false, leaving `current` untouched, when there is nothing to undo.
    pub fn undo(&mut self, current: &mut S) -> bool {
        let Some(previous) = self.undo_stack.pop_back() else {
            return false;
        };
        let replaced = std::mem::replace(current, previous);
        push_bounded(&mut self.redo_stack, replaced, self.max_depth);
        tracing::debug!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "undo");
        true
    }

    /// Step forward: symmetric to `undo`
    pub fn redo(&mut self, current: &mut S) -> bool {
        let Some(next) = self.redo_stack.pop_back() else {
            return false;
        };
        let replaced = std::mem::replace(current, next);
        push_bounded(&mut self.undo_stack, replaced, self.max_depth);
        tracing::debug!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "redo");
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn push_bounded<S>(stack: &mut VecDeque<S>, snapshot: S, max_depth: usize) {
    stack.push_back(snapshot);
    while stack.len() > max_depth {
        stack.pop_front();
    }
}

impl<S: Clone> std::fmt::Debug for HistoryManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feathersheet_core::{CellValue, Column, Table};

    #[test]
    fn test_undo_redo() {
        let mut history = HistoryManager::new(10);
        let mut state = 1;

        history.push_edit(state);
        state = 2;

        assert!(history.can_undo());
        assert!(!history.can_redo());

        assert!(history.undo(&mut state));
        assert_eq!(state, 1);
        assert!(!history.can_undo());
        assert!(history.can_redo());

        assert!(history.redo(&mut state));
        assert_eq!(state, 2);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_leave_state_alone() {
        let mut history: HistoryManager<i32> = HistoryManager::default();
        let mut state = 5;
        assert!(!history.undo(&mut state));
        assert!(!history.redo(&mut state));
        assert_eq!(state, 5);
        assert_eq!(history.max_depth(), DEFAULT_HISTORY_DEPTH);
    }

    #[test]
    fn test_redo_cleared_on_new_edit() {
        let mut history = HistoryManager::new(10);
        let mut state = 2;
        history.push_edit(1);
        history.undo(&mut state);
        assert!(history.can_redo());

        history.push_edit(state);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_oldest_snapshot_evicted() {
        let mut history = HistoryManager::new(3);
        for i in 0..5 {
            history.push(i);
        }
        assert_eq!(history.undo_count(), 3);

        let mut state = 5;
        let mut seen = Vec::new();
        while history.undo(&mut state) {
            seen.push(state);
        }
        assert_eq!(seen, vec![4, 3, 2]);
        assert_eq!(history.redo_count(), 3);
    }

    #[test]
    fn test_undo_refills_bounded_stack_from_redo() {
        let mut history = HistoryManager::new(2);
        let mut state = 0;
        for i in 1..=2 {
            history.push_edit(state);
            state = i;
        }
        while history.undo(&mut state) {}
        assert_eq!(state, 0);
        while history.redo(&mut state) {}
        assert_eq!(state, 2);
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn test_table_snapshots_round_trip() {
        let mut table = Table::new(vec![Column::strs("name", &["a", "b"])]).unwrap();
        let original = table.clone();
        let mut history = HistoryManager::default();

        history.push_edit(table.clone());
        table.set_value(0, 0, CellValue::Str("z".into())).unwrap();
        let edited = table.clone();

        assert!(history.undo(&mut table));
        assert_eq!(table, original);

        assert!(history.redo(&mut table));
        assert_eq!(table, edited);
    }

    #[test]
    fn test_clear() {
        let mut history = HistoryManager::new(5);
        let mut state = 2;
        history.push(1);
        history.undo(&mut state);
        history.push(3);
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
