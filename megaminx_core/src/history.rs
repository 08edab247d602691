//! Undo/redo move history.

use crate::moves::Move;
use crate::state::PieceState;

/// A linear log of applied moves with a cursor, supporting undo and
/// redo over snapshots. States are stored, not recomputed, so undo is
/// O(1) and never drifts from what was actually displayed.
///
/// Pushing a move while the cursor is mid-log discards the redo tail,
/// the usual branch-free editor behavior.
#[derive(Clone, Debug)]
pub struct HistoryLog {
    base: PieceState,
    entries: Vec<(Move, PieceState)>,
    cursor: usize,
}

impl HistoryLog {
    #[must_use]
    pub fn new(base: PieceState) -> Self {
        HistoryLog {
            base,
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// The state at the cursor.
    #[must_use]
    pub fn current(&self) -> &PieceState {
        match self.cursor.checked_sub(1) {
            Some(i) => &self.entries[i].1,
            None => &self.base,
        }
    }

    /// Apply `mv` to the current state and record it. Any undone moves
    /// beyond the cursor are discarded.
    pub fn push(&mut self, mv: Move) -> &PieceState {
        self.entries.truncate(self.cursor);
        let next = self.current().apply(mv);
        self.entries.push((mv, next));
        self.cursor += 1;
        &self.entries[self.cursor - 1].1
    }

    /// Step the cursor back one move. `None` if already at the base.
    pub fn undo(&mut self) -> Option<&PieceState> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Re-apply the most recently undone move. `None` if there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Option<&PieceState> {
        if self.cursor == self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// The moves from the base up to the cursor.
    #[must_use]
    pub fn moves(&self) -> Vec<Move> {
        self.entries[..self.cursor].iter().map(|&(mv, _)| mv).collect()
    }

    /// Drop everything and restart from `base`.
    pub fn reset(&mut self, base: PieceState) {
        self.base = base;
        self.entries.clear();
        self.cursor = 0;
    }
}
