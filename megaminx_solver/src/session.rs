//! An interactive puzzle session: one current state with undo/redo
//! history, scramble bookkeeping, and background solves.

use crate::solver::{Solver, SolverError};
use crossbeam_channel::{Receiver, TryRecvError, bounded};
use megaminx_core::{HistoryLog, Move, PieceState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

pub struct Session {
    log: HistoryLog,
    scramble_record: Vec<Move>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Session {
            log: HistoryLog::new(PieceState::solved()),
            scramble_record: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &PieceState {
        self.log.current()
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.state().is_solved()
    }

    /// Moves applied since the last scramble or reset, up to the undo
    /// cursor.
    #[must_use]
    pub fn moves(&self) -> Vec<Move> {
        self.log.moves()
    }

    /// The scramble that produced the current base state, if any.
    #[must_use]
    pub fn scramble_record(&self) -> &[Move] {
        &self.scramble_record
    }

    pub fn apply(&mut self, mv: Move) -> &PieceState {
        self.log.push(mv)
    }

    pub fn apply_sequence(&mut self, moves: &[Move]) -> &PieceState {
        for &mv in moves {
            self.log.push(mv);
        }
        self.state()
    }

    pub fn undo(&mut self) -> Option<&PieceState> {
        self.log.undo()
    }

    pub fn redo(&mut self) -> Option<&PieceState> {
        self.log.redo()
    }

    /// Replace the session with a fresh seeded scramble. History
    /// restarts from the scrambled state.
    pub fn scramble(&mut self, length: usize, seed: u64) -> &PieceState {
        let (state, record) = megaminx_core::scramble(length, seed);
        self.scramble_record = record;
        self.log.reset(state);
        self.state()
    }

    /// Back to a pristine solved puzzle.
    pub fn reset(&mut self) {
        self.scramble_record.clear();
        self.log.reset(PieceState::solved());
    }

    /// Solve the current state on a background thread. The session
    /// stays usable while the solve runs; the handle delivers the
    /// result and can cancel it.
    #[must_use]
    pub fn solve(&self, solver: &Solver) -> SolveHandle {
        let state = self.state().clone();
        let solver = solver.clone();
        let cancel = solver.cancel_flag();
        let (sender, receiver) = bounded(1);
        thread::spawn(move || {
            // The receiver may have been dropped; nothing to do then.
            let _ = sender.send(solver.solve(&state));
        });
        SolveHandle { receiver, cancel }
    }
}

/// Handle to a background solve.
pub struct SolveHandle {
    receiver: Receiver<Result<Vec<Move>, SolverError>>,
    cancel: Arc<AtomicBool>,
}

impl SolveHandle {
    /// Non-blocking poll. `None` while the solve is still running.
    pub fn try_result(&self) -> Option<Result<Vec<Move>, SolverError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(SolverError::Timeout)),
        }
    }

    /// Block until the solve finishes.
    pub fn wait(self) -> Result<Vec<Move>, SolverError> {
        self.receiver.recv().unwrap_or(Err(SolverError::Timeout))
    }

    /// Ask the running solve to stop; it will report
    /// [`SolverError::Timeout`].
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}
