//! The solve pipeline: validate, place the outer layers, finish the D
//! layer, then simplify the concatenated word.

use crate::{macros, stages};
use log::info;
use megaminx_core::validator::{self, UnsolvableReason};
use megaminx_core::{Move, MoveEngine, PieceState};
use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SolverError {
    #[error("state cannot be solved: {0}")]
    Unsolvable(#[from] UnsolvableReason),
    #[error("solve aborted before a solution was found")]
    Timeout,
    #[error("solution of {found} moves exceeds the configured maximum of {max}")]
    DepthExceeded { found: usize, max: usize },
    #[error("discovered macro catalog does not reach the remaining states")]
    MacroGap,
}

/// Deadline and cancellation polling shared by the searches. Checks
/// are counted and the clock is only sampled every so often, since
/// the searches call in from tight loops.
pub(crate) struct Watch {
    deadline: Option<Instant>,
    cancel: Arc<AtomicBool>,
    ticks: Cell<u32>,
}

const POLL_MASK: u32 = 0x3FF;

impl Watch {
    pub(crate) fn new(deadline: Option<Instant>, cancel: Arc<AtomicBool>) -> Self {
        Watch {
            deadline,
            cancel,
            ticks: Cell::new(0),
        }
    }

    #[cfg(test)]
    pub(crate) fn unlimited() -> Self {
        Watch::new(None, Arc::new(AtomicBool::new(false)))
    }

    pub(crate) fn check(&self) -> Result<(), SolverError> {
        let ticks = self.ticks.get().wrapping_add(1);
        self.ticks.set(ticks);
        if ticks & POLL_MASK != 0 {
            return Ok(());
        }
        if self.cancel.load(Ordering::Relaxed) {
            return Err(SolverError::Timeout);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(SolverError::Timeout);
        }
        Ok(())
    }
}

/// Configurable layered solver. Cheap to clone; clones share the
/// cancellation flag.
#[derive(Clone)]
pub struct Solver {
    max_depth: Option<usize>,
    time_budget: Option<Duration>,
    cancel: Arc<AtomicBool>,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new()
    }
}

impl Solver {
    #[must_use]
    pub fn new() -> Self {
        Solver {
            max_depth: None,
            time_budget: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fail with [`SolverError::DepthExceeded`] if the simplified
    /// solution is longer than `max_depth` moves.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Give up with [`SolverError::Timeout`] once the budget elapses.
    #[must_use]
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Flag that aborts an in-flight solve when set.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Find a move sequence taking `state` to solved.
    ///
    /// # Errors
    ///
    /// [`SolverError::Unsolvable`] for unreachable states,
    /// [`SolverError::Timeout`] on budget exhaustion or cancellation,
    /// [`SolverError::DepthExceeded`] when a solution was found but is
    /// too long.
    pub fn solve(&self, state: &PieceState) -> Result<Vec<Move>, SolverError> {
        validator::check(state)?;
        let deadline = self.time_budget.map(|budget| Instant::now() + budget);
        let watch = Watch::new(deadline, Arc::clone(&self.cancel));

        info!(crate::start!("solving outer layers"));
        let mut solution = stages::solve_outer_layers(state, &watch)?;
        let mid = state.apply_all(&solution);

        info!(crate::working!("finishing the D layer"));
        let edges = macros::solve_d_edges(&mid, &watch)?;
        let after_edges = mid.apply_all(&edges);
        solution.extend(edges);
        let corners = macros::solve_d_corners(&after_edges, &watch)?;
        solution.extend(corners);
        debug_assert!(state.apply_all(&solution).is_solved());

        let solution = MoveEngine::simplify(&solution);
        info!(crate::success!("solved in {} moves"), solution.len());
        if let Some(max) = self.max_depth {
            if solution.len() > max {
                return Err(SolverError::DepthExceeded {
                    found: solution.len(),
                    max,
                });
            }
        }
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megaminx_core::scramble;
    use megaminx_core::state::{CORNERS, EDGES};

    #[test]
    fn solved_input_yields_an_empty_solution() {
        let solution = Solver::new().solve(&PieceState::solved()).unwrap();
        assert!(solution.is_empty());
    }

    #[test]
    fn unsolvable_states_are_rejected_before_searching() {
        let solved = PieceState::solved();
        let mut corner_ori = [0u8; CORNERS];
        corner_ori[5] = 2;
        let state = PieceState::try_new(
            *solved.corner_perm(),
            corner_ori,
            *solved.edge_perm(),
            [0u8; EDGES],
        )
        .unwrap();
        assert!(matches!(
            Solver::new().solve(&state),
            Err(SolverError::Unsolvable(_))
        ));
    }

    #[test]
    fn short_scramble_round_trips() {
        let (state, _) = scramble(8, 17);
        let solution = Solver::new().solve(&state).unwrap();
        assert!(state.apply_all(&solution).is_solved());
    }

    #[test]
    fn cancelled_solve_reports_timeout() {
        let (state, _) = scramble(60, 31);
        let solver = Solver::new();
        solver.cancel_flag().store(true, Ordering::Relaxed);
        assert_eq!(solver.solve(&state), Err(SolverError::Timeout));
    }

    #[test]
    fn zero_budget_times_out() {
        let (state, _) = scramble(60, 32);
        let solver = Solver::new().with_time_budget(Duration::ZERO);
        assert_eq!(solver.solve(&state), Err(SolverError::Timeout));
    }
}
