//! Reachability validation.
//!
//! Not every structurally well-formed [`PieceState`] can be reached by
//! twisting faces. Each twist is a 5-cycle on corners and a 5-cycle on
//! edges (both even), and moves orientations around without changing
//! their sums, so four independent invariants characterize the
//! reachable coset: corner orientations sum to 0 mod 3, edge
//! orientations sum to 0 mod 2, and both permutations are even.
//! A state violating any of them came from a physically disassembled
//! (or mis-entered) puzzle.

use crate::state::{CORNER_ORIENTATIONS, CORNERS, EDGE_ORIENTATIONS, EDGES, PieceState};
use thiserror::Error;

/// The first violated reachability invariant, in checking order.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UnsolvableReason {
    #[error("corner orientations sum to {sum} mod 3 (a corner is twisted in place)")]
    CornerOrientationSum { sum: u8 },
    #[error("edge orientations sum to {sum} mod 2 (an edge is flipped in place)")]
    EdgeOrientationSum { sum: u8 },
    #[error("corner permutation is odd (two corners are swapped)")]
    CornerPermutationParity,
    #[error("edge permutation is odd (two edges are swapped)")]
    EdgePermutationParity,
}

/// Check whether `state` is reachable from solved by legal moves.
///
/// # Errors
///
/// The first violated invariant, as [`UnsolvableReason`].
pub fn check(state: &PieceState) -> Result<(), UnsolvableReason> {
    let corner_sum = state.corner_ori().iter().sum::<u8>() % CORNER_ORIENTATIONS;
    if corner_sum != 0 {
        return Err(UnsolvableReason::CornerOrientationSum { sum: corner_sum });
    }
    let edge_sum = state.edge_ori().iter().sum::<u8>() % EDGE_ORIENTATIONS;
    if edge_sum != 0 {
        return Err(UnsolvableReason::EdgeOrientationSum { sum: edge_sum });
    }
    if !permutation_is_even(state.corner_perm()) {
        return Err(UnsolvableReason::CornerPermutationParity);
    }
    if !permutation_is_even(state.edge_perm()) {
        return Err(UnsolvableReason::EdgePermutationParity);
    }
    Ok(())
}

/// [`check`] as a predicate.
#[must_use]
pub fn is_reachable(state: &PieceState) -> bool {
    check(state).is_ok()
}

/// A permutation of n elements with c cycles has parity n - c.
fn permutation_is_even(perm: &[u8]) -> bool {
    let mut seen = [false; EDGES];
    debug_assert!(perm.len() == CORNERS || perm.len() == EDGES);
    let mut transpositions = 0;
    for start in 0..perm.len() {
        if seen[start] {
            continue;
        }
        let mut len = 0;
        let mut i = start;
        while !seen[i] {
            seen[i] = true;
            i = perm[i] as usize;
            len += 1;
        }
        transpositions += len - 1;
    }
    transpositions % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scramble;

    #[test]
    fn solved_and_scrambled_states_are_reachable() {
        assert!(is_reachable(&PieceState::solved()));
        let (state, _) = scramble(50, 3);
        assert_eq!(check(&state), Ok(()));
    }

    #[test]
    fn twisted_corner_is_caught() {
        let solved = PieceState::solved();
        let mut corner_ori = *solved.corner_ori();
        corner_ori[0] = 1;
        let state = PieceState::try_new(
            *solved.corner_perm(),
            corner_ori,
            *solved.edge_perm(),
            *solved.edge_ori(),
        )
        .unwrap();
        assert_eq!(
            check(&state),
            Err(UnsolvableReason::CornerOrientationSum { sum: 1 })
        );
    }

    #[test]
    fn flipped_edge_is_caught() {
        let solved = PieceState::solved();
        let mut edge_ori = *solved.edge_ori();
        edge_ori[12] = 1;
        let state = PieceState::try_new(
            *solved.corner_perm(),
            *solved.corner_ori(),
            *solved.edge_perm(),
            edge_ori,
        )
        .unwrap();
        assert_eq!(
            check(&state),
            Err(UnsolvableReason::EdgeOrientationSum { sum: 1 })
        );
    }

    #[test]
    fn swapped_corners_are_caught() {
        let solved = PieceState::solved();
        let mut corner_perm = *solved.corner_perm();
        corner_perm.swap(0, 1);
        let state = PieceState::try_new(
            corner_perm,
            *solved.corner_ori(),
            *solved.edge_perm(),
            *solved.edge_ori(),
        )
        .unwrap();
        assert_eq!(check(&state), Err(UnsolvableReason::CornerPermutationParity));
    }

    #[test]
    fn swapped_edges_are_caught() {
        let solved = PieceState::solved();
        let mut edge_perm = *solved.edge_perm();
        edge_perm.swap(4, 20);
        let state = PieceState::try_new(
            *solved.corner_perm(),
            *solved.corner_ori(),
            edge_perm,
            *solved.edge_ori(),
        )
        .unwrap();
        assert_eq!(check(&state), Err(UnsolvableReason::EdgePermutationParity));
    }

    #[test]
    fn pairs_of_violations_report_the_first() {
        // Two compensating twists still sum to 2 mod 3.
        let solved = PieceState::solved();
        let mut corner_ori = *solved.corner_ori();
        corner_ori[0] = 1;
        corner_ori[1] = 1;
        let state = PieceState::try_new(
            *solved.corner_perm(),
            corner_ori,
            *solved.edge_perm(),
            *solved.edge_ori(),
        )
        .unwrap();
        assert_eq!(
            check(&state),
            Err(UnsolvableReason::CornerOrientationSum { sum: 2 })
        );
        // But 1 + 2 = 3 is fine.
        corner_ori[1] = 2;
        let state = PieceState::try_new(
            *solved.corner_perm(),
            corner_ori,
            *solved.edge_perm(),
            *solved.edge_ori(),
        )
        .unwrap();
        assert_eq!(check(&state), Ok(()));
    }
}
