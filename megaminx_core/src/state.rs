//! The canonical puzzle state representation.
//!
//! A Megaminx has 12 fixed centers, 20 corner pieces (3 orientations
//! each) and 30 edge pieces (2 orientations each). A [`PieceState`]
//! stores, for every slot, which piece occupies it and how that piece
//! is rotated relative to the slot. The same structure doubles as a
//! *transformation*: every move is itself a `PieceState` delta and is
//! applied by group composition, so move tables, scrambles and solver
//! macros all speak one language.

use thiserror::Error;

/// Number of corner pieces/slots.
pub const CORNERS: usize = 20;
/// Number of edge pieces/slots.
pub const EDGES: usize = 30;
/// Rotational states of a corner piece (it touches 3 faces).
pub const CORNER_ORIENTATIONS: u8 = 3;
/// Rotational states of an edge piece (flipped or not).
pub const EDGE_ORIENTATIONS: u8 = 2;

/// Complete configuration of the puzzle, minus the fixed centers.
///
/// Slot-indexed: `corner_perm[s]` is the piece sitting in corner slot
/// `s` and `corner_ori[s]` its orientation there. Piece `p` is home in
/// slot `p` with orientation 0.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PieceState {
    corner_perm: [u8; CORNERS],
    corner_ori: [u8; CORNERS],
    edge_perm: [u8; EDGES],
    edge_ori: [u8; EDGES],
}

/// Structurally malformed state data, rejected before a `PieceState`
/// can exist. Reachability (parity/orientation sums) is a separate,
/// weaker condition checked by [`crate::validator`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateDataError {
    #[error("corner permutation is not a permutation of 0..20")]
    CornerPermutation,
    #[error("edge permutation is not a permutation of 0..30")]
    EdgePermutation,
    #[error("corner orientation {value} at slot {slot} out of range 0..3")]
    CornerOrientationRange { slot: usize, value: u8 },
    #[error("edge orientation {value} at slot {slot} out of range 0..2")]
    EdgeOrientationRange { slot: usize, value: u8 },
}

impl PieceState {
    /// The solved state: identity permutations, zero orientations.
    #[must_use]
    pub fn solved() -> Self {
        let mut corner_perm = [0; CORNERS];
        for (i, p) in corner_perm.iter_mut().enumerate() {
            *p = i as u8;
        }
        let mut edge_perm = [0; EDGES];
        for (i, p) in edge_perm.iter_mut().enumerate() {
            *p = i as u8;
        }
        PieceState {
            corner_perm,
            corner_ori: [0; CORNERS],
            edge_perm,
            edge_ori: [0; EDGES],
        }
    }

    /// Build a state from raw arrays, rejecting structurally invalid
    /// data. External suppliers (facelet reconstruction, tests) come
    /// through here; move application never needs to.
    ///
    /// # Errors
    ///
    /// See [`StateDataError`].
    pub fn try_new(
        corner_perm: [u8; CORNERS],
        corner_ori: [u8; CORNERS],
        edge_perm: [u8; EDGES],
        edge_ori: [u8; EDGES],
    ) -> Result<Self, StateDataError> {
        let mut seen = [false; CORNERS];
        for &p in &corner_perm {
            match seen.get_mut(p as usize) {
                Some(s) if !*s => *s = true,
                _ => return Err(StateDataError::CornerPermutation),
            }
        }
        let mut seen = [false; EDGES];
        for &p in &edge_perm {
            match seen.get_mut(p as usize) {
                Some(s) if !*s => *s = true,
                _ => return Err(StateDataError::EdgePermutation),
            }
        }
        for (slot, &value) in corner_ori.iter().enumerate() {
            if value >= CORNER_ORIENTATIONS {
                return Err(StateDataError::CornerOrientationRange { slot, value });
            }
        }
        for (slot, &value) in edge_ori.iter().enumerate() {
            if value >= EDGE_ORIENTATIONS {
                return Err(StateDataError::EdgeOrientationRange { slot, value });
            }
        }
        Ok(PieceState {
            corner_perm,
            corner_ori,
            edge_perm,
            edge_ori,
        })
    }

    pub(crate) fn from_arrays_unchecked(
        corner_perm: [u8; CORNERS],
        corner_ori: [u8; CORNERS],
        edge_perm: [u8; EDGES],
        edge_ori: [u8; EDGES],
    ) -> Self {
        PieceState {
            corner_perm,
            corner_ori,
            edge_perm,
            edge_ori,
        }
    }

    #[must_use]
    pub fn corner_perm(&self) -> &[u8; CORNERS] {
        &self.corner_perm
    }

    #[must_use]
    pub fn corner_ori(&self) -> &[u8; CORNERS] {
        &self.corner_ori
    }

    #[must_use]
    pub fn edge_perm(&self) -> &[u8; EDGES] {
        &self.edge_perm
    }

    #[must_use]
    pub fn edge_ori(&self) -> &[u8; EDGES] {
        &self.edge_ori
    }

    /// Every piece in its home slot with zero orientation.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.corner_perm.iter().enumerate().all(|(i, &p)| p == i as u8)
            && self.edge_perm.iter().enumerate().all(|(i, &p)| p == i as u8)
            && self.corner_ori.iter().all(|&o| o == 0)
            && self.edge_ori.iter().all(|&o| o == 0)
    }

    /// Whether corner piece `piece` sits in its home slot, unrotated.
    #[must_use]
    pub fn corner_solved(&self, piece: u8) -> bool {
        self.corner_perm[piece as usize] == piece && self.corner_ori[piece as usize] == 0
    }

    /// Whether edge piece `piece` sits in its home slot, unflipped.
    #[must_use]
    pub fn edge_solved(&self, piece: u8) -> bool {
        self.edge_perm[piece as usize] == piece && self.edge_ori[piece as usize] == 0
    }

    /// Group composition: the state reached by performing `self` and
    /// then the transformation `t`.
    #[must_use]
    pub fn compose(&self, t: &PieceState) -> PieceState {
        let mut out = PieceState::solved();
        for i in 0..CORNERS {
            let from = t.corner_perm[i] as usize;
            out.corner_perm[i] = self.corner_perm[from];
            out.corner_ori[i] = (self.corner_ori[from] + t.corner_ori[i]) % CORNER_ORIENTATIONS;
        }
        for i in 0..EDGES {
            let from = t.edge_perm[i] as usize;
            out.edge_perm[i] = self.edge_perm[from];
            out.edge_ori[i] = (self.edge_ori[from] + t.edge_ori[i]) % EDGE_ORIENTATIONS;
        }
        out
    }

    /// The inverse transformation. `s.compose(&s.inverse())` is solved
    /// for every state `s`.
    #[must_use]
    pub fn inverse(&self) -> PieceState {
        let mut out = PieceState::solved();
        for i in 0..CORNERS {
            let j = self.corner_perm[i] as usize;
            out.corner_perm[j] = i as u8;
            out.corner_ori[j] = (CORNER_ORIENTATIONS - self.corner_ori[i]) % CORNER_ORIENTATIONS;
        }
        for i in 0..EDGES {
            let j = self.edge_perm[i] as usize;
            out.edge_perm[j] = i as u8;
            out.edge_ori[j] = (EDGE_ORIENTATIONS - self.edge_ori[i]) % EDGE_ORIENTATIONS;
        }
        out
    }
}

impl std::fmt::Debug for PieceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PieceState")
            .field("corner_perm", &self.corner_perm)
            .field("corner_ori", &self.corner_ori)
            .field("edge_perm", &self.edge_perm)
            .field("edge_ori", &self.edge_ori)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solved_is_solved() {
        assert!(PieceState::solved().is_solved());
    }

    #[test]
    fn compose_with_identity() {
        let solved = PieceState::solved();
        assert_eq!(solved.compose(&solved), solved);
    }

    #[test]
    fn try_new_rejects_duplicate_pieces() {
        let mut corner_perm = *PieceState::solved().corner_perm();
        corner_perm[3] = corner_perm[4];
        let err = PieceState::try_new(corner_perm, [0; CORNERS], *PieceState::solved().edge_perm(), [0; EDGES])
            .unwrap_err();
        assert_eq!(err, StateDataError::CornerPermutation);
    }

    #[test]
    fn try_new_rejects_orientation_out_of_range() {
        let solved = PieceState::solved();
        let mut edge_ori = [0; EDGES];
        edge_ori[7] = 2;
        let err = PieceState::try_new(*solved.corner_perm(), [0; CORNERS], *solved.edge_perm(), edge_ori)
            .unwrap_err();
        assert_eq!(err, StateDataError::EdgeOrientationRange { slot: 7, value: 2 });
    }
}
