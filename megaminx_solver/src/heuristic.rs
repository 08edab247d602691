//! Per-piece distance tables.
//!
//! For every piece, the exact number of face turns needed to bring it
//! from any (slot, orientation) to its home slot, ignoring all other
//! pieces. Computed once by breadth-first search over the 60 corner
//! and 60 edge piece states. The stage searches take the maximum over
//! their tracked pieces, which is an admissible lower bound because
//! one turn advances each piece by at most one table step.

use megaminx_core::state::{CORNERS, EDGES};
use megaminx_core::{Move, MoveEngine, PieceState};
use std::collections::VecDeque;
use std::sync::LazyLock;

const CORNER_STATES: usize = CORNERS * 3;
const EDGE_STATES: usize = EDGES * 2;

pub(crate) struct DistanceTables {
    corner: [[u8; CORNER_STATES]; CORNERS],
    edge: [[u8; EDGE_STATES]; EDGES],
}

impl DistanceTables {
    /// Turns to bring corner `piece`, currently in `slot` with
    /// orientation `ori`, home.
    pub(crate) fn corner(&self, piece: u8, slot: u8, ori: u8) -> u8 {
        self.corner[piece as usize][slot as usize * 3 + ori as usize]
    }

    pub(crate) fn edge(&self, piece: u8, slot: u8, ori: u8) -> u8 {
        self.edge[piece as usize][slot as usize * 2 + ori as usize]
    }
}

pub(crate) fn distances() -> &'static DistanceTables {
    static TABLES: LazyLock<DistanceTables> = LazyLock::new(build);
    &TABLES
}

/// How each of the 48 moves relocates a single piece: the occupant of
/// `slot` moves to the slot whose transformation source is `slot`.
struct PieceMoves {
    corner_to: Vec<[(u8, u8); CORNERS]>,
    edge_to: Vec<[(u8, u8); EDGES]>,
}

fn piece_moves() -> PieceMoves {
    let engine = MoveEngine::global();
    let mut corner_to = Vec::new();
    let mut edge_to = Vec::new();
    for mv in Move::all() {
        let t = engine.transformation(mv);
        let mut corners = [(0u8, 0u8); CORNERS];
        for dst in 0..CORNERS {
            let src = t.corner_perm()[dst] as usize;
            corners[src] = (dst as u8, t.corner_ori()[dst]);
        }
        let mut edges = [(0u8, 0u8); EDGES];
        for dst in 0..EDGES {
            let src = t.edge_perm()[dst] as usize;
            edges[src] = (dst as u8, t.edge_ori()[dst]);
        }
        corner_to.push(corners);
        edge_to.push(edges);
    }
    PieceMoves { corner_to, edge_to }
}

fn build() -> DistanceTables {
    let moves = piece_moves();
    let mut tables = DistanceTables {
        corner: [[u8::MAX; CORNER_STATES]; CORNERS],
        edge: [[u8::MAX; EDGE_STATES]; EDGES],
    };
    // The move set is closed under inverses, so distances from home
    // equal distances to home.
    for piece in 0..CORNERS {
        let table = &mut tables.corner[piece];
        let home = piece * 3;
        table[home] = 0;
        let mut queue = VecDeque::from([(piece as u8, 0u8)]);
        while let Some((slot, ori)) = queue.pop_front() {
            let dist = table[slot as usize * 3 + ori as usize];
            for step in &moves.corner_to {
                let (next_slot, delta) = step[slot as usize];
                let next_ori = (ori + delta) % 3;
                let idx = next_slot as usize * 3 + next_ori as usize;
                if table[idx] == u8::MAX {
                    table[idx] = dist + 1;
                    queue.push_back((next_slot, next_ori));
                }
            }
        }
    }
    for piece in 0..EDGES {
        let table = &mut tables.edge[piece];
        table[piece * 2] = 0;
        let mut queue = VecDeque::from([(piece as u8, 0u8)]);
        while let Some((slot, ori)) = queue.pop_front() {
            let dist = table[slot as usize * 2 + ori as usize];
            for step in &moves.edge_to {
                let (next_slot, delta) = step[slot as usize];
                let next_ori = (ori + delta) % 2;
                let idx = next_slot as usize * 2 + next_ori as usize;
                if table[idx] == u8::MAX {
                    table[idx] = dist + 1;
                    queue.push_back((next_slot, next_ori));
                }
            }
        }
    }
    tables
}

/// Slot of every piece in `state`, the inverse of the stored
/// slot-to-piece permutations. Built once per heuristic evaluation so
/// piece lookups are O(1).
pub(crate) struct PiecePositions {
    corner_slot: [u8; CORNERS],
    edge_slot: [u8; EDGES],
}

impl PiecePositions {
    pub(crate) fn of(state: &PieceState) -> Self {
        let mut corner_slot = [0u8; CORNERS];
        for (slot, &piece) in state.corner_perm().iter().enumerate() {
            corner_slot[piece as usize] = slot as u8;
        }
        let mut edge_slot = [0u8; EDGES];
        for (slot, &piece) in state.edge_perm().iter().enumerate() {
            edge_slot[piece as usize] = slot as u8;
        }
        PiecePositions { corner_slot, edge_slot }
    }

    pub(crate) fn corner_distance(&self, state: &PieceState, piece: u8) -> u8 {
        let slot = self.corner_slot[piece as usize];
        distances().corner(piece, slot, state.corner_ori()[slot as usize])
    }

    pub(crate) fn edge_distance(&self, state: &PieceState, piece: u8) -> u8 {
        let slot = self.edge_slot[piece as usize];
        distances().edge(piece, slot, state.edge_ori()[slot as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megaminx_core::Face;

    #[test]
    fn every_piece_state_is_within_a_few_turns_of_home() {
        let tables = distances();
        for piece in 0..CORNERS {
            for idx in 0..CORNER_STATES {
                let d = tables.corner[piece][idx];
                assert!(d != u8::MAX, "unreachable corner state {piece}/{idx}");
                assert!(d <= 8);
            }
        }
        for piece in 0..EDGES {
            for idx in 0..EDGE_STATES {
                let d = tables.edge[piece][idx];
                assert!(d != u8::MAX, "unreachable edge state {piece}/{idx}");
                assert!(d <= 8);
            }
        }
    }

    #[test]
    fn solved_pieces_have_distance_zero() {
        let solved = PieceState::solved();
        let pos = PiecePositions::of(&solved);
        for piece in 0..CORNERS as u8 {
            assert_eq!(pos.corner_distance(&solved, piece), 0);
        }
        for piece in 0..EDGES as u8 {
            assert_eq!(pos.edge_distance(&solved, piece), 0);
        }
    }

    #[test]
    fn one_move_displaces_by_exactly_one() {
        let state = PieceState::solved().apply(Move::new(Face::U, 2).unwrap());
        let pos = PiecePositions::of(&state);
        let mut moved = 0;
        for piece in 0..CORNERS as u8 {
            let d = pos.corner_distance(&state, piece);
            assert!(d <= 1);
            moved += u32::from(d);
        }
        assert_eq!(moved, 5);
    }
}
