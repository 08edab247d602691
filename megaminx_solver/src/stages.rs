//! Outer-layer stage plan, the early-stage search and late-stage
//! placement.
//!
//! The 40 pieces outside the D layer are placed one at a time in a
//! fixed order: U star edges, U corners, upper band edges, then the
//! two corner rows and edge rows working down toward D. The first ten
//! targets go through an iterative-deepening A* over all 48 moves
//! whose goal is the target piece plus everything placed before it.
//! Past that point locked pieces make the search explode, so every
//! later target is routed through the still-free D layer with the
//! slot-targeted placement words from [`crate::macros`]: a breadth
//! first search over the single piece's (slot, orientation) graph,
//! sixty states at most, whose every step is known to leave placed
//! pieces alone.

use crate::heuristic::PiecePositions;
use crate::macros;
use crate::solver::{SolverError, Watch};
use fxhash::FxHashMap;
use log::debug;
use megaminx_core::state::{CORNERS, EDGES};
use megaminx_core::{Face, Move, MoveEngine, PieceState};
use std::collections::VecDeque;
use std::sync::LazyLock;

/// Targets placed by direct search before placement words take over.
pub(crate) const SEARCHED_STAGES: usize = 10;

/// Transposition entries kept per stage search.
const MAX_TRANSPOSITIONS: usize = 1 << 21;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum StagePiece {
    Corner(u8),
    Edge(u8),
}

impl StagePiece {
    pub(crate) fn is_solved(self, state: &PieceState) -> bool {
        match self {
            StagePiece::Corner(piece) => state.corner_solved(piece),
            StagePiece::Edge(piece) => state.edge_solved(piece),
        }
    }
}

/// The 40 placement targets, in order.
pub(crate) fn plan() -> &'static [StagePiece] {
    static PLAN: LazyLock<Vec<StagePiece>> = LazyLock::new(build_plan);
    &PLAN
}

fn build_plan() -> Vec<StagePiece> {
    let star = [Face::F, Face::R, Face::BR, Face::BL, Face::L];
    // lower[i] sits between star[i] and star[i + 1].
    let lower = [Face::DFR, Face::DBR, Face::DB, Face::DBL, Face::DFL];
    let edge = |faces| StagePiece::Edge(MoveEngine::edge_slot(faces).unwrap());
    let corner = |faces| StagePiece::Corner(MoveEngine::corner_slot(faces).unwrap());

    let mut plan = Vec::with_capacity(40);
    for f in star {
        plan.push(edge([Face::U, f]));
    }
    for i in 0..5 {
        plan.push(corner([Face::U, star[i], star[(i + 1) % 5]]));
    }
    for i in 0..5 {
        plan.push(edge([star[i], star[(i + 1) % 5]]));
    }
    for i in 0..5 {
        plan.push(corner([star[i], star[(i + 1) % 5], lower[i]]));
    }
    for i in 0..5 {
        plan.push(edge([star[i], lower[i]]));
        plan.push(edge([star[(i + 1) % 5], lower[i]]));
    }
    for i in 0..5 {
        plan.push(corner([star[(i + 1) % 5], lower[i], lower[(i + 1) % 5]]));
    }
    for i in 0..5 {
        plan.push(edge([lower[i], lower[(i + 1) % 5]]));
    }
    plan
}

/// Place all 40 outer pieces, returning the moves performed.
pub(crate) fn solve_outer_layers(
    state: &PieceState,
    watch: &Watch,
) -> Result<Vec<Move>, SolverError> {
    let mut current = state.clone();
    let mut solution = Vec::new();
    let mut tracked: Vec<StagePiece> = Vec::with_capacity(40);
    for (n, &target) in plan().iter().enumerate() {
        tracked.push(target);
        let moves = if n < SEARCHED_STAGES {
            solve_stage(&current, &tracked, watch)?
        } else if let Some(moves) = place_piece(&current, target, watch)? {
            moves
        } else {
            // Catalog gap; the search still knows how.
            solve_stage(&current, &tracked, watch)?
        };
        debug!("stage {n}: {target:?} placed in {} moves", moves.len());
        current = current.apply_all(&moves);
        debug_assert!(tracked.iter().all(|piece| piece.is_solved(&current)));
        solution.extend(moves);
    }
    Ok(solution)
}

/// How each word in the alphabet relocates a single tracked piece:
/// `to[slot]` is the slot and orientation delta for the occupant of
/// `slot`.
fn project(effect: &PieceState, target: StagePiece) -> Vec<(u8, u8)> {
    match target {
        StagePiece::Corner(_) => {
            let mut to = vec![(0u8, 0u8); CORNERS];
            for dst in 0..CORNERS {
                let src = effect.corner_perm()[dst] as usize;
                to[src] = (dst as u8, effect.corner_ori()[dst]);
            }
            to
        }
        StagePiece::Edge(_) => {
            let mut to = vec![(0u8, 0u8); EDGES];
            for dst in 0..EDGES {
                let src = effect.edge_perm()[dst] as usize;
                to[src] = (dst as u8, effect.edge_ori()[dst]);
            }
            to
        }
    }
}

/// Route one piece home through the D layer using placement words.
///
/// Every alphabet entry moves nothing outside the layer except the
/// target's home slot or the piece's current slot, both unsolved, so
/// the placement can never disturb earlier stages. `None` when the
/// catalog has no path, which sends the caller back to the search.
fn place_piece(
    state: &PieceState,
    target: StagePiece,
    watch: &Watch,
) -> Result<Option<Vec<Move>>, SolverError> {
    let set = macros::macros();
    let engine = MoveEngine::global();
    let (piece, orientations) = match target {
        StagePiece::Corner(c) => (c, 3u8),
        StagePiece::Edge(e) => (e, 2u8),
    };
    let (perm, ori, d_ring): (&[u8], &[u8], &[u8; 5]) = match target {
        StagePiece::Corner(_) => (state.corner_perm(), state.corner_ori(), set.d_corner_slots()),
        StagePiece::Edge(_) => (state.edge_perm(), state.edge_ori(), set.d_edge_slots()),
    };
    let placements = |slot: u8| match target {
        StagePiece::Corner(_) => set.corner_placements(slot),
        StagePiece::Edge(_) => set.edge_placements(slot),
    };

    // The piece's id doubles as its home slot.
    let start_slot = perm.iter().position(|&p| p == piece).unwrap() as u8;
    let start_ori = ori[start_slot as usize];
    if start_slot == piece && start_ori == 0 {
        return Ok(Some(Vec::new()));
    }

    let mut alphabet: Vec<(Vec<Move>, Vec<(u8, u8)>)> = Vec::new();
    for k in 1..=4u8 {
        let mv = Move::new(Face::D, k).unwrap();
        let effect = PieceState::solved().compose(engine.transformation(mv));
        alphabet.push((vec![mv], project(&effect, target)));
    }
    for m in placements(piece) {
        alphabet.push((m.moves.clone(), project(&m.effect, target)));
    }
    // Words for the current slot pull the piece into the layer first.
    if start_slot != piece && !d_ring.contains(&start_slot) {
        for m in placements(start_slot) {
            alphabet.push((m.moves.clone(), project(&m.effect, target)));
        }
    }

    let index = |slot: u8, o: u8| slot as usize * orientations as usize + o as usize;
    let mut from = vec![(usize::MAX, usize::MAX); perm.len() * orientations as usize];
    let start = index(start_slot, start_ori);
    from[start] = (start, usize::MAX);
    let mut queue = VecDeque::from([(start_slot, start_ori)]);
    while let Some((slot, o)) = queue.pop_front() {
        watch.check()?;
        for (via, (_, to)) in alphabet.iter().enumerate() {
            let (next_slot, delta) = to[slot as usize];
            let next_ori = (o + delta) % orientations;
            let next = index(next_slot, next_ori);
            if from[next].0 != usize::MAX {
                continue;
            }
            from[next] = (index(slot, o), via);
            if next_slot == piece && next_ori == 0 {
                let mut steps = Vec::new();
                let mut at = next;
                while at != start {
                    let (prev, via) = from[at];
                    steps.push(via);
                    at = prev;
                }
                let mut moves = Vec::new();
                for &via in steps.iter().rev() {
                    moves.extend_from_slice(&alphabet[via].0);
                }
                return Ok(Some(moves));
            }
            queue.push_back((next_slot, next_ori));
        }
    }
    Ok(None)
}

fn lower_bound(state: &PieceState, tracked: &[StagePiece]) -> u8 {
    let pos = PiecePositions::of(state);
    tracked
        .iter()
        .map(|piece| match piece {
            StagePiece::Corner(c) => pos.corner_distance(state, *c),
            StagePiece::Edge(e) => pos.edge_distance(state, *e),
        })
        .max()
        .unwrap_or(0)
}

struct StageSearch<'a> {
    engine: &'static MoveEngine,
    tracked: &'a [StagePiece],
    watch: &'a Watch,
    // State -> remaining depth already searched without success.
    transpositions: FxHashMap<PieceState, u8>,
    path: Vec<Move>,
}

/// Find a move sequence after which every tracked piece is solved.
pub(crate) fn solve_stage(
    state: &PieceState,
    tracked: &[StagePiece],
    watch: &Watch,
) -> Result<Vec<Move>, SolverError> {
    let mut search = StageSearch {
        engine: MoveEngine::global(),
        tracked,
        watch,
        transpositions: FxHashMap::default(),
        path: Vec::new(),
    };
    let mut bound = lower_bound(state, tracked);
    loop {
        watch.check()?;
        if search.dfs(state, bound, None)? {
            return Ok(search.path);
        }
        bound += 1;
    }
}

impl StageSearch<'_> {
    fn dfs(
        &mut self,
        state: &PieceState,
        remaining: u8,
        last: Option<Face>,
    ) -> Result<bool, SolverError> {
        let bound = lower_bound(state, self.tracked);
        if bound == 0 {
            return Ok(true);
        }
        if bound > remaining {
            return Ok(false);
        }
        self.watch.check()?;
        if let Some(&searched) = self.transpositions.get(state) {
            if searched >= remaining {
                return Ok(false);
            }
        }
        for mv in Move::all() {
            if let Some(last) = last {
                // Same-face merges are redundant, and commuting pairs
                // are explored in one canonical order only.
                if mv.face() == last || (mv.face().commutes_with(last) && mv.face() < last) {
                    continue;
                }
            }
            let next = self.engine.apply(state, mv);
            self.path.push(mv);
            if self.dfs(&next, remaining - 1, Some(mv.face()))? {
                return Ok(true);
            }
            self.path.pop();
        }
        if self.transpositions.len() < MAX_TRANSPOSITIONS {
            self.transpositions.insert(state.clone(), remaining);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megaminx_core::scramble;

    #[test]
    fn plan_covers_every_outer_piece_once() {
        let plan = plan();
        assert_eq!(plan.len(), 40);
        let mut corners = [false; CORNERS];
        let mut edges = [false; EDGES];
        for &piece in plan {
            match piece {
                StagePiece::Corner(c) => {
                    assert!(!corners[c as usize]);
                    corners[c as usize] = true;
                }
                StagePiece::Edge(e) => {
                    assert!(!edges[e as usize]);
                    edges[e as usize] = true;
                }
            }
        }
        // The 5 D corners and 5 D edges are left for the macro phase.
        let d_corners = MoveEngine::face_corners(Face::D);
        let d_edges = MoveEngine::face_edges(Face::D);
        for c in 0..CORNERS as u8 {
            assert_eq!(corners[c as usize], !d_corners.contains(&c));
        }
        for e in 0..EDGES as u8 {
            assert_eq!(edges[e as usize], !d_edges.contains(&e));
        }
    }

    #[test]
    fn stage_search_places_a_piece_without_disturbing_earlier_ones() {
        let (state, _) = scramble(15, 8);
        let watch = Watch::unlimited();
        let tracked: Vec<StagePiece> = plan()[..3].to_vec();
        let moves = solve_stage(&state, &tracked, &watch).unwrap();
        let after = state.apply_all(&moves);
        for piece in &tracked {
            assert!(piece.is_solved(&after));
        }
    }

    #[test]
    fn late_pieces_place_without_searching() {
        let (state, _) = scramble(25, 3);
        let watch = Watch::unlimited();
        let mut current = state;
        let mut tracked: Vec<StagePiece> = Vec::new();
        for &target in &plan()[..SEARCHED_STAGES] {
            tracked.push(target);
            let moves = solve_stage(&current, &tracked, &watch).unwrap();
            current = current.apply_all(&moves);
        }
        for &target in &plan()[SEARCHED_STAGES..] {
            let moves = place_piece(&current, target, &watch)
                .unwrap()
                .expect("every late slot has a placement path");
            current = current.apply_all(&moves);
            tracked.push(target);
            for piece in &tracked {
                assert!(piece.is_solved(&current), "{piece:?} disturbed");
            }
        }
    }

    #[test]
    fn outer_layers_solve_completely() {
        let (state, _) = scramble(40, 21);
        let watch = Watch::unlimited();
        let moves = solve_outer_layers(&state, &watch).unwrap();
        let after = state.apply_all(&moves);
        for piece in plan() {
            assert!(piece.is_solved(&after), "{piece:?} left unsolved");
        }
    }
}
