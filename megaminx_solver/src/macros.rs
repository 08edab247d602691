//! Commutator macro discovery and the final-layer searches.
//!
//! One enumeration at startup walks conjugated commutators
//! `v (s q s') D^k (s q' s') D^-k v'` with short setup words and sorts
//! the survivors by where their composed effect lives. An effect
//! confined to the D layer is a *layer macro*: those split into edge
//! macros (may shuffle D corners as a side effect) and corner macros
//! (leave every edge fixed), and finish the layer in two breadth-first
//! searches. An effect touching the D layer plus exactly one outer
//! slot is a *placement macro* for that slot: the stage phase uses
//! those to route late pieces through the still-free layer without
//! disturbing anything already placed.

use crate::solver::{SolverError, Watch};
use fxhash::{FxHashMap, FxHashSet};
use log::info;
use megaminx_core::state::{CORNERS, EDGES};
use megaminx_core::{Face, Move, MoveEngine, PieceState};
use std::collections::hash_map::Entry;
use std::sync::LazyLock;

/// Keep the shortest few hundred layer macros of each kind; more only
/// slows the searches without adding reachable states.
const MAX_MACROS: usize = 600;

/// Placement words kept per outer slot, after closing under D.
const MAX_PLACEMENTS: usize = 150;

/// Cap on distinct effects held during enumeration.
const MAX_DISCOVERED: usize = 400_000;

pub(crate) struct Macro {
    pub moves: Vec<Move>,
    pub effect: PieceState,
}

pub(crate) struct MacroSet {
    pub edge: Vec<Macro>,
    pub corner: Vec<Macro>,
    insert_edge: FxHashMap<u8, Vec<Macro>>,
    insert_corner: FxHashMap<u8, Vec<Macro>>,
    d_edge_slots: [u8; 5],
    d_corner_slots: [u8; 5],
}

pub(crate) fn macros() -> &'static MacroSet {
    static MACROS: LazyLock<MacroSet> = LazyLock::new(discover);
    &MACROS
}

/// Where a word's net effect lives, relative to the D layer.
enum Outside {
    /// Nothing outside the layer moves.
    Clean,
    /// Exactly one outer corner slot is disturbed.
    Corner(u8),
    /// Exactly one outer edge slot is disturbed.
    Edge(u8),
    Spread(usize),
}

impl MacroSet {
    fn outside(&self, effect: &PieceState) -> Outside {
        let mut count = 0usize;
        let mut single = Outside::Clean;
        for slot in 0..CORNERS as u8 {
            if !self.d_corner_slots.contains(&slot)
                && (effect.corner_perm()[slot as usize] != slot
                    || effect.corner_ori()[slot as usize] != 0)
            {
                count += 1;
                single = Outside::Corner(slot);
            }
        }
        for slot in 0..EDGES as u8 {
            if !self.d_edge_slots.contains(&slot)
                && (effect.edge_perm()[slot as usize] != slot
                    || effect.edge_ori()[slot as usize] != 0)
            {
                count += 1;
                single = Outside::Edge(slot);
            }
        }
        match count {
            0 => Outside::Clean,
            1 => single,
            n => Outside::Spread(n),
        }
    }

    /// True if `effect` moves nothing outside the D layer.
    #[cfg(test)]
    fn is_layer_local(&self, effect: &PieceState) -> bool {
        matches!(self.outside(effect), Outside::Clean)
    }

    fn touches_edges(&self, effect: &PieceState) -> bool {
        self.d_edge_slots.iter().any(|&slot| {
            effect.edge_perm()[slot as usize] != slot || effect.edge_ori()[slot as usize] != 0
        })
    }

    fn touches_corners(&self, effect: &PieceState) -> bool {
        self.d_corner_slots.iter().any(|&slot| {
            effect.corner_perm()[slot as usize] != slot || effect.corner_ori()[slot as usize] != 0
        })
    }

    pub(crate) fn edges_solved(&self, state: &PieceState) -> bool {
        self.d_edge_slots
            .iter()
            .all(|&slot| state.edge_solved(slot))
    }

    pub(crate) fn corners_solved(&self, state: &PieceState) -> bool {
        self.d_corner_slots
            .iter()
            .all(|&slot| state.corner_solved(slot))
    }

    /// Placement words for an outer edge slot.
    pub(crate) fn edge_placements(&self, slot: u8) -> &[Macro] {
        self.insert_edge.get(&slot).map_or(&[], Vec::as_slice)
    }

    /// Placement words for an outer corner slot.
    pub(crate) fn corner_placements(&self, slot: u8) -> &[Macro] {
        self.insert_corner.get(&slot).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn d_edge_slots(&self) -> &[u8; 5] {
        &self.d_edge_slots
    }

    pub(crate) fn d_corner_slots(&self) -> &[u8; 5] {
        &self.d_corner_slots
    }

    fn edge_key(&self, state: &PieceState) -> [u8; 10] {
        std::array::from_fn(|i| {
            let slot = self.d_edge_slots[i / 2] as usize;
            if i % 2 == 0 {
                state.edge_perm()[slot]
            } else {
                state.edge_ori()[slot]
            }
        })
    }

    fn corner_key(&self, state: &PieceState) -> [u8; 10] {
        std::array::from_fn(|i| {
            let slot = self.d_corner_slots[i / 2] as usize;
            if i % 2 == 0 {
                state.corner_perm()[slot]
            } else {
                state.corner_ori()[slot]
            }
        })
    }
}

#[cfg(test)]
fn word_effect(engine: &MoveEngine, moves: &[Move]) -> PieceState {
    moves.iter().fold(PieceState::solved(), |acc, &mv| {
        acc.compose(engine.transformation(mv))
    })
}

fn record(found: &mut FxHashMap<PieceState, Vec<Move>>, effect: PieceState, moves: Vec<Move>) {
    if found.len() >= MAX_DISCOVERED && !found.contains_key(&effect) {
        return;
    }
    match found.entry(effect) {
        Entry::Occupied(mut entry) => {
            if moves.len() < entry.get().len() {
                entry.insert(moves);
            }
        }
        Entry::Vacant(entry) => {
            entry.insert(moves);
        }
    }
}

fn discover() -> MacroSet {
    info!(crate::start!("discovering solver macros"));
    let engine = MoveEngine::global();
    let mut set = MacroSet {
        edge: Vec::new(),
        corner: Vec::new(),
        insert_edge: FxHashMap::default(),
        insert_corner: FxHashMap::default(),
        d_edge_slots: MoveEngine::face_edges(Face::D),
        d_corner_slots: MoveEngine::face_corners(Face::D),
    };
    let solved = PieceState::solved();
    let all_moves: Vec<Move> = Move::all().collect();

    // Setup words of length 0..=2 over every move.
    let mut setups: Vec<(Vec<Move>, PieceState)> = vec![(Vec::new(), solved.clone())];
    for &m1 in &all_moves {
        let e1 = solved.compose(engine.transformation(m1));
        for &m2 in &all_moves {
            if m2.face() != m1.face() {
                setups.push((vec![m1, m2], e1.compose(engine.transformation(m2))));
            }
        }
        setups.push((vec![m1], e1));
    }

    let mut found: FxHashMap<PieceState, Vec<Move>> = FxHashMap::default();
    let mut seen_cores: FxHashSet<PieceState> = FxHashSet::default();
    for (smoves, seff) in &setups {
        let sinv_eff = seff.inverse();
        let sinv_moves = MoveEngine::inverse_sequence(smoves);
        for &q in &all_moves {
            if q.face() == Face::D || smoves.last().is_some_and(|m| m.face() == q.face()) {
                continue;
            }
            let a_eff = seff
                .compose(engine.transformation(q))
                .compose(&sinv_eff);
            if !seen_cores.insert(a_eff.clone()) {
                continue;
            }
            let a_inv = a_eff.inverse();
            let a_word = || {
                let mut w = smoves.clone();
                w.push(q);
                w.extend_from_slice(&sinv_moves);
                w
            };
            for k in 1..=4u8 {
                let d = Move::new(Face::D, k).unwrap();
                let m = a_eff
                    .compose(engine.transformation(d))
                    .compose(&a_inv)
                    .compose(engine.transformation(d.inverse()));
                if m == solved {
                    continue;
                }
                let commutator_word = || {
                    let a = a_word();
                    let mut w = a.clone();
                    w.push(d);
                    w.extend(MoveEngine::inverse_sequence(&a));
                    w.push(d.inverse());
                    w
                };
                let near_miss = match set.outside(&m) {
                    Outside::Clean => {
                        record(&mut found, m, commutator_word());
                        continue;
                    }
                    Outside::Corner(_) | Outside::Edge(_) => {
                        record(&mut found, m.clone(), commutator_word());
                        true
                    }
                    Outside::Spread(n) => n == 2,
                };
                if !near_miss {
                    continue;
                }
                // One more conjugation can tuck a stray slot into the
                // layer, or move a single stray to another slot.
                for &v in &all_moves {
                    let conj = engine
                        .transformation(v)
                        .compose(&m)
                        .compose(engine.transformation(v.inverse()));
                    if conj == solved || matches!(set.outside(&conj), Outside::Spread(_)) {
                        continue;
                    }
                    let mut w = vec![v];
                    w.extend(commutator_word());
                    w.push(v.inverse());
                    record(&mut found, conj, w);
                }
            }
        }
    }

    // Sort each harvested word by where its effect lives.
    let mut edge: Vec<Macro> = Vec::new();
    let mut corner: Vec<Macro> = Vec::new();
    let mut insert_edge: FxHashMap<u8, Vec<Macro>> = FxHashMap::default();
    let mut insert_corner: FxHashMap<u8, Vec<Macro>> = FxHashMap::default();
    for (effect, moves) in found {
        match set.outside(&effect) {
            Outside::Clean => {
                if set.touches_edges(&effect) {
                    edge.push(Macro { moves, effect });
                } else if set.touches_corners(&effect) {
                    corner.push(Macro { moves, effect });
                }
            }
            Outside::Edge(slot) => insert_edge
                .entry(slot)
                .or_default()
                .push(Macro { moves, effect }),
            Outside::Corner(slot) => insert_corner
                .entry(slot)
                .or_default()
                .push(Macro { moves, effect }),
            Outside::Spread(_) => {}
        }
    }

    // Close each list under D conjugation so every word is available
    // at all five positions around the layer, then keep the shortest.
    // Conjugating by D fixes every outer slot, so a placement word
    // stays bound to its slot.
    let close_under_d = |macros: &mut Vec<Macro>, cap: usize| {
        macros.sort_by_key(|m| m.moves.len());
        macros.truncate(cap);
        let mut seen: FxHashSet<PieceState> = macros.iter().map(|m| m.effect.clone()).collect();
        let base_len = macros.len();
        for j in 1..=4u8 {
            let d = Move::new(Face::D, j).unwrap();
            let dj = engine.transformation(d);
            let dj_inv = engine.transformation(d.inverse());
            for i in 0..base_len {
                let conj = dj.compose(&macros[i].effect).compose(dj_inv);
                if !seen.insert(conj.clone()) {
                    continue;
                }
                let mut w = vec![d];
                w.extend_from_slice(&macros[i].moves);
                w.push(d.inverse());
                macros.push(Macro {
                    moves: w,
                    effect: conj,
                });
            }
        }
        macros.sort_by_key(|m| m.moves.len());
        macros.truncate(cap);
    };
    close_under_d(&mut edge, MAX_MACROS);
    close_under_d(&mut corner, MAX_MACROS);
    for list in insert_edge.values_mut().chain(insert_corner.values_mut()) {
        close_under_d(list, MAX_PLACEMENTS);
    }

    info!(
        crate::success!("kept {} edge and {} corner layer macros, {} placement catalogs"),
        edge.len(),
        corner.len(),
        insert_edge.len() + insert_corner.len()
    );
    set.edge = edge;
    set.corner = corner;
    set.insert_edge = insert_edge;
    set.insert_corner = insert_corner;
    set
}

enum Target {
    Edges,
    Corners,
}

/// Solve the five D edges. D corners may be shuffled in the process.
pub(crate) fn solve_d_edges(
    state: &PieceState,
    watch: &Watch,
) -> Result<Vec<Move>, SolverError> {
    let set = macros();
    let engine = MoveEngine::global();
    let mut alphabet: Vec<Macro> = (1..=4u8)
        .map(|k| {
            let mv = Move::new(Face::D, k).unwrap();
            Macro {
                moves: vec![mv],
                effect: PieceState::solved().compose(engine.transformation(mv)),
            }
        })
        .collect();
    alphabet.extend(set.edge.iter().map(|m| Macro {
        moves: m.moves.clone(),
        effect: m.effect.clone(),
    }));
    bfs(state, &alphabet, Target::Edges, watch)
}

/// Solve the five D corners without touching any edge.
pub(crate) fn solve_d_corners(
    state: &PieceState,
    watch: &Watch,
) -> Result<Vec<Move>, SolverError> {
    bfs(state, &macros().corner, Target::Corners, watch)
}

struct Node {
    state: PieceState,
    parent: usize,
    via: usize,
}

fn bfs(
    start: &PieceState,
    alphabet: &[Macro],
    target: Target,
    watch: &Watch,
) -> Result<Vec<Move>, SolverError> {
    let set = macros();
    let solved = |state: &PieceState| match target {
        Target::Edges => set.edges_solved(state),
        Target::Corners => set.corners_solved(state),
    };
    let key = |state: &PieceState| match target {
        Target::Edges => set.edge_key(state),
        Target::Corners => set.corner_key(state),
    };
    if solved(start) {
        return Ok(Vec::new());
    }
    let mut nodes = vec![Node {
        state: start.clone(),
        parent: usize::MAX,
        via: usize::MAX,
    }];
    let mut visited: FxHashSet<[u8; 10]> = FxHashSet::default();
    visited.insert(key(start));
    let mut head = 0;
    while head < nodes.len() {
        watch.check()?;
        for (via, step) in alphabet.iter().enumerate() {
            let next = nodes[head].state.compose(&step.effect);
            if !visited.insert(key(&next)) {
                continue;
            }
            if solved(&next) {
                let mut word = step.moves.clone();
                let mut at = head;
                while at != 0 {
                    let node = &nodes[at];
                    let mut prefix = alphabet[node.via].moves.clone();
                    prefix.extend(word);
                    word = prefix;
                    at = node.parent;
                }
                return Ok(word);
            }
            nodes.push(Node {
                state: next,
                parent: head,
                via,
            });
        }
        head += 1;
    }
    // Running dry means the truncated catalog cannot express this
    // configuration; report it instead of aborting.
    Err(SolverError::MacroGap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{self, StagePiece};
    use megaminx_core::scramble;

    #[test]
    fn discovery_finds_both_kinds() {
        let set = macros();
        assert!(!set.edge.is_empty());
        assert!(!set.corner.is_empty());
    }

    #[test]
    fn macros_stay_inside_the_layer() {
        let set = macros();
        let engine = MoveEngine::global();
        for m in set.edge.iter().chain(&set.corner) {
            assert!(set.is_layer_local(&m.effect));
            assert_ne!(m.effect, PieceState::solved());
            assert_eq!(word_effect(engine, &m.moves), m.effect);
        }
        for m in &set.corner {
            assert!(!set.touches_edges(&m.effect));
        }
    }

    #[test]
    fn placement_words_touch_exactly_their_slot() {
        let set = macros();
        let engine = MoveEngine::global();
        for (&slot, list) in &set.insert_edge {
            for m in list {
                assert!(matches!(set.outside(&m.effect), Outside::Edge(s) if s == slot));
                assert_eq!(word_effect(engine, &m.moves), m.effect);
            }
        }
        for (&slot, list) in &set.insert_corner {
            for m in list {
                assert!(matches!(set.outside(&m.effect), Outside::Corner(s) if s == slot));
            }
        }
    }

    #[test]
    fn every_late_slot_has_a_placement_catalog() {
        let set = macros();
        for &target in &stages::plan()[stages::SEARCHED_STAGES..] {
            let list = match target {
                StagePiece::Corner(c) => set.corner_placements(c),
                StagePiece::Edge(e) => set.edge_placements(e),
            };
            assert!(!list.is_empty(), "{target:?} has no placement words");
        }
    }

    #[test]
    fn out_of_group_layer_states_are_reported_not_panicked() {
        // Two swapped D edges are an odd permutation; every twist is a
        // five-cycle per orbit, so no word of moves reaches this.
        let set = macros();
        let solved = PieceState::solved();
        let mut edge_perm = *solved.edge_perm();
        edge_perm.swap(
            set.d_edge_slots[0] as usize,
            set.d_edge_slots[1] as usize,
        );
        let state = PieceState::try_new(
            *solved.corner_perm(),
            [0; CORNERS],
            edge_perm,
            [0; EDGES],
        )
        .unwrap();
        let err = solve_d_edges(&state, &Watch::unlimited()).unwrap_err();
        assert_eq!(err, SolverError::MacroGap);
    }

    #[test]
    fn last_layer_finishes_after_the_stage_phase() {
        let (state, _) = scramble(14, 2);
        let watch = Watch::unlimited();
        let outer = crate::stages::solve_outer_layers(&state, &watch).unwrap();
        let mid = state.apply_all(&outer);
        let edges = solve_d_edges(&mid, &watch).unwrap();
        let after_edges = mid.apply_all(&edges);
        assert!(macros().edges_solved(&after_edges));
        let corners = solve_d_corners(&after_edges, &watch).unwrap();
        assert!(after_edges.apply_all(&corners).is_solved());
    }
}
