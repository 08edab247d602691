//! The legal move set: face identifiers, twist moves, the precomputed
//! transformation tables, and the text notation used for scramble and
//! solution logs.

use crate::geometry::{self, FACE_COUNT};
use crate::state::PieceState;
use itertools::Itertools;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// One of the 12 pentagonal faces, in the canonical order of the
/// reference visualizer. Centers never move, so a face is also a fixed
/// color identity.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[repr(u8)]
pub enum Face {
    U = 0,
    F = 1,
    R = 2,
    BR = 3,
    BL = 4,
    L = 5,
    DBR = 6,
    DBL = 7,
    DFL = 8,
    DFR = 9,
    DB = 10,
    D = 11,
}

impl Face {
    pub const ALL: [Face; FACE_COUNT] = [
        Face::U,
        Face::F,
        Face::R,
        Face::BR,
        Face::BL,
        Face::L,
        Face::DBR,
        Face::DBL,
        Face::DFL,
        Face::DFR,
        Face::DB,
        Face::D,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: u8) -> Option<Face> {
        Face::ALL.get(index as usize).copied()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Face::U => "U",
            Face::F => "F",
            Face::R => "R",
            Face::BR => "BR",
            Face::BL => "BL",
            Face::L => "L",
            Face::DBR => "DBR",
            Face::DBL => "DBL",
            Face::DFL => "DFL",
            Face::DFR => "DFR",
            Face::DB => "DB",
            Face::D => "D",
        }
    }

    /// Display color of this face's stickers, matching the physical
    /// puzzle's standard scheme.
    #[must_use]
    pub fn color_hex(self) -> &'static str {
        match self {
            Face::U => "#FFFFFF",
            Face::F => "#0000FF",
            Face::R => "#FFD700",
            Face::BR => "#800080",
            Face::BL => "#008000",
            Face::L => "#FF0000",
            Face::DBR => "#A0522D",
            Face::DBL => "#00CED1",
            Face::DFL => "#FFA500",
            Face::DFR => "#90EE90",
            Face::DB => "#FF69B4",
            Face::D => "#F0E68C",
        }
    }

    fn from_name(name: &str) -> Option<Face> {
        Face::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// The face sharing no pieces with `self`.
    #[must_use]
    pub fn opposite(self) -> Face {
        Face::from_index(geometry::tables().opposite[self.index()]).unwrap()
    }

    /// Whether two faces share an edge (and therefore pieces).
    #[must_use]
    pub fn adjacent(self, other: Face) -> bool {
        geometry::tables().adjacency[self.index()] & (1 << other.index()) != 0
    }

    /// Twists of non-adjacent faces touch disjoint piece sets and
    /// therefore commute.
    #[must_use]
    pub fn commutes_with(self, other: Face) -> bool {
        self == other || !self.adjacent(other)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejected move input. Raised at the parsing/construction boundary;
/// a constructed [`Move`] is always applicable.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("rotation amount {0} out of range 1..=4")]
    InvalidAmount(u8),
    #[error("unknown face in move token {0:?}")]
    UnknownFace(String),
    #[error("malformed move token {0:?}")]
    MalformedToken(String),
}

/// A twist of one face by 1..=4 clockwise fifths of a turn (viewed
/// from outside the face). A move is a pure function on states; its
/// inverse is the same face turned the complementary amount.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    face: Face,
    amount: u8,
}

impl Move {
    /// # Errors
    ///
    /// If `amount` is not in `1..=4`.
    pub fn new(face: Face, amount: u8) -> Result<Move, MoveParseError> {
        if (1..=4).contains(&amount) {
            Ok(Move { face, amount })
        } else {
            Err(MoveParseError::InvalidAmount(amount))
        }
    }

    pub(crate) fn from_parts(face: Face, amount: u8) -> Move {
        debug_assert!((1..=4).contains(&amount));
        Move { face, amount }
    }

    #[must_use]
    pub fn face(self) -> Face {
        self.face
    }

    #[must_use]
    pub fn amount(self) -> u8 {
        self.amount
    }

    /// The unique move undoing this one.
    #[must_use]
    pub fn inverse(self) -> Move {
        Move {
            face: self.face,
            amount: 5 - self.amount,
        }
    }

    /// All 48 legal moves, face-major.
    pub fn all() -> impl Iterator<Item = Move> {
        Face::ALL
            .into_iter()
            .cartesian_product(1..=4u8)
            .map(|(face, amount)| Move { face, amount })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.amount {
            1 => write!(f, "{}", self.face),
            2 => write!(f, "{}2", self.face),
            3 => write!(f, "{}2'", self.face),
            _ => write!(f, "{}'", self.face),
        }
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(token: &str) -> Result<Move, MoveParseError> {
        let (body, prime) = match token.strip_suffix('\'') {
            Some(body) => (body, true),
            None => (token, false),
        };
        let split = body.find(|c: char| c.is_ascii_digit()).unwrap_or(body.len());
        let (name, digits) = body.split_at(split);
        if name.is_empty() {
            return Err(MoveParseError::MalformedToken(token.to_owned()));
        }
        let face = Face::from_name(name)
            .ok_or_else(|| MoveParseError::UnknownFace(token.to_owned()))?;
        let amount = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u8>()
                .map_err(|_| MoveParseError::MalformedToken(token.to_owned()))?
        };
        if !(1..=4).contains(&amount) {
            return Err(MoveParseError::InvalidAmount(amount));
        }
        let amount = if prime { 5 - amount } else { amount };
        Ok(Move { face, amount })
    }
}

/// Parse a whitespace-separated move sequence, the persisted scramble
/// and solution format.
///
/// # Errors
///
/// If any token is not a valid move.
pub fn parse_sequence(s: &str) -> Result<Vec<Move>, MoveParseError> {
    s.split_whitespace().map(str::parse).collect()
}

/// Format a move sequence in the persisted text format.
#[must_use]
pub fn format_sequence(moves: &[Move]) -> String {
    moves.iter().map(ToString::to_string).join(" ")
}

/// Owner of the canonical move tables: the 48 (face, amount)
/// transformations, precomputed once so applying a move is a table
/// composition rather than a geometry computation.
pub struct MoveEngine {
    transformations: [[PieceState; 4]; FACE_COUNT],
}

impl MoveEngine {
    pub fn global() -> &'static MoveEngine {
        static ENGINE: LazyLock<MoveEngine> = LazyLock::new(MoveEngine::build);
        &ENGINE
    }

    fn build() -> MoveEngine {
        let tables = geometry::tables();
        let transformations = std::array::from_fn(|f| {
            let single = tables.twists[f].clone();
            let double = single.compose(&single);
            let triple = double.compose(&single);
            let quad = triple.compose(&single);
            [single, double, triple, quad]
        });
        MoveEngine { transformations }
    }

    /// The transformation induced by `mv`.
    #[must_use]
    pub fn transformation(&self, mv: Move) -> &PieceState {
        &self.transformations[mv.face.index()][usize::from(mv.amount) - 1]
    }

    /// Apply one move, producing a new state.
    #[must_use]
    pub fn apply(&self, state: &PieceState, mv: Move) -> PieceState {
        state.compose(self.transformation(mv))
    }

    /// Apply a whole sequence in order.
    #[must_use]
    pub fn apply_all(&self, state: &PieceState, moves: &[Move]) -> PieceState {
        moves.iter().fold(state.clone(), |s, &mv| self.apply(&s, mv))
    }

    /// The sequence undoing `moves`.
    #[must_use]
    pub fn inverse_sequence(moves: &[Move]) -> Vec<Move> {
        moves.iter().rev().map(|mv| mv.inverse()).collect()
    }

    /// Collapse trivial structure in a concatenated sequence: merges
    /// same-face turns (looking through commuting moves) and drops
    /// full cancellations, so `R` followed by `R'` disappears.
    #[must_use]
    pub fn simplify(moves: &[Move]) -> Vec<Move> {
        let mut out: Vec<Move> = Vec::with_capacity(moves.len());
        for &mv in moves {
            let mut pending = Some(mv);
            while let Some(mv) = pending.take() {
                let mut idx = out.len();
                loop {
                    if idx == 0 {
                        out.push(mv);
                        break;
                    }
                    let prev = out[idx - 1];
                    if prev.face == mv.face {
                        out.remove(idx - 1);
                        let amount = (prev.amount + mv.amount) % 5;
                        if amount != 0 {
                            pending = Some(Move::from_parts(mv.face, amount));
                        }
                        break;
                    } else if prev.face.commutes_with(mv.face) {
                        idx -= 1;
                    } else {
                        out.push(mv);
                        break;
                    }
                }
            }
        }
        out
    }

    /// Corner slot touching exactly the given faces, if they meet.
    #[must_use]
    pub fn corner_slot(faces: [Face; 3]) -> Option<u8> {
        let mut key = faces.map(|f| f.index() as u8);
        key.sort_unstable();
        let tables = geometry::tables();
        (0..crate::state::CORNERS).find_map(|slot| {
            let mut triple = tables.corner_faces[slot];
            triple.sort_unstable();
            (triple == key).then_some(slot as u8)
        })
    }

    /// Edge slot between the given faces, if they are adjacent.
    #[must_use]
    pub fn edge_slot(faces: [Face; 2]) -> Option<u8> {
        let mut key = faces.map(|f| f.index() as u8);
        key.sort_unstable();
        let tables = geometry::tables();
        (0..crate::state::EDGES).find_map(|slot| (tables.edge_faces[slot] == key).then_some(slot as u8))
    }

    /// The three faces around a corner slot, clockwise from outside.
    #[must_use]
    pub fn corner_faces(slot: u8) -> [Face; 3] {
        geometry::tables().corner_faces[slot as usize].map(|f| Face::from_index(f).unwrap())
    }

    /// The two faces of an edge slot.
    #[must_use]
    pub fn edge_faces(slot: u8) -> [Face; 2] {
        geometry::tables().edge_faces[slot as usize].map(|f| Face::from_index(f).unwrap())
    }

    /// Corner slots on a face's ring, in clockwise twist order.
    #[must_use]
    pub fn face_corners(face: Face) -> [u8; 5] {
        geometry::tables().face_corners[face.index()]
    }

    /// Edge slots on a face's ring, in clockwise twist order.
    #[must_use]
    pub fn face_edges(face: Face) -> [u8; 5] {
        geometry::tables().face_edges[face.index()]
    }
}

impl PieceState {
    /// Apply one move through the global engine.
    #[must_use]
    pub fn apply(&self, mv: Move) -> PieceState {
        MoveEngine::global().apply(self, mv)
    }

    /// Apply a sequence through the global engine.
    #[must_use]
    pub fn apply_all(&self, moves: &[Move]) -> PieceState {
        MoveEngine::global().apply_all(self, moves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_inverse_round_trips_every_move() {
        let solved = PieceState::solved();
        for mv in Move::all() {
            let scrambled = solved.apply(mv);
            assert!(!scrambled.is_solved(), "{mv} should change the state");
            assert_eq!(scrambled.apply(mv.inverse()), solved, "{mv}");
        }
    }

    #[test]
    fn face_zero_rotation_one_then_its_inverse_is_exactly_solved() {
        // The concrete boundary scenario: (face 0, amount 1) followed
        // by (face 0, amount 4).
        let solved = PieceState::solved();
        let state = solved
            .apply(Move::new(Face::U, 1).unwrap())
            .apply(Move::new(Face::U, 4).unwrap());
        assert_eq!(state, solved);
    }

    #[test]
    fn five_quarter_turns_restore_solved() {
        let mv = Move::new(Face::R, 1).unwrap();
        let mut state = PieceState::solved();
        for _ in 0..5 {
            state = state.apply(mv);
        }
        assert!(state.is_solved());
    }

    #[test]
    fn amounts_compose() {
        let solved = PieceState::solved();
        let twice = solved
            .apply(Move::new(Face::BL, 1).unwrap())
            .apply(Move::new(Face::BL, 1).unwrap());
        assert_eq!(twice, solved.apply(Move::new(Face::BL, 2).unwrap()));
    }

    #[test]
    fn notation_round_trips() {
        for mv in Move::all() {
            let token = mv.to_string();
            assert_eq!(token.parse::<Move>().unwrap(), mv, "{token}");
        }
        let seq = parse_sequence("U R2 BL' DFR2' D").unwrap();
        assert_eq!(format_sequence(&seq), "U R2 BL' DFR2' D");
        assert_eq!(seq[2], Move::new(Face::BL, 4).unwrap());
        assert_eq!(seq[3], Move::new(Face::DFR, 3).unwrap());
        // Plain numeric amounts are accepted on input.
        assert_eq!("R3".parse::<Move>().unwrap(), Move::new(Face::R, 3).unwrap());
    }

    #[test]
    fn notation_rejects_garbage() {
        assert_eq!(
            "X".parse::<Move>().unwrap_err(),
            MoveParseError::UnknownFace("X".to_owned())
        );
        assert_eq!(
            "R0".parse::<Move>().unwrap_err(),
            MoveParseError::InvalidAmount(0)
        );
        assert_eq!(
            "R5".parse::<Move>().unwrap_err(),
            MoveParseError::InvalidAmount(5)
        );
        assert!("2".parse::<Move>().is_err());
        assert!(Move::new(Face::U, 0).is_err());
        assert!(Move::new(Face::U, 5).is_err());
    }

    #[test]
    fn simplify_cancels_inverse_pairs() {
        let seq = parse_sequence("R R'").unwrap();
        assert!(MoveEngine::simplify(&seq).is_empty());
        let seq = parse_sequence("R2 R2'").unwrap();
        assert!(MoveEngine::simplify(&seq).is_empty());
    }

    #[test]
    fn simplify_merges_same_face_turns() {
        let seq = parse_sequence("R2 R2").unwrap();
        assert_eq!(MoveEngine::simplify(&seq), parse_sequence("R'").unwrap());
        // U and D are opposite and commute, so the Us merge through.
        let seq = parse_sequence("U D U'").unwrap();
        assert_eq!(MoveEngine::simplify(&seq), parse_sequence("D").unwrap());
        // F and R are adjacent; nothing may merge through them.
        let seq = parse_sequence("F R F'").unwrap();
        assert_eq!(MoveEngine::simplify(&seq), seq);
    }

    #[test]
    fn simplify_preserves_the_effect() {
        let (state, record) = crate::scramble(30, 7);
        let simplified = MoveEngine::simplify(&record);
        assert_eq!(PieceState::solved().apply_all(&simplified), state);
    }

    #[test]
    fn inverse_sequence_undoes_a_scramble() {
        let (state, record) = crate::scramble(25, 99);
        let undone = state.apply_all(&MoveEngine::inverse_sequence(&record));
        assert!(undone.is_solved());
    }

    #[test]
    fn opposite_faces_commute() {
        assert!(Face::U.commutes_with(Face::D));
        assert!(!Face::U.adjacent(Face::D));
        assert!(Face::U.adjacent(Face::F));
        assert!(!Face::U.commutes_with(Face::F));
    }

    #[test]
    fn slot_lookups_agree_with_rings() {
        let corner = MoveEngine::corner_slot([Face::U, Face::F, Face::R]).unwrap();
        assert!(MoveEngine::face_corners(Face::U).contains(&corner));
        assert!(MoveEngine::face_corners(Face::F).contains(&corner));
        let edge = MoveEngine::edge_slot([Face::U, Face::F]).unwrap();
        assert!(MoveEngine::face_edges(Face::U).contains(&edge));
        assert!(MoveEngine::edge_slot([Face::U, Face::D]).is_none());
    }
}
