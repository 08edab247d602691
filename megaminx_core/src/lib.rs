#![warn(clippy::pedantic)]
#![allow(
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::cast_possible_truncation
)]

//! Megaminx puzzle model: permutation/orientation state, the legal move
//! set as precomputed group operators, scrambling, reachability
//! validation, undo/redo history, and the facelet (sticker color)
//! projection consumed by visualization layers.
//!
//! States are immutable values. Applying a move never mutates in place;
//! it produces a new [`PieceState`], so history can keep prior
//! snapshots cheaply.

pub mod facelets;
mod geometry;
pub mod history;
pub mod moves;
pub mod scramble;
pub mod state;
pub mod validator;

pub use history::HistoryLog;
pub use moves::{Face, Move, MoveEngine, MoveParseError};
pub use scramble::scramble;
pub use state::PieceState;
