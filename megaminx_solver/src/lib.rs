#![warn(clippy::pedantic)]
#![allow(
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::cast_possible_truncation
)]

//! Layered Megaminx solver.
//!
//! Solves in two phases. Phase one places the 40 pieces outside the D
//! layer one at a time: the U star and U corners by short
//! iterative-deepening A* searches, the rest with slot-targeted macro
//! words that route each piece through the still-free D layer without
//! touching anything already placed. Phase two finishes the D layer
//! with commutator macros whose net effect stays inside the layer.
//! All macros come from one commutator enumeration run at startup.
//! Solutions are far from optimal but are found in seconds.

pub(crate) mod heuristic;
pub(crate) mod macros;
pub mod session;
pub mod solver;
pub(crate) mod stages;

pub use session::{Session, SolveHandle};
pub use solver::{Solver, SolverError};

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}
