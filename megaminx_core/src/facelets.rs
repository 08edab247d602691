//! Facelet (sticker color) projection and reconstruction.
//!
//! The rendering layer and external state entry both speak stickers,
//! not permutations. A [`FaceletState`] is 12 faces of 11 stickers:
//! the fixed center, the five corner stickers and the five edge
//! stickers, each ring in clockwise twist order. [`project`] maps a
//! [`PieceState`] onto stickers; [`reconstruct`] inverts it, rejecting
//! colorings that do not describe a reachable puzzle.

use crate::geometry;
use crate::moves::Face;
use crate::state::{CORNERS, EDGES, PieceState};
use crate::validator::{self, UnsolvableReason};
use thiserror::Error;

/// Stickers per face: 1 center + 5 corner + 5 edge.
pub const STICKERS_PER_FACE: usize = 11;

/// Sticker colors, indexed `[face][position]`. Position 0 is the
/// center, 1..=5 the corner stickers and 6..=10 the edge stickers,
/// both following the face's clockwise ring.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FaceletState(pub [[Face; STICKERS_PER_FACE]; 12]);

/// Sticker input that does not describe a reachable puzzle.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FaceletError {
    #[error("center of face {face} is colored {found}; centers are fixed")]
    CenterMismatch { face: Face, found: Face },
    #[error("corner stickers {colors:?} name no corner piece")]
    UnknownCorner { colors: [Face; 3] },
    #[error("edge stickers {colors:?} name no edge piece")]
    UnknownEdge { colors: [Face; 2] },
    #[error("corner piece {0} appears more than once")]
    DuplicateCorner(u8),
    #[error("edge piece {0} appears more than once")]
    DuplicateEdge(u8),
    #[error("colors form an unreachable state: {0}")]
    Unreachable(#[from] UnsolvableReason),
}

fn ring_position(ring: &[u8; 5], slot: u8) -> usize {
    ring.iter().position(|&s| s == slot).unwrap()
}

/// Render a piece state as sticker colors.
#[must_use]
pub fn project(state: &PieceState) -> FaceletState {
    let tables = geometry::tables();
    let mut grid = [[Face::U; STICKERS_PER_FACE]; 12];
    for face in Face::ALL {
        grid[face.index()][0] = face;
    }
    for slot in 0..CORNERS {
        let piece = state.corner_perm()[slot] as usize;
        let ori = state.corner_ori()[slot] as usize;
        for (idx, &face) in tables.corner_faces[slot].iter().enumerate() {
            // The sticker shown on the slot's face `idx` belongs to the
            // occupying piece's face `idx - ori`.
            let color = tables.corner_faces[piece][(idx + 3 - ori) % 3];
            let k = ring_position(&tables.face_corners[face as usize], slot as u8);
            grid[face as usize][1 + k] = Face::from_index(color).unwrap();
        }
    }
    for slot in 0..EDGES {
        let piece = state.edge_perm()[slot] as usize;
        let ori = state.edge_ori()[slot] as usize;
        for (idx, &face) in tables.edge_faces[slot].iter().enumerate() {
            let color = tables.edge_faces[piece][(idx + ori) % 2];
            let k = ring_position(&tables.face_edges[face as usize], slot as u8);
            grid[face as usize][6 + k] = Face::from_index(color).unwrap();
        }
    }
    FaceletState(grid)
}

/// Rebuild the piece state a sticker coloring describes.
///
/// # Errors
///
/// [`FaceletError`] when centers are miscolored, a sticker group names
/// no piece (or a mirrored one), a piece appears twice, or the colors
/// pass piece lookup but violate a reachability invariant.
pub fn reconstruct(facelets: &FaceletState) -> Result<PieceState, FaceletError> {
    let tables = geometry::tables();
    let grid = &facelets.0;
    for face in Face::ALL {
        let found = grid[face.index()][0];
        if found != face {
            return Err(FaceletError::CenterMismatch { face, found });
        }
    }

    let mut corner_perm = [0u8; CORNERS];
    let mut corner_ori = [0u8; CORNERS];
    let mut corner_seen = [false; CORNERS];
    for slot in 0..CORNERS {
        let stickers: [u8; 3] = std::array::from_fn(|idx| {
            let face = tables.corner_faces[slot][idx] as usize;
            let k = ring_position(&tables.face_corners[face], slot as u8);
            grid[face][1 + k].index() as u8
        });
        let mut key = stickers;
        key.sort_unstable();
        let piece = (0..CORNERS)
            .find(|&p| {
                let mut home = tables.corner_faces[p];
                home.sort_unstable();
                home == key
            })
            .ok_or(FaceletError::UnknownCorner {
                colors: stickers.map(|f| Face::from_index(f).unwrap()),
            })?;
        // Rotations preserve the clockwise sticker order, so exactly
        // one cyclic offset matches; a mirrored coloring matches none.
        let ori = (0..3u8)
            .find(|&o| {
                (0..3).all(|idx| stickers[idx] == tables.corner_faces[piece][(idx + 3 - o as usize) % 3])
            })
            .ok_or(FaceletError::UnknownCorner {
                colors: stickers.map(|f| Face::from_index(f).unwrap()),
            })?;
        if corner_seen[piece] {
            return Err(FaceletError::DuplicateCorner(piece as u8));
        }
        corner_seen[piece] = true;
        corner_perm[slot] = piece as u8;
        corner_ori[slot] = ori;
    }

    let mut edge_perm = [0u8; EDGES];
    let mut edge_ori = [0u8; EDGES];
    let mut edge_seen = [false; EDGES];
    for slot in 0..EDGES {
        let stickers: [u8; 2] = std::array::from_fn(|idx| {
            let face = tables.edge_faces[slot][idx] as usize;
            let k = ring_position(&tables.face_edges[face], slot as u8);
            grid[face][6 + k].index() as u8
        });
        let mut key = stickers;
        key.sort_unstable();
        let piece = (0..EDGES)
            .find(|&p| tables.edge_faces[p] == key)
            .ok_or(FaceletError::UnknownEdge {
                colors: stickers.map(|f| Face::from_index(f).unwrap()),
            })?;
        if edge_seen[piece] {
            return Err(FaceletError::DuplicateEdge(piece as u8));
        }
        edge_seen[piece] = true;
        edge_perm[slot] = piece as u8;
        edge_ori[slot] = u8::from(stickers[0] != tables.edge_faces[piece][0]);
    }

    // Every piece was found exactly once, so the arrays are valid
    // permutations by construction; only reachability remains.
    let state = PieceState::from_arrays_unchecked(corner_perm, corner_ori, edge_perm, edge_ori);
    validator::check(&state)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;
    use crate::scramble;

    #[test]
    fn solved_projection_is_uniform() {
        let FaceletState(grid) = project(&PieceState::solved());
        for face in Face::ALL {
            assert!(grid[face.index()].iter().all(|&c| c == face), "{face}");
        }
    }

    #[test]
    fn a_twist_keeps_its_own_stickers() {
        // Turning U permutes U-layer pieces among themselves; the U
        // face stays uniform while its neighbors change.
        let state = PieceState::solved().apply(Move::new(Face::U, 1).unwrap());
        let FaceletState(grid) = project(&state);
        assert!(grid[Face::U.index()].iter().all(|&c| c == Face::U));
        assert!(grid[Face::F.index()].iter().any(|&c| c != Face::F));
        assert!(grid[Face::D.index()].iter().all(|&c| c == Face::D));
    }

    #[test]
    fn project_reconstruct_round_trips() {
        for seed in [0, 42, 1000] {
            let (state, _) = scramble(30, seed);
            assert_eq!(reconstruct(&project(&state)).unwrap(), state);
        }
    }

    #[test]
    fn miscolored_center_is_rejected() {
        let mut facelets = project(&PieceState::solved());
        facelets.0[Face::F.index()][0] = Face::R;
        assert_eq!(
            reconstruct(&facelets),
            Err(FaceletError::CenterMismatch {
                face: Face::F,
                found: Face::R
            })
        );
    }

    #[test]
    fn twisted_corner_recoloring_is_unreachable() {
        // Cycle one corner's three stickers in place. Piece lookup
        // succeeds but the orientation sum breaks.
        let mut facelets = project(&PieceState::solved());
        let tables = crate::geometry::tables();
        let slot = 0u8;
        let faces = tables.corner_faces[0];
        let positions: Vec<(usize, usize)> = faces
            .iter()
            .map(|&f| {
                let k = ring_position(&tables.face_corners[f as usize], slot);
                (f as usize, 1 + k)
            })
            .collect();
        let colors: Vec<Face> = positions.iter().map(|&(f, p)| facelets.0[f][p]).collect();
        for i in 0..3 {
            let (f, p) = positions[(i + 1) % 3];
            facelets.0[f][p] = colors[i];
        }
        assert!(matches!(
            reconstruct(&facelets),
            Err(FaceletError::Unreachable(
                UnsolvableReason::CornerOrientationSum { .. }
            ))
        ));
    }

    #[test]
    fn nonsense_sticker_group_is_rejected() {
        // U and D never meet, so no corner piece carries both colors.
        let mut facelets = project(&PieceState::solved());
        facelets.0[Face::U.index()][1] = Face::D;
        assert!(matches!(
            reconstruct(&facelets),
            Err(FaceletError::UnknownCorner { .. })
        ));
    }
}
