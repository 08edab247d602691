//! Dodecahedron combinatorics, derived once at startup from the solid's
//! golden-ratio coordinates.
//!
//! Everything downstream (move tables, facelet layout, solver stage
//! plans) is keyed on the slot numbering produced here: 20 corner slots
//! (vertices), 30 edge slots (face-pair edges) and the canonical face
//! order `U F R BR BL L DBR DBL DFL DFR DB D`. Each face's clockwise
//! fifth-turn is computed by rotating slot coordinates -72 degrees
//! about the face normal and matching positions, rather than from a
//! hand-entered cycle table; orientation deltas fall out of how the
//! rotation maps each slot's face tuple onto the target slot's.

use crate::state::{CORNERS, EDGES, PieceState};
use std::sync::LazyLock;

/// Faces in canonical order, matching the reference visualizer.
pub(crate) const FACE_COUNT: usize = 12;

type Vec3 = [f64; 3];

const EPSILON: f64 = 1e-6;

pub(crate) struct Tables {
    /// Bitmask of faces adjacent to each face.
    pub adjacency: [u16; FACE_COUNT],
    /// The face sharing no pieces with each face.
    pub opposite: [u8; FACE_COUNT],
    /// The three faces around each corner slot, clockwise as seen from
    /// outside, starting with the lowest face index.
    pub corner_faces: [[u8; 3]; CORNERS],
    /// The two faces of each edge slot, lower index first.
    pub edge_faces: [[u8; 2]; EDGES],
    /// Corner slots around each face, in clockwise twist order.
    pub face_corners: [[u8; 5]; FACE_COUNT],
    /// Edge slots around each face; edge `i` lies between ring corners
    /// `i` and `i + 1`.
    pub face_edges: [[u8; 5]; FACE_COUNT],
    /// One clockwise fifth-turn of each face, as a transformation.
    pub twists: [PieceState; FACE_COUNT],
}

pub(crate) fn tables() -> &'static Tables {
    static TABLES: LazyLock<Tables> = LazyLock::new(build);
    &TABLES
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn det3(a: Vec3, b: Vec3, c: Vec3) -> f64 {
    dot(a, cross(b, c))
}

fn normalize(v: Vec3) -> Vec3 {
    let len = dot(v, v).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

fn distance_sq(a: Vec3, b: Vec3) -> f64 {
    let d = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    dot(d, d)
}

/// Rodrigues rotation of `p` by `angle` about the unit axis `axis`.
fn rotate(p: Vec3, axis: Vec3, angle: f64) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    let k_cross_p = cross(axis, p);
    let k_dot_p = dot(axis, p);
    let mut out = [0.0; 3];
    for i in 0..3 {
        out[i] = p[i] * cos + k_cross_p[i] * sin + axis[i] * k_dot_p * (1.0 - cos);
    }
    out
}

/// The 20 vertices of a regular dodecahedron.
fn vertices() -> [Vec3; 20] {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let inv = 1.0 / phi;
    let mut out = [[0.0; 3]; 20];
    let mut n = 0;
    for &x in &[-1.0, 1.0] {
        for &y in &[-1.0, 1.0] {
            for &z in &[-1.0, 1.0] {
                out[n] = [x, y, z];
                n += 1;
            }
        }
    }
    for &a in &[-1.0, 1.0] {
        for &b in &[-1.0, 1.0] {
            out[n] = [0.0, a * inv, b * phi];
            n += 1;
            out[n] = [a * inv, b * phi, 0.0];
            n += 1;
            out[n] = [a * phi, 0.0, b * inv];
            n += 1;
        }
    }
    debug_assert_eq!(n, 20);
    out
}

/// The 12 face normals (icosahedron vertex directions, unnormalized).
fn normals() -> [Vec3; 12] {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let mut out = [[0.0; 3]; 12];
    let mut n = 0;
    for &a in &[-1.0, 1.0] {
        for &b in &[-1.0, 1.0] {
            out[n] = [0.0, a * phi, b * 1.0];
            n += 1;
            out[n] = [a * 1.0, 0.0, b * phi];
            n += 1;
            out[n] = [a * phi, b * 1.0, 0.0];
            n += 1;
        }
    }
    debug_assert_eq!(n, 12);
    out
}

fn find_vertex(verts: &[Vec3; 20], p: Vec3) -> usize {
    let (i, d) = verts
        .iter()
        .enumerate()
        .map(|(i, &v)| (i, distance_sq(v, p)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap();
    assert!(d < EPSILON, "rotated vertex does not land on the solid");
    i
}

fn find_normal(norms: &[Vec3; 12], n: Vec3) -> usize {
    let (i, d) = norms
        .iter()
        .enumerate()
        .map(|(i, &v)| (i, distance_sq(v, n)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap();
    assert!(d < EPSILON, "rotated normal is not a face normal");
    i
}

fn build() -> Tables {
    let verts = vertices();
    let norms = normals();

    // Each face's vertices are the five with the maximal (equal)
    // projection onto the face normal.
    let mut face_verts_raw: [Vec<usize>; 12] = Default::default();
    for (f, &n) in norms.iter().enumerate() {
        let max = verts
            .iter()
            .map(|&v| dot(v, n))
            .max_by(f64::total_cmp)
            .unwrap();
        face_verts_raw[f] = (0..20).filter(|&v| dot(verts[v], n) > max - EPSILON).collect();
        assert_eq!(face_verts_raw[f].len(), 5);
    }

    let shared_vertex_count = |a: usize, b: usize| {
        face_verts_raw[a]
            .iter()
            .filter(|v| face_verts_raw[b].contains(v))
            .count()
    };
    let adjacent_raw = |a: usize, b: usize| a != b && shared_vertex_count(a, b) == 2;

    // Canonical face labeling. U is the face whose normal points most
    // upward (ties broken toward +z), its ring runs F R BR BL L
    // clockwise starting from the front, and each lower-band face is
    // named after the pair of upper-band faces it touches.
    let u = (0..12)
        .max_by(|&a, &b| {
            (norms[a][1], norms[a][2])
                .partial_cmp(&(norms[b][1], norms[b][2]))
                .unwrap()
        })
        .unwrap();
    let f = (0..12)
        .filter(|&g| adjacent_raw(u, g))
        .max_by(|&a, &b| {
            (norms[a][2], norms[a][0])
                .partial_cmp(&(norms[b][2], norms[b][0]))
                .unwrap()
        })
        .unwrap();
    let r = (0..12)
        .filter(|&g| g != u && adjacent_raw(u, g) && adjacent_raw(f, g))
        .max_by(|&a, &b| norms[a][0].total_cmp(&norms[b][0]))
        .unwrap();
    // Walk the rest of U's ring away from F through R.
    let mut upper = vec![f, r];
    while upper.len() < 5 {
        let prev = upper[upper.len() - 2];
        let last = upper[upper.len() - 1];
        let next = (0..12)
            .find(|&g| g != prev && g != u && adjacent_raw(u, g) && adjacent_raw(last, g))
            .unwrap();
        upper.push(next);
    }
    // The lower-band face between a cyclically adjacent pair of
    // upper-band faces is their unique common neighbor besides U.
    let lower_between = |a: usize, b: usize| {
        (0..12)
            .find(|&g| g != u && !upper.contains(&g) && adjacent_raw(a, g) && adjacent_raw(b, g))
            .unwrap()
    };
    let dfr = lower_between(upper[0], upper[1]);
    let dbr = lower_between(upper[1], upper[2]);
    let db = lower_between(upper[2], upper[3]);
    let dbl = lower_between(upper[3], upper[4]);
    let dfl = lower_between(upper[4], upper[0]);
    let d = find_normal(&norms, [-norms[u][0], -norms[u][1], -norms[u][2]]);

    // Raw face index for each canonical index U F R BR BL L DBR DBL
    // DFL DFR DB D.
    let raw_of_canon = [
        u, upper[0], upper[1], upper[2], upper[3], upper[4], dbr, dbl, dfl, dfr, db, d,
    ];
    let mut canon_of_raw = [0usize; 12];
    for (canon, &raw) in raw_of_canon.iter().enumerate() {
        canon_of_raw[raw] = canon;
    }
    {
        let mut sorted = raw_of_canon;
        sorted.sort_unstable();
        assert_eq!(sorted, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    }

    // Six faces share no vertex with a given face (the antipode and its
    // five neighbors), so "opposite" must come from the normals.
    let mut adjacency = [0u16; FACE_COUNT];
    let mut opposite = [0u8; FACE_COUNT];
    for a in 0..FACE_COUNT {
        for b in 0..FACE_COUNT {
            if adjacent_raw(raw_of_canon[a], raw_of_canon[b]) {
                adjacency[a] |= 1 << b;
            }
        }
        assert_eq!(adjacency[a].count_ones(), 5);
        let n = norms[raw_of_canon[a]];
        opposite[a] = canon_of_raw[find_normal(&norms, [-n[0], -n[1], -n[2]])] as u8;
    }

    // Corner slots are vertices, numbered by their sorted face triple;
    // the stored triple is rotated into clockwise-from-outside order
    // (positive determinant of the three normals) with the lowest face
    // first, which is what makes orientation deltas well defined.
    let faces_of_vertex = |v: usize| -> Vec<usize> {
        let mut fs: Vec<usize> = (0..FACE_COUNT)
            .filter(|&c| face_verts_raw[raw_of_canon[c]].contains(&v))
            .collect();
        fs.sort_unstable();
        assert_eq!(fs.len(), 3);
        fs
    };
    let mut vertex_order: Vec<usize> = (0..20).collect();
    vertex_order.sort_by_key(|&v| faces_of_vertex(v));
    let mut corner_of_vertex = [0usize; 20];
    for (slot, &v) in vertex_order.iter().enumerate() {
        corner_of_vertex[v] = slot;
    }
    let mut corner_faces = [[0u8; 3]; CORNERS];
    for (slot, &v) in vertex_order.iter().enumerate() {
        let fs = faces_of_vertex(v);
        let (a, mut b, mut c) = (fs[0], fs[1], fs[2]);
        if det3(
            norms[raw_of_canon[a]],
            norms[raw_of_canon[b]],
            norms[raw_of_canon[c]],
        ) < 0.0
        {
            std::mem::swap(&mut b, &mut c);
        }
        corner_faces[slot] = [a as u8, b as u8, c as u8];
    }

    // Edge slots are adjacent face pairs, numbered lexicographically.
    let mut edge_faces = [[0u8; 2]; EDGES];
    let mut edge_vertices = [[0usize; 2]; EDGES];
    let mut n = 0;
    for a in 0..FACE_COUNT {
        for b in (a + 1)..FACE_COUNT {
            if adjacency[a] & (1 << b) == 0 {
                continue;
            }
            let shared: Vec<usize> = face_verts_raw[raw_of_canon[a]]
                .iter()
                .copied()
                .filter(|v| face_verts_raw[raw_of_canon[b]].contains(v))
                .collect();
            edge_faces[n] = [a as u8, b as u8];
            edge_vertices[n] = [shared[0], shared[1]];
            n += 1;
        }
    }
    assert_eq!(n, EDGES);
    let edge_midpoint = |e: usize| -> Vec3 {
        let [v1, v2] = edge_vertices[e];
        let mut m = [0.0; 3];
        for i in 0..3 {
            m[i] = (verts[v1][i] + verts[v2][i]) / 2.0;
        }
        m
    };
    let edge_of_vertices = |v1: usize, v2: usize| -> usize {
        (0..EDGES)
            .find(|&e| {
                let [a, b] = edge_vertices[e];
                (a, b) == (v1, v2) || (a, b) == (v2, v1)
            })
            .unwrap()
    };

    // One clockwise fifth-turn per face: rotate every ring slot's
    // coordinates -72 degrees about the outward normal and read off
    // where it lands.
    let angle = -2.0 * std::f64::consts::PI / 5.0;
    let mut twists: Vec<PieceState> = Vec::with_capacity(FACE_COUNT);
    let mut face_corners = [[0u8; 5]; FACE_COUNT];
    let mut face_edges = [[0u8; 5]; FACE_COUNT];
    for canon in 0..FACE_COUNT {
        let raw = raw_of_canon[canon];
        let axis = normalize(norms[raw]);

        // Where each face ends up under the turn (identity off-ring).
        let mut face_map = [0u8; FACE_COUNT];
        for g in 0..FACE_COUNT {
            face_map[g] = if g == canon || adjacency[canon] & (1 << g) == 0 {
                g as u8
            } else {
                canon_of_raw[find_normal(&norms, rotate(norms[raw_of_canon[g]], axis, angle))] as u8
            };
        }

        let mut corner_perm = [0u8; CORNERS];
        let mut corner_ori = [0u8; CORNERS];
        for (i, p) in corner_perm.iter_mut().enumerate() {
            *p = i as u8;
        }
        let mut next_corner = [0u8; CORNERS];
        for (i, p) in next_corner.iter_mut().enumerate() {
            *p = i as u8;
        }
        for &v in &face_verts_raw[raw] {
            let src = corner_of_vertex[v];
            let dst = corner_of_vertex[find_vertex(&verts, rotate(verts[v], axis, angle))];
            next_corner[src] = dst as u8;
            corner_perm[dst] = src as u8;
            // Orientation delta: where the image of the source slot's
            // first face sits in the target slot's triple.
            let mapped = corner_faces[src].map(|f| face_map[f as usize]);
            let delta = (0..3)
                .find(|&k| corner_faces[dst][k] == mapped[0])
                .expect("twist must map slot triples onto slot triples");
            for j in 0..3 {
                debug_assert_eq!(corner_faces[dst][(j + delta) % 3], mapped[j]);
            }
            corner_ori[dst] = delta as u8;
        }

        let mut edge_perm = [0u8; EDGES];
        let mut edge_ori = [0u8; EDGES];
        for (i, p) in edge_perm.iter_mut().enumerate() {
            *p = i as u8;
        }
        for e in 0..EDGES {
            if edge_faces[e][0] as usize != canon && edge_faces[e][1] as usize != canon {
                continue;
            }
            let dst = (0..EDGES)
                .map(|e2| (e2, distance_sq(edge_midpoint(e2), rotate(edge_midpoint(e), axis, angle))))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .unwrap();
            assert!(dst.1 < EPSILON);
            let dst = dst.0;
            let mapped = edge_faces[e].map(|f| face_map[f as usize]);
            edge_perm[dst] = e as u8;
            edge_ori[dst] = u8::from(mapped[0] != edge_faces[dst][0]);
            debug_assert!(
                mapped == edge_faces[dst] || (mapped[1] == edge_faces[dst][0] && mapped[0] == edge_faces[dst][1])
            );
        }

        // Ring metadata for the facelet layout: start at the lowest
        // corner slot and follow the twist around.
        let start = face_verts_raw[raw]
            .iter()
            .map(|&v| corner_of_vertex[v])
            .min()
            .unwrap();
        let mut ring_vertex = vertex_order[start];
        for i in 0..5 {
            let slot = corner_of_vertex[ring_vertex];
            let next = vertex_order[next_corner[slot] as usize];
            face_corners[canon][i] = slot as u8;
            face_edges[canon][i] = edge_of_vertices(ring_vertex, next) as u8;
            ring_vertex = next;
        }

        twists.push(PieceState::from_arrays_unchecked(
            corner_perm, corner_ori, edge_perm, edge_ori,
        ));
    }

    let twists: [PieceState; FACE_COUNT] = twists.try_into().ok().unwrap();

    Tables {
        adjacency,
        opposite,
        corner_faces,
        edge_faces,
        face_corners,
        face_edges,
        twists,
    }
}
