use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

use super::mesh::{Mesh, Vertex};

/// Width of one side band in UV space (a quarter of the right texture half).
const SIDE_BAND: f32 = 0.125;

/// Bevel box dimensions.
///
/// `width`, `height` and `depth` are half-extents: the box spans
/// `[-width, width] × [-height, height] × [-depth, depth]`, edges rounded by
/// `radius`. `segments` is the subdivision of every quarter arc.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoxParams {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub radius: f32,
    pub segments: u32,
}

impl Default for BoxParams {
    fn default() -> Self {
        Self { width: 2.0, height: 3.5, depth: 0.8, radius: 0.05, segments: 16 }
    }
}

impl BoxParams {
    pub fn new(width: f32, height: f32, depth: f32, radius: f32) -> Self {
        Self { width, height, depth, radius, ..Self::default() }
    }

    /// Inner (unrounded) half-extents and the effective radius.
    ///
    /// The radius is clamped so the core never turns inside out.
    fn core(&self) -> ([f32; 3], f32) {
        let limit = self.width.min(self.height).min(self.depth).max(0.0);
        let r = self.radius.clamp(0.0, limit);
        ([self.width - r, self.height - r, self.depth - r], r)
    }
}

/// Which primitive a patch belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PatchKind {
    /// Flat rectangular face.
    Face,
    /// Quarter cylinder along a box edge.
    Edge,
    /// Eighth sphere at a box corner.
    Corner,
}

/// A `(rows + 1) × (cols + 1)` row-major vertex grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub kind: PatchKind,
    pub rows: u32,
    pub cols: u32,
    pub vertices: Vec<Vertex>,
}

impl Patch {
    #[inline]
    pub fn at(&self, row: u32, col: u32) -> &Vertex {
        &self.vertices[(row * (self.cols + 1) + col) as usize]
    }

    /// Perimeter segments as position pairs, walking the grid border once.
    pub fn boundary_edges(&self) -> Vec<([f32; 3], [f32; 3])> {
        let mut ring = Vec::with_capacity(2 * (self.rows + self.cols) as usize + 1);
        ring.extend((0..=self.cols).map(|c| (0, c)));
        ring.extend((1..=self.rows).map(|r| (r, self.cols)));
        ring.extend((0..self.cols).rev().map(|c| (self.rows, c)));
        ring.extend((0..self.rows).rev().map(|r| (r, 0)));

        ring.windows(2)
            .map(|w| (self.at(w[0].0, w[0].1).position, self.at(w[1].0, w[1].1).position))
            .collect()
    }
}

/// Procedurally generated rounded box: 6 faces, 12 edges, 8 corners.
///
/// Seam vertices are produced by the same float expressions on both sides of
/// every seam (`center + dir * r` with a mirror-symmetric arc table), so
/// adjacent patches share bit-identical positions.
#[derive(Debug, Clone)]
pub struct BevelBox {
    params: BoxParams,
    patches: Vec<Patch>,
}

impl BevelBox {
    pub fn generate(params: BoxParams) -> Self {
        let (core, r) = params.core();
        let arc = quarter_arc(params.segments);

        let mut patches = Vec::with_capacity(26);
        for face in FACES {
            patches.push(face_patch(&face, core, r));
        }
        for length_axis in 0..3 {
            for sp in [-1.0, 1.0] {
                for sq in [-1.0, 1.0] {
                    patches.push(edge_patch(length_axis, sp, sq, core, r, &arc));
                }
            }
        }
        for sx in [-1.0, 1.0] {
            for sy in [-1.0, 1.0] {
                for sz in [-1.0, 1.0] {
                    patches.push(corner_patch([sx, sy, sz], core, r, &arc));
                }
            }
        }

        log::debug!(
            "bevel box generated: {:?}, {} patches",
            params,
            patches.len()
        );
        Self { params, patches }
    }

    pub fn params(&self) -> BoxParams {
        self.params
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn patches_of(&self, kind: PatchKind) -> impl Iterator<Item = &Patch> {
        self.patches.iter().filter(move |p| p.kind == kind)
    }

    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::default();
        for p in &self.patches {
            mesh.append_grid(&p.vertices, p.rows, p.cols);
        }
        mesh
    }
}

/// Single-entry memo of the generated mesh, keyed by [`BoxParams`].
#[derive(Debug, Default)]
pub struct GeometryCache {
    entry: Option<(BoxParams, Mesh)>,
    generation: u64,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mesh for `params`, regenerating only when they changed.
    pub fn get(&mut self, params: BoxParams) -> &Mesh {
        if matches!(&self.entry, Some((cached, _)) if *cached != params) {
            self.entry = None;
        }
        let (_, mesh) = self.entry.get_or_insert_with(|| {
            self.generation += 1;
            (params, BevelBox::generate(params).to_mesh())
        });
        mesh
    }

    /// Increments every time a mesh is (re)generated.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// ── construction helpers ──────────────────────────────────────────────────

/// `(cos, sin)` for `n + 1` evenly spaced angles over `[0, π/2]`.
///
/// Mirror-symmetric by construction: `arc[n - k] == (arc[k].1, arc[k].0)`
/// bit for bit, and the endpoints are exactly `(1, 0)` and `(0, 1)`.
fn quarter_arc(segments: u32) -> Vec<(f32, f32)> {
    let n = segments.max(1) as usize;
    let mut arc = vec![(1.0f32, 0.0f32); n + 1];
    for k in 1..=n {
        arc[k] = if 2 * k < n {
            let a = FRAC_PI_2 * k as f32 / n as f32;
            (a.cos(), a.sin())
        } else if 2 * k == n {
            (FRAC_1_SQRT_2, FRAC_1_SQRT_2)
        } else {
            let (c, s) = arc[n - k];
            (s, c)
        };
    }
    arc
}

#[inline]
fn place(center: [f32; 3], dir: [f32; 3], r: f32) -> [f32; 3] {
    [center[0] + dir[0] * r, center[1] + dir[1] * r, center[2] + dir[2] * r]
}

#[inline]
fn rounded_uv(row: u32, rows: u32, col: u32, cols: u32) -> [f32; 2] {
    [0.5 + SIDE_BAND * col as f32 / cols as f32, row as f32 / rows as f32]
}

/// Flat face: normal axis + sign, in-plane axes with the direction that
/// increases `u`/`v`, and the UV rectangle `[u0, u1, v0, v1]`.
struct FaceSpec {
    axis: usize,
    sign: f32,
    u: (usize, f32),
    v: (usize, f32),
    uv: [f32; 4],
}

const X: usize = 0;
const Y: usize = 1;
const Z: usize = 2;

const FACES: [FaceSpec; 6] = [
    // front: left half of the texture, full height
    FaceSpec { axis: Z, sign: 1.0, u: (X, 1.0), v: (Y, 1.0), uv: [0.0, 0.5, 0.0, 1.0] },
    // back: same half, mirrored so it reads left-to-right from behind
    FaceSpec { axis: Z, sign: -1.0, u: (X, -1.0), v: (Y, 1.0), uv: [0.0, 0.5, 0.0, 1.0] },
    // left
    FaceSpec { axis: X, sign: -1.0, u: (Z, 1.0), v: (Y, 1.0), uv: [0.5, 0.625, 0.0, 1.0] },
    // right
    FaceSpec { axis: X, sign: 1.0, u: (Z, -1.0), v: (Y, 1.0), uv: [0.625, 0.75, 0.0, 1.0] },
    // top
    FaceSpec { axis: Y, sign: 1.0, u: (X, 1.0), v: (Z, -1.0), uv: [0.75, 0.875, 0.0, 1.0] },
    // bottom
    FaceSpec { axis: Y, sign: -1.0, u: (X, 1.0), v: (Z, 1.0), uv: [0.875, 1.0, 0.0, 1.0] },
];

fn face_patch(face: &FaceSpec, core: [f32; 3], r: f32) -> Patch {
    let mut dir = [0.0f32; 3];
    dir[face.axis] = face.sign;

    let mut vertices = Vec::with_capacity(4);
    for row in 0..2u32 {
        for col in 0..2u32 {
            let su = if col == 0 { -face.u.1 } else { face.u.1 };
            let sv = if row == 0 { -face.v.1 } else { face.v.1 };

            let mut center = [0.0f32; 3];
            center[face.axis] = face.sign * core[face.axis];
            center[face.u.0] = su * core[face.u.0];
            center[face.v.0] = sv * core[face.v.0];

            let [u0, u1, v0, v1] = face.uv;
            let uv = [u0 + (u1 - u0) * col as f32, v0 + (v1 - v0) * row as f32];
            vertices.push(Vertex::new(place(center, dir, r), dir, uv));
        }
    }
    Patch { kind: PatchKind::Face, rows: 1, cols: 1, vertices }
}

/// Quarter cylinder along `length_axis`. The arc sweeps from the `p` axis
/// (signed `sp`) to the `q` axis (signed `sq`).
fn edge_patch(length_axis: usize, sp: f32, sq: f32, core: [f32; 3], r: f32, arc: &[(f32, f32)]) -> Patch {
    let (p, q) = match length_axis {
        X => (Y, Z),
        Y => (X, Z),
        _ => (X, Y),
    };
    let cols = (arc.len() - 1) as u32;

    let mut vertices = Vec::with_capacity(2 * arc.len());
    for (row, sl) in [-1.0f32, 1.0].into_iter().enumerate() {
        let mut center = [0.0f32; 3];
        center[length_axis] = sl * core[length_axis];
        center[p] = sp * core[p];
        center[q] = sq * core[q];

        for (col, &(c, s)) in arc.iter().enumerate() {
            let mut dir = [0.0f32; 3];
            dir[p] = sp * c;
            dir[q] = sq * s;
            let uv = rounded_uv(row as u32, 1, col as u32, cols);
            vertices.push(Vertex::new(place(center, dir, r), dir, uv));
        }
    }
    Patch { kind: PatchKind::Edge, rows: 1, cols, vertices }
}

/// Eighth sphere around the core corner `signs`. Rows run from the Y pole
/// (`j = 0`) to the equator, columns sweep azimuth from the X axis to Z.
fn corner_patch(signs: [f32; 3], core: [f32; 3], r: f32, arc: &[(f32, f32)]) -> Patch {
    let [sx, sy, sz] = signs;
    let center = [sx * core[X], sy * core[Y], sz * core[Z]];
    let n = (arc.len() - 1) as u32;

    let mut vertices = Vec::with_capacity(arc.len() * arc.len());
    for (j, &(cp, sp)) in arc.iter().enumerate() {
        for (i, &(ca, sa)) in arc.iter().enumerate() {
            let dir = [sx * (sp * ca), sy * cp, sz * (sp * sa)];
            let uv = rounded_uv(j as u32, n, i as u32, n);
            vertices.push(Vertex::new(place(center, dir, r), dir, uv));
        }
    }
    Patch { kind: PatchKind::Corner, rows: n, cols: n, vertices }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_relative_eq;

    use super::*;

    type Key = [u32; 3];

    // -0.0 + 0.0 == +0.0, so signed zeros collapse to one key.
    fn key(p: [f32; 3]) -> Key {
        p.map(|c| (c + 0.0).to_bits())
    }

    fn edge_use_counts(bevel: &BevelBox) -> HashMap<(Key, Key), usize> {
        let mut counts = HashMap::new();
        for patch in bevel.patches() {
            for (a, b) in patch.boundary_edges() {
                let (ka, kb) = (key(a), key(b));
                if ka == kb {
                    continue; // collapsed pole segment
                }
                let k = if ka < kb { (ka, kb) } else { (kb, ka) };
                *counts.entry(k).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn quarter_arc_is_mirror_symmetric_with_exact_endpoints() {
        for n in [1, 2, 3, 7, 16] {
            let arc = quarter_arc(n);
            assert_eq!(arc[0], (1.0, 0.0));
            assert_eq!(arc[n as usize], (0.0, 1.0));
            for k in 0..=n as usize {
                let (c, s) = arc[k];
                assert_eq!(arc[n as usize - k], (s, c));
            }
        }
    }

    #[test]
    fn primitive_counts() {
        let bevel = BevelBox::generate(BoxParams::default());
        assert_eq!(bevel.patches_of(PatchKind::Face).count(), 6);
        assert_eq!(bevel.patches_of(PatchKind::Edge).count(), 12);
        assert_eq!(bevel.patches_of(PatchKind::Corner).count(), 8);
    }

    #[test]
    fn seams_are_watertight_for_reference_box() {
        let bevel = BevelBox::generate(BoxParams::new(2.0, 3.5, 0.8, 0.05));
        let counts = edge_use_counts(&bevel);
        assert!(!counts.is_empty());
        for (edge, n) in &counts {
            assert_eq!(*n, 2, "boundary edge {edge:?} shared by {n} patches");
        }
    }

    #[test]
    fn seams_are_watertight_for_odd_segment_counts() {
        let params = BoxParams { segments: 5, ..BoxParams::new(1.0, 0.7, 0.3, 0.2) };
        let counts = edge_use_counts(&BevelBox::generate(params));
        assert!(counts.values().all(|&n| n == 2));
    }

    #[test]
    fn face_corners_coincide_with_corner_patches() {
        let bevel = BevelBox::generate(BoxParams::default());
        let corner_points: Vec<Key> = bevel
            .patches_of(PatchKind::Corner)
            .flat_map(|p| p.vertices.iter().map(|v| key(v.position)))
            .collect();
        for face in bevel.patches_of(PatchKind::Face) {
            for v in &face.vertices {
                assert!(corner_points.contains(&key(v.position)), "{:?} not on a corner", v.position);
            }
        }
    }

    #[test]
    fn extents_match_half_dimensions() {
        let mesh = BevelBox::generate(BoxParams::default()).to_mesh();
        let max = |axis: usize| {
            mesh.vertices.iter().map(|v| v.position[axis]).fold(f32::MIN, f32::max)
        };
        assert_relative_eq!(max(0), 2.0, epsilon = 1e-5);
        assert_relative_eq!(max(1), 3.5, epsilon = 1e-5);
        assert_relative_eq!(max(2), 0.8, epsilon = 1e-5);
        assert!(mesh.indices_in_bounds());
    }

    #[test]
    fn normals_are_unit_length() {
        let mesh = BevelBox::generate(BoxParams::default()).to_mesh();
        for v in &mesh.vertices {
            let [x, y, z] = v.normal;
            assert_relative_eq!((x * x + y * y + z * z).sqrt(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn front_face_maps_left_texture_half() {
        let bevel = BevelBox::generate(BoxParams::default());
        let front = &bevel.patches()[0];
        assert_eq!(front.at(0, 0).uv, [0.0, 0.0]);
        assert_eq!(front.at(1, 1).uv, [0.5, 1.0]);
        assert_eq!(front.at(0, 0).normal, [0.0, 0.0, 1.0]);
        assert_relative_eq!(front.at(0, 0).position[2], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn oversized_radius_is_clamped() {
        let bevel = BevelBox::generate(BoxParams::new(1.0, 1.0, 0.2, 5.0));
        for v in bevel.to_mesh().vertices {
            assert!(v.position.iter().all(|c| c.is_finite()));
            assert!(v.position[2].abs() <= 0.2 + 1e-6);
        }
    }

    #[test]
    fn cache_regenerates_only_on_param_change() {
        let mut cache = GeometryCache::new();
        let a = BoxParams::default();
        let tris = cache.get(a).triangle_count();
        cache.get(a);
        assert_eq!(cache.generation(), 1);

        let b = BoxParams { depth: 1.0, ..a };
        assert_eq!(cache.get(b).triangle_count(), tris);
        assert_eq!(cache.generation(), 2);
    }
}
