use std::collections::BTreeSet;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Line-list mesh: every edge of the triangulated surface, drawn once.
#[derive(Clone, Debug, Default)]
pub struct WireMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub lines: Vec<u32>,
}

impl WireMesh {
    fn from_triangles(vertices: &[Vec3], normals: &[Vec3], triangles: &[[u32; 3]]) -> Self {
        let mut edges = BTreeSet::new();
        for [a, b, c] in triangles {
            for (from, to) in [(*a, *b), (*b, *c), (*c, *a)] {
                edges.insert((from.min(to), from.max(to)));
            }
        }

        Self {
            positions: vertices.iter().flat_map(|v| v.to_array()).collect(),
            normals: normals.iter().flat_map(|n| n.to_array()).collect(),
            lines: edges.into_iter().flat_map(|(a, b)| [a, b]).collect(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn edge_count(&self) -> usize {
        self.lines.len() / 2
    }
}

const PHI: f32 = 1.618_034;

const ICOSAHEDRON_TRIANGLES: [[u32; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

const DODECAHEDRON_TRIANGLES: [[u32; 3]; 36] = [
    [3, 11, 7], [3, 7, 15], [3, 15, 13],
    [7, 19, 17], [7, 17, 6], [7, 6, 15],
    [17, 4, 8], [17, 8, 10], [17, 10, 6],
    [8, 0, 16], [8, 16, 2], [8, 2, 10],
    [0, 12, 1], [0, 1, 18], [0, 18, 16],
    [6, 10, 2], [6, 2, 13], [6, 13, 15],
    [2, 16, 18], [2, 18, 3], [2, 3, 13],
    [18, 1, 9], [18, 9, 11], [18, 11, 3],
    [4, 14, 12], [4, 12, 0], [4, 0, 8],
    [11, 9, 5], [11, 5, 19], [11, 19, 7],
    [19, 5, 14], [19, 14, 4], [19, 4, 17],
    [1, 12, 14], [1, 14, 5], [1, 5, 9],
];

fn polyhedron(raw: &[[f32; 3]], triangles: &[[u32; 3]], radius: f32) -> WireMesh {
    let normals: Vec<Vec3> = raw.iter().map(|v| Vec3::from_array(*v).normalize()).collect();
    let vertices: Vec<Vec3> = normals.iter().map(|n| *n * radius).collect();
    WireMesh::from_triangles(&vertices, &normals, triangles)
}

pub fn icosahedron(radius: f32) -> WireMesh {
    const T: f32 = PHI;
    let raw = [
        [-1.0, T, 0.0], [1.0, T, 0.0], [-1.0, -T, 0.0], [1.0, -T, 0.0],
        [0.0, -1.0, T], [0.0, 1.0, T], [0.0, -1.0, -T], [0.0, 1.0, -T],
        [T, 0.0, -1.0], [T, 0.0, 1.0], [-T, 0.0, -1.0], [-T, 0.0, 1.0],
    ];
    polyhedron(&raw, &ICOSAHEDRON_TRIANGLES, radius)
}

/// Each pentagonal face is fanned into three triangles.
pub fn dodecahedron(radius: f32) -> WireMesh {
    const T: f32 = PHI;
    const R: f32 = 1.0 / PHI;
    let raw = [
        [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0],
        [0.0, -R, -T], [0.0, -R, T], [0.0, R, -T], [0.0, R, T],
        [-R, -T, 0.0], [-R, T, 0.0], [R, -T, 0.0], [R, T, 0.0],
        [-T, 0.0, -R], [T, 0.0, -R], [-T, 0.0, R], [T, 0.0, R],
    ];
    polyhedron(&raw, &DODECAHEDRON_TRIANGLES, radius)
}

fn torus_knot_curve(u: f32, p: f32, q: f32, radius: f32) -> Vec3 {
    let q_over_p = q / p * u;
    let cs = q_over_p.cos();
    Vec3::new(
        radius * (2.0 + cs) * 0.5 * u.cos(),
        radius * (2.0 + cs) * 0.5 * u.sin(),
        radius * q_over_p.sin() * 0.5,
    )
}

/// A `(p, q)` torus knot swept by a circular tube.
pub fn torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> WireMesh {
    let (p, q) = (p as f32, q as f32);
    let mut vertices = Vec::new();
    let mut normals = Vec::new();

    for i in 0..=tubular_segments {
        let u = i as f32 / tubular_segments as f32 * p * std::f32::consts::TAU;
        let p1 = torus_knot_curve(u, p, q, radius);
        let p2 = torus_knot_curve(u + 0.01, p, q, radius);

        let tangent = p2 - p1;
        let binormal = tangent.cross(p2 + p1).normalize();
        let normal = binormal.cross(tangent).normalize();

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * std::f32::consts::TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let vertex = p1 + normal * cx + binormal * cy;
            vertices.push(vertex);
            normals.push((vertex - p1).normalize_or_zero());
        }
    }

    let row = radial_segments + 1;
    let mut triangles = Vec::new();
    for j in 1..=tubular_segments {
        for i in 1..=radial_segments {
            let a = row * (j - 1) + (i - 1);
            let b = row * j + (i - 1);
            let c = row * j + i;
            let d = row * (j - 1) + i;
            triangles.push([a, b, d]);
            triangles.push([b, c, d]);
        }
    }

    WireMesh::from_triangles(&vertices, &normals, &triangles)
}

pub const STAR_RADIUS: f32 = 100.0;
pub const STAR_DEPTH: f32 = 50.0;
pub const STAR_FACTOR: f32 = 4.0;
const STAR_LIGHTNESS: f32 = 0.9;
const STAR_SEED: u64 = 0x5eed_57a2;

#[derive(Clone, Debug, Default)]
pub struct Starfield {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub sizes: Vec<f32>,
}

impl Starfield {
    /// Stars on shrinking shells from `radius + depth` inward, seeded so the
    /// sky looks the same on every load.
    pub fn generate(count: usize) -> Self {
        Self::generate_seeded(count, STAR_SEED)
    }

    fn generate_seeded(count: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut field = Self {
            positions: Vec::with_capacity(count * 3),
            colors: Vec::with_capacity(count * 3),
            sizes: Vec::with_capacity(count),
        };

        let increment = if count == 0 { 0.0 } else { STAR_DEPTH / count as f32 };
        let mut shell = STAR_RADIUS + STAR_DEPTH;

        for _ in 0..count {
            shell -= increment * rng.gen::<f32>();
            let phi = (1.0 - rng.gen::<f32>() * 2.0).clamp(-1.0, 1.0).acos();
            let theta = rng.gen::<f32>() * std::f32::consts::TAU;
            let ring = phi.sin() * shell;

            field
                .positions
                .extend_from_slice(&[ring * theta.sin(), phi.cos() * shell, ring * theta.cos()]);
            field.colors.extend_from_slice(&[STAR_LIGHTNESS; 3]);
            field
                .sizes
                .push((0.5 + 0.5 * rng.gen::<f32>()) * STAR_FACTOR);
        }

        field
    }

    pub fn star_count(&self) -> usize {
        self.sizes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn assert_closed(mesh_triangles: &[[u32; 3]]) {
        let mut uses: HashMap<(u32, u32), usize> = HashMap::new();
        for [a, b, c] in mesh_triangles {
            for (from, to) in [(*a, *b), (*b, *c), (*c, *a)] {
                *uses.entry((from.min(to), from.max(to))).or_default() += 1;
            }
        }
        assert!(uses.values().all(|count| *count == 2));
    }

    fn radii(mesh: &WireMesh) -> Vec<f32> {
        mesh.positions
            .chunks(3)
            .map(|v| Vec3::new(v[0], v[1], v[2]).length())
            .collect()
    }

    #[test]
    fn icosahedron_has_thirty_edges_on_the_sphere() {
        let mesh = icosahedron(1.0);

        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.edge_count(), 30);
        assert!(radii(&mesh).iter().all(|r| (r - 1.0).abs() < 1e-5));
    }

    #[test]
    fn dodecahedron_wireframe_includes_fan_diagonals() {
        let mesh = dodecahedron(2.0);

        assert_eq!(mesh.vertex_count(), 20);
        assert_eq!(mesh.edge_count(), 54);
        assert!(radii(&mesh).iter().all(|r| (r - 2.0).abs() < 1e-4));
    }

    #[test]
    fn polyhedron_tables_are_closed_surfaces() {
        assert_closed(&ICOSAHEDRON_TRIANGLES);
        assert_closed(&DODECAHEDRON_TRIANGLES);
    }

    #[test]
    fn line_indices_stay_in_bounds() {
        for mesh in [icosahedron(1.0), dodecahedron(1.0), torus_knot(3.0, 0.5, 16, 4, 2, 3)] {
            let count = mesh.vertex_count() as u32;
            assert!(mesh.lines.iter().all(|index| *index < count));
            assert_eq!(mesh.normals.len(), mesh.positions.len());
        }
    }

    #[test]
    fn torus_knot_grid_has_expected_size() {
        let mesh = torus_knot(3.0, 0.5, 128, 32, 2, 3);

        assert_eq!(mesh.vertex_count(), 129 * 33);
        // Each quad adds two sides and one diagonal; the last row and column close the grid.
        assert_eq!(mesh.edge_count(), 128 * 32 * 3 + 128 + 32);
    }

    #[test]
    fn torus_knot_vertices_sit_one_tube_radius_from_the_curve() {
        let mesh = torus_knot(3.0, 0.5, 32, 8, 2, 3);
        let first_center = torus_knot_curve(0.0, 2.0, 3.0, 3.0);
        let first = Vec3::new(mesh.positions[0], mesh.positions[1], mesh.positions[2]);

        assert!(((first - first_center).length() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn starfield_is_deterministic_and_within_shells() {
        let a = Starfield::generate(500);
        let b = Starfield::generate(500);

        assert_eq!(a.star_count(), 500);
        assert_eq!(a.positions, b.positions);

        for star in a.positions.chunks(3) {
            let r = Vec3::new(star[0], star[1], star[2]).length();
            assert!(r <= STAR_RADIUS + STAR_DEPTH + 1e-2);
            assert!(r >= STAR_RADIUS - 1e-2);
        }
        assert!(a.sizes.iter().all(|s| (2.0..=4.0).contains(s)));
    }

    #[test]
    fn seed_picks_the_sky() {
        let a = Starfield::generate_seeded(64, 1);
        let b = Starfield::generate_seeded(64, 2);

        assert_eq!(a.star_count(), b.star_count());
        assert_ne!(a.positions, b.positions);
    }

    #[test]
    fn empty_starfield_is_allowed() {
        assert_eq!(Starfield::generate(0).star_count(), 0);
    }
}
