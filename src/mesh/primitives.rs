//! Small procedural meshes.
//!
//! These cover the canonical inputs of the metric solver: a flat one-ring, a
//! rectangle-like disk, an annulus, and a square disk whose four corners are
//! marked by sharp edges.

use std::f64::consts::PI;

use nalgebra::Point3;

use super::builder::build_from_triangles;
use super::halfedge::HalfEdgeMesh;
use super::index::{EdgeId, MeshIndex, VertexId};

/// A regular unit hexagon split into six triangles around a center vertex.
///
/// Vertex 0 is the center; vertices 1..=6 lie on the unit circle.
pub fn hexagon_fan<I: MeshIndex>() -> HalfEdgeMesh<I> {
    let mut vertices = vec![Point3::origin()];
    for k in 0..6 {
        let theta = k as f64 * PI / 3.0;
        vertices.push(Point3::new(theta.cos(), theta.sin(), 0.0));
    }
    let faces: Vec<[usize; 3]> = (0..6).map(|k| [0, k + 1, (k + 1) % 6 + 1]).collect();

    // The input is a fixed, valid triangulation.
    build_from_triangles(&vertices, &faces).unwrap_or_default()
}

/// A planar `nx` by `ny` grid of unit cells, two triangles per cell.
///
/// Vertex `(i, j)` has index `j * (nx + 1) + i`.
pub fn grid<I: MeshIndex>(nx: usize, ny: usize) -> HalfEdgeMesh<I> {
    let (vertices, faces) = grid_triangles(nx.max(1), ny.max(1), |_, _| true);
    build_from_triangles(&vertices, &faces).unwrap_or_default()
}

/// A planar annulus with `segments` vertices per ring and `rings` layers of cells.
///
/// Vertex `(r, s)` has index `r * segments + s`; ring 0 has radius `r_inner`.
pub fn annulus<I: MeshIndex>(
    segments: usize,
    rings: usize,
    r_inner: f64,
    r_outer: f64,
) -> HalfEdgeMesh<I> {
    let segments = segments.max(3);
    let rings = rings.max(1);

    let mut vertices = Vec::with_capacity((rings + 1) * segments);
    for r in 0..=rings {
        let radius = r_inner + (r_outer - r_inner) * r as f64 / rings as f64;
        for s in 0..segments {
            let theta = 2.0 * PI * s as f64 / segments as f64;
            vertices.push(Point3::new(radius * theta.cos(), radius * theta.sin(), 0.0));
        }
    }

    let idx = |r: usize, s: usize| r * segments + s % segments;
    let mut faces = Vec::with_capacity(2 * rings * segments);
    for r in 0..rings {
        for s in 0..segments {
            let (v00, v10) = (idx(r, s), idx(r, s + 1));
            let (v01, v11) = (idx(r + 1, s), idx(r + 1, s + 1));
            faces.push([v00, v01, v11]);
            faces.push([v00, v11, v10]);
        }
    }

    build_from_triangles(&vertices, &faces).unwrap_or_default()
}

/// A regular tetrahedron-like closed surface.
pub fn tetrahedron<I: MeshIndex>() -> HalfEdgeMesh<I> {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.5, 1.0, 0.0),
        Point3::new(0.5, 0.5, 1.0),
    ];
    let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
    build_from_triangles(&vertices, &faces).unwrap_or_default()
}

/// An `n` by `n` square disk with its four corners marked by sharp edges.
///
/// The returned edges are every boundary edge plus the diagonal leaving each
/// corner, so exactly the four corner vertices are incident to three sharp
/// edges. `n` is clamped to at least 3 so the corner diagonals do not share
/// an interior endpoint.
pub fn marked_square<I: MeshIndex>(n: usize) -> (HalfEdgeMesh<I>, Vec<EdgeId<I>>) {
    let n = n.max(3);
    // Corner cells must be split by the diagonal through the corner.
    let (vertices, faces) = grid_triangles(n, n, |i, j| (2 * i < n) == (2 * j < n));
    let mesh: HalfEdgeMesh<I> = build_from_triangles(&vertices, &faces).unwrap_or_default();

    let at = |i: usize, j: usize| VertexId::<I>::new(j * (n + 1) + i);
    let diagonals = [
        (at(0, 0), at(1, 1)),
        (at(n, 0), at(n - 1, 1)),
        (at(n, n), at(n - 1, n - 1)),
        (at(0, n), at(1, n - 1)),
    ];

    let mut sharp: Vec<EdgeId<I>> = mesh.edge_ids().filter(|&e| mesh.is_boundary_edge(e)).collect();
    sharp.extend(diagonals.iter().filter_map(|&(a, b)| mesh.find_edge(a, b)));

    (mesh, sharp)
}

fn grid_triangles(
    nx: usize,
    ny: usize,
    main_diagonal: impl Fn(usize, usize) -> bool,
) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    let mut faces = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let v00 = j * (nx + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (nx + 1);
            let v11 = v01 + 1;

            if main_diagonal(i, j) {
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            } else {
                faces.push([v00, v10, v01]);
                faces.push([v10, v11, v01]);
            }
        }
    }

    (vertices, faces)
}
