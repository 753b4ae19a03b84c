//! Mesh construction from face-vertex lists.
//!
//! Handles are assigned deterministically: face `i` owns half-edges
//! `3i..3i+3`, edges are numbered in the order their first half-edge appears,
//! and boundary half-edges come last in the same order. Boundary-loop
//! discovery therefore does not depend on hashing order.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Edge, Face, HalfEdge, HalfEdgeMesh};
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and counter-clockwise triangles.
///
/// # Errors
///
/// - [`MeshError::EmptyMesh`] if there are no faces
/// - [`MeshError::InvalidVertexIndex`] / [`MeshError::DegenerateFace`] for bad faces
/// - [`MeshError::NonManifoldEdge`] if a directed edge is used twice
/// - [`MeshError::InvalidState`] if the boundary is not a set of simple loops
///
/// # Example
/// ```
/// use ricciflow::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_edges(), 3);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        if let Some(&vi) = face.iter().find(|&&vi| vi >= vertices.len()) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());
    let vertex_ids: Vec<VertexId<I>> = vertices.iter().map(|&p| mesh.add_vertex(p)).collect();

    // Directed edge (origin, dest) -> half-edge
    let mut directed: HashMap<(usize, usize), HalfEdgeId<I>> =
        HashMap::with_capacity(faces.len() * 3);

    for face in faces {
        let face_id = FaceId::<I>::new(mesh.num_faces());
        let base = mesh.num_halfedges();
        let hes = [
            HalfEdgeId::<I>::new(base),
            HalfEdgeId::<I>::new(base + 1),
            HalfEdgeId::<I>::new(base + 2),
        ];

        for i in 0..3 {
            let (a, b) = (face[i], face[(i + 1) % 3]);
            if directed.insert((a, b), hes[i]).is_some() {
                return Err(MeshError::NonManifoldEdge { v0: a, v1: b });
            }
            mesh.halfedges.push(HalfEdge {
                origin: vertex_ids[a],
                next: hes[(i + 1) % 3],
                prev: hes[(i + 2) % 3],
                face: face_id,
                ..HalfEdge::new()
            });
            mesh.vertex_mut(vertex_ids[a]).halfedge = hes[i];
        }

        mesh.faces.push(Face::new(hes[0]));
    }

    // Pair twins and create edges in half-edge order.
    let num_interior = mesh.num_halfedges();
    for i in 0..num_interior {
        let he = HalfEdgeId::<I>::new(i);
        if mesh.halfedge(he).twin.is_valid() {
            continue;
        }

        let a = mesh.origin(he).index();
        let b = mesh.origin(mesh.next(he)).index();

        let edge = EdgeId::<I>::new(mesh.num_edges());
        mesh.edges.push(Edge { halfedge: he });
        mesh.halfedge_mut(he).edge = edge;

        let twin = match directed.get(&(b, a)) {
            Some(&twin) => twin,
            None => {
                let boundary = HalfEdgeId::<I>::new(mesh.num_halfedges());
                mesh.halfedges.push(HalfEdge {
                    origin: vertex_ids[b],
                    ..HalfEdge::new()
                });
                boundary
            }
        };

        mesh.halfedge_mut(he).twin = twin;
        let t = mesh.halfedge_mut(twin);
        t.twin = he;
        t.edge = edge;
    }

    link_boundary_loops(&mut mesh, num_interior)?;
    fix_boundary_vertex_halfedges(&mut mesh);

    Ok(mesh)
}

/// Link boundary half-edges (those at positions `first..`) into loops.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, first: usize) -> Result<()> {
    let boundary: Vec<HalfEdgeId<I>> = (first..mesh.num_halfedges()).map(HalfEdgeId::new).collect();

    let mut outgoing: HashMap<VertexId<I>, HalfEdgeId<I>> = HashMap::with_capacity(boundary.len());
    for &he in &boundary {
        if outgoing.insert(mesh.origin(he), he).is_some() {
            return Err(MeshError::InvalidState(format!(
                "boundary passes through vertex {} more than once",
                mesh.origin(he).index()
            )));
        }
    }

    for &he in &boundary {
        let dest = mesh.dest(he);
        let next = *outgoing.get(&dest).ok_or_else(|| {
            MeshError::InvalidState(format!("open boundary at vertex {}", dest.index()))
        })?;
        mesh.halfedge_mut(he).next = next;
        mesh.halfedge_mut(next).prev = he;
    }

    Ok(())
}

/// Point boundary vertices at their outgoing boundary half-edge.
fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    for i in 0..mesh.num_vertices() {
        let vid = VertexId::<I>::new(i);
        let start = mesh.vertex(vid).halfedge;
        if !start.is_valid() {
            continue;
        }

        let mut he = start;
        loop {
            if mesh.is_boundary_halfedge(he) {
                mesh.vertex_mut(vid).halfedge = he;
                break;
            }
            he = mesh.next(mesh.twin(he));
            if he == start {
                break;
            }
        }
    }
}
