//! Boundary loop extraction.

use super::halfedge::HalfEdgeMesh;
use super::index::{HalfEdgeId, MeshIndex, VertexId};

/// One connected component of the mesh boundary.
///
/// Stores the boundary half-edges (those without a face) in walking order.
/// Half-edge `i` starts at vertex `i` of the loop; `next` of the last one is
/// the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop<I: MeshIndex = u32> {
    halfedges: Vec<HalfEdgeId<I>>,
}

impl<I: MeshIndex> BoundaryLoop<I> {
    /// The boundary half-edges in walking order.
    pub fn halfedges(&self) -> &[HalfEdgeId<I>] {
        &self.halfedges
    }

    /// Number of edges (equivalently, vertices) on the loop.
    pub fn len(&self) -> usize {
        self.halfedges.len()
    }

    /// Check if the loop is empty.
    pub fn is_empty(&self) -> bool {
        self.halfedges.is_empty()
    }

    /// The loop vertices in walking order.
    pub fn vertices<'a>(&'a self, mesh: &'a HalfEdgeMesh<I>) -> impl Iterator<Item = VertexId<I>> + 'a {
        self.halfedges.iter().map(move |&he| mesh.origin(he))
    }

    /// Total length of the loop in the input embedding.
    pub fn length(&self, mesh: &HalfEdgeMesh<I>) -> f64 {
        self.halfedges
            .iter()
            .map(|&he| mesh.edge_length(mesh.edge_of(he)))
            .sum()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Extract all boundary loops.
    ///
    /// Loops are returned in discovery order: sorted by their lowest boundary
    /// half-edge handle. Each loop starts at that half-edge.
    pub fn boundary_loops(&self) -> Vec<BoundaryLoop<I>> {
        let mut visited = vec![false; self.num_halfedges()];
        let mut loops = Vec::new();

        for start in self.halfedge_ids() {
            if visited[start.index()] || !self.is_boundary_halfedge(start) {
                continue;
            }

            let mut halfedges = Vec::new();
            let mut he = start;
            while !visited[he.index()] {
                visited[he.index()] = true;
                halfedges.push(he);
                he = self.next(he);
            }
            loops.push(BoundaryLoop { halfedges });
        }

        loops
    }
}
