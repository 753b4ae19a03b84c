//! Half-edge mesh data structure.
//!
//! The mesh is a set of arenas (vertices, half-edges, edges, faces) linked by
//! typed integer handles. Every undirected edge is a pair of twin half-edges
//! and an [`Edge`] record; every face is a triangle of three half-edges linked
//! counter-clockwise by `next`.
//!
//! # Boundary Handling
//!
//! Boundary half-edges carry an invalid face handle. They are linked into
//! closed loops through `next`/`prev`, so a boundary loop can be walked like a
//! face. Each boundary vertex stores an outgoing boundary half-edge, which
//! makes the one-ring iteration around it visit every incident edge exactly
//! once.

use nalgebra::Point3;

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge; a boundary half-edge for boundary vertices.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new isolated vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A directed half-edge.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The opposite half-edge.
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to. Invalid on the boundary.
    pub face: FaceId<I>,

    /// The undirected edge this half-edge is one side of.
    pub edge: EdgeId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
            edge: EdgeId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// An undirected edge.
#[derive(Debug, Clone, Copy)]
pub struct Edge<I: MeshIndex = u32> {
    /// One of the two half-edges; always the one that belongs to a face.
    pub halfedge: HalfEdgeId<I>,
}

/// A triangular face.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// The first half-edge of the face in counter-clockwise order.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self { halfedge }
    }
}

/// A half-edge triangle mesh.
///
/// Topology is fixed once the mesh has been built; algorithms attach their own
/// per-entity state keyed by the handles (see
/// [`RicciFlowMesh`](super::RicciFlowMesh)).
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) edges: Vec<Edge<I>>,
    pub(crate) faces: Vec<Face<I>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // E is about 3F/2 for a closed surface, plus some boundary slack.
        let num_edges = num_faces * 3 / 2 + num_faces / 4 + 3;
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_edges * 2),
            edges: Vec::with_capacity(num_edges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Counts ====================

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edges, boundary half-edges included.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Euler characteristic `V - E + F`.
    pub fn euler_characteristic(&self) -> i64 {
        self.num_vertices() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }

    // ==================== Element Access ====================

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        &self.edges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    // ==================== Navigation ====================

    /// The opposite half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// The next half-edge counter-clockwise within the face (or boundary loop).
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// The previous half-edge within the face (or boundary loop).
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// The origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// The target vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(he))
    }

    /// The face of a half-edge (invalid on the boundary).
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// The undirected edge a half-edge belongs to.
    #[inline]
    pub fn edge_of(&self, he: HalfEdgeId<I>) -> EdgeId<I> {
        self.halfedge(he).edge
    }

    /// The face across a half-edge, if any.
    #[inline]
    pub fn opposite_face(&self, he: HalfEdgeId<I>) -> Option<FaceId<I>> {
        let f = self.face_of(self.twin(he));
        f.is_valid().then_some(f)
    }

    /// The two half-edges of an edge; the first one always has a face.
    #[inline]
    pub fn edge_halfedges(&self, e: EdgeId<I>) -> [HalfEdgeId<I>; 2] {
        let he = self.edge(e).halfedge;
        [he, self.twin(he)]
    }

    /// The two endpoints of an edge.
    #[inline]
    pub fn edge_vertices(&self, e: EdgeId<I>) -> [VertexId<I>; 2] {
        let he = self.edge(e).halfedge;
        [self.origin(he), self.dest(he)]
    }

    /// Find the edge connecting two vertices.
    pub fn find_edge(&self, a: VertexId<I>, b: VertexId<I>) -> Option<EdgeId<I>> {
        self.vertex_halfedges(a)
            .find(|&he| self.dest(he) == b)
            .map(|he| self.edge_of(he))
    }

    // ==================== Boundary Queries ====================

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if an edge lies on the boundary.
    #[inline]
    pub fn is_boundary_edge(&self, e: EdgeId<I>) -> bool {
        let [a, b] = self.edge_halfedges(e);
        self.is_boundary_halfedge(a) || self.is_boundary_halfedge(b)
    }

    /// Check if a vertex is on the boundary.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        let he = self.vertex(v).halfedge;
        // Boundary vertices are normalized to point at a boundary half-edge.
        !he.is_valid() || self.is_boundary_halfedge(he)
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over the outgoing half-edges of a vertex.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.dest(he))
    }

    /// Iterate over edges incident to a vertex.
    pub fn vertex_edges(&self, v: VertexId<I>) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.edge_of(he))
    }

    /// Iterate over faces incident to a vertex.
    pub fn vertex_faces(&self, v: VertexId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.vertex_halfedges(v)
            .map(|he| self.face_of(he))
            .filter(|f| f.is_valid())
    }

    /// Iterate over the half-edges of a face in counter-clockwise order.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over the edges of a face.
    pub fn face_edges(&self, f: FaceId<I>) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.edge_of(he))
    }

    /// Iterate over the faces sharing an edge with a face.
    pub fn face_neighbors(&self, f: FaceId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.face_halfedges(f).filter_map(|he| self.opposite_face(he))
    }

    /// The three half-edges of a triangle in counter-clockwise order.
    pub fn face_halfedge_triple(&self, f: FaceId<I>) -> [HalfEdgeId<I>; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [he0, he1, he2]
    }

    /// The three vertices of a triangle in counter-clockwise order.
    pub fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        let [he0, he1, he2] = self.face_halfedge_triple(f);
        [self.origin(he0), self.origin(he1), self.origin(he2)]
    }

    // ==================== Geometry ====================

    /// Euclidean length of an edge in the input embedding.
    pub fn edge_length(&self, e: EdgeId<I>) -> f64 {
        let [a, b] = self.edge_vertices(e);
        (self.position(b) - self.position(a)).norm()
    }

    /// Area of a face in the input embedding.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let [a, b, c] = self.face_triangle(f);
        let e1 = self.position(b) - self.position(a);
        let e2 = self.position(c) - self.position(a);
        0.5 * e1.cross(&e2).norm()
    }

    // ==================== Construction ====================

    /// Add a new isolated vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    // ==================== Validation ====================

    /// Check that all connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        for v in self.vertex_ids() {
            let he = self.vertex(v).halfedge;
            if he.is_valid() && self.origin(he) != v {
                return false;
            }
        }

        for he in self.halfedge_ids() {
            let h = self.halfedge(he);
            if !h.twin.is_valid() || self.twin(h.twin) != he {
                return false;
            }
            if h.next.is_valid() && self.prev(h.next) != he {
                return false;
            }
            if h.prev.is_valid() && self.next(h.prev) != he {
                return false;
            }
            if !h.edge.is_valid() || self.edge_of(h.twin) != h.edge {
                return false;
            }
        }

        for e in self.edge_ids() {
            let he = self.edge(e).halfedge;
            if self.edge_of(he) != e || self.is_boundary_halfedge(he) {
                return false;
            }
        }

        self.face_ids().all(|f| {
            let he = self.face(f).halfedge;
            he.is_valid() && self.face_of(he) == f && self.face_halfedges(f).count() == 3
        })
    }
}

/// Iterator over the outgoing half-edges of a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        // twin(v -> w) is w -> v; the half-edge after it leaves v again.
        self.current = self.mesh.next(self.mesh.twin(self.current));
        if self.current == self.start || !self.current.is_valid() {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over the half-edges of a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);
        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;

    fn two_triangles() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2], [1, 0, 3]]).unwrap()
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_edges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_edge_queries() {
        let mesh = two_triangles();
        assert_eq!(mesh.num_edges(), 5);

        let shared = mesh.find_edge(VertexId::new(0), VertexId::new(1)).unwrap();
        assert_eq!(
            mesh.find_edge(VertexId::new(1), VertexId::new(0)),
            Some(shared)
        );
        assert!(!mesh.is_boundary_edge(shared));
        assert!(mesh.find_edge(VertexId::new(2), VertexId::new(3)).is_none());

        let [a, b] = mesh.edge_vertices(shared);
        let mut ends = [a.index(), b.index()];
        ends.sort();
        assert_eq!(ends, [0, 1]);
        assert!((mesh.edge_length(shared) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_one_ring_visits_every_edge_once() {
        let mesh = two_triangles();
        let v0 = VertexId::new(0);
        let mut neighbors: Vec<usize> = mesh.vertex_neighbors(v0).map(|v| v.index()).collect();
        neighbors.sort();
        assert_eq!(neighbors, vec![1, 2, 3]);
        assert_eq!(mesh.vertex_faces(v0).count(), 2);
        assert_eq!(mesh.vertex_edges(v0).count(), 3);
    }

    #[test]
    fn test_face_neighbors() {
        let mesh = two_triangles();
        let f0 = FaceId::new(0);
        let neighbors: Vec<_> = mesh.face_neighbors(f0).collect();
        assert_eq!(neighbors, vec![FaceId::new(1)]);
        assert_eq!(mesh.face_edges(f0).count(), 3);
    }

    #[test]
    fn test_euler_characteristic() {
        let mesh = two_triangles();
        // Disk: 4 - 5 + 2
        assert_eq!(mesh.euler_characteristic(), 1);
    }
}
