//! Scalar state carried by a mesh during a Ricci flow solve and embedding.
//!
//! [`RicciFlowMesh`] owns a [`HalfEdgeMesh`] and one state record per vertex,
//! edge, half-edge corner and face, addressed by the same handles as the
//! topology. The metric solver and the embedder borrow it mutably and only
//! ever write these scalar fields; the topology is never modified.

use std::f64::consts::PI;
use std::fmt::Write as _;

use nalgebra::Point2;

use super::halfedge::HalfEdgeMesh;
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::algo::embed::UVMap;

/// Which vertex fields are exported by [`RicciFlowMesh::vertex_attribute_string`].
///
/// This is a per-mesh configuration value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexTraits {
    /// Export the planar coordinate as `uv=(x y)`.
    pub uv: bool,
    /// Export the conformal factor as `u=(..)`.
    pub conformal_factor: bool,
    /// Export the discrete curvature as `k=(..)`.
    pub curvature: bool,
    /// Export the target curvature as `target_k=(..)`.
    pub target_curvature: bool,
}

impl VertexTraits {
    /// Enable the `uv` field.
    pub fn with_uv(mut self) -> Self {
        self.uv = true;
        self
    }

    /// Enable the `u` field.
    pub fn with_conformal_factor(mut self) -> Self {
        self.conformal_factor = true;
        self
    }

    /// Enable the `k` and `target_k` fields.
    pub fn with_curvature(mut self) -> Self {
        self.curvature = true;
        self.target_curvature = true;
        self
    }
}

/// Per-vertex state.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexState {
    /// Conformal factor; `exp(u)` is the circle-packing radius.
    pub u: f64,
    /// Discrete Gaussian curvature (angle deficit).
    pub k: f64,
    /// Curvature the solve drives this vertex toward.
    pub target_k: f64,
    /// Dense row/column of this vertex in the Hessian.
    pub idx: usize,
    /// Set once the vertex has a planar position.
    pub touched: bool,
    /// Planar coordinate produced by the embedding.
    pub huv: Point2<f64>,
    /// Number of incident sharp edges.
    pub valence: usize,
    boundary: bool,
}

impl VertexState {
    fn new(idx: usize, boundary: bool) -> Self {
        Self {
            u: 0.0,
            k: 0.0,
            target_k: 0.0,
            idx,
            touched: false,
            huv: Point2::origin(),
            valence: 0,
            boundary,
        }
    }

    /// Whether the vertex lies on the mesh boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.boundary
    }

    /// Flat angle sum: `π` on the boundary, `2π` inside.
    #[inline]
    pub fn flat_angle(&self) -> f64 {
        if self.boundary {
            PI
        } else {
            2.0 * PI
        }
    }
}

/// Per-edge state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeState {
    /// Length under the current metric.
    pub length: f64,
    /// Off-diagonal conductance of the Hessian.
    pub weight: f64,
    /// Feature edge flag.
    pub sharp: bool,
}

/// A half-edge mesh carrying Ricci flow state.
#[derive(Debug, Clone)]
pub struct RicciFlowMesh<I: MeshIndex = u32> {
    pub(crate) topology: HalfEdgeMesh<I>,
    pub(crate) vertices: Vec<VertexState>,
    pub(crate) edges: Vec<EdgeState>,
    /// Corner angle at the origin of each half-edge; 0 on boundary half-edges.
    pub(crate) angles: Vec<f64>,
    pub(crate) face_touched: Vec<bool>,
    traits: VertexTraits,
}

impl<I: MeshIndex> RicciFlowMesh<I> {
    /// Attach fresh state to a mesh with the default vertex traits.
    pub fn new(mesh: HalfEdgeMesh<I>) -> Self {
        Self::with_traits(mesh, VertexTraits::default())
    }

    /// Attach fresh state to a mesh.
    ///
    /// Edge lengths start at the Euclidean lengths of the input embedding.
    pub fn with_traits(mesh: HalfEdgeMesh<I>, traits: VertexTraits) -> Self {
        let vertices = mesh
            .vertex_ids()
            .map(|v| VertexState::new(v.index(), mesh.is_boundary_vertex(v)))
            .collect();
        let edges = mesh
            .edge_ids()
            .map(|e| EdgeState {
                length: mesh.edge_length(e),
                ..EdgeState::default()
            })
            .collect();

        Self {
            vertices,
            edges,
            angles: vec![0.0; mesh.num_halfedges()],
            face_touched: vec![false; mesh.num_faces()],
            topology: mesh,
            traits,
        }
    }

    /// The underlying topology.
    #[inline]
    pub fn topology(&self) -> &HalfEdgeMesh<I> {
        &self.topology
    }

    /// Drop the state and return the topology.
    pub fn into_inner(self) -> HalfEdgeMesh<I> {
        self.topology
    }

    /// The vertex export configuration.
    pub fn traits(&self) -> VertexTraits {
        self.traits
    }

    /// Replace the vertex export configuration.
    pub fn set_traits(&mut self, traits: VertexTraits) {
        self.traits = traits;
    }

    /// State of a vertex.
    #[inline]
    pub fn vertex(&self, v: VertexId<I>) -> &VertexState {
        &self.vertices[v.index()]
    }

    /// Mutable state of a vertex.
    #[inline]
    pub fn vertex_mut(&mut self, v: VertexId<I>) -> &mut VertexState {
        &mut self.vertices[v.index()]
    }

    /// State of an edge.
    #[inline]
    pub fn edge(&self, e: EdgeId<I>) -> &EdgeState {
        &self.edges[e.index()]
    }

    /// Mutable state of an edge.
    #[inline]
    pub fn edge_mut(&mut self, e: EdgeId<I>) -> &mut EdgeState {
        &mut self.edges[e.index()]
    }

    /// Corner angle at the origin of a half-edge, inside its face.
    #[inline]
    pub fn corner_angle(&self, he: HalfEdgeId<I>) -> f64 {
        self.angles[he.index()]
    }

    /// Whether a face has been reached by the embedding traversal.
    #[inline]
    pub fn face_touched(&self, f: FaceId<I>) -> bool {
        self.face_touched[f.index()]
    }

    /// Length of the edge under a half-edge.
    #[inline]
    pub fn halfedge_length(&self, he: HalfEdgeId<I>) -> f64 {
        self.edges[self.topology.edge_of(he).index()].length
    }

    /// Mark the given edges as sharp and recount sharp valences.
    pub fn set_sharp_edges(&mut self, sharp: impl IntoIterator<Item = EdgeId<I>>) {
        for e in sharp {
            self.edges[e.index()].sharp = true;
        }
        self.update_valence();
    }

    /// Recount, for every vertex, the sharp edges incident to it.
    pub fn update_valence(&mut self) {
        let topo = &self.topology;
        for v in topo.vertex_ids() {
            self.vertices[v.index()].valence = topo
                .vertex_edges(v)
                .filter(|e| self.edges[e.index()].sharp)
                .count();
        }
    }

    /// Sum of the vertex curvatures.
    pub fn total_curvature(&self) -> f64 {
        self.vertices.iter().map(|v| v.k).sum()
    }

    /// Snapshot of the planar coordinates.
    pub fn uv_map(&self) -> UVMap<I> {
        UVMap::new(self.vertices.iter().map(|v| v.huv).collect())
    }

    /// Vertex attributes selected by the [`VertexTraits`], e.g. `uv=(0.5 0.25) u=(0.1)`.
    pub fn vertex_attribute_string(&self, v: VertexId<I>) -> String {
        let state = self.vertex(v);
        let mut out = String::new();
        let mut field = |args: std::fmt::Arguments<'_>| {
            if !out.is_empty() {
                out.push(' ');
            }
            // Writing into a String cannot fail.
            let _ = out.write_fmt(args);
        };

        if self.traits.uv {
            field(format_args!("uv=({} {})", state.huv.x, state.huv.y));
        }
        if self.traits.conformal_factor {
            field(format_args!("u=({})", state.u));
        }
        if self.traits.curvature {
            field(format_args!("k=({})", state.k));
        }
        if self.traits.target_curvature {
            field(format_args!("target_k=({})", state.target_k));
        }
        out
    }
}

impl<I: MeshIndex> From<HalfEdgeMesh<I>> for RicciFlowMesh<I> {
    fn from(mesh: HalfEdgeMesh<I>) -> Self {
        Self::new(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives;

    #[test]
    fn test_initial_state() {
        let mesh: RicciFlowMesh = primitives::hexagon_fan().into();
        assert_eq!(mesh.vertices.len(), 7);
        assert!(!mesh.vertex(VertexId::new(0)).is_boundary());
        assert!(mesh.vertex(VertexId::new(3)).is_boundary());
        for (i, v) in mesh.vertices.iter().enumerate() {
            assert_eq!(v.idx, i);
            assert_eq!(v.u, 0.0);
        }
        for e in mesh.topology().edge_ids() {
            assert!((mesh.edge(e).length - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sharp_valence() {
        let (topo, sharp) = primitives::marked_square::<u32>(3);
        let mut mesh = RicciFlowMesh::new(topo);
        mesh.set_sharp_edges(sharp);

        assert_eq!(mesh.vertex(VertexId::new(0)).valence, 3);
        assert_eq!(mesh.vertex(VertexId::new(1)).valence, 2);
        assert_eq!(mesh.vertex(VertexId::new(5)).valence, 1);
    }

    #[test]
    fn test_vertex_attribute_string() {
        let mut mesh: RicciFlowMesh = primitives::hexagon_fan().into();
        let v = VertexId::new(2);
        assert_eq!(mesh.vertex_attribute_string(v), "");

        mesh.vertex_mut(v).huv = Point2::new(0.5, 0.25);
        mesh.vertex_mut(v).u = -1.5;
        mesh.set_traits(VertexTraits::default().with_uv().with_conformal_factor());
        assert_eq!(mesh.vertex_attribute_string(v), "uv=(0.5 0.25) u=(-1.5)");
    }
}
