//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and the scalar
//! state the Ricci flow solver and the embedder attach to it.
//!
//! # Overview
//!
//! [`HalfEdgeMesh`] holds the topology of a manifold triangle mesh as arenas
//! addressed by stable integer handles. [`RicciFlowMesh`] wraps it with the
//! per-vertex, per-edge, per-corner and per-face fields the algorithms read
//! and write.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`EdgeId`] - Identifies an undirected edge
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use ricciflow::mesh::{build_from_triangles, HalfEdgeMesh, RicciFlowMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! let state = RicciFlowMesh::new(mesh);
//! assert_eq!(state.topology().boundary_loops().len(), 1);
//! ```

mod boundary;
mod builder;
mod halfedge;
mod index;
pub mod primitives;
mod ricci;

pub use boundary::BoundaryLoop;
pub use builder::build_from_triangles;
pub use halfedge::{Edge, Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
pub use ricci::{EdgeState, RicciFlowMesh, VertexState, VertexTraits};
