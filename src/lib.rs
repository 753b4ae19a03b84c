//! # ricciflow
//!
//! Discrete Ricci flow and isometric planar embedding for triangle meshes.
//!
//! The crate computes conformal parameterizations: it deforms a per-vertex
//! conformal factor until the discrete Gaussian curvature matches a target
//! (corners of a rectangle, round boundary circles, or any prescribed
//! values), then lays the resulting flat metric out in the plane.
//!
//! ## Features
//!
//! - **Half-edge data structure**: arena storage with type-safe indices and
//!   deterministic construction
//! - **Tangential circle-packing metric** with Newton (sparse Cholesky,
//!   conjugate gradient or SVD) and gradient flow solvers
//! - **Pluggable targets and metrics** through the [`TargetCurvature`] and
//!   [`FlowMetric`] traits
//! - **Breadth-first Euclidean embedding** normalized to the unit square
//!
//! [`TargetCurvature`]: algo::ricci::TargetCurvature
//! [`FlowMetric`]: algo::ricci::FlowMetric
//!
//! ## Quick Start
//!
//! ```
//! use ricciflow::prelude::*;
//!
//! let (topology, sharp) = primitives::marked_square::<u32>(4);
//! let mut mesh = RicciFlowMesh::new(topology);
//! mesh.set_sharp_edges(sharp);
//!
//! let result = tangential_extremal_length(
//!     &mut mesh,
//!     RicciFlowOptions::default(),
//!     EmbedOptions::default(),
//! )
//! .unwrap();
//! assert!(result.is_embedded());
//!
//! let rectangle = extremal_length(&mesh).unwrap();
//! println!("extremal length: {}", rectangle.ratio());
//! ```
//!
//! ## Step by Step
//!
//! ```
//! use ricciflow::prelude::*;
//!
//! let mut mesh: RicciFlowMesh = primitives::hexagon_fan().into();
//! let target = BoundaryCircularization::new(mesh.topology(), OuterLoop::Longest).unwrap();
//!
//! let options = RicciFlowOptions::default().with_method(SolveMethod::NewtonWithTargetRefresh);
//!
//! let mut flow = RicciFlow::new(&mut mesh, target, options).unwrap();
//! let report = flow.calculate_metric().unwrap();
//! assert!(report.converged);
//!
//! embed(&mut mesh, &EmbedOptions::default()).unwrap();
//! for v in mesh.topology().vertex_ids() {
//!     let uv = mesh.vertex(v).huv;
//!     assert!((0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y));
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use ricciflow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::embed::{embed, EmbedOptions, EmbedReport, Embedder, UVMap};
    pub use crate::algo::extremal::{
        extremal_length, tangential_circle_domain, tangential_extremal_length, ExtremalLength,
        Parameterization,
    };
    pub use crate::algo::progress::Progress;
    pub use crate::algo::ricci::{
        BoundaryCircularization, CornerConcentration, LinearSolver, OuterLoop, Prescribed, RicciFlow,
        RicciFlowOptions, SolveMethod, SolveReport,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, primitives, EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex,
        RicciFlowMesh, VertexId, VertexTraits,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_annulus_circle_domain() {
        let mut mesh: RicciFlowMesh = primitives::annulus(16, 3, 0.5, 1.0).into();
        let result = tangential_circle_domain(
            &mut mesh,
            OuterLoop::Longest,
            RicciFlowOptions::default(),
            EmbedOptions::default(),
        )
        .unwrap();
        assert!(result.solve.converged);
        assert!(result.is_embedded());

        // Gauss-Bonnet on an annulus: total curvature vanishes.
        assert!(mesh.total_curvature().abs() < 1e-9);
        // Outer and inner boundaries turn by +2pi and -2pi.
        let loops = mesh.topology().boundary_loops();
        let totals: Vec<f64> = loops
            .iter()
            .map(|l| l.vertices(mesh.topology()).map(|v| mesh.vertex(v).k).sum())
            .collect();
        assert!(totals.iter().any(|t| (t - 2.0 * PI).abs() < 1e-2));
        assert!(totals.iter().any(|t| (t + 2.0 * PI).abs() < 1e-2));
    }
}
