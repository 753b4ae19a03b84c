//! Target curvature policies.
//!
//! A policy writes `target_k` for every vertex. Policies that depend on the
//! metric (boundary circularization) read the current edge lengths, so the
//! solver calls them after lengths are up to date.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::{MeshError, Result};
use crate::mesh::{BoundaryLoop, HalfEdgeMesh, MeshIndex, RicciFlowMesh};

/// Assigns the curvature each vertex is driven toward.
pub trait TargetCurvature<I: MeshIndex> {
    /// Write `target_k` on every vertex of `mesh`.
    fn assign(&self, mesh: &mut RicciFlowMesh<I>) -> Result<()>;

    /// Whether the targets change with the edge lengths.
    ///
    /// Such targets go stale once `u` moves; solve them with
    /// [`SolveMethod::NewtonWithTargetRefresh`](super::SolveMethod::NewtonWithTargetRefresh).
    fn depends_on_metric(&self) -> bool {
        false
    }
}

/// Concentrate all curvature at feature corners.
///
/// Vertices incident to more than two sharp edges get `π/2`, every other
/// vertex gets 0. With four marked corners on a disk this maps the surface to
/// a rectangle. Sharp valences must have been computed, see
/// [`RicciFlowMesh::set_sharp_edges`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CornerConcentration;

impl<I: MeshIndex> TargetCurvature<I> for CornerConcentration {
    fn assign(&self, mesh: &mut RicciFlowMesh<I>) -> Result<()> {
        for v in mesh.vertices.iter_mut() {
            v.target_k = if v.valence > 2 { FRAC_PI_2 } else { 0.0 };
        }
        Ok(())
    }
}

/// Which boundary loop is mapped to the outer circle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OuterLoop {
    /// The loop with the greatest length in the input embedding.
    #[default]
    Longest,
    /// The first loop in discovery order.
    First,
    /// An explicit loop index in discovery order.
    Index(usize),
}

/// Make every boundary loop a round circle.
///
/// The outer loop receives a total turning of `+2π`, every other loop `-2π`,
/// distributed over the loop vertices in proportion to the average length of
/// the two boundary edges meeting there. Interior vertices get 0.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCircularization<I: MeshIndex = u32> {
    loops: Vec<BoundaryLoop<I>>,
    outer: usize,
}

impl<I: MeshIndex> BoundaryCircularization<I> {
    /// Extract the boundary loops of `mesh` and pick the outer one.
    ///
    /// # Errors
    ///
    /// [`MeshError::InvalidParameter`] if `outer` names a loop that does not
    /// exist. A closed mesh (no loops) is accepted and gets zero targets.
    pub fn new(mesh: &HalfEdgeMesh<I>, outer: OuterLoop) -> Result<Self> {
        let loops = mesh.boundary_loops();

        let outer = match outer {
            OuterLoop::First => 0,
            OuterLoop::Index(i) if i < loops.len() || (i == 0 && loops.is_empty()) => i,
            OuterLoop::Index(i) => {
                return Err(MeshError::invalid_param(
                    "outer_loop",
                    i,
                    "no boundary loop with this index",
                ))
            }
            OuterLoop::Longest => {
                let mut best = (0, f64::NEG_INFINITY);
                for (i, l) in loops.iter().enumerate() {
                    let len = l.length(mesh);
                    if len > best.1 {
                        best = (i, len);
                    }
                }
                best.0
            }
        };

        Ok(Self { loops, outer })
    }

    /// The boundary loops, in discovery order.
    pub fn loops(&self) -> &[BoundaryLoop<I>] {
        &self.loops
    }

    /// Index of the loop mapped to the outer circle.
    pub fn outer(&self) -> usize {
        self.outer
    }
}

impl<I: MeshIndex> TargetCurvature<I> for BoundaryCircularization<I> {
    fn depends_on_metric(&self) -> bool {
        true
    }

    fn assign(&self, mesh: &mut RicciFlowMesh<I>) -> Result<()> {
        for v in mesh.vertices.iter_mut() {
            v.target_k = 0.0;
        }

        for (id, boundary) in self.loops.iter().enumerate() {
            let hes = boundary.halfedges();
            let lengths: Vec<f64> = hes.iter().map(|&he| mesh.halfedge_length(he)).collect();
            let sum: f64 = lengths.iter().sum();
            let sign = if id == self.outer { 1.0 } else { -1.0 };

            for (i, &he) in hes.iter().enumerate() {
                let prev = lengths[(i + lengths.len() - 1) % lengths.len()];
                let local = (prev + lengths[i]) / 2.0;
                let v = mesh.topology.origin(he);
                mesh.vertices[v.index()].target_k = sign * 2.0 * PI * local / sum;
            }
        }
        Ok(())
    }
}

/// An explicit target curvature for every vertex, indexed by vertex handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Prescribed {
    targets: Vec<f64>,
}

impl Prescribed {
    /// Use the given per-vertex targets.
    pub fn new(targets: Vec<f64>) -> Self {
        Self { targets }
    }

    /// The per-vertex targets.
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }
}

impl<I: MeshIndex> TargetCurvature<I> for Prescribed {
    fn assign(&self, mesh: &mut RicciFlowMesh<I>) -> Result<()> {
        if self.targets.len() != mesh.vertices.len() {
            return Err(MeshError::invalid_param(
                "targets",
                self.targets.len(),
                "length must equal the vertex count",
            ));
        }
        for (v, &t) in mesh.vertices.iter_mut().zip(&self.targets) {
            v.target_k = t;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{primitives, VertexId};
    use std::f64::consts::FRAC_PI_3;

    #[test]
    fn test_corner_targets() {
        let (topo, sharp) = primitives::marked_square::<u32>(3);
        let mut mesh = RicciFlowMesh::new(topo);
        mesh.set_sharp_edges(sharp);
        CornerConcentration.assign(&mut mesh).unwrap();

        let corners: Vec<usize> = mesh
            .vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.target_k > 0.0)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(corners, vec![0, 3, 12, 15]);
        assert!((mesh.vertices.iter().map(|v| v.target_k).sum::<f64>() - 2.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_hexagon_circularization() {
        let mut mesh: RicciFlowMesh = primitives::hexagon_fan().into();
        let policy = BoundaryCircularization::new(mesh.topology(), OuterLoop::default()).unwrap();
        policy.assign(&mut mesh).unwrap();

        assert!(TargetCurvature::<u32>::depends_on_metric(&policy));
        assert!(!TargetCurvature::<u32>::depends_on_metric(&CornerConcentration));
        assert_eq!(mesh.vertex(VertexId::new(0)).target_k, 0.0);
        for i in 1..7 {
            assert!((mesh.vertex(VertexId::new(i)).target_k - FRAC_PI_3).abs() < 1e-12);
        }
    }

    #[test]
    fn test_annulus_signs_follow_outer_loop() {
        let mut mesh: RicciFlowMesh = primitives::annulus(12, 2, 0.5, 1.0).into();
        let policy = BoundaryCircularization::new(mesh.topology(), OuterLoop::Longest).unwrap();
        let outer = policy.outer();
        policy.assign(&mut mesh).unwrap();

        for (id, boundary) in policy.loops().iter().enumerate() {
            let total: f64 = boundary
                .vertices(mesh.topology())
                .map(|v| mesh.vertex(v).target_k)
                .sum();
            let expected = if id == outer { 2.0 * PI } else { -2.0 * PI };
            assert!((total - expected).abs() < 1e-9);
        }

        // The outer ring has radius 1.0, so it is not the first loop found.
        let first = BoundaryCircularization::new(mesh.topology(), OuterLoop::First).unwrap();
        assert_ne!(first.outer(), outer);
    }

    #[test]
    fn test_bad_outer_index() {
        let mesh: HalfEdgeMesh = primitives::hexagon_fan();
        let result = BoundaryCircularization::new(&mesh, OuterLoop::Index(3));
        assert!(matches!(result, Err(MeshError::InvalidParameter { .. })));
    }

    #[test]
    fn test_prescribed_length_mismatch() {
        let mut mesh: RicciFlowMesh = primitives::hexagon_fan().into();
        assert!(Prescribed::new(vec![0.0; 3]).assign(&mut mesh).is_err());
        Prescribed::new(vec![0.25; 7]).assign(&mut mesh).unwrap();
        assert_eq!(mesh.vertex(VertexId::new(4)).target_k, 0.25);
    }
}
