//! Isometric layout of a flat metric in the Euclidean plane.

use nalgebra::Point2;

use super::circle::{intersect, orient2d, Circle, CircleIntersection};
use super::EmbedStrategy;
use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, MeshIndex, RicciFlowMesh, VertexId};

/// Places triangles with straight edges of the solved lengths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EuclideanEmbed;

/// Position of the apex `c` over the placed base `a -> b`, on its left side.
///
/// `ac` and `bc` are the lengths of the two sides meeting at `c`.
fn place_apex(
    a: Point2<f64>,
    b: Point2<f64>,
    ac: f64,
    bc: f64,
    face: usize,
) -> Result<Point2<f64>> {
    match intersect(&Circle::new(a, ac), &Circle::new(b, bc)) {
        CircleIntersection::None => Err(MeshError::NonEmbeddableFace { face }),
        CircleIntersection::Tangent(p) => Ok(p),
        CircleIntersection::Two(p, q) => {
            if orient2d(&a, &b, &p) > 0.0 {
                Ok(p)
            } else {
                Ok(q)
            }
        }
    }
}

impl<I: MeshIndex> EmbedStrategy<I> for EuclideanEmbed {
    fn embed_first_face(&self, mesh: &mut RicciFlowMesh<I>, f: FaceId<I>) -> Result<()> {
        let [h0, h1, h2] = mesh.topology.face_halfedge_triple(f);
        let [a, b, c] = mesh.topology.face_triangle(f);

        let pa = Point2::origin();
        let pb = Point2::new(mesh.halfedge_length(h0), 0.0);
        // h2 runs c -> a and h1 runs b -> c.
        let pc = place_apex(pa, pb, mesh.halfedge_length(h2), mesh.halfedge_length(h1), f.index())?;

        for (v, p) in [(a, pa), (b, pb), (c, pc)] {
            let state = mesh.vertex_mut(v);
            state.huv = p;
            state.touched = true;
        }
        Ok(())
    }

    fn embed_face(&self, mesh: &mut RicciFlowMesh<I>, f: FaceId<I>) -> Result<()> {
        let hes = mesh.topology.face_halfedge_triple(f);
        let av: [VertexId<I>; 3] = hes.map(|he| mesh.topology.origin(he));

        let Some(i) = (0..3).find(|&i| !mesh.vertex(av[i]).touched) else {
            return Ok(());
        };
        let (c, a, b) = (av[i], av[(i + 1) % 3], av[(i + 2) % 3]);

        // hes[i] runs c -> a and hes[i + 2] runs b -> c.
        let ac = mesh.halfedge_length(hes[i]);
        let bc = mesh.halfedge_length(hes[(i + 2) % 3]);
        let (pa, pb) = (mesh.vertex(a).huv, mesh.vertex(b).huv);

        let pc = place_apex(pa, pb, ac, bc, f.index())?;
        let state = mesh.vertex_mut(c);
        state.huv = pc;
        state.touched = true;
        Ok(())
    }
}
