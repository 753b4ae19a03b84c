//! Planar coordinates exported from an embedded mesh.

use std::marker::PhantomData;

use nalgebra::Point2;

use super::circle::orient2d;
use crate::mesh::{FaceId, HalfEdgeMesh, MeshIndex, VertexId};

/// Planar coordinates for mesh vertices, indexed by vertex handle.
///
/// Obtained from [`RicciFlowMesh::uv_map`](crate::mesh::RicciFlowMesh::uv_map)
/// after an embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct UVMap<I: MeshIndex = u32> {
    coords: Vec<Point2<f64>>,
    _marker: PhantomData<I>,
}

impl<I: MeshIndex> UVMap<I> {
    /// Create a UV map; index `i` holds the coordinate of vertex `i`.
    pub fn new(coords: Vec<Point2<f64>>) -> Self {
        Self {
            coords,
            _marker: PhantomData,
        }
    }

    /// Get the coordinate of a vertex.
    #[inline]
    pub fn get(&self, v: VertexId<I>) -> Point2<f64> {
        self.coords[v.index()]
    }

    /// Get the number of coordinates.
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Iterate over all coordinates with their vertex IDs.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId<I>, Point2<f64>)> + '_ {
        self.coords
            .iter()
            .enumerate()
            .map(|(i, &uv)| (VertexId::new(i), uv))
    }

    /// Get the raw coordinates slice.
    pub fn as_slice(&self) -> &[Point2<f64>] {
        &self.coords
    }

    /// Compute the bounding box of the coordinates.
    ///
    /// Returns `None` if the map is empty.
    pub fn bounding_box(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        bounding_box(self.coords.iter().copied())
    }

    /// Signed area of a face in the plane; positive for counter-clockwise.
    pub fn signed_area(&self, mesh: &HalfEdgeMesh<I>, f: FaceId<I>) -> f64 {
        let [a, b, c] = mesh.face_triangle(f).map(|v| self.get(v));
        0.5 * orient2d(&a, &b, &c)
    }

    /// Smallest signed face area.
    pub fn min_signed_area(&self, mesh: &HalfEdgeMesh<I>) -> Option<f64> {
        mesh.face_ids()
            .map(|f| self.signed_area(mesh, f))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Check that every face keeps its counter-clockwise orientation.
    pub fn is_orientation_preserving(&self, mesh: &HalfEdgeMesh<I>) -> bool {
        mesh.face_ids().all(|f| self.signed_area(mesh, f) > 0.0)
    }

    /// Total unsigned area in the plane.
    pub fn total_area(&self, mesh: &HalfEdgeMesh<I>) -> f64 {
        mesh.face_ids().map(|f| self.signed_area(mesh, f).abs()).sum()
    }
}

/// Axis-aligned bounding box of a point set.
pub(crate) fn bounding_box(
    mut points: impl Iterator<Item = Point2<f64>>,
) -> Option<(Point2<f64>, Point2<f64>)> {
    let first = points.next()?;
    Some(points.fold((first, first), |(mut min, mut max), p| {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        (min, max)
    }))
}
