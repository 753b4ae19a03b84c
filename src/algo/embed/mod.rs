//! Planar embedding of a solved metric.
//!
//! The embedder lays the mesh out face by face: the root face is placed
//! directly, then a breadth-first traversal of the face adjacency graph
//! places, for every further face, its one vertex that is not yet placed, by
//! intersecting two circles around the placed vertices whose radii are the
//! solved edge lengths. Finally the layout is translated and uniformly scaled
//! into the unit square.
//!
//! # Example
//!
//! ```
//! use ricciflow::algo::embed::{embed, EmbedOptions};
//! use ricciflow::algo::ricci::{CornerConcentration, RicciFlow, RicciFlowOptions};
//! use ricciflow::mesh::{primitives, RicciFlowMesh};
//!
//! let (topology, sharp) = primitives::marked_square::<u32>(4);
//! let mut mesh = RicciFlowMesh::new(topology);
//! mesh.set_sharp_edges(sharp);
//!
//! let mut flow = RicciFlow::new(&mut mesh, CornerConcentration, RicciFlowOptions::default()).unwrap();
//! assert!(flow.calculate_metric().unwrap().converged);
//!
//! embed(&mut mesh, &EmbedOptions::default()).unwrap();
//! assert!(mesh.uv_map().is_orientation_preserving(mesh.topology()));
//! ```

mod circle;
mod euclidean;
mod uv;

pub use circle::{intersect, orient2d, Circle, CircleIntersection};
pub use euclidean::EuclideanEmbed;
pub use uv::UVMap;

use std::collections::VecDeque;

use nalgebra::Point2;

use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, MeshIndex, RicciFlowMesh};

/// Places faces in a target geometry.
pub trait EmbedStrategy<I: MeshIndex> {
    /// Place all three vertices of the root face and mark them touched.
    fn embed_first_face(&self, mesh: &mut RicciFlowMesh<I>, f: FaceId<I>) -> Result<()>;

    /// Place the untouched vertex of a face whose other two vertices are
    /// placed. A face without untouched vertices is left as is.
    fn embed_face(&self, mesh: &mut RicciFlowMesh<I>, f: FaceId<I>) -> Result<()>;
}

/// Options for the embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedOptions {
    /// Index of the face placed first; the first face when `None`.
    pub root_face: Option<usize>,

    /// Translate and scale the layout into `[0, 1]²`.
    pub normalize: bool,

    /// Skip normalization when the larger side of the bounding box is not
    /// above this value.
    pub min_range: f64,

    /// When normalizing, rescale the metric too: `u -= ln(range)` and every
    /// edge length is divided by `range`.
    pub rescale_metric: bool,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            root_face: None,
            normalize: true,
            min_range: 1e-6,
            rescale_metric: true,
        }
    }
}

impl EmbedOptions {
    /// Place the given face first.
    pub fn with_root_face(mut self, face: usize) -> Self {
        self.root_face = Some(face);
        self
    }

    /// Enable or disable normalization into the unit square.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Enable or disable rescaling of the metric during normalization.
    pub fn with_rescale_metric(mut self, rescale: bool) -> Self {
        self.rescale_metric = rescale;
        self
    }
}

/// Outcome of an embedding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbedReport {
    /// Number of faces laid out.
    pub faces_embedded: usize,
    /// Larger side of the layout's bounding box before normalization.
    pub range: f64,
    /// Whether the layout was moved into the unit square.
    pub normalized: bool,
}

/// Breadth-first face layout over a borrowed mesh.
pub struct Embedder<'m, I: MeshIndex, S = EuclideanEmbed> {
    mesh: &'m mut RicciFlowMesh<I>,
    strategy: S,
    options: EmbedOptions,
}

impl<'m, I: MeshIndex> Embedder<'m, I, EuclideanEmbed> {
    /// Create a Euclidean embedder.
    pub fn new(mesh: &'m mut RicciFlowMesh<I>, options: EmbedOptions) -> Self {
        Self::with_strategy(mesh, EuclideanEmbed, options)
    }
}

impl<'m, I: MeshIndex, S: EmbedStrategy<I>> Embedder<'m, I, S> {
    /// Create an embedder with an explicit strategy.
    pub fn with_strategy(mesh: &'m mut RicciFlowMesh<I>, strategy: S, options: EmbedOptions) -> Self {
        Self {
            mesh,
            strategy,
            options,
        }
    }

    /// The mesh being embedded.
    pub fn mesh(&self) -> &RicciFlowMesh<I> {
        &*self.mesh
    }

    /// Lay out every face and write the planar coordinates into `huv`.
    ///
    /// # Errors
    ///
    /// - [`MeshError::EmptyMesh`] for a mesh without faces
    /// - [`MeshError::InvalidParameter`] for an out-of-range root face
    /// - [`MeshError::NonEmbeddableFace`] when the metric leaves no room for a vertex
    /// - [`MeshError::InvalidState`] when some faces are not reachable from the root
    pub fn embed(&mut self) -> Result<EmbedReport> {
        let num_faces = self.mesh.topology.num_faces();
        if num_faces == 0 {
            return Err(MeshError::EmptyMesh);
        }
        let root = self.options.root_face.unwrap_or(0);
        if root >= num_faces {
            return Err(MeshError::invalid_param("root_face", root, "no face with this index"));
        }

        for v in self.mesh.vertices.iter_mut() {
            v.huv = Point2::origin();
            v.touched = false;
        }
        self.mesh.face_touched.iter_mut().for_each(|t| *t = false);

        let root = FaceId::<I>::new(root);
        self.strategy.embed_first_face(self.mesh, root)?;
        self.mesh.face_touched[root.index()] = true;

        let mut queue = VecDeque::new();
        self.enqueue_neighbors(root, &mut queue);

        let mut faces_embedded = 1;
        while let Some(f) = queue.pop_front() {
            self.enqueue_neighbors(f, &mut queue);
            self.strategy.embed_face(self.mesh, f)?;
            faces_embedded += 1;
        }

        if faces_embedded < num_faces {
            return Err(MeshError::InvalidState(format!(
                "face adjacency graph is disconnected: {} of {} faces reached",
                faces_embedded, num_faces
            )));
        }

        let (range, normalized) = self.normalize();
        log::info!(
            "embedded {} faces (range {:.6e}, normalized: {})",
            faces_embedded,
            range,
            normalized
        );

        Ok(EmbedReport {
            faces_embedded,
            range,
            normalized,
        })
    }

    fn enqueue_neighbors(&mut self, f: FaceId<I>, queue: &mut VecDeque<FaceId<I>>) {
        let mesh = &mut *self.mesh;
        for g in mesh.topology.face_neighbors(f) {
            if !mesh.face_touched[g.index()] {
                mesh.face_touched[g.index()] = true;
                queue.push_back(g);
            }
        }
    }

    /// Move the placed vertices into `[0, 1]²`; returns the range and
    /// whether anything moved.
    fn normalize(&mut self) -> (f64, bool) {
        let placed = self.mesh.vertices.iter().filter(|v| v.touched).map(|v| v.huv);
        let Some((min, max)) = uv::bounding_box(placed) else {
            return (0.0, false);
        };

        let range = (max.x - min.x).max(max.y - min.y);
        if !self.options.normalize || range <= self.options.min_range {
            if self.options.normalize {
                log::debug!("layout range {:.3e} too small, skipping normalization", range);
            }
            return (range, false);
        }

        for v in self.mesh.vertices.iter_mut().filter(|v| v.touched) {
            v.huv = Point2::from((v.huv - min) / range);
        }

        if self.options.rescale_metric {
            let shift = range.ln();
            for v in self.mesh.vertices.iter_mut() {
                v.u -= shift;
            }
            for e in self.mesh.edges.iter_mut() {
                e.length /= range;
            }
        }

        (range, true)
    }
}

/// Embed `mesh` in the Euclidean plane.
pub fn embed<I: MeshIndex>(mesh: &mut RicciFlowMesh<I>, options: &EmbedOptions) -> Result<EmbedReport> {
    Embedder::new(mesh, options.clone()).embed()
}
