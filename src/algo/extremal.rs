//! End-to-end parameterizations: solve a metric, then embed it.
//!
//! [`tangential_extremal_length`] maps a topological square with four marked
//! corners to a rectangle and measures its aspect ratio, the extremal length
//! of the curve family joining two opposite sides. [`tangential_circle_domain`]
//! maps a disk or a multiply connected domain to a region bounded by circles.
//!
//! A solve that does not converge is never embedded: the returned
//! [`Parameterization`] then has no embedding and the planar coordinates are
//! left untouched.

use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, RicciFlowMesh, VertexId};

use super::embed::{EmbedOptions, EmbedReport, Embedder};
use super::ricci::{
    BoundaryCircularization, CornerConcentration, OuterLoop, RicciFlow, RicciFlowOptions, SolveMethod,
    SolveReport, TargetCurvature,
};

/// Outcome of solve + embed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameterization<I: MeshIndex = u32> {
    /// The metric solve.
    pub solve: SolveReport<I>,
    /// The embedding; `None` when the solve did not converge.
    pub embed: Option<EmbedReport>,
}

impl<I: MeshIndex> Parameterization<I> {
    /// Whether the mesh carries a valid planar layout.
    pub fn is_embedded(&self) -> bool {
        self.embed.is_some()
    }
}

/// Side lengths of the rectangle spanned by four corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremalLength<I: MeshIndex = u32> {
    /// The corners in boundary order, starting at the corner met first.
    pub corners: [VertexId<I>; 4],
    /// Mean length of the sides `corners[0]-corners[1]` and `corners[2]-corners[3]`.
    pub width: f64,
    /// Mean length of the sides `corners[1]-corners[2]` and `corners[3]-corners[0]`.
    pub height: f64,
}

impl<I: MeshIndex> ExtremalLength<I> {
    /// `width / height`.
    pub fn ratio(&self) -> f64 {
        self.width / self.height
    }
}

fn solve_and_embed<I, T>(
    mesh: &mut RicciFlowMesh<I>,
    target: T,
    flow_options: RicciFlowOptions,
    embed_options: EmbedOptions,
) -> Result<Parameterization<I>>
where
    I: MeshIndex,
    T: TargetCurvature<I>,
{
    let solve = RicciFlow::new(mesh, target, flow_options)?.calculate_metric()?;
    if !solve.converged {
        log::warn!("metric solve did not converge; skipping embedding");
        return Ok(Parameterization { solve, embed: None });
    }

    let embed = Embedder::new(mesh, embed_options).embed()?;
    Ok(Parameterization {
        solve,
        embed: Some(embed),
    })
}

/// Map a square with marked corners to a rectangle.
///
/// Corners are the vertices incident to more than two sharp edges; mark them
/// with [`RicciFlowMesh::set_sharp_edges`] first.
pub fn tangential_extremal_length<I: MeshIndex>(
    mesh: &mut RicciFlowMesh<I>,
    flow_options: RicciFlowOptions,
    embed_options: EmbedOptions,
) -> Result<Parameterization<I>> {
    mesh.update_valence();
    solve_and_embed(mesh, CornerConcentration, flow_options, embed_options)
}

/// Map a surface with boundary to a circle domain.
///
/// The boundary targets follow the edge lengths, so a plain
/// [`SolveMethod::Newton`] request is run as
/// [`SolveMethod::NewtonWithTargetRefresh`]; the other schemes are kept.
pub fn tangential_circle_domain<I: MeshIndex>(
    mesh: &mut RicciFlowMesh<I>,
    outer: OuterLoop,
    flow_options: RicciFlowOptions,
    embed_options: EmbedOptions,
) -> Result<Parameterization<I>> {
    let target = BoundaryCircularization::new(mesh.topology(), outer)?;
    let flow_options = match flow_options.method {
        SolveMethod::Newton => flow_options.with_method(SolveMethod::NewtonWithTargetRefresh),
        _ => flow_options,
    };
    solve_and_embed(mesh, target, flow_options, embed_options)
}

/// Measure the rectangle of an embedded corner-marked square.
///
/// # Errors
///
/// [`MeshError::InvalidState`] unless the mesh has exactly one boundary loop
/// carrying exactly four corners, or when a side has zero length.
pub fn extremal_length<I: MeshIndex>(mesh: &RicciFlowMesh<I>) -> Result<ExtremalLength<I>> {
    let loops = mesh.topology().boundary_loops();
    let [boundary] = loops.as_slice() else {
        return Err(MeshError::InvalidState(format!(
            "expected one boundary loop, found {}",
            loops.len()
        )));
    };

    let found: Vec<VertexId<I>> = boundary
        .vertices(mesh.topology())
        .filter(|&v| mesh.vertex(v).valence > 2)
        .collect();
    let corners: [VertexId<I>; 4] = found.as_slice().try_into().map_err(|_| {
        MeshError::InvalidState(format!("expected four corners, found {}", found.len()))
    })?;

    let side = |i: usize| (mesh.vertex(corners[i]).huv - mesh.vertex(corners[(i + 1) % 4]).huv).norm();
    let width = (side(0) + side(2)) / 2.0;
    let height = (side(1) + side(3)) / 2.0;
    if height <= 0.0 || width <= 0.0 {
        return Err(MeshError::InvalidState(
            "corners are not embedded; run the embedding first".to_string(),
        ));
    }

    Ok(ExtremalLength {
        corners,
        width,
        height,
    })
}
