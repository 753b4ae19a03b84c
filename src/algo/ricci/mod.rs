//! Discrete Ricci flow.
//!
//! The solver deforms a per-vertex conformal factor `u` until the discrete
//! Gaussian curvature of every vertex matches a target. Each iteration
//! recomputes, in this order: edge lengths from `u`, corner angles from the
//! lengths, vertex curvature from the angles, edge conductances, and the
//! curvature error. Newton's method then solves `H x = target - k` with the
//! Laplacian Hessian `H` and updates `u += x * step_length`; the gradient
//! flow instead steps `u += (target - k) * flow_step`.
//!
//! Targets that depend on the metric, such as round boundaries, are solved in
//! rounds: Newton against the current targets, then a short gradient flow
//! that refreshes the targets every step. The solve converges only once the
//! curvature matches targets computed from the final lengths.
//!
//! The edge-length rule and the target are pluggable: see [`FlowMetric`] and
//! [`TargetCurvature`].
//!
//! # Example
//!
//! ```
//! use ricciflow::algo::ricci::{
//!     BoundaryCircularization, OuterLoop, RicciFlow, RicciFlowOptions, SolveMethod,
//! };
//! use ricciflow::mesh::{primitives, RicciFlowMesh};
//!
//! let mut mesh: RicciFlowMesh = primitives::annulus(16, 3, 0.5, 1.0).into();
//! let target = BoundaryCircularization::new(mesh.topology(), OuterLoop::Longest).unwrap();
//! let options = RicciFlowOptions::default().with_method(SolveMethod::NewtonWithTargetRefresh);
//!
//! let mut flow = RicciFlow::new(&mut mesh, target, options).unwrap();
//! let report = flow.calculate_metric().unwrap();
//! assert!(report.converged);
//! ```
//!
//! # References
//!
//! - Jin, M., Kim, J., Luo, F., & Gu, X. (2008). "Discrete surface Ricci
//!   flow." IEEE TVCG.

mod hessian;
mod metric;
mod sparse;
mod target;

pub use hessian::{Hessian, LinearSolver};
pub use metric::{FlowMetric, TangentialMetric};
pub use sparse::conjugate_gradient;
pub use target::{BoundaryCircularization, CornerConcentration, OuterLoop, Prescribed, TargetCurvature};

use super::progress::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, MeshIndex, RicciFlowMesh, VertexId};

/// Which iteration drives the conformal factors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SolveMethod {
    /// Newton's method on the Laplacian Hessian.
    #[default]
    Newton,
    /// Fixed-step gradient flow, targets refreshed every iteration.
    GradientFlow,
    /// Newton first; gradient flow if Newton hits its iteration cap.
    NewtonWithFlowFallback,
    /// Rounds of Newton followed by a target-refreshing gradient flow, until
    /// the flow finds the refreshed targets met.
    NewtonWithTargetRefresh,
}

/// Options for the metric solve.
#[derive(Debug, Clone, PartialEq)]
pub struct RicciFlowOptions {
    /// Stop once the curvature error is below this value.
    pub threshold: f64,

    /// Scale of each Newton update.
    pub step_length: f64,

    /// Newton iteration cap.
    pub max_newton_iterations: usize,

    /// Step size of the gradient flow.
    pub flow_step: f64,

    /// Gradient flow iteration cap.
    pub max_flow_iterations: usize,

    /// Cap on Newton + flow rounds of [`SolveMethod::NewtonWithTargetRefresh`].
    pub max_refresh_rounds: usize,

    /// Iteration scheme.
    pub method: SolveMethod,

    /// Linear solver for the Newton system.
    pub solver: LinearSolver,
}

impl Default for RicciFlowOptions {
    fn default() -> Self {
        Self {
            threshold: 5e-4,
            step_length: 1.0,
            max_newton_iterations: 100,
            flow_step: 2e-2,
            max_flow_iterations: 64,
            max_refresh_rounds: 100,
            method: SolveMethod::Newton,
            solver: LinearSolver::SparseCholesky,
        }
    }
}

impl RicciFlowOptions {
    /// Set the convergence threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the Newton step length.
    pub fn with_step_length(mut self, step_length: f64) -> Self {
        self.step_length = step_length;
        self
    }

    /// Set the Newton iteration cap.
    pub fn with_max_newton_iterations(mut self, max: usize) -> Self {
        self.max_newton_iterations = max;
        self
    }

    /// Set the gradient flow step size.
    pub fn with_flow_step(mut self, flow_step: f64) -> Self {
        self.flow_step = flow_step;
        self
    }

    /// Set the gradient flow iteration cap.
    pub fn with_max_flow_iterations(mut self, max: usize) -> Self {
        self.max_flow_iterations = max;
        self
    }

    /// Set the cap on target refresh rounds.
    pub fn with_max_refresh_rounds(mut self, max: usize) -> Self {
        self.max_refresh_rounds = max;
        self
    }

    /// Set the iteration scheme.
    pub fn with_method(mut self, method: SolveMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the linear solver.
    pub fn with_solver(mut self, solver: LinearSolver) -> Self {
        self.solver = solver;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.threshold.is_nan() || self.threshold <= 0.0 {
            return Err(MeshError::invalid_param("threshold", self.threshold, "must be positive"));
        }
        if !self.step_length.is_finite() || self.step_length <= 0.0 {
            return Err(MeshError::invalid_param(
                "step_length",
                self.step_length,
                "must be positive and finite",
            ));
        }
        if !self.flow_step.is_finite() || self.flow_step <= 0.0 {
            return Err(MeshError::invalid_param(
                "flow_step",
                self.flow_step,
                "must be positive and finite",
            ));
        }
        if self.max_refresh_rounds == 0 {
            return Err(MeshError::invalid_param(
                "max_refresh_rounds",
                self.max_refresh_rounds,
                "must be at least 1",
            ));
        }
        if let LinearSolver::ConjugateGradient { tolerance, .. } = self.solver {
            if tolerance.is_nan() || tolerance <= 0.0 {
                return Err(MeshError::invalid_param("tolerance", tolerance, "must be positive"));
            }
        }
        Ok(())
    }
}

/// Largest deviation of curvature from its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvatureError<I: MeshIndex = u32> {
    /// `max |target_k - k|` over all vertices.
    pub max: f64,
    /// Vertex attaining the maximum; `None` on a mesh without vertices.
    pub vertex: Option<VertexId<I>>,
}

/// Outcome of a metric solve.
///
/// Running out of iterations is not an error: `converged` is false and
/// `error` holds the last measured curvature error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport<I: MeshIndex = u32> {
    /// Whether the curvature error dropped below the threshold.
    pub converged: bool,
    /// Updates applied to `u` across all phases.
    pub iterations: usize,
    /// Curvature error after the last evaluation.
    pub error: CurvatureError<I>,
    /// The scheme of the last phase that ran, or
    /// [`SolveMethod::NewtonWithTargetRefresh`] for the round-based solve.
    pub method: SolveMethod,
}

/// Ricci flow solver over a borrowed mesh.
///
/// Construction assigns every vertex its dense Hessian index and resets
/// `u = 0`. The topology must not change while the solver exists.
pub struct RicciFlow<'m, I: MeshIndex, T, M = TangentialMetric> {
    mesh: &'m mut RicciFlowMesh<I>,
    metric: M,
    target: T,
    options: RicciFlowOptions,
}

impl<'m, I, T> RicciFlow<'m, I, T, TangentialMetric>
where
    I: MeshIndex,
    T: TargetCurvature<I>,
{
    /// Create a tangential circle-packing flow.
    ///
    /// # Errors
    ///
    /// [`MeshError::EmptyMesh`] for a mesh without faces and
    /// [`MeshError::InvalidParameter`] for invalid options.
    pub fn new(mesh: &'m mut RicciFlowMesh<I>, target: T, options: RicciFlowOptions) -> Result<Self> {
        Self::with_metric(mesh, TangentialMetric, target, options)
    }
}

impl<'m, I, T, M> RicciFlow<'m, I, T, M>
where
    I: MeshIndex,
    T: TargetCurvature<I>,
    M: FlowMetric,
{
    /// Create a flow with an explicit metric.
    pub fn with_metric(
        mesh: &'m mut RicciFlowMesh<I>,
        metric: M,
        target: T,
        options: RicciFlowOptions,
    ) -> Result<Self> {
        if mesh.topology.num_faces() == 0 {
            return Err(MeshError::EmptyMesh);
        }
        options.validate()?;

        for (idx, v) in mesh.vertices.iter_mut().enumerate() {
            v.idx = idx;
            v.u = 0.0;
        }

        Ok(Self {
            mesh,
            metric,
            target,
            options,
        })
    }

    /// The mesh being solved.
    pub fn mesh(&self) -> &RicciFlowMesh<I> {
        &*self.mesh
    }

    /// Mutable access to the scalar state, e.g. to seed conformal factors.
    pub fn mesh_mut(&mut self) -> &mut RicciFlowMesh<I> {
        &mut *self.mesh
    }

    /// The solver options.
    pub fn options(&self) -> &RicciFlowOptions {
        &self.options
    }

    /// Recompute every edge length from the conformal factors.
    pub fn compute_edge_lengths(&mut self) {
        let topo = &self.mesh.topology;
        let vertices = &self.mesh.vertices;
        for (e, state) in topo.edge_ids().zip(self.mesh.edges.iter_mut()) {
            let [a, b] = topo.edge_vertices(e);
            state.length = self.metric.length(vertices[a.index()].u, vertices[b.index()].u);
        }
    }

    /// Recompute every corner angle from the edge lengths.
    ///
    /// # Errors
    ///
    /// [`MeshError::DegenerateTriangle`] naming the first face whose lengths
    /// violate the triangle inequality.
    pub fn compute_corner_angles(&mut self) -> Result<()> {
        let topo = &self.mesh.topology;
        let edges = &self.mesh.edges;
        let len = |he: HalfEdgeId<I>| edges[topo.edge_of(he).index()].length;

        for f in topo.face_ids() {
            for he in topo.face_halfedges(f) {
                let opposite = len(topo.next(he));
                let angle = self
                    .metric
                    .corner_angle(opposite, len(he), len(topo.prev(he)))
                    .ok_or(MeshError::DegenerateTriangle { face: f.index() })?;
                self.mesh.angles[he.index()] = angle;
            }
        }
        Ok(())
    }

    /// Recompute every vertex curvature from the corner angles.
    pub fn compute_vertex_curvature(&mut self) {
        let topo = &self.mesh.topology;
        let angles = &self.mesh.angles;
        for (v, state) in topo.vertex_ids().zip(self.mesh.vertices.iter_mut()) {
            let sum: f64 = topo
                .vertex_halfedges(v)
                .filter(|&he| !topo.is_boundary_halfedge(he))
                .map(|he| angles[he.index()])
                .sum();
            state.k = state.flat_angle() - sum;
        }
    }

    /// Recompute every edge conductance from the conformal factors and lengths.
    pub fn compute_edge_weights(&mut self) {
        for e in self.mesh.edges.iter_mut() {
            e.weight = 0.0;
        }

        let topo = &self.mesh.topology;
        for f in topo.face_ids() {
            let u = topo.face_triangle(f).map(|v| self.mesh.vertices[v.index()].u);
            let w = self.metric.face_conductance(u);
            for e in topo.face_edges(f) {
                let state = &mut self.mesh.edges[e.index()];
                state.weight += w / state.length;
            }
        }
    }

    /// Largest `|target_k - k|` and the vertex attaining it.
    pub fn curvature_error(&self) -> CurvatureError<I> {
        let mut error = CurvatureError {
            max: 0.0,
            vertex: None,
        };
        for (i, v) in self.mesh.vertices.iter().enumerate() {
            let diff = (v.target_k - v.k).abs();
            if error.vertex.is_none() || diff > error.max {
                error = CurvatureError {
                    max: diff,
                    vertex: Some(VertexId::new(i)),
                };
            }
        }
        error
    }

    /// Assign target curvatures with the configured policy.
    pub fn set_target_curvature(&mut self) -> Result<()> {
        self.target.assign(self.mesh)
    }

    /// Assemble the Newton Hessian from the current edge weights.
    pub fn hessian(&self) -> Hessian {
        let topo = &self.mesh.topology;
        let vertices = &self.mesh.vertices;
        Hessian::assemble(
            vertices.len(),
            topo.edge_ids().map(|e| {
                let [a, b] = topo.edge_vertices(e);
                (
                    vertices[a.index()].idx,
                    vertices[b.index()].idx,
                    self.mesh.edges[e.index()].weight,
                )
            }),
        )
    }

    /// Lengths, angles, curvature and weights, then the error.
    fn update_derived(&mut self) -> Result<CurvatureError<I>> {
        self.compute_edge_lengths();
        self.compute_corner_angles()?;
        self.compute_vertex_curvature();
        self.compute_edge_weights();
        Ok(self.curvature_error())
    }

    /// Run Newton's method against the current targets.
    pub fn newton(&mut self) -> Result<SolveReport<I>> {
        self.newton_internal(None)
    }

    /// Run the gradient flow, refreshing targets every iteration.
    pub fn flow(&mut self) -> Result<SolveReport<I>> {
        self.flow_internal(None)
    }

    /// Compute the metric: lengths, targets, then the configured scheme.
    ///
    /// A failed factorization or a degenerate triangle is an error; running
    /// out of iterations is reported through [`SolveReport::converged`].
    pub fn calculate_metric(&mut self) -> Result<SolveReport<I>> {
        self.calculate_metric_internal(None)
    }

    /// [`calculate_metric`](Self::calculate_metric) with progress reporting.
    pub fn calculate_metric_with_progress(&mut self, progress: &Progress) -> Result<SolveReport<I>> {
        self.calculate_metric_internal(Some(progress))
    }

    fn calculate_metric_internal(&mut self, progress: Option<&Progress>) -> Result<SolveReport<I>> {
        self.compute_edge_lengths();
        self.set_target_curvature()?;
        if self.target.depends_on_metric()
            && matches!(self.options.method, SolveMethod::Newton | SolveMethod::NewtonWithFlowFallback)
        {
            log::warn!("metric-dependent targets are fixed at their initial values for this solve");
        }

        let report = match self.options.method {
            SolveMethod::Newton => self.newton_internal(progress)?,
            SolveMethod::GradientFlow => self.flow_internal(progress)?,
            SolveMethod::NewtonWithFlowFallback => {
                let newton = self.newton_internal(progress)?;
                if newton.converged {
                    newton
                } else {
                    log::info!("Newton did not converge, falling back to gradient flow");
                    let flow = self.flow_internal(progress)?;
                    SolveReport {
                        iterations: newton.iterations + flow.iterations,
                        ..flow
                    }
                }
            }
            SolveMethod::NewtonWithTargetRefresh => self.refresh_internal(progress)?,
        };

        if report.converged {
            log::info!(
                "metric converged after {} iterations (error {:.3e})",
                report.iterations,
                report.error.max
            );
        } else {
            log::warn!(
                "metric did not converge after {} iterations (error {:.3e} at {:?})",
                report.iterations,
                report.error.max,
                report.error.vertex
            );
        }
        Ok(report)
    }

    fn refresh_internal(&mut self, progress: Option<&Progress>) -> Result<SolveReport<I>> {
        let max = self.options.max_refresh_rounds;
        let mut iterations = 0;
        let mut round = 0;

        loop {
            self.compute_edge_lengths();
            self.set_target_curvature()?;
            let newton = self.newton_internal(progress)?;
            let flow = self.flow_internal(progress)?;
            iterations += newton.iterations + flow.iterations;
            round += 1;
            log::debug!(
                "refresh round {}: curvature error {:.6e} against refreshed targets",
                round,
                flow.error.max
            );

            if flow.converged || round == max {
                return Ok(SolveReport {
                    converged: flow.converged,
                    iterations,
                    error: flow.error,
                    method: SolveMethod::NewtonWithTargetRefresh,
                });
            }
        }
    }

    fn newton_internal(&mut self, progress: Option<&Progress>) -> Result<SolveReport<I>> {
        let max = self.options.max_newton_iterations;
        let mut iteration = 0;

        loop {
            let error = self.update_derived()?;
            log::debug!(
                "newton {}: curvature error {:.6e} at {:?}",
                iteration,
                error.max,
                error.vertex
            );
            if let Some(p) = progress {
                p.report(iteration, max, "Newton");
            }

            if error.max < self.options.threshold || iteration == max {
                return Ok(SolveReport {
                    converged: error.max < self.options.threshold,
                    iterations: iteration,
                    error,
                    method: SolveMethod::Newton,
                });
            }

            let mut b = vec![0.0; self.mesh.vertices.len()];
            for v in &self.mesh.vertices {
                b[v.idx] = v.target_k - v.k;
            }

            let x = self.hessian().solve(&b, &self.options.solver)?;
            let step = self.options.step_length;
            for v in self.mesh.vertices.iter_mut() {
                v.u += x[v.idx] * step;
            }
            iteration += 1;
        }
    }

    fn flow_internal(&mut self, progress: Option<&Progress>) -> Result<SolveReport<I>> {
        let max = self.options.max_flow_iterations;
        let mut iteration = 0;

        loop {
            self.compute_edge_lengths();
            self.set_target_curvature()?;
            let error = self.update_derived()?;
            log::debug!(
                "flow {}: curvature error {:.6e} at {:?}",
                iteration,
                error.max,
                error.vertex
            );
            if let Some(p) = progress {
                p.report(iteration, max, "Gradient flow");
            }

            if error.max < self.options.threshold || iteration == max {
                return Ok(SolveReport {
                    converged: error.max < self.options.threshold,
                    iterations: iteration,
                    error,
                    method: SolveMethod::GradientFlow,
                });
            }

            let step = self.options.flow_step;
            for v in self.mesh.vertices.iter_mut() {
                v.u += (v.target_k - v.k) * step;
            }
            iteration += 1;
        }
    }
}
