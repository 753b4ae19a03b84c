//! Hessian assembly and the linear solve of a Newton step.
//!
//! The Hessian of the Ricci energy is the weighted graph Laplacian of the
//! mesh: `H(i, j) = -w_ij` for every edge and `H(i, i) = Σ_j w_ij`. It is
//! positive semi-definite and its null space contains the constant vector,
//! since a uniform shift of all conformal factors leaves every angle fixed.
//!
//! The direct and iterative solvers ground the last unknown (drop its row and
//! column, fix it to zero) to obtain a positive definite system, then shift
//! the solution to zero mean. Grounding one unknown only removes the null
//! space of a connected graph, so a Hessian whose conductance graph has more
//! than one component is rejected before any solver runs.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CooMatrix, CscMatrix, CsrMatrix};

use super::sparse::conjugate_gradient;
use crate::error::{MeshError, Result};

/// How the Newton system is solved.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum LinearSolver {
    /// Sparse Cholesky factorization of the grounded system.
    #[default]
    SparseCholesky,
    /// Conjugate gradient on the grounded system.
    ConjugateGradient {
        /// Iteration cap.
        max_iterations: usize,
        /// Relative residual tolerance.
        tolerance: f64,
    },
    /// Least-squares solve through a dense SVD of the full system.
    DenseSvd,
}

/// Below this pivot or singular value the system is treated as singular.
const SINGULAR_EPS: f64 = 1e-12;

/// The Newton Hessian as a list of `(row, col, value)` triplets.
#[derive(Debug, Clone, PartialEq)]
pub struct Hessian {
    n: usize,
    triplets: Vec<(usize, usize, f64)>,
    diagonal: Vec<f64>,
}

impl Hessian {
    /// Assemble the Laplacian of `n` unknowns from weighted edges `(i, j, w)`.
    pub fn assemble(n: usize, edges: impl IntoIterator<Item = (usize, usize, f64)>) -> Self {
        let mut triplets = Vec::new();
        let mut diagonal = vec![0.0; n];

        for (i, j, w) in edges {
            triplets.push((i, j, -w));
            triplets.push((j, i, -w));
            diagonal[i] += w;
            diagonal[j] += w;
        }
        triplets.extend(diagonal.iter().enumerate().map(|(i, &d)| (i, i, d)));

        Self {
            n,
            triplets,
            diagonal,
        }
    }

    /// Number of unknowns.
    #[inline]
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Diagonal entries (total conductance per vertex).
    pub fn diagonal(&self) -> &[f64] {
        &self.diagonal
    }

    /// Triplets of the system with the last unknown removed.
    fn grounded_triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let last = self.n - 1;
        self.triplets
            .iter()
            .copied()
            .filter(move |&(i, j, _)| i != last && j != last)
    }

    fn to_grounded_coo(&self) -> CooMatrix<f64> {
        let m = self.n.saturating_sub(1);
        let mut coo = CooMatrix::new(m, m);
        if m > 0 {
            for (i, j, v) in self.grounded_triplets() {
                coo.push(i, j, v);
            }
        }
        coo
    }

    /// The grounded system in compressed sparse column form.
    pub fn to_grounded_csc(&self) -> CscMatrix<f64> {
        CscMatrix::from(&self.to_grounded_coo())
    }

    /// The grounded system in compressed sparse row form.
    pub fn to_grounded_csr(&self) -> CsrMatrix<f64> {
        CsrMatrix::from(&self.to_grounded_coo())
    }

    /// Number of connected components of the graph of positive conductances.
    pub fn components(&self) -> usize {
        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }

        let mut parent: Vec<usize> = (0..self.n).collect();
        let mut count = self.n;
        for &(i, j, v) in &self.triplets {
            // Off-diagonal entries hold -w.
            if i == j || v >= 0.0 {
                continue;
            }
            let (a, b) = (find(&mut parent, i), find(&mut parent, j));
            if a != b {
                parent[a] = b;
                count -= 1;
            }
        }
        count
    }

    /// The full system as a dense matrix.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut m = DMatrix::zeros(self.n, self.n);
        for &(i, j, v) in &self.triplets {
            m[(i, j)] += v;
        }
        m
    }

    /// Solve `H x = b` and return the zero-mean solution.
    ///
    /// # Errors
    ///
    /// [`MeshError::SolverFailure`] if a vertex has no conductance, the
    /// conductance graph is disconnected, the factorization or iteration
    /// fails, or the result is not finite.
    pub fn solve(&self, b: &[f64], solver: &LinearSolver) -> Result<DVector<f64>> {
        if b.len() != self.n {
            return Err(MeshError::solver(format!(
                "right-hand side has {} entries for {} unknowns",
                b.len(),
                self.n
            )));
        }
        if self.n == 0 {
            return Err(MeshError::solver("empty system"));
        }
        if let Some(i) = self.diagonal.iter().position(|&d| d.is_nan() || d <= SINGULAR_EPS) {
            return Err(MeshError::solver(format!(
                "vertex {} has no conductance; the Hessian is singular",
                i
            )));
        }
        let components = self.components();
        if components > 1 {
            return Err(MeshError::solver(format!(
                "conductance graph has {} components; the grounded Hessian is singular",
                components
            )));
        }

        let mut x = match solver {
            LinearSolver::SparseCholesky => self.solve_cholesky(b)?,
            LinearSolver::ConjugateGradient {
                max_iterations,
                tolerance,
            } => self.solve_cg(b, *max_iterations, *tolerance)?,
            LinearSolver::DenseSvd => self.solve_svd(b)?,
        };

        if x.iter().any(|v| !v.is_finite()) {
            return Err(MeshError::solver("solution is not finite"));
        }

        let mean = x.mean();
        x.add_scalar_mut(-mean);
        Ok(x)
    }

    fn solve_cholesky(&self, b: &[f64]) -> Result<DVector<f64>> {
        let m = self.n - 1;
        let mut x = DVector::zeros(self.n);
        if m == 0 {
            return Ok(x);
        }

        let chol = CscCholesky::factor(&self.to_grounded_csc())
            .map_err(|e| MeshError::solver(format!("cholesky factorization failed: {:?}", e)))?;
        let rhs = DMatrix::from_column_slice(m, 1, &b[..m]);
        let sol = chol.solve(&rhs);

        x.rows_mut(0, m).copy_from(&sol.column(0));
        Ok(x)
    }

    fn solve_cg(&self, b: &[f64], max_iterations: usize, tolerance: f64) -> Result<DVector<f64>> {
        let m = self.n - 1;
        let mut x = DVector::zeros(self.n);
        if m == 0 {
            return Ok(x);
        }

        let rhs = DVector::from_column_slice(&b[..m]);
        let sol = conjugate_gradient(&self.to_grounded_csr(), &rhs, max_iterations, tolerance)?;

        x.rows_mut(0, m).copy_from(&sol);
        Ok(x)
    }

    fn solve_svd(&self, b: &[f64]) -> Result<DVector<f64>> {
        let svd = self.to_dense().svd(true, true);
        if svd.singular_values.max() < SINGULAR_EPS {
            return Err(MeshError::solver("Hessian is numerically zero"));
        }

        let rhs = DVector::from_column_slice(b);
        svd.solve(&rhs, SINGULAR_EPS)
            .map_err(|e| MeshError::solver(format!("svd solve failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Path graph 0 - 1 - 2 with unit weights.
    fn path3() -> Hessian {
        Hessian::assemble(3, vec![(0, 1, 1.0), (1, 2, 1.0)])
    }

    fn all_solvers() -> Vec<LinearSolver> {
        vec![
            LinearSolver::SparseCholesky,
            LinearSolver::ConjugateGradient {
                max_iterations: 100,
                tolerance: 1e-12,
            },
            LinearSolver::DenseSvd,
        ]
    }

    #[test]
    fn test_laplacian_structure() {
        let h = path3().to_dense();
        let expected = DMatrix::from_row_slice(3, 3, &[1.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 1.0]);
        assert_eq!(h, expected);
        // Constant vector is in the null space
        let ones = DVector::from_element(3, 1.0);
        assert!((h * ones).norm() < 1e-15);
    }

    #[test]
    fn test_solvers_agree_on_consistent_rhs() {
        let h = path3();
        // Zero-sum right-hand side lies in the range of H.
        let b = [1.0, 0.0, -1.0];
        let dense = h.to_dense();

        for solver in all_solvers() {
            let x = h.solve(&b, &solver).unwrap();
            assert!(x.sum().abs() < 1e-10, "{:?} not mean-centered", solver);
            let residual = &dense * &x - DVector::from_column_slice(&b);
            assert!(residual.norm() < 1e-8, "{:?} residual {}", solver, residual.norm());
        }
    }

    #[test]
    fn test_isolated_edge_fails() {
        // Two vertices joined by one edge that carries no conductance.
        let h = Hessian::assemble(2, vec![(0, 1, 0.0)]);
        for solver in all_solvers() {
            let result = h.solve(&[0.5, -0.5], &solver);
            assert!(
                matches!(result, Err(MeshError::SolverFailure { .. })),
                "{:?} accepted a singular system",
                solver
            );
        }
    }

    #[test]
    fn test_disconnected_graph_fails() {
        // A triangle and a separate edge: grounding fixes only one component.
        let h = Hessian::assemble(5, vec![(0, 1, 0.37), (1, 2, 0.71), (0, 2, 1.08), (3, 4, 1.0)]);
        assert_eq!(h.components(), 2);

        let b = [0.3, -0.1, -0.2, 0.5, -0.5];
        for solver in all_solvers() {
            let result = h.solve(&b, &solver);
            assert!(
                matches!(result, Err(MeshError::SolverFailure { .. })),
                "{:?} solved a disconnected system",
                solver
            );
        }
    }

    #[test]
    fn test_connected_graph_has_one_component() {
        assert_eq!(path3().components(), 1);
    }

    #[test]
    fn test_rhs_length_mismatch() {
        let result = path3().solve(&[1.0], &LinearSolver::SparseCholesky);
        assert!(matches!(result, Err(MeshError::SolverFailure { .. })));
    }

    #[test]
    fn test_grounded_shapes() {
        let csc = path3().to_grounded_csc();
        assert_eq!(csc.nrows(), 2);
        assert_eq!(csc.ncols(), 2);

        // Grounding vertex 2 leaves [1 -1; -1 2].
        let csr = path3().to_grounded_csr();
        assert_eq!(csr.nnz(), 4);
        let y: DVector<f64> = &csr * &DVector::from_vec(vec![1.0, 1.0]);
        assert_eq!(y.as_slice(), &[0.0, 1.0]);
    }
}
