//! Conjugate gradient over `nalgebra_sparse` CSR matrices.
//!
//! Used by [`LinearSolver::ConjugateGradient`](super::LinearSolver) as an
//! iterative alternative to the sparse Cholesky factorization.

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

use crate::error::{MeshError, Result};

/// Solve `A x = b` for a symmetric positive definite `A` by conjugate gradient.
///
/// Starts from zero and stops when the relative residual `|r| / |b|` drops
/// below `tolerance`.
///
/// # Errors
///
/// [`MeshError::SolverFailure`] on a dimension mismatch, on a vanishing
/// search direction curvature (A is not positive definite), or when
/// `max_iter` iterations do not reach the tolerance.
pub fn conjugate_gradient(
    a: &CsrMatrix<f64>,
    b: &DVector<f64>,
    max_iter: usize,
    tolerance: f64,
) -> Result<DVector<f64>> {
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return Err(MeshError::solver(format!(
            "{}x{} matrix with a right-hand side of length {}",
            a.nrows(),
            a.ncols(),
            n
        )));
    }

    let mut x = DVector::zeros(n);
    let b_norm = b.norm();
    if b_norm < 1e-15 {
        return Ok(x);
    }

    let mut r = b.clone();
    let mut p = r.clone();
    let mut r_norm_sq = r.dot(&r);

    for _ in 0..max_iter {
        let ap: DVector<f64> = a * &p;

        let p_ap = p.dot(&ap);
        if p_ap <= 1e-300 {
            return Err(MeshError::solver("matrix is not positive definite"));
        }
        let alpha = r_norm_sq / p_ap;

        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &ap, 1.0);

        let new_r_norm_sq = r.dot(&r);
        if new_r_norm_sq.sqrt() / b_norm < tolerance {
            return Ok(x);
        }

        let beta = new_r_norm_sq / r_norm_sq;
        p = &r + beta * &p;
        r_norm_sq = new_r_norm_sq;
    }

    Err(MeshError::solver(format!(
        "conjugate gradient did not converge in {} iterations",
        max_iter
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_sparse::CooMatrix;

    fn csr(n: usize, entries: &[(usize, usize, f64)]) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(n, n);
        for &(i, j, v) in entries {
            coo.push(i, j, v);
        }
        CsrMatrix::from(&coo)
    }

    #[test]
    fn test_cg_simple() {
        // [4 1; 1 3] x = [1; 2] has x = (1/11, 7/11)
        let a = csr(2, &[(0, 0, 4.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 3.0)]);
        let b = DVector::from_vec(vec![1.0, 2.0]);

        let x = conjugate_gradient(&a, &b, 100, 1e-12).unwrap();
        assert!((x[0] - 1.0 / 11.0).abs() < 1e-10);
        assert!((x[1] - 7.0 / 11.0).abs() < 1e-10);
    }

    #[test]
    fn test_cg_sums_duplicate_entries() {
        // Diagonal assembled from two contributions: [2+2 0; 0 3].
        let a = csr(2, &[(0, 0, 2.0), (0, 0, 2.0), (1, 1, 3.0)]);
        let b = DVector::from_vec(vec![8.0, 3.0]);

        let x = conjugate_gradient(&a, &b, 10, 1e-12).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-12);
        assert!((x[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cg_rejects_indefinite() {
        let a = csr(2, &[(0, 0, -1.0), (1, 1, -1.0)]);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        assert!(matches!(
            conjugate_gradient(&a, &b, 10, 1e-10),
            Err(MeshError::SolverFailure { .. })
        ));
    }

    #[test]
    fn test_cg_dimension_mismatch() {
        let a = csr(3, &[(0, 0, 1.0)]);
        let b = DVector::from_vec(vec![1.0]);
        assert!(conjugate_gradient(&a, &b, 10, 1e-10).is_err());
    }
}
