//! Error types for ricciflow.
//!
//! Mesh construction failures and the failure modes of the metric solve and
//! the planar embedding share one error enum. Failing to converge within an
//! iteration cap is not an error; it is reported by
//! [`SolveReport::converged`](crate::algo::ricci::SolveReport::converged).

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh construction, metric solving or embedding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A directed edge is used by more than one face.
    #[error("edge ({v0}, {v1}) has more than two incident faces")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// The law-of-cosines argument left `[-1, 1]` for a corner of this face.
    ///
    /// The current metric violates the triangle inequality on the face.
    #[error("face {face} is degenerate under the current metric (cosine out of range)")]
    DegenerateTriangle {
        /// The face index.
        face: usize,
    },

    /// Factorizing or solving the Hessian system did not succeed.
    #[error("linear solve failed: {reason}")]
    SolverFailure {
        /// What went wrong.
        reason: String,
    },

    /// Two placed vertices and the solved edge lengths admit no position for
    /// the third vertex of this face.
    #[error("face {face} cannot be embedded: circle-circle intersection is empty")]
    NonEmbeddableFace {
        /// The face index.
        face: usize,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a solver failure error.
    pub fn solver<S: Into<String>>(reason: S) -> Self {
        MeshError::SolverFailure {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = MeshError::DegenerateTriangle { face: 7 };
        assert!(e.to_string().contains("face 7"));

        let e = MeshError::solver("matrix is not positive definite");
        assert_eq!(
            e.to_string(),
            "linear solve failed: matrix is not positive definite"
        );

        let e = MeshError::invalid_param("threshold", -1.0, "must be positive");
        assert_eq!(
            e.to_string(),
            "invalid parameter: threshold = -1 (must be positive)"
        );
    }
}
