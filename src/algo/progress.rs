//! Progress reporting for iterative solves.
//!
//! Long-running operations have a `*_with_progress` variant that takes a
//! [`Progress`] and reports once per iteration.
//!
//! # Example
//!
//! ```
//! use ricciflow::algo::progress::Progress;
//! use ricciflow::algo::ricci::{CornerConcentration, RicciFlow, RicciFlowOptions};
//! use ricciflow::mesh::{primitives, RicciFlowMesh};
//!
//! let (topology, sharp) = primitives::marked_square::<u32>(3);
//! let mut mesh = RicciFlowMesh::new(topology);
//! mesh.set_sharp_edges(sharp);
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let mut flow = RicciFlow::new(&mut mesh, CornerConcentration, RicciFlowOptions::default()).unwrap();
//! let report = flow.calculate_metric_with_progress(&progress).unwrap();
//! assert!(report.converged);
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Current iteration (0-based)
/// - `total`: Iteration cap of the running phase
/// - `message`: Name of the running phase
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
