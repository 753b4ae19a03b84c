//! Mesh parameterization algorithms.
//!
//! - **Ricci flow** ([`ricci`]): solve for a flat metric with prescribed
//!   curvature by Newton's method or gradient flow
//! - **Embedding** ([`embed`]): lay a solved metric out in the plane
//! - **Drivers** ([`extremal`]): extremal length and circle-domain maps built
//!   from the two

pub mod embed;
pub mod extremal;
pub mod progress;
pub mod ricci;
