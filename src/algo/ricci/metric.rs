//! Discrete metrics driven by a per-vertex conformal factor.
//!
//! A [`FlowMetric`] turns conformal factors into edge lengths, edge lengths
//! into corner angles, and supplies the per-face conductance used to build
//! the Hessian. [`TangentialMetric`] is the circle-packing metric: every
//! vertex carries a circle of radius `exp(u)` and neighboring circles touch.

/// The variant-specific rules of a Ricci flow.
pub trait FlowMetric {
    /// Length of an edge whose endpoints have conformal factors `u0` and `u1`.
    fn length(&self, u0: f64, u1: f64) -> f64;

    /// Corner angle between the sides `b` and `c`, opposite the side `a`.
    ///
    /// Returns `None` when the law-of-cosines argument is outside `[-1, 1]`
    /// or not a number; the three lengths then do not form a triangle.
    fn corner_angle(&self, a: f64, b: f64, c: f64) -> Option<f64> {
        let cos = (b * b + c * c - a * a) / (2.0 * b * c);
        if (-1.0..=1.0).contains(&cos) {
            Some(cos.acos())
        } else {
            None
        }
    }

    /// Conductance contributed by a face with the given vertex conformal
    /// factors. Each face edge accumulates `conductance / length`.
    fn face_conductance(&self, u: [f64; 3]) -> f64;
}

/// Tangential circle-packing metric.
///
/// `length = exp(u0) + exp(u1)` and the face conductance is the inradius of
/// the triangle formed by the three circle centers,
/// `sqrt(r0 r1 r2 / (r0 + r1 + r2))`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TangentialMetric;

impl FlowMetric for TangentialMetric {
    #[inline]
    fn length(&self, u0: f64, u1: f64) -> f64 {
        u0.exp() + u1.exp()
    }

    fn face_conductance(&self, u: [f64; 3]) -> f64 {
        let [r0, r1, r2] = u.map(f64::exp);
        (r0 * r1 * r2 / (r0 + r1 + r2)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3};

    #[test]
    fn test_tangential_length() {
        let m = TangentialMetric;
        assert!((m.length(0.0, 0.0) - 2.0).abs() < 1e-15);
        assert!((m.length(1.0_f64.ln(), 2.0_f64.ln()) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_corner_angle() {
        let m = TangentialMetric;
        assert!((m.corner_angle(2.0, 2.0, 2.0).unwrap() - FRAC_PI_3).abs() < 1e-12);
        assert!((m.corner_angle(5.0, 3.0, 4.0).unwrap() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_corner_angle_rejects_broken_triangle() {
        let m = TangentialMetric;
        assert_eq!(m.corner_angle(10.0, 1.0, 1.0), None);
        assert_eq!(m.corner_angle(1.0, 0.0, 0.0), None);
    }

    #[test]
    fn test_unit_circles_conductance() {
        // Three unit circles: centers form a side-2 equilateral triangle with inradius 1/sqrt(3).
        let w = TangentialMetric.face_conductance([0.0; 3]);
        assert!((w - 1.0 / 3.0_f64.sqrt()).abs() < 1e-12);
    }
}
