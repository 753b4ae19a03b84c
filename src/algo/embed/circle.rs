//! Circle-circle intersection.

use nalgebra::Point2;

/// A circle in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center.
    pub center: Point2<f64>,
    /// Radius.
    pub radius: f64,
}

impl Circle {
    /// Create a circle.
    pub fn new(center: Point2<f64>, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Result of intersecting two circles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircleIntersection {
    /// The circles do not meet (or are concentric).
    None,
    /// The circles touch in a single point.
    Tangent(Point2<f64>),
    /// The circles cross in two points; the first lies to the left of the
    /// line from the first center to the second.
    Two(Point2<f64>, Point2<f64>),
}

/// Relative slack under which a near-tangency counts as tangent.
const TANGENT_EPS: f64 = 1e-12;

/// Intersect two circles.
///
/// With `d` the distance between the centers, the common chord lies at
/// distance `a = (r0² - r1² + d²) / 2d` from the first center and has half
/// length `h = sqrt(r0² - a²)`.
pub fn intersect(c0: &Circle, c1: &Circle) -> CircleIntersection {
    let delta = c1.center - c0.center;
    let d = delta.norm();
    if !d.is_finite() || d <= 0.0 {
        return CircleIntersection::None;
    }

    let (r0, r1) = (c0.radius, c1.radius);
    let a = (r0 * r0 - r1 * r1 + d * d) / (2.0 * d);
    let h_sq = r0 * r0 - a * a;
    let scale = r0.max(r1).max(d);

    if h_sq < -TANGENT_EPS * scale * scale || h_sq.is_nan() {
        return CircleIntersection::None;
    }

    let dir = delta / d;
    let foot = c0.center + dir * a;
    if h_sq <= TANGENT_EPS * scale * scale {
        return CircleIntersection::Tangent(foot);
    }

    let h = h_sq.sqrt();
    let normal = nalgebra::Vector2::new(-dir.y, dir.x);
    CircleIntersection::Two(foot + normal * h, foot - normal * h)
}

/// `cross(b - a, c - a)`; positive when `a, b, c` turn counter-clockwise.
#[inline]
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_points() {
        let c0 = Circle::new(Point2::new(0.0, 0.0), 5.0);
        let c1 = Circle::new(Point2::new(8.0, 0.0), 5.0);
        match intersect(&c0, &c1) {
            CircleIntersection::Two(p, q) => {
                assert!((p - Point2::new(4.0, 3.0)).norm() < 1e-12);
                assert!((q - Point2::new(4.0, -3.0)).norm() < 1e-12);
            }
            other => panic!("expected two points, got {:?}", other),
        }
    }

    #[test]
    fn test_tangent() {
        let c0 = Circle::new(Point2::new(0.0, 0.0), 1.0);
        let c1 = Circle::new(Point2::new(3.0, 0.0), 2.0);
        match intersect(&c0, &c1) {
            CircleIntersection::Tangent(p) => assert!((p - Point2::new(1.0, 0.0)).norm() < 1e-9),
            other => panic!("expected tangent, got {:?}", other),
        }
    }

    #[test]
    fn test_disjoint_and_nested() {
        let c0 = Circle::new(Point2::new(0.0, 0.0), 1.0);
        assert_eq!(
            intersect(&c0, &Circle::new(Point2::new(5.0, 0.0), 1.0)),
            CircleIntersection::None
        );
        assert_eq!(
            intersect(&c0, &Circle::new(Point2::new(0.1, 0.0), 0.2)),
            CircleIntersection::None
        );
        assert_eq!(intersect(&c0, &c0), CircleIntersection::None);
    }

    #[test]
    fn test_orientation() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert!(orient2d(&a, &b, &Point2::new(0.0, 1.0)) > 0.0);
        assert!(orient2d(&a, &b, &Point2::new(0.0, -1.0)) < 0.0);
    }
}
