//! Positions and distances in parsecs.
//!
//! All range checks go through [`within_range`], which compares squared
//! distances against squared thresholds so that the same pair of points
//! always lands on the same side of a boundary.

use serde::{Deserialize, Serialize};

/// A point in 3D space, in parsecs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// True when every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Squared Euclidean distance.
pub fn distance_sq(a: Vec3, b: Vec3) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    dx * dx + dy * dy + dz * dz
}

/// Euclidean distance in parsecs.
pub fn distance(a: Vec3, b: Vec3) -> f64 {
    distance_sq(a, b).sqrt()
}

/// `distance(a, b) <= range`, evaluated on squares.
pub fn within_range(a: Vec3, b: Vec3, range: f64) -> bool {
    distance_sq(a, b) <= range * range
}

/// Squared-distance form of [`within_range`] for callers that already hold `d²`.
pub fn sq_within(dist_sq: f64, range: f64) -> bool {
    dist_sq <= range * range
}

/// Indices of `points` lying within `range` of `origin`, in order.
pub fn indices_within<I>(points: I, origin: Vec3, range: f64) -> impl Iterator<Item = usize>
where
    I: IntoIterator<Item = Vec3>,
{
    points
        .into_iter()
        .enumerate()
        .filter(move |&(_, p)| within_range(origin, p, range))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_within_keeps_boundary_points() {
        let points = [
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(5.000001, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 4.0),
            Vec3::new(-1.0, 0.0, 0.0),
        ];
        let found: Vec<usize> = indices_within(points, Vec3::default(), 5.0).collect();
        assert_eq!(found, vec![0, 2, 3]);
    }

    #[test]
    fn test_distance_axis_aligned() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(distance_sq(a, b), 25.0);
        assert_eq!(distance(a, b), 5.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let a = Vec3::new(1.5, -2.0, 7.25);
        let b = Vec3::new(-4.0, 3.0, 0.5);
        assert_eq!(distance_sq(a, b), distance_sq(b, a));
    }

    #[test]
    fn test_within_range_is_inclusive() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        assert!(within_range(a, Vec3::new(5.0, 0.0, 0.0), 5.0));
        assert!(within_range(a, Vec3::new(3.0, 4.0, 0.0), 5.0));
        assert!(!within_range(a, Vec3::new(5.0, 0.001, 0.0), 5.0));
    }

    #[test]
    fn test_is_finite() {
        assert!(Vec3::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Vec3::new(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!Vec3::new(0.0, f64::INFINITY, 0.0).is_finite());
    }
}
