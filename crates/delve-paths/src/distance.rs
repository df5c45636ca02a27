use delve_core::Point;

/// Manhattan (L1) distance between two points.
#[inline]
pub fn manhattan(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Chebyshev (L∞) distance between two points.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Squared Euclidean distance. Compare against a squared radius to avoid
/// floating point.
#[inline]
pub fn euclidean_sq(a: Point, b: Point) -> i64 {
    let dx = i64::from(a.x - b.x);
    let dy = i64::from(a.y - b.y);
    dx * dx + dy * dy
}

/// Whether `b` lies within Euclidean distance `radius` of `a`.
#[inline]
pub fn within_radius(a: Point, b: Point, radius: i32) -> bool {
    euclidean_sq(a, b) <= i64::from(radius) * i64::from(radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        let a = Point::new(1, 1);
        let b = Point::new(4, 5);
        assert_eq!(manhattan(a, b), 7);
        assert_eq!(chebyshev(a, b), 4);
        assert_eq!(euclidean_sq(a, b), 25);
        assert!(within_radius(a, b, 5));
        assert!(!within_radius(a, b, 4));
    }
}
