//! Segment geometry for swipe detection

use glam::Vec2;

/// Closest point on segment `[a, b]` to `p`
///
/// Projects `p` onto the segment line and clamps the parameter to [0, 1].
/// A degenerate segment (a == b) collapses to `a`.
#[inline]
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let line_vec = b - a;
    let len_sq = line_vec.length_squared();
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(line_vec) / len_sq).clamp(0.0, 1.0);
    a + line_vec * t
}

/// Euclidean distance from `p` to the closest point on segment `[a, b]`
#[inline]
pub fn distance_point_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    (p - closest_point_on_segment(p, a, b)).length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_perpendicular_distance() {
        let d = distance_point_to_segment(Vec2::new(5.0, 3.0), Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_clamps_to_endpoints() {
        let a = Vec2::ZERO;
        let b = Vec2::new(10.0, 0.0);
        // Beyond b: distance to b
        let d = distance_point_to_segment(Vec2::new(13.0, 4.0), a, b);
        assert!((d - 5.0).abs() < 1e-5);
        // Before a: distance to a
        let d = distance_point_to_segment(Vec2::new(-3.0, -4.0), a, b);
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_segment() {
        let a = Vec2::new(2.0, 2.0);
        let d = distance_point_to_segment(Vec2::new(5.0, 6.0), a, a);
        assert!((d - 5.0).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_point_on_segment_is_zero(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            t in 0.0f32..=1.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            let p = a.lerp(b, t);
            prop_assert!(distance_point_to_segment(p, a, b) < 1e-2);
        }

        #[test]
        fn prop_never_exceeds_endpoint_distance(
            px in -500.0f32..500.0, py in -500.0f32..500.0,
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
        ) {
            let p = Vec2::new(px, py);
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            let d = distance_point_to_segment(p, a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= p.distance(a) + 1e-3);
            prop_assert!(d <= p.distance(b) + 1e-3);
        }
    }
}
