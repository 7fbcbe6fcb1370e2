//! Vector math for tessellation.
//!
//! Re-exports the [`glam`] types used across the gloss crates and adds the
//! handful of direction helpers every stroke builder needs.
//!
//! # Examples
//!
//! ```
//! use gloss_core::math::{tangent, orthogonal, Vec2};
//!
//! let t = tangent(Vec2::ZERO, Vec2::new(10.0, 0.0));
//! assert_eq!(t, Vec2::X);
//! assert_eq!(orthogonal(Vec2::ZERO, Vec2::new(10.0, 0.0)), Vec2::Y);
//! ```
//!
//! [`glam`]: https://docs.rs/glam

pub use glam::{DVec2, Vec2, Vec3, Vec4};

/// Unit direction from `from` to `to`.
///
/// Coincident points yield [`Vec2::ZERO`] rather than NaN.
#[inline]
pub fn tangent(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Unit direction from `from` to `to`, rotated 90° counter-clockwise.
#[inline]
pub fn orthogonal(from: Vec2, to: Vec2) -> Vec2 {
    tangent(from, to).perp()
}

/// Lift a 2D point onto the `z = 0` plane as a packed position.
#[inline]
pub fn to_position(p: Vec2) -> [f32; 3] {
    [p.x, p.y, 0.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tangent_is_unit() {
        let t = tangent(Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0));
        assert!((t.length() - 1.0).abs() < 1e-6);
        assert!((t - Vec2::new(0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_tangent_of_coincident_points() {
        let p = Vec2::new(3.0, -2.0);
        assert_eq!(tangent(p, p), Vec2::ZERO);
        assert_eq!(orthogonal(p, p), Vec2::ZERO);
    }

    #[test]
    fn test_orthogonal_rotates_counter_clockwise() {
        let o = orthogonal(Vec2::ZERO, Vec2::new(0.0, 2.0));
        assert!((o - Vec2::new(-1.0, 0.0)).length() < 1e-6);
    }
}
