//! Bezier curve primitives.
//!
//! Quadratic and cubic curves, flattened into polylines for stroking.

use crate::flatten::{FlattenOptions, flatten_cubic, flatten_quadratic};
use glam::Vec2;

/// A quadratic Bezier curve (one control point).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier {
    pub from: Vec2,
    pub control: Vec2,
    pub to: Vec2,
}

impl QuadraticBezier {
    pub fn new(from: Vec2, control: Vec2, to: Vec2) -> Self {
        Self { from, control, to }
    }

    /// Adaptive polyline approximation, from `from` to `to` inclusive.
    pub fn flatten(&self, options: &FlattenOptions) -> Vec<Vec2> {
        flatten_quadratic(self.from, self.control, self.to, options)
    }
}

/// A cubic Bezier curve (two control points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub from: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub to: Vec2,
}

impl CubicBezier {
    pub fn new(from: Vec2, control1: Vec2, control2: Vec2, to: Vec2) -> Self {
        Self {
            from,
            control1,
            control2,
            to,
        }
    }

    /// Adaptive polyline approximation, from `from` to `to` inclusive.
    pub fn flatten(&self, options: &FlattenOptions) -> Vec<Vec2> {
        flatten_cubic(self.from, self.control1, self.control2, self.to, options)
    }
}
