//! Adaptive flattening of Bezier curves into polylines.
//!
//! Curves are subdivided with de Casteljau's construction until each piece is
//! flat enough: the control points lie within a distance tolerance of the
//! chord and the tangent direction turns by less than an angle tolerance.
//! All arithmetic runs in `f64`.

use glam::{DVec2, Vec2};
use gloss_core::profiling::profile_function;
use std::f64::consts::PI;

const COLLINEARITY_EPSILON: f64 = 1e-30;
const ANGLE_TOLERANCE_EPSILON: f64 = 0.01;

/// Tolerances for curve flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenOptions {
    /// Scale from curve units to device pixels. Larger values give finer output.
    pub approximation_scale: f64,
    /// Maximum turn between consecutive segments, in radians.
    ///
    /// Values below 0.01 disable the angle test.
    pub angle_tolerance: f64,
    /// Angle above which a control point is emitted as a sharp corner.
    ///
    /// Zero disables cusp detection.
    pub cusp_limit: f64,
    /// Subdivision depth past which a piece is accepted as flat.
    pub recursion_limit: u32,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            approximation_scale: 1.0,
            angle_tolerance: 15f64.to_radians(),
            cusp_limit: 0.0,
            recursion_limit: 32,
        }
    }
}

impl FlattenOptions {
    pub fn with_approximation_scale(mut self, scale: f64) -> Self {
        self.approximation_scale = scale;
        self
    }

    pub fn with_angle_tolerance(mut self, radians: f64) -> Self {
        self.angle_tolerance = radians;
        self
    }

    pub fn with_cusp_limit(mut self, radians: f64) -> Self {
        self.cusp_limit = radians;
        self
    }

    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    fn distance_tolerance_sq(&self) -> f64 {
        let tolerance = 0.5 / self.approximation_scale;
        tolerance * tolerance
    }
}

/// Flatten a quadratic Bezier curve.
///
/// The result starts at `from` and ends at `to`.
pub fn flatten_quadratic(from: Vec2, control: Vec2, to: Vec2, options: &FlattenOptions) -> Vec<Vec2> {
    profile_function!();

    let mut flattener = Flattener::new(options);
    flattener.points.push(from);

    let mut stack = vec![(
        [from.as_dvec2(), control.as_dvec2(), to.as_dvec2()],
        0u32,
    )];

    while let Some(([p1, p2, p3], level)) = stack.pop() {
        if level > options.recursion_limit {
            continue;
        }
        if flattener.quadratic_is_flat(p1, p2, p3) {
            continue;
        }

        let p12 = (p1 + p2) * 0.5;
        let p23 = (p2 + p3) * 0.5;
        let p123 = (p12 + p23) * 0.5;

        stack.push(([p123, p23, p3], level + 1));
        stack.push(([p1, p12, p123], level + 1));
    }

    flattener.points.push(to);
    flattener.points
}

/// Flatten a cubic Bezier curve.
///
/// The result starts at `from` and ends at `to`.
pub fn flatten_cubic(
    from: Vec2,
    control1: Vec2,
    control2: Vec2,
    to: Vec2,
    options: &FlattenOptions,
) -> Vec<Vec2> {
    profile_function!();

    let mut flattener = Flattener::new(options);
    flattener.points.push(from);

    let mut stack = vec![(
        [
            from.as_dvec2(),
            control1.as_dvec2(),
            control2.as_dvec2(),
            to.as_dvec2(),
        ],
        0u32,
    )];

    while let Some(([p1, p2, p3, p4], level)) = stack.pop() {
        if level > options.recursion_limit {
            continue;
        }
        if flattener.cubic_is_flat(p1, p2, p3, p4) {
            continue;
        }

        let p12 = (p1 + p2) * 0.5;
        let p23 = (p2 + p3) * 0.5;
        let p34 = (p3 + p4) * 0.5;
        let p123 = (p12 + p23) * 0.5;
        let p234 = (p23 + p34) * 0.5;
        let p1234 = (p123 + p234) * 0.5;

        stack.push(([p1234, p234, p34, p4], level + 1));
        stack.push(([p1, p12, p123, p1234], level + 1));
    }

    flattener.points.push(to);
    flattener.points
}

struct Flattener<'a> {
    options: &'a FlattenOptions,
    tolerance_sq: f64,
    points: Vec<Vec2>,
}

impl<'a> Flattener<'a> {
    fn new(options: &'a FlattenOptions) -> Self {
        Self {
            options,
            tolerance_sq: options.distance_tolerance_sq(),
            points: Vec::new(),
        }
    }

    fn emit(&mut self, point: DVec2) {
        self.points.push(point.as_vec2());
    }

    fn angle_test_disabled(&self) -> bool {
        self.options.angle_tolerance < ANGLE_TOLERANCE_EPSILON
    }

    fn cusp_enabled(&self) -> bool {
        self.options.cusp_limit != 0.0
    }

    /// Decide whether the piece is done, emitting any points it contributes.
    fn quadratic_is_flat(&mut self, p1: DVec2, p2: DVec2, p3: DVec2) -> bool {
        let chord = p3 - p1;
        let chord_sq = chord.length_squared();
        let deviation = ((p2 - p3).perp_dot(chord)).abs();

        if deviation > COLLINEARITY_EPSILON {
            if deviation * deviation <= self.tolerance_sq * chord_sq {
                let midpoint = ((p1 + p2) * 0.5 + (p2 + p3) * 0.5) * 0.5;
                if self.angle_test_disabled() {
                    self.emit(midpoint);
                    return true;
                }

                let angle = turn_angle(p1, p2, p3);
                if angle < self.options.angle_tolerance {
                    self.emit(midpoint);
                    return true;
                }
            }
            return false;
        }

        let distance_sq = if chord_sq == 0.0 {
            p1.distance_squared(p2)
        } else {
            let t = (p2 - p1).dot(chord) / chord_sq;
            if t > 0.0 && t < 1.0 {
                // 1---2---3: the endpoints are enough.
                return true;
            }
            if t <= 0.0 {
                p2.distance_squared(p1)
            } else {
                p2.distance_squared(p3)
            }
        };

        if distance_sq < self.tolerance_sq {
            self.emit(p2);
            return true;
        }
        false
    }

    fn cubic_is_flat(&mut self, p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> bool {
        let chord = p4 - p1;
        let chord_sq = chord.length_squared();
        let d2 = ((p2 - p4).perp_dot(chord)).abs();
        let d3 = ((p3 - p4).perp_dot(chord)).abs();
        let p23 = (p2 + p3) * 0.5;

        match (d2 > COLLINEARITY_EPSILON, d3 > COLLINEARITY_EPSILON) {
            (false, false) => {
                let (d2, d3) = if chord_sq == 0.0 {
                    (p1.distance_squared(p2), p4.distance_squared(p3))
                } else {
                    let t2 = (p2 - p1).dot(chord) / chord_sq;
                    let t3 = (p3 - p1).dot(chord) / chord_sq;
                    if t2 > 0.0 && t2 < 1.0 && t3 > 0.0 && t3 < 1.0 {
                        // 1---2---3---4: the endpoints are enough.
                        return true;
                    }
                    (
                        collinear_distance_sq(p2, p1, p4, t2),
                        collinear_distance_sq(p3, p1, p4, t3),
                    )
                };

                if d2 > d3 {
                    if d2 < self.tolerance_sq {
                        self.emit(p2);
                        return true;
                    }
                } else if d3 < self.tolerance_sq {
                    self.emit(p3);
                    return true;
                }
                false
            }
            (false, true) => {
                // p1, p2, p4 collinear; p3 carries the curvature.
                if d3 * d3 > self.tolerance_sq * chord_sq {
                    return false;
                }
                if self.angle_test_disabled() {
                    self.emit(p23);
                    return true;
                }

                let angle = turn_angle(p2, p3, p4);
                if angle < self.options.angle_tolerance {
                    self.emit(p2);
                    self.emit(p3);
                    return true;
                }
                if self.cusp_enabled() && angle > self.options.cusp_limit {
                    self.emit(p3);
                    return true;
                }
                false
            }
            (true, false) => {
                // p1, p3, p4 collinear; p2 carries the curvature.
                if d2 * d2 > self.tolerance_sq * chord_sq {
                    return false;
                }
                if self.angle_test_disabled() {
                    self.emit(p23);
                    return true;
                }

                let angle = turn_angle(p1, p2, p3);
                if angle < self.options.angle_tolerance {
                    self.emit(p2);
                    self.emit(p3);
                    return true;
                }
                if self.cusp_enabled() && angle > self.options.cusp_limit {
                    self.emit(p2);
                    return true;
                }
                false
            }
            (true, true) => {
                if (d2 + d3) * (d2 + d3) > self.tolerance_sq * chord_sq {
                    return false;
                }
                if self.angle_test_disabled() {
                    self.emit(p23);
                    return true;
                }

                let angle1 = turn_angle(p1, p2, p3);
                let angle2 = turn_angle(p2, p3, p4);
                if angle1 + angle2 < self.options.angle_tolerance {
                    self.emit(p23);
                    return true;
                }
                if self.cusp_enabled() {
                    if angle1 > self.options.cusp_limit {
                        self.emit(p2);
                        return true;
                    }
                    if angle2 > self.options.cusp_limit {
                        self.emit(p3);
                        return true;
                    }
                }
                false
            }
        }
    }
}

/// Turn between `a -> b` and `b -> c`, wrapped into `[0, pi]`.
fn turn_angle(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    let incoming = (b.y - a.y).atan2(b.x - a.x);
    let outgoing = (c.y - b.y).atan2(c.x - b.x);
    let angle = (outgoing - incoming).abs();
    if angle >= PI { 2.0 * PI - angle } else { angle }
}

/// Squared distance from a collinear control point to the chord, given its
/// projection parameter `t` on `start -> end`.
fn collinear_distance_sq(point: DVec2, start: DVec2, end: DVec2, t: f64) -> f64 {
    if t <= 0.0 {
        point.distance_squared(start)
    } else if t >= 1.0 {
        point.distance_squared(end)
    } else {
        point.distance_squared(start + (end - start) * t)
    }
}
