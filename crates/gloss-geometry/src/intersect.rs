//! Segment and line intersection.

use glam::Vec2;

const EPSILON: f32 = 1e-9;

/// How two segments (or their supporting lines) meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// The lines are parallel and distinct.
    Parallel,
    /// The infinite lines cross outside at least one of the segments.
    Lines(Vec2),
    /// The segments themselves cross, or they are coincident.
    Segments(Vec2),
}

impl Intersection {
    /// Numeric classification: 0 parallel, 1 lines, 2 segments.
    pub fn code(&self) -> u8 {
        match self {
            Intersection::Parallel => 0,
            Intersection::Lines(_) => 1,
            Intersection::Segments(_) => 2,
        }
    }

    /// The intersection point, zero for parallel lines.
    pub fn point(&self) -> Vec2 {
        match self {
            Intersection::Parallel => Vec2::ZERO,
            Intersection::Lines(p) | Intersection::Segments(p) => *p,
        }
    }

    /// The intersection point, or `None` for parallel lines.
    pub fn try_point(&self) -> Option<Vec2> {
        match self {
            Intersection::Parallel => None,
            Intersection::Lines(p) | Intersection::Segments(p) => Some(*p),
        }
    }

    /// Whether the segments themselves cross.
    pub fn is_segment(&self) -> bool {
        matches!(self, Intersection::Segments(_))
    }
}

/// Intersect segment `p1 p2` with segment `p3 p4`.
///
/// Coincident segments report [`Intersection::Segments`] at the midpoint of
/// the first segment.
pub fn intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Intersection {
    let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    let numer_a = (p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x);
    let numer_b = (p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x);

    if numer_a.abs() < EPSILON && numer_b.abs() < EPSILON && denom.abs() < EPSILON {
        return Intersection::Segments((p1 + p2) * 0.5);
    }

    if denom.abs() < EPSILON {
        return Intersection::Parallel;
    }

    let mu_a = numer_a / denom;
    let mu_b = numer_b / denom;
    let point = p1 + (p2 - p1) * mu_a;

    if !(0.0..=1.0).contains(&mu_a) || !(0.0..=1.0).contains(&mu_b) {
        Intersection::Lines(point)
    } else {
        Intersection::Segments(point)
    }
}
