//! Polyline strokes with joins and caps.
//!
//! ```text
//!      A1-------------------J---I
//!                               |
//!      A--------------------B   K
//!                           |   |
//!      A2---------------L   |   |
//!                       |   |   |
//!                      C2   C   C1
//! ```
//!
//! Each interior point `B` of the polyline gets a [`JointFrame`] built from
//! its neighbours. The frame is turned into geometry by three micro-mesh
//! builders: [`start_cap`] for the first frame, [`joint`] for every frame and
//! [`end_cap`] for the last one. [`tessellate_polyline`] concatenates them.

use crate::error::{GeometryError, GeometryResult};
use crate::intersect::{Intersection, intersect};
use crate::stroke::{LineCap, LineJoin, StrokeStyle, StrokeWidth};
use crate::vertex::{StrokeVertex, TessellatedMesh};
use glam::Vec2;
use gloss_core::math::{orthogonal, tangent, to_position};
use gloss_core::profiling::{profile_function, profile_scope};

/// Which offset side of a joint is treated as the outside of the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointSide {
    /// The `A2`/`C2` offset lines cross between `A` and `C`.
    Canonical,
    /// They do not; the two sides are swapped.
    Mirrored,
}

/// Offset points around one interior polyline point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointFrame {
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
    pub a1: Vec2,
    pub a2: Vec2,
    pub c1: Vec2,
    pub c2: Vec2,
    /// Apex on the `A1` side.
    pub i: Vec2,
    /// Offset of `B` along the incoming segment, outer side.
    pub j: Vec2,
    /// Offset of `B` along the outgoing segment, outer side.
    pub k: Vec2,
    /// Apex on the `A2` side.
    pub l: Vec2,
    pub side: JointSide,
}

impl JointFrame {
    /// Build the frame for the triple `a, b, c`.
    ///
    /// `carried` holds the `(A1, A2)` offsets of `a`; pass `None` for the first
    /// joint to offset `a` by half the width.
    pub fn new(a: Vec2, b: Vec2, c: Vec2, carried: Option<(Vec2, Vec2)>, half_width: f32) -> Self {
        let o_ab = orthogonal(a, b);
        let o_cb = orthogonal(c, b);
        let t_ba = b - a;
        let t_bc = b - c;

        let (mut a1, mut a2) = carried.unwrap_or((a + o_ab * half_width, a - o_ab * half_width));
        let mut c1 = c - o_cb * half_width;
        let mut c2 = c + o_cb * half_width;

        let hit_i = intersect(a1, a1 + t_ba, c1, c1 + t_bc);
        let hit_l = intersect(a2, a2 + t_ba, c2, c2 + t_bc);

        // Straight or reversing joints have no single apex; slide the
        // incoming offsets up to B instead.
        let straight = tangent(a, b).perp_dot(tangent(c, b)).abs() <= f32::EPSILON;
        let apex = |hit: Intersection, offset: Vec2| match hit {
            Intersection::Lines(p) | Intersection::Segments(p) if !straight => p,
            _ => {
                tracing::trace!("Degenerate joint at {:?}, using offset apex", b);
                b + (offset - a)
            }
        };
        let mut i = apex(hit_i, a1);
        let mut l = apex(hit_l, a2);

        let side = if hit_l.is_segment() {
            JointSide::Canonical
        } else {
            JointSide::Mirrored
        };

        let (j, k) = match side {
            JointSide::Canonical => (b + o_ab * half_width, b - o_cb * half_width),
            JointSide::Mirrored => {
                std::mem::swap(&mut i, &mut l);
                std::mem::swap(&mut a1, &mut a2);
                std::mem::swap(&mut c1, &mut c2);
                (b - o_ab * half_width, b + o_cb * half_width)
            }
        };

        Self {
            a,
            b,
            c,
            a1,
            a2,
            c1,
            c2,
            i,
            j,
            k,
            l,
            side,
        }
    }

    /// The `(A1, A2)` offsets the next joint starts from.
    pub fn carry(&self) -> (Vec2, Vec2) {
        match self.side {
            JointSide::Canonical => (self.k, self.l),
            JointSide::Mirrored => (self.l, self.k),
        }
    }
}

/// Vertex and index count of one joint.
pub fn joint_counts(join: LineJoin) -> (usize, usize) {
    match join {
        LineJoin::Bevel => (6, 9),
        LineJoin::Miter => (6, 12),
        LineJoin::Round => (10, 12),
    }
}

/// Vertex and index count of a polyline of `points` points.
pub fn polyline_counts(points: usize, join: LineJoin) -> (usize, usize) {
    let joints = points.saturating_sub(2);
    let (vertices, indices) = joint_counts(join);
    (4 + vertices * joints + 8, 6 + indices * joints + 12)
}

/// Tessellate an open polyline of at least three points.
pub fn tessellate_polyline(
    points: &[Vec2],
    style: &StrokeStyle,
) -> GeometryResult<TessellatedMesh<StrokeVertex>> {
    profile_function!();

    if points.len() < 3 {
        tracing::warn!("Rejecting polyline with {} points", points.len());
        return Err(GeometryError::NotEnoughPoints {
            required: 3,
            found: points.len(),
        });
    }

    let width = style.width();
    let (vertex_count, index_count) = polyline_counts(points.len(), style.line_join);
    let mut mesh = TessellatedMesh::with_capacity(vertex_count, index_count);

    let mut carried = None;
    let mut last_frame = None;
    for (n, triple) in points.windows(3).enumerate() {
        profile_scope!("joint");

        let frame = JointFrame::new(triple[0], triple[1], triple[2], carried, width.half());
        if n == 0 {
            mesh.extend(start_cap(&frame, &width, style.line_cap));
        }
        mesh.extend(joint(&frame, &width, style.line_join));

        carried = Some(frame.carry());
        last_frame = Some(frame);
    }

    if let Some(frame) = last_frame {
        mesh.extend(end_cap(&frame, &width, style.line_cap));
    }

    tracing::trace!(
        "Tessellated polyline of {} points into {} vertices, {} indices",
        points.len(),
        mesh.vertex_count(),
        mesh.index_count()
    );

    Ok(mesh)
}

/// How far a cap extends past the endpoint, and its texcoord z flag.
///
/// Every cap covers half the width; a negative flag marks a flat cap.
fn cap_extent(cap: LineCap, width: &StrokeWidth) -> (f32, f32) {
    match cap {
        LineCap::Square | LineCap::Butt => (width.half(), -width.thickness),
        LineCap::Round => (width.half(), width.thickness),
    }
}

fn vertex(p: Vec2, width: &StrokeWidth, u: f32, v: f32, z: f32) -> StrokeVertex {
    StrokeVertex::new(to_position(p), width.color, [u, v, z])
}

/// Cap before the first segment: `cA1, cA2, A1, A2`.
pub fn start_cap(frame: &JointFrame, width: &StrokeWidth, cap: LineCap) -> TessellatedMesh<StrokeVertex> {
    let (extent, z) = cap_extent(cap, width);
    let d = width.feather;
    let t = tangent(frame.b, frame.a);

    TessellatedMesh::from_data(
        vec![
            vertex(frame.a1 + t * extent, width, -d, d, z),
            vertex(frame.a2 + t * extent, width, -d, -d, z),
            vertex(frame.a1, width, 0.0, d, z),
            vertex(frame.a2, width, 0.0, -d, z),
        ],
        vec![0, 1, 2, 1, 2, 3],
    )
}

/// Body of the incoming segment plus the corner at `B`.
///
/// Vertices are `A1, A2, I, J, K, L`, followed for round joins by copies
/// `I', J', K', L'` carrying the arc parameters.
pub fn joint(frame: &JointFrame, width: &StrokeWidth, join: LineJoin) -> TessellatedMesh<StrokeVertex> {
    let d = width.feather;
    let t = width.thickness;
    let (vertex_count, index_count) = joint_counts(join);
    let mut mesh = TessellatedMesh::with_capacity(vertex_count, index_count);

    mesh.vertices.extend_from_slice(&[
        vertex(frame.a1, width, 0.0, d, t),
        vertex(frame.a2, width, 0.0, -d, t),
        vertex(frame.i, width, 0.0, d, t),
        vertex(frame.j, width, 0.0, d, t),
        vertex(frame.k, width, 0.0, d, t),
        vertex(frame.l, width, 0.0, -d, t),
    ]);
    mesh.indices.extend_from_slice(&[0, 1, 5, 0, 3, 5]);

    match join {
        LineJoin::Bevel => mesh.indices.extend_from_slice(&[3, 4, 5]),
        LineJoin::Miter => mesh.indices.extend_from_slice(&[2, 3, 5, 2, 4, 5]),
        LineJoin::Round => {
            let jk = frame.j.distance(frame.k);
            let jb = frame.j.distance(frame.b);
            let ib = frame.i.distance(frame.b);
            let jl = frame.j.distance(frame.l);

            let ratio = if jb > 0.0 { 0.5 * jk / jb } else { 0.0 };
            let d1 = if jb > 0.0 { ib / jb * d } else { 0.0 };
            let d2 = ratio * d;
            let d3 = (1.0 - ratio * ratio).max(0.0).sqrt() * d;
            let c = if jl > 0.0 { width.width / jl } else { 0.0 };

            mesh.vertices.extend_from_slice(&[
                vertex(frame.i, width, -d1, 0.0, t),
                vertex(frame.j, width, -d3, d2, t),
                vertex(frame.k, width, -d3, -d2, t),
                vertex(frame.l, width, 2.0 * c * d - d3, 0.0, t),
            ]);
            mesh.indices.extend_from_slice(&[6, 7, 8, 7, 8, 9]);
        }
    }

    mesh
}

/// Body of the last segment followed by the cap after `C`.
///
/// Vertices are `K, L, C1, C2` for the body and `C1, C2, cC1, cC2` for the cap.
pub fn end_cap(frame: &JointFrame, width: &StrokeWidth, cap: LineCap) -> TessellatedMesh<StrokeVertex> {
    let (extent, z) = cap_extent(cap, width);
    let d = width.feather;
    let t = width.thickness;
    let out = tangent(frame.b, frame.c);

    TessellatedMesh::from_data(
        vec![
            vertex(frame.k, width, 0.0, d, t),
            vertex(frame.l, width, 0.0, -d, t),
            vertex(frame.c1, width, 0.0, d, t),
            vertex(frame.c2, width, 0.0, -d, t),
            vertex(frame.c1, width, 0.0, d, z),
            vertex(frame.c2, width, 0.0, -d, z),
            vertex(frame.c1 + out * extent, width, d, d, z),
            vertex(frame.c2 + out * extent, width, d, -d, z),
        ],
        vec![2, 3, 1, 2, 1, 0, 4, 5, 6, 5, 6, 7],
    )
}
