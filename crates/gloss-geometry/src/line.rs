//! Antialiased quad strips for segments and flattened curves.
//!
//! A strip of `n` points has a cap pair, one body pair per point and a closing
//! cap pair: `2n + 4` vertices and `6(n + 1)` indices. Texcoord x runs from
//! `-d` over the start cap, 0 to 1 along the body, to `1 + d` over the end
//! cap; texcoord y is `-d` on the right side and `+d` on the left.

use crate::curve::{CubicBezier, QuadraticBezier};
use crate::error::{GeometryError, GeometryResult};
use crate::flatten::FlattenOptions;
use crate::stroke::{StrokeStyle, StrokeWidth};
use crate::vertex::{StrokeVertex, TessellatedMesh};
use glam::Vec2;
use gloss_core::math::{tangent, to_position};
use gloss_core::profiling::profile_function;

/// Offset added after rounding so thin lines land on pixel centers.
const PIXEL_SNAP_OFFSET: f32 = 0.315;

/// Tessellate a single segment from `a` to `b`.
///
/// Always 8 vertices and 18 indices.
pub fn tessellate_line(a: Vec2, b: Vec2, style: &StrokeStyle) -> TessellatedMesh<StrokeVertex> {
    profile_function!();

    let (a, b) = if style.pixel_snap {
        (snap(a), snap(b))
    } else {
        (a, b)
    };

    extrude(&[a, b], &style.width())
}

/// Tessellate an open polyline as one continuous strip with no joins.
///
/// Suited to densely sampled curves; use
/// [`tessellate_polyline`](crate::tessellate_polyline) for sharp corners.
pub fn tessellate_strip(
    points: &[Vec2],
    style: &StrokeStyle,
) -> GeometryResult<TessellatedMesh<StrokeVertex>> {
    profile_function!();

    if points.len() < 2 {
        tracing::warn!("Rejecting strip with {} points", points.len());
        return Err(GeometryError::NotEnoughPoints {
            required: 2,
            found: points.len(),
        });
    }

    Ok(extrude(points, &style.width()))
}

/// Flatten and tessellate a quadratic curve.
pub fn tessellate_quadratic(
    curve: &QuadraticBezier,
    style: &StrokeStyle,
    options: &FlattenOptions,
) -> TessellatedMesh<StrokeVertex> {
    profile_function!();
    extrude(&curve.flatten(options), &style.width())
}

/// Flatten and tessellate a cubic curve.
pub fn tessellate_cubic(
    curve: &CubicBezier,
    style: &StrokeStyle,
    options: &FlattenOptions,
) -> TessellatedMesh<StrokeVertex> {
    profile_function!();
    extrude(&curve.flatten(options), &style.width())
}

fn snap(p: Vec2) -> Vec2 {
    p.round() + Vec2::splat(PIXEL_SNAP_OFFSET)
}

/// Build the strip. `points` holds at least two entries.
fn extrude(points: &[Vec2], width: &StrokeWidth) -> TessellatedMesh<StrokeVertex> {
    let n = points.len();
    let half = width.half();
    let d = width.feather;
    let color = width.color;

    let vertex = |p: Vec2, u: f32, v: f32| StrokeVertex::new(to_position(p), color, [u, v, width.thickness]);

    let mut mesh = TessellatedMesh::with_capacity(2 * n + 4, 6 * (n + 1));

    // Repeated points have no direction; caps and body pairs take it from
    // the nearest segment that does.
    let directions: Vec<Vec2> = points.windows(2).map(|w| tangent(w[0], w[1])).collect();
    let start = directions
        .iter()
        .copied()
        .find(|t| *t != Vec2::ZERO)
        .unwrap_or(Vec2::ZERO);
    let end = directions
        .iter()
        .rev()
        .copied()
        .find(|t| *t != Vec2::ZERO)
        .unwrap_or(Vec2::ZERO);

    let first = points[0];
    let o = start.perp();
    mesh.vertices.push(vertex(first + (-o - start) * half, -d, -d));
    mesh.vertices.push(vertex(first + (o - start) * half, -d, d));

    let last_body = (n - 1) as f32;
    let mut o = o;
    for (i, &p) in points.iter().enumerate() {
        if let Some(&t) = i.checked_sub(1).and_then(|prev| directions.get(prev))
            && t != Vec2::ZERO
        {
            o = t.perp();
        }
        let u = i as f32 / last_body;
        mesh.vertices.push(vertex(p - o * half, u, -d));
        mesh.vertices.push(vertex(p + o * half, u, d));
    }

    let last = points[n - 1];
    let o = end.perp();
    mesh.vertices.push(vertex(last + (-o + end) * half, 1.0 + d, -d));
    mesh.vertices.push(vertex(last + (o + end) * half, 1.0 + d, d));

    for i in 0..=n as u32 {
        let base = 2 * i;
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 1, base + 2, base + 3]);
    }

    tracing::trace!(
        "Extruded strip of {} points into {} vertices, {} indices",
        n,
        mesh.vertex_count(),
        mesh.index_count()
    );

    mesh
}
