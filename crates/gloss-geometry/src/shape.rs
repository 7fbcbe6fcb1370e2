//! Single-quad and single-triangle shapes.
//!
//! Circles and ellipses are one quad whose coverage is computed by the
//! shader from the quad-local coordinates. Triangle markers are one triangle
//! grown outwards to fit the feather, with per-vertex distances to the
//! opposite edge. Polygons are a fan of triangle markers.

use crate::error::{GeometryError, GeometryResult};
use crate::intersect::intersect;
use crate::vertex::{CircleVertex, EllipseVertex, StrokeVertex, TessellatedMesh};
use glam::Vec2;
use gloss_core::Color;
use gloss_core::math::{orthogonal, to_position};

/// Filter support of the marker shader, in pixels.
const MARKER_SUPPORT: f32 = 0.75;

/// Tessellate a circle outline of the given radius and stroke thickness.
///
/// The quad extends one pixel past the radius to leave room for the feather.
pub fn tessellate_circle(
    center: Vec2,
    radius: f32,
    thickness: f32,
    color: Color,
) -> TessellatedMesh<CircleVertex> {
    let half_extent = radius.max(0.0) + 1.0;
    let scale = if radius > 0.0 {
        half_extent / radius
    } else {
        tracing::trace!("Circle with radius {} drawn unscaled", radius);
        1.0
    };

    let corner = |sx: f32, sy: f32| {
        let p = center + Vec2::new(sx, sy) * half_extent;
        CircleVertex::new(to_position(p), color, [-sx * scale, -sy * scale, radius, thickness])
    };

    TessellatedMesh::from_data(
        vec![
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}

/// Tessellate a filled triangle marker with an antialiased edge.
///
/// Thickness below one pixel is drawn as one pixel with reduced alpha.
pub fn tessellate_triangle(
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    thickness: f32,
    color: Color,
) -> TessellatedMesh<StrokeVertex> {
    let color = color.fade(thickness.clamp(0.0, 1.0));
    let thickness = thickness.max(1.0);
    let w = (2.5 * MARKER_SUPPORT + thickness).ceil() * 0.5;

    // Counter-clockwise winding keeps every offset pointing outwards.
    let (p1, p2) = if (p1 - p0).perp_dot(p2 - p0) < 0.0 {
        (p2, p1)
    } else {
        (p1, p2)
    };

    let o0 = orthogonal(p1, p0) * w;
    let o1 = orthogonal(p2, p1) * w;
    let o2 = orthogonal(p0, p2) * w;

    let corner = |a: Vec2, a2: Vec2, b: Vec2, b2: Vec2, fallback: Vec2| {
        intersect(a, a2, b, b2).try_point().unwrap_or(fallback)
    };
    let q0 = corner(p0 + o0, p1 + o0, p0 + o2, p2 + o2, p0 + o0 + o2);
    let q1 = corner(p1 + o1, p2 + o1, p0 + o0, p1 + o0, p1 + o0 + o1);
    let q2 = corner(p0 + o2, p2 + o2, p1 + o1, p2 + o1, p2 + o1 + o2);

    let area = (q2 - q0).perp_dot(q1 - q0).abs();
    let height = |edge: Vec2| {
        let length = edge.length();
        if length > 0.0 { area / length } else { 0.0 }
    };

    TessellatedMesh::from_data(
        vec![
            StrokeVertex::new(to_position(q0), color, [height(q2 - q1), 0.0, 0.0]),
            StrokeVertex::new(to_position(q1), color, [0.0, height(q2 - q0), 0.0]),
            StrokeVertex::new(to_position(q2), color, [0.0, 0.0, height(q1 - q0)]),
        ],
        vec![0, 1, 2],
    )
}

/// Tessellate an ellipse outline with radii `radii`, rotated by `angle`
/// radians about its center.
///
/// The quad is sized in whole pixels around the unrotated ellipse; its
/// texcoords stay in that unrotated frame so the shader can evaluate the
/// implicit equation directly.
pub fn tessellate_ellipse(
    center: Vec2,
    radii: Vec2,
    angle: f32,
    thickness: f32,
    color: Color,
) -> TessellatedMesh<EllipseVertex> {
    let color = color.fade(thickness.clamp(0.0, 1.0));
    let thickness = thickness.max(1.0);
    let extent = (radii.abs() + Vec2::splat(thickness * 0.5 + 2.5 * MARKER_SUPPORT)).ceil();
    let rotation = Vec2::from_angle(angle);

    let corner = |sx: f32, sy: f32| {
        let local = Vec2::new(sx, sy) * extent;
        EllipseVertex::new(
            to_position(center + rotation.rotate(local)),
            color,
            [local.x, local.y, radii.x, radii.y],
            thickness,
        )
    };

    TessellatedMesh::from_data(
        vec![
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}

/// Tessellate a filled polygon as a fan of triangle markers around its
/// centroid.
///
/// Only convex and star-shaped polygons (seen from the centroid) are filled
/// correctly.
pub fn tessellate_polygon(
    points: &[Vec2],
    thickness: f32,
    color: Color,
) -> GeometryResult<TessellatedMesh<StrokeVertex>> {
    if points.len() < 3 {
        tracing::warn!("Rejecting polygon with {} points", points.len());
        return Err(GeometryError::NotEnoughPoints {
            required: 3,
            found: points.len(),
        });
    }

    let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;
    let mut mesh = TessellatedMesh::with_capacity(3 * points.len(), 3 * points.len());
    for (i, &p) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        mesh.extend(tessellate_triangle(centroid, p, next, thickness, color));
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy(v: &[f32; 3]) -> Vec2 {
        Vec2::new(v[0], v[1])
    }

    #[test]
    fn test_circle_quad() {
        let mesh = tessellate_circle(Vec2::new(50.0, 50.0), 10.0, 1.0, Color::RED);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);

        assert_eq!(xy(&mesh.vertices[0].position), Vec2::new(39.0, 39.0));
        assert_eq!(xy(&mesh.vertices[2].position), Vec2::new(61.0, 61.0));
        assert!((mesh.vertices[0].tex_coord[0] - 1.1).abs() < 1e-6);
        assert!((mesh.vertices[1].tex_coord[0] + 1.1).abs() < 1e-6);
        assert_eq!(mesh.vertices[3].tex_coord[2..], [10.0, 1.0]);
    }

    #[test]
    fn test_zero_radius_circle_is_finite() {
        let mesh = tessellate_circle(Vec2::ZERO, 0.0, 1.0, Color::RED);
        assert_eq!(mesh.vertex_count(), 4);
        assert!(
            mesh.vertices
                .iter()
                .all(|v| v.tex_coord.iter().all(|c| c.is_finite()))
        );
    }

    #[test]
    fn test_triangle_grows_outwards() {
        let p0 = Vec2::new(0.0, 0.0);
        let p1 = Vec2::new(30.0, 0.0);
        let p2 = Vec2::new(0.0, 30.0);
        let mesh = tessellate_triangle(p0, p1, p2, 1.0, Color::BLACK);

        assert_eq!(mesh.indices, vec![0, 1, 2]);
        // w = ceil(1.875 + 1) / 2 = 1.5
        assert!((xy(&mesh.vertices[0].position) - Vec2::new(-1.5, -1.5)).length() < 1e-4);

        // Each vertex is the only one with a non-zero distance in its slot.
        for (n, v) in mesh.vertices.iter().enumerate() {
            for slot in 0..3 {
                assert_eq!(v.tex_coord[slot] > 0.0, slot == n);
            }
        }
    }

    #[test]
    fn test_triangle_winding_is_normalized() {
        let ccw = tessellate_triangle(
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(0.0, 30.0),
            2.0,
            Color::BLACK,
        );
        let cw = tessellate_triangle(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 30.0),
            Vec2::new(30.0, 0.0),
            2.0,
            Color::BLACK,
        );
        assert_eq!(ccw, cw);
    }

    #[test]
    fn test_thin_triangle_fades() {
        let mesh = tessellate_triangle(
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(0.0, 30.0),
            0.5,
            Color::BLACK,
        );
        assert!(mesh.vertices.iter().all(|v| v.color[3] == 0.5));
    }

    #[test]
    fn test_ellipse_quad_covers_radii() {
        let mesh = tessellate_ellipse(
            Vec2::new(50.0, 40.0),
            Vec2::new(20.0, 10.0),
            0.0,
            1.0,
            Color::BLUE,
        );
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);

        // ceil(20 + 0.5 + 1.875) = 23, ceil(10 + 0.5 + 1.875) = 13
        assert_eq!(xy(&mesh.vertices[0].position), Vec2::new(27.0, 27.0));
        assert_eq!(xy(&mesh.vertices[2].position), Vec2::new(73.0, 53.0));
        assert_eq!(mesh.vertices[0].tex_coord, [-23.0, -13.0, 20.0, 10.0]);
        assert_eq!(mesh.vertices[2].tex_coord, [23.0, 13.0, 20.0, 10.0]);
        assert!(mesh.vertices.iter().all(|v| v.thickness == 1.0));
    }

    #[test]
    fn test_ellipse_rotation_keeps_texcoords() {
        let center = Vec2::new(10.0, 10.0);
        let radii = Vec2::new(20.0, 10.0);
        let flat = tessellate_ellipse(center, radii, 0.0, 2.0, Color::BLACK);
        let turned = tessellate_ellipse(
            center,
            radii,
            std::f32::consts::FRAC_PI_2,
            2.0,
            Color::BLACK,
        );

        for (a, b) in flat.vertices.iter().zip(&turned.vertices) {
            assert_eq!(a.tex_coord, b.tex_coord);
            // A quarter turn maps (x, y) to (-y, x) around the center.
            let offset = xy(&a.position) - center;
            let expected = center + Vec2::new(-offset.y, offset.x);
            assert!((xy(&b.position) - expected).length() < 1e-3);
        }
    }

    #[test]
    fn test_thin_ellipse_fades() {
        let mesh = tessellate_ellipse(Vec2::ZERO, Vec2::new(5.0, 3.0), 0.0, 0.25, Color::BLACK);
        assert!(mesh.vertices.iter().all(|v| v.color[3] == 0.25));
        assert!(mesh.vertices.iter().all(|v| v.thickness == 1.0));
    }

    #[test]
    fn test_polygon_fans_from_centroid() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(0.0, 20.0),
        ];
        let mesh = tessellate_polygon(&square, 1.0, Color::RED).unwrap();
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.indices, (0..12).collect::<Vec<u32>>());

        let centroid = Vec2::new(10.0, 10.0);
        let first = tessellate_triangle(centroid, square[0], square[1], 1.0, Color::RED);
        assert_eq!(mesh.vertices[..3], first.vertices[..]);
        let last = tessellate_triangle(centroid, square[3], square[0], 1.0, Color::RED);
        assert_eq!(mesh.vertices[9..], last.vertices[..]);
    }

    #[test]
    fn test_polygon_needs_three_points() {
        assert_eq!(
            tessellate_polygon(&[Vec2::ZERO, Vec2::ONE], 1.0, Color::RED),
            Err(GeometryError::NotEnoughPoints {
                required: 3,
                found: 2
            })
        );
    }
}
