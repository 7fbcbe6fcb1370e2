//! Stroke Stats Example - Headless tessellation with gloss-geometry
//!
//! This example demonstrates:
//! - Tessellating a zigzag polyline with each join style
//! - Collecting the meshes into one vertex buffer
//! - Rendering through a sink and inspecting the draw calls
//!
//! Run with `RUST_LOG=gloss_geometry=trace` to see every buffer mutation.

use glam::Vec2;
use gloss_core::Color;
use gloss_core::logging;
use gloss_core::profiling::{ProfilingBackend, init_profiling, new_frame};
use gloss_geometry::{
    AttributeMask, CubicBezier, FlattenOptions, GeometryResult, GeometrySink, LineCap, LineJoin,
    PrimitiveMode, StrokeStyle, StrokeVertex, VertexAttribute, VertexBuffer, tessellate_circle,
    tessellate_cubic, tessellate_polyline,
};
use std::ops::Range;

/// Sink that only logs what it receives.
struct LogSink;

impl GeometrySink for LogSink {
    fn upload(&self, vertices: &[u8], indices: &[u8]) {
        tracing::info!("upload: {} vertex bytes, {} index bytes", vertices.len(), indices.len());
    }

    fn bind_attributes(&self, attributes: &[VertexAttribute], stride: usize) {
        tracing::info!("bind: {} attributes, stride {}", attributes.len(), stride);
    }

    fn draw(&self, mode: PrimitiveMode, indices: Range<u32>) {
        tracing::info!("draw: {:?} {:?}", mode, indices);
    }

    fn finish(&self) {
        tracing::info!("finish");
    }
}

fn main() -> GeometryResult<()> {
    logging::init();
    if std::env::var_os("GLOSS_PROFILE").is_some() {
        init_profiling(ProfilingBackend::PuffinHttp);
    }
    new_frame();

    let points: Vec<Vec2> = (0..8)
        .map(|i| Vec2::new(i as f32 * 40.0, if i % 2 == 0 { 0.0 } else { 60.0 }))
        .collect();

    let mut buffer = VertexBuffer::for_vertex::<StrokeVertex>()?;
    for join in [LineJoin::Miter, LineJoin::Bevel, LineJoin::Round] {
        let style = StrokeStyle::new(Color::from_hex(0x3366cc), 4.0)
            .with_line_join(join)
            .with_line_cap(LineCap::Round);
        let mesh = tessellate_polyline(&points, &style)?;
        tracing::info!(
            "{:?}: {} vertices, {} triangles",
            join,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        buffer.append_mesh(&mesh)?;
    }

    let curve = CubicBezier::new(
        Vec2::new(0.0, 100.0),
        Vec2::new(80.0, 250.0),
        Vec2::new(200.0, -50.0),
        Vec2::new(280.0, 100.0),
    );
    let mesh = tessellate_cubic(&curve, &StrokeStyle::new(Color::RED, 0.5), &FlattenOptions::default());
    buffer.append_mesh(&mesh)?;

    let sink = LogSink;
    let items = buffer.size();
    {
        let scope = buffer.render_setup(&sink, PrimitiveMode::Triangles, AttributeMask::all());
        for item in 0..items {
            scope.render_item(item)?;
        }
    }

    let circle = tessellate_circle(Vec2::new(50.0, 50.0), 20.0, 2.0, Color::GREEN);
    tracing::info!("circle: {} vertices", circle.vertex_count());

    Ok(())
}
