//! Gloss Geometry - Antialiased 2D stroke tessellation
//!
//! This crate provides:
//! - Line, strip, polyline and Bézier stroke tessellation with a feather band
//!   the fragment shader turns into coverage
//! - Circle and triangle marker shapes
//! - Adaptive curve flattening
//! - An indexed vertex buffer with a runtime vertex format, item bookkeeping
//!   and a pluggable GPU sink
//!
//! # Example
//!
//! ```rust
//! use gloss_geometry::*;
//! use glam::Vec2;
//!
//! let style = StrokeStyle::new(gloss_core::Color::RED, 2.0).with_line_join(LineJoin::Round);
//! let points = [Vec2::new(0.0, 0.0), Vec2::new(50.0, 0.0), Vec2::new(50.0, 50.0)];
//! let mesh = tessellate_polyline(&points, &style).unwrap();
//!
//! let mut buffer = VertexBuffer::for_vertex::<StrokeVertex>().unwrap();
//! let item = buffer.append_mesh(&mesh).unwrap();
//! assert_eq!(buffer.item(item).unwrap().index_count, mesh.index_count());
//! ```

// Primitives
mod curve;
mod flatten;
mod intersect;

// Styling
mod stroke;

// Tessellation
mod line;
pub mod polyline;
mod shape;
mod vertex;

// Buffers
mod buffer;
mod error;
mod format;
mod sink;

#[cfg(feature = "wgpu")]
mod wgpu_sink;

// Re-exports
pub use curve::*;
pub use flatten::*;
pub use intersect::*;

pub use stroke::*;

pub use line::*;
pub use polyline::{JointFrame, JointSide, polyline_counts, tessellate_polyline};
pub use shape::*;
pub use vertex::*;

pub use buffer::*;
pub use error::*;
pub use format::*;
pub use sink::*;

#[cfg(feature = "wgpu")]
pub use wgpu_sink::{RecordedDraw, WgpuSink, WgpuVertexLayout, primitive_topology, vertex_format};
