//! Trait abstracting the GPU side of a vertex buffer.
//!
//! A [`GeometrySink`] receives vertex and index bytes, the attribute layout to
//! bind and the index ranges to draw. [`VertexBuffer`](crate::VertexBuffer)
//! only talks to the GPU through this trait, so tests can record the calls
//! with a mock sink and applications can plug in [`WgpuSink`](crate::WgpuSink)
//! or their own backend.

use crate::format::VertexAttribute;
use std::ops::Range;

/// How indices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveMode {
    #[default]
    Triangles,
    TriangleStrip,
    Lines,
    LineStrip,
    Points,
}

/// Receiver of geometry uploads and draw calls.
///
/// Methods take `&self`; implementations that record or buffer state use
/// interior mutability. The trait is object safe.
///
/// # Example
///
/// ```rust
/// use gloss_geometry::{GeometrySink, PrimitiveMode, VertexAttribute};
/// use std::ops::Range;
///
/// struct CountingSink(std::sync::atomic::AtomicUsize);
///
/// impl GeometrySink for CountingSink {
///     fn upload(&self, _vertices: &[u8], _indices: &[u8]) {}
///     fn bind_attributes(&self, _attributes: &[VertexAttribute], _stride: usize) {}
///     fn draw(&self, _mode: PrimitiveMode, _indices: Range<u32>) {
///         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
///     }
/// }
///
/// let sink: &dyn GeometrySink = &CountingSink(Default::default());
/// sink.draw(PrimitiveMode::Triangles, 0..3);
/// ```
pub trait GeometrySink: Send + Sync {
    /// Replace the GPU copy of the vertex and index data.
    ///
    /// `indices` holds native-endian `u32` values.
    fn upload(&self, vertices: &[u8], indices: &[u8]);

    /// Bind the given attributes of vertices `stride` bytes apart.
    fn bind_attributes(&self, attributes: &[VertexAttribute], stride: usize);

    /// Draw the given range of the uploaded indices.
    fn draw(&self, mode: PrimitiveMode, indices: Range<u32>);

    /// Called once a batch of draws is complete.
    fn finish(&self) {}
}
