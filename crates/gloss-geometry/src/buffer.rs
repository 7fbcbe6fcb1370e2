//! Growable indexed geometry with per-item bookkeeping.
//!
//! A [`VertexBuffer`] stores raw vertex bytes laid out according to a
//! [`VertexFormat`], a `u32` index array and the list of [`Item`]s that were
//! added to it. Each item owns one contiguous range of vertices and one of
//! indices; items partition both arrays in order. Indices are stored
//! absolute, so inserting or erasing an item rebases every index after it.
//!
//! # Example
//!
//! ```rust
//! use gloss_geometry::{StrokeStyle, VertexBuffer, StrokeVertex, tessellate_line};
//! use glam::Vec2;
//!
//! let mut buffer = VertexBuffer::for_vertex::<StrokeVertex>().unwrap();
//! let mesh = tessellate_line(Vec2::ZERO, Vec2::new(10.0, 0.0), &StrokeStyle::default());
//! let item = buffer.append_mesh(&mesh).unwrap();
//!
//! assert_eq!(item, 0);
//! assert_eq!(buffer.vertex_count(), 8);
//! assert_eq!(buffer.index_count(), 18);
//! ```

use crate::error::{GeometryError, GeometryResult};
use crate::format::{AttributeMask, VertexFormat};
use crate::sink::{GeometrySink, PrimitiveMode};
use crate::vertex::{TessellatedMesh, VertexLayout};
use gloss_core::profiling::profile_function;
use std::ops::Range;

/// The ranges one append or insert occupies in a [`VertexBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Item {
    pub vertex_start: usize,
    pub vertex_count: usize,
    pub index_start: usize,
    pub index_count: usize,
}

impl Item {
    pub fn vertex_range(&self) -> Range<usize> {
        self.vertex_start..self.vertex_start + self.vertex_count
    }

    pub fn index_range(&self) -> Range<usize> {
        self.index_start..self.index_start + self.index_count
    }
}

/// CPU-side vertex and index storage, drawn through a [`GeometrySink`].
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    format: VertexFormat,
    mode: PrimitiveMode,
    vertices: Vec<u8>,
    indices: Vec<u32>,
    items: Vec<Item>,
    dirty: bool,
}

impl VertexBuffer {
    /// Create an empty buffer for the given format descriptor.
    pub fn new(format: &str) -> GeometryResult<Self> {
        Ok(Self::with_format(VertexFormat::parse(format)?))
    }

    /// Create an empty buffer laid out like `V`.
    pub fn for_vertex<V: VertexLayout>() -> GeometryResult<Self> {
        Ok(Self::with_format(V::format()?))
    }

    /// Create an empty buffer from a parsed format.
    pub fn with_format(format: VertexFormat) -> Self {
        tracing::trace!("Creating vertex buffer with format '{}'", format);
        Self {
            format,
            mode: PrimitiveMode::default(),
            vertices: Vec::new(),
            indices: Vec::new(),
            items: Vec::new(),
            dirty: true,
        }
    }

    /// Set the primitive mode used by [`Self::render_item`].
    pub fn with_mode(mut self, mode: PrimitiveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> PrimitiveMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PrimitiveMode) {
        self.mode = mode;
    }

    pub fn format(&self) -> &VertexFormat {
        &self.format
    }

    /// Number of items.
    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.format.stride()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Raw vertex bytes.
    pub fn vertices(&self) -> &[u8] {
        &self.vertices
    }

    /// Copy the vertices out as `V`.
    pub fn vertices_as<V: VertexLayout>(&self) -> GeometryResult<Vec<V>> {
        self.check_layout::<V>()?;
        Ok(self
            .vertices
            .chunks_exact(self.format.stride())
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }

    /// Absolute indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn item(&self, index: usize) -> Option<Item> {
        self.items.get(index).copied()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// An item's vertex bytes and its indices relative to its first vertex.
    pub fn item_data(&self, index: usize) -> GeometryResult<(&[u8], Vec<u32>)> {
        let item = self.checked_item(index)?;
        let stride = self.format.stride();
        let range = item.vertex_range();
        let base = item.vertex_start as u32;

        Ok((
            &self.vertices[range.start * stride..range.end * stride],
            self.indices[item.index_range()]
                .iter()
                .map(|i| i - base)
                .collect(),
        ))
    }

    /// Whether the CPU data changed since the last upload.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Append typed vertices as a new last item.
    ///
    /// `indices` are relative to `vertices`. Returns the new item's index.
    pub fn append<V: VertexLayout>(&mut self, vertices: &[V], indices: &[u32]) -> GeometryResult<usize> {
        self.insert(self.items.len(), vertices, indices)
    }

    pub fn append_mesh<V: VertexLayout>(&mut self, mesh: &TessellatedMesh<V>) -> GeometryResult<usize> {
        self.append(&mesh.vertices, &mesh.indices)
    }

    /// Append raw vertex bytes, which must be whole vertices of this format.
    pub fn append_bytes(&mut self, vertices: &[u8], indices: &[u32]) -> GeometryResult<usize> {
        self.insert_bytes(self.items.len(), vertices, indices)
    }

    /// Insert typed vertices as a new item before item `at`.
    ///
    /// `at == size()` appends.
    pub fn insert<V: VertexLayout>(
        &mut self,
        at: usize,
        vertices: &[V],
        indices: &[u32],
    ) -> GeometryResult<usize> {
        self.check_layout::<V>()?;
        self.insert_bytes(at, bytemuck::cast_slice(vertices), indices)
    }

    pub fn insert_mesh<V: VertexLayout>(
        &mut self,
        at: usize,
        mesh: &TessellatedMesh<V>,
    ) -> GeometryResult<usize> {
        self.insert(at, &mesh.vertices, &mesh.indices)
    }

    /// Insert raw vertex bytes as a new item before item `at`.
    pub fn insert_bytes(&mut self, at: usize, vertices: &[u8], indices: &[u32]) -> GeometryResult<usize> {
        profile_function!();

        if at > self.items.len() {
            return Err(GeometryError::ItemOutOfRange {
                index: at,
                len: self.items.len(),
            });
        }

        let stride = self.format.stride();
        if vertices.len() % stride != 0 {
            return Err(GeometryError::InvalidVertexData {
                len: vertices.len(),
                stride,
            });
        }
        let count = vertices.len() / stride;

        if let Some(&index) = indices.iter().find(|&&i| i as usize >= count) {
            tracing::warn!("Rejecting batch: index {} with {} vertices", index, count);
            return Err(GeometryError::IndexOutOfBounds {
                index,
                vertex_count: count,
            });
        }

        let (vertex_start, index_start) = match self.items.get(at) {
            Some(next) => (next.vertex_start, next.index_start),
            None => (self.vertex_count(), self.index_count()),
        };

        let base = vertex_start as u32;
        let shift = count as u32;
        for index in self.indices.iter_mut().filter(|i| **i >= base) {
            *index += shift;
        }

        let byte_start = vertex_start * stride;
        self.vertices
            .splice(byte_start..byte_start, vertices.iter().copied());
        self.indices
            .splice(index_start..index_start, indices.iter().map(|i| i + base));

        for item in &mut self.items[at..] {
            item.vertex_start += count;
            item.index_start += indices.len();
        }
        self.items.insert(
            at,
            Item {
                vertex_start,
                vertex_count: count,
                index_start,
                index_count: indices.len(),
            },
        );
        self.dirty = true;

        tracing::trace!(
            "Inserted item {} with {} vertices, {} indices ({} items total)",
            at,
            count,
            indices.len(),
            self.items.len()
        );

        Ok(at)
    }

    /// Remove an item and its vertices and indices.
    ///
    /// Fails without modifying the buffer if another item's indices reference
    /// the item's vertices.
    pub fn erase(&mut self, index: usize) -> GeometryResult<()> {
        profile_function!();

        let item = self.checked_item(index)?;
        let vertices = item.vertex_range();
        let own_indices = item.index_range();

        let shared = self.indices.iter().enumerate().any(|(position, &i)| {
            !own_indices.contains(&position) && vertices.contains(&(i as usize))
        });
        if shared {
            tracing::warn!("Refusing to erase item {}: its vertices are shared", index);
            return Err(GeometryError::SharedGeometry { item: index });
        }

        let stride = self.format.stride();
        self.vertices
            .drain(vertices.start * stride..vertices.end * stride);
        self.indices.drain(own_indices);

        let end = vertices.end as u32;
        let shift = item.vertex_count as u32;
        for i in self.indices.iter_mut().filter(|i| **i >= end) {
            *i -= shift;
        }

        self.items.remove(index);
        for later in &mut self.items[index..] {
            later.vertex_start -= item.vertex_count;
            later.index_start -= item.index_count;
        }
        self.dirty = true;

        tracing::trace!(
            "Erased item {} ({} vertices, {} indices)",
            index,
            item.vertex_count,
            item.index_count
        );

        Ok(())
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.items.clear();
        self.dirty = true;
        tracing::trace!("Cleared vertex buffer");
    }

    /// Push the CPU data to the sink.
    pub fn upload(&mut self, sink: &dyn GeometrySink) {
        profile_function!();

        tracing::debug!(
            "Uploading {} vertices ({} bytes), {} indices",
            self.vertex_count(),
            self.vertices.len(),
            self.indices.len()
        );
        sink.upload(&self.vertices, bytemuck::cast_slice(&self.indices));
        self.dirty = false;
    }

    /// Draw every item at once.
    pub fn render(&mut self, sink: &dyn GeometrySink, mode: PrimitiveMode, attributes: AttributeMask) {
        let scope = self.render_setup(sink, mode, attributes);
        scope.render_all();
    }

    /// Upload if needed and bind, returning a scope for drawing items one by
    /// one. Dropping the scope finishes the batch.
    pub fn render_setup<'a>(
        &'a mut self,
        sink: &'a dyn GeometrySink,
        mode: PrimitiveMode,
        attributes: AttributeMask,
    ) -> RenderScope<'a> {
        if self.dirty {
            self.upload(sink);
        }
        sink.bind_attributes(&self.format.select(attributes), self.format.stride());

        RenderScope {
            buffer: self,
            sink,
            mode,
        }
    }

    /// Draw one item with the buffer's mode, assuming it is already bound.
    pub fn render_item(&self, sink: &dyn GeometrySink, index: usize) -> GeometryResult<()> {
        let item = self.checked_item(index)?;
        sink.draw(self.mode, to_u32_range(item.index_range()));
        Ok(())
    }

    fn checked_item(&self, index: usize) -> GeometryResult<Item> {
        self.item(index).ok_or(GeometryError::ItemOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    fn check_layout<V: VertexLayout>(&self) -> GeometryResult<()> {
        let found = V::format()?;
        if self.format.is_compatible(&found) {
            Ok(())
        } else {
            Err(GeometryError::LayoutMismatch {
                expected: self.format.to_string(),
                found: found.to_string(),
            })
        }
    }
}

fn to_u32_range(range: Range<usize>) -> Range<u32> {
    range.start as u32..range.end as u32
}

/// A bound buffer, ready to draw.
///
/// Created by [`VertexBuffer::render_setup`]; calls
/// [`GeometrySink::finish`] when dropped.
pub struct RenderScope<'a> {
    buffer: &'a VertexBuffer,
    sink: &'a dyn GeometrySink,
    mode: PrimitiveMode,
}

impl RenderScope<'_> {
    /// Draw one item.
    pub fn render_item(&self, index: usize) -> GeometryResult<()> {
        let item = self.buffer.checked_item(index)?;
        self.sink.draw(self.mode, to_u32_range(item.index_range()));
        Ok(())
    }

    /// Draw every item in one call.
    pub fn render_all(&self) {
        self.sink
            .draw(self.mode, 0..self.buffer.index_count() as u32);
    }
}

impl Drop for RenderScope<'_> {
    fn drop(&mut self) {
        self.sink.finish();
    }
}
