//! [`GeometrySink`] backed by `wgpu` buffers.
//!
//! Uploads land in a vertex and an index buffer that grow to the next power
//! of two when the data outgrows them. Draws are recorded and replayed into a
//! render pass with [`WgpuSink::encode_with`], which hands each change of
//! [`PrimitiveMode`] to the caller to bind a pipeline whose vertex layout
//! matches [`WgpuSink::vertex_layout`].

use crate::format::{AttributeKind, ComponentType, VertexAttribute};
use crate::sink::{GeometrySink, PrimitiveMode};
use parking_lot::Mutex;
use std::ops::Range;

/// A draw recorded by [`WgpuSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDraw {
    pub mode: PrimitiveMode,
    pub indices: Range<u32>,
}

/// Owned copy of the bound vertex layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WgpuVertexLayout {
    pub stride: u64,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl WgpuVertexLayout {
    /// Borrow as a `wgpu` layout for pipeline creation.
    pub fn as_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

struct GrowableBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
}

#[derive(Default)]
struct SinkState {
    vertices: Option<GrowableBuffer>,
    indices: Option<GrowableBuffer>,
    layout: WgpuVertexLayout,
    draws: Vec<RecordedDraw>,
}

/// Sink writing to `wgpu` buffers.
pub struct WgpuSink {
    device: wgpu::Device,
    queue: wgpu::Queue,
    state: Mutex<SinkState>,
}

impl WgpuSink {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            state: Mutex::new(SinkState::default()),
        }
    }

    /// The layout from the last [`GeometrySink::bind_attributes`] call.
    pub fn vertex_layout(&self) -> WgpuVertexLayout {
        self.state.lock().layout.clone()
    }

    /// Draws recorded since the last [`Self::encode`].
    pub fn pending_draws(&self) -> Vec<RecordedDraw> {
        self.state.lock().draws.clone()
    }

    /// Replay the recorded draws into `pass` and forget them.
    ///
    /// The pass must already have a pipeline bound, and every draw goes
    /// through it regardless of its [`PrimitiveMode`]. Use
    /// [`Self::encode_with`] when draws of different modes were recorded.
    pub fn encode(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.encode_with(pass, |_, _| {});
    }

    /// Replay the recorded draws into `pass`, calling `bind` before each run
    /// of draws sharing a mode so it can set the pipeline whose topology
    /// matches [`primitive_topology`].
    pub fn encode_with<F>(&self, pass: &mut wgpu::RenderPass<'_>, mut bind: F)
    where
        F: FnMut(&mut wgpu::RenderPass<'_>, PrimitiveMode),
    {
        let mut state = self.state.lock();
        let draws = std::mem::take(&mut state.draws);

        let (Some(vertices), Some(indices)) = (&state.vertices, &state.indices) else {
            if !draws.is_empty() {
                tracing::warn!("Dropping {} draws recorded before any upload", draws.len());
            }
            return;
        };

        pass.set_vertex_buffer(0, vertices.buffer.slice(..));
        pass.set_index_buffer(indices.buffer.slice(..), wgpu::IndexFormat::Uint32);
        for (mode, run) in mode_runs(&draws) {
            bind(&mut *pass, mode);
            for draw in &draws[run] {
                pass.draw_indexed(draw.indices.clone(), 0, 0..1);
            }
        }
    }

    fn write(&self, slot: &mut Option<GrowableBuffer>, usage: wgpu::BufferUsages, label: &str, data: &[u8]) {
        let padded = padded_len(data.len() as u64);

        let needs_growth = slot.as_ref().is_none_or(|current| current.capacity < padded);
        if needs_growth {
            let capacity = padded.next_power_of_two();
            tracing::debug!("Growing {} to {} bytes", label, capacity);
            *slot = Some(GrowableBuffer {
                buffer: self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(label),
                    size: capacity,
                    usage: usage | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }),
                capacity,
            });
        }

        let Some(target) = slot.as_ref() else {
            return;
        };
        if data.is_empty() {
            return;
        }
        if padded == data.len() as u64 {
            self.queue.write_buffer(&target.buffer, 0, data);
        } else {
            let mut bytes = data.to_vec();
            bytes.resize(padded as usize, 0);
            self.queue.write_buffer(&target.buffer, 0, &bytes);
        }
    }
}

impl GeometrySink for WgpuSink {
    fn upload(&self, vertices: &[u8], indices: &[u8]) {
        let mut state = self.state.lock();
        self.write(
            &mut state.vertices,
            wgpu::BufferUsages::VERTEX,
            "Gloss Vertex Buffer",
            vertices,
        );
        self.write(
            &mut state.indices,
            wgpu::BufferUsages::INDEX,
            "Gloss Index Buffer",
            indices,
        );
    }

    fn bind_attributes(&self, attributes: &[VertexAttribute], stride: usize) {
        let attributes = attributes
            .iter()
            .enumerate()
            .filter_map(|(location, attribute)| {
                let Some(format) = vertex_format(attribute) else {
                    tracing::warn!(
                        "No wgpu vertex format for {:?} x{} {:?}, skipping",
                        attribute.kind,
                        attribute.components,
                        attribute.component_type
                    );
                    return None;
                };
                Some(wgpu::VertexAttribute {
                    format,
                    offset: attribute.offset as u64,
                    shader_location: location as u32,
                })
            })
            .collect();

        self.state.lock().layout = WgpuVertexLayout {
            stride: stride as u64,
            attributes,
        };
    }

    fn draw(&self, mode: PrimitiveMode, indices: Range<u32>) {
        self.state.lock().draws.push(RecordedDraw { mode, indices });
    }
}

/// Topology matching a primitive mode.
pub fn primitive_topology(mode: PrimitiveMode) -> wgpu::PrimitiveTopology {
    match mode {
        PrimitiveMode::Triangles => wgpu::PrimitiveTopology::TriangleList,
        PrimitiveMode::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        PrimitiveMode::Lines => wgpu::PrimitiveTopology::LineList,
        PrimitiveMode::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        PrimitiveMode::Points => wgpu::PrimitiveTopology::PointList,
    }
}

/// `wgpu` format for an attribute, if one exists.
///
/// 8-bit colors are normalized; other integer attributes are not.
pub fn vertex_format(attribute: &VertexAttribute) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as F;

    let color = matches!(
        attribute.kind,
        AttributeKind::Color | AttributeKind::SecondaryColor
    );

    Some(match (attribute.component_type, attribute.components) {
        (ComponentType::F32, 1) => F::Float32,
        (ComponentType::F32, 2) => F::Float32x2,
        (ComponentType::F32, 3) => F::Float32x3,
        (ComponentType::F32, 4) => F::Float32x4,
        (ComponentType::F64, 1) => F::Float64,
        (ComponentType::F64, 2) => F::Float64x2,
        (ComponentType::F64, 3) => F::Float64x3,
        (ComponentType::F64, 4) => F::Float64x4,
        (ComponentType::U32, 1) => F::Uint32,
        (ComponentType::U32, 2) => F::Uint32x2,
        (ComponentType::U32, 3) => F::Uint32x3,
        (ComponentType::U32, 4) => F::Uint32x4,
        (ComponentType::I32, 1) => F::Sint32,
        (ComponentType::I32, 2) => F::Sint32x2,
        (ComponentType::I32, 3) => F::Sint32x3,
        (ComponentType::I32, 4) => F::Sint32x4,
        (ComponentType::U8, 2) if color => F::Unorm8x2,
        (ComponentType::U8, 4) if color => F::Unorm8x4,
        (ComponentType::U8, 2) => F::Uint8x2,
        (ComponentType::U8, 4) => F::Uint8x4,
        (ComponentType::I8, 2) => F::Sint8x2,
        (ComponentType::I8, 4) => F::Sint8x4,
        (ComponentType::U16, 2) => F::Uint16x2,
        (ComponentType::U16, 4) => F::Uint16x4,
        (ComponentType::I16, 2) => F::Sint16x2,
        (ComponentType::I16, 4) => F::Sint16x4,
        _ => return None,
    })
}

/// Split draws into consecutive runs that share a mode.
fn mode_runs(draws: &[RecordedDraw]) -> Vec<(PrimitiveMode, Range<usize>)> {
    let mut runs: Vec<(PrimitiveMode, Range<usize>)> = Vec::new();
    for (i, draw) in draws.iter().enumerate() {
        match runs.last_mut() {
            Some((mode, run)) if *mode == draw.mode => run.end = i + 1,
            _ => runs.push((draw.mode, i..i + 1)),
        }
    }
    runs
}

fn padded_len(len: u64) -> u64 {
    let align = wgpu::COPY_BUFFER_ALIGNMENT;
    (len.div_ceil(align) * align).max(align)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::VertexFormat;

    #[test]
    fn test_stroke_layout_formats() {
        let format = VertexFormat::parse("v3f:c4f:t3f").unwrap();
        let formats: Vec<_> = format
            .attributes()
            .iter()
            .map(|a| vertex_format(a).unwrap())
            .collect();
        assert_eq!(
            formats,
            vec![
                wgpu::VertexFormat::Float32x3,
                wgpu::VertexFormat::Float32x4,
                wgpu::VertexFormat::Float32x3
            ]
        );
    }

    #[test]
    fn test_byte_colors_are_normalized() {
        let format = VertexFormat::parse("v2f:c4B:2B").unwrap();
        assert_eq!(
            vertex_format(&format.attributes()[1]),
            Some(wgpu::VertexFormat::Unorm8x4)
        );
        // The positional third slot is a tex coord, not a color.
        assert_eq!(
            vertex_format(&format.attributes()[2]),
            Some(wgpu::VertexFormat::Uint8x2)
        );
    }

    #[test]
    fn test_unsupported_formats() {
        let format = VertexFormat::parse("v3f:c3B").unwrap();
        assert_eq!(vertex_format(&format.attributes()[1]), None);
    }

    #[test]
    fn test_padding() {
        assert_eq!(padded_len(0), 4);
        assert_eq!(padded_len(4), 4);
        assert_eq!(padded_len(41), 44);
    }

    #[test]
    fn test_mode_runs_split_on_change() {
        let draw = |mode, indices: Range<u32>| RecordedDraw { mode, indices };
        let draws = vec![
            draw(PrimitiveMode::Triangles, 0..6),
            draw(PrimitiveMode::Triangles, 6..12),
            draw(PrimitiveMode::Lines, 12..14),
            draw(PrimitiveMode::Triangles, 14..20),
        ];
        assert_eq!(
            mode_runs(&draws),
            vec![
                (PrimitiveMode::Triangles, 0..2),
                (PrimitiveMode::Lines, 2..3),
                (PrimitiveMode::Triangles, 3..4),
            ]
        );
        assert!(mode_runs(&[]).is_empty());
    }

    #[test]
    fn test_topology() {
        assert_eq!(
            primitive_topology(PrimitiveMode::Triangles),
            wgpu::PrimitiveTopology::TriangleList
        );
        assert_eq!(
            primitive_topology(PrimitiveMode::LineStrip),
            wgpu::PrimitiveTopology::LineStrip
        );
    }
}
