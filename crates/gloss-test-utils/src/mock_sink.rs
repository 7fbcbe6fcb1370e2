//! Mock implementation of GeometrySink for testing.
//!
//! This module provides a sink that records every call instead of talking to
//! a GPU.

use gloss_geometry::{GeometrySink, PrimitiveMode, VertexAttribute};
use parking_lot::Mutex;
use std::ops::Range;

/// Records a sink call for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Upload {
        vertex_bytes: Vec<u8>,
        index_bytes: Vec<u8>,
    },
    BindAttributes {
        attributes: Vec<VertexAttribute>,
        stride: usize,
    },
    Draw {
        mode: PrimitiveMode,
        range: Range<u32>,
    },
    Finish,
}

/// Mock implementation of GeometrySink for testing.
///
/// # Example
///
/// ```rust
/// use gloss_geometry::{GeometrySink, PrimitiveMode};
/// use gloss_test_utils::MockSink;
///
/// let mock = MockSink::new();
/// mock.draw(PrimitiveMode::Triangles, 0..6);
///
/// assert_eq!(mock.count_draws(), 1);
/// assert_eq!(mock.draws(), vec![(PrimitiveMode::Triangles, 0..6)]);
/// ```
pub struct MockSink {
    /// Recorded calls for verification
    calls: Mutex<Vec<RenderCall>>,
}

impl MockSink {
    /// Create a new mock sink.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Get a copy of all recorded calls (for test assertions).
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    /// Count upload calls.
    pub fn count_uploads(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RenderCall::Upload { .. }))
            .count()
    }

    /// Count attribute bindings.
    pub fn count_binds(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RenderCall::BindAttributes { .. }))
            .count()
    }

    /// Count draw calls.
    pub fn count_draws(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RenderCall::Draw { .. }))
            .count()
    }

    /// Count finished batches.
    pub fn count_finishes(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RenderCall::Finish))
            .count()
    }

    /// The mode and index range of every draw, in order.
    pub fn draws(&self) -> Vec<(PrimitiveMode, Range<u32>)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RenderCall::Draw { mode, range } => Some((*mode, range.clone())),
                _ => None,
            })
            .collect()
    }

    /// The indices of the most recent upload, decoded.
    pub fn last_uploaded_indices(&self) -> Option<Vec<u32>> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            RenderCall::Upload { index_bytes, .. } => Some(
                index_bytes
                    .chunks_exact(4)
                    .map(|b| u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
                    .collect(),
            ),
            _ => None,
        })
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Get total number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometrySink for MockSink {
    fn upload(&self, vertices: &[u8], indices: &[u8]) {
        self.calls.lock().push(RenderCall::Upload {
            vertex_bytes: vertices.to_vec(),
            index_bytes: indices.to_vec(),
        });
    }

    fn bind_attributes(&self, attributes: &[VertexAttribute], stride: usize) {
        self.calls.lock().push(RenderCall::BindAttributes {
            attributes: attributes.to_vec(),
            stride,
        });
    }

    fn draw(&self, mode: PrimitiveMode, indices: Range<u32>) {
        self.calls.lock().push(RenderCall::Draw {
            mode,
            range: indices,
        });
    }

    fn finish(&self) {
        self.calls.lock().push(RenderCall::Finish);
    }
}
