//! Error types for tessellation and geometry buffers.

use std::fmt;

/// Errors raised when a caller breaks a precondition of the geometry API.
///
/// Geometric degeneracies (parallel segments, zero-length tangents) are not
/// errors; they produce defined geometry instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// A vertex format descriptor could not be parsed.
    InvalidFormat {
        /// The descriptor as given.
        descriptor: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Vertex data does not match the buffer's declared format.
    LayoutMismatch {
        /// The buffer's format.
        expected: String,
        /// The format of the incoming data.
        found: String,
    },

    /// Raw vertex bytes are not a whole number of vertices.
    InvalidVertexData {
        /// Number of bytes provided.
        len: usize,
        /// Size of one vertex.
        stride: usize,
    },

    /// A batch-local index points past the vertices of its batch.
    IndexOutOfBounds {
        /// The offending index value.
        index: u32,
        /// Number of vertices in the batch.
        vertex_count: usize,
    },

    /// An item index is out of range.
    ItemOutOfRange {
        /// The requested item.
        index: usize,
        /// Number of items in the buffer.
        len: usize,
    },

    /// Erasing an item would leave indices of other items dangling.
    SharedGeometry {
        /// The item being erased.
        item: usize,
    },

    /// A primitive was given too few points.
    NotEnoughPoints {
        /// Minimum number of points.
        required: usize,
        /// Number of points given.
        found: usize,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::InvalidFormat { descriptor, reason } => {
                write!(f, "Invalid vertex format '{}': {}", descriptor, reason)
            }
            GeometryError::LayoutMismatch { expected, found } => write!(
                f,
                "Vertex layout mismatch: buffer expects '{}' but got '{}'",
                expected, found
            ),
            GeometryError::InvalidVertexData { len, stride } => write!(
                f,
                "Vertex data of {} bytes is not a multiple of the {}-byte stride",
                len, stride
            ),
            GeometryError::IndexOutOfBounds {
                index,
                vertex_count,
            } => write!(
                f,
                "Index {} is out of bounds for a batch of {} vertices",
                index, vertex_count
            ),
            GeometryError::ItemOutOfRange { index, len } => {
                write!(f, "Item {} is out of range (buffer has {} items)", index, len)
            }
            GeometryError::SharedGeometry { item } => write!(
                f,
                "Item {} shares vertices with other items and cannot be erased",
                item
            ),
            GeometryError::NotEnoughPoints { required, found } => write!(
                f,
                "Expected at least {} points, got {}",
                required, found
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_values() {
        let err = GeometryError::ItemOutOfRange { index: 4, len: 2 };
        let message = err.to_string();
        assert!(message.contains('4'));
        assert!(message.contains('2'));
    }

    #[test]
    fn test_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&GeometryError::SharedGeometry { item: 0 });
    }
}
