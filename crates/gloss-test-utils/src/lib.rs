//! Test utilities for Gloss.
//!
//! This crate provides a recording [`GeometrySink`](gloss_geometry::GeometrySink)
//! so vertex buffer uploads, attribute bindings and draws can be asserted on
//! without a GPU.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use gloss_geometry::{AttributeMask, PrimitiveMode, StrokeVertex, VertexBuffer};
//! use gloss_test_utils::MockSink;
//!
//! let mut buffer = VertexBuffer::for_vertex::<StrokeVertex>().unwrap();
//! let sink = MockSink::new();
//! buffer.render(&sink, PrimitiveMode::Triangles, AttributeMask::all());
//!
//! assert_eq!(sink.count_uploads(), 1);
//! assert_eq!(sink.count_draws(), 1);
//! assert_eq!(sink.count_finishes(), 1);
//! # }
//! ```
//!
//! Mock sinks use `Mutex` for interior mutability, since
//! [`GeometrySink`](gloss_geometry::GeometrySink) methods take `&self` and
//! the trait requires `Send + Sync`.

#[cfg(feature = "mock")]
pub mod mock_sink;

#[cfg(feature = "mock")]
pub use mock_sink::*;
