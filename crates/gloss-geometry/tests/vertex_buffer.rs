//! Vertex buffer bookkeeping and rendering tests.
//!
//! Rendering goes through a recording sink so the upload, bind and draw
//! sequence can be checked without a GPU.

use glam::Vec2;
use gloss_core::Color;
use gloss_geometry::{
    AttributeKind, AttributeMask, CircleVertex, EllipseVertex, GeometryError, PrimitiveMode,
    StrokeStyle, StrokeVertex, TessellatedMesh, VertexBuffer, tessellate_circle,
    tessellate_ellipse, tessellate_line, tessellate_polyline,
};
use gloss_test_utils::{MockSink, RenderCall};

fn line(length: f32) -> TessellatedMesh<StrokeVertex> {
    tessellate_line(
        Vec2::ZERO,
        Vec2::new(length, 0.0),
        &StrokeStyle::new(Color::BLACK, 1.0),
    )
}

fn corner() -> TessellatedMesh<StrokeVertex> {
    let points = [
        Vec2::new(0.0, 0.0),
        Vec2::new(20.0, 0.0),
        Vec2::new(20.0, 20.0),
    ];
    tessellate_polyline(&points, &StrokeStyle::new(Color::RED, 2.0)).unwrap()
}

fn stroke_buffer() -> VertexBuffer {
    VertexBuffer::for_vertex::<StrokeVertex>().unwrap()
}

/// Items must tile both arrays in order and keep their indices in range.
fn assert_partitioned(buffer: &VertexBuffer) {
    let mut vertex = 0;
    let mut index = 0;
    for item in buffer.items() {
        assert_eq!(item.vertex_start, vertex);
        assert_eq!(item.index_start, index);
        let range = item.vertex_range();
        assert!(
            buffer.indices()[item.index_range()]
                .iter()
                .all(|&i| range.contains(&(i as usize)))
        );
        vertex += item.vertex_count;
        index += item.index_count;
    }
    assert_eq!(vertex, buffer.vertex_count());
    assert_eq!(index, buffer.index_count());
}

// ====================
// Item Bookkeeping
// ====================

#[test]
fn test_append_rebases_indices() {
    let mut buffer = stroke_buffer();
    let first = line(10.0);
    let second = corner();

    assert_eq!(buffer.append_mesh(&first).unwrap(), 0);
    assert_eq!(buffer.append_mesh(&second).unwrap(), 1);
    assert_eq!(buffer.size(), 2);
    assert_partitioned(&buffer);

    let item = buffer.item(1).unwrap();
    assert_eq!(item.vertex_start, 8);
    assert_eq!(buffer.indices()[item.index_range()][0], second.indices[0] + 8);

    let (_, local) = buffer.item_data(1).unwrap();
    assert_eq!(local, second.indices);
}

#[test]
fn test_insert_front_shifts_later_items() {
    let mut buffer = stroke_buffer();
    let first = line(10.0);
    let inserted = corner();

    buffer.append_mesh(&first).unwrap();
    assert_eq!(buffer.insert_mesh(0, &inserted).unwrap(), 0);
    assert_partitioned(&buffer);

    let moved = buffer.item(1).unwrap();
    assert_eq!(moved.vertex_start, inserted.vertex_count());
    assert_eq!(moved.index_start, inserted.index_count());

    let (bytes, local) = buffer.item_data(1).unwrap();
    assert_eq!(bytes, bytemuck::cast_slice::<StrokeVertex, u8>(&first.vertices));
    assert_eq!(local, first.indices);
}

#[test]
fn test_insert_in_middle() {
    let mut buffer = stroke_buffer();
    buffer.append_mesh(&line(10.0)).unwrap();
    buffer.append_mesh(&line(20.0)).unwrap();
    buffer.insert_mesh(1, &corner()).unwrap();

    assert_eq!(buffer.size(), 3);
    assert_partitioned(&buffer);

    let stored = buffer.vertices_as::<StrokeVertex>().unwrap();
    let middle = buffer.item(1).unwrap();
    assert_eq!(stored[middle.vertex_range()], corner().vertices[..]);
}

#[test]
fn test_erase_restores_previous_state() {
    let mut expected = stroke_buffer();
    expected.append_mesh(&line(10.0)).unwrap();
    expected.append_mesh(&line(30.0)).unwrap();

    let mut buffer = stroke_buffer();
    buffer.append_mesh(&line(10.0)).unwrap();
    buffer.append_mesh(&corner()).unwrap();
    buffer.append_mesh(&line(30.0)).unwrap();
    buffer.erase(1).unwrap();

    assert_partitioned(&buffer);
    assert_eq!(buffer.items(), expected.items());
    assert_eq!(buffer.vertices(), expected.vertices());
    assert_eq!(buffer.indices(), expected.indices());
}

#[test]
fn test_erase_everything() {
    let mut buffer = stroke_buffer();
    buffer.append_mesh(&line(10.0)).unwrap();
    buffer.append_mesh(&line(20.0)).unwrap();
    buffer.erase(0).unwrap();
    buffer.erase(0).unwrap();

    assert!(buffer.is_empty());
    assert_eq!(buffer.vertex_count(), 0);
    assert_eq!(buffer.index_count(), 0);
}

#[test]
fn test_out_of_range_items() {
    let mut buffer = stroke_buffer();
    buffer.append_mesh(&line(10.0)).unwrap();

    assert_eq!(
        buffer.erase(3),
        Err(GeometryError::ItemOutOfRange { index: 3, len: 1 })
    );
    assert_eq!(
        buffer.insert_mesh(2, &line(5.0)),
        Err(GeometryError::ItemOutOfRange { index: 2, len: 1 })
    );
    assert_eq!(buffer.size(), 1);
}

// ====================
// Validation
// ====================

#[test]
fn test_bad_indices_leave_buffer_untouched() {
    let mut buffer = stroke_buffer();
    buffer.append_mesh(&line(10.0)).unwrap();
    let before = buffer.clone();

    let mesh = line(5.0);
    assert_eq!(
        buffer.append(&mesh.vertices, &[0, 1, 8]),
        Err(GeometryError::IndexOutOfBounds {
            index: 8,
            vertex_count: 8
        })
    );
    assert_eq!(buffer.vertices(), before.vertices());
    assert_eq!(buffer.indices(), before.indices());
    assert_eq!(buffer.items(), before.items());
}

#[test]
fn test_layout_mismatch() {
    let mut buffer = VertexBuffer::for_vertex::<CircleVertex>().unwrap();
    assert_eq!(
        buffer.append_mesh(&line(10.0)),
        Err(GeometryError::LayoutMismatch {
            expected: "v3f:c4f:t4f".to_string(),
            found: "v3f:c4f:t3f".to_string(),
        })
    );

    let circle = tessellate_circle(Vec2::new(5.0, 5.0), 4.0, 1.0, Color::WHITE);
    assert_eq!(buffer.append_mesh(&circle).unwrap(), 0);
    assert_eq!(buffer.vertices_as::<CircleVertex>().unwrap(), circle.vertices);
}

#[test]
fn test_ellipse_buffer_binds_thickness_slot() {
    let mut buffer = VertexBuffer::for_vertex::<EllipseVertex>().unwrap();
    let ellipse = tessellate_ellipse(
        Vec2::new(30.0, 30.0),
        Vec2::new(12.0, 6.0),
        0.5,
        2.0,
        Color::RED,
    );
    assert_eq!(buffer.append_mesh(&ellipse).unwrap(), 0);
    assert_eq!(buffer.vertices_as::<EllipseVertex>().unwrap(), ellipse.vertices);

    let sink = MockSink::new();
    buffer.render(&sink, PrimitiveMode::Triangles, AttributeMask::all());
    let bound = sink.calls().into_iter().find_map(|call| match call {
        RenderCall::BindAttributes { attributes, stride } => Some((attributes, stride)),
        _ => None,
    });
    let (attributes, stride) = bound.unwrap();
    assert_eq!(stride, 48);
    assert_eq!(attributes.len(), 4);
    assert_eq!(attributes[3].offset, 44);
}

#[test]
fn test_raw_bytes_must_be_whole_vertices() {
    let mut buffer = VertexBuffer::new("v2f:c4B").unwrap();
    assert_eq!(buffer.format().stride(), 12);

    assert_eq!(
        buffer.append_bytes(&[0u8; 18], &[0]),
        Err(GeometryError::InvalidVertexData { len: 18, stride: 12 })
    );
    assert_eq!(buffer.append_bytes(&[0u8; 36], &[0, 1, 2]).unwrap(), 0);
    assert_eq!(buffer.vertex_count(), 3);
}

// ====================
// Rendering
// ====================

#[test]
fn test_render_uploads_binds_draws_and_finishes() {
    let mut buffer = stroke_buffer();
    buffer.append_mesh(&line(10.0)).unwrap();
    buffer.append_mesh(&corner()).unwrap();

    let sink = MockSink::new();
    buffer.render(&sink, PrimitiveMode::Triangles, AttributeMask::all());

    let calls = sink.calls();
    assert_eq!(calls.len(), 4);
    assert!(matches!(calls[0], RenderCall::Upload { .. }));
    match &calls[1] {
        RenderCall::BindAttributes { attributes, stride } => {
            assert_eq!(*stride, 40);
            assert_eq!(attributes.len(), 3);
        }
        other => panic!("Expected an attribute binding, got {:?}", other),
    }
    assert_eq!(
        sink.draws(),
        vec![(PrimitiveMode::Triangles, 0..buffer.index_count() as u32)]
    );
    assert_eq!(calls[3], RenderCall::Finish);

    assert_eq!(sink.last_uploaded_indices().as_deref(), Some(buffer.indices()));
    assert!(!buffer.is_dirty());
}

#[test]
fn test_clean_buffer_is_not_uploaded_again() {
    let mut buffer = stroke_buffer();
    buffer.append_mesh(&line(10.0)).unwrap();

    let sink = MockSink::new();
    buffer.render(&sink, PrimitiveMode::Triangles, AttributeMask::all());
    buffer.render(&sink, PrimitiveMode::Triangles, AttributeMask::all());
    assert_eq!(sink.count_uploads(), 1);
    assert_eq!(sink.count_draws(), 2);

    buffer.append_mesh(&line(20.0)).unwrap();
    assert!(buffer.is_dirty());
    buffer.render(&sink, PrimitiveMode::Triangles, AttributeMask::all());
    assert_eq!(sink.count_uploads(), 2);
}

#[test]
fn test_attribute_mask_limits_binding() {
    let mut buffer = stroke_buffer();
    buffer.append_mesh(&line(10.0)).unwrap();

    let sink = MockSink::new();
    buffer.render(
        &sink,
        PrimitiveMode::Triangles,
        AttributeMask::POSITION | AttributeMask::COLOR,
    );

    let bound = sink.calls().into_iter().find_map(|call| match call {
        RenderCall::BindAttributes { attributes, stride } => Some((attributes, stride)),
        _ => None,
    });
    let (attributes, stride) = bound.unwrap();
    assert_eq!(stride, 40);
    assert_eq!(
        attributes.iter().map(|a| a.kind).collect::<Vec<_>>(),
        vec![AttributeKind::Position, AttributeKind::Color]
    );
}

#[test]
fn test_render_setup_draws_single_items() {
    let mut buffer = stroke_buffer();
    buffer.append_mesh(&line(10.0)).unwrap();
    buffer.append_mesh(&corner()).unwrap();
    let second = buffer.item(1).unwrap();

    let sink = MockSink::new();
    {
        let scope = buffer.render_setup(&sink, PrimitiveMode::Triangles, AttributeMask::all());
        scope.render_item(1).unwrap();
        assert_eq!(
            scope.render_item(2),
            Err(GeometryError::ItemOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(sink.count_finishes(), 0);
    }
    assert_eq!(sink.count_finishes(), 1);

    let range = second.index_range();
    assert_eq!(
        sink.draws(),
        vec![(PrimitiveMode::Triangles, range.start as u32..range.end as u32)]
    );
}

#[test]
fn test_render_item_uses_buffer_mode() {
    let mut buffer = stroke_buffer().with_mode(PrimitiveMode::Lines);
    buffer.append_mesh(&line(10.0)).unwrap();

    let sink = MockSink::new();
    buffer.upload(&sink);
    buffer.render_item(&sink, 0).unwrap();

    assert_eq!(sink.draws(), vec![(PrimitiveMode::Lines, 0..18)]);
    assert_eq!(sink.count_finishes(), 0);
}

#[test]
fn test_render_empty_buffer() {
    let mut buffer = stroke_buffer();
    let sink = MockSink::new();
    buffer.render(&sink, PrimitiveMode::Triangles, AttributeMask::all());

    assert_eq!(sink.draws(), vec![(PrimitiveMode::Triangles, 0..0)]);
    assert_eq!(sink.last_uploaded_indices(), Some(Vec::new()));
}
