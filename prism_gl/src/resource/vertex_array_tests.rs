//! Unit tests for resource::VertexArray

use crate::format::VertexFormat;
use crate::graphics_device::{BufferFlags, DeviceCall, DeviceRef, MockGraphicsDevice, ObjectType};
use crate::prism::ErrorKind;
use crate::resource::buffer::Buffer;
use crate::resource::vertex_array::{VertexArray, VertexAttribute};
use std::sync::Arc;

fn setup() -> (Arc<MockGraphicsDevice>, DeviceRef) {
    let mock = MockGraphicsDevice::shared();
    let device: DeviceRef = mock.clone();
    (mock, device)
}

fn position() -> VertexAttribute {
    VertexAttribute { location: 0, binding: 0, format: VertexFormat::R32G32B32_SFLOAT, offset: 0, normalized: false }
}

fn color() -> VertexAttribute {
    VertexAttribute { location: 1, binding: 0, format: VertexFormat::R8G8B8A8_UINT, offset: 12, normalized: true }
}

#[test]
fn test_with_layout_records_attributes() {
    let (mock, device) = setup();
    let vao = VertexArray::with_layout(&device, &[position(), color()]).unwrap();
    let id = vao.id().unwrap();

    assert_eq!(vao.attributes().len(), 2);
    assert!(mock.calls().contains(&DeviceCall::VertexAttribFormat {
        vertex_array: id,
        index: 1,
        format: VertexFormat::R8G8B8A8_UINT,
        normalized: true,
        relative_offset: 12,
        binding: 0,
    }));
}

#[test]
fn test_redeclare_attribute_replaces() {
    let (_mock, device) = setup();
    let mut vao = VertexArray::with_layout(&device, &[position()]).unwrap();
    vao.set_attribute(VertexAttribute { format: VertexFormat::R32G32_SFLOAT, ..position() }).unwrap();
    assert_eq!(vao.attributes().len(), 1);
    assert_eq!(vao.attributes()[0].format, VertexFormat::R32G32_SFLOAT);
}

#[test]
fn test_normalized_float_rejected() {
    let (_mock, device) = setup();
    let mut vao = VertexArray::new(&device).unwrap();
    let err = vao.set_attribute(VertexAttribute { normalized: true, ..position() }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(vao.attributes().is_empty());
}

#[test]
fn test_vertex_and_index_buffers() {
    let (mock, device) = setup();
    let vertices = Buffer::with_size(&device, 64, BufferFlags::empty()).unwrap();
    let indices = Buffer::from_slice(&device, &[0u16, 1, 2], BufferFlags::empty()).unwrap();
    let vao = VertexArray::with_layout(&device, &[position(), color()]).unwrap();

    vao.set_vertex_buffer(0, &vertices, 0, 16).unwrap();
    vao.set_index_buffer(&indices).unwrap();
    vao.bind().unwrap();
    assert_eq!(vao.set_vertex_buffer(0, &vertices, 64, 16).unwrap_err().kind(), ErrorKind::InvalidArgument);
    assert_eq!(vao.set_vertex_buffer(0, &vertices, 0, 0).unwrap_err().kind(), ErrorKind::InvalidArgument);

    let id = vao.id().unwrap();
    let calls = mock.calls();
    assert!(calls.contains(&DeviceCall::VertexBuffer {
        vertex_array: id,
        binding: 0,
        buffer: vertices.id().unwrap(),
        offset: 0,
        stride: 16,
    }));
    assert!(calls.contains(&DeviceCall::ElementBuffer { vertex_array: id, buffer: indices.id().unwrap() }));
    assert!(calls.contains(&DeviceCall::BindVertexArray { vertex_array: Some(id) }));

    drop(vao);
    assert_eq!(mock.deleted_count(ObjectType::VertexArray), 1);
}
