//! Unit tests for resource::Framebuffer

use crate::format::TextureFormat;
use crate::graphics_device::{AttachmentPoint, DeviceCall, DeviceRef, MockGraphicsDevice, ObjectType};
use crate::prism::ErrorKind;
use crate::resource::framebuffer::Framebuffer;
use crate::resource::texture::{Texture, TextureDesc};
use std::sync::Arc;

fn setup() -> (Arc<MockGraphicsDevice>, DeviceRef) {
    let mock = MockGraphicsDevice::shared();
    let device: DeviceRef = mock.clone();
    (mock, device)
}

fn color(device: &DeviceRef) -> Texture {
    Texture::new(device, TextureDesc::tex2d(16, 16, TextureFormat::RGBA8)).unwrap()
}

// ============================================================================
// ATTACHMENT TESTS
// ============================================================================

#[test]
fn test_empty_framebuffer_incomplete() {
    let (_mock, device) = setup();
    let fb = Framebuffer::new(&device).unwrap();
    let err = fb.check_complete().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(err.message().contains("MissingAttachment"));
}

#[test]
fn test_color_and_depth_complete() {
    let (mock, device) = setup();
    let albedo = color(&device);
    let depth = Texture::new(&device, TextureDesc::tex2d(16, 16, TextureFormat::Depth24Stencil8)).unwrap();

    let mut fb = Framebuffer::new(&device).unwrap();
    fb.attach_color(0, &albedo, 0).unwrap();
    fb.attach_depth_stencil(&depth, 0).unwrap();
    fb.check_complete().unwrap();

    let id = fb.id().unwrap();
    assert!(mock.calls().contains(&DeviceCall::FramebufferTexture {
        framebuffer: id,
        attachment: AttachmentPoint::DepthStencil,
        texture: depth.id().unwrap(),
        level: 0,
        layer: None,
    }));
}

#[test]
fn test_attachment_format_checks() {
    let (_mock, device) = setup();
    let albedo = color(&device);
    let depth = Texture::new(&device, TextureDesc::tex2d(16, 16, TextureFormat::Depth32F)).unwrap();
    let mut fb = Framebuffer::new(&device).unwrap();

    assert_eq!(fb.attach_color(0, &depth, 0).unwrap_err().kind(), ErrorKind::InvalidArgument);
    assert_eq!(fb.attach_depth(&albedo, 0).unwrap_err().kind(), ErrorKind::InvalidArgument);
    assert_eq!(fb.attach_depth_stencil(&depth, 0).unwrap_err().kind(), ErrorKind::InvalidArgument);
    fb.attach_depth(&depth, 0).unwrap();
}

#[test]
fn test_attach_layer_of_cube() {
    let (mock, device) = setup();
    let cube = Texture::new(&device, TextureDesc::cube(8, TextureFormat::RGBA16F).with_mip_levels(2)).unwrap();
    let mut fb = Framebuffer::new(&device).unwrap();

    fb.attach_color_layer(1, &cube, 1, 5).unwrap();
    assert!(fb.attach_color_layer(1, &cube, 0, 6).is_err());
    assert!(fb.attach_color(1, &cube, 2).is_err());

    assert!(mock.calls().contains(&DeviceCall::FramebufferTexture {
        framebuffer: fb.id().unwrap(),
        attachment: AttachmentPoint::Color(1),
        texture: cube.id().unwrap(),
        level: 1,
        layer: Some(5),
    }));
}

// ============================================================================
// DRAW BUFFER TESTS
// ============================================================================

#[test]
fn test_draw_buffers() {
    let (mock, device) = setup();
    let a = color(&device);
    let b = color(&device);
    let mut fb = Framebuffer::new(&device).unwrap();
    fb.attach_color(2, &a, 0).unwrap();
    fb.attach_color(0, &b, 0).unwrap();
    assert_eq!(fb.color_attachments(), &[2, 0]);

    fb.draw_to_all().unwrap();
    assert_eq!(fb.set_draw_buffers(&[1]).unwrap_err().kind(), ErrorKind::InvalidArgument);

    assert!(mock.calls().contains(&DeviceCall::DrawBuffers {
        framebuffer: fb.id().unwrap(),
        color_attachments: vec![0, 2],
    }));
}

#[test]
fn test_bind_and_default() {
    let (mock, device) = setup();
    let fb = Framebuffer::new(&device).unwrap();
    fb.bind().unwrap();
    Framebuffer::bind_default(&device);

    let calls = mock.calls();
    assert!(calls.contains(&DeviceCall::BindFramebuffer { framebuffer: Some(fb.id().unwrap()) }));
    assert!(calls.contains(&DeviceCall::BindFramebuffer { framebuffer: None }));

    drop(fb);
    assert_eq!(mock.deleted_count(ObjectType::Framebuffer), 1);
}
