//! Unit tests for resource::Texture
//!
//! Descriptor validation, upload size checks and binding calls.

use crate::format::TextureFormat;
use crate::graphics_device::{
    Access, DeviceCall, DeviceRef, MockGraphicsDevice, ObjectType, TextureRegion, TextureTarget,
};
use crate::prism::ErrorKind;
use crate::resource::texture::{Attachment, Texture, TextureDesc};
use std::sync::Arc;

fn setup() -> (Arc<MockGraphicsDevice>, DeviceRef) {
    let mock = MockGraphicsDevice::shared();
    let device: DeviceRef = mock.clone();
    (mock, device)
}

// ============================================================================
// DESCRIPTOR TESTS
// ============================================================================

#[test]
fn test_max_mip_levels() {
    assert_eq!(TextureDesc::tex2d(1, 1, TextureFormat::RGBA8).max_mip_levels(), 1);
    assert_eq!(TextureDesc::tex2d(256, 256, TextureFormat::RGBA8).max_mip_levels(), 9);
    assert_eq!(TextureDesc::tex2d(300, 20, TextureFormat::RGBA8).max_mip_levels(), 9);
    assert_eq!(TextureDesc::tex3d(4, 4, 64, TextureFormat::R8).max_mip_levels(), 7);
}

#[test]
fn test_level_size() {
    let desc = TextureDesc::array(64, 16, 4, TextureFormat::RGBA8).with_full_mip_chain();
    assert_eq!(desc.mip_levels, 7);
    assert_eq!(desc.level_size(0), (64, 16, 4));
    assert_eq!(desc.level_size(3), (8, 2, 4));
    assert_eq!(desc.level_size(6), (1, 1, 4));

    let volume = TextureDesc::tex3d(8, 8, 8, TextureFormat::R8);
    assert_eq!(volume.level_size(2), (2, 2, 2));
    assert_eq!(volume.level_size(40), (1, 1, 1));
}

#[test]
fn test_invalid_descriptors() {
    let (mock, device) = setup();
    let cases = [
        TextureDesc::tex2d(0, 4, TextureFormat::RGBA8),
        TextureDesc { depth: 2, ..TextureDesc::tex2d(4, 4, TextureFormat::RGBA8) },
        TextureDesc { height: 8, ..TextureDesc::cube(4, TextureFormat::RGBA8) },
        TextureDesc::tex2d(4, 4, TextureFormat::RGBA8).with_mip_levels(0),
        TextureDesc::tex2d(4, 4, TextureFormat::RGBA8).with_mip_levels(4),
    ];
    for desc in cases {
        let err = Texture::new(&device, desc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{:?}", desc);
    }
    assert_eq!(mock.created_count(ObjectType::Texture), 0);
}

// ============================================================================
// CREATION TESTS
// ============================================================================

#[test]
fn test_create_allocates_storage() {
    let (mock, device) = setup();
    let texture = Texture::new(&device, TextureDesc::cube(32, TextureFormat::RGBA16F).with_mip_levels(2)).unwrap();
    let id = texture.id().unwrap();

    assert!(mock.calls().contains(&DeviceCall::TextureStorage {
        texture: id,
        levels: 2,
        format: TextureFormat::RGBA16F,
        width: 32,
        height: 32,
        depth: 6,
    }));
    assert_eq!(texture.width(), 32);
    assert_eq!(texture.info().target, TextureTarget::Cube);

    drop(texture);
    assert_eq!(mock.deleted_count(ObjectType::Texture), 1);
}

// ============================================================================
// UPLOAD TESTS
// ============================================================================

#[test]
fn test_upload_level_exact_size() {
    let (mock, device) = setup();
    let texture = Texture::new(&device, TextureDesc::tex2d(2, 2, TextureFormat::RGBA8)).unwrap();

    texture.upload_level(0, &[0u8; 16]).unwrap();
    let err = texture.upload_level(0, &[0u8; 15]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let uploads = mock.calls().iter().filter(|c| matches!(c, DeviceCall::TextureSubImage { .. })).count();
    assert_eq!(uploads, 1);
}

#[test]
fn test_upload_region_bounds() {
    let (_mock, device) = setup();
    let texture = Texture::new(&device, TextureDesc::tex2d(4, 4, TextureFormat::R8).with_mip_levels(2)).unwrap();

    let region = TextureRegion { level: 1, x: 1, y: 0, z: 0, width: 1, height: 2, depth: 1 };
    texture.upload(region, &[1, 2]).unwrap();

    let outside = TextureRegion { x: 2, ..region };
    assert_eq!(texture.upload(outside, &[1, 2]).unwrap_err().kind(), ErrorKind::InvalidArgument);

    let bad_level = TextureRegion { level: 2, ..region };
    assert_eq!(texture.upload(bad_level, &[1, 2]).unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_level_far_out_of_range_rejected() {
    let (mock, device) = setup();
    let texture = Texture::new(&device, TextureDesc::array(4, 4, 2, TextureFormat::RGBA8)).unwrap();

    for level in [1, 31, 32, 40, u32::MAX] {
        let err = texture.upload_level(level, &[0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = texture.bind_image_layer(0, level, 0, Access::ReadWrite).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    let touched = mock
        .calls()
        .iter()
        .filter(|c| matches!(c, DeviceCall::TextureSubImage { .. } | DeviceCall::BindImageTexture { .. }))
        .count();
    assert_eq!(touched, 0);
}

#[test]
fn test_upload_texels_checks_layout() {
    let (_mock, device) = setup();
    let texture = Texture::new(&device, TextureDesc::tex2d(2, 1, TextureFormat::Srgb8Alpha8)).unwrap();

    texture.upload_texels(0, &[[255u8, 0, 0, 255], [0, 255, 0, 255]]).unwrap();
    let err = texture.upload_texels(0, &[1.0f32, 2.0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_generate_mipmaps() {
    let (mock, device) = setup();
    let texture = Texture::new(&device, TextureDesc::tex2d(4, 4, TextureFormat::RGBA8).with_full_mip_chain()).unwrap();
    texture.generate_mipmaps().unwrap();
    assert!(mock.calls().contains(&DeviceCall::GenerateMipmap { texture: texture.id().unwrap() }));

    let integer = Texture::new(&device, TextureDesc::tex2d(4, 4, TextureFormat::R32UI)).unwrap();
    assert_eq!(integer.generate_mipmaps().unwrap_err().kind(), ErrorKind::InvalidState);
}

// ============================================================================
// BINDING TESTS
// ============================================================================

#[test]
fn test_bind_texture_unit() {
    let (mock, device) = setup();
    let texture = Texture::new(&device, TextureDesc::tex2d(4, 4, TextureFormat::RGBA8)).unwrap();
    texture.bind(3).unwrap();
    assert!(mock.calls().contains(&DeviceCall::BindTextureUnit { unit: 3, texture: Some(texture.id().unwrap()) }));
}

#[test]
fn test_bind_image_layered_for_arrays() {
    let (mock, device) = setup();
    let texture = Texture::new(&device, TextureDesc::array(4, 4, 3, TextureFormat::RGBA32F)).unwrap();
    let id = texture.id().unwrap();

    texture.bind_image(0, 0, Access::WriteOnly).unwrap();
    texture.bind_image_layer(1, 0, 2, Access::ReadOnly).unwrap();
    assert!(texture.bind_image_layer(1, 0, 3, Access::ReadOnly).is_err());
    assert!(texture.bind_image(0, 1, Access::ReadOnly).is_err());

    let calls = mock.calls();
    assert!(calls.contains(&DeviceCall::BindImageTexture {
        unit: 0,
        texture: id,
        level: 0,
        layered: true,
        layer: 0,
        access: Access::WriteOnly,
        format: TextureFormat::RGBA32F,
    }));
    assert!(calls.contains(&DeviceCall::BindImageTexture {
        unit: 1,
        texture: id,
        level: 0,
        layered: false,
        layer: 2,
        access: Access::ReadOnly,
        format: TextureFormat::RGBA32F,
    }));
}

#[test]
fn test_attachment_capability() {
    let (_mock, device) = setup();
    let texture = Texture::new(&device, TextureDesc::array(4, 4, 5, TextureFormat::Depth32F)).unwrap();
    let attachment: &dyn Attachment = &texture;
    assert_eq!(attachment.attachment_id().unwrap(), texture.id().unwrap());
    assert_eq!(attachment.attachment_format(), TextureFormat::Depth32F);
    assert_eq!(attachment.attachment_levels(), 1);
    assert_eq!(attachment.attachment_layers(), 5);
}
