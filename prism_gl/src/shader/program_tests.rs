//! Unit tests for shader::Program

use crate::format::TextureFormat;
use crate::graphics_device::{
    Access, BufferFlags, DeviceCall, DeviceRef, IndexedBufferTarget, MockGraphicsDevice, ObjectType, ProgramBinary,
    UniformValue, MOCK_BINARY_FORMAT,
};
use crate::prism::ErrorKind;
use crate::resource::{Buffer, Sampler, SamplerDesc, Texture, TextureDesc};
use crate::shader::compiler::build_program;
use crate::shader::program::{BindResource, Program};
use crate::shader::program_desc::ProgramDesc;
use crate::shader::reflection::{BindingCategory, Reflection};
use crate::shader::stage::{ShaderStageDesc, StageKind};
use glam::Vec3;
use std::sync::Arc;

fn setup() -> (Arc<MockGraphicsDevice>, DeviceRef) {
    let mock = MockGraphicsDevice::shared();
    let device: DeviceRef = mock.clone();
    (mock, device)
}

const REFLECTION: &str = r#"{
    "textures": [ { "name": "albedo", "binding": 3 } ],
    "images": [ { "name": "target", "binding": 1, "writeonly": true } ],
    "ssbos": [ { "name": "Particles", "binding": 2 } ],
    "ubos": [ { "name": "Camera", "binding": 0 } ],
    "resources": [ { "name": "exposure", "category": "classic_uniform", "binding": 0 } ]
}"#;

fn program(device: &DeviceRef) -> Program {
    let stage = ShaderStageDesc::source(
        StageKind::Fragment,
        "uniform float exposure;\nuniform vec3 tint;\nuniform sampler2D albedo;\nvoid main() {}",
    )
    .with_reflection(Reflection::from_json(REFLECTION).unwrap());
    build_program(device, &ProgramDesc::from(stage)).unwrap()
}

fn texture(device: &DeviceRef) -> Texture {
    Texture::new(device, TextureDesc::tex2d(4, 4, TextureFormat::RGBA8)).unwrap()
}

// ============================================================================
// BINDING BY NAME
// ============================================================================

#[test]
fn test_auto_bind_sampler_slot() {
    let (mock, device) = setup();
    let program = program(&device);
    let albedo = texture(&device);

    program.bind("albedo", BindingCategory::Auto, &albedo).unwrap();
    assert!(mock.calls().contains(&DeviceCall::BindTextureUnit { unit: 3, texture: Some(albedo.id().unwrap()) }));
}

#[test]
fn test_bind_sampler_object() {
    let (mock, device) = setup();
    let program = program(&device);
    let sampler = Sampler::new(&device, SamplerDesc::linear()).unwrap();

    program.bind("albedo", BindingCategory::Auto, &sampler).unwrap();
    assert!(mock.calls().contains(&DeviceCall::BindSampler { unit: 3, sampler: Some(sampler.id().unwrap()) }));
}

#[test]
fn test_missing_name() {
    let (_mock, device) = setup();
    let program = program(&device);
    let albedo = texture(&device);

    let err = program.bind("missing", BindingCategory::Auto, &albedo).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NameNotFound);
    assert!(err.message().contains("'missing'"));
}

#[test]
fn test_image_uses_declared_access() {
    let (mock, device) = setup();
    let program = program(&device);
    let target = texture(&device);

    program.bind("target", BindingCategory::Auto, BindResource::Image { texture: &target, level: 0 }).unwrap();
    assert!(mock.calls().contains(&DeviceCall::BindImageTexture {
        unit: 1,
        texture: target.id().unwrap(),
        level: 0,
        layered: false,
        layer: 0,
        access: Access::WriteOnly,
        format: TextureFormat::RGBA8,
    }));
}

#[test]
fn test_explicit_category_keeps_slot() {
    let (mock, device) = setup();
    let program = program(&device);
    let albedo = texture(&device);

    program.bind("albedo", BindingCategory::Image, &albedo).unwrap();
    assert!(mock.calls().contains(&DeviceCall::BindImageTexture {
        unit: 3,
        texture: albedo.id().unwrap(),
        level: 0,
        layered: false,
        layer: 0,
        access: Access::ReadOnly,
        format: TextureFormat::RGBA8,
    }));
}

#[test]
fn test_bind_blocks() {
    let (mock, device) = setup();
    let program = program(&device);
    let particles = Buffer::with_size(&device, 256, BufferFlags::empty()).unwrap();
    let camera = Buffer::with_size(&device, 512, BufferFlags::empty()).unwrap();

    program.bind("Particles", BindingCategory::Auto, &particles).unwrap();
    program
        .bind("Camera", BindingCategory::Auto, BindResource::BufferRange { buffer: &camera, offset: 256, size: 128 })
        .unwrap();

    let calls = mock.calls();
    assert!(calls.contains(&DeviceCall::BindBufferBase {
        target: IndexedBufferTarget::ShaderStorage,
        index: 2,
        buffer: particles.id().unwrap(),
    }));
    assert!(calls.contains(&DeviceCall::BindBufferRange {
        target: IndexedBufferTarget::Uniform,
        index: 0,
        buffer: camera.id().unwrap(),
        offset: 256,
        size: 128,
    }));
}

#[test]
fn test_resource_category_mismatch() {
    let (_mock, device) = setup();
    let program = program(&device);
    let buffer = Buffer::with_size(&device, 64, BufferFlags::empty()).unwrap();
    let albedo = texture(&device);

    assert_eq!(program.bind("albedo", BindingCategory::Auto, &buffer).unwrap_err().kind(), ErrorKind::InvalidArgument);
    assert_eq!(program.bind("Camera", BindingCategory::Auto, &albedo).unwrap_err().kind(), ErrorKind::InvalidArgument);
    assert_eq!(program.bind("exposure", BindingCategory::Auto, &albedo).unwrap_err().kind(), ErrorKind::InvalidArgument);
}

// ============================================================================
// CLASSIC UNIFORMS
// ============================================================================

#[test]
fn test_set_uniform_memoizes_location() {
    let (mock, device) = setup();
    let program = program(&device);
    let id = program.id().unwrap();

    program.set_uniform("tint", Vec3::new(1.0, 0.5, 0.25)).unwrap();
    program.set_uniform("exposure", 2.0f32).unwrap();
    program.set_uniform("tint", Vec3::ONE).unwrap();

    assert_eq!(program.uniform_location("tint").unwrap(), 1);
    let uploads: Vec<DeviceCall> = mock
        .calls()
        .into_iter()
        .filter(|call| matches!(call, DeviceCall::ProgramUniform { .. }))
        .collect();
    assert_eq!(uploads, vec![
        DeviceCall::ProgramUniform { program: id, location: 1, value: UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.25)) },
        DeviceCall::ProgramUniform { program: id, location: 0, value: UniformValue::Float(2.0) },
        DeviceCall::ProgramUniform { program: id, location: 1, value: UniformValue::Vec3(Vec3::ONE) },
    ]);
}

#[test]
fn test_set_unknown_uniform() {
    let (_mock, device) = setup();
    let program = program(&device);
    let err = program.set_uniform("roughness", 0.5f32).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NameNotFound);
    assert!(err.message().contains("roughness"));
}

#[test]
fn test_use_program() {
    let (mock, device) = setup();
    let program = program(&device);
    program.use_program().unwrap();
    assert!(mock.calls().contains(&DeviceCall::UseProgram { program: Some(program.id().unwrap()) }));
}

// ============================================================================
// NATIVE BINARIES
// ============================================================================

#[test]
fn test_native_binary_restore() {
    let (mock, device) = setup();
    let original = program(&device);
    let binary = original.native_binary().unwrap().unwrap();
    assert_eq!(binary.format, MOCK_BINARY_FORMAT);

    let restored = Program::from_native_binary(&device, &binary, original.bindings().clone()).unwrap();
    assert_eq!(restored.uniform_location("tint").unwrap(), 1);
    assert_eq!(restored.binding("albedo").unwrap().slot, 3);
    assert_eq!(mock.live_count(ObjectType::Program), 2);
}

#[test]
fn test_native_binary_rejected() {
    let (mock, device) = setup();
    mock.set_reject_program_binaries(true);
    let binary = ProgramBinary { format: MOCK_BINARY_FORMAT, bytes: b"tint".to_vec() };

    let err = Program::from_native_binary(&device, &binary, Default::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LinkError);
    assert!(err.message().contains("rejected"));
    assert_eq!(mock.live_count(ObjectType::Program), 0);
}

#[test]
fn test_drop_deletes_program() {
    let (mock, device) = setup();
    let program = program(&device);
    drop(program);
    assert_eq!(mock.live_count(ObjectType::Program), 0);
    assert_eq!(mock.invalid_delete_count(), 0);
}
