//! Unit tests for SPIR-V to GLSL translation
//!
//! SPIR-V inputs are produced from WGSL with naga, no GPU required.

use super::*;

fn compile_wgsl(source: &str) -> Vec<u8> {
    let module = naga::front::wgsl::parse_str(source).unwrap();
    let info = naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all())
        .validate(&module)
        .unwrap();
    let words = naga::back::spv::write_vec(&module, &info, &naga::back::spv::Options::default(), None).unwrap();
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

const VERTEX: &str = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}
"#;

const COMPUTE: &str = r#"
@group(0) @binding(2) var<storage, read_write> counts: array<u32>;

@compute @workgroup_size(64)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    counts[id.x] = id.x;
}
"#;

// ============================================================================
// TRANSLATION TESTS
// ============================================================================

#[test]
fn test_translate_vertex_entry_point() {
    let glsl = spirv_to_glsl(&compile_wgsl(VERTEX), StageKind::Vertex, "vs_main").unwrap();
    assert!(glsl.contains("#version 450"));
    assert!(glsl.contains("void main()"));
}

#[test]
fn test_translate_keeps_binding_slots() {
    let glsl = spirv_to_glsl(&compile_wgsl(COMPUTE), StageKind::Compute, "main").unwrap();
    assert!(glsl.contains("binding = 2"));
}

// ============================================================================
// FAILURE TESTS
// ============================================================================

#[test]
fn test_unknown_entry_point() {
    let err = spirv_to_glsl(&compile_wgsl(VERTEX), StageKind::Vertex, "missing").unwrap_err();
    assert!(err.contains("'missing'"));
}

#[test]
fn test_entry_point_of_other_stage() {
    let err = spirv_to_glsl(&compile_wgsl(VERTEX), StageKind::Fragment, "vs_main").unwrap_err();
    assert!(err.contains("fragment"));
}

#[test]
fn test_unsupported_stage() {
    let err = spirv_to_glsl(&compile_wgsl(VERTEX), StageKind::Geometry, "vs_main").unwrap_err();
    assert!(err.contains("geometry"));
}

#[test]
fn test_garbage_input() {
    let err = spirv_to_glsl(b"definitely not spir-v", StageKind::Vertex, "main").unwrap_err();
    assert!(err.starts_with("error: invalid SPIR-V"));
}
