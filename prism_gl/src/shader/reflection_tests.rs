//! Unit tests for shader::reflection

use crate::graphics_device::Access;
use crate::prism::ErrorKind;
use crate::shader::reflection::{resolve_bindings, BindingCategory, BindingEntry, Reflection};

fn parse(json: &str) -> Reflection {
    Reflection::from_json(json).unwrap()
}

// ============================================================================
// PARSING
// ============================================================================

#[test]
fn test_parse_spirv_cross_output() {
    let reflection = parse(r#"{
        "entryPoints": [ { "name": "main", "mode": "frag" } ],
        "types": { "_12": { "name": "Light", "members": [] } },
        "inputs": [ { "type": "vec2", "name": "uv", "location": 0 } ],
        "textures": [ { "type": "sampler2D", "name": "albedo", "set": 0, "binding": 3 } ],
        "ubos": [ { "type": "_12", "name": "Light", "block_size": 32, "set": 0, "binding": 1 } ]
    }"#);
    assert_eq!(reflection.textures[0].name, "albedo");
    assert_eq!(reflection.textures[0].binding, 3);
    assert_eq!(reflection.ubos[0].binding, 1);
    assert!(reflection.ssbos.is_empty());
}

#[test]
fn test_parse_malformed() {
    let err = Reflection::from_json("{ \"textures\": [ { \"name\": \"albedo\" } ] }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(Reflection::from_json("not json").unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_from_file_missing() {
    let path = std::env::temp_dir().join("prism_reflection_missing.json");
    assert_eq!(Reflection::from_file(path).unwrap_err().kind(), ErrorKind::IoError);
}

// ============================================================================
// ENTRIES
// ============================================================================

#[test]
fn test_entries_categories_and_access() {
    let reflection = parse(r#"{
        "images": [ { "name": "out_image", "binding": 0, "writeonly": true } ],
        "ssbos": [
            { "name": "Particles", "binding": 1 },
            { "name": "Constants", "binding": 2, "readonly": true }
        ],
        "separate_samplers": [ { "name": "linear_clamp", "binding": 4 } ],
        "resources": [ { "name": "exposure", "category": "classic_uniform", "binding": 7 } ]
    }"#);
    let entries = reflection.entries().unwrap();
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["linear_clamp", "out_image", "Particles", "Constants", "exposure"]);

    assert_eq!(entries[1].1, BindingEntry { category: BindingCategory::Image, access: Access::WriteOnly, slot: 0 });
    assert_eq!(entries[2].1.access, Access::ReadWrite);
    assert_eq!(entries[3].1.access, Access::ReadOnly);
    assert_eq!(entries[0].1.category, BindingCategory::Sampler);
    assert_eq!(entries[4].1, BindingEntry { category: BindingCategory::ClassicUniform, access: Access::ReadOnly, slot: 7 });
}

#[test]
fn test_explicit_access() {
    let reflection = parse(r#"{
        "resources": [ { "name": "history", "category": "image", "binding": 2, "access": "read_only" } ]
    }"#);
    let entries = reflection.entries().unwrap();
    assert_eq!(entries[0].1.access, Access::ReadOnly);
}

#[test]
fn test_explicit_auto_rejected() {
    let reflection = parse(r#"{ "resources": [ { "name": "x", "category": "auto", "binding": 0 } ] }"#);
    assert_eq!(reflection.entries().unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_readonly_and_writeonly_rejected() {
    let reflection = parse(r#"{ "images": [ { "name": "x", "binding": 0, "readonly": true, "writeonly": true } ] }"#);
    assert_eq!(reflection.entries().unwrap_err().kind(), ErrorKind::InvalidArgument);
}

// ============================================================================
// RESOLVER
// ============================================================================

#[test]
fn test_resolve_merges_stages() {
    let vertex = parse(r#"{ "ubos": [ { "name": "Camera", "binding": 0 } ] }"#);
    let fragment = parse(r#"{ "textures": [ { "name": "albedo", "binding": 3 } ] }"#);
    let table = resolve_bindings([&vertex, &fragment]).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table["albedo"].slot, 3);
    assert_eq!(table["Camera"].category, BindingCategory::UniformBlock);
}

#[test]
fn test_resolve_later_stage_wins() {
    let vertex = parse(r#"{ "ubos": [ { "name": "Camera", "binding": 0 } ] }"#);
    let fragment = parse(r#"{ "ubos": [ { "name": "Camera", "binding": 5 } ] }"#);

    assert_eq!(resolve_bindings([&vertex, &fragment]).unwrap()["Camera"].slot, 5);
    assert_eq!(resolve_bindings([&fragment, &vertex]).unwrap()["Camera"].slot, 0);
}

#[test]
fn test_resolve_category_conflict() {
    let vertex = parse(r#"{ "ssbos": [ { "name": "data", "binding": 0 } ] }"#);
    let fragment = parse(r#"{ "textures": [ { "name": "data", "binding": 0 } ] }"#);
    let err = resolve_bindings([&vertex, &fragment]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(err.message().contains("data"));
}

#[test]
fn test_resolve_empty() {
    assert!(resolve_bindings(std::iter::empty::<&Reflection>()).unwrap().is_empty());
}

#[test]
fn test_category_tags_roundtrip() {
    for tag in 0..6 {
        assert_eq!(BindingCategory::from_u32(tag).unwrap().as_u32(), tag);
    }
    assert!(BindingCategory::from_u32(6).is_none());
}
