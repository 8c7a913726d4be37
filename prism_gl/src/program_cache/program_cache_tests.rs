//! Unit tests for ProgramCache

use crate::diagnostics::{CapturingSink, DebugSeverity, DiagnosticContext};
use crate::graphics_device::{DeviceCall, DeviceRef, MockGraphicsDevice, ObjectType};
use crate::prism::{CompressionLevel, ErrorKind, ProgramCache, ProgramCacheConfig};
use crate::program_cache::cache_file::{self, PayloadRecord, ProgramRecord, StageRecord};
use crate::shader::{BindingCategory, CacheKey, ProgramDesc, Reflection, ShaderStageDesc, StageKind};
use std::path::PathBuf;
use std::sync::Arc;

fn setup() -> (Arc<MockGraphicsDevice>, DeviceRef) {
    let mock = MockGraphicsDevice::shared();
    let device: DeviceRef = mock.clone();
    (mock, device)
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("prism_cache_{}_{}.prgc", std::process::id(), name))
}

fn vertex() -> ShaderStageDesc {
    ShaderStageDesc::source(StageKind::Vertex, "uniform mat4 mvp;\nvoid main() {}")
}

fn fragment() -> ShaderStageDesc {
    ShaderStageDesc::source(StageKind::Fragment, "uniform sampler2D albedo;\nvoid main() {}")
        .with_reflection(Reflection::from_json(r#"{ "textures": [ { "name": "albedo", "binding": 3 } ] }"#).unwrap())
}

fn lit() -> ProgramDesc {
    ProgramDesc::new(vec![vertex(), fragment()])
}

// ============================================================================
// LOOKUP
// ============================================================================

#[test]
fn test_set_builds_once() {
    let (mock, device) = setup();
    let cache = ProgramCache::new(&device);

    let (key_a, program_a) = cache.set(lit()).unwrap();
    let (key_b, program_b) = cache.set(vec![vertex(), fragment()]).unwrap();

    assert_eq!(key_a, key_b);
    assert!(Arc::ptr_eq(&program_a, &program_b));
    assert_eq!(mock.created_count(ObjectType::Program), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_single_stage_shorthand() {
    let (_mock, device) = setup();
    let cache = ProgramCache::new(&device);
    let (key_single, _) = cache.set(vertex()).unwrap();
    let (key_list, _) = cache.set(vec![vertex()]).unwrap();
    assert_eq!(key_single, key_list);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_at_never_builds() {
    let (mock, device) = setup();
    let cache = ProgramCache::new(&device);

    let err = cache.at(&lit().key()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);
    assert_eq!(mock.created_count(ObjectType::Program), 0);

    let (key, program) = cache.set(lit()).unwrap();
    assert!(Arc::ptr_eq(&cache.at(&key).unwrap(), &program));
    assert_eq!(cache.desc(&key), Some(lit()));
}

#[test]
fn test_keys_contains_and_clear() {
    let (mock, device) = setup();
    let cache = ProgramCache::new(&device);
    assert!(cache.is_empty());

    let (lit_key, lit_program) = cache.set(lit()).unwrap();
    let (vertex_key, _) = cache.set(vertex()).unwrap();

    let mut expected = vec![lit_key.clone(), vertex_key.clone()];
    expected.sort();
    assert_eq!(cache.keys(), expected);
    assert!(cache.contains(&vertex_key));

    cache.clear();
    assert!(cache.is_empty());
    assert!(!cache.contains(&lit_key));
    assert_eq!(mock.live_count(ObjectType::Program), 1);

    drop(lit_program);
    assert_eq!(mock.live_count(ObjectType::Program), 0);
}

#[test]
fn test_failed_build_not_cached() {
    let (mock, device) = setup();
    let cache = ProgramCache::new(&device);
    let broken = ShaderStageDesc::source(StageKind::Fragment, "#error broken");

    assert_eq!(cache.set(broken.clone()).unwrap_err().kind(), ErrorKind::CompileError);
    assert!(cache.is_empty());
    assert_eq!(cache.set(broken).unwrap_err().kind(), ErrorKind::CompileError);
    assert_eq!(mock.created_count(ObjectType::Shader), 2);
}

#[test]
fn test_concurrent_set_builds_once() {
    let (mock, device) = setup();
    let cache = Arc::new(ProgramCache::new(&device));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            std::thread::spawn(move || cache.set(lit()).unwrap())
        })
        .collect();
    let results: Vec<(CacheKey, _)> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(mock.created_count(ObjectType::Program), 1);
    for (key, program) in &results {
        assert_eq!(*key, results[0].0);
        assert!(Arc::ptr_eq(program, &results[0].1));
    }
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn test_save_load_with_native_binaries() {
    let (mock, device) = setup();
    let path = temp_path("native");
    let cache = ProgramCache::new(&device);
    let (key, _) = cache.set(lit()).unwrap();
    cache.save(&path).unwrap();

    let shaders_before = mock.created_count(ObjectType::Shader);
    let restored = ProgramCache::from_path(&device, &path).unwrap();

    assert_eq!(restored.keys(), cache.keys());
    let program = restored.at(&key).unwrap();
    assert_eq!(program.binding("albedo").unwrap().slot, 3);
    assert_eq!(program.uniform_location("albedo").unwrap(), 1);
    assert_eq!(mock.created_count(ObjectType::Shader), shaders_before);
    assert!(mock.calls().iter().any(|call| matches!(call, DeviceCall::ProgramBinary { .. })));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_rejected_binary_rebuilds_from_stages() {
    let (mock, device) = setup();
    let path = temp_path("rejected");
    let cache = ProgramCache::new(&device);
    let (key, _) = cache.set(lit()).unwrap();
    cache.save(&path).unwrap();

    mock.set_reject_program_binaries(true);
    let shaders_before = mock.created_count(ObjectType::Shader);
    let restored = ProgramCache::new(&device);
    restored.load(&path).unwrap();

    assert_eq!(mock.created_count(ObjectType::Shader), shaders_before + 2);
    let albedo = restored.at(&key).unwrap().binding("albedo").unwrap();
    assert_eq!(albedo.category, BindingCategory::Sampler);
    assert_eq!(albedo.slot, 3);
    assert!(restored.desc(&key).unwrap().stages().iter().all(|s| s.reflection.is_none()));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_save_without_native_binaries() {
    let (mock, device) = setup();
    let path = temp_path("no_native");
    let config = ProgramCacheConfig { persist_native_binaries: false, compression: CompressionLevel::Fast };
    let cache = ProgramCache::with_config(&device, config);
    assert_eq!(cache.config().compression, CompressionLevel::Fast);
    cache.set(lit()).unwrap();
    cache.save(&path).unwrap();

    let records = cache_file::decode(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].native.is_none());

    let restored = ProgramCache::from_path(&device, &path).unwrap();
    assert_eq!(restored.len(), 1);
    assert!(!mock.calls().iter().any(|call| matches!(call, DeviceCall::ProgramBinary { .. })));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_load_missing_file_is_empty() {
    let (_mock, device) = setup();
    let cache = ProgramCache::new(&device);
    cache.set(vertex()).unwrap();

    cache.load(temp_path("missing")).unwrap();
    assert!(cache.is_empty());
    assert!(ProgramCache::from_path(&device, temp_path("missing")).unwrap().is_empty());
}

#[test]
fn test_load_malformed_is_fail_clean() {
    let (_mock, device) = setup();
    let path = temp_path("malformed");
    std::fs::write(&path, b"not a cache").unwrap();

    let cache = ProgramCache::new(&device);
    cache.set(vertex()).unwrap();
    assert_eq!(cache.load(&path).unwrap_err().kind(), ErrorKind::FormatError);
    assert!(cache.is_empty());
    assert_eq!(ProgramCache::from_path(&device, &path).err().map(|e| e.kind()), Some(ErrorKind::FormatError));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_load_mismatched_key() {
    let (_mock, device) = setup();
    let path = temp_path("mismatch");
    let record = ProgramRecord {
        key: "not-the-real-key".to_string(),
        stages: vec![StageRecord::from_desc(&vertex())],
        bindings: Vec::new(),
        native: None,
    };
    std::fs::write(&path, cache_file::encode(&[record], flate2::Compression::fast()).unwrap()).unwrap();

    let cache = ProgramCache::new(&device);
    assert_eq!(cache.load(&path).unwrap_err().kind(), ErrorKind::FormatError);
    assert!(cache.is_empty());

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_rebuild_failure_leaves_cache_empty() {
    let (mock, device) = setup();
    let path = temp_path("rebuild_failure");
    let good = ProgramDesc::from(vertex());
    let broken = ProgramDesc::from(ShaderStageDesc::source(StageKind::Fragment, "#error stale"));
    let records: Vec<ProgramRecord> = [good, broken]
        .iter()
        .map(|desc| ProgramRecord {
            key: desc.key().to_string(),
            stages: desc.stages().iter().map(StageRecord::from_desc).collect(),
            bindings: Vec::new(),
            native: None,
        })
        .collect();
    assert!(matches!(records[1].stages[0].payload, PayloadRecord::Inline(_)));
    std::fs::write(&path, cache_file::encode(&records, flate2::Compression::fast()).unwrap()).unwrap();

    let cache = ProgramCache::new(&device);
    assert_eq!(cache.load(&path).unwrap_err().kind(), ErrorKind::CompileError);
    assert!(cache.is_empty());
    assert_eq!(mock.live_count(ObjectType::Program), 0);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_save_unwritable_destination() {
    let (_mock, device) = setup();
    let cache = ProgramCache::new(&device);
    cache.set(vertex()).unwrap();

    let path = std::env::temp_dir().join("prism_no_such_dir").join("nested").join("cache.prgc");
    assert_eq!(cache.save(path).unwrap_err().kind(), ErrorKind::IoError);
}

#[test]
fn test_from_path_with_config_keeps_settings() {
    let (mock, device) = setup();
    let path = temp_path("with_config");
    let cache = ProgramCache::new(&device);
    cache.set(lit()).unwrap();
    cache.save(&path).unwrap();

    let config = ProgramCacheConfig { persist_native_binaries: false, compression: CompressionLevel::Best };
    let restored = ProgramCache::from_path_with_config(&device, &path, config).unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(*restored.config(), config);

    let calls_before = mock.calls().len();
    restored.save(&path).unwrap();
    assert_eq!(mock.calls().len(), calls_before);
    let records = cache_file::decode(&std::fs::read(&path).unwrap()).unwrap();
    assert!(records[0].native.is_none());

    std::fs::remove_file(&path).unwrap();
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

#[test]
fn test_set_tags_driver_messages_with_call_site() {
    let sink = Arc::new(CapturingSink::new());
    let mock = Arc::new(MockGraphicsDevice::with_diagnostics(DiagnosticContext::new(sink.clone(), DebugSeverity::All)));
    let device: DeviceRef = mock.clone();
    let cache = ProgramCache::new(&device);

    let line = line!() + 1;
    let err = cache.set(ShaderStageDesc::source(StageKind::Vertex, "#error nope")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CompileError);

    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    let location = messages[0].location.expect("scope attached");
    assert!(location.file.ends_with("program_cache_tests.rs"));
    assert_eq!(location.line, line);
}
