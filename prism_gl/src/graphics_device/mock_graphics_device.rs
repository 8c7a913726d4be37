/// Mock graphics device (no GPU required)
///
/// Allocates sequential names, tracks which objects are alive, keeps buffer
/// storage in host memory, simulates shader compilation and program linking,
/// and records every binding or state call as a [`DeviceCall`] so tests can
/// assert on what reached the "driver".
///
/// Simulated compiler rules:
/// - a textual stage containing `#error` fails, one log line per offending
///   source line
/// - a binary stage fails unless it starts with the SPIR-V magic number
/// - linking fails after [`fail_next_link`](MockGraphicsDevice::fail_next_link),
///   with no attached stage, or when an attached stage did not compile
/// - classic uniform locations are assigned in declaration order from
///   `uniform <type> <name>;` lines of the attached textual stages

use std::sync::{Arc, Mutex, MutexGuard};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::diagnostics::{DebugKind, DebugSeverityLevel, DebugSource, DiagnosticContext, DiagnosticMessage};
use crate::error::Result;
use crate::format::{PixelTransfer, TextureFormat, VertexFormat};
use crate::resource::SamplerDesc;
use crate::shader::StageKind;
use crate::prism_err;

use super::graphics_device::GraphicsDevice;
use super::types::*;

/// SPIR-V magic number, little-endian
const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Binary format token reported for mock program binaries
pub const MOCK_BINARY_FORMAT: u32 = 0x4D4F_434B;

// ============================================================================
// Recorded calls
// ============================================================================

/// A binding or state call received by the mock device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    BindBufferBase { target: IndexedBufferTarget, index: u32, buffer: NativeId },
    BindBufferRange { target: IndexedBufferTarget, index: u32, buffer: NativeId, offset: usize, size: usize },
    FlushMappedRange { buffer: NativeId, offset: usize, length: usize },
    TextureStorage { texture: NativeId, levels: u32, format: TextureFormat, width: u32, height: u32, depth: u32 },
    TextureSubImage { texture: NativeId, region: TextureRegion, transfer: PixelTransfer, len: usize },
    GenerateMipmap { texture: NativeId },
    BindTextureUnit { unit: u32, texture: Option<NativeId> },
    BindImageTexture { unit: u32, texture: NativeId, level: u32, layered: bool, layer: u32, access: Access, format: TextureFormat },
    SamplerParameters { sampler: NativeId, desc: SamplerDesc },
    BindSampler { unit: u32, sampler: Option<NativeId> },
    FramebufferTexture { framebuffer: NativeId, attachment: AttachmentPoint, texture: NativeId, level: u32, layer: Option<u32> },
    DrawBuffers { framebuffer: NativeId, color_attachments: Vec<u32> },
    BindFramebuffer { framebuffer: Option<NativeId> },
    VertexAttribFormat { vertex_array: NativeId, index: u32, format: VertexFormat, normalized: bool, relative_offset: u32, binding: u32 },
    VertexBuffer { vertex_array: NativeId, binding: u32, buffer: NativeId, offset: usize, stride: u32 },
    ElementBuffer { vertex_array: NativeId, buffer: NativeId },
    BindVertexArray { vertex_array: Option<NativeId> },
    ClientWaitSync { sync: SyncId, timeout_ns: u64 },
    SpecializeShader { shader: NativeId, entry_point: String },
    WaitSync { sync: SyncId },
    UseProgram { program: Option<NativeId> },
    ProgramUniform { program: NativeId, location: i32, value: UniformValue },
    ProgramBinary { program: NativeId, format: u32 },
}

// ============================================================================
// Internal state
// ============================================================================

struct MockBufferStore {
    data: Vec<u8>,
    mapped: bool,
}

struct MockShader {
    kind: StageKind,
    source: Option<String>,
    binary: Option<Vec<u8>>,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct MockProgram {
    attached: Vec<NativeId>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
}

#[derive(Default)]
struct MockState {
    next_id: NativeId,
    next_sync: SyncId,
    live: FxHashSet<(ObjectType, u64)>,
    created: FxHashMap<ObjectType, usize>,
    deleted: FxHashMap<ObjectType, usize>,
    invalid_deletes: usize,
    calls: Vec<DeviceCall>,
    buffers: FxHashMap<NativeId, MockBufferStore>,
    shaders: FxHashMap<NativeId, MockShader>,
    programs: FxHashMap<NativeId, MockProgram>,
    framebuffers: FxHashMap<NativeId, Vec<AttachmentPoint>>,
    fail_next_link: bool,
    reject_program_binaries: bool,
    fence_status: Option<FenceStatus>,
    fail_allocations: bool,
}

impl MockState {
    fn allocate(&mut self, ty: ObjectType) -> Result<NativeId> {
        if self.fail_allocations {
            return Err(prism_err!(BackendError, "prism::MockGraphicsDevice", "no {:?} name available", ty));
        }
        self.next_id += 1;
        let id = self.next_id;
        self.live.insert((ty, id as u64));
        *self.created.entry(ty).or_insert(0) += 1;
        Ok(id)
    }

    fn release(&mut self, ty: ObjectType, id: u64) -> bool {
        if self.live.remove(&(ty, id)) {
            *self.deleted.entry(ty).or_insert(0) += 1;
            true
        } else {
            self.invalid_deletes += 1;
            false
        }
    }
}

// ============================================================================
// Mock device
// ============================================================================

/// Headless [`GraphicsDevice`]
pub struct MockGraphicsDevice {
    state: Mutex<MockState>,
    diagnostics: DiagnosticContext,
}

impl MockGraphicsDevice {
    /// Create a mock device reporting to a default diagnostic context
    pub fn new() -> Self {
        Self::with_diagnostics(DiagnosticContext::default())
    }

    pub fn with_diagnostics(diagnostics: DiagnosticContext) -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            diagnostics,
        }
    }

    /// Create a mock device already wrapped for sharing
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test must not poison every later assertion
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: DeviceCall) {
        self.state().calls.push(call);
    }

    // ===== INSPECTION =====

    /// Every recorded call, oldest first
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn created_count(&self, ty: ObjectType) -> usize {
        self.state().created.get(&ty).copied().unwrap_or(0)
    }

    pub fn deleted_count(&self, ty: ObjectType) -> usize {
        self.state().deleted.get(&ty).copied().unwrap_or(0)
    }

    pub fn live_count(&self, ty: ObjectType) -> usize {
        self.state().live.iter().filter(|(t, _)| *t == ty).count()
    }

    pub fn is_live(&self, ty: ObjectType, id: u64) -> bool {
        self.state().live.contains(&(ty, id))
    }

    /// Deletes of names that were never created or already deleted
    pub fn invalid_delete_count(&self) -> usize {
        self.state().invalid_deletes
    }

    /// Current contents of a buffer's storage
    pub fn buffer_contents(&self, buffer: NativeId) -> Option<Vec<u8>> {
        self.state().buffers.get(&buffer).map(|b| b.data.clone())
    }

    /// Classic uniforms known to a linked program, in location order
    pub fn program_uniforms(&self, program: NativeId) -> Vec<String> {
        self.state()
            .programs
            .get(&program)
            .map(|p| p.uniforms.clone())
            .unwrap_or_default()
    }

    // ===== BEHAVIOR CONTROL =====

    /// Make the next `link_program` fail
    pub fn fail_next_link(&self) {
        self.state().fail_next_link = true;
    }

    /// Make `program_binary` fail to link
    pub fn set_reject_program_binaries(&self, reject: bool) {
        self.state().reject_program_binaries = reject;
    }

    /// Status returned by `client_wait_sync`, `AlreadySignaled` when unset
    pub fn set_fence_status(&self, status: FenceStatus) {
        self.state().fence_status = Some(status);
    }

    /// Make every creation call fail with `BackendError`
    pub fn set_fail_allocations(&self, fail: bool) {
        self.state().fail_allocations = fail;
    }

    fn compile_failed(&self, kind: StageKind, log: &str) {
        let text = format!("{} shader failed to compile: {}", kind, log.lines().next().unwrap_or(""));
        let message = DiagnosticMessage::new(
            DebugSource::ShaderCompiler,
            DebugKind::Error,
            DebugSeverityLevel::High,
            1,
            text,
        );
        // The mock has no process to stop; break requests are ignored
        let _ = self.diagnostics.emit(message);
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `uniform <type> <name>;` declarations
fn parse_uniforms(source: &str, out: &mut Vec<String>) {
    for line in source.lines() {
        let line = line.trim();
        let Some(start) = line.find("uniform ") else {
            continue;
        };
        let Some(declaration) = line[start + "uniform ".len()..].strip_suffix(';') else {
            continue;
        };
        let tokens: Vec<&str> = declaration.split_whitespace().collect();
        if tokens.len() != 2 {
            continue;
        }
        let name = tokens[1].split('[').next().unwrap_or(tokens[1]);
        if !out.iter().any(|existing| existing == name) {
            out.push(name.to_string());
        }
    }
}

fn check_spirv(binary: &[u8]) -> std::result::Result<(), String> {
    if binary.len() < 20 || binary.len() % 4 != 0 {
        return Err(format!("error: SPIR-V module is {} bytes, not a whole number of words with a header", binary.len()));
    }
    let magic = u32::from_le_bytes([binary[0], binary[1], binary[2], binary[3]]);
    if magic != SPIRV_MAGIC {
        return Err(format!("error: invalid SPIR-V magic number 0x{:08x}", magic));
    }
    Ok(())
}

impl GraphicsDevice for MockGraphicsDevice {
    // ===== BUFFERS =====

    fn create_buffer(&self) -> Result<NativeId> {
        let mut state = self.state();
        let id = state.allocate(ObjectType::Buffer)?;
        state.buffers.insert(id, MockBufferStore { data: Vec::new(), mapped: false });
        Ok(id)
    }

    fn buffer_storage(&self, buffer: NativeId, size: usize, data: Option<&[u8]>, _flags: BufferFlags) {
        let mut state = self.state();
        if let Some(store) = state.buffers.get_mut(&buffer) {
            store.data = vec![0; size];
            if let Some(data) = data {
                let len = data.len().min(size);
                store.data[..len].copy_from_slice(&data[..len]);
            }
        }
    }

    fn buffer_sub_data(&self, buffer: NativeId, offset: usize, data: &[u8]) {
        let mut state = self.state();
        if let Some(store) = state.buffers.get_mut(&buffer) {
            if let Some(target) = store.data.get_mut(offset..offset + data.len()) {
                target.copy_from_slice(data);
            }
        }
    }

    fn get_buffer_sub_data(&self, buffer: NativeId, offset: usize, out: &mut [u8]) {
        let state = self.state();
        if let Some(store) = state.buffers.get(&buffer) {
            if let Some(source) = store.data.get(offset..offset + out.len()) {
                out.copy_from_slice(source);
            }
        }
    }

    fn map_buffer_range(
        &self,
        buffer: NativeId,
        offset: usize,
        length: usize,
        _access: MapAccess,
    ) -> Result<*mut u8> {
        let mut state = self.state();
        let Some(store) = state.buffers.get_mut(&buffer) else {
            return Err(prism_err!(BackendError, "prism::MockGraphicsDevice", "buffer {} has no storage", buffer));
        };
        if store.mapped {
            return Err(prism_err!(BackendError, "prism::MockGraphicsDevice", "buffer {} is already mapped", buffer));
        }
        if offset + length > store.data.len() {
            return Err(prism_err!(
                BackendError,
                "prism::MockGraphicsDevice",
                "range {}+{} exceeds buffer {} of {} bytes",
                offset,
                length,
                buffer,
                store.data.len()
            ));
        }
        store.mapped = true;
        // Storage is never reallocated while mapped
        Ok(store.data[offset..].as_mut_ptr())
    }

    fn flush_mapped_buffer_range(&self, buffer: NativeId, offset: usize, length: usize) {
        self.record(DeviceCall::FlushMappedRange { buffer, offset, length });
    }

    fn unmap_buffer(&self, buffer: NativeId) {
        if let Some(store) = self.state().buffers.get_mut(&buffer) {
            store.mapped = false;
        }
    }

    fn bind_buffer_base(&self, target: IndexedBufferTarget, index: u32, buffer: NativeId) {
        self.record(DeviceCall::BindBufferBase { target, index, buffer });
    }

    fn bind_buffer_range(
        &self,
        target: IndexedBufferTarget,
        index: u32,
        buffer: NativeId,
        offset: usize,
        size: usize,
    ) {
        self.record(DeviceCall::BindBufferRange { target, index, buffer, offset, size });
    }

    fn delete_buffer(&self, buffer: NativeId) {
        let mut state = self.state();
        if state.release(ObjectType::Buffer, buffer as u64) {
            state.buffers.remove(&buffer);
        }
    }

    // ===== TEXTURES =====

    fn create_texture(&self, _target: TextureTarget) -> Result<NativeId> {
        self.state().allocate(ObjectType::Texture)
    }

    fn texture_storage(
        &self,
        texture: NativeId,
        _target: TextureTarget,
        levels: u32,
        format: TextureFormat,
        width: u32,
        height: u32,
        depth: u32,
    ) {
        self.record(DeviceCall::TextureStorage { texture, levels, format, width, height, depth });
    }

    fn texture_sub_image(
        &self,
        texture: NativeId,
        _target: TextureTarget,
        region: &TextureRegion,
        transfer: PixelTransfer,
        data: &[u8],
    ) {
        self.record(DeviceCall::TextureSubImage { texture, region: *region, transfer, len: data.len() });
    }

    fn generate_mipmap(&self, texture: NativeId, _target: TextureTarget) {
        self.record(DeviceCall::GenerateMipmap { texture });
    }

    fn bind_texture_unit(&self, unit: u32, _target: TextureTarget, texture: Option<NativeId>) {
        self.record(DeviceCall::BindTextureUnit { unit, texture });
    }

    fn bind_image_texture(
        &self,
        unit: u32,
        texture: NativeId,
        level: u32,
        layered: bool,
        layer: u32,
        access: Access,
        format: TextureFormat,
    ) {
        self.record(DeviceCall::BindImageTexture { unit, texture, level, layered, layer, access, format });
    }

    fn delete_texture(&self, texture: NativeId) {
        self.state().release(ObjectType::Texture, texture as u64);
    }

    // ===== SAMPLERS =====

    fn create_sampler(&self) -> Result<NativeId> {
        self.state().allocate(ObjectType::Sampler)
    }

    fn sampler_parameters(&self, sampler: NativeId, desc: &SamplerDesc) {
        self.record(DeviceCall::SamplerParameters { sampler, desc: desc.clone() });
    }

    fn bind_sampler(&self, unit: u32, sampler: Option<NativeId>) {
        self.record(DeviceCall::BindSampler { unit, sampler });
    }

    fn delete_sampler(&self, sampler: NativeId) {
        self.state().release(ObjectType::Sampler, sampler as u64);
    }

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(&self) -> Result<NativeId> {
        let mut state = self.state();
        let id = state.allocate(ObjectType::Framebuffer)?;
        state.framebuffers.insert(id, Vec::new());
        Ok(id)
    }

    fn framebuffer_texture(
        &self,
        framebuffer: NativeId,
        attachment: AttachmentPoint,
        texture: NativeId,
        level: u32,
        layer: Option<u32>,
    ) {
        let mut state = self.state();
        if let Some(attachments) = state.framebuffers.get_mut(&framebuffer) {
            attachments.retain(|a| *a != attachment);
            attachments.push(attachment);
        }
        state.calls.push(DeviceCall::FramebufferTexture { framebuffer, attachment, texture, level, layer });
    }

    fn check_framebuffer_status(&self, framebuffer: NativeId) -> FramebufferStatus {
        match self.state().framebuffers.get(&framebuffer) {
            Some(attachments) if !attachments.is_empty() => FramebufferStatus::Complete,
            Some(_) => FramebufferStatus::MissingAttachment,
            None => FramebufferStatus::Undefined,
        }
    }

    fn draw_buffers(&self, framebuffer: NativeId, color_attachments: &[u32]) {
        self.record(DeviceCall::DrawBuffers { framebuffer, color_attachments: color_attachments.to_vec() });
    }

    fn bind_framebuffer(&self, framebuffer: Option<NativeId>) {
        self.record(DeviceCall::BindFramebuffer { framebuffer });
    }

    fn delete_framebuffer(&self, framebuffer: NativeId) {
        let mut state = self.state();
        if state.release(ObjectType::Framebuffer, framebuffer as u64) {
            state.framebuffers.remove(&framebuffer);
        }
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&self) -> Result<NativeId> {
        self.state().allocate(ObjectType::VertexArray)
    }

    fn vertex_attrib_format(
        &self,
        vertex_array: NativeId,
        index: u32,
        format: VertexFormat,
        normalized: bool,
        relative_offset: u32,
        binding: u32,
    ) {
        self.record(DeviceCall::VertexAttribFormat { vertex_array, index, format, normalized, relative_offset, binding });
    }

    fn vertex_buffer(&self, vertex_array: NativeId, binding: u32, buffer: NativeId, offset: usize, stride: u32) {
        self.record(DeviceCall::VertexBuffer { vertex_array, binding, buffer, offset, stride });
    }

    fn element_buffer(&self, vertex_array: NativeId, buffer: NativeId) {
        self.record(DeviceCall::ElementBuffer { vertex_array, buffer });
    }

    fn bind_vertex_array(&self, vertex_array: Option<NativeId>) {
        self.record(DeviceCall::BindVertexArray { vertex_array });
    }

    fn delete_vertex_array(&self, vertex_array: NativeId) {
        self.state().release(ObjectType::VertexArray, vertex_array as u64);
    }

    // ===== FENCES =====

    fn fence_sync(&self) -> Result<SyncId> {
        let mut state = self.state();
        if state.fail_allocations {
            return Err(prism_err!(BackendError, "prism::MockGraphicsDevice", "fence creation failed"));
        }
        state.next_sync += 1;
        let sync = state.next_sync;
        state.live.insert((ObjectType::Fence, sync));
        *state.created.entry(ObjectType::Fence).or_insert(0) += 1;
        Ok(sync)
    }

    fn client_wait_sync(&self, sync: SyncId, _flush: bool, timeout_ns: u64) -> FenceStatus {
        let mut state = self.state();
        state.calls.push(DeviceCall::ClientWaitSync { sync, timeout_ns });
        if !state.live.contains(&(ObjectType::Fence, sync)) {
            return FenceStatus::WaitFailed;
        }
        state.fence_status.unwrap_or(FenceStatus::AlreadySignaled)
    }

    fn wait_sync(&self, sync: SyncId) {
        self.record(DeviceCall::WaitSync { sync });
    }

    fn delete_sync(&self, sync: SyncId) {
        self.state().release(ObjectType::Fence, sync);
    }

    // ===== SHADERS =====

    fn create_shader(&self, kind: StageKind) -> Result<NativeId> {
        let mut state = self.state();
        let id = state.allocate(ObjectType::Shader)?;
        state.shaders.insert(
            id,
            MockShader {
                kind,
                source: None,
                binary: None,
                compiled: false,
                log: String::new(),
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: NativeId, source: &str) {
        if let Some(s) = self.state().shaders.get_mut(&shader) {
            s.source = Some(source.to_string());
        }
    }

    fn shader_binary(&self, shader: NativeId, binary: &[u8]) {
        if let Some(s) = self.state().shaders.get_mut(&shader) {
            s.binary = Some(binary.to_vec());
        }
    }

    fn specialize_shader(&self, shader: NativeId, entry_point: &str) {
        let failure = {
            let mut guard = self.state();
            let state = &mut *guard;
            state.calls.push(DeviceCall::SpecializeShader { shader, entry_point: entry_point.to_string() });
            let Some(s) = state.shaders.get_mut(&shader) else {
                return;
            };
            let result = match &s.binary {
                None => Err("error: no binary submitted before specialization".to_string()),
                Some(_) if entry_point.is_empty() => Err("error: empty entry point name".to_string()),
                Some(binary) => check_spirv(binary),
            };
            s.compiled = result.is_ok();
            match result {
                Ok(()) => {
                    s.log.clear();
                    None
                }
                Err(log) => {
                    s.log = log.clone();
                    Some((s.kind, log))
                }
            }
        };
        if let Some((kind, log)) = failure {
            self.compile_failed(kind, &log);
        }
    }

    fn compile_shader(&self, shader: NativeId) {
        let failure = {
            let mut state = self.state();
            let Some(s) = state.shaders.get_mut(&shader) else {
                return;
            };
            let source = s.source.clone().unwrap_or_default();
            let log: String = source
                .lines()
                .enumerate()
                .filter(|(_, line)| line.contains("#error"))
                .map(|(n, line)| {
                    let detail = line.trim().trim_start_matches("#error").trim();
                    format!("0:{}(1): error: #error {}\n", n + 1, detail)
                })
                .collect();
            s.compiled = log.is_empty() && s.source.is_some();
            s.log = if s.source.is_none() {
                "error: no source submitted".to_string()
            } else {
                log
            };
            if s.compiled {
                None
            } else {
                Some((s.kind, s.log.clone()))
            }
        };
        if let Some((kind, log)) = failure {
            self.compile_failed(kind, &log);
        }
    }

    fn get_shader_compile_status(&self, shader: NativeId) -> bool {
        self.state().shaders.get(&shader).map(|s| s.compiled).unwrap_or(false)
    }

    fn get_shader_info_log(&self, shader: NativeId) -> String {
        self.state().shaders.get(&shader).map(|s| s.log.clone()).unwrap_or_default()
    }

    fn delete_shader(&self, shader: NativeId) {
        let mut state = self.state();
        if state.release(ObjectType::Shader, shader as u64) {
            state.shaders.remove(&shader);
        }
    }

    // ===== PROGRAMS =====

    fn create_program(&self) -> Result<NativeId> {
        let mut state = self.state();
        let id = state.allocate(ObjectType::Program)?;
        state.programs.insert(id, MockProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: NativeId, shader: NativeId) {
        if let Some(p) = self.state().programs.get_mut(&program) {
            if !p.attached.contains(&shader) {
                p.attached.push(shader);
            }
        }
    }

    fn detach_shader(&self, program: NativeId, shader: NativeId) {
        if let Some(p) = self.state().programs.get_mut(&program) {
            p.attached.retain(|s| *s != shader);
        }
    }

    fn link_program(&self, program: NativeId) {
        let mut guard = self.state();
        let state = &mut *guard;
        let fail_requested = std::mem::take(&mut state.fail_next_link);
        let Some(p) = state.programs.get_mut(&program) else {
            return;
        };

        let mut uniforms = Vec::new();
        let mut log = String::new();
        if fail_requested {
            log.push_str("error: linking failed (simulated)\n");
        }
        if p.attached.is_empty() {
            log.push_str("error: no shaders attached\n");
        }
        for shader in &p.attached {
            match state.shaders.get(shader) {
                Some(s) if s.compiled => {
                    if let Some(source) = &s.source {
                        parse_uniforms(source, &mut uniforms);
                    }
                }
                Some(s) => log.push_str(&format!("error: {} shader {} is not compiled\n", s.kind, shader)),
                None => log.push_str(&format!("error: shader {} does not exist\n", shader)),
            }
        }

        p.linked = log.is_empty();
        p.uniforms = if p.linked { uniforms } else { Vec::new() };
        p.log = log;
    }

    fn get_program_link_status(&self, program: NativeId) -> bool {
        self.state().programs.get(&program).map(|p| p.linked).unwrap_or(false)
    }

    fn get_program_info_log(&self, program: NativeId) -> String {
        self.state().programs.get(&program).map(|p| p.log.clone()).unwrap_or_default()
    }

    fn use_program(&self, program: Option<NativeId>) {
        self.record(DeviceCall::UseProgram { program });
    }

    fn get_uniform_location(&self, program: NativeId, name: &str) -> Option<i32> {
        let state = self.state();
        let p = state.programs.get(&program)?;
        p.uniforms.iter().position(|u| u == name).map(|i| i as i32)
    }

    fn program_uniform(&self, program: NativeId, location: i32, value: &UniformValue) {
        self.record(DeviceCall::ProgramUniform { program, location, value: *value });
    }

    fn get_program_binary(&self, program: NativeId) -> Option<ProgramBinary> {
        let state = self.state();
        let p = state.programs.get(&program)?;
        if !p.linked {
            return None;
        }
        Some(ProgramBinary {
            format: MOCK_BINARY_FORMAT,
            bytes: p.uniforms.join("\n").into_bytes(),
        })
    }

    fn program_binary(&self, program: NativeId, binary: &ProgramBinary) {
        let mut state = self.state();
        let reject = state.reject_program_binaries;
        state.calls.push(DeviceCall::ProgramBinary { program, format: binary.format });
        let Some(p) = state.programs.get_mut(&program) else {
            return;
        };

        let uniforms = if reject || binary.format != MOCK_BINARY_FORMAT {
            None
        } else {
            String::from_utf8(binary.bytes.clone()).ok()
        };

        match uniforms {
            Some(text) => {
                p.linked = true;
                p.log.clear();
                p.uniforms = text.split('\n').filter(|u| !u.is_empty()).map(str::to_string).collect();
            }
            None => {
                p.linked = false;
                p.log = "error: program binary rejected by driver\n".to_string();
                p.uniforms.clear();
            }
        }
    }

    fn delete_program(&self, program: NativeId) {
        let mut state = self.state();
        if state.release(ObjectType::Program, program as u64) {
            state.programs.remove(&program);
        }
    }

    // ===== DIAGNOSTICS =====

    fn diagnostics(&self) -> &DiagnosticContext {
        &self.diagnostics
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
