/// GlowGraphicsDevice - GraphicsDevice over an OpenGL 4.5 core context
///
/// Object edits that need a binding (storage allocation, attachment setup,
/// uniform upload) bind the object, do the work and restore whatever the
/// caller had bound. Textures are edited on a reserved scratch unit, the
/// last combined texture image unit, which callers must not sample from.
///
/// GL sync objects are pointers; the device hands out `SyncId`s and keeps the
/// mapping. SPIR-V stages are cross-compiled to GLSL when they are
/// specialized.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use colored::*;
use glow::HasContext;
use rustc_hash::FxHashMap;

use prism_gl::prism::device::{
    Access, AttachmentPoint, BufferFlags, FenceStatus, FramebufferStatus, GraphicsDevice, IndexedBufferTarget,
    MapAccess, NativeId, ProgramBinary, SyncId, TextureRegion, TextureTarget, UniformValue,
};
use prism_gl::prism::diagnostics::{DebugKind, DebugSeverityLevel, DebugSource, DiagnosticContext, DiagnosticMessage};
use prism_gl::prism::format::{PixelTransfer, TextureFormat, VertexFormat};
use prism_gl::prism::resource::SamplerDesc;
use prism_gl::prism::shader::StageKind;
use prism_gl::prism::Result;
use prism_gl::{prism_bail, prism_err, prism_info, prism_trace, prism_warn};

use crate::debug;
use crate::glow_format::*;
use crate::spirv;

const BUFFER_SCRATCH: u32 = glow::COPY_WRITE_BUFFER;

// ===== NAME CONVERSION =====

fn gl_name<T>(id: NativeId, wrap: fn(NonZeroU32) -> T) -> Option<T> {
    NonZeroU32::new(id).map(wrap)
}

fn gl_int(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn gl_u32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

// ===== SYNC WAITS =====

/// Run a client wait of `timeout_ns` as successive waits of at most
/// `i32::MAX` nanoseconds
///
/// `wait` receives the slice timeout and whether to flush; only the first
/// slice flushes. Stops on the first status other than `TIMEOUT_EXPIRED`.
fn wait_in_slices(timeout_ns: u64, flush: bool, mut wait: impl FnMut(i32, bool) -> u32) -> u32 {
    let mut remaining = timeout_ns;
    let mut flush = flush;
    loop {
        let slice = i32::try_from(remaining).unwrap_or(i32::MAX);
        let status = wait(slice, flush);
        remaining -= slice as u64;
        if status != glow::TIMEOUT_EXPIRED || remaining == 0 {
            return status;
        }
        flush = false;
    }
}

// ===== BOOKKEEPING =====

struct ShaderState {
    kind: StageKind,
    binary: Option<Vec<u8>>,
    /// Translation failure, reported in place of the driver's compile log
    failure: Option<String>,
}

#[derive(Default)]
struct Bindings {
    framebuffer: Option<NativeId>,
    vertex_array: Option<NativeId>,
    program: Option<NativeId>,
}

#[derive(Default)]
struct SyncTable {
    next: SyncId,
    fences: FxHashMap<SyncId, glow::Fence>,
}

// ===== DEVICE =====

/// OpenGL 4.5 device
pub struct GlowGraphicsDevice {
    gl: glow::Context,
    diagnostics: Arc<DiagnosticContext>,
    scratch_unit: u32,
    bindings: Mutex<Bindings>,
    shaders: Mutex<FxHashMap<NativeId, ShaderState>>,
    syncs: Mutex<SyncTable>,
}

// SAFETY: a GL context is current on one thread only. The device must be
// created and used on that thread; Send + Sync only let resources share it
// through `DeviceRef`.
unsafe impl Send for GlowGraphicsDevice {}
unsafe impl Sync for GlowGraphicsDevice {}

impl GlowGraphicsDevice {
    /// Wrap a current GL context
    ///
    /// Fails with `BackendError` below OpenGL 4.5 core. Installs the debug
    /// callback when `diagnostics` is enabled.
    pub fn new(mut gl: glow::Context, diagnostics: Arc<DiagnosticContext>) -> Result<Self> {
        // ========== VALIDATION ==========
        let version = gl.version();
        if version.is_embedded || (version.major, version.minor) < (4, 5) {
            prism_bail!(BackendError, "prism::GlowGraphicsDevice",
                "OpenGL 4.5 core is required, context provides {}.{}{}",
                version.major, version.minor, if version.is_embedded { " ES" } else { "" });
        }
        prism_info!("prism::GlowGraphicsDevice", "OpenGL {}.{} {}",
            version.major, version.minor, version.vendor_info);

        debug::install_debug_callback(&mut gl, diagnostics.clone());

        let units = unsafe { gl.get_parameter_i32(glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS) };
        let scratch_unit = u32::try_from(units.max(1) - 1).unwrap_or(0);
        unsafe { gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1) };

        Ok(Self {
            gl,
            diagnostics,
            scratch_unit,
            bindings: Mutex::new(Bindings::default()),
            shaders: Mutex::new(FxHashMap::default()),
            syncs: Mutex::new(SyncTable::default()),
        })
    }

    /// Texture unit reserved for uploads and storage allocation
    pub fn scratch_unit(&self) -> u32 {
        self.scratch_unit
    }

    fn bindings(&self) -> MutexGuard<'_, Bindings> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn shaders(&self) -> MutexGuard<'_, FxHashMap<NativeId, ShaderState>> {
        self.shaders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn syncs(&self) -> MutexGuard<'_, SyncTable> {
        self.syncs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn created<T>(result: std::result::Result<T, String>, what: &str, raw: fn(&T) -> NonZeroU32) -> Result<NativeId> {
        match result {
            Ok(object) => Ok(raw(&object).get()),
            Err(e) => Err(prism_err!(BackendError, "prism::GlowGraphicsDevice", "Failed to create {}: {}", what, e)),
        }
    }

    fn report(&self, message: DiagnosticMessage) {
        if self.diagnostics.emit(message) {
            eprintln!("\n{}\n", "BREAK ON GL ERROR - Aborting execution".red().bold());
            std::process::abort();
        }
    }

    // ===== SCOPED BINDINGS =====

    fn with_buffer(&self, target: u32, buffer: NativeId, f: impl FnOnce(&glow::Context)) {
        let Some(raw) = gl_name(buffer, glow::NativeBuffer) else {
            return;
        };
        unsafe { self.gl.bind_buffer(target, Some(raw)) };
        f(&self.gl);
        unsafe { self.gl.bind_buffer(target, None) };
    }

    fn with_texture(&self, target: TextureTarget, texture: NativeId, f: impl FnOnce(&glow::Context, u32)) {
        let Some(raw) = gl_name(texture, glow::NativeTexture) else {
            return;
        };
        let gl_target = texture_target_to_gl(target);
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + self.scratch_unit);
            self.gl.bind_texture(gl_target, Some(raw));
        }
        f(&self.gl, gl_target);
    }

    fn with_framebuffer(&self, framebuffer: NativeId, f: impl FnOnce(&glow::Context)) {
        let Some(raw) = gl_name(framebuffer, glow::NativeFramebuffer) else {
            return;
        };
        let previous = self.bindings().framebuffer;
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(raw)) };
        f(&self.gl);
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, previous.and_then(|id| gl_name(id, glow::NativeFramebuffer)))
        };
    }

    fn with_vertex_array(&self, vertex_array: NativeId, f: impl FnOnce(&glow::Context)) {
        let Some(raw) = gl_name(vertex_array, glow::NativeVertexArray) else {
            return;
        };
        let previous = self.bindings().vertex_array;
        unsafe { self.gl.bind_vertex_array(Some(raw)) };
        f(&self.gl);
        unsafe { self.gl.bind_vertex_array(previous.and_then(|id| gl_name(id, glow::NativeVertexArray))) };
    }

    fn with_program(&self, program: NativeId, f: impl FnOnce(&glow::Context)) {
        let Some(raw) = gl_name(program, glow::NativeProgram) else {
            return;
        };
        let previous = self.bindings().program;
        unsafe { self.gl.use_program(Some(raw)) };
        f(&self.gl);
        if previous != Some(program) {
            unsafe { self.gl.use_program(previous.and_then(|id| gl_name(id, glow::NativeProgram))) };
        }
    }
}

impl GraphicsDevice for GlowGraphicsDevice {
    // ===== BUFFERS =====

    fn create_buffer(&self) -> Result<NativeId> {
        let id = Self::created(unsafe { self.gl.create_buffer() }, "buffer", |b| b.0)?;
        // Generated names become objects on first bind
        self.with_buffer(BUFFER_SCRATCH, id, |_| {});
        Ok(id)
    }

    fn buffer_storage(&self, buffer: NativeId, size: usize, data: Option<&[u8]>, flags: BufferFlags) {
        self.with_buffer(BUFFER_SCRATCH, buffer, |gl| unsafe {
            gl.buffer_storage(BUFFER_SCRATCH, gl_int(size), data, buffer_flags_to_gl(flags));
        });
    }

    fn buffer_sub_data(&self, buffer: NativeId, offset: usize, data: &[u8]) {
        self.with_buffer(BUFFER_SCRATCH, buffer, |gl| unsafe {
            gl.buffer_sub_data_u8_slice(BUFFER_SCRATCH, gl_int(offset), data);
        });
    }

    fn get_buffer_sub_data(&self, buffer: NativeId, offset: usize, out: &mut [u8]) {
        self.with_buffer(glow::COPY_READ_BUFFER, buffer, |gl| unsafe {
            gl.get_buffer_sub_data(glow::COPY_READ_BUFFER, gl_int(offset), out);
        });
    }

    fn map_buffer_range(
        &self,
        buffer: NativeId,
        offset: usize,
        length: usize,
        access: MapAccess,
    ) -> Result<*mut u8> {
        let mut ptr = std::ptr::null_mut();
        self.with_buffer(BUFFER_SCRATCH, buffer, |gl| unsafe {
            ptr = gl.map_buffer_range(BUFFER_SCRATCH, gl_int(offset), gl_int(length), map_access_to_gl(access));
        });
        if ptr.is_null() {
            prism_bail!(BackendError, "prism::GlowGraphicsDevice",
                "glMapBufferRange returned null for buffer {} ({}+{})", buffer, offset, length);
        }
        Ok(ptr)
    }

    fn flush_mapped_buffer_range(&self, buffer: NativeId, offset: usize, length: usize) {
        self.with_buffer(BUFFER_SCRATCH, buffer, |gl| unsafe {
            gl.flush_mapped_buffer_range(BUFFER_SCRATCH, gl_int(offset), gl_int(length));
        });
    }

    fn unmap_buffer(&self, buffer: NativeId) {
        self.with_buffer(BUFFER_SCRATCH, buffer, |gl| unsafe {
            gl.unmap_buffer(BUFFER_SCRATCH);
        });
    }

    fn bind_buffer_base(&self, target: IndexedBufferTarget, index: u32, buffer: NativeId) {
        unsafe {
            self.gl.bind_buffer_base(indexed_target_to_gl(target), index, gl_name(buffer, glow::NativeBuffer));
        }
    }

    fn bind_buffer_range(
        &self,
        target: IndexedBufferTarget,
        index: u32,
        buffer: NativeId,
        offset: usize,
        size: usize,
    ) {
        unsafe {
            self.gl.bind_buffer_range(
                indexed_target_to_gl(target),
                index,
                gl_name(buffer, glow::NativeBuffer),
                gl_int(offset),
                gl_int(size),
            );
        }
    }

    fn delete_buffer(&self, buffer: NativeId) {
        if let Some(raw) = gl_name(buffer, glow::NativeBuffer) {
            unsafe { self.gl.delete_buffer(raw) };
        }
    }

    // ===== TEXTURES =====

    fn create_texture(&self, target: TextureTarget) -> Result<NativeId> {
        let id = Self::created(unsafe { self.gl.create_texture() }, "texture", |t| t.0)?;
        self.with_texture(target, id, |_, _| {});
        Ok(id)
    }

    fn texture_storage(
        &self,
        texture: NativeId,
        target: TextureTarget,
        levels: u32,
        format: TextureFormat,
        width: u32,
        height: u32,
        depth: u32,
    ) {
        let internal = texture_format_to_gl(format);
        self.with_texture(target, texture, |gl, gl_target| unsafe {
            match target {
                TextureTarget::Tex2D | TextureTarget::Cube => {
                    gl.tex_storage_2d(gl_target, gl_u32(levels), internal, gl_u32(width), gl_u32(height));
                }
                TextureTarget::Tex2DArray | TextureTarget::Tex3D => {
                    gl.tex_storage_3d(
                        gl_target,
                        gl_u32(levels),
                        internal,
                        gl_u32(width),
                        gl_u32(height),
                        gl_u32(depth),
                    );
                }
            }
        });
    }

    fn texture_sub_image(
        &self,
        texture: NativeId,
        target: TextureTarget,
        region: &TextureRegion,
        transfer: PixelTransfer,
        data: &[u8],
    ) {
        let (format, ty) = pixel_transfer_to_gl(transfer);
        let r = *region;
        self.with_texture(target, texture, |gl, gl_target| unsafe {
            match target {
                TextureTarget::Tex2D => gl.tex_sub_image_2d(
                    gl_target,
                    gl_u32(r.level),
                    gl_u32(r.x),
                    gl_u32(r.y),
                    gl_u32(r.width),
                    gl_u32(r.height),
                    format,
                    ty,
                    glow::PixelUnpackData::Slice(data),
                ),
                TextureTarget::Tex2DArray | TextureTarget::Tex3D => gl.tex_sub_image_3d(
                    gl_target,
                    gl_u32(r.level),
                    gl_u32(r.x),
                    gl_u32(r.y),
                    gl_u32(r.z),
                    gl_u32(r.width),
                    gl_u32(r.height),
                    gl_u32(r.depth),
                    format,
                    ty,
                    glow::PixelUnpackData::Slice(data),
                ),
                TextureTarget::Cube => {
                    let faces = r.depth.max(1) as usize;
                    let face_bytes = data.len() / faces;
                    for (i, chunk) in data.chunks(face_bytes.max(1)).take(faces).enumerate() {
                        gl.tex_sub_image_2d(
                            cube_face_to_gl(r.z + i as u32),
                            gl_u32(r.level),
                            gl_u32(r.x),
                            gl_u32(r.y),
                            gl_u32(r.width),
                            gl_u32(r.height),
                            format,
                            ty,
                            glow::PixelUnpackData::Slice(chunk),
                        );
                    }
                }
            }
        });
    }

    fn generate_mipmap(&self, texture: NativeId, target: TextureTarget) {
        self.with_texture(target, texture, |gl, gl_target| unsafe {
            gl.generate_mipmap(gl_target);
        });
    }

    fn bind_texture_unit(&self, unit: u32, target: TextureTarget, texture: Option<NativeId>) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(texture_target_to_gl(target), texture.and_then(|id| gl_name(id, glow::NativeTexture)));
        }
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
        let Some(raw) = gl_name(texture, glow::NativeTexture) else {
            return;
        };
        unsafe {
            self.gl.bind_image_texture(
                unit,
                raw,
                gl_u32(level),
                layered,
                gl_u32(layer),
                access_to_gl(access),
                texture_format_to_gl(format),
            );
        }
    }

    fn delete_texture(&self, texture: NativeId) {
        if let Some(raw) = gl_name(texture, glow::NativeTexture) {
            unsafe { self.gl.delete_texture(raw) };
        }
    }

    // ===== SAMPLERS =====

    fn create_sampler(&self) -> Result<NativeId> {
        Self::created(unsafe { self.gl.create_sampler() }, "sampler", |s| s.0)
    }

    fn sampler_parameters(&self, sampler: NativeId, desc: &SamplerDesc) {
        let Some(raw) = gl_name(sampler, glow::NativeSampler) else {
            return;
        };
        let gl = &self.gl;
        unsafe {
            gl.sampler_parameter_i32(raw, glow::TEXTURE_MIN_FILTER,
                min_filter_to_gl(desc.min_filter, desc.mipmap_filter) as i32);
            gl.sampler_parameter_i32(raw, glow::TEXTURE_MAG_FILTER, mag_filter_to_gl(desc.mag_filter) as i32);
            gl.sampler_parameter_i32(raw, glow::TEXTURE_WRAP_S, wrap_to_gl(desc.wrap_s) as i32);
            gl.sampler_parameter_i32(raw, glow::TEXTURE_WRAP_T, wrap_to_gl(desc.wrap_t) as i32);
            gl.sampler_parameter_i32(raw, glow::TEXTURE_WRAP_R, wrap_to_gl(desc.wrap_r) as i32);
            gl.sampler_parameter_f32(raw, glow::TEXTURE_MIN_LOD, desc.min_lod);
            gl.sampler_parameter_f32(raw, glow::TEXTURE_MAX_LOD, desc.max_lod);
            gl.sampler_parameter_f32(raw, glow::TEXTURE_LOD_BIAS, desc.lod_bias);
            gl.sampler_parameter_f32_slice(raw, glow::TEXTURE_BORDER_COLOR, &desc.border_color);
            if desc.max_anisotropy > 1.0 {
                gl.sampler_parameter_f32(raw, glow::TEXTURE_MAX_ANISOTROPY_EXT, desc.max_anisotropy);
            }
            match desc.compare {
                Some(func) => {
                    gl.sampler_parameter_i32(raw, glow::TEXTURE_COMPARE_MODE, glow::COMPARE_REF_TO_TEXTURE as i32);
                    gl.sampler_parameter_i32(raw, glow::TEXTURE_COMPARE_FUNC, compare_to_gl(func) as i32);
                }
                None => gl.sampler_parameter_i32(raw, glow::TEXTURE_COMPARE_MODE, glow::NONE as i32),
            }
        }
    }

    fn bind_sampler(&self, unit: u32, sampler: Option<NativeId>) {
        unsafe { self.gl.bind_sampler(unit, sampler.and_then(|id| gl_name(id, glow::NativeSampler))) };
    }

    fn delete_sampler(&self, sampler: NativeId) {
        if let Some(raw) = gl_name(sampler, glow::NativeSampler) {
            unsafe { self.gl.delete_sampler(raw) };
        }
    }

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(&self) -> Result<NativeId> {
        let id = Self::created(unsafe { self.gl.create_framebuffer() }, "framebuffer", |f| f.0)?;
        self.with_framebuffer(id, |_| {});
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
        let point = attachment_to_gl(attachment);
        let texture = gl_name(texture, glow::NativeTexture);
        self.with_framebuffer(framebuffer, |gl| unsafe {
            match layer {
                Some(layer) => {
                    gl.framebuffer_texture_layer(glow::FRAMEBUFFER, point, texture, gl_u32(level), gl_u32(layer))
                }
                None => gl.framebuffer_texture(glow::FRAMEBUFFER, point, texture, gl_u32(level)),
            }
        });
    }

    fn check_framebuffer_status(&self, framebuffer: NativeId) -> FramebufferStatus {
        let mut status = FramebufferStatus::Undefined;
        self.with_framebuffer(framebuffer, |gl| {
            status = framebuffer_status_from_gl(unsafe { gl.check_framebuffer_status(glow::FRAMEBUFFER) });
        });
        status
    }

    fn draw_buffers(&self, framebuffer: NativeId, color_attachments: &[u32]) {
        let buffers: Vec<u32> = color_attachments.iter().map(|&i| glow::COLOR_ATTACHMENT0 + i).collect();
        self.with_framebuffer(framebuffer, |gl| unsafe {
            gl.draw_buffers(&buffers);
        });
    }

    fn bind_framebuffer(&self, framebuffer: Option<NativeId>) {
        self.bindings().framebuffer = framebuffer;
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, framebuffer.and_then(|id| gl_name(id, glow::NativeFramebuffer)))
        };
    }

    fn delete_framebuffer(&self, framebuffer: NativeId) {
        let mut bindings = self.bindings();
        if bindings.framebuffer == Some(framebuffer) {
            bindings.framebuffer = None;
        }
        drop(bindings);
        if let Some(raw) = gl_name(framebuffer, glow::NativeFramebuffer) {
            unsafe { self.gl.delete_framebuffer(raw) };
        }
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&self) -> Result<NativeId> {
        let id = Self::created(unsafe { self.gl.create_vertex_array() }, "vertex array", |v| v.0)?;
        self.with_vertex_array(id, |_| {});
        Ok(id)
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
        let (size, ty) = vertex_format_to_gl(format);
        let integer = is_integer_attribute(format, normalized);
        self.with_vertex_array(vertex_array, |gl| unsafe {
            gl.enable_vertex_attrib_array(index);
            if integer {
                gl.vertex_attrib_format_i32(index, size, ty, relative_offset);
            } else {
                gl.vertex_attrib_format_f32(index, size, ty, normalized, relative_offset);
            }
            gl.vertex_attrib_binding(index, binding);
        });
    }

    fn vertex_buffer(
        &self,
        vertex_array: NativeId,
        binding: u32,
        buffer: NativeId,
        offset: usize,
        stride: u32,
    ) {
        let buffer = gl_name(buffer, glow::NativeBuffer);
        self.with_vertex_array(vertex_array, |gl| unsafe {
            gl.bind_vertex_buffer(binding, buffer, gl_int(offset), gl_u32(stride));
        });
    }

    fn element_buffer(&self, vertex_array: NativeId, buffer: NativeId) {
        let buffer = gl_name(buffer, glow::NativeBuffer);
        self.with_vertex_array(vertex_array, |gl| unsafe {
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, buffer);
        });
    }

    fn bind_vertex_array(&self, vertex_array: Option<NativeId>) {
        self.bindings().vertex_array = vertex_array;
        unsafe { self.gl.bind_vertex_array(vertex_array.and_then(|id| gl_name(id, glow::NativeVertexArray))) };
    }

    fn delete_vertex_array(&self, vertex_array: NativeId) {
        let mut bindings = self.bindings();
        if bindings.vertex_array == Some(vertex_array) {
            bindings.vertex_array = None;
        }
        drop(bindings);
        if let Some(raw) = gl_name(vertex_array, glow::NativeVertexArray) {
            unsafe { self.gl.delete_vertex_array(raw) };
        }
    }

    // ===== FENCES =====

    fn fence_sync(&self) -> Result<SyncId> {
        let fence = unsafe { self.gl.fence_sync(glow::SYNC_GPU_COMMANDS_COMPLETE, 0) }.map_err(|e| {
            prism_err!(BackendError, "prism::GlowGraphicsDevice", "Failed to create fence: {}", e)
        })?;
        let mut syncs = self.syncs();
        syncs.next += 1;
        let id = syncs.next;
        syncs.fences.insert(id, fence);
        Ok(id)
    }

    fn client_wait_sync(&self, sync: SyncId, flush: bool, timeout_ns: u64) -> FenceStatus {
        let Some(fence) = self.syncs().fences.get(&sync).copied() else {
            prism_warn!("prism::GlowGraphicsDevice", "Wait on unknown sync {}", sync);
            return FenceStatus::WaitFailed;
        };
        let status = wait_in_slices(timeout_ns, flush, |timeout, flush| {
            let flags = if flush { glow::SYNC_FLUSH_COMMANDS_BIT } else { 0 };
            unsafe { self.gl.client_wait_sync(fence, flags, timeout) }
        });
        fence_status_from_gl(status)
    }

    fn wait_sync(&self, sync: SyncId) {
        if let Some(fence) = self.syncs().fences.get(&sync).copied() {
            unsafe { self.gl.wait_sync(fence, 0, u64::MAX) };
        }
    }

    fn delete_sync(&self, sync: SyncId) {
        if let Some(fence) = self.syncs().fences.remove(&sync) {
            unsafe { self.gl.delete_sync(fence) };
        }
    }

    // ===== SHADERS =====

    fn create_shader(&self, kind: StageKind) -> Result<NativeId> {
        let id = Self::created(unsafe { self.gl.create_shader(stage_to_gl(kind)) }, "shader", |s| s.0)?;
        self.shaders().insert(id, ShaderState { kind, binary: None, failure: None });
        Ok(id)
    }

    fn shader_source(&self, shader: NativeId, source: &str) {
        if let Some(raw) = gl_name(shader, glow::NativeShader) {
            unsafe { self.gl.shader_source(raw, source) };
        }
    }

    fn shader_binary(&self, shader: NativeId, binary: &[u8]) {
        if let Some(state) = self.shaders().get_mut(&shader) {
            state.binary = Some(binary.to_vec());
            state.failure = None;
        }
    }

    fn specialize_shader(&self, shader: NativeId, entry_point: &str) {
        let translated = {
            let mut shaders = self.shaders();
            let Some(state) = shaders.get_mut(&shader) else {
                return;
            };
            let result = match state.binary.take() {
                Some(binary) => spirv::spirv_to_glsl(&binary, state.kind, entry_point),
                None => Err("error: no SPIR-V binary submitted".to_string()),
            };
            if let Err(log) = &result {
                state.failure = Some(log.clone());
            }
            result
        };

        match translated {
            Ok(glsl) => {
                prism_trace!("prism::GlowGraphicsDevice",
                    "Translated SPIR-V shader {} ({} bytes of GLSL)", shader, glsl.len());
                self.shader_source(shader, &glsl);
                self.compile_shader(shader);
            }
            Err(log) => self.report(DiagnosticMessage::new(
                DebugSource::ShaderCompiler,
                DebugKind::Error,
                DebugSeverityLevel::High,
                0,
                log,
            )),
        }
    }

    fn compile_shader(&self, shader: NativeId) {
        if let Some(raw) = gl_name(shader, glow::NativeShader) {
            unsafe { self.gl.compile_shader(raw) };
        }
    }

    fn get_shader_compile_status(&self, shader: NativeId) -> bool {
        if self.shaders().get(&shader).is_some_and(|s| s.failure.is_some()) {
            return false;
        }
        gl_name(shader, glow::NativeShader).is_some_and(|raw| unsafe { self.gl.get_shader_compile_status(raw) })
    }

    fn get_shader_info_log(&self, shader: NativeId) -> String {
        if let Some(failure) = self.shaders().get(&shader).and_then(|s| s.failure.clone()) {
            return failure;
        }
        gl_name(shader, glow::NativeShader)
            .map(|raw| unsafe { self.gl.get_shader_info_log(raw) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: NativeId) {
        self.shaders().remove(&shader);
        if let Some(raw) = gl_name(shader, glow::NativeShader) {
            unsafe { self.gl.delete_shader(raw) };
        }
    }

    // ===== PROGRAMS =====

    fn create_program(&self) -> Result<NativeId> {
        Self::created(unsafe { self.gl.create_program() }, "program", |p| p.0)
    }

    fn attach_shader(&self, program: NativeId, shader: NativeId) {
        if let (Some(p), Some(s)) = (gl_name(program, glow::NativeProgram), gl_name(shader, glow::NativeShader)) {
            unsafe { self.gl.attach_shader(p, s) };
        }
    }

    fn detach_shader(&self, program: NativeId, shader: NativeId) {
        if let (Some(p), Some(s)) = (gl_name(program, glow::NativeProgram), gl_name(shader, glow::NativeShader)) {
            unsafe { self.gl.detach_shader(p, s) };
        }
    }

    fn link_program(&self, program: NativeId) {
        if let Some(raw) = gl_name(program, glow::NativeProgram) {
            unsafe { self.gl.link_program(raw) };
        }
    }

    fn get_program_link_status(&self, program: NativeId) -> bool {
        gl_name(program, glow::NativeProgram).is_some_and(|raw| unsafe { self.gl.get_program_link_status(raw) })
    }

    fn get_program_info_log(&self, program: NativeId) -> String {
        gl_name(program, glow::NativeProgram)
            .map(|raw| unsafe { self.gl.get_program_info_log(raw) })
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<NativeId>) {
        self.bindings().program = program;
        unsafe { self.gl.use_program(program.and_then(|id| gl_name(id, glow::NativeProgram))) };
    }

    fn get_uniform_location(&self, program: NativeId, name: &str) -> Option<i32> {
        let raw = gl_name(program, glow::NativeProgram)?;
        let location = unsafe { self.gl.get_uniform_location(raw, name) }?;
        i32::try_from(location.0).ok()
    }

    fn program_uniform(&self, program: NativeId, location: i32, value: &UniformValue) {
        let Ok(index) = u32::try_from(location) else {
            return;
        };
        let loc = glow::NativeUniformLocation(index);
        let loc = Some(&loc);
        self.with_program(program, |gl| unsafe {
            match *value {
                UniformValue::Int(v) => gl.uniform_1_i32(loc, v),
                UniformValue::UInt(v) => gl.uniform_1_u32(loc, v),
                UniformValue::Float(v) => gl.uniform_1_f32(loc, v),
                UniformValue::Vec2(v) => gl.uniform_2_f32(loc, v.x, v.y),
                UniformValue::Vec3(v) => gl.uniform_3_f32(loc, v.x, v.y, v.z),
                UniformValue::Vec4(v) => gl.uniform_4_f32(loc, v.x, v.y, v.z, v.w),
                UniformValue::IVec2(v) => gl.uniform_2_i32(loc, v.x, v.y),
                UniformValue::IVec3(v) => gl.uniform_3_i32(loc, v.x, v.y, v.z),
                UniformValue::IVec4(v) => gl.uniform_4_i32(loc, v.x, v.y, v.z, v.w),
                UniformValue::UVec2(v) => gl.uniform_2_u32(loc, v.x, v.y),
                UniformValue::UVec3(v) => gl.uniform_3_u32(loc, v.x, v.y, v.z),
                UniformValue::UVec4(v) => gl.uniform_4_u32(loc, v.x, v.y, v.z, v.w),
                UniformValue::Mat3(m) => gl.uniform_matrix_3_f32_slice(loc, false, &m.to_cols_array()),
                UniformValue::Mat4(m) => gl.uniform_matrix_4_f32_slice(loc, false, &m.to_cols_array()),
            }
        });
    }

    fn get_program_binary(&self, program: NativeId) -> Option<ProgramBinary> {
        let raw = gl_name(program, glow::NativeProgram)?;
        let binary = unsafe { self.gl.get_program_binary(raw) }?;
        Some(ProgramBinary { format: binary.format, bytes: binary.buffer })
    }

    fn program_binary(&self, program: NativeId, binary: &ProgramBinary) {
        let Some(raw) = gl_name(program, glow::NativeProgram) else {
            return;
        };
        let native = glow::ProgramBinary { buffer: binary.bytes.clone(), format: binary.format };
        unsafe { self.gl.program_binary(raw, &native) };
    }

    fn delete_program(&self, program: NativeId) {
        let mut bindings = self.bindings();
        if bindings.program == Some(program) {
            bindings.program = None;
        }
        drop(bindings);
        if let Some(raw) = gl_name(program, glow::NativeProgram) {
            unsafe { self.gl.delete_program(raw) };
        }
    }

    // ===== DIAGNOSTICS =====

    fn diagnostics(&self) -> &DiagnosticContext {
        &self.diagnostics
    }
}

#[cfg(test)]
#[path = "glow_device_tests.rs"]
mod tests;
