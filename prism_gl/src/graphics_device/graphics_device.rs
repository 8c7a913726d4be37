/// GraphicsDevice trait - one method per native entry point the core uses
///
/// Backends implement this over a native API context. All methods take
/// `&self`: the native context is owned by one logical thread, and
/// implementations keep whatever bookkeeping they need behind interior
/// mutability. Creation methods fail with `BackendError` when the native API
/// returns no object. State-setting calls do not report errors; the native
/// debug output reaches the device's [`DiagnosticContext`] instead.

use std::sync::Arc;

use crate::diagnostics::DiagnosticContext;
use crate::error::Result;
use crate::format::{PixelTransfer, TextureFormat, VertexFormat};
use crate::resource::SamplerDesc;
use crate::shader::StageKind;

use super::types::*;

/// Shared reference to a device, held by every owned resource
pub type DeviceRef = Arc<dyn GraphicsDevice>;

pub trait GraphicsDevice: Send + Sync {
    // ===== BUFFERS =====

    fn create_buffer(&self) -> Result<NativeId>;

    /// Allocate immutable storage of `size` bytes, optionally initialized
    fn buffer_storage(&self, buffer: NativeId, size: usize, data: Option<&[u8]>, flags: BufferFlags);

    fn buffer_sub_data(&self, buffer: NativeId, offset: usize, data: &[u8]);

    fn get_buffer_sub_data(&self, buffer: NativeId, offset: usize, out: &mut [u8]);

    /// Map a byte range; the pointer stays valid until `unmap_buffer`
    fn map_buffer_range(
        &self,
        buffer: NativeId,
        offset: usize,
        length: usize,
        access: MapAccess,
    ) -> Result<*mut u8>;

    fn flush_mapped_buffer_range(&self, buffer: NativeId, offset: usize, length: usize);

    fn unmap_buffer(&self, buffer: NativeId);

    fn bind_buffer_base(&self, target: IndexedBufferTarget, index: u32, buffer: NativeId);

    fn bind_buffer_range(
        &self,
        target: IndexedBufferTarget,
        index: u32,
        buffer: NativeId,
        offset: usize,
        size: usize,
    );

    fn delete_buffer(&self, buffer: NativeId);

    // ===== TEXTURES =====

    fn create_texture(&self, target: TextureTarget) -> Result<NativeId>;

    #[allow(clippy::too_many_arguments)]
    fn texture_storage(
        &self,
        texture: NativeId,
        target: TextureTarget,
        levels: u32,
        format: TextureFormat,
        width: u32,
        height: u32,
        depth: u32,
    );

    fn texture_sub_image(
        &self,
        texture: NativeId,
        target: TextureTarget,
        region: &TextureRegion,
        transfer: PixelTransfer,
        data: &[u8],
    );

    fn generate_mipmap(&self, texture: NativeId, target: TextureTarget);

    /// Bind a texture (or nothing) to a texture unit
    fn bind_texture_unit(&self, unit: u32, target: TextureTarget, texture: Option<NativeId>);

    #[allow(clippy::too_many_arguments)]
    fn bind_image_texture(
        &self,
        unit: u32,
        texture: NativeId,
        level: u32,
        layered: bool,
        layer: u32,
        access: Access,
        format: TextureFormat,
    );

    fn delete_texture(&self, texture: NativeId);

    // ===== SAMPLERS =====

    fn create_sampler(&self) -> Result<NativeId>;

    fn sampler_parameters(&self, sampler: NativeId, desc: &SamplerDesc);

    fn bind_sampler(&self, unit: u32, sampler: Option<NativeId>);

    fn delete_sampler(&self, sampler: NativeId);

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(&self) -> Result<NativeId>;

    /// Attach a texture level; `layer` selects one layer or face of a
    /// layered texture, `None` attaches the whole level
    fn framebuffer_texture(
        &self,
        framebuffer: NativeId,
        attachment: AttachmentPoint,
        texture: NativeId,
        level: u32,
        layer: Option<u32>,
    );

    fn check_framebuffer_status(&self, framebuffer: NativeId) -> FramebufferStatus;

    /// Select the color attachments written by fragment outputs
    fn draw_buffers(&self, framebuffer: NativeId, color_attachments: &[u32]);

    /// Bind a framebuffer, `None` for the default one
    fn bind_framebuffer(&self, framebuffer: Option<NativeId>);

    fn delete_framebuffer(&self, framebuffer: NativeId);

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&self) -> Result<NativeId>;

    fn vertex_attrib_format(
        &self,
        vertex_array: NativeId,
        index: u32,
        format: VertexFormat,
        normalized: bool,
        relative_offset: u32,
        binding: u32,
    );

    fn vertex_buffer(
        &self,
        vertex_array: NativeId,
        binding: u32,
        buffer: NativeId,
        offset: usize,
        stride: u32,
    );

    fn element_buffer(&self, vertex_array: NativeId, buffer: NativeId);

    fn bind_vertex_array(&self, vertex_array: Option<NativeId>);

    fn delete_vertex_array(&self, vertex_array: NativeId);

    // ===== FENCES =====

    /// Insert a fence into the command stream
    fn fence_sync(&self) -> Result<SyncId>;

    /// Block the caller until the fence signals or `timeout_ns` elapses
    fn client_wait_sync(&self, sync: SyncId, flush: bool, timeout_ns: u64) -> FenceStatus;

    /// Make the GPU wait for the fence before executing later commands
    fn wait_sync(&self, sync: SyncId);

    fn delete_sync(&self, sync: SyncId);

    // ===== SHADERS =====

    fn create_shader(&self, kind: StageKind) -> Result<NativeId>;

    fn shader_source(&self, shader: NativeId, source: &str);

    /// Submit an intermediate (SPIR-V) binary
    fn shader_binary(&self, shader: NativeId, binary: &[u8]);

    /// Select the entry point of a binary stage and compile it
    fn specialize_shader(&self, shader: NativeId, entry_point: &str);

    fn compile_shader(&self, shader: NativeId);

    fn get_shader_compile_status(&self, shader: NativeId) -> bool;

    fn get_shader_info_log(&self, shader: NativeId) -> String;

    fn delete_shader(&self, shader: NativeId);

    // ===== PROGRAMS =====

    fn create_program(&self) -> Result<NativeId>;

    fn attach_shader(&self, program: NativeId, shader: NativeId);

    fn detach_shader(&self, program: NativeId, shader: NativeId);

    fn link_program(&self, program: NativeId);

    fn get_program_link_status(&self, program: NativeId) -> bool;

    fn get_program_info_log(&self, program: NativeId) -> String;

    /// Make a program current, `None` to unbind
    fn use_program(&self, program: Option<NativeId>);

    fn get_uniform_location(&self, program: NativeId, name: &str) -> Option<i32>;

    fn program_uniform(&self, program: NativeId, location: i32, value: &UniformValue);

    /// Retrieve the linked image, `None` when the driver cannot provide one
    fn get_program_binary(&self, program: NativeId) -> Option<ProgramBinary>;

    /// Load a linked image; success is reported by the link status
    fn program_binary(&self, program: NativeId, binary: &ProgramBinary);

    fn delete_program(&self, program: NativeId);

    // ===== DIAGNOSTICS =====

    /// Context receiving this device's native debug messages
    fn diagnostics(&self) -> &DiagnosticContext;
}
