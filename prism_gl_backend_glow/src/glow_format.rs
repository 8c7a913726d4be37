/// Pure conversions between prism_gl types and OpenGL enums
///
/// Nothing here touches a context, so every mapping is unit tested without
/// a GPU.

use prism_gl::prism::device::{
    Access, AttachmentPoint, BufferFlags, FenceStatus, FramebufferStatus, IndexedBufferTarget, MapAccess,
    TextureTarget,
};
use prism_gl::prism::diagnostics::{DebugKind, DebugSeverityLevel, DebugSource};
use prism_gl::prism::format::{PixelFormat, PixelTransfer, PixelType, ScalarType, TextureFormat, VertexFormat};
use prism_gl::prism::resource::{CompareFunc, Filter, MipmapFilter, WrapMode};
use prism_gl::prism::shader::StageKind;

// ===== TEXTURES =====

pub(crate) fn texture_format_to_gl(format: TextureFormat) -> u32 {
    use TextureFormat as F;
    match format {
        F::R8 => glow::R8,
        F::RG8 => glow::RG8,
        F::RGB8 => glow::RGB8,
        F::RGBA8 => glow::RGBA8,
        F::R16 => glow::R16,
        F::RG16 => glow::RG16,
        F::RGB16 => glow::RGB16,
        F::RGBA16 => glow::RGBA16,

        F::R8Snorm => glow::R8_SNORM,
        F::RG8Snorm => glow::RG8_SNORM,
        F::RGB8Snorm => glow::RGB8_SNORM,
        F::RGBA8Snorm => glow::RGBA8_SNORM,
        F::R16Snorm => glow::R16_SNORM,
        F::RG16Snorm => glow::RG16_SNORM,
        F::RGB16Snorm => glow::RGB16_SNORM,
        F::RGBA16Snorm => glow::RGBA16_SNORM,

        F::R8UI => glow::R8UI,
        F::RG8UI => glow::RG8UI,
        F::RGB8UI => glow::RGB8UI,
        F::RGBA8UI => glow::RGBA8UI,
        F::R16UI => glow::R16UI,
        F::RG16UI => glow::RG16UI,
        F::RGB16UI => glow::RGB16UI,
        F::RGBA16UI => glow::RGBA16UI,
        F::R32UI => glow::R32UI,
        F::RG32UI => glow::RG32UI,
        F::RGB32UI => glow::RGB32UI,
        F::RGBA32UI => glow::RGBA32UI,

        F::R8I => glow::R8I,
        F::RG8I => glow::RG8I,
        F::RGB8I => glow::RGB8I,
        F::RGBA8I => glow::RGBA8I,
        F::R16I => glow::R16I,
        F::RG16I => glow::RG16I,
        F::RGB16I => glow::RGB16I,
        F::RGBA16I => glow::RGBA16I,
        F::R32I => glow::R32I,
        F::RG32I => glow::RG32I,
        F::RGB32I => glow::RGB32I,
        F::RGBA32I => glow::RGBA32I,

        F::R16F => glow::R16F,
        F::RG16F => glow::RG16F,
        F::RGB16F => glow::RGB16F,
        F::RGBA16F => glow::RGBA16F,
        F::R32F => glow::R32F,
        F::RG32F => glow::RG32F,
        F::RGB32F => glow::RGB32F,
        F::RGBA32F => glow::RGBA32F,

        F::Srgb8 => glow::SRGB8,
        F::Srgb8Alpha8 => glow::SRGB8_ALPHA8,

        F::Depth16 => glow::DEPTH_COMPONENT16,
        F::Depth24 => glow::DEPTH_COMPONENT24,
        F::Depth32F => glow::DEPTH_COMPONENT32F,
        F::Depth24Stencil8 => glow::DEPTH24_STENCIL8,
        F::Depth32FStencil8 => glow::DEPTH32F_STENCIL8,
    }
}

pub(crate) fn texture_target_to_gl(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::Tex2D => glow::TEXTURE_2D,
        TextureTarget::Tex2DArray => glow::TEXTURE_2D_ARRAY,
        TextureTarget::Tex3D => glow::TEXTURE_3D,
        TextureTarget::Cube => glow::TEXTURE_CUBE_MAP,
    }
}

/// Upload target for one cube face
pub(crate) fn cube_face_to_gl(face: u32) -> u32 {
    glow::TEXTURE_CUBE_MAP_POSITIVE_X + face
}

pub(crate) fn pixel_transfer_to_gl(transfer: PixelTransfer) -> (u32, u32) {
    let format = match transfer.format {
        PixelFormat::Red => glow::RED,
        PixelFormat::Rg => glow::RG,
        PixelFormat::Rgb => glow::RGB,
        PixelFormat::Rgba => glow::RGBA,
        PixelFormat::RedInteger => glow::RED_INTEGER,
        PixelFormat::RgInteger => glow::RG_INTEGER,
        PixelFormat::RgbInteger => glow::RGB_INTEGER,
        PixelFormat::RgbaInteger => glow::RGBA_INTEGER,
        PixelFormat::Depth => glow::DEPTH_COMPONENT,
        PixelFormat::DepthStencil => glow::DEPTH_STENCIL,
    };
    let ty = match transfer.ty {
        PixelType::UnsignedByte => glow::UNSIGNED_BYTE,
        PixelType::Byte => glow::BYTE,
        PixelType::UnsignedShort => glow::UNSIGNED_SHORT,
        PixelType::Short => glow::SHORT,
        PixelType::UnsignedInt => glow::UNSIGNED_INT,
        PixelType::Int => glow::INT,
        PixelType::HalfFloat => glow::HALF_FLOAT,
        PixelType::Float => glow::FLOAT,
        PixelType::UnsignedInt24_8 => glow::UNSIGNED_INT_24_8,
        PixelType::Float32UnsignedInt24_8Rev => glow::FLOAT_32_UNSIGNED_INT_24_8_REV,
    };
    (format, ty)
}

pub(crate) fn access_to_gl(access: Access) -> u32 {
    match access {
        Access::ReadOnly => glow::READ_ONLY,
        Access::WriteOnly => glow::WRITE_ONLY,
        Access::ReadWrite => glow::READ_WRITE,
    }
}

// ===== BUFFERS =====

pub(crate) fn buffer_flags_to_gl(flags: BufferFlags) -> u32 {
    let mut bits = 0;
    if flags.contains(BufferFlags::DYNAMIC_STORAGE) {
        bits |= glow::DYNAMIC_STORAGE_BIT;
    }
    if flags.contains(BufferFlags::MAP_READ) {
        bits |= glow::MAP_READ_BIT;
    }
    if flags.contains(BufferFlags::MAP_WRITE) {
        bits |= glow::MAP_WRITE_BIT;
    }
    if flags.contains(BufferFlags::MAP_PERSISTENT) {
        bits |= glow::MAP_PERSISTENT_BIT;
    }
    if flags.contains(BufferFlags::MAP_COHERENT) {
        bits |= glow::MAP_COHERENT_BIT;
    }
    if flags.contains(BufferFlags::CLIENT_STORAGE) {
        bits |= glow::CLIENT_STORAGE_BIT;
    }
    bits
}

pub(crate) fn map_access_to_gl(access: MapAccess) -> u32 {
    let table = [
        (MapAccess::READ, glow::MAP_READ_BIT),
        (MapAccess::WRITE, glow::MAP_WRITE_BIT),
        (MapAccess::PERSISTENT, glow::MAP_PERSISTENT_BIT),
        (MapAccess::COHERENT, glow::MAP_COHERENT_BIT),
        (MapAccess::INVALIDATE_RANGE, glow::MAP_INVALIDATE_RANGE_BIT),
        (MapAccess::INVALIDATE_BUFFER, glow::MAP_INVALIDATE_BUFFER_BIT),
        (MapAccess::FLUSH_EXPLICIT, glow::MAP_FLUSH_EXPLICIT_BIT),
        (MapAccess::UNSYNCHRONIZED, glow::MAP_UNSYNCHRONIZED_BIT),
    ];
    table
        .iter()
        .filter(|(flag, _)| access.contains(*flag))
        .fold(0, |bits, (_, gl)| bits | gl)
}

pub(crate) fn indexed_target_to_gl(target: IndexedBufferTarget) -> u32 {
    match target {
        IndexedBufferTarget::ShaderStorage => glow::SHADER_STORAGE_BUFFER,
        IndexedBufferTarget::Uniform => glow::UNIFORM_BUFFER,
        IndexedBufferTarget::AtomicCounter => glow::ATOMIC_COUNTER_BUFFER,
        IndexedBufferTarget::TransformFeedback => glow::TRANSFORM_FEEDBACK_BUFFER,
    }
}

// ===== VERTEX INPUT =====

pub(crate) fn scalar_to_gl(scalar: ScalarType) -> u32 {
    match scalar {
        ScalarType::U8 => glow::UNSIGNED_BYTE,
        ScalarType::I8 => glow::BYTE,
        ScalarType::U16 => glow::UNSIGNED_SHORT,
        ScalarType::I16 => glow::SHORT,
        ScalarType::U32 => glow::UNSIGNED_INT,
        ScalarType::I32 => glow::INT,
        ScalarType::F16 => glow::HALF_FLOAT,
        ScalarType::F32 => glow::FLOAT,
    }
}

/// `(component count, component type)` of a vertex attribute
pub(crate) fn vertex_format_to_gl(format: VertexFormat) -> (i32, u32) {
    (format.components() as i32, scalar_to_gl(format.scalar()))
}

/// Integer attributes that are not normalized go through the `I` variant
pub(crate) fn is_integer_attribute(format: VertexFormat, normalized: bool) -> bool {
    !normalized && format.scalar() != ScalarType::F32 && format.scalar() != ScalarType::F16
}

// ===== SAMPLERS =====

pub(crate) fn min_filter_to_gl(filter: Filter, mipmap: MipmapFilter) -> u32 {
    match (filter, mipmap) {
        (Filter::Nearest, MipmapFilter::None) => glow::NEAREST,
        (Filter::Linear, MipmapFilter::None) => glow::LINEAR,
        (Filter::Nearest, MipmapFilter::Nearest) => glow::NEAREST_MIPMAP_NEAREST,
        (Filter::Linear, MipmapFilter::Nearest) => glow::LINEAR_MIPMAP_NEAREST,
        (Filter::Nearest, MipmapFilter::Linear) => glow::NEAREST_MIPMAP_LINEAR,
        (Filter::Linear, MipmapFilter::Linear) => glow::LINEAR_MIPMAP_LINEAR,
    }
}

pub(crate) fn mag_filter_to_gl(filter: Filter) -> u32 {
    match filter {
        Filter::Nearest => glow::NEAREST,
        Filter::Linear => glow::LINEAR,
    }
}

pub(crate) fn wrap_to_gl(wrap: WrapMode) -> u32 {
    match wrap {
        WrapMode::Repeat => glow::REPEAT,
        WrapMode::MirroredRepeat => glow::MIRRORED_REPEAT,
        WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
        WrapMode::ClampToBorder => glow::CLAMP_TO_BORDER,
    }
}

pub(crate) fn compare_to_gl(compare: CompareFunc) -> u32 {
    match compare {
        CompareFunc::Never => glow::NEVER,
        CompareFunc::Less => glow::LESS,
        CompareFunc::Equal => glow::EQUAL,
        CompareFunc::LessEqual => glow::LEQUAL,
        CompareFunc::Greater => glow::GREATER,
        CompareFunc::NotEqual => glow::NOTEQUAL,
        CompareFunc::GreaterEqual => glow::GEQUAL,
        CompareFunc::Always => glow::ALWAYS,
    }
}

// ===== FRAMEBUFFERS =====

pub(crate) fn attachment_to_gl(attachment: AttachmentPoint) -> u32 {
    match attachment {
        AttachmentPoint::Color(index) => glow::COLOR_ATTACHMENT0 + index,
        AttachmentPoint::Depth => glow::DEPTH_ATTACHMENT,
        AttachmentPoint::Stencil => glow::STENCIL_ATTACHMENT,
        AttachmentPoint::DepthStencil => glow::DEPTH_STENCIL_ATTACHMENT,
    }
}

pub(crate) fn framebuffer_status_from_gl(status: u32) -> FramebufferStatus {
    match status {
        glow::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferStatus::MissingAttachment,
        glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => FramebufferStatus::IncompleteDrawBuffer,
        glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => FramebufferStatus::IncompleteReadBuffer,
        glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => FramebufferStatus::IncompleteMultisample,
        glow::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => FramebufferStatus::IncompleteLayerTargets,
        glow::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
        glow::FRAMEBUFFER_UNDEFINED => FramebufferStatus::Undefined,
        other => FramebufferStatus::Other(other),
    }
}

// ===== SYNC =====

pub(crate) fn fence_status_from_gl(status: u32) -> FenceStatus {
    match status {
        glow::ALREADY_SIGNALED => FenceStatus::AlreadySignaled,
        glow::CONDITION_SATISFIED => FenceStatus::ConditionSatisfied,
        glow::TIMEOUT_EXPIRED => FenceStatus::TimeoutExpired,
        _ => FenceStatus::WaitFailed,
    }
}

// ===== SHADERS =====

pub(crate) fn stage_to_gl(kind: StageKind) -> u32 {
    match kind {
        StageKind::Vertex => glow::VERTEX_SHADER,
        StageKind::Fragment => glow::FRAGMENT_SHADER,
        StageKind::Compute => glow::COMPUTE_SHADER,
        StageKind::Geometry => glow::GEOMETRY_SHADER,
        StageKind::TessControl => glow::TESS_CONTROL_SHADER,
        StageKind::TessEvaluation => glow::TESS_EVALUATION_SHADER,
    }
}

// ===== DEBUG OUTPUT =====

pub(crate) fn debug_source_from_gl(source: u32) -> DebugSource {
    match source {
        glow::DEBUG_SOURCE_API => DebugSource::Api,
        glow::DEBUG_SOURCE_WINDOW_SYSTEM => DebugSource::WindowSystem,
        glow::DEBUG_SOURCE_SHADER_COMPILER => DebugSource::ShaderCompiler,
        glow::DEBUG_SOURCE_THIRD_PARTY => DebugSource::ThirdParty,
        glow::DEBUG_SOURCE_APPLICATION => DebugSource::Application,
        _ => DebugSource::Other,
    }
}

pub(crate) fn debug_kind_from_gl(kind: u32) -> DebugKind {
    match kind {
        glow::DEBUG_TYPE_ERROR => DebugKind::Error,
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => DebugKind::DeprecatedBehavior,
        glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => DebugKind::UndefinedBehavior,
        glow::DEBUG_TYPE_PORTABILITY => DebugKind::Portability,
        glow::DEBUG_TYPE_PERFORMANCE => DebugKind::Performance,
        glow::DEBUG_TYPE_MARKER => DebugKind::Marker,
        _ => DebugKind::Other,
    }
}

pub(crate) fn debug_severity_from_gl(severity: u32) -> DebugSeverityLevel {
    match severity {
        glow::DEBUG_SEVERITY_HIGH => DebugSeverityLevel::High,
        glow::DEBUG_SEVERITY_MEDIUM => DebugSeverityLevel::Medium,
        glow::DEBUG_SEVERITY_LOW => DebugSeverityLevel::Low,
        _ => DebugSeverityLevel::Notification,
    }
}

#[cfg(test)]
#[path = "glow_format_tests.rs"]
mod tests;
