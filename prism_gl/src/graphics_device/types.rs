/// Plain data types shared by the device trait and its callers

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use glam::{IVec2, IVec3, IVec4, Mat3, Mat4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};

/// Native object name (GL names are 32-bit)
pub type NativeId = u32;

/// Native sync object identity
pub type SyncId = u64;

/// Native object categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Buffer,
    Texture,
    Sampler,
    Framebuffer,
    VertexArray,
    Fence,
    Shader,
    Program,
}

bitflags! {
    /// Immutable buffer storage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferFlags: u32 {
        /// Contents may be updated after creation with `update`
        const DYNAMIC_STORAGE = 1 << 0;
        /// Storage may be mapped for reading
        const MAP_READ = 1 << 1;
        /// Storage may be mapped for writing
        const MAP_WRITE = 1 << 2;
        /// Storage may stay mapped while the GPU uses it
        const MAP_PERSISTENT = 1 << 3;
        /// Persistent mappings are coherent
        const MAP_COHERENT = 1 << 4;
        /// Prefer client memory
        const CLIENT_STORAGE = 1 << 5;
    }
}

bitflags! {
    /// Access requested when mapping a buffer range
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MapAccess: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const PERSISTENT = 1 << 2;
        const COHERENT = 1 << 3;
        const INVALIDATE_RANGE = 1 << 4;
        const INVALIDATE_BUFFER = 1 << 5;
        const FLUSH_EXPLICIT = 1 << 6;
        const UNSYNCHRONIZED = 1 << 7;
    }
}

/// Indexed buffer binding points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexedBufferTarget {
    ShaderStorage,
    Uniform,
    AtomicCounter,
    TransformFeedback,
}

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Tex2D,
    Tex2DArray,
    Tex3D,
    Cube,
}

/// Read/write access of an image or storage block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

/// Region of one mip level written by a texture upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRegion {
    pub level: u32,
    pub x: u32,
    pub y: u32,
    /// Z offset, array layer or cube face
    pub z: u32,
    pub width: u32,
    pub height: u32,
    /// Depth, layer count or face count
    pub depth: u32,
}

/// Framebuffer attachment points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    Color(u32),
    Depth,
    Stencil,
    DepthStencil,
}

/// Framebuffer completeness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    IncompleteAttachment,
    MissingAttachment,
    IncompleteDrawBuffer,
    IncompleteReadBuffer,
    IncompleteMultisample,
    IncompleteLayerTargets,
    Unsupported,
    Undefined,
    Other(u32),
}

/// Result of a client-side fence wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceStatus {
    /// Signaled before the wait started
    AlreadySignaled,
    /// Signaled during the wait
    ConditionSatisfied,
    /// Not signaled within the timeout
    TimeoutExpired,
    /// The wait itself failed
    WaitFailed,
}

impl FenceStatus {
    pub fn is_signaled(&self) -> bool {
        matches!(self, FenceStatus::AlreadySignaled | FenceStatus::ConditionSatisfied)
    }
}

/// Value uploaded to a classic uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    IVec2(IVec2),
    IVec3(IVec3),
    IVec4(IVec4),
    UVec2(UVec2),
    UVec3(UVec3),
    UVec4(UVec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

macro_rules! impl_uniform_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )*
    };
}

impl_uniform_from!(
    i32 => Int,
    u32 => UInt,
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    IVec2 => IVec2,
    IVec3 => IVec3,
    IVec4 => IVec4,
    UVec2 => UVec2,
    UVec3 => UVec3,
    UVec4 => UVec4,
    Mat3 => Mat3,
    Mat4 => Mat4,
);

/// Driver-specific linked program image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramBinary {
    /// Driver binary format token
    pub format: u32,
    pub bytes: Vec<u8>,
}
