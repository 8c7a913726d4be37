/// Texture and vertex formats
///
/// Texture formats are looked up from their parts (component count, scalar
/// type, normalization) through an exhaustive match, so adding a scalar type
/// or component layout without extending the table does not compile.

// ===== PARTS =====

/// Number of color channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Components {
    R,
    RG,
    RGB,
    RGBA,
}

impl Components {
    pub const fn count(&self) -> u32 {
        match self {
            Components::R => 1,
            Components::RG => 2,
            Components::RGB => 3,
            Components::RGBA => 4,
        }
    }
}

/// Per-channel storage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F16,
    F32,
}

impl ScalarType {
    pub const fn size_bytes(&self) -> u32 {
        match self {
            ScalarType::U8 | ScalarType::I8 => 1,
            ScalarType::U16 | ScalarType::I16 | ScalarType::F16 => 2,
            ScalarType::U32 | ScalarType::I32 | ScalarType::F32 => 4,
        }
    }
}

/// How integer channels are read by shaders
///
/// Ignored for float scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalization {
    /// Sampled as floats in [0, 1] or [-1, 1]
    Normalized,
    /// Sampled as integers
    Integer,
}

// ===== TEXTURE FORMAT =====

/// Sized internal texture formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    // Unsigned normalized
    R8, RG8, RGB8, RGBA8,
    R16, RG16, RGB16, RGBA16,

    // Signed normalized
    R8Snorm, RG8Snorm, RGB8Snorm, RGBA8Snorm,
    R16Snorm, RG16Snorm, RGB16Snorm, RGBA16Snorm,

    // Unsigned integer
    R8UI, RG8UI, RGB8UI, RGBA8UI,
    R16UI, RG16UI, RGB16UI, RGBA16UI,
    R32UI, RG32UI, RGB32UI, RGBA32UI,

    // Signed integer
    R8I, RG8I, RGB8I, RGBA8I,
    R16I, RG16I, RGB16I, RGBA16I,
    R32I, RG32I, RGB32I, RGBA32I,

    // Float
    R16F, RG16F, RGB16F, RGBA16F,
    R32F, RG32F, RGB32F, RGBA32F,

    // sRGB
    Srgb8, Srgb8Alpha8,

    // Depth / stencil
    Depth16,
    Depth24,
    Depth32F,
    Depth24Stencil8,
    Depth32FStencil8,
}

impl TextureFormat {
    /// Format for the given parts, if the native API has one
    ///
    /// 32-bit normalized integers have no native format.
    pub const fn from_parts(
        components: Components,
        scalar: ScalarType,
        normalization: Normalization,
    ) -> Option<TextureFormat> {
        use Components::*;
        use Normalization::*;
        use ScalarType::*;
        use TextureFormat as F;

        let format = match (scalar, normalization, components) {
            (U8, Normalized, R) => F::R8,
            (U8, Normalized, RG) => F::RG8,
            (U8, Normalized, RGB) => F::RGB8,
            (U8, Normalized, RGBA) => F::RGBA8,
            (I8, Normalized, R) => F::R8Snorm,
            (I8, Normalized, RG) => F::RG8Snorm,
            (I8, Normalized, RGB) => F::RGB8Snorm,
            (I8, Normalized, RGBA) => F::RGBA8Snorm,
            (U16, Normalized, R) => F::R16,
            (U16, Normalized, RG) => F::RG16,
            (U16, Normalized, RGB) => F::RGB16,
            (U16, Normalized, RGBA) => F::RGBA16,
            (I16, Normalized, R) => F::R16Snorm,
            (I16, Normalized, RG) => F::RG16Snorm,
            (I16, Normalized, RGB) => F::RGB16Snorm,
            (I16, Normalized, RGBA) => F::RGBA16Snorm,
            (U32, Normalized, _) | (I32, Normalized, _) => return None,

            (U8, Integer, R) => F::R8UI,
            (U8, Integer, RG) => F::RG8UI,
            (U8, Integer, RGB) => F::RGB8UI,
            (U8, Integer, RGBA) => F::RGBA8UI,
            (I8, Integer, R) => F::R8I,
            (I8, Integer, RG) => F::RG8I,
            (I8, Integer, RGB) => F::RGB8I,
            (I8, Integer, RGBA) => F::RGBA8I,
            (U16, Integer, R) => F::R16UI,
            (U16, Integer, RG) => F::RG16UI,
            (U16, Integer, RGB) => F::RGB16UI,
            (U16, Integer, RGBA) => F::RGBA16UI,
            (I16, Integer, R) => F::R16I,
            (I16, Integer, RG) => F::RG16I,
            (I16, Integer, RGB) => F::RGB16I,
            (I16, Integer, RGBA) => F::RGBA16I,
            (U32, Integer, R) => F::R32UI,
            (U32, Integer, RG) => F::RG32UI,
            (U32, Integer, RGB) => F::RGB32UI,
            (U32, Integer, RGBA) => F::RGBA32UI,
            (I32, Integer, R) => F::R32I,
            (I32, Integer, RG) => F::RG32I,
            (I32, Integer, RGB) => F::RGB32I,
            (I32, Integer, RGBA) => F::RGBA32I,

            (F16, Normalized | Integer, R) => F::R16F,
            (F16, Normalized | Integer, RG) => F::RG16F,
            (F16, Normalized | Integer, RGB) => F::RGB16F,
            (F16, Normalized | Integer, RGBA) => F::RGBA16F,
            (F32, Normalized | Integer, R) => F::R32F,
            (F32, Normalized | Integer, RG) => F::RG32F,
            (F32, Normalized | Integer, RGB) => F::RGB32F,
            (F32, Normalized | Integer, RGBA) => F::RGBA32F,
        };
        Some(format)
    }

    /// Color parts of this format, `None` for depth and sRGB formats
    pub const fn parts(&self) -> Option<(Components, ScalarType, Normalization)> {
        use Components::*;
        use Normalization::*;
        use ScalarType::*;
        use TextureFormat as F;

        let parts = match self {
            F::R8 => (R, U8, Normalized),
            F::RG8 => (RG, U8, Normalized),
            F::RGB8 => (RGB, U8, Normalized),
            F::RGBA8 => (RGBA, U8, Normalized),
            F::R16 => (R, U16, Normalized),
            F::RG16 => (RG, U16, Normalized),
            F::RGB16 => (RGB, U16, Normalized),
            F::RGBA16 => (RGBA, U16, Normalized),
            F::R8Snorm => (R, I8, Normalized),
            F::RG8Snorm => (RG, I8, Normalized),
            F::RGB8Snorm => (RGB, I8, Normalized),
            F::RGBA8Snorm => (RGBA, I8, Normalized),
            F::R16Snorm => (R, I16, Normalized),
            F::RG16Snorm => (RG, I16, Normalized),
            F::RGB16Snorm => (RGB, I16, Normalized),
            F::RGBA16Snorm => (RGBA, I16, Normalized),
            F::R8UI => (R, U8, Integer),
            F::RG8UI => (RG, U8, Integer),
            F::RGB8UI => (RGB, U8, Integer),
            F::RGBA8UI => (RGBA, U8, Integer),
            F::R16UI => (R, U16, Integer),
            F::RG16UI => (RG, U16, Integer),
            F::RGB16UI => (RGB, U16, Integer),
            F::RGBA16UI => (RGBA, U16, Integer),
            F::R32UI => (R, U32, Integer),
            F::RG32UI => (RG, U32, Integer),
            F::RGB32UI => (RGB, U32, Integer),
            F::RGBA32UI => (RGBA, U32, Integer),
            F::R8I => (R, I8, Integer),
            F::RG8I => (RG, I8, Integer),
            F::RGB8I => (RGB, I8, Integer),
            F::RGBA8I => (RGBA, I8, Integer),
            F::R16I => (R, I16, Integer),
            F::RG16I => (RG, I16, Integer),
            F::RGB16I => (RGB, I16, Integer),
            F::RGBA16I => (RGBA, I16, Integer),
            F::R32I => (R, I32, Integer),
            F::RG32I => (RG, I32, Integer),
            F::RGB32I => (RGB, I32, Integer),
            F::RGBA32I => (RGBA, I32, Integer),
            F::R16F => (R, F16, Normalized),
            F::RG16F => (RG, F16, Normalized),
            F::RGB16F => (RGB, F16, Normalized),
            F::RGBA16F => (RGBA, F16, Normalized),
            F::R32F => (R, F32, Normalized),
            F::RG32F => (RG, F32, Normalized),
            F::RGB32F => (RGB, F32, Normalized),
            F::RGBA32F => (RGBA, F32, Normalized),
            F::Srgb8
            | F::Srgb8Alpha8
            | F::Depth16
            | F::Depth24
            | F::Depth32F
            | F::Depth24Stencil8
            | F::Depth32FStencil8 => return None,
        };
        Some(parts)
    }

    /// Size of one texel as uploaded through [`pixel_transfer`](Self::pixel_transfer)
    pub const fn bytes_per_pixel(&self) -> u32 {
        match self.parts() {
            Some((components, scalar, _)) => components.count() * scalar.size_bytes(),
            None => match self {
                TextureFormat::Srgb8 => 3,
                TextureFormat::Srgb8Alpha8 => 4,
                TextureFormat::Depth16 => 2,
                TextureFormat::Depth32FStencil8 => 8,
                _ => 4,
            },
        }
    }

    /// Channel count
    pub const fn components(&self) -> u32 {
        match self.parts() {
            Some((components, _, _)) => components.count(),
            None => match self {
                TextureFormat::Srgb8 => 3,
                TextureFormat::Srgb8Alpha8 => 4,
                TextureFormat::Depth24Stencil8 | TextureFormat::Depth32FStencil8 => 2,
                _ => 1,
            },
        }
    }

    pub const fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth16
                | TextureFormat::Depth24
                | TextureFormat::Depth32F
                | TextureFormat::Depth24Stencil8
                | TextureFormat::Depth32FStencil8
        )
    }

    pub const fn has_stencil(&self) -> bool {
        matches!(self, TextureFormat::Depth24Stencil8 | TextureFormat::Depth32FStencil8)
    }

    /// True when shaders read the channels as integers
    pub const fn is_integer(&self) -> bool {
        matches!(self.parts(), Some((_, _, Normalization::Integer)))
    }

    /// Client-side layout matching this format
    pub const fn pixel_transfer(&self) -> PixelTransfer {
        let (components, scalar, integer) = match self.parts() {
            Some((c, s, n)) => (c, s, matches!(n, Normalization::Integer)),
            None => {
                let (format, ty) = match self {
                    TextureFormat::Srgb8 => (PixelFormat::Rgb, PixelType::UnsignedByte),
                    TextureFormat::Srgb8Alpha8 => (PixelFormat::Rgba, PixelType::UnsignedByte),
                    TextureFormat::Depth16 => (PixelFormat::Depth, PixelType::UnsignedShort),
                    TextureFormat::Depth24 => (PixelFormat::Depth, PixelType::UnsignedInt),
                    TextureFormat::Depth32F => (PixelFormat::Depth, PixelType::Float),
                    TextureFormat::Depth24Stencil8 => {
                        (PixelFormat::DepthStencil, PixelType::UnsignedInt24_8)
                    }
                    _ => (PixelFormat::DepthStencil, PixelType::Float32UnsignedInt24_8Rev),
                };
                return PixelTransfer { format, ty };
            }
        };

        let format = match (components, integer) {
            (Components::R, false) => PixelFormat::Red,
            (Components::RG, false) => PixelFormat::Rg,
            (Components::RGB, false) => PixelFormat::Rgb,
            (Components::RGBA, false) => PixelFormat::Rgba,
            (Components::R, true) => PixelFormat::RedInteger,
            (Components::RG, true) => PixelFormat::RgInteger,
            (Components::RGB, true) => PixelFormat::RgbInteger,
            (Components::RGBA, true) => PixelFormat::RgbaInteger,
        };
        let ty = match scalar {
            ScalarType::U8 => PixelType::UnsignedByte,
            ScalarType::I8 => PixelType::Byte,
            ScalarType::U16 => PixelType::UnsignedShort,
            ScalarType::I16 => PixelType::Short,
            ScalarType::U32 => PixelType::UnsignedInt,
            ScalarType::I32 => PixelType::Int,
            ScalarType::F16 => PixelType::HalfFloat,
            ScalarType::F32 => PixelType::Float,
        };
        PixelTransfer { format, ty }
    }
}

// ===== PIXEL TRANSFER =====

/// Client pixel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Red,
    Rg,
    Rgb,
    Rgba,
    RedInteger,
    RgInteger,
    RgbInteger,
    RgbaInteger,
    Depth,
    DepthStencil,
}

/// Client pixel component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    UnsignedByte,
    Byte,
    UnsignedShort,
    Short,
    UnsignedInt,
    Int,
    HalfFloat,
    Float,
    UnsignedInt24_8,
    Float32UnsignedInt24_8Rev,
}

/// Client-side layout of uploaded pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelTransfer {
    pub format: PixelFormat,
    pub ty: PixelType,
}

// ===== TEXEL =====

/// Rust types that map to a texture format
///
/// ```
/// use prism_gl::prism::format::{Texel, TextureFormat};
/// assert_eq!(<[u8; 4] as Texel>::FORMAT, TextureFormat::RGBA8);
/// ```
pub trait Texel: bytemuck::Pod {
    const FORMAT: TextureFormat;
}

macro_rules! impl_texel {
    ($($ty:ty => $format:ident),* $(,)?) => {
        $(
            impl Texel for $ty {
                const FORMAT: TextureFormat = TextureFormat::$format;
            }
        )*
    };
}

impl_texel!(
    u8 => R8,
    [u8; 2] => RG8,
    [u8; 3] => RGB8,
    [u8; 4] => RGBA8,
    i8 => R8Snorm,
    [i8; 4] => RGBA8Snorm,
    u16 => R16,
    [u16; 2] => RG16,
    [u16; 4] => RGBA16,
    u32 => R32UI,
    [u32; 2] => RG32UI,
    [u32; 4] => RGBA32UI,
    i32 => R32I,
    [i32; 4] => RGBA32I,
    f32 => R32F,
    [f32; 2] => RG32F,
    [f32; 3] => RGB32F,
    [f32; 4] => RGBA32F,
    glam::Vec2 => RG32F,
    glam::Vec3 => RGB32F,
    glam::Vec4 => RGBA32F,
);

// ===== VERTEX FORMAT =====

/// Vertex attribute formats
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    // Float formats (vertex attributes)
    R32_SFLOAT,          // float (4 bytes)
    R32G32_SFLOAT,       // vec2 (8 bytes)
    R32G32B32_SFLOAT,    // vec3 (12 bytes)
    R32G32B32A32_SFLOAT, // vec4 (16 bytes)

    // Integer formats (signed)
    R32_SINT,
    R32G32_SINT,
    R32G32B32_SINT,
    R32G32B32A32_SINT,

    // Integer formats (unsigned)
    R32_UINT,
    R32G32_UINT,
    R32G32B32_UINT,
    R32G32B32A32_UINT,

    // Short formats (signed)
    R16_SINT,
    R16G16_SINT,
    R16G16B16A16_SINT,

    // Short formats (unsigned)
    R16_UINT,
    R16G16_UINT,
    R16G16B16A16_UINT,

    // Byte formats (signed)
    R8_SINT,
    R8G8_SINT,
    R8G8B8A8_SINT,

    // Byte formats (unsigned)
    R8_UINT,
    R8G8_UINT,
    R8G8B8A8_UINT,
}

impl VertexFormat {
    /// Returns size in bytes for this format
    pub const fn size_bytes(&self) -> u32 {
        self.components() * self.scalar().size_bytes()
    }

    /// Number of components (1 to 4)
    pub const fn components(&self) -> u32 {
        use VertexFormat::*;
        match self {
            R32_SFLOAT | R32_SINT | R32_UINT | R16_SINT | R16_UINT | R8_SINT | R8_UINT => 1,
            R32G32_SFLOAT | R32G32_SINT | R32G32_UINT | R16G16_SINT | R16G16_UINT | R8G8_SINT
            | R8G8_UINT => 2,
            R32G32B32_SFLOAT | R32G32B32_SINT | R32G32B32_UINT => 3,
            R32G32B32A32_SFLOAT | R32G32B32A32_SINT | R32G32B32A32_UINT | R16G16B16A16_SINT
            | R16G16B16A16_UINT | R8G8B8A8_SINT | R8G8B8A8_UINT => 4,
        }
    }

    /// Component type
    pub const fn scalar(&self) -> ScalarType {
        use VertexFormat::*;
        match self {
            R32_SFLOAT | R32G32_SFLOAT | R32G32B32_SFLOAT | R32G32B32A32_SFLOAT => ScalarType::F32,
            R32_SINT | R32G32_SINT | R32G32B32_SINT | R32G32B32A32_SINT => ScalarType::I32,
            R32_UINT | R32G32_UINT | R32G32B32_UINT | R32G32B32A32_UINT => ScalarType::U32,
            R16_SINT | R16G16_SINT | R16G16B16A16_SINT => ScalarType::I16,
            R16_UINT | R16G16_UINT | R16G16B16A16_UINT => ScalarType::U16,
            R8_SINT | R8G8_SINT | R8G8B8A8_SINT => ScalarType::I8,
            R8_UINT | R8G8_UINT | R8G8B8A8_UINT => ScalarType::U8,
        }
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
