/// Sampler object - filtering and addressing state separate from textures

use crate::error::Result;
use crate::graphics_device::{DeviceRef, NativeId};
use crate::handle::{Handle, SamplerObject};
use crate::prism_bail;

/// Texel filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
}

/// Filter between mip levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MipmapFilter {
    /// Sample level 0 only
    None,
    Nearest,
    Linear,
}

/// Texture coordinate addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

/// Depth comparison for shadow samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Sampler state
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerDesc {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub mipmap_filter: MipmapFilter,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub wrap_r: WrapMode,
    /// 1.0 disables anisotropic filtering
    pub max_anisotropy: f32,
    /// Depth comparison, `None` for regular sampling
    pub compare: Option<CompareFunc>,
    pub min_lod: f32,
    pub max_lod: f32,
    pub lod_bias: f32,
    pub border_color: [f32; 4],
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            mipmap_filter: MipmapFilter::Linear,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            wrap_r: WrapMode::Repeat,
            max_anisotropy: 1.0,
            compare: None,
            min_lod: -1000.0,
            max_lod: 1000.0,
            lod_bias: 0.0,
            border_color: [0.0; 4],
        }
    }
}

impl SamplerDesc {
    /// Trilinear filtering, repeat addressing
    pub fn linear() -> Self {
        Self::default()
    }

    /// Point sampling without mipmaps, clamped
    pub fn nearest() -> Self {
        Self {
            min_filter: Filter::Nearest,
            mag_filter: Filter::Nearest,
            mipmap_filter: MipmapFilter::None,
            ..Self::default().with_wrap(WrapMode::ClampToEdge)
        }
    }

    /// Hardware depth comparison with linear filtering
    pub fn shadow() -> Self {
        Self {
            mipmap_filter: MipmapFilter::None,
            compare: Some(CompareFunc::LessEqual),
            border_color: [1.0; 4],
            ..Self::default().with_wrap(WrapMode::ClampToBorder)
        }
    }

    /// Same addressing on every axis
    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap_s = wrap;
        self.wrap_t = wrap;
        self.wrap_r = wrap;
        self
    }

    pub fn with_anisotropy(mut self, max_anisotropy: f32) -> Self {
        self.max_anisotropy = max_anisotropy;
        self
    }
}

/// Owned sampler object
#[derive(Debug)]
pub struct Sampler {
    handle: Handle<SamplerObject>,
    desc: SamplerDesc,
}

impl Sampler {
    pub fn new(device: &DeviceRef, desc: SamplerDesc) -> Result<Self> {
        if desc.max_anisotropy.is_nan() || desc.max_anisotropy < 1.0 {
            prism_bail!(InvalidArgument, "prism::Sampler", "Max anisotropy must be >= 1.0, got {}", desc.max_anisotropy);
        }
        if desc.min_lod > desc.max_lod {
            prism_bail!(InvalidArgument, "prism::Sampler", "min_lod {} exceeds max_lod {}", desc.min_lod, desc.max_lod);
        }

        let handle = Handle::create_with(device, |d| d.create_sampler())?;
        device.sampler_parameters(handle.id()?, &desc);
        Ok(Self { handle, desc })
    }

    pub fn id(&self) -> Result<NativeId> {
        self.handle.id()
    }

    /// Whether this wrapper still owns a native object
    pub fn is_init(&self) -> bool {
        self.handle.is_init()
    }

    /// Move the native object out, leaving this wrapper empty
    pub fn take(&mut self) -> Self {
        Self { handle: self.handle.take(), desc: self.desc.clone() }
    }

    pub fn desc(&self) -> &SamplerDesc {
        &self.desc
    }

    /// Bind to a texture unit, overriding the texture's own sampling state
    pub fn bind(&self, unit: u32) -> Result<()> {
        let (id, device) = self.handle.parts()?;
        device.bind_sampler(unit, Some(id));
        Ok(())
    }
}

#[cfg(test)]
#[path = "sampler_tests.rs"]
mod tests;
