/// Texture with immutable storage
///
/// Dimensions, format and mip count are fixed at creation; uploads write
/// whole levels or sub-regions. A Texture can be bound as a sampled texture,
/// as a storage image, or attached to a framebuffer through [`Attachment`].

use crate::error::Result;
use crate::format::{Texel, TextureFormat};
use crate::graphics_device::{Access, DeviceRef, NativeId, TextureRegion, TextureTarget};
use crate::handle::{Handle, TextureObject};
use crate::{prism_bail, prism_debug};

// ===== TEXTURE DESC =====

/// Descriptor for creating a Texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub target: TextureTarget,
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    /// Depth for 3D textures, layer count for arrays, 6 for cube maps, 1 otherwise
    pub depth: u32,
    pub mip_levels: u32,
}

impl TextureDesc {
    /// Single-level 2D texture
    pub fn tex2d(width: u32, height: u32, format: TextureFormat) -> Self {
        Self { target: TextureTarget::Tex2D, format, width, height, depth: 1, mip_levels: 1 }
    }

    /// Single-level 2D array texture
    pub fn array(width: u32, height: u32, layers: u32, format: TextureFormat) -> Self {
        Self { target: TextureTarget::Tex2DArray, format, width, height, depth: layers, mip_levels: 1 }
    }

    /// Single-level 3D texture
    pub fn tex3d(width: u32, height: u32, depth: u32, format: TextureFormat) -> Self {
        Self { target: TextureTarget::Tex3D, format, width, height, depth, mip_levels: 1 }
    }

    /// Single-level cube map
    pub fn cube(size: u32, format: TextureFormat) -> Self {
        Self { target: TextureTarget::Cube, format, width: size, height: size, depth: 6, mip_levels: 1 }
    }

    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    /// Use every level down to 1x1
    pub fn with_full_mip_chain(mut self) -> Self {
        self.mip_levels = self.max_mip_levels();
        self
    }

    /// Number of levels in a complete chain for these dimensions
    pub fn max_mip_levels(&self) -> u32 {
        let largest = match self.target {
            TextureTarget::Tex3D => self.width.max(self.height).max(self.depth),
            _ => self.width.max(self.height),
        };
        u32::BITS - largest.max(1).leading_zeros()
    }

    /// Size of one level; array layers and cube faces do not shrink
    pub fn level_size(&self, level: u32) -> (u32, u32, u32) {
        let shrink = |v: u32| v.checked_shr(level).unwrap_or(0).max(1);
        let depth = match self.target {
            TextureTarget::Tex3D => shrink(self.depth),
            _ => self.depth,
        };
        (shrink(self.width), shrink(self.height), depth)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            prism_bail!(InvalidArgument, "prism::Texture",
                "Texture dimensions must be non-zero, got {}x{}x{}", self.width, self.height, self.depth);
        }
        match self.target {
            TextureTarget::Tex2D if self.depth != 1 => {
                prism_bail!(InvalidArgument, "prism::Texture", "2D texture depth must be 1, got {}", self.depth);
            }
            TextureTarget::Cube if self.width != self.height || self.depth != 6 => {
                prism_bail!(InvalidArgument, "prism::Texture",
                    "Cube map must be square with 6 faces, got {}x{}x{}", self.width, self.height, self.depth);
            }
            _ => {}
        }
        if self.mip_levels == 0 || self.mip_levels > self.max_mip_levels() {
            prism_bail!(InvalidArgument, "prism::Texture",
                "Mip level count {} outside 1..={}", self.mip_levels, self.max_mip_levels());
        }
        Ok(())
    }
}

// ===== ATTACHMENT =====

/// Something that can be attached to a framebuffer
pub trait Attachment {
    fn attachment_id(&self) -> Result<NativeId>;
    fn attachment_format(&self) -> TextureFormat;
    fn attachment_levels(&self) -> u32;
    /// Layers (or faces) selectable with a layered attachment
    fn attachment_layers(&self) -> u32;
}

// ===== TEXTURE =====

/// Owned GPU texture
#[derive(Debug)]
pub struct Texture {
    handle: Handle<TextureObject>,
    desc: TextureDesc,
}

impl Texture {
    /// Create a texture and allocate its storage
    pub fn new(device: &DeviceRef, desc: TextureDesc) -> Result<Self> {
        desc.validate()?;

        let handle = Handle::create_with(device, |d| d.create_texture(desc.target))?;
        let id = handle.id()?;
        device.texture_storage(id, desc.target, desc.mip_levels, desc.format, desc.width, desc.height, desc.depth);

        prism_debug!("prism::Texture", "Created {:?} texture {} {}x{}x{} {:?} ({} levels)",
            desc.target, id, desc.width, desc.height, desc.depth, desc.format, desc.mip_levels);

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
        Self { handle: self.handle.take(), desc: self.desc }
    }

    pub fn info(&self) -> &TextureDesc {
        &self.desc
    }

    pub fn format(&self) -> TextureFormat {
        self.desc.format
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    // ===== UPLOAD =====

    /// Write raw bytes into a region of one level
    ///
    /// `data` must hold exactly the region's texels in the format's
    /// client layout.
    pub fn upload(&self, region: TextureRegion, data: &[u8]) -> Result<()> {
        self.check_level(region.level)?;
        let (w, h, d) = self.desc.level_size(region.level);
        let fits = |offset: u32, extent: u32, size: u32| {
            extent > 0 && offset.checked_add(extent).is_some_and(|end| end <= size)
        };
        if !fits(region.x, region.width, w) || !fits(region.y, region.height, h) || !fits(region.z, region.depth, d) {
            prism_bail!(InvalidArgument, "prism::Texture",
                "Region {:?} outside level {} of size {}x{}x{}", region, region.level, w, h, d);
        }

        let expected = region.width as usize
            * region.height as usize
            * region.depth as usize
            * self.desc.format.bytes_per_pixel() as usize;
        if data.len() != expected {
            prism_bail!(InvalidArgument, "prism::Texture",
                "Upload is {} bytes, region needs {}", data.len(), expected);
        }

        let (id, device) = self.handle.parts()?;
        device.texture_sub_image(id, self.desc.target, &region, self.desc.format.pixel_transfer(), data);
        Ok(())
    }

    /// Write a whole level
    pub fn upload_level(&self, level: u32, data: &[u8]) -> Result<()> {
        self.check_level(level)?;
        let (width, height, depth) = self.desc.level_size(level);
        self.upload(TextureRegion { level, x: 0, y: 0, z: 0, width, height, depth }, data)
    }

    /// Write a whole level from typed texels
    ///
    /// The texel type must share the texture format's client layout.
    pub fn upload_texels<T: Texel>(&self, level: u32, texels: &[T]) -> Result<()> {
        if T::FORMAT.pixel_transfer() != self.desc.format.pixel_transfer() {
            prism_bail!(InvalidArgument, "prism::Texture",
                "Texel type for {:?} does not match texture format {:?}", T::FORMAT, self.desc.format);
        }
        self.upload_level(level, bytemuck::cast_slice(texels))
    }

    /// Fill levels 1.. from level 0
    pub fn generate_mipmaps(&self) -> Result<()> {
        if self.desc.format.is_integer() || self.desc.format.is_depth() {
            prism_bail!(InvalidState, "prism::Texture",
                "Cannot generate mipmaps for {:?}", self.desc.format);
        }
        let (id, device) = self.handle.parts()?;
        device.generate_mipmap(id, self.desc.target);
        Ok(())
    }

    // ===== BINDING =====

    /// Bind to a texture unit for sampling
    pub fn bind(&self, unit: u32) -> Result<()> {
        let (id, device) = self.handle.parts()?;
        device.bind_texture_unit(unit, self.desc.target, Some(id));
        Ok(())
    }

    /// Bind one level (all layers) to an image unit
    pub fn bind_image(&self, unit: u32, level: u32, access: Access) -> Result<()> {
        let layered = self.desc.target != TextureTarget::Tex2D;
        self.bind_image_inner(unit, level, layered, 0, access)
    }

    /// Bind a single layer of one level to an image unit
    pub fn bind_image_layer(&self, unit: u32, level: u32, layer: u32, access: Access) -> Result<()> {
        self.check_level(level)?;
        let (_, _, layers) = self.desc.level_size(level);
        if layer >= layers {
            prism_bail!(InvalidArgument, "prism::Texture", "Layer {} out of range, level has {}", layer, layers);
        }
        self.bind_image_inner(unit, level, false, layer, access)
    }

    fn bind_image_inner(&self, unit: u32, level: u32, layered: bool, layer: u32, access: Access) -> Result<()> {
        self.check_level(level)?;
        let (id, device) = self.handle.parts()?;
        device.bind_image_texture(unit, id, level, layered, layer, access, self.desc.format);
        Ok(())
    }
}

impl Texture {
    fn check_level(&self, level: u32) -> Result<()> {
        if level >= self.desc.mip_levels {
            prism_bail!(InvalidArgument, "prism::Texture",
                "Level {} out of range, texture has {}", level, self.desc.mip_levels);
        }
        Ok(())
    }
}

impl Attachment for Texture {
    fn attachment_id(&self) -> Result<NativeId> {
        self.handle.id()
    }

    fn attachment_format(&self) -> TextureFormat {
        self.desc.format
    }

    fn attachment_levels(&self) -> u32 {
        self.desc.mip_levels
    }

    fn attachment_layers(&self) -> u32 {
        self.desc.depth
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
