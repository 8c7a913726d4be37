/// Framebuffer object - a set of texture attachments rendered into together

use crate::error::Result;
use crate::graphics_device::{AttachmentPoint, DeviceRef, FramebufferStatus, NativeId};
use crate::handle::{FramebufferObject, Handle};
use crate::prism_bail;

use super::texture::Attachment;

/// Owned framebuffer object
#[derive(Debug)]
pub struct Framebuffer {
    handle: Handle<FramebufferObject>,
    color_attachments: Vec<u32>,
}

impl Framebuffer {
    pub fn new(device: &DeviceRef) -> Result<Self> {
        let handle = Handle::create_with(device, |d| d.create_framebuffer())?;
        Ok(Self { handle, color_attachments: Vec::new() })
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
        Self {
            handle: self.handle.take(),
            color_attachments: std::mem::take(&mut self.color_attachments),
        }
    }

    /// Color attachment indices currently attached, in attachment order
    pub fn color_attachments(&self) -> &[u32] {
        &self.color_attachments
    }

    fn attach(
        &mut self,
        point: AttachmentPoint,
        attachment: &dyn Attachment,
        level: u32,
        layer: Option<u32>,
    ) -> Result<()> {
        if level >= attachment.attachment_levels() {
            prism_bail!(InvalidArgument, "prism::Framebuffer",
                "Level {} out of range, attachment has {}", level, attachment.attachment_levels());
        }
        if let Some(layer) = layer {
            if layer >= attachment.attachment_layers() {
                prism_bail!(InvalidArgument, "prism::Framebuffer",
                    "Layer {} out of range, attachment has {}", layer, attachment.attachment_layers());
            }
        }
        let texture = attachment.attachment_id()?;
        let (id, device) = self.handle.parts()?;
        device.framebuffer_texture(id, point, texture, level, layer);
        Ok(())
    }

    /// Attach a color target at `index`
    pub fn attach_color(&mut self, index: u32, attachment: &dyn Attachment, level: u32) -> Result<()> {
        self.attach_color_inner(index, attachment, level, None)
    }

    /// Attach one layer (or cube face) of a layered color target
    pub fn attach_color_layer(&mut self, index: u32, attachment: &dyn Attachment, level: u32, layer: u32) -> Result<()> {
        self.attach_color_inner(index, attachment, level, Some(layer))
    }

    fn attach_color_inner(&mut self, index: u32, attachment: &dyn Attachment, level: u32, layer: Option<u32>) -> Result<()> {
        if attachment.attachment_format().is_depth() {
            prism_bail!(InvalidArgument, "prism::Framebuffer",
                "{:?} cannot be a color attachment", attachment.attachment_format());
        }
        self.attach(AttachmentPoint::Color(index), attachment, level, layer)?;
        if !self.color_attachments.contains(&index) {
            self.color_attachments.push(index);
        }
        Ok(())
    }

    /// Attach a depth target
    pub fn attach_depth(&mut self, attachment: &dyn Attachment, level: u32) -> Result<()> {
        if !attachment.attachment_format().is_depth() {
            prism_bail!(InvalidArgument, "prism::Framebuffer",
                "{:?} is not a depth format", attachment.attachment_format());
        }
        self.attach(AttachmentPoint::Depth, attachment, level, None)
    }

    /// Attach a combined depth/stencil target
    pub fn attach_depth_stencil(&mut self, attachment: &dyn Attachment, level: u32) -> Result<()> {
        if !attachment.attachment_format().has_stencil() {
            prism_bail!(InvalidArgument, "prism::Framebuffer",
                "{:?} has no stencil component", attachment.attachment_format());
        }
        self.attach(AttachmentPoint::DepthStencil, attachment, level, None)
    }

    pub fn status(&self) -> Result<FramebufferStatus> {
        let (id, device) = self.handle.parts()?;
        Ok(device.check_framebuffer_status(id))
    }

    /// `InvalidState` unless the framebuffer is complete
    pub fn check_complete(&self) -> Result<()> {
        match self.status()? {
            FramebufferStatus::Complete => Ok(()),
            status => prism_bail!(InvalidState, "prism::Framebuffer", "Framebuffer is incomplete: {:?}", status),
        }
    }

    /// Route fragment outputs to the given color attachments
    pub fn set_draw_buffers(&self, color_attachments: &[u32]) -> Result<()> {
        if let Some(missing) = color_attachments.iter().find(|i| !self.color_attachments.contains(i)) {
            prism_bail!(InvalidArgument, "prism::Framebuffer", "Color attachment {} is not attached", missing);
        }
        let (id, device) = self.handle.parts()?;
        device.draw_buffers(id, color_attachments);
        Ok(())
    }

    /// Route fragment outputs to every attached color target
    pub fn draw_to_all(&self) -> Result<()> {
        let mut indices = self.color_attachments.clone();
        indices.sort_unstable();
        self.set_draw_buffers(&indices)
    }

    pub fn bind(&self) -> Result<()> {
        let (id, device) = self.handle.parts()?;
        device.bind_framebuffer(Some(id));
        Ok(())
    }

    /// Bind the window-system framebuffer
    pub fn bind_default(device: &DeviceRef) {
        device.bind_framebuffer(None);
    }
}

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
