/// Vertex array object - attribute layout plus vertex and index buffer bindings

use crate::error::Result;
use crate::format::{ScalarType, VertexFormat};
use crate::graphics_device::{DeviceRef, NativeId};
use crate::handle::{Handle, VertexArrayObject};
use crate::prism_bail;

use super::buffer::Buffer;

/// One vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location
    pub location: u32,
    /// Vertex buffer binding slot the attribute reads from
    pub binding: u32,
    pub format: VertexFormat,
    /// Byte offset within one vertex
    pub offset: u32,
    /// Read integer data as normalized floats
    pub normalized: bool,
}

/// Owned vertex array object
#[derive(Debug)]
pub struct VertexArray {
    handle: Handle<VertexArrayObject>,
    attributes: Vec<VertexAttribute>,
}

impl VertexArray {
    pub fn new(device: &DeviceRef) -> Result<Self> {
        let handle = Handle::create_with(device, |d| d.create_vertex_array())?;
        Ok(Self { handle, attributes: Vec::new() })
    }

    /// Create a vertex array with a full attribute layout
    pub fn with_layout(device: &DeviceRef, attributes: &[VertexAttribute]) -> Result<Self> {
        let mut vertex_array = Self::new(device)?;
        for attribute in attributes {
            vertex_array.set_attribute(*attribute)?;
        }
        Ok(vertex_array)
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
            attributes: std::mem::take(&mut self.attributes),
        }
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Declare (or redeclare) the attribute at `attribute.location`
    pub fn set_attribute(&mut self, attribute: VertexAttribute) -> Result<()> {
        if attribute.normalized && attribute.format.scalar() == ScalarType::F32 {
            prism_bail!(InvalidArgument, "prism::VertexArray",
                "Attribute {} uses float format {:?} and cannot be normalized", attribute.location, attribute.format);
        }
        let (id, device) = self.handle.parts()?;
        device.vertex_attrib_format(
            id,
            attribute.location,
            attribute.format,
            attribute.normalized,
            attribute.offset,
            attribute.binding,
        );
        self.attributes.retain(|a| a.location != attribute.location);
        self.attributes.push(attribute);
        Ok(())
    }

    /// Source binding slot `binding` from `buffer`
    pub fn set_vertex_buffer(&self, binding: u32, buffer: &Buffer, offset: usize, stride: u32) -> Result<()> {
        if offset >= buffer.size() {
            prism_bail!(InvalidArgument, "prism::VertexArray",
                "Offset {} outside vertex buffer of {} bytes", offset, buffer.size());
        }
        if stride == 0 {
            prism_bail!(InvalidArgument, "prism::VertexArray", "Vertex stride must be non-zero");
        }
        let (id, device) = self.handle.parts()?;
        device.vertex_buffer(id, binding, buffer.id()?, offset, stride);
        Ok(())
    }

    /// Use `buffer` for indexed draws
    pub fn set_index_buffer(&self, buffer: &Buffer) -> Result<()> {
        let (id, device) = self.handle.parts()?;
        device.element_buffer(id, buffer.id()?);
        Ok(())
    }

    pub fn bind(&self) -> Result<()> {
        let (id, device) = self.handle.parts()?;
        device.bind_vertex_array(Some(id));
        Ok(())
    }
}

#[cfg(test)]
#[path = "vertex_array_tests.rs"]
mod tests;
