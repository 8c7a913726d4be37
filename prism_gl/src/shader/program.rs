/// Linked shader program with its binding table
///
/// Resources are bound by the names the shaders declare. The binding table
/// is filled once from the stage reflection artifacts; classic uniform
/// locations are looked up on first use and remembered.

use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::graphics_device::{DeviceRef, IndexedBufferTarget, NativeId, ProgramBinary, UniformValue};
use crate::handle::{Handle, ProgramObject};
use crate::resource::{Buffer, Sampler, Texture};
use crate::{prism_bail, prism_debug, prism_err};

use super::reflection::{BindingCategory, BindingEntry, BindingTable};

// ===== BIND RESOURCE =====

/// Resource handed to [`Program::bind`]
#[derive(Debug, Clone, Copy)]
pub enum BindResource<'a> {
    Texture(&'a Texture),
    Sampler(&'a Sampler),
    /// One mip level of a storage image
    Image { texture: &'a Texture, level: u32 },
    Buffer(&'a Buffer),
    BufferRange { buffer: &'a Buffer, offset: usize, size: usize },
}

impl BindResource<'_> {
    fn describe(&self) -> &'static str {
        match self {
            BindResource::Texture(_) => "texture",
            BindResource::Sampler(_) => "sampler",
            BindResource::Image { .. } => "image",
            BindResource::Buffer(_) | BindResource::BufferRange { .. } => "buffer",
        }
    }
}

impl<'a> From<&'a Texture> for BindResource<'a> {
    fn from(texture: &'a Texture) -> Self {
        BindResource::Texture(texture)
    }
}

impl<'a> From<&'a Sampler> for BindResource<'a> {
    fn from(sampler: &'a Sampler) -> Self {
        BindResource::Sampler(sampler)
    }
}

impl<'a> From<&'a Buffer> for BindResource<'a> {
    fn from(buffer: &'a Buffer) -> Self {
        BindResource::Buffer(buffer)
    }
}

// ===== PROGRAM =====

/// Owned linked program
#[derive(Debug)]
pub struct Program {
    handle: Handle<ProgramObject>,
    bindings: BindingTable,
    uniform_locations: Mutex<FxHashMap<String, i32>>,
}

impl Program {
    pub(crate) fn from_parts(handle: Handle<ProgramObject>, bindings: BindingTable) -> Self {
        Self {
            handle,
            bindings,
            uniform_locations: Mutex::new(FxHashMap::default()),
        }
    }

    /// Replace the binding table (used when restoring a persisted program)
    pub(crate) fn with_bindings(mut self, bindings: BindingTable) -> Self {
        self.bindings = bindings;
        self
    }

    /// Recreate a program from a driver binary
    ///
    /// Fails with `LinkError` when the driver rejects the binary (for
    /// example after a driver update); the native program is released.
    pub fn from_native_binary(device: &DeviceRef, binary: &ProgramBinary, bindings: BindingTable) -> Result<Self> {
        let handle = Handle::<ProgramObject>::create_with(device, |d| d.create_program())?;
        let id = handle.id()?;
        device.program_binary(id, binary);
        if !device.get_program_link_status(id) {
            let log = device.get_program_info_log(id);
            prism_bail!(LinkError, "prism::Program",
                "Driver rejected program binary (format {:#x}): {}", binary.format, log.trim());
        }
        prism_debug!("prism::Program", "Program {} restored from a {} byte binary", id, binary.bytes.len());
        Ok(Self::from_parts(handle, bindings))
    }

    pub fn id(&self) -> Result<NativeId> {
        self.handle.id()
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Binding entry for `name`, `NameNotFound` when the shaders do not declare it
    pub fn binding(&self, name: &str) -> Result<BindingEntry> {
        self.bindings.get(name).copied().ok_or_else(|| {
            prism_err!(NameNotFound, "prism::Program", "No resource named '{}' in program", name)
        })
    }

    /// Make this the current program
    pub fn use_program(&self) -> Result<()> {
        let (id, device) = self.handle.parts()?;
        device.use_program(Some(id));
        Ok(())
    }

    /// Driver binary of the linked program, if the driver exposes one
    pub fn native_binary(&self) -> Result<Option<ProgramBinary>> {
        let (id, device) = self.handle.parts()?;
        Ok(device.get_program_binary(id))
    }

    // ===== BINDING =====

    /// Bind `resource` to the slot the shaders declared for `name`
    ///
    /// With [`BindingCategory::Auto`] the recorded category selects the
    /// native bind call. An explicit category overrides it and keeps the
    /// recorded slot.
    pub fn bind<'r>(&self, name: &str, category: BindingCategory, resource: impl Into<BindResource<'r>>) -> Result<()> {
        let entry = self.binding(name)?;
        let resource = resource.into();
        let category = match category {
            BindingCategory::Auto => entry.category,
            explicit => explicit,
        };

        match (category, resource) {
            (BindingCategory::Sampler, BindResource::Texture(texture)) => texture.bind(entry.slot),
            (BindingCategory::Sampler, BindResource::Sampler(sampler)) => sampler.bind(entry.slot),
            (BindingCategory::Image, BindResource::Texture(texture)) => {
                texture.bind_image(entry.slot, 0, entry.access)
            }
            (BindingCategory::Image, BindResource::Image { texture, level }) => {
                texture.bind_image(entry.slot, level, entry.access)
            }
            (BindingCategory::ShaderStorageBlock | BindingCategory::UniformBlock, BindResource::Buffer(buffer)) => {
                buffer.bind_base(block_target(category), entry.slot)
            }
            (
                BindingCategory::ShaderStorageBlock | BindingCategory::UniformBlock,
                BindResource::BufferRange { buffer, offset, size },
            ) => buffer.bind_range(block_target(category), entry.slot, offset, size),
            (BindingCategory::ClassicUniform, _) => {
                prism_bail!(InvalidArgument, "prism::Program",
                    "'{}' is a classic uniform, use set_uniform", name)
            }
            (category, resource) => {
                prism_bail!(InvalidArgument, "prism::Program",
                    "Cannot bind a {} to '{}' ({:?})", resource.describe(), name, category)
            }
        }
    }

    // ===== CLASSIC UNIFORMS =====

    /// Location of a classic uniform, resolved once and remembered
    pub fn uniform_location(&self, name: &str) -> Result<i32> {
        let mut locations = self.uniform_locations.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(location) = locations.get(name) {
            return Ok(*location);
        }

        let (id, device) = self.handle.parts()?;
        let location = device.get_uniform_location(id, name).ok_or_else(|| {
            prism_err!(NameNotFound, "prism::Program", "No active uniform named '{}' in program {}", name, id)
        })?;
        locations.insert(name.to_string(), location);
        Ok(location)
    }

    /// Upload a classic uniform value
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        let location = self.uniform_location(name)?;
        let (id, device) = self.handle.parts()?;
        device.program_uniform(id, location, &value.into());
        Ok(())
    }
}

fn block_target(category: BindingCategory) -> IndexedBufferTarget {
    match category {
        BindingCategory::UniformBlock => IndexedBufferTarget::Uniform,
        _ => IndexedBufferTarget::ShaderStorage,
    }
}

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
