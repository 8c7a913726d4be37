//! Single-owner handles to native objects
//!
//! A [`Handle`] owns exactly one native identifier and the device that
//! created it. It cannot be cloned; ownership moves with the value, and
//! [`Handle::take`] moves the state out of a borrowed handle while leaving an
//! uninitialized one behind. Dropping an initialized handle deletes the
//! native object exactly once.

use std::fmt;
use std::marker::PhantomData;

use crate::error::Result;
use crate::graphics_device::{DeviceRef, GraphicsDevice, NativeId, ObjectType, SyncId};
use crate::{prism_err, prism_trace};

/// Static description of one native object kind
pub trait ResourceKind: 'static {
    /// Native identifier type
    type Id: Copy + Default + PartialEq + fmt::Debug + Send + Sync;

    /// Human-readable kind name used in logs and errors
    const NAME: &'static str;

    /// Object category, as tracked by devices
    const TYPE: ObjectType;

    /// Issue the native delete call
    fn destroy(device: &dyn GraphicsDevice, id: Self::Id);
}

/// Move-only owner of one native object
pub struct Handle<K: ResourceKind> {
    device: Option<DeviceRef>,
    id: K::Id,
    initialized: bool,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> Handle<K> {
    /// Allocate a native object through `allocate` and take ownership of it
    pub fn create_with<F>(device: &DeviceRef, allocate: F) -> Result<Self>
    where
        F: FnOnce(&dyn GraphicsDevice) -> Result<K::Id>,
    {
        let id = allocate(device.as_ref())?;
        prism_trace!("prism::Handle", "Created {} {:?}", K::NAME, id);
        Ok(Self {
            device: Some(device.clone()),
            id,
            initialized: true,
            _kind: PhantomData,
        })
    }

    /// Re-create in place, destroying the currently owned object first
    pub fn create<F>(&mut self, device: &DeviceRef, allocate: F) -> Result<()>
    where
        F: FnOnce(&dyn GraphicsDevice) -> Result<K::Id>,
    {
        self.destroy();
        *self = Self::create_with(device, allocate)?;
        Ok(())
    }

    /// Delete the native object if one is owned
    pub fn destroy(&mut self) {
        if !self.initialized {
            return;
        }
        if let Some(device) = self.device.take() {
            prism_trace!("prism::Handle", "Deleting {} {:?}", K::NAME, self.id);
            K::destroy(device.as_ref(), self.id);
        }
        self.id = K::Id::default();
        self.initialized = false;
    }

    /// Move the owned object out, leaving this handle uninitialized
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn is_init(&self) -> bool {
        self.initialized
    }

    /// Native identifier, `InvalidState` when nothing is owned
    pub fn id(&self) -> Result<K::Id> {
        if !self.initialized {
            return Err(prism_err!(InvalidState, "prism::Handle", "{} handle is not initialized", K::NAME));
        }
        Ok(self.id)
    }

    /// Device that created the object, `InvalidState` when nothing is owned
    pub fn device(&self) -> Result<&DeviceRef> {
        match (&self.device, self.initialized) {
            (Some(device), true) => Ok(device),
            _ => Err(prism_err!(InvalidState, "prism::Handle", "{} handle is not initialized", K::NAME)),
        }
    }

    /// Identifier and device together
    pub(crate) fn parts(&self) -> Result<(K::Id, &DeviceRef)> {
        Ok((self.id()?, self.device()?))
    }
}

impl<K: ResourceKind> Default for Handle<K> {
    fn default() -> Self {
        Self {
            device: None,
            id: K::Id::default(),
            initialized: false,
            _kind: PhantomData,
        }
    }
}

impl<K: ResourceKind> Drop for Handle<K> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<K: ResourceKind> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.initialized == other.initialized
    }
}

impl<K: ResourceKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("kind", &K::NAME)
            .field("id", &self.id)
            .field("initialized", &self.initialized)
            .finish()
    }
}

// ===== RESOURCE KINDS =====

macro_rules! resource_kind {
    ($(#[$meta:meta])* $kind:ident, $name:literal, $ty:ident, $id:ty, $destroy:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $kind;

        impl ResourceKind for $kind {
            type Id = $id;
            const NAME: &'static str = $name;
            const TYPE: ObjectType = ObjectType::$ty;

            fn destroy(device: &dyn GraphicsDevice, id: $id) {
                device.$destroy(id);
            }
        }
    };
}

resource_kind!(
    /// Buffer object
    BufferObject, "buffer", Buffer, NativeId, delete_buffer
);
resource_kind!(
    /// Texture object
    TextureObject, "texture", Texture, NativeId, delete_texture
);
resource_kind!(
    /// Sampler object
    SamplerObject, "sampler", Sampler, NativeId, delete_sampler
);
resource_kind!(
    /// Framebuffer object
    FramebufferObject, "framebuffer", Framebuffer, NativeId, delete_framebuffer
);
resource_kind!(
    /// Vertex array object
    VertexArrayObject, "vertex array", VertexArray, NativeId, delete_vertex_array
);
resource_kind!(
    /// Sync object
    FenceObject, "fence", Fence, SyncId, delete_sync
);
resource_kind!(
    /// Transient shader stage object
    ShaderObject, "shader", Shader, NativeId, delete_shader
);
resource_kind!(
    /// Linked program object
    ProgramObject, "program", Program, NativeId, delete_program
);

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
