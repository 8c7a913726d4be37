/// GPU buffer with immutable storage
///
/// Storage size and flags are fixed at creation. Contents change through
/// `update` (needs `DYNAMIC_STORAGE`) or through a mapping. At most one range
/// of a buffer is mapped at a time; asking for a second mapping fails and
/// leaves the first one valid.

use std::ptr::NonNull;

use crate::error::Result;
use crate::graphics_device::{BufferFlags, DeviceRef, IndexedBufferTarget, MapAccess, NativeId};
use crate::handle::{BufferObject, Handle};
use crate::{prism_bail, prism_debug};

// ===== BUFFER DESC =====

/// Descriptor for creating a Buffer
#[derive(Debug, Clone, Copy)]
pub struct BufferDesc<'a> {
    /// Storage size in bytes
    pub size: usize,
    /// Initial contents, at most `size` bytes
    pub data: Option<&'a [u8]>,
    pub flags: BufferFlags,
}

// ===== MAPPING =====

#[derive(Debug, Clone, Copy)]
struct Mapping {
    ptr: NonNull<u8>,
    offset: usize,
    length: usize,
    access: MapAccess,
}

// ===== BUFFER =====

/// Owned GPU buffer
#[derive(Debug)]
pub struct Buffer {
    handle: Handle<BufferObject>,
    size: usize,
    flags: BufferFlags,
    mapping: Option<Mapping>,
}

// SAFETY: the mapped pointer is only written through `&mut self` and only
// read through `&self`, so sharing or sending the Buffer cannot race on it
// from the host side.
unsafe impl Send for Buffer {}
unsafe impl Sync for Buffer {}

impl Buffer {
    /// Create a buffer and allocate its storage
    pub fn new(device: &DeviceRef, desc: BufferDesc<'_>) -> Result<Self> {
        // ========== VALIDATION ==========
        if desc.size == 0 {
            prism_bail!(InvalidArgument, "prism::Buffer", "Buffer size must be greater than zero");
        }
        if let Some(data) = desc.data {
            if data.len() > desc.size {
                prism_bail!(InvalidArgument, "prism::Buffer",
                    "Initial data is {} bytes but the buffer holds {}", data.len(), desc.size);
            }
        }
        if desc.flags.contains(BufferFlags::MAP_PERSISTENT)
            && !desc.flags.intersects(BufferFlags::MAP_READ | BufferFlags::MAP_WRITE)
        {
            prism_bail!(InvalidArgument, "prism::Buffer", "MAP_PERSISTENT requires MAP_READ or MAP_WRITE");
        }
        if desc.flags.contains(BufferFlags::MAP_COHERENT) && !desc.flags.contains(BufferFlags::MAP_PERSISTENT) {
            prism_bail!(InvalidArgument, "prism::Buffer", "MAP_COHERENT requires MAP_PERSISTENT");
        }

        // ========== ALLOCATE ==========
        let handle = Handle::create_with(device, |d| d.create_buffer())?;
        let id = handle.id()?;
        device.buffer_storage(id, desc.size, desc.data, desc.flags);

        prism_debug!("prism::Buffer", "Created buffer {} ({} bytes, {:?})", id, desc.size, desc.flags);

        Ok(Self {
            handle,
            size: desc.size,
            flags: desc.flags,
            mapping: None,
        })
    }

    /// Create a buffer initialized from a slice of plain values
    pub fn from_slice<T: bytemuck::Pod>(device: &DeviceRef, data: &[T], flags: BufferFlags) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        Self::new(device, BufferDesc { size: bytes.len(), data: Some(bytes), flags })
    }

    /// Create an uninitialized (zeroed) buffer
    pub fn with_size(device: &DeviceRef, size: usize, flags: BufferFlags) -> Result<Self> {
        Self::new(device, BufferDesc { size, data: None, flags })
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
            size: self.size,
            flags: self.flags,
            mapping: self.mapping.take(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn flags(&self) -> BufferFlags {
        self.flags
    }

    fn check_range(&self, offset: usize, length: usize) -> Result<()> {
        match offset.checked_add(length) {
            Some(end) if end <= self.size => Ok(()),
            _ => prism_bail!(InvalidArgument, "prism::Buffer",
                "Range {}+{} exceeds buffer size {}", offset, length, self.size),
        }
    }

    // ===== CONTENTS =====

    /// Overwrite part of the storage
    pub fn update(&self, offset: usize, data: &[u8]) -> Result<()> {
        if !self.flags.contains(BufferFlags::DYNAMIC_STORAGE) {
            prism_bail!(InvalidState, "prism::Buffer", "Buffer was created without DYNAMIC_STORAGE");
        }
        if let Some(mapping) = &self.mapping {
            if !mapping.access.contains(MapAccess::PERSISTENT) {
                prism_bail!(InvalidState, "prism::Buffer", "Buffer is mapped; unmap it before updating");
            }
        }
        self.check_range(offset, data.len())?;
        let (id, device) = self.handle.parts()?;
        device.buffer_sub_data(id, offset, data);
        Ok(())
    }

    /// Overwrite part of the storage with plain values
    pub fn update_slice<T: bytemuck::Pod>(&self, offset: usize, data: &[T]) -> Result<()> {
        self.update(offset, bytemuck::cast_slice(data))
    }

    /// Copy part of the storage back to the host
    pub fn read(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        self.check_range(offset, length)?;
        let (id, device) = self.handle.parts()?;
        let mut out = vec![0u8; length];
        device.get_buffer_sub_data(id, offset, &mut out);
        Ok(out)
    }

    // ===== MAPPING =====

    /// Map a range of the storage
    ///
    /// Fails with `InvalidState` if a range is already mapped; that mapping
    /// stays valid.
    pub fn map(&mut self, offset: usize, length: usize, access: MapAccess) -> Result<*mut u8> {
        if let Some(mapping) = &self.mapping {
            prism_bail!(InvalidState, "prism::Buffer",
                "Buffer already has range {}+{} mapped", mapping.offset, mapping.length);
        }
        if length == 0 {
            prism_bail!(InvalidArgument, "prism::Buffer", "Cannot map an empty range");
        }
        self.check_range(offset, length)?;

        if !access.intersects(MapAccess::READ | MapAccess::WRITE) {
            prism_bail!(InvalidArgument, "prism::Buffer", "Map access must include READ or WRITE");
        }
        let required = [
            (MapAccess::READ, BufferFlags::MAP_READ),
            (MapAccess::WRITE, BufferFlags::MAP_WRITE),
            (MapAccess::PERSISTENT, BufferFlags::MAP_PERSISTENT),
            (MapAccess::COHERENT, BufferFlags::MAP_COHERENT),
        ];
        for (requested, flag) in required {
            if access.contains(requested) && !self.flags.contains(flag) {
                prism_bail!(InvalidArgument, "prism::Buffer",
                    "Map access {:?} needs buffer flag {:?}", requested, flag);
            }
        }

        let (id, device) = self.handle.parts()?;
        let raw = device.map_buffer_range(id, offset, length, access)?;
        let Some(ptr) = NonNull::new(raw) else {
            prism_bail!(BackendError, "prism::Buffer", "Driver returned a null mapping for buffer {}", id);
        };

        self.mapping = Some(Mapping { ptr, offset, length, access });
        Ok(raw)
    }

    /// Map the whole storage
    pub fn map_all(&mut self, access: MapAccess) -> Result<*mut u8> {
        self.map(0, self.size, access)
    }

    pub fn is_mapped(&self) -> bool {
        self.mapping.is_some()
    }

    /// Start of the mapped range
    pub fn mapped_ptr(&self) -> Option<*mut u8> {
        self.mapping.map(|m| m.ptr.as_ptr())
    }

    /// `(offset, length)` of the mapped range
    pub fn mapped_range(&self) -> Option<(usize, usize)> {
        self.mapping.map(|m| (m.offset, m.length))
    }

    fn mapped_for(&self, access: MapAccess, offset: usize, length: usize) -> Result<Mapping> {
        let Some(mapping) = self.mapping else {
            prism_bail!(InvalidState, "prism::Buffer", "Buffer is not mapped");
        };
        if !mapping.access.contains(access) {
            prism_bail!(InvalidState, "prism::Buffer", "Mapping was not created with {:?} access", access);
        }
        match offset.checked_add(length) {
            Some(end) if end <= mapping.length => Ok(mapping),
            _ => prism_bail!(InvalidArgument, "prism::Buffer",
                "Range {}+{} exceeds the mapped length {}", offset, length, mapping.length),
        }
    }

    /// Copy bytes into the mapping; `offset` is relative to the mapped range
    pub fn write_mapped(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let mapping = self.mapped_for(MapAccess::WRITE, offset, data.len())?;
        // SAFETY: the range was checked against the live mapping above
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapping.ptr.as_ptr().add(offset), data.len());
        }
        Ok(())
    }

    /// Copy plain values into the mapping
    pub fn write_mapped_slice<T: bytemuck::Pod>(&mut self, offset: usize, data: &[T]) -> Result<()> {
        self.write_mapped(offset, bytemuck::cast_slice(data))
    }

    /// Copy bytes out of the mapping; `offset` is relative to the mapped range
    pub fn read_mapped(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        let mapping = self.mapped_for(MapAccess::READ, offset, length)?;
        let mut out = vec![0u8; length];
        // SAFETY: the range was checked against the live mapping above
        unsafe {
            std::ptr::copy_nonoverlapping(mapping.ptr.as_ptr().add(offset), out.as_mut_ptr(), length);
        }
        Ok(out)
    }

    /// Flush writes in an explicitly flushed mapping
    pub fn flush(&self, offset: usize, length: usize) -> Result<()> {
        let Some(mapping) = self.mapping else {
            prism_bail!(InvalidState, "prism::Buffer", "Buffer is not mapped");
        };
        if !mapping.access.contains(MapAccess::FLUSH_EXPLICIT) {
            prism_bail!(InvalidState, "prism::Buffer", "Mapping was not created with FLUSH_EXPLICIT");
        }
        self.mapped_for(MapAccess::WRITE, offset, length)?;
        let (id, device) = self.handle.parts()?;
        device.flush_mapped_buffer_range(id, offset, length);
        Ok(())
    }

    /// Release the mapping; the pointer returned by `map` becomes invalid
    pub fn unmap(&mut self) -> Result<()> {
        if self.mapping.is_none() {
            prism_bail!(InvalidState, "prism::Buffer", "Buffer is not mapped");
        }
        let (id, device) = self.handle.parts()?;
        device.unmap_buffer(id);
        self.mapping = None;
        Ok(())
    }

    // ===== BINDING =====

    /// Bind the whole buffer to an indexed binding point
    pub fn bind_base(&self, target: IndexedBufferTarget, index: u32) -> Result<()> {
        let (id, device) = self.handle.parts()?;
        device.bind_buffer_base(target, index, id);
        Ok(())
    }

    /// Bind a sub-range to an indexed binding point
    pub fn bind_range(&self, target: IndexedBufferTarget, index: u32, offset: usize, size: usize) -> Result<()> {
        if size == 0 {
            prism_bail!(InvalidArgument, "prism::Buffer", "Cannot bind an empty range");
        }
        self.check_range(offset, size)?;
        let (id, device) = self.handle.parts()?;
        device.bind_buffer_range(target, index, id, offset, size);
        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.mapping.take().is_some() {
            if let Ok((id, device)) = self.handle.parts() {
                device.unmap_buffer(id);
            }
        }
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
