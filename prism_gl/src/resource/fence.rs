/// Fence - a point in the command stream the host or the GPU can wait on

use std::time::Duration;

use crate::error::Result;
use crate::graphics_device::{DeviceRef, FenceStatus, SyncId};
use crate::handle::{FenceObject, Handle};
use crate::prism_warn;

/// Owned sync object
#[derive(Debug)]
pub struct Fence {
    handle: Handle<FenceObject>,
}

impl Fence {
    /// Insert a fence after every command issued so far
    pub fn new(device: &DeviceRef) -> Result<Self> {
        let handle = Handle::create_with(device, |d| d.fence_sync())?;
        Ok(Self { handle })
    }

    pub fn id(&self) -> Result<SyncId> {
        self.handle.id()
    }

    /// Whether this wrapper still owns a native object
    pub fn is_init(&self) -> bool {
        self.handle.is_init()
    }

    /// Move the native object out, leaving this wrapper empty
    pub fn take(&mut self) -> Self {
        Self { handle: self.handle.take() }
    }

    /// Replace the fence with a new one at the current end of the stream
    pub fn signal(&mut self) -> Result<()> {
        let device = self.handle.device()?.clone();
        self.handle.create(&device, |d| d.fence_sync())
    }

    /// Block until the fence signals or `timeout` elapses
    ///
    /// Pending commands are flushed first so the wait can make progress.
    pub fn wait(&self, timeout: Duration) -> Result<FenceStatus> {
        let (id, device) = self.handle.parts()?;
        let timeout_ns = u64::try_from(timeout.as_nanos()).unwrap_or(u64::MAX);
        let status = device.client_wait_sync(id, true, timeout_ns);
        if status == FenceStatus::WaitFailed {
            prism_warn!("prism::Fence", "Client wait on fence {} failed", id);
        }
        Ok(status)
    }

    /// Poll without blocking
    pub fn is_signaled(&self) -> Result<bool> {
        Ok(self.wait(Duration::ZERO)?.is_signaled())
    }

    /// Make the GPU wait for this fence before running later commands
    pub fn gpu_wait(&self) -> Result<()> {
        let (id, device) = self.handle.parts()?;
        device.wait_sync(id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fence_tests.rs"]
mod tests;
