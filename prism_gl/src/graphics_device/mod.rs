/// Graphics device module - native API abstraction

// Module declarations
pub mod graphics_device;
pub mod types;
pub mod mock_graphics_device;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use types::*;
pub use mock_graphics_device::{DeviceCall, MockGraphicsDevice, MOCK_BINARY_FORMAT};
