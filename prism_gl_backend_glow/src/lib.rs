/*!
# Prism GL - glow Backend

OpenGL 4.5 implementation of the prism_gl `GraphicsDevice` trait.

The device wraps a `glow::Context` that is current on the calling thread,
routes GL debug output into the device's `DiagnosticContext` and
cross-compiles SPIR-V stages to GLSL with naga.

```no_run
use std::sync::Arc;
use prism_gl::prism::device::DeviceRef;
use prism_gl::prism::diagnostics::{Config, DiagnosticContext};
use prism_gl::prism::ProgramCache;
use prism_gl_backend_glow::prism::GlowGraphicsDevice;

# fn run(gl: glow::Context) -> prism_gl::prism::Result<()> {
let diagnostics = Arc::new(DiagnosticContext::from_config(&Config::default()));
let device: DeviceRef = Arc::new(GlowGraphicsDevice::new(gl, diagnostics)?);
let cache = ProgramCache::from_path(&device, "programs.prgc")?;
# Ok(())
# }
```
*/

mod debug;
mod glow_device;
mod glow_format;
mod spirv;

pub use glow_device::GlowGraphicsDevice;

// Main prism namespace module
pub mod prism {
    pub use crate::glow_device::GlowGraphicsDevice;
}
