/*!
# Prism GL

Ownership and program caching for a stateful GPU API.

Every native object (buffer, texture, program, framebuffer, sampler,
vertex array, fence) is held by exactly one move-only owner whose lifetime
creates and destroys it. Shader programs are built from ordered stage lists,
reflected into a name-to-binding table and kept in a content-keyed cache
that can be saved to and restored from disk.

## Architecture

- **GraphicsDevice**: object-safe trait over the native API
- **Handle**: generic single owner of one native identifier
- **Resources**: Buffer, Texture, Framebuffer, Sampler, VertexArray, Fence
- **Shader**: stage descriptors, compile/link pipeline, reflection, Program
- **ProgramCache**: keyed program store with compressed persistence

Backends (`prism_gl_backend_glow`) implement `GraphicsDevice`.
`MockGraphicsDevice` runs everything headless for tests and tools.
*/

// Internal modules
mod error;
pub mod log;
pub mod diagnostics;
pub mod graphics_device;
pub mod handle;
pub mod format;
pub mod resource;
pub mod shader;
pub mod program_cache;

// Main prism namespace module
pub mod prism {
    // Error types
    pub use crate::error::{Error, ErrorKind, Result, SourceLocation};

    // Ownership
    pub use crate::handle::{
        BufferObject, FenceObject, FramebufferObject, Handle, ProgramObject, ResourceKind, SamplerObject,
        ShaderObject, TextureObject, VertexArrayObject,
    };

    // Program cache
    pub use crate::program_cache::{CompressionLevel, ProgramCache, ProgramCacheConfig};

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{DefaultLogger, Log, LogEntry, LogSeverity, Logger};
    }

    // Native debug output
    pub mod diagnostics {
        pub use crate::diagnostics::*;
    }

    // Device abstraction
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Pixel and vertex formats
    pub mod format {
        pub use crate::format::*;
    }

    // Resource wrappers
    pub mod resource {
        pub use crate::resource::*;
    }

    // Shader pipeline
    pub mod shader {
        pub use crate::shader::*;
    }
}

// Re-export math and POD helpers at crate root
pub use bytemuck;
pub use glam;
