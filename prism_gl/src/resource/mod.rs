//! Resource wrappers
//!
//! Each wrapper composes a [`Handle`](crate::handle::Handle) with the state
//! needed to use the native object safely.

pub mod buffer;
pub mod texture;
pub mod sampler;
pub mod framebuffer;
pub mod vertex_array;
pub mod fence;

pub use buffer::{Buffer, BufferDesc};
pub use texture::{Attachment, Texture, TextureDesc};
pub use sampler::{CompareFunc, Filter, MipmapFilter, Sampler, SamplerDesc, WrapMode};
pub use framebuffer::Framebuffer;
pub use vertex_array::{VertexArray, VertexAttribute};
pub use fence::Fence;
