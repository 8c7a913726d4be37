//! Shader programs
//!
//! Stage descriptors go in, linked [`Program`]s with a name-to-binding table
//! come out.

pub mod stage;
pub mod reflection;
pub mod program_desc;
pub mod program;
pub mod compiler;

pub use stage::{ReflectionSource, ShaderStageDesc, StageKind, StagePayload};
pub use reflection::{
    resolve_bindings, BindingCategory, BindingEntry, BindingTable, ExplicitResource, ReflectedResource, Reflection,
};
pub use program_desc::{CacheKey, ProgramDesc};
pub use program::{BindResource, Program};
pub use compiler::build_program;
