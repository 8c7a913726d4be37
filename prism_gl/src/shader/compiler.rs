/// Program build pipeline
///
/// Builds run in three fixed phases:
/// 1. compile every stage into a transient shader object
/// 2. attach them all to a new program object and link once
/// 3. detach and delete every transient stage
///
/// A failure in phase 1 or 2 releases whatever was created so far. No
/// shader object outlives the build and no failed program stays alive.

use crate::error::{Result, SourceLocation};
use crate::graphics_device::{DeviceRef, GraphicsDevice, NativeId};
use crate::handle::{Handle, ProgramObject, ShaderObject};
use crate::{prism_bail, prism_debug};

use super::program::Program;
use super::program_desc::ProgramDesc;
use super::reflection::{resolve_bindings, Reflection};
use super::stage::{ShaderStageDesc, StageKind};

/// Stage payload after file reads and validation
enum ResolvedPayload {
    Source(String),
    Binary(Vec<u8>),
}

struct ResolvedStage<'a> {
    desc: &'a ShaderStageDesc,
    payload: ResolvedPayload,
}

/// Detaches every stage from the program when dropped
struct AttachedStages<'a> {
    device: &'a dyn GraphicsDevice,
    program: NativeId,
    shaders: Vec<NativeId>,
}

impl Drop for AttachedStages<'_> {
    fn drop(&mut self) {
        for shader in &self.shaders {
            self.device.detach_shader(self.program, *shader);
        }
    }
}

/// Compile, link and reflect one program
///
/// Driver messages raised during the build are tagged with the caller's
/// location.
#[track_caller]
pub fn build_program(device: &DeviceRef, desc: &ProgramDesc) -> Result<Program> {
    let _scope = device.diagnostics().scope(SourceLocation::caller());

    // ========== VALIDATION ==========
    if desc.is_empty() {
        prism_bail!(InvalidArgument, "prism::ShaderCompiler", "Program build needs at least one stage");
    }

    // ========== RESOLVE PAYLOADS AND REFLECTION ==========
    let mut resolved = Vec::with_capacity(desc.len());
    let mut reflections: Vec<Reflection> = Vec::new();
    for stage in desc.stages() {
        let payload = if stage.binary {
            ResolvedPayload::Binary(stage.load_payload()?)
        } else {
            ResolvedPayload::Source(stage.load_source()?)
        };
        if let Some(reflection) = stage.load_reflection()? {
            reflections.push(reflection);
        }
        resolved.push(ResolvedStage { desc: stage, payload });
    }
    let bindings = resolve_bindings(&reflections)?;

    // ========== PHASE 1: COMPILE ==========
    let mut shaders: Vec<Handle<ShaderObject>> = Vec::with_capacity(resolved.len());
    for stage in &resolved {
        shaders.push(compile_stage(device, stage)?);
    }

    // ========== PHASE 2: LINK ==========
    let program = Handle::<ProgramObject>::create_with(device, |d| d.create_program())?;
    let program_id = program.id()?;
    let mut attached = AttachedStages {
        device: device.as_ref(),
        program: program_id,
        shaders: Vec::with_capacity(shaders.len()),
    };
    for shader in &shaders {
        let shader_id = shader.id()?;
        device.attach_shader(program_id, shader_id);
        attached.shaders.push(shader_id);
    }
    device.link_program(program_id);

    if !device.get_program_link_status(program_id) {
        let log = device.get_program_info_log(program_id);
        prism_bail!(LinkError, "prism::ShaderCompiler",
            "Program failed to link ({} stages):\n{}", shaders.len(), indent_log(&log));
    }

    // ========== PHASE 3: CLEANUP ==========
    drop(attached);
    drop(shaders);

    prism_debug!("prism::ShaderCompiler",
        "Linked program {} from {} stage(s), {} binding(s)", program_id, desc.len(), bindings.len());
    Ok(Program::from_parts(program, bindings))
}

fn compile_stage(device: &DeviceRef, stage: &ResolvedStage<'_>) -> Result<Handle<ShaderObject>> {
    let kind = stage.desc.kind;
    let shader = Handle::<ShaderObject>::create_with(device, |d| d.create_shader(kind))?;
    let id = shader.id()?;

    match &stage.payload {
        ResolvedPayload::Binary(bytes) => {
            device.shader_binary(id, bytes);
            device.specialize_shader(id, &stage.desc.entry_point);
        }
        ResolvedPayload::Source(text) => {
            device.shader_source(id, text);
            device.compile_shader(id);
        }
    }

    if !device.get_shader_compile_status(id) {
        let log = device.get_shader_info_log(id);
        prism_bail!(CompileError, "prism::ShaderCompiler", "{}", format_compile_failure(kind, stage, &log));
    }
    Ok(shader)
}

fn format_compile_failure(kind: StageKind, stage: &ResolvedStage<'_>, log: &str) -> String {
    match stage.payload {
        ResolvedPayload::Binary(_) => format!(
            "{} stage failed to specialize (entry point '{}'):\n{}",
            kind, stage.desc.entry_point, indent_log(log)
        ),
        ResolvedPayload::Source(_) => format!("{} stage failed to compile:\n{}", kind, indent_log(log)),
    }
}

/// Indent every non-empty line of a driver log
fn indent_log(log: &str) -> String {
    let lines: Vec<String> = log
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(|line| format!("    {}", line))
        .collect();
    if lines.is_empty() {
        "    (driver returned an empty log)".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
