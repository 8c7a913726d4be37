/// SPIR-V stages - cross-compiled to GLSL 450 with naga
///
/// Resource bindings declared in the module are kept as explicit
/// `layout(binding = N)` qualifiers so that slots from a reflection artifact
/// stay valid. Resource names are not preserved by the translation; programs
/// built from binary stages are bound by slot.

use std::collections::BTreeMap;

use prism_gl::prism::shader::StageKind;

fn naga_stage(kind: StageKind) -> Option<naga::ShaderStage> {
    match kind {
        StageKind::Vertex => Some(naga::ShaderStage::Vertex),
        StageKind::Fragment => Some(naga::ShaderStage::Fragment),
        StageKind::Compute => Some(naga::ShaderStage::Compute),
        StageKind::Geometry | StageKind::TessControl | StageKind::TessEvaluation => None,
    }
}

/// Translate one SPIR-V module into GLSL for `entry_point`
///
/// The error is a compile log, ready to be reported as the shader's info
/// log.
pub(crate) fn spirv_to_glsl(spirv: &[u8], kind: StageKind, entry_point: &str) -> Result<String, String> {
    let Some(stage) = naga_stage(kind) else {
        return Err(format!("error: {} stages cannot be translated from SPIR-V", kind));
    };

    // ========== PARSE ==========
    let options = naga::front::spv::Options {
        adjust_coordinate_space: false,
        ..Default::default()
    };
    let module = naga::front::spv::parse_u8_slice(spirv, &options)
        .map_err(|e| format!("error: invalid SPIR-V: {}", e))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    let info = validator
        .validate(&module)
        .map_err(|e| format!("error: SPIR-V validation failed: {}", e))?;

    if !module.entry_points.iter().any(|ep| ep.name == entry_point && ep.stage == stage) {
        return Err(format!("error: no {} entry point named '{}'", kind, entry_point));
    }

    // ========== BINDINGS ==========
    let mut binding_map = BTreeMap::new();
    for (_, global) in module.global_variables.iter() {
        if let Some(binding) = &global.binding {
            let slot = u8::try_from(binding.binding)
                .map_err(|_| format!("error: binding {} is out of range", binding.binding))?;
            binding_map.insert(binding.clone(), slot);
        }
    }

    // ========== WRITE ==========
    let options = naga::back::glsl::Options {
        version: naga::back::glsl::Version::Desktop(450),
        writer_flags: naga::back::glsl::WriterFlags::empty(),
        binding_map,
        ..Default::default()
    };
    let pipeline_options = naga::back::glsl::PipelineOptions {
        shader_stage: stage,
        entry_point: entry_point.to_string(),
        multiview: None,
    };

    let mut glsl = String::new();
    let mut writer = naga::back::glsl::Writer::new(
        &mut glsl,
        &module,
        &info,
        &options,
        &pipeline_options,
        naga::proc::BoundsCheckPolicies::default(),
    )
    .map_err(|e| format!("error: GLSL generation failed: {}", e))?;
    writer
        .write()
        .map_err(|e| format!("error: GLSL generation failed: {}", e))?;
    drop(writer);

    Ok(glsl)
}

#[cfg(test)]
#[path = "spirv_tests.rs"]
mod tests;
