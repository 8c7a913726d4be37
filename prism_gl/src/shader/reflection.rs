/// Reflection artifacts and the name-to-binding resolver
///
/// Artifacts follow the JSON produced by `spirv-cross --reflect`. The arrays
/// consumed here are `textures`, `separate_images`, `separate_samplers`,
/// `images`, `ssbos` and `ubos`, plus a `resources` array whose entries name
/// their category (and optionally their access) directly. Every other key is
/// ignored.
///
/// ```json
/// {
///     "textures": [ { "name": "albedo", "binding": 3 } ],
///     "ssbos": [ { "name": "Particles", "binding": 0, "readonly": true } ],
///     "resources": [ { "name": "exposure", "category": "classic_uniform", "binding": 0 } ]
/// }
/// ```

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graphics_device::Access;
use crate::{prism_bail, prism_debug, prism_err};

// ===== BINDING TABLE =====

/// Kind of native binding point a named resource uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingCategory {
    /// Use whatever category the binding table records (bind-time only)
    Auto,
    /// Storage image unit
    Image,
    /// Texture/sampler unit
    Sampler,
    ShaderStorageBlock,
    /// Plain `uniform` variable, addressed by location
    ClassicUniform,
    UniformBlock,
}

impl BindingCategory {
    /// Stable numeric tag used by the cache file
    pub const fn as_u32(&self) -> u32 {
        match self {
            BindingCategory::Auto => 0,
            BindingCategory::Image => 1,
            BindingCategory::Sampler => 2,
            BindingCategory::ShaderStorageBlock => 3,
            BindingCategory::ClassicUniform => 4,
            BindingCategory::UniformBlock => 5,
        }
    }

    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(BindingCategory::Auto),
            1 => Some(BindingCategory::Image),
            2 => Some(BindingCategory::Sampler),
            3 => Some(BindingCategory::ShaderStorageBlock),
            4 => Some(BindingCategory::ClassicUniform),
            5 => Some(BindingCategory::UniformBlock),
            _ => None,
        }
    }
}

/// Where a named resource binds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingEntry {
    pub category: BindingCategory,
    pub access: Access,
    pub slot: u32,
}

/// Name to binding entry
pub type BindingTable = FxHashMap<String, BindingEntry>;

// ===== ARTIFACT =====

/// One resource of a spirv-cross array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectedResource {
    pub name: String,
    pub binding: u32,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub writeonly: bool,
}

/// Resource whose category is given explicitly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitResource {
    pub name: String,
    pub category: BindingCategory,
    pub binding: u32,
    #[serde(default)]
    pub access: Option<Access>,
}

/// Parsed reflection artifact of one stage
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Reflection {
    /// Combined image samplers
    pub textures: Vec<ReflectedResource>,
    /// Sampled images without a sampler
    pub separate_images: Vec<ReflectedResource>,
    pub separate_samplers: Vec<ReflectedResource>,
    /// Storage images
    pub images: Vec<ReflectedResource>,
    pub ssbos: Vec<ReflectedResource>,
    pub ubos: Vec<ReflectedResource>,
    pub resources: Vec<ExplicitResource>,
}

impl Reflection {
    /// Parse an artifact, `InvalidArgument` when malformed
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            prism_err!(InvalidArgument, "prism::Reflection", "Malformed reflection artifact: {}", e)
        })
    }

    /// Read and parse an artifact file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            prism_err!(IoError, "prism::Reflection",
                "Failed to read reflection artifact '{}': {}", path.display(), e)
        })?;
        Self::from_json(&text).map_err(|e| {
            prism_err!(InvalidArgument, "prism::Reflection", "{} ({})", e.message(), path.display())
        })
    }

    /// Binding entries in artifact order
    pub fn entries(&self) -> Result<Vec<(String, BindingEntry)>> {
        let groups = [
            (&self.textures, BindingCategory::Sampler, Access::ReadOnly),
            (&self.separate_images, BindingCategory::Sampler, Access::ReadOnly),
            (&self.separate_samplers, BindingCategory::Sampler, Access::ReadOnly),
            (&self.images, BindingCategory::Image, Access::ReadWrite),
            (&self.ssbos, BindingCategory::ShaderStorageBlock, Access::ReadWrite),
            (&self.ubos, BindingCategory::UniformBlock, Access::ReadOnly),
        ];

        let mut entries = Vec::new();
        for (resources, category, default_access) in groups {
            for resource in resources {
                let access = match (resource.readonly, resource.writeonly) {
                    (false, false) => default_access,
                    (true, false) => Access::ReadOnly,
                    (false, true) => Access::WriteOnly,
                    (true, true) => prism_bail!(InvalidArgument, "prism::Reflection",
                        "Resource '{}' is declared both readonly and writeonly", resource.name),
                };
                entries.push((resource.name.clone(), BindingEntry { category, access, slot: resource.binding }));
            }
        }

        for resource in &self.resources {
            let default_access = match resource.category {
                BindingCategory::Auto => prism_bail!(InvalidArgument, "prism::Reflection",
                    "Resource '{}' must name a concrete category", resource.name),
                BindingCategory::Image | BindingCategory::ShaderStorageBlock => Access::ReadWrite,
                _ => Access::ReadOnly,
            };
            entries.push((
                resource.name.clone(),
                BindingEntry {
                    category: resource.category,
                    access: resource.access.unwrap_or(default_access),
                    slot: resource.binding,
                },
            ));
        }

        Ok(entries)
    }
}

// ===== RESOLVER =====

/// Merge per-stage artifacts, in build order, into one binding table
///
/// A name seen again with the same category takes the later slot and
/// access. A name seen again with another category is `InvalidArgument`.
pub fn resolve_bindings<'a, I>(reflections: I) -> Result<BindingTable>
where
    I: IntoIterator<Item = &'a Reflection>,
{
    let mut table = BindingTable::default();
    for reflection in reflections {
        for (name, entry) in reflection.entries()? {
            match table.get(&name) {
                Some(previous) if previous.category != entry.category => {
                    prism_bail!(InvalidArgument, "prism::Reflection",
                        "Resource '{}' declared as {:?} and as {:?}", name, previous.category, entry.category);
                }
                Some(previous) if *previous != entry => {
                    prism_debug!("prism::Reflection",
                        "Resource '{}' redeclared, slot {} -> {}", name, previous.slot, entry.slot);
                }
                _ => {}
            }
            table.insert(name, entry);
        }
    }
    Ok(table)
}

#[cfg(test)]
#[path = "reflection_tests.rs"]
mod tests;
