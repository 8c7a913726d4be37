/// Program build request and its cache key
///
/// Client code hands the cache a single stage, a list of stages or a full
/// [`ProgramDesc`]; all of them normalize to one ordered stage list before a
/// key is computed.

use std::fmt;

use xxhash_rust::xxh3::xxh3_128;

use super::stage::{ShaderStageDesc, StagePayload};

// ===== PROGRAM DESC =====

/// Ordered stage list of one program build
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgramDesc {
    stages: Vec<ShaderStageDesc>,
}

impl ProgramDesc {
    pub fn new(stages: Vec<ShaderStageDesc>) -> Self {
        Self { stages }
    }

    /// Append a stage (builder style)
    pub fn with_stage(mut self, stage: ShaderStageDesc) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[ShaderStageDesc] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Deterministic key of this build request
    ///
    /// Each stage contributes `kind:form:<len>:identity@<len>:entry_point`, in
    /// stage order, joined by `|`. Free-form fields carry their byte length
    /// so that no path or entry point can forge a stage boundary. Inline
    /// payloads are identified by their 128-bit xxh3 digest, file payloads by
    /// their path. Reflection artifacts do not take part in the key.
    pub fn key(&self) -> CacheKey {
        let parts: Vec<String> = self
            .stages
            .iter()
            .map(|stage| {
                let form = if stage.binary { "bin" } else { "src" };
                let identity = match &stage.payload {
                    StagePayload::Bytes(bytes) => format!("xxh3-{:032x}", xxh3_128(bytes)),
                    StagePayload::Path(path) => format!("file-{}", path.display()),
                };
                format!(
                    "{}:{}:{}:{}@{}:{}",
                    stage.kind,
                    form,
                    identity.len(),
                    identity,
                    stage.entry_point.len(),
                    stage.entry_point
                )
            })
            .collect();
        CacheKey(parts.join("|"))
    }
}

impl From<ShaderStageDesc> for ProgramDesc {
    fn from(stage: ShaderStageDesc) -> Self {
        Self { stages: vec![stage] }
    }
}

impl From<Vec<ShaderStageDesc>> for ProgramDesc {
    fn from(stages: Vec<ShaderStageDesc>) -> Self {
        Self { stages }
    }
}

impl From<&[ShaderStageDesc]> for ProgramDesc {
    fn from(stages: &[ShaderStageDesc]) -> Self {
        Self { stages: stages.to_vec() }
    }
}

impl<const N: usize> From<[ShaderStageDesc; N]> for ProgramDesc {
    fn from(stages: [ShaderStageDesc; N]) -> Self {
        Self { stages: stages.into() }
    }
}

impl FromIterator<ShaderStageDesc> for ProgramDesc {
    fn from_iter<I: IntoIterator<Item = ShaderStageDesc>>(iter: I) -> Self {
        Self { stages: iter.into_iter().collect() }
    }
}

// ===== CACHE KEY =====

/// Key of one program cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Rebuild a key read back from storage
    pub(crate) fn from_raw(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "program_desc_tests.rs"]
mod tests;
