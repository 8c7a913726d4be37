/// Shader stage descriptors
///
/// A stage is one unit of a program build: its kind, a payload (textual
/// source or an intermediate binary such as SPIR-V, inline or on disk), the
/// entry point used to specialize binary stages and an optional reflection
/// artifact describing its resource bindings.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::prism_err;

use super::reflection::Reflection;

// ===== STAGE KIND =====

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
    Compute,
    Geometry,
    TessControl,
    TessEvaluation,
}

impl StageKind {
    pub const ALL: [StageKind; 6] = [
        StageKind::Vertex,
        StageKind::Fragment,
        StageKind::Compute,
        StageKind::Geometry,
        StageKind::TessControl,
        StageKind::TessEvaluation,
    ];

    /// Lowercase name used in logs and cache keys
    pub const fn name(&self) -> &'static str {
        match self {
            StageKind::Vertex => "vertex",
            StageKind::Fragment => "fragment",
            StageKind::Compute => "compute",
            StageKind::Geometry => "geometry",
            StageKind::TessControl => "tess_control",
            StageKind::TessEvaluation => "tess_evaluation",
        }
    }

    /// Stable numeric tag used by the cache file
    pub const fn as_u32(&self) -> u32 {
        match self {
            StageKind::Vertex => 0,
            StageKind::Fragment => 1,
            StageKind::Compute => 2,
            StageKind::Geometry => 3,
            StageKind::TessControl => 4,
            StageKind::TessEvaluation => 5,
        }
    }

    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(StageKind::Vertex),
            1 => Some(StageKind::Fragment),
            2 => Some(StageKind::Compute),
            3 => Some(StageKind::Geometry),
            4 => Some(StageKind::TessControl),
            5 => Some(StageKind::TessEvaluation),
            _ => None,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===== PAYLOAD =====

/// Where the stage bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagePayload {
    /// Bytes held in memory
    Bytes(Vec<u8>),
    /// File read when the program is built
    Path(PathBuf),
}

/// Where the reflection artifact comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ReflectionSource {
    /// JSON file read when the program is built
    Path(PathBuf),
    /// Already parsed artifact
    Parsed(Reflection),
}

// ===== STAGE DESCRIPTOR =====

/// One stage of a program build request
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderStageDesc {
    pub kind: StageKind,
    pub payload: StagePayload,
    /// Payload is an intermediate binary rather than textual source
    pub binary: bool,
    /// Only used to specialize binary stages
    pub entry_point: String,
    pub reflection: Option<ReflectionSource>,
}

impl ShaderStageDesc {
    /// Default entry point
    pub const MAIN: &'static str = "main";

    fn with_payload(kind: StageKind, payload: StagePayload, binary: bool) -> Self {
        Self {
            kind,
            payload,
            binary,
            entry_point: Self::MAIN.to_string(),
            reflection: None,
        }
    }

    /// Inline textual source
    pub fn source(kind: StageKind, text: impl Into<String>) -> Self {
        Self::with_payload(kind, StagePayload::Bytes(text.into().into_bytes()), false)
    }

    /// Inline intermediate binary
    pub fn binary(kind: StageKind, bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_payload(kind, StagePayload::Bytes(bytes.into()), true)
    }

    /// Textual source read from `path` at build time
    pub fn source_file(kind: StageKind, path: impl Into<PathBuf>) -> Self {
        Self::with_payload(kind, StagePayload::Path(path.into()), false)
    }

    /// Intermediate binary read from `path` at build time
    pub fn binary_file(kind: StageKind, path: impl Into<PathBuf>) -> Self {
        Self::with_payload(kind, StagePayload::Path(path.into()), true)
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    pub fn with_reflection(mut self, reflection: Reflection) -> Self {
        self.reflection = Some(ReflectionSource::Parsed(reflection));
        self
    }

    pub fn with_reflection_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.reflection = Some(ReflectionSource::Path(path.into()));
        self
    }

    // ===== RESOLUTION =====

    /// Payload bytes, reading the file for path payloads
    pub fn load_payload(&self) -> Result<Vec<u8>> {
        match &self.payload {
            StagePayload::Bytes(bytes) => Ok(bytes.clone()),
            StagePayload::Path(path) => read_file(path, self.kind),
        }
    }

    /// Payload as text, `InvalidArgument` when it is not UTF-8
    pub fn load_source(&self) -> Result<String> {
        String::from_utf8(self.load_payload()?).map_err(|e| {
            prism_err!(InvalidArgument, "prism::ShaderStage",
                "{} stage source is not valid UTF-8 (byte {})", self.kind, e.utf8_error().valid_up_to())
        })
    }

    /// Parsed reflection artifact, if one was attached
    pub fn load_reflection(&self) -> Result<Option<Reflection>> {
        match &self.reflection {
            None => Ok(None),
            Some(ReflectionSource::Parsed(reflection)) => Ok(Some(reflection.clone())),
            Some(ReflectionSource::Path(path)) => Reflection::from_file(path).map(Some),
        }
    }
}

fn read_file(path: &Path, kind: StageKind) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        prism_err!(IoError, "prism::ShaderStage",
            "Failed to read {} stage '{}': {}", kind, path.display(), e)
    })
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
