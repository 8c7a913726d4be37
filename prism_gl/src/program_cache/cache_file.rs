/// Program cache file format
///
/// A gzip stream wrapping a bincode encoding with the legacy configuration
/// (little-endian, fixed-width integers, `u64` length prefixes):
///
/// ```text
/// magic      [u8; 4]  "PRGC"
/// version    u32      1
/// count      u64
/// record x count:
///     key        string
///     stages     u64 count x { kind u32, payload Inline(bytes) | File(path), binary u8, entry_point string }
///     bindings   u64 count x { name string, category u32, access u32, slot u32 }
///     native     option { format u32, bytes }
/// ```
///
/// Native object names never reach the file. Programs are recreated from
/// the driver binary or from their stages when the file is loaded.

use std::io::{Read, Write};
use std::path::PathBuf;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graphics_device::{Access, ProgramBinary};
use crate::shader::{BindingCategory, BindingEntry, BindingTable, ShaderStageDesc, StageKind, StagePayload};
use crate::{prism_bail, prism_err};

pub(crate) const MAGIC: [u8; 4] = *b"PRGC";
pub(crate) const VERSION: u32 = 1;

/// Upper bound on the decoded size, guards against corrupt length prefixes
const MAX_DECODED_BYTES: usize = 512 * 1024 * 1024;

// ===== RECORDS =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum PayloadRecord {
    Inline(Vec<u8>),
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StageRecord {
    pub kind: u32,
    pub payload: PayloadRecord,
    pub binary: bool,
    pub entry_point: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BindingRecord {
    pub name: String,
    pub category: u32,
    pub access: u32,
    pub slot: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct NativeRecord {
    pub format: u32,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ProgramRecord {
    pub key: String,
    pub stages: Vec<StageRecord>,
    pub bindings: Vec<BindingRecord>,
    pub native: Option<NativeRecord>,
}

#[derive(Serialize)]
struct FileRef<'a> {
    magic: [u8; 4],
    version: u32,
    records: &'a [ProgramRecord],
}

#[derive(Deserialize)]
struct Header {
    magic: [u8; 4],
    version: u32,
}

// ===== CONVERSIONS =====

impl StageRecord {
    /// Provenance of one stage; attached reflection is not kept
    pub fn from_desc(stage: &ShaderStageDesc) -> Self {
        let payload = match &stage.payload {
            StagePayload::Bytes(bytes) => PayloadRecord::Inline(bytes.clone()),
            StagePayload::Path(path) => PayloadRecord::File(path.to_string_lossy().into_owned()),
        };
        Self {
            kind: stage.kind.as_u32(),
            payload,
            binary: stage.binary,
            entry_point: stage.entry_point.clone(),
        }
    }

    pub fn to_desc(&self) -> Result<ShaderStageDesc> {
        let Some(kind) = StageKind::from_u32(self.kind) else {
            prism_bail!(FormatError, "prism::ProgramCache", "Unknown stage kind tag {}", self.kind);
        };
        let payload = match &self.payload {
            PayloadRecord::Inline(bytes) => StagePayload::Bytes(bytes.clone()),
            PayloadRecord::File(path) => StagePayload::Path(PathBuf::from(path)),
        };
        Ok(ShaderStageDesc {
            kind,
            payload,
            binary: self.binary,
            entry_point: self.entry_point.clone(),
            reflection: None,
        })
    }
}

fn access_to_u32(access: Access) -> u32 {
    match access {
        Access::ReadOnly => 0,
        Access::WriteOnly => 1,
        Access::ReadWrite => 2,
    }
}

fn access_from_u32(value: u32) -> Option<Access> {
    match value {
        0 => Some(Access::ReadOnly),
        1 => Some(Access::WriteOnly),
        2 => Some(Access::ReadWrite),
        _ => None,
    }
}

/// Binding table as records sorted by name
pub(crate) fn bindings_to_records(table: &BindingTable) -> Vec<BindingRecord> {
    let mut records: Vec<BindingRecord> = table
        .iter()
        .map(|(name, entry)| BindingRecord {
            name: name.clone(),
            category: entry.category.as_u32(),
            access: access_to_u32(entry.access),
            slot: entry.slot,
        })
        .collect();
    records.sort_by(|a, b| a.name.cmp(&b.name));
    records
}

pub(crate) fn bindings_from_records(records: &[BindingRecord]) -> Result<BindingTable> {
    let mut table = BindingTable::default();
    for record in records {
        let category = match BindingCategory::from_u32(record.category) {
            Some(BindingCategory::Auto) | None => prism_bail!(FormatError, "prism::ProgramCache",
                "Binding '{}' has invalid category tag {}", record.name, record.category),
            Some(category) => category,
        };
        let Some(access) = access_from_u32(record.access) else {
            prism_bail!(FormatError, "prism::ProgramCache",
                "Binding '{}' has invalid access tag {}", record.name, record.access);
        };
        table.insert(record.name.clone(), BindingEntry { category, access, slot: record.slot });
    }
    Ok(table)
}

impl From<ProgramBinary> for NativeRecord {
    fn from(binary: ProgramBinary) -> Self {
        Self { format: binary.format, bytes: binary.bytes }
    }
}

impl From<NativeRecord> for ProgramBinary {
    fn from(record: NativeRecord) -> Self {
        Self { format: record.format, bytes: record.bytes }
    }
}

// ===== ENCODE / DECODE =====

/// Encode and compress a full cache
pub(crate) fn encode(records: &[ProgramRecord], compression: Compression) -> Result<Vec<u8>> {
    let file = FileRef { magic: MAGIC, version: VERSION, records };
    let raw = bincode::serde::encode_to_vec(&file, bincode::config::legacy()).map_err(|e| {
        prism_err!(FormatError, "prism::ProgramCache", "Failed to encode program cache: {}", e)
    })?;

    let mut encoder = GzEncoder::new(Vec::with_capacity(raw.len() / 2), compression);
    encoder
        .write_all(&raw)
        .map_err(|e| prism_err!(IoError, "prism::ProgramCache", "Failed to compress program cache: {}", e))?;
    encoder
        .finish()
        .map_err(|e| prism_err!(IoError, "prism::ProgramCache", "Failed to compress program cache: {}", e))
}

/// Decompress and decode a full cache
pub(crate) fn decode(compressed: &[u8]) -> Result<Vec<ProgramRecord>> {
    let mut raw = Vec::new();
    GzDecoder::new(compressed)
        .take(MAX_DECODED_BYTES as u64 + 1)
        .read_to_end(&mut raw)
        .map_err(|e| prism_err!(FormatError, "prism::ProgramCache", "Corrupt gzip stream: {}", e))?;
    if raw.len() > MAX_DECODED_BYTES {
        prism_bail!(FormatError, "prism::ProgramCache", "Program cache exceeds {} bytes", MAX_DECODED_BYTES);
    }

    let config = bincode::config::legacy().with_limit::<MAX_DECODED_BYTES>();

    // ========== HEADER ==========
    let (header, header_len): (Header, usize) = bincode::serde::decode_from_slice(&raw, config)
        .map_err(|e| prism_err!(FormatError, "prism::ProgramCache", "Truncated header: {}", e))?;
    if header.magic != MAGIC {
        prism_bail!(FormatError, "prism::ProgramCache", "Bad magic {:02x?}, not a program cache", header.magic);
    }
    if header.version != VERSION {
        prism_bail!(FormatError, "prism::ProgramCache",
            "Unsupported program cache version {} (expected {})", header.version, VERSION);
    }

    // ========== RECORDS ==========
    let body = &raw[header_len..];
    let (records, body_len): (Vec<ProgramRecord>, usize) = bincode::serde::decode_from_slice(body, config)
        .map_err(|e| prism_err!(FormatError, "prism::ProgramCache", "Malformed program record: {}", e))?;
    if body_len != body.len() {
        prism_bail!(FormatError, "prism::ProgramCache",
            "{} trailing bytes after {} records", body.len() - body_len, records.len());
    }

    Ok(records)
}

#[cfg(test)]
#[path = "cache_file_tests.rs"]
mod tests;
