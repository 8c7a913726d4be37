/// Content-keyed program cache
///
/// Programs are keyed by their normalized build request. A key is built at
/// most once for the lifetime of a cache: lookup and build share one
/// critical section, so concurrent requests for the same key wait for the
/// first build instead of starting their own.
///
/// The cache can be written to disk and read back. Loading prefers the
/// persisted driver binary and falls back to rebuilding from the persisted
/// stages when the driver rejects it. Binding tables always come from the
/// file.

mod cache_file;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::graphics_device::DeviceRef;
use crate::shader::{build_program, CacheKey, Program, ProgramDesc};
use crate::{prism_bail, prism_debug, prism_err, prism_info, prism_trace, prism_warn};

use cache_file::{NativeRecord, ProgramRecord, StageRecord};

// ===== CONFIGURATION =====

/// gzip effort used when saving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    Fast,
    #[default]
    Default,
    Best,
}

impl CompressionLevel {
    fn to_flate2(self) -> flate2::Compression {
        match self {
            CompressionLevel::Fast => flate2::Compression::fast(),
            CompressionLevel::Default => flate2::Compression::default(),
            CompressionLevel::Best => flate2::Compression::best(),
        }
    }
}

/// Program cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCacheConfig {
    /// Store driver program binaries alongside the stages when saving
    pub persist_native_binaries: bool,
    pub compression: CompressionLevel,
}

impl Default for ProgramCacheConfig {
    fn default() -> Self {
        Self {
            persist_native_binaries: true,
            compression: CompressionLevel::Default,
        }
    }
}

// ===== PROGRAM CACHE =====

struct CacheEntry {
    program: Arc<Program>,
    desc: ProgramDesc,
}

/// Keyed store of linked programs
pub struct ProgramCache {
    device: DeviceRef,
    config: ProgramCacheConfig,
    entries: Mutex<FxHashMap<CacheKey, CacheEntry>>,
}

impl ProgramCache {
    pub fn new(device: &DeviceRef) -> Self {
        Self::with_config(device, ProgramCacheConfig::default())
    }

    pub fn with_config(device: &DeviceRef, config: ProgramCacheConfig) -> Self {
        Self {
            device: device.clone(),
            config,
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    /// Create a cache and load `path` into it
    ///
    /// A missing file yields an empty cache.
    #[track_caller]
    pub fn from_path(device: &DeviceRef, path: impl AsRef<Path>) -> Result<Self> {
        Self::from_path_with_config(device, path, ProgramCacheConfig::default())
    }

    /// Create a cache with `config` and load `path` into it
    #[track_caller]
    pub fn from_path_with_config(device: &DeviceRef, path: impl AsRef<Path>, config: ProgramCacheConfig) -> Result<Self> {
        let cache = Self::with_config(device, config);
        cache.load(path)?;
        Ok(cache)
    }

    pub fn config(&self) -> &ProgramCacheConfig {
        &self.config
    }

    fn entries(&self) -> MutexGuard<'_, FxHashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== LOOKUP =====

    /// Return the program for `desc`, building it on first request
    #[track_caller]
    pub fn set(&self, desc: impl Into<ProgramDesc>) -> Result<(CacheKey, Arc<Program>)> {
        let desc = desc.into();
        let key = desc.key();

        let mut entries = self.entries();
        if let Some(entry) = entries.get(&key) {
            prism_trace!("prism::ProgramCache", "Hit for '{}'", key);
            return Ok((key, entry.program.clone()));
        }

        let program = Arc::new(build_program(&self.device, &desc)?);
        prism_debug!("prism::ProgramCache", "Built program for '{}' ({} cached)", key, entries.len() + 1);
        entries.insert(key.clone(), CacheEntry { program: program.clone(), desc });
        Ok((key, program))
    }

    /// Program stored under `key`, never builds
    pub fn at(&self, key: &CacheKey) -> Result<Arc<Program>> {
        self.entries()
            .get(key)
            .map(|entry| entry.program.clone())
            .ok_or_else(|| prism_err!(KeyNotFound, "prism::ProgramCache", "No program cached for key '{}'", key))
    }

    /// Build request a cached program came from
    pub fn desc(&self, key: &CacheKey) -> Option<ProgramDesc> {
        self.entries().get(key).map(|entry| entry.desc.clone())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Cached keys in sorted order
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.entries().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Drop every cached program
    ///
    /// Native programs are deleted once no caller holds them anymore.
    pub fn clear(&self) {
        let mut entries = self.entries();
        if !entries.is_empty() {
            prism_debug!("prism::ProgramCache", "Clearing {} program(s)", entries.len());
        }
        entries.clear();
    }

    // ===== PERSISTENCE =====

    /// Write every cached program to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let records = {
            let entries = self.entries();
            let mut keys: Vec<&CacheKey> = entries.keys().collect();
            keys.sort();

            let mut records = Vec::with_capacity(keys.len());
            for key in keys {
                let entry = &entries[key];
                let native = if self.config.persist_native_binaries {
                    entry.program.native_binary()?.map(NativeRecord::from)
                } else {
                    None
                };
                records.push(ProgramRecord {
                    key: key.as_str().to_string(),
                    stages: entry.desc.stages().iter().map(StageRecord::from_desc).collect(),
                    bindings: cache_file::bindings_to_records(entry.program.bindings()),
                    native,
                });
            }
            records
        };

        let bytes = cache_file::encode(&records, self.config.compression.to_flate2())?;
        std::fs::write(path, &bytes).map_err(|e| {
            prism_err!(IoError, "prism::ProgramCache", "Failed to write '{}': {}", path.display(), e)
        })?;

        prism_info!("prism::ProgramCache",
            "Saved {} program(s) to '{}' ({} bytes)", records.len(), path.display(), bytes.len());
        Ok(())
    }

    /// Replace the cache contents with the programs stored in `path`
    ///
    /// A missing file leaves the cache empty. On any error the cache is
    /// left empty as well.
    #[track_caller]
    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut entries = self.entries();
        entries.clear();

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                prism_info!("prism::ProgramCache", "No cache file at '{}', starting empty", path.display());
                return Ok(());
            }
            Err(e) => prism_bail!(IoError, "prism::ProgramCache", "Failed to read '{}': {}", path.display(), e),
        };

        let records = cache_file::decode(&bytes)?;
        let mut loaded = FxHashMap::default();
        let mut from_binary = 0usize;
        for record in records {
            let (key, entry, used_binary) = self.restore(record)?;
            from_binary += usize::from(used_binary);
            if loaded.insert(key.clone(), entry).is_some() {
                prism_bail!(FormatError, "prism::ProgramCache", "Duplicate key '{}' in '{}'", key, path.display());
            }
        }

        prism_info!("prism::ProgramCache",
            "Loaded {} program(s) from '{}' ({} from driver binaries)", loaded.len(), path.display(), from_binary);
        *entries = loaded;
        Ok(())
    }

    #[track_caller]
    fn restore(&self, record: ProgramRecord) -> Result<(CacheKey, CacheEntry, bool)> {
        let stages = record.stages.iter().map(StageRecord::to_desc).collect::<Result<Vec<_>>>()?;
        let desc = ProgramDesc::new(stages);
        let key = CacheKey::from_raw(record.key);
        if desc.key() != key {
            prism_bail!(FormatError, "prism::ProgramCache", "Key '{}' does not match its stages", key);
        }
        let bindings = cache_file::bindings_from_records(&record.bindings)?;

        if let Some(native) = record.native {
            match Program::from_native_binary(&self.device, &native.into(), bindings.clone()) {
                Ok(program) => return Ok((key, CacheEntry { program: Arc::new(program), desc }, true)),
                Err(e) => prism_warn!("prism::ProgramCache",
                    "Rebuilding '{}' from its stages: {}", key, e.message()),
            }
        }

        let program = build_program(&self.device, &desc)?.with_bindings(bindings);
        Ok((key, CacheEntry { program: Arc::new(program), desc }, false))
    }
}

#[cfg(test)]
#[path = "program_cache_tests.rs"]
mod tests;
