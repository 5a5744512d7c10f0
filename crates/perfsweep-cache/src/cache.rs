//! Execution cache.
//!
//! Every measured workload is persisted as two sibling files named after the
//! descriptor key, with path-unsafe characters percent-encoded: `<key>.json` holds the descriptor and its results, and
//! `<key>.ppm` holds the relocated artifact. The artifact is moved in last, so
//! its presence marks a complete entry.

use perfsweep_core::{Error, ExecutionRecord, MeasurementResult, Result, WorkloadDescriptor};
use perfsweep_runner::{RunOutput, Runner};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extension of the cache record files.
pub const RECORD_EXTENSION: &str = "json";

/// Extension of the relocated artifacts.
pub const ARTIFACT_EXTENSION: &str = "ppm";

/// On-disk schema of a cache record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheFile {
    pub input: WorkloadDescriptor,
    pub results: Vec<MeasurementResult>,
}

/// Where a resolved record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Loaded from disk without running anything.
    Cache,
    /// Measured by the runner during this call.
    Fresh,
}

/// A record together with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub record: ExecutionRecord,
    pub source: Source,
}

/// Persists execution records and re-runs workloads only when needed.
pub struct ExecutionCache {
    dir: PathBuf,
    runner: Box<dyn Runner>,
}

impl ExecutionCache {
    pub fn new(dir: impl Into<PathBuf>, runner: Box<dyn Runner>) -> Self {
        Self {
            dir: dir.into(),
            runner,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the JSON record for `descriptor`.
    pub fn record_path(&self, descriptor: &WorkloadDescriptor) -> PathBuf {
        // Keys routinely contain dots, so the extension is appended rather
        // than set with `with_extension`.
        self.dir
            .join(format!("{}.{}", file_stem(&descriptor.to_key()), RECORD_EXTENSION))
    }

    /// Path the artifact of `descriptor` is relocated to.
    pub fn artifact_path(&self, descriptor: &WorkloadDescriptor) -> PathBuf {
        self.dir
            .join(format!("{}.{}", file_stem(&descriptor.to_key()), ARTIFACT_EXTENSION))
    }

    /// Load the cached record for `descriptor`.
    ///
    /// Returns `Ok(None)` when no complete entry exists, and
    /// [`Error::CacheMismatch`] when the entry under the same key was recorded
    /// for a different workload.
    pub fn load(&self, descriptor: &WorkloadDescriptor) -> Result<Option<ExecutionRecord>> {
        let record_path = self.record_path(descriptor);
        let artifact_path = self.artifact_path(descriptor);

        if !artifact_path.exists() {
            tracing::debug!(path = %artifact_path.display(), "no cached artifact");
            return Ok(None);
        }

        let record = match read_record(&record_path) {
            Ok(record) => record,
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %record_path.display(), "artifact without record");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if record.descriptor != *descriptor {
            return Err(Error::CacheMismatch {
                key: descriptor.to_key(),
            });
        }

        Ok(Some(record))
    }

    /// Persist a fresh run of `descriptor` and relocate its artifact.
    pub fn store(&self, descriptor: &WorkloadDescriptor, output: RunOutput) -> Result<ExecutionRecord> {
        if !output.artifact_path.exists() {
            return Err(Error::Other(format!(
                "Artifact not produced at: {}",
                output.artifact_path.display()
            )));
        }

        fs::create_dir_all(&self.dir)?;

        let record_path = self.record_path(descriptor);
        let file = CacheFile {
            input: descriptor.clone(),
            results: output.results,
        };
        tracing::info!(path = %record_path.display(), "saving results");
        fs::write(&record_path, serde_json::to_string_pretty(&file)?)?;

        let artifact_path = self.artifact_path(descriptor);
        tracing::info!(path = %artifact_path.display(), "saving artifact");
        relocate(&output.artifact_path, &artifact_path)?;

        Ok(ExecutionRecord::new(file.input, file.results, artifact_path))
    }

    /// Return the record for `descriptor`, running it only when the cache
    /// cannot answer.
    pub fn resolve(&self, descriptor: &WorkloadDescriptor, force_recompute: bool) -> Result<Resolved> {
        descriptor.validate()?;

        if force_recompute {
            tracing::info!(workload = %descriptor, "forced recompute");
        } else {
            match self.load(descriptor) {
                Ok(Some(record)) => {
                    tracing::info!(path = %self.record_path(descriptor).display(), "loaded cached result");
                    return Ok(Resolved {
                        record,
                        source: Source::Cache,
                    });
                }
                Ok(None) => {
                    tracing::info!(path = %self.record_path(descriptor).display(), "cache entry not found");
                }
                Err(Error::CacheMismatch { key }) => {
                    tracing::warn!(key = %key, "cache entry does not match workload, running measure");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(runner = self.runner.name(), workload = %descriptor, "measuring");
        let output = self.runner.run(descriptor)?;
        let record = self.store(descriptor, output)?;
        Ok(Resolved {
            record,
            source: Source::Fresh,
        })
    }

    /// Return the record for `descriptor`, measuring it at most once.
    pub fn get_or_compute(
        &self,
        descriptor: &WorkloadDescriptor,
        force_recompute: bool,
    ) -> Result<ExecutionRecord> {
        self.resolve(descriptor, force_recompute).map(|r| r.record)
    }

    /// Every record file in the cache directory, sorted by name.
    pub fn entries(&self) -> Result<Vec<PathBuf>> {
        record_files(&self.dir)
    }
}

/// File name stem for a cache key.
///
/// Path separators, `%` and control characters are percent-encoded so every
/// key maps to a single file directly inside the cache directory.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for c in key.chars() {
        if matches!(c, '/' | '\\' | '%' | ':') || c.is_control() {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                stem.push_str(&format!("%{:02X}", byte));
            }
        } else {
            stem.push(c);
        }
    }
    stem
}

/// Record files under `dir`, sorted by name. A missing directory has none.
pub fn record_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in read_dir {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == RECORD_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Sibling artifact of a record file.
pub fn artifact_for(record_path: &Path) -> PathBuf {
    record_path.with_extension(ARTIFACT_EXTENSION)
}

/// Decode a record file; its artifact is the sibling `.ppm` path.
pub fn read_record(record_path: &Path) -> Result<ExecutionRecord> {
    let content = fs::read_to_string(record_path)?;
    let file: CacheFile = serde_json::from_str(&content)?;
    Ok(ExecutionRecord::new(
        file.input,
        file.results,
        artifact_for(record_path),
    ))
}

/// Move `from` to `to`, copying when a plain rename is not possible.
fn relocate(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)?;
    Ok(())
}
