// Checksum engine
// Plans, maps and reduces one file into its final digest

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use md5::{Digest as _, Md5};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use super::config::EngineConfig;
use super::crc::{Algorithm, PartialResult};
use super::error::ChecksumError;
use super::hex::{self, HexDigest};
use super::mapping::{ChunkSource, TieredFileSource, WholeFileSource};
use super::plan::{self, ChunkPlan, Strategy};
use super::reduce::{reduce, reduce_serial, AbortFlag};

/// Worker stack size; the reducer recurses once per block
const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Final digest of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Digest {
    Crc32(HexDigest),
    Md5([u8; 16]),
}

impl Digest {
    /// Compare against a digest read from a manifest, ignoring case
    pub fn matches(&self, expected: &str) -> bool {
        match self {
            Digest::Crc32(crc) => expected
                .parse::<HexDigest>()
                .map(|parsed| parsed.value() == crc.value())
                .unwrap_or(false),
            Digest::Md5(_) => self.to_string().eq_ignore_ascii_case(expected),
        }
    }

    /// Re-encode in the requested case (MD5 digests are always lowercase)
    pub fn with_case(self, lowercase: bool) -> Self {
        match self {
            Digest::Crc32(crc) => Digest::Crc32(crc.with_case(lowercase)),
            other => other,
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Digest::Crc32(crc) => write!(f, "{}", crc),
            Digest::Md5(bytes) => bytes.iter().try_for_each(|b| write!(f, "{:02x}", b)),
        }
    }
}

impl serde::Serialize for Digest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of checksumming one file
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileChecksum {
    pub path: PathBuf,
    pub size: u64,
    pub algorithm: Algorithm,
    pub strategy: Strategy,
    pub digest: Digest,
}

/// Outcome for one file of a batch: its checksum, or why there is none
#[derive(Debug, serde::Serialize)]
#[serde(untagged)]
pub enum ChecksumOutcome {
    Computed(FileChecksum),
    Failed {
        path: PathBuf,
        /// Short diagnostic: "file missing", "size unreadable", "mapping failed", ...
        error: &'static str,
        message: String,
    },
}

impl ChecksumOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ChecksumOutcome::Failed { .. })
    }
}

/// Computes file digests with a fixed configuration.
///
/// The worker pool is created once per engine and reused for every file.
pub struct ChecksumEngine {
    config: EngineConfig,
    algorithm: Algorithm,
    pool: Option<ThreadPool>,
}

impl ChecksumEngine {
    /// Create an engine computing CRC32
    pub fn new(config: EngineConfig) -> Result<Self, ChecksumError> {
        Self::with_algorithm(config, Algorithm::Crc32)
    }

    pub fn with_algorithm(config: EngineConfig, algorithm: Algorithm) -> Result<Self, ChecksumError> {
        config.validate()?;
        // MD5 is always a serial scan
        let pool = if config.threads == 1 || algorithm == Algorithm::Md5 {
            None
        } else {
            let workers = plan::resolve_threads(config.threads, &config);
            debug!(workers, "starting checksum worker pool");
            let pool = ThreadPoolBuilder::new()
                .num_threads(workers as usize)
                .stack_size(WORKER_STACK_SIZE)
                .thread_name(|i| format!("sfvcrc-worker-{}", i))
                .build()
                .map_err(|e| ChecksumError::ThreadPool { reason: e.to_string() })?;
            Some(pool)
        };
        Ok(Self {
            config,
            algorithm,
            pool,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Threads a single file is checksummed with; 1 when no pool was started
    pub fn worker_threads(&self) -> usize {
        self.pool.as_ref().map_or(1, |pool| pool.current_num_threads())
    }

    /// CRC32 of the file at `path` as eight lowercase hex digits
    pub fn compute_file_checksum(&self, path: &Path) -> Result<HexDigest, ChecksumError> {
        let (file, size) = open_target(path)?;
        let (_, crc) = self.crc32_of(file, path, size)?;
        Ok(hex::encode(crc, true))
    }

    /// Digest of the file at `path` with the engine's algorithm, plus the
    /// details of how it was computed
    pub fn checksum_file(&self, path: &Path) -> Result<FileChecksum, ChecksumError> {
        let (file, size) = open_target(path)?;
        let (strategy, digest) = match self.algorithm {
            Algorithm::Crc32 => {
                let (strategy, crc) = self.crc32_of(file, path, size)?;
                (strategy, Digest::Crc32(hex::encode(crc, true)))
            }
            Algorithm::Md5 => (Strategy::SingleThread, Digest::Md5(self.md5_of(file, path, size)?)),
        };
        Ok(FileChecksum {
            path: path.to_path_buf(),
            size,
            algorithm: self.algorithm,
            strategy,
            digest,
        })
    }

    /// Checksum every path in order, keeping going past failures
    pub fn checksum_files(&self, paths: &[PathBuf]) -> Vec<ChecksumOutcome> {
        paths
            .iter()
            .map(|path| match self.checksum_file(path) {
                Ok(result) => ChecksumOutcome::Computed(result),
                Err(e) => ChecksumOutcome::Failed {
                    path: path.clone(),
                    error: e.kind_label(),
                    message: e.to_string(),
                },
            })
            .collect()
    }

    fn crc32_of(&self, file: File, path: &Path, size: u64) -> Result<(Strategy, u32), ChecksumError> {
        let plan = plan::plan(size, self.config.threads, &self.config);
        debug!(
            path = %path.display(),
            size,
            strategy = ?plan.strategy,
            block_size = plan.block_size,
            chunks = plan.chunk_count(),
            "planned checksum"
        );

        let result = match plan.strategy {
            Strategy::SingleThread => reduce_serial(&TieredFileSource::new(file, path), &plan)?,
            Strategy::WholeFileMap(_) => {
                let source = WholeFileSource::open(&file, path, size)?;
                self.run_parallel(&plan, |abort| reduce(&source, 0, size, plan.block_size, abort))?
            }
            Strategy::TieredBlockMap(_) => {
                let source = TieredFileSource::new(file, path);
                self.run_parallel(&plan, |abort| reduce(&source, 0, size, plan.block_size, abort))?
            }
        };
        debug_assert_eq!(result.length, size);
        Ok((plan.strategy, result.crc))
    }

    fn run_parallel<F>(&self, plan: &ChunkPlan, job: F) -> Result<PartialResult, ChecksumError>
    where
        F: FnOnce(&AbortFlag) -> Result<PartialResult, ChecksumError> + Send,
    {
        let abort = AbortFlag::new();
        let result = match &self.pool {
            Some(pool) => pool.install(|| job(&abort)),
            None => job(&abort),
        };
        if result.is_err() {
            debug!(chunks = plan.chunk_count(), "parallel checksum failed");
        }
        result
    }

    fn md5_of(&self, file: File, path: &Path, size: u64) -> Result<[u8; 16], ChecksumError> {
        let plan = plan::plan(size, 1, &self.config);
        let source = TieredFileSource::new(file, path);
        let mut hasher = Md5::new();
        for chunk in plan.chunks() {
            source.with_block(chunk.offset, chunk.length, |bytes| hasher.update(bytes))?;
        }
        let mut out = [0u8; 16];
        out.copy_from_slice(&hasher.finalize());
        Ok(out)
    }
}

/// Resolve the target once: existence, file type and size
fn open_target(path: &Path) -> Result<(File, u64), ChecksumError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ChecksumError::NotFound { path: path.to_path_buf() })
        }
        Err(source) => {
            return Err(ChecksumError::SizeUnavailable {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if !metadata.is_file() {
        return Err(ChecksumError::NotFound { path: path.to_path_buf() });
    }
    let file = File::open(path)
        .map_err(|e| ChecksumError::from_io_error(e, "opening", Some(path.to_path_buf())))?;
    Ok((file, metadata.len()))
}

/// CRC32 of `path` using `threads` workers (0 = all cores, 1 = serial)
pub fn compute_file_checksum(path: &Path, threads: u32) -> Result<HexDigest, ChecksumError> {
    ChecksumEngine::new(EngineConfig::with_threads(threads))?.compute_file_checksum(path)
}
