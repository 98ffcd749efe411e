// Engine configuration
// Named thresholds for the chunk planner, loadable from a TOML file

use std::fs;
use std::path::Path;

use super::error::ChecksumError;

/// Chunk size for the serial path: 20 pages, a good sequential read unit
pub const SERIAL_BLOCK_SIZE: u64 = 20 * 4096;

/// Files above this size (~3.9 GiB) are mapped one block at a time instead
/// of whole, to stay under the single-mapping limit of some platforms
pub const LARGE_FILE_LIMIT: u64 = 4_187_593_000;

/// Smallest block handed to a parallel task
pub const MIN_PARALLEL_BLOCK: u64 = 64 * 1024;

/// Upper bound on the resolved thread count (and so on the reducer's chain depth)
pub const MAX_THREADS: u32 = 1024;

/// Configuration for [`ChecksumEngine`](super::engine::ChecksumEngine)
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Requested threads: 0 = all cores, 1 = serial scan
    pub threads: u32,
    pub serial_block_size: u64,
    pub large_file_limit: u64,
    pub min_parallel_block: u64,
    pub max_threads: u32,
    /// Write manifest digests in uppercase
    pub uppercase: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            serial_block_size: SERIAL_BLOCK_SIZE,
            large_file_limit: LARGE_FILE_LIMIT,
            min_parallel_block: MIN_PARALLEL_BLOCK,
            max_threads: MAX_THREADS,
            uppercase: false,
        }
    }
}

impl EngineConfig {
    /// Default configuration with a requested thread count
    pub fn with_threads(threads: u32) -> Self {
        Self {
            threads,
            ..Self::default()
        }
    }

    /// Load from a TOML file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self, ChecksumError> {
        let text = fs::read_to_string(path).map_err(|e| {
            ChecksumError::from_io_error(e, "reading config", Some(path.to_path_buf()))
        })?;
        let config: EngineConfig = toml::from_str(&text).map_err(|e| ChecksumError::InvalidConfig {
            reason: format!("{}: {}", path.display(), e.message()),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ChecksumError> {
        let zero = [
            ("serial_block_size", self.serial_block_size == 0),
            ("min_parallel_block", self.min_parallel_block == 0),
            ("large_file_limit", self.large_file_limit == 0),
            ("max_threads", self.max_threads == 0),
        ];
        match zero.iter().find(|(_, is_zero)| *is_zero) {
            Some((key, _)) => Err(ChecksumError::InvalidConfig {
                reason: format!("{} must be greater than zero", key),
            }),
            None => Ok(()),
        }
    }
}
