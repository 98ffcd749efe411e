// Centralized error handling module
// Error types for checksum computation and manifest handling

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for checksum and manifest operations
#[derive(Debug)]
pub enum ChecksumError {
    /// Path is missing or is not a regular file
    NotFound { path: PathBuf },
    /// File size metadata could not be read
    SizeUnavailable { path: PathBuf, source: io::Error },
    /// A memory-map request for one chunk failed
    MapFailure { path: PathBuf, offset: u64, length: u64, source: io::Error },
    /// A reducer call skipped its work because a sibling chunk already failed
    Aborted,
    IoError { path: Option<PathBuf>, operation: String, source: io::Error },

    /// Manifest errors
    ManifestNotFound { path: PathBuf },
    ManifestParseError { path: PathBuf, line: usize, reason: String },
    ManifestWriteError { path: PathBuf, reason: String },
    EmptyTarget { path: PathBuf },

    /// Setup errors
    InvalidConfig { reason: String },
    ThreadPool { reason: String },
}

impl fmt::Display for ChecksumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChecksumError::NotFound { path } => {
                writeln!(f, "File doesn't exist or is not a regular file: {}", path.display())?;
                write!(f, "Suggestion: Check that the path is correct and points to a file")
            }
            ChecksumError::SizeUnavailable { path, source } => {
                writeln!(f, "Can't get file size of {}: {}", path.display(), source)?;
                write!(f, "Suggestion: Check file permissions")
            }
            ChecksumError::MapFailure { path, offset, length, source } => {
                writeln!(
                    f,
                    "Failed to memory map {} bytes at offset {} of {}: {}",
                    length,
                    offset,
                    path.display(),
                    source
                )?;
                write!(f, "Suggestion: Check that the file is not being truncated, or retry with fewer threads")
            }
            ChecksumError::Aborted => {
                write!(f, "Checksum computation aborted after another chunk failed")
            }
            ChecksumError::IoError { path, operation, source } => {
                if let Some(p) = path {
                    writeln!(f, "I/O error while {} {}: {}", operation, p.display(), source)?;
                } else {
                    writeln!(f, "I/O error while {}: {}", operation, source)?;
                }
                write!(f, "Suggestion: Check file permissions and disk space")
            }

            ChecksumError::ManifestNotFound { path } => {
                writeln!(f, "Manifest file not found: {}", path.display())?;
                write!(f, "Suggestion: Create one first using the 'create' command")
            }
            ChecksumError::ManifestParseError { path, line, reason } => {
                writeln!(f, "Error parsing manifest {} at line {}: {}", path.display(), line, reason)?;
                write!(f, "Suggestion: Check that each line has the form 'filename CRC32'")
            }
            ChecksumError::ManifestWriteError { path, reason } => {
                writeln!(f, "Failed to write manifest {}: {}", path.display(), reason)?;
                write!(f, "Suggestion: Check disk space and write permissions")
            }
            ChecksumError::EmptyTarget { path } => {
                writeln!(f, "No files to checksum under {}", path.display())?;
                write!(f, "Suggestion: Point the command at a file or a non-empty directory")
            }

            ChecksumError::InvalidConfig { reason } => {
                writeln!(f, "Invalid configuration: {}", reason)?;
                write!(f, "Suggestion: Run with --help to see the accepted values")
            }
            ChecksumError::ThreadPool { reason } => {
                writeln!(f, "Failed to start worker threads: {}", reason)?;
                write!(f, "Suggestion: Retry with a smaller --threads value")
            }
        }
    }
}

impl std::error::Error for ChecksumError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChecksumError::SizeUnavailable { source, .. }
            | ChecksumError::MapFailure { source, .. }
            | ChecksumError::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ChecksumError {
    /// Create an error with context about the operation and optional path
    pub fn from_io_error(err: io::Error, operation: &str, path: Option<PathBuf>) -> Self {
        match (err.kind(), path) {
            (io::ErrorKind::NotFound, Some(path)) => ChecksumError::NotFound { path },
            (_, path) => ChecksumError::IoError {
                path,
                operation: operation.to_string(),
                source: err,
            },
        }
    }

    /// Short label used in per-file report lines
    pub fn kind_label(&self) -> &'static str {
        match self {
            ChecksumError::NotFound { .. } => "file missing",
            ChecksumError::SizeUnavailable { .. } => "size unreadable",
            ChecksumError::MapFailure { .. } | ChecksumError::Aborted => "mapping failed",
            ChecksumError::IoError { .. } => "I/O error",
            ChecksumError::ManifestNotFound { .. }
            | ChecksumError::ManifestParseError { .. }
            | ChecksumError::ManifestWriteError { .. } => "manifest error",
            ChecksumError::EmptyTarget { .. } => "nothing to checksum",
            ChecksumError::InvalidConfig { .. } | ChecksumError::ThreadPool { .. } => "setup error",
        }
    }
}

impl From<io::Error> for ChecksumError {
    fn from(err: io::Error) -> Self {
        ChecksumError::from_io_error(err, "unknown operation", None)
    }
}
