// Checksum Core Library
// Parallel CRC32 engine plus the manifest tools built on top of it

pub mod config;
pub mod console;
pub mod crc;
pub mod engine;
pub mod error;
pub mod hex;
pub mod manifest;
pub mod mapping;
pub mod path_utils;
pub mod plan;
pub mod reduce;
pub mod scan;
pub mod verify;

// Re-export commonly used types for convenience
pub use config::EngineConfig;
pub use console::{Console, LogType};
pub use crc::{combine, crc32, Algorithm, PartialResult};
pub use engine::{compute_file_checksum, ChecksumEngine, ChecksumOutcome, Digest, FileChecksum};
pub use error::ChecksumError;
pub use hex::{encode, HexDigest};
pub use manifest::{ManifestEntry, ManifestFormat, ManifestHandler};
pub use plan::{plan, Chunk, ChunkPlan, Strategy};
pub use scan::{ScanEngine, ScanReport};
pub use verify::{Mismatch, Unreadable, VerifyEngine, VerifyReport};
