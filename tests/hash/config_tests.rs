// Tests for TOML engine configuration

use std::fs;

use sfvcrc::hash::{ChecksumError, EngineConfig};
use tempfile::TempDir;

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sfvcrc.toml");
    fs::write(&path, "threads = 3\nuppercase = true\n").unwrap();

    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.threads, 3);
    assert!(config.uppercase);
    assert_eq!(config.serial_block_size, EngineConfig::default().serial_block_size);
    assert_eq!(config.large_file_limit, EngineConfig::default().large_file_limit);
}

#[test]
fn test_unknown_key_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sfvcrc.toml");
    fs::write(&path, "thread = 3\n").unwrap();

    assert!(matches!(
        EngineConfig::load(&path),
        Err(ChecksumError::InvalidConfig { .. })
    ));
}

#[test]
fn test_zero_threshold_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sfvcrc.toml");
    fs::write(&path, "min_parallel_block = 0\n").unwrap();

    match EngineConfig::load(&path) {
        Err(ChecksumError::InvalidConfig { reason }) => {
            assert!(reason.contains("min_parallel_block"))
        }
        other => panic!("expected invalid config, got {:?}", other),
    }
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let err = EngineConfig::load(&dir.path().join("none.toml")).unwrap_err();
    assert!(matches!(err, ChecksumError::NotFound { .. }));
}
