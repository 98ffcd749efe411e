// Tests for manifest creation

use std::fs;

use sfvcrc::hash::{
    crc32, Algorithm, ChecksumError, EngineConfig, ManifestHandler, ScanEngine,
};
use tempfile::TempDir;

use crate::{create_test_file, pattern};

#[test]
fn test_scan_directory_default_output() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("release");
    create_test_file(&target.join("b.bin"), b"world");
    create_test_file(&target.join("a.bin"), b"hello");
    create_test_file(&target.join("sub/c.bin"), b"123456789");

    let report = ScanEngine::new(EngineConfig::default()).scan(&target).unwrap();

    assert_eq!(report.output, dir.path().join("release.sfv"));
    assert_eq!(report.files_processed, 3);
    assert_eq!(report.total_bytes, 19);

    let entries = ManifestHandler::read_manifest(&report.output).unwrap();
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["release/a.bin", "release/b.bin", "release/sub/c.bin"]);
    assert_eq!(entries[2].digest, "cbf43926");
    assert_eq!(entries[0].digest, format!("{:08x}", crc32(b"hello", 0)));
}

#[test]
fn test_scan_single_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("movie.mkv");
    let data = pattern(150_000, 5);
    create_test_file(&target, &data);

    let report = ScanEngine::new(EngineConfig::with_threads(2)).scan(&target).unwrap();

    assert_eq!(report.output, dir.path().join("movie.sfv"));
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].path, "movie.mkv");
    assert_eq!(report.entries[0].digest, format!("{:08x}", crc32(&data, 0)));
}

#[test]
fn test_output_inside_target_is_skipped() {
    let dir = TempDir::new().unwrap();
    create_test_file(&dir.path().join("a.bin"), b"a");
    let output = dir.path().join("all.sfv");

    let engine = ScanEngine::new(EngineConfig::default()).with_output(Some(output.clone()));
    engine.scan(dir.path()).unwrap();
    // Rescan with the manifest now present in the tree
    let report = engine.scan(dir.path()).unwrap();

    assert_eq!(report.files_processed, 1);
    assert_eq!(report.entries[0].path, "a.bin");
}

#[test]
fn test_uppercase_digests() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("check.txt");
    create_test_file(&target, b"123456789");

    let config = EngineConfig {
        uppercase: true,
        ..EngineConfig::default()
    };
    let report = ScanEngine::new(config).scan(&target).unwrap();
    assert_eq!(report.entries[0].digest, "CBF43926");
}

#[test]
fn test_md5_manifest() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("data");
    create_test_file(&target.join("abc.txt"), b"abc");

    let report = ScanEngine::new(EngineConfig::default())
        .with_algorithm(Algorithm::Md5)
        .scan(&target)
        .unwrap();

    assert_eq!(report.output, dir.path().join("data.md5"));
    let text = fs::read_to_string(&report.output).unwrap();
    assert!(text.contains("900150983cd24fb0d6963f7d28e17f72 *data/abc.txt"));
}

#[test]
fn test_md5_algorithm_wins_over_plain_output_extension() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("data");
    create_test_file(&target.join("abc.txt"), b"abc");
    let output = dir.path().join("sums.txt");

    let report = ScanEngine::new(EngineConfig::default())
        .with_algorithm(Algorithm::Md5)
        .with_output(Some(output.clone()))
        .scan(&target)
        .unwrap();

    assert_eq!(report.output, output);
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("# Generated by sfvcrc"));
    assert!(text.contains("900150983cd24fb0d6963f7d28e17f72 *data/abc.txt"));
}

#[test]
fn test_output_extension_picks_format_without_algorithm() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("data");
    create_test_file(&target.join("abc.txt"), b"abc");
    let output = dir.path().join("sums.md5");

    ScanEngine::new(EngineConfig::default())
        .with_output(Some(output.clone()))
        .scan(&target)
        .unwrap();

    let entries = ManifestHandler::read_manifest(&output).unwrap();
    assert_eq!(entries[0].digest, "900150983cd24fb0d6963f7d28e17f72");
}

#[test]
fn test_conflicting_output_extension_rejected() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("data");
    create_test_file(&target.join("abc.txt"), b"abc");
    let output = dir.path().join("sums.sfv");

    let err = ScanEngine::new(EngineConfig::default())
        .with_algorithm(Algorithm::Md5)
        .with_output(Some(output.clone()))
        .scan(&target)
        .unwrap_err();

    assert!(matches!(err, ChecksumError::InvalidConfig { .. }));
    assert!(!output.exists());
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("empty");
    fs::create_dir(&target).unwrap();

    let err = ScanEngine::new(EngineConfig::default()).scan(&target).unwrap_err();
    assert!(matches!(err, ChecksumError::EmptyTarget { .. }));
    assert!(!dir.path().join("empty.sfv").exists());
}

#[test]
fn test_missing_target() {
    let dir = TempDir::new().unwrap();
    let err = ScanEngine::new(EngineConfig::default())
        .scan(&dir.path().join("gone"))
        .unwrap_err();
    assert!(matches!(err, ChecksumError::NotFound { .. }));
}
