// Tests for manifest verification

use std::fs;
use std::io;
use std::sync::{Arc, Mutex};

use sfvcrc::hash::{EngineConfig, ScanEngine, VerifyEngine};
use tempfile::TempDir;

use crate::{create_test_file, pattern};

/// Two files plus a manifest next to them
fn setup() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    create_test_file(&dir.path().join("file1.txt"), b"hello");
    create_test_file(&dir.path().join("nested/file2.bin"), &pattern(200_000, 9));
    let manifest = dir.path().join("check.sfv");
    ScanEngine::new(EngineConfig::default())
        .with_output(Some(manifest.clone()))
        .scan(dir.path())
        .unwrap();
    (dir, manifest)
}

#[test]
fn test_verify_all_pass() {
    let (_dir, manifest) = setup();

    for threads in [0, 1, 4] {
        let report = VerifyEngine::new(EngineConfig::with_threads(threads))
            .verify(&manifest)
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.passed, 2);
        assert_eq!(report.total(), 2);
    }
}

#[test]
fn test_verify_detects_modification() {
    let (dir, manifest) = setup();
    fs::write(dir.path().join("file1.txt"), b"HELLO").unwrap();

    let report = VerifyEngine::new(EngineConfig::default()).verify(&manifest).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.passed, 1);
    assert_eq!(report.mismatches.len(), 1);
    let mismatch = &report.mismatches[0];
    assert_eq!(mismatch.path, std::path::PathBuf::from("file1.txt"));
    assert_ne!(mismatch.actual, mismatch.expected);

    let lines = report.failure_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("file1.txt - CRC32 mismatch. Original: "));
}

#[test]
fn test_verify_missing_file_counts_as_failure() {
    let (dir, manifest) = setup();
    fs::remove_file(dir.path().join("nested/file2.bin")).unwrap();

    let report = VerifyEngine::new(EngineConfig::default()).verify(&manifest).unwrap();

    assert_eq!(report.passed, 1);
    assert_eq!(report.unreadable.len(), 1);
    assert_eq!(report.unreadable[0].reason, "file missing");
    assert_eq!(report.failed(), 1);
}

#[test]
fn test_verify_uppercase_and_backslash_entries() {
    let dir = TempDir::new().unwrap();
    create_test_file(&dir.path().join("sub/check.txt"), b"123456789");
    let manifest = dir.path().join("win.sfv");
    fs::write(&manifest, "; made elsewhere\r\nsub\\check.txt CBF43926\r\n").unwrap();

    let report = VerifyEngine::new(EngineConfig::default()).verify(&manifest).unwrap();
    assert!(report.is_success());
}

#[test]
fn test_verify_md5_manifest() {
    let dir = TempDir::new().unwrap();
    create_test_file(&dir.path().join("abc.txt"), b"abc");
    let manifest = dir.path().join("sums.md5");
    fs::write(&manifest, "900150983CD24FB0D6963F7D28E17F72 *abc.txt\n").unwrap();

    let report = VerifyEngine::new(EngineConfig::default()).verify(&manifest).unwrap();
    assert!(report.is_success());
}

#[test]
fn test_verify_report_serializes() {
    let (_dir, manifest) = setup();
    let report = VerifyEngine::new(EngineConfig::default()).verify(&manifest).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["passed"], 2);
    assert_eq!(json["algorithm"], "crc32");
}

/// Collects formatted log output in memory
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_missing_file_reported_once() {
    let dir = TempDir::new().unwrap();
    create_test_file(&dir.path().join("here.txt"), b"123456789");
    let manifest = dir.path().join("list.sfv");
    fs::write(&manifest, "here.txt cbf43926\ngone.txt 00000000\n").unwrap();

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let report = tracing::subscriber::with_default(subscriber, || {
        VerifyEngine::new(EngineConfig::with_threads(1))
            .verify(&manifest)
            .unwrap()
    });

    assert_eq!(report.unreadable.len(), 1);
    assert_eq!(report.unreadable[0].reason, "file missing");
    // The per-file [Failed] line is the only report; nothing at warn level
    assert!(log.0.lock().unwrap().is_empty());
}
