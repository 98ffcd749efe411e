// Verification module
// Recomputes every file listed in a manifest and compares digests

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use super::config::EngineConfig;
use super::crc::Algorithm;
use super::console::{Console, LogType};
use super::engine::ChecksumEngine;
use super::error::ChecksumError;
use super::manifest::{ManifestFormat, ManifestHandler};
use super::path_utils;

/// Represents a digest mismatch between expected and actual values
#[derive(Debug, Clone, serde::Serialize)]
pub struct Mismatch {
    pub path: PathBuf,
    pub expected: String,
    pub actual: String,
}

/// A listed file that could not be checksummed
#[derive(Debug, Clone, serde::Serialize)]
pub struct Unreadable {
    pub path: PathBuf,
    pub expected: String,
    pub reason: String,
}

/// Report of verification results
#[derive(Debug, serde::Serialize)]
pub struct VerifyReport {
    pub manifest: PathBuf,
    pub algorithm: Algorithm,
    pub passed: usize,
    pub mismatches: Vec<Mismatch>,
    pub unreadable: Vec<Unreadable>,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
}

// Helper function to serialize Duration as seconds
fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

impl VerifyReport {
    pub fn total(&self) -> usize {
        self.passed + self.failed()
    }

    pub fn failed(&self) -> usize {
        self.mismatches.len() + self.unreadable.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// One line per failure, in the wording of the per-file `[Failed]` lines
    pub fn failure_lines(&self) -> Vec<String> {
        let mismatches = self
            .mismatches
            .iter()
            .map(|m| mismatch_line(&m.path.display().to_string(), self.algorithm, &m.expected, &m.actual));
        let unreadable = self
            .unreadable
            .iter()
            .map(|u| format!("{} - {}. Original: {}", u.path.display(), u.reason, u.expected));
        mismatches.chain(unreadable).collect()
    }

    /// Print the closing summary
    pub fn display(&self, console: &Console) {
        if self.is_success() {
            console.log(LogType::CompletedPerfect, &self.total().to_string());
            return;
        }
        console.log(
            LogType::Completed,
            &format!(
                "Completed with {} passes and {} fails.",
                self.passed,
                self.failed()
            ),
        );
        for line in self.failure_lines() {
            console.log_final(LogType::Failed, &line);
        }
    }
}

fn mismatch_line(path: &str, algorithm: Algorithm, expected: &str, actual: &str) -> String {
    format!(
        "{} - {} mismatch. Original: {} New: {}",
        path,
        algorithm.name().to_uppercase(),
        expected,
        actual
    )
}

/// Engine for checking files against a manifest
pub struct VerifyEngine {
    config: EngineConfig,
    console: Console,
    show_progress: bool,
}

impl VerifyEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            console: Console::silent(),
            show_progress: false,
        }
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Show a progress bar when stdout is a terminal
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Verify every entry of `manifest`.
    ///
    /// Entry paths are resolved against the manifest's own directory. The
    /// algorithm follows the manifest format (`.md5` → MD5, otherwise CRC32).
    pub fn verify(&self, manifest: &Path) -> Result<VerifyReport, ChecksumError> {
        let start = Instant::now();
        let format = ManifestFormat::from_path(manifest);
        let entries = ManifestHandler::read_manifest(manifest)?;
        let engine = ChecksumEngine::with_algorithm(self.config.clone(), format.algorithm())?;
        let base_dir = path_utils::manifest_dir(manifest);
        debug!(manifest = %manifest.display(), entries = entries.len(), ?format, "verifying manifest");

        let pb = self.progress_bar(entries.len() as u64);
        let mut report = VerifyReport {
            manifest: manifest.to_path_buf(),
            algorithm: format.algorithm(),
            passed: 0,
            mismatches: Vec::new(),
            unreadable: Vec::new(),
            duration: Duration::ZERO,
        };

        // Keep per-file lines from tearing the progress bar
        let log = |kind: LogType, message: &str| pb.suspend(|| self.console.log(kind, message));

        for entry in &entries {
            let listed = path_utils::parse_manifest_path(&entry.path);
            let target = path_utils::resolve_entry(&base_dir, &listed);
            pb.set_message(entry.path.clone());

            match engine.checksum_file(&target) {
                Ok(result) if result.digest.matches(&entry.digest) => {
                    report.passed += 1;
                    log(LogType::Passed, &entry.path);
                }
                Ok(result) => {
                    let actual = result.digest.to_string();
                    log(
                        LogType::Failed,
                        &mismatch_line(&entry.path, format.algorithm(), &entry.digest, &actual),
                    );
                    report.mismatches.push(Mismatch {
                        path: listed,
                        expected: entry.digest.clone(),
                        actual,
                    });
                }
                Err(e) => {
                    debug!(path = %target.display(), "cannot checksum listed file: {}", e);
                    log(LogType::Failed, &format!("{} - {}", entry.path, e.kind_label()));
                    report.unreadable.push(Unreadable {
                        path: listed,
                        expected: entry.digest.clone(),
                        reason: e.kind_label().to_string(),
                    });
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        report.duration = start.elapsed();
        report.display(&self.console);
        Ok(report)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        let visible = self.show_progress
            && !self.console.is_silent()
            && !self.console.final_results_only()
            && std::io::stdout().is_terminal();
        if !visible {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files | {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb
    }
}
