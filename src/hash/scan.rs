// Manifest creation module
// Walks a file or directory, checksums every regular file and writes the manifest

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use jwalk::WalkDir;
use tracing::{debug, warn};

use super::config::EngineConfig;
use super::console::{Console, LogType};
use super::crc::Algorithm;
use super::engine::ChecksumEngine;
use super::error::ChecksumError;
use super::manifest::{ManifestEntry, ManifestFormat, ManifestHandler};
use super::path_utils;

/// Summary of a manifest creation run
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanReport {
    pub output: PathBuf,
    pub files_processed: usize,
    pub total_bytes: u64,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
    pub entries: Vec<ManifestEntry>,
}

// Helper function to serialize Duration as seconds
fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Engine for creating manifests
pub struct ScanEngine {
    config: EngineConfig,
    algorithm: Option<Algorithm>,
    console: Console,
    output: Option<PathBuf>,
    show_progress: bool,
}

impl ScanEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            algorithm: None,
            console: Console::silent(),
            output: None,
            show_progress: false,
        }
    }

    /// Choose the digest; MD5 writes an `.md5` manifest instead of `.sfv`.
    ///
    /// Without an explicit algorithm the output's extension decides, and
    /// CRC32 is the fallback.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Write the manifest here instead of next to the target
    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Checksum `target` (a file, or every file below a directory) and
    /// write the manifest.
    ///
    /// Stops at the first file that cannot be checksummed; nothing is
    /// written in that case.
    pub fn scan(&self, target: &Path) -> Result<ScanReport, ChecksumError> {
        let start = Instant::now();
        if !target.exists() {
            self.console.log(LogType::Critical, &format!("Can't find target : {}", target.display()));
            return Err(ChecksumError::NotFound { path: target.to_path_buf() });
        }

        let format = self.manifest_format()?;
        let output = match &self.output {
            Some(output) => output.clone(),
            None => path_utils::default_manifest_path(target, format).map_err(|e| {
                ChecksumError::from_io_error(e, "resolving manifest path", Some(target.to_path_buf()))
            })?,
        };

        let base_dir = path_utils::manifest_dir(&output);
        let canonical_base = base_dir.canonicalize().map_err(|e| {
            ChecksumError::from_io_error(e, "resolving manifest directory", Some(base_dir.clone()))
        })?;
        let canonical_output = canonical_base.join(output.file_name().unwrap_or_default());

        let files = Self::collect_files(target, &canonical_output)?;
        if files.is_empty() {
            return Err(ChecksumError::EmptyTarget { path: target.to_path_buf() });
        }
        debug!(target = %target.display(), files = files.len(), output = %output.display(), "creating manifest");

        let engine = ChecksumEngine::with_algorithm(self.config.clone(), format.algorithm())?;
        let pb = self.progress_bar(files.len() as u64);
        let log = |kind: LogType, message: &str| pb.suspend(|| self.console.log(kind, message));

        let mut entries = Vec::with_capacity(files.len());
        let mut total_bytes = 0u64;
        for file in &files {
            let result = match engine.checksum_file(file) {
                Ok(result) => result,
                Err(e) => {
                    pb.finish_and_clear();
                    debug!(path = %file.display(), "aborting manifest creation: {}", e);
                    log(LogType::Failed, &format!("{} - {}", file.display(), e.kind_label()));
                    return Err(e);
                }
            };

            let relative = path_utils::get_relative_path_cached(file, &canonical_base)
                .unwrap_or_else(|_| file.clone());
            let entry = ManifestEntry {
                path: path_utils::to_manifest_string(&relative),
                digest: result.digest.with_case(!self.config.uppercase).to_string(),
            };
            log(LogType::Processed, &entry.path);
            total_bytes += result.size;
            entries.push(entry);
            pb.inc(1);
        }
        pb.finish_and_clear();

        ManifestHandler::write_manifest(&output, format, &entries)?;
        self.console.log(LogType::Completed, &format!("File written to {}", output.display()));

        Ok(ScanReport {
            output,
            files_processed: entries.len(),
            total_bytes,
            duration: start.elapsed(),
            entries,
        })
    }

    /// Format of the manifest to write; an explicit algorithm wins over the
    /// output extension unless the extension names the other format
    fn manifest_format(&self) -> Result<ManifestFormat, ChecksumError> {
        let from_extension = self.output.as_deref().and_then(ManifestFormat::from_extension);
        match (self.algorithm, from_extension) {
            (Some(algorithm), Some(named)) if named.algorithm() != algorithm => {
                Err(ChecksumError::InvalidConfig {
                    reason: format!(
                        "a .{} manifest can't hold {} digests",
                        named.extension(),
                        algorithm.name()
                    ),
                })
            }
            (Some(algorithm), _) => Ok(ManifestFormat::for_algorithm(algorithm)),
            (None, Some(named)) => Ok(named),
            (None, None) => Ok(ManifestFormat::Sfv),
        }
    }

    /// Regular files below `target` in sorted order, skipping `exclude`
    fn collect_files(target: &Path, exclude: &Path) -> Result<Vec<PathBuf>, ChecksumError> {
        if target.is_file() {
            return Ok(vec![target.to_path_buf()]);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(target).sort(true).skip_hidden(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("error walking directory: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_output = path
                .canonicalize()
                .map(|canonical| canonical == exclude)
                .unwrap_or(false);
            if !is_output {
                files.push(path);
            }
        }
        Ok(files)
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
