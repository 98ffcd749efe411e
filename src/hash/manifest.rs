// Manifest format handler module
// Reads and writes SFV (`name CRC32`) and md5sum (`hash *name`) files

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::crc::Algorithm;
use super::error::ChecksumError;

/// Manifest line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ManifestFormat {
    /// `<path> <8 hex digits>`, `;` comments
    Sfv,
    /// `<32 hex digits> *<path>`, `#` comments
    Md5,
}

impl ManifestFormat {
    /// Pick the format from the manifest's extension; anything but `.md5` is SFV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("md5") => ManifestFormat::Md5,
            _ => ManifestFormat::Sfv,
        }
    }

    /// Format named by a `.sfv` or `.md5` extension, if any
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("sfv") => Some(ManifestFormat::Sfv),
            Some(ext) if ext.eq_ignore_ascii_case("md5") => Some(ManifestFormat::Md5),
            _ => None,
        }
    }

    pub fn for_algorithm(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Crc32 => ManifestFormat::Sfv,
            Algorithm::Md5 => ManifestFormat::Md5,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            ManifestFormat::Sfv => Algorithm::Crc32,
            ManifestFormat::Md5 => Algorithm::Md5,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ManifestFormat::Sfv => "sfv",
            ManifestFormat::Md5 => "md5",
        }
    }

    fn comment_prefix(&self) -> char {
        match self {
            ManifestFormat::Sfv => ';',
            ManifestFormat::Md5 => '#',
        }
    }

    fn digest_len(&self) -> usize {
        match self {
            ManifestFormat::Sfv => 8,
            ManifestFormat::Md5 => 32,
        }
    }
}

/// One manifest line
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ManifestEntry {
    /// Path as written in the manifest
    pub path: String,
    pub digest: String,
}

/// Handler for reading and writing manifest files
pub struct ManifestHandler;

impl ManifestHandler {
    /// Parse one line; comments and blank lines give `Ok(None)`
    pub fn parse_line(line: &str, format: ManifestFormat) -> Result<Option<ManifestEntry>, String> {
        let trimmed = line.trim_end_matches(['\r', '\n']).trim();
        if trimmed.is_empty() || trimmed.starts_with(format.comment_prefix()) {
            return Ok(None);
        }

        let (path, digest) = match format {
            ManifestFormat::Sfv => {
                let (path, digest) = trimmed
                    .rsplit_once(char::is_whitespace)
                    .ok_or_else(|| "expected '<file> <crc32>'".to_string())?;
                (path.trim_end(), digest)
            }
            ManifestFormat::Md5 => {
                let (digest, rest) = trimmed
                    .split_once(' ')
                    .ok_or_else(|| "expected '<md5> *<file>'".to_string())?;
                let path = rest.strip_prefix(['*', ' ']).unwrap_or(rest);
                (path, digest)
            }
        };

        if path.is_empty() {
            return Err("missing file name".to_string());
        }
        if digest.len() != format.digest_len() || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!(
                "'{}' is not a {}-digit hex {} digest",
                digest,
                format.digest_len(),
                format.algorithm().name()
            ));
        }

        Ok(Some(ManifestEntry {
            path: path.to_string(),
            digest: digest.to_string(),
        }))
    }

    /// Read every entry of a manifest
    pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>, ChecksumError> {
        if !path.is_file() {
            return Err(ChecksumError::ManifestNotFound { path: path.to_path_buf() });
        }
        let format = ManifestFormat::from_path(path);
        let file = File::open(path).map_err(|e| {
            ChecksumError::from_io_error(e, "opening manifest", Some(path.to_path_buf()))
        })?;

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                ChecksumError::from_io_error(e, "reading manifest", Some(path.to_path_buf()))
            })?;
            match Self::parse_line(&line, format) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(reason) => {
                    return Err(ChecksumError::ManifestParseError {
                        path: path.to_path_buf(),
                        line: index + 1,
                        reason,
                    })
                }
            }
        }
        Ok(entries)
    }

    /// Write the "generated by" comment line
    pub fn write_header(writer: &mut impl Write, format: ManifestFormat) -> io::Result<()> {
        let now = chrono::Local::now();
        writeln!(
            writer,
            "{} Generated by sfvcrc v{} on {}",
            format.comment_prefix(),
            env!("CARGO_PKG_VERSION"),
            now.format("%Y-%m-%d at %H:%M.%S")
        )
    }

    /// Write a single entry in the manifest's line format
    pub fn write_entry(writer: &mut impl Write, format: ManifestFormat, entry: &ManifestEntry) -> io::Result<()> {
        match format {
            ManifestFormat::Sfv => writeln!(writer, "{} {}", entry.path, entry.digest),
            ManifestFormat::Md5 => writeln!(writer, "{} *{}", entry.digest, entry.path),
        }
    }

    /// Create (or replace) a manifest file with a header and `entries`
    pub fn write_manifest(path: &Path, format: ManifestFormat, entries: &[ManifestEntry]) -> Result<(), ChecksumError> {
        let write_error = |e: io::Error| ChecksumError::ManifestWriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        let file = File::create(path).map_err(write_error)?;
        let mut writer = BufWriter::new(file);
        Self::write_header(&mut writer, format).map_err(write_error)?;
        for entry in entries {
            Self::write_entry(&mut writer, format, entry).map_err(write_error)?;
        }
        writer.flush().map_err(write_error)
    }
}
