// Path normalization utilities for manifest entries
// Handles both forward and backward slashes in manifest parsing
// Resolves entries against the manifest directory and back

use std::io;
use std::path::{Component, Path, PathBuf};

use super::manifest::ManifestFormat;

/// Normalize a path string by handling both forward and backward slashes
/// Converts all path separators to the platform-specific separator
pub fn normalize_path_string(path_str: &str) -> String {
    if cfg!(windows) {
        path_str.replace('/', "\\")
    } else {
        path_str.replace('\\', "/")
    }
}

/// Parse a path from a manifest entry, handling mixed separators
pub fn parse_manifest_path(path_str: &str) -> PathBuf {
    PathBuf::from(normalize_path_string(path_str))
}

/// Render a path for a manifest line, always with forward slashes
pub fn to_manifest_string(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::RootDir => Some(String::new()),
            Component::Prefix(prefix) => Some(prefix.as_os_str().to_string_lossy().into_owned()),
            Component::CurDir => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Directory that entries of `manifest` are relative to
pub fn manifest_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Resolve a manifest entry against the manifest's directory
/// Absolute entries are used as-is
pub fn resolve_entry(base_dir: &Path, entry: &Path) -> PathBuf {
    if entry.is_absolute() {
        entry.to_path_buf()
    } else {
        base_dir.join(entry)
    }
}

/// Get a path relative to a pre-canonicalized base directory
/// If the path cannot be made relative, returns the canonical path
pub fn get_relative_path_cached(path: &Path, canonical_base: &Path) -> io::Result<PathBuf> {
    let canonical_path = path.canonicalize()?;
    match canonical_path.strip_prefix(canonical_base) {
        Ok(relative) => Ok(relative.to_path_buf()),
        Err(_) => Ok(canonical_path),
    }
}

/// Where the manifest for `target` is written: the target with its
/// extension replaced, so `dir` gives `dir.sfv` and `a.bin` gives `a.sfv`
pub fn default_manifest_path(target: &Path, format: ManifestFormat) -> io::Result<PathBuf> {
    let target = if target.file_name().is_some() {
        target.to_path_buf()
    } else {
        target.canonicalize()?
    };
    Ok(target.with_extension(format.extension()))
}
