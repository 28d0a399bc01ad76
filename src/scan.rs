//! Generate prototype entries from filesystem paths.
//!
//! This backs the `gen` subcommand: point it at files or directories and it
//! produces one [`Record`] per node, the way `pkgproto(1)` does.

use std::io;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::error::ProtoError;
use crate::meta::{Defaults, FileMetadataProvider};
use crate::record::Record;

/// Build records for `inputs`, recursing into directories when `recursive`
/// is set.
///
/// With `recursive` off, a directory input yields a single `d` entry for the
/// directory itself. Entries are emitted in filename order within each
/// directory so output is stable across runs. Any unreadable node or node the
/// format cannot express aborts the scan with the corresponding error.
pub fn scan_paths<M>(
    provider: &M,
    inputs: &[PathBuf],
    recursive: bool,
    defaults: &Defaults,
) -> Result<Vec<Record>, ProtoError>
where
    M: FileMetadataProvider + ?Sized,
{
    let mut records = Vec::new();
    for path in inputs {
        if recursive && path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(walk_error)?;
                records.push(Record::from_path(provider, entry.path(), None, defaults)?);
            }
        } else {
            records.push(Record::from_path(provider, path, None, defaults)?);
        }
    }
    tracing::debug!(count = records.len(), "scanned prototype entries");
    Ok(records)
}

fn walk_error(err: walkdir::Error) -> ProtoError {
    let path = err
        .path()
        .map(PathBuf::from)
        .unwrap_or_default();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop detected"));
    ProtoError::io(source, path)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::fsx::OsMetadata;
    use std::fs;

    #[test]
    fn scan_recursive_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("bin")).unwrap();
        fs::write(dir.path().join("bin/run"), b"#!/bin/sh\n").unwrap();
        fs::write(dir.path().join("README"), b"hello\n").unwrap();

        let records = scan_paths(
            &OsMetadata,
            &[dir.path().to_path_buf()],
            true,
            &Defaults::default(),
        )
        .unwrap();

        // Root dir, README, bin, bin/run.
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.is_valid()));
        let tags: Vec<char> = records.iter().map(|r| r.tag()).collect();
        assert_eq!(tags.iter().filter(|t| **t == 'd').count(), 2);
        assert_eq!(tags.iter().filter(|t| **t == 'f').count(), 2);
    }

    #[test]
    fn scan_directory_without_recursion_yields_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("inner"), b"x").unwrap();

        let records = scan_paths(
            &OsMetadata,
            &[dir.path().to_path_buf()],
            false,
            &Defaults::default(),
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tag(), 'd');
    }

    #[test]
    fn scan_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("conf");
        fs::write(&file, b"x").unwrap();

        let defaults = Defaults {
            install_class: "build".to_string(),
            part: Some("2".to_string()),
        };
        let records = scan_paths(&OsMetadata, &[file], false, &defaults).unwrap();
        assert_eq!(records[0].install_class(), Some("build"));
        assert_eq!(records[0].part.as_deref(), Some("2"));
    }
}
