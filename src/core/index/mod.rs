//! # Index Module
//!
//! Builds a name-keyed index of the immediate children of a directory.
//!
//! The stem (filename without extension) is the reconciliation key, so
//! the index maps stem -> file record. Hidden files and files without
//! an extension are excluded, matching the `*.*` glob the tool has
//! always used. Subdirectories are not descended into.

use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A single discovered file, immutable once scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Filename without its extension; the reconciliation key
    pub stem: String,
    /// Full path to the file
    pub path: PathBuf,
    /// Whether the entry was a regular file at scan time
    pub is_file: bool,
}

impl FileRecord {
    /// Filename including extension, for log and report lines
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A stem-keyed index over one directory scan.
///
/// Keys are unique; when two files share a stem the later one in scan
/// order wins. Iteration yields records in scan order, which is what
/// makes the reconciliation output stable within one run.
#[derive(Debug, Default)]
pub struct FileIndex {
    records: Vec<FileRecord>,
    by_stem: HashMap<String, usize>,
}

impl FileIndex {
    /// Scan the immediate children of `dir` and build the index.
    pub fn scan(dir: &Path) -> Result<Self, ScanError> {
        Self::scan_with_events(dir, &crate::events::null_sender())
    }

    /// Scan with progress events.
    pub fn scan_with_events(dir: &Path, events: &EventSender) -> Result<Self, ScanError> {
        if !dir.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            path: dir.to_path_buf(),
        }));

        let mut index = FileIndex::default();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                ScanError::ReadDirectory {
                    path,
                    source: e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                }
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            // Only files with an extension participate, per the `*.*` glob
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if path.extension().is_none() {
                continue;
            }

            index.insert(FileRecord {
                stem: stem.to_string(),
                path: path.to_path_buf(),
                is_file: true,
            });
        }

        events.send(Event::Scan(ScanEvent::Completed {
            path: dir.to_path_buf(),
            total_files: index.len(),
        }));

        Ok(index)
    }

    /// Insert a record, replacing any previous record with the same stem.
    ///
    /// Collisions are legal but suspicious, so each one is logged with
    /// both paths before the newer record wins.
    fn insert(&mut self, record: FileRecord) {
        if let Some(&slot) = self.by_stem.get(&record.stem) {
            tracing::warn!(
                "stem collision on '{}': {} replaces {}",
                record.stem,
                record.path.display(),
                self.records[slot].path.display()
            );
            self.records[slot] = record;
            return;
        }
        self.by_stem.insert(record.stem.clone(), self.records.len());
        self.records.push(record);
    }

    /// Look up a record by stem
    pub fn get(&self, stem: &str) -> Option<&FileRecord> {
        self.by_stem.get(stem).map(|&slot| &self.records[slot])
    }

    /// Whether a stem is present
    pub fn contains(&self, stem: &str) -> bool {
        self.by_stem.contains_key(stem)
    }

    /// Records in scan order
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
