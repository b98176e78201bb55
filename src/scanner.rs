use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ScanError;
use crate::formats;

/// Outcome of scanning a folder set. Only stems seen at least twice survive.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub groups: HashMap<String, Vec<PathBuf>>,
    /// Group keys in navigation order.
    pub sorted_keys: Vec<String>,
    /// Every file with a supported extension, including ones left out of `groups`.
    pub total_matched: usize,
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.sorted_keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sorted_keys.len()
    }

    /// Member paths of the group at `index` in navigation order.
    pub fn group_at(&self, index: usize) -> Option<(&str, &[PathBuf])> {
        let key = self.sorted_keys.get(index)?;
        let paths = self.groups.get(key)?;
        Some((key.as_str(), paths.as_slice()))
    }
}

/// Group the supported files of `folders` by lowercased file stem.
///
/// Folders are visited in the given order and each folder's entries in
/// directory-listing order, which fixes the order of paths inside a group.
/// A missing or unreadable folder adds one entry to `errors` and is skipped.
pub fn scan(folders: &[PathBuf]) -> ScanResult {
    let mut by_stem: HashMap<String, Vec<PathBuf>> = HashMap::new();
    let mut total_matched = 0;
    let mut errors = Vec::new();

    for folder in folders {
        if !folder.exists() {
            errors.push(ScanError::NotFound {
                path: folder.clone(),
            });
            continue;
        }

        let entries = match std::fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) => {
                errors.push(ScanError::Unreadable {
                    name: folder_name(folder),
                    message: e.to_string(),
                });
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() || !formats::is_supported(&path) {
                continue;
            }
            let Some(key) = group_key(&path) else {
                continue;
            };
            by_stem.entry(key).or_default().push(path);
            total_matched += 1;
        }
    }

    by_stem.retain(|_, paths| paths.len() >= 2);
    let mut sorted_keys: Vec<String> = by_stem.keys().cloned().collect();
    sorted_keys.sort();

    log::info!(
        "Scanned {} folder(s): {} matching files, {} groups, {} errors",
        folders.len(),
        total_matched,
        sorted_keys.len(),
        errors.len()
    );

    ScanResult {
        groups: by_stem,
        sorted_keys,
        total_matched,
        errors,
    }
}

/// Case-normalized stem shared by all members of a group.
pub fn group_key(path: &Path) -> Option<String> {
    let stem = path.file_stem()?;
    Some(stem.to_string_lossy().to_lowercase())
}

fn folder_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| folder.display().to_string())
}
