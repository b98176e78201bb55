use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use filetime::FileTime;

use crate::error::CopyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    pub destination: PathBuf,
}

impl CopyOutcome {
    /// Status line for the user, e.g. "Saved to shot.jpg".
    pub fn message(&self) -> String {
        let name = self
            .destination
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        format!("Saved to {}", name)
    }
}

/// Copy `source` into `output_dir` under its own file name.
///
/// An existing file is never replaced: the copy gets a `_<unix seconds>` suffix
/// before the extension instead. Content, permissions and timestamps carry over.
pub fn copy_to_output(source: &Path, output_dir: &Path) -> Result<CopyOutcome, CopyError> {
    if output_dir.as_os_str().is_empty() || !output_dir.is_dir() {
        return Err(CopyError::MissingOutputDir);
    }
    let file_name = source
        .file_name()
        .ok_or_else(|| CopyError::NoFileName(source.to_path_buf()))?;

    let mut destination = output_dir.join(file_name);
    if destination.exists() {
        destination = timestamped_destination(output_dir, Path::new(file_name), unix_now());
    }

    copy_preserving_metadata(source, &destination)?;
    log::info!("Copied {} -> {}", source.display(), destination.display());
    Ok(CopyOutcome { destination })
}

/// First free name of the form `stem_<secs>.ext`, then `stem_<secs>_1.ext`, ...
fn timestamped_destination(output_dir: &Path, file_name: &Path, secs: u64) -> PathBuf {
    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = file_name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let candidate = output_dir.join(format!("{stem}_{secs}{ext}"));
    if !candidate.exists() {
        return candidate;
    }
    (1u32..)
        .map(|n| output_dir.join(format!("{stem}_{secs}_{n}{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Copy into a file that must not exist yet, then restore the source's
/// permissions and access/modification times on it.
///
/// A failed copy removes the partial destination. Once the content is in
/// place the copy counts as done; metadata problems are only logged.
fn copy_preserving_metadata(src: &Path, dst: &Path) -> std::io::Result<()> {
    let mut reader = std::fs::File::open(src)?;
    let metadata = reader.metadata()?;

    let mut writer = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dst)?;
    if let Err(e) = std::io::copy(&mut reader, &mut writer) {
        drop(writer);
        if let Err(cleanup) = std::fs::remove_file(dst) {
            log::warn!("Failed to remove partial copy {}: {}", dst.display(), cleanup);
        }
        return Err(e);
    }
    drop(writer);

    restore_metadata(dst, &metadata);
    Ok(())
}

fn restore_metadata(dst: &Path, metadata: &std::fs::Metadata) {
    if let Err(e) = std::fs::set_permissions(dst, metadata.permissions()) {
        log::warn!("Failed to restore permissions on {}: {}", dst.display(), e);
    }
    let mtime = FileTime::from_last_modification_time(metadata);
    let atime = FileTime::from_last_access_time(metadata);
    if let Err(e) = filetime::set_file_times(dst, atime, mtime) {
        log::warn!("Failed to restore timestamps on {}: {}", dst.display(), e);
    }
}
