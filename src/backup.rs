use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Copy every regular file in `source` into `dest`. Returns the number copied.
fn copy_files(source: &Path, dest: &Path) -> Result<usize> {
    let mut copied = 0;
    let entries = fs::read_dir(source)
        .with_context(|| format!("Failed to read directory {}", source.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", source.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let target = dest.join(entry.file_name());
        fs::copy(&path, &target).with_context(|| {
            format!("Failed to copy {} to {}", path.display(), target.display())
        })?;
        debug!(file = %path.display(), "copied");
        copied += 1;
    }

    Ok(copied)
}

/// Snapshot the data directory into `<backup_dir>/backup_<YYYYmmdd_HHMMSS>/`.
pub fn create_backup(data_dir: &Path, backup_dir: &Path) -> Result<PathBuf> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = backup_dir.join(format!("backup_{}", stamp));

    if backup_path.exists() {
        anyhow::bail!("Backup already exists at {}", backup_path.display());
    }
    fs::create_dir_all(&backup_path)
        .with_context(|| format!("Failed to create backup directory at {}", backup_path.display()))?;

    copy_files(data_dir, &backup_path)?;
    Ok(backup_path)
}

/// Copy a backup's files back over the data directory, overwriting them.
/// Files in the data directory that the backup lacks are left alone.
pub fn restore_backup(backup_path: &Path, data_dir: &Path) -> Result<usize> {
    if !backup_path.is_dir() {
        anyhow::bail!("Backup not found at {}", backup_path.display());
    }
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory at {}", data_dir.display()))?;

    copy_files(backup_path, data_dir)
}
