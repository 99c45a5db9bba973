use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Per-user display preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub dark: bool,
}

/// Get the default preferences file path (~/.config/gdps-list/preferences.json)
pub fn get_preferences_path() -> Result<PathBuf> {
    Ok(crate::config::get_config_dir()?.join("preferences.json"))
}

/// Load preferences from a JSON file
///
/// If the file doesn't exist, returns the defaults (light mode).
pub fn load_preferences(path: &Path) -> Result<Preferences> {
    if !path.exists() {
        return Ok(Preferences::default());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open preferences file at {}", path.display()))?;

    serde_json::from_reader(file).context("Failed to load preferences")
}

/// Save preferences to a JSON file atomically
///
/// Creates the parent directory if it doesn't exist.
pub fn save_preferences(path: &Path, preferences: &Preferences) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory at {}", parent.display())
            })?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, preferences)
        .context("Failed to serialize preferences")?;

    file.commit().context("Failed to save preferences")?;

    Ok(())
}
