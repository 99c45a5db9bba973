use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::types::{Editor, Level, ListEntry, RankedLevel};

/// Ordered list of level file stems
pub const LIST_FILE: &str = "_list.json";
pub const EDITORS_FILE: &str = "_editors.json";
pub const REQUIREMENTS_FILE: &str = "_requirements.json";

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}: invalid JSON", path.display()))
}

/// Read a JSON file that may legitimately be absent.
pub(crate) fn read_optional_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        debug!(path = %path.display(), "optional data file not present");
        return Ok(None);
    }
    read_json(path).map(Some)
}

/// Write `value` as 4-space indented JSON, replacing `path` atomically.
///
/// Creates the parent directory if it doesn't exist.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory at {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    let mut serializer =
        serde_json::Serializer::with_formatter(&mut file, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;

    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;
    debug!(path = %path.display(), "saved");

    Ok(())
}

pub fn level_path(data_dir: &Path, stem: &str) -> PathBuf {
    data_dir.join(format!("{}.json", stem))
}

/// Load a single level file `<stem>.json` from the data directory.
pub fn load_level(data_dir: &Path, stem: &str) -> Result<Level> {
    read_json(&level_path(data_dir, stem))
}

pub fn save_level(data_dir: &Path, stem: &str, level: &Level) -> Result<()> {
    write_json(&level_path(data_dir, stem), level)
}

/// Level file stems in rank order. A missing `_list.json` is an empty list.
pub fn load_stems(data_dir: &Path) -> Result<Vec<String>> {
    Ok(read_optional_json(&data_dir.join(LIST_FILE))?.unwrap_or_default())
}

pub fn save_list(data_dir: &Path, stems: &[String]) -> Result<()> {
    write_json(&data_dir.join(LIST_FILE), stems)
}

/// Load the whole list in rank order.
///
/// Fails only if `_list.json` itself cannot be read. Individual levels that
/// fail to load are returned as [`ListEntry::Failed`] so the rest of the list
/// still renders. Records are sorted by percent, highest first.
pub fn fetch_list(data_dir: &Path) -> Result<Vec<ListEntry>> {
    let stems: Vec<String> = read_json(&data_dir.join(LIST_FILE))?;
    debug!(levels = stems.len(), dir = %data_dir.display(), "loading list");

    let entries = stems
        .into_iter()
        .enumerate()
        .map(|(idx, path)| {
            let rank = idx as u32 + 1;
            match load_level(data_dir, &path) {
                Ok(mut level) => {
                    level
                        .records
                        .sort_by(|a, b| b.percent.total_cmp(&a.percent));
                    ListEntry::Loaded(RankedLevel { rank, path, level })
                }
                Err(e) => {
                    let reason = format!("{:#}", e);
                    warn!(rank, path = %path, %reason, "failed to load level");
                    ListEntry::Failed { rank, path, reason }
                }
            }
        })
        .collect();

    Ok(entries)
}

pub fn fetch_editors(data_dir: &Path) -> Result<Option<Vec<Editor>>> {
    read_optional_json(&data_dir.join(EDITORS_FILE))
}

pub fn fetch_requirements(data_dir: &Path) -> Result<Option<Vec<String>>> {
    read_optional_json(&data_dir.join(REQUIREMENTS_FILE))
}

pub fn save_editors(data_dir: &Path, editors: &[Editor]) -> Result<()> {
    write_json(&data_dir.join(EDITORS_FILE), editors)
}

pub fn save_requirements(data_dir: &Path, requirements: &[String]) -> Result<()> {
    write_json(&data_dir.join(REQUIREMENTS_FILE), requirements)
}
