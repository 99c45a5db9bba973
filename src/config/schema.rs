use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding `_list.json` and the level files (default: ./data)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Where `backup` writes snapshots (default: ./backups)
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,

    /// Preferences file (default: ~/.config/gdps-list/preferences.json)
    #[serde(default)]
    pub preferences: Option<PathBuf>,

    /// Reject out-of-domain input in `score` instead of passing it through
    #[serde(default)]
    pub strict: bool,
}

impl Config {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("data"))
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.backup_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("backups"))
    }
}
