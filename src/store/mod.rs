//! Application context: merged site settings plus the persisted dark-mode
//! preference. Built once at startup and handed to whatever renders.

pub mod preferences;
pub mod settings;

pub use preferences::{get_preferences_path, load_preferences, save_preferences, Preferences};
pub use settings::{fetch_settings, save_settings, Settings, SettingsOverlay, SETTING_KEYS};

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Store {
    dark: bool,
    settings: Settings,
    data_dir: PathBuf,
    preferences_path: PathBuf,
}

impl Store {
    /// Load preferences and merge the published settings over the defaults.
    ///
    /// Neither step is fatal: an unreadable preference file means light mode
    /// and unreadable settings keep the defaults. Both are logged.
    pub fn load(data_dir: &Path, preferences_path: PathBuf) -> Self {
        let dark = match load_preferences(&preferences_path) {
            Ok(prefs) => prefs.dark,
            Err(e) => {
                warn!(path = %preferences_path.display(), "ignoring preferences: {:#}", e);
                false
            }
        };

        let mut settings = Settings::default();
        match fetch_settings(data_dir) {
            Ok(Some(overlay)) => {
                debug!(dir = %data_dir.display(), "merging published settings");
                settings.merge(overlay);
            }
            Ok(None) => debug!(dir = %data_dir.display(), "no published settings, using defaults"),
            Err(e) => warn!("failed to load settings, using defaults: {:#}", e),
        }

        Self {
            dark,
            settings,
            data_dir: data_dir.to_path_buf(),
            preferences_path,
        }
    }

    /// Flip dark mode and persist the new value. Returns the new value.
    pub fn toggle_dark(&mut self) -> Result<bool> {
        let dark = !self.dark;
        save_preferences(&self.preferences_path, &Preferences { dark })?;
        self.dark = dark;
        Ok(dark)
    }

    /// Change one setting and publish the merged settings to the data directory.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        let mut settings = self.settings.clone();
        settings.set(key, value)?;
        save_settings(&self.data_dir, &settings)?;
        debug!(key, "setting saved");
        self.settings = settings;
        Ok(())
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn document_title(&self) -> &str {
        &self.settings.title
    }

    pub fn css_variables(&self) -> String {
        self.settings.css_variables()
    }
}
