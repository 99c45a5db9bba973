use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::list::write_json;

pub const SETTINGS_FILE: &str = "_settings.json";

/// Keys accepted by [`Settings::set`]
pub const SETTING_KEYS: [&str; 6] = [
    "title",
    "primary_color",
    "telegram_link",
    "submit_link",
    "list_name_header",
    "github_url",
];

/// Site-wide settings shown in the page chrome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub title: String,
    pub primary_color: String,
    pub telegram_link: String,
    pub submit_link: String,
    pub list_name_header: String,
    /// Repository the list manager deploys to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "CCL - GDPS List".to_string(),
            primary_color: "#003366".to_string(),
            telegram_link: "https://t.me/cclistnews".to_string(),
            submit_link: "https://docs.google.com/forms/d/e/1FAIpQLSfJKdsbsAvUe38iWvChERO7ot3MRWlrlHShNqpKwu-KNA5AOw/viewform".to_string(),
            list_name_header: "CCL".to_string(),
            github_url: None,
        }
    }
}

/// Partial settings as published in `_settings.json`.
/// Absent (or null) fields leave the current value alone; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SettingsOverlay {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub telegram_link: Option<String>,
    #[serde(default)]
    pub submit_link: Option<String>,
    #[serde(default)]
    pub list_name_header: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
}

impl Settings {
    /// Replace every field the overlay carries.
    pub fn merge(&mut self, overlay: SettingsOverlay) {
        fn apply(field: &mut String, value: Option<String>) {
            if let Some(value) = value {
                *field = value;
            }
        }

        apply(&mut self.title, overlay.title);
        apply(&mut self.primary_color, overlay.primary_color);
        apply(&mut self.telegram_link, overlay.telegram_link);
        apply(&mut self.submit_link, overlay.submit_link);
        apply(&mut self.list_name_header, overlay.list_name_header);
        if overlay.github_url.is_some() {
            self.github_url = overlay.github_url;
        }
    }

    /// Set one field by key. An empty `github_url` clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let field = match key {
            "title" => &mut self.title,
            "primary_color" => &mut self.primary_color,
            "telegram_link" => &mut self.telegram_link,
            "submit_link" => &mut self.submit_link,
            "list_name_header" => &mut self.list_name_header,
            "github_url" => {
                self.github_url = Some(value.to_string()).filter(|url| !url.is_empty());
                return Ok(());
            }
            _ => anyhow::bail!(
                "Unknown setting '{}', expected one of: {}",
                key,
                SETTING_KEYS.join(", ")
            ),
        };
        *field = value.to_string();
        Ok(())
    }

    /// Stylesheet variable assignments derived from the settings
    pub fn css_variables(&self) -> String {
        format!("--color-primary: {};", self.primary_color)
    }
}

/// Read the published settings overlay.
///
/// A missing file is not an error (the defaults stay in effect); a file that
/// exists but does not parse is.
pub fn fetch_settings(data_dir: &Path) -> Result<Option<SettingsOverlay>> {
    let path = data_dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read settings at {}", path.display()))?;
    let overlay = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings: invalid JSON in {}", path.display()))?;

    Ok(Some(overlay))
}

/// Publish the full settings to `_settings.json`.
pub fn save_settings(data_dir: &Path, settings: &Settings) -> Result<()> {
    write_json(&data_dir.join(SETTINGS_FILE), settings)
}
