//! Changes to the list data directory. Each operation loads what it needs,
//! applies one edit and writes the touched files back atomically.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

use super::list::{
    fetch_editors, fetch_requirements, level_path, load_level, load_stems, save_editors,
    save_level, save_list, save_requirements,
};
use super::types::{Editor, Level, Record};
use crate::scoring::{validate_manual_points, validate_min_percent, validate_percent, AUTO_POINTS};

/// Refresh rate assumed for a new record when none is given
pub const DEFAULT_HZ: u32 = 360;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("invalid rank {rank}, must be between 1 and {len}")]
    RankOutOfRange { rank: usize, len: usize },

    #[error("level '{0}' is already on the list")]
    DuplicateLevel(String),

    #[error("invalid level file name '{0}'")]
    InvalidStem(String),

    #[error("no record by '{user}' on level #{rank}")]
    NoSuchRecord { rank: usize, user: String },

    #[error("no editor named '{0}'")]
    NoSuchEditor(String),

    #[error("invalid requirement number {index}, must be between 1 and {len}")]
    NoSuchRequirement { index: usize, len: usize },

    #[error("invalid {field}: '{value}'")]
    InvalidValue { field: LevelField, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(format!("expected 'up' or 'down', got '{}'", s)),
        }
    }
}

/// Editable fields of a level file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelField {
    Name,
    Id,
    Password,
    Author,
    /// Comma separated
    Creators,
    Verifier,
    Verification,
    PercentToQualify,
    Points,
}

impl LevelField {
    const ALL: [LevelField; 9] = [
        LevelField::Name,
        LevelField::Id,
        LevelField::Password,
        LevelField::Author,
        LevelField::Creators,
        LevelField::Verifier,
        LevelField::Verification,
        LevelField::PercentToQualify,
        LevelField::Points,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LevelField::Name => "name",
            LevelField::Id => "id",
            LevelField::Password => "password",
            LevelField::Author => "author",
            LevelField::Creators => "creators",
            LevelField::Verifier => "verifier",
            LevelField::Verification => "verification",
            LevelField::PercentToQualify => "percent-to-qualify",
            LevelField::Points => "points",
        }
    }

    fn parse_number(self, value: &str) -> Result<f64, EditError> {
        value.trim().parse().map_err(|_| EditError::InvalidValue {
            field: self,
            value: value.to_string(),
        })
    }

    /// Set this field on `level` from its command-line text.
    ///
    /// `points` accepts `auto` for the `-1` sentinel. An empty password clears it.
    pub fn apply(self, level: &mut Level, value: &str) -> Result<()> {
        match self {
            LevelField::Name => level.name = value.to_string(),
            LevelField::Id => {
                level.id = value.trim().parse().map_err(|_| EditError::InvalidValue {
                    field: self,
                    value: value.to_string(),
                })?
            }
            LevelField::Password => {
                level.password = Some(value.to_string()).filter(|p| !p.is_empty())
            }
            LevelField::Author => level.author = value.to_string(),
            LevelField::Creators => {
                level.creators = value
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(String::from)
                    .collect()
            }
            LevelField::Verifier => level.verifier = value.to_string(),
            LevelField::Verification => level.verification = value.to_string(),
            LevelField::PercentToQualify => {
                let percent = self.parse_number(value)?;
                validate_min_percent(percent)?;
                level.percent_to_qualify = percent;
            }
            LevelField::Points => {
                let points = if value.trim().eq_ignore_ascii_case("auto") {
                    AUTO_POINTS
                } else {
                    self.parse_number(value)?
                };
                validate_manual_points(points)?;
                level.points = Some(points);
            }
        }
        Ok(())
    }
}

impl fmt::Display for LevelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase().replace('_', "-");
        let wanted = if wanted == "percenttoqualify" {
            "percent-to-qualify".to_string()
        } else {
            wanted
        };
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown field '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Contents of a freshly added level file
pub fn new_level(stem: &str) -> Level {
    Level {
        id: 0,
        name: stem.to_string(),
        author: "Author".to_string(),
        creators: Vec::new(),
        verifier: "Verifier".to_string(),
        verification: "https://youtu.be/example".to_string(),
        percent_to_qualify: 100.0,
        password: Some("Free to Copy".to_string()),
        points: None,
        records: Vec::new(),
    }
}

fn index_for(rank: usize, len: usize) -> Result<usize, EditError> {
    if rank < 1 || rank > len {
        Err(EditError::RankOutOfRange { rank, len })
    } else {
        Ok(rank - 1)
    }
}

/// Stems name files in the data directory; `_` marks the list's own files.
fn validate_stem(stem: &str) -> Result<(), EditError> {
    let reserved = stem.is_empty()
        || stem.starts_with('_')
        || stem.starts_with('.')
        || stem.contains(['/', '\\']);
    if reserved {
        Err(EditError::InvalidStem(stem.to_string()))
    } else {
        Ok(())
    }
}

/// Load the stem and level at `rank`
fn level_at(data_dir: &Path, rank: usize) -> Result<(String, Level)> {
    let stems = load_stems(data_dir)?;
    let stem = stems[index_for(rank, stems.len())?].clone();
    let level = load_level(data_dir, &stem)?;
    Ok((stem, level))
}

/// Append a level to the bottom of the list. Returns its rank.
///
/// An existing `<stem>.json` is kept as is; otherwise a placeholder level is written.
pub fn add_level(data_dir: &Path, stem: &str) -> Result<usize> {
    let stem = stem.trim();
    validate_stem(stem)?;

    let mut stems = load_stems(data_dir)?;
    if stems.iter().any(|s| s == stem) {
        return Err(EditError::DuplicateLevel(stem.to_string()).into());
    }

    if level_path(data_dir, stem).exists() {
        debug!(stem, "level file already present, keeping it");
    } else {
        save_level(data_dir, stem, &new_level(stem))?;
    }

    stems.push(stem.to_string());
    save_list(data_dir, &stems)?;
    info!(stem, rank = stems.len(), "added level");
    Ok(stems.len())
}

/// Drop the level at `rank` from the list and delete its file. Returns its stem.
pub fn remove_level(data_dir: &Path, rank: usize) -> Result<String> {
    let mut stems = load_stems(data_dir)?;
    let stem = stems.remove(index_for(rank, stems.len())?);
    save_list(data_dir, &stems)?;

    let path = level_path(data_dir, &stem);
    match fs::remove_file(&path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "level file already gone")
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to delete {}", path.display()))
        }
    }

    info!(stem = %stem, rank, "removed level");
    Ok(stem)
}

/// Swap the level at `rank` with its neighbour. Returns the new rank, which is
/// unchanged when the level is already at that end of the list.
pub fn move_level(data_dir: &Path, rank: usize, direction: Direction) -> Result<usize> {
    let mut stems = load_stems(data_dir)?;
    let idx = index_for(rank, stems.len())?;
    let target = match direction {
        Direction::Up => idx.checked_sub(1),
        Direction::Down => Some(idx + 1).filter(|&t| t < stems.len()),
    };

    let Some(target) = target else {
        debug!(rank, ?direction, "level already at the end of the list");
        return Ok(rank);
    };

    stems.swap(idx, target);
    save_list(data_dir, &stems)?;
    info!(from = rank, to = target + 1, "moved level");
    Ok(target + 1)
}

/// Change one field of the level at `rank`.
pub fn set_level_field(data_dir: &Path, rank: usize, field: LevelField, value: &str) -> Result<()> {
    let (stem, mut level) = level_at(data_dir, rank)?;
    field.apply(&mut level, value)?;
    save_level(data_dir, &stem, &level)?;
    info!(stem = %stem, %field, "updated level");
    Ok(())
}

/// Append a record to the level at `rank`.
pub fn add_record(data_dir: &Path, rank: usize, record: Record) -> Result<()> {
    validate_percent(record.percent)?;
    let (stem, mut level) = level_at(data_dir, rank)?;
    info!(stem = %stem, user = %record.user, percent = record.percent, "added record");
    level.records.push(record);
    save_level(data_dir, &stem, &level)
}

/// Delete every record by `user` (case-insensitive) from the level at `rank`.
/// Returns how many were removed.
pub fn remove_record(data_dir: &Path, rank: usize, user: &str) -> Result<usize> {
    let (stem, mut level) = level_at(data_dir, rank)?;
    let wanted = user.to_lowercase();
    let before = level.records.len();
    level.records.retain(|r| r.user.to_lowercase() != wanted);
    let removed = before - level.records.len();

    if removed == 0 {
        return Err(EditError::NoSuchRecord {
            rank,
            user: user.to_string(),
        }
        .into());
    }

    save_level(data_dir, &stem, &level)?;
    info!(stem = %stem, user, removed, "removed records");
    Ok(removed)
}

pub fn add_editor(data_dir: &Path, editor: Editor) -> Result<()> {
    let mut editors = fetch_editors(data_dir)?.unwrap_or_default();
    editors.push(editor);
    save_editors(data_dir, &editors)
}

/// Remove every editor named `name` (case-insensitive). Returns how many were removed.
pub fn remove_editor(data_dir: &Path, name: &str) -> Result<usize> {
    let mut editors = fetch_editors(data_dir)?.unwrap_or_default();
    let wanted = name.to_lowercase();
    let before = editors.len();
    editors.retain(|e| e.name.to_lowercase() != wanted);

    let removed = before - editors.len();
    if removed == 0 {
        return Err(EditError::NoSuchEditor(name.to_string()).into());
    }
    save_editors(data_dir, &editors)?;
    Ok(removed)
}

/// Append a requirement. Blank text is ignored. Returns the number of requirements.
pub fn add_requirement(data_dir: &Path, text: &str) -> Result<usize> {
    let mut requirements = fetch_requirements(data_dir)?.unwrap_or_default();
    let text = text.trim();
    if !text.is_empty() {
        requirements.push(text.to_string());
        save_requirements(data_dir, &requirements)?;
    }
    Ok(requirements.len())
}

/// Remove the requirement at 1-based `index`. Returns its text.
pub fn remove_requirement(data_dir: &Path, index: usize) -> Result<String> {
    let mut requirements = fetch_requirements(data_dir)?.unwrap_or_default();
    let len = requirements.len();
    if index < 1 || index > len {
        return Err(EditError::NoSuchRequirement { index, len }.into());
    }
    let removed = requirements.remove(index - 1);
    save_requirements(data_dir, &requirements)?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::list::{fetch_list, LIST_FILE};
    use crate::scoring::ScoreError;
    use tempfile::TempDir;

    fn data_dir(stems: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for stem in stems {
            add_level(dir.path(), stem).unwrap();
        }
        dir
    }

    fn record(user: &str, percent: f64) -> Record {
        Record {
            user: user.to_string(),
            link: String::new(),
            percent,
            hz: Some(DEFAULT_HZ),
            mobile: false,
        }
    }

    fn edit_error(err: anyhow::Error) -> EditError {
        err.downcast::<EditError>().unwrap()
    }

    #[test]
    fn test_add_level_writes_placeholder() {
        let dir = data_dir(&[]);
        assert_eq!(add_level(dir.path(), " newlevel ").unwrap(), 1);

        let level = load_level(dir.path(), "newlevel").unwrap();
        assert_eq!(level, new_level("newlevel"));
        assert_eq!(load_stems(dir.path()).unwrap(), vec!["newlevel"]);
    }

    #[test]
    fn test_add_level_keeps_existing_file() {
        let dir = data_dir(&[]);
        fs::write(
            dir.path().join("old.json"),
            r#"{ "name": "Old Level", "verifier": "V" }"#,
        )
        .unwrap();

        add_level(dir.path(), "old").unwrap();
        assert_eq!(load_level(dir.path(), "old").unwrap().name, "Old Level");
    }

    #[test]
    fn test_add_level_rejects_duplicates_and_reserved_names() {
        let dir = data_dir(&["a"]);
        assert_eq!(
            edit_error(add_level(dir.path(), "a").unwrap_err()),
            EditError::DuplicateLevel("a".to_string())
        );
        for bad in ["", "_list", "../escape", ".hidden"] {
            assert!(matches!(
                edit_error(add_level(dir.path(), bad).unwrap_err()),
                EditError::InvalidStem(_)
            ));
        }
        assert_eq!(load_stems(dir.path()).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_remove_level_deletes_file() {
        let dir = data_dir(&["a", "b", "c"]);
        assert_eq!(remove_level(dir.path(), 2).unwrap(), "b");
        assert_eq!(load_stems(dir.path()).unwrap(), vec!["a", "c"]);
        assert!(!dir.path().join("b.json").exists());
    }

    #[test]
    fn test_remove_level_with_missing_file() {
        let dir = data_dir(&["a"]);
        fs::remove_file(dir.path().join("a.json")).unwrap();
        assert_eq!(remove_level(dir.path(), 1).unwrap(), "a");
        assert!(load_stems(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_rank_out_of_range() {
        let dir = data_dir(&["a"]);
        assert_eq!(
            edit_error(remove_level(dir.path(), 2).unwrap_err()),
            EditError::RankOutOfRange { rank: 2, len: 1 }
        );
        assert!(remove_level(dir.path(), 0).is_err());
    }

    #[test]
    fn test_move_level_changes_scores() {
        let dir = data_dir(&["a", "b"]);

        let before = fetch_list(dir.path()).unwrap();
        assert_eq!(before[1].as_loaded().unwrap().completion_points(), 175.003);

        assert_eq!(move_level(dir.path(), 2, Direction::Up).unwrap(), 1);

        let after = fetch_list(dir.path()).unwrap();
        let top = after[0].as_loaded().unwrap();
        assert_eq!(top.path, "b");
        assert_eq!(top.completion_points(), 200.0);
    }

    #[test]
    fn test_move_level_at_edges_is_noop() {
        let dir = data_dir(&["a", "b"]);
        let written = fs::read_to_string(dir.path().join(LIST_FILE)).unwrap();

        assert_eq!(move_level(dir.path(), 1, Direction::Up).unwrap(), 1);
        assert_eq!(move_level(dir.path(), 2, Direction::Down).unwrap(), 2);
        assert_eq!(fs::read_to_string(dir.path().join(LIST_FILE)).unwrap(), written);

        assert_eq!(move_level(dir.path(), 1, Direction::Down).unwrap(), 2);
        assert_eq!(load_stems(dir.path()).unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_set_level_fields() {
        let dir = data_dir(&["a"]);
        set_level_field(dir.path(), 1, LevelField::Name, "Acu").unwrap();
        set_level_field(dir.path(), 1, LevelField::Id, "61079355").unwrap();
        set_level_field(dir.path(), 1, LevelField::Creators, " Neiro, , Zoink ").unwrap();
        set_level_field(dir.path(), 1, LevelField::PercentToQualify, "55").unwrap();
        set_level_field(dir.path(), 1, LevelField::Password, "").unwrap();

        let level = load_level(dir.path(), "a").unwrap();
        assert_eq!(level.name, "Acu");
        assert_eq!(level.id, 61079355);
        assert_eq!(level.creators, vec!["Neiro", "Zoink"]);
        assert_eq!(level.percent_to_qualify, 55.0);
        assert!(level.password.is_none());
    }

    #[test]
    fn test_set_points_override() {
        let dir = data_dir(&["a"]);
        set_level_field(dir.path(), 1, LevelField::Points, "12.5").unwrap();
        let entries = fetch_list(dir.path()).unwrap();
        assert_eq!(entries[0].as_loaded().unwrap().completion_points(), 12.5);

        set_level_field(dir.path(), 1, LevelField::Points, "auto").unwrap();
        let level = load_level(dir.path(), "a").unwrap();
        assert_eq!(level.points, Some(AUTO_POINTS));
        let entries = fetch_list(dir.path()).unwrap();
        assert_eq!(entries[0].as_loaded().unwrap().completion_points(), 200.0);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let dir = data_dir(&["a"]);
        let err = set_level_field(dir.path(), 1, LevelField::Points, "-3").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ScoreError>(),
            Some(&ScoreError::InvalidManualPoints(-3.0))
        );

        let err = set_level_field(dir.path(), 1, LevelField::PercentToQualify, "120").unwrap_err();
        assert!(err.downcast_ref::<ScoreError>().is_some());

        let err = set_level_field(dir.path(), 1, LevelField::Id, "abc").unwrap_err();
        assert!(matches!(
            edit_error(err),
            EditError::InvalidValue {
                field: LevelField::Id,
                ..
            }
        ));

        assert_eq!(load_level(dir.path(), "a").unwrap(), new_level("a"));
    }

    #[test]
    fn test_parse_field_and_direction() {
        assert_eq!("points".parse::<LevelField>(), Ok(LevelField::Points));
        assert_eq!(
            "percentToQualify".parse::<LevelField>(),
            Ok(LevelField::PercentToQualify)
        );
        assert_eq!(
            "percent_to_qualify".parse::<LevelField>(),
            Ok(LevelField::PercentToQualify)
        );
        assert!("colour".parse::<LevelField>().is_err());
        assert_eq!("UP".parse::<Direction>(), Ok(Direction::Up));
        assert!("left".parse::<Direction>().is_err());
    }

    #[test]
    fn test_add_and_remove_records() {
        let dir = data_dir(&["a"]);
        add_record(dir.path(), 1, record("alice", 100.0)).unwrap();
        add_record(dir.path(), 1, record("bob", 64.0)).unwrap();
        add_record(dir.path(), 1, record("Alice", 100.0)).unwrap();

        assert_eq!(load_level(dir.path(), "a").unwrap().records.len(), 3);
        assert_eq!(remove_record(dir.path(), 1, "ALICE").unwrap(), 2);

        let records = load_level(dir.path(), "a").unwrap().records;
        assert_eq!(records, vec![record("bob", 64.0)]);

        assert_eq!(
            edit_error(remove_record(dir.path(), 1, "carol").unwrap_err()),
            EditError::NoSuchRecord {
                rank: 1,
                user: "carol".to_string()
            }
        );
    }

    #[test]
    fn test_add_record_rejects_bad_percent() {
        let dir = data_dir(&["a"]);
        let err = add_record(dir.path(), 1, record("alice", 101.0)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ScoreError>(),
            Some(&ScoreError::PercentOutOfRange(101.0))
        );
        assert!(load_level(dir.path(), "a").unwrap().records.is_empty());
    }

    #[test]
    fn test_editors() {
        let dir = data_dir(&[]);
        add_editor(
            dir.path(),
            Editor {
                role: "owner".to_string(),
                name: "Chai".to_string(),
                link: Some("https://t.me/chai".to_string()),
            },
        )
        .unwrap();
        add_editor(
            dir.path(),
            Editor {
                role: "helper".to_string(),
                name: "Mint".to_string(),
                link: None,
            },
        )
        .unwrap();

        assert_eq!(remove_editor(dir.path(), "chai").unwrap(), 1);
        let editors = fetch_editors(dir.path()).unwrap().unwrap();
        assert_eq!(editors.len(), 1);
        assert_eq!(editors[0].name, "Mint");
        assert!(remove_editor(dir.path(), "chai").is_err());
    }

    #[test]
    fn test_requirements() {
        let dir = data_dir(&[]);
        assert_eq!(add_requirement(dir.path(), "Show clicks").unwrap(), 1);
        assert_eq!(add_requirement(dir.path(), "   ").unwrap(), 1);
        assert_eq!(add_requirement(dir.path(), "No cheats").unwrap(), 2);

        assert_eq!(remove_requirement(dir.path(), 1).unwrap(), "Show clicks");
        assert_eq!(
            fetch_requirements(dir.path()).unwrap().unwrap(),
            vec!["No cheats"]
        );
        assert_eq!(
            edit_error(remove_requirement(dir.path(), 5).unwrap_err()),
            EditError::NoSuchRequirement { index: 5, len: 1 }
        );
    }
}
