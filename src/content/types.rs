use serde::{Deserialize, Serialize};

use crate::scoring::{self, ScoreInput, FULL_COMPLETION};

fn default_percent_to_qualify() -> f64 {
    FULL_COMPLETION
}

/// A level file (`<stem>.json`) from the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub creators: Vec<String>,
    pub verifier: String,
    /// Verification video link
    #[serde(default)]
    pub verification: String,
    #[serde(default = "default_percent_to_qualify")]
    pub percent_to_qualify: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Manual points override, `-1` = auto
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[serde(default)]
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub user: String,
    #[serde(default)]
    pub link: String,
    pub percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hz: Option<u32>,
    #[serde(default)]
    pub mobile: bool,
}

impl Record {
    pub fn is_completion(&self) -> bool {
        self.percent >= FULL_COMPLETION
    }
}

/// A level together with its position on the list.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedLevel {
    pub rank: u32,
    /// File stem the level was loaded from
    pub path: String,
    pub level: Level,
}

impl RankedLevel {
    pub fn score_input(&self, percent: f64) -> ScoreInput {
        ScoreInput::new(self.rank, percent, self.level.percent_to_qualify)
            .with_manual_points(self.level.points)
    }

    /// Points awarded for a 100% completion of this level
    pub fn completion_points(&self) -> f64 {
        self.points_for(FULL_COMPLETION)
    }

    pub fn points_for(&self, percent: f64) -> f64 {
        scoring::evaluate(&self.score_input(percent)).score
    }
}

/// One slot of `_list.json`. A level that fails to load keeps its rank.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEntry {
    Loaded(RankedLevel),
    Failed {
        rank: u32,
        path: String,
        reason: String,
    },
}

impl ListEntry {
    pub fn rank(&self) -> u32 {
        match self {
            ListEntry::Loaded(level) => level.rank,
            ListEntry::Failed { rank, .. } => *rank,
        }
    }

    pub fn as_loaded(&self) -> Option<&RankedLevel> {
        match self {
            ListEntry::Loaded(level) => Some(level),
            ListEntry::Failed { .. } => None,
        }
    }
}

/// An entry of `_editors.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Editor {
    pub role: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}
