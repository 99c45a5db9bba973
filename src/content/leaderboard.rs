use std::collections::HashMap;

use super::types::ListEntry;
use crate::scoring::{round, FULL_COMPLETION};

/// One scored contribution to a player's total.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub rank: u32,
    pub level: String,
    pub percent: f64,
    pub score: f64,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStanding {
    /// First spelling of the name seen on the list
    pub user: String,
    pub total: f64,
    pub verified: Vec<ScoreEntry>,
    pub completed: Vec<ScoreEntry>,
    pub progressed: Vec<ScoreEntry>,
}

impl PlayerStanding {
    fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            total: 0.0,
            verified: Vec::new(),
            completed: Vec::new(),
            progressed: Vec::new(),
        }
    }

    /// All entries in verified, completed, progressed order
    pub fn entries(&self) -> impl Iterator<Item = &ScoreEntry> {
        self.verified
            .iter()
            .chain(self.completed.iter())
            .chain(self.progressed.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaderboard {
    /// Sorted by total, highest first
    pub players: Vec<PlayerStanding>,
    /// File stems of levels that failed to load
    pub errors: Vec<String>,
}

impl Leaderboard {
    /// 1-based position and standing of a player, matched case-insensitively
    pub fn position(&self, user: &str) -> Option<(usize, &PlayerStanding)> {
        let wanted = user.to_lowercase();
        self.players
            .iter()
            .enumerate()
            .find(|(_, p)| p.user.to_lowercase() == wanted)
            .map(|(idx, p)| (idx + 1, p))
    }
}

/// Players keyed case-insensitively, kept in first-seen order.
#[derive(Default)]
struct ScoreMap {
    index: HashMap<String, usize>,
    players: Vec<PlayerStanding>,
}

impl ScoreMap {
    fn player(&mut self, user: &str) -> &mut PlayerStanding {
        let key = user.to_lowercase();
        let idx = match self.index.get(&key) {
            Some(idx) => *idx,
            None => {
                self.players.push(PlayerStanding::new(user));
                self.index.insert(key, self.players.len() - 1);
                self.players.len() - 1
            }
        };
        &mut self.players[idx]
    }
}

/// Build the player leaderboard from a loaded list.
///
/// Verifiers earn the completion score of the level they verified; every
/// record is scored at its own percent. Totals are rounded to the score
/// scale and players are ordered by total, ties keeping first-seen order.
pub fn fetch_leaderboard(entries: &[ListEntry]) -> Leaderboard {
    let mut map = ScoreMap::default();
    let mut errors = Vec::new();

    for entry in entries {
        let ranked = match entry {
            ListEntry::Loaded(ranked) => ranked,
            ListEntry::Failed { path, .. } => {
                errors.push(path.clone());
                continue;
            }
        };
        let level = &ranked.level;

        map.player(&level.verifier).verified.push(ScoreEntry {
            rank: ranked.rank,
            level: level.name.clone(),
            percent: FULL_COMPLETION,
            score: ranked.completion_points(),
            link: level.verification.clone(),
        });

        for record in &level.records {
            let scored = ScoreEntry {
                rank: ranked.rank,
                level: level.name.clone(),
                percent: record.percent,
                score: ranked.points_for(record.percent),
                link: record.link.clone(),
            };
            let player = map.player(&record.user);
            if record.is_completion() {
                player.completed.push(scored);
            } else {
                player.progressed.push(scored);
            }
        }
    }

    let mut players = map.players;
    for player in &mut players {
        player.total = round(player.entries().map(|e| e.score).sum());
    }
    players.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Leaderboard { players, errors }
}
