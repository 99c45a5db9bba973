pub mod edit;
pub mod leaderboard;
pub mod list;
pub mod types;

pub use edit::{Direction, EditError, LevelField};
pub use leaderboard::{fetch_leaderboard, Leaderboard, PlayerStanding, ScoreEntry};
pub use list::{
    fetch_editors, fetch_list, fetch_requirements, load_level, load_stems, save_editors,
    save_level, save_list, save_requirements,
};
pub use types::{Editor, Level, ListEntry, RankedLevel, Record};
