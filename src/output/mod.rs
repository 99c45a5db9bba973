pub mod formatter;

pub use formatter::{
    format_editors, format_leaderboard_table, format_leaderboard_tsv, format_level_detail,
    format_list_table, format_player_detail, format_requirements, format_score,
    format_score_explain, format_settings, should_use_colors,
};
