use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::content::{Editor, Leaderboard, ListEntry, PlayerStanding, RankedLevel, ScoreEntry};
use crate::scoring::{ScoreBasis, ScoreInput, ScoreResult, FULL_COMPLETION, MAX_SCORED_RANK};
use crate::store::Store;

/// Score column width, fits "175.003" and "1234.567"
const SCORE_WIDTH: usize = 8;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with at most the digits it carries ("200", "175.003")
pub fn format_score(score: f64) -> String {
    format!("{}", score)
}

fn format_percent(percent: f64) -> String {
    format!("{}%", percent)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Fit `name` into whatever the terminal leaves after `fixed_width` columns
fn fit_name(name: &str, fixed_width: usize, term_width: Option<usize>) -> String {
    match term_width {
        Some(width) if width > fixed_width + 10 => truncate_name(name, width - fixed_width),
        Some(_) => truncate_name(name, 20),
        None => name.to_string(),
    }
}

fn index_column(position: usize) -> String {
    format!("{:>3}.", position)
}

/// Format the list as one line per level: rank, completion points, name, author.
/// Levels that failed to load keep their slot with an error marker.
pub fn format_list_table(entries: &[ListEntry], use_colors: bool) -> String {
    if entries.is_empty() {
        return "No levels found.".to_string();
    }

    let term_width = get_terminal_width();

    entries
        .iter()
        .map(|entry| {
            let index_str = index_column(entry.rank() as usize);
            match entry {
                ListEntry::Failed { path, .. } => {
                    let message = format!("Error loading {}.json", path);
                    if use_colors {
                        format!("{} {}", index_str.dimmed(), message.red())
                    } else {
                        format!("{} {}", index_str, message)
                    }
                }
                ListEntry::Loaded(ranked) => {
                    let score_str = format!(
                        "{:>width$}",
                        format_score(ranked.completion_points()),
                        width = SCORE_WIDTH
                    );
                    let by = format!("by {}", ranked.level.author);
                    let fixed_width = index_str.len() + 1 + SCORE_WIDTH + 2 + 2 + by.len();
                    let name = fit_name(&ranked.level.name, fixed_width, term_width);

                    if use_colors {
                        format!(
                            "{} {}  {}  {}",
                            index_str.dimmed(),
                            score_str.bold(),
                            name,
                            by.yellow()
                        )
                    } else {
                        format!("{} {}  {}  {}", index_str, score_str, name, by)
                    }
                }
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a single level with its records (for `level`)
pub fn format_level_detail(ranked: &RankedLevel, use_colors: bool) -> String {
    let level = &ranked.level;
    let creators = if level.creators.is_empty() {
        level.author.clone()
    } else {
        level.creators.join(", ")
    };
    let points = format_score(ranked.completion_points());
    let password = level.password.as_deref().unwrap_or("-");

    let mut lines = Vec::new();
    let heading = format!("#{} - {}", ranked.rank, level.name);
    if use_colors {
        lines.push(heading.bold().to_string());
    } else {
        lines.push(heading);
    }
    lines.push(format!("  Author: {}", level.author));
    lines.push(format!("  Creators: {}", creators));
    lines.push(format!("  Verifier: {}", level.verifier));
    lines.push(format!("  ID: {}", level.id));
    lines.push(format!("  Password: {}", password));
    lines.push(format!("  Points when completed: {}", points));
    let overridden = ranked
        .score_input(FULL_COMPLETION)
        .manual_override()
        .is_some();
    if ranked.rank > MAX_SCORED_RANK && !overridden {
        lines.push("  This level does not award points (legacy)".to_string());
    }
    lines.push(format!(
        "  {} or better to qualify",
        format_percent(level.percent_to_qualify)
    ));
    if use_colors {
        lines.push(format!("  Verification: {}", level.verification.underline()));
    } else {
        lines.push(format!("  Verification: {}", level.verification));
    }

    if level.records.is_empty() {
        lines.push("  No records yet.".to_string());
    } else {
        lines.push(format!("  Records ({}):", level.records.len()));
        for record in &level.records {
            let hz = record
                .hz
                .map(|hz| format!("{}Hz", hz))
                .unwrap_or_else(|| "-".to_string());
            let device = if record.mobile { " (mobile)" } else { "" };
            let points = format_score(ranked.points_for(record.percent));
            lines.push(format!(
                "    {:>5} {:>6}  {:>8}  {}{}",
                format_percent(record.percent),
                hz,
                points,
                record.user,
                device
            ));
        }
    }

    lines.join("\n")
}

/// Format players as table with columns: Position, Total, User
pub fn format_leaderboard_table(board: &Leaderboard, use_colors: bool) -> String {
    if board.players.is_empty() {
        return "No players found.".to_string();
    }

    let term_width = get_terminal_width();
    let fixed_width = 4 + 1 + SCORE_WIDTH + 2;

    board
        .players
        .iter()
        .enumerate()
        .map(|(idx, player)| {
            let index_str = index_column(idx + 1);
            let total = format!("{:>width$}", format_score(player.total), width = SCORE_WIDTH);
            let user = fit_name(&player.user, fixed_width, term_width);

            if use_colors {
                format!("{} {}  {}", index_str.dimmed(), total.bold(), user.cyan())
            } else {
                format!("{} {}  {}", index_str, total, user)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format players as tab-separated values for scripting
/// Columns: position, total, user (no headers, no colors)
pub fn format_leaderboard_tsv(board: &Leaderboard) -> String {
    board
        .players
        .iter()
        .enumerate()
        .map(|(idx, player)| format!("{}\t{}\t{}", idx + 1, format_score(player.total), player.user))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_entries(title: &str, entries: &[ScoreEntry], show_percent: bool) -> Vec<String> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![format!("  {} ({}):", title, entries.len())];
    for entry in entries {
        let percent = if show_percent {
            format!(" {}", format_percent(entry.percent))
        } else {
            String::new()
        };
        lines.push(format!(
            "    #{:<4} {}{}  {}",
            entry.rank,
            entry.level,
            percent,
            format_score(entry.score)
        ));
    }
    lines
}

/// Format one player's standing (for `player`)
pub fn format_player_detail(position: usize, player: &PlayerStanding, use_colors: bool) -> String {
    let heading = format!("#{} {}", position, player.user);
    let mut lines = vec![if use_colors {
        heading.bold().to_string()
    } else {
        heading
    }];
    lines.push(format!("  Total: {}", format_score(player.total)));
    lines.extend(format_entries("Verified", &player.verified, false));
    lines.extend(format_entries("Completed", &player.completed, false));
    lines.extend(format_entries("Progressed", &player.progressed, true));
    lines.join("\n")
}

/// Explain how a score was reached (for `score`)
pub fn format_score_explain(input: &ScoreInput, result: &ScoreResult) -> String {
    let reason = match result.basis {
        ScoreBasis::Incomplete => format!(
            "only 100% completions earn points ({} given)",
            format_percent(input.percent)
        ),
        ScoreBasis::Manual => "manual points override".to_string(),
        ScoreBasis::OutOfRange => format!(
            "rank {} is past the last scoring rank ({})",
            input.rank, MAX_SCORED_RANK
        ),
        ScoreBasis::Formula { raw } => format!("rank curve (raw {})", raw),
    };
    format!("{}\n  {}", format_score(result.score), reason)
}

/// Format merged settings, one `key: value` per line
pub fn format_settings(store: &Store) -> String {
    let settings = store.settings();
    let mut lines = vec![
        format!("title: {}", store.document_title()),
        format!("primary_color: {}", settings.primary_color),
        format!("telegram_link: {}", settings.telegram_link),
        format!("submit_link: {}", settings.submit_link),
        format!("list_name_header: {}", settings.list_name_header),
    ];
    if let Some(ref url) = settings.github_url {
        lines.push(format!("github_url: {}", url));
    }
    lines.push(format!("dark: {}", store.is_dark()));
    lines.push(store.css_variables());
    lines.join("\n")
}

/// Format the editor team, one `role: name` per line
pub fn format_editors(editors: &[Editor]) -> String {
    if editors.is_empty() {
        return "No editors listed.".to_string();
    }

    editors
        .iter()
        .map(|editor| match editor.link {
            Some(ref link) => format!("{}: {} ({})", editor.role, editor.name, link),
            None => format!("{}: {}", editor.role, editor.name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format submission requirements as a numbered list
pub fn format_requirements(requirements: &[String]) -> String {
    if requirements.is_empty() {
        return "No requirements listed.".to_string();
    }

    requirements
        .iter()
        .enumerate()
        .map(|(idx, req)| format!("{}. {}", idx + 1, req))
        .collect::<Vec<_>>()
        .join("\n")
}
