use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

use gdps_list::config::Config;
use gdps_list::content::{self, edit, Direction, EditError, Editor, LevelField, ListEntry, Record};
use gdps_list::scoring::{self, ScoreError, ScoreInput};
use gdps_list::store::{self, Store};
use gdps_list::{backup, browser, logging, output};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DATA: i32 = 1;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum ThemeAction {
    /// Print the current preference
    Show,
    /// Flip dark mode and save it
    Toggle,
}

#[derive(Subcommand, Debug)]
enum LevelAction {
    /// Show a level and its records
    Show { rank: usize },
    /// Append a level to the bottom of the list
    Add {
        /// File name of the level without .json
        stem: String,
    },
    /// Remove a level from the list and delete its file
    Remove { rank: usize },
    /// Move a level one place up or down
    Move { rank: usize, direction: Direction },
    /// Change one field of a level (points: -1 or auto = rank curve)
    Set {
        rank: usize,
        field: LevelField,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

#[derive(Subcommand, Debug)]
enum RecordAction {
    /// Add a record to a level
    Add {
        rank: usize,
        user: String,
        percent: f64,
        /// Video link
        #[arg(long, default_value = "")]
        link: String,
        #[arg(long, default_value_t = edit::DEFAULT_HZ)]
        hz: u32,
        #[arg(long)]
        mobile: bool,
    },
    /// Remove every record by a player from a level
    Remove { rank: usize, user: String },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Show,
    /// Change one setting and publish it to _settings.json
    Set {
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

#[derive(Subcommand, Debug)]
enum EditorsAction {
    Show,
    Add {
        role: String,
        name: String,
        #[arg(long)]
        link: Option<String>,
    },
    /// Remove an editor by name
    Remove { name: String },
}

#[derive(Subcommand, Debug)]
enum RequirementsAction {
    Show,
    Add { text: String },
    /// Remove a requirement by its number
    Remove { index: usize },
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the list with the points a completion earns (default if no subcommand)
    List,
    /// Show players ranked by total points
    Leaderboard {
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Show a level by rank, or edit the list's levels
    #[command(args_conflicts_with_subcommands = true)]
    Level {
        /// Rank of the level (1-based, as shown in list)
        rank: Option<usize>,
        #[command(subcommand)]
        action: Option<LevelAction>,
    },
    /// Add or remove records on a level
    Record {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Show a player's verified, completed and progressed levels
    Player {
        /// Player name (case-insensitive)
        name: String,
    },
    /// Compute the points for a rank and completion percentage
    Score {
        rank: u32,
        percent: f64,
        /// Percent required to qualify for the list
        #[arg(long, default_value_t = 100.0)]
        min_percent: f64,
        /// Manual points override (-1 = auto)
        #[arg(long, allow_hyphen_values = true)]
        points: Option<f64>,
        /// Reject out-of-range input instead of scoring it
        #[arg(long)]
        strict: bool,
    },
    /// Open a level's verification video in the browser
    Open {
        /// Rank of the level (1-based, as shown in list)
        rank: usize,
    },
    /// Show the site settings after merging the published overrides
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Show or edit the list editors
    Editors {
        #[command(subcommand)]
        action: Option<EditorsAction>,
    },
    /// Show or edit the record submission requirements
    Requirements {
        #[command(subcommand)]
        action: Option<RequirementsAction>,
    },
    /// Show or toggle dark mode
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
    /// Copy the data directory into a timestamped backup folder
    Backup,
    /// Copy a backup's files back over the data directory
    Restore {
        /// Backup folder to restore from
        backup: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(name = "gdps-list")]
#[command(about = "Demon list scoring and leaderboard CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/gdps-list/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Data directory holding _list.json (overrides config)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let start_time = Instant::now();

    let config = match gdps_list::config::load_config(cli.config.map(PathBuf::from)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let data_dir = cli.data.unwrap_or_else(|| config.data_dir());
    debug!(data_dir = %data_dir.display(), "using data directory");

    let command = cli.command.unwrap_or(Commands::List);
    let code = match run(command, &config, &data_dir) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    };

    debug!(elapsed = ?start_time.elapsed(), "done");
    std::process::exit(code);
}

/// Bad input from the command line is a usage error, anything else a data error.
fn exit_code_for(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<EditError>().is_some() || error.downcast_ref::<ScoreError>().is_some() {
        EXIT_CONFIG
    } else {
        EXIT_DATA
    }
}

/// Resolve a 1-based rank to a loaded level, printing why when it can't.
fn select_level(entries: &[ListEntry], rank: usize) -> Result<&content::RankedLevel, i32> {
    if rank < 1 || rank > entries.len() {
        eprintln!(
            "Invalid rank {}. Must be between 1 and {}.",
            rank,
            entries.len()
        );
        return Err(EXIT_CONFIG);
    }

    match &entries[rank - 1] {
        ListEntry::Loaded(level) => Ok(level),
        ListEntry::Failed { path, reason, .. } => {
            eprintln!("Level #{} ({}) failed to load: {}", rank, path, reason);
            Err(EXIT_DATA)
        }
    }
}

fn load_store(config: &Config, data_dir: &Path) -> anyhow::Result<Store> {
    let preferences_path = match config.preferences {
        Some(ref path) => path.clone(),
        None => store::get_preferences_path()?,
    };
    Ok(Store::load(data_dir, preferences_path))
}

fn run(command: Commands, config: &Config, data_dir: &Path) -> anyhow::Result<i32> {
    let use_colors = output::should_use_colors();

    match command {
        Commands::List => {
            let entries = content::fetch_list(data_dir)?;
            println!("{}", output::format_list_table(&entries, use_colors));
        }
        Commands::Leaderboard { tsv } => {
            let entries = content::fetch_list(data_dir)?;
            let board = content::fetch_leaderboard(&entries);
            if tsv {
                println!("{}", output::format_leaderboard_tsv(&board));
            } else {
                println!("{}", output::format_leaderboard_table(&board, use_colors));
            }
            if !board.errors.is_empty() {
                eprintln!(
                    "Leaderboard is incomplete, failed to load: {}",
                    board.errors.join(", ")
                );
            }
        }
        Commands::Level { rank, action } => {
            let action = match (action, rank) {
                (Some(action), _) => action,
                (None, Some(rank)) => LevelAction::Show { rank },
                (None, None) => {
                    eprintln!("Missing level rank. Usage: gdps-list level <RANK>");
                    return Ok(EXIT_CONFIG);
                }
            };
            return run_level(action, data_dir, use_colors);
        }
        Commands::Record { action } => match action {
            RecordAction::Add {
                rank,
                user,
                percent,
                link,
                hz,
                mobile,
            } => {
                let record = Record {
                    user: user.clone(),
                    link,
                    percent,
                    hz: Some(hz),
                    mobile,
                };
                edit::add_record(data_dir, rank, record)?;
                println!("Added record by {} to level #{}", user, rank);
            }
            RecordAction::Remove { rank, user } => {
                let removed = edit::remove_record(data_dir, rank, &user)?;
                println!("Removed {} record(s) by {} from level #{}", removed, user, rank);
            }
        },
        Commands::Player { name } => {
            let entries = content::fetch_list(data_dir)?;
            let board = content::fetch_leaderboard(&entries);
            match board.position(&name) {
                Some((position, player)) => {
                    println!("{}", output::format_player_detail(position, player, use_colors))
                }
                None => {
                    eprintln!("No player named '{}' on the leaderboard.", name);
                    return Ok(EXIT_DATA);
                }
            }
        }
        Commands::Score {
            rank,
            percent,
            min_percent,
            points,
            strict,
        } => {
            let input = ScoreInput::new(rank, percent, min_percent).with_manual_points(points);
            if strict || config.strict {
                scoring::try_score(&input)?;
            }
            let result = scoring::evaluate(&input);
            println!("{}", output::format_score_explain(&input, &result));
        }
        Commands::Open { rank } => {
            let entries = content::fetch_list(data_dir)?;
            match select_level(&entries, rank) {
                Ok(level) => browser::open_url(&level.level.verification)?,
                Err(code) => return Ok(code),
            }
        }
        Commands::Settings { action } => {
            let mut store = load_store(config, data_dir)?;
            if let Some(SettingsAction::Set { key, value }) = action {
                store.set_setting(&key, &value)?;
            }
            println!("{}", output::format_settings(&store));
        }
        Commands::Editors { action } => match action.unwrap_or(EditorsAction::Show) {
            EditorsAction::Show => {
                let editors = content::fetch_editors(data_dir)?.unwrap_or_default();
                println!("{}", output::format_editors(&editors));
            }
            EditorsAction::Add { role, name, link } => {
                let line = format!("Added {}: {}", role, name);
                edit::add_editor(data_dir, Editor { role, name, link })?;
                println!("{}", line);
            }
            EditorsAction::Remove { name } => {
                let removed = edit::remove_editor(data_dir, &name)?;
                println!("Removed {} editor(s) named {}", removed, name);
            }
        },
        Commands::Requirements { action } => match action.unwrap_or(RequirementsAction::Show) {
            RequirementsAction::Show => {
                let requirements = content::fetch_requirements(data_dir)?.unwrap_or_default();
                println!("{}", output::format_requirements(&requirements));
            }
            RequirementsAction::Add { text } => {
                let count = edit::add_requirement(data_dir, &text)?;
                println!("{} requirement(s) listed", count);
            }
            RequirementsAction::Remove { index } => {
                let removed = edit::remove_requirement(data_dir, index)?;
                println!("Removed requirement: {}", removed);
            }
        },
        Commands::Theme { action } => {
            let mut store = load_store(config, data_dir)?;
            let dark = match action.unwrap_or(ThemeAction::Show) {
                ThemeAction::Show => store.is_dark(),
                ThemeAction::Toggle => store.toggle_dark()?,
            };
            println!("{}", if dark { "dark" } else { "light" });
        }
        Commands::Backup => {
            let path = backup::create_backup(data_dir, &config.backup_dir())?;
            println!("Backup created at {}", path.display());
        }
        Commands::Restore { backup: backup_path } => {
            let restored = backup::restore_backup(&backup_path, data_dir)?;
            println!("Restored {} files into {}", restored, data_dir.display());
        }
    }

    Ok(EXIT_SUCCESS)
}

fn run_level(action: LevelAction, data_dir: &Path, use_colors: bool) -> anyhow::Result<i32> {
    match action {
        LevelAction::Show { rank } => {
            let entries = content::fetch_list(data_dir)?;
            match select_level(&entries, rank) {
                Ok(level) => println!("{}", output::format_level_detail(level, use_colors)),
                Err(code) => return Ok(code),
            }
        }
        LevelAction::Add { stem } => {
            let rank = edit::add_level(data_dir, &stem)?;
            println!("Added {} at #{}", stem.trim(), rank);
        }
        LevelAction::Remove { rank } => {
            let stem = edit::remove_level(data_dir, rank)?;
            println!("Removed {} from #{}", stem, rank);
        }
        LevelAction::Move { rank, direction } => {
            let new_rank = edit::move_level(data_dir, rank, direction)?;
            if new_rank == rank {
                println!("Level #{} is already at the end of the list", rank);
            } else {
                println!("Moved level #{} to #{}", rank, new_rank);
            }
        }
        LevelAction::Set { rank, field, value } => {
            edit::set_level_field(data_dir, rank, field, &value)?;
            println!("Set {} of level #{}", field, rank);
        }
    }

    Ok(EXIT_SUCCESS)
}
