//! pagenav CLI
//!
//! Page through the items of a text file in the terminal, and manage the
//! persisted mode preference.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pagenav::storage::{JsonFileStore, KeyValueStore};
use pagenav::types::{default_modes, BrowseConfig, ItemSplit, ModeOption, SELECTED_MODE_KEY};

/// Log file written during `browse`, next to the store file.
const LOG_FILENAME: &str = "pagenav.log";

#[derive(Parser)]
#[command(name = "pagenav")]
#[command(about = "Page through a file with buttons and arrow keys")]
#[command(version)]
struct Cli {
    /// Store file for persisted preferences (default: data directory)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Page through the items of a text file
    Browse {
        /// File to page through
        path: PathBuf,

        /// One item per line instead of per paragraph
        #[arg(long)]
        lines: bool,

        /// Item to show first (0-based)
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Enter moves to the next item
        #[arg(long)]
        enter_key: bool,

        /// Disable left/right arrow navigation
        #[arg(long)]
        no_arrow_keys: bool,

        /// Modes offered in the mode modal, as value or value=Label
        #[arg(long, value_delimiter = ',')]
        modes: Vec<String>,
    },

    /// Show or change the saved mode
    Mode {
        #[command(subcommand)]
        action: ModeAction,
    },
}

#[derive(Subcommand)]
enum ModeAction {
    /// Print the saved mode
    Show,
    /// Save a mode
    Set {
        /// Mode value to save
        value: String,
    },
    /// Forget the saved mode
    Clear,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let store = match cli.store {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::open_default(),
    };

    let result = match cli.command {
        Commands::Browse {
            path,
            lines,
            start,
            enter_key,
            no_arrow_keys,
            modes,
        } => {
            init_logging(LogTarget::File(log_path(store.path())));
            let config = BrowseConfig {
                path,
                split: if lines { ItemSplit::Lines } else { ItemSplit::Paragraphs },
                start,
                enable_enter_key: enter_key,
                enable_arrow_keys: !no_arrow_keys,
                modes: parse_modes(&modes),
            };
            cmd_browse(&config, store)
        }
        Commands::Mode { action } => {
            init_logging(LogTarget::Stderr);
            cmd_mode(action, &store)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// LOGGING
// ============================================================================

enum LogTarget {
    Stderr,
    /// The terminal is in raw mode while browsing; log to a file instead.
    File(PathBuf),
}

fn log_path(store_path: &Path) -> PathBuf {
    store_path
        .parent()
        .map(|dir| dir.join(LOG_FILENAME))
        .unwrap_or_else(|| PathBuf::from(LOG_FILENAME))
}

/// Install the tracing subscriber. `RUST_LOG` overrides the default `warn`.
fn init_logging(target: LogTarget) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match target {
        LogTarget::Stderr => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
        LogTarget::File(path) => {
            if let Some(dir) = path.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => {
                    let _ = builder
                        .with_ansi(false)
                        .with_writer(Mutex::new(file))
                        .try_init();
                }
                Err(e) => {
                    eprintln!("Note: logging disabled, cannot open {}: {}", path.display(), e);
                }
            }
        }
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

/// Parse `value` or `value=Label` entries. Empty input yields the defaults.
fn parse_modes(raw: &[String]) -> Vec<ModeOption> {
    let modes: Vec<ModeOption> = raw
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((value, label)) => ModeOption::new(value.trim(), label.trim()),
            None => ModeOption::plain(entry),
        })
        .collect();

    if modes.is_empty() { default_modes() } else { modes }
}

fn cmd_browse(config: &BrowseConfig, store: JsonFileStore) -> Result<(), String> {
    pagenav::tui::run(config, store).map_err(|e| e.to_string())
}

fn cmd_mode(action: ModeAction, store: &JsonFileStore) -> Result<(), String> {
    match action {
        ModeAction::Show => {
            match store.get_item(SELECTED_MODE_KEY).map_err(|e| e.to_string())? {
                Some(mode) if !mode.is_empty() => println!("{}", mode),
                _ => println!("No mode selected."),
            }
        }
        ModeAction::Set { value } => {
            let value = value.trim();
            if value.is_empty() {
                return Err("Mode value must not be empty".to_string());
            }
            store
                .set_item(SELECTED_MODE_KEY, value)
                .map_err(|e| e.to_string())?;
            println!("Saved mode: {}", value);
        }
        ModeAction::Clear => {
            store
                .remove_item(SELECTED_MODE_KEY)
                .map_err(|e| e.to_string())?;
            println!("Cleared saved mode.");
        }
    }

    println!("Store: {}", store.path().display());
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn modes_parse_values_and_labels() {
        let raw = vec!["dark=Dark theme".to_string(), " light ".to_string(), "".to_string()];
        assert_eq!(
            parse_modes(&raw),
            vec![ModeOption::new("dark", "Dark theme"), ModeOption::plain("light")]
        );
    }

    #[test]
    fn no_modes_falls_back_to_defaults() {
        assert_eq!(parse_modes(&[]), default_modes());
    }

    #[test]
    fn browse_flags_parse() {
        let cli = Cli::try_parse_from([
            "pagenav", "--store", "/tmp/s.json", "browse", "notes.txt", "--lines", "--start", "2",
            "--enter-key", "--modes", "a,b=B",
        ])
        .unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/s.json")));
        match cli.command {
            Commands::Browse { path, lines, start, enter_key, no_arrow_keys, modes } => {
                assert_eq!(path, PathBuf::from("notes.txt"));
                assert!(lines);
                assert_eq!(start, 2);
                assert!(enter_key);
                assert!(!no_arrow_keys);
                assert_eq!(modes, vec!["a", "b=B"]);
            }
            _ => panic!("Expected Browse command"),
        }
    }

    #[test]
    fn mode_commands_round_trip_through_store() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("storage.json"));

        cmd_mode(ModeAction::Set { value: " review ".to_string() }, &store).unwrap();
        assert_eq!(store.get_item(SELECTED_MODE_KEY).unwrap().as_deref(), Some("review"));

        cmd_mode(ModeAction::Clear, &store).unwrap();
        assert_eq!(store.get_item(SELECTED_MODE_KEY).unwrap(), None);

        assert!(cmd_mode(ModeAction::Set { value: "  ".to_string() }, &store).is_err());
    }

    #[test]
    fn browse_error_for_missing_file_is_reported_once() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = BrowseConfig {
            path: tmp.path().join("missing.txt"),
            ..Default::default()
        };
        let store = JsonFileStore::new(tmp.path().join("storage.json"));

        let err = cmd_browse(&config, store).unwrap_err();
        assert_eq!(err.matches("missing.txt").count(), 1);
    }

    #[test]
    fn log_file_sits_next_to_store() {
        assert_eq!(
            log_path(Path::new("/data/pagenav/storage.json")),
            PathBuf::from("/data/pagenav/pagenav.log")
        );
    }
}
