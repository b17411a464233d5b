//! Discovery of per-game directories under a logs root.
//!
//! Each game lives in its own subdirectory holding `game_logs.json` and,
//! optionally, an outcome file. The directory is the only thing tying the
//! two files together, so both paths are resolved once into a [`GameBundle`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{debug, warn};

use crate::extract::WinnerGate;
use crate::loader::load_games;
use crate::record::{GameRecord, OutcomeMeta};

pub const GAME_LOG_FILE: &str = "game_logs.json";
pub const COMPLETE_META_FILE: &str = "game_complete.json";
pub const PARTIAL_META_FILE: &str = "game_partial.json";

/// Files belonging to one game directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameBundle {
    /// Directory name, used as the game identifier in logs.
    pub game_id: String,
    pub log_path: PathBuf,
    /// `game_complete.json` if present, else `game_partial.json`, else `None`.
    pub meta_path: Option<PathBuf>,
}

impl GameBundle {
    /// Resolve the files of `dir`. Returns `None` when `game_logs.json` is missing.
    pub fn resolve(dir: &Path) -> Option<Self> {
        let log_path = dir.join(GAME_LOG_FILE);
        if !log_path.is_file() {
            return None;
        }
        let meta_path = [COMPLETE_META_FILE, PARTIAL_META_FILE]
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file());
        let game_id = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        Some(Self {
            game_id,
            log_path,
            meta_path,
        })
    }
}

/// Why a game was left out of a filtered run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingMetadata,
    UnreadableMetadata,
    /// Metadata yielded no object to read a winner from.
    EmptyMetadata,
    /// Winner absent or not one of the two faction labels.
    UnresolvedWinner,
}

/// Whether a game takes part in the run, and under which gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Use(WinnerGate),
    Skip(SkipReason),
}

/// A game that passed the gate, with its records loaded.
#[derive(Debug, Clone)]
pub struct ScannedGame {
    pub bundle: GameBundle,
    pub records: Vec<GameRecord>,
    pub gate: WinnerGate,
}

/// Immediate subdirectories of `logs_dir`, sorted by path. Plain files at the
/// top level are ignored, and so are entries that cannot be inspected (such as
/// dangling symlinks).
pub fn game_dirs(logs_dir: &Path) -> Result<Vec<PathBuf>> {
    if !logs_dir.is_dir() {
        bail!("logs directory '{}' does not exist", logs_dir.display());
    }
    let mut dirs = Vec::new();
    for entry in walkdir::WalkDir::new(logs_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(err).with_context(|| format!("failed to list {}", logs_dir.display()));
            }
            Err(err) => {
                warn!("Skipping unreadable entry under {}: {err}", logs_dir.display());
                continue;
            }
        };
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Every game directory under `logs_dir` that has a `game_logs.json`.
pub fn discover_games(logs_dir: &Path) -> Result<Vec<GameBundle>> {
    let mut games = Vec::new();
    for dir in game_dirs(logs_dir)? {
        match GameBundle::resolve(&dir) {
            Some(bundle) => games.push(bundle),
            None => debug!("Skipping {} because {GAME_LOG_FILE} is missing", dir.display()),
        }
    }
    Ok(games)
}

/// Decide how a game participates. Without filtering every game is used; with
/// filtering the first metadata record must name a winning faction.
pub fn resolve_gate(bundle: &GameBundle, filter_by_winner: bool) -> GateDecision {
    if !filter_by_winner {
        return GateDecision::Use(WinnerGate::Unfiltered);
    }
    let Some(meta_path) = &bundle.meta_path else {
        return GateDecision::Skip(SkipReason::MissingMetadata);
    };
    let values = match load_games(meta_path) {
        Ok(values) => values,
        Err(err) => {
            warn!("{}: {err:#}", bundle.game_id);
            return GateDecision::Skip(SkipReason::UnreadableMetadata);
        }
    };
    let Some(meta) = values.first().and_then(OutcomeMeta::from_json) else {
        return GateDecision::Skip(SkipReason::EmptyMetadata);
    };
    match meta.winner {
        Some(winner) => GateDecision::Use(WinnerGate::Winner(winner)),
        None => GateDecision::Skip(SkipReason::UnresolvedWinner),
    }
}

/// Gate and load one game. `Ok(None)` means the game was skipped.
pub fn scan_game(bundle: GameBundle, filter_by_winner: bool) -> Result<Option<ScannedGame>> {
    let gate = match resolve_gate(&bundle, filter_by_winner) {
        GateDecision::Use(gate) => gate,
        GateDecision::Skip(reason) => {
            debug!("Skipping game {}: {reason:?}", bundle.game_id);
            return Ok(None);
        }
    };
    let values = load_games(&bundle.log_path)?;
    let total = values.len();
    let records: Vec<GameRecord> = values.iter().filter_map(GameRecord::from_json).collect();
    if records.len() != total {
        debug!(
            "Game {}: ignored {} non-object entries",
            bundle.game_id,
            total - records.len()
        );
    }
    Ok(Some(ScannedGame {
        bundle,
        records,
        gate,
    }))
}

/// Scan all games under `logs_dir`, in directory-name order.
pub fn scan_games(logs_dir: &Path, filter_by_winner: bool) -> Result<Vec<ScannedGame>> {
    let mut scanned = Vec::new();
    for bundle in discover_games(logs_dir)? {
        if let Some(game) = scan_game(bundle, filter_by_winner)? {
            scanned.push(game);
        }
    }
    Ok(scanned)
}
