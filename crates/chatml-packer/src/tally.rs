//! Win counts per faction across a logs directory.

use std::path::Path;

use anyhow::Result;
use log::{debug, warn};

use crate::loader::read_outcome_meta;
use crate::record::Faction;
use crate::scan::{COMPLETE_META_FILE, game_dirs};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub villager_wins: usize,
    pub werewolf_wins: usize,
    /// Completed games whose metadata names no recognised winner.
    pub unresolved: usize,
}

impl OutcomeTally {
    fn record(&mut self, winner: Option<Faction>) {
        match winner {
            Some(Faction::Villagers) => self.villager_wins += 1,
            Some(Faction::Werewolves) => self.werewolf_wins += 1,
            None => self.unresolved += 1,
        }
    }
}

/// Count winners from each game's `game_complete.json`.
///
/// Directories without the file, unreadable files, and files that are not a
/// single JSON object are not counted at all.
pub fn count_game_outcomes(logs_dir: &Path) -> Result<OutcomeTally> {
    let mut tally = OutcomeTally::default();
    for dir in game_dirs(logs_dir)? {
        let meta_path = dir.join(COMPLETE_META_FILE);
        if !meta_path.is_file() {
            continue;
        }
        match read_outcome_meta(&meta_path) {
            Ok(Some(meta)) => tally.record(meta.winner),
            Ok(None) => debug!("Skipping {}: not a JSON object", meta_path.display()),
            Err(err) => warn!("Skipping {}: {err:#}", meta_path.display()),
        }
    }
    Ok(tally)
}
