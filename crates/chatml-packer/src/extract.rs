//! Role-based example extraction.
//!
//! Eliminator turns become werewolf examples and villager-addressed bidding
//! turns become villager examples. When winner filtering is on, a game only
//! feeds the collection of the faction that won it.

use serde::Serialize;

use crate::format::format_conversation;
use crate::record::{ActionEntry, Faction, GameRecord};

/// Bidding prompts must contain this text to count as villager turns.
pub const VILLAGER_MARKER: &str = "the Villager";

/// Which collections a game may contribute to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinnerGate {
    /// Winner filtering is off: every record feeds both collections.
    Unfiltered,
    /// Only the winning faction's collection is fed. The winner comes from the
    /// game's metadata and applies to every record in its log.
    Winner(Faction),
}

impl WinnerGate {
    pub fn admits(self, faction: Faction) -> bool {
        match self {
            WinnerGate::Unfiltered => true,
            WinnerGate::Winner(winner) => winner == faction,
        }
    }
}

/// One formatted training conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Example {
    pub text: String,
}

impl Example {
    fn from_entry(entry: &ActionEntry) -> Option<Self> {
        let (prompt, resp) = entry.usable()?;
        Some(Self {
            text: format_conversation(prompt, resp),
        })
    }
}

/// Accumulated examples for one pipeline run, in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleSets {
    pub werewolf: Vec<Example>,
    pub villager: Vec<Example>,
}

impl ExampleSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every example `record` yields under `gate`.
    pub fn extend_from_record(&mut self, record: &GameRecord, gate: WinnerGate) {
        if gate.admits(Faction::Werewolves) {
            if let Some(example) = record.eliminate.as_ref().and_then(Example::from_entry) {
                self.werewolf.push(example);
            }
        }

        if gate.admits(Faction::Villagers) {
            let turns = record.bid.iter().flatten();
            for turn in turns {
                let addressed = turn
                    .entry
                    .prompt
                    .as_deref()
                    .is_some_and(|p| p.contains(VILLAGER_MARKER));
                if !addressed {
                    continue;
                }
                if let Some(example) = Example::from_entry(&turn.entry) {
                    self.villager.push(example);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.werewolf.is_empty() && self.villager.is_empty()
    }
}
