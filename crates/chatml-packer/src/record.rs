//! Typed views over the loosely structured JSON written by the game simulator.
//!
//! The simulator logs are not schema-checked, so every conversion here is
//! best-effort: fields with the wrong shape are treated as absent rather than
//! rejecting the whole record.

use std::fmt;

use serde_json::{Map as JsonMap, Value as JsonValue};

/// Outcome label recorded for a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Werewolves,
    Villagers,
}

impl Faction {
    /// Parse the exact label used by the simulator. Anything else is unresolved.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Werewolves" => Some(Faction::Werewolves),
            "Villagers" => Some(Faction::Villagers),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Faction::Werewolves => "Werewolves",
            Faction::Villagers => "Villagers",
        }
    }

    fn from_json(value: Option<&JsonValue>) -> Option<Self> {
        value.and_then(JsonValue::as_str).and_then(Self::from_label)
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single prompted action taken by a player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionEntry {
    pub prompt: Option<String>,
    pub raw_resp: Option<String>,
}

impl ActionEntry {
    /// Build an entry from a JSON object; non-objects yield `None`.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            prompt: string_field(map, "prompt"),
            raw_resp: string_field(map, "raw_resp"),
        })
    }

    /// Prompt and response, only when both are present and non-empty.
    pub fn usable(&self) -> Option<(&str, &str)> {
        let prompt = self.prompt.as_deref().filter(|s| !s.is_empty())?;
        let resp = self.raw_resp.as_deref().filter(|s| !s.is_empty())?;
        Some((prompt, resp))
    }
}

/// One `[actor, entry]` pair inside a bidding round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidTurn {
    /// Player label as logged. Not part of any emitted example.
    pub actor: String,
    pub entry: ActionEntry,
}

/// One simulated match as parsed from a log line or array element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRecord {
    pub winner: Option<Faction>,
    pub eliminate: Option<ActionEntry>,
    pub bid: Vec<Vec<BidTurn>>,
}

impl GameRecord {
    /// Convert a decoded JSON value into a record. Non-objects yield `None`;
    /// unknown keys are ignored and malformed `bid` structure is skipped
    /// piecewise.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let map = value.as_object()?;
        let eliminate = map.get("eliminate").and_then(ActionEntry::from_json);
        let bid: Vec<Vec<BidTurn>> = match map.get("bid").and_then(JsonValue::as_array) {
            Some(rounds) => rounds
                .iter()
                .filter_map(JsonValue::as_array)
                .map(|round| round.iter().filter_map(bid_turn).collect())
                .collect(),
            None => Vec::new(),
        };
        Some(Self {
            winner: Faction::from_json(map.get("winner")),
            eliminate,
            bid,
        })
    }
}

/// Per-game outcome metadata (`game_complete.json` / `game_partial.json`).
/// Only `winner` is consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeMeta {
    pub winner: Option<Faction>,
}

impl OutcomeMeta {
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            winner: Faction::from_json(map.get("winner")),
        })
    }
}

fn bid_turn(value: &JsonValue) -> Option<BidTurn> {
    let pair = value.as_array()?;
    let [actor, entry] = pair.as_slice() else {
        return None;
    };
    let actor = match actor {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    };
    Some(BidTurn {
        actor,
        entry: ActionEntry::from_json(entry)?,
    })
}

fn string_field(map: &JsonMap<String, JsonValue>, key: &str) -> Option<String> {
    map.get(key).and_then(JsonValue::as_str).map(str::to_owned)
}
