//! Match results and aggregate statistics
//!
//! The simulation hands one `MatchRecord` per finished match to a
//! `MatchRecorder`. `MatchLog` is the bundled recorder: a bounded,
//! newest-first history persisted as JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::settings::OpponentKind;

/// Maximum number of matches kept in the log
pub const MAX_MATCH_RECORDS: usize = 100;

/// Outcome from the local player's (team 0) perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Loss,
}

/// Result of one finished match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub result: MatchResult,
    pub opponent_type: OpponentKind,
    /// Theme key of the terrain the match was played on
    pub terrain_type: String,
    pub duration_seconds: u32,
    /// Living worms on team 0 at the end
    pub units_remaining: u32,
}

/// Receives finished-match records
pub trait MatchRecorder {
    fn record(&mut self, record: &MatchRecord);
}

/// Win/loss counts for one terrain theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerrainTally {
    pub wins: u32,
    pub losses: u32,
}

/// Match history, newest first
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MatchLog {
    pub entries: Vec<MatchRecord>,
}

impl MatchLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a record at the front, dropping the oldest past the cap
    pub fn push(&mut self, record: MatchRecord) {
        self.entries.insert(0, record);
        self.entries.truncate(MAX_MATCH_RECORDS);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn wins(&self) -> u32 {
        self.count(MatchResult::Win)
    }

    pub fn losses(&self) -> u32 {
        self.count(MatchResult::Loss)
    }

    fn count(&self, result: MatchResult) -> u32 {
        self.entries.iter().filter(|e| e.result == result).count() as u32
    }

    /// Fraction of matches won (0.0 when empty)
    pub fn win_rate(&self) -> f32 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.wins() as f32 / self.entries.len() as f32
    }

    /// Consecutive wins ending with the most recent match
    pub fn current_streak(&self) -> u32 {
        self.entries
            .iter()
            .take_while(|e| e.result == MatchResult::Win)
            .count() as u32
    }

    /// Per-terrain win/loss counts
    pub fn by_terrain(&self) -> BTreeMap<String, TerrainTally> {
        let mut tally: BTreeMap<String, TerrainTally> = BTreeMap::new();
        for e in &self.entries {
            let t = tally.entry(e.terrain_type.clone()).or_default();
            match e.result {
                MatchResult::Win => t.wins += 1,
                MatchResult::Loss => t.losses += 1,
            }
        }
        tally
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a file; a missing file is an empty log
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No match log at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let log = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded {} match records", log.entries.len());
        Ok(log)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Match log saved ({} entries)", self.entries.len());
        Ok(())
    }
}

impl MatchRecorder for MatchLog {
    fn record(&mut self, record: &MatchRecord) {
        self.push(record.clone());
    }
}
