//! High score leaderboard
//!
//! Persisted as a JSON file next to the game, tracks the top 10 runs.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::{Grade, RunSummary};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u32,
    pub grade: Grade,
    /// Streak held when the run ended
    pub streak: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Record a finished run (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_run(&mut self, summary: &RunSummary, timestamp: f64) -> Option<usize> {
        if !self.qualifies(summary.score) {
            return None;
        }

        let entry = HighScoreEntry {
            score: summary.score,
            grade: summary.grade,
            streak: summary.streak,
            timestamp,
        };

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| summary.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the leaderboard from a JSON file; a missing file is an empty board
    pub fn load_from(path: &Path) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(json) => {
                let scores: HighScores = serde_json::from_str(&json).map_err(io::Error::other)?;
                log::info!("loaded {} high scores", scores.entries.len());
                Ok(scores)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("no high scores found, starting fresh");
                Ok(Self::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Save the leaderboard to a JSON file
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)?;
        log::info!("high scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
