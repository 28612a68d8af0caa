use crate::error::{RaffleError, RaffleError::*};
use serde::{Deserialize, Serialize};

/// Ordered candidates of one wheel. Each entry, duplicates included, occupies
/// its own wedge in insertion order.
#[derive(Default, Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pool {
    entries: Vec<String>,
}

impl Pool {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// Parse the raw text typed by the operator: one entry per line, trimmed,
    /// blank lines dropped, order kept, no deduplication.
    pub fn load_from_text(raw: &str) -> Self {
        let entries = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Self { entries }
    }

    /// Inverse of `load_from_text` modulo whitespace and blank lines.
    pub fn serialize(&self) -> String {
        self.entries.join("\n")
    }

    /// Remove and return the entry at `index`. Entries after it shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<String, RaffleError> {
        if index >= self.entries.len() {
            return Err(InvalidIndex);
        }
        Ok(self.entries.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
