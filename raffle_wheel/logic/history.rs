use crate::error::{RaffleError, RaffleError::*};
use crate::Position;
use serde::{Deserialize, Serialize};

/// A winner and the prize they received. `prize` is `None` while pending.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub participant: String,
    pub prize: Option<String>,
}

impl HistoryEntry {
    pub fn is_pending(&self) -> bool {
        self.prize.is_none()
    }
}

/// Append-only list of winners, in draw order.
#[derive(Default, Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
}

impl HistoryLedger {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    /// Append a winner waiting for a prize and return its position
    pub fn add_pending(&mut self, participant: String) -> Position {
        self.entries.push(HistoryEntry {
            participant,
            prize: None,
        });
        self.entries.len() - 1
    }

    /// Set the prize of the entry at `position`, only if it is still pending
    pub fn assign_prize(&mut self, position: Position, prize: String) -> Result<(), RaffleError> {
        let entry = self.entries.get_mut(position).ok_or(InvalidIndex)?;
        if entry.prize.is_some() {
            return Err(AlreadyAssigned);
        }
        entry.prize = Some(prize);
        Ok(())
    }

    /// The entry waiting for a prize, if any
    pub fn pending(&self) -> Option<(Position, &HistoryEntry)> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .find(|(_, entry)| entry.is_pending())
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_pending()).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
