use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Eq, PartialEq, Copy, Clone, Error, Serialize, Deserialize)]
pub enum RaffleError {
    // error when drawing
    #[error("the wheel has no entry to draw")]
    EmptyPool,
    #[error("a winner is still waiting for a prize")]
    PendingAssignment,
    #[error("no confirmed winner is waiting for a prize")]
    NoPendingWinner,
    #[error("a spin is in progress or a drawn participant is awaiting a decision")]
    SpinInProgress,
    #[error("no drawn participant is awaiting a decision")]
    NoDrawnParticipant,
    #[error("the spin does not match the one in progress")]
    UnknownSpin,
    // error when computing the rotation or removing an entry
    #[error("index out of range")]
    InvalidIndex,
    // error in the history
    #[error("the prize is already assigned")]
    AlreadyAssigned,
    // error in the config
    #[error("invalid configuration")]
    InvalidConfig,
    // error in the storage
    #[error("stored value is corrupted")]
    StorageCorruption,
    #[error("storage is unavailable")]
    StorageUnavailable,
}
