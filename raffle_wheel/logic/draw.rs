use crate::error::{RaffleError, RaffleError::*};
use crate::{Degrees, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type SpinId = u64;
pub type SessionId = u64;

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Wheel {
    Participants,
    Prizes,
}

/// Where the session stands in the participant / prize cycle.
///
/// The spinning states hold the drawn index while the wheel turns; the drawn
/// value is only revealed once the spin is finished.
#[derive(Default, Debug, Eq, PartialEq, Clone)]
pub enum DrawState {
    #[default]
    Idle,
    SpinningParticipant {
        spin: SpinId,
        index: usize,
    },
    AwaitingParticipantDecision {
        index: usize,
        participant: String,
    },
    SpinningPrize {
        spin: SpinId,
        index: usize,
        participant: String,
        position: Position,
    },
    AwaitingPrize {
        participant: String,
        position: Position,
    },
}

impl DrawState {
    /// true when a winner is waiting for a prize, spinning or not
    pub fn is_prize_pending(&self) -> bool {
        matches!(
            self,
            DrawState::AwaitingPrize { .. } | DrawState::SpinningPrize { .. }
        )
    }

    /// true when a participant draw is not settled yet
    pub fn is_participant_outstanding(&self) -> bool {
        matches!(
            self,
            DrawState::SpinningParticipant { .. } | DrawState::AwaitingParticipantDecision { .. }
        )
    }

    pub fn is_spinning(&self) -> bool {
        matches!(
            self,
            DrawState::SpinningParticipant { .. } | DrawState::SpinningPrize { .. }
        )
    }
}

/// A spin in flight. It is not `Clone`: handing it back to the session is the
/// single completion of the animation.
#[derive(Debug, PartialEq)]
pub struct Spin {
    pub(crate) session: SessionId,
    pub(crate) id: SpinId,
    pub(crate) wheel: Wheel,
    pub(crate) index: usize,
    pub(crate) pool_size: usize,
    pub(crate) from: Degrees,
    pub(crate) to: Degrees,
}

impl Spin {
    pub fn id(&self) -> SpinId {
        self.id
    }

    pub fn wheel(&self) -> Wheel {
        self.wheel
    }

    /// index of the winning wedge, in the pool as it was when the spin started
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// accumulated rotation of the wheel before the spin
    pub fn from_rotation(&self) -> Degrees {
        self.from
    }

    /// accumulated rotation the animation must reach
    pub fn target_rotation(&self) -> Degrees {
        self.to
    }
}

/// What the animation revealed
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub enum SpinOutcome {
    Participant {
        index: usize,
        participant: String,
    },
    Prize {
        participant: String,
        prize: String,
        position: Position,
    },
}

/// Pick an index uniformly in `[0, pool_size)`
pub fn pick_index<R: Rng + ?Sized>(rng: &mut R, pool_size: usize) -> Result<usize, RaffleError> {
    if pool_size == 0 {
        return Err(EmptyPool);
    }
    Ok(rng.gen_range(0..pool_size))
}
