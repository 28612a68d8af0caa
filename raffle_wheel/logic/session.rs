use crate::config::RaffleConfig;
use crate::draw::{pick_index, DrawState, SessionId, Spin, SpinId, SpinOutcome, Wheel};
use crate::error::{RaffleError, RaffleError::*};
use crate::history::HistoryLedger;
use crate::layout::{history_line, wheel_layout, Wedge};
use crate::pool::Pool;
use crate::rotation::Rotation;
use crate::storage::{read_json, KeyValueStore};
use crate::{Degrees, Position};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Sizes of the pools after a reload, so the view can warn about an empty one
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub participants: usize,
    pub prizes: usize,
}

/// Pools, history and draw cycle of one raffle.
///
/// Every transition that changes a pool or the history is written to the store
/// in one batch before it is applied in memory: when the write fails nothing
/// changes.
pub struct Session<S, R = StdRng> {
    id: SessionId,
    config: RaffleConfig,
    engine: Rotation,
    participants: Pool,
    prizes: Pool,
    history: HistoryLedger,
    state: DrawState,
    participants_rotation: Degrees,
    prizes_rotation: Degrees,
    last_spin: SpinId,
    store: S,
    rng: R,
}

/// New values for one transition, written together
#[derive(Default)]
struct Changes {
    participants: Option<Pool>,
    prizes: Option<Pool>,
    history: Option<HistoryLedger>,
}

impl<S: KeyValueStore> Session<S, StdRng> {
    /// Restore a session seeded from the operating system
    pub fn restore_with_entropy(config: RaffleConfig, store: S) -> Result<Self, RaffleError> {
        Self::restore(config, store, StdRng::from_entropy())
    }
}

impl<S: KeyValueStore, R: Rng> Session<S, R> {
    /// Empty session. Nothing is read from the store.
    pub fn new(config: RaffleConfig, store: S, rng: R) -> Result<Self, RaffleError> {
        config.validate()?;
        let engine = config.rotation()?;
        Ok(Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            config,
            engine,
            participants: Pool::default(),
            prizes: Pool::default(),
            history: HistoryLedger::default(),
            state: DrawState::Idle,
            participants_rotation: 0.0,
            prizes_rotation: 0.0,
            last_spin: 0,
            store,
            rng,
        })
    }

    /// Session rebuilt from the store.
    ///
    /// A corrupted value is logged and replaced by an empty collection. A winner
    /// still waiting for a prize puts the session back in `AwaitingPrize`.
    pub fn restore(config: RaffleConfig, store: S, rng: R) -> Result<Self, RaffleError> {
        let mut session = Self::new(config, store, rng)?;
        let keys = &session.config.keys;

        let participants = restore_pool(
            &session.store,
            &keys.participants_list,
            &keys.participants_text,
        )?;
        let prizes = restore_pool(&session.store, &keys.prizes_list, &keys.prizes_text)?;

        let history = match read_json::<HistoryLedger, _>(&session.store, &keys.history) {
            Ok(Some(history)) if history.pending_count() > 1 => {
                warn!("History with {} pending winners, ignored", history.pending_count());
                HistoryLedger::default()
            }
            Ok(Some(history)) => history,
            Ok(None) => HistoryLedger::default(),
            Err(StorageCorruption) => HistoryLedger::default(),
            Err(e) => return Err(e),
        };

        session.state = match history.pending() {
            Some((position, entry)) => DrawState::AwaitingPrize {
                participant: entry.participant.clone(),
                position,
            },
            None => DrawState::Idle,
        };
        session.participants = participants;
        session.prizes = prizes;
        session.history = history;

        info!(
            "Session restored with {} participants, {} prizes and {} winners",
            session.participants.len(),
            session.prizes.len(),
            session.history.len()
        );

        Ok(session)
    }

    /// Replace both pools with the operator's raw text and reset the wheels.
    ///
    /// A winner waiting for a prize keeps waiting; an unsettled participant draw
    /// must be finished first.
    pub fn load_pools(
        &mut self,
        participants_text: &str,
        prizes_text: &str,
    ) -> Result<LoadReport, RaffleError> {
        // check the status
        if self.state.is_participant_outstanding() || self.state.is_spinning() {
            return Err(SpinInProgress);
        }

        let participants = Pool::load_from_text(participants_text);
        let prizes = Pool::load_from_text(prizes_text);

        let keys = &self.config.keys;
        let entries = [
            (keys.participants_text.as_str(), participants_text.to_string()),
            (keys.participants_list.as_str(), to_json(&participants)?),
            (keys.prizes_text.as_str(), prizes_text.to_string()),
            (keys.prizes_list.as_str(), to_json(&prizes)?),
        ];
        write(&mut self.store, &entries)?;

        let report = LoadReport {
            participants: participants.len(),
            prizes: prizes.len(),
        };
        info!(
            "Pools loaded: {} participants, {} prizes",
            report.participants, report.prizes
        );

        self.participants = participants;
        self.prizes = prizes;
        self.participants_rotation = 0.0;
        self.prizes_rotation = 0.0;

        Ok(report)
    }

    /// Start spinning the participants wheel toward a random participant.
    /// The participant is revealed by `finish_spin`.
    pub fn draw_participant(&mut self) -> Result<Spin, RaffleError> {
        if self.participants.is_empty() {
            return Err(EmptyPool);
        }
        // only one winner can wait for a prize
        if self.state.is_prize_pending() {
            return Err(PendingAssignment);
        }
        if self.state != DrawState::Idle {
            return Err(SpinInProgress);
        }

        let spin = self.start_spin(Wheel::Participants)?;
        self.state = DrawState::SpinningParticipant {
            spin: spin.id,
            index: spin.index,
        };

        Ok(spin)
    }

    /// The drawn participant is not here: remove them from the pool for good
    pub fn confirm_participant_absent(&mut self) -> Result<String, RaffleError> {
        let DrawState::AwaitingParticipantDecision { index, .. } = self.state else {
            return Err(NoDrawnParticipant);
        };

        let mut participants = self.participants.clone();
        let participant = participants.remove(index)?;

        self.commit(Changes {
            participants: Some(participants),
            ..Default::default()
        })?;
        self.state = DrawState::Idle;

        info!("Participant {participant} is absent and removed");
        Ok(participant)
    }

    /// The drawn participant is here: they leave the pool and wait for a prize
    pub fn confirm_participant_present(&mut self) -> Result<Position, RaffleError> {
        let DrawState::AwaitingParticipantDecision { index, .. } = self.state else {
            return Err(NoDrawnParticipant);
        };

        let mut participants = self.participants.clone();
        let participant = participants.remove(index)?;
        let mut history = self.history.clone();
        let position = history.add_pending(participant.clone());

        self.commit(Changes {
            participants: Some(participants),
            history: Some(history),
            ..Default::default()
        })?;

        info!("Participant {participant} is present and waits for a prize");
        self.state = DrawState::AwaitingPrize {
            participant,
            position,
        };

        Ok(position)
    }

    /// Start spinning the prizes wheel for the winner waiting for a prize.
    /// The prize is assigned by `finish_spin`.
    pub fn draw_prize(&mut self) -> Result<Spin, RaffleError> {
        let (participant, position) = match &self.state {
            DrawState::AwaitingPrize {
                participant,
                position,
            } => (participant.clone(), *position),
            DrawState::SpinningPrize { .. } => return Err(SpinInProgress),
            _ => return Err(NoPendingWinner),
        };
        if self.prizes.is_empty() {
            return Err(EmptyPool);
        }

        let spin = self.start_spin(Wheel::Prizes)?;
        self.state = DrawState::SpinningPrize {
            spin: spin.id,
            index: spin.index,
            participant,
            position,
        };

        Ok(spin)
    }

    /// Complete the animation of `spin` and apply its result.
    ///
    /// If the prize cannot be saved, the winner goes back to waiting for a
    /// prize and the prize stays in the pool.
    pub fn finish_spin(&mut self, spin: Spin) -> Result<SpinOutcome, RaffleError> {
        // spins of another session are never accepted
        if spin.session != self.id {
            return Err(UnknownSpin);
        }

        match &self.state {
            DrawState::SpinningParticipant { spin: id, index }
                if *id == spin.id && spin.wheel == Wheel::Participants =>
            {
                let index = *index;
                let participant = self.participants.get(index).ok_or(InvalidIndex)?.to_string();

                info!("Participant drawn: {participant}");
                self.state = DrawState::AwaitingParticipantDecision {
                    index,
                    participant: participant.clone(),
                };

                Ok(SpinOutcome::Participant { index, participant })
            }
            DrawState::SpinningPrize {
                spin: id,
                index,
                participant,
                position,
            } if *id == spin.id && spin.wheel == Wheel::Prizes => {
                let (index, participant, position) = (*index, participant.clone(), *position);

                let result = self.assign_prize(index, position);
                match result {
                    Ok(prize) => {
                        info!("Prize {prize} assigned to {participant}");
                        self.state = DrawState::Idle;
                        Ok(SpinOutcome::Prize {
                            participant,
                            prize,
                            position,
                        })
                    }
                    Err(e) => {
                        error!("Error when assigning the prize to {participant}: {e:?}");
                        self.state = DrawState::AwaitingPrize {
                            participant,
                            position,
                        };
                        Err(e)
                    }
                }
            }
            _ => Err(UnknownSpin),
        }
    }

    /// Wait for the animation, then finish the spin
    pub async fn run_spin<F>(
        &mut self,
        spin: Spin,
        animation: F,
    ) -> Result<SpinOutcome, RaffleError>
    where
        F: Future<Output = ()>,
    {
        animation.await;
        self.finish_spin(spin)
    }

    /// Empty the history. A winner waiting for a prize is dropped with it.
    pub fn clear_history(&mut self) -> Result<(), RaffleError> {
        self.commit(Changes {
            history: Some(HistoryLedger::default()),
            ..Default::default()
        })?;

        if self.state.is_prize_pending() {
            self.state = DrawState::Idle;
        }
        info!("History cleared");
        Ok(())
    }

    pub fn participants(&self) -> &Pool {
        &self.participants
    }

    pub fn prizes(&self) -> &Pool {
        &self.prizes
    }

    pub fn pool(&self, wheel: Wheel) -> &Pool {
        match wheel {
            Wheel::Participants => &self.participants,
            Wheel::Prizes => &self.prizes,
        }
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    /// Accumulated rotation of the wheel
    pub fn rotation(&self, wheel: Wheel) -> Degrees {
        match wheel {
            Wheel::Participants => self.participants_rotation,
            Wheel::Prizes => self.prizes_rotation,
        }
    }

    pub fn config(&self) -> &RaffleConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn wheel_layout(&self, wheel: Wheel) -> Vec<Wedge> {
        wheel_layout(self.pool(wheel), self.config.label_max_chars)
    }

    pub fn history_lines(&self) -> Vec<String> {
        self.history.entries().iter().map(history_line).collect()
    }

    fn start_spin(&mut self, wheel: Wheel) -> Result<Spin, RaffleError> {
        let pool_size = self.pool(wheel).len();
        let index = pick_index(&mut self.rng, pool_size)?;

        let from = self.rotation(wheel);
        let to = self.engine.target_rotation(pool_size, index, from)?;
        match wheel {
            Wheel::Participants => self.participants_rotation = to,
            Wheel::Prizes => self.prizes_rotation = to,
        }

        self.last_spin = self.last_spin.wrapping_add(1);
        debug!(
            "Spin {} of {wheel:?}: index {index}/{pool_size}, {from}° -> {to}°",
            self.last_spin
        );

        Ok(Spin {
            session: self.id,
            id: self.last_spin,
            wheel,
            index,
            pool_size,
            from,
            to,
        })
    }

    fn assign_prize(&mut self, index: usize, position: Position) -> Result<String, RaffleError> {
        let mut prizes = self.prizes.clone();
        let prize = prizes.remove(index)?;
        let mut history = self.history.clone();
        history.assign_prize(position, prize.clone())?;

        self.commit(Changes {
            prizes: Some(prizes),
            history: Some(history),
            ..Default::default()
        })?;

        Ok(prize)
    }

    /// Write the changes in one batch, then apply them
    fn commit(&mut self, changes: Changes) -> Result<(), RaffleError> {
        let keys = &self.config.keys;
        let mut entries: Vec<(&str, String)> = Vec::with_capacity(5);

        if let Some(participants) = &changes.participants {
            entries.push((keys.participants_text.as_str(), participants.serialize()));
            entries.push((keys.participants_list.as_str(), to_json(participants)?));
        }
        if let Some(prizes) = &changes.prizes {
            entries.push((keys.prizes_text.as_str(), prizes.serialize()));
            entries.push((keys.prizes_list.as_str(), to_json(prizes)?));
        }
        if let Some(history) = &changes.history {
            entries.push((keys.history.as_str(), to_json(history)?));
        }
        write(&mut self.store, &entries)?;

        if let Some(participants) = changes.participants {
            self.participants = participants;
        }
        if let Some(prizes) = changes.prizes {
            self.prizes = prizes;
        }
        if let Some(history) = changes.history {
            self.history = history;
        }
        Ok(())
    }
}

fn restore_pool<S: KeyValueStore>(
    store: &S,
    list_key: &str,
    text_key: &str,
) -> Result<Pool, RaffleError> {
    match read_json::<Pool, _>(store, list_key) {
        Ok(Some(pool)) => Ok(pool),
        // the list was never written, use the raw text if any
        Ok(None) => Ok(store
            .get(text_key)?
            .map(|raw| Pool::load_from_text(&raw))
            .unwrap_or_default()),
        Err(StorageCorruption) => Ok(Pool::default()),
        Err(e) => Err(e),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, RaffleError> {
    serde_json::to_string(value).map_err(|e| {
        error!("Error when encoding the value: {e}");
        StorageUnavailable
    })
}

fn write<S: KeyValueStore>(store: &mut S, entries: &[(&str, String)]) -> Result<(), RaffleError> {
    store.write_batch(entries).map_err(|e| {
        error!("Error when saving the session: {e:?}");
        e
    })
}
