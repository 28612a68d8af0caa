use futures::executor::block_on;
use rand::rngs::StdRng;
use rand::SeedableRng;
use raffle_wheel::config::RaffleConfig;
use raffle_wheel::draw::{DrawState, SpinOutcome, Wheel};
use raffle_wheel::error::RaffleError::*;
use raffle_wheel::history::HistoryEntry;
use raffle_wheel::rotation::{Rotation, FULL_TURN};
use raffle_wheel::session::Session;
use raffle_wheel::storage::{MemoryStore, NoopStore};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn new_session(seed: u64) -> Session<MemoryStore> {
    init_logger();
    Session::new(
        RaffleConfig::default(),
        MemoryStore::new(),
        StdRng::seed_from_u64(seed),
    )
    .expect("Fail to create the session")
}

/// the animation finished immediately
async fn no_animation() {}

#[test]
fn test_one_winner_one_prize() {
    let mut session = new_session(1);
    session.load_pools("A\nB", "X").expect("Fail to load the pools");

    let spin = session.draw_participant().expect("Fail to draw a participant");
    assert!(spin.index() < 2);
    let outcome = block_on(session.run_spin(spin, no_animation())).expect("Fail to spin");
    let SpinOutcome::Participant { participant, .. } = outcome else {
        panic!("Unexpected outcome {outcome:?}");
    };
    assert!(participant == "A" || participant == "B");

    session
        .confirm_participant_present()
        .expect("Fail to confirm the participant");
    assert_eq!(session.participants().len(), 1);
    assert!(!session.participants().iter().any(|p| p == participant));

    let spin = session.draw_prize().expect("Fail to draw a prize");
    let outcome = block_on(session.run_spin(spin, no_animation())).expect("Fail to spin");
    assert_eq!(
        outcome,
        SpinOutcome::Prize {
            participant: participant.clone(),
            prize: "X".to_string(),
            position: 0
        }
    );

    assert!(session.prizes().is_empty());
    assert_eq!(
        session.history().entries(),
        [HistoryEntry {
            participant,
            prize: Some("X".to_string())
        }]
    );
    assert_eq!(session.state(), &DrawState::Idle);
}

#[test]
fn test_full_raffle() {
    let participants = ["Ana", "Bruno", "Carla", "Diego", "Elena", "Fran"];
    let prizes = ["Bike", "Book", "Mug", "Pen"];

    let mut session = new_session(2024);
    session
        .load_pools(&participants.join("\n"), &prizes.join("\n"))
        .expect("Fail to load the pools");

    let mut absent = Vec::new();
    let mut round = 0;
    while !session.prizes().is_empty() {
        let spin = session.draw_participant().expect("Fail to draw a participant");
        session.finish_spin(spin).expect("Fail to finish the spin");

        // every third drawn participant is not here
        round += 1;
        if round % 3 == 0 {
            absent.push(
                session
                    .confirm_participant_absent()
                    .expect("Fail to remove the participant"),
            );
            continue;
        }

        session
            .confirm_participant_present()
            .expect("Fail to confirm the participant");
        let spin = session.draw_prize().expect("Fail to draw a prize");
        session.finish_spin(spin).expect("Fail to finish the spin");
    }

    let history = session.history().entries();
    assert_eq!(history.len(), prizes.len());
    assert_eq!(
        session.participants().len() + absent.len() + history.len(),
        participants.len()
    );

    // every prize is given exactly once
    let mut given: Vec<&str> = history
        .iter()
        .map(|entry| entry.prize.as_deref().expect("Prize not assigned"))
        .collect();
    given.sort();
    assert_eq!(given, ["Bike", "Book", "Mug", "Pen"]);

    // a participant wins at most once
    for entry in history {
        assert!(!absent.contains(&entry.participant));
        assert!(!session.participants().iter().any(|p| p == entry.participant));
    }

    // no prize left to draw
    assert_eq!(session.draw_prize(), Err(NoPendingWinner));
}

#[test]
fn test_wheels_stop_under_the_pointer() {
    let mut session = new_session(3);
    session
        .load_pools("A\nB\nC\nD\nE\nF\nG", "X\nY\nZ")
        .expect("Fail to load the pools");

    for _ in 0..3 {
        let pool_size = session.participants().len();
        let before = session.rotation(Wheel::Participants);
        let spin = session.draw_participant().expect("Fail to draw a participant");

        let after = session.rotation(Wheel::Participants);
        assert!(after >= before + 3.0 * FULL_TURN);
        let center = Rotation::wedge_center(pool_size, spin.index()).unwrap();
        let offset = (center + after - 270.0).rem_euclid(FULL_TURN);
        assert!(offset < 1e-6 || FULL_TURN - offset < 1e-6);

        session.finish_spin(spin).expect("Fail to finish the spin");
        session
            .confirm_participant_present()
            .expect("Fail to confirm the participant");
        let spin = session.draw_prize().expect("Fail to draw a prize");
        session.finish_spin(spin).expect("Fail to finish the spin");
    }
}

#[test]
fn test_participant_draws_are_fair() {
    const NB_DRAWS: usize = 10_000;
    let names = ["A", "B", "C", "D"];

    init_logger();
    let mut session = Session::new(
        RaffleConfig::default(),
        NoopStore,
        StdRng::seed_from_u64(99),
    )
    .expect("Fail to create the session");
    session
        .load_pools(&names.join("\n"), "")
        .expect("Fail to load the pools");

    let mut counts = [0usize; 4];
    for _ in 0..NB_DRAWS {
        let spin = session.draw_participant().expect("Fail to draw a participant");
        counts[spin.index()] += 1;
        session.finish_spin(spin).expect("Fail to finish the spin");
        session
            .confirm_participant_absent()
            .expect("Fail to remove the participant");
        session
            .load_pools(&names.join("\n"), "")
            .expect("Fail to load the pools");
    }

    // 5 standard deviations of a binomial(10000, 1/4)
    let tolerance = 5.0 * (NB_DRAWS as f64 * 0.25 * 0.75).sqrt();
    for count in counts {
        assert!((count as f64 - NB_DRAWS as f64 / 4.0).abs() <= tolerance, "{counts:?}");
    }
}

#[test]
fn test_rejected_operations_change_nothing() {
    let mut session = new_session(5);
    session.load_pools("A\nB\nC", "X\nY").expect("Fail to load the pools");

    let spin = session.draw_participant().expect("Fail to draw a participant");
    session.finish_spin(spin).expect("Fail to finish the spin");
    session
        .confirm_participant_present()
        .expect("Fail to confirm the participant");

    let participants = session.participants().clone();
    let prizes = session.prizes().clone();
    let history = session.history().clone();
    let state = session.state().clone();

    assert_eq!(session.draw_participant(), Err(PendingAssignment));
    assert_eq!(session.confirm_participant_present(), Err(NoDrawnParticipant));
    assert_eq!(session.confirm_participant_absent(), Err(NoDrawnParticipant));

    assert_eq!(session.participants(), &participants);
    assert_eq!(session.prizes(), &prizes);
    assert_eq!(session.history(), &history);
    assert_eq!(session.state(), &state);
}

#[test]
fn test_clear_history_from_any_state() {
    let mut session = new_session(6);
    session.load_pools("A\nB\nC\nD", "X\nY").expect("Fail to load the pools");

    // idle with an empty history
    session.clear_history().expect("Fail to clear the history");
    assert!(session.history().is_empty());

    // a participant waits for a decision
    let spin = session.draw_participant().expect("Fail to draw a participant");
    session.finish_spin(spin).expect("Fail to finish the spin");
    session.clear_history().expect("Fail to clear the history");
    assert!(session.history().is_empty());
    assert!(matches!(
        session.state(),
        DrawState::AwaitingParticipantDecision { .. }
    ));

    // a winner waits for a prize
    session
        .confirm_participant_present()
        .expect("Fail to confirm the participant");
    session.clear_history().expect("Fail to clear the history");
    assert!(session.history().is_empty());
    assert_eq!(session.history().pending(), None);
    assert_eq!(session.state(), &DrawState::Idle);
    assert_eq!(session.draw_prize(), Err(NoPendingWinner));
}
