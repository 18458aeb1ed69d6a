//! Turn sequencing contract tests.
//!
//! Drives `TurnSequencer` with scripted participants and checks visitation
//! order, transcript length, failure reporting and configuration errors.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use roundtable_core::fakes::{
    EchoParticipant, FailingParticipant, ScriptedParticipant, SlowParticipant,
};
use roundtable_core::{
    turn_order, Participant, ReplyError, RunOutcome, Seed, SequencerError, Transcript,
    TurnSequencer, USER_SOURCE,
};

fn roster(names: &[&str]) -> (Vec<Arc<ScriptedParticipant>>, Vec<Arc<dyn Participant>>) {
    let concrete: Vec<Arc<ScriptedParticipant>> = names
        .iter()
        .map(|n| Arc::new(ScriptedParticipant::new(*n)))
        .collect();
    let dynamic = concrete
        .iter()
        .map(|p| Arc::clone(p) as Arc<dyn Participant>)
        .collect();
    (concrete, dynamic)
}

/// Keeps a copy of every transcript it is shown.
struct SnapshotParticipant {
    name: String,
    seen: Mutex<Vec<Transcript>>,
}

#[async_trait]
impl Participant for SnapshotParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, transcript: &Transcript) -> Result<String, ReplyError> {
        self.seen.lock().unwrap().push(transcript.clone());
        Ok(format!("{} turn", self.name))
    }
}

#[tokio::test]
async fn test_three_participants_three_turns() {
    let (_, participants) = roster(&["W", "R_", "O"]);
    let sequencer = TurnSequencer::new(participants).unwrap();

    let report = sequencer.run(Seed::user("task"), 3).await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.transcript.speakers(), vec!["W", "R_", "O"]);
    assert_eq!(report.transcript.len(), 4);
    assert_eq!(report.turns_taken, 3);
}

#[tokio::test]
async fn test_three_participants_five_turns_wraps() {
    let (_, participants) = roster(&["W", "R_", "O"]);
    let sequencer = TurnSequencer::new(participants).unwrap();

    let report = sequencer.run(Seed::user("task"), 5).await.unwrap();

    assert!(report.is_completed());
    assert_eq!(report.transcript.speakers(), vec!["W", "R_", "O", "W", "R_"]);
    assert_eq!(report.transcript.len(), 6);
}

#[tokio::test]
async fn test_single_participant_speaks_every_turn() {
    let (concrete, participants) = roster(&["Solo"]);
    let sequencer = TurnSequencer::new(participants).unwrap();

    let report = sequencer.run(Seed::user("task"), 2).await.unwrap();

    assert_eq!(report.transcript.speakers(), vec!["Solo", "Solo"]);
    assert_eq!(report.transcript.len(), 3);
    // Each call sees the full transcript produced so far.
    assert_eq!(concrete[0].observed_lengths(), vec![1, 2]);
}

#[tokio::test]
async fn test_second_participant_failure_stops_run() {
    let writer = Arc::new(ScriptedParticipant::new("W"));
    let reviewer = Arc::new(FailingParticipant::new(
        "R_",
        ReplyError::Transport {
            message: "connection reset".to_string(),
        },
    ));
    let optimizer = Arc::new(ScriptedParticipant::new("O"));
    let sequencer = TurnSequencer::new(vec![
        writer.clone() as Arc<dyn Participant>,
        reviewer.clone() as Arc<dyn Participant>,
        optimizer.clone() as Arc<dyn Participant>,
    ])
    .unwrap();

    let report = sequencer.run(Seed::user("task"), 3).await.unwrap();

    let failure = report.failure().expect("run should fail");
    assert_eq!(failure.participant, "R_");
    assert_eq!(failure.turn, 2);
    assert!(matches!(failure.cause, ReplyError::Transport { .. }));
    assert_eq!(report.transcript.len(), 2);
    assert_eq!(report.turns_taken, 1);
    assert_eq!(reviewer.calls(), 1);
    assert_eq!(optimizer.calls(), 0);

    match report.into_result() {
        Err(SequencerError::ReplyFailed(f)) => assert_eq!(f.turn, 2),
        other => panic!("expected ReplyFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_zero_turns_rejected_before_any_reply() {
    let (concrete, participants) = roster(&["W", "R_", "O"]);
    let sequencer = TurnSequencer::new(participants).unwrap();

    let err = sequencer.run(Seed::user("task"), 0).await.unwrap_err();

    assert!(matches!(err, SequencerError::InvalidConfiguration(_)));
    assert!(concrete.iter().all(|p| p.calls() == 0));
}

#[test]
fn test_empty_roster_rejected() {
    let err = TurnSequencer::new(Vec::new()).unwrap_err();
    assert!(matches!(err, SequencerError::InvalidConfiguration(_)));
}

#[test]
fn test_duplicate_names_rejected() {
    let (_, participants) = roster(&["W", "W"]);
    let err = TurnSequencer::new(participants).unwrap_err();
    assert!(err.to_string().contains("duplicate participant name: W"));
}

#[test]
fn test_blank_name_rejected() {
    let (_, participants) = roster(&["W", "  "]);
    assert!(TurnSequencer::new(participants).is_err());
}

#[tokio::test]
async fn test_blank_seed_rejected_before_any_reply() {
    let (concrete, participants) = roster(&["W"]);
    let sequencer = TurnSequencer::new(participants).unwrap();

    let err = sequencer.run(Seed::user(""), 2).await.unwrap_err();

    assert!(matches!(err, SequencerError::InvalidConfiguration(_)));
    assert_eq!(concrete[0].calls(), 0);
}

#[tokio::test]
async fn test_visit_order_matches_turn_order_for_many_shapes() {
    for roster_len in 1..=4usize {
        for max_turns in 1..=9u32 {
            let names: Vec<String> = (0..roster_len).map(|i| format!("P{i}")).collect();
            let participants: Vec<Arc<dyn Participant>> = names
                .iter()
                .map(|n| Arc::new(EchoParticipant::new(n.clone())) as Arc<dyn Participant>)
                .collect();
            let sequencer = TurnSequencer::new(participants).unwrap();

            let report = sequencer.run(Seed::user("task"), max_turns).await.unwrap();

            let expected: Vec<&str> = turn_order(roster_len, max_turns)
                .into_iter()
                .map(|i| names[i].as_str())
                .collect();
            assert_eq!(report.transcript.speakers(), expected);
            assert_eq!(report.transcript.len(), 1 + max_turns as usize);
        }
    }
}

#[tokio::test]
async fn test_seed_and_sequence_numbers() {
    let (_, participants) = roster(&["W", "R_"]);
    let sequencer = TurnSequencer::new(participants).unwrap();

    let report = sequencer.run(Seed::user("write a parser"), 4).await.unwrap();

    let seed = report.transcript.first().unwrap();
    assert_eq!(seed.source(), USER_SOURCE);
    assert_eq!(seed.content(), "write a parser");
    for (index, message) in report.transcript.iter().enumerate() {
        assert_eq!(message.seq() as usize, index);
    }
}

#[tokio::test]
async fn test_participants_only_read_the_transcript() {
    let snapshotter = Arc::new(SnapshotParticipant {
        name: "S".to_string(),
        seen: Mutex::new(Vec::new()),
    });
    let sequencer = TurnSequencer::new(vec![
        snapshotter.clone() as Arc<dyn Participant>,
        Arc::new(EchoParticipant::new("E")) as Arc<dyn Participant>,
    ])
    .unwrap();

    let report = sequencer.run(Seed::user("task"), 5).await.unwrap();

    let final_messages = report.transcript.messages();
    for snapshot in snapshotter.seen.lock().unwrap().iter() {
        assert_eq!(snapshot.messages(), &final_messages[..snapshot.len()]);
    }

    let first_read = report.transcript.clone();
    assert_eq!(first_read, report.transcript);
}

#[tokio::test]
async fn test_runs_do_not_share_state() {
    let (concrete, participants) = roster(&["W", "R_", "O"]);
    let sequencer = TurnSequencer::new(participants).unwrap();

    let first = sequencer.run(Seed::user("task one"), 2).await.unwrap();
    let second = sequencer.run(Seed::user("task two"), 2).await.unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(second.transcript.len(), 3);
    assert_eq!(second.transcript.speakers(), vec!["W", "R_"]);
    assert_eq!(second.transcript.first().unwrap().content(), "task two");
    // Second run starts from an empty transcript again.
    assert_eq!(concrete[0].observed_lengths(), vec![1, 1]);
    assert_eq!(concrete[2].calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_fails_the_in_flight_turn() {
    let sequencer = TurnSequencer::new(vec![
        Arc::new(EchoParticipant::new("W")) as Arc<dyn Participant>,
        Arc::new(SlowParticipant::new("R_", Duration::from_secs(30))) as Arc<dyn Participant>,
        Arc::new(EchoParticipant::new("O")) as Arc<dyn Participant>,
    ])
    .unwrap();

    let report = sequencer
        .run_with_timeout(Seed::user("task"), 3, Duration::from_secs(5))
        .await
        .unwrap();

    let failure = report.failure().expect("run should time out");
    assert_eq!(failure.participant, "R_");
    assert_eq!(failure.turn, 2);
    match failure.cause {
        ReplyError::TimedOut { elapsed_ms } => assert!((5_000..30_000).contains(&elapsed_ms)),
        ref other => panic!("expected TimedOut, got {other:?}"),
    }
    assert_eq!(report.transcript.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_run_within_budget_completes() {
    let sequencer = TurnSequencer::new(vec![
        Arc::new(SlowParticipant::new("W", Duration::from_secs(1))) as Arc<dyn Participant>,
        Arc::new(SlowParticipant::new("R_", Duration::from_secs(1))) as Arc<dyn Participant>,
    ])
    .unwrap();

    let report = sequencer
        .run_with_timeout(Seed::user("task"), 4, Duration::from_secs(10))
        .await
        .unwrap();

    assert!(report.is_completed());
    assert_eq!(report.transcript.len(), 5);
}

#[tokio::test]
async fn test_zero_budget_rejected() {
    let (_, participants) = roster(&["W"]);
    let sequencer = TurnSequencer::new(participants).unwrap();

    let err = sequencer
        .run_with_timeout(Seed::user("task"), 1, Duration::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, SequencerError::InvalidConfiguration(_)));
}
