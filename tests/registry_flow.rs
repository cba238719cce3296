//! End-to-end flows through the session registry

use std::sync::Arc;
use std::thread;

use omok::board::Pos;
use omok::record::{JsonlArchive, MemoryArchive, RecordSink, SampleWriter, TrainingSink};
use omok::session::{FinishReason, Status};
use omok::{Difficulty, GameConfig, MoveError, NewGame, Player, SessionError, SessionRegistry};

fn config() -> GameConfig {
    GameConfig {
        seed: Some(42),
        ..GameConfig::default()
    }
}

fn memory_registry() -> (SessionRegistry, Arc<MemoryArchive>) {
    let archive = Arc::new(MemoryArchive::default());
    (SessionRegistry::new(config(), archive.clone(), None), archive)
}

#[test]
fn opening_moves_alternate() {
    let (registry, _) = memory_registry();
    let id = registry.create(NewGame::hotseat()).unwrap().game_id;

    registry.play(&id, 7, 7, Player::Black).unwrap();
    let snapshot = registry.play(&id, 7, 8, Player::White).unwrap();

    assert_eq!(snapshot.moves.len(), 2);
    assert_eq!(snapshot.board[7][7], 1);
    assert_eq!(snapshot.board[8][7], 2);
    assert_eq!(snapshot.current, Player::Black);
    assert_eq!(snapshot.status, Status::Active);
}

#[test]
fn single_open_three_is_legal_and_second_one_is_not() {
    let (registry, _) = memory_registry();
    let id = registry.create(NewGame::hotseat()).unwrap().game_id;

    // White answers along the bottom edge, far from black's shape
    let black = [(3, 3), (4, 4), (5, 5), (4, 3), (3, 4)];
    for (i, (x, y)) in black.into_iter().enumerate() {
        registry.play(&id, x, y, Player::Black).unwrap();
        registry.play(&id, i as i32 * 2, 14, Player::White).unwrap();
    }
    let snapshot = registry.play(&id, 5, 3, Player::Black).unwrap();
    assert_eq!(snapshot.moves.len(), 11);

    // Same shape plus (5, 4): (5, 3) would now make two open threes
    let id = registry.create(NewGame::hotseat()).unwrap().game_id;
    let black = [(3, 3), (4, 4), (5, 5), (4, 3), (3, 4), (5, 4)];
    for (i, (x, y)) in black.into_iter().enumerate() {
        registry.play(&id, x, y, Player::Black).unwrap();
        registry.play(&id, i as i32 * 2, 14, Player::White).unwrap();
    }
    let before = registry.state(&id).unwrap();
    let err = registry.play(&id, 5, 3, Player::Black).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Rejected { source: MoveError::DoubleThree { pos } } if pos == Pos::new(5, 3)
    ));
    assert_eq!(registry.state(&id).unwrap(), before);
}

#[test]
fn agent_game_runs_to_resignation_and_is_archived() {
    let (registry, archive) = memory_registry();
    let snapshot = registry
        .create(NewGame::against_agent(Difficulty::Hard, Player::White))
        .unwrap();
    let id = snapshot.game_id;

    let mut expected_moves = 0;
    for (x, y) in [(7, 7), (1, 13), (13, 1)] {
        let before = registry.state(&id).unwrap();
        match registry.play(&id, x, y, Player::Black) {
            Ok(snapshot) => {
                expected_moves = before.moves.len() + 2;
                assert_eq!(snapshot.moves.len(), expected_moves);
                assert_eq!(snapshot.current, Player::Black);
            }
            // The agent may already hold the cell
            Err(SessionError::Rejected { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let snapshot = registry.finish(&id, Some(Player::White), true).unwrap();
    assert_eq!(snapshot.status, Status::Finished);
    assert_eq!(snapshot.finish_reason, Some(FinishReason::Resignation));

    // Play after finish is a no-op on the frozen state
    let frozen = registry.play(&id, 0, 0, Player::Black).unwrap();
    assert_eq!(frozen.moves.len(), expected_moves);

    registry.flush();
    let records = archive.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].moves.len(), expected_moves);
    assert_eq!(records[0].meta.ai_color, Some(Player::White));
    assert_eq!(records[0].meta.ai_level, Some(Difficulty::Hard));
}

#[test]
fn sessions_proceed_in_parallel() {
    let (registry, archive) = memory_registry();
    let registry = Arc::new(registry);
    let ids: Vec<_> = (0..8)
        .map(|_| registry.create(NewGame::hotseat()).unwrap().game_id)
        .collect();

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..4 {
                    registry.play(&id, i, 0, Player::Black).unwrap();
                    registry.play(&id, i, 5, Player::White).unwrap();
                }
                let snapshot = registry.play(&id, 4, 0, Player::Black).unwrap();
                assert_eq!(snapshot.winner, Some(Player::Black));
                registry.finish(&id, None, false).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    registry.flush();
    let records = archive.records();
    assert_eq!(records.len(), ids.len());
    assert!(records.iter().all(|r| r.winner == Some(Player::Black) && !r.resign));
}

#[test]
fn finished_games_reach_disk() {
    let dir = tempfile::tempdir().unwrap();
    let archive = Arc::new(JsonlArchive::new(dir.path().join("games.jsonl")));
    let samples = dir.path().join("samples.jsonl");
    let trainer: Arc<dyn TrainingSink> = Arc::new(SampleWriter::new(&samples, 15));
    let registry = SessionRegistry::new(config(), archive.clone() as Arc<dyn RecordSink>, Some(trainer));

    let id = registry.create(NewGame::hotseat()).unwrap().game_id;
    registry.play(&id, 7, 7, Player::Black).unwrap();
    registry.play(&id, 8, 8, Player::White).unwrap();
    registry.finish(&id, Some(Player::Black), false).unwrap();
    registry.flush();

    let records = archive.load().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].game_id, id);
    let lines = std::fs::read_to_string(&samples).unwrap();
    assert_eq!(lines.lines().count(), 2);
}

#[test]
fn removed_sessions_are_not_found() {
    let (registry, _) = memory_registry();
    let id = registry.create(NewGame::hotseat()).unwrap().game_id;
    assert!(registry.remove(&id));
    assert!(matches!(
        registry.play(&id, 0, 0, Player::Black),
        Err(SessionError::NotFound { .. })
    ));
}
