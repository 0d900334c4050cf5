//! Tests for the turn loop.

use std::sync::atomic::Ordering;
use strictly_arena::{
    GameEnvironment, GameEvent, GameOutcome, GameRunner, HumanInput, RejectedMovePolicy,
    RunnerOptions, RunnerPhase, ScriptedSource, TapRelay,
};
use strictly_checkers::{Color, Diagonal, GameState, PlayerMove, Position};
use tokio::sync::mpsc;

fn pos(row: u8, col: u8) -> Position {
    Position::new(row, col).unwrap()
}

fn mv(from: (u8, u8), to: (u8, u8)) -> PlayerMove {
    PlayerMove::new(pos(from.0, from.1), pos(to.0, to.1))
}

fn scripted(name: &str, moves: &[PlayerMove]) -> ScriptedSource {
    ScriptedSource::new(name, moves.iter().copied())
}

fn limited(turns: usize) -> RunnerOptions {
    RunnerOptions {
        max_turns: Some(turns),
        ..RunnerOptions::default()
    }
}

async fn until_waiting(relay: &TapRelay) {
    while !relay.is_waiting() {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_ordinary_step_hands_turn_to_red() {
    let red = scripted("red", &[]);
    let black = scripted("black", &[mv((6, 0), (5, 1))]);
    let mut runner = GameRunner::new(
        GameState::new(),
        GameEnvironment::new(Box::new(red), Box::new(black)),
    )
    .with_options(limited(1));

    let outcome = runner.run().await.unwrap();

    assert_eq!(outcome.turns, 1);
    assert_eq!(outcome.phase, RunnerPhase::Stopped);
    assert_eq!(runner.state().current_player(), Color::Red);
    assert!(runner.state().player(Color::Black).piece_at(pos(5, 1)).is_some());
    assert_eq!(runner.state().player(Color::Red).len(), 8);
}

#[tokio::test]
async fn test_rejected_move_still_consumes_turn() {
    let red = scripted("red", &[]);
    let black = scripted("black", &[mv((3, 3), (4, 4))]);
    let mut runner = GameRunner::new(
        GameState::new(),
        GameEnvironment::new(Box::new(red), Box::new(black)),
    )
    .with_options(limited(1));
    let before = runner.state().clone();

    runner.run().await.unwrap();

    assert_eq!(runner.state().current_player(), Color::Red);
    assert_eq!(
        runner.state().player(Color::Black),
        before.player(Color::Black)
    );
    assert_eq!(runner.state().player(Color::Red), before.player(Color::Red));
}

#[tokio::test]
async fn test_retry_policy_asks_same_side_again() {
    let red = scripted("red", &[]);
    let red_calls = red.call_counter();
    let black = scripted("black", &[mv((3, 3), (4, 4)), mv((6, 0), (5, 1))]);
    let black_calls = black.call_counter();
    let mut runner = GameRunner::new(
        GameState::new(),
        GameEnvironment::new(Box::new(red), Box::new(black)),
    )
    .with_options(RunnerOptions {
        rejected_move: RejectedMovePolicy::Retry,
        max_turns: Some(2),
    });

    runner.run().await.unwrap();

    assert_eq!(black_calls.load(Ordering::SeqCst), 2);
    assert_eq!(red_calls.load(Ordering::SeqCst), 0);
    assert_eq!(runner.state().current_player(), Color::Red);
    assert!(runner.state().player(Color::Black).piece_at(pos(5, 1)).is_some());
}

#[tokio::test]
async fn test_turns_alternate_with_iteration_count() {
    // Black passes in place, Red plays junk; every iteration toggles.
    let stay = mv((6, 0), (6, 0));
    let junk = mv((4, 4), (4, 5));
    for n in 0..6 {
        let black = scripted("black", &[stay; 3]);
        let red = scripted("red", &[junk; 3]);
        let mut runner = GameRunner::new(
            GameState::new(),
            GameEnvironment::new(Box::new(red), Box::new(black)),
        )
        .with_options(limited(n));

        let outcome = runner.run().await.unwrap();

        assert_eq!(outcome.turns, n);
        let expected = if n % 2 == 0 { Color::Black } else { Color::Red };
        assert_eq!(runner.state().current_player(), expected, "after {n} turns");
    }
}

#[tokio::test]
async fn test_emptying_red_ends_game_without_more_requests() {
    let state =
        GameState::from_positions(&[pos(5, 1), pos(3, 3)], &[pos(6, 0)], Color::Black).unwrap();
    let black = scripted("black", &[mv((6, 0), (4, 2)), mv((4, 2), (2, 4)), mv((2, 4), (1, 5))]);
    let black_calls = black.call_counter();
    let red = scripted("red", &[mv((3, 3), (3, 3)), mv((3, 3), (4, 4))]);
    let red_calls = red.call_counter();
    let mut runner = GameRunner::new(state, GameEnvironment::new(Box::new(red), Box::new(black)));

    let outcome = runner.run().await.unwrap();

    assert_eq!(
        outcome,
        GameOutcome {
            winner: Some(Color::Black),
            turns: 3,
            phase: RunnerPhase::Finished,
        }
    );
    assert_eq!(black_calls.load(Ordering::SeqCst), 2);
    assert_eq!(red_calls.load(Ordering::SeqCst), 1);
    assert!(runner.state().player(Color::Red).is_empty());
    assert_eq!(runner.snapshot().winner(), Some(Color::Black));
}

#[tokio::test]
async fn test_already_decided_board_finishes_immediately() {
    let state = GameState::from_positions(&[pos(0, 0)], &[], Color::Black).unwrap();
    let black = scripted("black", &[]);
    let black_calls = black.call_counter();
    let red = scripted("red", &[]);
    let mut runner = GameRunner::new(state, GameEnvironment::new(Box::new(red), Box::new(black)));

    let outcome = runner.run().await.unwrap();

    assert_eq!(outcome.winner, Some(Color::Red));
    assert_eq!(outcome.turns, 0);
    assert_eq!(black_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_events_follow_each_move() {
    let state = GameState::from_positions(&[pos(5, 1)], &[pos(6, 0)], Color::Black).unwrap();
    let black = scripted("black", &[mv((6, 0), (4, 2))]);
    let red = scripted("red", &[]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runner = GameRunner::new(state, GameEnvironment::new(Box::new(red), Box::new(black)))
        .with_events(tx);

    runner.run().await.unwrap();
    drop(runner);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert_eq!(events.len(), 4);
    match &events[0] {
        GameEvent::StateChanged(view) => {
            assert_eq!(view.occupied(), 2);
            assert_eq!(view.current_player(), Color::Black);
        }
        other => panic!("expected starting snapshot, got {other:?}"),
    }
    assert!(matches!(
        &events[1],
        GameEvent::MoveApplied { color: Color::Black, outcome, .. } if outcome.captured.is_some()
    ));
    match &events[2] {
        GameEvent::StateChanged(view) => {
            assert_eq!(view.occupied(), 1);
            assert_eq!(view.winner(), Some(Color::Black));
        }
        other => panic!("expected snapshot, got {other:?}"),
    }
    assert!(matches!(
        events[3],
        GameEvent::GameOver {
            winner: Some(Color::Black)
        }
    ));
}

#[tokio::test]
async fn test_rejections_are_reported() {
    let red = scripted("red", &[]);
    let black = scripted("black", &[mv((6, 0), (3, 0))]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runner = GameRunner::new(
        GameState::new(),
        GameEnvironment::new(Box::new(red), Box::new(black)),
    )
    .with_policy(Diagonal)
    .with_options(limited(1))
    .with_events(tx);

    runner.run().await.unwrap();

    assert!(matches!(rx.recv().await, Some(GameEvent::StateChanged(_))));
    assert!(matches!(
        rx.recv().await,
        Some(GameEvent::MoveRejected {
            color: Color::Black,
            ..
        })
    ));
    assert!(runner.state().player(Color::Black).piece_at(pos(6, 0)).is_some());
}

#[tokio::test]
async fn test_snapshot_subscribers_see_latest_board() {
    let red = scripted("red", &[]);
    let black = scripted("black", &[mv((6, 0), (5, 1))]);
    let mut runner = GameRunner::new(
        GameState::new(),
        GameEnvironment::new(Box::new(red), Box::new(black)),
    )
    .with_options(limited(1));
    let snapshots = runner.subscribe();
    assert!(snapshots.borrow().cell(pos(6, 0)).is_some());

    runner.run().await.unwrap();

    let view = snapshots.borrow();
    assert!(view.cell(pos(6, 0)).is_none());
    assert_eq!(view.cell(pos(5, 1)).map(|c| c.color), Some(Color::Black));
    assert_eq!(view.current_player(), Color::Red);
}

#[tokio::test]
async fn test_stop_abandons_pending_human_wait() {
    let relay = TapRelay::new();
    let black = HumanInput::new("human", relay.clone());
    let red = scripted("red", &[]);
    let runner = GameRunner::new(
        GameState::new(),
        GameEnvironment::new(Box::new(red), Box::new(black)),
    );
    let stop = runner.stop_handle();
    let game = runner.spawn();

    until_waiting(&relay).await;
    stop.stop();
    let outcome = game.await.unwrap().unwrap();

    assert_eq!(outcome.phase, RunnerPhase::Stopped);
    assert_eq!(outcome.winner, None);
    assert_eq!(outcome.turns, 0);
    assert!(stop.is_stopped());
}

#[tokio::test]
async fn test_human_taps_drive_a_move() {
    let relay = TapRelay::new();
    let black = HumanInput::new("human", relay.clone());
    let red = scripted("red", &[]);
    let mut runner = GameRunner::new(
        GameState::new(),
        GameEnvironment::new(Box::new(red), Box::new(black)),
    )
    .with_options(limited(1));

    let game = tokio::spawn(async move {
        let outcome = runner.run().await;
        (runner, outcome)
    });

    // Empty cell and foreign piece are ignored as origins, an occupied cell
    // is ignored as destination.
    for tap in [pos(3, 3), pos(0, 0), pos(6, 0), pos(7, 1), pos(5, 1)] {
        until_waiting(&relay).await;
        assert!(relay.notify_tap(tap));
    }

    let (runner, outcome) = game.await.unwrap();
    assert_eq!(outcome.unwrap().turns, 1);
    assert!(runner.state().player(Color::Black).piece_at(pos(5, 1)).is_some());
    assert!(!runner.state().is_occupied(pos(6, 0)));
}

#[tokio::test]
async fn test_failing_source_stops_runner() {
    let red = scripted("red", &[]);
    let black = scripted("black", &[mv((6, 0), (5, 1))]);
    let mut runner = GameRunner::new(
        GameState::new(),
        GameEnvironment::new(Box::new(red), Box::new(black)),
    );

    let err = runner.run().await.unwrap_err();

    assert!(err.to_string().contains("red failed to move for Red"));
    assert_eq!(runner.phase(), RunnerPhase::Stopped);
}

#[tokio::test]
async fn test_runner_cannot_start_twice() {
    let red = scripted("red", &[]);
    let black = scripted("black", &[]);
    let mut runner = GameRunner::new(
        GameState::new(),
        GameEnvironment::new(Box::new(red), Box::new(black)),
    )
    .with_options(limited(0));

    runner.run().await.unwrap();
    assert!(runner.run().await.is_err());
}

#[tokio::test]
async fn test_starting_board_published_before_first_request() {
    let relay = TapRelay::new();
    let black = HumanInput::new("human", relay.clone());
    let red = scripted("red", &[]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = GameRunner::new(
        GameState::new(),
        GameEnvironment::new(Box::new(red), Box::new(black)),
    )
    .with_events(tx);
    let stop = runner.stop_handle();
    let game = runner.spawn();

    match rx.recv().await {
        Some(GameEvent::StateChanged(view)) => {
            assert_eq!(view.occupied(), 16);
            assert_eq!(view.current_player(), Color::Black);
            assert_eq!(view.winner(), None);
        }
        other => panic!("expected starting snapshot, got {other:?}"),
    }

    until_waiting(&relay).await;
    stop.stop();
    game.await.unwrap().unwrap();
}
