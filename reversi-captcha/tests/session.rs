use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reversi_captcha::{CaptchaConfig, CaptchaError, ChallengeHandle};
use reversi_engine::{
    Board, Challenge, Outcome, RandomOpponent, ReversiError, Stage, Status, Stone, Timings,
};
use tokio::time::sleep;

fn board_from_layout(layout: &[&str]) -> Board {
    let board: Vec<Vec<i8>> = layout
        .iter()
        .map(|row| {
            row.chars()
                .map(|c| match c {
                    'P' => Stone::Player.to_int(),
                    'O' => Stone::Opponent.to_int(),
                    _ => 0,
                })
                .collect()
        })
        .collect();
    Board::new(board)
}

const PLAYER_LEADS: [&str; 6] = [
    "PPPPPP", "PPPPPP", "PPPPPP", "PPOOOO", "OOOOOO", "OOOOOO",
];

const OPPONENT_LEADS: [&str; 6] = [
    "PPPPPP", "PPPPPP", "PPOOOO", "OOOOOO", "OOOOOO", "OOOOOO",
];

/// Spawn a challenge and count how often it reports success.
fn spawn(challenge: Challenge<RandomOpponent>) -> (ChallengeHandle, Arc<AtomicUsize>) {
    let satisfied = Arc::new(AtomicUsize::new(0));
    let counter = satisfied.clone();
    let handle = ChallengeHandle::spawn(challenge, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (handle, satisfied)
}

fn fresh() -> (ChallengeHandle, Arc<AtomicUsize>) {
    spawn(Challenge::new(RandomOpponent::seeded(7), Timings::default()))
}

fn from_layout(layout: &[&str]) -> (ChallengeHandle, Arc<AtomicUsize>) {
    spawn(Challenge::with_board(
        board_from_layout(layout),
        Stone::Player,
        RandomOpponent::seeded(7),
        Timings::default(),
    ))
}

fn stones(board: &[i8]) -> usize {
    board.iter().filter(|&&c| c != 0).count()
}

#[tokio::test(start_paused = true)]
async fn opponent_answers_after_delay() {
    let (handle, _) = fresh();

    let data = handle.place_stone((1, 2)).await.unwrap();
    assert_eq!(data.stage, Stage::OpponentTurn);
    assert_eq!(data.status_text, "Opponent is thinking…");
    assert_eq!(stones(&data.board), 5);

    sleep(Duration::from_millis(699)).await;
    let data = handle.render().await.unwrap();
    assert_eq!(data.stage, Stage::OpponentTurn);
    assert_eq!(stones(&data.board), 5);

    sleep(Duration::from_millis(2)).await;
    let data = handle.render().await.unwrap();
    assert_eq!(data.stage, Stage::PlayerTurn);
    assert_eq!(data.status, Status::YourTurn);
    assert_eq!(stones(&data.board), 6);
    assert!(!data.legal_moves.is_empty());
}

#[tokio::test(start_paused = true)]
async fn illegal_placement_is_rejected() {
    let (handle, _) = fresh();

    let err = handle.place_stone((0, 0)).await.unwrap_err();
    assert_eq!(err, CaptchaError::Rejected(ReversiError::NoCaptures));
    assert_eq!(handle.render().await.unwrap().board, Board::initial().cells());

    handle.place_stone((1, 2)).await.unwrap();
    let err = handle.place_stone((1, 1)).await.unwrap_err();
    assert_eq!(err, CaptchaError::Rejected(ReversiError::OutOfTurn));
}

#[tokio::test(start_paused = true)]
async fn stuck_opponent_passes_without_delay() {
    let (handle, _) = from_layout(&["PO....", "......", "PO....", "......", "......", "......"]);

    let data = handle.place_stone((0, 2)).await.unwrap();
    assert_eq!(data.stage, Stage::PlayerTurn);
    assert_eq!(data.status, Status::OpponentPassed);
    assert_eq!(data.status_text, "The opponent passed. Your turn");
}

#[tokio::test(start_paused = true)]
async fn player_win_offers_restart_and_never_satisfies() {
    let (handle, satisfied) = from_layout(&PLAYER_LEADS);

    let data = handle.render().await.unwrap();
    assert_eq!(data.stage, Stage::GameOver);
    assert_eq!(data.outcome, Some(Outcome::PlayerWins));
    assert_eq!(data.status_text, "Suspected robot.");
    assert!(data.can_restart);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(satisfied.load(Ordering::SeqCst), 0);

    let data = handle.reset().await.unwrap();
    assert_eq!(data.board, Board::initial().cells());
    assert_eq!(data.stage, Stage::PlayerTurn);
    assert!(!data.can_restart);
    assert_eq!(data.outcome, None);
}

#[tokio::test(start_paused = true)]
async fn opponent_win_satisfies_once_after_delay() {
    let (handle, satisfied) = from_layout(&OPPONENT_LEADS);

    let data = handle.render().await.unwrap();
    assert_eq!(data.outcome, Some(Outcome::OpponentWins));
    assert_eq!(data.status_text, "You are human. Continuing in 3 seconds.");
    assert!(!data.can_restart);
    assert!(!data.satisfied);

    sleep(Duration::from_millis(2999)).await;
    assert_eq!(satisfied.load(Ordering::SeqCst), 0);

    sleep(Duration::from_millis(2)).await;
    assert_eq!(satisfied.load(Ordering::SeqCst), 1);
    assert!(handle.render().await.unwrap().satisfied);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(satisfied.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn reset_discards_pending_opponent_move() {
    let (handle, _) = fresh();

    handle.place_stone((1, 2)).await.unwrap();
    sleep(Duration::from_millis(300)).await;

    let data = handle.reset().await.unwrap();
    assert_eq!(data.board, Board::initial().cells());

    sleep(Duration::from_secs(2)).await;
    let data = handle.render().await.unwrap();
    assert_eq!(data.board, Board::initial().cells());
    assert_eq!(data.stage, Stage::PlayerTurn);
    assert_eq!(data.status, Status::YourTurn);
}

#[tokio::test(start_paused = true)]
async fn reset_discards_pending_success() {
    let (handle, satisfied) = from_layout(&OPPONENT_LEADS);

    handle.render().await.unwrap();
    sleep(Duration::from_secs(1)).await;
    handle.reset().await.unwrap();

    sleep(Duration::from_secs(5)).await;
    assert_eq!(satisfied.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn dismiss_stops_the_challenge() {
    let (handle, _) = fresh();

    handle.place_stone((1, 2)).await.unwrap();
    let data = handle.dismiss().await.unwrap();
    assert!(data.dismissed);

    let err = handle.place_stone((1, 1)).await.unwrap_err();
    assert_eq!(err, CaptchaError::Rejected(ReversiError::Dismissed));

    sleep(Duration::from_secs(2)).await;
    let data = handle.render().await.unwrap();
    assert_eq!(stones(&data.board), 5);
    assert_eq!(data.stage, Stage::OpponentTurn);
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_timer_driven_updates() {
    let (handle, _) = fresh();
    let mut updates = handle.subscribe();

    handle.render().await.unwrap();
    updates.borrow_and_update();

    handle.place_stone((1, 2)).await.unwrap();
    updates.changed().await.unwrap();
    assert_eq!(stones(&updates.borrow_and_update().board), 5);

    updates.changed().await.unwrap();
    let data = updates.borrow_and_update().clone();
    assert_eq!(stones(&data.board), 6);
    assert_eq!(data.stage, Stage::PlayerTurn);
}

#[tokio::test(start_paused = true)]
async fn full_game_through_the_driver() {
    let config = CaptchaConfig {
        seed: Some(11),
        ..CaptchaConfig::default()
    };
    let satisfied = Arc::new(AtomicUsize::new(0));
    let counter = satisfied.clone();
    let handle = ChallengeHandle::from_config(&config, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut data = handle.render().await.unwrap();
    for _ in 0..200 {
        if data.stage == Stage::GameOver {
            break;
        }
        data = if let Some(&point) = data.legal_moves.first() {
            handle.place_stone(point).await.unwrap()
        } else if data.pass_available {
            handle.pass().await.unwrap()
        } else {
            sleep(config.timings.opponent_delay).await;
            handle.render().await.unwrap()
        };
    }

    assert_eq!(data.stage, Stage::GameOver);
    let outcome = data.outcome.unwrap();
    assert_eq!(
        data.counts.player + data.counts.opponent,
        stones(&data.board) as u32
    );

    sleep(config.timings.success_delay + Duration::from_millis(1)).await;
    assert_eq!(
        satisfied.load(Ordering::SeqCst),
        usize::from(outcome.satisfies_challenge())
    );
    assert_eq!(
        handle.render().await.unwrap().satisfied,
        outcome.satisfies_challenge()
    );
}
