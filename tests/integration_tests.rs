//! Integration tests for the match/cascade loop

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use tui_match3::core::{basic_score, cascade_bonus, GameConfig, GameState, Grid};
use tui_match3::event_log::EventLog;
use tui_match3::highscore::HighScoreStore;
use tui_match3::input::{handle_key_event, Cursor};
use tui_match3::types::{GameAction, GameEvent, Position, SoundCue, TICK_MS};

fn p(row: u16, col: u16) -> Position {
    Position::new(row, col)
}

/// 6x5 board whose only legal swap is (2,2) <-> (2,3).
fn one_move_game() -> GameState {
    let grid = Grid::from_kinds(
        &[
            [10, 11, 12, 13, 14],
            [15, 16, 17, 18, 19],
            [1, 1, 20, 1, 21],
            [22, 23, 24, 25, 26],
            [22, 23, 24, 25, 26],
            [27, 28, 29, 30, 31],
        ],
        5,
        9,
    );
    GameState::from_grid(GameConfig::instant(9), grid)
}

fn press(cursor: &mut Cursor, game: &mut GameState, code: KeyCode) -> Vec<GameEvent> {
    let key = KeyEvent::new(code, KeyModifiers::NONE);
    match handle_key_event(key).and_then(|c| cursor.apply(c)) {
        Some(action) => game.apply_action(action),
        None => Vec::new(),
    }
}

fn assert_resting(game: &GameState) {
    let grid = game.grid();
    assert!(!grid.has_empty());
    assert!(grid.all_matches().is_empty());
    assert!(grid.find_potential_match().is_some());
}

#[test]
fn test_keyboard_swap_scores() {
    let mut game = one_move_game();
    let mut cursor = Cursor::new(6, 5);

    for code in [KeyCode::Down, KeyCode::Down, KeyCode::Right, KeyCode::Right] {
        assert!(press(&mut cursor, &mut game, code).is_empty());
    }
    assert_eq!(cursor.position(), p(2, 2));

    let events = press(&mut cursor, &mut game, KeyCode::Char(' '));
    assert_eq!(events, vec![GameEvent::Selected { at: p(2, 2) }]);

    press(&mut cursor, &mut game, KeyCode::Char('l'));
    let events = press(&mut cursor, &mut game, KeyCode::Enter);
    assert!(events.contains(&GameEvent::SwapAttempted {
        from: p(2, 2),
        to: p(2, 3),
        accepted: true,
    }));

    // Let the cascade run out on the game clock.
    let mut ticks = 0;
    while game.is_cascading() {
        game.tick(TICK_MS);
        ticks += 1;
        assert!(ticks < 1000, "cascade never finished");
    }
    assert_eq!(game.score(), 50);
    assert_eq!(game.scoring().cleared_total(), 3);
    assert_resting(&game);
}

#[test]
fn test_hint_key_points_at_legal_swap() {
    let mut game = one_move_game();
    let mut cursor = Cursor::new(6, 5);
    let events = press(&mut cursor, &mut game, KeyCode::Char('?'));
    assert!(events.contains(&GameEvent::HintShown {
        first: p(2, 2),
        second: p(2, 3),
    }));
    assert_eq!(game.snapshot().hint, Some((p(2, 2), p(2, 3))));
}

#[test]
fn test_playing_hints_keeps_board_consistent() {
    let mut game = GameState::new(GameConfig::instant(2024)).unwrap();
    assert_resting(&game);

    let mut last_score = 0;
    for turn in 0..25 {
        let (a, b) = game
            .grid()
            .find_potential_match()
            .unwrap_or_else(|| panic!("turn {turn}: board has no move"));
        game.activate(a);
        let events = game.activate(b);
        assert!(
            events.iter().any(|e| matches!(
                e,
                GameEvent::SwapAttempted { accepted: true, .. }
            )),
            "turn {turn}: hinted swap was rejected"
        );
        game.settle();

        assert!(game.accepts_input());
        assert!(game.score() > last_score, "turn {turn}: score did not grow");
        last_score = game.score();
        assert_resting(&game);
    }
    assert_eq!(game.high_score(), game.score());
}

#[test]
fn test_same_seed_same_session() {
    let play = || {
        let mut game = GameState::new(GameConfig::instant(77)).unwrap();
        let mut all = Vec::new();
        for _ in 0..5 {
            let Some((a, b)) = game.grid().find_potential_match() else {
                break;
            };
            all.extend(game.activate(a));
            all.extend(game.activate(b));
            all.extend(game.settle());
        }
        (all, game.snapshot())
    };

    let (events_a, snap_a) = play();
    let (events_b, snap_b) = play();
    assert_eq!(events_a, events_b);
    assert_eq!(snap_a, snap_b);
}

#[test]
fn test_fill_in_then_play() {
    let config = GameConfig {
        seed: 31,
        ..GameConfig::default()
    };
    let mut game = GameState::new(config).unwrap();
    assert!(game.snapshot().filling);

    let mut ticks = 0;
    while !game.accepts_input() {
        let events = game.tick(TICK_MS);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::TilesCleared { .. })));
        ticks += 1;
        assert!(ticks < 2000);
    }
    assert_resting(&game);
    assert_eq!(game.score(), 0);
}

#[test]
fn test_restart_mid_cascade() {
    let mut game = one_move_game();
    game.activate(p(2, 2));
    game.activate(p(2, 3));
    assert!(game.is_cascading());

    game.apply_action(GameAction::Restart);
    assert_eq!(game.episode_id(), 1);
    assert_eq!(game.score(), 0);
    assert_eq!(game.high_score(), 50);
    assert!(game.accepts_input());
    assert_resting(&game);
}

#[test]
fn test_session_to_game_over_with_persistence() {
    let dir = std::env::temp_dir().join(format!("tui-match3-it-{}", std::process::id()));
    let mut store = HighScoreStore::new(dir.join("highscore.shs"));
    let mut log = EventLog::new(Vec::new());

    let mut game = one_move_game();
    game.set_high_score(store.load());

    let mut events = game.activate(p(2, 2));
    events.extend(game.activate(p(2, 3)));
    events.extend(game.tick(game.time_left_ms()));
    log.record(game.episode_id(), &events).unwrap();

    let over = events.last().cloned();
    assert_eq!(
        over,
        Some(GameEvent::GameOver {
            score: 50,
            new_high_score: true,
        })
    );
    assert!(events.contains(&GameEvent::Sound {
        cue: SoundCue::TimesUp
    }));

    assert!(store.save_if_higher(game.high_score()).unwrap());
    assert_eq!(HighScoreStore::new(store.path()).load(), 50);

    let text = String::from_utf8(log.into_inner()).unwrap();
    let parsed: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(parsed.len(), events.len());
    assert!(parsed.iter().all(|v| v["episode"] == 0));
    assert_eq!(parsed[0]["event"], "selected");
    assert_eq!(parsed.last().unwrap()["event"], "game_over");
    assert_eq!(parsed.last().unwrap()["new_high_score"], true);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_restart_keeps_beaten_high_score_for_saving() {
    let dir = std::env::temp_dir().join(format!("tui-match3-restart-{}", std::process::id()));
    let mut store = HighScoreStore::new(dir.join("highscore.shs"));
    store.save(20).unwrap();

    let mut game = one_move_game();
    game.set_high_score(store.load());
    game.activate(p(2, 2));
    game.activate(p(2, 3));
    game.settle();
    assert_eq!(game.score(), 50);

    game.apply_action(GameAction::Restart);
    // The fresh session no longer reports a beaten high score.
    assert!(!game.scoring().is_new_high_score());
    assert_eq!(game.high_score(), 50);

    assert!(store.save_if_higher(game.high_score()).unwrap());
    assert!(!store.save_if_higher(game.high_score()).unwrap());
    assert_eq!(HighScoreStore::new(store.path()).load(), 50);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_cascade_pays_bonus_on_second_batch() {
    let grid = Grid::from_kinds(
        &[
            [60, 61, 62, 63, 64],
            [65, 66, 2, 67, 68],
            [54, 55, 56, 1, 57],
            [50, 51, 1, 52, 53],
            [2, 2, 1, 47, 48],
            [70, 71, 72, 73, 74],
        ],
        5,
        9,
    );
    let mut game = GameState::from_grid(GameConfig::instant(9), grid);

    game.activate(p(2, 2));
    let mut events = game.activate(p(2, 3));
    events.extend(game.settle());

    let batches: Vec<(usize, u32, u32)> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::TilesCleared {
                positions,
                chains,
                points,
            } => Some((positions.len(), *chains, *points)),
            _ => None,
        })
        .collect();
    // Column 2 drops the 2 from row 1 beside the pair on row 4.
    assert_eq!(
        batches,
        vec![(3, 1, basic_score(3)), (3, 1, basic_score(3) + cascade_bonus(2))]
    );
    assert_eq!(game.score(), 150);
    assert!(game.accepts_input());
    assert_resting(&game);
}

#[test]
fn test_events_round_trip_through_json() {
    let mut game = one_move_game();
    game.activate(p(2, 2));
    let mut events = game.activate(p(2, 3));
    events.extend(game.settle());

    let json = serde_json::to_string(&events).unwrap();
    let back: Vec<GameEvent> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, events);
    assert!(json.contains(r#""event":"tiles_cleared""#));
    assert!(json.contains(r#""cue":"swap_succeeded""#));
}
