//! Terminal match-3 runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from `tui_match3::term`.
//! The engine runs on a fixed 16 ms timestep; every batch of game events is
//! traced, appended to the optional event log and checked for a new high score.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use tracing_subscriber::EnvFilter;

use tui_match3::core::{GameConfig, GameSnapshot, GameState};
use tui_match3::event_log::EventLog;
use tui_match3::highscore::HighScoreStore;
use tui_match3::input::{handle_key_event, left_click, should_quit, Cursor};
use tui_match3::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use tui_match3::types::{
    GameAction, GameEvent, DEFAULT_COLS, DEFAULT_KIND_COUNT, DEFAULT_ROWS, GAME_TIME_MS, TICK_MS,
};

/// Swap adjacent tiles to line up three or more of a kind before time runs out.
#[derive(Debug, Parser)]
#[command(
    name = "tui-match3",
    version,
    about = "Match-3 puzzle in the terminal",
    long_about = "Swap adjacent tiles to form runs of three or more. Runs are cleared, \
        tiles fall and cascades score bonuses.\n\n\
        CONTROLS:\n  Arrows / hjkl / wasd  Move cursor\n  Space / Enter         Select or swap\n  \
        ? / t                 Hint\n  r                     Restart\n  q / Esc / Ctrl-C      Quit\n\n\
        Mouse clicks select and swap tiles directly."
)]
struct Args {
    /// Board height in rows.
    #[arg(long, default_value_t = DEFAULT_ROWS, value_name = "ROWS")]
    rows: u16,

    /// Board width in columns.
    #[arg(long, default_value_t = DEFAULT_COLS, value_name = "COLS")]
    cols: u16,

    /// Number of tile kinds (colours).
    #[arg(long, default_value_t = DEFAULT_KIND_COUNT, value_name = "N")]
    kinds: u8,

    /// RNG seed; derived from the clock when omitted.
    #[arg(long)]
    seed: Option<u32>,

    /// Session length in seconds.
    #[arg(long, default_value_t = GAME_TIME_MS / 1000, value_name = "SECS")]
    time_limit: u32,

    /// Start with a full board instead of letting tiles fall in.
    #[arg(long)]
    no_fill_in: bool,

    /// Allow refills to repeat the previous kind of their column.
    #[arg(long)]
    no_column_memo: bool,

    /// High-score file (default: $XDG_CONFIG_HOME/tui-match3/highscore.shs).
    #[arg(long, value_name = "FILE")]
    highscore_file: Option<PathBuf>,

    /// Append every game event as a JSON line to FILE.
    #[arg(long, value_name = "FILE")]
    event_log: Option<PathBuf>,

    /// Write tracing output to FILE (filter with RUST_LOG, default "info").
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            rows: self.rows,
            cols: self.cols,
            kind_count: self.kinds,
            seed: self.seed.unwrap_or_else(clock_seed),
            fill_in: !self.no_fill_in,
            avoid_column_repeats: !self.no_column_memo,
            game_time_ms: self.time_limit.saturating_mul(1000),
            ..GameConfig::default()
        }
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

/// The terminal owns stdout, so tracing only goes to a file when asked.
fn init_tracing(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Side effects of game events outside the engine.
struct Session {
    store: HighScoreStore,
    log: Option<EventLog<BufWriter<File>>>,
}

impl Session {
    fn handle(&mut self, game: &GameState, events: Vec<GameEvent>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        for event in &events {
            match event {
                GameEvent::Sound { cue } => tracing::debug!(cue = cue.as_str(), "sound"),
                GameEvent::BoardRegenerated => tracing::info!("board regenerated"),
                GameEvent::GameOver {
                    score,
                    new_high_score,
                } => {
                    tracing::info!(score, new_high_score, "session finished");
                    self.store.save_if_higher(game.high_score())?;
                }
                _ => tracing::trace!(?event),
            }
        }
        if let Some(log) = self.log.as_mut() {
            log.record(game.episode_id(), &events)?;
        }
        Ok(())
    }

    fn apply(&mut self, game: &mut GameState, action: GameAction) -> Result<()> {
        if action == GameAction::Restart {
            self.store.save_if_higher(game.high_score())?;
        }
        let events = game.apply_action(action);
        self.handle(game, events)
    }

    fn close(&mut self, game: &GameState) -> Result<()> {
        // A restart folds the session high into the next one, so compare
        // against the file rather than the session.
        self.store.save_if_higher(game.high_score())?;
        if let Some(log) = self.log.as_mut() {
            log.flush()?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let config = args.game_config();
    config.validate().context("invalid board settings")?;
    tracing::info!(?config, "starting");

    let mut store = args
        .highscore_file
        .clone()
        .map(HighScoreStore::new)
        .unwrap_or_else(HighScoreStore::at_default);
    let log = args.event_log.as_deref().map(EventLog::create).transpose()?;

    let mut game = GameState::new(config)?;
    game.set_high_score(store.load());
    let mut session = Session { store, log };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut game, &mut session);

    // Always try to restore terminal state.
    let _ = term.exit();
    session.close(&game)?;
    result
}

fn run(term: &mut TerminalRenderer, game: &mut GameState, session: &mut Session) -> Result<()> {
    let view = GameView::default();
    let config = game.config().clone();
    let mut cursor = Cursor::new(config.rows, config.cols);
    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = GameSnapshot::default();

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        game.snapshot_into(&mut snap);
        view.render_into(&snap, Some(cursor.position()), viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key).and_then(|c| cursor.apply(c)) {
                        session.apply(game, action)?;
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(p) = left_click(mouse)
                        .and_then(|(x, y)| view.cell_at(&snap, viewport, x, y))
                    {
                        cursor.set(p);
                        let events = game.activate(p);
                        session.handle(game, events)?;
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            let events = game.tick(TICK_MS);
            session.handle(game, events)?;
        }
    }
}
