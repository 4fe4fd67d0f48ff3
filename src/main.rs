use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use log::debug;
use rand::thread_rng;

use nova_strike::display;
use nova_strike::entities::{GameSettings, GameState, Ship};
use nova_strike::session::{FrameInput, GameSession, UpdateResult, FINAL_LEVEL};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// A key is considered "held" if its last press/repeat event arrived
/// within this many frames.  Covers terminals that don't emit
/// key-release events: the OS key-repeat rate is ≥ 15 Hz, so a window
/// of 4 frames (≈133 ms) is always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

const STARTING_LIVES: u32 = 3;
/// A bonus life is offered every this many levels, below the cap.
const EXTRA_LIFE_FREQUENCY: u32 = 3;
const MAX_LIVES: u32 = 4;

/// Smallest terminal the play field fits in.
const MIN_COLS: u16 = 40;
const MIN_ROWS: u16 = 16;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Difficulty table for the three levels.
fn settings_for_level(level: u32) -> GameSettings {
    match level {
        1 => GameSettings::restart(),
        2 => GameSettings {
            formation_width: 6,
            formation_height: 4,
            march_interval: 16,
            shoot_interval: 70,
        },
        _ => GameSettings {
            formation_width: 7,
            formation_height: 5,
            march_interval: 12,
            shoot_interval: 55,
        },
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    last_run: Option<&GameState>,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  NOVA  STRIKE  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if let Some(run) = last_run {
        let summary = format!(
            "Last run — score {}  level {}  ships {}",
            run.score, run.level, run.ships_destroyed
        );
        out.queue(cursor::MoveTo(
            cx.saturating_sub(summary.chars().count() as u16 / 2),
            cy.saturating_sub(4),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&summary))?;
    }

    let lines: &[&str] = &[
        "Clear all three waves.  A bonus saucer drops upgrades —",
        "catch its reward when you shoot it down.",
        "",
        "[ENTER] Start        [Q] Quit",
        "",
        "← → / A D : Move   SPACE : Shoot   ESC : Pause",
    ];
    for (i, line) in lines.iter().enumerate() {
        out.queue(cursor::MoveTo(
            cx.saturating_sub(line.chars().count() as u16 / 2),
            cy.saturating_sub(1) + i as u16,
        ))?;
        out.queue(style::SetForegroundColor(if line.starts_with('[') {
            Color::White
        } else {
            Color::DarkGrey
        }))?;
        out.queue(Print(*line))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        if let Ok(Event::Key(KeyEvent { code, kind, .. })) = rx.recv() {
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopResult {
    /// The session finished; carries the final snapshot.
    Finished(GameState),
    /// Quit to menu from the pause screen.
    Menu,
    /// Leave the program entirely (Ctrl+C).
    Quit,
}

/// Drive one session to completion.
///
/// Input model: instead of acting on each key event individually, a
/// `key_frame` map records the frame number of the last press/repeat
/// event for every key.  Each frame the keys still "fresh" (within
/// `HOLD_WINDOW` frames) are folded into a `FrameInput`, so move and
/// fire can be held simultaneously with no interference.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut GameSession,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<LoopResult> {
    let mut rng = thread_rng();
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(LoopResult::Quit);
                    }
                    key_frame.insert(code.clone(), frame);
                }
                // Keyboard-enhancement path: remove on release.
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let input = FrameInput {
            left: is_held(&key_frame, &KeyCode::Left, frame)
                || is_held(&key_frame, &KeyCode::Char('a'), frame)
                || is_held(&key_frame, &KeyCode::Char('A'), frame),
            right: is_held(&key_frame, &KeyCode::Right, frame)
                || is_held(&key_frame, &KeyCode::Char('d'), frame)
                || is_held(&key_frame, &KeyCode::Char('D'), frame),
            fire: is_held(&key_frame, &KeyCode::Char(' '), frame),
            pause: is_held(&key_frame, &KeyCode::Esc, frame),
            restart: is_held(&key_frame, &KeyCode::Char('r'), frame)
                || is_held(&key_frame, &KeyCode::Char('R'), frame),
            quit: is_held(&key_frame, &KeyCode::Char('q'), frame)
                || is_held(&key_frame, &KeyCode::Char('Q'), frame),
        };

        let result = session.update(&input, &mut rng);

        // Audio collaborator: fire-and-forget, no backend wired up.
        for sound in session.drain_sounds() {
            debug!("audio event: {:?}", sound);
        }

        display::render(out, session)?;

        match result {
            UpdateResult::InProgress => {}
            UpdateResult::Finished => return Ok(LoopResult::Finished(session.game_state())),
            UpdateResult::Aborted => return Ok(LoopResult::Menu),
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    env_logger::init();

    let (cols, rows) = terminal::size()?;
    if cols < MIN_COLS || rows < MIN_ROWS {
        eprintln!(
            "terminal too small: need at least {}x{}, have {}x{}",
            MIN_COLS, MIN_ROWS, cols, rows
        );
        return Ok(());
    }

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let mut last_run: Option<GameState> = None;

    loop {
        match show_menu(out, rx, last_run.as_ref())? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                let (width, height) = terminal::size()?;
                let mut state = GameState::new(1, 0, STARTING_LIVES);
                let mut ship = Ship::new(0, 0);

                'levels: loop {
                    let bonus_life = state.level % EXTRA_LIFE_FREQUENCY == 0
                        && state.lives_remaining < MAX_LIVES;
                    let mut session = GameSession::new(
                        state.clone(),
                        settings_for_level(state.level),
                        bonus_life,
                        ship.clone(),
                        width as i32,
                        height as i32,
                        &mut thread_rng(),
                    );
                    match game_loop(out, &mut session, rx)? {
                        LoopResult::Quit => return Ok(()),
                        LoopResult::Menu => break 'levels,
                        LoopResult::Finished(snapshot) => {
                            // Upgrades persist into the next level.
                            ship = session.ship.clone();
                            let done =
                                snapshot.lives_remaining == 0 || snapshot.level >= FINAL_LEVEL;
                            if done {
                                last_run = Some(snapshot);
                                break 'levels;
                            }
                            state = GameState {
                                level: snapshot.level + 1,
                                ..snapshot
                            };
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
