mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use tracing::{info, warn};

use lone_spire::assets::ProceduralTextures;
use lone_spire::audio::TracingAudio;
use lone_spire::clock::SimulationClock;
use lone_spire::config::GameConfig;
use lone_spire::entities::InputIntent;
use lone_spire::highscore::{FileHighScore, HighScoreStore};
use lone_spire::logging::init_file_logging;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS
const CONFIG_FILE: &str = "lone_spire.ron";
const LOG_FILE: &str = "lone_spire.log";

/// Heading change per second while a turn key is held.
const TURN_SPEED: f32 = 2.4;
/// Look offset change in pixels per second while a look key is held.
const LOOK_SPEED: f32 = 120.0;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events.
const HOLD_WINDOW: u64 = 4;

/// Returns true if any of `keys` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|key| {
        key_frame
            .get(key)
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    })
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
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
    high_score: u32,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "▲  THE LONE SPIRE  ▲";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Red))?;
    out.queue(Print(title))?;

    if high_score > 0 {
        let hs_str = format!("Best Score: {}", high_score);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs_str.chars().count() as u16 / 2),
            cy.saturating_sub(5),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    let lines: &[(&str, Color)] = &[
        ("Survive the forest. Reach 300 and the Spire wakes.", Color::White),
        ("", Color::White),
        ("W S     : Forward / back     A D   : Strafe", Color::DarkGrey),
        ("← →     : Turn               ↑ ↓   : Look", Color::DarkGrey),
        ("SPACE   : Shoot              R     : Reload", Color::DarkGrey),
        ("Shift   : Sprint             F     : Summon Paragon", Color::DarkGrey),
        ("", Color::White),
        ("[ENTER] Start     [Q] Quit", Color::Green),
    ];
    for (i, (text, color)) in lines.iter().enumerate() {
        let row = cy.saturating_sub(3) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(26), row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*text))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;

    loop {
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
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

/// Returns `true` → quit program, `false` → back to menu.
///
/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key. Each frame the fresh keys (within
/// `HOLD_WINDOW` frames) are folded into one `InputIntent`, so movement,
/// turning and shooting combine freely. Terminals with keyboard enhancement
/// also send releases, which drop a key immediately.
fn game_loop<W: Write>(
    out: &mut W,
    clock: &mut SimulationClock,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<bool> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut term = terminal::size()?;
    fit_to_terminal(clock, term)?;

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let mut reload = false;
        let mut summon = false;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(true);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') if clock.state().victory => {
                            return Ok(false);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') => reload = true,
                        KeyCode::Char('f') | KeyCode::Char('F') => summon = true,
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let size = terminal::size()?;
        if size != term {
            term = size;
            fit_to_terminal(clock, term)?;
            out.queue(terminal::Clear(terminal::ClearType::All))?;
        }

        let dt = clock.measure_delta(frame_start);
        if clock.state().victory {
            clock.render();
        } else {
            let held = |keys: &[KeyCode]| is_held(&key_frame, keys, frame);
            let intent = InputIntent {
                forward: axis(
                    held(&[KeyCode::Char('w'), KeyCode::Char('W')]),
                    held(&[KeyCode::Char('s'), KeyCode::Char('S')]),
                ),
                strafe: axis(
                    held(&[KeyCode::Char('d'), KeyCode::Char('D')]),
                    held(&[KeyCode::Char('a'), KeyCode::Char('A')]),
                ),
                turn: axis(held(&[KeyCode::Right]), held(&[KeyCode::Left])) * TURN_SPEED * dt,
                look: axis(held(&[KeyCode::Up]), held(&[KeyCode::Down])) * LOOK_SPEED * dt,
                // uppercase letters arrive while Shift is down
                sprint: held(&[
                    KeyCode::Char('W'),
                    KeyCode::Char('A'),
                    KeyCode::Char('S'),
                    KeyCode::Char('D'),
                ]),
                fire: held(&[KeyCode::Char(' ')]),
                reload,
                summon,
            };
            clock.run_frame(&intent, dt);
        }

        display::render(out, clock.framebuffer(), &clock.hud(), term.0, term.1)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

fn fit_to_terminal(clock: &mut SimulationClock, (cols, rows): (u16, u16)) -> anyhow::Result<()> {
    let (w, h) = display::viewport_pixels(cols, rows);
    clock.resize(w, h).context("resizing framebuffer")?;
    info!(cols, rows, "viewport {w}x{h}");
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    init_file_logging(Path::new(LOG_FILE));
    let config = GameConfig::load_or_default(Path::new(CONFIG_FILE));

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ask for key-release (and key-repeat) events; other terminals fall back
    // to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread so the game loop never waits.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = run(&mut out, &rx, config);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        warn!("exiting with error: {e:#}");
    }
    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, config: GameConfig) -> anyhow::Result<()> {
    let store = FileHighScore::in_home();
    info!(path = %store.path().display(), "high score file");

    loop {
        let high_score = store.load().unwrap_or_else(|e| {
            warn!("{e}; showing no high score");
            0
        });
        match show_menu(out, rx, high_score)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                let mut clock = SimulationClock::new(
                    config.clone(),
                    &ProceduralTextures::new(),
                    Box::new(store.clone()),
                    Box::new(TracingAudio),
                )
                .context("starting the simulation")?;
                if game_loop(out, &mut clock, rx)? {
                    break;
                }
            }
        }
    }
    Ok(())
}
