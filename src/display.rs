/// Terminal presentation: all terminal I/O for a running game lives here.
///
/// The framebuffer is drawn two pixels per cell with the upper-half-block
/// glyph (foreground = top pixel, background = bottom pixel). Row 0 is the
/// HUD, the last row the controls hint. No game logic happens here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use lone_spire::assets::channels;
use lone_spire::entities::{EncounterPhase, HudSnapshot};
use lone_spire::render::FrameBuffer;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_AMMO: Color = Color::White;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_BOSS: Color = Color::Magenta;
const C_HUD_ALLY: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

/// Terminal rows taken by the HUD and the hint line.
pub const CHROME_ROWS: u16 = 2;

/// Framebuffer size that fills a terminal of `cols × rows` cells.
pub fn viewport_pixels(cols: u16, rows: u16) -> (usize, usize) {
    let rows = rows.saturating_sub(CHROME_ROWS).max(1);
    (cols.max(1) as usize, rows as usize * 2)
}

fn rgb(c: u32) -> Color {
    let (r, g, b) = channels(c);
    Color::Rgb { r, g, b }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Draw one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    frame: &FrameBuffer,
    hud: &HudSnapshot,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    draw_view(out, frame, rows)?;
    draw_hud(out, hud, cols)?;
    draw_controls_hint(out, hud, rows)?;

    if let Some(seconds) = hud.countdown {
        let text = format!("THE SPIRE STIRS  {:>2}", seconds.ceil() as u32);
        draw_banner(out, cols, rows, &text, Color::Red)?;
    }
    if hud.victory {
        draw_victory(out, hud, cols, rows)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── 3-D view ──────────────────────────────────────────────────────────────────

fn draw_view<W: Write>(out: &mut W, frame: &FrameBuffer, rows: u16) -> std::io::Result<()> {
    let cells = rows.saturating_sub(CHROME_ROWS) as usize;
    let mut last: Option<(u32, u32)> = None;

    for cy in 0..cells.min(frame.height() / 2) {
        out.queue(cursor::MoveTo(0, cy as u16 + 1))?;
        for x in 0..frame.width() {
            let top = frame.pixel(x, cy * 2).unwrap_or(0);
            let bottom = frame.pixel(x, cy * 2 + 1).unwrap_or(0);
            // skip colour commands for runs of identical cells
            if last != Some((top, bottom)) {
                out.queue(style::SetForegroundColor(rgb(top)))?;
                out.queue(style::SetBackgroundColor(rgb(bottom)))?;
                last = Some((top, bottom));
            }
            out.queue(Print('▀'))?;
        }
    }
    out.queue(style::ResetColor)?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, hud: &HudSnapshot, cols: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;

    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(format!(" HP {:>3}", hud.health)))?;

    out.queue(style::SetForegroundColor(C_HUD_AMMO))?;
    if hud.reloading {
        out.queue(Print("  [reloading]"))?;
    } else {
        out.queue(Print(format!("  Ammo {}", "|".repeat(hud.ammo as usize))))?;
    }

    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("  Score:{:>5}  Hi:{:>5}", hud.score, hud.high_score)))?;

    // Right side: boss / Marshall / allies, whichever apply
    let mut right = String::new();
    if let Some(health) = hud.marshall_health {
        right.push_str(&format!("Marshall {health:>2}  "));
    }
    match hud.encounter {
        EncounterPhase::Phase1 | EncounterPhase::Phase2 => {
            right.push_str(&format!("Spire {:>3}", hud.boss_health));
            if hud.force_field {
                right.push_str(&format!(" [shield, {} claws]", hud.claws_alive));
            }
            if hud.enraged {
                right.push_str(" ENRAGED");
            }
            right.push_str("  ");
        }
        _ => {}
    }
    if hud.allies_unlocked {
        if hud.ally_cooldown > 0.0 {
            let wait = hud.ally_cooldown.ceil();
            right.push_str(&format!("Paragons {} ({wait:.0}s)", hud.allies_alive));
        } else {
            right.push_str(&format!("Paragons {}", hud.allies_alive));
        }
    }

    let rx = cols.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    let color = if hud.encounter == EncounterPhase::Dormant {
        C_HUD_ALLY
    } else {
        C_HUD_BOSS
    };
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(right))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, hud: &HudSnapshot, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(" WASD: Move  ←→: Turn  ↑↓: Look  SPACE: Shoot  R: Reload"))?;
    if hud.allies_unlocked {
        out.queue(Print("  F: Summon"))?;
    }
    out.queue(Print("  Q: Quit"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_banner<W: Write>(
    out: &mut W,
    cols: u16,
    rows: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, 2.min(rows.saturating_sub(1))))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(style::SetBackgroundColor(Color::Black))?;
    out.queue(Print(text))?;
    out.queue(style::ResetColor)?;
    Ok(())
}

fn draw_victory<W: Write>(
    out: &mut W,
    hud: &HudSnapshot,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let score_line = format!("Final Score: {:>6}", hud.score);
    let best_line = if hud.score >= hud.high_score && hud.score > 0 {
        format!("★ NEW BEST: {:>6} ★", hud.score)
    } else {
        format!("Best Score:  {:>6}", hud.high_score)
    };

    let lines: [(&str, Color); 6] = [
        ("╔════════════════════╗", Color::Yellow),
        ("║  THE SPIRE FALLS   ║", Color::Yellow),
        ("╚════════════════════╝", Color::Yellow),
        (&score_line, Color::White),
        (&best_line, Color::Yellow),
        ("R - Play Again  Q - Quit", Color::White),
    ];

    let cx = cols / 2;
    let start_row = (rows / 2).saturating_sub(lines.len() as u16 / 2);
    out.queue(style::SetBackgroundColor(Color::Black))?;
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    out.queue(style::ResetColor)?;
    Ok(())
}
