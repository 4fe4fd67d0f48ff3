/// Rendering layer — all terminal drawing lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// session.  No game logic is performed; this module only translates
/// state into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use crate::entities::{BonusShip, EnemyKind, EnemyShip, ProjectileKind, Ship};
use crate::session::{GameSession, Phase, SEPARATION_LINE};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_ENEMY_A: Color = Color::Green;
const C_ENEMY_B: Color = Color::Yellow;
const C_ENEMY_C: Color = Color::Red;
const C_BONUS: Color = Color::Magenta;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_REWARD: Color = Color::Yellow;
const C_BANNER: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame of the session.
pub fn render<W: Write>(out: &mut W, session: &GameSession) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, session)?;
    draw_hud(out, session)?;

    for enemy in session.formation.iter() {
        if !enemy.destroyed {
            draw_enemy(out, enemy, session.field_bottom())?;
        }
    }
    if let Some(bonus) = &session.bonus_ship {
        draw_bonus(out, bonus, session.width)?;
    }
    for bullet in &session.bullets {
        draw_bullet(out, bullet)?;
    }
    draw_ship(out, session)?;

    if session.banner_active() {
        draw_banner(out, session)?;
    }
    if let Some(seconds) = session.countdown() {
        draw_countdown(out, session, seconds)?;
    }
    match session.phase {
        Phase::Paused => draw_pause(out, session)?,
        Phase::Finished => draw_finished(out, session)?,
        Phase::Running => {}
    }
    draw_controls_hint(out, session)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, (session.height - 1).max(0) as u16))?;
    out.flush()?;
    Ok(())
}

// ── Border & HUD ──────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, session: &GameSession) -> std::io::Result<()> {
    let w = session.width as usize;
    let h = session.height as u16;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Separation line between the HUD and the play field.
    out.queue(cursor::MoveTo(0, (SEPARATION_LINE - 1) as u16))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in SEPARATION_LINE as u16..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo((session.width - 1) as u16, row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

fn draw_hud<W: Write>(out: &mut W, session: &GameSession) -> std::io::Result<()> {
    // Score — left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score: {:>8}", session.score)))?;

    // Level — centre
    let level_str = format!("[ LEVEL {} ]", session.level);
    let lx = (session.width as u16 / 2).saturating_sub(level_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(&level_str))?;

    // Lives — right
    let hearts: String = "♥".repeat(session.lives as usize);
    let lives_text = format!("Lives: {}", hearts);
    let rx = (session.width as u16).saturating_sub(lives_text.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_text))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_ship<W: Write>(out: &mut W, session: &GameSession) -> std::io::Result<()> {
    use crate::entities::Entity;

    let ship = &session.ship;
    out.queue(style::SetForegroundColor(C_PLAYER))?;

    if ship.is_destroyed() {
        // Brief wreck while the respawn gate runs.
        out.queue(cursor::MoveTo(ship.x.max(1) as u16, ship.y as u16))?;
        out.queue(Print("✶ ✶"))?;
        return Ok(());
    }

    // Tier 1:  ▲      Tier 2:  ▲
    //         /|\              ╣█╠
    let tip_x = ship.x + Ship::WIDTH / 2;
    out.queue(cursor::MoveTo(tip_x as u16, ship.y as u16))?;
    out.queue(Print("▲"))?;
    out.queue(cursor::MoveTo(ship.x.max(1) as u16, (ship.y + 1) as u16))?;
    out.queue(Print(if ship.tier >= 2 { "╣█╠" } else { "/|\\" }))?;
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, enemy: &EnemyShip, play_bottom: i32) -> std::io::Result<()> {
    let (color, top, base) = match enemy.kind {
        EnemyKind::A => (C_ENEMY_A, "<▼>", "[_]"),
        EnemyKind::B => (C_ENEMY_B, "(◉)", "\\-/"),
        EnemyKind::C => (C_ENEMY_C, "{Θ}", "/^\\"),
    };
    out.queue(style::SetForegroundColor(color))?;
    out.queue(cursor::MoveTo(enemy.x.max(0) as u16, enemy.y as u16))?;
    out.queue(Print(top))?;
    if enemy.y + 1 <= play_bottom {
        out.queue(cursor::MoveTo(enemy.x.max(0) as u16, (enemy.y + 1) as u16))?;
        out.queue(Print(base))?;
    }
    Ok(())
}

fn draw_bonus<W: Write>(out: &mut W, bonus: &BonusShip, field_width: i32) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_BONUS))?;
    if bonus.destroyed {
        // Explosion linger.
        let cx = (bonus.x + BonusShip::WIDTH / 2).clamp(1, field_width - 2);
        out.queue(cursor::MoveTo(cx as u16, bonus.y as u16))?;
        out.queue(Print("✷"))?;
        return Ok(());
    }
    // Clip the sprite while it slides past either border.
    let sprite = "<-Ø->";
    let clip_left = (1 - bonus.x).clamp(0, BonusShip::WIDTH) as usize;
    let clip_right = (bonus.x + BonusShip::WIDTH - (field_width - 1)).clamp(0, BonusShip::WIDTH) as usize;
    let visible: String = sprite
        .chars()
        .skip(clip_left)
        .take((BonusShip::WIDTH as usize).saturating_sub(clip_left + clip_right))
        .collect();
    if !visible.is_empty() {
        out.queue(cursor::MoveTo((bonus.x + clip_left as i32) as u16, bonus.y as u16))?;
        out.queue(Print(visible))?;
    }
    Ok(())
}

fn draw_bullet<W: Write>(out: &mut W, bullet: &crate::entities::Projectile) -> std::io::Result<()> {
    match bullet.kind {
        ProjectileKind::Reward => {
            out.queue(cursor::MoveTo(bullet.x.max(1) as u16, bullet.y as u16))?;
            out.queue(style::SetForegroundColor(C_REWARD))?;
            out.queue(Print("<◆>"))?;
        }
        ProjectileKind::Standard if bullet.speed < 0 => {
            out.queue(cursor::MoveTo(bullet.x as u16, bullet.y as u16))?;
            out.queue(style::SetForegroundColor(C_BULLET_PLAYER))?;
            out.queue(Print("║"))?;
        }
        ProjectileKind::Standard => {
            out.queue(cursor::MoveTo(bullet.x as u16, bullet.y as u16))?;
            out.queue(style::SetForegroundColor(C_BULLET_ENEMY))?;
            out.queue(Print("↓"))?;
        }
    }
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_banner<W: Write>(out: &mut W, session: &GameSession) -> std::io::Result<()> {
    let text = &session.reward_banner;
    if text.is_empty() {
        return Ok(());
    }
    let col = (session.width as u16 / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, SEPARATION_LINE as u16))?;
    out.queue(style::SetForegroundColor(C_BANNER))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_countdown<W: Write>(
    out: &mut W,
    session: &GameSession,
    seconds: u64,
) -> std::io::Result<()> {
    let cx = session.width as u16 / 2;
    let cy = session.height as u16 / 2;
    let gap = (session.height / 12).max(1) as u16;

    out.queue(style::SetForegroundColor(C_BORDER))?;
    for row in [cy.saturating_sub(gap), cy + gap] {
        out.queue(cursor::MoveTo(1, row))?;
        out.queue(Print("─".repeat(session.width as usize - 2)))?;
    }

    let line = if seconds > 0 {
        format!("Level {} in {}...", session.level, seconds)
    } else {
        "GO!".to_string()
    };
    out.queue(cursor::MoveTo(
        cx.saturating_sub(line.chars().count() as u16 / 2),
        cy,
    ))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(&line))?;

    if session.bonus_life {
        let note = "Bonus life!";
        out.queue(cursor::MoveTo(
            cx.saturating_sub(note.len() as u16 / 2),
            cy + 1,
        ))?;
        out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
        out.queue(Print(note))?;
    }
    Ok(())
}

fn draw_pause<W: Write>(out: &mut W, session: &GameSession) -> std::io::Result<()> {
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", Color::Cyan),
        ("║      PAUSED      ║", Color::Cyan),
        ("╚══════════════════╝", Color::Cyan),
        ("ESC Resume   R Restart   Q Menu", Color::White),
    ];
    draw_centered(out, session, lines)
}

fn draw_finished<W: Write>(out: &mut W, session: &GameSession) -> std::io::Result<()> {
    let (title, color) = if session.lives == 0 {
        ("║    GAME  OVER    ║", Color::Red)
    } else {
        ("║   LEVEL  CLEAR   ║", Color::Green)
    };
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", color),
        (title, color),
        ("╚══════════════════╝", color),
    ];
    draw_centered(out, session, lines)
}

fn draw_centered<W: Write>(
    out: &mut W,
    session: &GameSession,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let cx = session.width as u16 / 2;
    let start_row = (session.height as u16 / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, session: &GameSession) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, (session.height - 1).max(0) as u16))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   ESC : Pause"))?;
    Ok(())
}
