/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into `front` buffer (array of Glyph)
///   2. Compare each glyph with `back` buffer (previous frame)
///   3. Only emit terminal commands for glyphs that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Layer order inside the maze: cells, particles, ghosts, player.
/// Particles never paint over walls.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::cell::Cell;
use crate::domain::color::Rgb;
use crate::fx::ParticleDraw;
use crate::sim::view::{particle_cell, Frame};
use crate::sim::world::Phase;

use super::sprite::Avatar;

// ── Glyph: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Glyph {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Glyph {
    /// Explicit dark background for every terminal cell. Using the same
    /// RGB for `Clear` and each glyph keeps row gaps invisible on VTE.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
    const BASE_RGB: Rgb = Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Glyph = Glyph { ch: ' ', fg: Color::White, bg: Glyph::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Glyph = Glyph { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Glyph { ch, fg, bg }
    }
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

// ── FrameBuffer: a 2D grid of Glyphs ──

struct FrameBuffer {
    width: usize,
    height: usize,
    glyphs: Vec<Glyph>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, glyphs: vec![Glyph::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.glyphs = vec![Glyph::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.glyphs.fill(Glyph::BLANK);
    }

    fn invalidate(&mut self) {
        self.glyphs.fill(Glyph::INVALID);
    }

    fn set(&mut self, x: usize, y: usize, g: Glyph) {
        if x < self.width && y < self.height {
            self.glyphs[y * self.width + x] = g;
        }
    }

    fn get(&self, x: usize, y: usize) -> Glyph {
        if x < self.width && y < self.height {
            self.glyphs[y * self.width + x]
        } else {
            Glyph::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Glyph::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Glyph::new(' ', Color::White, bg));
        }
    }
}

// ── Layout ──

/// Each maze cell = 2 terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const WALL_FG: Color = Color::Rgb { r: 60, g: 80, b: 230 };
const WALL_BG: Color = Color::Rgb { r: 30, g: 40, b: 140 };
const PELLET_FG: Color = Color::Rgb { r: 255, g: 220, b: 180 };
const PERF_FG: Color = Color::Rgb { r: 255, g: 140, b: 0 };
const BANNER_FG: Color = Color::Rgb { r: 255, g: 220, b: 50 };

// ── Compose: build buffer content from a Frame ──

fn compose(buf: &mut FrameBuffer, frame: &Frame, avatar: &Avatar) {
    let map_h = frame.cells.len();
    let map_w = frame.cells.first().map_or(0, Vec::len);

    compose_hud(buf, frame);

    // ── Maze ──
    for (gy, row) in frame.cells.iter().enumerate() {
        for (gx, cell) in row.iter().enumerate() {
            let (c0, c1, fg, bg) = match cell {
                Cell::Wall => ('█', '█', WALL_FG, WALL_BG),
                Cell::Pellet => ('•', ' ', PELLET_FG, Color::Reset),
                Cell::Empty => (' ', ' ', Color::White, Color::Reset),
            };
            let col = gx * CELL_W;
            buf.set(col, MAP_ROW + gy, Glyph::new(c0, fg, bg));
            buf.set(col + 1, MAP_ROW + gy, Glyph::new(c1, fg, bg));
        }
    }

    compose_particles(buf, frame);

    // ── Ghosts ──
    for g in &frame.ghosts {
        if let Some((col, row)) = grid_to_term(g.x, g.y, map_w, map_h) {
            let fg = rgb(g.color);
            buf.set(col, row, Glyph::new('▟', fg, Color::Reset));
            buf.set(col + 1, row, Glyph::new('▙', fg, Color::Reset));
        }
    }

    // ── Player ──
    let (px, py) = frame.player;
    if let Some((col, row)) = grid_to_term(px, py, map_w, map_h) {
        let fg = rgb(avatar.color);
        buf.set(col, row, Glyph::new(avatar.glyph, fg, Color::Reset));
        buf.set(col + 1, row, Glyph::new(facing_mark(frame), fg, Color::Reset));
    }

    if frame.banner {
        let text = " ★ NEW HIGH SCORE! ★ ";
        let x = (map_w * CELL_W).saturating_sub(text.chars().count()) / 2;
        buf.put_str(x, MAP_ROW + map_h / 2, text, BANNER_FG, HUD_BG);
    }

    // ── Message bar ──
    let msg_row = MAP_ROW + map_h + 1;
    if !frame.message.is_empty() {
        buf.fill_row(msg_row, MSG_BG);
        buf.put_str(0, msg_row, &format!(" ◈ {} ", frame.message), Color::Black, MSG_BG);
    }

    // ── Help bar ──
    let help = match frame.phase {
        Phase::GameOver | Phase::LevelComplete => " SPACE:Restart  Q/Esc:Quit  │  Pad: Start/A:Restart  Select:Quit",
        _ => " Arrows/WASD:Move  P:Effects  Q/Esc:Quit  │  Pad: D-pad/Stick:Move  Select:Quit",
    };
    buf.put_str(0, MAP_ROW + map_h + 3, help, Color::DarkGrey, Color::Reset);
}

fn compose_hud(buf: &mut FrameBuffer, frame: &Frame) {
    let hud = &frame.hud;
    let line = format!(
        " Score:{:<7} High:{:<7} ♥×{}  Pellets:{:<3} ",
        hud.score, hud.high_score, hud.lives, hud.pellets,
    );
    buf.fill_row(HUD_ROW, HUD_BG);
    buf.put_str(0, HUD_ROW, &line, Color::White, HUD_BG);

    if let Some(stats) = hud.performance {
        let perf = format!(
            " PERF {}/{} {:.1}ms ",
            stats.active, stats.max_particles, stats.frame_time_ms,
        );
        let x = line.chars().count() + 1;
        buf.put_str(x, HUD_ROW, &perf, PERF_FG, HUD_BG);
    }
}

fn compose_particles(buf: &mut FrameBuffer, frame: &Frame) {
    for p in &frame.particles {
        let Some((col, row)) = particle_cell(p.x, p.y) else { continue };
        let gx = col / CELL_W;
        let on_wall = frame
            .cells
            .get(row)
            .and_then(|r| r.get(gx))
            .map_or(true, |c| *c == Cell::Wall);
        if on_wall {
            continue;
        }
        buf.set(col, MAP_ROW + row, particle_glyph(p));
    }
}

fn particle_glyph(p: &ParticleDraw) -> Glyph {
    let ch = if p.radius >= 5.0 {
        '●'
    } else if p.radius >= 4.0 {
        '•'
    } else {
        '·'
    };
    let fg = p.color.fade(Glyph::BASE_RGB, p.opacity);
    Glyph::new(ch, rgb(fg), Color::Reset)
}

fn facing_mark(frame: &Frame) -> char {
    match (frame.facing.dx, frame.facing.dy) {
        (1, 0) => '›',
        (-1, 0) => '‹',
        (0, -1) => '˄',
        (0, 1) => '˅',
        _ => ' ',
    }
}

fn grid_to_term(x: i32, y: i32, w: usize, h: usize) -> Option<(usize, usize)> {
    if x < 0 || y < 0 || x as usize >= w || y as usize >= h {
        return None;
    }
    Some((x as usize * CELL_W, MAP_ROW + y as usize))
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    avatar: Avatar,
}

impl Renderer {
    pub fn new(avatar: Avatar) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            avatar,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Glyph::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.invalidate();

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, frame: &Frame) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for clean transition
        if self.last_phase != Some(frame.phase) {
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(frame.phase);
        }

        self.front.clear();
        compose(&mut self.front, frame, &self.avatar);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed glyphs ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Glyph::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Glyph::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let g = self.front.get(x, y);
                if g == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if g.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(g.fg))?;
                    last_fg = g.fg;
                }
                if g.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(g.bg))?;
                    last_bg = g.bg;
                }

                queue!(self.writer, Print(g.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::color;
    use crate::fx::ParticleStats;
    use crate::sim::view::project;
    use crate::sim::world::WorldState;

    fn stats(perf: bool) -> ParticleStats {
        ParticleStats {
            active: 80,
            max_particles: 75,
            performance_mode: perf,
            frame_time_ms: 22.5,
            pooled: 50,
            utilization_pct: 100.0,
        }
    }

    fn buffer() -> FrameBuffer {
        FrameBuffer::new(80, 30)
    }

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).ch).collect()
    }

    fn world() -> WorldState {
        WorldState::new(GameConfig::default().speed)
    }

    #[test]
    fn maze_player_and_ghosts_are_drawn() {
        let w = world();
        let frame = project(&w, 0, Vec::new(), stats(false));
        let mut buf = buffer();
        compose(&mut buf, &frame, &Avatar::default());

        assert_eq!(buf.get(0, MAP_ROW).ch, '█');
        assert_eq!(buf.get(2, MAP_ROW + 1).ch, '●');
        let (gx, gy) = (w.ghosts[0].x as usize, w.ghosts[0].y as usize);
        let ghost = buf.get(gx * CELL_W, MAP_ROW + gy);
        assert_eq!(ghost.ch, '▟');
        assert_eq!(ghost.fg, rgb(color::GHOST_RED));
        assert!(row_text(&buf, HUD_ROW).contains("Score:0"));
        assert!(!row_text(&buf, HUD_ROW).contains("PERF"));
    }

    #[test]
    fn perf_indicator_in_hud() {
        let w = world();
        let frame = project(&w, 0, Vec::new(), stats(true));
        let mut buf = buffer();
        compose(&mut buf, &frame, &Avatar::default());
        assert!(row_text(&buf, HUD_ROW).contains("PERF 80/75 22.5ms"));
    }

    #[test]
    fn particles_skip_walls_and_fade() {
        let w = world();
        let draws = vec![
            // open cell (1,1), left half
            ParticleDraw { x: 40.0, y: 40.0, radius: 4.0, color: color::PURPLE, opacity: 0.5 },
            // wall cell (0,0)
            ParticleDraw { x: 5.0, y: 5.0, radius: 6.0, color: color::RED, opacity: 1.0 },
        ];
        let frame = project(&w, 0, draws, stats(false));
        let mut buf = buffer();
        compose_particles(&mut buf, &frame);
        let g = buf.get(2, MAP_ROW + 1);
        assert_eq!(g.ch, '•');
        assert_eq!(g.fg, rgb(color::PURPLE.fade(Glyph::BASE_RGB, 0.5)));
        assert_eq!(buf.get(0, MAP_ROW), Glyph::BLANK);
    }

    #[test]
    fn message_and_banner() {
        let mut w = world();
        w.arm_celebration();
        w.set_message("Game Over! Press SPACE to restart", 0);
        w.phase = Phase::GameOver;
        let frame = project(&w, 0, Vec::new(), stats(false));
        let mut buf = buffer();
        compose(&mut buf, &frame, &Avatar::default());
        assert!(row_text(&buf, MAP_ROW + 10).contains("NEW HIGH SCORE!"));
        assert!(row_text(&buf, MAP_ROW + 21).contains("Game Over!"));
        assert!(row_text(&buf, MAP_ROW + 23).contains("SPACE:Restart"));
    }
}
