use crossterm::{
    cursor, execute,
    event::{DisableMouseCapture, EnableMouseCapture},
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

use crate::config::Settings;
use crate::game::{RunnerPhase, RunnerSession, RunnerStats};
use crate::model::MainData;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            c.ch = ' ';
            c.fg = Color::White;
            c.bg = bg;
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            EnableMouseCapture,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        let prev = CellBuffer::new(cols, rows);
        let cur = CellBuffer::new(cols, rows);

        Ok(Self {
            out,
            cols,
            rows,
            prev,
            cur,
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            DisableMouseCapture,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }

    /// Terminal bell, gated by the sound setting at the call site.
    pub(crate) fn bell(&mut self) {
        let _ = self.out.write_all(b"\x07");
        let _ = self.out.flush();
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

/* -----------------------------
   Pet scene
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PetMood {
    Normal,
    Happy,
    Sulking,
}

pub(crate) fn draw_pet_scene(
    buf: &mut CellBuffer,
    data: &MainData,
    settings: &Settings,
    mood: PetMood,
    note: Option<&str>,
    wag_tick: u64,
) {
    let bg = Color::Black;
    let fg = Color::White;

    let title = format!(
        "Long Dog  |  Length: {} pt ({} segments)",
        data.length_points(),
        data.body_count
    );
    draw_text(buf, 1, 0, &title, fg, bg);

    // The dog, nose to tail: head, one pair of columns per segment, wag.
    let body_cols = (data.body_count as usize) * 2;
    let face = match mood {
        PetMood::Happy => "(^ᴥ^)",
        PetMood::Sulking => "(uᴥu)",
        PetMood::Normal => "(•ᴥ•)",
    };
    let wag = if wag_tick % 2 == 0 { "~" } else { "‾" };

    let dog_y = buf.h / 3;
    let dog_x = 3u16;
    let coat = if settings.enable_color {
        Color::Yellow
    } else {
        Color::White
    };

    draw_text(buf, dog_x + 1, dog_y, "╭──╮", coat, bg);
    let middle = format!("{face}{}o{wag}", "═".repeat(body_cols));
    draw_text(buf, dog_x, dog_y + 1, &middle, coat, bg);
    let mut legs = String::from(" ╰┬┬╯");
    for i in 0..body_cols {
        legs.push(if i % 6 == 4 { '╨' } else { ' ' });
    }
    draw_text(buf, dog_x, dog_y + 2, &legs, coat, bg);

    if mood == PetMood::Happy {
        draw_text(buf, dog_x + 6, dog_y.saturating_sub(1), "♥", Color::Red, bg);
    }
    if let Some(note) = note {
        draw_text(buf, dog_x, dog_y + 4, note, Color::Cyan, bg);
    }

    let panel_y = dog_y + 6;
    let lines = [
        format!(
            "Feeds left today: {}   (streak {}, best {})",
            data.remaining_feeds, data.consecutive_feed_days, data.max_consecutive_feed_days
        ),
        format!("Today: fed {}, petted {}", data.feed_count, data.pet_count),
        format!(
            "Lifetime: fed {}, petted {}, sulked {}",
            data.total_feed_count, data.total_pet_count, data.sad_face_count
        ),
        format!(
            "Food Runner bank: {} food (treat every {})",
            data.runner_food_banked - data.runner_food_rewarded,
            crate::pet::REWARD_CHUNK
        ),
    ];
    for (i, line) in lines.iter().enumerate() {
        draw_text(buf, 1, panel_y + i as u16, line, fg, bg);
    }

    let help = "Keys: f feed | s pet | g food runner | tab settings | h help | q quit";
    draw_text(buf, 1, buf.h.saturating_sub(1), help, fg, bg);
}

/* -----------------------------
   Food Runner scene
------------------------------ */

/// Each grid cell is two columns wide so the field reads roughly square.
pub(crate) const CELL_COLS: u16 = 2;

pub(crate) fn draw_runner_scene(
    buf: &mut CellBuffer,
    session: &RunnerSession,
    stats: &RunnerStats,
    settings: &Settings,
    flash: bool,
) {
    let bg = Color::Black;
    let fg = Color::White;

    let field_w = (session.grid_w() as u16) * CELL_COLS + 2;
    let field_h = (session.grid_h() as u16) + 2;
    let ox = 2u16;
    let oy = 1u16;

    let border = if flash && settings.enable_color {
        Color::Yellow
    } else {
        fg
    };
    draw_box(buf, ox, oy, field_w, field_h, border);

    let dog = if settings.enable_color {
        Color::Yellow
    } else {
        Color::White
    };
    let food = if settings.enable_color {
        Color::Red
    } else {
        Color::White
    };

    let head = session.head;
    let target = session.target;
    for (pos, ch, color) in [(target, '●', food), (head, '█', dog)] {
        let x = ox + 1 + (pos.x as u16) * CELL_COLS;
        let y = oy + 1 + pos.y as u16;
        for dx in 0..CELL_COLS {
            let ch = if ch == '●' && dx > 0 { ' ' } else { ch };
            buf.set(x + dx, y, Cell { ch, fg: color, bg });
        }
    }

    let hud_x = ox + field_w + 3;
    draw_text(buf, hud_x, oy + 1, "Food Runner", fg, bg);
    draw_text(
        buf,
        hud_x,
        oy + 3,
        &format!("Speed: {}", session.level),
        fg,
        bg,
    );
    draw_text(
        buf,
        hud_x,
        oy + 4,
        &format!("Food this run: {}", session.collected),
        fg,
        bg,
    );
    if stats.high_score > 0 {
        draw_text(
            buf,
            hud_x,
            oy + 6,
            &format!("High score: {}", stats.high_score),
            fg,
            bg,
        );
    }
    draw_text(
        buf,
        hud_x,
        oy + 7,
        &format!("Games played: {}", stats.games_played),
        fg,
        bg,
    );

    if let RunnerPhase::Countdown { step } = session.phase {
        let cx = ox + field_w / 2;
        let cy = oy + field_h / 2;
        draw_text(buf, cx, cy, &step.to_string(), Color::Yellow, bg);
    }

    let help = "Drag or arrows/wasd steer | enter start | esc back | q quit";
    draw_text(buf, 1, buf.h.saturating_sub(1), help, fg, bg);
}

pub(crate) fn draw_box(buf: &mut CellBuffer, x0: u16, y0: u16, w: u16, h: u16, fg: Color) {
    if w < 2 || h < 2 {
        return;
    }
    let bg = Color::Black;
    let cell = |ch| Cell { ch, fg, bg };
    for x in x0..x0 + w {
        buf.set(x, y0, cell('─'));
        buf.set(x, y0 + h - 1, cell('─'));
    }
    for y in y0..y0 + h {
        buf.set(x0, y, cell('│'));
        buf.set(x0 + w - 1, y, cell('│'));
    }
    buf.set(x0, y0, cell('┌'));
    buf.set(x0 + w - 1, y0, cell('┐'));
    buf.set(x0, y0 + h - 1, cell('└'));
    buf.set(x0 + w - 1, y0 + h - 1, cell('┘'));
}

/* -----------------------------
   Settings overlay
------------------------------ */

pub(crate) const SETTINGS_ENTRIES: usize = 3;

pub(crate) fn draw_settings(buf: &mut CellBuffer, settings: &Settings, cursor: usize) {
    let bg = Color::Black;
    let fg = Color::White;
    let hi = Color::Yellow;

    let start_x = 1;
    let start_y = 2;

    draw_text(buf, start_x, start_y, "Settings", fg, bg);

    let rows = [
        format!("Sound: {}", on_off(settings.sound_enabled)),
        format!("Vibration: {}", on_off(settings.vibration_enabled)),
        format!("Color: {}", on_off(settings.enable_color)),
    ];
    for (i, row) in rows.iter().enumerate() {
        let marker = if cursor == i { ">" } else { " " };
        let line = format!("{marker} {row}");
        draw_text(
            buf,
            start_x,
            start_y + 2 + i as u16,
            &line,
            if cursor == i { hi } else { fg },
            bg,
        );
    }

    let help = "Settings: ↑↓ select | enter toggle | esc back";
    draw_text(buf, 1, buf.h.saturating_sub(1), help, fg, bg);
}

fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}

/* -----------------------------
   Centered overlay box
------------------------------ */

pub(crate) fn draw_center_box(buf: &mut CellBuffer, title: &str, body: &str) {
    let w = buf.w;
    let h = buf.h;

    let bw = std::cmp::min(60, w.saturating_sub(4));
    let bh = std::cmp::min(18, h.saturating_sub(4));
    if bw < 4 || bh < 4 {
        return;
    }

    let x0 = (w - bw) / 2;
    let y0 = (h - bh) / 2;

    // Blank the interior so the box floats over the scene.
    for y in y0..y0 + bh {
        for x in x0..x0 + bw {
            buf.set(x, y, Cell::default());
        }
    }
    draw_box(buf, x0, y0, bw, bh, Color::White);

    draw_text(buf, x0 + 2, y0 + 1, title, Color::White, Color::Black);

    let mut yy = y0 + 3;
    for line in body.lines() {
        if yy >= y0 + bh - 1 {
            break;
        }
        draw_text(buf, x0 + 2, yy, line, Color::White, Color::Black);
        yy += 1;
    }
}
