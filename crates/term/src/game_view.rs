//! GameView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Kind, Position};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const CURSOR_BG: Rgb = Rgb::new(95, 95, 120);
const HINT_BG: Rgb = Rgb::new(80, 70, 20);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

/// Tile colours; kinds past the end of the table wrap around.
const PALETTE: [Rgb; 8] = [
    Rgb::new(80, 120, 220),  // blue
    Rgb::new(100, 220, 120), // green
    Rgb::new(220, 80, 80),   // red
    Rgb::new(240, 220, 80),  // yellow
    Rgb::new(200, 120, 220), // purple
    Rgb::new(80, 220, 220),
    Rgb::new(255, 165, 0),
    Rgb::new(240, 240, 240),
];

/// Board frame placement inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

/// A lightweight terminal renderer for the match-3 board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 roughly squares a cell on typical terminal glyphs.
        Self::new(2, 1)
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    fn layout(&self, rows: u16, cols: u16, viewport: Viewport) -> Layout {
        let w = cols * self.cell_w + 2;
        let h = rows * self.cell_h + 2;
        let x = viewport.width.saturating_sub(w) / 2;
        let y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(h) / 2,
            AnchorY::Top => 0,
        };
        Layout { x, y, w, h }
    }

    /// Board cell under terminal cell `(x, y)`, for mouse clicks.
    pub fn cell_at(&self, snap: &GameSnapshot, viewport: Viewport, x: u16, y: u16) -> Option<Position> {
        let l = self.layout(snap.rows, snap.cols, viewport);
        let (inner_x, inner_y) = (l.x + 1, l.y + 1);
        if x < inner_x || y < inner_y {
            return None;
        }
        let col = (x - inner_x) / self.cell_w;
        let row = (y - inner_y) / self.cell_h;
        (row < snap.rows && col < snap.cols).then(|| Position::new(row, col))
    }

    /// Render into an existing framebuffer.
    ///
    /// Callers reuse the framebuffer across frames; it is only resized when
    /// the viewport changes.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        cursor: Option<Position>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let l = self.layout(snap.rows, snap.cols, viewport);
        let border = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);

        fb.fill_rect(l.x + 1, l.y + 1, l.w - 2, l.h - 2, ' ', CellStyle::new(BOARD_BG, BOARD_BG));
        draw_border(fb, l, border);

        let hinted = |p: Position| snap.hint.is_some_and(|(a, b)| a == p || b == p);

        for row in 0..snap.rows {
            for col in 0..snap.cols {
                let p = Position::new(row, col);
                let Some(tile) = snap.tile(p) else {
                    continue;
                };

                let bg = if cursor == Some(p) {
                    CURSOR_BG
                } else if hinted(p) {
                    HINT_BG
                } else {
                    BOARD_BG
                };

                let (ch, style) = match tile.kind {
                    None => ('·', CellStyle::new(Rgb::new(90, 90, 100), bg).dim()),
                    Some(kind) if tile.selected => ('▓', CellStyle::new(kind_color(kind), bg).bold()),
                    Some(kind) => ('█', CellStyle::new(kind_color(kind), bg)),
                };
                self.fill_cell_rect(fb, l, p, ch, style);
            }
        }

        self.draw_side_panel(fb, snap, viewport, l);

        if snap.game_over {
            draw_overlay_text(fb, l, "GAME OVER");
        } else if snap.filling {
            draw_overlay_text(fb, l, "FILLING");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, cursor: Option<Position>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, cursor, viewport, &mut fb);
        fb
    }

    fn fill_cell_rect(&self, fb: &mut FrameBuffer, l: Layout, p: Position, ch: char, style: CellStyle) {
        let px = l.x + 1 + p.col * self.cell_w;
        let py = l.y + 1 + p.row * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, viewport: Viewport, l: Layout) {
        let panel_x = l.x.saturating_add(l.w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), PANEL_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        let dim = value.dim();

        let mut y = l.y;
        let mut section = |fb: &mut FrameBuffer, title: &str| {
            fb.put_str(panel_x, y, title, label);
            let value_y = y.saturating_add(1);
            y = y.saturating_add(3);
            value_y
        };

        let vy = section(fb, "SCORE");
        fb.put_u32(panel_x, vy, snap.score, value);

        let vy = section(fb, "HIGH");
        fb.put_u32(panel_x, vy, snap.high_score, value);

        let vy = section(fb, "TIME");
        let secs = snap.timers.time_left_ms.div_ceil(1000);
        let x = fb.put_u32(panel_x, vy, secs / 60, value);
        let x = fb.put_str(x, vy, ":", value);
        if secs % 60 < 10 {
            fb.put_char(x, vy, '0', value);
            fb.put_u32(x + 1, vy, secs % 60, value);
        } else {
            fb.put_u32(x, vy, secs % 60, value);
        }

        let vy = section(fb, "TILES");
        let x = fb.put_u32(panel_x, vy, snap.cleared_total, value);
        let x = fb.put_str(x, vy, "/", dim);
        fb.put_u32(x, vy, snap.next_milestone_at, dim);

        let vy = section(fb, "COMBO");
        if snap.last_chains > 0 {
            let x = fb.put_str(panel_x, vy, "x", value);
            fb.put_u32(x, vy, snap.last_chains, value);
        } else {
            fb.put_str(panel_x, vy, "-", value);
        }
    }
}

fn kind_color(kind: Kind) -> Rgb {
    PALETTE[kind.id() as usize % PALETTE.len()]
}

fn draw_border(fb: &mut FrameBuffer, l: Layout, style: CellStyle) {
    if l.w < 2 || l.h < 2 {
        return;
    }
    let (right, bottom) = (l.x + l.w - 1, l.y + l.h - 1);

    fb.put_char(l.x, l.y, '┌', style);
    fb.put_char(right, l.y, '┐', style);
    fb.put_char(l.x, bottom, '└', style);
    fb.put_char(right, bottom, '┘', style);

    for x in l.x + 1..right {
        fb.put_char(x, l.y, '─', style);
        fb.put_char(x, bottom, '─', style);
    }
    for y in l.y + 1..bottom {
        fb.put_char(l.x, y, '│', style);
        fb.put_char(right, y, '│', style);
    }
}

fn draw_overlay_text(fb: &mut FrameBuffer, l: Layout, text: &str) {
    let mid_y = l.y.saturating_add(l.h / 2);
    let text_w = text.chars().count() as u16;
    let x = l.x.saturating_add(l.w.saturating_sub(text_w) / 2);
    let style = CellStyle::new(Rgb::new(255, 255, 255), PANEL_BG).bold();
    fb.put_str(x, mid_y, text, style);
}
