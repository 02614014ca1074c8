use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use crate::session::{Direction, Stimulus, INITIAL_SIZE};

use super::to_color;

const GRID: u16 = 5;

/// Tumbling "E" opening to the right
const GLYPH: [[bool; 5]; 5] = [
    [true, true, true, true, true],
    [true, false, false, false, false],
    [true, true, true, true, true],
    [true, false, false, false, false],
    [true, true, true, true, true],
];

/// Whether grid cell (row, col) of the glyph is inked for a given direction
pub fn glyph_cell(direction: Direction, row: usize, col: usize) -> bool {
    let last = GLYPH.len() - 1;
    let (r, c) = match direction {
        Direction::Right => (row, col),
        Direction::Left => (last - row, last - col),
        Direction::Up => (col, last - row),
        Direction::Down => (col, row),
    };
    GLYPH[r][c]
}

/// Optotype scaled to the area. Terminal cells are about twice as tall as
/// wide, so each glyph unit spans two columns per row.
pub struct Optotype<'a> {
    pub stimulus: &'a Stimulus,
}

impl Optotype<'_> {
    /// Height in rows the glyph occupies inside `area`
    pub fn rows_for(&self, area: Rect) -> u16 {
        let max_rows = area.height.min(area.width / 2);
        let scaled = (self.stimulus.size / INITIAL_SIZE * max_rows as f64).round() as u16;
        scaled.clamp(GRID.min(max_rows), max_rows.max(1))
    }
}

impl Widget for Optotype<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let rows = self.rows_for(area);
        let cols = (rows * 2).min(area.width);
        let x0 = area.x + (area.width - cols) / 2;
        let y0 = area.y + (area.height - rows) / 2;
        let ink = to_color(self.stimulus.color);

        for dy in 0..rows {
            for dx in 0..cols {
                let row = (dy * GRID / rows) as usize;
                let col = (dx * GRID / cols) as usize;
                if glyph_cell(self.stimulus.direction, row, col) {
                    if let Some(cell) = buf.cell_mut((x0 + dx, y0 + dy)) {
                        cell.set_bg(ink);
                    }
                }
            }
        }
    }
}
