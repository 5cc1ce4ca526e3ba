use crate::graphics::{Canvas, Color, Surface, TextAlign, TextRun};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color as TermColor, Print, SetBackgroundColor, SetForegroundColor},
    terminal,
};
use std::io::{self, Write};

/// Fallback logical pixel size of one terminal cell
pub const DEFAULT_CELL_SIZE: (u32, u32) = (8, 16);

/// Label of the clickable debug badge
pub const BADGE: &str = "[bug]";

/// Puts the terminal into full-screen raw mode and restores it on drop
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn acquire() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = TerminalGuard { _private: () };
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Current terminal size in cells as `(columns, rows)`
pub fn grid_size() -> io::Result<(u16, u16)> {
    match termsize::get() {
        Some(size) if size.cols > 0 && size.rows > 0 => Ok((size.cols, size.rows)),
        _ => terminal::size(),
    }
}

/// Largest cell size, in logical pixels, taken from flags or the terminal
pub const MAX_CELL_SIZE: u32 = 64;

/// Logical pixels per cell, measured from the terminal when it reports
/// its pixel size and `requested` leaves a dimension at zero
pub fn cell_size(requested: (u32, u32)) -> (u32, u32) {
    let measured = terminal::window_size().ok().and_then(|size| {
        if size.width == 0 || size.height == 0 || size.columns == 0 || size.rows == 0 {
            None
        } else {
            Some((
                (size.width / size.columns) as u32,
                (size.height / size.rows) as u32,
            ))
        }
    });
    let pick = |asked: u32, measured: Option<u32>, fallback: u32| match asked {
        0 => measured
            .filter(|&m| m > 0 && m <= MAX_CELL_SIZE)
            .unwrap_or(fallback),
        n => n,
    };
    (
        pick(requested.0, measured.map(|m| m.0), DEFAULT_CELL_SIZE.0),
        pick(requested.1, measured.map(|m| m.1), DEFAULT_CELL_SIZE.1),
    )
}

/// Maps a canvas onto the terminal cell grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub columns: u16,
    pub rows: u16,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl Layout {
    /// Canvas size in logical pixels
    pub fn surface_size(&self) -> (u32, u32) {
        (
            (self.columns as u32).saturating_mul(self.cell_width),
            (self.rows as u32).saturating_mul(self.cell_height),
        )
    }

    /// Whether the cell at `(column, row)` belongs to the debug badge
    pub fn hits_badge(&self, column: u16, row: u16) -> bool {
        let width = BADGE.len() as u16;
        row + 1 == self.rows && column + width >= self.columns && self.columns >= width
    }

    /// First cell of a text run, or `None` when it starts below the grid
    fn text_origin(&self, run: &TextRun) -> Option<(i64, u16)> {
        let [x, y] = run.at;
        if !(x.is_finite() && y.is_finite()) || y < 1.0 {
            return None;
        }
        let row = ((y - 1.0) / self.cell_height as f64).floor() as i64;
        if row >= self.rows as i64 {
            return None;
        }
        let width = run.text.chars().count() as f64 * self.cell_width as f64;
        let left = match run.align {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        };
        let column = (left / self.cell_width as f64).round() as i64;
        Some((column, row as u16))
    }
}

/// One terminal cell ready to print
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    glyph: char,
    foreground: Color,
    background: Color,
}

/// Writes canvas frames to the terminal as half-block cells
pub struct Presenter {
    layout: Layout,
    page: Color,
    cells: Vec<Cell>,
}

impl Presenter {
    pub fn new(layout: Layout, page: Color) -> Self {
        Presenter {
            layout,
            page,
            cells: Vec::new(),
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    /// Reduces a block of canvas pixels to one opaque color over the page.
    /// Any visible pixel keeps its color at full strength so one-pixel
    /// lines survive the downsampling.
    fn sample(&self, canvas: &Canvas, left: u32, top: u32, width: u32, height: u32) -> Color {
        let (mut r, mut g, mut b, mut weight, mut coverage) = (0u32, 0u32, 0u32, 0u32, 0u8);
        for y in top..(top + height).min(canvas.height()) {
            for x in left..(left + width).min(canvas.width()) {
                let pixel = canvas.pixel(x, y);
                if pixel.a == 0 {
                    continue;
                }
                let a = pixel.a as u32;
                r += pixel.r as u32 * a;
                g += pixel.g as u32 * a;
                b += pixel.b as u32 * a;
                weight += a;
                coverage = coverage.max(pixel.a);
            }
        }
        if weight == 0 {
            return self.page;
        }
        let alpha = coverage as u32;
        let mix = |channel: u32, page: u8| {
            ((channel / weight * alpha + page as u32 * (255 - alpha)) / 255) as u8
        };
        Color::rgb8(mix(r, self.page.r), mix(g, self.page.g), mix(b, self.page.b))
    }

    /// Builds the cell grid for one frame
    fn compose(&mut self, canvas: &Canvas) {
        let Layout {
            columns,
            rows,
            cell_width,
            cell_height,
        } = self.layout;
        let upper = cell_height / 2;
        let lower = cell_height - upper;

        self.cells.clear();
        for row in 0..rows as u32 {
            for column in 0..columns as u32 {
                let left = column * cell_width;
                let top = row * cell_height;
                self.cells.push(Cell {
                    glyph: '▀',
                    foreground: self.sample(canvas, left, top, cell_width, upper.max(1)),
                    background: self.sample(canvas, left, top + upper, cell_width, lower.max(1)),
                });
            }
        }

        for run in canvas.texts() {
            self.place_text(run);
        }
        self.place_badge();
    }

    fn place_text(&mut self, run: &TextRun) {
        let Some((column, row)) = self.layout.text_origin(run) else {
            return;
        };
        let columns = self.layout.columns as i64;
        for (i, glyph) in run.text.chars().enumerate() {
            let column = column + i as i64;
            if column < 0 || column >= columns {
                continue;
            }
            let index = row as usize * columns as usize + column as usize;
            let cell = &mut self.cells[index];
            if run.behind && !(cell.foreground == self.page && cell.background == self.page) {
                continue;
            }
            cell.glyph = glyph;
            cell.foreground = run.color;
        }
    }

    fn place_badge(&mut self) {
        let Layout { columns, rows, .. } = self.layout;
        let width = BADGE.len() as u16;
        if rows == 0 || columns < width {
            return;
        }
        let start = (rows as usize - 1) * columns as usize + (columns - width) as usize;
        for (i, glyph) in BADGE.chars().enumerate() {
            self.cells[start + i] = Cell {
                glyph,
                foreground: Color::WHITE,
                background: self.page,
            };
        }
    }

    /// Draws `canvas` to `out`, one queued command batch per frame
    pub fn present<W: Write>(&mut self, canvas: &Canvas, out: &mut W) -> io::Result<()> {
        self.compose(canvas);
        let columns = self.layout.columns as usize;
        let mut current: Option<(Color, Color)> = None;

        for (row, line) in self.cells.chunks(columns.max(1)).enumerate() {
            queue!(out, cursor::MoveTo(0, row as u16))?;
            for cell in line {
                if current != Some((cell.foreground, cell.background)) {
                    queue!(
                        out,
                        SetForegroundColor(to_term(cell.foreground)),
                        SetBackgroundColor(to_term(cell.background))
                    )?;
                    current = Some((cell.foreground, cell.background));
                }
                queue!(out, Print(cell.glyph))?;
            }
        }
        out.flush()
    }
}

fn to_term(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}
