// File: crates/chart-core/src/legend.rs
// Summary: Column-aligned text table used for chart legends.

use crate::canvas::{Canvas, Color, TextStyle};

/// Horizontal alignment inside a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Side length of a color swatch cell.
pub const SWATCH_SIZE: f32 = 11.0;
const COLUMN_GAP: f32 = 8.0;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Cell {
    pub text: String,
    pub align: Align,
    /// Overrides the table font size.
    pub size: Option<f32>,
    pub margin_right: f32,
    /// Draw a color square instead of text.
    pub swatch: Option<Color>,
    /// Overrides the table text color.
    pub color: Option<Color>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }

    pub fn swatch(color: Color) -> Self {
        Self { swatch: Some(color), margin_right: 5.0, ..Self::default() }
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Rows of cells laid out in columns as wide as their widest cell.
#[derive(Clone, Debug)]
pub struct TextTable {
    pub x: f32,
    pub y: f32,
    pub row_height: f32,
    pub font_size: f32,
    pub color: Color,
    rows: Vec<Vec<Cell>>,
}

impl TextTable {
    pub fn new(x: f32, y: f32, color: Color) -> Self {
        Self { x, y, row_height: 14.0, font_size: 9.0, color, rows: Vec::new() }
    }

    pub fn add_row(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn cell_width(&self, canvas: &dyn Canvas, cell: &Cell) -> f32 {
        match cell.swatch {
            Some(_) => SWATCH_SIZE,
            None => canvas.measure_text(&cell.text, cell.size.unwrap_or(self.font_size), 0.0).width,
        }
    }

    /// Width of each column including cell margins.
    pub fn column_widths(&self, canvas: &dyn Canvas) -> Vec<f32> {
        let mut widths: Vec<f32> = Vec::new();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let w = self.cell_width(canvas, cell) + cell.margin_right;
                match widths.get_mut(i) {
                    Some(slot) => *slot = slot.max(w),
                    None => widths.push(w),
                }
            }
        }
        widths
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let widths = self.column_widths(canvas);
        for (r, row) in self.rows.iter().enumerate() {
            let top = self.y + r as f32 * self.row_height;
            let baseline = top + self.row_height - 3.0;
            let mut x = self.x;
            for (c, cell) in row.iter().enumerate() {
                let col = widths.get(c).copied().unwrap_or(0.0);
                let inner = col - cell.margin_right;
                if let Some(color) = cell.swatch {
                    let (l, t) = (x.round(), (top + 1.0).round());
                    let s = SWATCH_SIZE - 1.0;
                    let square = [(l, t), (l + s, t), (l + s, t + s), (l, t + s)];
                    canvas.fill_polygon(&square, color);
                    canvas.polygon(&square, Color::BLACK);
                } else if !cell.text.is_empty() {
                    let size = cell.size.unwrap_or(self.font_size);
                    let w = canvas.measure_text(&cell.text, size, 0.0).width;
                    let tx = match cell.align {
                        Align::Left => x,
                        Align::Center => x + (inner - w) / 2.0,
                        Align::Right => x + inner - w,
                    };
                    canvas.text(&cell.text, (tx, baseline), TextStyle::new(size, cell.color.unwrap_or(self.color)));
                }
                x += col + COLUMN_GAP;
            }
        }
    }
}

/// Small filled triangle marking a percentile legend row.
pub fn draw_percentile_marker(canvas: &mut dyn Canvas, x: f32, y: f32, color: Color) {
    let pts = [(x + 5.0, y), (x - 5.0, y), (x, y - 10.0)];
    canvas.fill_polygon(&pts, color);
    canvas.polygon(&pts, Color::BLACK);
}

/// Filled circle marking a trigger legend row.
pub fn draw_trigger_marker(canvas: &mut dyn Canvas, x: f32, y: f32, color: Color) {
    canvas.fill_ellipse((x, y), (10.0, 10.0), color);
    canvas.arc((x, y), (10.0, 10.0), 0.0, 360.0, Color::BLACK, false);
}
