// src/display/canvas.rs
//! Character-cell rasterizer for sky plot draw commands

use crate::skyplot::{DrawCommand, Point, SkyColor};

/// Pixels covered by one terminal cell; cells are about twice as tall as wide
pub const CELL_WIDTH: f32 = 8.0;
pub const CELL_HEIGHT: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Option<SkyColor>,
}

impl Default for Cell {
    fn default() -> Self {
        Self { ch: ' ', color: None }
    }
}

pub struct TextCanvas {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl TextCanvas {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::default(); cols * rows],
        }
    }

    /// Pixel size of the canvas, for building a viewport
    pub fn pixel_size(&self) -> (f32, f32) {
        (self.cols as f32 * CELL_WIDTH, self.rows as f32 * CELL_HEIGHT)
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols.max(1))
    }

    fn put(&mut self, point: Point, ch: char, color: SkyColor) {
        if point.x < 0.0 || point.y < 0.0 {
            return;
        }
        let col = (point.x / CELL_WIDTH) as usize;
        let row = (point.y / CELL_HEIGHT) as usize;
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = Cell { ch, color: Some(color) };
        }
    }

    pub fn draw(&mut self, commands: &[DrawCommand]) {
        for command in commands {
            match command {
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                    stroke_width: Some(_),
                } => self.ring(*center, *radius, *color),
                DrawCommand::Circle { center, color, stroke_width: None, .. } => {
                    self.put(*center, 'o', *color)
                }
                DrawCommand::Line { from, to, color, .. } => self.line(*from, *to, *color),
                DrawCommand::Text { position, text, color, .. } => {
                    // only the satellite id fits next to the marker
                    let id = text.split(' ').next().unwrap_or_default();
                    let start = Point::new(position.x, position.y - CELL_HEIGHT);
                    for (i, ch) in id.chars().enumerate() {
                        self.put(Point::new(start.x + i as f32 * CELL_WIDTH, start.y), ch, *color);
                    }
                }
            }
        }
    }

    fn ring(&mut self, center: Point, radius: f32, color: SkyColor) {
        let steps = ((radius / CELL_WIDTH) * 8.0).max(32.0) as usize;
        for step in 0..steps {
            let angle = step as f32 / steps as f32 * std::f32::consts::TAU;
            let point = Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            );
            self.put(point, '.', color);
        }
    }

    fn line(&mut self, from: Point, to: Point, color: SkyColor) {
        let ch = if (from.x - to.x).abs() < f32::EPSILON {
            '|'
        } else if (from.y - to.y).abs() < f32::EPSILON {
            '-'
        } else {
            '.'
        };
        let steps = (from.distance(to) / (CELL_WIDTH / 2.0)).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let point = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
            self.put(point, ch, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        filter::VisibilityFilter,
        gnss::{Constellation, SatelliteObservation},
        skyplot::{SkyPlotRenderer, ViewportGeometry},
    };

    #[test]
    fn test_zenith_marker_lands_in_center_cell() {
        let mut canvas = TextCanvas::new(41, 21);
        let (width, height) = canvas.pixel_size();
        let viewport = ViewportGeometry::new(width, height).unwrap();
        let sats = [SatelliteObservation::new(12, Constellation::Galileo, 0.0, 90.0)];

        let commands =
            SkyPlotRenderer::new().render(Some(&sats), &VisibilityFilter::default(), &viewport);
        canvas.draw(&commands);

        let center = canvas.cell(20, 10).unwrap();
        assert_eq!(center.ch, 'o');
        assert_eq!(center.color, Some(SkyColor::Green));
        // label starts one cell to the right, on the same row
        assert_eq!(canvas.cell(21, 10).unwrap().ch, '1');
        assert_eq!(canvas.cell(22, 10).unwrap().ch, '2');
    }

    #[test]
    fn test_background_only_draws_axes() {
        let mut canvas = TextCanvas::new(41, 21);
        let (width, height) = canvas.pixel_size();
        let viewport = ViewportGeometry::new(width, height).unwrap();
        canvas.draw(&SkyPlotRenderer::new().render(None, &VisibilityFilter::default(), &viewport));

        assert_eq!(canvas.cell(20, 3).unwrap().ch, '|');
        assert!(canvas.rows().flatten().all(|cell| cell.ch != 'o'));
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut canvas = TextCanvas::new(4, 4);
        canvas.draw(&[DrawCommand::Circle {
            center: Point::new(-50.0, 500.0),
            radius: 10.0,
            color: SkyColor::Red,
            stroke_width: None,
        }]);
        assert!(canvas.rows().flatten().all(|cell| cell.color.is_none()));
        assert!(canvas.cell(4, 0).is_none());
    }
}
