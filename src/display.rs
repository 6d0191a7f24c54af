use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

use crate::pixels::{HEIGHT, WIDTH};

/// Display is what the host loop presents the machine's lit cells on. It
/// abstracts the implementation details, so a variety of kinds of screen
/// would work; the interpreter itself never touches it.
pub trait Display {
    /// redraw from the current lit-cell snapshot
    fn draw(&mut self, cells: &[(u8, u8)]) -> Result<(), io::Error>;

    /// wipe all presentation state; called when the machine requests a clear
    fn clear(&mut self) -> Result<(), io::Error>;
}

// store useful metadata about the grid being rendered
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// lit cells as float coords suitable for a TUI canvas; the y axis is
    /// negated because the canvas grows upward and the grid grows downward
    fn points_from_cells(&self, cells: &[(u8, u8)]) -> Vec<(f64, f64)> {
        cells
            .iter()
            .map(|&(x, y)| (x as f64, -1.0 * (y as f64)))
            .collect()
    }
}

/// monochrome display in a terminal, rendered using TUI over crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(WIDTH, HEIGHT),
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, cells: &[(u8, u8)]) -> Result<(), io::Error> {
        // 1:1 ratio between the grid and the internal TUI canvas, plus a
        // one-cell border on each side
        let coords = self.resolution.points_from_cells(cells);
        let size = Rect::new(
            0,
            0,
            2 + self.resolution.0 as u16,
            2 + self.resolution.1 as u16,
        );
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();
        self.terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &coords,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), io::Error> {
        self.terminal.clear()
    }
}

/// useful for testing non-display routines
pub struct DummyDisplay {
    pub draws: usize,
    pub clears: usize,
}

impl DummyDisplay {
    #[allow(dead_code)]
    pub fn new() -> Result<DummyDisplay, io::Error> {
        Ok(DummyDisplay {
            draws: 0,
            clears: 0,
        })
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _cells: &[(u8, u8)]) -> Result<(), io::Error> {
        self.draws += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), io::Error> {
        self.clears += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Resolution tests
    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_cells_map_to_negated_y() {
        let r = Resolution(64, 32);
        let coords = r.points_from_cells(&[(0, 0), (63, 31), (5, 7)]);
        assert_eq!(coords, vec![(0.0, 0.0), (63.0, -31.0), (5.0, -7.0)]);
    }

    // DummyDisplay tests
    #[test]
    fn test_dummy_counts_calls() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new()?;
        d.draw(&[(1, 1)])?;
        d.draw(&[])?;
        d.clear()?;
        assert_eq!(d.draws, 2);
        assert_eq!(d.clears, 1);
        Ok(())
    }
}
