/// Width of the CHIP-8 display in cells.
pub const WIDTH: usize = 64;
/// Height of the CHIP-8 display in cells.
pub const HEIGHT: usize = 32;

/// Tracks which cells of the fixed 64x32 grid are lit, keeping a dense list
/// of their coordinates so a renderer can redraw only the lit cells instead
/// of scanning a full framebuffer every frame.
///
/// Invariant: `grid[y][x] == Some(k)` exactly when `active[k] == (x, y)`, and
/// `active` never has gaps. Removal uses swap-to-end, so the order of the
/// list is unspecified and changes across calls; callers must not rely on it.
///
/// Coordinates are a precondition: anything outside the grid panics. The draw
/// instruction clips before calling, so the grid itself never wraps.
pub struct PixelSet {
    grid: [[Option<usize>; WIDTH]; HEIGHT],
    active: Vec<(u8, u8)>,
}

impl PixelSet {
    pub fn new() -> Self {
        PixelSet {
            grid: [[None; WIDTH]; HEIGHT],
            active: Vec::new(),
        }
    }

    fn cell(&mut self, x: u8, y: u8) -> &mut Option<usize> {
        assert!(
            (x as usize) < WIDTH && (y as usize) < HEIGHT,
            "pixel ({}, {}) out of bounds",
            x,
            y
        );
        &mut self.grid[y as usize][x as usize]
    }

    pub fn is_active(&self, x: u8, y: u8) -> bool {
        assert!(
            (x as usize) < WIDTH && (y as usize) < HEIGHT,
            "pixel ({}, {}) out of bounds",
            x,
            y
        );
        self.grid[y as usize][x as usize].is_some()
    }

    /// Lights a cell. Lighting an already-lit cell is a no-op.
    pub fn activate(&mut self, x: u8, y: u8) {
        let loc = self.active.len();
        let cell = self.cell(x, y);
        if cell.is_some() {
            return;
        }
        *cell = Some(loc);
        self.active.push((x, y));
    }

    /// Unlights a cell in O(1). Unlighting an already-dark cell is a no-op.
    pub fn deactivate(&mut self, x: u8, y: u8) {
        let loc = match self.cell(x, y).take() {
            Some(loc) => loc,
            None => return,
        };
        // swap-to-end removal: the vacated slot inherits the last entry, and
        // the moved coordinate's cell is repointed to keep the lists mirrored
        self.active.swap_remove(loc);
        if let Some(&(mx, my)) = self.active.get(loc) {
            self.grid[my as usize][mx as usize] = Some(loc);
        }
    }

    /// Unlights everything. Pops the list rather than rescanning the grid,
    /// so cost is proportional to the number of lit cells.
    pub fn clear(&mut self) {
        while let Some((x, y)) = self.active.pop() {
            self.grid[y as usize][x as usize] = None;
        }
    }

    /// The current lit cells, in no particular order.
    pub fn snapshot(&self) -> &[(u8, u8)] {
        &self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let p = PixelSet::new();
        assert!(p.snapshot().is_empty());
        assert!(!p.is_active(0, 0));
    }

    #[test]
    fn test_activate_is_idempotent() {
        let mut p = PixelSet::new();
        p.activate(3, 7);
        p.activate(3, 7);
        assert_eq!(p.snapshot(), &[(3, 7)]);
        assert!(p.is_active(3, 7));
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let mut p = PixelSet::new();
        p.activate(3, 7);
        p.deactivate(3, 7);
        p.deactivate(3, 7);
        assert!(p.snapshot().is_empty());
        assert!(!p.is_active(3, 7));
    }

    #[test]
    fn test_deactivate_middle_repoints_moved_entry() {
        let mut p = PixelSet::new();
        p.activate(1, 1);
        p.activate(2, 2);
        p.activate(3, 3);

        // (1, 1) sits in slot 0; (3, 3) should be moved into its place
        p.deactivate(1, 1);
        assert_eq!(p.snapshot().len(), 2);
        assert!(!p.is_active(1, 1));
        assert!(p.is_active(2, 2));
        assert!(p.is_active(3, 3));

        // the repointed entry must still be removable
        p.deactivate(3, 3);
        assert_eq!(p.snapshot(), &[(2, 2)]);
    }

    #[test]
    fn test_deactivate_last_entry() {
        let mut p = PixelSet::new();
        p.activate(1, 1);
        p.activate(2, 2);
        p.deactivate(2, 2);
        assert_eq!(p.snapshot(), &[(1, 1)]);
    }

    #[test]
    fn test_grid_and_list_mirror_after_churn() {
        let mut p = PixelSet::new();
        for i in 0..16u8 {
            p.activate(i, i % 8);
        }
        for i in (0..16u8).step_by(3) {
            p.deactivate(i, i % 8);
        }
        p.activate(63, 31);

        // round-trip: every snapshot coordinate is marked active in the grid
        for &(x, y) in p.snapshot() {
            assert!(p.is_active(x, y));
        }
        // and vice versa
        let mut lit = 0;
        for y in 0..HEIGHT as u8 {
            for x in 0..WIDTH as u8 {
                if p.is_active(x, y) {
                    lit += 1;
                    assert!(p.snapshot().contains(&(x, y)));
                }
            }
        }
        assert_eq!(lit, p.snapshot().len());
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut p = PixelSet::new();
        for x in 0..8 {
            p.activate(x, 4);
        }
        p.clear();
        assert!(p.snapshot().is_empty());
        for x in 0..8 {
            assert!(!p.is_active(x, 4));
        }
        // a cleared set must accept fresh activations from index zero
        p.activate(5, 5);
        assert_eq!(p.snapshot(), &[(5, 5)]);
    }

    #[test]
    #[should_panic]
    fn test_is_active_rejects_out_of_bounds_x() {
        let p = PixelSet::new();
        p.is_active(64, 0);
    }

    #[test]
    #[should_panic]
    fn test_activate_rejects_out_of_bounds_y() {
        let mut p = PixelSet::new();
        p.activate(0, 32);
    }
}
