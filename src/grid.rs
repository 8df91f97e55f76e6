use rand::Rng;

use crate::Cell;

/// Geometry of the playing field plus where it sits on the screen.
/// Built once at startup and passed around; nothing about the grid
/// is global state.
#[derive(Clone, Copy)]
pub struct GridConfig {
    /// Cells per side, the board is always square.
    pub cell_count: i16,
    /// Terminal position of the top-left grid cell.
    pub offset: (u16, u16),
}

impl GridConfig {
    pub fn standard() -> Self {
        GridConfig { cell_count: 25, offset: (2, 3) }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.cell_count).contains(&cell.0) && (0..self.cell_count).contains(&cell.1)
    }

    pub fn random_cell(&self, rng: &mut impl Rng) -> Cell {
        (rng.gen_range(0..self.cell_count), rng.gen_range(0..self.cell_count))
    }

    /// Every cell of the board, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let n = self.cell_count;
        (0..n).flat_map(move |y| (0..n).map(move |x| (x, y)))
    }

    /// Terminal position of a grid cell.
    pub fn to_screen(&self, cell: Cell) -> (u16, u16) {
        debug_assert!(self.contains(cell));
        (self.offset.0 + cell.0 as u16, self.offset.1 + cell.1 as u16)
    }
}
