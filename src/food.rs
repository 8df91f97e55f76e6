use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::grid::GridConfig;
use crate::Cell;

// Random placement gives up after this many samples and falls back to
// scanning for the remaining free cells, so a nearly full board cannot
// stall the game.
const MAX_RANDOM_SAMPLES: u32 = 128;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no free cell left on the board")]
pub struct NoFreeCell;

/// The single piece of food currently on the board.
pub struct Food {
    position: Cell,
}

impl Food {
    pub fn new() -> Self {
        Food { position: (0, 0) }
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    #[cfg(test)]
    pub fn place_at(&mut self, cell: Cell) {
        self.position = cell;
    }

    /// Moves the food to a uniformly random cell for which `is_occupied`
    /// is false. Fails only when every cell of the grid is occupied.
    pub fn relocate(
        &mut self,
        grid: &GridConfig,
        rng: &mut impl Rng,
        is_occupied: impl Fn(Cell) -> bool,
    ) -> Result<(), NoFreeCell> {
        for _ in 0..MAX_RANDOM_SAMPLES {
            let cell = grid.random_cell(rng);
            if !is_occupied(cell) {
                self.position = cell;
                return Ok(());
            }
        }

        let free: Vec<Cell> = grid.cells().filter(|c| !is_occupied(*c)).collect();
        match free.choose(rng) {
            Some(cell) => {
                self.position = *cell;
                Ok(())
            }
            None => Err(NoFreeCell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn relocation_avoids_occupied_cells() {
        let grid = GridConfig::standard();
        let mut rng = StdRng::seed_from_u64(7);
        let mut food = Food::new();

        // everything occupied except a single row
        let occupied = |c: Cell| c.1 != 12;
        for _ in 0..200 {
            food.relocate(&grid, &mut rng, occupied).unwrap();
            assert_eq!(food.position().1, 12);
        }
    }

    #[test]
    fn relocation_finds_the_last_free_cell() {
        let grid = GridConfig::standard();
        let mut rng = StdRng::seed_from_u64(7);
        let mut food = Food::new();

        food.relocate(&grid, &mut rng, |c| c != (24, 24)).unwrap();
        assert_eq!(food.position(), (24, 24));
    }

    #[test]
    fn relocation_reports_a_full_board() {
        let grid = GridConfig::standard();
        let mut rng = StdRng::seed_from_u64(7);
        let mut food = Food::new();

        assert_eq!(food.relocate(&grid, &mut rng, |_| true), Err(NoFreeCell));
    }
}
