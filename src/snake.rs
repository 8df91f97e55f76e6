use std::collections::VecDeque;

use crate::Cell;
use Direction::*;

/// Cardinal movement direction, as a unit step on the grid.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i16, i16) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

const START_HEAD: Cell = (6, 9);
const START_LENGTH: i16 = 3;
const START_DIRECTION: Direction = Right;

/// The player's snake: an ordered run of cells with the head at the
/// front, plus the direction applied on the last step and the buffered
/// direction that will be committed on the next one.
pub struct Snake {
    body: VecDeque<Cell>,
    applied: Direction,
    pending: Direction,
    grow_next_step: bool,
}

impl Snake {
    pub fn new() -> Self {
        let mut snake = Snake {
            body: VecDeque::new(),
            applied: START_DIRECTION,
            pending: START_DIRECTION,
            grow_next_step: false,
        };
        snake.reset();
        snake
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    pub fn hit_own_tail(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|c| *c == head)
    }

    /// Buffers a direction change for the next step. Returns false and
    /// leaves the buffer untouched when the change would make the snake
    /// reverse straight into itself.
    pub fn set_pending_direction(&mut self, dir: Direction) -> bool {
        if dir == self.pending.opposite() {
            return false;
        }
        self.pending = dir;
        true
    }

    /// Commits the buffered direction and moves one cell: a new head is
    /// pushed and, unless a growth is due, the tail is dropped. Returns
    /// the vacated tail cell, if any.
    pub fn advance(&mut self) -> Option<Cell> {
        self.applied = self.pending;
        let (dx, dy) = self.applied.delta();
        let head = self.head();
        self.body.push_front((head.0 + dx, head.1 + dy));

        if self.grow_next_step {
            self.grow_next_step = false;
            None
        } else {
            self.body.pop_back()
        }
    }

    /// Marks the snake to keep its tail on the next advance.
    pub fn schedule_growth(&mut self) {
        self.grow_next_step = true;
    }

    #[cfg(test)]
    pub fn set_body(&mut self, cells: &[Cell]) {
        self.body = cells.iter().copied().collect();
    }

    /// Back to the canonical 3-cell starting run, heading right.
    pub fn reset(&mut self) {
        let (dx, dy) = START_DIRECTION.delta();
        self.body = (0..START_LENGTH)
            .map(|i| (START_HEAD.0 - dx * i, START_HEAD.1 - dy * i))
            .collect();
        self.applied = START_DIRECTION;
        self.pending = START_DIRECTION;
        self.grow_next_step = false;
    }

    pub fn head_char(&self) -> char {
        match self.applied {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}
