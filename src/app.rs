use std::cmp::max;
use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::info;

use crate::game::{Game, GameOverCause, GameState, TickEvent};
use crate::grid::GridConfig;
use crate::hiscore::HighScoreStore;
use crate::snake::Direction::{self, *};
use crate::term::TermManager;
use crate::Cell;

const FRAME_INTERVAL: Duration = Duration::from_millis(5);
// Wide enough for the widest overlay ("Press an arrow key to play
// again" plus padding) and a four-digit score line
const MIN_TERM_WIDTH: u16 = 36;
const HIGH_SCORE_FILE: &str = ".retro_snake_high_score.txt";

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const TITLE: &str = "Retro Snake";

/// Ties the pieces together: owns the terminal and the game, maps key
/// presses to game inputs and fires a game tick whenever the current
/// move interval has elapsed.
pub struct App {
    term: TermManager,
    game: Game,
    last_update: Instant,
}

impl App {
    pub fn new() -> Result<App> {
        let grid = GridConfig::standard();
        let term = TermManager::new()?;

        let min_width = max(grid.offset.0 + grid.cell_count as u16 + 2, MIN_TERM_WIDTH);
        let min_height = grid.offset.1 + grid.cell_count as u16 + 2;
        let (width, height) = term.size();
        if width < min_width || height < min_height {
            bail!(
                "terminal too small: {}x{} available, at least {}x{} needed",
                width, height, min_width, min_height
            );
        }

        let game = Game::new(grid, HighScoreStore::new(HIGH_SCORE_FILE));
        Ok(App { term, game, last_update: Instant::now() })
    }

    pub fn run(&mut self) -> Result<()> {
        self.term.setup()?;
        let result = self.main_loop();

        // leave the terminal usable even when the loop errors out
        let restored = self.term.restore();
        result?;
        restored?;
        Ok(())
    }

    fn main_loop(&mut self) -> Result<()> {
        if !self.show_intro()? {
            return Ok(());
        }

        self.draw_board()?;
        self.show_start_prompt(None)?;

        loop {
            sleep(FRAME_INTERVAL);

            for key in self.term.read_key_events()? {
                if is_ctrl_c(&key) {
                    info!("exiting on ctrl+c");
                    return Ok(());
                }
                self.handle_key(&key)?;
            }

            // The interval timer keeps running while paused, it is
            // only the update below that gets gated
            if self.game.state() == GameState::Running
                && self.last_update.elapsed() >= self.game.interval()
            {
                self.last_update = Instant::now();
                self.step()?;
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    /// Returns false when the player quits from the intro screen.
    fn show_intro(&mut self) -> Result<bool> {
        self.term.show_message(&[
            "Arrow keys or WASD to move",
            "Esc to pause",
            "CTRL+C to quit",
            "",
            "Press any key to begin",
        ])?;

        let key = self.term.read_key_blocking()?;
        Ok(!is_ctrl_c(&key))
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('w') | KeyCode::Up => self.handle_direction(Up)?,
            KeyCode::Char('a') | KeyCode::Left => self.handle_direction(Left)?,
            KeyCode::Char('s') | KeyCode::Down => self.handle_direction(Down)?,
            KeyCode::Char('d') | KeyCode::Right => self.handle_direction(Right)?,
            KeyCode::Esc => self.handle_pause()?,
            _ => {}
        }
        Ok(())
    }

    fn handle_direction(&mut self, dir: Direction) -> Result<()> {
        let was_started = self.game.state() != GameState::NotStarted;
        let accepted = self.game.handle_direction(dir);

        if accepted && !was_started {
            // a fresh round just started
            self.last_update = Instant::now();
            self.draw_board()?;
        }
        Ok(())
    }

    fn handle_pause(&mut self) -> Result<()> {
        if !self.game.toggle_pause() {
            return Ok(());
        }

        if self.game.state() == GameState::Paused {
            self.term.show_message(&["Paused", "Press Esc to resume", "or CTRL+C to quit"])?;
        } else {
            self.term.hide_message()?;
        }
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        match self.game.tick() {
            TickEvent::Idle => {}
            TickEvent::Advanced { old_head, vacated, ate } => {
                if let Some(cell) = vacated {
                    self.print_cell(cell, ' ')?;
                }
                self.print_cell(old_head, SNAKE_BODY_CHAR)?;
                self.print_cell(self.game.snake().head(), self.game.snake().head_char())?;

                if ate {
                    self.term.beep()?;
                    self.print_cell(self.game.food_position(), FOOD_CHAR)?;
                    self.draw_score_line()?;
                }
                self.term.flush()?;
            }
            TickEvent::GameOver { cause, score, high_score } => {
                self.term.beep()?;
                self.draw_board()?;
                self.show_start_prompt(Some((cause, score, high_score)))?;
            }
        }
        Ok(())
    }

    fn draw_board(&mut self) -> Result<()> {
        let grid = self.game.grid();
        self.term.clear()?;
        self.term.print_text((grid.offset.0 - 1, 0), TITLE)?;
        self.term.draw_border(
            (grid.offset.0 - 1, grid.offset.1 - 1),
            (grid.cell_count as u16 + 2, grid.cell_count as u16 + 2),
        )?;
        self.draw_score_line()?;
        self.print_cell(self.game.food_position(), FOOD_CHAR)?;

        let head_char = self.game.snake().head_char();
        let body: Vec<Cell> = self.game.snake().body().iter().copied().collect();
        for (i, cell) in body.into_iter().enumerate() {
            let ch = if i == 0 { head_char } else { SNAKE_BODY_CHAR };
            self.print_cell(cell, ch)?;
        }

        self.term.flush()?;
        Ok(())
    }

    fn draw_score_line(&mut self) -> Result<()> {
        let grid = self.game.grid();
        let y = grid.offset.1 + grid.cell_count as u16 + 1;
        let line = format!(
            "Score: {:<6} High score: {}",
            self.game.score(),
            self.game.high_score()
        );
        self.term.print_text((grid.offset.0 - 1, y), &line)?;
        Ok(())
    }

    fn print_cell(&mut self, cell: Cell, ch: char) -> Result<()> {
        let pos = self.game.grid().to_screen(cell);
        self.term.print_at(pos, ch)?;
        Ok(())
    }

    fn show_start_prompt(
        &mut self,
        outcome: Option<(GameOverCause, u32, u32)>,
    ) -> Result<()> {
        match outcome {
            None => self.term.show_message(&["Press an arrow key to start"])?,
            Some((cause, score, high_score)) => {
                let score_line = format!("Score: {}   Best: {}", score, high_score);
                self.term.show_message(&[
                    cause.message(),
                    score_line.as_str(),
                    "",
                    "Press an arrow key to play again",
                ])?;
            }
        }
        Ok(())
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
