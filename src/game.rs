use std::cmp::max;
use std::time::Duration;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::food::Food;
use crate::grid::GridConfig;
use crate::hiscore::HighScoreStore;
use crate::snake::{Direction, Snake};
use crate::Cell;

const START_INTERVAL: Duration = Duration::from_millis(200);
const MIN_INTERVAL: Duration = Duration::from_millis(80);
const INTERVAL_STEP: Duration = Duration::from_millis(15);
const SPEEDUP_EVERY: u32 = 5;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GameState {
    NotStarted,
    Running,
    Paused,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GameOverCause {
    Wall,
    SelfCollision,
    BoardFull,
}

impl GameOverCause {
    pub fn message(self) -> &'static str {
        match self {
            GameOverCause::Wall => "You hit the wall!",
            GameOverCause::SelfCollision => "You ran into yourself!",
            GameOverCause::BoardFull => "You filled the whole board!",
        }
    }
}

/// What a single timer tick did, for the caller to render and to
/// play sound cues on.
pub enum TickEvent {
    /// No round in progress, nothing happened.
    Idle,
    Advanced {
        old_head: Cell,
        vacated: Option<Cell>,
        ate: bool,
    },
    /// The round just ended; the game has already folded back into
    /// its starting state, so the final numbers travel in the event.
    GameOver {
        cause: GameOverCause,
        score: u32,
        high_score: u32,
    },
}

/// The whole game: snake, food, score and the round state machine.
/// Rendering and timing live with the caller; this struct is driven
/// purely through key handlers and `tick`.
pub struct Game {
    grid: GridConfig,
    snake: Snake,
    food: Food,
    state: GameState,
    first_move_made: bool,
    score: u32,
    high_score: u32,
    interval: Duration,
    game_over_cause: Option<GameOverCause>,
    store: HighScoreStore,
    rng: StdRng,
}

impl Game {
    pub fn new(grid: GridConfig, store: HighScoreStore) -> Self {
        let mut rng = StdRng::from_entropy();
        let snake = Snake::new();
        let mut food = Food::new();
        // a freshly reset snake can never cover the board
        let _ = food.relocate(&grid, &mut rng, |c| snake.contains(c));

        let high_score = store.load();
        Game {
            grid,
            snake,
            food,
            state: GameState::NotStarted,
            first_move_made: false,
            score: 0,
            high_score,
            interval: START_INTERVAL,
            game_over_cause: None,
            store,
            rng,
        }
    }

    pub fn grid(&self) -> GridConfig {
        self.grid
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food_position(&self) -> Cell {
        self.food.position()
    }

    pub fn game_over_cause(&self) -> Option<GameOverCause> {
        self.game_over_cause
    }

    #[cfg(test)]
    pub fn place_food(&mut self, cell: Cell) {
        self.food.place_at(cell);
    }

    /// Feeds a directional key press into the game, starting a new
    /// round if none is in progress. Returns whether the input was
    /// accepted; a press that would reverse the snake is dropped and
    /// does not start a round either.
    pub fn handle_direction(&mut self, dir: Direction) -> bool {
        if !self.snake.set_pending_direction(dir) {
            return false;
        }

        if self.state == GameState::NotStarted {
            self.state = GameState::Running;
            self.first_move_made = true;
            self.game_over_cause = None;
        }
        true
    }

    /// Toggles pause. Only meaningful while a round is in progress;
    /// returns whether anything changed.
    pub fn toggle_pause(&mut self) -> bool {
        match self.state {
            GameState::Running => {
                self.state = GameState::Paused;
                true
            }
            GameState::Paused => {
                self.state = GameState::Running;
                true
            }
            GameState::NotStarted => false,
        }
    }

    /// Advances the game by one step. Call whenever the move interval
    /// has elapsed; does nothing unless a round is running.
    ///
    /// Collision checks run in a fixed order: food, then edges, then
    /// tail. The order decides which cause gets reported if the rules
    /// ever change to let several coincide.
    pub fn tick(&mut self) -> TickEvent {
        if self.state != GameState::Running {
            return TickEvent::Idle;
        }

        let old_head = self.snake.head();
        let vacated = self.snake.advance();

        if !self.first_move_made {
            // no collision rules until the player has actually steered
            return TickEvent::Advanced { old_head, vacated, ate: false };
        }

        let mut ate = false;
        if self.snake.head() == self.food.position() {
            self.score += 1;
            self.interval = shortened_interval(self.interval, self.score);
            self.snake.schedule_growth();
            ate = true;

            let snake = &self.snake;
            let relocated = self.food.relocate(&self.grid, &mut self.rng, |c| snake.contains(c));
            if relocated.is_err() {
                return self.game_over(GameOverCause::BoardFull);
            }
        }

        if !self.grid.contains(self.snake.head()) {
            return self.game_over(GameOverCause::Wall);
        }

        if self.snake.hit_own_tail() {
            return self.game_over(GameOverCause::SelfCollision);
        }

        TickEvent::Advanced { old_head, vacated, ate }
    }

    fn game_over(&mut self, cause: GameOverCause) -> TickEvent {
        let score = self.score;
        info!("game over ({:?}) with score {}", cause, score);

        if score > self.high_score {
            self.high_score = score;
            self.store.save(score);
        }

        self.score = 0;
        self.interval = START_INTERVAL;
        self.snake.reset();
        let snake = &self.snake;
        let _ = self.food.relocate(&self.grid, &mut self.rng, |c| snake.contains(c));
        self.first_move_made = false;
        self.game_over_cause = Some(cause);
        self.state = GameState::NotStarted;

        TickEvent::GameOver { cause, score, high_score: self.high_score }
    }
}

/// The game speeds up every few points by shaving a fixed amount off
/// the move interval, down to a hard floor.
fn shortened_interval(interval: Duration, score: u32) -> Duration {
    if score % SPEEDUP_EVERY == 0 && interval > MIN_INTERVAL {
        max(interval - INTERVAL_STEP, MIN_INTERVAL)
    } else {
        interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction::*;

    fn test_game() -> Game {
        let mut game = Game::new(GridConfig::standard(), HighScoreStore::disabled());
        // out of the way of the starting snake
        game.place_food((0, 0));
        game
    }

    /// Puts food on the given cell and expects the next tick to eat it.
    fn feed_at(game: &mut Game, cell: Cell) {
        game.place_food(cell);
        match game.tick() {
            TickEvent::Advanced { ate, .. } => assert!(ate),
            _ => panic!("expected the snake to eat at {:?}", cell),
        }
    }

    #[test]
    fn directional_input_starts_the_game() {
        let mut game = test_game();
        assert_eq!(game.state(), GameState::NotStarted);
        assert!(matches!(game.tick(), TickEvent::Idle));

        assert!(game.handle_direction(Right));
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn rejected_reversal_does_not_start_the_game() {
        let mut game = test_game();
        // reverse of the starting direction
        assert!(!game.handle_direction(Left));
        assert_eq!(game.state(), GameState::NotStarted);
    }

    #[test]
    fn snake_moves_one_cell_per_tick() {
        let mut game = test_game();
        game.handle_direction(Right);

        for step in 1..=3 {
            match game.tick() {
                TickEvent::Advanced { ate, .. } => assert!(!ate),
                _ => panic!("expected a plain move"),
            }
            assert_eq!(game.snake().head(), (6 + step, 9));
            assert_eq!(game.snake().body().len(), 3);
        }
    }

    #[test]
    fn eating_scores_and_grows_on_the_next_tick() {
        let mut game = test_game();
        game.handle_direction(Right);

        feed_at(&mut game, (7, 9));
        assert_eq!(game.score(), 1);
        // growth is deferred, the tail was already dropped this tick
        assert_eq!(game.snake().body().len(), 3);
        assert!(!game.snake().contains(game.food_position()));

        game.place_food((0, 0));
        game.tick();
        assert_eq!(game.snake().body().len(), 4);
    }

    #[test]
    fn speed_increases_every_fifth_point() {
        let mut game = test_game();
        game.handle_direction(Right);
        let start = game.interval();

        for x in 7..=10 {
            feed_at(&mut game, (x, 9));
        }
        assert_eq!(game.interval(), start);

        feed_at(&mut game, (11, 9));
        assert_eq!(game.score(), 5);
        assert_eq!(game.interval(), start - INTERVAL_STEP);
    }

    #[test]
    fn interval_only_shrinks_at_multiples_and_clamps_at_the_floor() {
        assert_eq!(shortened_interval(START_INTERVAL, 3), START_INTERVAL);
        assert_eq!(shortened_interval(START_INTERVAL, 5), START_INTERVAL - INTERVAL_STEP);

        let mut interval = START_INTERVAL;
        for score in 1..=100 {
            interval = shortened_interval(interval, score);
            assert!(interval >= MIN_INTERVAL);
        }
        assert_eq!(interval, MIN_INTERVAL);
        assert_eq!(shortened_interval(MIN_INTERVAL, 105), MIN_INTERVAL);
    }

    #[test]
    fn running_off_the_left_edge_ends_the_round() {
        let mut game = test_game();
        game.handle_direction(Up);
        game.tick(); // head at (6, 8)
        game.handle_direction(Left);

        let mut last = TickEvent::Idle;
        for _ in 0..7 {
            last = game.tick();
        }
        match last {
            TickEvent::GameOver { cause, score, .. } => {
                assert_eq!(cause, GameOverCause::Wall);
                assert_eq!(score, 0);
            }
            _ => panic!("expected a wall collision"),
        }

        assert_eq!(game.state(), GameState::NotStarted);
        assert_eq!(game.score(), 0);
        assert_eq!(game.interval(), START_INTERVAL);
        assert_eq!(game.snake().head(), (6, 9));
        assert_eq!(game.snake().body().len(), 3);
        assert_eq!(game.game_over_cause(), Some(GameOverCause::Wall));
    }

    #[test]
    fn curling_into_the_tail_ends_the_round() {
        let mut game = test_game();
        game.handle_direction(Right);
        feed_at(&mut game, (7, 9));
        feed_at(&mut game, (8, 9));
        game.place_food((0, 0));
        game.tick();
        assert_eq!(game.snake().body().len(), 5);

        game.handle_direction(Up);
        game.tick();
        game.handle_direction(Left);
        game.tick();
        game.handle_direction(Down);
        match game.tick() {
            TickEvent::GameOver { cause, score, .. } => {
                assert_eq!(cause, GameOverCause::SelfCollision);
                assert_eq!(score, 2);
            }
            _ => panic!("expected a tail collision"),
        }
    }

    #[test]
    fn filling_the_board_ends_the_round() {
        let grid = GridConfig { cell_count: 3, offset: (2, 3) };
        let mut game = Game::new(grid, HighScoreStore::disabled());

        // every cell except (2, 2), head one step away from it, with a
        // growth already due so the tail stays put on the next advance
        game.snake.set_body(&[
            (2, 1), (2, 0), (1, 0), (0, 0), (0, 1), (0, 2), (1, 2), (1, 1),
        ]);
        game.snake.schedule_growth();
        game.food.place_at((2, 2));

        assert!(game.handle_direction(Down));
        match game.tick() {
            TickEvent::GameOver { cause, score, .. } => {
                assert_eq!(cause, GameOverCause::BoardFull);
                assert_eq!(score, 1);
            }
            _ => panic!("expected the board to fill up"),
        }
        assert_eq!(game.state(), GameState::NotStarted);
        assert_eq!(game.game_over_cause(), Some(GameOverCause::BoardFull));
    }

    #[test]
    fn pause_gates_updates() {
        let mut game = test_game();
        game.handle_direction(Right);

        assert!(game.toggle_pause());
        assert_eq!(game.state(), GameState::Paused);
        assert!(matches!(game.tick(), TickEvent::Idle));
        assert_eq!(game.snake().head(), (6, 9));

        assert!(game.toggle_pause());
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn pause_has_no_effect_before_the_first_move() {
        let mut game = test_game();
        assert!(!game.toggle_pause());
        assert_eq!(game.state(), GameState::NotStarted);
    }

    #[test]
    fn new_round_clears_the_game_over_cause() {
        let mut game = test_game();
        game.handle_direction(Up);
        for _ in 0..10 {
            game.tick();
        }
        assert_eq!(game.game_over_cause(), Some(GameOverCause::Wall));

        assert!(game.handle_direction(Up));
        assert_eq!(game.game_over_cause(), None);
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn high_score_is_persisted_and_monotone() {
        let path = std::env::temp_dir()
            .join(format!("retro_snake_game_test_{}", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut game = Game::new(GridConfig::standard(), HighScoreStore::new(&path));
        game.place_food((0, 0));
        game.handle_direction(Right);
        feed_at(&mut game, (7, 9));
        feed_at(&mut game, (8, 9));
        feed_at(&mut game, (9, 9));
        game.place_food((0, 0));
        game.handle_direction(Up);
        for _ in 0..10 {
            game.tick();
        }
        assert_eq!(game.high_score(), 3);
        assert_eq!(HighScoreStore::new(&path).load(), 3);

        // a worse round leaves the stored score alone
        game.handle_direction(Right);
        feed_at(&mut game, (7, 9));
        game.place_food((0, 0));
        game.handle_direction(Up);
        for _ in 0..10 {
            game.tick();
        }
        assert_eq!(game.high_score(), 3);
        assert_eq!(HighScoreStore::new(&path).load(), 3);

        let _ = std::fs::remove_file(&path);
    }
}
