use std::fs::File;

use anyhow::Result;
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

mod app;
mod food;
mod game;
mod grid;
mod hiscore;
mod snake;
mod term;

/// A single square of the playing field, in grid coordinates.
/// Signed because the head transiently sits at -1 or cell_count
/// when it runs off the edge.
pub type Cell = (i16, i16);

// The terminal is taken over by the game, so logs go to a file
const LOG_FILE: &str = "retro-snake.log";

fn main() -> Result<()> {
    WriteLogger::init(LevelFilter::Info, Config::default(), File::create(LOG_FILE)?)?;
    info!("starting retro snake");

    let mut app = app::App::new()?;
    app.run()
}
