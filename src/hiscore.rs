use std::fs;
use std::path::PathBuf;

use log::{error, info};

/// Flat-file persistence for the single best score. A missing or
/// unreadable file, and a file with unparseable content, all count
/// as "no high score yet".
pub struct HighScoreStore {
    path: Option<PathBuf>,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HighScoreStore { path: Some(path.into()) }
    }

    /// A store that never touches the filesystem.
    #[cfg(test)]
    pub fn disabled() -> Self {
        HighScoreStore { path: None }
    }

    pub fn load(&self) -> u32 {
        let path = match &self.path {
            Some(p) => p,
            None => return 0,
        };

        match fs::read_to_string(path) {
            Ok(contents) => contents.trim().parse().unwrap_or(0),
            Err(_) => 0,
        }
    }

    pub fn save(&self, score: u32) {
        let path = match &self.path {
            Some(p) => p,
            None => return,
        };

        if let Err(e) = fs::write(path, score.to_string()) {
            error!("could not save high score to {}: {}", path.display(), e);
        } else {
            info!("saved new high score: {}", score);
        }
    }
}
