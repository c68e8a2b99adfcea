//! The one persisted value: the best score so far.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::HighScoreError;

const FILE_NAME: &str = ".lone_spire_score";

pub trait HighScoreStore {
    /// Stored score; a store with nothing saved yet reports `0`.
    fn load(&self) -> Result<u32, HighScoreError>;
    fn save(&mut self, score: u32) -> Result<(), HighScoreError>;
}

/// A decimal integer in a plain text file.
#[derive(Clone, Debug)]
pub struct FileHighScore {
    path: PathBuf,
}

impl FileHighScore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.lone_spire_score`, or the working directory when `HOME` is unset.
    pub fn in_home() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self::new(PathBuf::from(home).join(FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileHighScore {
    fn load(&self) -> Result<u32, HighScoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let value = text.trim();
        value.parse().map_err(|_| HighScoreError::Corrupt {
            value: value.to_string(),
        })
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        std::fs::write(&self.path, score.to_string())?;
        debug!(score, path = %self.path.display(), "high score saved");
        Ok(())
    }
}

/// Keeps the score in memory only.
#[derive(Clone, Debug, Default)]
pub struct MemoryHighScore {
    pub score: u32,
    /// Number of successful saves.
    pub saves: usize,
}

impl HighScoreStore for MemoryHighScore {
    fn load(&self) -> Result<u32, HighScoreError> {
        Ok(self.score)
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        self.score = score;
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHighScore::new(dir.path().join("nothing"));
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileHighScore::new(dir.path().join("score"));
        store.save(412).unwrap();
        assert_eq!(store.load().unwrap(), 412);
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("score");
        std::fs::write(&path, "lots\n").unwrap();
        let err = FileHighScore::new(path).load().unwrap_err();
        assert!(matches!(err, HighScoreError::Corrupt { ref value } if value == "lots"));
    }
}
