//! Persist the high score to disk (XDG config or ~/.config/tui-match3).
//!
//! The file holds a single decimal integer. A missing or unreadable file
//! counts as a high score of 0.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const FILE_NAME: &str = "highscore.shs";
const APP_DIR: &str = "tui-match3";

/// Resolve the config directory from `XDG_CONFIG_HOME` / `HOME` values.
fn config_base(xdg: Option<String>, home: Option<String>) -> PathBuf {
    match xdg.filter(|x| !x.is_empty()) {
        Some(xdg) => PathBuf::from(xdg),
        None => home
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

/// Default location of the high-score file.
pub fn default_path() -> PathBuf {
    config_base(
        std::env::var("XDG_CONFIG_HOME").ok(),
        std::env::var("HOME").ok(),
    )
    .join(APP_DIR)
    .join(FILE_NAME)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScoreStore {
    path: PathBuf,
    /// Score last read from or written to `path`.
    stored: u32,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stored: 0,
        }
    }

    pub fn at_default() -> Self {
        Self::new(default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stored(&self) -> u32 {
        self.stored
    }

    pub fn load(&mut self) -> u32 {
        self.stored = self.read();
        self.stored
    }

    fn read(&self) -> u32 {
        match fs::read_to_string(&self.path) {
            Ok(text) => text.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(path = %self.path.display(), "ignoring malformed high score file");
                0
            }),
            Err(err) => {
                tracing::debug!(path = %self.path.display(), %err, "no high score yet");
                0
            }
        }
    }

    /// Write `score`, creating the parent directory if needed.
    pub fn save(&mut self, score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&self.path, format!("{score}\n"))
            .with_context(|| format!("write high score to {}", self.path.display()))?;
        tracing::info!(score, path = %self.path.display(), "high score saved");
        self.stored = score;
        Ok(())
    }

    /// Write `high_score` only if it beats the stored one. Returns whether it wrote.
    pub fn save_if_higher(&mut self, high_score: u32) -> Result<bool> {
        if high_score <= self.stored {
            return Ok(false);
        }
        self.save(high_score)?;
        Ok(true)
    }
}
