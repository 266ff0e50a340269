//! Local persistence: one integer, the jump game's high score.
//!
//! The file holds the number and nothing else; no schema, no versioning.
//! Writes are monotone: a lower score never replaces a higher one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const HIGH_SCORE_FILE: &str = "highscore.dat";
const LOG_FILE: &str = "kiosk.log";

/// Data directory: `$XDG_DATA_HOME/kiosk`, else `~/.local/share/kiosk`,
/// else the current directory.
pub fn data_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg).join("kiosk");
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return PathBuf::from(home).join(".local/share/kiosk");
        }
    }
    PathBuf::from(".")
}

pub fn log_file_path() -> PathBuf {
    data_dir().join(LOG_FILE)
}

/// Missing or unparseable file reads as 0.
pub fn load_high_score_from(dir: &Path) -> u32 {
    std::fs::read_to_string(dir.join(HIGH_SCORE_FILE))
        .ok()
        .and_then(|content| content.trim().parse().ok())
        .unwrap_or(0)
}

/// Persist `score` if it beats the stored value.
pub fn store_high_score_in(dir: &Path, score: u32) -> Result<()> {
    if score <= load_high_score_from(dir) {
        return Ok(());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create data dir {}", dir.display()))?;
    let path = dir.join(HIGH_SCORE_FILE);
    std::fs::write(&path, format!("{score}\n"))
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn load_high_score() -> u32 {
    load_high_score_from(&data_dir())
}

pub fn store_high_score(score: u32) -> Result<()> {
    store_high_score_in(&data_dir(), score)
}

#[cfg(test)]
mod tests {
    use super::{load_high_score_from, store_high_score_in, HIGH_SCORE_FILE};
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_zero() {
        let dir = tempdir().expect("tempdir should create");
        assert_eq!(load_high_score_from(dir.path()), 0);
    }

    #[test]
    fn round_trip() {
        let dir = tempdir().expect("tempdir should create");
        store_high_score_in(dir.path(), 120).expect("store should succeed");
        assert_eq!(load_high_score_from(dir.path()), 120);
    }

    #[test]
    fn lower_score_never_overwrites() {
        let dir = tempdir().expect("tempdir should create");
        store_high_score_in(dir.path(), 200).expect("store should succeed");
        store_high_score_in(dir.path(), 50).expect("store should succeed");
        assert_eq!(load_high_score_from(dir.path()), 200);
    }

    #[test]
    fn corrupt_file_reads_as_zero() {
        let dir = tempdir().expect("tempdir should create");
        std::fs::write(dir.path().join(HIGH_SCORE_FILE), "not a number").unwrap();
        assert_eq!(load_high_score_from(dir.path()), 0);
        // And a corrupt file loses to any real score.
        store_high_score_in(dir.path(), 10).expect("store should succeed");
        assert_eq!(load_high_score_from(dir.path()), 10);
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempdir().expect("tempdir should create");
        let nested = dir.path().join("deep/nested");
        store_high_score_in(&nested, 5).expect("store should succeed");
        assert_eq!(load_high_score_from(&nested), 5);
    }
}
