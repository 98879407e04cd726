//! Random student picker.
//!
//! Per class section, draw a name that has not been picked yet. A draw
//! comes with a run of flicker frames for the spinning display. Picked
//! names persist as JSON so a restart does not repeat anyone until the
//! section is reset.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Flicker frames shown before the winner.
pub const SPIN_FRAMES: usize = 25;

#[derive(Debug, Error)]
pub enum PickerError {
    #[error("unknown section {0:?}")]
    UnknownSection(String),
    #[error("all students in section {0:?} have been picked")]
    SectionExhausted(String),
    #[error("picker history I/O: {0}")]
    Io(#[from] io::Error),
    #[error("picker history is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Names already drawn, per section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct PickHistory {
    picked: BTreeMap<String, Vec<String>>,
}

/// Outcome of one draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spin {
    pub frames: Vec<String>,
    pub winner: String,
    pub picked: usize,
    pub total: usize,
}

#[derive(Debug)]
pub struct Picker {
    roster: BTreeMap<String, Vec<String>>,
    history: PickHistory,
    path: PathBuf,
}

impl Picker {
    /// Load history from `path` if it exists.
    pub fn open(path: &Path, roster: BTreeMap<String, Vec<String>>) -> Result<Self, PickerError> {
        let history = if path.exists() {
            serde_json::from_str(&fs::read_to_string(path)?)?
        } else {
            PickHistory::default()
        };
        Ok(Self {
            roster,
            history,
            path: path.to_path_buf(),
        })
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.roster.keys().map(String::as_str)
    }

    fn names(&self, section: &str) -> Result<&[String], PickerError> {
        self.roster
            .get(section)
            .map(Vec::as_slice)
            .ok_or_else(|| PickerError::UnknownSection(section.to_string()))
    }

    fn picked(&self, section: &str) -> &[String] {
        self.history
            .picked
            .get(section)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `(picked, total)` for a section.
    pub fn status(&self, section: &str) -> Result<(usize, usize), PickerError> {
        let total = self.names(section)?.len();
        Ok((self.picked(section).len(), total))
    }

    /// Names still in the draw.
    pub fn available(&self, section: &str) -> Result<Vec<&str>, PickerError> {
        let picked = self.picked(section);
        Ok(self
            .names(section)?
            .iter()
            .filter(|n| !picked.contains(*n))
            .map(String::as_str)
            .collect())
    }

    /// Draw one name and record it.
    pub fn spin<R: Rng + ?Sized>(&mut self, section: &str, rng: &mut R) -> Result<Spin, PickerError> {
        let available = self.available(section)?;
        let winner = match available.choose(rng) {
            Some(name) => name.to_string(),
            None => return Err(PickerError::SectionExhausted(section.to_string())),
        };
        let frames: Vec<String> = (0..SPIN_FRAMES)
            .filter_map(|_| available.choose(rng).map(|n| n.to_string()))
            .collect();

        let mut history = self.history.clone();
        history
            .picked
            .entry(section.to_string())
            .or_default()
            .push(winner.clone());
        self.save(&history)?;
        self.history = history;

        let (picked, total) = self.status(section)?;
        info!(section, winner = %winner, picked, total, "student picked");
        Ok(Spin {
            frames,
            winner,
            picked,
            total,
        })
    }

    /// Forget every pick in a section.
    pub fn reset_section(&mut self, section: &str) -> Result<(), PickerError> {
        self.names(section)?;
        let mut history = self.history.clone();
        history.picked.remove(section);
        self.save(&history)?;
        self.history = history;
        info!(section, "picker section reset");
        Ok(())
    }

    /// Write `history` to disk; the caller commits it in memory on success.
    fn save(&self, history: &PickHistory) -> Result<(), PickerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(history)?)?;
        Ok(())
    }
}
