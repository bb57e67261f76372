//! Session summary output
//!
//! One plain-text file per completed run, one field per line:
//! 1. participant identifier
//! 2. sub-trial durations in ms, one decimal, comma-separated
//! 3. correct-dot counts per sub-trial, comma-separated

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sim::TrialRunState;

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub participant: String,
    /// Response-window duration per sub-trial, in protocol order
    pub durations_ms: Vec<f64>,
    /// Correct picks per sub-trial, in protocol order
    pub correct_counts: Vec<usize>,
}

impl SessionSummary {
    pub fn from_run(run: &TrialRunState) -> Self {
        Self {
            participant: run.participant.clone().unwrap_or_default(),
            durations_ms: run.sub_trial_durations_ms.clone(),
            correct_counts: run.correct_counts.clone(),
        }
    }

    /// File contents
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let durations: Vec<String> = self
            .durations_ms
            .iter()
            .map(|d| format!("{:.1}", d))
            .collect();
        let counts: Vec<String> = self.correct_counts.iter().map(|c| c.to_string()).collect();

        writeln!(f, "{}", self.participant)?;
        writeln!(f, "{}", durations.join(","))?;
        writeln!(f, "{}", counts.join(","))
    }
}

/// Output file for a participant inside `dir`.
///
/// Characters outside `[A-Za-z0-9_-]` are replaced so the id is always a
/// single safe file name.
pub fn summary_path(dir: impl AsRef<Path>, participant: &str) -> PathBuf {
    let stem: String = participant
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    dir.as_ref().join(format!("{}.txt", stem))
}

/// Write the summary into `dir`, creating it if needed.
///
/// The text goes to a temporary file first and is renamed into place, so a
/// failed write never leaves a truncated summary behind.
pub fn write_summary(dir: impl AsRef<Path>, summary: &SessionSummary) -> io::Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = summary_path(dir, &summary.participant);
    let tmp = path.with_extension("txt.tmp");
    fs::write(&tmp, summary.to_text())?;
    fs::rename(&tmp, &path)?;

    log::info!("Session summary written to {}", path.display());
    Ok(path)
}
