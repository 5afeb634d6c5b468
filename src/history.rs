use chrono::Local;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::trainer::TrainerSummary;

#[derive(Debug, Serialize)]
struct TrainerLogRow {
    date: String,
    duration_secs: u32,
    score: u32,
    total_taps: u32,
    accuracy: u32,
    average_reaction_ms: u64,
    #[serde(serialize_with = "two_decimals")]
    reaction_std_dev_ms: f64,
}

fn two_decimals<S: serde::Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{:.2}", v))
}

/// Append-only CSV log of finished trainer runs
#[derive(Debug, Clone)]
pub struct TrainerLog {
    path: PathBuf,
}

impl TrainerLog {
    pub fn new() -> Option<Self> {
        AppDirs::trainer_log_path().map(|path| Self { path })
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, summary: &TrainerSummary) -> Result<(), csv::Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // A fresh file gets a header row
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        wtr.serialize(TrainerLogRow {
            date: Local::now().format("%c").to_string(),
            duration_secs: summary.duration_secs,
            score: summary.score,
            total_taps: summary.total_taps,
            accuracy: summary.accuracy,
            average_reaction_ms: summary.average_reaction_ms,
            reaction_std_dev_ms: summary.reaction_std_dev_ms,
        })?;
        wtr.flush()?;
        Ok(())
    }

    /// Best effort: failures are logged, never surfaced
    pub fn record(&self, summary: &TrainerSummary) {
        if let Err(e) = self.append(summary) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to append trainer log");
        }
    }
}
