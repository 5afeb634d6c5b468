use serde::{Deserialize, Serialize};

use crate::store::{keys, Persistence};

pub const MAX_FEEDBACK: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackPanel {
    Aim,
    Strategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub timestamp: i64,
    pub panel: FeedbackPanel,
    #[serde(rename = "type")]
    pub vote: Vote,
}

/// Append one vote to the stored history, keeping the newest entries
pub fn record(store: &Persistence, panel: FeedbackPanel, vote: Vote, now_ms: i64) {
    let mut history: Vec<FeedbackEntry> = store.get_json(keys::FEEDBACK_HISTORY).unwrap_or_default();
    history.push(FeedbackEntry {
        timestamp: now_ms,
        panel,
        vote,
    });
    if history.len() > MAX_FEEDBACK {
        let excess = history.len() - MAX_FEEDBACK;
        history.drain(..excess);
    }
    store.set_json(keys::FEEDBACK_HISTORY, &history);
}

pub fn history(store: &Persistence) -> Vec<FeedbackEntry> {
    store.get_json(keys::FEEDBACK_HISTORY).unwrap_or_default()
}

/// Per-result vote. Repeating the same vote is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteSlot {
    current: Option<Vote>,
}

impl VoteSlot {
    pub fn current(&self) -> Option<Vote> {
        self.current
    }

    /// Returns true when the vote changed and should be recorded
    pub fn cast(&mut self, vote: Vote) -> bool {
        if self.current == Some(vote) {
            return false;
        }
        self.current = Some(vote);
        true
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
