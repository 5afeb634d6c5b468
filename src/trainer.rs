//! Reaction trainer: a fixed-length session of tapping targets that respawn
//! at random spots in the play area.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::timer::{Clock, Interval};
use crate::util::{mean, percent, std_dev};

pub const DEFAULT_DURATION_SECS: u32 = 30;

/// Spawn band, in percent of the play area. Keeps targets off the edges
/// where swipe gestures and the header live.
pub const TARGET_X_RANGE: (f64, f64) = (15.0, 85.0);
pub const TARGET_Y_RANGE: (f64, f64) = (20.0, 80.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainerState {
    Idle,
    Playing,
    Finished,
}

/// Target centre as a percentage of the play area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPosition {
    pub x_pct: f64,
    pub y_pct: f64,
}

impl Default for TargetPosition {
    fn default() -> Self {
        Self {
            x_pct: 50.0,
            y_pct: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Hit { reaction_ms: u64 },
    Miss,
}

/// Results of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainerSummary {
    pub duration_secs: u32,
    pub score: u32,
    pub total_taps: u32,
    pub accuracy: u32,
    pub average_reaction_ms: u64,
    pub reaction_std_dev_ms: f64,
}

pub struct ReactionTrainer {
    clock: Arc<dyn Clock>,
    rng: StdRng,
    duration_secs: u32,
    state: TrainerState,
    score: u32,
    total_taps: u32,
    time_left: u32,
    target: TargetPosition,
    reaction_times: Vec<u64>,
    last_spawn: Duration,
    countdown: Option<Interval>,
}

impl std::fmt::Debug for ReactionTrainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionTrainer")
            .field("state", &self.state)
            .field("score", &self.score)
            .field("total_taps", &self.total_taps)
            .field("time_left", &self.time_left)
            .finish_non_exhaustive()
    }
}

impl ReactionTrainer {
    pub fn new(clock: Arc<dyn Clock>, duration_secs: u32) -> Self {
        Self::with_rng(clock, duration_secs, StdRng::from_entropy())
    }

    pub fn with_rng(clock: Arc<dyn Clock>, duration_secs: u32, rng: StdRng) -> Self {
        Self {
            clock,
            rng,
            duration_secs: duration_secs.max(1),
            state: TrainerState::Idle,
            score: 0,
            total_taps: 0,
            time_left: duration_secs.max(1),
            target: TargetPosition::default(),
            reaction_times: Vec::new(),
            last_spawn: Duration::ZERO,
            countdown: None,
        }
    }

    /// Begin a fresh run. Also serves as restart from `Finished`.
    pub fn start(&mut self) {
        self.state = TrainerState::Playing;
        self.score = 0;
        self.total_taps = 0;
        self.time_left = self.duration_secs;
        self.reaction_times.clear();
        self.countdown = Some(Interval::new(Duration::from_secs(1), self.clock.now()));
        self.spawn_target();
        tracing::debug!(duration = self.duration_secs, "trainer started");
    }

    /// Back to idle, dropping any pending countdown
    pub fn reset(&mut self) {
        self.state = TrainerState::Idle;
        self.countdown = None;
        self.time_left = self.duration_secs;
    }

    fn spawn_target(&mut self) {
        self.target = TargetPosition {
            x_pct: self.rng.gen_range(TARGET_X_RANGE.0..=TARGET_X_RANGE.1),
            y_pct: self.rng.gen_range(TARGET_Y_RANGE.0..=TARGET_Y_RANGE.1),
        };
        self.last_spawn = self.clock.now();
    }

    /// Poll the countdown. Returns true when this call finished the run.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        let elapsed = match self.countdown.as_mut() {
            Some(iv) => iv.poll(now),
            None => return false,
        };
        for _ in 0..elapsed {
            if self.on_second() {
                return true;
            }
        }
        false
    }

    /// One countdown step. Returns true when it ended the run.
    pub fn on_second(&mut self) -> bool {
        if self.state != TrainerState::Playing || self.time_left == 0 {
            return false;
        }
        self.time_left -= 1;
        if self.time_left == 0 {
            self.state = TrainerState::Finished;
            self.countdown = None;
            tracing::info!(
                score = self.score,
                taps = self.total_taps,
                accuracy = self.accuracy(),
                "trainer finished"
            );
            return true;
        }
        false
    }

    /// Register a tap. Ignored unless a run is in progress.
    pub fn tap(&mut self, hit: bool) -> Option<TapOutcome> {
        if self.state != TrainerState::Playing {
            return None;
        }
        self.total_taps += 1;
        if !hit {
            return Some(TapOutcome::Miss);
        }
        let reaction_ms = self.clock.now().saturating_sub(self.last_spawn).as_millis() as u64;
        self.reaction_times.push(reaction_ms);
        self.score += 1;
        self.spawn_target();
        Some(TapOutcome::Hit { reaction_ms })
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_taps(&self) -> u32 {
        self.total_taps
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn target(&self) -> TargetPosition {
        self.target
    }

    pub fn reaction_times(&self) -> &[u64] {
        &self.reaction_times
    }

    pub fn has_countdown(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn accuracy(&self) -> u32 {
        percent(self.score, self.total_taps)
    }

    pub fn average_reaction(&self) -> u64 {
        mean(&self.reaction_samples()).map_or(0, |m| m.round() as u64)
    }

    fn reaction_samples(&self) -> Vec<f64> {
        self.reaction_times.iter().map(|&ms| ms as f64).collect()
    }

    pub fn summary(&self) -> TrainerSummary {
        TrainerSummary {
            duration_secs: self.duration_secs,
            score: self.score,
            total_taps: self.total_taps,
            accuracy: self.accuracy(),
            average_reaction_ms: self.average_reaction(),
            reaction_std_dev_ms: std_dev(&self.reaction_samples()).unwrap_or(0.0),
        }
    }
}
