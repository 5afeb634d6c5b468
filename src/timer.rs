//! Scheduled callbacks for the single-threaded event loop.
//!
//! Nothing here spawns a thread. Owners poll their timers on every tick with
//! the current clock reading; dropping a timer cancels it, so a panel that
//! goes away takes its pending callbacks with it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source
pub trait Clock: Send + Sync {
    /// Time elapsed since a fixed, clock-specific origin
    fn now(&self) -> Duration;

    fn now_ms(&self) -> u64 {
        self.now().as_millis() as u64
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for tests and headless runs. Clones share one reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, at: Duration) {
        self.nanos.store(at.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Fixed-rate repeating schedule.
///
/// Deadlines are computed from the creation time, not from when the last
/// poll happened, so late polls never accumulate drift.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next_due: Duration,
    fired: u64,
}

impl Interval {
    pub fn new(period: Duration, now: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        Self {
            period,
            next_due: now + period,
            fired: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of periods that elapsed since the previous poll
    pub fn poll(&mut self, now: Duration) -> u32 {
        if now < self.next_due {
            return 0;
        }
        let late = (now - self.next_due).as_nanos();
        let n = (late / self.period.as_nanos()) as u32 + 1;
        self.next_due += self.period * n;
        self.fired += u64::from(n);
        n
    }

    /// Deadline of the most recent firing
    pub fn last_fired_at(&self) -> Option<Duration> {
        (self.fired > 0).then(|| self.next_due - self.period)
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }
}

/// One-shot deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    due: Duration,
}

impl Timeout {
    pub fn new(delay: Duration, now: Duration) -> Self {
        Self { due: now + delay }
    }

    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.due
    }

    pub fn remaining(&self, now: Duration) -> Duration {
        self.due.saturating_sub(now)
    }
}

/// Take a timeout out of its slot once it has expired.
///
/// Returns true exactly once per armed timeout.
pub fn fire_if_due(slot: &mut Option<Timeout>, now: Duration) -> bool {
    match slot {
        Some(t) if t.is_due(now) => {
            *slot = None;
            true
        }
        _ => false,
    }
}
