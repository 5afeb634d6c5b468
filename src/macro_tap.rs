//! Cosmetic auto-tap pulse.
//!
//! While active, the target flashes once per period of `1000 / cps` ms and
//! stays lit for the first half of each period.

use std::time::Duration;

use crate::timer::Interval;

pub const MIN_CPS: u8 = 1;
pub const MAX_CPS: u8 = 50;
pub const DEFAULT_CPS: u8 = 20;

#[derive(Debug, Clone)]
pub struct MacroTapSimulator {
    cps: u8,
    interval: Option<Interval>,
    tapping_until: Option<Duration>,
}

impl Default for MacroTapSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_CPS)
    }
}

impl MacroTapSimulator {
    pub fn new(cps: u8) -> Self {
        Self {
            cps: cps.clamp(MIN_CPS, MAX_CPS),
            interval: None,
            tapping_until: None,
        }
    }

    pub fn cps(&self) -> u8 {
        self.cps
    }

    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(1) / u32::from(self.cps)
    }

    /// How long each flash stays lit
    pub fn pulse_duration(&self) -> Duration {
        self.period() / 2
    }

    pub fn pulse_ratio(&self) -> f64 {
        self.pulse_duration().as_secs_f64() / self.period().as_secs_f64()
    }

    /// No-op when already running
    pub fn start(&mut self, now: Duration) {
        if self.interval.is_none() {
            self.interval = Some(Interval::new(self.period(), now));
        }
    }

    /// No-op when already stopped
    pub fn stop(&mut self) {
        self.interval = None;
        self.tapping_until = None;
    }

    /// Flip between running and stopped. Returns the new active state.
    pub fn toggle(&mut self, now: Duration) -> bool {
        if self.is_active() {
            self.stop();
        } else {
            self.start(now);
        }
        self.is_active()
    }

    /// Change the rate. A running interval is torn down and rebuilt at the
    /// new period so the old phase does not leak into the new one.
    pub fn set_cps(&mut self, cps: u8, now: Duration) {
        let cps = cps.clamp(MIN_CPS, MAX_CPS);
        if cps == self.cps {
            return;
        }
        self.cps = cps;
        if self.is_active() {
            self.stop();
            self.start(now);
        }
    }

    /// Advance to `now`. Returns the tapping flag.
    pub fn tick(&mut self, now: Duration) -> bool {
        let half = self.pulse_duration();
        if let Some(iv) = self.interval.as_mut() {
            if iv.poll(now) > 0 {
                if let Some(fired_at) = iv.last_fired_at() {
                    self.tapping_until = Some(fired_at + half);
                }
            }
        }
        self.is_tapping(now)
    }

    pub fn is_tapping(&self, now: Duration) -> bool {
        self.is_active() && self.tapping_until.map_or(false, |until| now < until)
    }

    pub fn pulses(&self) -> u64 {
        self.interval.as_ref().map_or(0, Interval::fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn cps_is_clamped() {
        assert_eq!(MacroTapSimulator::new(0).cps(), 1);
        assert_eq!(MacroTapSimulator::new(200).cps(), 50);
    }

    #[test]
    fn flashes_for_half_the_period() {
        let mut m = MacroTapSimulator::new(10); // 100ms period
        m.start(ms(0));
        assert!(!m.tick(ms(50)));
        assert!(m.tick(ms(100)));
        assert!(m.tick(ms(149)));
        assert!(!m.tick(ms(150)));
        assert!(m.tick(ms(200)));
        assert_eq!(m.pulses(), 2);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut m = MacroTapSimulator::new(10);
        m.start(ms(0));
        m.start(ms(70));
        // Second start did not reset the phase
        assert!(m.tick(ms(100)));
        m.stop();
        m.stop();
        assert!(!m.is_active());
        assert!(!m.is_tapping(ms(110)));
    }

    #[test]
    fn rate_change_rebuilds_interval() {
        let mut m = MacroTapSimulator::new(10);
        m.start(ms(0));
        m.tick(ms(100));
        m.set_cps(20, ms(120)); // 50ms period from 120
        assert_eq!(m.pulses(), 0);
        assert!(!m.tick(ms(169)));
        assert!(m.tick(ms(170)));
        assert!(!m.tick(ms(195)));
    }

    #[test]
    fn pulse_ratio_is_half_for_any_rate() {
        for cps in MIN_CPS..=MAX_CPS {
            let mut m = MacroTapSimulator::new(cps);
            m.toggle(ms(0));
            m.toggle(ms(10));
            m.toggle(ms(20));
            assert!(m.is_active());
            assert!((m.pulse_ratio() - 0.5).abs() < 1e-6, "cps {}", cps);
        }
    }
}
