//! Best-effort vibration and notification bridge.
//!
//! Every call is fire-and-forget: a missing or refusing capability is logged
//! at debug and otherwise ignored.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::error::CapabilityError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum HapticPattern {
    Light,
    Medium,
    Heavy,
    Success,
    Error,
    ToggleOn,
    ToggleOff,
    Hit,
    Miss,
}

impl HapticPattern {
    /// Alternating on/off durations in milliseconds
    pub fn pulses(&self) -> &'static [u64] {
        match self {
            HapticPattern::Light => &[10],
            HapticPattern::Medium => &[20],
            HapticPattern::Heavy => &[75],
            HapticPattern::Success => &[10, 50, 10],
            HapticPattern::Error => &[50],
            HapticPattern::ToggleOn => &[15, 30, 15],
            HapticPattern::ToggleOff => &[30],
            HapticPattern::Hit => &[15],
            HapticPattern::Miss => &[40],
        }
    }
}

pub trait HapticDevice: Send {
    fn vibrate(&mut self, pattern: HapticPattern) -> Result<(), CapabilityError>;
}

pub trait Notifier: Send {
    fn notify(&mut self, title: &str, body: &str) -> Result<(), CapabilityError>;
}

pub const ASSIST_NOTIFICATION_TITLE: &str = "AimHQ Active";
pub const ASSIST_NOTIFICATION_BODY: &str = "Game Assist is running. Tap to return to HQ.";

/// Rings the terminal bell in place of a vibration motor
pub struct TerminalBell<W: Write + Send> {
    out: W,
    enabled: bool,
}

impl TerminalBell<std::io::Stdout> {
    pub fn stdout(enabled: bool) -> Self {
        Self::new(std::io::stdout(), enabled)
    }
}

impl<W: Write + Send> TerminalBell<W> {
    pub fn new(out: W, enabled: bool) -> Self {
        Self { out, enabled }
    }
}

impl<W: Write + Send> HapticDevice for TerminalBell<W> {
    fn vibrate(&mut self, _pattern: HapticPattern) -> Result<(), CapabilityError> {
        if !self.enabled {
            return Err(CapabilityError::Unavailable("vibration"));
        }
        self.out
            .write_all(b"\x07")
            .and_then(|_| self.out.flush())
            .map_err(|e| CapabilityError::Failed(e.to_string()))
    }
}

/// Terminals have no notification centre
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNotifier;

impl Notifier for NoNotifier {
    fn notify(&mut self, _title: &str, _body: &str) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unavailable("notifications"))
    }
}

/// What a [`Recorder`] saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Vibrate(HapticPattern),
    Notify { title: String, body: String },
}

/// Captures calls instead of performing them. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<DeviceCall>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn vibrations(&self) -> Vec<HapticPattern> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DeviceCall::Vibrate(p) => Some(p),
                DeviceCall::Notify { .. } => None,
            })
            .collect()
    }

    pub fn last_vibration(&self) -> Option<HapticPattern> {
        self.vibrations().last().copied()
    }

    fn push(&self, call: DeviceCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl HapticDevice for Recorder {
    fn vibrate(&mut self, pattern: HapticPattern) -> Result<(), CapabilityError> {
        self.push(DeviceCall::Vibrate(pattern));
        Ok(())
    }
}

impl Notifier for Recorder {
    fn notify(&mut self, title: &str, body: &str) -> Result<(), CapabilityError> {
        self.push(DeviceCall::Notify {
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub struct DeviceBridge {
    haptics: Box<dyn HapticDevice>,
    notifier: Box<dyn Notifier>,
}

impl std::fmt::Debug for DeviceBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBridge").finish_non_exhaustive()
    }
}

impl DeviceBridge {
    pub fn new(haptics: Box<dyn HapticDevice>, notifier: Box<dyn Notifier>) -> Self {
        Self { haptics, notifier }
    }

    pub fn terminal(bell: bool) -> Self {
        Self::new(Box::new(TerminalBell::stdout(bell)), Box::new(NoNotifier))
    }

    pub fn recording(recorder: &Recorder) -> Self {
        Self::new(Box::new(recorder.clone()), Box::new(recorder.clone()))
    }

    pub fn haptic(&mut self, pattern: HapticPattern) {
        if let Err(e) = self.haptics.vibrate(pattern) {
            tracing::debug!(%pattern, error = %e, "haptic skipped");
        }
    }

    /// Returns whether the notification was delivered
    pub fn notify(&mut self, title: &str, body: &str) -> bool {
        match self.notifier.notify(title, body) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "notification skipped");
                false
            }
        }
    }
}
