//! Clipboard copy through the OSC 52 terminal escape.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::error::CapabilityError;

pub trait Clipboard: Send {
    fn copy(&mut self, text: &str) -> Result<(), CapabilityError>;
}

/// `ESC ] 52 ; c ; <base64> BEL`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

pub struct Osc52<W: Write + Send> {
    out: W,
}

impl Osc52<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Osc52<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> Clipboard for Osc52<W> {
    fn copy(&mut self, text: &str) -> Result<(), CapabilityError> {
        if text.is_empty() {
            return Err(CapabilityError::Failed("nothing to copy".into()));
        }
        self.out
            .write_all(osc52_sequence(text).as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| CapabilityError::Failed(e.to_string()))
    }
}

/// Keeps copied text in memory. Clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
    refuse: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that denies every write
    pub fn denied() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&mut self, text: &str) -> Result<(), CapabilityError> {
        if self.refuse {
            return Err(CapabilityError::PermissionDenied("clipboard"));
        }
        let mut slot = self
            .contents
            .lock()
            .map_err(|_| CapabilityError::Failed("clipboard poisoned".into()))?;
        *slot = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osc52_wraps_base64() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn osc52_writes_sequence() {
        let mut buf = Vec::new();
        Osc52::new(&mut buf).copy("hi").unwrap();
        assert_eq!(buf, b"\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn empty_copy_fails() {
        let mut buf = Vec::new();
        assert!(Osc52::new(&mut buf).copy("").is_err());
    }

    #[test]
    fn memory_clipboard_shares_contents() {
        let cb = MemoryClipboard::new();
        let mut handle = cb.clone();
        handle.copy("text").unwrap();
        assert_eq!(cb.contents().as_deref(), Some("text"));

        let mut denied = MemoryClipboard::denied();
        assert_eq!(
            denied.copy("x"),
            Err(CapabilityError::PermissionDenied("clipboard"))
        );
    }
}
