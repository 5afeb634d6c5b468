//! Code redemption.

use crate::error::{RedeemError, ValidationError};

pub const MIN_CODE_LEN: usize = 12;
pub const MAX_CODE_LEN: usize = 16;

/// Uppercase, keep only `A-Z0-9`, cut to 16 characters
pub fn format_code(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_uppercase)
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .take(MAX_CODE_LEN)
        .collect()
}

pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code.chars().count() < MIN_CODE_LEN {
        return Err(ValidationError::CodeTooShort);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RedeemStatus {
    #[default]
    Idle,
    Processing,
    Success(String),
    Error(String),
}

impl RedeemStatus {
    pub fn message(&self) -> Option<&str> {
        match self {
            RedeemStatus::Idle => None,
            RedeemStatus::Processing => Some("Verifying with server..."),
            RedeemStatus::Success(m) | RedeemStatus::Error(m) => Some(m),
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, RedeemStatus::Processing)
    }
}

pub trait Redeemer: Send + Sync {
    /// Returns the confirmation message
    fn redeem(&self, code: &str) -> Result<String, RedeemError>;
}

/// No redemption backend: every valid code reports that plainly
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRedeemer;

impl Redeemer for OfflineRedeemer {
    fn redeem(&self, code: &str) -> Result<String, RedeemError> {
        validate_code(code)?;
        Err(RedeemError::Unavailable)
    }
}

/// Editable code plus the status of the last attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedeemForm {
    code: String,
    status: RedeemStatus,
}

impl RedeemForm {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn status(&self) -> &RedeemStatus {
        &self.status
    }

    /// Replace the code. Any previous outcome is cleared. Locked while a
    /// request is in flight.
    pub fn set_code(&mut self, raw: &str) {
        if self.status.is_processing() {
            return;
        }
        self.code = format_code(raw);
        self.status = RedeemStatus::Idle;
    }

    pub fn push_char(&mut self, c: char) {
        let raw = format!("{}{}", self.code, c);
        self.set_code(&raw);
    }

    pub fn pop_char(&mut self) {
        let mut raw = self.code.clone();
        raw.pop();
        self.set_code(&raw);
    }

    /// Check the code locally. Returns the code to dispatch, after which the
    /// form is `Processing`. A request already in flight yields `None`.
    pub fn submit(&mut self) -> Option<String> {
        if self.status.is_processing() {
            return None;
        }
        match validate_code(&self.code) {
            Ok(()) => {
                self.status = RedeemStatus::Processing;
                Some(self.code.clone())
            }
            Err(e) => {
                self.status = RedeemStatus::Error(e.to_string());
                None
            }
        }
    }

    pub fn finish(&mut self, result: Result<String, RedeemError>) {
        self.status = match result {
            Ok(msg) => RedeemStatus::Success(msg),
            Err(e) => RedeemStatus::Error(e.to_string()),
        };
    }

    pub fn reset(&mut self) {
        self.code.clear();
        self.status = RedeemStatus::Idle;
    }
}
