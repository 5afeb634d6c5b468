//! Sign-in flow and the persisted user session.

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, ValidationError};
use crate::store::{keys, Persistence};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_PHONE_DIGITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuthMethod {
    Email,
    Phone,
    Google,
}

/// Only changes the labels shown on the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Email { email: String, password: String },
    Phone { phone: String },
    Google,
}

impl Credentials {
    pub fn method(&self) -> AuthMethod {
        match self {
            Credentials::Email { .. } => AuthMethod::Email,
            Credentials::Phone { .. } => AuthMethod::Phone,
            Credentials::Google => AuthMethod::Google,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Credentials::Email { email, password } => {
                if !email.contains('@') || password.chars().count() < MIN_PASSWORD_LEN {
                    return Err(ValidationError::InvalidEmailOrPassword);
                }
            }
            Credentials::Phone { phone } => {
                if phone_digits(phone).len() < MIN_PHONE_DIGITS {
                    return Err(ValidationError::InvalidPhone);
                }
            }
            Credentials::Google => {}
        }
        Ok(())
    }
}

/// Digits of a phone number once spaces, dashes, parentheses and a leading
/// `+` are stripped. Any other character makes the number invalid.
pub fn phone_digits(phone: &str) -> String {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut digits = String::new();
    for c in body.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '(' | ')' => {}
            _ => return String::new(),
        }
    }
    digits
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub method: AuthMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// One-letter badge, falling back to the first letter of the name
    pub fn badge(&self) -> String {
        self.avatar
            .clone()
            .filter(|a| !a.is_empty())
            .or_else(|| self.name.chars().next().map(|c| c.to_uppercase().to_string()))
            .unwrap_or_else(|| "?".to_string())
    }
}

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, credentials: &Credentials, now_ms: i64) -> Result<User, AuthError>;
}

/// Builds the user locally from the submitted credentials
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineAuthenticator;

impl Authenticator for OfflineAuthenticator {
    fn authenticate(&self, credentials: &Credentials, now_ms: i64) -> Result<User, AuthError> {
        credentials.validate()?;
        let method = credentials.method();
        let id = format!("{}_{}", method, now_ms);
        let user = match credentials {
            Credentials::Email { email, .. } => {
                let local = email.split('@').next().unwrap_or_default().trim();
                let avatar = email.trim().chars().next().map(|c| c.to_uppercase().to_string());
                User {
                    id,
                    name: local.to_string(),
                    method,
                    avatar,
                }
            }
            Credentials::Phone { phone } => {
                let digits = phone_digits(phone);
                let last4 = &digits[digits.len().saturating_sub(4)..];
                User {
                    id,
                    name: format!("User_{}", last4),
                    method,
                    avatar: Some("P".to_string()),
                }
            }
            Credentials::Google => User {
                id,
                name: "FF_Gamer_Google".to_string(),
                method,
                avatar: Some("G".to_string()),
            },
        };
        tracing::info!(method = %user.method, "signed in");
        Ok(user)
    }
}

/// Load the stored session. A blob that does not decode is removed.
pub fn restore_session(store: &Persistence) -> Option<User> {
    store.get(keys::USER_SESSION)?;
    match store.get_json::<User>(keys::USER_SESSION) {
        Some(user) => Some(user),
        None => {
            store.remove(keys::USER_SESSION);
            None
        }
    }
}

pub fn persist_session(store: &Persistence, user: &User) {
    store.set_json(keys::USER_SESSION, user);
}

pub fn clear_session(store: &Persistence) {
    store.remove(keys::USER_SESSION);
}
