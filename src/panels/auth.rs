use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{Ctx, TextInput};
use crate::auth::{persist_session, AuthMethod, AuthMode, Credentials, User};
use crate::error::AuthError;
use crate::haptics::HapticPattern;
use crate::runtime::JobResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
    Phone,
}

/// Sign-in screen shown while no session exists
#[derive(Debug, Clone)]
pub struct AuthPanel {
    method: AuthMethod,
    mode: AuthMode,
    email: TextInput,
    password: TextInput,
    phone: TextInput,
    focus: Field,
    loading: bool,
    error: Option<String>,
}

impl Default for AuthPanel {
    fn default() -> Self {
        Self {
            method: AuthMethod::Email,
            mode: AuthMode::Login,
            email: TextInput::default().with_max_chars(64),
            password: TextInput::default().with_max_chars(64),
            phone: TextInput::default().with_max_chars(20),
            focus: Field::Email,
            loading: false,
            error: None,
        }
    }
}

impl AuthPanel {
    pub fn method(&self) -> AuthMethod {
        self.method
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn field(&self, field: Field) -> &TextInput {
        match field {
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::Phone => &self.phone,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Switch between the email and phone forms
    pub fn set_method(&mut self, method: AuthMethod) {
        if self.loading || method == AuthMethod::Google {
            return;
        }
        self.method = method;
        self.focus = match method {
            AuthMethod::Phone => Field::Phone,
            _ => Field::Email,
        };
        self.error = None;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.error = None;
    }

    fn cycle_focus(&mut self) {
        self.focus = match (self.method, self.focus) {
            (AuthMethod::Email, Field::Email) => Field::Password,
            (AuthMethod::Email, _) => Field::Email,
            (_, _) => Field::Phone,
        };
    }

    fn credentials(&self) -> Credentials {
        match self.method {
            AuthMethod::Phone => Credentials::Phone {
                phone: self.phone.value().to_string(),
            },
            AuthMethod::Google => Credentials::Google,
            AuthMethod::Email => Credentials::Email {
                email: self.email.value().trim().to_string(),
                password: self.password.value().to_string(),
            },
        }
    }

    /// Validate locally, then hand the credentials to the authenticator
    pub fn submit(&mut self, ctx: &mut Ctx) -> bool {
        let credentials = self.credentials();
        self.dispatch(credentials, ctx)
    }

    pub fn google(&mut self, ctx: &mut Ctx) -> bool {
        self.dispatch(Credentials::Google, ctx)
    }

    fn dispatch(&mut self, credentials: Credentials, ctx: &mut Ctx) -> bool {
        if self.loading {
            return false;
        }
        if let Err(e) = credentials.validate() {
            self.error = Some(e.to_string());
            ctx.haptic(HapticPattern::Error);
            return false;
        }
        self.loading = true;
        self.error = None;
        ctx.haptic(HapticPattern::Medium);

        let authenticator = ctx.services.authenticator.clone();
        let now = ctx.now_ms();
        ctx.jobs.spawn("auth", move || {
            JobResult::Auth(authenticator.authenticate(&credentials, now))
        });
        true
    }

    /// Returns the signed-in user, already persisted
    pub fn finish(&mut self, result: Result<User, AuthError>, ctx: &mut Ctx) -> Option<User> {
        self.loading = false;
        match result {
            Ok(user) => {
                persist_session(ctx.store, &user);
                ctx.haptic(HapticPattern::Success);
                *self = Self::default();
                Some(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-in failed");
                self.error = Some(e.to_string());
                ctx.haptic(HapticPattern::Error);
                None
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &mut Ctx) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('g') => {
                    self.google(ctx);
                }
                KeyCode::Char('t') => self.toggle_mode(),
                _ => {}
            }
            return;
        }
        match key.code {
            KeyCode::Left => self.set_method(AuthMethod::Email),
            KeyCode::Right => self.set_method(AuthMethod::Phone),
            KeyCode::Tab | KeyCode::Down | KeyCode::Up => self.cycle_focus(),
            KeyCode::Enter => {
                self.submit(ctx);
            }
            _ => {
                if self.loading {
                    return;
                }
                let input = match self.focus {
                    Field::Email => &mut self.email,
                    Field::Password => &mut self.password,
                    Field::Phone => &mut self.phone,
                };
                if input.handle_key(key) {
                    self.error = None;
                }
            }
        }
    }
}
