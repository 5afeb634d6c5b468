use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::Ctx;
use crate::error::RedeemError;
use crate::haptics::HapticPattern;
use crate::redeem::{RedeemForm, RedeemStatus};
use crate::runtime::JobResult;

#[derive(Debug, Clone, Default)]
pub struct RedeemPanel {
    form: RedeemForm,
}

impl RedeemPanel {
    pub fn form(&self) -> &RedeemForm {
        &self.form
    }

    pub fn submit(&mut self, ctx: &mut Ctx) -> bool {
        let Some(code) = self.form.submit() else {
            if matches!(self.form.status(), RedeemStatus::Error(_)) {
                ctx.haptic(HapticPattern::Error);
            }
            return false;
        };
        ctx.haptic(HapticPattern::Medium);
        let redeemer = ctx.services.redeemer.clone();
        tracing::info!("submitting redeem code");
        ctx.jobs
            .spawn("redeem", move || JobResult::Redeem(redeemer.redeem(&code)));
        true
    }

    pub fn finish(&mut self, result: Result<String, RedeemError>, ctx: &mut Ctx) {
        ctx.haptic(if result.is_ok() {
            HapticPattern::Success
        } else {
            HapticPattern::Error
        });
        self.form.finish(result);
    }

    /// Clear the code and status
    pub fn hard_reset(&mut self, ctx: &mut Ctx) {
        if self.form.status().is_processing() {
            return;
        }
        self.form.reset();
        ctx.haptic(HapticPattern::Heavy);
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &mut Ctx) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('r') {
                self.hard_reset(ctx);
            }
            return;
        }
        match key.code {
            KeyCode::Enter => {
                self.submit(ctx);
            }
            KeyCode::Delete => self.hard_reset(ctx),
            KeyCode::Backspace => self.form.pop_char(),
            KeyCode::Char(c) => self.form.push_char(c),
            _ => {}
        }
    }
}
