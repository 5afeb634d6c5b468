use crossterm::event::{KeyCode, KeyEvent};

use super::{is_char, Ctx, PanelAction};
use crate::ai::types::cycle;
use crate::ai::{GameMode, PlayStyle, StrategyResponse};
use crate::error::GenerationError;
use crate::feedback::{self, FeedbackPanel, Vote, VoteSlot};
use crate::haptics::HapticPattern;
use crate::runtime::JobResult;

pub const FAILED_MESSAGE: &str = "Tactical uplink failed. Try again.";

#[derive(Debug, Clone)]
pub struct StrategyPanel {
    pub mode: GameMode,
    pub style: PlayStyle,
    loading: bool,
    result: Option<StrategyResponse>,
    error: Option<String>,
    vote: VoteSlot,
}

impl Default for StrategyPanel {
    fn default() -> Self {
        Self {
            mode: GameMode::BattleRoyale,
            style: PlayStyle::Rusher,
            loading: false,
            result: None,
            error: None,
            vote: VoteSlot::default(),
        }
    }
}

impl StrategyPanel {
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&StrategyResponse> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn vote(&self) -> Option<Vote> {
        self.vote.current()
    }

    pub fn cycle_mode(&mut self, forward: bool) {
        if !self.loading {
            self.mode = cycle(&GameMode::ALL, self.mode, forward);
        }
    }

    pub fn cycle_style(&mut self, forward: bool) {
        if !self.loading {
            self.style = cycle(&PlayStyle::ALL, self.style, forward);
        }
    }

    /// Dispatch a brief request. Refused while one is in flight.
    pub fn generate(&mut self, ctx: &mut Ctx) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        self.error = None;
        self.vote.clear();
        ctx.haptic(HapticPattern::Light);

        let generator = ctx.services.generator.clone();
        let (mode, style) = (self.mode, self.style);
        tracing::info!(%mode, %style, "requesting tactical brief");
        ctx.jobs.spawn("brief", move || {
            JobResult::Brief(generator.tactical_brief(mode, style))
        });
        true
    }

    pub fn finish(&mut self, result: Result<StrategyResponse, GenerationError>, ctx: &mut Ctx) {
        self.loading = false;
        match result {
            Ok(brief) => {
                self.result = Some(brief);
                ctx.haptic(HapticPattern::Success);
            }
            Err(e) => {
                tracing::warn!(error = %e, "tactical brief failed");
                self.error = Some(failure_message(&e));
                ctx.haptic(HapticPattern::Error);
            }
        }
    }

    pub fn cast_vote(&mut self, vote: Vote, ctx: &mut Ctx) {
        if self.result.is_none() || !self.vote.cast(vote) {
            return;
        }
        ctx.haptic(match vote {
            Vote::Up => HapticPattern::Success,
            Vote::Down => HapticPattern::Miss,
        });
        let now = ctx.now_ms();
        feedback::record(ctx.store, FeedbackPanel::Strategy, vote, now);
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &mut Ctx) -> PanelAction {
        match key.code {
            KeyCode::Left => self.cycle_mode(false),
            KeyCode::Right => self.cycle_mode(true),
            KeyCode::Up => self.cycle_style(false),
            KeyCode::Down => self.cycle_style(true),
            KeyCode::Enter => {
                self.generate(ctx);
            }
            _ if is_char(&key, 'g') => {
                self.generate(ctx);
            }
            _ if is_char(&key, 'u') => self.cast_vote(Vote::Up, ctx),
            _ if is_char(&key, 'd') => self.cast_vote(Vote::Down, ctx),
            _ => {}
        }
        PanelAction::None
    }
}

pub(crate) fn failure_message(e: &GenerationError) -> String {
    if e.is_not_configured() {
        e.to_string()
    } else {
        FAILED_MESSAGE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::Harness;

    fn brief() -> StrategyResponse {
        StrategyResponse {
            title: "Operation Silent Fury".into(),
            character_combination: vec!["Alok".into(), "Chrono".into(), "Kelly".into(), "Jota".into()],
            weapon_loadout: vec!["MP40".into()],
            tactical_advice: "Rotate early.".into(),
        }
    }

    #[test]
    fn second_request_refused_while_loading() {
        let mut h = Harness::new();
        let mut panel = StrategyPanel::default();
        assert!(panel.generate(&mut h.ctx()));
        assert!(!panel.generate(&mut h.ctx()));
        panel.cycle_mode(true);
        assert_eq!(panel.mode, GameMode::BattleRoyale);

        let result = h.next_job();
        match result {
            JobResult::Brief(r) => panel.finish(r, &mut h.ctx()),
            other => panic!("unexpected job {:?}", other),
        }
        assert!(!panel.is_loading());
        // Harness generator is unconfigured
        assert_eq!(
            panel.error(),
            Some("AI client not configured: missing API key")
        );
        assert!(panel.result().is_none());
    }

    #[test]
    fn failure_shows_uplink_message() {
        let mut h = Harness::new();
        let mut panel = StrategyPanel::default();
        panel.generate(&mut h.ctx());
        panel.finish(Err(GenerationError::Empty), &mut h.ctx());
        assert_eq!(panel.error(), Some(FAILED_MESSAGE));
        assert_eq!(h.recorder.last_vibration(), Some(HapticPattern::Error));
    }

    #[test]
    fn votes_are_deduplicated_and_logged() {
        let mut h = Harness::new();
        let mut panel = StrategyPanel::default();
        panel.cast_vote(Vote::Up, &mut h.ctx());
        assert_eq!(panel.vote(), None);

        panel.finish(Ok(brief()), &mut h.ctx());
        panel.cast_vote(Vote::Up, &mut h.ctx());
        panel.cast_vote(Vote::Up, &mut h.ctx());
        panel.cast_vote(Vote::Down, &mut h.ctx());

        let history = feedback::history(&h.store);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].panel, FeedbackPanel::Strategy);
        assert_eq!(history[1].vote, Vote::Down);
    }

    #[test]
    fn arrows_cycle_selectors() {
        let mut h = Harness::new();
        let mut panel = StrategyPanel::default();
        panel.on_key(KeyEvent::from(KeyCode::Left), &mut h.ctx());
        panel.on_key(KeyEvent::from(KeyCode::Up), &mut h.ctx());
        assert_eq!(panel.mode, GameMode::LoneWolf);
        assert_eq!(panel.style, PlayStyle::Demolition);
    }
}
