//! Automatic calls muting driven by repetition count
//!
//! Mute is sticky within a track: once a threshold fires, evaluation never
//! clears it again. Only the manual toggle unmutes, and the next track load
//! resets everything.

use crate::types::AutoMuteConfig;

/// Calls mute state plus the auto-mute policy
#[derive(Debug, Clone, Default)]
pub struct AutoMuteController {
    config: AutoMuteConfig,
    muted: bool,
}

impl AutoMuteController {
    pub fn new(config: AutoMuteConfig) -> Self {
        Self {
            config,
            muted: false,
        }
    }

    /// Replace the thresholds (current mute state is kept)
    pub fn set_config(&mut self, config: AutoMuteConfig) {
        self.config = config;
    }

    pub fn config(&self) -> AutoMuteConfig {
        self.config
    }

    /// Whether the thresholds call for mute at `current_rep` of `total_reps`
    pub fn should_mute(&self, current_rep: usize, total_reps: usize) -> bool {
        let after = self
            .config
            .after_reps
            .is_some_and(|after| current_rep >= after);
        let remaining = self
            .config
            .with_reps_remaining
            .is_some_and(|remaining| total_reps.saturating_sub(current_rep) <= remaining);

        after || remaining
    }

    /// Apply the policy at a repetition
    ///
    /// Returns `true` if mute is force-applied now. Never unmutes.
    pub fn evaluate(&mut self, current_rep: usize, total_reps: usize) -> bool {
        if self.should_mute(current_rep, total_reps) {
            self.muted = true;
            true
        } else {
            false
        }
    }

    /// Back to unmuted (new track)
    pub fn reset(&mut self) {
        self.muted = false;
    }

    /// Manual mute/unmute
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Manual toggle, returns the new state
    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }
}
