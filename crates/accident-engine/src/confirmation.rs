//! Temporal confirmation state machine
//!
//! UNCONFIRMED -> CONFIRMED, terminal until an explicit engine reset. The
//! only way back is the rollover safety override.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{AccidentType, AccidentVerdict, EngineConfig, SceneMode, Severity};

/// Cross-frame accident state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationState {
    /// Hysteresis counter
    pub buffer: u32,
    pub confirmed: bool,
    pub accident_type: Option<AccidentType>,
    pub severity: Option<Severity>,
    pub reason: Option<String>,
}

impl ConfirmationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emergency iff confirmed with critical severity
    pub fn emergency(&self) -> bool {
        self.confirmed && self.severity == Some(Severity::Critical)
    }

    /// Static frames never accumulate
    pub fn clear_buffer(&mut self) {
        self.buffer = 0;
    }

    /// Confirm a catastrophic verdict without buffering
    pub fn confirm_immediately(&mut self, verdict: &AccidentVerdict) {
        if self.confirmed || !verdict.signal {
            return;
        }
        self.confirmed = true;
        self.accident_type = verdict.accident_type;
        self.severity = Some(Severity::Critical);
        self.reason = verdict.reason.clone();
        info!(kind = ?self.accident_type, "accident confirmed by catastrophic evidence");
    }

    /// Feed one video-frame verdict through the buffer.
    ///
    /// Returns `true` on the frame that confirms.
    pub fn step(&mut self, verdict: &AccidentVerdict, scene: SceneMode, config: &EngineConfig) -> bool {
        if verdict.signal {
            let increment = if scene.is_static_like() {
                config.static_like_increment
            } else {
                config.dynamic_increment
            };
            self.buffer = self.buffer.saturating_add(increment);
        } else {
            self.buffer = self.buffer.saturating_sub(config.decay);
        }
        debug!(buffer = self.buffer, signal = verdict.signal, "confirmation buffer");

        if !verdict.signal || self.confirmed || self.buffer < config.confirmation_threshold {
            return false;
        }

        let accident_type = verdict.accident_type.unwrap_or(AccidentType::Collision);
        self.confirmed = true;
        self.accident_type = Some(accident_type);
        self.severity = Some(accident_type.confirmed_severity());
        self.reason = verdict.reason.clone();
        info!(
            kind = %accident_type,
            severity = ?self.severity,
            buffer = self.buffer,
            "accident confirmed"
        );
        true
    }

    /// Fire seen after confirmation outranks the recorded type
    pub fn upgrade_to_fire(&mut self) -> bool {
        if !self.confirmed || self.accident_type >= Some(AccidentType::Fire) {
            return false;
        }
        info!(from = ?self.accident_type, "confirmed accident upgraded to fire");
        self.accident_type = Some(AccidentType::Fire);
        self.severity = Some(Severity::Critical);
        self.reason = Some("Fire detected after crash".into());
        true
    }

    /// Retract a rollover that a quiet video frame fails to back with damage
    pub fn rollover_override(&mut self, damage_votes: u32, scene: SceneMode, signal: bool) -> bool {
        if self.accident_type != Some(AccidentType::Rollover)
            || damage_votes > 0
            || scene == SceneMode::Static
            || signal
        {
            return false;
        }
        warn!("rollover retracted: no damage evidence in video");
        self.confirmed = false;
        self.accident_type = None;
        self.severity = None;
        self.reason = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn signal(kind: AccidentType) -> AccidentVerdict {
        AccidentVerdict::signal(kind, Severity::Low, "test")
    }

    #[test]
    fn test_static_like_confirms_on_second_frame() {
        let config = EngineConfig::default();
        let mut state = ConfirmationState::new();
        let verdict = signal(AccidentType::Rollover);

        assert!(!state.step(&verdict, SceneMode::NearStatic, &config));
        assert_eq!(state.buffer, 3);
        assert!(state.step(&verdict, SceneMode::NearStatic, &config));
        assert_eq!(state.buffer, 6);
        assert!(state.confirmed);
        assert_eq!(state.severity, Some(Severity::Critical));
        assert!(state.emergency());
    }

    #[test]
    fn test_dynamic_confirms_on_third_frame() {
        let config = EngineConfig::default();
        let mut state = ConfirmationState::new();
        let verdict = signal(AccidentType::Collision);

        assert!(!state.step(&verdict, SceneMode::Dynamic, &config));
        assert!(!state.step(&verdict, SceneMode::Dynamic, &config));
        assert!(state.step(&verdict, SceneMode::Dynamic, &config));
        assert_eq!(state.severity, Some(Severity::High));
        assert!(!state.emergency());
    }

    #[test]
    fn test_confirmed_is_terminal() {
        let config = EngineConfig::default();
        let mut state = ConfirmationState::new();
        let verdict = signal(AccidentType::Damaged);
        for _ in 0..3 {
            state.step(&verdict, SceneMode::Dynamic, &config);
        }
        assert!(state.confirmed);

        // a later signal of another type does not re-confirm
        assert!(!state.step(&signal(AccidentType::Collision), SceneMode::Dynamic, &config));
        assert_eq!(state.accident_type, Some(AccidentType::Damaged));

        for _ in 0..20 {
            state.step(&AccidentVerdict::none(), SceneMode::Dynamic, &config);
        }
        assert!(state.confirmed);
        assert_eq!(state.buffer, 0);
    }

    #[test]
    fn test_quiet_frames_never_confirm() {
        let config = EngineConfig::default();
        let mut state = ConfirmationState {
            buffer: 9,
            ..Default::default()
        };
        assert!(!state.step(&AccidentVerdict::none(), SceneMode::NearStatic, &config));
        assert!(!state.confirmed);
    }

    #[test]
    fn test_immediate_confirmation() {
        let mut state = ConfirmationState::new();
        state.confirm_immediately(&AccidentVerdict::none());
        assert!(!state.confirmed);

        state.confirm_immediately(&signal(AccidentType::Fire));
        assert!(state.emergency());
        assert_eq!(state.buffer, 0);
    }

    #[test]
    fn test_fire_upgrade_after_confirmation() {
        let config = EngineConfig::default();
        let mut state = ConfirmationState::new();
        assert!(!state.upgrade_to_fire());

        for _ in 0..3 {
            state.step(&signal(AccidentType::Collision), SceneMode::Dynamic, &config);
        }
        assert!(state.upgrade_to_fire());
        assert_eq!(state.accident_type, Some(AccidentType::Fire));
        assert!(state.emergency());
        assert!(!state.upgrade_to_fire());
    }

    #[test]
    fn test_rollover_override() {
        let config = EngineConfig::default();
        let mut state = ConfirmationState::new();
        for _ in 0..2 {
            state.step(&signal(AccidentType::Rollover), SceneMode::NearStatic, &config);
        }
        assert!(state.confirmed);

        assert!(!state.rollover_override(0, SceneMode::Static, false));
        assert!(!state.rollover_override(1, SceneMode::Dynamic, false));
        assert!(!state.rollover_override(0, SceneMode::Dynamic, true));
        assert!(state.confirmed);

        assert!(state.rollover_override(0, SceneMode::Dynamic, false));
        assert!(!state.confirmed);
        assert_eq!(state.accident_type, None);
        assert!(!state.emergency());
    }

    proptest! {
        #[test]
        fn prop_decay_by_one_floored(start in 0u32..50, quiet in 0usize..80) {
            let config = EngineConfig::default();
            let mut state = ConfirmationState {
                buffer: start,
                confirmed: true,
                accident_type: Some(AccidentType::Collision),
                severity: Some(Severity::High),
                reason: None,
            };
            for n in 1..=quiet {
                state.step(&AccidentVerdict::none(), SceneMode::Dynamic, &config);
                prop_assert_eq!(state.buffer, start.saturating_sub(n as u32));
                prop_assert!(state.confirmed);
            }
        }

        #[test]
        fn prop_signals_only_grow_buffer(frames in proptest::collection::vec(any::<bool>(), 1..60)) {
            let config = EngineConfig::default();
            let mut state = ConfirmationState::new();
            let mut was_confirmed = false;
            for signalled in frames {
                let before = state.buffer;
                let verdict = if signalled { signal(AccidentType::Damaged) } else { AccidentVerdict::none() };
                state.step(&verdict, SceneMode::Dynamic, &config);
                if signalled {
                    prop_assert_eq!(state.buffer, before + 2);
                }
                prop_assert!(!was_confirmed || state.confirmed);
                was_confirmed = state.confirmed;
            }
        }
    }
}
