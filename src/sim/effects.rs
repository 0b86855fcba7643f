//! Timed self-reverting effects (ice freeze, bomb penalty)
//!
//! Each effect is a record of when it started and when it reverts. The tick
//! checks deadlines against `time_ticks`, so no callback outlives the
//! session that armed it.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, SessionState};
use crate::secs_to_ticks;
use crate::settings::EffectPolicy;
use crate::tuning::Tuning;

/// Active window of one effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectTimer {
    pub activated_at: u64,
    pub revert_at: u64,
    /// Bitmask of cosmetic cues already emitted
    pub cues_fired: u8,
}

impl EffectTimer {
    fn new(now: u64, duration: u64) -> Self {
        Self {
            activated_at: now,
            revert_at: now + duration,
            cues_fired: 0,
        }
    }

    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.activated_at)
    }
}

/// Effect records; `None` means idle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effects {
    pub ice: Option<EffectTimer>,
    pub bomb: Option<EffectTimer>,
}

impl Effects {
    /// Countdown is suspended while ice is active
    pub fn timer_paused(&self) -> bool {
        self.ice.is_some()
    }

    /// Whether slicing input is swallowed under `policy`
    pub fn input_blocked(&self, policy: &EffectPolicy) -> bool {
        (policy.ice_blocks_input && self.ice.is_some())
            || (policy.bomb_blocks_input && self.bomb.is_some())
    }
}

/// Ice overlay cues: (offset from activation, event)
fn ice_cues(tuning: &Tuning) -> [(u64, GameEvent); 3] {
    [
        (
            secs_to_ticks(tuning.ice_backdrop_restore_secs),
            GameEvent::IceBackdropRestored,
        ),
        (
            secs_to_ticks(tuning.ice_overlay_fade_secs),
            GameEvent::IceOverlayFaded,
        ),
        (
            secs_to_ticks(tuning.ice_overlay_remove_secs),
            GameEvent::IceOverlayRemoved,
        ),
    ]
}

/// Arm the ice freeze. Returns false (and does nothing) if already active.
pub fn trigger_ice(state: &mut SessionState, tuning: &Tuning) -> bool {
    if state.effects.ice.is_some() {
        return false;
    }
    state.effects.ice = Some(EffectTimer::new(state.time_ticks, tuning.ice_duration_ticks()));
    state.push_event(GameEvent::IceStarted);
    log::info!(
        "Ice effect started at tick {} ({} s left on the clock)",
        state.time_ticks,
        state.time_remaining
    );
    true
}

/// Arm the bomb penalty. Returns false (and does nothing) if already active.
pub fn trigger_bomb(state: &mut SessionState, tuning: &Tuning, shake: bool) -> bool {
    if state.effects.bomb.is_some() {
        return false;
    }
    state.effects.bomb = Some(EffectTimer::new(state.time_ticks, tuning.bomb_duration_ticks()));
    state.push_event(GameEvent::BombStarted { shake });
    log::info!("Bomb effect started at tick {}", state.time_ticks);
    true
}

/// Fire due cues and revert expired effects
pub fn update_effects(state: &mut SessionState, tuning: &Tuning) {
    let now = state.time_ticks;

    if let Some(mut ice) = state.effects.ice {
        let elapsed = ice.elapsed(now);
        let expired = now >= ice.revert_at;
        for (bit, (offset, event)) in ice_cues(tuning).into_iter().enumerate() {
            let mask = 1u8 << bit;
            // Cues scheduled past the revert still fire, right before it
            if ice.cues_fired & mask == 0 && (elapsed >= offset || expired) {
                ice.cues_fired |= mask;
                state.push_event(event);
            }
        }
        if expired {
            state.effects.ice = None;
            // Countdown restarts a full second from the thaw
            state.countdown_phase = 0;
            state.push_event(GameEvent::IceEnded);
            log::info!("Ice effect ended at tick {}", now);
        } else {
            state.effects.ice = Some(ice);
        }
    }

    if let Some(bomb) = state.effects.bomb {
        if now >= bomb.revert_at {
            state.effects.bomb = None;
            state.push_event(GameEvent::BombEnded);
            log::info!("Bomb effect ended at tick {}", now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Viewport;

    fn fresh_state() -> (SessionState, Tuning) {
        let tuning = Tuning::default();
        (SessionState::new(3, &tuning, Viewport::default(), 0), tuning)
    }

    fn run(state: &mut SessionState, tuning: &Tuning, ticks: u64) {
        for _ in 0..ticks {
            state.time_ticks += 1;
            update_effects(state, tuning);
        }
    }

    #[test]
    fn test_ice_retrigger_does_not_extend() {
        let (mut state, tuning) = fresh_state();
        assert!(trigger_ice(&mut state, &tuning));
        let deadline = state.effects.ice.unwrap().revert_at;
        run(&mut state, &tuning, 100);
        assert!(!trigger_ice(&mut state, &tuning));
        assert_eq!(state.effects.ice.unwrap().revert_at, deadline);
        let starts = state.events.iter().filter(|e| **e == GameEvent::IceStarted).count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_bomb_retrigger_does_not_extend() {
        let (mut state, tuning) = fresh_state();
        assert!(trigger_bomb(&mut state, &tuning, true));
        run(&mut state, &tuning, 60);
        assert!(!trigger_bomb(&mut state, &tuning, true));
        run(&mut state, &tuning, 59);
        assert!(state.effects.bomb.is_some());
        run(&mut state, &tuning, 1);
        assert!(state.effects.bomb.is_none());
        let starts = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::BombStarted { .. }))
            .count();
        assert_eq!(starts, 1);
        assert_eq!(state.events.last(), Some(&GameEvent::BombEnded));
    }

    #[test]
    fn test_ice_cues_fire_once_in_order() {
        let (mut state, tuning) = fresh_state();
        trigger_ice(&mut state, &tuning);
        run(&mut state, &tuning, 300);
        assert_eq!(
            state.events,
            vec![
                GameEvent::IceStarted,
                GameEvent::IceBackdropRestored,
                GameEvent::IceOverlayFaded,
                GameEvent::IceOverlayRemoved,
                GameEvent::IceEnded,
            ]
        );
        assert!(state.effects.ice.is_none());
    }

    #[test]
    fn test_late_cues_flush_before_end() {
        let (mut state, mut tuning) = fresh_state();
        tuning.ice_overlay_remove_secs = 9.0;
        trigger_ice(&mut state, &tuning);
        run(&mut state, &tuning, 300);
        let tail = &state.events[state.events.len() - 2..];
        assert_eq!(tail, &[GameEvent::IceOverlayRemoved, GameEvent::IceEnded]);
    }

    #[test]
    fn test_input_blocking_policy() {
        let (mut state, tuning) = fresh_state();
        let policy = EffectPolicy::default();
        trigger_bomb(&mut state, &tuning, false);
        assert!(!state.effects.input_blocked(&policy));
        let strict = EffectPolicy {
            bomb_blocks_input: true,
            ..policy
        };
        assert!(state.effects.input_blocked(&strict));

        trigger_ice(&mut state, &tuning);
        assert!(state.effects.input_blocked(&policy));
        let lenient = EffectPolicy {
            ice_blocks_input: false,
            ..policy
        };
        assert!(!state.effects.input_blocked(&lenient));
        assert!(state.effects.timer_paused());
    }

    #[test]
    fn test_effects_are_independent() {
        let (mut state, tuning) = fresh_state();
        trigger_ice(&mut state, &tuning);
        trigger_bomb(&mut state, &tuning, false);
        run(&mut state, &tuning, 120);
        assert!(state.effects.ice.is_some());
        assert!(state.effects.bomb.is_none());
    }
}
