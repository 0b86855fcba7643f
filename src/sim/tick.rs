//! Fixed timestep simulation tick
//!
//! One call advances the session by one tick and runs, in order: entity
//! motion and pruning, the spawn ticker, the countdown ticker, and effect
//! deadlines.

use super::effects::update_effects;
use super::spawn::spawn_batch;
use super::state::{GameEvent, GamePhase, SessionState};
use crate::consts::SIM_HZ;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Advance the session by one fixed timestep
pub fn tick(state: &mut SessionState, tuning: &Tuning, settings: &Settings, dt: f32) {
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;

    // Move everything, then compact survivors so expired entities are gone
    // on the same tick they leave the screen
    let viewport = state.viewport;
    for fruit in state.fruits.iter_mut() {
        fruit.advance(dt, tuning.gravity, tuning.sliced_fade_rate);
    }
    state.fruits.retain(|f| !f.is_expired(&viewport));

    for particle in state.particles.iter_mut() {
        particle.advance(dt, tuning.gravity);
    }
    state.particles.retain(|p| !p.is_expired(&viewport));

    // Spawn ticker
    state.spawn_phase += 1;
    if state.spawn_phase >= tuning.spawn_period_ticks() {
        state.spawn_phase = 0;
        let blocked = state.effects.input_blocked(&settings.effect_policy);
        if blocked && !settings.effect_policy.spawn_during_blocking_effect {
            log::debug!("Spawn skipped at tick {} (blocking effect)", state.time_ticks);
        } else {
            spawn_batch(state, tuning);
        }
    }

    // Countdown ticker (suspended while frozen)
    if !state.effects.timer_paused() {
        state.countdown_phase += 1;
        if state.countdown_phase >= SIM_HZ as u64 {
            state.countdown_phase = 0;
            if state.time_remaining > 0 {
                state.time_remaining -= 1;
                state.push_event(GameEvent::TimeChanged {
                    time_remaining: state.time_remaining,
                });
            }
            if state.time_remaining == 0 {
                state.phase = GamePhase::GameOver;
                state.push_event(GameEvent::TimeUp);
                log::info!("Time up at tick {} (score {})", state.time_ticks, state.score);
                return;
            }
        }
    }

    update_effects(state, tuning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::effects::{trigger_bomb, trigger_ice};
    use crate::sim::state::{Fruit, FruitKind, Particle, PopupTone, SpawnZone, Viewport};
    use glam::Vec2;

    fn setup() -> (SessionState, Tuning, Settings) {
        let tuning = Tuning::default();
        let state = SessionState::new(77, &tuning, Viewport::default(), 0);
        (state, tuning, Settings::default())
    }

    fn run(state: &mut SessionState, tuning: &Tuning, settings: &Settings, ticks: u32) {
        for _ in 0..ticks {
            tick(state, tuning, settings, SIM_DT);
        }
    }

    #[test]
    fn test_countdown_one_per_second() {
        let (mut state, tuning, settings) = setup();
        run(&mut state, &tuning, &settings, 59);
        assert_eq!(state.time_remaining, 60);
        run(&mut state, &tuning, &settings, 1);
        assert_eq!(state.time_remaining, 59);
        run(&mut state, &tuning, &settings, 600);
        assert_eq!(state.time_remaining, 49);
    }

    #[test]
    fn test_session_ends_when_timer_hits_zero() {
        let (mut state, mut tuning, settings) = setup();
        tuning.session_secs = 2;
        state.time_remaining = 2;
        run(&mut state, &tuning, &settings, 120);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.time_remaining, 0);
        assert!(state.events.contains(&GameEvent::TimeUp));

        // Terminal: further ticks change nothing
        let ticks = state.time_ticks;
        let fruit_count = state.fruits.len();
        run(&mut state, &tuning, &settings, 300);
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.fruits.len(), fruit_count);
    }

    #[test]
    fn test_ice_freezes_countdown_for_five_seconds() {
        let (mut state, tuning, settings) = setup();
        run(&mut state, &tuning, &settings, 60 * 10 + 30);
        let before = state.time_remaining;
        assert_eq!(before, 50);

        trigger_ice(&mut state, &tuning);
        run(&mut state, &tuning, &settings, 359);
        assert_eq!(state.time_remaining, before, "no decrement during the freeze");
        assert!(state.effects.ice.is_none());

        run(&mut state, &tuning, &settings, 1);
        assert_eq!(state.time_remaining, before - 1, "one second after the thaw");
        run(&mut state, &tuning, &settings, 60);
        assert_eq!(state.time_remaining, before - 2);
    }

    #[test]
    fn test_spawns_every_ninety_ticks() {
        let (mut state, tuning, settings) = setup();
        run(&mut state, &tuning, &settings, 89);
        assert!(state.fruits.is_empty());
        run(&mut state, &tuning, &settings, 1);
        let first = state.fruits.len();
        assert!(first == 4 || first == 6);
        let batches = |s: &SessionState| {
            s.events
                .iter()
                .filter(|e| matches!(e, GameEvent::FruitsSpawned { .. }))
                .count()
        };
        run(&mut state, &tuning, &settings, 90);
        assert_eq!(batches(&state), 2);
    }

    #[test]
    fn test_spawn_policy_can_pause_during_freeze() {
        let (mut state, tuning, mut settings) = setup();
        settings.effect_policy.spawn_during_blocking_effect = false;
        trigger_ice(&mut state, &tuning);
        run(&mut state, &tuning, &settings, 200);
        assert!(state.fruits.is_empty());
        // Ice ends at tick 300, next spawn at 360
        run(&mut state, &tuning, &settings, 160);
        assert!(!state.fruits.is_empty());
    }

    #[test]
    fn test_fruit_pruned_on_same_tick() {
        let (mut state, tuning, settings) = setup();
        let id = state.next_entity_id();
        let height = state.viewport.height;
        state.fruits.push(Fruit::new(
            id,
            FruitKind::Apple,
            SpawnZone::Left,
            Vec2::new(400.0, height - 1.0),
            Vec2::new(0.0, 300.0),
            &tuning,
        ));
        tick(&mut state, &tuning, &settings, SIM_DT);
        assert!(state.fruits.is_empty());
    }

    #[test]
    fn test_particles_pruned_when_faded() {
        let (mut state, tuning, settings) = setup();
        state
            .particles
            .push(Particle::score_popup(Vec2::new(300.0, 300.0), "+5", PopupTone::Gain));
        run(&mut state, &tuning, &settings, 49);
        assert_eq!(state.particles.len(), 1);
        run(&mut state, &tuning, &settings, 2);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_bomb_reverts_without_touching_countdown() {
        let (mut state, tuning, settings) = setup();
        trigger_bomb(&mut state, &tuning, true);
        run(&mut state, &tuning, &settings, 120);
        assert!(state.effects.bomb.is_none());
        assert_eq!(state.time_remaining, 58);
        assert!(state.events.contains(&GameEvent::BombEnded));
    }

    #[test]
    fn test_determinism() {
        let (mut a, tuning, settings) = setup();
        let (mut b, _, _) = setup();
        run(&mut a, &tuning, &settings, 1000);
        run(&mut b, &tuning, &settings, 1000);
        assert_eq!(a.fruits.len(), b.fruits.len());
        for (fa, fb) in a.fruits.iter().zip(&b.fruits) {
            assert_eq!(fa.id, fb.id);
            assert_eq!(fa.kind, fb.kind);
            assert_eq!(fa.pos, fb.pos);
        }
    }
}
