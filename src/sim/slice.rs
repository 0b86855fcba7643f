//! Swipe path and slice detection
//!
//! Only the newest segment of the gesture is ever tested: each pointer
//! sample checks (second-to-last, last) against every live fruit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::{trigger_bomb, trigger_ice};
use super::state::{Fruit, FruitKind, GameEvent, Particle, PopupTone, SessionState};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Vertical offset of the "time freezes" banner above the fruit
const FREEZE_BANNER_OFFSET: f32 = 40.0;
const FREEZE_BANNER_TEXT: &str = "Time freezes! for 5 Seconds!";

/// Pointer samples of the current drag/touch gesture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointerPath {
    points: Vec<Vec2>,
    dragging: bool,
}

impl PointerPath {
    /// Gesture start: the path becomes just this point
    pub fn begin(&mut self, pos: Vec2) {
        self.points.clear();
        self.points.push(pos);
        self.dragging = true;
    }

    /// Append a sample. Ignored (returns false) outside a gesture.
    pub fn push(&mut self, pos: Vec2) -> bool {
        if !self.dragging {
            return false;
        }
        self.points.push(pos);
        true
    }

    /// Gesture end: path cleared
    pub fn end(&mut self) {
        self.points.clear();
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// (second-to-last, last), if there are at least two samples
    pub fn last_segment(&self) -> Option<(Vec2, Vec2)> {
        match self.points.as_slice() {
            [.., a, b] => Some((*a, *b)),
            _ => None,
        }
    }

    /// Drop the drawn trail back to the newest sample
    fn truncate_to_last(&mut self) {
        if let Some(&last) = self.points.last() {
            self.points.clear();
            self.points.push(last);
        }
    }
}

/// What a slice check did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOutcome {
    /// Session not running, input blocked, or fewer than two samples
    Ignored,
    /// Segment shorter than the minimum swipe distance
    Jitter,
    /// Segment hit nothing; trail truncated to the newest sample
    Miss,
    Hit { count: u32, score_delta: i64 },
}

/// Test the newest path segment against every live fruit
///
/// Every fruit the segment crosses is sliced exactly once, scored, and
/// replaced by particles. The blocking check happens once up front, so an
/// ice fruit sliced mid-segment does not shield the fruits after it.
pub fn handle_slice(state: &mut SessionState, tuning: &Tuning, settings: &Settings) -> SliceOutcome {
    if !state.is_playing() || state.effects.input_blocked(&settings.effect_policy) {
        return SliceOutcome::Ignored;
    }
    let Some((a, b)) = state.path.last_segment() else {
        return SliceOutcome::Ignored;
    };
    if a.distance(b) < tuning.min_swipe_distance {
        return SliceOutcome::Jitter;
    }

    let mut hits: Vec<Fruit> = Vec::new();
    for fruit in state.fruits.iter_mut() {
        if fruit.check_slice(a, b) {
            fruit.sliced = true;
            hits.push(fruit.clone());
        }
    }

    if hits.is_empty() {
        state.path.truncate_to_last();
        return SliceOutcome::Miss;
    }

    let mut score_delta = 0i64;
    for fruit in &hits {
        score_delta += fruit.points as i64;
        apply_hit(state, tuning, settings, fruit);
    }

    SliceOutcome::Hit {
        count: hits.len() as u32,
        score_delta,
    }
}

/// Score one sliced fruit and emit its particles and effect
fn apply_hit(state: &mut SessionState, tuning: &Tuning, settings: &Settings, fruit: &Fruit) {
    let center = fruit.center();
    state.score += fruit.points as i64;
    log::debug!(
        "Sliced {:?} for {:+} (score {})",
        fruit.kind,
        fruit.points,
        state.score
    );
    state.push_event(GameEvent::FruitSliced {
        kind: fruit.kind,
        points: fruit.points,
        pos: center,
    });
    state.push_event(GameEvent::ScoreChanged { score: state.score });

    let tone = if fruit.points >= 0 {
        PopupTone::Gain
    } else {
        PopupTone::Loss
    };
    state
        .particles
        .push(Particle::score_popup(center, format!("{:+}", fruit.points), tone));

    let shine_count = match fruit.kind {
        FruitKind::Bomb => tuning.bomb_shine_count,
        _ => tuning.shine_count,
    };
    let mut burst: Vec<Particle> = (0..shine_count)
        .map(|_| Particle::shine(center, &mut state.rng))
        .collect();
    burst.push(Particle::fragment(center, fruit.kind, -1.0));
    burst.push(Particle::fragment(center, fruit.kind, 1.0));
    state.push_particles(burst, settings.max_particles());

    match fruit.kind {
        FruitKind::Ice => {
            if !trigger_ice(state, tuning) {
                return;
            }
            state.particles.push(Particle::score_popup(
                center - Vec2::new(0.0, FREEZE_BANNER_OFFSET),
                FREEZE_BANNER_TEXT,
                PopupTone::Frozen,
            ));
        }
        FruitKind::Bomb => {
            trigger_bomb(state, tuning, settings.effective_screen_shake());
        }
        _ => {}
    }
}
