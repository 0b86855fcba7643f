//! Fruit factory and batch spawner

use glam::Vec2;
use rand::Rng;

use super::state::{Fruit, FruitKind, GameEvent, SessionState, SpawnZone, Viewport};
use crate::tuning::Tuning;

/// Weighted kind draw over `weights` (in `FruitKind::ALL` order)
///
/// Rolls uniformly over the total weight and walks the table subtracting
/// each weight until the remainder falls below one; first match wins.
pub fn choose_kind<R: Rng>(rng: &mut R, weights: &[u32; 6]) -> FruitKind {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return FruitKind::Apple;
    }
    let mut roll = rng.random_range(0..total);
    for (kind, &weight) in FruitKind::ALL.iter().zip(weights) {
        if roll < weight {
            return *kind;
        }
        roll -= weight;
    }
    FruitKind::Apple
}

fn draw_speed<R: Rng>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Build one randomized fruit at a screen edge
pub fn spawn_fruit<R: Rng>(rng: &mut R, id: u32, tuning: &Tuning, viewport: &Viewport) -> Fruit {
    let size = tuning.fruit_size;

    // Vertical band excludes the top and bottom tenth (in 1/120ths of height)
    let vh = viewport.height / 120.0;
    let band_top = 10.0 * vh;
    let band_span = (90.0 * vh - band_top - size).max(0.0);
    let y = band_top + rng.random::<f32>() * band_span;

    let zone = if rng.random_bool(0.5) {
        SpawnZone::Left
    } else {
        SpawnZone::Right
    };
    let (x, vel) = match zone {
        SpawnZone::Left => (
            0.0,
            Vec2::new(
                draw_speed(rng, tuning.launch_speed_x),
                -draw_speed(rng, tuning.launch_speed_y_left),
            ),
        ),
        SpawnZone::Right => (
            viewport.width - size,
            Vec2::new(
                -draw_speed(rng, tuning.launch_speed_x),
                -draw_speed(rng, tuning.launch_speed_y_right),
            ),
        ),
    };

    let kind = choose_kind(rng, &tuning.kind_weights);
    Fruit::new(id, kind, zone, Vec2::new(x, y), vel, tuning)
}

/// Push one batch of fruits. Returns how many were added.
///
/// Does nothing unless the session is running.
pub fn spawn_batch(state: &mut SessionState, tuning: &Tuning) -> u32 {
    if !state.is_playing() || tuning.batch_sizes.is_empty() {
        return 0;
    }
    let pick = state.rng.random_range(0..tuning.batch_sizes.len());
    let count = tuning.batch_sizes[pick];

    for _ in 0..count {
        let id = state.next_entity_id();
        let fruit = spawn_fruit(&mut state.rng, id, tuning, &state.viewport);
        state.fruits.push(fruit);
    }

    log::debug!(
        "Spawned {} fruits at tick {} ({} live)",
        count,
        state.time_ticks,
        state.fruits.len()
    );
    state.push_event(GameEvent::FruitsSpawned { count });
    count
}
