//! Demo autopilot
//!
//! Plays a session through the same pointer API a player uses: pick the
//! safe fruit closest to where the last swipe ended, swipe through it,
//! wait a reaction delay, repeat.
//! Used by the headless host and as attract mode.

use glam::Vec2;

use crate::session::Game;
use crate::sim::{Fruit, FruitKind, SliceOutcome};

/// Half-length of a planned swipe
const SWIPE_REACH: f32 = 60.0;

/// Scripted player
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Ticks to wait after each swipe
    pub reaction_ticks: u32,
    cooldown: u32,
    swipes: u32,
    /// Where the last swipe ended
    last_pos: Option<Vec2>,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(12)
    }
}

impl Autopilot {
    pub fn new(reaction_ticks: u32) -> Self {
        Self {
            reaction_ticks,
            cooldown: 0,
            swipes: 0,
            last_pos: None,
        }
    }

    /// Swipes performed so far
    pub fn swipes(&self) -> u32 {
        self.swipes
    }

    /// Call once per simulation tick. Returns the slice outcome if it swiped.
    pub fn drive(&mut self, game: &mut Game) -> Option<SliceOutcome> {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return None;
        }
        if !game.state().is_playing()
            || game
                .state()
                .effects
                .input_blocked(&game.settings().effect_policy)
        {
            return None;
        }

        let (from, to) = plan_swipe(game, self.last_pos)?;
        game.pointer_down(from);
        let outcome = game.pointer_move(to);
        game.pointer_up();

        self.swipes += 1;
        self.last_pos = Some(to);
        self.cooldown = self.reaction_ticks;
        log::trace!("Autopilot swipe {} -> {:?}", self.swipes, outcome);
        Some(outcome)
    }
}

/// Segment through the nearest target that crosses no bomb
///
/// Positions are the ones the next slice check will see, so the fruit's
/// current center is where it will be hit.
fn plan_swipe(game: &Game, anchor: Option<Vec2>) -> Option<(Vec2, Vec2)> {
    let state = game.state();
    let anchor =
        anchor.unwrap_or_else(|| Vec2::new(state.viewport.width, state.viewport.height) / 2.0);
    let on_screen = |c: Vec2| {
        c.x >= 0.0 && c.y >= 0.0 && c.x <= state.viewport.width && c.y <= state.viewport.height
    };
    let bombs: Vec<&Fruit> = state
        .sliceable_fruits()
        .filter(|f| f.kind == FruitKind::Bomb)
        .collect();
    let crosses_bomb = |a: Vec2, b: Vec2| bombs.iter().any(|bomb| bomb.check_slice(a, b));

    let mut targets: Vec<&Fruit> = state
        .sliceable_fruits()
        .filter(|f| f.kind != FruitKind::Bomb && on_screen(f.center()))
        .collect();
    targets.sort_by(|a, b| {
        a.center()
            .distance_squared(anchor)
            .partial_cmp(&b.center().distance_squared(anchor))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for fruit in targets {
        let c = fruit.center();
        for dir in [Vec2::X, Vec2::Y, Vec2::new(1.0, 1.0).normalize()] {
            let (a, b) = (c - dir * SWIPE_REACH, c + dir * SWIPE_REACH);
            if !crosses_bomb(a, b) {
                return Some((a, b));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::MemoryHighScoreCell;
    use crate::persistence::MemoryScoreStore;
    use crate::session::GameConfig;
    use crate::sim::SpawnZone;

    fn started() -> Game {
        let mut game = Game::new(
            GameConfig::default(),
            Box::new(MemoryScoreStore::new()),
            Box::new(MemoryHighScoreCell::default()),
        );
        game.start_session();
        game
    }

    fn place(game: &mut Game, kind: FruitKind, center: Vec2) {
        let tuning = game.tuning().clone();
        let state = game.state_mut();
        let id = state.next_entity_id();
        let pos = center - Vec2::splat(tuning.fruit_size / 2.0);
        state
            .fruits
            .push(Fruit::new(id, kind, SpawnZone::Left, pos, Vec2::ZERO, &tuning));
    }

    #[test]
    fn test_slices_a_fruit() {
        let mut game = started();
        place(&mut game, FruitKind::Orange, Vec2::new(640.0, 360.0));
        let mut pilot = Autopilot::default();
        let outcome = pilot.drive(&mut game);
        assert_eq!(outcome, Some(SliceOutcome::Hit { count: 1, score_delta: 3 }));
        assert_eq!(game.score(), 3);
        assert!(game.state().path.is_empty());
    }

    #[test]
    fn test_never_targets_bombs() {
        let mut game = started();
        place(&mut game, FruitKind::Bomb, Vec2::new(640.0, 360.0));
        let mut pilot = Autopilot::new(0);
        for _ in 0..10 {
            assert_eq!(pilot.drive(&mut game), None);
        }
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_swipes_around_adjacent_bomb() {
        let mut game = started();
        place(&mut game, FruitKind::Apple, Vec2::new(640.0, 360.0));
        place(&mut game, FruitKind::Bomb, Vec2::new(690.0, 360.0));
        let mut pilot = Autopilot::new(0);
        let outcome = pilot.drive(&mut game);
        assert_eq!(outcome, Some(SliceOutcome::Hit { count: 1, score_delta: 1 }));
        assert!(game.state().effects.bomb.is_none());
    }

    #[test]
    fn test_waits_reaction_delay() {
        let mut game = started();
        place(&mut game, FruitKind::Apple, Vec2::new(300.0, 300.0));
        place(&mut game, FruitKind::Apple, Vec2::new(900.0, 300.0));
        let mut pilot = Autopilot::new(3);
        assert!(pilot.drive(&mut game).is_some());
        for _ in 0..3 {
            assert!(pilot.drive(&mut game).is_none());
        }
        assert!(pilot.drive(&mut game).is_some());
        assert_eq!(pilot.swipes(), 2);
        assert_eq!(game.score(), 2);
    }

    #[test]
    fn test_idle_before_session() {
        let mut game = Game::new(
            GameConfig::default(),
            Box::new(MemoryScoreStore::new()),
            Box::new(MemoryHighScoreCell::default()),
        );
        place(&mut game, FruitKind::Apple, Vec2::new(640.0, 360.0));
        assert!(Autopilot::new(0).drive(&mut game).is_none());
    }

    #[test]
    fn test_plays_a_whole_session() {
        let mut game = started();
        let mut pilot = Autopilot::new(6);
        while game.state().is_playing() {
            pilot.drive(&mut game);
            game.step_ticks(1);
        }
        assert!(pilot.swipes() > 0);
        assert!(game.summary().is_some());
    }
}
