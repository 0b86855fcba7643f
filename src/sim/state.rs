//! Session state and core simulation types
//!
//! Everything one play-through mutates lives in [`SessionState`]. A new
//! session builds a fresh value, so nothing from a previous session can
//! reach into it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::Effects;
use super::slice::PointerPath;
use crate::session::OutcomeTier;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first session to start
    Ready,
    /// Tickers running, input accepted
    Playing,
    /// Countdown hit zero or the host ended the session (terminal)
    GameOver,
}

/// Fruit kinds, in weighted-draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FruitKind {
    Apple,
    Orange,
    Grape,
    Strawberry,
    Bomb,
    Ice,
}

impl FruitKind {
    /// Draw order for weighted selection (ties resolve to the earlier kind)
    pub const ALL: [FruitKind; 6] = [
        FruitKind::Apple,
        FruitKind::Orange,
        FruitKind::Grape,
        FruitKind::Strawberry,
        FruitKind::Bomb,
        FruitKind::Ice,
    ];

    /// Score delta awarded when sliced
    pub fn points(&self) -> i32 {
        match self {
            FruitKind::Apple => 1,
            FruitKind::Orange => 3,
            FruitKind::Grape => 5,
            FruitKind::Strawberry => 5,
            FruitKind::Bomb => -5,
            FruitKind::Ice => 2,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            FruitKind::Apple => "🍎",
            FruitKind::Orange => "🍊",
            FruitKind::Grape => "🍇",
            FruitKind::Strawberry => "🍓",
            FruitKind::Bomb => "💣",
            FruitKind::Ice => "❄️",
        }
    }
}

/// Screen edge a fruit launches from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnZone {
    Left,
    Right,
}

/// Visible play area in pixels (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: crate::consts::DEFAULT_WIDTH,
            height: crate::consts::DEFAULT_HEIGHT,
        }
    }
}

/// A sliceable entity on a ballistic arc
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fruit {
    pub id: u32,
    pub kind: FruitKind,
    /// Top-left corner of the bounding square
    pub pos: Vec2,
    pub vel: Vec2,
    /// Side length of the bounding square
    pub size: f32,
    /// Collision tolerance around the center
    pub slice_radius: f32,
    pub points: i32,
    /// Monotonic: once set, never cleared
    pub sliced: bool,
    pub zone: SpawnZone,
    /// 1.0 until sliced, then decays to 0 before removal
    pub fade: f32,
}

impl Fruit {
    pub fn new(id: u32, kind: FruitKind, zone: SpawnZone, pos: Vec2, vel: Vec2, tuning: &Tuning) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            size: tuning.fruit_size,
            slice_radius: tuning.slice_radius,
            points: kind.points(),
            sliced: false,
            zone,
            fade: 1.0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    /// Whether segment `[a, b]` passes within `slice_radius` of the center
    ///
    /// Always false once sliced. Does not mutate; the detector owns scoring.
    pub fn check_slice(&self, a: Vec2, b: Vec2) -> bool {
        if self.sliced {
            return false;
        }
        super::geometry::distance_point_to_segment(self.center(), a, b) < self.slice_radius
    }

    /// Integrate one step. Sliced fruits freeze in place and fade out.
    pub fn advance(&mut self, dt: f32, gravity: f32, fade_rate: f32) {
        if self.sliced {
            self.fade = (self.fade - fade_rate * dt).max(0.0);
            return;
        }
        self.vel.y += gravity * dt;
        self.pos += self.vel * dt;
    }

    /// Out of bounds, or sliced and fully faded
    pub fn is_expired(&self, viewport: &Viewport) -> bool {
        if self.sliced && self.fade <= 0.0 {
            return true;
        }
        self.pos.x > viewport.width || self.pos.x + self.size < 0.0 || self.pos.y > viewport.height
    }
}

// Shine spark tuning
const SHINE_MAX_SPEED: f32 = 300.0;
const SHINE_LIFE_DECAY: f32 = 1.2;
const SHINE_SHRINK: f32 = 6.0;
// Sliced halves
const FRAGMENT_SPEED_X: f32 = 180.0;
const FRAGMENT_SPEED_Y: f32 = -360.0;
const FRAGMENT_SPIN: f32 = 9.0;
/// Per-tick scale factor at 60 Hz
const FRAGMENT_SCALE_DECAY: f32 = 0.99;
// Floating score text
const POPUP_RISE: f32 = 60.0;
const POPUP_ALPHA_DECAY: f32 = 1.2;

/// How a score popup should be tinted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopupTone {
    Gain,
    Loss,
    Frozen,
}

/// Short-lived visual entities spawned by slices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Particle {
    /// Glowing spark flying out of a slice
    Shine {
        pos: Vec2,
        vel: Vec2,
        hue: f32,
        size: f32,
        life: f32,
    },
    /// One half of a sliced fruit tumbling off-screen
    Fragment {
        pos: Vec2,
        vel: Vec2,
        kind: FruitKind,
        rotation: f32,
        spin: f32,
        scale: f32,
    },
    /// Floating "+3" / "-5" text
    ScorePopup {
        pos: Vec2,
        text: String,
        tone: PopupTone,
        alpha: f32,
    },
}

impl Particle {
    pub fn shine<R: Rng>(origin: Vec2, rng: &mut R) -> Self {
        Particle::Shine {
            pos: origin,
            vel: Vec2::new(
                rng.random_range(-SHINE_MAX_SPEED..SHINE_MAX_SPEED),
                rng.random_range(-SHINE_MAX_SPEED..SHINE_MAX_SPEED),
            ),
            hue: rng.random_range(0.0..360.0),
            size: rng.random_range(4.0..12.0),
            life: 1.0,
        }
    }

    /// `direction` is -1.0 for the left half, 1.0 for the right half
    pub fn fragment(origin: Vec2, kind: FruitKind, direction: f32) -> Self {
        Particle::Fragment {
            pos: origin,
            vel: Vec2::new(FRAGMENT_SPEED_X * direction, FRAGMENT_SPEED_Y),
            kind,
            rotation: 0.0,
            spin: FRAGMENT_SPIN * direction,
            scale: 1.0,
        }
    }

    pub fn score_popup(origin: Vec2, text: impl Into<String>, tone: PopupTone) -> Self {
        Particle::ScorePopup {
            pos: origin,
            text: text.into(),
            tone,
            alpha: 1.0,
        }
    }

    pub fn pos(&self) -> Vec2 {
        match self {
            Particle::Shine { pos, .. }
            | Particle::Fragment { pos, .. }
            | Particle::ScorePopup { pos, .. } => *pos,
        }
    }

    pub fn advance(&mut self, dt: f32, gravity: f32) {
        match self {
            Particle::Shine {
                pos,
                vel,
                size,
                life,
                ..
            } => {
                *pos += *vel * dt;
                *life -= SHINE_LIFE_DECAY * dt;
                *size = (*size - SHINE_SHRINK * dt).max(0.0);
            }
            Particle::Fragment {
                pos,
                vel,
                rotation,
                spin,
                scale,
                ..
            } => {
                vel.y += gravity * dt;
                *pos += *vel * dt;
                *rotation += *spin * dt;
                *scale *= FRAGMENT_SCALE_DECAY.powf(dt * crate::consts::SIM_HZ as f32);
            }
            Particle::ScorePopup { pos, alpha, .. } => {
                pos.y -= POPUP_RISE * dt;
                *alpha -= POPUP_ALPHA_DECAY * dt;
            }
        }
    }

    pub fn is_expired(&self, viewport: &Viewport) -> bool {
        if self.pos().y > viewport.height {
            return true;
        }
        match self {
            Particle::Shine { life, .. } => *life <= 0.0,
            Particle::Fragment { .. } => false,
            Particle::ScorePopup { alpha, .. } => *alpha <= 0.0,
        }
    }
}

/// Events emitted for the presentation layer (drained by the host)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    SessionStarted {
        seed: u64,
        time_remaining: u32,
        high_score: i64,
    },
    FruitsSpawned {
        count: u32,
    },
    FruitSliced {
        kind: FruitKind,
        points: i32,
        pos: Vec2,
    },
    ScoreChanged {
        score: i64,
    },
    TimeChanged {
        time_remaining: u32,
    },
    TimeUp,
    IceStarted,
    /// Background tint fades back
    IceBackdropRestored,
    /// "Timer frozen" overlay starts fading
    IceOverlayFaded,
    IceOverlayRemoved,
    IceEnded,
    BombStarted {
        shake: bool,
    },
    BombEnded,
    SessionEnded {
        tier: OutcomeTier,
        final_score: i64,
        high_score: i64,
    },
}

/// Complete state of one session
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Seed this session's RNG started from
    pub seed: u64,
    pub rng: Pcg32,
    pub viewport: Viewport,
    /// May go negative through bombs
    pub score: i64,
    /// Best score known when the session started
    pub high_score: i64,
    /// Countdown seconds left
    pub time_remaining: u32,
    pub phase: GamePhase,
    /// Simulation ticks elapsed
    pub time_ticks: u64,
    /// Ticks since the last spawn batch
    pub spawn_phase: u64,
    /// Ticks since the last countdown decrement (frozen during ice)
    pub countdown_phase: u64,
    /// Live fruits, in spawn order
    pub fruits: Vec<Fruit>,
    /// Shine, fragment and popup particles, in emission order
    pub particles: Vec<Particle>,
    /// Current gesture
    pub path: PointerPath,
    pub effects: Effects,
    /// Pending presentation events
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl SessionState {
    pub fn new(seed: u64, tuning: &Tuning, viewport: Viewport, high_score: i64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            viewport,
            score: 0,
            high_score,
            time_remaining: tuning.session_secs,
            phase: GamePhase::Playing,
            time_ticks: 0,
            spawn_phase: 0,
            countdown_phase: 0,
            fruits: Vec::new(),
            particles: Vec::new(),
            path: PointerPath::default(),
            effects: Effects::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Append particles, dropping any beyond `cap`
    pub fn push_particles(&mut self, particles: impl IntoIterator<Item = Particle>, cap: usize) {
        let room = cap.saturating_sub(self.particles.len());
        self.particles.extend(particles.into_iter().take(room));
    }

    /// Iterate live fruits that can still be sliced
    pub fn sliceable_fruits(&self) -> impl Iterator<Item = &Fruit> {
        self.fruits.iter().filter(|f| !f.sliced)
    }
}
