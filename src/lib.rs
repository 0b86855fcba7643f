//! Fruit Slash - An emoji fruit-slicing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, slicing, effects, tickers)
//! - `session`: Session lifecycle, scoring handoff, outcome tiers
//! - `render`: Rendering surface abstraction (host draws, core decides what)
//! - `persistence`: Remote score store collaborator
//! - `highscores`: Local durable high-score cell
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences and effect policy
//! - `autopilot`: Scripted player for demo and headless runs

pub mod autopilot;
pub mod highscores;
pub mod persistence;
pub mod render;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScoreCell;
pub use persistence::{ScoreStore, StoreError};
pub use session::{Game, GameConfig, OutcomeTier};
pub use settings::{EffectPolicy, QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Simulation rate
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep (60 Hz, one countdown second = 60 ticks)
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the host accumulator accepts (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default viewport used by headless hosts and tests
    pub const DEFAULT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_HEIGHT: f32 = 720.0;
}

/// Convert a duration in seconds into whole simulation ticks
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    (secs * consts::SIM_HZ as f32).round().max(0.0) as u64
}
