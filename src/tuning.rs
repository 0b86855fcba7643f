//! Data-driven game balance
//!
//! Every number that shapes a session lives here so a host can ship a JSON
//! override without touching the simulation. Missing fields fall back to
//! the defaults below.

use serde::{Deserialize, Serialize};

use crate::secs_to_ticks;

/// Balance table for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Session length in countdown seconds
    pub session_secs: u32,
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,

    // === Fruit ===
    /// Side length of a fruit's bounding square
    pub fruit_size: f32,
    /// Swipe tolerance around the fruit center
    pub slice_radius: f32,
    /// Horizontal launch speed range (pixels/s, magnitude)
    pub launch_speed_x: (f32, f32),
    /// Upward launch speed range for left-edge fruits (pixels/s, magnitude)
    pub launch_speed_y_left: (f32, f32),
    /// Upward launch speed range for right-edge fruits (pixels/s, magnitude)
    pub launch_speed_y_right: (f32, f32),
    /// Fade rate of a sliced fruit before removal (per second)
    pub sliced_fade_rate: f32,

    // === Spawner ===
    /// Seconds between spawn batches
    pub spawn_period_secs: f32,
    /// Batch sizes, drawn uniformly
    pub batch_sizes: Vec<u32>,
    /// Kind weights in `FruitKind::ALL` order
    pub kind_weights: [u32; 6],

    // === Slicing ===
    /// Segments shorter than this are treated as pointer jitter
    pub min_swipe_distance: f32,
    /// Shine particles per sliced fruit
    pub shine_count: u32,
    /// Shine particles per sliced bomb
    pub bomb_shine_count: u32,

    // === Effects ===
    pub ice_duration_secs: f32,
    pub bomb_duration_secs: f32,
    pub ice_backdrop_restore_secs: f32,
    pub ice_overlay_fade_secs: f32,
    pub ice_overlay_remove_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            session_secs: 60,
            gravity: 1080.0,

            fruit_size: 220.0,
            slice_radius: 30.0,
            launch_speed_x: (180.0, 360.0),
            launch_speed_y_left: (360.0, 480.0),
            launch_speed_y_right: (480.0, 600.0),
            sliced_fade_rate: 6.0,

            spawn_period_secs: 1.5,
            batch_sizes: vec![6, 6, 6, 4],
            kind_weights: [30, 25, 20, 15, 5, 5],

            min_swipe_distance: 10.0,
            shine_count: 40,
            bomb_shine_count: 10,

            ice_duration_secs: 5.0,
            bomb_duration_secs: 2.0,
            ice_backdrop_restore_secs: 1.0,
            ice_overlay_fade_secs: 1.5,
            ice_overlay_remove_secs: 2.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON balance file
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn spawn_period_ticks(&self) -> u64 {
        secs_to_ticks(self.spawn_period_secs).max(1)
    }

    pub fn ice_duration_ticks(&self) -> u64 {
        secs_to_ticks(self.ice_duration_secs)
    }

    pub fn bomb_duration_ticks(&self) -> u64 {
        secs_to_ticks(self.bomb_duration_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_periods() {
        let t = Tuning::default();
        assert_eq!(t.spawn_period_ticks(), 90);
        assert_eq!(t.ice_duration_ticks(), 300);
        assert_eq!(t.bomb_duration_ticks(), 120);
        assert_eq!(t.kind_weights.iter().sum::<u32>(), 100);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "session_secs": 30, "batch_sizes": [4, 4, 4, 3] }"#)
            .unwrap();
        assert_eq!(t.session_secs, 30);
        assert_eq!(t.batch_sizes, vec![4, 4, 4, 3]);
        assert_eq!(t.kind_weights, Tuning::default().kind_weights);
        assert_eq!(t.slice_radius, 30.0);
    }

    #[test]
    fn test_json_rejects_garbage() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_json_roundtrip_preserves_everything() {
        let t = Tuning::default();
        let back = Tuning::from_json(&t.to_json().unwrap()).unwrap();
        assert_eq!(t, back);
    }
}
