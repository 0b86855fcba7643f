//! Local high-score cell
//!
//! One durable integer: the best session score on this device. Persisted
//! to LocalStorage on the web and to a small JSON file natively. Storage
//! failures are logged and read back as 0; they never reach the session.

use serde::{Deserialize, Serialize};

/// Durable single-value high-score storage
pub trait HighScoreCell {
    fn get(&self) -> i64;
    fn set(&mut self, score: i64);
}

/// Envelope version written alongside the score
const ENVELOPE_VERSION: u32 = 1;

/// On-disk / LocalStorage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct HighScoreEnvelope {
    version: u32,
    high_score: i64,
}

impl HighScoreEnvelope {
    fn new(high_score: i64) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            high_score,
        }
    }

    /// Parse an envelope, accepting a bare integer from older saves
    fn parse(raw: &str) -> Option<i64> {
        if let Ok(envelope) = serde_json::from_str::<HighScoreEnvelope>(raw) {
            return Some(envelope.high_score);
        }
        raw.trim().parse::<i64>().ok()
    }
}

/// Volatile cell (tests, hosts without storage)
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryHighScoreCell {
    value: i64,
}

impl MemoryHighScoreCell {
    pub fn new(value: i64) -> Self {
        Self { value }
    }
}

impl HighScoreCell for MemoryHighScoreCell {
    fn get(&self) -> i64 {
        self.value
    }

    fn set(&mut self, score: i64) {
        self.value = score;
    }
}

/// JSON file cell; writes go to a temp file and are renamed into place
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileHighScoreCell {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileHighScoreCell {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn write(&self, score: i64) -> std::io::Result<()> {
        let json = serde_json::to_string(&HighScoreEnvelope::new(score))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl HighScoreCell for JsonFileHighScoreCell {
    fn get(&self) -> i64 {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => HighScoreEnvelope::parse(&raw).unwrap_or_else(|| {
                log::warn!("Corrupt high score file {}, starting at 0", self.path.display());
                0
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => {
                log::warn!("Failed to read high score {}: {}", self.path.display(), e);
                0
            }
        }
    }

    fn set(&mut self, score: i64) {
        match self.write(score) {
            Ok(()) => log::info!("High score {} saved to {}", score, self.path.display()),
            Err(e) => log::warn!("Failed to save high score {}: {}", self.path.display(), e),
        }
    }
}

/// Browser LocalStorage cell
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageHighScoreCell;

#[cfg(target_arch = "wasm32")]
impl LocalStorageHighScoreCell {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "highScore";

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl HighScoreCell for LocalStorageHighScoreCell {
    fn get(&self) -> i64 {
        if let Some(storage) = Self::storage() {
            if let Ok(Some(raw)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(score) = HighScoreEnvelope::parse(&raw) {
                    log::info!("Loaded high score {}", score);
                    return score;
                }
            }
        }
        log::info!("No high score found, starting fresh");
        0
    }

    fn set(&mut self, score: i64) {
        let Some(storage) = Self::storage() else {
            log::warn!("LocalStorage unavailable, high score not saved");
            return;
        };
        if let Ok(json) = serde_json::to_string(&HighScoreEnvelope::new(score)) {
            match storage.set_item(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("High score {} saved", score),
                Err(e) => log::warn!("Failed to save high score: {:?}", e),
            }
        }
    }
}
