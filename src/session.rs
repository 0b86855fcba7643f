//! Session controller
//!
//! Owns the current [`SessionState`] and the two persistence collaborators.
//! Hosts feed it frame deltas and pointer samples, draw through
//! [`Game::render`], and read presentation events from
//! [`Game::drain_events`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::highscores::HighScoreCell;
use crate::persistence::ScoreStore;
use crate::render::{RenderSurface, draw_frame};
use crate::settings::Settings;
use crate::sim::{
    GameEvent, GamePhase, SessionState, SliceOutcome, Viewport, handle_slice, tick,
};
use crate::tuning::Tuning;

/// End-of-session message tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeTier {
    KeepTrying,
    AlmostThere,
    WellDone,
    NewHighScore,
}

impl OutcomeTier {
    /// Classify `score` against the high score held before the session
    ///
    /// Checked in order: below half, below, equal, above. A previous high
    /// score of 0 with a final score of 0 is "Well done".
    pub fn classify(score: i64, previous_high: i64) -> Self {
        if (score as f64) < previous_high as f64 * 0.5 {
            OutcomeTier::KeepTrying
        } else if score < previous_high {
            OutcomeTier::AlmostThere
        } else if score == previous_high {
            OutcomeTier::WellDone
        } else {
            OutcomeTier::NewHighScore
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            OutcomeTier::KeepTrying => "Keep trying!",
            OutcomeTier::AlmostThere => "Almost there!",
            OutcomeTier::WellDone => "Well done!",
            OutcomeTier::NewHighScore => "New High Score!",
        }
    }

    pub fn body(&self, score: i64, previous_high: i64) -> String {
        match self {
            OutcomeTier::KeepTrying => format!(
                "You scored {score} points. Your high score is {previous_high}. Practice makes perfect!"
            ),
            OutcomeTier::AlmostThere => format!(
                "You scored {score} points, but your high score is {previous_high}. You're close, keep pushing!"
            ),
            OutcomeTier::WellDone => {
                format!("You scored {score} points and matched your high score!")
            }
            OutcomeTier::NewHighScore => format!(
                "You scored {score} points, beating your previous high score of {previous_high}! Outstanding performance!"
            ),
        }
    }
}

/// Result of a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub final_score: i64,
    /// Best score known when the session started
    pub previous_high_score: i64,
    /// Best score after this session
    pub high_score: i64,
    pub tier: OutcomeTier,
    /// Cumulative total reported by the score store (None if it failed)
    pub store_total: Option<i64>,
}

/// Static wiring for a [`Game`]
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Base seed; each session derives its own from it
    pub seed: u64,
    pub user_id: String,
    pub viewport: Viewport,
    pub tuning: Tuning,
    pub settings: Settings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            user_id: "local".to_string(),
            viewport: Viewport::default(),
            tuning: Tuning::default(),
            settings: Settings::default(),
        }
    }
}

/// Per-session seed: consecutive sessions differ but stay reproducible
fn session_seed(base: u64, session: u64) -> u64 {
    base.wrapping_add(session.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Game instance: one live session plus its collaborators
pub struct Game {
    config: GameConfig,
    store: Box<dyn ScoreStore>,
    cell: Box<dyn HighScoreCell>,
    state: SessionState,
    sessions_started: u64,
    accumulator: f32,
    summary: Option<SessionSummary>,
}

impl Game {
    pub fn new(
        config: GameConfig,
        store: Box<dyn ScoreStore>,
        cell: Box<dyn HighScoreCell>,
    ) -> Self {
        let mut state = SessionState::new(config.seed, &config.tuning, config.viewport, cell.get());
        state.phase = GamePhase::Ready;
        Self {
            config,
            store,
            cell,
            state,
            sessions_started: 0,
            accumulator: 0.0,
            summary: None,
        }
    }

    /// Reset everything and start the tickers
    ///
    /// The previous session's state (entities, effect deadlines, ticker
    /// phases) is dropped wholesale, so nothing pending from it can fire.
    /// Undrained events carry over.
    pub fn start_session(&mut self) {
        let local = self.cell.get();
        let high_score = match self.store.read_high_score(&self.config.user_id) {
            Ok(remote) => remote.max(local),
            Err(e) => {
                log::warn!("Remote high score unavailable, using local {}: {}", local, e);
                local
            }
        };

        self.sessions_started += 1;
        let seed = session_seed(self.config.seed, self.sessions_started);
        let carried = std::mem::take(&mut self.state.events);
        self.state = SessionState::new(seed, &self.config.tuning, self.config.viewport, high_score);
        self.state.events = carried;
        self.state.push_event(GameEvent::SessionStarted {
            seed,
            time_remaining: self.state.time_remaining,
            high_score,
        });
        self.accumulator = 0.0;
        self.summary = None;

        log::info!(
            "Session {} started (seed {}, high score {})",
            self.sessions_started,
            seed,
            high_score
        );
    }

    /// Stop the tickers, settle the high score and hand the score off
    ///
    /// Idempotent: a second call returns the same summary. Returns `None` if
    /// no session was ever started.
    pub fn end_session(&mut self) -> Option<SessionSummary> {
        if let Some(summary) = &self.summary {
            return Some(summary.clone());
        }
        if self.state.phase == GamePhase::Ready {
            return None;
        }

        self.state.phase = GamePhase::GameOver;
        self.state.path.end();
        self.accumulator = 0.0;

        let final_score = self.state.score;
        let previous_high_score = self.state.high_score;
        let tier = OutcomeTier::classify(final_score, previous_high_score);

        if final_score > self.cell.get() {
            self.cell.set(final_score);
        }
        let high_score = final_score.max(previous_high_score);

        let store_total = match self
            .store
            .commit_session_score(&self.config.user_id, final_score)
        {
            Ok(receipt) => {
                log::info!(
                    "Score {} committed for {} (total {}, best {})",
                    final_score,
                    self.config.user_id,
                    receipt.total,
                    receipt.high_score
                );
                Some(receipt.total)
            }
            Err(e) => {
                log::warn!("Score commit failed, keeping local result: {}", e);
                None
            }
        };

        self.state.push_event(GameEvent::SessionEnded {
            tier,
            final_score,
            high_score,
        });
        log::info!(
            "Session {} ended: score {} ({:?}, high {})",
            self.sessions_started,
            final_score,
            tier,
            high_score
        );

        let summary = SessionSummary {
            final_score,
            previous_high_score,
            high_score,
            tier,
            store_total,
        };
        self.summary = Some(summary.clone());
        Some(summary)
    }

    /// Run as many fixed ticks as `dt` seconds cover
    ///
    /// Returns the number of ticks run. Ends the session when time runs out.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.state.is_playing() || !dt.is_finite() {
            return 0;
        }
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
            if !self.step() {
                break;
            }
        }
        substeps
    }

    /// Run exactly `ticks` fixed ticks (headless drivers, tests)
    pub fn step_ticks(&mut self, ticks: u32) -> u32 {
        let mut ran = 0;
        while ran < ticks && self.state.is_playing() {
            ran += 1;
            if !self.step() {
                break;
            }
        }
        ran
    }

    /// One tick; false once the session is over
    fn step(&mut self) -> bool {
        tick(&mut self.state, &self.config.tuning, &self.config.settings, SIM_DT);
        if self.state.is_over() {
            self.end_session();
            return false;
        }
        true
    }

    /// Gesture start
    pub fn pointer_down(&mut self, pos: Vec2) {
        self.state.path.begin(pos);
    }

    /// Gesture sample: extend the path and test its newest segment
    pub fn pointer_move(&mut self, pos: Vec2) -> SliceOutcome {
        if !self.state.path.push(pos) {
            return SliceOutcome::Ignored;
        }
        handle_slice(&mut self.state, &self.config.tuning, &self.config.settings)
    }

    /// Gesture end
    pub fn pointer_up(&mut self) {
        self.state.path.end();
    }

    pub fn render(&self, surface: &mut dyn RenderSurface) {
        draw_frame(&self.state, &self.config.settings, surface);
    }

    /// Take pending presentation events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    /// Window resize
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.config.viewport = viewport;
        self.state.viewport = viewport;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> i64 {
        self.state.score
    }

    pub fn time_remaining(&self) -> u32 {
        self.state.time_remaining
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.config.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.config.settings
    }

    pub fn tuning(&self) -> &Tuning {
        &self.config.tuning
    }

    pub fn local_high_score(&self) -> i64 {
        self.cell.get()
    }
}
