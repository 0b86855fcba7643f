//! Rendering surface abstraction
//!
//! The core decides what to draw and where; the host implements
//! [`RenderSurface`] on whatever backend it has (Canvas2D, a terminal,
//! a recording stub in tests).

use glam::Vec2;

use crate::settings::Settings;
use crate::sim::{FruitKind, Particle, SessionState};
use crate::sim::state::PopupTone;

/// Draw color
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Rgba(u8, u8, u8, f32),
    /// Hue in degrees, saturation and lightness in percent
    Hsl(f32, f32, f32),
}

impl Color {
    pub const LIME: Color = Color::Rgba(0, 255, 0, 1.0);
    pub const RED: Color = Color::Rgba(255, 0, 0, 1.0);
    pub const ICE_BLUE: Color = Color::Rgba(0, 191, 255, 1.0);
    pub const TRAIL: Color = Color::Rgba(255, 255, 255, 0.5);

    /// CSS color string
    pub fn to_css(&self) -> String {
        match self {
            Color::Rgba(r, g, b, a) => format!("rgba({}, {}, {}, {})", r, g, b, a),
            Color::Hsl(h, s, l) => format!("hsl({:.0}, {:.0}%, {:.0}%)", h, s, l),
        }
    }
}

/// Trail stroke width in pixels
pub const TRAIL_WIDTH: f32 = 3.0;

/// Backend the core draws through, once per simulation frame
pub trait RenderSurface {
    fn clear(&mut self);
    /// Draw a fruit glyph centered at `pos`
    fn draw_glyph(&mut self, kind: FruitKind, pos: Vec2);
    /// Draw a rotated, scaled glyph (sliced halves). Defaults to a plain glyph.
    fn draw_glyph_transformed(&mut self, kind: FruitKind, pos: Vec2, _rotation: f32, _scale: f32) {
        self.draw_glyph(kind, pos);
    }
    fn draw_circle(&mut self, pos: Vec2, radius: f32, color: Color, alpha: f32);
    fn draw_text(&mut self, text: &str, pos: Vec2, color: Color, alpha: f32);
    fn draw_polyline(&mut self, points: &[Vec2], color: Color, width: f32);
}

fn popup_color(tone: PopupTone) -> Color {
    match tone {
        PopupTone::Gain => Color::LIME,
        PopupTone::Loss => Color::RED,
        PopupTone::Frozen => Color::ICE_BLUE,
    }
}

/// Draw one frame: sparks, halves, fruits, trail, then score text on top
pub fn draw_frame(state: &SessionState, settings: &Settings, surface: &mut dyn RenderSurface) {
    surface.clear();

    for particle in &state.particles {
        if let Particle::Shine {
            pos, hue, size, life, ..
        } = particle
        {
            surface.draw_circle(*pos, *size, Color::Hsl(*hue, 100.0, 75.0), life.clamp(0.0, 1.0));
        }
    }

    for particle in &state.particles {
        if let Particle::Fragment {
            pos,
            kind,
            rotation,
            scale,
            ..
        } = particle
        {
            surface.draw_glyph_transformed(*kind, *pos, *rotation, *scale);
        }
    }

    for fruit in state.sliceable_fruits() {
        surface.draw_glyph(fruit.kind, fruit.center());
    }

    if settings.trails && state.path.len() > 1 {
        surface.draw_polyline(state.path.points(), Color::TRAIL, TRAIL_WIDTH);
    }

    for particle in &state.particles {
        if let Particle::ScorePopup {
            pos,
            text,
            tone,
            alpha,
        } = particle
        {
            surface.draw_text(text, *pos, popup_color(*tone), alpha.clamp(0.0, 1.0));
        }
    }
}

/// Surface that records draw calls (headless runs and tests)
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub clears: u32,
    pub glyphs: Vec<(FruitKind, Vec2)>,
    pub circles: u32,
    pub texts: Vec<String>,
    pub polylines: Vec<usize>,
}

impl RenderSurface for RecordingSurface {
    fn clear(&mut self) {
        self.clears += 1;
        self.glyphs.clear();
        self.circles = 0;
        self.texts.clear();
        self.polylines.clear();
    }

    fn draw_glyph(&mut self, kind: FruitKind, pos: Vec2) {
        self.glyphs.push((kind, pos));
    }

    fn draw_circle(&mut self, _pos: Vec2, _radius: f32, _color: Color, _alpha: f32) {
        self.circles += 1;
    }

    fn draw_text(&mut self, text: &str, _pos: Vec2, _color: Color, _alpha: f32) {
        self.texts.push(text.to_string());
    }

    fn draw_polyline(&mut self, points: &[Vec2], _color: Color, _width: f32) {
        self.polylines.push(points.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Fruit, SpawnZone, Viewport};
    use crate::tuning::Tuning;

    #[test]
    fn test_css_colors() {
        assert_eq!(Color::TRAIL.to_css(), "rgba(255, 255, 255, 0.5)");
        assert_eq!(Color::Hsl(120.4, 100.0, 75.0).to_css(), "hsl(120, 100%, 75%)");
    }

    #[test]
    fn test_frame_skips_sliced_fruit_and_draws_trail() {
        let tuning = Tuning::default();
        let settings = Settings::default();
        let mut state = SessionState::new(1, &tuning, Viewport::default(), 0);
        for (i, sliced) in [false, true].into_iter().enumerate() {
            let mut fruit = Fruit::new(
                i as u32,
                FruitKind::Orange,
                SpawnZone::Left,
                Vec2::new(100.0 * i as f32, 100.0),
                Vec2::ZERO,
                &tuning,
            );
            fruit.sliced = sliced;
            state.fruits.push(fruit);
        }
        state.particles.push(Particle::fragment(Vec2::ZERO, FruitKind::Orange, 1.0));
        state
            .particles
            .push(Particle::score_popup(Vec2::ZERO, "+3", PopupTone::Gain));
        state.path.begin(Vec2::ZERO);
        state.path.push(Vec2::new(50.0, 50.0));

        let mut surface = RecordingSurface::default();
        draw_frame(&state, &settings, &mut surface);
        assert_eq!(surface.clears, 1);
        // One live fruit plus one fragment (default transformed -> plain glyph)
        assert_eq!(surface.glyphs.len(), 2);
        assert_eq!(surface.texts, vec!["+3".to_string()]);
        assert_eq!(surface.polylines, vec![2]);
    }

    #[test]
    fn test_single_point_trail_not_drawn() {
        let tuning = Tuning::default();
        let mut state = SessionState::new(1, &tuning, Viewport::default(), 0);
        state.path.begin(Vec2::ZERO);
        let mut surface = RecordingSurface::default();
        draw_frame(&state, &Settings::default(), &mut surface);
        assert!(surface.polylines.is_empty());
    }
}
