//! Fruit Slash entry point
//!
//! Web: Canvas2D host driven by requestAnimationFrame.
//! Native: headless demo session played by the autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent, TouchEvent};

    use fruit_slash::consts::SIM_DT;
    use fruit_slash::highscores::LocalStorageHighScoreCell;
    use fruit_slash::persistence::MemoryScoreStore;
    use fruit_slash::render::{Color, RenderSurface};
    use fruit_slash::sim::{FruitKind, GameEvent, Viewport};
    use fruit_slash::{Game, GameConfig, QualityPreset, Settings};

    /// Glyph font size in CSS pixels
    const GLYPH_FONT: &str = "110px serif";
    const TEXT_FONT: &str = "bold 28px sans-serif";

    /// Canvas2D implementation of the render surface
    struct CanvasSurface {
        ctx: CanvasRenderingContext2d,
        width: f64,
        height: f64,
    }

    impl RenderSurface for CanvasSurface {
        fn clear(&mut self) {
            self.ctx.set_global_alpha(1.0);
            self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
        }

        fn draw_glyph(&mut self, kind: FruitKind, pos: Vec2) {
            self.ctx.set_global_alpha(1.0);
            self.ctx.set_font(GLYPH_FONT);
            self.ctx.set_text_align("center");
            self.ctx.set_text_baseline("middle");
            let _ = self.ctx.fill_text(kind.emoji(), pos.x as f64, pos.y as f64);
        }

        fn draw_glyph_transformed(&mut self, kind: FruitKind, pos: Vec2, rotation: f32, scale: f32) {
            self.ctx.save();
            let _ = self.ctx.translate(pos.x as f64, pos.y as f64);
            let _ = self.ctx.rotate(rotation as f64);
            let _ = self.ctx.scale(scale as f64, scale as f64);
            self.draw_glyph(kind, Vec2::ZERO);
            self.ctx.restore();
        }

        fn draw_circle(&mut self, pos: Vec2, radius: f32, color: Color, alpha: f32) {
            self.ctx.set_global_alpha(alpha as f64);
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.begin_path();
            let _ = self.ctx.arc(
                pos.x as f64,
                pos.y as f64,
                radius.max(0.0) as f64,
                0.0,
                std::f64::consts::TAU,
            );
            self.ctx.fill();
        }

        fn draw_text(&mut self, text: &str, pos: Vec2, color: Color, alpha: f32) {
            self.ctx.set_global_alpha(alpha as f64);
            self.ctx.set_font(TEXT_FONT);
            self.ctx.set_text_align("center");
            self.ctx.set_fill_style_str(&color.to_css());
            let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
        }

        fn draw_polyline(&mut self, points: &[Vec2], color: Color, width: f32) {
            let Some((first, rest)) = points.split_first() else {
                return;
            };
            self.ctx.set_global_alpha(1.0);
            self.ctx.set_stroke_style_str(&color.to_css());
            self.ctx.set_line_width(width as f64);
            self.ctx.begin_path();
            self.ctx.move_to(first.x as f64, first.y as f64);
            for p in rest {
                self.ctx.line_to(p.x as f64, p.y as f64);
            }
            self.ctx.stroke();
        }
    }

    /// Host-side wrapper: game plus browser plumbing
    struct WebHost {
        game: Game,
        surface: CanvasSurface,
        canvas: HtmlCanvasElement,
        last_time: f64,
    }

    impl WebHost {
        /// Pointer position relative to the canvas
        fn canvas_pos(&self, client_x: i32, client_y: i32) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            Vec2::new(
                (client_x as f64 - rect.left()) as f32,
                (client_y as f64 - rect.top()) as f32,
            )
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;

            self.game.advance(dt);
            self.game.render(&mut self.surface);

            let events = self.game.drain_events();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                for event in &events {
                    apply_event(&document, &self.game, event);
                }
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_class(document: &Document, class: &str, on: bool) {
        if let Some(body) = document.body() {
            let list = body.class_list();
            let _ = if on { list.add_1(class) } else { list.remove_1(class) };
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    /// Reflect one core event in the DOM
    fn apply_event(document: &Document, game: &Game, event: &GameEvent) {
        match event {
            GameEvent::SessionStarted {
                time_remaining,
                high_score,
                ..
            } => {
                set_text(document, "score", "0");
                set_text(document, "timer", &time_remaining.to_string());
                set_text(document, "high-score", &high_score.to_string());
                set_hidden(document, "game-over", true);
                set_class(document, "frozen", false);
                set_class(document, "timer-frozen", false);
                set_class(document, "shake", false);
            }
            GameEvent::ScoreChanged { score } => set_text(document, "score", &score.to_string()),
            GameEvent::TimeChanged { time_remaining } => {
                set_text(document, "timer", &time_remaining.to_string())
            }
            GameEvent::IceStarted => {
                set_class(document, "frozen", true);
                set_class(document, "timer-frozen", true);
            }
            GameEvent::IceBackdropRestored => set_class(document, "frozen", false),
            GameEvent::IceOverlayFaded => set_class(document, "timer-fading", true),
            GameEvent::IceOverlayRemoved => {
                set_class(document, "timer-frozen", false);
                set_class(document, "timer-fading", false);
            }
            GameEvent::BombStarted { shake } => {
                set_class(document, "bomb", true);
                set_class(document, "shake", *shake);
            }
            GameEvent::BombEnded => {
                set_class(document, "bomb", false);
                set_class(document, "shake", false);
            }
            GameEvent::SessionEnded {
                tier,
                final_score,
                high_score,
            } => {
                let previous = game
                    .summary()
                    .map(|s| s.previous_high_score)
                    .unwrap_or(*high_score);
                set_text(document, "outcome-header", tier.header());
                set_text(document, "outcome-body", &tier.body(*final_score, previous));
                set_text(document, "high-score", &high_score.to_string());
                set_hidden(document, "game-over", false);
            }
            GameEvent::FruitsSpawned { .. }
            | GameEvent::FruitSliced { .. }
            | GameEvent::TimeUp
            | GameEvent::IceEnded => {}
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Fruit Slash starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let width = window.inner_width()?.as_f64().unwrap_or(1280.0);
        let height = window.inner_height()?.as_f64().unwrap_or(720.0);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let config = GameConfig {
            seed,
            viewport: Viewport {
                width: width as f32,
                height: height as f32,
            },
            settings: Settings::load(),
            ..Default::default()
        };
        let game = Game::new(
            config,
            Box::new(MemoryScoreStore::new()),
            Box::new(LocalStorageHighScoreCell),
        );
        log::info!("Game initialized with seed: {}", seed);

        let host = Rc::new(RefCell::new(WebHost {
            game,
            surface: CanvasSurface { ctx, width, height },
            canvas: canvas.clone(),
            last_time: 0.0,
        }));

        setup_input_handlers(&canvas, host.clone());
        setup_resize(host.clone());
        setup_start_buttons(&document, host.clone());
        setup_quality_buttons(&document, host.clone());

        request_animation_frame(host);
        log::info!("Fruit Slash running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, host: Rc<RefCell<WebHost>>) {
        // Mouse
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut h = host.borrow_mut();
                let pos = h.canvas_pos(event.client_x(), event.client_y());
                h.game.pointer_down(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut h = host.borrow_mut();
                let pos = h.canvas_pos(event.client_x(), event.client_y());
                h.game.pointer_move(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        for name in ["mouseup", "mouseleave", "touchend", "touchcancel"] {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                host.borrow_mut().game.pointer_up();
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch (first finger only)
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut h = host.borrow_mut();
                    let pos = h.canvas_pos(touch.client_x(), touch.client_y());
                    h.game.pointer_down(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut h = host.borrow_mut();
                    let pos = h.canvas_pos(touch.client_x(), touch.client_y());
                    h.game.pointer_move(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Keep canvas, surface and simulation viewport in sync with the window
    fn setup_resize(host: Rc<RefCell<WebHost>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (Some(width), Some(height)) = (
                window.inner_width().ok().and_then(|w| w.as_f64()),
                window.inner_height().ok().and_then(|h| h.as_f64()),
            ) else {
                return;
            };
            let mut h = host.borrow_mut();
            h.canvas.set_width(width as u32);
            h.canvas.set_height(height as u32);
            h.surface.width = width;
            h.surface.height = height;
            h.game.set_viewport(Viewport {
                width: width as f32,
                height: height as f32,
            });
            log::info!("Resized to {}x{}", width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Quality buttons (`quality-low`, `quality-medium`, `quality-high`)
    fn setup_quality_buttons(document: &Document, host: Rc<RefCell<WebHost>>) {
        set_text(document, "quality-label", host.borrow().game.settings().quality.as_str());
        for name in ["low", "medium", "high"] {
            let Some(btn) = document.get_element_by_id(&format!("quality-{name}")) else {
                continue;
            };
            let Some(preset) = QualityPreset::parse(name) else {
                continue;
            };
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut h = host.borrow_mut();
                h.game.settings_mut().quality = preset;
                h.game.settings().save();
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    set_text(&document, "quality-label", preset.as_str());
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Start and restart buttons both begin a fresh session
    fn setup_start_buttons(document: &Document, host: Rc<RefCell<WebHost>>) {
        for id in ["start-btn", "restart-btn"] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut h = host.borrow_mut();
                h.game.start_session();
                h.last_time = 0.0;
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    set_hidden(&document, "start-screen", true);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(host: Rc<RefCell<WebHost>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(host: Rc<RefCell<WebHost>>, time: f64) {
        host.borrow_mut().frame(time);
        request_animation_frame(host);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use fruit_slash::autopilot::Autopilot;
    use fruit_slash::highscores::JsonFileHighScoreCell;
    use fruit_slash::persistence::MemoryScoreStore;
    use fruit_slash::render::RecordingSurface;
    use fruit_slash::{Game, GameConfig, QualityPreset, Settings, Tuning};

    env_logger::init();
    log::info!("Fruit Slash (native) starting...");
    log::info!("Native mode runs a headless autopilot session - run with `trunk serve` to play");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring tuning file {}: {}", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let quality = match args.next() {
        Some(name) => QualityPreset::parse(&name).unwrap_or_else(|| {
            log::warn!("Unknown quality preset {}, using Medium", name);
            QualityPreset::Medium
        }),
        None => QualityPreset::default(),
    };
    log::info!("Seed {}, quality {}", seed, quality.as_str());

    let config = GameConfig {
        seed,
        tuning,
        settings: Settings::from_preset(quality),
        ..Default::default()
    };
    let cell = JsonFileHighScoreCell::new(std::env::temp_dir().join("fruit_slash_high_score.json"));
    let mut game = Game::new(config, Box::new(MemoryScoreStore::new()), Box::new(cell));
    let mut pilot = Autopilot::default();
    let mut surface = RecordingSurface::default();

    game.start_session();
    while game.state().is_playing() {
        pilot.drive(&mut game);
        game.step_ticks(1);
        game.render(&mut surface);
        for event in game.drain_events() {
            log::debug!("{:?}", event);
        }
    }

    match game.summary() {
        Some(summary) => {
            println!("{}", summary.tier.header());
            println!(
                "{}",
                summary.tier.body(summary.final_score, summary.previous_high_score)
            );
            println!("Swipes: {}", pilot.swipes());
        }
        None => log::error!("Session ended without a summary"),
    }
}
