//! Catfight entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, PointerEvent};

    use catfight::consts::*;
    use catfight::sim::{
        Arena, Body, Entity, GameEvent, GamePhase, GameState, ImpactKind, Presenter, Pursuer,
        TickInput, dispatch_all, tick,
    };
    use catfight::{HighScore, Settings, Tuning};
    use glam::Vec2;

    /// Milliseconds before a tap can restart a finished round
    const RESTART_DELAY_MS: f64 = 1500.0;
    /// Milliseconds a defeated pursuer fades before it is released
    const FADE_MS: f64 = 600.0;
    /// Milliseconds a floating score stays on screen
    const FLOATER_MS: f64 = 900.0;

    struct Floater {
        text: String,
        pos: Vec2,
        born: f64,
    }

    struct Fading {
        pursuer: Pursuer,
        born: f64,
    }

    /// Collects simulation events into visual effects
    struct WebPresenter {
        settings: Settings,
        now: f64,
        floaters: Vec<Floater>,
        fading: Vec<Fading>,
        shake: f32,
        ended: Option<(u64, bool)>,
    }

    impl WebPresenter {
        fn new(settings: Settings) -> Self {
            Self {
                settings,
                now: 0.0,
                floaters: Vec::new(),
                fading: Vec::new(),
                shake: 0.0,
                ended: None,
            }
        }

        fn reset(&mut self) {
            self.floaters.clear();
            self.fading.clear();
            self.shake = 0.0;
            self.ended = None;
        }
    }

    impl Presenter for WebPresenter {
        fn on_score(&mut self, total: u64, combo: u32, pos: Vec2) {
            if !self.settings.floating_scores {
                return;
            }
            let text = if combo > 1 {
                format!("+{} x{}", total, combo)
            } else {
                format!("+{}", total)
            };
            self.floaters.push(Floater {
                text,
                pos,
                born: self.now,
            });
        }

        fn on_impact(&mut self, kind: ImpactKind) {
            self.shake = self.shake.max(self.settings.shake_for(kind));
        }

        fn on_pursuer_removed(&mut self, pursuer: &Pursuer) {
            self.fading.push(Fading {
                pursuer: pursuer.clone(),
                born: self.now,
            });
        }

        fn on_session_ended(&mut self, final_score: u64, new_high_score: bool) {
            self.ended = Some((final_score, new_high_score));
        }

        fn on_phase_changed(&mut self, phase: GamePhase) {
            log::debug!("Phase changed: {:?}", phase);
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        tuning: Tuning,
        high_score: HighScore,
        presenter: WebPresenter,
        ctx: CanvasRenderingContext2d,
        canvas: HtmlCanvasElement,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        /// Earliest time (ms) a tap restarts after the round ended
        restart_at: Option<f64>,
    }

    impl Game {
        fn new_state(seed: u64, tuning: &Tuning, high_score: u64) -> Option<GameState> {
            let arena = Arena::for_viewport(VIEW_WIDTH, VIEW_HEIGHT).ok()?;
            match GameState::new(seed, arena, tuning.clone(), high_score) {
                Ok(mut state) => {
                    state.start();
                    Some(state)
                }
                Err(e) => {
                    log::error!("Failed to create session: {}", e);
                    None
                }
            }
        }

        /// Map a pointer event into logical arena space
        fn logical_pointer(&self, event: &PointerEvent) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            let w = rect.width().max(1.0) as f32;
            let h = rect.height().max(1.0) as f32;
            let x = (event.client_x() as f32 - rect.left() as f32) / w * VIEW_WIDTH;
            let y = (event.client_y() as f32 - rect.top() as f32) / h * VIEW_HEIGHT;
            Vec2::new(x, y)
        }

        fn restart(&mut self, seed: u64) {
            if let Some(state) = Self::new_state(seed, &self.tuning, self.high_score.best) {
                self.state = state;
                self.accumulator = 0.0;
                self.input = TickInput::default();
                self.restart_at = None;
                self.presenter.reset();
                log::info!("Game restarted with seed: {}", seed);
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Pointer samples are one-shot
                self.input.pointer = None;
            }

            self.presenter.now = time;
            let events = self.state.drain_events();
            let ended = events
                .iter()
                .any(|e| matches!(e, GameEvent::SessionEnded { .. }));
            dispatch_all(events, &mut self.presenter);

            if ended {
                if self.high_score.record(self.state.score) {
                    self.high_score.save();
                }
                self.restart_at = Some(time + RESTART_DELAY_MS);
            }

            // Release pursuers whose fade finished
            let mut finished = Vec::new();
            self.presenter.fading.retain(|f| {
                let done = time - f.born >= FADE_MS;
                if done {
                    finished.push(f.pursuer.id);
                }
                !done
            });
            for id in finished {
                self.state.finish_removal(id);
            }
            self.presenter
                .floaters
                .retain(|f| time - f.born < FLOATER_MS);
            self.presenter.shake = (self.presenter.shake - dt * 2.0).max(0.0);
        }

        /// Render the current frame
        fn render(&self, time: f64) {
            let ctx = &self.ctx;
            let sx = self.canvas.width() as f64 / VIEW_WIDTH as f64;
            let sy = self.canvas.height() as f64 / VIEW_HEIGHT as f64;
            let shake = self.presenter.shake as f64 * 6.0;
            let (ox, oy) = if shake > 0.0 {
                ((time * 0.05).sin() * shake, (time * 0.07).cos() * shake)
            } else {
                (0.0, 0.0)
            };
            let _ = ctx.set_transform(sx, 0.0, 0.0, sy, ox * sx, oy * sy);

            ctx.set_fill_style_str("#1b1325");
            ctx.fill_rect(0.0, 0.0, VIEW_WIDTH as f64, VIEW_HEIGHT as f64);

            // Arena
            let arena = &self.state.arena;
            ctx.begin_path();
            let _ = ctx.ellipse(
                arena.center.x as f64,
                arena.center.y as f64,
                arena.radius_x as f64,
                arena.radius_y as f64,
                0.0,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.set_fill_style_str("#3a2b4d");
            ctx.fill();
            ctx.set_stroke_style_str("#f2c14e");
            ctx.set_line_width(4.0);
            ctx.stroke();

            // Fading pursuers
            for f in &self.presenter.fading {
                let alpha = (1.0 - (time - f.born) / FADE_MS).clamp(0.0, 1.0);
                ctx.set_global_alpha(alpha);
                self.draw_body(f.pursuer.body(), "#8a8a8a");
            }
            ctx.set_global_alpha(1.0);

            // Live pursuers
            for pursuer in self.state.pursuers.iter().filter(|p| !p.is_removing()) {
                self.draw_body(pursuer.body(), "#c0563f");
            }

            // Player (blinks while invulnerable)
            let player = &self.state.player;
            if self.state.phase != GamePhase::Ended {
                let blink = player.invulnerable
                    && !self.presenter.settings.reduced_motion
                    && ((time / 100.0) as i64) % 2 == 0;
                if !blink {
                    self.draw_body(player.body(), "#f5a623");
                }
            }

            // Floating scores
            ctx.set_font("bold 20px sans-serif");
            ctx.set_text_align("center");
            for f in &self.presenter.floaters {
                let age = (time - f.born) / FLOATER_MS;
                ctx.set_global_alpha((1.0 - age).clamp(0.0, 1.0));
                ctx.set_fill_style_str("#ffffff");
                let _ = ctx.fill_text(&f.text, f.pos.x as f64, f.pos.y as f64 - age * 40.0);
            }
            ctx.set_global_alpha(1.0);
        }

        fn draw_body(&self, body: &Body, color: &str) {
            let ctx = &self.ctx;
            let radius = body.radius as f64;
            ctx.save();
            let _ = ctx.translate(body.pos.x as f64, body.pos.y as f64);
            let _ = ctx.rotate(body.rotation as f64);
            ctx.begin_path();
            let _ = ctx.arc(0.0, 0.0, radius, 0.0, std::f64::consts::TAU);
            ctx.set_fill_style_str(color);
            ctx.fill();
            // Heading marker
            ctx.begin_path();
            let _ = ctx.arc(radius * 0.6, 0.0, radius * 0.25, 0.0, std::f64::consts::TAU);
            ctx.set_fill_style_str("#ffffff");
            ctx.fill();
            ctx.restore();
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.score.to_string()));
            }

            if let Some(el) = document.query_selector("#hud-high .hud-value").ok().flatten() {
                let best = self.high_score.best.max(self.state.high_score);
                el.set_text_content(Some(&best.to_string()));
            }

            if let Some(el) = document.get_element_by_id("hud-combo") {
                if self.presenter.settings.show_combo && self.state.combo > 1 {
                    let _ = el.set_attribute("class", "hud-item");
                    let value = document.query_selector("#hud-combo .hud-value").ok().flatten();
                    if let Some(val) = value {
                        val.set_text_content(Some(&format!("x{}", self.state.combo)));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            if let Some(el) = document.get_element_by_id("game-over") {
                if let Some((final_score, new_high)) = self.presenter.ended {
                    let _ = el.set_attribute("class", "");
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&final_score.to_string()));
                    }
                    if let Some(badge) = document.get_element_by_id("new-high") {
                        let _ = badge.set_attribute("class", if new_high { "" } else { "hidden" });
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Catfight starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let dpr = window.device_pixel_ratio();
        canvas.set_width((canvas.client_width() as f64 * dpr) as u32);
        canvas.set_height((canvas.client_height() as f64 * dpr) as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let tuning = Tuning::load();
        let settings = Settings::load();
        let high_score = HighScore::load();

        let seed = js_sys::Date::now() as u64;
        let state = Game::new_state(seed, &tuning, high_score.best).ok_or("invalid arena")?;
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            state,
            tuning,
            high_score,
            presenter: WebPresenter::new(settings),
            ctx,
            canvas: canvas.clone(),
            accumulator: 0.0,
            last_time: 0.0,
            input: TickInput::default(),
            restart_at: None,
        }));

        setup_input_handlers(&canvas, game.clone());
        setup_motion_toggle(&document, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Catfight running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer down: steer, or restart once the round is over
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Ended {
                    let frame_time = g.last_time;
                    if g.restart_at.is_some_and(|at| frame_time >= at) {
                        g.restart(js_sys::Date::now() as u64);
                    }
                    return;
                }
                let target = g.logical_pointer(&event);
                g.input.pointer = Some(target);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer move: steers only while pressed
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                let target = g.logical_pointer(&event);
                let sample = TickInput::from_pointer(target, event.buttons() != 0);
                if sample.pointer.is_some() {
                    g.input = sample;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Drop the frame clock when the tab is hidden so we don't fast-forward
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    g.last_time = 0.0;
                    g.accumulator = 0.0;
                    log::info!("Tab hidden, frame clock reset");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    /// Reduced-motion button; the preference persists across sessions
    fn setup_motion_toggle(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(btn) = document.get_element_by_id("motion-toggle") else {
            return;
        };
        let label = |reduced: bool| if reduced { "Motion: reduced" } else { "Motion: full" };
        btn.set_text_content(Some(label(game.borrow().presenter.settings.reduced_motion)));

        let btn_clone = btn.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            event.stop_propagation();
            let mut g = game.borrow_mut();
            let reduced = g.presenter.settings.toggle_reduced_motion();
            g.presenter.settings.save();
            if reduced {
                g.presenter.shake = 0.0;
            }
            btn_clone.set_text_content(Some(label(reduced)));
            log::info!("Reduced motion: {}", reduced);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render(time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Catfight (native) starting...");
    log::info!("Native mode runs a headless demo - serve the wasm build for the playable version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted round with no window: the pointer circles the arena center
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use catfight::consts::SIM_DT;
    use catfight::sim::{
        Arena, GamePhase, GameState, ImpactKind, Presenter, Pursuer, TickInput, dispatch_all,
        tick,
    };
    use catfight::{HighScore, Tuning};
    use glam::Vec2;

    const MAX_TICKS: u64 = 60 * 120;
    const ORBIT_RADIUS: f32 = 90.0;

    #[derive(Default)]
    struct LogPresenter {
        pushes: u32,
        ring_outs: u32,
        ended: Option<(u64, bool)>,
    }

    impl Presenter for LogPresenter {
        fn on_score(&mut self, total: u64, combo: u32, pos: Vec2) {
            log::info!("+{} (combo {}) at ({:.0}, {:.0})", total, combo, pos.x, pos.y);
        }

        fn on_impact(&mut self, kind: ImpactKind) {
            match kind {
                ImpactKind::Push => self.pushes += 1,
                ImpactKind::RingOut => self.ring_outs += 1,
                _ => {}
            }
            log::debug!("Impact: {:?}", kind);
        }

        fn on_pursuer_removed(&mut self, pursuer: &Pursuer) {
            log::debug!("Pursuer {} defeated", pursuer.id);
        }

        fn on_session_ended(&mut self, final_score: u64, new_high_score: bool) {
            self.ended = Some((final_score, new_high_score));
        }
    }

    pub fn run(seed: u64) {
        let tuning = Tuning::load();
        let mut high_score = HighScore::load();
        let mut state = match GameState::new(seed, Arena::default(), tuning, high_score.best) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Failed to create session: {}", e);
                return;
            }
        };
        state.start();

        let mut presenter = LogPresenter::default();
        let center = state.arena.center;
        while state.time_ticks < MAX_TICKS && state.phase != GamePhase::Ended {
            let angle = state.time_ticks as f32 * 0.05;
            let input = TickInput {
                pointer: Some(center + Vec2::from_angle(angle) * ORBIT_RADIUS),
            };
            tick(&mut state, &input, SIM_DT);
            dispatch_all(state.drain_events(), &mut presenter);
        }

        if high_score.record(state.score) {
            high_score.save();
        }

        let seconds = state.time_ticks as f32 * SIM_DT;
        match presenter.ended {
            Some((score, new_high)) => println!(
                "Round over after {:.1}s ({:?}): score {}, pushes {}, ring-outs {}{}",
                seconds,
                state.end_reason,
                score,
                presenter.pushes,
                presenter.ring_outs,
                if new_high { ", new high score" } else { "" }
            ),
            None => println!(
                "Survived {:.1}s: score {}, pushes {}, ring-outs {}",
                seconds, state.score, presenter.pushes, presenter.ring_outs
            ),
        }
    }
}
