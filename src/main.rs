//! Island Crisis entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use island_crisis::consts::*;
    use island_crisis::persistence;
    use island_crisis::platform::input::is_mobile_user_agent;
    use island_crisis::platform::{InputAggregator, Key, KeyValueStore, LocalStore, MemoryStore};
    use island_crisis::renderer::{Shape, build_scene};
    use island_crisis::sim::{GameEvent, GameState, Viewport, tick};
    use island_crisis::ui::{
        Banner, Hud, MenuItem, Overlay, PAUSE_OVERLAY_ALPHA, PauseChoice, PauseMenu, TitleChoice,
        TitleMenu,
    };
    use island_crisis::{Settings, TouchControls};

    /// Logical height of the world; width follows the canvas aspect ratio
    const LOGICAL_HEIGHT: f32 = 720.0;

    enum Screen {
        Title(TitleMenu),
        Playing,
        Paused(PauseMenu),
    }

    enum MenuAction {
        Title(TitleChoice),
        Pause(PauseChoice),
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        screen: Screen,
        settings: Settings,
        store: Box<dyn KeyValueStore>,
        input: InputAggregator,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        accumulator: f32,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn viewport(&self) -> Viewport {
            let w = self.canvas.client_width().max(1) as f32;
            let h = self.canvas.client_height().max(1) as f32;
            Viewport::new(LOGICAL_HEIGHT * w / h, LOGICAL_HEIGHT)
        }

        fn show_title(&mut self) {
            let save = persistence::load(&*self.store);
            if let Some(ref s) = save {
                log::info!("Found saved game at level {}", s.current_level);
            }
            self.screen = Screen::Title(TitleMenu::new(save.as_ref()));
        }

        fn start(&mut self, choice: TitleChoice) {
            let seed = js_sys::Date::now() as u64;
            let viewport = self.viewport();
            self.state = match choice {
                TitleChoice::Start => {
                    persistence::clear(&mut *self.store);
                    GameState::new(seed, viewport)
                }
                TitleChoice::Continue => match persistence::load(&*self.store) {
                    Some(snapshot) => {
                        log::info!("Continuing at level {}", snapshot.current_level);
                        GameState::continue_from(seed, viewport, &snapshot)
                    }
                    None => GameState::new(seed, viewport),
                },
            };
            self.input.clear();
            self.accumulator = 0.0;
            self.screen = Screen::Playing;
        }

        fn exit_to_title(&mut self) {
            persistence::autosave(&mut *self.store, &self.state);
            self.input.clear();
            self.show_title();
        }

        fn key_down(&mut self, key: Key, repeat: bool) {
            let action = match &mut self.screen {
                Screen::Playing => {
                    self.input.key_down(key);
                    return;
                }
                _ if repeat => return,
                Screen::Title(menu) => menu.handle_key(key).map(MenuAction::Title),
                Screen::Paused(menu) => menu.handle_key(key).map(MenuAction::Pause),
            };
            self.menu_action(action);
        }

        fn menu_action(&mut self, action: Option<MenuAction>) {
            match action {
                Some(MenuAction::Title(choice)) => self.start(choice),
                Some(MenuAction::Pause(PauseChoice::Resume)) => self.input.request_pause(),
                Some(MenuAction::Pause(PauseChoice::Exit)) => self.exit_to_title(),
                None => {}
            }
        }

        fn pointer_down(&mut self, x: f32, y: f32, time_ms: f64) {
            match self.screen {
                Screen::Title(_) | Screen::Paused(_) => self.key_down(Key::Confirm, false),
                Screen::Playing => self.input.pointer_down(x, y, time_ms),
            }
        }

        /// Pause unless already paused or out of play
        fn auto_pause(&mut self, reason: &str) {
            if matches!(self.screen, Screen::Playing) && !self.state.paused {
                self.input.clear();
                self.input.request_pause();
                log::info!("Auto-paused ({})", reason);
            }
        }

        fn resize(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let client_w = self.canvas.client_width();
            let client_h = self.canvas.client_height();
            self.canvas.set_width((client_w as f64 * dpr) as u32);
            self.canvas.set_height((client_h as f64 * dpr) as u32);
            self.input.resize(client_w as f32, client_h as f32);

            if self.input.orientation_blocks_play() {
                self.auto_pause("portrait orientation");
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 && time > oldest_time {
                self.fps = (60000.0 / (time - oldest_time)).round() as u32;
            }

            if matches!(self.screen, Screen::Title(_)) {
                return;
            }

            self.accumulator += dt.min(0.1);
            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.poll();
                let events = tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                for event in events {
                    self.handle_event(event);
                }
            }
        }

        fn handle_event(&mut self, event: GameEvent) {
            match event {
                GameEvent::Paused => {
                    let mut menu = PauseMenu::default();
                    menu.open();
                    self.screen = Screen::Paused(menu);
                }
                GameEvent::Resumed => self.screen = Screen::Playing,
                GameEvent::SaveRequested => persistence::autosave(&mut *self.store, &self.state),
                other => log::debug!("{:?}", other),
            }
        }

        /// Render the current frame
        fn render(&self) {
            let ctx = &self.ctx;
            let viewport = self.state.viewport;
            let scale = (self.canvas.width() as f64 / viewport.width as f64)
                .min(self.canvas.height() as f64 / viewport.height as f64);

            let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
            ctx.set_fill_style_str("#000");
            ctx.fill_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
            let _ = ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0);

            for shape in build_scene(&self.state, &self.settings) {
                draw_shape(ctx, &shape);
            }

            match &self.screen {
                Screen::Title(menu) => {
                    self.dim(0.5);
                    self.draw_title(menu);
                    return;
                }
                Screen::Playing | Screen::Paused(_) => {}
            }

            self.draw_hud();
            if self.input.touch_zones_visible() && !self.state.paused {
                self.draw_touch_zones();
            }

            let overlay =
                Overlay::from_state(&self.state, self.settings.quality.victory_glow_layers());
            if let Some(banner) = overlay.banner {
                self.draw_banner(&banner);
            }
            if overlay.fade_alpha > 0.0 {
                self.dim(overlay.fade_alpha as f64);
            }

            if let Screen::Paused(menu) = &self.screen {
                self.dim(PAUSE_OVERLAY_ALPHA as f64);
                self.draw_menu(&menu.items(), viewport.height as f64 * 0.45);
            }

            if self.input.orientation_blocks_play() {
                self.dim(0.8);
                self.center_text("Rotate your device to landscape", "bold 32px Arial", "#ffffff", 0.5);
            }
        }

        fn dim(&self, alpha: f64) {
            let viewport = self.state.viewport;
            self.ctx.set_fill_style_str(&format!("rgba(0,0,0,{:.3})", alpha));
            self.ctx
                .fill_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);
        }

        fn center_text(&self, text: &str, font: &str, color: &str, y_frac: f64) {
            let viewport = self.state.viewport;
            self.ctx.set_font(font);
            self.ctx.set_text_align("center");
            self.ctx.set_text_baseline("middle");
            self.ctx.set_fill_style_str(color);
            let _ = self.ctx.fill_text(
                text,
                viewport.width as f64 / 2.0,
                viewport.height as f64 * y_frac,
            );
        }

        fn draw_title(&self, menu: &TitleMenu) {
            self.center_text("ISLAND CRISIS", "bold 72px 'Arial Black', sans-serif", "#ffffff", 0.3);
            self.draw_menu(&menu.items(), self.state.viewport.height as f64 * 0.5);
        }

        fn draw_menu(&self, items: &[MenuItem], top: f64) {
            let x = self.state.viewport.width as f64 / 2.0;
            let mut y = top;
            self.ctx.set_text_align("center");
            self.ctx.set_text_baseline("middle");
            for item in items {
                self.ctx.set_font("bold 40px Arial");
                self.ctx.set_fill_style_str(&item.color().to_css());
                let _ = self.ctx.fill_text(item.label, x, y);
                if let Some(detail) = &item.detail {
                    self.ctx.set_font("20px Arial");
                    self.ctx.set_fill_style_str("#808080");
                    let _ = self.ctx.fill_text(detail, x, y + 32.0);
                    y += 32.0;
                }
                y += 60.0;
            }
        }

        fn draw_hud(&self) {
            let ctx = &self.ctx;
            let hud = Hud::from_state(&self.state);
            let width = self.state.viewport.width as f64;

            ctx.set_font("bold 24px Arial");
            ctx.set_text_baseline("top");
            ctx.set_fill_style_str("#ffffff");

            ctx.set_text_align("left");
            let _ = ctx.fill_text(&hud.distance, 20.0, 20.0);
            ctx.set_text_align("center");
            let _ = ctx.fill_text(&hud.level, width / 2.0, 20.0);
            if let Some(record) = &hud.record {
                ctx.set_text_align("right");
                let _ = ctx.fill_text(record, width - 20.0, 20.0);
            }
            if self.settings.show_fps {
                ctx.set_text_align("right");
                let _ = ctx.fill_text(&format!("{} fps", self.fps), width - 20.0, 56.0);
            }

            for (i, filled) in hud.lives.iter().enumerate() {
                let cx = 20.0 + LIFE_CIRCLE_RADIUS as f64 + i as f64 * LIFE_CIRCLE_SPACING as f64;
                let cy = 70.0;
                ctx.begin_path();
                let _ = ctx.arc(cx, cy, LIFE_CIRCLE_RADIUS as f64, 0.0, TAU);
                ctx.set_fill_style_str(&Hud::life_color(*filled).to_css());
                ctx.fill();
                ctx.set_line_width(2.0);
                ctx.set_stroke_style_str("#ffffff");
                ctx.stroke();
            }
        }

        fn draw_touch_zones(&self) {
            let viewport = self.state.viewport;
            let (w, h) = (viewport.width as f64, viewport.height as f64);
            self.ctx.set_fill_style_str("rgba(255,255,255,0.08)");
            self.ctx.fill_rect(0.0, 0.0, w * 0.33, h);
            self.ctx.fill_rect(w * 0.67, 0.0, w * 0.33, h);
            self.ctx.set_fill_style_str("rgba(255,255,255,0.04)");
            self.ctx.fill_rect(w * 0.33, 0.0, w * 0.34, h * 0.5);
        }

        fn draw_banner(&self, banner: &Banner) {
            let ctx = &self.ctx;
            let viewport = self.state.viewport;
            ctx.save();
            let _ = ctx.translate(viewport.width as f64 / 2.0, viewport.height as f64 / 2.0);
            ctx.set_font("120px 'Arial Black', sans-serif");
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");

            for i in (1..=banner.glow_layers).rev() {
                let layer_scale = banner.scale as f64 * (1.0 + i as f64 * 0.1);
                let alpha = (0.2 - i as f32 * 0.03) * banner.color.a;
                ctx.save();
                let _ = ctx.scale(layer_scale, layer_scale);
                ctx.set_fill_style_str(&banner.color.with_alpha(alpha).to_css());
                let _ = ctx.fill_text(banner.text, 0.0, 0.0);
                ctx.restore();
            }

            let _ = ctx.scale(banner.scale as f64, banner.scale as f64);
            ctx.set_fill_style_str(&banner.color.to_css());
            let _ = ctx.fill_text(banner.text, 0.0, 0.0);
            ctx.restore();
        }
    }

    fn draw_shape(ctx: &CanvasRenderingContext2d, shape: &Shape) {
        match *shape {
            Shape::Rect { rect, color } => {
                let size = rect.size();
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_rect(
                    rect.left() as f64,
                    rect.top() as f64,
                    size.x as f64,
                    size.y as f64,
                );
            }
            Shape::Circle {
                center,
                radius,
                color,
            } => {
                ctx.set_fill_style_str(&color.to_css());
                ctx.begin_path();
                let _ = ctx.arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU);
                ctx.fill();
            }
            Shape::Line {
                from,
                to,
                width,
                color,
            } => {
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(width as f64);
                ctx.begin_path();
                ctx.move_to(from.x as f64, from.y as f64);
                ctx.line_to(to.x as f64, to.y as f64);
                ctx.stroke();
            }
        }
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("{}, progress will not be kept", e);
                Box::new(MemoryStore::default())
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Island Crisis starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let user_agent = window.navigator().user_agent().unwrap_or_default();
        let is_mobile = is_mobile_user_agent(&user_agent);
        let store = open_store();
        let settings = Settings::load_from(&*store);

        let mut input = InputAggregator::new(
            canvas.client_width() as f32,
            canvas.client_height() as f32,
            is_mobile,
        );
        input.set_touch_policy(settings.touch_controls);

        let seed = js_sys::Date::now() as u64;
        let mut game = Game {
            state: GameState::new(seed, Viewport::default()),
            screen: Screen::Playing,
            settings,
            store,
            input,
            canvas: canvas.clone(),
            ctx,
            accumulator: 0.0,
            last_time: 0.0,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        };
        game.resize();
        game.state = GameState::new(seed, game.viewport());
        game.show_title();
        log::info!("Game initialized with seed: {} (mobile: {})", seed, is_mobile);

        let game = Rc::new(RefCell::new(game));

        setup_input_handlers(&canvas, game.clone())?;
        setup_auto_pause(game.clone())?;

        // Start game loop
        request_animation_frame(game);

        log::info!("Island Crisis running!");
        Ok(())
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(key) = Key::from_code(&event.code()) else {
                    return;
                };
                event.prevent_default();
                game.borrow_mut().key_down(key, event.repeat());
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_code(&event.code()) {
                    game.borrow_mut().input.key_up(key);
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch zones and swipes (mouse only when touch is forced on)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if event.pointer_type() != "touch"
                    && g.settings.touch_controls != TouchControls::Always
                    && matches!(g.screen, Screen::Playing)
                {
                    return;
                }
                event.prevent_default();
                g.pointer_down(
                    event.offset_x() as f32,
                    event.offset_y() as f32,
                    event.time_stamp(),
                );
            });
            canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                game.borrow_mut()
                    .input
                    .pointer_move(event.offset_x() as f32, event.offset_y() as f32);
            });
            canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        for name in ["pointerup", "pointercancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().input.pointer_up();
            });
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Resize / orientation change
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().auto_pause("tab hidden");
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().auto_pause("window blur");
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
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

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
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
    log::info!("Island Crisis (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    headless_demo(0x151a4d, 60 * 60);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run: hold right and hop every half second, logging what happens
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo(seed: u64, ticks: u32) {
    use island_crisis::consts::SIM_DT;
    use island_crisis::persistence;
    use island_crisis::platform::MemoryStore;
    use island_crisis::renderer::build_scene;
    use island_crisis::sim::{GameEvent, GameState, TickInput, Viewport, tick};
    use island_crisis::ui::Hud;
    use island_crisis::Settings;

    let mut store = MemoryStore::default();
    let settings = Settings::default();
    let mut state = GameState::new(seed, Viewport::default());

    for t in 0..ticks {
        let input = TickInput {
            right: true,
            up: t % 30 == 0,
            dash: t % 90 == 0,
            ..Default::default()
        };
        for event in tick(&mut state, &input, SIM_DT) {
            match event {
                GameEvent::SaveRequested => persistence::autosave(&mut store, &state),
                other => log::info!("tick {}: {:?}", t, other),
            }
        }
    }

    let hud = Hud::from_state(&state);
    log::info!(
        "{} | {} | {} | lives {:?} | {} shapes on screen",
        hud.distance,
        hud.record.as_deref().unwrap_or("no record"),
        hud.level,
        hud.lives,
        build_scene(&state, &settings).len()
    );
    if let Some(snapshot) = persistence::load(&store) {
        log::info!("Last save: {:?}", snapshot);
    }
}
