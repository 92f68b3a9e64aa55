//! Arcade Hub entry point
//!
//! Handles platform-specific initialization: the browser host wires DOM events
//! into the director, the native binary runs a scripted headless session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_hub {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CustomEvent, Document, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent};

    use arcade_hub::renderer::RenderState;
    use arcade_hub::{Director, InputEvent, Key, LoopControl, Phase, SimulationId, Tuning};

    /// Overlay pieces the director writes its HUD into
    struct HudElements {
        overlay: HtmlElement,
        title: HtmlElement,
        button: HtmlElement,
        score: HtmlElement,
    }

    impl HudElements {
        /// `None` (after logging what is missing) unless every piece exists
        fn lookup(document: &Document) -> Option<Self> {
            let overlay = element(document, "gameOverlay");
            let title = element(document, "gameTitle");
            let button = element(document, "startGame");
            let score = element(document, "scoreLabel");
            Some(Self {
                overlay: overlay?,
                title: title?,
                button: button?,
                score: score?,
            })
        }
    }

    fn element(document: &Document, id: &str) -> Option<HtmlElement> {
        let found = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if found.is_none() {
            log::error!("Missing #{} element", id);
        }
        found
    }

    fn set_visible(el: &HtmlElement, visible: bool) {
        let display = if visible { "" } else { "none" };
        let _ = el.style().set_property("display", display);
    }

    /// Current time on the animation-frame clock
    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    /// Canvas size follows its container
    fn container_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let (w, h) = match canvas.parent_element() {
            Some(parent) => (parent.client_width(), parent.client_height()),
            None => (canvas.client_width(), canvas.client_height()),
        };
        (w.max(1) as u32, h.max(1) as u32)
    }

    /// Browser-side state around the director
    struct App {
        director: Director,
        render_state: Option<RenderState>,
        canvas: HtmlCanvasElement,
        hud: HudElements,
    }

    impl App {
        /// Push the director's surface to the GPU
        fn present(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(self.director.surface()) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Write the director's HUD view into the DOM
        fn sync_hud(&self) {
            let hud = self.director.hud();
            let el = &self.hud;

            set_visible(&el.overlay, hud.overlay_visible);
            match &hud.detail {
                Some(detail) => el
                    .title
                    .set_inner_html(&format!("{}<br><small>{}</small>", hud.title, detail)),
                None => el.title.set_text_content(Some(&hud.title)),
            }
            if !hud.button.is_empty() {
                el.button.set_text_content(Some(hud.button));
            }
            set_visible(&el.score, hud.score_visible);
            el.score.set_text_content(Some(&hud.score_text));
        }

        fn resize(&mut self) {
            let (width, height) = container_size(&self.canvas);
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
            self.director.route_resize(width, height);
        }

        /// After input: show a run that just ended and refresh the overlay
        fn after_input(&mut self) {
            if self.director.phase() == Phase::Ended {
                self.present();
            }
            self.sync_hud();
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Arcade Hub starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("gameCanvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("Missing #gameCanvas; hub not started");
            return;
        };

        let Some(hud) = HudElements::lookup(&document) else {
            log::error!("Overlay incomplete; hub not started");
            return;
        };

        let (width, height) = container_size(&canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let director = Director::new(Tuning::load(), seed, width, height);
        log::info!("Director initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => render_state,
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                return;
            }
        };

        let app = Rc::new(RefCell::new(App {
            director,
            render_state: Some(render_state),
            canvas: canvas.clone(),
            hud,
        }));

        setup_input_handlers(&canvas, app.clone());
        let start_button = app.borrow().hud.button.clone();
        setup_start_button(&start_button, app.clone());
        setup_mode_switch(app.clone());
        setup_resize(app.clone());

        {
            let mut a = app.borrow_mut();
            a.present();
            a.sync_hud();
        }

        log::info!("Arcade Hub ready");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down: start trigger, game keys, scroll suppression
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = Key::from_dom(&event.key());
                let schedule = {
                    let mut a = app.borrow_mut();
                    if a.director.captures(key) {
                        event.prevent_default();
                    }
                    let schedule = a.director.route_input(InputEvent::KeyDown(key), now());
                    a.after_input();
                    schedule
                };
                if schedule {
                    request_animation_frame(app.clone());
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = Key::from_dom(&event.key());
                let mut a = app.borrow_mut();
                a.director.route_input(InputEvent::KeyUp(key), now());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - canvas-relative position
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                let mut a = app.borrow_mut();
                a.director.route_input(InputEvent::PointerMove(pos), now());
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                let mut a = app.borrow_mut();
                a.director.route_input(InputEvent::PointerDown(pos), now());
                a.after_input();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_start_button(btn: &HtmlElement, app: Rc<RefCell<App>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let schedule = {
                let mut a = app.borrow_mut();
                let schedule = a.director.start(now());
                a.after_input();
                schedule
            };
            if schedule {
                request_animation_frame(app.clone());
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// `switchGame` CustomEvent on window, detail = mode name
    fn setup_mode_switch(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: CustomEvent| {
            let Some(name) = event.detail().as_string() else {
                log::warn!("switchGame without a mode name");
                return;
            };
            let Some(id) = SimulationId::from_name(&name) else {
                log::warn!("Unknown game mode: {}", name);
                return;
            };
            let mut a = app.borrow_mut();
            a.director.switch_mode(id);
            a.present();
            a.sync_hud();
        });
        let _ = window
            .add_event_listener_with_callback("switchGame", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            a.resize();
            if a.director.phase() != Phase::Running {
                a.present();
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        let control = {
            let mut a = app.borrow_mut();
            let control = a.director.tick(time);
            a.present();
            a.sync_hud();
            control
        };

        if control == LoopControl::Continue {
            request_animation_frame(app);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_hub::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use arcade_hub::sim::Key;
    use arcade_hub::{Command, Director, InputEvent, SimulationId, Tuning};
    use glam::Vec2;

    const WIDTH: u32 = 800;
    const HEIGHT: u32 = 400;
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// One minute of play per game
    const MAX_FRAMES: u32 = 3600;

    /// A little canned play so each game does something before it ends
    fn scripted_input(id: SimulationId, frame: u32) -> Option<InputEvent> {
        match id {
            SimulationId::Dodge => (frame % 20 == 0).then_some(InputEvent::KeyDown(Key::Space)),
            SimulationId::Stack => match frame % 45 {
                0 => Some(InputEvent::KeyDown(Key::Up)),
                15 => Some(InputEvent::KeyDown(if frame % 90 == 15 { Key::Left } else { Key::Right })),
                30 => Some(InputEvent::KeyDown(Key::Space)),
                _ => None,
            },
            SimulationId::Platformer => match frame % 60 {
                0 => Some(InputEvent::KeyDown(Key::Right)),
                20 => Some(InputEvent::KeyDown(Key::Space)),
                50 => Some(InputEvent::KeyUp(Key::Right)),
                _ => None,
            },
            SimulationId::Shooter => (frame % 12 == 0).then(|| {
                let angle = frame as f32 * 0.05;
                let center = Vec2::new(WIDTH as f32, HEIGHT as f32) / 2.0;
                InputEvent::PointerDown(center + Vec2::from_angle(angle) * 150.0)
            }),
        }
    }

    pub fn run(tuning: Tuning, seed: u64) {
        for id in SimulationId::ALL {
            let mut director = Director::new(tuning.clone(), seed, WIDTH, HEIGHT);
            director.dispatch(Command::Switch(id));
            let mut running = director.dispatch(Command::Start(0.0));

            let mut frame = 0;
            while running && frame < MAX_FRAMES {
                frame += 1;
                let now = frame as f64 * FRAME_MS;
                if let Some(event) = scripted_input(id, frame) {
                    director.dispatch(Command::Input(event, now));
                }
                running = director.dispatch(Command::Tick(now));
            }
            director.dispatch(Command::End);

            log::info!(
                "{}: {:?} after {} frames, score {}, end {:?}, {} draw commands",
                id.as_str(),
                director.phase(),
                director.frames(),
                director.score_text(),
                director.end_reason().map(|r| r.describe()),
                director.surface().commands().len()
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Arcade Hub (native) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match arcade_hub::Tuning::load_path(std::path::Path::new(&path)) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Invalid tuning file {}: {}", path, e);
                return std::process::ExitCode::FAILURE;
            }
        },
        None => arcade_hub::Tuning::load(),
    };

    headless::run(tuning, 0x5eed);
    std::process::ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
