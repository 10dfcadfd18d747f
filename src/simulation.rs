//! Simulation builder and runner

use crate::camera::Camera;
use crate::config::{Config, FieldConfig, WindowConfig};
use crate::error::SimulationError;
use crate::field::ParticleField;
use crate::frame_loop::FrameLoop;
use crate::gpu::{FrameData, Renderer};
use crate::input::{Input, KeyCode};
use crate::theme::{Palette, Theme, ThemeStore, ThemeWatcher};
use glam::Vec2;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

type ThemeCallback = Box<dyn FnMut(Theme)>;

/// Frames between frame-rate reports in the debug log.
const FPS_LOG_INTERVAL: u64 = 600;

/// A particle field builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// ```ignore
/// use plexus::prelude::*;
///
/// Simulation::new()
///     .with_seed(42)
///     .with_theme_store(ThemeStore::new("plexus-theme.json"))
///     .on_theme_change(|theme| println!("now {theme}"))
///     .run()?;
/// ```
pub struct Simulation {
    config: Config,
    seed: Option<u64>,
    theme: Option<Theme>,
    theme_store: Option<ThemeStore>,
    theme_listeners: Vec<ThemeCallback>,
}

impl Simulation {
    /// Create a new simulation with default settings.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            seed: None,
            theme: None,
            theme_store: None,
            theme_listeners: Vec::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replace only the field parameters.
    pub fn with_field(mut self, field: FieldConfig) -> Self {
        self.config.field = field;
        self
    }

    /// Seed the initial scatter. Without a seed the field differs on every run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Start in a fixed theme, ignoring the stored preference and the OS.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Read the starting theme from, and save toggles to, `store`.
    pub fn with_theme_store(mut self, store: ThemeStore) -> Self {
        self.theme_store = Some(store);
        self
    }

    /// Call `listener` with the starting theme and on every change.
    pub fn on_theme_change<F>(mut self, listener: F) -> Self
    where
        F: FnMut(Theme) + 'static,
    {
        self.theme_listeners.push(Box::new(listener));
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.window.title = title.into();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Theme to start with: explicit, then stored, then the default.
    ///
    /// An unreadable preference file is logged and ignored.
    pub fn initial_theme(&self) -> Theme {
        self.theme
            .or_else(|| self.stored_theme())
            .unwrap_or_default()
    }

    fn stored_theme(&self) -> Option<Theme> {
        let store = self.theme_store.as_ref()?;
        match store.load() {
            Ok(theme) => theme,
            Err(e) => {
                warn!(
                    "ignoring theme preference at {}: {}",
                    store.path().display(),
                    e
                );
                None
            }
        }
    }

    /// Scatter a fresh field from the configured parameters and seed.
    pub fn build_field(&self) -> ParticleField {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        ParticleField::new(self.config.field.clone(), &mut rng)
    }

    /// Run the field. This blocks until the window is closed.
    ///
    /// A machine without a usable GPU or display surface is not an error:
    /// a warning is logged and this returns `Ok(())` without animating.
    pub fn run(self) -> Result<(), SimulationError> {
        self.config.validate()?;

        let field = self.build_field();
        // An explicit or remembered choice outranks the OS preference
        let pinned = self.theme.or_else(|| self.stored_theme());
        let theme = pinned.unwrap_or_default();
        let theme_pinned = pinned.is_some();

        info!(
            "starting field: {} nodes, up to {} links, {} theme",
            field.len(),
            field.config().max_segments,
            theme
        );

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App::new(self, field, theme, theme_pinned);
        event_loop.run_app(&mut app)?;

        match app.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    window_config: WindowConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    field: ParticleField,
    frame_loop: FrameLoop,
    input: Input,
    camera: Camera,
    themes: ThemeWatcher,
    palette: Rc<Cell<Palette>>,
    theme_store: Option<ThemeStore>,
    theme_pinned: bool,
    /// Paused from the keyboard; visibility changes do not override it.
    user_paused: bool,
    /// Set when no renderer could be created; the field never starts.
    inactive: bool,
    failure: Option<SimulationError>,
}

impl App {
    fn new(sim: Simulation, field: ParticleField, theme: Theme, theme_pinned: bool) -> Self {
        let extent = Vec2::new(field.config().bounds.x, field.config().bounds.y);

        let palette = Rc::new(Cell::new(Palette::for_theme(theme)));
        let mut themes = ThemeWatcher::new(theme);
        let sink = palette.clone();
        themes.subscribe(move |theme| sink.set(Palette::for_theme(theme)));
        for listener in sim.theme_listeners {
            themes.subscribe(listener);
        }

        Self {
            window_config: sim.config.window,
            window: None,
            renderer: None,
            field,
            frame_loop: FrameLoop::new(),
            input: Input::new(extent),
            camera: Camera::new(),
            themes,
            palette,
            theme_store: sim.theme_store,
            theme_pinned,
            user_paused: false,
            inactive: false,
            failure: None,
        }
    }

    fn start(&mut self) {
        if self.inactive || self.user_paused {
            return;
        }
        if self.frame_loop.resume() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn toggle_pause(&mut self) {
        self.user_paused = !self.user_paused;
        if self.user_paused {
            self.frame_loop.pause();
            info!("paused");
        } else {
            info!("resumed");
            self.start();
        }
    }

    fn toggle_theme(&mut self) {
        let theme = self.themes.toggle();
        self.theme_pinned = true;
        info!("theme: {}", theme);

        if let Some(store) = &self.theme_store {
            if let Err(e) = store.save(theme) {
                warn!(
                    "could not save theme preference to {}: {}",
                    store.path().display(),
                    e
                );
            }
        }
        self.request_redraw();
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn handle_keys(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
        }
        if self.input.key_pressed(KeyCode::T) {
            self.toggle_theme();
        }
        if self.input.key_pressed(KeyCode::Space) {
            self.toggle_pause();
        }
        self.input.begin_frame();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        self.field.set_pointer(self.input.pointer().target());
        let stepped = self.frame_loop.tick(&mut self.field).is_some();

        let segments = self.field.segments();
        let frame = FrameData {
            positions: self.field.positions(),
            segment_vertices: segments.raw(),
            segment_vertex_count: segments.vertex_count(),
            point_size: self.field.point_size(),
            rotation: self.field.rotation(),
            palette: self.palette.get(),
            camera: &self.camera,
        };

        match renderer.render(&frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("out of GPU memory, closing");
                event_loop.exit();
                return;
            }
            Err(e) => warn!("render error: {:?}", e),
        }

        // Paused loops redraw only when the window asks
        if stepped {
            let time = self.frame_loop.time();
            if time.frame() % FPS_LOG_INTERVAL == 0 {
                debug!("{:.1} fps, {} links", time.fps(), self.field.segments().len());
            }
            self.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.inactive {
            self.start();
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.window_config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ))
            .with_transparent(self.window_config.transparent);

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.failure = Some(e.into());
                event_loop.exit();
                return;
            }
        };

        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            self.field.len(),
            self.field.segments().capacity(),
        ));
        match renderer {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => {
                warn!("particle field disabled: {}", e);
                self.inactive = true;
                event_loop.exit();
                return;
            }
        }

        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);
        self.camera.set_viewport(size.width, size.height);

        if !self.theme_pinned {
            if let Some(os_theme) = window.theme() {
                self.themes.set(os_theme.into());
            }
        }

        self.window = Some(window);
        self.start();
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.frame_loop.pause();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.camera
                    .set_viewport(physical_size.width, physical_size.height);
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size.width, physical_size.height);
                }
                self.request_redraw();
            }
            WindowEvent::Occluded(hidden) => {
                if hidden {
                    if self.frame_loop.pause() {
                        debug!("window hidden, field paused");
                    }
                } else {
                    debug!("window visible");
                    self.start();
                }
            }
            WindowEvent::ThemeChanged(os_theme) => {
                if !self.theme_pinned && self.themes.set(os_theme.into()) {
                    info!("theme: {} (system)", self.themes.current());
                    self.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { .. } => {
                self.handle_keys(event_loop);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn temp_store(name: &str) -> ThemeStore {
        let dir = std::env::temp_dir().join(format!("plexus-sim-{}-{}", name, std::process::id()));
        ThemeStore::new(dir.join("theme.json"))
    }

    #[test]
    fn test_initial_theme_defaults_to_dark() {
        assert_eq!(Simulation::new().initial_theme(), Theme::Dark);
    }

    #[test]
    fn test_initial_theme_prefers_explicit_over_stored() {
        let store = temp_store("explicit");
        store.save(Theme::Light).unwrap();

        let sim = Simulation::new().with_theme_store(store.clone());
        assert_eq!(sim.initial_theme(), Theme::Light);

        let sim = sim.with_theme(Theme::Dark);
        assert_eq!(sim.initial_theme(), Theme::Dark);

        let _ = std::fs::remove_dir_all(store.path().parent().unwrap());
    }

    #[test]
    fn test_corrupt_store_falls_back() {
        let store = temp_store("corrupt");
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{").unwrap();

        let sim = Simulation::new().with_theme_store(store.clone());
        assert_eq!(sim.initial_theme(), Theme::Dark);

        let _ = std::fs::remove_dir_all(store.path().parent().unwrap());
    }

    #[test]
    fn test_seeded_fields_match() {
        let a = Simulation::new().with_seed(3).build_field();
        let b = Simulation::new().with_seed(3).build_field();
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_builder_overrides() {
        let sim = Simulation::new()
            .with_title("backdrop")
            .with_field(FieldConfig::default().with_node_count(10));
        assert_eq!(sim.config().window.title, "backdrop");
        assert_eq!(sim.build_field().len(), 10);
    }

    #[test]
    fn test_app_wires_palette_and_listeners() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let sim = Simulation::new()
            .with_seed(1)
            .on_theme_change(move |t| sink.borrow_mut().push(t));
        let field = sim.build_field();

        let mut app = App::new(sim, field, Theme::Dark, false);
        assert_eq!(app.palette.get(), Palette::for_theme(Theme::Dark));

        app.toggle_theme();
        assert_eq!(app.palette.get(), Palette::for_theme(Theme::Light));
        assert!(app.theme_pinned);
        assert_eq!(*seen.borrow(), vec![Theme::Dark, Theme::Light]);
    }

    #[test]
    fn test_user_pause_survives_visibility() {
        let sim = Simulation::new().with_seed(1);
        let field = sim.build_field();
        let mut app = App::new(sim, field, Theme::Dark, false);

        app.start();
        assert!(app.frame_loop.is_running());

        app.toggle_pause();
        assert!(!app.frame_loop.is_running());

        // Becoming visible again must not restart a user pause
        app.start();
        assert!(!app.frame_loop.is_running());

        app.toggle_pause();
        assert!(app.frame_loop.is_running());
    }
}
