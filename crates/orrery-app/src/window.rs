//! Window creation and event handling via winit.
//!
//! [`App`] implements winit's [`ApplicationHandler`]: it owns the window, the
//! GPU context, the input state and the [`Simulation`], and drives them from
//! `RedrawRequested`. [`run`] starts the event loop.

use std::sync::Arc;

use glam::Vec2;
use orrery_config::Config;
use orrery_input::{ActionResolver, ActionState, InputMap, KeyboardState, MouseState};
use orrery_render::{
    RenderContext, SceneCamera, SceneRenderer, SurfaceError, init_render_context_blocking,
};
use orrery_sim::{FixedDelta, PoseSink, SimSettings, SimStatus, Simulation};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::error::AppError;
use crate::free_look::FreeLook;
use crate::game_loop::GameLoop;
use crate::host::{ActionCommands, CameraRig};
use crate::platform::PlatformDirs;
use crate::scene::{build_scene, fallback_color, texture_manifest};

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ));
    if config.window.fullscreen {
        attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

fn status_title(base: &str, status: &SimStatus) -> String {
    format!("{base} | {status}")
}

pub struct App {
    config: Config,
    dirs: PlatformDirs,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    renderer: Option<SceneRenderer>,
    sim: Simulation,
    rig: CameraRig,
    game_loop: GameLoop,
    keyboard: KeyboardState,
    mouse: MouseState,
    input_map: InputMap,
    actions: ActionState,
    commands: ActionCommands,
    /// Mouse motion not yet consumed by a fixed step.
    pending_look: Vec2,
    last_status: Option<SimStatus>,
}

impl App {
    pub fn new(config: Config, dirs: PlatformDirs) -> Self {
        let sim = Simulation::new(SimSettings::from(&config));
        let aspect = config.window.width.max(1) as f32 / config.window.height.max(1) as f32;
        let mut rig = CameraRig::new(
            SceneCamera::new(config.camera.fov_y_degrees, aspect),
            FreeLook::new(config.camera.look_sensitivity, config.camera.move_speed),
        );
        rig.apply_pose(sim.camera());
        let input_map = InputMap::load_or_default(&dirs.keybindings_path());

        Self {
            config,
            dirs,
            window: None,
            gpu: None,
            renderer: None,
            sim,
            rig,
            game_loop: GameLoop::new(),
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(),
            input_map,
            actions: ActionState::new(),
            commands: ActionCommands::new(),
            pending_look: Vec2::ZERO,
            last_status: None,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dirs(&self) -> &PlatformDirs {
        &self.dirs
    }

    fn update(&mut self) {
        let frame_time = self.game_loop.measure();
        self.advance(frame_time);
    }

    /// Resolve input, queue commands and run the fixed steps due after
    /// `frame_time` seconds. Returns how many steps ran.
    fn advance(&mut self, frame_time: f32) -> u32 {
        ActionResolver::resolve(&self.input_map, &self.keyboard, &self.mouse, &mut self.actions);
        self.commands.collect(&self.actions, self.mouse.scroll());
        self.pending_look += self.mouse.delta();

        let sim = &mut self.sim;
        let rig = &mut self.rig;
        let actions = &self.actions;
        let commands = &mut self.commands;
        let pending_look = &mut self.pending_look;

        self.game_loop.advance(frame_time, |dt| {
            // Accumulated motion turns the camera once, on the first step.
            let look = std::mem::take(pending_look);
            rig.free_look.update(actions, look, dt, sim.camera_mut());
            sim.frame(&mut FixedDelta(dt), &mut *commands, &mut *rig);
        })
    }

    fn refresh_title(&mut self) {
        if !self.config.debug.status_in_title {
            return;
        }
        let status = self.sim.status();
        if self.last_status == Some(status) {
            return;
        }
        if let Some(window) = &self.window {
            window.set_title(&status_title(&self.config.window.title, &status));
        }
        self.last_status = Some(status);
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!("Ignoring zero-sized resize (minimized)");
            return;
        }
        self.rig.camera.set_aspect_ratio(width as f32, height as f32);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(&gpu.device, width, height);
            }
        }
        info!("Window resized to {width}x{height}");
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(renderer)) = (&mut self.gpu, &mut self.renderer) else {
            return;
        };
        let scene = build_scene(&self.sim);
        match renderer.render(gpu, &self.rig.camera, &scene) {
            Ok(()) => {}
            Err(e) if e.is_transient() => {
                warn!("Surface {e}, skipping frame");
            }
            Err(SurfaceError::Lost) => {
                let (width, height) = gpu.size();
                gpu.resize(width, height);
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => {
                warn!("Frame dropped: {e}");
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let ctx = match init_render_context_blocking(Arc::clone(&window), self.config.window.vsync)
        {
            Ok(ctx) => ctx,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut renderer = SceneRenderer::for_context(&ctx);
        let assets = &self.config.assets.directory;
        for name in texture_manifest() {
            renderer.load_texture(&ctx.device, &ctx.queue, assets, name, fallback_color(name));
        }
        info!(
            "Loaded {} textures from {}",
            renderer.textures().len(),
            assets.display()
        );

        let (width, height) = ctx.size();
        self.rig.camera.set_aspect_ratio(width as f32, height as f32);
        self.gpu = Some(ctx);
        self.renderer = Some(renderer);
        self.game_loop.reset_clock();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.resize(size.width, size.height);
            }
            WindowEvent::Focused(false) => {
                self.keyboard.release_all();
                self.mouse.release_all();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.process_event(&event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.mouse.on_scroll(delta);
            }
            WindowEvent::CursorEntered { .. } => {
                self.mouse.on_cursor_entered();
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse.on_cursor_left();
            }
            WindowEvent::RedrawRequested => {
                self.update();
                self.refresh_title();
                self.render(event_loop);

                self.keyboard.clear_transients();
                self.mouse.clear_transients();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Create the event loop and run until the window closes.
#[instrument(skip_all)]
pub fn run(config: Config, dirs: PlatformDirs) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, dirs);
    event_loop.run_app(&mut app)?;
    Ok(())
}
