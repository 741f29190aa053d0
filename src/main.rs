mod controls;
mod renderer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use renderer::State;
use tankfield::{GameConfig, Simulation};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

const DEFAULT_CONFIG: &str = "tankfield.toml";

struct App {
    config: GameConfig,
    pending: Option<Simulation>,
    window: Option<Arc<Window>>,
    state: Option<State>,
    last_frame: Instant,
}

impl App {
    fn new(config: GameConfig, sim: Simulation) -> Self {
        Self {
            config,
            pending: Some(sim),
            window: None,
            state: None,
            last_frame: Instant::now(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(sim) = self.pending.take() else {
            return;
        };

        let window_attributes = Window::default_attributes().with_title("Tankfield");
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match pollster::block_on(State::new(window, sim, self.config.camera)) {
            Ok(state) => {
                self.state = Some(state);
                self.last_frame = Instant::now();
            }
            Err(e) => {
                log::error!("failed to create state: {e:?}");
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = self.state.as_mut() {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.mouse_motion(delta);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let window = match self.window.as_ref() {
            Some(w) => w,
            None => return,
        };
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        if id != window.id() {
            return;
        }

        if !state.input(&event) {
            match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            state: ElementState::Pressed,
                            logical_key: Key::Named(NamedKey::Escape),
                            ..
                        },
                    ..
                } => {
                    event_loop.exit();
                }
                WindowEvent::Resized(physical_size) => {
                    state.resize(physical_size);
                    window.request_redraw();
                }
                WindowEvent::RedrawRequested => match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.resize(state.size())
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("out of GPU memory");
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("frame skipped: {e:?}"),
                },
                _ => {}
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if let Some(state) = self.state.as_mut() {
            state.update(dt);
        }
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

/// An explicit path must load; the default path falls back to built-in
/// settings when absent.
fn load_config(explicit: Option<PathBuf>) -> Result<GameConfig> {
    match explicit {
        Some(path) => {
            GameConfig::load(&path).with_context(|| format!("loading {}", path.display()))
        }
        None if Path::new(DEFAULT_CONFIG).exists() => Ok(GameConfig::load(DEFAULT_CONFIG)?),
        None => {
            log::warn!("{DEFAULT_CONFIG} not found, using built-in settings");
            Ok(GameConfig::default())
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = load_config(std::env::args_os().nth(1).map(PathBuf::from))?;
    let sim = Simulation::new(&config).context("building terrain")?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, sim);
    event_loop.run_app(&mut app)?;
    Ok(())
}
