use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use pixels::{Error as PixelsError, Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::info;
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::config::EngineConfig;
use crate::rendering::{Surface, SurfaceError};

use super::engine::{Engine, EngineError};
use super::scheduler::ManualScheduler;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Window pixels per frame-buffer pixel.
    pub scale: u32,
    pub sprite_root: Option<PathBuf>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Overworld".to_string(),
            window_width: 960,
            window_height: 640,
            scale: 2,
            sprite_root: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize pixel surface: {0}")]
    CreateSurface(#[source] PixelsError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// The embedding game. Owns everything outside the engine's contract.
pub trait Host {
    fn init(&mut self, engine: &mut Engine);

    /// Called after every simulated frame.
    fn after_frame(&mut self, engine: &mut Engine);

    fn shutdown(&mut self, _engine: &Engine) {}
}

struct PixelsSurface {
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl PixelsSurface {
    fn new(window: Arc<Window>, width: u32, height: u32) -> Result<Self, PixelsError> {
        let size = window.inner_size();
        let texture = SurfaceTexture::new(size.width, size.height, window);
        let pixels = Pixels::new(width, height, texture)?;
        Ok(Self {
            pixels,
            width,
            height,
        })
    }
}

impl Surface for PixelsSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        self.pixels.frame_mut()
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        self.pixels
            .render()
            .map_err(|error| SurfaceError::Present(error.to_string()))
    }

    fn resize_output(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels
            .resize_surface(width, height)
            .map_err(|error| SurfaceError::Resize(error.to_string()))
    }
}

pub fn run_app(
    config: LoopConfig,
    engine_config: EngineConfig,
    mut host: Box<dyn Host>,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let (buffer_width, buffer_height) =
        frame_buffer_size(config.window_width, config.window_height, config.scale);
    let surface = PixelsSurface::new(Arc::clone(&window), buffer_width, buffer_height)
        .map_err(AppError::CreateSurface)?;

    let scheduler = ManualScheduler::new();
    let mut engine = Engine::new(
        engine_config,
        Box::new(surface),
        Box::new(scheduler.clone()),
    )?;
    engine.set_sprite_root(config.sprite_root.clone());
    host.init(&mut engine);
    engine.start();

    info!(
        window_width = config.window_width,
        window_height = config.window_height,
        buffer_width,
        buffer_height,
        "loop_config"
    );

    let started = Instant::now();
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(size) => engine.resize_output(size.width, size.height),
                WindowEvent::Focused(false) => engine.release_input(),
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    engine.resize_output(size.width, size.height);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if is_quit_key(&event) {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                        return;
                    }
                    if is_debug_toggle_press(&event) {
                        engine.set_debug_mode(!engine.debug_mode());
                        return;
                    }
                    if let Some(key) = key_name(event.physical_key) {
                        match event.state {
                            ElementState::Pressed => engine.handle_key_down(key),
                            ElementState::Released => engine.handle_key_up(key),
                        };
                    }
                }
                WindowEvent::RedrawRequested => {
                    if let Some(handle) = scheduler.take_pending() {
                        let timestamp_ms = started.elapsed().as_secs_f64() * 1000.0;
                        engine.on_frame(handle, timestamp_ms);
                        host.after_frame(&mut engine);
                    }
                }
                _ => {}
            },
            Event::AboutToWait => window.request_redraw(),
            Event::LoopExiting => {
                engine.stop();
                host.shutdown(&engine);
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn frame_buffer_size(window_width: u32, window_height: u32, scale: u32) -> (u32, u32) {
    let scale = scale.max(1);
    ((window_width / scale).max(1), (window_height / scale).max(1))
}

/// Host key names the engine understands, from layout-independent key codes.
fn key_name(key: PhysicalKey) -> Option<&'static str> {
    match key {
        PhysicalKey::Code(KeyCode::ArrowUp) => Some("ArrowUp"),
        PhysicalKey::Code(KeyCode::ArrowDown) => Some("ArrowDown"),
        PhysicalKey::Code(KeyCode::ArrowLeft) => Some("ArrowLeft"),
        PhysicalKey::Code(KeyCode::ArrowRight) => Some("ArrowRight"),
        PhysicalKey::Code(KeyCode::KeyW) => Some("w"),
        PhysicalKey::Code(KeyCode::KeyA) => Some("a"),
        PhysicalKey::Code(KeyCode::KeyS) => Some("s"),
        PhysicalKey::Code(KeyCode::KeyD) => Some("d"),
        PhysicalKey::Code(KeyCode::KeyE) => Some("e"),
        PhysicalKey::Code(KeyCode::Enter) | PhysicalKey::Code(KeyCode::NumpadEnter) => {
            Some("Enter")
        }
        PhysicalKey::Code(KeyCode::Space) => Some(" "),
        _ => None,
    }
}

fn is_quit_key(key_event: &KeyEvent) -> bool {
    matches!(key_event.physical_key, PhysicalKey::Code(KeyCode::Escape))
}

fn is_debug_toggle_press(key_event: &KeyEvent) -> bool {
    matches!(key_event.physical_key, PhysicalKey::Code(KeyCode::F3))
        && key_event.state == ElementState::Pressed
        && !key_event.repeat
}
