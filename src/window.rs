use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use cardfield::{ConfigError, Engine, FieldConfig, FrameQueue, RasterSurface, Surface};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow},
    window::{Window, WindowId},
};

use crate::present::{GpuError, Presenter};

/// Card-sized default: 25rem x 32rem.
pub const DEFAULT_SIZE: (u32, u32) = (400, 512);

/// Errors that can stop the desktop host.
#[derive(Debug)]
pub enum HostError {
    /// Failed to load the field configuration.
    Config(ConfigError),
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// A command-line argument could not be parsed.
    Usage(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Config(e) => write!(f, "Config error: {}", e),
            HostError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            HostError::Window(e) => write!(f, "Failed to create window: {}", e),
            HostError::Gpu(e) => write!(f, "GPU error: {}", e),
            HostError::Usage(arg) => write!(f, "Invalid window size '{}', expected WIDTHxHEIGHT", arg),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::Config(e) => Some(e),
            HostError::EventLoop(e) => Some(e),
            HostError::Window(e) => Some(e),
            HostError::Gpu(e) => Some(e),
            HostError::Usage(_) => None,
        }
    }
}

impl From<ConfigError> for HostError {
    fn from(e: ConfigError) -> Self {
        HostError::Config(e)
    }
}

impl From<winit::error::EventLoopError> for HostError {
    fn from(e: winit::error::EventLoopError) -> Self {
        HostError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for HostError {
    fn from(e: winit::error::OsError) -> Self {
        HostError::Window(e)
    }
}

impl From<GpuError> for HostError {
    fn from(e: GpuError) -> Self {
        HostError::Gpu(e)
    }
}

/// Hosts one particle field in a window, treating the whole window as the card.
///
/// Cursor enter/leave start and stop the engine, resizes reseed it, and every
/// redraw is one display refresh: due timers fire, the pending frame runs, and
/// the canvas is presented.
pub struct App {
    config: FieldConfig,
    size: (u32, u32),
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    engine: Option<Engine<RasterSurface, FrameQueue>>,
    error: Option<HostError>,
}

impl App {
    pub fn new(config: FieldConfig, size: (u32, u32)) -> Self {
        Self {
            config,
            size,
            window: None,
            presenter: None,
            engine: None,
            error: None,
        }
    }

    /// The error that ended the event loop, if any.
    pub fn into_result(self) -> Result<(), HostError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), HostError> {
        let (w, h) = self.size;
        let window_attrs = Window::default_attributes()
            .with_title("cardfield")
            .with_inner_size(LogicalSize::new(w, h));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let presenter = pollster::block_on(Presenter::new(window.clone()))?;

        let size = window.inner_size();
        let engine = Engine::new(
            RasterSurface::new(size.width, size.height),
            FrameQueue::new(Instant::now()),
            self.config.clone(),
        );
        log::info!(
            "Mounted {}x{} field with {} particles",
            size.width,
            size.height,
            engine.field().len()
        );

        window.request_redraw();
        self.window = Some(window);
        self.presenter = Some(presenter);
        self.engine = Some(engine);
        Ok(())
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Fire due timers. Returns true if any fired.
    fn fire_timers(engine: &mut Engine<RasterSurface, FrameQueue>) -> bool {
        engine.scheduler_mut().set_now(Instant::now());
        let expired = engine.scheduler_mut().take_expired();
        let fired = !expired.is_empty();
        for timer in expired {
            engine.on_timeout(timer);
        }
        fired
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(engine), Some(presenter)) = (&mut self.engine, &mut self.presenter) else {
            return;
        };

        Self::fire_timers(engine);
        if let Some(frame) = engine.scheduler_mut().take_frame() {
            engine.on_frame(frame);
        }

        let (width, height) = engine.surface().size();
        match presenter.present(engine.surface().as_bytes(), width, height) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost; reconfiguring");
                presenter.resize(width, height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        if engine.scheduler().has_frame() {
            self.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("{}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(engine) = &mut self.engine {
                    engine.unmount();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(size.width, size.height);
                }
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
                self.request_redraw();
            }
            WindowEvent::CursorEntered { .. } => {
                if let Some(engine) = &mut self.engine {
                    engine.start();
                    if let Some(window) = &self.window {
                        window.set_title(&format!("cardfield - {} particles", engine.field().len()));
                    }
                }
                self.request_redraw();
            }
            WindowEvent::CursorLeft { .. } => {
                if let Some(engine) = &mut self.engine {
                    engine.stop();
                }
                if let Some(window) = &self.window {
                    window.set_title("cardfield");
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(engine) = &mut self.engine else {
            return;
        };

        // A deferred clear changed the canvas; show it
        if Self::fire_timers(engine) {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }

        let control_flow = match engine.scheduler().next_deadline() {
            Some(deadline) => ControlFlow::WaitUntil(deadline),
            None => ControlFlow::Wait,
        };
        event_loop.set_control_flow(control_flow);
    }
}
