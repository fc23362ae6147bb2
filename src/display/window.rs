// Window target - Presents the surface in a native window
//
// The window is driven by polling rather than by handing control to winit:
// every call pumps the event loop with a zero timeout, which handles what is
// already queued and returns at once. The producer loop keeps ownership of
// the thread.
//
// Closing the window only hides it. The pixels surface and the window stay
// alive so the same dimensions can be shown again cheaply.

use super::codec::Pixel;
use super::error::DisplayError;
use super::target::{PresentationTarget, TargetState};
use log::{debug, error, info, warn};
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use std::time::Duration;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

/// How many zero-timeout pumps to allow for the window to appear
const CREATE_ATTEMPTS: u32 = 8;

/// Requested buffer geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Binding {
    width: u32,
    height: u32,
    scale: u32,
}

impl Binding {
    fn window_size(&self) -> LogicalSize<u32> {
        LogicalSize::new(
            self.width.saturating_mul(self.scale),
            self.height.saturating_mul(self.scale),
        )
    }
}

/// Window state driven by the event loop
struct ScreenApp {
    title: String,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    binding: Option<Binding>,
    state: TargetState,
    create_error: Option<String>,
}

impl ScreenApp {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            window: None,
            pixels: None,
            binding: None,
            state: TargetState::NotCreated,
            create_error: None,
        }
    }

    fn window_title(&self, binding: &Binding) -> String {
        format!("{} - {}x{}", self.title, binding.width, binding.height)
    }

    /// Create the window for a pending binding
    ///
    /// Window creation needs an `ActiveEventLoop`, so this runs from inside
    /// the event loop callbacks.
    fn realize(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.state != TargetState::NotCreated {
            return;
        }
        let Some(binding) = self.binding else {
            return;
        };

        let window_attributes = Window::default_attributes()
            .with_title(self.window_title(&binding))
            .with_inner_size(binding.window_size())
            .with_resizable(false);

        match event_loop.create_window(window_attributes) {
            Ok(window) => {
                debug!(
                    "Window created: {}x{}",
                    binding.window_size().width,
                    binding.window_size().height
                );
                self.window = Some(Arc::new(window));
                self.state = TargetState::Visible;
            }
            Err(e) => {
                error!("Failed to create window: {}", e);
                self.create_error = Some(e.to_string());
            }
        }
    }

    fn render(&mut self) {
        if self.state != TargetState::Visible {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.render() {
                warn!("Render error: {}", e);
            }
        }
    }
}

impl ApplicationHandler for ScreenApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.realize(event_loop);
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(window) = &self.window {
                    info!("Close requested, hiding window");
                    window.set_visible(false);
                    self.state = TargetState::Hidden;
                }
            }
            WindowEvent::Destroyed => {
                info!("Window destroyed");
                self.pixels = None;
                self.window = None;
                self.state = TargetState::Destroyed;
            }
            WindowEvent::Resized(size) => {
                if let Some(pixels) = &mut self.pixels {
                    if let Err(e) = pixels.resize_surface(size.width, size.height) {
                        warn!("Failed to resize surface: {}", e);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.realize(event_loop);
    }
}

/// Presentation target backed by a winit window and a pixels surface
pub struct WindowTarget {
    event_loop: Option<EventLoop<()>>,
    app: ScreenApp,
}

impl WindowTarget {
    /// Open the event loop; the window itself appears on the first bind
    ///
    /// # Arguments
    /// * `title` - Window title prefix; the frame size is appended
    ///
    /// # Errors
    /// `AllocationError` if the platform event loop cannot be created
    pub fn new(title: &str) -> Result<Self, DisplayError> {
        let event_loop = EventLoop::new().map_err(|e| {
            DisplayError::AllocationError(format!("cannot create event loop: {}", e))
        })?;
        event_loop.set_control_flow(ControlFlow::Poll);

        Ok(Self {
            event_loop: Some(event_loop),
            app: ScreenApp::new(title),
        })
    }

    /// Handle queued events without waiting for new ones
    fn pump(&mut self) {
        let Some(event_loop) = self.event_loop.as_mut() else {
            return;
        };

        let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut self.app);
        if let PumpStatus::Exit(code) = status {
            debug!("Event loop exited with code {}", code);
            self.event_loop = None;
            self.app.pixels = None;
            self.app.window = None;
            self.app.state = TargetState::Destroyed;
        }
    }

    /// Pump until the window exists or the attempts run out
    fn create_window(&mut self) -> Result<Arc<Window>, DisplayError> {
        for _ in 0..CREATE_ATTEMPTS {
            self.pump();
            if let Some(window) = &self.app.window {
                return Ok(window.clone());
            }
            if let Some(e) = self.app.create_error.take() {
                return Err(DisplayError::AllocationError(e));
            }
        }

        Err(DisplayError::AllocationError(
            "window did not appear".to_string(),
        ))
    }
}

impl PresentationTarget for WindowTarget {
    fn bind(&mut self, width: u32, height: u32, scale: u32) -> Result<(), DisplayError> {
        if self.app.state == TargetState::Destroyed {
            return Err(DisplayError::AllocationError(
                "window was destroyed".to_string(),
            ));
        }

        self.unbind();

        let binding = Binding {
            width,
            height,
            scale,
        };
        self.app.binding = Some(binding);

        let window = match &self.app.window {
            Some(window) => {
                let window = window.clone();
                let _ = window.request_inner_size(binding.window_size());
                window.set_title(&self.app.window_title(&binding));
                window
            }
            None => match self.create_window() {
                Ok(window) => window,
                Err(e) => {
                    self.app.binding = None;
                    return Err(e);
                }
            },
        };

        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, window);

        match Pixels::new(width, height, surface_texture) {
            Ok(pixels) => self.app.pixels = Some(pixels),
            Err(e) => {
                self.app.binding = None;
                return Err(DisplayError::AllocationError(format!(
                    "cannot create pixel surface: {}",
                    e
                )));
            }
        }

        debug!("Window bound to {}x{} at {}x", width, height, scale);
        Ok(())
    }

    fn unbind(&mut self) {
        self.app.pixels = None;
        self.app.binding = None;
    }

    fn redraw(
        &mut self,
        buffer: &[Pixel],
        width: usize,
        height: usize,
    ) -> Result<(), DisplayError> {
        let (Some(pixels), Some(binding)) = (self.app.pixels.as_mut(), self.app.binding) else {
            return Ok(());
        };

        if binding.width as usize != width || binding.height as usize != height {
            return Err(DisplayError::Render(format!(
                "buffer is {}x{} but window is bound to {}x{}",
                width, height, binding.width, binding.height
            )));
        }

        let frame = pixels.frame_mut();
        for (dst, pixel) in frame.chunks_exact_mut(4).zip(buffer) {
            dst.copy_from_slice(&pixel.to_rgba());
        }

        // A hidden window keeps the copied frame; `show` requests the render
        if self.app.state != TargetState::Visible {
            return Ok(());
        }

        pixels
            .render()
            .map_err(|e| DisplayError::Render(e.to_string()))
    }

    fn pump_events(&mut self) {
        self.pump();
    }

    fn show(&mut self) {
        if self.app.state != TargetState::Hidden {
            return;
        }
        if let Some(window) = &self.app.window {
            window.set_visible(true);
            window.request_redraw();
            self.app.state = TargetState::Visible;
        }
    }

    fn destroy(&mut self) {
        if self.app.state == TargetState::Destroyed {
            return;
        }

        self.unbind();
        self.app.window = None;
        self.app.state = TargetState::Destroyed;

        // Let the platform process the window going away
        self.pump();
    }

    fn state(&self) -> TargetState {
        self.app.state
    }
}
