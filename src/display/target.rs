// Presentation targets - Where the surface buffer ends up on screen
//
// The surface manager talks to its target through `PresentationTarget`:
// - `WindowTarget` (window.rs) blits into a winit window through pixels
// - `HeadlessTarget` keeps the presented frame in memory
//
// Target lifecycle:
//   NotCreated -> Visible -> Hidden (user closed) -> Visible (redisplay)
//   any state  -> Destroyed (terminal)

use super::codec::Pixel;
use super::error::DisplayError;
use log::{debug, info, trace};
use std::collections::VecDeque;

/// Lifecycle state of a presentation target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    /// No on-screen surface exists yet
    NotCreated,
    /// Shown to the user
    Visible,
    /// Closed by the user; still alive and bound
    Hidden,
    /// Released for good
    Destroyed,
}

/// On-screen sink for a surface buffer
///
/// Implementations must never block: `pump_events` handles only the events
/// that are already queued and returns, even when there are none.
pub trait PresentationTarget {
    /// Bind a buffer of `width x height` pixels, displayed at `scale`x
    ///
    /// Creates the on-screen surface on first use. Any previous binding is
    /// released first.
    fn bind(&mut self, width: u32, height: u32, scale: u32) -> Result<(), DisplayError>;

    /// Release the current buffer binding, keeping the target itself
    fn unbind(&mut self);

    /// Mark the whole target dirty and redraw it from `buffer` right away
    fn redraw(&mut self, buffer: &[Pixel], width: usize, height: usize) -> Result<(), DisplayError>;

    /// Drain pending UI/system events without waiting for new ones
    fn pump_events(&mut self);

    /// Show a hidden target again
    fn show(&mut self);

    /// Destroy the target; it cannot be bound again
    fn destroy(&mut self);

    /// Current lifecycle state
    fn state(&self) -> TargetState;

    /// Whether the target still exists
    fn is_alive(&self) -> bool {
        matches!(self.state(), TargetState::Visible | TargetState::Hidden)
    }

    /// Whether the target is shown to the user
    fn is_visible(&self) -> bool {
        self.state() == TargetState::Visible
    }
}

/// Events a headless target can be fed to mimic a windowing system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEvent {
    /// The user pressed the close button
    CloseRequested,
    /// The on-screen surface went away underneath us
    Destroyed,
}

/// In-memory presentation target
///
/// Keeps the last presented frame as RGBA bytes and counts binds and redraws.
/// Events are queued with `push_event` and only take effect once pumped.
pub struct HeadlessTarget {
    state: TargetState,
    binding: Option<(u32, u32)>,
    scale: u32,
    frame: Vec<u8>,
    pending: VecDeque<TargetEvent>,
    binds: u64,
    redraws: u64,
    failing_binds: u32,
}

impl HeadlessTarget {
    /// Create a headless target; nothing is bound until the first `bind`
    pub fn new() -> Self {
        Self {
            state: TargetState::NotCreated,
            binding: None,
            scale: 1,
            frame: Vec::new(),
            pending: VecDeque::new(),
            binds: 0,
            redraws: 0,
            failing_binds: 0,
        }
    }

    /// Queue an event for the next `pump_events`
    pub fn push_event(&mut self, event: TargetEvent) {
        self.pending.push_back(event);
    }

    /// Number of events waiting to be pumped
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    /// Make the next `count` calls to `bind` fail with an allocation error
    pub fn fail_next_binds(&mut self, count: u32) {
        self.failing_binds = count;
    }

    /// Buffer dimensions of the current binding
    pub fn binding(&self) -> Option<(u32, u32)> {
        self.binding
    }

    /// Size of the simulated on-screen area (buffer size times scale)
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        let (width, height) = self.binding?;
        let scaled = |value: u32| value.saturating_mul(self.scale);
        Some((scaled(width), scaled(height)))
    }

    /// Last presented frame as RGBA bytes
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Number of successful binds
    pub fn bind_count(&self) -> u64 {
        self.binds
    }

    /// Number of completed redraws
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }
}

impl Default for HeadlessTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationTarget for HeadlessTarget {
    fn bind(&mut self, width: u32, height: u32, scale: u32) -> Result<(), DisplayError> {
        if self.state == TargetState::Destroyed {
            return Err(DisplayError::AllocationError(
                "headless target was destroyed".to_string(),
            ));
        }

        self.unbind();

        if self.failing_binds > 0 {
            self.failing_binds -= 1;
            return Err(DisplayError::AllocationError(
                "injected bind failure".to_string(),
            ));
        }

        if self.state == TargetState::NotCreated {
            self.state = TargetState::Visible;
        }

        self.binding = Some((width, height));
        self.scale = scale;
        self.frame = vec![0; width as usize * height as usize * 4];
        self.binds += 1;

        debug!(
            "Headless target bound to {}x{} at {}x",
            width, height, scale
        );
        Ok(())
    }

    fn unbind(&mut self) {
        self.binding = None;
        self.frame = Vec::new();
    }

    fn redraw(
        &mut self,
        buffer: &[Pixel],
        width: usize,
        height: usize,
    ) -> Result<(), DisplayError> {
        if !self.is_alive() || self.binding.is_none() {
            return Ok(());
        }

        if self.binding != Some((width as u32, height as u32)) {
            return Err(DisplayError::Render(format!(
                "buffer is {}x{} but target is bound to {:?}",
                width, height, self.binding
            )));
        }

        for (dst, pixel) in self.frame.chunks_exact_mut(4).zip(buffer) {
            dst.copy_from_slice(&pixel.to_rgba());
        }
        self.redraws += 1;

        trace!("Headless redraw #{}", self.redraws);
        Ok(())
    }

    fn pump_events(&mut self) {
        while let Some(event) = self.pending.pop_front() {
            match event {
                TargetEvent::CloseRequested => {
                    if self.state == TargetState::Visible {
                        info!("Viewer closed by user, hiding");
                        self.state = TargetState::Hidden;
                    }
                }
                TargetEvent::Destroyed => {
                    self.destroy();
                }
            }
        }
    }

    fn show(&mut self) {
        if self.state == TargetState::Hidden {
            self.state = TargetState::Visible;
        }
    }

    fn destroy(&mut self) {
        self.unbind();
        self.pending.clear();
        self.state = TargetState::Destroyed;
    }

    fn state(&self) -> TargetState {
        self.state
    }
}
