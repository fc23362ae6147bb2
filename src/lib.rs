// IPS Screen Simulator Library
// Shows grayscale camera frames and colored debug points in a window

// Public modules
pub mod config;
pub mod display;
pub mod stream;

// Re-export main types for convenience
pub use config::{ConfigError, SimulatorConfig};
pub use display::{
    draw_crosshair, from_gray8, from_rgb565, DisplayError, HeadlessTarget, Pixel, PresentationPump,
    PresentationTarget, SurfaceManager, SurfaceStatus, TargetEvent, TargetState, WindowTarget,
};
pub use stream::{Frame, FrameReader};
