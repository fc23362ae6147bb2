// Display module - Simulated IPS screen
//
// This module provides:
// - Pixel codec (grayscale and RGB565 to packed pixels)
// - Surface manager owning the pixel buffer and its lifecycle
// - Presentation pump (non-blocking present and liveness)
// - Presentation targets: a winit + pixels window and a headless sink
// - Debug overlays drawn with point writes

pub mod codec;
pub mod error;
pub mod overlay;
pub mod pump;
pub mod surface;
pub mod target;
pub mod window;

pub use codec::{from_gray8, from_rgb565, GrayTable, Pixel};
pub use error::DisplayError;
pub use overlay::draw_crosshair;
pub use pump::PresentationPump;
pub use surface::{Surface, SurfaceManager, SurfaceStatus, MAX_SCALE, MIN_SCALE};
pub use target::{HeadlessTarget, PresentationTarget, TargetEvent, TargetState};
pub use window::WindowTarget;
