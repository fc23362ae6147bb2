// Common test utilities for simulator integration tests
//
// Shared helpers for building screens and synthetic frames.

#![allow(dead_code)]

use ips_sim::{HeadlessTarget, SurfaceManager};

/// Camera frame width used by the default configuration
pub const CAMERA_WIDTH: usize = 188;

/// Camera frame height used by the default configuration
pub const CAMERA_HEIGHT: usize = 120;

/// Create a headless screen at 2x scale
pub fn headless_screen() -> SurfaceManager<HeadlessTarget> {
    SurfaceManager::new(HeadlessTarget::new(), 2)
}

/// A frame where every sample has the same value
pub fn uniform_frame(width: usize, height: usize, value: u8) -> Vec<u8> {
    vec![value; width * height]
}

/// A frame whose samples count up row by row, wrapping at 256
pub fn ramp_frame(width: usize, height: usize) -> Vec<u8> {
    (0..width * height).map(|i| (i % 256) as u8).collect()
}

/// Concatenate frames into one byte stream
pub fn stream_of(frames: &[Vec<u8>]) -> Vec<u8> {
    frames.iter().flatten().copied().collect()
}
