// Surface manager - Owns the simulated screen's pixel buffer
//
// The surface is created lazily by the first frame, reused while the frame
// dimensions stay the same, and rebuilt from scratch when they change.
// Buffer and target binding are always acquired and released together.
//
// Surface lifecycle:
//   Uninitialized -> Ready(w, h) -> Ready(w', h') -> ... -> Closed (terminal)
//
// A target destroyed from outside (window gone, event loop exited) cannot be
// bound again, so the manager closes itself the next time it notices.

use super::codec::{from_rgb565, GrayTable, Pixel};
use super::error::DisplayError;
use super::target::{PresentationTarget, TargetState};
use log::{debug, error, info, trace};

/// Smallest supported display scale
pub const MIN_SCALE: u32 = 1;

/// Largest supported display scale
pub const MAX_SCALE: u32 = 8;

/// Pixel buffer sized to the current frame dimensions
///
/// Pixels are stored row-major, top row first.
#[derive(Debug)]
pub struct Surface {
    width: usize,
    height: usize,
    buffer: Vec<Pixel>,
}

impl Surface {
    /// Allocate a black surface, reporting allocation failure instead of aborting
    fn allocate(width: usize, height: usize) -> Result<Self, DisplayError> {
        let len = pixel_count(width, height)?;

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(len).map_err(|e| {
            DisplayError::AllocationError(format!(
                "cannot allocate {}x{} surface: {}",
                width, height, e
            ))
        })?;
        buffer.resize(len, Pixel::BLACK);

        Ok(Self {
            width,
            height,
            buffer,
        })
    }

    /// Surface width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Surface height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw pixel data
    pub fn as_slice(&self) -> &[Pixel] {
        &self.buffer
    }

    /// Read a pixel; `None` outside the surface
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Pixel> {
        self.offset(x, y).map(|offset| self.buffer[offset])
    }

    /// Write a pixel; ignored outside the surface
    #[inline]
    fn set_pixel(&mut self, x: i32, y: i32, pixel: Pixel) {
        if let Some(offset) = self.offset(x, y) {
            self.buffer[offset] = pixel;
        }
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }
}

/// Coarse state of a surface manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceStatus {
    /// No surface allocated yet (or the last allocation failed)
    Uninitialized,
    /// A surface of the given dimensions is bound
    Ready {
        /// Width in pixels
        width: usize,
        /// Height in pixels
        height: usize,
    },
    /// Torn down for good
    Closed,
}

pub(super) enum SurfaceState {
    Uninitialized,
    Ready(Surface),
    Closed,
}

/// Owner of the simulated screen
///
/// Holds the pixel buffer, the presentation target it is bound to, and the
/// cached grayscale table. All mutation goes through `write_frame` and
/// `write_point`; `present`/`is_open` come from `PresentationPump`.
///
/// Dropping the manager tears it down.
pub struct SurfaceManager<T: PresentationTarget> {
    pub(super) target: T,
    pub(super) state: SurfaceState,
    scale: u32,
    gray_table: Option<Box<GrayTable>>,
    allocations: u64,
}

impl<T: PresentationTarget> SurfaceManager<T> {
    /// Create a manager presenting through `target` at `scale`x
    ///
    /// No surface exists until the first frame arrives.
    ///
    /// # Arguments
    /// * `target` - Presentation target to bind surfaces to
    /// * `scale` - Display magnification, clamped to 1x..8x
    pub fn new(target: T, scale: u32) -> Self {
        Self {
            target,
            state: SurfaceState::Uninitialized,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
            gray_table: None,
            allocations: 0,
        }
    }

    /// Make sure a surface of `width x height` exists
    ///
    /// Reuses the current surface when the dimensions match. Otherwise the
    /// old buffer and binding are released before new ones are created; if
    /// that fails the manager is left uninitialized and the next call retries.
    ///
    /// # Errors
    /// * `InvalidArgument` - zero or overflowing dimensions
    /// * `AllocationError` - the buffer or the target binding failed
    /// * `Closed` - the manager was torn down, or its target was destroyed
    pub fn ensure_surface(
        &mut self,
        width: usize,
        height: usize,
    ) -> Result<&Surface, DisplayError> {
        self.ensure_surface_mut(width, height)
            .map(|surface| &*surface)
    }

    fn ensure_surface_mut(
        &mut self,
        width: usize,
        height: usize,
    ) -> Result<&mut Surface, DisplayError> {
        self.close_if_target_destroyed();
        let (target_width, target_height) = target_dimensions(width, height, self.scale)?;

        let reuse = match &self.state {
            SurfaceState::Closed => return Err(DisplayError::Closed),
            SurfaceState::Ready(surface) => surface.width == width && surface.height == height,
            SurfaceState::Uninitialized => false,
        };

        if !reuse {
            self.release_surface();

            let surface = Surface::allocate(width, height).inspect_err(|e| {
                error!("Failed to create {}x{} surface: {}", width, height, e);
            })?;

            self.target
                .bind(target_width, target_height, self.scale)
                .inspect_err(|e| {
                    error!("Failed to bind {}x{} surface: {}", width, height, e);
                })?;

            self.allocations += 1;
            debug!(
                "Surface ready: {}x{} (shown at {}x{})",
                width,
                height,
                width * self.scale as usize,
                height * self.scale as usize
            );
            self.state = SurfaceState::Ready(surface);
        }

        match &mut self.state {
            SurfaceState::Ready(surface) => Ok(surface),
            _ => Err(DisplayError::AllocationError(
                "surface vanished after allocation".to_string(),
            )),
        }
    }

    /// Upload a full grayscale frame
    ///
    /// Every sample becomes an achromatic pixel at the same row-major offset.
    /// The frame is not presented; batch point writes first, then call
    /// `present`. After teardown this does nothing.
    ///
    /// # Arguments
    /// * `samples` - Exactly `width * height` grayscale bytes
    /// * `width` - Frame width in pixels
    /// * `height` - Frame height in pixels
    ///
    /// # Errors
    /// `InvalidArgument` when the sample count does not match the dimensions;
    /// the current surface is left untouched. Errors from `ensure_surface`
    /// are passed through.
    pub fn write_frame(
        &mut self,
        samples: &[u8],
        width: usize,
        height: usize,
    ) -> Result<(), DisplayError> {
        self.close_if_target_destroyed();
        if self.is_closed() {
            trace!("Frame dropped, surface is closed");
            return Ok(());
        }

        let expected = pixel_count(width, height)?;
        if samples.len() != expected {
            return Err(DisplayError::InvalidArgument(format!(
                "frame has {} bytes, {}x{} needs {}",
                samples.len(),
                width,
                height,
                expected
            )));
        }

        self.ensure_surface_mut(width, height)?;

        let table = self.gray_table.get_or_insert_with(Box::default);
        if let SurfaceState::Ready(surface) = &mut self.state {
            table.convert_into(samples, &mut surface.buffer);
        }

        trace!("Frame written: {}x{}", width, height);
        Ok(())
    }

    /// Write one RGB565 point
    ///
    /// Ignored when `(x, y)` lies outside the surface, when no surface
    /// exists yet, or after teardown.
    #[inline]
    pub fn write_point(&mut self, x: i32, y: i32, color: u16) {
        self.close_if_target_destroyed();
        if let SurfaceState::Ready(surface) = &mut self.state {
            surface.set_pixel(x, y, from_rgb565(color));
        }
    }

    /// Release everything and close the manager for good
    ///
    /// Drops the buffer, the target binding and the grayscale table, then
    /// destroys the target. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.is_closed() {
            return;
        }

        self.release_surface();
        self.gray_table = None;
        self.target.destroy();
        self.state = SurfaceState::Closed;

        info!("Screen torn down");
    }

    /// Close the manager if its target was destroyed underneath it
    ///
    /// Returns `true` when this call closed the manager.
    pub(super) fn close_if_target_destroyed(&mut self) -> bool {
        if self.is_closed() || self.target.state() != TargetState::Destroyed {
            return false;
        }

        info!("Presentation target was destroyed, closing screen");
        self.teardown();
        true
    }

    fn release_surface(&mut self) {
        if let SurfaceState::Ready(old) = &self.state {
            debug!("Releasing {}x{} surface", old.width, old.height);
            self.target.unbind();
            self.state = SurfaceState::Uninitialized;
        }
    }

    /// Current state
    pub fn status(&self) -> SurfaceStatus {
        match &self.state {
            SurfaceState::Uninitialized => SurfaceStatus::Uninitialized,
            SurfaceState::Ready(surface) => SurfaceStatus::Ready {
                width: surface.width,
                height: surface.height,
            },
            SurfaceState::Closed => SurfaceStatus::Closed,
        }
    }

    /// Whether `teardown` has run
    pub fn is_closed(&self) -> bool {
        matches!(self.state, SurfaceState::Closed)
    }

    /// The current surface, if any
    pub fn surface(&self) -> Option<&Surface> {
        match &self.state {
            SurfaceState::Ready(surface) => Some(surface),
            _ => None,
        }
    }

    /// Dimensions of the current surface
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.surface().map(|s| (s.width, s.height))
    }

    /// Pixel data of the current surface
    pub fn buffer(&self) -> Option<&[Pixel]> {
        self.surface().map(Surface::as_slice)
    }

    /// Read back one pixel of the current surface
    pub fn pixel(&self, x: i32, y: i32) -> Option<Pixel> {
        self.surface().and_then(|s| s.get_pixel(x, y))
    }

    /// Display magnification
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Number of surfaces allocated so far
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Whether the grayscale table is currently cached
    pub fn has_gray_table(&self) -> bool {
        self.gray_table.is_some()
    }

    /// The presentation target
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Mutable access to the presentation target
    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }
}

impl<T: PresentationTarget> Drop for SurfaceManager<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// `width * height`, rejecting empty and overflowing dimensions
fn pixel_count(width: usize, height: usize) -> Result<usize, DisplayError> {
    if width == 0 || height == 0 {
        return Err(DisplayError::InvalidArgument(format!(
            "dimensions must be positive, got {}x{}",
            width, height
        )));
    }

    width.checked_mul(height).ok_or_else(|| {
        DisplayError::InvalidArgument(format!("{}x{} overflows the pixel count", width, height))
    })
}

/// Validate dimensions and convert them for the presentation target
///
/// Both the buffer size and the scaled on-screen size must fit in `u32`.
fn target_dimensions(width: usize, height: usize, scale: u32) -> Result<(u32, u32), DisplayError> {
    pixel_count(width, height)?;

    match (scaled_fits(width, scale), scaled_fits(height, scale)) {
        (Some(width), Some(height)) => Ok((width, height)),
        _ => Err(DisplayError::InvalidArgument(format!(
            "{}x{} at {}x is too large to display",
            width, height, scale
        ))),
    }
}

/// `value` as `u32`, provided `value * scale` fits as well
fn scaled_fits(value: usize, scale: u32) -> Option<u32> {
    let value = u32::try_from(value).ok()?;
    value.checked_mul(scale).map(|_| value)
}
