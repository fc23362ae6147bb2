// Pixel codec - Converts incoming sample formats into packed pixels
//
// Two formats cross the simulator boundary:
// - 8-bit grayscale samples from the camera frame stream
// - 16-bit RGB565 colors for individual debug points
//
// Both are expanded into a packed 0x00RRGGBB pixel. The high byte is ignored.

/// Largest value of a 5-bit channel (red, blue)
const MAX_5BIT: u32 = 0x1F;

/// Largest value of a 6-bit channel (green)
const MAX_6BIT: u32 = 0x3F;

/// Packed color pixel
///
/// Stored as a 32-bit value: 0x00RRGGBB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pixel(pub u32);

impl Pixel {
    /// Opaque black, the contents of a freshly allocated surface
    pub const BLACK: Pixel = Pixel(0x000000);

    /// Opaque white
    pub const WHITE: Pixel = Pixel(0xFFFFFF);

    /// Build a pixel from 8-bit channels
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Pixel(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Red channel
    #[inline]
    pub const fn red(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// Green channel
    #[inline]
    pub const fn green(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// Blue channel
    #[inline]
    pub const fn blue(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// All three channels as (R, G, B)
    #[inline]
    pub const fn channels(self) -> (u8, u8, u8) {
        (self.red(), self.green(), self.blue())
    }

    /// Convert to the RGBA byte layout expected by the pixels crate
    ///
    /// # Returns
    /// Array of [R, G, B, A] bytes
    #[inline]
    pub const fn to_rgba(self) -> [u8; 4] {
        [
            self.red(),
            self.green(),
            self.blue(),
            0xFF, // Alpha (fully opaque)
        ]
    }
}

/// Convert an 8-bit grayscale sample into an achromatic pixel
#[inline]
pub const fn from_gray8(value: u8) -> Pixel {
    Pixel::from_rgb(value, value, value)
}

/// Convert a 16-bit RGB565 color into a pixel
///
/// Red lives in bits 15..11, green in bits 10..5 and blue in bits 4..0.
/// Each channel is scaled to 8 bits rounding to nearest, so the low end of
/// every ramp stays distinguishable from black.
///
/// # Arguments
/// * `value` - RGB565 color
#[inline]
pub const fn from_rgb565(value: u16) -> Pixel {
    let value = value as u32;
    let r5 = (value >> 11) & MAX_5BIT;
    let g6 = (value >> 5) & MAX_6BIT;
    let b5 = value & MAX_5BIT;

    Pixel::from_rgb(
        expand_channel(r5, MAX_5BIT),
        expand_channel(g6, MAX_6BIT),
        expand_channel(b5, MAX_5BIT),
    )
}

/// Scale `component` from `0..=max` to `0..=255`, rounding to nearest
#[inline]
const fn expand_channel(component: u32, max: u32) -> u8 {
    ((component * 255 + max / 2) / max) as u8
}

/// Precomputed grayscale lookup table
///
/// One entry per 8-bit sample. The surface manager builds it on the first
/// frame and drops it on teardown.
pub struct GrayTable {
    entries: [Pixel; 256],
}

impl GrayTable {
    /// Build the full 256-entry table
    pub fn new() -> Self {
        let mut entries = [Pixel::BLACK; 256];
        for (value, entry) in entries.iter_mut().enumerate() {
            *entry = from_gray8(value as u8);
        }
        Self { entries }
    }

    /// Look up the pixel for a grayscale sample
    #[inline]
    pub fn lookup(&self, value: u8) -> Pixel {
        self.entries[value as usize]
    }

    /// Convert a run of samples into `output`, element by element
    ///
    /// Stops at the shorter of the two slices.
    pub fn convert_into(&self, samples: &[u8], output: &mut [Pixel]) {
        for (dst, &sample) in output.iter_mut().zip(samples) {
            *dst = self.lookup(sample);
        }
    }
}

impl Default for GrayTable {
    fn default() -> Self {
        Self::new()
    }
}
