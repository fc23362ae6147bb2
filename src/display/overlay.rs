// Debug overlays drawn on top of a frame with point writes

use super::surface::SurfaceManager;
use super::target::PresentationTarget;
use std::ops::RangeInclusive;

/// Draw a plus-shaped marker centered on `(cx, cy)`
///
/// Each arm is `arm` pixels long; a negative length draws only the center.
/// Only the part of each arm that lies on the surface is walked, so very long
/// arms cost no more than the surface size.
///
/// # Arguments
/// * `screen` - Surface to draw on
/// * `cx`, `cy` - Center of the marker
/// * `arm` - Arm length in pixels
/// * `color` - RGB565 color
pub fn draw_crosshair<T: PresentationTarget>(
    screen: &mut SurfaceManager<T>,
    cx: i32,
    cy: i32,
    arm: i32,
    color: u16,
) {
    let Some((width, height)) = screen.dimensions() else {
        return;
    };
    let arm = arm.max(0);

    for x in visible_span(cx, arm, width) {
        screen.write_point(x, cy, color);
    }
    for y in visible_span(cy, arm, height) {
        screen.write_point(cx, y, color);
    }
}

/// The part of `center - arm..=center + arm` that lies in `0..len`
fn visible_span(center: i32, arm: i32, len: usize) -> RangeInclusive<i32> {
    let last = i32::try_from(len).unwrap_or(i32::MAX).saturating_sub(1);
    let start = center.saturating_sub(arm).max(0);
    let end = center.saturating_add(arm).min(last);
    start..=end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::codec::Pixel;
    use crate::display::target::HeadlessTarget;

    fn blank_screen(width: usize, height: usize) -> SurfaceManager<HeadlessTarget> {
        let mut screen = SurfaceManager::new(HeadlessTarget::new(), 1);
        screen
            .write_frame(&vec![0; width * height], width, height)
            .unwrap();
        screen
    }

    fn lit(screen: &SurfaceManager<HeadlessTarget>) -> usize {
        screen
            .buffer()
            .unwrap()
            .iter()
            .filter(|&&p| p != Pixel::BLACK)
            .count()
    }

    #[test]
    fn test_crosshair_shape() {
        let mut screen = blank_screen(9, 9);
        draw_crosshair(&mut screen, 4, 4, 2, 0x07E0);

        // Two arms of 5 pixels sharing the center
        assert_eq!(lit(&screen), 9);
        assert_eq!(screen.pixel(4, 4).unwrap().channels(), (0, 255, 0));
        assert_eq!(screen.pixel(2, 4).unwrap().channels(), (0, 255, 0));
        assert_eq!(screen.pixel(4, 6).unwrap().channels(), (0, 255, 0));
        assert_eq!(screen.pixel(3, 3), Some(Pixel::BLACK));
    }

    #[test]
    fn test_crosshair_clipped_at_corner() {
        let mut screen = blank_screen(4, 4);
        draw_crosshair(&mut screen, 0, 0, 3, 0xFFFF);

        // Only the in-bounds halves remain
        assert_eq!(lit(&screen), 7);
    }

    #[test]
    fn test_crosshair_long_arms_span_the_surface() {
        let mut screen = blank_screen(9, 9);
        draw_crosshair(&mut screen, 4, 4, i32::MAX, 0xFFFF);

        // Full row plus full column, sharing the center
        assert_eq!(lit(&screen), 17);
    }

    #[test]
    fn test_crosshair_center_off_surface() {
        let mut screen = blank_screen(9, 9);
        draw_crosshair(&mut screen, -3, 4, 5, 0xFFFF);

        // Only the tip of the right arm reaches the surface
        assert_eq!(lit(&screen), 3);
        assert_eq!(screen.pixel(2, 4).unwrap().channels(), (255, 255, 255));
    }

    #[test]
    fn test_crosshair_without_surface() {
        let mut screen = SurfaceManager::new(HeadlessTarget::new(), 1);
        draw_crosshair(&mut screen, 0, 0, 5, 0xFFFF);
        assert!(screen.buffer().is_none());
    }
}
