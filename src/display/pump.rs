// Presentation pump - Publishes the surface and keeps the viewer responsive
//
// The simulator lives inside a producer loop that must never stall on UI
// input. Both `present` and `is_open` therefore drain the target's event
// queue with a zero timeout: everything already queued is handled, nothing
// is waited for. Callers stay responsive by calling either once per frame.

use super::surface::{SurfaceManager, SurfaceState};
use super::target::PresentationTarget;
use log::{info, warn};

/// Non-blocking presentation and liveness
pub trait PresentationPump {
    /// Redraw the whole target from the current buffer, then drain pending events
    ///
    /// Does nothing when no surface exists, after teardown, or when the target
    /// is gone. Redraw failures are logged and swallowed. If the target turns
    /// out to be destroyed, the screen is torn down.
    fn present(&mut self);

    /// Whether the viewer still exists and is visible
    ///
    /// Drains pending events first so a user close is noticed even if
    /// `present` is not being called. A destroyed target tears the screen
    /// down; a hidden one does not.
    fn is_open(&mut self) -> bool;

    /// Show the viewer again after the user closed it
    fn redisplay(&mut self);
}

impl<T: PresentationTarget> PresentationPump for SurfaceManager<T> {
    fn present(&mut self) {
        if self.close_if_target_destroyed() {
            return;
        }
        let SurfaceState::Ready(surface) = &self.state else {
            return;
        };
        if !self.target.is_alive() {
            return;
        }

        if let Err(e) = self
            .target
            .redraw(surface.as_slice(), surface.width(), surface.height())
        {
            warn!("Present failed: {}", e);
        }

        self.target.pump_events();
        self.close_if_target_destroyed();
    }

    fn is_open(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }

        self.target.pump_events();
        if self.close_if_target_destroyed() {
            return false;
        }
        self.target.is_alive() && self.target.is_visible()
    }

    fn redisplay(&mut self) {
        if self.surface().is_none() || !self.target.is_alive() {
            return;
        }

        if !self.target.is_visible() {
            info!("Redisplaying viewer");
            self.target.show();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::codec::Pixel;
    use crate::display::surface::SurfaceStatus;
    use crate::display::target::{HeadlessTarget, TargetEvent, TargetState};

    fn ready_screen() -> SurfaceManager<HeadlessTarget> {
        let mut screen = SurfaceManager::new(HeadlessTarget::new(), 2);
        screen.write_frame(&[128; 12], 4, 3).unwrap();
        screen
    }

    #[test]
    fn test_present_without_surface_is_noop() {
        let mut screen = SurfaceManager::new(HeadlessTarget::new(), 2);
        screen.present();
        assert_eq!(screen.target().redraw_count(), 0);
        assert!(!screen.is_open());
    }

    #[test]
    fn test_present_blits_buffer() {
        let mut screen = ready_screen();
        screen.write_point(0, 0, 0x001F);
        screen.present();

        let target = screen.target();
        assert_eq!(target.redraw_count(), 1);
        assert_eq!(&target.frame()[0..4], &[0, 0, 255, 0xFF]);
        assert_eq!(&target.frame()[4..8], &[128, 128, 128, 0xFF]);
    }

    #[test]
    fn test_write_frame_does_not_present() {
        let screen = ready_screen();
        assert_eq!(screen.target().redraw_count(), 0);
        assert!(screen.target().frame().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_present_drains_events() {
        let mut screen = ready_screen();
        screen.target_mut().push_event(TargetEvent::CloseRequested);
        screen.present();
        assert_eq!(screen.target().pending_events(), 0);
        assert_eq!(screen.target().state(), TargetState::Hidden);
    }

    #[test]
    fn test_is_open_observes_user_close() {
        let mut screen = ready_screen();
        assert!(screen.is_open());

        screen.target_mut().push_event(TargetEvent::CloseRequested);
        assert!(!screen.is_open());

        // Hiding keeps the surface and its buffer
        assert_eq!(screen.dimensions(), Some((4, 3)));
        assert_eq!(screen.pixel(1, 1), Some(Pixel::from_rgb(128, 128, 128)));
    }

    #[test]
    fn test_redisplay_after_close_reuses_surface() {
        let mut screen = ready_screen();
        let before = screen.buffer().unwrap().as_ptr();

        screen.target_mut().push_event(TargetEvent::CloseRequested);
        assert!(!screen.is_open());

        screen.redisplay();
        assert!(screen.is_open());

        screen.write_frame(&[10; 12], 4, 3).unwrap();
        assert_eq!(screen.buffer().unwrap().as_ptr(), before);
        assert_eq!(screen.allocations(), 1);
    }

    #[test]
    fn test_present_while_hidden_still_blits() {
        let mut screen = ready_screen();
        screen.target_mut().push_event(TargetEvent::CloseRequested);
        screen.present();
        screen.present();
        assert_eq!(screen.target().redraw_count(), 2);
    }

    #[test]
    fn test_destroyed_target_is_not_open() {
        let mut screen = ready_screen();
        screen.target_mut().push_event(TargetEvent::Destroyed);
        assert!(!screen.is_open());

        // The buffer goes with the target
        assert_eq!(screen.status(), SurfaceStatus::Closed);
        assert!(screen.buffer().is_none());
        assert!(!screen.has_gray_table());

        screen.present();
        assert_eq!(screen.target().redraw_count(), 0);

        screen.redisplay();
        assert!(!screen.is_open());
    }

    #[test]
    fn test_destroy_during_present_closes_screen() {
        let mut screen = ready_screen();
        screen.target_mut().push_event(TargetEvent::Destroyed);
        screen.present();

        assert_eq!(screen.target().redraw_count(), 1);
        assert_eq!(screen.status(), SurfaceStatus::Closed);

        // Later frames are dropped instead of failing to allocate
        assert!(screen.write_frame(&[5; 48], 8, 6).is_ok());
        assert_eq!(screen.status(), SurfaceStatus::Closed);
        assert_eq!(screen.allocations(), 1);
    }

    #[test]
    fn test_pump_after_teardown() {
        let mut screen = ready_screen();
        screen.teardown();
        screen.present();
        screen.redisplay();
        assert!(!screen.is_open());
        assert_eq!(screen.target().redraw_count(), 0);
    }
}
