// Surface simulator integration tests
// Drive the public API the way a frame source does

mod common;

use common::*;
use ips_sim::*;

#[test_log::test]
fn test_uniform_gray_frame_reads_back() {
    let mut screen = headless_screen();
    screen.write_frame(&uniform_frame(4, 3, 128), 4, 3).unwrap();

    let buffer = screen.buffer().unwrap();
    assert_eq!(buffer.len(), 12);
    assert!(buffer.iter().all(|p| p.channels() == (128, 128, 128)));
}

#[test_log::test]
fn test_same_dimensions_do_not_reallocate() {
    let mut screen = headless_screen();
    let first = screen.ensure_surface(100, 80).unwrap().as_slice().as_ptr();
    let second = screen.ensure_surface(100, 80).unwrap().as_slice().as_ptr();

    assert_eq!(first, second);
    assert_eq!(screen.allocations(), 1);
}

#[test_log::test]
fn test_resize_starts_from_blank_buffer() {
    let mut screen = headless_screen();
    let white = uniform_frame(100, 80, 255);
    screen.write_frame(&white, 100, 80).unwrap();

    let surface = screen.ensure_surface(50, 50).unwrap();
    assert_eq!(surface.as_slice().len(), 50 * 50);
    assert!(surface.as_slice().iter().all(|&p| p == Pixel::BLACK));
    assert_eq!(screen.target().surface_size(), Some((100, 100)));
}

#[test_log::test]
fn test_short_frame_is_rejected() {
    let mut screen = headless_screen();
    screen.write_frame(&uniform_frame(4, 3, 30), 4, 3).unwrap();

    let result = screen.write_frame(&[200; 4 * 3 - 1], 4, 3);
    assert!(matches!(result, Err(DisplayError::InvalidArgument(_))));

    let buffer = screen.buffer().unwrap();
    assert!(buffer.iter().all(|p| p.channels() == (30, 30, 30)));
}

#[test_log::test]
fn test_edge_points_are_ignored() {
    let mut screen = headless_screen();
    let frame = ramp_frame(CAMERA_WIDTH, CAMERA_HEIGHT);
    screen
        .write_frame(&frame, CAMERA_WIDTH, CAMERA_HEIGHT)
        .unwrap();
    let before = screen.buffer().unwrap().to_vec();

    screen.write_point(-1, 0, 0xFFFF);
    screen.write_point(CAMERA_WIDTH as i32, 0, 0xFFFF);

    assert_eq!(screen.buffer().unwrap(), &before[..]);
}

#[test_log::test]
fn test_points_survive_until_next_frame() {
    let mut screen = headless_screen();
    screen.write_frame(&uniform_frame(8, 8, 0), 8, 8).unwrap();
    screen.write_point(1, 1, 0xF800);
    screen.write_point(2, 2, 0x07E0);
    screen.present();

    let frame = screen.target().frame();
    let offset = |x: usize, y: usize| (y * 8 + x) * 4;
    assert_eq!(&frame[offset(1, 1)..offset(1, 1) + 4], &[255, 0, 0, 255]);
    assert_eq!(&frame[offset(2, 2)..offset(2, 2) + 4], &[0, 255, 0, 255]);

    // A new frame overwrites the points
    screen.write_frame(&uniform_frame(8, 8, 0), 8, 8).unwrap();
    assert_eq!(screen.pixel(1, 1), Some(Pixel::BLACK));
}

#[test_log::test]
fn test_allocation_failure_then_recovery() {
    let mut screen = headless_screen();
    screen.target_mut().fail_next_binds(1);

    let result = screen.write_frame(&uniform_frame(4, 3, 1), 4, 3);
    assert!(matches!(result, Err(DisplayError::AllocationError(_))));
    assert_eq!(screen.status(), SurfaceStatus::Uninitialized);

    // The next frame retries allocation
    screen.write_frame(&uniform_frame(4, 3, 1), 4, 3).unwrap();
    assert_eq!(screen.dimensions(), Some((4, 3)));
}

#[test_log::test]
fn test_user_close_hides_without_destroying() {
    let mut screen = headless_screen();
    screen.write_frame(&uniform_frame(4, 3, 77), 4, 3).unwrap();
    screen.present();
    assert!(screen.is_open());

    screen.target_mut().push_event(TargetEvent::CloseRequested);
    assert!(!screen.is_open());
    assert_eq!(screen.target().state(), TargetState::Hidden);
    assert_eq!(screen.allocations(), 1);

    screen.redisplay();
    assert!(screen.is_open());
    screen.present();
    assert_eq!(screen.allocations(), 1);
}

#[test_log::test]
fn test_external_destroy_releases_surface() {
    let mut screen = headless_screen();
    screen.write_frame(&uniform_frame(4, 3, 9), 4, 3).unwrap();
    screen.target_mut().push_event(TargetEvent::Destroyed);

    assert!(!screen.is_open());
    assert_eq!(screen.status(), SurfaceStatus::Closed);
    assert!(screen.buffer().is_none());

    // Frames of any size are dropped, never reported as allocation errors
    assert!(screen.write_frame(&uniform_frame(4, 3, 9), 4, 3).is_ok());
    assert!(screen.write_frame(&uniform_frame(8, 6, 9), 8, 6).is_ok());
    assert_eq!(screen.status(), SurfaceStatus::Closed);
    assert_eq!(screen.allocations(), 1);
}

#[test_log::test]
fn test_teardown_is_terminal_and_idempotent() {
    let mut screen = headless_screen();
    screen.write_frame(&uniform_frame(4, 3, 5), 4, 3).unwrap();

    screen.teardown();
    screen.teardown();

    assert_eq!(screen.status(), SurfaceStatus::Closed);
    assert!(!screen.is_open());
    assert!(screen.write_frame(&uniform_frame(4, 3, 5), 4, 3).is_ok());
    screen.write_point(0, 0, 0xFFFF);
    screen.present();
    assert!(screen.buffer().is_none());
    assert_eq!(screen.target().state(), TargetState::Destroyed);
}
