// IPS Screen Simulator - Main Entry Point
//
// Reads raw grayscale frames from stdin and shows them in a simulated IPS
// screen window. Pipe a frame source into it:
//
//   frame-source | ips-sim [config.toml]

use ips_sim::config::{SimulatorConfig, CONFIG_FILE};
use ips_sim::display::{
    draw_crosshair, HeadlessTarget, PresentationPump, PresentationTarget, SurfaceManager,
    WindowTarget,
};
use ips_sim::stream::FrameReader;
use log::{info, warn};
use std::io;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!(
        "IPS Screen Simulator (ips-sim) v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load or create configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| CONFIG_FILE.to_string());
    let config = SimulatorConfig::load_or_default(&config_path);
    config.validate()?;

    info!("Configuration loaded from '{}'", config_path);
    info!(
        "  Frame: {}x{} ({} bytes)",
        config.stream.width,
        config.stream.height,
        config.stream.frame_size()
    );
    info!("  Scale: {}x", config.display.scale);

    if config.display.headless {
        info!("  Target: headless");
        let screen = SurfaceManager::new(HeadlessTarget::new(), config.display.scale);
        run(screen, &config)
    } else {
        info!("  Target: window");
        let target = WindowTarget::new(&config.display.title)?;
        let screen = SurfaceManager::new(target, config.display.scale);
        run(screen, &config)
    }
}

/// Feed frames from stdin to the screen until the stream ends
fn run<T: PresentationTarget>(
    mut screen: SurfaceManager<T>,
    config: &SimulatorConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = (config.stream.width, config.stream.height);
    let center = (to_coordinate(width / 2), to_coordinate(height / 2));
    let arm = to_coordinate(config.overlay.arm);
    let stdin = io::stdin();
    let mut reader = FrameReader::new(stdin.lock(), width, height);
    let mut viewer_closed = false;

    info!("Waiting for frames on stdin...");

    while let Some(frame) = reader.next_frame()? {
        if let Err(e) = screen.write_frame(frame.as_slice(), width, height) {
            warn!("Frame skipped: {}", e);
            continue;
        }

        if config.overlay.crosshair {
            let (cx, cy) = center;
            draw_crosshair(&mut screen, cx, cy, arm, config.overlay.color);
        }

        screen.present();

        // Keep draining the stream after a close so the producer never stalls
        let open = screen.is_open();
        if !open && !viewer_closed {
            info!("Viewer closed, still consuming frames");
        }
        viewer_closed = !open;
    }

    info!(
        "End of stream: {} frames shown, {} partial frames dropped",
        reader.frames_read(),
        reader.frames_dropped()
    );

    screen.teardown();
    Ok(())
}

/// Convert a size to a point coordinate, saturating at `i32::MAX`
fn to_coordinate<N: TryInto<i32>>(value: N) -> i32 {
    value.try_into().unwrap_or(i32::MAX)
}
