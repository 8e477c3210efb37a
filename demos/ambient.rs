//! Play the ambient engine through a sound card.
//!
//! Run with: cargo run --example ambient --features cpal_sink [-- device-name]
//!
//! Logs go through `RUST_LOG` (try `RUST_LOG=ambiance=debug`).

use std::thread::sleep;
use std::time::{Duration, Instant};

use ambiance::{AmbientEngine, CpalDevice, DevicePlatform, EngineConfig, Gesture, HoverTarget};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ambiance=info")))
        .init();

    for device in CpalDevice::list_outputs() {
        info!(name = device.name(), sample_rate = device.sample_rate(), channels = device.channels(), "output device");
    }

    let platform = match std::env::args().nth(1) {
        Some(name) => DevicePlatform::named(name),
        None => DevicePlatform::default(),
    };
    let config = match std::env::var("AMBIANCE_CONFIG") {
        Ok(path) => EngineConfig::load(&path).unwrap_or_else(|err| {
            warn!(path = %path, error = %err, "ignoring config");
            EngineConfig::default()
        }),
        Err(_) => EngineConfig::default(),
    };

    let mut engine = AmbientEngine::new(platform, config);

    // stand-in for the first click
    engine.handle_gesture(Gesture::PointerDown { on_hero: true });
    if !engine.is_on() {
        error!(error = ?engine.last_error(), "audio did not start");
        return;
    }

    let start = Instant::now();
    let mut hovered = 0;
    let mut footer_loops = 0;
    // off at 10s, back on at 14s
    let toggle_times = [10.0, 14.0];
    let mut toggles = toggle_times.iter().peekable();
    while start.elapsed() < Duration::from_secs(20) {
        let now = start.elapsed().as_secs_f64();
        engine.update(now);

        // a hover every few seconds
        if now as u32 / 3 > hovered {
            hovered = now as u32 / 3;
            engine.hover(HoverTarget::NavItem);
        }

        // footer animation loops once a second; the engine skips its rest periods
        if now as u32 > footer_loops {
            footer_loops = now as u32;
            engine.roo();
        }

        if toggles.peek().map_or(false, |&&at| now >= at) {
            toggles.next();
            let on = engine.toggle();
            info!(on, "toggled");
        }

        sleep(Duration::from_millis(5));
    }

    engine.teardown();
}
