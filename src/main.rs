// Ici on importe depuis la crate lib complète
use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use particlize_sim::utils::show_rust_core_dependencies;
use particlize_sim::{
    ControllerEvent, MonotonicClock, ParticleEffect, ParticlizeConfig, ParticlizeController,
    PixelBuffer,
};

const CONFIG_PATH: &str = "assets/config/particlize.toml";

/// Dégradé opaque utilisé quand aucune image n'est fournie.
fn demo_gradient(width: u32, height: u32) -> PixelBuffer {
    let mut pixels = PixelBuffer::filled(width, height, [0, 0, 0, 0]);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            pixels.set_pixel(x, y, [r, g, 200, 255]);
        }
    }
    pixels
}

/// Démo sans fenêtre : `particlize_sim [image] [disintegration|assembly]`
fn main() -> Result<()> {
    env_logger::init();

    info!("🚀 Starting Particlize Simulator...");

    show_rust_core_dependencies();

    let config = ParticlizeConfig::from_file(CONFIG_PATH).unwrap_or_default();
    info!("Particlize config loaded:\n{:#?}", config);

    let mut args = std::env::args().skip(1);
    let pixels = match args.next() {
        Some(path) => PixelBuffer::open(&path)?,
        None => demo_gradient(320, 200),
    };
    let effect = match args.next() {
        Some(name) => name.parse::<ParticleEffect>()?,
        None => ParticleEffect::default(),
    };
    info!(
        "Source content: {}x{} pixels, effect = {:?}",
        pixels.width(),
        pixels.height(),
        effect
    );

    // le pire cas : capture + durée de tous les cycles, avec marge
    let duration = Duration::from_millis(config.animation.duration_ms);
    let repeats = config.animation.repeat_count.max(0) as u32 + 1;
    let deadline = duration * repeats + Duration::from_millis(config.runtime.capture_timeout_ms);

    let mut controller = ParticlizeController::new(Arc::new(MonotonicClock::new()));
    let events = controller.events();

    controller.start(effect, config, || info!("🎉 Completion callback invoked"))?;

    let mut redraws = 0u64;
    loop {
        match events.recv_timeout(deadline) {
            Ok(ControllerEvent::CaptureRequested) => {
                controller.on_content_captured(&pixels)?;
            }
            Ok(ControllerEvent::Started { particles }) => {
                info!("🎆 Effect started with {} particles", particles);
            }
            Ok(ControllerEvent::Redraw { .. }) => {
                redraws += 1;
                if let Some(frame) = controller.latest_frame() {
                    if redraws % 30 == 0 {
                        info!(
                            "Frame {}: {} active particles, completion {:.0}%",
                            frame.frame,
                            frame.active_count,
                            controller.completion_percentage() * 100.0
                        );
                    }
                }
            }
            Ok(ControllerEvent::Completed) => break,
            Ok(ControllerEvent::CaptureTimedOut) => {
                warn!("Capture timed out");
                break;
            }
            Err(_) => {
                warn!("⚠️ No event received within {:?}, giving up", deadline);
                break;
            }
        }
    }

    controller.cleanup();
    info!("✅ Done after {} redraw notifications", redraws);

    Ok(())
}
