use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

use gp_config::loader::load_config;
use gp_core::traits::{CursorSink, OverlayPort, PointerSource};
use gp_core::types::Rect;
use gp_engine::{
    EligibilityFilter, EngineTuning, FilterRules, MotionEngine, TickCoordinator, TickPorts,
    TrackpadSmoother,
};
use gp_platform::{NullCursorSink, NullInspector, NullOverlayDetector, NullPointerSource, StaticDisplays};
use tokio::signal;

mod overlay;
use overlay::UdpOverlay;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize Logging
    gp_common::logging::init_logger();

    info!("🚀 GlidePointer Daemon v0.1.0 Starting...");

    // 2. Load Configuration
    let config = load_config().context("Failed to load configuration")?;
    info!("🔧 Configuration loaded successfully.");

    let frames: Vec<Rect> = config.displays.iter().map(|d| d.rect()).collect();
    let desktop = frames
        .iter()
        .skip(1)
        .fold(frames.first().copied().unwrap_or_default(), |acc, f| {
            acc.union(f)
        });
    info!(
        "🖥️  Desktop bounds: {}x{} at ({}, {})",
        desktop.w, desktop.h, desktop.x, desktop.y
    );

    // 3. Warp sink (uinput virtual pointer)
    let cursor: Box<dyn CursorSink> = match gp_platform::VirtualCursor::new(desktop) {
        Ok(sink) => {
            info!("✅ Virtual cursor ready (/dev/uinput)");
            Box::new(sink)
        }
        Err(e) => {
            error!("❌ Failed to initialize virtual cursor: {}", e);
            warn!("⚠️  Continuing without warp support (Check permissions for /dev/uinput)");
            Box::new(NullCursorSink)
        }
    };

    // 4. Physical pointer source
    let pointer: Box<dyn PointerSource> = if config.pointer.device_path.is_empty() {
        warn!("⚠️  No pointer device configured; pointer tracking disabled");
        Box::new(NullPointerSource::new(desktop.center()))
    } else {
        match gp_platform::EvdevPointer::open(Path::new(&config.pointer.device_path), desktop) {
            Ok(source) => {
                info!("✅ Pointer device open: {}", config.pointer.device_path);
                Box::new(source)
            }
            Err(e) => {
                error!("❌ Failed to open pointer device: {}", e);
                Box::new(NullPointerSource::new(desktop.center()))
            }
        }
    };

    // 5. Overlay client
    let overlay: Box<dyn OverlayPort> = match UdpOverlay::new(&config.overlay.addr, desktop) {
        Ok(client) => Box::new(client),
        Err(e) => {
            error!("❌ Failed to bind overlay socket: {}", e);
            warn!("⚠️  Running without the overlay; hardware cursor stays live");
            Box::new(gp_platform::NullOverlayPort)
        }
    };

    // 6. Trackpad smoother consumer
    let (smoother, touch_edges) = TrackpadSmoother::new(Duration::from_millis(
        config.trackpad.suppression_window_ms,
    ));
    let smoother_reader = smoother.reader();
    if config.trackpad.device_path.is_empty() {
        warn!("⚠️  No trackpad device configured; touch input disabled");
    } else {
        let pad = gp_platform::EvdevTrackpad::new(Path::new(&config.trackpad.device_path));
        tokio::spawn(smoother.run(Box::new(pad)));
    }

    // 7. Motion engine + eligibility filter from configuration
    let tuning = EngineTuning {
        glide_decay_per_second: config.glide.decay_per_second,
        minimum_glide_velocity: config.glide.minimum_velocity,
        glide_stop_speed_multiplier: config.glide.stop_speed_multiplier,
        trackpad_velocity_gain: config.trackpad.velocity_gain,
        max_momentum_speed: config.engine.max_momentum_speed,
        magnetism_radius: config.magnetism.radius,
        magnetic_strength: config.magnetism.strength,
        snap_threshold: config.magnetism.snap_threshold,
        target_lock_distance: config.magnetism.target_lock_distance,
        target_switch_min_distance: config.magnetism.target_switch_min_distance,
        pre_brake_enabled: config.magnetism.pre_brake_enabled,
        proximity_brake: config.magnetism.proximity_brake,
        snap_assist: config.magnetism.snap_assist,
    };
    let mut engine = MotionEngine::new(tuning);
    engine.set_magnetism_enabled(config.magnetism.enabled);
    engine.update_desktop_bounds(desktop);
    engine.prime(desktop.center());

    let rules = FilterRules {
        magnetic_roles: config.filter.magnetic_roles.clone(),
        press_actions: config.filter.press_actions.clone(),
        ignored_actions: config.filter.ignored_actions.clone(),
        file_panel_bundle_id: config.filter.file_panel_bundle_id.clone(),
        file_browser_bundle_id: config.filter.file_browser_bundle_id.clone(),
        mail_bundle_id: config.filter.mail_bundle_id.clone(),
        linger: Duration::from_millis(config.filter.linger_ms),
    };

    // No accessibility backend is wired up yet on this platform; the
    // engine degrades to plain pointer behavior.
    warn!("⚠️  No accessibility backend configured; magnetic targets disabled");

    let ports = TickPorts {
        pointer,
        cursor,
        inspector: Box::new(NullInspector),
        overlay_detector: Box::new(NullOverlayDetector),
        overlay,
        displays: Box::new(StaticDisplays::new(frames)),
    };

    // 8. Run the 500 Hz tick loop
    let coordinator = TickCoordinator::new(
        engine,
        EligibilityFilter::new(rules),
        smoother_reader,
        touch_edges,
        ports,
    );
    let handle = coordinator.spawn();

    // 9. Wait for Shutdown Signal
    info!("✅ Daemon fully running. Press Ctrl+C to stop.");
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("🛑 Shutdown signal received.");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }

    handle.stop();
    info!("👋 Daemon Shut Down.");

    Ok(())
}
