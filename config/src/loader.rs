use config::{Config, ConfigError, Environment, File};
use crate::schema::AppConfig;
use std::env;

pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    let s = Config::builder()
        .set_default("glide.decay_per_second", 6.5)?
        .set_default("glide.minimum_velocity", 220.0)?
        .set_default("glide.stop_speed_multiplier", 0.45)?
        .set_default("trackpad.velocity_gain", 0.95)?
        .set_default("trackpad.device_path", "")?
        .set_default("trackpad.suppression_window_ms", 150)?
        .set_default("pointer.device_path", "")?
        .set_default("engine.max_momentum_speed", 9000.0)?
        .set_default("magnetism.enabled", true)?
        .set_default("magnetism.radius", 80.0)?
        .set_default("magnetism.strength", 0.65)?
        .set_default("magnetism.snap_threshold", 30.0)?
        .set_default("magnetism.target_lock_distance", 50.0)?
        .set_default("magnetism.target_switch_min_distance", 120.0)?
        .set_default("magnetism.pre_brake_enabled", true)?
        .set_default("magnetism.proximity_brake", 0.35)?
        .set_default("magnetism.snap_assist", 0.5)?
        .set_default(
            "filter.magnetic_roles",
            vec![
                "AXButton",
                "AXPopUpButton",
                "AXLink",
                "AXCheckBox",
                "AXRadioButton",
                "AXMenuItem",
                "AXMenuBarItem",
                "AXMenuButton",
                "AXComboBox",
                "AXTextField",
                "AXSegmentedControl",
                "AXTabButton",
                "AXDisclosureTriangle",
            ],
        )?
        .set_default(
            "filter.press_actions",
            vec!["AXPress", "AXConfirm", "AXPick", "AXShowMenu"],
        )?
        .set_default("filter.ignored_actions", vec!["AXScrollToVisible"])?
        .set_default(
            "filter.file_panel_bundle_id",
            "com.apple.appkit.xpc.openAndSavePanelService",
        )?
        .set_default("filter.file_browser_bundle_id", "com.apple.finder")?
        .set_default("filter.mail_bundle_id", "com.apple.mail")?
        .set_default("filter.linger_ms", 60)?
        .set_default("overlay.addr", gp_core::constants::POINTER_OVERLAY_ADDR)?
        // `displays` falls back to the schema's serde default
        // Start merging
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
        .add_source(File::with_name("config").required(false))
        // e.g. GP_MAGNETISM_RADIUS=96
        .add_source(Environment::with_prefix("GP").separator("_"))
        .build()?;

    s.try_deserialize()
}
