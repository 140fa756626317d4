use gp_core::types::Rect;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub glide: GlideConfig,
    pub trackpad: TrackpadConfig,
    pub pointer: PointerConfig,
    pub engine: EngineConfig,
    pub magnetism: MagnetismConfig,
    pub filter: FilterConfig,
    pub overlay: OverlayConfig,
    #[serde(default = "default_displays")]
    pub displays: Vec<DisplayConfig>,
}

fn default_displays() -> Vec<DisplayConfig> {
    vec![DisplayConfig {
        x: 0.0,
        y: 0.0,
        w: 1920.0,
        h: 1080.0,
    }]
}

#[derive(Debug, Deserialize, Clone)]
pub struct GlideConfig {
    /// Exponential friction coefficient applied per second of glide.
    pub decay_per_second: f64,
    /// Release speed below which no glide starts (px/s).
    pub minimum_velocity: f64,
    /// Glide stops once speed falls under minimum_velocity * this.
    pub stop_speed_multiplier: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrackpadConfig {
    /// Gain mapping normalized pad velocity into screen pixels.
    pub velocity_gain: f64,
    /// evdev device node; empty string probes /dev/input.
    pub device_path: String,
    /// Multi-finger glide suppression window in milliseconds.
    pub suppression_window_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PointerConfig {
    /// evdev mouse node for physical pointer tracking; empty disables it.
    pub device_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Hard cap on any velocity the engine will integrate (px/s).
    pub max_momentum_speed: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MagnetismConfig {
    pub enabled: bool,
    /// Base attraction radius before per-frame scaling (px).
    pub radius: f64,
    /// Base attraction strength in (0, 1].
    pub strength: f64,
    /// Base snap distance before per-frame scaling (px).
    pub snap_threshold: f64,
    pub target_lock_distance: f64,
    /// Hard raw-distance beyond which a lock always releases (px).
    pub target_switch_min_distance: f64,
    /// Scales raw pointer travel down while approaching a target.
    pub pre_brake_enabled: bool,
    /// Base braking factor for high-speed approaches.
    pub proximity_brake: f64,
    /// Weight of the partial snap applied under a strong brake.
    pub snap_assist: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilterConfig {
    /// Roles that qualify a frame for magnetism outright.
    pub magnetic_roles: Vec<String>,
    /// Actions that qualify a frame even without a magnetic role.
    pub press_actions: Vec<String>,
    /// Actions whose presence disqualifies a frame.
    pub ignored_actions: Vec<String>,
    /// Bundle id of the open/save panel service.
    pub file_panel_bundle_id: String,
    /// File-browser app where list rows keep no magnetism.
    pub file_browser_bundle_id: String,
    /// Mail app where small sidebar list buttons are excluded.
    pub mail_bundle_id: String,
    /// Linger window for masking accessibility flicker (ms).
    pub linger_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverlayConfig {
    pub addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl DisplayConfig {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_tuning() {
        let config = AppConfig::default();
        assert_eq!(config.glide.decay_per_second, 6.5);
        assert_eq!(config.glide.minimum_velocity, 220.0);
        assert_eq!(config.glide.stop_speed_multiplier, 0.45);
        assert_eq!(config.engine.max_momentum_speed, 9000.0);
        assert!(config.magnetism.enabled);
        assert_eq!(config.magnetism.radius, 80.0);
        assert_eq!(config.magnetism.snap_threshold, 30.0);
        assert_eq!(config.magnetism.target_switch_min_distance, 120.0);
        assert_eq!(config.filter.linger_ms, 60);
        assert_eq!(config.displays.len(), 1);
    }

    #[test]
    fn test_display_rect_conversion() {
        let display = DisplayConfig {
            x: 1920.0,
            y: 0.0,
            w: 1280.0,
            h: 1024.0,
        };
        assert_eq!(display.rect(), Rect::new(1920.0, 0.0, 1280.0, 1024.0));
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            glide: GlideConfig {
                decay_per_second: 6.5,
                minimum_velocity: 220.0,
                stop_speed_multiplier: 0.45,
            },
            trackpad: TrackpadConfig {
                velocity_gain: 0.95,
                device_path: String::new(),
                suppression_window_ms: 150,
            },
            pointer: PointerConfig {
                device_path: String::new(),
            },
            engine: EngineConfig {
                max_momentum_speed: 9000.0,
            },
            magnetism: MagnetismConfig {
                enabled: true,
                radius: 80.0,
                strength: 0.65,
                snap_threshold: 30.0,
                target_lock_distance: 50.0,
                target_switch_min_distance: 120.0,
                pre_brake_enabled: true,
                proximity_brake: 0.35,
                snap_assist: 0.5,
            },
            filter: FilterConfig {
                magnetic_roles: vec![
                    "AXButton".to_string(),
                    "AXPopUpButton".to_string(),
                    "AXLink".to_string(),
                    "AXCheckBox".to_string(),
                    "AXRadioButton".to_string(),
                    "AXMenuItem".to_string(),
                    "AXMenuBarItem".to_string(),
                    "AXMenuButton".to_string(),
                    "AXComboBox".to_string(),
                    "AXTextField".to_string(),
                    "AXSegmentedControl".to_string(),
                    "AXTabButton".to_string(),
                    "AXDisclosureTriangle".to_string(),
                ],
                press_actions: vec![
                    "AXPress".to_string(),
                    "AXConfirm".to_string(),
                    "AXPick".to_string(),
                    "AXShowMenu".to_string(),
                ],
                ignored_actions: vec!["AXScrollToVisible".to_string()],
                file_panel_bundle_id: "com.apple.appkit.xpc.openAndSavePanelService".to_string(),
                file_browser_bundle_id: "com.apple.finder".to_string(),
                mail_bundle_id: "com.apple.mail".to_string(),
                linger_ms: 60,
            },
            overlay: OverlayConfig {
                addr: gp_core::constants::POINTER_OVERLAY_ADDR.to_string(),
            },
            displays: default_displays(),
        }
    }
}
