//! No-op collaborator backends. The daemon degrades onto these when a real
//! device or desktop integration is unavailable, instead of refusing to run.

use gp_core::error::Result;
use gp_core::traits::{AccessibilityInspector, CursorSink, OverlayDetector, PointerSource};
use gp_core::types::{ElementInfo, Point};

/// Inspector for desktops without an accessibility backend wired up: every
/// query reports no element, so the engine runs with plain pointer behavior.
pub struct NullInspector;

impl AccessibilityInspector for NullInspector {
    fn element_info_at(&mut self, _p: Point) -> Result<Option<ElementInfo>> {
        Ok(None)
    }
}

/// No foreign overlay is ever reported; the daemon stays in overlay mode.
pub struct NullOverlayDetector;

impl OverlayDetector for NullOverlayDetector {
    fn is_known_overlay_topmost(&mut self, _p: Point) -> bool {
        false
    }
}

/// Pointer source standing in for a missing input device; reports a fixed
/// location.
pub struct NullPointerSource {
    at: Point,
}

impl NullPointerSource {
    pub fn new(at: Point) -> Self {
        Self { at }
    }
}

impl PointerSource for NullPointerSource {
    fn location(&mut self) -> Result<Point> {
        Ok(self.at)
    }
}

/// Cursor sink that accepts and discards everything; used when /dev/uinput
/// is not grantable.
pub struct NullCursorSink;

impl CursorSink for NullCursorSink {
    fn warp(&mut self, _p: Point) -> Result<()> {
        Ok(())
    }
    fn hide(&mut self) -> Result<()> {
        Ok(())
    }
    fn show(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Overlay port that swallows updates; the daemon runs cursor-only when
/// the overlay endpoint cannot be acquired.
pub struct NullOverlayPort;

impl gp_core::traits::OverlayPort for NullOverlayPort {
    fn show(&mut self) {}
    fn hide(&mut self) {}
    fn update(&mut self, _p: Point, _locked: bool) {}
}
