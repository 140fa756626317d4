use async_trait::async_trait;
use crate::error::Result;
use crate::types::{ElementInfo, Point, Rect, TouchFrame};

/// Physical pointer location in global screen space.
pub trait PointerSource: Send {
    fn location(&mut self) -> Result<Point>;
}

/// The OS cursor: warp target and visibility sink. Process-wide exclusive;
/// only the tick thread writes it.
pub trait CursorSink: Send {
    fn warp(&mut self, p: Point) -> Result<()>;
    fn hide(&mut self) -> Result<()>;
    fn show(&mut self) -> Result<()>;
}

/// Display topology; desktop bounds is the union of all frames.
pub trait DisplayTopology: Send {
    fn enumerate_displays(&mut self) -> Result<Vec<Rect>>;
}

/// Synchronous accessibility query at a screen point.
pub trait AccessibilityInspector: Send {
    fn element_info_at(&mut self, p: Point) -> Result<Option<ElementInfo>>;
}

/// Detects whether a known screenshot/utility overlay owns the topmost
/// pixel at a point; drives the hardware-cursor mode switch.
pub trait OverlayDetector: Send {
    fn is_known_overlay_topmost(&mut self, p: Point) -> bool;
}

/// Lazy stream of multitouch frames from the trackpad driver.
#[async_trait]
pub trait TrackpadSource: Send + Sync {
    async fn start(&mut self) -> Result<()>;
    async fn next_frame(&mut self) -> Result<TouchFrame>;
}

/// Receives per-tick virtual cursor updates for the overlay artwork.
pub trait OverlayPort: Send {
    fn show(&mut self);
    fn hide(&mut self);
    fn update(&mut self, p: Point, locked: bool);
}
