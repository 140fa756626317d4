#![deny(warnings)]
pub mod displays;
pub mod fallback;
mod pointer;
mod trackpad;

pub use displays::StaticDisplays;
pub use fallback::{
    NullCursorSink, NullInspector, NullOverlayDetector, NullOverlayPort, NullPointerSource,
};

#[cfg(target_os = "linux")]
pub use pointer::{EvdevPointer, VirtualCursor};
#[cfg(target_os = "linux")]
pub use trackpad::EvdevTrackpad;
