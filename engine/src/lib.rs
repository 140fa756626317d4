#![deny(warnings)]
pub mod filter;
pub mod geometry;
pub mod magnet;
pub mod motion;
pub mod probe;
pub mod smoother;
pub mod tick;

pub use filter::{EligibilityFilter, FilterRules};
pub use motion::{EngineTuning, MotionEngine};
pub use smoother::{SmootherReader, TouchSnapshot, TrackpadSmoother};
pub use tick::{TickCoordinator, TickHandle, TickPorts};
