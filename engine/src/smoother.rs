//! Trackpad velocity smoother: consumes driver touch frames on a background
//! task and distills them into the per-tick snapshot the motion engine reads.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gp_core::constants::MIN_TICK_DT;
use gp_core::traits::TrackpadSource;
use gp_core::types::{TouchFrame, Vec2};
use tokio::sync::mpsc;
use tracing::{info, warn};

const SMOOTHING_ALPHA: f64 = 0.35;

/// Value-type snapshot read once per tick by the tick thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchSnapshot {
    pub touching: bool,
    /// Centroid of active touches, normalized [0, 1]².
    pub centroid: Option<(f64, f64)>,
    /// Exponentially smoothed centroid velocity, normalized units/s.
    pub velocity: Vec2,
    pub suppress_glide: bool,
}

#[derive(Debug)]
struct SmootherCore {
    suppression_window: Duration,
    touching: bool,
    centroid: Option<(f64, f64)>,
    previous_centroid: Option<(f64, f64)>,
    smoothed_velocity: Vec2,
    suppress_until: Option<Instant>,
    last_frame_at: Option<Instant>,
}

impl SmootherCore {
    fn new(suppression_window: Duration) -> Self {
        Self {
            suppression_window,
            touching: false,
            centroid: None,
            previous_centroid: None,
            smoothed_velocity: Vec2::ZERO,
            suppress_until: None,
            last_frame_at: None,
        }
    }

    /// Folds one driver frame in. Returns the new touching state when it
    /// flipped, for edge delivery to the tick thread.
    fn ingest(&mut self, frame: &TouchFrame, now: Instant) -> Option<bool> {
        let active: Vec<_> = frame
            .touches
            .iter()
            .filter(|t| t.phase.is_contact())
            .collect();

        let touching = !active.is_empty();
        let edge = if touching != self.touching {
            self.touching = touching;
            Some(touching)
        } else {
            None
        };

        if active.len() > 1 {
            self.suppress_until = Some(now + self.suppression_window);
        }

        if active.is_empty() {
            self.centroid = None;
            self.previous_centroid = None;
            self.smoothed_velocity = Vec2::ZERO;
            self.last_frame_at = Some(now);
            return edge;
        }

        let n = active.len() as f64;
        let cx = active.iter().map(|t| t.x).sum::<f64>() / n;
        let cy = active.iter().map(|t| t.y).sum::<f64>() / n;

        let raw_velocity = match (self.previous_centroid, self.last_frame_at) {
            (Some((px, py)), Some(last)) => {
                let dt = now.duration_since(last).as_secs_f64().max(MIN_TICK_DT);
                Vec2::new((cx - px) / dt, (cy - py) / dt)
            }
            // First populated frame carries no velocity
            _ => Vec2::ZERO,
        };

        self.smoothed_velocity =
            self.smoothed_velocity * (1.0 - SMOOTHING_ALPHA) + raw_velocity * SMOOTHING_ALPHA;
        self.previous_centroid = Some((cx, cy));
        self.centroid = Some((cx, cy));
        self.last_frame_at = Some(now);
        edge
    }

    fn snapshot(&self, now: Instant) -> TouchSnapshot {
        TouchSnapshot {
            touching: self.touching,
            centroid: self.centroid,
            velocity: self.smoothed_velocity,
            suppress_glide: self.suppress_until.is_some_and(|d| now < d),
        }
    }
}

/// Shared handle: the consumer task writes, the tick thread reads.
pub struct TrackpadSmoother {
    core: Arc<Mutex<SmootherCore>>,
    edge_tx: mpsc::Sender<bool>,
}

impl TrackpadSmoother {
    /// Returns the smoother plus the receiver the tick thread drains for
    /// touch-state edges.
    pub fn new(suppression_window: Duration) -> (Self, mpsc::Receiver<bool>) {
        let (edge_tx, edge_rx) = mpsc::channel(64);
        (
            Self {
                core: Arc::new(Mutex::new(SmootherCore::new(suppression_window))),
                edge_tx,
            },
            edge_rx,
        )
    }

    pub fn snapshot(&self) -> TouchSnapshot {
        let now = Instant::now();
        match self.core.lock() {
            Ok(core) => core.snapshot(now),
            Err(_) => TouchSnapshot::default(),
        }
    }

    pub fn reader(&self) -> SmootherReader {
        SmootherReader {
            core: self.core.clone(),
        }
    }

    /// Drives the smoother from the driver stream until the source errors
    /// or the task is aborted.
    pub async fn run(self, mut source: Box<dyn TrackpadSource>) {
        if let Err(e) = source.start().await {
            warn!("⚠️  Trackpad source failed to start: {}", e);
            return;
        }
        info!("✅ Trackpad stream running");
        loop {
            match source.next_frame().await {
                Ok(frame) => {
                    let edge = match self.core.lock() {
                        Ok(mut core) => core.ingest(&frame, Instant::now()),
                        Err(_) => None,
                    };
                    if let Some(touching) = edge {
                        // Full channel means the tick thread is behind; the
                        // snapshot still carries the state, so drop the edge.
                        let _ = self.edge_tx.try_send(touching);
                    }
                }
                Err(e) => {
                    warn!("Trackpad stream ended: {}", e);
                    break;
                }
            }
        }
    }
}

/// Read-only view handed to the tick thread.
#[derive(Clone)]
pub struct SmootherReader {
    core: Arc<Mutex<SmootherCore>>,
}

impl SmootherReader {
    pub fn snapshot(&self) -> TouchSnapshot {
        let now = Instant::now();
        match self.core.lock() {
            Ok(core) => core.snapshot(now),
            Err(_) => TouchSnapshot::default(),
        }
    }
}
