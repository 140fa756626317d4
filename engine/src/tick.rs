//! Tick coordinator: the 500 Hz loop that advances the engine, runs the
//! eligibility pipeline, and mirrors the virtual cursor out — either onto
//! the overlay artwork or back to the hardware cursor when a foreign
//! overlay owns the screen.
//!
//! The loop runs on its own dedicated thread; every operation on it is
//! synchronous and bounded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use gp_core::constants::MIN_TICK_DT;
use gp_core::traits::{
    AccessibilityInspector, CursorSink, DisplayTopology, OverlayDetector, OverlayPort,
    PointerSource,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::filter::EligibilityFilter;
use crate::motion::MotionEngine;
use crate::probe;
use crate::smoother::SmootherReader;

const TICK_PERIOD: Duration = Duration::from_micros(2_000);
const IDLE_PERIOD: Duration = Duration::from_millis(10);
const BOUNDS_REFRESH_TICKS: u64 = 512;
const OVERLAY_ANIMATING_WINDOW: Duration = Duration::from_millis(250);

/// External collaborators, owned by the coordinator for its lifetime.
pub struct TickPorts {
    pub pointer: Box<dyn PointerSource>,
    pub cursor: Box<dyn CursorSink>,
    pub inspector: Box<dyn AccessibilityInspector>,
    pub overlay_detector: Box<dyn OverlayDetector>,
    pub overlay: Box<dyn OverlayPort>,
    pub displays: Box<dyn DisplayTopology>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorMode {
    /// OS cursor hidden; the overlay artwork mirrors the virtual position.
    Overlay,
    /// A foreign overlay owns the screen; the OS cursor is live and
    /// magnetism is off.
    Hardware,
}

pub struct TickCoordinator {
    engine: MotionEngine,
    filter: EligibilityFilter,
    smoother: SmootherReader,
    touch_edges: mpsc::Receiver<bool>,
    ports: TickPorts,
    mode: CursorMode,
    magnetism_default: bool,
    was_touching: bool,
    cursor_hidden: bool,
    last_tick: Instant,
    last_motion_at: Instant,
    tick_count: u64,
}

impl TickCoordinator {
    pub fn new(
        engine: MotionEngine,
        filter: EligibilityFilter,
        smoother: SmootherReader,
        touch_edges: mpsc::Receiver<bool>,
        ports: TickPorts,
    ) -> Self {
        let magnetism_default = engine.magnetism_enabled();
        let now = Instant::now();
        Self {
            engine,
            filter,
            smoother,
            touch_edges,
            ports,
            mode: CursorMode::Hardware,
            magnetism_default,
            was_touching: false,
            cursor_hidden: false,
            last_tick: now,
            last_motion_at: now,
            tick_count: 0,
        }
    }

    pub fn engine(&self) -> &MotionEngine {
        &self.engine
    }

    /// Recomputes desktop bounds from the display topology; display
    /// changes mid-run re-clamp the engine without a restart.
    pub fn refresh_desktop_bounds(&mut self) {
        match self.ports.displays.enumerate_displays() {
            Ok(frames) if !frames.is_empty() => {
                let bounds = frames
                    .iter()
                    .skip(1)
                    .fold(frames[0], |acc, f| acc.union(f));
                self.engine.update_desktop_bounds(bounds);
            }
            Ok(_) => warn!("⚠️  Display topology reported no displays"),
            Err(e) => warn!("⚠️  Display enumeration failed: {}", e),
        }
    }

    /// One 500 Hz tick. Returns true while the loop has live work
    /// (touching, gliding, or overlay still animating).
    pub fn tick_once(&mut self, now: Instant) -> bool {
        let dt = now
            .duration_since(self.last_tick)
            .as_secs_f64()
            .max(MIN_TICK_DT);
        self.last_tick = now;
        self.tick_count += 1;

        if self.tick_count % BOUNDS_REFRESH_TICKS == 0 {
            self.refresh_desktop_bounds();
        }

        // 2. Distilled trackpad state. A queued edge wins over the
        // snapshot so short touches are never skipped.
        let snapshot = self.smoother.snapshot();
        let touching = match self.touch_edges.try_recv() {
            Ok(edge) => edge,
            Err(_) => snapshot.touching,
        };

        // 3. Physical pointer.
        let pointer = match self.ports.pointer.location() {
            Ok(p) => p,
            Err(e) => {
                warn!("Pointer read failed: {}", e);
                self.engine.raw_position()
            }
        };

        // 4. Advance the engine.
        if touching {
            if !self.was_touching {
                self.engine.begin_touch(pointer);
            }
            self.engine
                .handle_touch(pointer, dt, Some(snapshot.velocity));
        } else {
            self.engine
                .handle_no_touch(pointer, dt, snapshot.suppress_glide, self.was_touching);
        }
        self.was_touching = touching;

        // 5. Eligibility at the raw position, with the fast-motion probe
        // backfilling skipped elements.
        let raw = self.engine.raw_position();
        let element = match self.ports.inspector.element_info_at(raw) {
            Ok(el) => el,
            Err(e) => {
                warn!("Accessibility query failed: {}", e);
                None
            }
        };
        let mut candidate = self.filter.evaluate(element.as_ref(), raw, now);
        if candidate.is_none()
            && probe::needs_probe(
                self.engine.previous_raw_position(),
                raw,
                self.engine.is_gliding(),
            )
        {
            let current = element.as_ref().map(|el| el.frame);
            if let Some((frame, _sample)) = probe::probe_step(
                self.ports.inspector.as_mut(),
                self.ports.overlay_detector.as_mut(),
                &self.filter,
                self.engine.previous_raw_position(),
                raw,
                current,
            ) {
                candidate = Some(frame);
            }
        }

        // 6. Feed the resolver.
        self.engine.update_magnetic_target(candidate);

        // 7. Mode selection and output.
        if self.ports.overlay_detector.is_known_overlay_topmost(raw) {
            self.enter_hardware_mode();
        } else {
            self.enter_overlay_mode();
            let position = self.engine.position();
            if let Err(e) = self.ports.cursor.warp(position) {
                // The next tick re-attempts; the loop is its own retry.
                error!("Cursor warp failed: {}", e);
            }
            self.ports.overlay.update(position, self.engine.is_locked());
        }

        if self.engine.position() != self.engine.previous_position() {
            self.last_motion_at = now;
        }

        // 8. Live while there is input, inertia, or a settling overlay.
        touching
            || self.engine.is_gliding()
            || now.duration_since(self.last_motion_at) < OVERLAY_ANIMATING_WINDOW
    }

    fn enter_hardware_mode(&mut self) {
        if self.mode == CursorMode::Hardware {
            // Covers a foreign overlay present from the very first tick.
            if self.engine.magnetism_enabled() {
                self.engine.set_magnetism_enabled(false);
            }
            return;
        }
        info!("🖥️  Foreign overlay topmost; yielding to the hardware cursor");
        self.ports.overlay.hide();
        self.show_cursor();
        let position = self.engine.position();
        if let Err(e) = self.ports.cursor.warp(position) {
            error!("Cursor warp failed during mode switch: {}", e);
        }
        self.engine.prime(position);
        self.engine.set_magnetism_enabled(false);
        self.mode = CursorMode::Hardware;
    }

    fn enter_overlay_mode(&mut self) {
        if self.mode == CursorMode::Overlay {
            return;
        }
        info!("🎯 Overlay mode active");
        self.hide_cursor();
        self.ports.overlay.show();
        self.engine.set_magnetism_enabled(self.magnetism_default);
        self.mode = CursorMode::Overlay;
    }

    fn hide_cursor(&mut self) {
        if self.cursor_hidden {
            return;
        }
        match self.ports.cursor.hide() {
            Ok(()) => self.cursor_hidden = true,
            Err(e) => warn!("Cursor hide failed: {}", e),
        }
    }

    fn show_cursor(&mut self) {
        if !self.cursor_hidden {
            return;
        }
        match self.ports.cursor.show() {
            Ok(()) => self.cursor_hidden = false,
            Err(e) => warn!("Cursor show failed: {}", e),
        }
    }

    /// Runs the loop on a dedicated thread until the handle stops it.
    pub fn spawn(mut self) -> TickHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let join = thread::spawn(move || {
            self.refresh_desktop_bounds();
            info!("🚀 Tick loop running at 500 Hz");
            while !stop_flag.load(Ordering::Relaxed) {
                let started = Instant::now();
                let active = self.tick_once(started);
                let period = if active { TICK_PERIOD } else { IDLE_PERIOD };
                let elapsed = started.elapsed();
                if elapsed < period {
                    thread::sleep(period - elapsed);
                }
            }
            info!("🛑 Tick loop stopped");
        });
        TickHandle { stop, join }
    }
}

impl Drop for TickCoordinator {
    /// The OS cursor must never stay hidden past the coordinator's life,
    /// even on a panicking tick thread.
    fn drop(&mut self) {
        if self.cursor_hidden {
            let _ = self.ports.cursor.show();
            self.cursor_hidden = false;
        }
        self.ports.overlay.hide();
    }
}

pub struct TickHandle {
    stop: Arc<AtomicBool>,
    join: thread::JoinHandle<()>,
}

impl TickHandle {
    pub fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.join.join();
    }
}
