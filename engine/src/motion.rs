//! Motion engine: raw and virtual cursor state, input integration with
//! braking and interception, and the inertial glide phase.
//!
//! All operations run on the tick thread; nothing here suspends or blocks.

use gp_core::types::{Point, Rect, Vec2, VelocitySource};

use crate::geometry::{point_segment_distance, segment_circle_intersects, segment_rect_intersects};
use crate::magnet::{magnetic_params, padded_rect, MagnetState};

/// Engine tuning, cloned out of the configuration at startup.
#[derive(Debug, Clone)]
pub struct EngineTuning {
    pub glide_decay_per_second: f64,
    pub minimum_glide_velocity: f64,
    pub glide_stop_speed_multiplier: f64,
    pub trackpad_velocity_gain: f64,
    pub max_momentum_speed: f64,
    pub magnetism_radius: f64,
    pub magnetic_strength: f64,
    pub snap_threshold: f64,
    pub target_lock_distance: f64,
    pub target_switch_min_distance: f64,
    pub pre_brake_enabled: bool,
    pub proximity_brake: f64,
    pub snap_assist: f64,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            glide_decay_per_second: 6.5,
            minimum_glide_velocity: 220.0,
            glide_stop_speed_multiplier: 0.45,
            trackpad_velocity_gain: 0.95,
            max_momentum_speed: 9000.0,
            magnetism_radius: 80.0,
            magnetic_strength: 0.65,
            snap_threshold: 30.0,
            target_lock_distance: 50.0,
            target_switch_min_distance: 120.0,
            pre_brake_enabled: true,
            proximity_brake: 0.35,
            snap_assist: 0.5,
        }
    }
}

pub struct MotionEngine {
    pub(crate) tuning: EngineTuning,
    /// Virtual (post-magnetism) cursor.
    pub(crate) position: Point,
    pub(crate) previous_position: Point,
    /// Raw cursor: where the pointer would be with magnetism disabled.
    pub(crate) pre_magnet: Point,
    pub(crate) previous_pre_magnet: Point,
    pub(crate) velocity: Vec2,
    pub(crate) last_input_delta: Vec2,
    pub(crate) is_gliding: bool,
    pub(crate) velocity_source: VelocitySource,
    pub(crate) last_physical: Point,
    pub(crate) desktop_bounds: Option<Rect>,
    pub(crate) magnet: MagnetState,
    /// Set by raw integration, consumed by the next target update.
    pub(crate) raw_fresh: bool,
}

impl MotionEngine {
    pub fn new(tuning: EngineTuning) -> Self {
        let magnetism_enabled = true;
        Self {
            tuning,
            position: Point::default(),
            previous_position: Point::default(),
            pre_magnet: Point::default(),
            previous_pre_magnet: Point::default(),
            velocity: Vec2::ZERO,
            last_input_delta: Vec2::ZERO,
            is_gliding: false,
            velocity_source: VelocitySource::Pointer,
            last_physical: Point::default(),
            desktop_bounds: None,
            magnet: MagnetState::new(magnetism_enabled),
            raw_fresh: false,
        }
    }

    // ---- Read accessors ------------------------------------------------

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn previous_position(&self) -> Point {
        self.previous_position
    }

    pub fn raw_position(&self) -> Point {
        self.pre_magnet
    }

    pub fn previous_raw_position(&self) -> Point {
        self.previous_pre_magnet
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn last_input_delta(&self) -> Vec2 {
        self.last_input_delta
    }

    pub fn is_gliding(&self) -> bool {
        self.is_gliding
    }

    pub fn velocity_source(&self) -> VelocitySource {
        self.velocity_source
    }

    pub fn is_locked(&self) -> bool {
        self.magnet.locked_target.is_some()
    }

    pub fn locked_target(&self) -> Option<Rect> {
        self.magnet.locked_target
    }

    pub fn current_target(&self) -> Option<Rect> {
        self.magnet.current_target
    }

    pub fn last_seen_candidate(&self) -> Option<Rect> {
        self.magnet.last_seen_candidate
    }

    pub fn pending_switch_target(&self) -> Option<Rect> {
        self.magnet.pending_switch_target
    }

    pub fn magnetism_enabled(&self) -> bool {
        self.magnet.enabled
    }

    pub fn desktop_bounds(&self) -> Option<Rect> {
        self.desktop_bounds
    }

    // ---- Lifecycle -----------------------------------------------------

    /// Resets the engine to start at `p`: virtual and raw collapse onto it,
    /// velocity clears, any glide and lock are dropped.
    pub fn prime(&mut self, p: Point) {
        let p = self.clamped(p);
        self.position = p;
        self.previous_position = p;
        self.pre_magnet = p;
        self.previous_pre_magnet = p;
        self.velocity = Vec2::ZERO;
        self.last_input_delta = Vec2::ZERO;
        self.is_gliding = false;
        self.velocity_source = VelocitySource::Pointer;
        self.last_physical = p;
        self.raw_fresh = false;
        self.magnet.clear_targets();
    }

    pub fn update_desktop_bounds(&mut self, bounds: Rect) {
        self.desktop_bounds = Some(bounds);
        self.position = bounds.clamp_point(self.position);
        self.pre_magnet = bounds.clamp_point(self.pre_magnet);
    }

    pub fn set_magnetism_enabled(&mut self, enabled: bool) {
        self.magnet.enabled = enabled;
        if !enabled {
            self.magnet.clear_targets();
        }
    }

    /// A finger just made contact: velocity resets, glide and lock drop,
    /// position is preserved.
    pub fn begin_touch(&mut self, p: Point) {
        self.velocity = Vec2::ZERO;
        self.last_input_delta = Vec2::ZERO;
        self.is_gliding = false;
        self.magnet.unlock();
        self.last_physical = p;
    }

    // ---- Touch integration ---------------------------------------------

    /// Integrates one physical pointer sample while touching.
    /// `trackpad_velocity` is the smoothed normalized pad velocity, when the
    /// trackpad stream has one.
    pub fn handle_touch(&mut self, p: Point, dt: f64, trackpad_velocity: Option<Vec2>) {
        let delta = p - self.last_physical;
        self.last_physical = p;

        let raw_start = self.pre_magnet;
        let raw_end = self.clamped(raw_start + delta);

        // Fast-motion interception: a step crossing a known target's snap
        // zone captures immediately, before any integration.
        if self.intercept_raw_step(raw_start, raw_end) {
            self.previous_pre_magnet = raw_start;
            self.pre_magnet = raw_end;
            self.raw_fresh = true;
            return;
        }

        let scaled = self.pre_braked_delta(delta, raw_start, raw_end);

        self.previous_position = self.position;
        self.position = self.position + scaled;

        let mut velocity = scaled * (1.0 / dt.max(1e-4));
        self.velocity_source = VelocitySource::Pointer;
        if let Some(norm) = trackpad_velocity {
            let pad_pixels = self.trackpad_velocity_pixels(norm);
            if pad_pixels.magnitude() > velocity.magnitude() {
                velocity = pad_pixels.clamped(self.tuning.max_momentum_speed);
                self.velocity_source = VelocitySource::Trackpad;
            }
        }
        self.velocity = velocity;
        self.last_input_delta = scaled;

        // The raw cursor integrates the full physical delta so escape and
        // adoption decisions are immune to the engine's own pulls.
        self.previous_pre_magnet = raw_start;
        self.pre_magnet = raw_end;

        self.raw_fresh = true;
        self.apply_magnetism();
        self.clamp_position();

        if self.is_gliding {
            self.is_gliding = false;
        }
    }

    /// Checks this tick's raw step against every remembered target and
    /// snaps on a qualifying crossing. Returns true when it captured.
    fn intercept_raw_step(&mut self, raw_start: Point, raw_end: Point) -> bool {
        let travel = raw_end - raw_start;
        if travel.magnitude() <= f64::EPSILON {
            return false;
        }
        for target in self.magnet.remembered_targets() {
            let params = magnetic_params(&self.tuning, &target);
            let center = target.center();
            if travel.dot(center - raw_start) <= 0.0 {
                continue;
            }
            let snap_radius = 1.5 * params.snap;
            let crossed = segment_rect_intersects(raw_start, raw_end, &padded_rect(&target))
                || segment_circle_intersects(raw_start, raw_end, center, snap_radius);
            if crossed {
                self.snap_to_target(target);
                return true;
            }
        }
        false
    }

    /// Scales the virtual delta down while the raw step approaches the
    /// widest remembered target.
    fn pre_braked_delta(&self, delta: Vec2, raw_start: Point, raw_end: Point) -> Vec2 {
        if !self.tuning.pre_brake_enabled {
            return delta;
        }
        let widest = self
            .magnet
            .remembered_targets()
            .into_iter()
            .map(|t| (t, magnetic_params(&self.tuning, &t)))
            .max_by(|a, b| a.1.radius.total_cmp(&b.1.radius));
        let Some((target, params)) = widest else {
            return delta;
        };
        let center = target.center();
        if (raw_end - raw_start).dot(center - raw_start) <= 0.0 {
            return delta;
        }
        let approach = point_segment_distance(center, raw_start, raw_end);
        let reach = 1.6 * params.radius;
        if approach >= reach {
            return delta;
        }
        let scale = (approach / reach).powi(2).clamp(0.15, 1.0);
        delta * scale
    }

    fn trackpad_velocity_pixels(&self, normalized: Vec2) -> Vec2 {
        let bounds = self
            .desktop_bounds
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 1920.0, 1080.0));
        Vec2::new(
            normalized.dx * bounds.w * self.tuning.trackpad_velocity_gain,
            normalized.dy * bounds.h * self.tuning.trackpad_velocity_gain,
        )
    }

    // ---- Glide ---------------------------------------------------------

    /// Advances the no-contact phase: starts, decays, or suppresses glide.
    pub fn handle_no_touch(&mut self, p: Point, dt: f64, suppress_glide: bool, touch_just_ended: bool) {
        self.last_physical = p;

        if touch_just_ended {
            if suppress_glide {
                self.is_gliding = false;
                self.velocity = Vec2::ZERO;
            } else {
                self.begin_glide_if_needed();
            }
        }

        if !self.is_gliding {
            return;
        }

        self.velocity = self.velocity * (1.0 - self.tuning.glide_decay_per_second * dt).max(0.0);
        let step = self.velocity * dt;

        self.previous_position = self.position;
        self.position = self.position + step;
        self.last_input_delta = step;
        self.previous_pre_magnet = self.pre_magnet;
        self.pre_magnet = self.clamped(self.pre_magnet + step);

        self.raw_fresh = true;
        self.apply_magnetism();
        self.clamp_position();

        let floor = self.tuning.minimum_glide_velocity * self.tuning.glide_stop_speed_multiplier;
        if self.velocity.magnitude() < floor {
            self.is_gliding = false;
            self.velocity = Vec2::ZERO;
        }
    }

    fn begin_glide_if_needed(&mut self) {
        if self.velocity.magnitude() >= self.tuning.minimum_glide_velocity {
            self.is_gliding = true;
        } else {
            self.is_gliding = false;
            self.velocity = Vec2::ZERO;
        }
    }

    // ---- Shared internals ----------------------------------------------

    pub(crate) fn clamped(&self, p: Point) -> Point {
        match self.desktop_bounds {
            Some(bounds) => bounds.clamp_point(p),
            None => p,
        }
    }

    pub(crate) fn clamp_position(&mut self) {
        self.position = self.clamped(self.position);
    }
}
