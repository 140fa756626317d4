//! Magnetism resolver: candidate memory, lock/unlock hysteresis, crossing
//! capture, approach assists, and the strain detector that frees sticky
//! locks on elongated elements.
//!
//! `apply_magnetism` is strictly ordered; later steps observe the position
//! updates of earlier steps. The raw (pre-magnet) cursor is never moved
//! here, so every escape decision sees undistorted user travel.

use gp_core::types::{Point, Rect, Vec2};
use tracing::debug;

use crate::geometry::{
    frames_equivalent, point_rect_distance, point_segment_distance, segment_circle_intersects,
    segment_rect_intersects,
};
use crate::motion::{EngineTuning, MotionEngine};

/// Per-frame magnetism parameters derived from the target's shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetParams {
    pub radius: f64,
    pub snap: f64,
    pub strength: f64,
}

/// Derives attraction radius, snap distance, and strength for a frame.
/// Small frames scale everything down; elongated frames are weakened so
/// bars and rows do not dominate their surroundings.
pub fn magnetic_params(tuning: &EngineTuning, frame: &Rect) -> MagnetParams {
    let minor = frame.minor_side();
    let aspect = frame.aspect_ratio();
    let norm = (minor / 110.0).clamp(0.22, 1.0);

    let mut radius =
        (tuning.magnetism_radius * norm * 1.05).clamp(minor * 0.85, minor * 1.8 + 18.0);
    let mut snap = (tuning.snap_threshold * norm * 0.9)
        .max(minor * 0.55)
        .max(12.0);
    let mut strength = (tuning.magnetic_strength * (0.66 + norm * 0.5))
        .clamp(0.4, tuning.magnetic_strength * 1.12);

    if aspect > 2.4 {
        let k = ((aspect - 2.4) * 0.12).min(0.6);
        radius *= 1.0 - k;
        snap *= 1.0 - 0.85 * k;
        strength *= (1.0 - 0.9 * k).max(0.55);
    }

    MagnetParams {
        radius,
        snap,
        strength,
    }
}

/// The rect used for "near the element" tests: grown horizontally by up to
/// 18 px and vertically by up to 18 px, proportionally to the frame size.
pub fn padded_rect(frame: &Rect) -> Rect {
    let pad_x = (frame.w * 0.22).clamp(6.0, 18.0);
    let pad_y = (frame.h * 0.60).clamp(6.0, 18.0);
    frame.inset(-pad_x, -pad_y)
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

const CANDIDATE_TTL: u32 = 6;
const STRAIN_LIMIT: u32 = 3;
const PENDING_SWITCH_TICKS: u32 = 3;

#[derive(Debug)]
pub struct MagnetState {
    pub(crate) enabled: bool,
    /// The frame the resolver works against this tick.
    pub(crate) current_target: Option<Rect>,
    /// The frame the virtual cursor is pinned toward.
    pub(crate) locked_target: Option<Rect>,
    pub(crate) pending_switch_target: Option<Rect>,
    pub(crate) pending_switch_confidence: u32,
    /// Short memory of the last eligibility result, decayed over 6 ticks.
    pub(crate) last_seen_candidate: Option<Rect>,
    pub(crate) last_seen_candidate_ttl: u32,
    pub(crate) lock_strain_counter: u32,
    pub(crate) lock_strain_target: Option<Rect>,
}

impl MagnetState {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            current_target: None,
            locked_target: None,
            pending_switch_target: None,
            pending_switch_confidence: 0,
            last_seen_candidate: None,
            last_seen_candidate_ttl: 0,
            lock_strain_counter: 0,
            lock_strain_target: None,
        }
    }

    pub(crate) fn clear_targets(&mut self) {
        self.current_target = None;
        self.locked_target = None;
        self.pending_switch_target = None;
        self.pending_switch_confidence = 0;
        self.last_seen_candidate = None;
        self.last_seen_candidate_ttl = 0;
        self.lock_strain_counter = 0;
        self.lock_strain_target = None;
    }

    pub(crate) fn unlock(&mut self) {
        self.locked_target = None;
        self.lock_strain_counter = 0;
        self.lock_strain_target = None;
    }

    fn clear_pending(&mut self) {
        self.pending_switch_target = None;
        self.pending_switch_confidence = 0;
    }

    /// Locked, current, and remembered candidate frames, deduplicated.
    pub(crate) fn remembered_targets(&self) -> Vec<Rect> {
        let mut out: Vec<Rect> = Vec::with_capacity(3);
        for t in [
            self.locked_target,
            self.current_target,
            self.last_seen_candidate,
        ]
        .into_iter()
        .flatten()
        {
            if !out.contains(&t) {
                out.push(t);
            }
        }
        out
    }
}

impl MotionEngine {
    /// Feeds one eligibility result in. `None` decays the candidate memory;
    /// a frame refreshes it and runs the lock hysteresis. When the raw
    /// position moved this tick, the resolver runs against the decision.
    pub fn update_magnetic_target(&mut self, frame: Option<Rect>) {
        if !self.magnet.enabled {
            self.magnet.clear_targets();
            return;
        }

        let Some(frame) = frame else {
            self.magnet.current_target = None;
            self.magnet.clear_pending();
            if self.magnet.last_seen_candidate_ttl > 0 {
                self.magnet.last_seen_candidate_ttl -= 1;
                if self.magnet.last_seen_candidate_ttl == 0 {
                    self.magnet.last_seen_candidate = None;
                }
            }
            return;
        };

        self.magnet.last_seen_candidate = Some(frame);
        self.magnet.last_seen_candidate_ttl = CANDIDATE_TTL;

        let raw = self.pre_magnet;

        if let Some(locked) = self.magnet.locked_target {
            if frames_equivalent(&frame, &locked) {
                // Same element, refreshed geometry.
                self.magnet.locked_target = Some(frame);
                self.magnet.current_target = Some(frame);
                self.magnet.clear_pending();
                self.resolve_if_fresh();
                return;
            }

            let overlap = locked.intersection_area(&frame);
            let denom = locked.area().min(frame.area()).max(1.0);
            if overlap / denom >= 0.65 && point_rect_distance(raw, &locked) <= 6.0 {
                // Heavily overlapping replacement while the pointer still
                // sits on the lock: hold.
                self.magnet.current_target = Some(locked);
                self.magnet.clear_pending();
                self.resolve_if_fresh();
                return;
            }

            if frame.inset(-8.0, -8.0).contains(raw) {
                // The pointer is already on the new element.
                self.magnet.unlock();
                self.magnet.current_target = Some(frame);
                self.magnet.clear_pending();
                self.resolve_if_fresh();
                return;
            }

            let locked_params = magnetic_params(&self.tuning, &locked);
            let locked_minor = locked.minor_side();
            let exit_threshold = (locked_params.snap * 1.1).max(locked_minor * 0.75);
            let preliminary = (locked_minor * 0.95).max(locked_params.snap * 1.5);
            let base = self.tuning.target_switch_min_distance;
            let switch_threshold = base.min(preliminary.max(locked_minor).max(base * 0.35));

            let raw_dist = raw.distance_to(locked.center());
            if raw_dist > switch_threshold {
                self.magnet.unlock();
                self.magnet.current_target = Some(frame);
                self.magnet.clear_pending();
                self.resolve_if_fresh();
                return;
            }

            let new_closer = raw.distance_to(frame.center()) < raw_dist;
            let aligned = self
                .alignment_toward(frame.center())
                .is_some_and(|a| a > 0.35);
            let vigorous =
                self.velocity.magnitude() >= 60.0 || self.last_input_delta.magnitude() >= 2.0;

            if raw_dist > exit_threshold && new_closer && aligned && vigorous {
                match self.magnet.pending_switch_target {
                    Some(pending) if frames_equivalent(&pending, &frame) => {
                        self.magnet.pending_switch_target = Some(frame);
                        self.magnet.pending_switch_confidence += 1;
                    }
                    _ => {
                        self.magnet.pending_switch_target = Some(frame);
                        self.magnet.pending_switch_confidence = 1;
                    }
                }
                if self.magnet.pending_switch_confidence >= PENDING_SWITCH_TICKS {
                    self.magnet.unlock();
                    self.magnet.current_target = Some(frame);
                    self.magnet.clear_pending();
                } else {
                    self.magnet.current_target = Some(locked);
                }
            } else {
                self.magnet.clear_pending();
                self.magnet.current_target = Some(locked);
            }
            self.resolve_if_fresh();
            return;
        }

        self.magnet.current_target = Some(frame);
        self.magnet.clear_pending();
        self.resolve_if_fresh();
    }

    fn resolve_if_fresh(&mut self) {
        if self.raw_fresh {
            self.apply_magnetism();
            self.raw_fresh = false;
        }
    }

    /// The resolver proper. Runs after each raw position update and after
    /// each target decision made on fresh raw data.
    pub(crate) fn apply_magnetism(&mut self) {
        if !self.magnet.enabled {
            return;
        }

        let raw = self.pre_magnet;
        let raw_prev = self.previous_pre_magnet;
        let raw_step = raw - raw_prev;

        // 1. Raw escape from an existing lock.
        if let Some(locked) = self.magnet.locked_target {
            if self.raw_escaped_lock(&locked, raw, raw_step) {
                debug!("🧲 Lock released by raw escape");
                self.release_lock_to_raw();
                if let Some(candidate) = self.magnet.last_seen_candidate {
                    self.magnet.current_target = Some(candidate);
                }
                return;
            }
        }

        // 2. Strain accounting; may force-unlock.
        if self.magnet.locked_target.is_some() && self.strain_tick(raw, raw_step) {
            return;
        }

        // 3. Candidate adoption and immediate crossing capture.
        if let Some(candidate) = self.magnet.last_seen_candidate {
            let desktop_area = self.desktop_bounds.map(|b| b.area()).unwrap_or(f64::MAX);
            if candidate.area() <= 0.35 * desktop_area {
                let cp = magnetic_params(&self.tuning, &candidate);
                let center = candidate.center();
                let center_dist = raw.distance_to(center);
                let rect_dist = point_rect_distance(raw, &candidate);

                if center_dist <= cp.radius * 1.9 + 12.0 || rect_dist <= cp.snap * 1.8 {
                    let candidate_best = center_dist.min(rect_dist);
                    let current_best = self.magnet.current_target.map(|c| {
                        raw.distance_to(c.center()).min(point_rect_distance(raw, &c))
                    });
                    let wins = match current_best {
                        None => true,
                        Some(best) => candidate_best + 12.0 <= best,
                    };
                    if wins {
                        self.magnet.current_target = Some(candidate);
                    }
                }

                if raw_step.dot(center - raw_prev) > 0.0 {
                    let padded = padded_rect(&candidate);
                    let crossed = segment_circle_intersects(raw_prev, raw, center, cp.snap * 1.5)
                        || segment_rect_intersects(raw_prev, raw, &padded)
                        || (raw_step.magnitude() > 2.0 * cp.radius
                            && padded.contains(midpoint(raw_prev, raw)));
                    if crossed {
                        self.snap_to_target(candidate);
                        return;
                    }
                }
            }
        }

        // 4–5. No resolvable target: brake a fast approach toward the
        // remembered candidate, then bail unlocked.
        let Some(target) = self.magnet.current_target else {
            if let Some(candidate) = self.magnet.last_seen_candidate {
                let cp = magnetic_params(&self.tuning, &candidate);
                self.approach_brake(&candidate, &cp, raw, raw_prev, false);
            }
            self.magnet.unlock();
            return;
        };

        // 6. Resolve against the current target.
        let params = magnetic_params(&self.tuning, &target);
        let center = target.center();
        let padded = padded_rect(&target);

        let mut distance = self.position.distance_to(center);
        let mut rect_distance = point_rect_distance(self.position, &target);
        let raw_distance = raw.distance_to(center);
        let raw_rect_distance = point_rect_distance(raw, &target);

        let entered = padded.contains(self.position)
            || distance <= params.radius
            || raw_distance <= params.radius
            || rect_distance <= params.radius;

        // 7. Raw-crossing capture against the current target.
        if raw_step.dot(center - raw_prev) > 0.0 {
            let crossed = segment_circle_intersects(raw_prev, raw, center, params.snap)
                || segment_circle_intersects(raw_prev, raw, center, params.radius)
                || segment_circle_intersects(raw_prev, raw, center, params.snap * 1.25)
                || segment_rect_intersects(raw_prev, raw, &padded)
                || (raw_step.magnitude() > 2.0 * params.radius
                    && padded.contains(midpoint(raw_prev, raw)));
            if crossed {
                self.snap_to_target(target);
                return;
            }
        }

        // 8. A live lock follows the refreshed target geometry.
        if self.magnet.locked_target.is_some() {
            self.magnet.locked_target = Some(target);
        }

        // 9. Entering the capture zone locks on.
        if self.magnet.locked_target.is_none() && entered {
            self.snap_to_target(target);
            return;
        }

        // 10. Raw proximity snap.
        if raw_distance <= params.snap * 1.25 || raw_rect_distance <= (params.snap * 1.25).max(10.0)
        {
            self.snap_to_target(target);
            return;
        }

        // 11. Soft approach assist in the outer band.
        let assist_outer = (params.radius * 1.6).max(params.snap + 22.0);
        if !entered
            && self.magnet.locked_target.is_none()
            && !self.is_gliding
            && self.magnet.pending_switch_target.is_none()
            && distance > params.radius
            && distance <= assist_outer
        {
            let align = self.alignment_toward(center).unwrap_or(0.3);
            if align > -0.5 {
                let range = (assist_outer - params.radius).max(1.0);
                let intensity = ((assist_outer - distance) / range).clamp(0.0, 1.0).powf(1.25);
                let ease_speed = (1.0 - self.velocity.magnitude() / 165.0).clamp(0.0, 1.0);
                let ease_delta =
                    (1.0 - self.last_input_delta.magnitude() / 3.2).clamp(0.0, 1.0);
                let factor = intensity * params.strength * 0.12 * ease_speed * ease_delta;
                if factor > 0.0 {
                    self.position = self.position + (center - self.position) * factor;
                    distance = self.position.distance_to(center);
                    rect_distance = point_rect_distance(self.position, &target);
                }
            }
        }

        // 12. High-speed brake, with a partial snap when braking hard.
        if self.approach_brake(&target, &params, raw, raw_prev, true) {
            distance = self.position.distance_to(center);
            rect_distance = point_rect_distance(self.position, &target);
        }

        // 13. Outside gate: both cursors beyond the attraction radius.
        if raw_rect_distance > params.radius && rect_distance > params.radius {
            if self.magnet.locked_target.is_some() {
                self.release_lock_to_raw();
            }
            return;
        }

        // 14. Commit.
        if self.magnet.locked_target.is_none() {
            self.magnet.locked_target = Some(target);
            self.adopt_strain_target(&target);
        }

        // 15. A glide passing near enough terminates on the target.
        if self.is_gliding
            && distance.min(rect_distance) < params.radius
            && self.velocity.magnitude() > 35.0
        {
            self.snap_to_target(target);
            return;
        }

        // 16. Near-center snap.
        if distance < params.snap {
            self.snap_to_target(target);
            return;
        }

        // 17. Outer-zone pull, gated by directional alignment.
        let slow_intent =
            self.velocity.magnitude() < 30.0 && self.last_input_delta.magnitude() < 1.35;
        let a = self.alignment_toward(center).unwrap_or(0.0);

        if a <= -0.55 {
            self.magnet.unlock();
            return;
        }

        let escape_scale = if a <= 0.0 {
            if slow_intent && a > -0.4 {
                0.08 * (1.0 + a / 0.4).max(0.0)
            } else {
                0.0
            }
        } else if a < 0.2 {
            (a / 0.2).powi(2) * if slow_intent { 0.22 } else { 0.12 }
        } else {
            let floor = if slow_intent { 0.25 } else { 0.15 };
            (floor + ((a - 0.2) / 0.8) * (1.0 - floor)).min(1.0)
        };

        if escape_scale > 0.0 {
            let base_proximity = (1.0 - distance / params.radius).max(0.0);
            let shaped = base_proximity.powf(1.18);
            let pull = params.strength * (0.18 + shaped * 0.92);
            let speed_mult = (1.0
                + (self.velocity.magnitude() / self.tuning.max_momentum_speed) * 0.72
                + base_proximity * 0.6)
                .min(1.9);
            let adjusted = pull * speed_mult * escape_scale;
            self.position = self.position + (center - self.position) * adjusted;
            self.velocity = self.velocity * (1.0 - pull * 1.05 * escape_scale).max(0.08);
            self.clamp_position();
        }
    }

    /// Escape test against the locked frame. Compact frames release on
    /// euclidean distance; elongated narrow frames release only on travel
    /// along the axis perpendicular to their long side, so motion along a
    /// sidebar or toolbar never sheds the lock.
    fn raw_escaped_lock(&self, locked: &Rect, raw: Point, raw_step: Vec2) -> bool {
        let params = magnetic_params(&self.tuning, locked);
        let center = locked.center();
        let offset = raw - center;
        let minor = locked.minor_side();
        let elongated = locked.aspect_ratio() > 1.8 && minor < 110.0;

        if !elongated {
            return offset.magnitude() > (minor * 0.65).max(params.snap * 0.9);
        }

        let cap = (minor * 0.48).max(params.snap * 0.75).max(18.0);
        if locked.h > locked.w {
            raw_step.dx.abs() > raw_step.dy.abs() * 0.9
                && raw_step.dx.abs() > 2.5
                && raw_step.dx * offset.dx > 0.0
                && offset.dx.abs() > cap
        } else {
            raw_step.dy.abs() > raw_step.dx.abs() * 0.9
                && raw_step.dy.abs() > 2.5
                && raw_step.dy * offset.dy > 0.0
                && offset.dy.abs() > cap
        }
    }

    /// Velocity damping for fast approaches; optionally adds the partial
    /// snap used against a resolved target. Returns true when the position
    /// moved.
    fn approach_brake(
        &mut self,
        target: &Rect,
        params: &MagnetParams,
        raw: Point,
        raw_prev: Point,
        allow_partial_snap: bool,
    ) -> bool {
        let speed = self.velocity.magnitude();
        if speed <= 70.0 {
            return false;
        }
        let center = target.center();
        let nearest = raw
            .distance_to(center)
            .min(point_rect_distance(raw, target))
            .min(point_segment_distance(center, raw_prev, raw));
        if nearest >= params.radius * 1.6 {
            return false;
        }
        let brake =
            self.tuning.proximity_brake.max(0.24) * ((speed - 38.0) / 210.0).clamp(0.0, 1.0);
        let damp = (1.0 - 0.96 * brake).max(0.03);
        self.velocity = self.velocity * damp;
        self.last_input_delta = self.last_input_delta * damp;

        if allow_partial_snap && brake > 0.32 {
            let weight = 0.38 + self.tuning.snap_assist * 0.5;
            self.position = self.position + (center - self.position) * weight;
            self.clamp_position();
            return true;
        }
        false
    }

    /// One tick of strain accounting while locked. Counts consecutive ticks
    /// of decisive push-away along the constrained axis of an elongated
    /// frame; three strained ticks force the unlock. Returns true when the
    /// lock was released.
    fn strain_tick(&mut self, raw: Point, raw_step: Vec2) -> bool {
        let locked = match self.magnet.locked_target {
            Some(l) => l,
            None => return false,
        };

        match self.magnet.lock_strain_target {
            Some(t) if frames_equivalent(&t, &locked) => {}
            _ => {
                self.magnet.lock_strain_target = Some(locked);
                self.magnet.lock_strain_counter = 0;
            }
        }

        if !self.is_strained_tick(&locked, raw, raw_step) {
            self.magnet.lock_strain_counter = self.magnet.lock_strain_counter.saturating_sub(1);
            return false;
        }

        self.magnet.lock_strain_counter += 1;
        if self.magnet.lock_strain_counter >= STRAIN_LIMIT {
            debug!("🧲 Lock released by strain");
            self.release_lock_to_raw();
            if let Some(candidate) = self.magnet.last_seen_candidate {
                self.magnet.current_target = Some(candidate);
            }
            return true;
        }
        false
    }

    /// A tick strains the lock when the raw step decisively pushes away
    /// from the center along the elongated frame's constrained axis, far
    /// enough out that the push cannot be jitter.
    fn is_strained_tick(&self, locked: &Rect, raw: Point, raw_step: Vec2) -> bool {
        if raw_step.magnitude() < 2.2 {
            return false;
        }
        let from_center = raw - locked.center();
        if raw_step.dot(from_center) <= 0.0 {
            return false;
        }
        let minor = locked.minor_side();
        if locked.aspect_ratio() <= 1.8 || minor >= 110.0 {
            return false;
        }
        let directional = if locked.h > locked.w {
            raw_step.dx.abs() > raw_step.dy.abs() * 0.9 && raw_step.dx.abs() > 2.5
        } else {
            raw_step.dy.abs() > raw_step.dx.abs() * 0.9 && raw_step.dy.abs() > 2.5
        };
        if !directional {
            return false;
        }
        let params = magnetic_params(&self.tuning, locked);
        from_center.magnitude() >= (minor * 0.38).max(params.snap * 0.6).max(16.0)
    }

    /// Pins the virtual cursor to the target center, zeroes motion, and
    /// commits the lock. The raw cursor is untouched.
    pub(crate) fn snap_to_target(&mut self, target: Rect) {
        self.previous_position = self.position;
        self.position = self.clamped(target.center());
        self.velocity = Vec2::ZERO;
        self.last_input_delta = Vec2::ZERO;
        self.is_gliding = false;
        self.magnet.locked_target = Some(target);
        self.magnet.current_target = Some(target);
        self.magnet.clear_pending();
        self.adopt_strain_target(&target);
    }

    /// Strain tracking survives re-snaps onto the same element; only a
    /// genuinely different target resets the counter.
    fn adopt_strain_target(&mut self, target: &Rect) {
        match self.magnet.lock_strain_target {
            Some(t) if frames_equivalent(&t, target) => {
                self.magnet.lock_strain_target = Some(*target);
            }
            _ => {
                self.magnet.lock_strain_target = Some(*target);
                self.magnet.lock_strain_counter = 0;
            }
        }
    }

    /// Drops the lock and lets the virtual cursor rejoin the raw cursor.
    fn release_lock_to_raw(&mut self) {
        self.magnet.unlock();
        self.previous_position = self.position;
        self.position = self.clamped(self.pre_magnet);
    }

    /// Weighted agreement between current motion and the direction to
    /// `center`: velocity weighted up to 300 px/s, input delta up to 10 px.
    /// `None` when there is no meaningful motion to read intent from.
    pub(crate) fn alignment_toward(&self, center: Point) -> Option<f64> {
        let to_center = (center - self.pre_magnet).normalized();
        if to_center == Vec2::ZERO {
            return None;
        }
        let weight_v = (self.velocity.magnitude() / 300.0).min(1.0);
        let weight_d = (self.last_input_delta.magnitude() / 10.0).min(1.0);
        if weight_v + weight_d <= f64::EPSILON {
            return None;
        }
        let align_v = self.velocity.normalized().dot(to_center);
        let align_d = self.last_input_delta.normalized().dot(to_center);
        Some((align_v * weight_v + align_d * weight_d) / (weight_v + weight_d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MotionEngine;
    use gp_core::types::Point;

    fn engine() -> MotionEngine {
        let mut e = MotionEngine::new(EngineTuning::default());
        e.update_desktop_bounds(Rect::new(0.0, 0.0, 2000.0, 1200.0));
        e
    }

    #[test]
    fn test_params_small_square_button() {
        let tuning = EngineTuning::default();
        let p = magnetic_params(&tuning, &Rect::new(480.0, 80.0, 60.0, 40.0));
        // minor 40 → norm 40/110; radius clamps up to minor * 0.85
        assert!((p.radius - 34.0).abs() < 1e-9);
        assert!((p.snap - 22.0).abs() < 1e-9);
        assert!(p.strength >= 0.4 && p.strength <= 0.65 * 1.12);
    }

    #[test]
    fn test_params_elongated_frame_weakened() {
        let tuning = EngineTuning::default();
        let square = magnetic_params(&tuning, &Rect::new(0.0, 0.0, 40.0, 40.0));
        let bar = magnetic_params(&tuning, &Rect::new(0.0, 0.0, 40.0, 300.0));
        assert!(bar.radius < square.radius);
        assert!(bar.snap < square.snap);
        assert!(bar.strength < square.strength);
    }

    #[test]
    fn test_padded_rect_clamps() {
        let padded = padded_rect(&Rect::new(100.0, 100.0, 200.0, 10.0));
        // pad_x = clamp(44, 6, 18) = 18, pad_y = clamp(6, 6, 18) = 6
        assert_eq!(padded.min_x(), 82.0);
        assert_eq!(padded.min_y(), 94.0);
    }

    #[test]
    fn test_update_none_decays_candidate_over_six_ticks() {
        let mut e = engine();
        e.prime(Point::new(500.0, 500.0));
        e.update_magnetic_target(Some(Rect::new(700.0, 500.0, 60.0, 40.0)));
        assert!(e.last_seen_candidate().is_some());
        for _ in 0..5 {
            e.update_magnetic_target(None);
            assert!(e.last_seen_candidate().is_some());
        }
        e.update_magnetic_target(None);
        assert!(e.last_seen_candidate().is_none());
    }

    #[test]
    fn test_update_none_is_stable_on_target_state() {
        let mut e = engine();
        e.prime(Point::new(500.0, 500.0));
        e.update_magnetic_target(None);
        let locked = e.locked_target();
        let current = e.current_target();
        e.update_magnetic_target(None);
        assert_eq!(e.locked_target(), locked);
        assert_eq!(e.current_target(), current);
    }

    #[test]
    fn test_disable_clears_everything() {
        let mut e = engine();
        e.prime(Point::new(510.0, 100.0));
        let frame = Rect::new(480.0, 80.0, 60.0, 40.0);
        e.handle_touch(Point::new(511.0, 100.0), 0.002, None);
        e.update_magnetic_target(Some(frame));
        assert!(e.is_locked());

        e.set_magnetism_enabled(false);
        assert!(!e.is_locked());
        assert!(e.locked_target().is_none());
        assert!(e.current_target().is_none());
        assert!(e.last_seen_candidate().is_none());

        // Idempotent
        e.set_magnetism_enabled(false);
        assert!(!e.is_locked());

        // While disabled, target updates are dropped entirely.
        e.update_magnetic_target(Some(frame));
        assert!(e.current_target().is_none());
        assert!(e.last_seen_candidate().is_none());
    }

    #[test]
    fn test_lock_acquired_inside_frame() {
        let mut e = engine();
        e.prime(Point::new(508.0, 99.0));
        let frame = Rect::new(480.0, 80.0, 60.0, 40.0);
        e.handle_touch(Point::new(510.0, 100.0), 0.002, None);
        e.update_magnetic_target(Some(frame));
        assert!(e.is_locked());
        assert_eq!(e.position(), Point::new(510.0, 100.0));
        assert_eq!(e.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_locked_invariant_matches_locked_target() {
        let mut e = engine();
        e.prime(Point::new(510.0, 100.0));
        assert_eq!(e.is_locked(), e.locked_target().is_some());
        e.handle_touch(Point::new(511.0, 100.0), 0.002, None);
        e.update_magnetic_target(Some(Rect::new(480.0, 80.0, 60.0, 40.0)));
        assert_eq!(e.is_locked(), e.locked_target().is_some());
    }

    #[test]
    fn test_equivalent_frame_refreshes_lock() {
        let mut e = engine();
        e.prime(Point::new(510.0, 100.0));
        e.handle_touch(Point::new(511.0, 100.0), 0.002, None);
        e.update_magnetic_target(Some(Rect::new(480.0, 80.0, 60.0, 40.0)));
        assert!(e.is_locked());

        // Accessibility re-reports the same element 2 px off.
        let refreshed = Rect::new(482.0, 81.0, 60.0, 40.0);
        e.update_magnetic_target(Some(refreshed));
        assert_eq!(e.locked_target(), Some(refreshed));
        assert_eq!(e.current_target(), Some(refreshed));
    }

    #[test]
    fn test_alignment_sign() {
        let mut e = engine();
        e.prime(Point::new(100.0, 100.0));
        e.handle_touch(Point::new(110.0, 100.0), 0.002, None);
        // Moving straight toward a center to the right
        let toward = e.alignment_toward(Point::new(400.0, 100.0)).unwrap();
        assert!(toward > 0.99);
        let away = e.alignment_toward(Point::new(-400.0, 100.0)).unwrap();
        assert!(away < -0.99);
    }

    #[test]
    fn test_alignment_undefined_when_stationary() {
        let mut e = engine();
        e.prime(Point::new(100.0, 100.0));
        assert!(e.alignment_toward(Point::new(400.0, 100.0)).is_none());
    }
}
