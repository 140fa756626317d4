//! Pure geometry kernel: distances, crossing tests, frame equivalence.
//! Deterministic, no allocation.

use gp_core::types::{Point, Rect, Vec2};

/// Distance from a point to a rect; zero when the point is inside.
pub fn point_rect_distance(p: Point, r: &Rect) -> f64 {
    let dx = (r.min_x() - p.x).max(0.0).max(p.x - r.max_x());
    let dy = (r.min_y() - p.y).max(0.0).max(p.y - r.max_y());
    dx.hypot(dy)
}

/// Distance from `p` to the segment [a, b]; degenerate segments collapse
/// to point distance.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq <= f64::EPSILON {
        return p.distance_to(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    let projected = a + ab * t;
    p.distance_to(projected)
}

/// True when the segment [a, b] passes within `radius` of `center`.
pub fn segment_circle_intersects(a: Point, b: Point, center: Point, radius: f64) -> bool {
    point_segment_distance(center, a, b) <= radius
}

/// True when the segment [a, b] touches the rect: an endpoint inside,
/// or a crossing of one of its four edges.
pub fn segment_rect_intersects(a: Point, b: Point, r: &Rect) -> bool {
    if r.contains(a) || r.contains(b) {
        return true;
    }
    let tl = Point::new(r.min_x(), r.min_y());
    let tr = Point::new(r.max_x(), r.min_y());
    let bl = Point::new(r.min_x(), r.max_y());
    let br = Point::new(r.max_x(), r.max_y());
    segments_intersect(a, b, tl, tr)
        || segments_intersect(a, b, tr, br)
        || segments_intersect(a, b, br, bl)
        || segments_intersect(a, b, bl, tl)
}

/// Segment-vs-segment via 2D cross-product orientation tests, with a
/// collinear-overlap fallback.
fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = direction(q1, q2, p1);
    let d2 = direction(q1, q2, p2);
    let d3 = direction(p1, p2, q1);
    let d4 = direction(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

fn direction(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Same on-screen element within jitter tolerance: centers within 5 px,
/// sides within 10 px.
pub fn frames_equivalent(l: &Rect, r: &Rect) -> bool {
    (l.mid_x() - r.mid_x()).abs() < 5.0
        && (l.mid_y() - r.mid_y()).abs() < 5.0
        && (l.w - r.w).abs() < 10.0
        && (l.h - r.h).abs() < 10.0
}

/// Scale `v` down to magnitude `max` when longer.
pub fn clamped_velocity(v: Vec2, max: f64) -> Vec2 {
    v.clamped(max)
}
