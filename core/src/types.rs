use serde::{Deserialize, Serialize};

/// 2D displacement / velocity in pixels (or pixels per second).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub dx: f64,
    pub dy: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn magnitude(self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }

    /// Unit vector; zero vector stays zero.
    pub fn normalized(self) -> Vec2 {
        let m = self.magnitude();
        if m <= f64::EPSILON {
            Vec2::ZERO
        } else {
            Vec2::new(self.dx / m, self.dy / m)
        }
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.dx * other.dx + self.dy * other.dy
    }

    /// 2D cross product (z component).
    pub fn cross(self, other: Vec2) -> f64 {
        self.dx * other.dy - self.dy * other.dx
    }

    /// Scale down to `max` magnitude if longer; identity otherwise.
    pub fn clamped(self, max: f64) -> Vec2 {
        let m = self.magnitude();
        if m > max && m > f64::EPSILON {
            self * (max / m)
        } else {
            self
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.dx * rhs, self.dy * rhs)
    }
}

/// A location in global screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (other - self).magnitude()
    }
}

impl std::ops::Add<Vec2> for Point {
    type Output = Point;
    fn add(self, rhs: Vec2) -> Point {
        Point::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl std::ops::Sub for Point {
    type Output = Vec2;
    fn sub(self, rhs: Point) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle; `w` and `h` are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.w
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.h
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.w / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.h / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Shorter side, floored at 1 so ratios stay finite.
    pub fn minor_side(&self) -> f64 {
        self.w.min(self.h).max(1.0)
    }

    pub fn major_side(&self) -> f64 {
        self.w.max(self.h)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.major_side() / self.minor_side()
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// Shrink by (dx, dy) on each side; negative values grow the rect.
    pub fn inset(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(
            self.x + dx,
            self.y + dy,
            (self.w - 2.0 * dx).max(0.0),
            (self.h - 2.0 * dy).max(0.0),
        )
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let min_x = self.min_x().min(other.min_x());
        let min_y = self.min_y().min(other.min_y());
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Overlap area with `other`; zero when disjoint.
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = (self.max_x().min(other.max_x()) - self.min_x().max(other.min_x())).max(0.0);
        let h = (self.max_y().min(other.max_y()) - self.min_y().max(other.min_y())).max(0.0);
        w * h
    }

    pub fn clamp_point(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.min_x(), self.max_x()),
            p.y.clamp(self.min_y(), self.max_y()),
        )
    }
}

/// Lifecycle of a single trackpad touch as reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    NotTouching,
    Hovering,
    Making,
    Touching,
    Breaking,
    Lingering,
}

impl TouchPhase {
    /// Phases that count as finger-on-pad contact.
    pub fn is_contact(self) -> bool {
        !matches!(self, TouchPhase::NotTouching | TouchPhase::Hovering)
    }
}

/// One finger in a trackpad frame; position normalized to [0, 1]².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
    pub phase: TouchPhase,
}

/// One frame from the trackpad driver (possibly empty).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchFrame {
    pub touches: Vec<TouchPoint>,
}

impl TouchFrame {
    pub fn contact_count(&self) -> usize {
        self.touches.iter().filter(|t| t.phase.is_contact()).count()
    }
}

/// Accessibility snapshot for the element under a screen point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub frame: Rect,
    pub role: Option<String>,
    pub actions: Vec<String>,
    pub url: Option<String>,
    pub bundle_id: Option<String>,
    pub is_file_picker_panel: bool,
}

/// Which input stream supplied the engine's current velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VelocitySource {
    Pointer,
    Trackpad,
}
