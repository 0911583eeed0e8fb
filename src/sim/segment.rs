//! 2-D segment predicates for self-avoidance
//!
//! Segments live on the ground plane as (x, z). Intersection uses signed
//! orientation tests with an epsilon for collinear and touching cases.

use glam::DVec2;

/// Tolerance for orientation and boundary tests
pub const GEOM_EPSILON: f64 = 1e-9;

/// A ground-plane segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment2 {
    pub a: DVec2,
    pub b: DVec2,
}

impl Segment2 {
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.b - self.a).length()
    }

    /// True if the two segments cross or touch
    pub fn intersects(&self, other: &Segment2) -> bool {
        segments_intersect(self.a, self.b, other.a, other.b)
    }

    /// Minimum distance between the two segments (0 when they intersect)
    pub fn distance_to(&self, other: &Segment2) -> f64 {
        segment_distance(self.a, self.b, other.a, other.b)
    }
}

/// Sign of the turn p → q → r: 1 counter-clockwise, -1 clockwise, 0 collinear
#[inline]
fn orientation(p: DVec2, q: DVec2, r: DVec2) -> i8 {
    let cross = (q - p).perp_dot(r - p);
    if cross > GEOM_EPSILON {
        1
    } else if cross < -GEOM_EPSILON {
        -1
    } else {
        0
    }
}

/// Whether `q` lies within the bounding box of p..r (collinear case)
#[inline]
fn on_segment(p: DVec2, q: DVec2, r: DVec2) -> bool {
    q.x <= p.x.max(r.x) + GEOM_EPSILON
        && q.x >= p.x.min(r.x) - GEOM_EPSILON
        && q.y <= p.y.max(r.y) + GEOM_EPSILON
        && q.y >= p.y.min(r.y) - GEOM_EPSILON
}

/// Segment p1-p2 versus segment q1-q2
pub fn segments_intersect(p1: DVec2, p2: DVec2, q1: DVec2, q2: DVec2) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    // Collinear/boundary cases
    (o1 == 0 && on_segment(p1, q1, p2))
        || (o2 == 0 && on_segment(p1, q2, p2))
        || (o3 == 0 && on_segment(q1, p1, q2))
        || (o4 == 0 && on_segment(q1, p2, q2))
}

/// Distance from `p` to segment a-b (clamped projection)
pub fn point_segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= GEOM_EPSILON * GEOM_EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Minimum distance between two segments
pub fn segment_distance(p1: DVec2, p2: DVec2, q1: DVec2, q2: DVec2) -> f64 {
    if segments_intersect(p1, p2, q1, q2) {
        return 0.0;
    }
    point_segment_distance(p1, q1, q2)
        .min(point_segment_distance(p2, q1, q2))
        .min(point_segment_distance(q1, p1, p2))
        .min(point_segment_distance(q2, p1, p2))
}
