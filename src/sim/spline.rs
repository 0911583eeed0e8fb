//! Arc-length parameterized track centerline
//!
//! Wraps a generated polyline with a cumulative distance table so the train's
//! scalar distance maps to a world position and heading. Open tracks clamp
//! distance to [0, length]; closed tracks wrap it.

use glam::DVec3;

use super::generator::GeneratedPath;

/// Forward direction used when the track has no extent
const DEFAULT_TANGENT: DVec3 = DVec3::Z;

/// Immutable centerline with arc-length queries
#[derive(Debug, Clone)]
pub struct TrackSpline {
    points: Vec<DVec3>,
    /// cumulative[i] = distance from points[0] to vertex i (closed: one extra entry back to start)
    cumulative: Vec<f64>,
    /// Unit tangent at every vertex of the cumulative table
    vertex_tangents: Vec<DVec3>,
    closed: bool,
    length: f64,
}

impl TrackSpline {
    pub fn new(path: GeneratedPath, closed: bool) -> Self {
        let mut points = path.points;
        if points.is_empty() {
            points.push(DVec3::ZERO);
        }

        // Vertex sequence walked by the table (closed tracks return to the start)
        let mut verts = points.clone();
        if closed && points.len() > 1 {
            verts.push(points[0]);
        }

        let mut cumulative = Vec::with_capacity(verts.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for w in verts.windows(2) {
            total += w[0].distance(w[1]);
            cumulative.push(total);
        }

        let seg_dirs: Vec<DVec3> = verts
            .windows(2)
            .map(|w| (w[1] - w[0]).normalize_or_zero())
            .collect();
        let vertex_tangents = vertex_tangents(&seg_dirs, verts.len(), closed);

        Self {
            points,
            cumulative,
            vertex_tangents,
            closed,
            length: total,
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Clamp (open) or wrap (closed) a distance into [0, length]
    pub fn normalize_distance(&self, distance: f64) -> f64 {
        if !distance.is_finite() || self.length <= 0.0 {
            return 0.0;
        }
        if self.closed {
            distance.rem_euclid(self.length)
        } else {
            distance.clamp(0.0, self.length)
        }
    }

    /// Enclosing segment index and parameter t ∈ [0, 1] for a distance
    fn locate(&self, distance: f64) -> (usize, f64) {
        let segments = self.cumulative.len() - 1;
        if segments == 0 {
            return (0, 0.0);
        }
        let d = self.normalize_distance(distance);
        // First vertex strictly beyond d, minus one
        let upper = self.cumulative.partition_point(|&c| c <= d);
        let index = upper.saturating_sub(1).min(segments - 1);
        let start = self.cumulative[index];
        let span = self.cumulative[index + 1] - start;
        let t = if span > 0.0 { ((d - start) / span).clamp(0.0, 1.0) } else { 0.0 };
        (index, t)
    }

    /// Vertex `i` of the table (closed tables wrap the last entry to the start)
    #[inline]
    fn vertex(&self, i: usize) -> DVec3 {
        self.points[i % self.points.len()]
    }

    /// World position at a distance along the track
    pub fn position_at_distance(&self, distance: f64) -> DVec3 {
        if self.cumulative.len() < 2 {
            return self.points[0];
        }
        let (i, t) = self.locate(distance);
        self.vertex(i).lerp(self.vertex(i + 1), t)
    }

    /// Unit tangent at a distance, blended between vertex tangents
    pub fn tangent_at_distance(&self, distance: f64) -> DVec3 {
        if self.cumulative.len() < 2 {
            return DEFAULT_TANGENT;
        }
        let (i, t) = self.locate(distance);
        let blended = self.vertex_tangents[i].lerp(self.vertex_tangents[i + 1], t);
        let tangent = blended.normalize_or_zero();
        if tangent == DVec3::ZERO {
            self.vertex_tangents[i]
        } else {
            tangent
        }
    }
}

/// Normalized sum of the segment directions meeting at each vertex
fn vertex_tangents(seg_dirs: &[DVec3], vertex_count: usize, closed: bool) -> Vec<DVec3> {
    if seg_dirs.is_empty() {
        return vec![DEFAULT_TANGENT; vertex_count];
    }
    let last = seg_dirs.len() - 1;
    (0..vertex_count)
        .map(|v| {
            let incoming = if v > 0 {
                Some(seg_dirs[v - 1])
            } else if closed {
                Some(seg_dirs[last])
            } else {
                None
            };
            let outgoing = if v <= last {
                Some(seg_dirs[v])
            } else if closed {
                Some(seg_dirs[0])
            } else {
                None
            };
            let sum = incoming.unwrap_or(DVec3::ZERO) + outgoing.unwrap_or(DVec3::ZERO);
            let tangent = sum.normalize_or_zero();
            if tangent != DVec3::ZERO {
                tangent
            } else {
                // Hairpin reversal: fall back to whichever segment exists
                outgoing.or(incoming).unwrap_or(DEFAULT_TANGENT)
            }
        })
        .collect()
}
