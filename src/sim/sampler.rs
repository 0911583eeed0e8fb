//! Forward-looking track samples for the HUD, minimap and safe-speed envelope

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::spline::TrackSpline;
use crate::settings::SamplerConfig;

/// Curvature and safe speed at a point ahead of the train
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvatureSample {
    /// Distance ahead of the query point (meters)
    pub forward_distance: f64,
    /// Offset to the right of the current heading (meters)
    pub lateral_offset: f64,
    /// Signed curvature (1/m, positive turns right)
    pub curvature: f64,
    /// Curvature-limited speed (m/s)
    pub safe_speed: f64,
}

/// A point of the upcoming track for minimap drawing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimapPathPoint {
    pub forward_distance: f64,
    pub x: f64,
    pub z: f64,
}

/// Samples curvature and path points from a spline
#[derive(Debug, Clone)]
pub struct TrackSampler {
    config: SamplerConfig,
}

impl TrackSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Number of curvature samples returned by `sample_ahead`
    pub fn sample_count(&self) -> usize {
        window_count(self.config.lookahead, self.config.spacing)
    }

    /// Number of points returned by `sample_path_ahead`
    pub fn path_point_count(&self) -> usize {
        window_count(self.config.path_lookahead, self.config.path_spacing)
    }

    /// Signed curvature by finite differences over ±span
    pub fn curvature_at(&self, spline: &TrackSpline, distance: f64) -> f64 {
        let span = self.config.curvature_span.abs().max(1e-3);
        let behind = spline.tangent_at_distance(distance - span);
        let here = spline.tangent_at_distance(distance);
        let ahead = spline.tangent_at_distance(distance + span);
        let turn = signed_turn(behind, here) + signed_turn(here, ahead);
        turn / (2.0 * span)
    }

    /// Speed that keeps lateral acceleration within limits for a curvature
    pub fn safe_speed_for(&self, curvature: f64) -> f64 {
        let c = &self.config;
        let k = curvature.abs();
        let raw = if k > 1e-9 {
            (c.max_lateral_accel.max(0.0) / k).sqrt()
        } else {
            c.max_safe_speed
        };
        raw.clamp(c.min_safe_speed.min(c.max_safe_speed), c.max_safe_speed)
    }

    /// Curvature safe speed at a single distance
    pub fn safe_speed_at(&self, spline: &TrackSpline, distance: f64) -> f64 {
        self.safe_speed_for(self.curvature_at(spline, distance))
    }

    /// Fixed-size curvature samples over the lookahead window
    pub fn sample_ahead(&self, spline: &TrackSpline, from_distance: f64) -> Vec<CurvatureSample> {
        let origin = spline.position_at_distance(from_distance);
        let heading = spline.tangent_at_distance(from_distance);
        let right = DVec3::new(heading.z, 0.0, -heading.x);
        let start = spline.normalize_distance(from_distance);
        let spacing = self.config.spacing.abs();

        (0..self.sample_count())
            .map(|i| {
                let forward = i as f64 * spacing;
                let d = spline.normalize_distance(start + forward);
                let curvature = self.curvature_at(spline, d);
                CurvatureSample {
                    forward_distance: forward,
                    lateral_offset: (spline.position_at_distance(d) - origin).dot(right),
                    curvature,
                    safe_speed: self.safe_speed_for(curvature),
                }
            })
            .collect()
    }

    /// Fixed-size world points over the minimap window
    pub fn sample_path_ahead(
        &self,
        spline: &TrackSpline,
        from_distance: f64,
    ) -> Vec<MinimapPathPoint> {
        let start = spline.normalize_distance(from_distance);
        let spacing = self.config.path_spacing.abs();

        (0..self.path_point_count())
            .map(|i| {
                let forward = i as f64 * spacing;
                let p = spline.position_at_distance(start + forward);
                MinimapPathPoint {
                    forward_distance: forward,
                    x: p.x,
                    z: p.z,
                }
            })
            .collect()
    }
}

/// Upper bound on samples per window
pub const MAX_WINDOW_SAMPLES: usize = 4096;

/// Samples in [0, window] at `spacing`, always in 1..=MAX_WINDOW_SAMPLES
fn window_count(window: f64, spacing: f64) -> usize {
    if spacing <= 0.0 || !spacing.is_finite() || !window.is_finite() || window <= 0.0 {
        return 1;
    }
    let steps = (window / spacing).floor();
    if steps >= MAX_WINDOW_SAMPLES as f64 {
        return MAX_WINDOW_SAMPLES;
    }
    (steps as usize).saturating_add(1).min(MAX_WINDOW_SAMPLES)
}

/// Signed angle from tangent `a` to `b`, sign from the vertical cross component
fn signed_turn(a: DVec3, b: DVec3) -> f64 {
    // (a × b).y: positive when turning toward +x (right of +z)
    let cross_y = a.z * b.x - a.x * b.z;
    cross_y.atan2(a.dot(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TrackConfig;
    use crate::sim::generator::{GeneratedPath, generate};

    fn arc(radius: f64, segments: usize, right: bool) -> TrackSpline {
        // Circle arc starting at origin heading +z
        let sign = if right { 1.0 } else { -1.0 };
        let points = (0..=segments)
            .map(|i| {
                let a = i as f64 * 0.02;
                DVec3::new(sign * radius * (1.0 - a.cos()), 0.0, radius * a.sin())
            })
            .collect();
        TrackSpline::new(GeneratedPath::from_points(points), false)
    }

    fn straight(length: f64) -> TrackSpline {
        TrackSpline::new(
            GeneratedPath::from_points(vec![DVec3::ZERO, DVec3::new(0.0, 0.0, length)]),
            false,
        )
    }

    #[test]
    fn test_straight_has_zero_curvature() {
        let sampler = TrackSampler::new(SamplerConfig::default());
        let spline = straight(500.0);
        assert_eq!(sampler.curvature_at(&spline, 100.0), 0.0);
        assert_eq!(
            sampler.safe_speed_at(&spline, 100.0),
            SamplerConfig::default().max_safe_speed
        );
    }

    #[test]
    fn test_arc_curvature_matches_radius() {
        let sampler = TrackSampler::new(SamplerConfig::default());
        let right = arc(200.0, 200, true);
        let k = sampler.curvature_at(&right, right.length() / 2.0);
        assert!((k - 1.0 / 200.0).abs() < 1e-4);

        let left = arc(200.0, 200, false);
        let k = sampler.curvature_at(&left, left.length() / 2.0);
        assert!((k + 1.0 / 200.0).abs() < 1e-4);
    }

    #[test]
    fn test_safe_speed_drops_with_curvature() {
        let sampler = TrackSampler::new(SamplerConfig::default());
        let gentle = sampler.safe_speed_for(1.0 / 1000.0);
        let sharp = sampler.safe_speed_for(1.0 / 100.0);
        assert!(sharp < gentle);
        let c = SamplerConfig::default();
        assert_eq!(sampler.safe_speed_for(10.0), c.min_safe_speed);
        assert_eq!(sampler.safe_speed_for(0.0), c.max_safe_speed);
        assert_eq!(sampler.safe_speed_for(-1.0 / 100.0), sharp);
    }

    #[test]
    fn test_sample_ahead_is_fixed_size() {
        let sampler = TrackSampler::new(SamplerConfig::default());
        let spline = TrackSpline::new(generate(42, 1, &TrackConfig::default()), false);
        let expected = sampler.sample_count();
        assert_eq!(expected, 16);
        for from in [0.0, 200.0, spline.length() - 5.0, spline.length() + 100.0] {
            let samples = sampler.sample_ahead(&spline, from);
            assert_eq!(samples.len(), expected);
            assert!(samples.iter().all(|s| s.safe_speed.is_finite()));
        }
    }

    #[test]
    fn test_lateral_offset_sign() {
        let sampler = TrackSampler::new(SamplerConfig::default());
        let right = arc(100.0, 150, true);
        let samples = sampler.sample_ahead(&right, 0.0);
        assert_eq!(samples[0].lateral_offset, 0.0);
        assert!(samples.last().unwrap().lateral_offset > 0.0);
    }

    #[test]
    fn test_path_ahead() {
        let sampler = TrackSampler::new(SamplerConfig::default());
        let spline = straight(100.0);
        let path = sampler.sample_path_ahead(&spline, 10.0);
        assert_eq!(path.len(), sampler.path_point_count());
        assert_eq!(path[0].z, 10.0);
        // Clamped at the end of an open track
        assert_eq!(path.last().unwrap().z, 100.0);
        assert!(path.iter().all(|p| p.x == 0.0));
    }

    #[test]
    fn test_window_count_degenerate() {
        assert_eq!(window_count(100.0, 0.0), 1);
        assert_eq!(window_count(-5.0, 10.0), 1);
        assert_eq!(window_count(100.0, 10.0), 11);
    }

    #[test]
    fn test_window_count_is_capped() {
        assert_eq!(window_count(1e300, 1e-300), MAX_WINDOW_SAMPLES);
        assert_eq!(window_count(1e9, 1.0), MAX_WINDOW_SAMPLES);
        assert_eq!(window_count(4095.0, 1.0), MAX_WINDOW_SAMPLES);

        let config = crate::settings::SimConfig::from_json(
            r#"{ "sampler": { "lookahead": 1e300, "spacing": 1e-300, "path_lookahead": 1e12 } }"#,
        )
        .unwrap();
        let sampler = TrackSampler::new(config.sampler);
        assert_eq!(sampler.sample_count(), MAX_WINDOW_SAMPLES);
        assert_eq!(sampler.path_point_count(), MAX_WINDOW_SAMPLES);
        let spline = TrackSpline::new(generate(1, 1, &TrackConfig::default()), false);
        assert_eq!(sampler.sample_path_ahead(&spline, 0.0).len(), MAX_WINDOW_SAMPLES);
    }
}
