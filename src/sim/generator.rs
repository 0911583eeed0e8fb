//! Procedural track generation
//!
//! Walks a fixed number of equal-length segments, steering toward a heading
//! drawn from two octaves of value noise. A local sweep keeps each new segment
//! clear of older ones; whole-walk retries with re-derived seeds pick the
//! attempt with the fewest self-intersections. Generation always returns a
//! track: a residual crossing is a quality defect, not an error.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use super::noise::{attempt_seed, level_seed, value_noise};
use super::segment::Segment2;
use crate::settings::TrackConfig;
use crate::{ground, heading_to_dir, lift};

/// Salt separating the detail octave from the macro octave
const DETAIL_SALT: u32 = 0x68E3_1DA4;

/// Ordered centerline points, y fixed at 0, `segment_count + 1` long
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPath {
    pub points: Vec<DVec3>,
}

impl GeneratedPath {
    pub fn from_points(points: Vec<DVec3>) -> Self {
        Self { points }
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Sum of consecutive point distances
    pub fn total_length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// Whether a walk runs the self-avoidance sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Avoidance {
    Enabled,
    Disabled,
}

/// Which attempt won and how clean it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Index of the returned attempt
    pub attempt: u32,
    /// Attempts actually walked
    pub attempts_run: u32,
    /// Self-intersections in the returned path
    pub intersections: usize,
}

/// Generate the centerline for a level
pub fn generate(seed: u32, level: u32, config: &TrackConfig) -> GeneratedPath {
    generate_with_report(seed, level, config).0
}

/// Generate the centerline for a level, reporting attempt quality
pub fn generate_with_report(
    seed: u32,
    level: u32,
    config: &TrackConfig,
) -> (GeneratedPath, GenerationReport) {
    let base = level_seed(seed, level);
    let attempts = config.max_generation_attempts.max(1);

    let mut best_path = walk(base, config, Avoidance::Enabled);
    let mut best = GenerationReport {
        attempt: 0,
        attempts_run: 1,
        intersections: count_self_intersections(&best_path.points),
    };
    log::debug!(
        "Track attempt 0 (seed {:#010x}): {} intersections",
        base,
        best.intersections
    );

    for attempt in 1..attempts {
        if best.intersections == 0 {
            break;
        }
        let path = walk(attempt_seed(base, attempt), config, Avoidance::Enabled);
        let intersections = count_self_intersections(&path.points);
        log::debug!(
            "Track attempt {} (seed {:#010x}): {} intersections",
            attempt,
            attempt_seed(base, attempt),
            intersections
        );
        best.attempts_run = attempt + 1;
        if intersections < best.intersections {
            best.attempt = attempt;
            best.intersections = intersections;
            best_path = path;
        }
    }

    (best_path, best)
}

/// A single forward walk from the origin along +z
pub fn walk(seed: u32, config: &TrackConfig, avoidance: Avoidance) -> GeneratedPath {
    let count = config.segment_count;
    let length = config.segment_length;
    let max_delta = config.max_heading_delta.abs();
    let ignore = config.avoidance_recent_segment_ignore.max(1);
    let macro_scale = config.macro_noise_scale.max(f64::EPSILON);
    let detail_scale = config.detail_noise_scale.max(f64::EPSILON);
    let detail_seed = seed ^ DETAIL_SALT;

    let mut points = Vec::with_capacity(count + 1);
    let mut segments: Vec<Segment2> = Vec::with_capacity(count);
    let mut pos = DVec2::ZERO;
    let mut heading = 0.0_f64;
    let mut bias = 0.0_f64;
    points.push(lift(pos));

    for i in 0..count {
        let walked = i as f64 * length;
        if walked < config.stem_length {
            heading = 0.0;
        } else {
            let s = walked - config.stem_length;
            let target = config.macro_amplitude * value_noise(seed, s / macro_scale)
                + config.detail_amplitude * value_noise(detail_seed, s / detail_scale);

            let raw = (target - heading) * config.heading_response;
            bias += (raw - bias) * config.bias_tracking_rate;
            let steer =
                raw - bias - heading * config.heading_damping - pos.x * config.lateral_pull;
            let baseline = steer.clamp(-max_delta, max_delta);

            let delta = match avoidance {
                Avoidance::Enabled => {
                    let checked = segments.len().saturating_sub(ignore);
                    choose_clear_delta(pos, heading, baseline, &segments[..checked], config)
                }
                Avoidance::Disabled => baseline,
            };
            heading += delta;
        }

        let next = pos + heading_to_dir(heading) * length;
        segments.push(Segment2::new(pos, next));
        pos = next;
        points.push(lift(pos));
    }

    GeneratedPath { points }
}

/// Clearance between the segment leaving `pos` at `heading` and the obstacles
fn clearance(pos: DVec2, heading: f64, length: f64, obstacles: &[Segment2]) -> f64 {
    let candidate = Segment2::new(pos, pos + heading_to_dir(heading) * length);
    obstacles
        .iter()
        .map(|s| candidate.distance_to(s))
        .fold(f64::INFINITY, f64::min)
}

/// Pick the heading delta for the next segment
///
/// Returns `baseline` if it clears the obstacles, otherwise the first sweep
/// candidate that does. Failing that, the candidate with the largest
/// clearance (ties go to the smallest deviation from `baseline`).
pub(crate) fn choose_clear_delta(
    pos: DVec2,
    heading: f64,
    baseline: f64,
    obstacles: &[Segment2],
    config: &TrackConfig,
) -> f64 {
    let required = config.min_self_intersection_distance;
    let max_delta = config.max_heading_delta.abs();
    let length = config.segment_length;

    let base_clearance = clearance(pos, heading + baseline, length, obstacles);
    if base_clearance >= required {
        return baseline;
    }

    let mut best_delta = baseline;
    let mut best_clearance = base_clearance;
    let mut best_deviation = 0.0;

    for k in 1..=config.avoidance_sweep_steps {
        for sign in [1.0, -1.0] {
            let candidate =
                (baseline + sign * k as f64 * config.heading_step).clamp(-max_delta, max_delta);
            let c = clearance(pos, heading + candidate, length, obstacles);
            if c >= required {
                return candidate;
            }
            let deviation = (candidate - baseline).abs();
            if c > best_clearance || (c == best_clearance && deviation < best_deviation) {
                best_delta = candidate;
                best_clearance = c;
                best_deviation = deviation;
            }
        }
    }

    best_delta
}

/// Pairwise crossings between non-adjacent segments
///
/// The pair formed by the first and last segment is skipped.
pub fn count_self_intersections(points: &[DVec3]) -> usize {
    let segments: Vec<Segment2> = points
        .windows(2)
        .map(|w| Segment2::new(ground(w[0]), ground(w[1])))
        .collect();
    let last = segments.len().saturating_sub(1);

    let mut count = 0;
    for a in 0..segments.len() {
        for b in (a + 2)..segments.len() {
            if a == 0 && b == last {
                continue;
            }
            if segments[a].intersects(&segments[b]) {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    fn turn_angle(a: DVec3, b: DVec3, c: DVec3) -> f64 {
        let d1 = ground(b - a);
        let d2 = ground(c - b);
        d1.perp_dot(d2).atan2(d1.dot(d2)).abs()
    }

    #[test]
    fn test_generate_is_deterministic() {
        let config = TrackConfig::default();
        let a = generate(42, 1, &config);
        let b = generate(42, 1, &config);
        assert_eq!(a, b);
        assert_eq!(a.points.len(), config.segment_count + 1);
    }

    #[test]
    fn test_levels_produce_different_tracks() {
        let config = TrackConfig::default();
        assert_ne!(generate(42, 1, &config), generate(42, 2, &config));
    }

    #[test]
    fn test_segment_length_invariant() {
        let config = TrackConfig::default();
        for seed in [1, 42, 777, 90_210] {
            let path = generate(seed, 3, &config);
            for w in path.points.windows(2) {
                assert!((w[0].distance(w[1]) - config.segment_length).abs() < 1e-6);
                assert_eq!(w[1].y, 0.0);
            }
        }
    }

    #[test]
    fn test_heading_delta_bound() {
        let config = TrackConfig::default();
        for seed in [3, 42, 1234] {
            let path = generate(seed, 2, &config);
            for w in path.points.windows(3) {
                assert!(turn_angle(w[0], w[1], w[2]) <= config.max_heading_delta + 1e-9);
            }
        }
    }

    #[test]
    fn test_full_stem_is_straight() {
        let mut config = TrackConfig::default();
        config.stem_length = config.segment_count as f64 * config.segment_length;
        let path = generate(99, 4, &config);
        for (i, p) in path.points.iter().enumerate() {
            assert!(p.x.abs() < 1e-9);
            assert!((p.z - i as f64 * config.segment_length).abs() < 1e-6);
        }
    }

    #[test]
    fn test_stem_prefix_is_straight() {
        let config = TrackConfig::default();
        let stem_points = (config.stem_length / config.segment_length) as usize;
        let path = generate(5, 1, &config);
        for p in &path.points[..=stem_points] {
            assert_eq!(p.x, 0.0);
        }
    }

    /// Loose steering with no drift correction, so raw walks coil into themselves
    fn tangled_config() -> TrackConfig {
        TrackConfig {
            macro_amplitude: 8.0,
            detail_amplitude: 3.0,
            heading_damping: 0.0,
            lateral_pull: 0.0,
            bias_tracking_rate: 0.0,
            max_heading_delta: 0.15,
            heading_response: 0.5,
            segment_count: 400,
            ..Default::default()
        }
    }

    #[test]
    fn test_avoidance_beats_baseline() {
        let config = tangled_config();
        let mut rng = Pcg32::seed_from_u64(0x5EED);
        let mut chosen_total = 0;
        let mut baseline_total = 0;
        for _ in 0..12 {
            let seed: u32 = rng.random();
            let (_, report) = generate_with_report(seed, 1, &config);
            let baseline = walk(level_seed(seed, 1), &config, Avoidance::Disabled);
            chosen_total += report.intersections;
            baseline_total += count_self_intersections(&baseline.points);
        }
        assert!(baseline_total > 0);
        assert!(chosen_total < baseline_total, "{chosen_total} vs {baseline_total}");
    }

    #[test]
    fn test_report_matches_path() {
        for config in [TrackConfig::default(), tangled_config()] {
            let (path, report) = generate_with_report(42, 1, &config);
            assert_eq!(report.intersections, count_self_intersections(&path.points));
            assert!(report.attempts_run >= 1);
            assert!(report.attempts_run <= config.max_generation_attempts);
            assert!(report.attempt < report.attempts_run);
        }
    }

    #[test]
    fn test_retries_keep_fewest_intersections() {
        let config = tangled_config();
        let mut rng = Pcg32::seed_from_u64(0xA77E);
        let mut retried = 0;
        for _ in 0..8 {
            let seed: u32 = rng.random();
            let (path, report) = generate_with_report(seed, 1, &config);
            if report.attempts_run < 2 {
                continue;
            }
            retried += 1;

            let base = level_seed(seed, 1);
            let counts: Vec<usize> = (0..report.attempts_run)
                .map(|a| {
                    let attempt = walk(attempt_seed(base, a), &config, Avoidance::Enabled);
                    count_self_intersections(&attempt.points)
                })
                .collect();
            let fewest = *counts.iter().min().unwrap();
            let first_fewest = counts.iter().position(|&c| c == fewest).unwrap() as u32;

            assert_eq!(report.intersections, fewest);
            assert_eq!(report.attempt, first_fewest);
            assert_eq!(
                path,
                walk(attempt_seed(base, report.attempt), &config, Avoidance::Enabled)
            );
            // Retries stop early only on a clean walk
            if report.attempts_run < config.max_generation_attempts {
                assert_eq!(counts[counts.len() - 1], 0);
            }
        }
        assert!(retried > 0);
    }

    #[test]
    fn test_count_self_intersections_figure_eight() {
        // Bow-tie: segment 0 crosses segment 2
        let points = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 2.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, 2.0),
            DVec3::new(0.0, 0.0, 5.0),
        ];
        assert_eq!(count_self_intersections(&points), 1);
    }

    #[test]
    fn test_count_skips_first_last_pair() {
        // Closed square: first and last segments meet at the origin
        let points = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 1.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(0.0, 0.0, 0.0),
        ];
        assert_eq!(count_self_intersections(&points), 0);
    }

    #[test]
    fn test_sweep_accepts_first_clear_candidate() {
        let config = TrackConfig {
            min_self_intersection_distance: 1.2,
            heading_step: 0.01,
            avoidance_sweep_steps: 12,
            max_heading_delta: 0.06,
            segment_length: 5.0,
            ..Default::default()
        };
        // Wall just left of the straight-ahead segment
        let wall = [Segment2::new(DVec2::new(-1.0, 5.0), DVec2::new(-1.0, 20.0))];
        let delta = choose_clear_delta(DVec2::ZERO, 0.0, 0.0, &wall, &config);
        assert!((delta - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_sweep_falls_back_to_largest_clearance() {
        let config = TrackConfig {
            min_self_intersection_distance: 12.0,
            heading_step: 0.01,
            avoidance_sweep_steps: 12,
            max_heading_delta: 0.06,
            segment_length: 5.0,
            ..Default::default()
        };
        // Slanted wall ahead, unreachable clearance; it recedes toward +x
        let wall = [Segment2::new(DVec2::new(-5.0, 6.0), DVec2::new(5.0, 10.0))];
        let delta = choose_clear_delta(DVec2::ZERO, 0.0, 0.0, &wall, &config);
        assert!((delta - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_sweep_keeps_clear_baseline() {
        let config = TrackConfig::default();
        let far = [Segment2::new(DVec2::new(100.0, 0.0), DVec2::new(100.0, 10.0))];
        assert_eq!(choose_clear_delta(DVec2::ZERO, 0.0, 0.03, &far, &config), 0.03);
        assert_eq!(choose_clear_delta(DVec2::ZERO, 0.0, -0.02, &[], &config), -0.02);
    }

    #[test]
    fn test_zero_segments() {
        let config = TrackConfig {
            segment_count: 0,
            ..Default::default()
        };
        let path = generate(1, 1, &config);
        assert_eq!(path.points, vec![DVec3::ZERO]);
        assert_eq!(path.total_length(), 0.0);
    }
}
