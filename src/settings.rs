//! Simulation configuration
//!
//! Every tunable the sim reads lives here. Values are copied into each
//! component at construction and never mutated afterwards, so the live game
//! and the offline par-time calculator see identical numbers.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration load failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Procedural track generation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Number of fixed-length segments in the centerline
    pub segment_count: usize,
    /// Length of every segment (meters)
    pub segment_length: f64,
    /// Straight departure stem (meters, heading forced to 0)
    pub stem_length: f64,
    /// Maximum heading change per segment (radians)
    pub max_heading_delta: f64,
    /// Sweep increment when searching for a clear heading (radians)
    pub heading_step: f64,
    /// Sweep tries on each side of the baseline heading
    pub avoidance_sweep_steps: u32,
    /// Minimum clearance between non-adjacent segments (meters)
    pub min_self_intersection_distance: f64,
    /// Most recent segments exempt from the clearance test
    pub avoidance_recent_segment_ignore: usize,
    /// Whole-walk retries with re-derived seeds
    pub max_generation_attempts: u32,

    // === Noise ===
    /// Walk distance per macro lattice cell (meters)
    pub macro_noise_scale: f64,
    /// Macro octave amplitude (radians of target heading)
    pub macro_amplitude: f64,
    /// Walk distance per detail lattice cell (meters)
    pub detail_noise_scale: f64,
    /// Detail octave amplitude (radians of target heading)
    pub detail_amplitude: f64,

    // === Steering ===
    /// Fraction of the target-heading error applied per segment
    pub heading_response: f64,
    /// Low-pass rate of the running curvature average
    pub bias_tracking_rate: f64,
    /// Proportional pull of heading toward 0
    pub heading_damping: f64,
    /// Proportional pull of position toward x = 0 (radians per meter)
    pub lateral_pull: f64,

    // === Level progression ===
    /// Extra segments added per level after the first
    pub segments_per_level: usize,
    /// Upper bound on segment count for high levels
    pub max_segment_count: usize,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            segment_count: 160,
            segment_length: 5.0,
            stem_length: 60.0,
            max_heading_delta: 0.06,
            heading_step: 0.01,
            avoidance_sweep_steps: 12,
            min_self_intersection_distance: 12.0,
            avoidance_recent_segment_ignore: 6,
            max_generation_attempts: 8,

            macro_noise_scale: 180.0,
            macro_amplitude: 1.4,
            detail_noise_scale: 45.0,
            detail_amplitude: 0.35,

            heading_response: 0.2,
            bias_tracking_rate: 0.02,
            heading_damping: 0.015,
            lateral_pull: 0.0004,

            segments_per_level: 20,
            max_segment_count: 600,
        }
    }
}

/// Forward-looking curvature sampling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Curvature lookahead window (meters)
    pub lookahead: f64,
    /// Distance between curvature samples (meters)
    pub spacing: f64,
    /// Finite-difference half span for curvature estimation (meters)
    pub curvature_span: f64,
    /// Lateral acceleration considered comfortable in curves (m/s²)
    pub max_lateral_accel: f64,
    /// Lower clamp for curvature safe speed (m/s)
    pub min_safe_speed: f64,
    /// Upper clamp for curvature safe speed (m/s)
    pub max_safe_speed: f64,
    /// Minimap path window (meters)
    pub path_lookahead: f64,
    /// Minimap point spacing (meters)
    pub path_spacing: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            lookahead: 150.0,
            spacing: 10.0,
            curvature_span: 4.0,
            max_lateral_accel: 1.2,
            min_safe_speed: 8.0,
            max_safe_speed: 32.0,
            path_lookahead: 240.0,
            path_spacing: 8.0,
        }
    }
}

/// Train dynamics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Train mass (kg)
    pub mass: f64,
    /// Tractive force at full throttle (N)
    pub max_throttle_force: f64,
    /// Braking force at full brake (N)
    pub max_brake_force: f64,
    /// Rolling resistance coefficient (N per m/s)
    pub drag_linear: f64,
    /// Aerodynamic drag coefficient (N per (m/s)²)
    pub drag_quadratic: f64,
    /// Top speed (m/s)
    pub max_speed: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            mass: 40_000.0,
            max_throttle_force: 60_000.0,
            max_brake_force: 48_000.0,
            drag_linear: 80.0,
            drag_quadratic: 2.5,
            max_speed: 32.0,
        }
    }
}

impl TrainConfig {
    /// Deceleration at full brake ignoring drag (m/s²)
    pub fn max_decel(&self) -> f64 {
        if self.mass > 0.0 {
            self.max_brake_force / self.mass
        } else {
            0.0
        }
    }
}

/// Passenger comfort penalty weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComfortConfig {
    /// Full comfort meter
    pub max: f64,
    /// Penalty per second per m/s over the safe speed
    pub overspeed_weight: f64,
    /// Excess at which the over-speed penalty doubles (m/s)
    pub overspeed_knee: f64,
    /// Jerk magnitude tolerated without penalty (m/s³)
    pub jerk_threshold: f64,
    /// Penalty per second per m/s³ of jerk above threshold
    pub jerk_weight: f64,
    /// Deceleration tolerated without penalty (m/s²)
    pub decel_threshold: f64,
    /// Penalty per second per m/s² of deceleration above threshold
    pub decel_weight: f64,
    /// Penalty per second while behind schedule
    pub schedule_weight: f64,
}

impl Default for ComfortConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            overspeed_weight: 0.4,
            overspeed_knee: 4.0,
            jerk_threshold: 8.0,
            jerk_weight: 0.05,
            decel_threshold: 1.1,
            decel_weight: 2.0,
            schedule_weight: 0.5,
        }
    }
}

/// Station/bumper layout and win thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Bumper position measured back from the track end (meters)
    pub bumper_offset: f64,
    /// Station zone end measured back from the track end (meters)
    pub station_end_offset: f64,
    /// Station zone length (meters)
    pub station_length: f64,
    /// Speed below which the train counts as stopped (m/s)
    pub stop_threshold: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            bumper_offset: 10.0,
            station_end_offset: 25.0,
            station_length: 100.0,
            stop_threshold: 0.3,
        }
    }
}

/// Theoretical minimum time calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParConfig {
    /// Fixed integration step (seconds)
    pub dt: f64,
    /// Speed under which the train counts as stopped (m/s)
    pub stop_speed: f64,
    /// Simulated time after which the run is declared unreachable (seconds)
    pub time_ceiling_seconds: f64,
    /// Discretization margin subtracted from the bound (ms)
    pub margin_ms: u64,
    /// Expected duration as a multiple of the bound
    pub schedule_slack: f64,
    /// Expected duration grace added on top (seconds)
    pub schedule_grace: f64,
}

impl Default for ParConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            stop_speed: 0.35,
            time_ceiling_seconds: 1000.0,
            margin_ms: 100,
            schedule_slack: 1.4,
            schedule_grace: 10.0,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub track: TrackConfig,
    pub sampler: SamplerConfig,
    pub train: TrainConfig,
    pub comfort: ComfortConfig,
    pub rules: RuleConfig,
    pub par: ParConfig,
}

impl SimConfig {
    /// Resolve the configuration used for a level (1-based)
    ///
    /// Later levels get longer tracks; nothing else changes.
    pub fn for_level(&self, level: u32) -> Self {
        let mut resolved = self.clone();
        let extra = level.saturating_sub(1) as usize;
        let count = self
            .track
            .segment_count
            .saturating_add(extra.saturating_mul(self.track.segments_per_level));
        let cap = self.track.max_segment_count.max(self.track.segment_count);
        resolved.track.segment_count = count.min(cap);
        resolved
    }

    /// Parse a (possibly partial) JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_level_grows_track() {
        let config = SimConfig::default();
        assert_eq!(config.for_level(1).track.segment_count, config.track.segment_count);
        assert_eq!(
            config.for_level(3).track.segment_count,
            config.track.segment_count + 2 * config.track.segments_per_level
        );
        // Level 0 behaves like level 1
        assert_eq!(config.for_level(0).track.segment_count, config.track.segment_count);
    }

    #[test]
    fn test_for_level_caps_segment_count() {
        let config = SimConfig::default();
        assert_eq!(config.for_level(10_000).track.segment_count, config.track.max_segment_count);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "rules": { "bumper_offset": 42.0 } }"#).unwrap();
        assert_eq!(config.rules.bumper_offset, 42.0);
        assert_eq!(config.rules.station_length, RuleConfig::default().station_length);
        assert_eq!(config.track.segment_count, TrackConfig::default().segment_count);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(SimConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
        assert!(matches!(
            SimConfig::load(Path::new("/nonexistent/station-stop.json")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_values() {
        let mut config = SimConfig::default();
        config.train.mass = 12_345.0;
        let json = config.to_json().unwrap();
        let parsed = SimConfig::from_json(&json).unwrap();
        assert_eq!(parsed.train.mass, 12_345.0);
    }

    #[test]
    fn test_max_decel() {
        let train = TrainConfig::default();
        assert!((train.max_decel() - 1.2).abs() < 1e-12);
    }
}
