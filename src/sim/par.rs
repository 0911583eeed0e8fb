//! Theoretical minimum completion time
//!
//! Replays a level headlessly with a bang-bang driver: full throttle until
//! the braking distance would carry the train past the end of the station,
//! then full brake. The result is a lower bound used to reject leaderboard
//! times that no real run could achieve.

use serde::{Deserialize, Serialize};

use super::generator::generate;
use super::rules::TrackLayout;
use super::spline::TrackSpline;
use super::train::{TrainControls, TrainSim};
use crate::consts::SIM_DT;
use crate::settings::{ParConfig, SimConfig, TrainConfig};

/// Why no finite bound exists for a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnreachableReason {
    /// The bumper comes before the train can stop in the station
    PassedBumper,
    /// The train came to rest outside the station zone
    StoppedOutsideStation,
    /// Simulated time exceeded the safety ceiling
    TimeCeiling,
}

impl UnreachableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnreachableReason::PassedBumper => "passed bumper",
            UnreachableReason::StoppedOutsideStation => "stopped outside station",
            UnreachableReason::TimeCeiling => "time ceiling",
        }
    }
}

/// Outcome of the minimum-time calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinimumTime {
    /// Conservative lower bound in milliseconds
    Bound { ms: u64 },
    /// No usable bound; never compare times against this
    Unreachable(UnreachableReason),
}

impl MinimumTime {
    pub fn ms(&self) -> Option<u64> {
        match self {
            MinimumTime::Bound { ms } => Some(*ms),
            MinimumTime::Unreachable(_) => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, MinimumTime::Bound { .. })
    }
}

/// Minimum time for a level, regenerating its track as the live game does
pub fn minimum_time_ms(level: u32, seed: u32, config: &SimConfig) -> MinimumTime {
    let resolved = config.for_level(level);
    let spline = TrackSpline::new(generate(seed, level, &resolved.track), false);
    let layout = TrackLayout::from_track_length(spline.length(), &resolved.rules);
    let result = minimum_time_for_layout(&layout, &resolved.train, &resolved.par);
    if let MinimumTime::Unreachable(reason) = result {
        log::warn!("Level {} (seed {}): no minimum time ({})", level, seed, reason.as_str());
    }
    result
}

/// Bang-bang run over an explicit layout
pub fn minimum_time_for_layout(
    layout: &TrackLayout,
    train_config: &TrainConfig,
    par: &ParConfig,
) -> MinimumTime {
    let dt = if par.dt > 0.0 && par.dt.is_finite() { par.dt } else { SIM_DT };
    let max_ticks = (par.time_ceiling_seconds.max(0.0) / dt).ceil() as u64;
    let max_decel = train_config.max_decel();

    let mut train = TrainSim::new(train_config.clone());
    let mut braking = false;
    let mut departed = false;

    for tick in 1..=max_ticks {
        let state = train.state();
        if !braking {
            let stopping = if max_decel > 0.0 {
                state.speed * state.speed / (2.0 * max_decel)
            } else {
                f64::INFINITY
            };
            braking = state.distance + stopping >= layout.station_end_distance;
            if braking && !departed {
                // Braking from rest: the train never leaves the stem
                return MinimumTime::Unreachable(UnreachableReason::StoppedOutsideStation);
            }
        }
        train.set_controls(if braking {
            TrainControls::new(0.0, 1.0)
        } else {
            TrainControls::new(1.0, 0.0)
        });
        train.update(dt);

        let state = train.state();
        departed |= state.speed > 0.0;

        if state.distance >= layout.bumper_distance {
            return MinimumTime::Unreachable(UnreachableReason::PassedBumper);
        }
        if departed && state.speed < par.stop_speed && layout.in_station(state.distance) {
            let elapsed_ms = (tick as f64 * dt * 1000.0).floor() as u64;
            return MinimumTime::Bound {
                ms: elapsed_ms.saturating_sub(par.margin_ms),
            };
        }
        if departed && state.speed <= 0.0 {
            return MinimumTime::Unreachable(UnreachableReason::StoppedOutsideStation);
        }
    }

    MinimumTime::Unreachable(UnreachableReason::TimeCeiling)
}

/// Par duration in seconds for ETA and schedule pressure
pub fn expected_duration(bound: &MinimumTime, par: &ParConfig) -> Option<f64> {
    bound
        .ms()
        .map(|ms| ms as f64 / 1000.0 * par.schedule_slack + par.schedule_grace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::RuleConfig;

    #[test]
    fn test_minimum_time_is_reproducible() {
        let config = SimConfig::default();
        let a = minimum_time_ms(1, 42, &config);
        let b = minimum_time_ms(1, 42, &config);
        assert_eq!(a, b);
        // 800 m level: 2826 ticks to stop in the platform, minus the 100 ms margin
        assert_eq!(a, MinimumTime::Bound { ms: 47_000 });
    }

    #[test]
    fn test_longer_levels_take_longer() {
        let config = SimConfig::default();
        let first = minimum_time_ms(1, 42, &config).ms().unwrap();
        let fifth = minimum_time_ms(5, 42, &config).ms().unwrap();
        assert!(fifth > first);
    }

    #[test]
    fn test_station_after_bumper_is_unreachable() {
        let mut config = SimConfig::default();
        config.rules = RuleConfig {
            bumper_offset: 200.0,
            station_end_offset: 20.0,
            station_length: 80.0,
            ..Default::default()
        };
        let result = minimum_time_ms(1, 42, &config);
        assert_eq!(result, MinimumTime::Unreachable(UnreachableReason::PassedBumper));
        assert_eq!(result.ms(), None);
    }

    #[test]
    fn test_explicit_misconfigured_layout() {
        let layout = TrackLayout {
            bumper_distance: 300.0,
            station_start_distance: 400.0,
            station_end_distance: 450.0,
        };
        let result =
            minimum_time_for_layout(&layout, &TrainConfig::default(), &ParConfig::default());
        assert!(!result.is_reachable());
    }

    #[test]
    fn test_station_at_start_never_departs() {
        // Braking distance is already past the station end at rest
        let layout = TrackLayout {
            bumper_distance: 100.0,
            station_start_distance: -50.0,
            station_end_distance: -10.0,
        };
        let result =
            minimum_time_for_layout(&layout, &TrainConfig::default(), &ParConfig::default());
        assert_eq!(result, MinimumTime::Unreachable(UnreachableReason::StoppedOutsideStation));

        let at_origin = TrackLayout {
            station_end_distance: 0.0,
            ..layout
        };
        let result =
            minimum_time_for_layout(&at_origin, &TrainConfig::default(), &ParConfig::default());
        assert_eq!(result, MinimumTime::Unreachable(UnreachableReason::StoppedOutsideStation));
    }

    #[test]
    fn test_time_ceiling() {
        let layout = TrackLayout {
            bumper_distance: 6000.0,
            station_start_distance: 4900.0,
            station_end_distance: 5000.0,
        };
        let par = ParConfig {
            time_ceiling_seconds: 5.0,
            ..Default::default()
        };
        let result = minimum_time_for_layout(&layout, &TrainConfig::default(), &par);
        assert_eq!(result, MinimumTime::Unreachable(UnreachableReason::TimeCeiling));
    }

    #[test]
    fn test_short_station_is_overshot_or_missed() {
        // A 1 m zone far down the line: bang-bang stops short of it
        let layout = TrackLayout {
            bumper_distance: 2000.0,
            station_start_distance: 1499.0,
            station_end_distance: 1500.0,
        };
        let train = TrainConfig {
            drag_linear: 4000.0,
            ..Default::default()
        };
        let result = minimum_time_for_layout(&layout, &train, &ParConfig::default());
        assert_eq!(result, MinimumTime::Unreachable(UnreachableReason::StoppedOutsideStation));
    }

    #[test]
    fn test_margin_is_subtracted() {
        let layout = TrackLayout {
            bumper_distance: 1000.0,
            station_start_distance: 800.0,
            station_end_distance: 950.0,
        };
        let train = TrainConfig::default();
        let plain = ParConfig {
            margin_ms: 0,
            ..Default::default()
        };
        let margined = ParConfig {
            margin_ms: 250,
            ..Default::default()
        };
        let a = minimum_time_for_layout(&layout, &train, &plain).ms().unwrap();
        let b = minimum_time_for_layout(&layout, &train, &margined).ms().unwrap();
        assert_eq!(a - b, 250);
    }

    #[test]
    fn test_expected_duration() {
        let par = ParConfig::default();
        let d = expected_duration(&MinimumTime::Bound { ms: 40_000 }, &par).unwrap();
        assert!((d - (40.0 * par.schedule_slack + par.schedule_grace)).abs() < 1e-9);
        assert_eq!(
            expected_duration(&MinimumTime::Unreachable(UnreachableReason::TimeCeiling), &par),
            None
        );
    }
}
