//! Safe-speed envelope and the win/fail state machine
//!
//! The caller owns `GameStatus` and only changes it through the `Transition`
//! returned here, evaluated once per tick while running.

use serde::{Deserialize, Serialize};

use crate::settings::{RuleConfig, TrainConfig};

/// Why a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Reached the bumper at the end of the line
    Bumper,
    /// Passenger comfort ran out
    Comfort,
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Waiting at the departure stem
    #[default]
    Ready,
    /// Train under player control
    Running,
    /// Stopped inside the station zone
    Won,
    /// Run ended
    Failed(FailureReason),
}

impl GameStatus {
    /// Won and Failed only leave through an explicit restart
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::Won | GameStatus::Failed(_))
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            GameStatus::Failed(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// A status change produced by `RuleEngine::check_transition`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub status: GameStatus,
    pub failure_reason: Option<FailureReason>,
}

impl Transition {
    fn to(status: GameStatus) -> Self {
        Self {
            status,
            failure_reason: status.failure_reason(),
        }
    }
}

/// Key distances along a level's track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackLayout {
    pub bumper_distance: f64,
    pub station_start_distance: f64,
    pub station_end_distance: f64,
}

impl TrackLayout {
    /// Layout from a track length; offsets are measured back from the end
    ///
    /// Values are not clamped, so a misconfigured layout stays visible to
    /// the minimum-time calculation.
    pub fn from_track_length(length: f64, config: &RuleConfig) -> Self {
        let station_end_distance = length - config.station_end_offset;
        Self {
            bumper_distance: length - config.bumper_offset,
            station_start_distance: station_end_distance - config.station_length,
            station_end_distance,
        }
    }

    pub fn in_station(&self, distance: f64) -> bool {
        (self.station_start_distance..=self.station_end_distance).contains(&distance)
    }

    /// Distance left before the bumper (never negative)
    pub fn remaining_to_bumper(&self, distance: f64) -> f64 {
        (self.bumper_distance - distance).max(0.0)
    }
}

/// Evaluates the envelope and transitions for one level layout
#[derive(Debug, Clone)]
pub struct RuleEngine {
    layout: TrackLayout,
    max_decel: f64,
    stop_threshold: f64,
}

impl RuleEngine {
    pub fn new(layout: TrackLayout, rules: &RuleConfig, train: &TrainConfig) -> Self {
        Self {
            layout,
            max_decel: train.max_decel().max(0.0),
            stop_threshold: rules.stop_threshold,
        }
    }

    pub fn layout(&self) -> &TrackLayout {
        &self.layout
    }

    /// Speed from which full braking stops exactly at the bumper
    pub fn approach_cap(&self, distance: f64) -> f64 {
        (2.0 * self.max_decel * self.layout.remaining_to_bumper(distance)).sqrt()
    }

    /// Min of the curvature safe speed and the bumper braking envelope
    pub fn compute_safe_speed(&self, distance: f64, curvature_safe_speed: f64) -> f64 {
        curvature_safe_speed.min(self.approach_cap(distance))
    }

    /// Next status for a running train, if any
    ///
    /// Bumper beats comfort; winning needs both a stop and the station zone.
    pub fn check_transition(
        &self,
        distance: f64,
        speed: f64,
        comfort: f64,
        current: GameStatus,
    ) -> Option<Transition> {
        if current != GameStatus::Running {
            return None;
        }
        if distance >= self.layout.bumper_distance {
            return Some(Transition::to(GameStatus::Failed(FailureReason::Bumper)));
        }
        if comfort <= 0.0 {
            return Some(Transition::to(GameStatus::Failed(FailureReason::Comfort)));
        }
        if speed <= self.stop_threshold && self.layout.in_station(distance) {
            return Some(Transition::to(GameStatus::Won));
        }
        None
    }
}
