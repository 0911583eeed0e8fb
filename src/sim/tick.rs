//! Fixed timestep simulation tick
//!
//! Core drive loop that advances a session deterministically.

use super::comfort::ComfortInputs;
use super::rules::{FailureReason, GameStatus, Transition};
use super::state::DriveState;
use super::train::TrainControls;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Throttle lever in [0, 1]
    pub throttle: f64,
    /// Brake lever in [0, 1]
    pub brake: f64,
    /// Leave the departure stem without touching the throttle
    pub depart: bool,
    /// Back to Ready on the same track
    pub restart: bool,
}

/// Advance the session by one fixed timestep
///
/// Returns the status change produced by this tick, if any.
pub fn tick(state: &mut DriveState, input: &TickInput, dt: f64) -> Option<Transition> {
    if input.restart {
        log::info!("Level {}: restart", state.level);
        state.restart();
        return None;
    }

    match state.status {
        GameStatus::Won | GameStatus::Failed(_) => return None,
        GameStatus::Ready => {
            let controls = TrainControls::new(input.throttle, input.brake);
            if !(input.depart || controls.throttle > 0.0) {
                return None;
            }
            state.status = GameStatus::Running;
            log::info!("Level {}: departed", state.level);
        }
        GameStatus::Running => {}
    }

    if dt <= 0.0 || !dt.is_finite() {
        return None;
    }

    state.train.set_controls(TrainControls::new(input.throttle, input.brake));
    state.train.update(dt);
    state.elapsed += dt;
    state.time_ticks += 1;

    let physics = state.train.state();
    let curvature_safe = state.sampler().safe_speed_at(state.spline(), physics.distance);
    state.safe_speed = state.rules().compute_safe_speed(physics.distance, curvature_safe);

    let comfort_inputs = ComfortInputs {
        speed: physics.speed,
        safe_speed: state.safe_speed,
        accel: physics.accel,
        jerk: physics.jerk,
        elapsed: state.elapsed,
        expected_duration: state.expected_duration(),
    };
    let comfort = state.comfort.update(&comfort_inputs, dt);

    let transition = state.rules().check_transition(
        physics.distance,
        physics.speed,
        comfort,
        state.status,
    )?;
    state.status = transition.status;
    match transition.status {
        GameStatus::Won => log::info!(
            "Level {}: stopped at {:.1} m after {:.2} s, comfort {:.1}",
            state.level,
            physics.distance,
            state.elapsed,
            comfort
        ),
        GameStatus::Failed(reason) => log::info!(
            "Level {}: failed ({:?}) at {:.1} m after {:.2} s",
            state.level,
            reason,
            physics.distance,
            state.elapsed
        ),
        _ => {}
    }
    Some(transition)
}

/// One-line status for the HUD
pub fn status_message(state: &DriveState) -> String {
    let layout = state.layout();
    let physics = state.physics();
    match state.status {
        GameStatus::Ready => "Ready: release the brake and depart".to_string(),
        GameStatus::Running => {
            if layout.in_station(physics.distance) {
                format!(
                    "In the platform: stop within {:.0} m",
                    layout.station_end_distance - physics.distance
                )
            } else if physics.distance < layout.station_start_distance {
                format!("Station in {:.0} m", layout.station_start_distance - physics.distance)
            } else {
                format!(
                    "Overran the platform: {:.0} m to the bumper",
                    layout.remaining_to_bumper(physics.distance)
                )
            }
        }
        GameStatus::Won => format!(
            "Arrived in {:.1} s with {:.0}% comfort",
            state.elapsed,
            state.comfort.fraction() * 100.0
        ),
        GameStatus::Failed(FailureReason::Bumper) => "Failed: hit the bumper".to_string(),
        GameStatus::Failed(FailureReason::Comfort) => {
            "Failed: passengers are too uncomfortable".to_string()
        }
    }
}
