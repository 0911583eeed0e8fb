//! Longitudinal train dynamics
//!
//! One scalar degree of freedom: distance along the track. Controls are
//! clamped rather than rejected and a bad `dt` is ignored, so `update` is
//! total and can run every tick without checks at the call site.

use serde::{Deserialize, Serialize};

use crate::settings::TrainConfig;

/// Driver controls, both in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainControls {
    pub throttle: f64,
    pub brake: f64,
}

impl TrainControls {
    pub fn new(throttle: f64, brake: f64) -> Self {
        Self { throttle, brake }.clamped()
    }

    /// Controls with both axes forced into [0, 1] (NaN becomes 0)
    pub fn clamped(self) -> Self {
        Self {
            throttle: clamp_unit(self.throttle),
            brake: clamp_unit(self.brake),
        }
    }
}

#[inline]
fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Kinematic state after the last update
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainPhysicsState {
    /// Distance along the track (m)
    pub distance: f64,
    /// Speed (m/s), within [0, max_speed]
    pub speed: f64,
    /// Effective acceleration over the last tick (m/s²)
    pub accel: f64,
    /// Rate of change of acceleration (m/s³)
    pub jerk: f64,
}

/// Train integrator
#[derive(Debug, Clone)]
pub struct TrainSim {
    config: TrainConfig,
    controls: TrainControls,
    state: TrainPhysicsState,
}

impl TrainSim {
    pub fn new(config: TrainConfig) -> Self {
        Self {
            config,
            controls: TrainControls::default(),
            state: TrainPhysicsState::default(),
        }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn set_controls(&mut self, controls: TrainControls) {
        self.controls = controls.clamped();
    }

    pub fn controls(&self) -> TrainControls {
        self.controls
    }

    /// State captured by the last `update` (jerk already uses that tick's dt)
    pub fn state(&self) -> TrainPhysicsState {
        self.state
    }

    /// Resistive force at a speed (N)
    pub fn drag(&self, speed: f64) -> f64 {
        self.config.drag_linear * speed + self.config.drag_quadratic * speed * speed
    }

    /// Advance one tick; non-positive or non-finite dt is a no-op
    pub fn update(&mut self, dt: f64) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        let c = &self.config;
        let prev = self.state;

        let force = self.controls.throttle * c.max_throttle_force
            - self.controls.brake * c.max_brake_force
            - self.drag(prev.speed);
        let raw_accel = if c.mass > 0.0 { force / c.mass } else { 0.0 };

        let max_speed = c.max_speed.max(0.0);
        let speed = (prev.speed + raw_accel * dt).clamp(0.0, max_speed);
        // Clamping at rest or top speed means the train did not actually accelerate
        let accel = (speed - prev.speed) / dt;

        self.state = TrainPhysicsState {
            distance: prev.distance + speed * dt,
            speed,
            accel,
            jerk: (accel - prev.accel) / dt,
        };
    }

    /// Zero all state and controls
    pub fn reset(&mut self) {
        self.controls = TrainControls::default();
        self.state = TrainPhysicsState::default();
    }
}
