//! Passenger comfort meter
//!
//! Starts full and only drains: over-speeding against the safe-speed envelope,
//! harsh jerk, hard braking and running behind schedule all cost comfort.
//! Hitting zero is a terminal signal consumed by the rules.

use serde::{Deserialize, Serialize};

use crate::settings::ComfortConfig;

/// Per-tick inputs to the comfort model
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComfortInputs {
    /// Current speed (m/s)
    pub speed: f64,
    /// Envelope speed at the train position (m/s)
    pub safe_speed: f64,
    /// Acceleration (m/s²)
    pub accel: f64,
    /// Jerk (m/s³)
    pub jerk: f64,
    /// Time since departure (s)
    pub elapsed: f64,
    /// Par duration for schedule pressure (s); None disables the term
    pub expected_duration: Option<f64>,
}

/// Depleting comfort value in [0, max]
#[derive(Debug, Clone)]
pub struct ComfortModel {
    config: ComfortConfig,
    value: f64,
}

impl ComfortModel {
    pub fn new(config: ComfortConfig) -> Self {
        let value = config.max.max(0.0);
        Self { config, value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn max(&self) -> f64 {
        self.config.max.max(0.0)
    }

    /// Comfort as a fraction of the full meter
    pub fn fraction(&self) -> f64 {
        let max = self.max();
        if max > 0.0 { self.value / max } else { 0.0 }
    }

    pub fn is_depleted(&self) -> bool {
        self.value <= 0.0
    }

    /// Penalty rate (per second) for the given inputs
    pub fn penalty_rate(&self, inputs: &ComfortInputs) -> f64 {
        let c = &self.config;
        let mut rate = 0.0;

        let excess = positive(inputs.speed - inputs.safe_speed);
        if excess > 0.0 {
            let knee = c.overspeed_knee.max(f64::EPSILON);
            rate += c.overspeed_weight * excess * (1.0 + excess / knee);
        }

        rate += c.jerk_weight * positive(inputs.jerk.abs() - c.jerk_threshold);
        rate += c.decel_weight * positive(-inputs.accel - c.decel_threshold);

        if let Some(expected) = inputs.expected_duration {
            if inputs.elapsed > expected {
                rate += c.schedule_weight;
            }
        }

        positive(rate)
    }

    /// Drain comfort for one tick and return the new value
    pub fn update(&mut self, inputs: &ComfortInputs, dt: f64) -> f64 {
        if dt <= 0.0 || !dt.is_finite() {
            return self.value;
        }
        let penalty = self.penalty_rate(inputs) * dt;
        self.value = (self.value - penalty).clamp(0.0, self.max());
        self.value
    }

    /// Refill the meter; returns the full value
    pub fn reset(&mut self) -> f64 {
        self.value = self.max();
        self.value
    }
}

/// max(v, 0), with NaN mapped to 0
#[inline]
fn positive(v: f64) -> f64 {
    if v > 0.0 { v } else { 0.0 }
}
