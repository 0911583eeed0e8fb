//! Browser bindings
//!
//! The page owns the requestAnimationFrame loop and feeds wall-clock frame
//! deltas into `WebSession::frame`, which runs fixed 60 Hz ticks.

use wasm_bindgen::prelude::*;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::settings::SimConfig;
use crate::sim::{DriveState, FailureReason, GameStatus, TickInput, status_message, tick};

fn status_label(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Ready => "ready",
        GameStatus::Running => "running",
        GameStatus::Won => "won",
        GameStatus::Failed(FailureReason::Bumper) => "failed_bumper",
        GameStatus::Failed(FailureReason::Comfort) => "failed_comfort",
    }
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One drive session owned by the page
#[wasm_bindgen]
pub struct WebSession {
    state: DriveState,
    input: TickInput,
    accumulator: f64,
}

#[wasm_bindgen]
impl WebSession {
    /// Start a level; a missing seed is taken from the clock
    #[wasm_bindgen(constructor)]
    pub fn new(
        seed: Option<u32>,
        level: u32,
        config_json: Option<String>,
    ) -> Result<WebSession, JsValue> {
        crate::platform::init_logging();
        let config = match config_json {
            Some(json) => SimConfig::from_json(&json).map_err(js_error)?,
            None => SimConfig::default(),
        };
        let seed = seed.unwrap_or_else(|| js_sys::Date::now() as u64 as u32);
        log::info!("Station Stop session: seed {}, level {}", seed, level);
        Ok(Self {
            state: DriveState::new(seed, level, &config),
            input: TickInput::default(),
            accumulator: 0.0,
        })
    }

    pub fn set_controls(&mut self, throttle: f64, brake: f64) {
        self.input.throttle = throttle;
        self.input.brake = brake;
    }

    pub fn depart(&mut self) {
        self.input.depart = true;
    }

    pub fn restart(&mut self) {
        self.input.restart = true;
    }

    pub fn load_level(&mut self, level: u32) {
        self.state.load_level(level);
        self.accumulator = 0.0;
    }

    /// Run as many fixed ticks as the frame delta covers
    ///
    /// Returns the new status label when a tick changed it.
    pub fn frame(&mut self, dt_seconds: f64) -> Option<String> {
        if !dt_seconds.is_finite() || dt_seconds <= 0.0 {
            return None;
        }
        self.accumulator += dt_seconds.min(0.1);

        let mut changed = None;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            if let Some(transition) = tick(&mut self.state, &self.input, SIM_DT) {
                changed = Some(status_label(transition.status).to_string());
            }
            self.accumulator -= SIM_DT;
            substeps += 1;

            // One-shot inputs
            if self.input.restart {
                changed = Some(status_label(self.state.status).to_string());
            }
            self.input.depart = false;
            self.input.restart = false;
        }
        changed
    }

    pub fn seed(&self) -> u32 {
        self.state.seed
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn status(&self) -> String {
        status_label(self.state.status).to_string()
    }

    pub fn status_message(&self) -> String {
        status_message(&self.state)
    }

    pub fn distance(&self) -> f64 {
        self.state.physics().distance
    }

    pub fn speed(&self) -> f64 {
        self.state.physics().speed
    }

    pub fn accel(&self) -> f64 {
        self.state.physics().accel
    }

    pub fn jerk(&self) -> f64 {
        self.state.physics().jerk
    }

    pub fn safe_speed(&self) -> f64 {
        self.state.safe_speed
    }

    pub fn comfort(&self) -> f64 {
        self.state.comfort.value()
    }

    pub fn comfort_fraction(&self) -> f64 {
        self.state.comfort.fraction()
    }

    pub fn elapsed(&self) -> f64 {
        self.state.elapsed
    }

    pub fn eta_remaining(&self) -> Option<f64> {
        self.state.eta_remaining()
    }

    pub fn track_length(&self) -> f64 {
        self.state.spline().length()
    }

    pub fn station_start(&self) -> f64 {
        self.state.layout().station_start_distance
    }

    pub fn station_end(&self) -> f64 {
        self.state.layout().station_end_distance
    }

    pub fn bumper(&self) -> f64 {
        self.state.layout().bumper_distance
    }

    /// World position as [x, y, z]
    pub fn position(&self) -> Vec<f64> {
        self.state.train_position().to_array().to_vec()
    }

    /// Unit tangent as [x, y, z]
    pub fn tangent(&self) -> Vec<f64> {
        self.state.train_tangent().to_array().to_vec()
    }

    /// Track polyline flattened as [x0, y0, z0, x1, ...]
    pub fn track_points(&self) -> Vec<f64> {
        self.state
            .spline()
            .points()
            .iter()
            .flat_map(|p| p.to_array())
            .collect()
    }

    pub fn curvature_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.curvature_ahead()).map_err(js_error)
    }

    pub fn minimap_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.minimap_ahead()).map_err(js_error)
    }
}

/// Minimum completion time for a level with default config (None if unreachable)
#[wasm_bindgen]
pub fn par_time_ms(level: u32, seed: u32) -> Option<f64> {
    crate::sim::minimum_time_ms(level, seed, &SimConfig::default())
        .ms()
        .map(|ms| ms as f64)
}
