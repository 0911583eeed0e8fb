//! Per-level drive session state
//!
//! Everything the live loop mutates lives here. Track geometry, layout and
//! par time are rebuilt only when the level changes.

use glam::DVec3;

use super::comfort::ComfortModel;
use super::generator::{GenerationReport, generate_with_report};
use super::par::{MinimumTime, expected_duration, minimum_time_for_layout};
use super::rules::{GameStatus, RuleEngine, TrackLayout};
use super::sampler::{CurvatureSample, MinimapPathPoint, TrackSampler};
use super::spline::TrackSpline;
use super::train::{TrainPhysicsState, TrainSim};
use crate::settings::SimConfig;

/// Complete state of one level run
#[derive(Debug, Clone)]
pub struct DriveState {
    /// Run seed for reproducibility
    pub seed: u32,
    /// Current level (1-based)
    pub level: u32,
    /// Current phase
    pub status: GameStatus,
    /// Seconds since departure
    pub elapsed: f64,
    /// Simulation tick counter (running ticks only)
    pub time_ticks: u64,
    /// Train dynamics
    pub train: TrainSim,
    /// Passenger comfort
    pub comfort: ComfortModel,
    /// Envelope speed computed on the last tick
    pub safe_speed: f64,

    base_config: SimConfig,
    config: SimConfig,
    spline: TrackSpline,
    sampler: TrackSampler,
    rules: RuleEngine,
    generation: GenerationReport,
    par: MinimumTime,
    expected_duration: Option<f64>,
}

impl DriveState {
    /// Build a level; `config` is the base configuration before level scaling
    pub fn new(seed: u32, level: u32, config: &SimConfig) -> Self {
        let resolved = config.for_level(level);
        let (path, generation) = generate_with_report(seed, level, &resolved.track);
        if generation.intersections > 0 {
            log::warn!(
                "Level {} (seed {}): {} self-intersections remain after {} attempts",
                level,
                seed,
                generation.intersections,
                generation.attempts_run
            );
        }

        let spline = TrackSpline::new(path, false);
        let layout = TrackLayout::from_track_length(spline.length(), &resolved.rules);
        let rules = RuleEngine::new(layout, &resolved.rules, &resolved.train);
        let par = minimum_time_for_layout(&layout, &resolved.train, &resolved.par);
        let expected = expected_duration(&par, &resolved.par);

        log::info!(
            "Level {}: track {:.0} m, station {:.0}-{:.0} m, bumper {:.0} m, par {:?}",
            level,
            spline.length(),
            layout.station_start_distance,
            layout.station_end_distance,
            layout.bumper_distance,
            par.ms()
        );

        Self {
            seed,
            level,
            status: GameStatus::Ready,
            elapsed: 0.0,
            time_ticks: 0,
            train: TrainSim::new(resolved.train.clone()),
            comfort: ComfortModel::new(resolved.comfort.clone()),
            safe_speed: resolved.sampler.max_safe_speed,
            base_config: config.clone(),
            sampler: TrackSampler::new(resolved.sampler.clone()),
            config: resolved,
            spline,
            rules,
            generation,
            par,
            expected_duration: expected,
        }
    }

    /// Switch to another level with the same seed and base config
    pub fn load_level(&mut self, level: u32) {
        *self = Self::new(self.seed, level, &self.base_config);
    }

    /// Back to the departure stem on the same track
    pub fn restart(&mut self) {
        self.train.reset();
        self.comfort.reset();
        self.status = GameStatus::Ready;
        self.elapsed = 0.0;
        self.time_ticks = 0;
        self.safe_speed = self.config.sampler.max_safe_speed;
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn spline(&self) -> &TrackSpline {
        &self.spline
    }

    pub fn sampler(&self) -> &TrackSampler {
        &self.sampler
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn layout(&self) -> &TrackLayout {
        self.rules.layout()
    }

    pub fn generation(&self) -> GenerationReport {
        self.generation
    }

    pub fn par(&self) -> MinimumTime {
        self.par
    }

    pub fn expected_duration(&self) -> Option<f64> {
        self.expected_duration
    }

    /// Seconds left until par (negative when behind schedule)
    pub fn eta_remaining(&self) -> Option<f64> {
        self.expected_duration.map(|expected| expected - self.elapsed)
    }

    pub fn physics(&self) -> TrainPhysicsState {
        self.train.state()
    }

    pub fn train_position(&self) -> DVec3 {
        self.spline.position_at_distance(self.train.state().distance)
    }

    pub fn train_tangent(&self) -> DVec3 {
        self.spline.tangent_at_distance(self.train.state().distance)
    }

    pub fn curvature_ahead(&self) -> Vec<CurvatureSample> {
        self.sampler.sample_ahead(&self.spline, self.train.state().distance)
    }

    pub fn minimap_ahead(&self) -> Vec<MinimapPathPoint> {
        self.sampler.sample_path_ahead(&self.spline, self.train.state().distance)
    }
}
