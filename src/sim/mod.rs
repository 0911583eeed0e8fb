//! Deterministic simulation module
//!
//! All driving logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded hash noise only (no RNG state)
//! - Stable iteration order along the track
//! - No rendering or platform dependencies

pub mod comfort;
pub mod generator;
pub mod noise;
pub mod par;
pub mod rules;
pub mod sampler;
pub mod segment;
pub mod spline;
pub mod state;
pub mod tick;
pub mod train;

pub use comfort::{ComfortInputs, ComfortModel};
pub use generator::{
    Avoidance, GeneratedPath, GenerationReport, count_self_intersections, generate,
    generate_with_report, walk,
};
pub use par::{
    MinimumTime, UnreachableReason, expected_duration, minimum_time_for_layout, minimum_time_ms,
};
pub use rules::{FailureReason, GameStatus, RuleEngine, TrackLayout, Transition};
pub use sampler::{CurvatureSample, MinimapPathPoint, TrackSampler};
pub use segment::{Segment2, point_segment_distance, segment_distance, segments_intersect};
pub use spline::TrackSpline;
pub use state::DriveState;
pub use tick::{TickInput, status_message, tick};
pub use train::{TrainControls, TrainPhysicsState, TrainSim};
