//! Station Stop - train-driving simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track generation, geometry, train physics, rules)
//! - `settings`: Data-driven configuration for every sim component
//! - `audit`: Leaderboard purge against theoretical minimum times
//! - `platform`: Browser/native platform glue (logging, wasm bindings)

pub mod audit;
pub mod platform;
pub mod settings;
pub mod sim;

pub use audit::{ParTable, Verdict};
pub use settings::SimConfig;

use glam::{DVec2, DVec3};

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the browser game loop)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Unit ground-plane direction for a heading (0 = +z, positive turns toward +x)
#[inline]
pub fn heading_to_dir(heading: f64) -> DVec2 {
    DVec2::new(heading.sin(), heading.cos())
}

/// Project a world point onto the ground plane as (x, z)
#[inline]
pub fn ground(p: DVec3) -> DVec2 {
    DVec2::new(p.x, p.z)
}

/// Lift a ground-plane (x, z) point back to world space at y = 0
#[inline]
pub fn lift(p: DVec2) -> DVec3 {
    DVec3::new(p.x, 0.0, p.y)
}
