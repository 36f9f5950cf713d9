//! Skyburst - A homing-missile skyline arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, game phases)
//! - `platform`: Frame clock shared by the native and browser hosts
//! - `session`: Host lifecycle (start/stop/restart) around the simulation
//! - `settings`: Presentation preferences

pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use session::Session;
pub use settings::{QualityPreset, Settings};
pub use sim::{GamePhase, GameState, Viewport};

use glam::Vec2;

/// Game configuration constants
///
/// Distances are surface pixels, speeds are pixels/second and durations are
/// seconds unless noted otherwise.
pub mod consts {
    /// Fixed simulation rate (matches the reference display cadence)
    pub const STEP_HZ: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / STEP_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 6;
    /// Longest frame delta accepted from the host (tab backgrounding etc.)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Missile
    pub const HOMING_FACTOR: f32 = 0.15; // per step
    pub const MISSILE_TAIL_OFFSET: f32 = 18.0;
    pub const PARTICLES_PER_STEP: usize = 2;
    pub const PARTICLE_MIN_AGE: f32 = 0.6;
    pub const PARTICLE_MAX_AGE: f32 = 1.0;
    pub const PARTICLE_BACK_SPEED: f32 = 40.0;
    pub const PARTICLE_LATERAL_SPEED: f32 = 30.0;
    /// Upward drift applied on top of particle velocity
    pub const PARTICLE_DRIFT: f32 = 12.0;

    /// Runner / Flyer patrol
    pub const ACTOR_SPAWN_DELAY: f64 = 30.0;
    pub const RUNNER_SPEED: f32 = 120.0;
    pub const RUNNER_SPAWN_X: f32 = -40.0;
    pub const RUNNER_SIZE: (f32, f32) = (28.0, 44.0);
    /// Ground line sits this far above the bottom edge
    pub const GROUND_OFFSET: f32 = 24.0;
    /// Actors wrap once they are this far past the right edge
    pub const WRAP_MARGIN: f32 = 40.0;
    pub const FLYER_SPAWN_X: f32 = -160.0;
    pub const FLYER_SIZE: (f32, f32) = (72.0, 28.0);
    pub const FLYER_PURSUIT_EASE: f32 = 0.03; // per step
    /// Pursuit target relative to the Runner (behind and above)
    pub const FLYER_PURSUIT_OFFSET: (f32, f32) = (-160.0, -180.0);
    pub const FLYER_CRUISE_SPEED: f32 = 80.0;
    pub const FLYER_RESPAWN_DELAY: f64 = 1.2;

    /// Hit test reach added to the explosion radius
    pub const FLYER_HIT_RADIUS: f32 = 40.0;
    pub const RUNNER_HIT_RADIUS: f32 = 28.0;

    /// Explosions
    pub const EXPLOSION_MAX_RADIUS: f32 = 90.0;
    pub const EXPLOSION_LIFETIME: f32 = 0.65;
    pub const SECONDARY_MAX_RADIUS: f32 = 70.0;
    pub const SECONDARY_LIFETIME: f32 = 0.5;
    /// Fraction of max radius an explosion is born with
    pub const EXPLOSION_START_FRACTION: f32 = 0.2;
    pub const SETTLE_DELAY: f64 = 0.24;

    /// Scoring feedback
    pub const SCORE_PULSE_DECAY: f32 = 2.0; // per second
    pub const POPUP_MAX_AGE: f32 = 0.9;
    pub const POPUP_RISE_SPEED: f32 = 40.0;
    pub const POPUP_OFFSET_Y: f32 = 40.0;

    /// Crash sequence
    pub const CRASH_DURATION: f64 = 2.2;
    pub const RELOAD_GRACE: f64 = 0.3;
    pub const SHAKE_AMPLITUDE: f32 = 10.0;
    /// One building per this many pixels of viewport width
    pub const DEBRIS_SPACING: f32 = 80.0;
    pub const DEBRIS_GRAVITY: f32 = 900.0;
}

/// Convert a duration in seconds to whole simulation ticks (never early)
#[inline]
pub fn secs_to_ticks(secs: f64) -> u64 {
    (secs * consts::STEP_HZ as f64 - 1e-6).ceil().max(0.0) as u64
}

/// Convert a tick count to seconds
#[inline]
pub fn ticks_to_secs(ticks: u64) -> f64 {
    ticks as f64 / consts::STEP_HZ as f64
}

/// Move `current` a fraction of the way toward `target`
#[inline]
pub fn ease_toward(current: Vec2, target: Vec2, factor: f32) -> Vec2 {
    current + (target - current) * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_to_ticks_never_early() {
        assert_eq!(secs_to_ticks(0.0), 0);
        assert_eq!(secs_to_ticks(1.2), 72);
        assert_eq!(secs_to_ticks(0.24), 15);
        assert_eq!(secs_to_ticks(30.0), 1800);
        assert!(ticks_to_secs(secs_to_ticks(0.24)) >= 0.24);
    }

    #[test]
    fn test_ease_toward() {
        let p = ease_toward(Vec2::ZERO, Vec2::new(100.0, -20.0), 0.15);
        assert!((p.x - 15.0).abs() < 1e-5);
        assert!((p.y + 3.0).abs() < 1e-5);
    }
}
