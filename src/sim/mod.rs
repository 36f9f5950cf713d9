//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Timers are polled records, never host callbacks
//! - No rendering or platform dependencies

pub mod collision;
pub mod input;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{CollisionResult, detect_hits, within_reach};
pub use input::{activate, pointer_moved};
pub use snapshot::{RenderSink, Snapshot, build_snapshot};
pub use state::{
    Actor, ActorKind, Debris, Explosion, ExplosionCause, GameEvent, GamePhase, GameState, Missile,
    Particle, ScorePopup, Viewport,
};
pub use tick::tick;
pub use timers::{ScheduledTask, Scheduler, TimerAction};
