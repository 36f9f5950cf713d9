//! Read-only per-frame view of the session for the renderer
//!
//! Building a snapshot never mutates the state. Everything a renderer needs
//! to paint one frame is copied out here, already reduced to draw-ready
//! numbers (radii, opacities, angles).

use glam::Vec2;
use serde::Serialize;

use super::state::{GamePhase, GameState, Viewport};
use crate::settings::Settings;

#[derive(Debug, Clone, Serialize)]
pub struct MissileView {
    pub pos: Vec2,
    pub active: bool,
    /// Heading angle in radians
    pub heading: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActorView {
    pub pos: Vec2,
    pub size: Vec2,
    pub alive: bool,
    pub anim_clock: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplosionView {
    pub center: Vec2,
    pub radius: f32,
    /// Life fraction in [0, 1]
    pub age: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub size: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebrisView {
    pub pos: Vec2,
    pub size: Vec2,
    pub rotation: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopupView {
    pub pos: Vec2,
    pub text: String,
    pub opacity: f32,
}

/// Everything the renderer draws for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub time: f64,
    pub phase: GamePhase,
    pub viewport: Viewport,
    /// Show the "click to launch" prompt
    pub call_to_action: bool,
    pub score: u32,
    pub score_pulse: f32,
    /// Screen shake amplitude in pixels (0 when disabled)
    pub shake: f32,
    pub missile: MissileView,
    pub runner: ActorView,
    pub flyer: ActorView,
    pub explosions: Vec<ExplosionView>,
    pub particles: Vec<ParticleView>,
    pub debris: Vec<DebrisView>,
    pub popups: Vec<PopupView>,
}

/// Consumer of per-frame snapshots
pub trait RenderSink {
    fn present(&mut self, snapshot: &Snapshot);
}

impl<F: FnMut(&Snapshot)> RenderSink for F {
    fn present(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

/// Build a snapshot of the current state
pub fn build_snapshot(state: &GameState, settings: &Settings) -> Snapshot {
    let now = state.time_secs();
    let shake = if settings.effective_screen_shake() {
        state.shake_amplitude()
    } else {
        0.0
    };

    Snapshot {
        time: now,
        phase: state.phase,
        viewport: state.viewport,
        call_to_action: state.phase == GamePhase::Intro,
        score: state.score,
        score_pulse: state.score_pulse,
        shake,
        missile: MissileView {
            pos: state.missile.pos,
            active: state.missile.active,
            heading: state.missile.angle(),
        },
        runner: actor_view(&state.runner),
        flyer: actor_view(&state.flyer),
        explosions: state
            .explosions
            .iter()
            .filter(|e| e.alive)
            .map(|e| ExplosionView {
                center: e.center,
                radius: e.radius,
                age: e.life_fraction(now),
            })
            .collect(),
        particles: state
            .particles
            .iter()
            .map(|p| ParticleView {
                pos: p.pos,
                size: p.size,
                opacity: p.opacity(),
            })
            .collect(),
        debris: state
            .debris
            .iter()
            .map(|d| DebrisView {
                pos: d.pos,
                size: d.size,
                rotation: d.rotation,
            })
            .collect(),
        popups: state
            .popups
            .iter()
            .map(|p| PopupView {
                pos: p.pos,
                text: p.text.clone(),
                opacity: p.opacity(),
            })
            .collect(),
    }
}

fn actor_view(actor: &super::state::Actor) -> ActorView {
    ActorView {
        pos: actor.pos,
        size: actor.size,
        alive: actor.alive,
        anim_clock: actor.anim_clock,
    }
}
