//! Explosion-versus-actor hit detection
//!
//! Blasts are circles whose reach is their current (grown) radius plus a
//! per-target allowance. Each explosion carries its own hit flags so it can
//! take the Flyer at most once and catch the Runner at most once, no matter
//! how many frames it keeps overlapping.

use glam::Vec2;

use super::state::{Actor, ActorKind, Explosion};
use crate::consts::{FLYER_HIT_RADIUS, RUNNER_HIT_RADIUS};

/// Outcome of one collision pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionResult {
    /// An explosion made first contact with the Flyer
    pub flyer_hit: bool,
    /// An explosion made first contact with the Runner
    pub runner_hit: bool,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.flyer_hit || self.runner_hit
    }
}

/// Whether `point` lies within `radius + reach` of `center`
#[inline]
pub fn within_reach(center: Vec2, radius: f32, point: Vec2, reach: f32) -> bool {
    center.distance_squared(point) <= (radius + reach) * (radius + reach)
}

/// Extra reach an explosion has against this kind of actor
pub fn hit_radius(kind: ActorKind) -> f32 {
    match kind {
        ActorKind::Runner => RUNNER_HIT_RADIUS,
        ActorKind::Flyer => FLYER_HIT_RADIUS,
    }
}

/// Whether an explosion currently reaches a live actor
pub fn explosion_reaches(explosion: &Explosion, actor: &Actor) -> bool {
    actor.alive
        && explosion.alive
        && within_reach(
            explosion.center,
            explosion.radius,
            actor.hit_center(),
            hit_radius(actor.kind),
        )
}

/// Test every live explosion against the Flyer and Runner, setting the
/// per-explosion flags on first contact.
///
/// Once a target is taken by one explosion it is out of play for the rest of
/// the pass, so a single frame never reports the same kill twice.
pub fn detect_hits(explosions: &mut [Explosion], runner: &Actor, flyer: &Actor) -> CollisionResult {
    let mut result = CollisionResult::miss();

    for explosion in explosions.iter_mut().filter(|e| e.alive) {
        if !result.flyer_hit && !explosion.hit_flyer && explosion_reaches(explosion, flyer) {
            explosion.hit_flyer = true;
            result.flyer_hit = true;
        }
        if !result.runner_hit && !explosion.hit_runner && explosion_reaches(explosion, runner) {
            explosion.hit_runner = true;
            result.runner_hit = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{ExplosionCause, Viewport};

    fn blast_at(x: f32, y: f32, radius: f32) -> Explosion {
        let mut e = Explosion::new(Vec2::new(x, y), radius, 1.0, 0.0, ExplosionCause::Activation);
        e.radius = radius;
        e
    }

    fn live_actors() -> (Actor, Actor) {
        let viewport = Viewport::new(800.0, 600.0);
        let mut runner = Actor::runner(&viewport);
        let mut flyer = Actor::flyer(&viewport);
        runner.respawn();
        flyer.respawn();
        runner.pos = Vec2::new(400.0, 576.0);
        flyer.pos = Vec2::new(200.0, 200.0);
        (runner, flyer)
    }

    #[test]
    fn test_within_reach_boundary() {
        assert!(within_reach(Vec2::ZERO, 10.0, Vec2::new(50.0, 0.0), 40.0));
        assert!(!within_reach(Vec2::ZERO, 10.0, Vec2::new(50.1, 0.0), 40.0));
    }

    #[test]
    fn test_flyer_hit_sets_flag_once() {
        let (runner, flyer) = live_actors();
        let mut explosions = vec![blast_at(230.0, 200.0, 10.0)];

        let first = detect_hits(&mut explosions, &runner, &flyer);
        assert!(first.flyer_hit);
        assert!(!first.runner_hit);
        assert!(explosions[0].hit_flyer);

        let second = detect_hits(&mut explosions, &runner, &flyer);
        assert!(!second.any());
    }

    #[test]
    fn test_runner_measured_from_mid_body() {
        let (runner, flyer) = live_actors();
        // Feet at y=576, mid-body at y=554; blast 40 above mid-body
        let mut explosions = vec![blast_at(400.0, 514.0, 12.0)];
        assert!(detect_hits(&mut explosions, &runner, &flyer).runner_hit);

        let mut too_far = vec![blast_at(400.0, 513.0, 11.0)];
        assert!(!detect_hits(&mut too_far, &runner, &flyer).runner_hit);
    }

    #[test]
    fn test_dead_actors_are_ignored() {
        let (mut runner, mut flyer) = live_actors();
        runner.alive = false;
        flyer.alive = false;
        let mut explosions = vec![blast_at(200.0, 200.0, 500.0)];
        assert_eq!(detect_hits(&mut explosions, &runner, &flyer), CollisionResult::miss());
        assert!(!explosions[0].hit_flyer);
        assert!(!explosions[0].hit_runner);
    }

    #[test]
    fn test_overlapping_blasts_report_single_kill() {
        let (runner, flyer) = live_actors();
        let mut explosions = vec![blast_at(200.0, 200.0, 30.0), blast_at(210.0, 200.0, 30.0)];
        let result = detect_hits(&mut explosions, &runner, &flyer);
        assert!(result.flyer_hit);
        assert!(explosions[0].hit_flyer);
        assert!(!explosions[1].hit_flyer);
    }
}
