//! Fixed timestep simulation tick
//!
//! One call advances the session by exactly one `SIM_DT` step. The order is
//! fixed: queued activations, due timers, integration, collision tests,
//! stale-entity cleanup. Collision therefore always sees the radius an
//! explosion grew to during this same step.

use glam::Vec2;
use rand::Rng;

use super::collision::detect_hits;
use super::state::{Debris, ExplosionCause, GameEvent, GamePhase, GameState, Particle};
use super::timers::TimerAction;
use crate::consts::*;

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState) {
    if state.phase == GamePhase::Reload {
        return;
    }

    let dt = SIM_DT;
    state.time_ticks += 1;

    apply_activations(state);
    run_timers(state);
    if state.phase == GamePhase::Reload {
        return;
    }

    // Integration
    if state.missile.active {
        let pointer = state.pointer;
        state.missile.home_toward(pointer);
        emit_particles(state);
    }
    update_actors(state, dt);
    update_explosions(state);
    update_particles(state, dt);
    update_popups(state, dt);
    if state.phase == GamePhase::Crashing {
        update_debris(&mut state.debris, dt);
    }
    state.score_pulse = (state.score_pulse - SCORE_PULSE_DECAY * dt).max(0.0);

    if state.phase == GamePhase::Active {
        resolve_collisions(state);
    }

    cleanup(state);
}

/// Detonate everything clicked since the last tick
fn apply_activations(state: &mut GameState) {
    let pending = std::mem::take(&mut state.pending_activations);
    for pos in pending {
        if state.phase == GamePhase::Intro {
            state.phase = GamePhase::Active;
            state.missile.active = true;
            log::info!("Missile armed at t={:.2}s", state.time_secs());
            state.events.push(GameEvent::Armed);
        }
        state.spawn_explosion(pos, ExplosionCause::Activation);
    }
}

fn run_timers(state: &mut GameState) {
    for action in state.scheduler.take_due(state.time_ticks) {
        match action {
            TimerAction::SpawnActors => {
                if matches!(state.phase, GamePhase::Intro | GamePhase::Active) {
                    state.spawn_actors();
                }
            }
            TimerAction::SettleDetonation => {
                let armed = state.first_activation_seen
                    && matches!(state.phase, GamePhase::Intro | GamePhase::Active);
                if armed {
                    let at = state.pointer;
                    state.spawn_explosion(at, ExplosionCause::Settle);
                }
            }
            TimerAction::RespawnFlyer => state.respawn_flyer(),
            TimerAction::Reload => {
                state.phase = GamePhase::Reload;
                state.debris.clear();
                log::info!("Crash finished, reloading (final score {})", state.score);
                state.events.push(GameEvent::ReloadRequested);
                return;
            }
        }
    }
}

/// Exhaust sparks from the Missile tail, capped by the particle ceiling
fn emit_particles(state: &mut GameState) {
    let heading = state.missile.heading;
    let tail = state.missile.tail();
    let lateral = heading.perp();

    for _ in 0..PARTICLES_PER_STEP {
        if state.particles.len() >= state.max_particles {
            break;
        }
        let rng = state.rng();
        let side = rng.random_range(-1.0..=1.0_f32) * PARTICLE_LATERAL_SPEED;
        let max_age = rng.random_range(PARTICLE_MIN_AGE..=PARTICLE_MAX_AGE);
        let size = rng.random_range(1.5..3.5_f32);
        state.particles.push(Particle {
            pos: tail,
            vel: -heading * PARTICLE_BACK_SPEED + lateral * side,
            age: 0.0,
            max_age,
            size,
        });
    }
}

/// Runner patrol, Flyer pursuit/cruise, and wraparound
fn update_actors(state: &mut GameState, dt: f32) {
    let viewport = state.viewport;

    let runner = &mut state.runner;
    if runner.alive {
        runner.pos.x += RUNNER_SPEED * dt;
        runner.anim_clock += dt;
        runner.wrap(&viewport);
    }

    let flyer = &mut state.flyer;
    if flyer.alive {
        if state.runner.alive {
            let target = state.runner.pos + Vec2::new(FLYER_PURSUIT_OFFSET.0, FLYER_PURSUIT_OFFSET.1);
            flyer.pos = crate::ease_toward(flyer.pos, target, FLYER_PURSUIT_EASE);
        } else {
            flyer.pos.x += FLYER_CRUISE_SPEED * dt;
            flyer.wrap(&viewport);
        }
        flyer.anim_clock += dt;
    }
}

fn update_explosions(state: &mut GameState) {
    let now = state.time_secs();
    for explosion in state.explosions.iter_mut().filter(|e| e.alive) {
        explosion.radius = explosion.radius_at(now);
    }
}

fn update_particles(state: &mut GameState, dt: f32) {
    for particle in &mut state.particles {
        particle.pos += particle.vel * dt;
        particle.pos.y -= PARTICLE_DRIFT * dt;
        particle.age += dt;
    }
}

fn update_popups(state: &mut GameState, dt: f32) {
    for popup in &mut state.popups {
        popup.pos.y -= POPUP_RISE_SPEED * dt;
        popup.age += dt;
    }
}

/// Toppling buildings: gravity on the way down, constant spin
fn update_debris(debris: &mut [Debris], dt: f32) {
    for piece in debris {
        piece.vel.y += DEBRIS_GRAVITY * dt;
        piece.pos += piece.vel * dt;
        piece.rotation += piece.angular_vel * dt;
    }
}

fn resolve_collisions(state: &mut GameState) {
    let result = detect_hits(&mut state.explosions, &state.runner, &state.flyer);
    if result.flyer_hit {
        state.award_flyer_hit();
    }
    if result.runner_hit {
        state.begin_crash();
    }
}

/// Drop expired explosions, particles and popups
fn cleanup(state: &mut GameState) {
    let now = state.time_secs();
    for explosion in &mut state.explosions {
        if explosion.is_expired(now) {
            explosion.alive = false;
        }
    }
    state.explosions.retain(|e| e.alive);
    state.particles.retain(|p| p.age < p.max_age);
    state.popups.retain(|p| p.age < p.max_age);
}
