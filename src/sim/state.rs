//! Game state and core simulation types
//!
//! Everything a session owns lives in `GameState`; the tick borrows it
//! mutably for one step at a time.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::timers::{Scheduler, TimerAction};
use crate::consts::*;
use crate::{secs_to_ticks, ticks_to_secs};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first activation (call-to-action shown)
    Intro,
    /// Normal play
    Active,
    /// Runner was caught: buildings topple, screen shakes
    Crashing,
    /// Terminal: the host restarts the session
    Reload,
}

/// Size of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// Y coordinate the Runner's feet rest on
    pub fn ground_y(&self) -> f32 {
        self.height - GROUND_OFFSET
    }

    /// X past which patrolling actors wrap back to their spawn
    pub fn wrap_x(&self) -> f32 {
        self.width + WRAP_MARGIN
    }

    /// Where the Missile waits before it is armed
    pub fn launch_point(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.ground_y())
    }
}

/// The player's homing projectile
#[derive(Debug, Clone)]
pub struct Missile {
    pub pos: Vec2,
    /// Last per-step displacement (not integrated)
    pub vel: Vec2,
    /// Unit heading, kept from the last non-zero displacement
    pub heading: Vec2,
    pub homing_factor: f32,
    pub active: bool,
}

impl Missile {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            heading: Vec2::NEG_Y,
            homing_factor: HOMING_FACTOR,
            active: false,
        }
    }

    /// Ease toward the pointer and derive velocity/heading from the move
    pub fn home_toward(&mut self, target: Vec2) {
        let prev = self.pos;
        self.pos = crate::ease_toward(self.pos, target, self.homing_factor);
        self.vel = self.pos - prev;
        if let Some(dir) = self.vel.try_normalize() {
            self.heading = dir;
        }
    }

    /// Point behind the nose where exhaust particles appear
    pub fn tail(&self) -> Vec2 {
        self.pos - self.heading * MISSILE_TAIL_OFFSET
    }

    /// Heading as an angle in radians (0 = +x, y down)
    pub fn angle(&self) -> f32 {
        self.heading.y.atan2(self.heading.x)
    }
}

/// Which patrolling actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    Runner,
    Flyer,
}

/// Runner or Flyer
#[derive(Debug, Clone)]
pub struct Actor {
    pub kind: ActorKind,
    /// Runner: feet (bottom center). Flyer: body center.
    pub pos: Vec2,
    pub size: Vec2,
    pub alive: bool,
    /// Seconds the actor has been alive, drives sprite animation
    pub anim_clock: f32,
    pub spawn: Vec2,
}

impl Actor {
    pub fn runner(viewport: &Viewport) -> Self {
        let spawn = Vec2::new(RUNNER_SPAWN_X, viewport.ground_y());
        Self {
            kind: ActorKind::Runner,
            pos: spawn,
            size: Vec2::new(RUNNER_SIZE.0, RUNNER_SIZE.1),
            alive: false,
            anim_clock: 0.0,
            spawn,
        }
    }

    pub fn flyer(viewport: &Viewport) -> Self {
        let spawn = Vec2::new(FLYER_SPAWN_X, viewport.ground_y() + FLYER_PURSUIT_OFFSET.1);
        Self {
            kind: ActorKind::Flyer,
            pos: spawn,
            size: Vec2::new(FLYER_SIZE.0, FLYER_SIZE.1),
            alive: false,
            anim_clock: 0.0,
            spawn,
        }
    }

    /// Bring the actor (back) to life at its spawn point
    pub fn respawn(&mut self) {
        self.pos = self.spawn;
        self.alive = true;
        self.anim_clock = 0.0;
    }

    /// Point explosions are measured against
    pub fn hit_center(&self) -> Vec2 {
        match self.kind {
            ActorKind::Runner => self.pos - Vec2::new(0.0, self.size.y * 0.5),
            ActorKind::Flyer => self.pos,
        }
    }

    /// Send the actor back to the left once it leaves on the right
    pub fn wrap(&mut self, viewport: &Viewport) {
        if self.pos.x > viewport.wrap_x() {
            self.pos.x = self.spawn.x;
        }
    }
}

/// What created an explosion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionCause {
    Activation,
    Settle,
    /// Flyer going down
    Secondary,
}

/// A growing blast
#[derive(Debug, Clone)]
pub struct Explosion {
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    /// Session time in seconds
    pub created_at: f64,
    pub lifetime: f32,
    pub alive: bool,
    pub cause: ExplosionCause,
    /// Already caught the Runner (never reset)
    pub hit_runner: bool,
    /// Already scored on the Flyer (never reset)
    pub hit_flyer: bool,
}

impl Explosion {
    pub fn new(center: Vec2, max_radius: f32, lifetime: f32, created_at: f64, cause: ExplosionCause) -> Self {
        Self {
            center,
            radius: max_radius * EXPLOSION_START_FRACTION,
            max_radius,
            created_at,
            lifetime,
            alive: true,
            cause,
            hit_runner: false,
            hit_flyer: false,
        }
    }

    /// Life fraction in [0, 1]
    pub fn life_fraction(&self, now: f64) -> f32 {
        if self.lifetime <= 0.0 {
            return 1.0;
        }
        (self.elapsed(now) / self.lifetime).clamp(0.0, 1.0)
    }

    pub fn elapsed(&self, now: f64) -> f32 {
        (now - self.created_at).max(0.0) as f32
    }

    /// Radius at session time `now`
    pub fn radius_at(&self, now: f64) -> f32 {
        let t = self.life_fraction(now);
        self.max_radius * (EXPLOSION_START_FRACTION + (1.0 - EXPLOSION_START_FRACTION) * t)
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.elapsed(now) >= self.lifetime
    }
}

/// Exhaust spark trailing the Missile
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: f32,
    pub max_age: f32,
    pub size: f32,
}

impl Particle {
    /// 1 when fresh, 0 when fully aged
    pub fn opacity(&self) -> f32 {
        (1.0 - self.age / self.max_age).clamp(0.0, 1.0)
    }
}

/// A toppling building during the crash sequence
#[derive(Debug, Clone)]
pub struct Debris {
    /// Base point (bottom center)
    pub pos: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub angular_vel: f32,
    pub vel: Vec2,
}

/// Floating "+1"
#[derive(Debug, Clone)]
pub struct ScorePopup {
    pub pos: Vec2,
    pub text: String,
    pub age: f32,
    pub max_age: f32,
}

impl ScorePopup {
    pub fn opacity(&self) -> f32 {
        (1.0 - self.age / self.max_age).clamp(0.0, 1.0)
    }
}

/// Things that happened during a tick, drained by the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Armed,
    ActorsSpawned,
    ExplosionSpawned { x: f32, y: f32, cause: ExplosionCause },
    FlyerDestroyed { score: u32 },
    FlyerRespawned,
    RunnerCaught,
    CrashStarted { debris: usize },
    ReloadRequested,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub viewport: Viewport,
    /// Simulation tick counter (session start = 0)
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub score: u32,
    /// Flash on scoring, decays to 0
    pub score_pulse: f32,
    /// Last known pointer position
    pub pointer: Vec2,
    pub first_activation_seen: bool,
    /// Activations received since the last tick
    pub pending_activations: Vec<Vec2>,
    pub missile: Missile,
    pub runner: Actor,
    pub flyer: Actor,
    pub explosions: Vec<Explosion>,
    pub particles: Vec<Particle>,
    pub debris: Vec<Debris>,
    pub popups: Vec<ScorePopup>,
    pub scheduler: Scheduler,
    /// Tick the crash sequence started at
    pub crash_started_at: Option<u64>,
    /// One-shot guard for the reload timer
    pub reload_scheduled: bool,
    /// Soft ceiling on live particles
    pub max_particles: usize,
    /// Emitted by `tick` and kept until drained. Whoever drives `tick`
    /// must call `drain_events`; the session does so after every step.
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh session at time zero, in Intro
    pub fn new(viewport: Viewport, seed: u64) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            viewport,
            time_ticks: 0,
            phase: GamePhase::Intro,
            score: 0,
            score_pulse: 0.0,
            pointer: viewport.launch_point(),
            first_activation_seen: false,
            pending_activations: Vec::new(),
            missile: Missile::new(viewport.launch_point()),
            runner: Actor::runner(&viewport),
            flyer: Actor::flyer(&viewport),
            explosions: Vec::new(),
            particles: Vec::new(),
            debris: Vec::new(),
            popups: Vec::new(),
            scheduler: Scheduler::new(),
            crash_started_at: None,
            reload_scheduled: false,
            max_particles: usize::MAX,
            events: Vec::new(),
        };

        // Runner and Flyer enter on a wall-clock gate, independent of input
        state
            .scheduler
            .schedule(secs_to_ticks(ACTOR_SPAWN_DELAY), TimerAction::SpawnActors);

        state
    }

    /// Session time in seconds
    pub fn time_secs(&self) -> f64 {
        ticks_to_secs(self.time_ticks)
    }

    /// Tick that is `secs` from now
    pub fn ticks_from_now(&self, secs: f64) -> u64 {
        self.time_ticks + secs_to_ticks(secs)
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Adopt a new surface size; ground-bound things follow the ground line
    pub fn resize(&mut self, viewport: Viewport) {
        let dy = viewport.ground_y() - self.viewport.ground_y();
        self.viewport = viewport;
        self.runner.spawn.y += dy;
        self.runner.pos.y += dy;
        self.flyer.spawn.y += dy;
        if !self.missile.active {
            self.missile.pos = viewport.launch_point();
        }
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Add an explosion at `center`
    pub fn spawn_explosion(&mut self, center: Vec2, cause: ExplosionCause) {
        let (max_radius, lifetime) = match cause {
            ExplosionCause::Secondary => (SECONDARY_MAX_RADIUS, SECONDARY_LIFETIME),
            _ => (EXPLOSION_MAX_RADIUS, EXPLOSION_LIFETIME),
        };
        let now = self.time_secs();
        self.explosions
            .push(Explosion::new(center, max_radius, lifetime, now, cause));
        self.events.push(GameEvent::ExplosionSpawned {
            x: center.x,
            y: center.y,
            cause,
        });
        log::debug!("{:?} explosion at ({:.0}, {:.0})", cause, center.x, center.y);
    }

    /// Runner and Flyer enter if they are not already on screen
    pub fn spawn_actors(&mut self) {
        let mut spawned = false;
        if !self.runner.alive {
            self.runner.respawn();
            spawned = true;
        }
        if !self.flyer.alive && !self.scheduler.is_pending(TimerAction::RespawnFlyer) {
            self.flyer.respawn();
            spawned = true;
        }
        if spawned {
            log::info!("Runner and flyer entering at t={:.1}s", self.time_secs());
            self.events.push(GameEvent::ActorsSpawned);
        }
    }

    /// Shot-down Flyer comes back, unless the session has moved past Active
    pub fn respawn_flyer(&mut self) {
        if self.phase != GamePhase::Active || self.flyer.alive {
            return;
        }
        self.flyer.respawn();
        self.events.push(GameEvent::FlyerRespawned);
        log::debug!("Flyer respawned at t={:.2}s", self.time_secs());
    }

    /// Score a Flyer kill: popup, pulse, secondary blast and respawn timer
    pub fn award_flyer_hit(&mut self) {
        let at = self.flyer.pos;
        self.flyer.alive = false;
        self.score += 1;
        self.score_pulse = 1.0;
        self.popups.push(ScorePopup {
            pos: at - Vec2::new(0.0, POPUP_OFFSET_Y),
            text: "+1".to_string(),
            age: 0.0,
            max_age: POPUP_MAX_AGE,
        });
        self.spawn_explosion(at, ExplosionCause::Secondary);
        let respawn_at = self.ticks_from_now(FLYER_RESPAWN_DELAY);
        self.scheduler.schedule(respawn_at, TimerAction::RespawnFlyer);

        log::info!("Flyer down! Score: {}", self.score);
        self.events.push(GameEvent::FlyerDestroyed { score: self.score });
    }

    /// Runner caught: topple the skyline and schedule the one reload
    pub fn begin_crash(&mut self) {
        self.runner.alive = false;
        if self.reload_scheduled {
            return;
        }
        self.reload_scheduled = true;
        self.events.push(GameEvent::RunnerCaught);
        self.phase = GamePhase::Crashing;
        self.crash_started_at = Some(self.time_ticks);
        self.scheduler.cancel(TimerAction::SettleDetonation);
        self.scheduler.cancel(TimerAction::RespawnFlyer);
        let reload_at = self.ticks_from_now(CRASH_DURATION + RELOAD_GRACE);
        self.scheduler.schedule(reload_at, TimerAction::Reload);

        self.spawn_debris();
        log::info!(
            "Runner caught at t={:.2}s, crashing ({} buildings)",
            self.time_secs(),
            self.debris.len()
        );
        self.events.push(GameEvent::CrashStarted {
            debris: self.debris.len(),
        });
    }

    /// Full-width row of buildings with random toppling motion
    fn spawn_debris(&mut self) {
        let count = (self.viewport.width / DEBRIS_SPACING).ceil().max(1.0) as usize;
        let slot = self.viewport.width / count as f32;
        let ground = self.viewport.ground_y();
        self.debris.clear();
        for i in 0..count {
            let rng = &mut self.rng;
            let width = rng.random_range(slot * 0.5..slot * 0.9);
            let height = rng.random_range(80.0..220.0_f32);
            let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let angular_vel = direction * rng.random_range(0.4..1.4_f32);
            let vel = Vec2::new(direction * rng.random_range(10.0..60.0_f32), -rng.random_range(40.0..160.0_f32));
            self.debris.push(Debris {
                pos: Vec2::new(slot * (i as f32 + 0.5), ground),
                size: Vec2::new(width, height),
                rotation: 0.0,
                angular_vel,
                vel,
            });
        }
    }

    /// Crash progress in [0, 1], None outside the crash sequence
    pub fn crash_progress(&self) -> Option<f32> {
        let started = self.crash_started_at?;
        let elapsed = ticks_to_secs(self.time_ticks.saturating_sub(started));
        Some((elapsed / CRASH_DURATION).clamp(0.0, 1.0) as f32)
    }

    /// Screen shake amplitude in pixels
    pub fn shake_amplitude(&self) -> f32 {
        match (self.phase, self.crash_progress()) {
            (GamePhase::Crashing, Some(t)) => (1.0 - t) * SHAKE_AMPLITUDE,
            _ => 0.0,
        }
    }

    /// Teardown: no timer may fire after this
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
        self.pending_activations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut state = GameState::new(viewport(), 7);
        state.spawn_explosion(Vec2::new(1.0, 2.0), ExplosionCause::Activation);
        let drained = state.drain_events();
        assert_eq!(
            drained,
            vec![GameEvent::ExplosionSpawned {
                x: 1.0,
                y: 2.0,
                cause: ExplosionCause::Activation,
            }]
        );
        assert!(state.events.is_empty());
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_new_session_is_intro_with_dormant_actors() {
        let state = GameState::new(viewport(), 7);
        assert_eq!(state.phase, GamePhase::Intro);
        assert!(!state.missile.active);
        assert!(!state.runner.alive);
        assert!(!state.flyer.alive);
        assert_eq!(
            state.scheduler.fire_at(TimerAction::SpawnActors),
            Some(secs_to_ticks(ACTOR_SPAWN_DELAY))
        );
    }

    #[test]
    fn test_explosion_radius_grows_then_caps() {
        let e = Explosion::new(Vec2::ZERO, 100.0, 0.5, 1.0, ExplosionCause::Activation);
        assert!((e.radius_at(1.0) - 20.0).abs() < 1e-4);
        assert!((e.radius_at(1.25) - 60.0).abs() < 1e-3);
        assert!((e.radius_at(1.5) - 100.0).abs() < 1e-4);
        assert!((e.radius_at(9.0) - 100.0).abs() < 1e-4);
        assert!(!e.is_expired(1.49));
        assert!(e.is_expired(1.5));
    }

    #[test]
    fn test_missile_keeps_heading_when_at_pointer() {
        let mut m = Missile::new(Vec2::new(10.0, 10.0));
        m.home_toward(Vec2::new(110.0, 10.0));
        assert_eq!(m.heading, Vec2::X);

        let here = m.pos;
        m.home_toward(here);
        assert_eq!(m.vel, Vec2::ZERO);
        assert_eq!(m.heading, Vec2::X);
    }

    #[test]
    fn test_runner_hit_center_is_mid_body() {
        let mut runner = Actor::runner(&viewport());
        runner.respawn();
        let c = runner.hit_center();
        assert_eq!(c.x, runner.pos.x);
        assert_eq!(c.y, runner.pos.y - RUNNER_SIZE.1 * 0.5);
    }

    #[test]
    fn test_award_flyer_hit() {
        let mut state = GameState::new(viewport(), 1);
        state.phase = GamePhase::Active;
        state.flyer.respawn();
        state.flyer.pos = Vec2::new(300.0, 200.0);

        state.award_flyer_hit();

        assert_eq!(state.score, 1);
        assert_eq!(state.score_pulse, 1.0);
        assert!(!state.flyer.alive);
        assert_eq!(state.popups.len(), 1);
        assert_eq!(state.popups[0].text, "+1");
        assert!(state.popups[0].pos.y < 200.0);
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(state.explosions[0].center, Vec2::new(300.0, 200.0));
        assert_eq!(state.explosions[0].cause, ExplosionCause::Secondary);
        assert!(state.scheduler.is_pending(TimerAction::RespawnFlyer));
    }

    #[test]
    fn test_begin_crash_is_one_shot() {
        let mut state = GameState::new(viewport(), 1);
        state.phase = GamePhase::Active;
        state.runner.respawn();

        state.begin_crash();
        state.begin_crash();

        assert_eq!(state.phase, GamePhase::Crashing);
        assert_eq!(state.scheduler.pending_count_of(TimerAction::Reload), 1);
        // 800px wide at one building per 80px
        assert_eq!(state.debris.len(), 10);
        assert!((state.shake_amplitude() - SHAKE_AMPLITUDE).abs() < 1e-4);
    }

    #[test]
    fn test_resize_moves_ground_line() {
        let mut state = GameState::new(viewport(), 1);
        state.resize(Viewport::new(1024.0, 700.0));
        assert_eq!(state.runner.spawn.y, 700.0 - GROUND_OFFSET);
        assert_eq!(state.missile.pos, Viewport::new(1024.0, 700.0).launch_point());
    }
}
