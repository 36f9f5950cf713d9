//! Host lifecycle around one simulation
//!
//! A `Session` owns a `GameState`, turns display-refresh timestamps into
//! fixed ticks, forwards input, hands snapshots to a render sink and calls
//! the host's restart hook when the crash sequence finishes.

use glam::Vec2;

use crate::platform::FrameClock;
use crate::settings::Settings;
use crate::sim::snapshot::{RenderSink, Snapshot, build_snapshot};
use crate::sim::state::{GameEvent, GameState, Viewport};
use crate::sim::{input, tick};

/// Host-provided hook that tears the game down and starts a new one
pub type RestartFn = Box<dyn FnMut()>;

pub struct Session {
    state: GameState,
    clock: FrameClock,
    settings: Settings,
    viewport: Viewport,
    seed: u64,
    running: bool,
    /// Taken when it fires, so it can only fire once
    restart: Option<RestartFn>,
}

impl Session {
    pub fn new(viewport: Viewport, seed: u64, settings: Settings, restart: RestartFn) -> Self {
        Self {
            state: GameState::new(viewport, seed),
            clock: FrameClock::new(),
            settings,
            viewport,
            seed,
            running: false,
            restart: Some(restart),
        }
    }

    /// Enter Intro with a fresh state and begin stepping from `now_ms`
    pub fn start(&mut self, now_ms: f64) {
        if self.running {
            return;
        }
        self.state = GameState::new(self.viewport, self.seed);
        self.state.max_particles = self.settings.max_particles();
        self.clock = FrameClock::new();
        self.clock.begin(now_ms);
        self.running = true;
        log::info!(
            "Session started (seed {}, {}x{}, quality {})",
            self.seed,
            self.viewport.width,
            self.viewport.height,
            self.settings.quality.as_str()
        );
    }

    /// Cancel every timer and stop stepping. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.state.shutdown();
        log::info!(
            "Session stopped at t={:.2}s (score {})",
            self.state.time_secs(),
            self.state.score
        );
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if self.running {
            input::pointer_moved(&mut self.state, Vec2::new(x, y));
        }
    }

    pub fn on_activate(&mut self, x: f32, y: f32) {
        if self.running {
            input::activate(&mut self.state, Vec2::new(x, y));
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.state.resize(viewport);
    }

    /// Run the ticks due at `now_ms`, then present the result.
    /// Returns the number of ticks run.
    pub fn frame(&mut self, now_ms: f64, sink: &mut dyn RenderSink) -> u32 {
        if !self.running {
            return 0;
        }

        let steps = self.clock.advance(now_ms);
        let mut ran = 0;
        for _ in 0..steps {
            tick(&mut self.state);
            ran += 1;
            self.handle_events();
            if !self.running {
                return ran;
            }
        }

        sink.present(&self.snapshot());
        ran
    }

    pub fn snapshot(&self) -> Snapshot {
        build_snapshot(&self.state, &self.settings)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn handle_events(&mut self) {
        for event in self.state.drain_events() {
            log::trace!("{:?}", event);
            if event == GameEvent::ReloadRequested {
                self.stop();
                if let Some(mut restart) = self.restart.take() {
                    restart();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_session() -> (Session, Rc<Cell<u32>>) {
        let restarts = Rc::new(Cell::new(0));
        let counter = restarts.clone();
        let session = Session::new(
            Viewport::new(800.0, 600.0),
            42,
            Settings::default(),
            Box::new(move || counter.set(counter.get() + 1)),
        );
        (session, restarts)
    }

    fn ignore(_: &Snapshot) {}

    #[test]
    fn test_frames_do_nothing_before_start() {
        let (mut session, _) = counting_session();
        assert_eq!(session.frame(1000.0, &mut ignore), 0);
        session.on_activate(10.0, 10.0);
        assert!(session.state().pending_activations.is_empty());
    }

    #[test]
    fn test_start_then_frames_present_snapshots() {
        let (mut session, _) = counting_session();
        session.start(0.0);
        let mut presented = Vec::new();
        let mut sink = |s: &Snapshot| presented.push(s.phase);
        session.frame(50.0, &mut sink);
        assert_eq!(presented, vec![GamePhase::Intro]);
        assert_eq!(session.state().max_particles, Settings::default().max_particles());
    }

    #[test]
    fn test_stop_is_idempotent_and_silences_input() {
        let (mut session, _) = counting_session();
        session.start(0.0);
        session.stop();
        session.stop();
        assert!(!session.is_running());

        session.on_pointer_move(5.0, 5.0);
        assert_ne!(session.state().pointer, Vec2::new(5.0, 5.0));
        assert_eq!(session.frame(1000.0, &mut ignore), 0);
    }

    #[test]
    fn test_frames_leave_no_events_behind() {
        let (mut session, _) = counting_session();
        session.start(0.0);
        session.on_activate(400.0, 300.0);
        let mut now = 0.0;
        for _ in 0..120 {
            now += 16.0;
            session.frame(now, &mut ignore);
            assert!(session.state().events.is_empty());
        }
    }

    #[test]
    fn test_reload_calls_restart_once_and_stops() {
        let (mut session, restarts) = counting_session();
        session.start(0.0);
        session.on_activate(400.0, 300.0);
        session.frame(20.0, &mut ignore);
        session.state.runner.respawn();
        session.state.begin_crash();

        let mut now = 20.0;
        for _ in 0..400 {
            now += 16.0;
            session.frame(now, &mut ignore);
        }
        assert_eq!(restarts.get(), 1);
        assert!(!session.is_running());
        assert_eq!(session.state().phase, GamePhase::Reload);
    }
}
