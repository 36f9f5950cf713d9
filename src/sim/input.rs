//! Pointer and activation handling between ticks
//!
//! Input only records what the next tick should see: the pointer position,
//! the settle-detonation debounce timer, whether the player has armed the
//! Missile, and a queue of activations to detonate.

use glam::Vec2;

use super::state::{GamePhase, GameState};
use super::timers::TimerAction;
use crate::consts::SETTLE_DELAY;

/// Pointer moved to surface coordinates `pos`
pub fn pointer_moved(state: &mut GameState, pos: Vec2) {
    if state.phase == GamePhase::Reload {
        return;
    }
    state.pointer = pos;

    // Every move while armed restarts the settle countdown. The first
    // activation may still be queued, so Intro counts as armed too.
    if state.first_activation_seen
        && matches!(state.phase, GamePhase::Intro | GamePhase::Active)
    {
        let fire_at = state.ticks_from_now(SETTLE_DELAY);
        state
            .scheduler
            .reschedule(fire_at, TimerAction::SettleDetonation);
    }
}

/// Click/tap at surface coordinates `pos`
pub fn activate(state: &mut GameState, pos: Vec2) {
    if state.phase == GamePhase::Reload {
        return;
    }
    state.pointer = pos;
    state.first_activation_seen = true;
    state.pending_activations.push(pos);
    // A fresh detonation supersedes the pending settle one
    state.scheduler.cancel(TimerAction::SettleDetonation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Viewport;

    #[test]
    fn test_moves_before_arming_do_not_schedule() {
        let mut state = GameState::new(Viewport::new(800.0, 600.0), 3);
        pointer_moved(&mut state, Vec2::new(10.0, 20.0));
        assert_eq!(state.pointer, Vec2::new(10.0, 20.0));
        assert!(!state.scheduler.is_pending(TimerAction::SettleDetonation));
    }

    #[test]
    fn test_activation_queues_and_arms() {
        let mut state = GameState::new(Viewport::new(800.0, 600.0), 3);
        activate(&mut state, Vec2::new(100.0, 50.0));
        assert!(state.first_activation_seen);
        assert_eq!(state.pending_activations, vec![Vec2::new(100.0, 50.0)]);
        // Nothing detonates until the next tick
        assert!(state.explosions.is_empty());
    }

    #[test]
    fn test_moves_after_arming_restart_countdown() {
        let mut state = GameState::new(Viewport::new(800.0, 600.0), 3);
        state.first_activation_seen = true;
        state.phase = GamePhase::Active;

        pointer_moved(&mut state, Vec2::new(1.0, 1.0));
        let first = state.scheduler.fire_at(TimerAction::SettleDetonation);
        state.time_ticks += 6;
        pointer_moved(&mut state, Vec2::new(2.0, 2.0));
        let second = state.scheduler.fire_at(TimerAction::SettleDetonation);

        assert_eq!(second, first.map(|t| t + 6));
        assert_eq!(state.scheduler.pending_count_of(TimerAction::SettleDetonation), 1);
    }

    #[test]
    fn test_move_before_first_tick_starts_countdown() {
        let mut state = GameState::new(Viewport::new(800.0, 600.0), 3);
        activate(&mut state, Vec2::new(100.0, 100.0));
        pointer_moved(&mut state, Vec2::new(150.0, 120.0));
        assert_eq!(state.phase, GamePhase::Intro);
        assert!(state.scheduler.is_pending(TimerAction::SettleDetonation));
    }

    #[test]
    fn test_crash_ignores_moves() {
        let mut state = GameState::new(Viewport::new(800.0, 600.0), 3);
        state.first_activation_seen = true;
        state.phase = GamePhase::Crashing;
        pointer_moved(&mut state, Vec2::new(5.0, 5.0));
        assert_eq!(state.pointer, Vec2::new(5.0, 5.0));
        assert!(!state.scheduler.is_pending(TimerAction::SettleDetonation));
    }
}
