//! Outward notifications for the presentation layer
//!
//! The simulation queues events on the state during a tick; the host drains
//! them and hands them to a [`Presenter`] (floating text, sound, camera shake,
//! game-over screen, high-score persistence).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{GamePhase, Pursuer};

/// Impact flavours, for sound and camera-shake selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactKind {
    /// Player launched a pursuer
    Push,
    /// Slow player was bumped (ends the round)
    Bump,
    /// A pursuer left the arena
    RingOut,
    /// The player left the arena (ends the round)
    BoundaryLoss,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    BoundaryExit,
    Bumped,
}

/// Something the presentation layer should react to
#[derive(Debug, Clone)]
pub enum GameEvent {
    Score { total: u64, combo: u32, pos: Vec2 },
    Impact(ImpactKind),
    /// Defeat animation should start; snapshot taken when removal began
    PursuerRemoved(Pursuer),
    SessionEnded {
        final_score: u64,
        new_high_score: bool,
        reason: EndReason,
    },
    PhaseChanged(GamePhase),
}

/// Presentation collaborator implemented by the host
pub trait Presenter {
    fn on_score(&mut self, total: u64, combo: u32, pos: Vec2);
    fn on_impact(&mut self, kind: ImpactKind);
    fn on_pursuer_removed(&mut self, pursuer: &Pursuer);
    fn on_session_ended(&mut self, final_score: u64, new_high_score: bool);
    fn on_phase_changed(&mut self, _phase: GamePhase) {}
}

impl GameEvent {
    pub fn dispatch(&self, presenter: &mut dyn Presenter) {
        match self {
            GameEvent::Score { total, combo, pos } => presenter.on_score(*total, *combo, *pos),
            GameEvent::Impact(kind) => presenter.on_impact(*kind),
            GameEvent::PursuerRemoved(pursuer) => presenter.on_pursuer_removed(pursuer),
            GameEvent::SessionEnded {
                final_score,
                new_high_score,
                ..
            } => presenter.on_session_ended(*final_score, *new_high_score),
            GameEvent::PhaseChanged(phase) => presenter.on_phase_changed(*phase),
        }
    }
}

/// Forward a batch of events in order
pub fn dispatch_all<I>(events: I, presenter: &mut dyn Presenter)
where
    I: IntoIterator<Item = GameEvent>,
{
    for event in events {
        event.dispatch(presenter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Presenter for Recorder {
        fn on_score(&mut self, total: u64, combo: u32, _pos: Vec2) {
            self.calls.push(format!("score {total} x{combo}"));
        }
        fn on_impact(&mut self, kind: ImpactKind) {
            self.calls.push(format!("impact {kind:?}"));
        }
        fn on_pursuer_removed(&mut self, pursuer: &Pursuer) {
            self.calls.push(format!("removed {}", pursuer.id));
        }
        fn on_session_ended(&mut self, final_score: u64, new_high_score: bool) {
            self.calls.push(format!("ended {final_score} {new_high_score}"));
        }
    }

    #[test]
    fn test_dispatch_preserves_order() {
        let mut recorder = Recorder::default();
        let events = vec![
            GameEvent::Impact(ImpactKind::RingOut),
            GameEvent::Score {
                total: 30,
                combo: 2,
                pos: Vec2::ZERO,
            },
            GameEvent::PursuerRemoved(Pursuer::new(7, Vec2::ZERO, 20.0, 100.0, 1.0)),
            GameEvent::PhaseChanged(GamePhase::Ended),
            GameEvent::SessionEnded {
                final_score: 30,
                new_high_score: true,
                reason: EndReason::Bumped,
            },
        ];
        dispatch_all(events, &mut recorder);
        assert_eq!(
            recorder.calls,
            vec!["impact RingOut", "score 30 x2", "removed 7", "ended 30 true"]
        );
    }
}
