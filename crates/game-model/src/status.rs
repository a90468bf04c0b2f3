//! Game-state queries consumed by the squelch controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::event::HostEvent;
use crate::mode::GameMode;

/// Read-only view of the game the host is tracking.
pub trait GameStatus: Send + Sync {
    /// Whether a match is currently in progress.
    fn is_running(&self) -> bool;

    /// Mode of the current (or last) match.
    fn current_mode(&self) -> GameMode;
}

/// Game status kept up to date from the host event feed.
#[derive(Debug, Default)]
pub struct LiveGameStatus {
    running: AtomicBool,
    mode: RwLock<GameMode>,
}

impl LiveGameStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of a match already in progress.
    pub fn in_game(mode: GameMode) -> Self {
        Self {
            running: AtomicBool::new(true),
            mode: RwLock::new(mode),
        }
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn set_mode(&self, mode: GameMode) {
        match self.mode.write() {
            Ok(mut guard) => *guard = mode,
            Err(poisoned) => *poisoned.into_inner() = mode,
        }
    }

    /// Fold a host event into the tracked state.
    pub fn apply(&self, event: &HostEvent) {
        match event {
            HostEvent::GameStart { mode } => {
                self.set_mode(*mode);
                self.set_running(true);
            }
            HostEvent::GameEnd => self.set_running(false),
            HostEvent::ModeChange { mode } => self.set_mode(*mode),
            HostEvent::TurnStart { .. } | HostEvent::Toggle | HostEvent::Unload => {}
        }
        tracing::trace!(event = event.name(), running = self.is_running(), mode = %self.current_mode(), "Game status updated");
    }
}

impl GameStatus for LiveGameStatus {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn current_mode(&self) -> GameMode {
        match self.mode.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ActivePlayer;

    #[test]
    fn game_start_sets_mode_and_running() {
        let status = LiveGameStatus::new();
        assert!(!status.is_running());

        status.apply(&HostEvent::GameStart {
            mode: GameMode::Ranked,
        });
        assert!(status.is_running());
        assert_eq!(status.current_mode(), GameMode::Ranked);
    }

    #[test]
    fn game_end_keeps_last_mode() {
        let status = LiveGameStatus::in_game(GameMode::Arena);
        status.apply(&HostEvent::GameEnd);
        assert!(!status.is_running());
        assert_eq!(status.current_mode(), GameMode::Arena);
    }

    #[test]
    fn mode_change_does_not_touch_running() {
        let status = LiveGameStatus::in_game(GameMode::None);
        status.apply(&HostEvent::ModeChange {
            mode: GameMode::Battlegrounds,
        });
        assert!(status.is_running());
        assert_eq!(status.current_mode(), GameMode::Battlegrounds);

        status.apply(&HostEvent::TurnStart {
            active_player: ActivePlayer::Opponent,
        });
        assert_eq!(status.current_mode(), GameMode::Battlegrounds);
    }
}
