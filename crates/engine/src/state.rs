//! Per-game controller flags shared between the host callbacks and the
//! in-flight squelch attempt.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Snapshot of the controller flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControllerState {
    /// An attempt has started for the current game.
    pub squelched_this_game: bool,
    /// The plugin is loaded and allowed to act.
    pub running: bool,
    /// The user switched the feature off.
    pub disabled_by_user: bool,
}

/// Atomic controller flags.
///
/// `squelched_this_game` is the gate that keeps a game to a single attempt:
/// [`SquelchState::try_begin_attempt`] claims it with a compare-and-swap on
/// the thread that handles the turn-start signal, before anything is
/// spawned.
#[derive(Debug, Default)]
pub struct SquelchState {
    squelched_this_game: AtomicBool,
    running: AtomicBool,
    disabled_by_user: AtomicBool,
}

impl SquelchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of a loaded, enabled plugin with no attempt yet.
    pub fn running() -> Self {
        let state = Self::new();
        state.set_running(true);
        state
    }

    /// Claim this game's attempt. Returns false if one was already claimed.
    pub fn try_begin_attempt(&self) -> bool {
        self.squelched_this_game
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Release the claim so a later turn may try again.
    pub fn clear_attempt(&self) {
        self.squelched_this_game.store(false, Ordering::SeqCst);
    }

    /// A new game started.
    pub fn reset_for_new_game(&self) {
        self.clear_attempt();
    }

    pub fn squelched_this_game(&self) -> bool {
        self.squelched_this_game.load(Ordering::SeqCst)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled_by_user.store(disabled, Ordering::SeqCst);
    }

    /// Flip the user toggle. Returns the new `disabled` value.
    pub fn toggle_disabled(&self) -> bool {
        !self.disabled_by_user.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled_by_user.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ControllerState {
        ControllerState {
            squelched_this_game: self.squelched_this_game(),
            running: self.is_running(),
            disabled_by_user: self.is_disabled(),
        }
    }
}
