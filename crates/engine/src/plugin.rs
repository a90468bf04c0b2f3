//! Host-facing plugin lifecycle.
//!
//! The host calls these handlers from whatever thread delivers its events.
//! Attempts run on the tokio runtime the plugin was created with, and the
//! plugin keeps the handle of the one in flight so teardown can wait for it.

use std::sync::{Arc, Mutex, MutexGuard};

use autosquelch_common::config::AppConfig;
use autosquelch_game_model::{ActivePlayer, GameStatus, HostEvent, LiveGameStatus};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::backend::DesktopBackend;
use crate::controller::{SquelchController, SquelchOutcome, SquelchSettings};
use crate::state::{ControllerState, SquelchState};

pub const PLUGIN_NAME: &str = "Autosquelch";
pub const PLUGIN_DESCRIPTION: &str =
    "Automatically squelches your opponent at the start of each game.";
pub const PLUGIN_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the host loop should do after dispatching an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Continue,
    /// A turn start spawned a squelch attempt.
    AttemptStarted,
    /// The host asked the plugin to unload.
    Unload,
}

pub struct SquelchPlugin {
    controller: Arc<SquelchController>,
    runtime: Handle,
    in_flight: Mutex<Option<JoinHandle<SquelchOutcome>>>,
}

impl SquelchPlugin {
    pub fn new(controller: SquelchController, runtime: Handle) -> Self {
        Self {
            controller: Arc::new(controller),
            runtime,
            in_flight: Mutex::new(None),
        }
    }

    /// Build a plugin with fresh state from the application config.
    pub fn from_config(
        config: &AppConfig,
        backend: Arc<dyn DesktopBackend>,
        game: Arc<dyn GameStatus>,
        runtime: Handle,
    ) -> Self {
        let controller = SquelchController::new(
            backend,
            game,
            Arc::new(SquelchState::new()),
            SquelchSettings::from(config),
        );
        Self::new(controller, runtime)
    }

    pub fn controller(&self) -> &SquelchController {
        &self.controller
    }

    pub fn on_load(&self) {
        let state = self.controller.state();
        state.clear_attempt();
        state.set_running(true);
        tracing::info!(
            name = PLUGIN_NAME,
            author = PLUGIN_AUTHOR,
            version = PLUGIN_VERSION,
            backend = self.controller.backend().name(),
            "Plugin loaded"
        );
    }

    /// Stop the plugin and wait for the in-flight attempt to notice.
    pub async fn on_unload(&self) -> Option<SquelchOutcome> {
        self.controller.state().set_running(false);
        let outcome = self.wait_for_attempt().await;
        tracing::info!(?outcome, "Plugin unloaded");
        outcome
    }

    /// Abort the in-flight attempt without waiting for a check point.
    pub fn cancel(&self) {
        if let Some(handle) = self.in_flight().take() {
            if !handle.is_finished() {
                handle.abort();
                self.controller.state().clear_attempt();
                tracing::info!("Squelch attempt cancelled");
            }
        }
    }

    /// Re-arm for a new game. An attempt still running from the previous
    /// game is aborted first so it cannot click into this one.
    pub fn on_game_start(&self) {
        self.cancel();
        self.controller.state().reset_for_new_game();
        tracing::debug!("Game started, squelch re-armed");
    }

    /// Start this game's squelch attempt if nothing rules it out.
    ///
    /// Returns true if an attempt was spawned.
    pub fn on_turn_start(&self, active_player: ActivePlayer) -> bool {
        let state = self.controller.state();
        tracing::debug!(?active_player, "Turn started");

        if !state.is_running() || state.is_disabled() || state.squelched_this_game() {
            return false;
        }
        if !self.controller.backend().is_target_foreground() {
            tracing::debug!("Game window not in foreground, skipping squelch");
            return false;
        }
        if !self.controller.is_squelchable_now() {
            tracing::debug!("Game mode cannot be squelched");
            return false;
        }

        let mut in_flight = self.in_flight();
        if in_flight.as_ref().is_some_and(|handle| !handle.is_finished()) {
            tracing::debug!("Previous squelch attempt still running");
            return false;
        }
        if !state.try_begin_attempt() {
            return false;
        }

        let controller = self.controller.clone();
        let handle = self
            .runtime
            .spawn(async move { controller.attempt_squelch().await });
        *in_flight = Some(handle);
        true
    }

    /// Flip the user toggle. Returns whether squelching is now enabled.
    pub fn toggle(&self) -> bool {
        let enabled = !self.controller.state().toggle_disabled();
        tracing::info!(enabled, "Autosquelch toggled");
        enabled
    }

    pub fn is_squelchable(&self) -> bool {
        self.controller.is_squelchable_now()
    }

    /// Await the in-flight attempt, if there is one.
    pub async fn wait_for_attempt(&self) -> Option<SquelchOutcome> {
        let handle = self.in_flight().take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                tracing::warn!(error = %e, "Squelch attempt panicked");
                self.controller.state().clear_attempt();
                None
            }
        }
    }

    /// Route one feed event: update `game` first, then call the handler.
    pub fn dispatch(&self, game: &LiveGameStatus, event: &HostEvent) -> HostAction {
        game.apply(event);
        match event {
            HostEvent::GameStart { .. } => {
                self.on_game_start();
                HostAction::Continue
            }
            HostEvent::TurnStart { active_player } => {
                if self.on_turn_start(*active_player) {
                    HostAction::AttemptStarted
                } else {
                    HostAction::Continue
                }
            }
            HostEvent::Toggle => {
                self.toggle();
                HostAction::Continue
            }
            HostEvent::Unload => HostAction::Unload,
            HostEvent::GameEnd | HostEvent::ModeChange { .. } => HostAction::Continue,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state().snapshot()
    }

    fn in_flight(&self) -> MutexGuard<'_, Option<JoinHandle<SquelchOutcome>>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
