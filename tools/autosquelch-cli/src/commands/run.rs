//! Dispatch a host event feed to the squelch plugin.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use autosquelch_common::config::AppConfig;
use autosquelch_engine::{get_backend, HostAction, SquelchPlugin};
use autosquelch_game_model::{parse_event_line, LiveGameStatus};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;

pub async fn run(config: AppConfig, events: Option<PathBuf>) -> anyhow::Result<()> {
    let backend = get_backend(&config.target, config.click)?;
    let game = Arc::new(LiveGameStatus::new());
    let plugin = SquelchPlugin::from_config(&config, backend, game.clone(), Handle::current());
    plugin.on_load();

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &events {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open event feed {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };
    let source = events
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdin".to_string());
    println!("Listening for host events on {source}. Press Ctrl+C to stop.");

    let end = pump_events(&plugin, &game, reader, tokio::signal::ctrl_c()).await?;
    tracing::debug!(?end, "Event loop finished");

    if let Some(outcome) = plugin.on_unload().await {
        println!("Last attempt: {}", serde_json::to_string(&outcome)?);
    }
    println!("State: {}", serde_json::to_string(&plugin.state())?);
    Ok(())
}

/// Why the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FeedEnd {
    Closed,
    Unload,
    Interrupted,
}

/// Dispatch every line of `reader` until the feed closes, the host unloads
/// the plugin or `shutdown` resolves.
///
/// `shutdown` is polled across iterations, so a signal that lands while an
/// event is being dispatched still stops the loop on the next turn.
pub(crate) async fn pump_events<R, F>(
    plugin: &SquelchPlugin,
    game: &LiveGameStatus,
    reader: R,
    shutdown: F,
) -> anyhow::Result<FeedEnd>
where
    R: AsyncBufRead + Unpin,
    F: Future,
{
    tokio::pin!(shutdown);
    let mut lines = reader.lines();
    let mut line_number = 0usize;
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read host event")?,
            _ = &mut shutdown => {
                tracing::info!("Interrupted");
                return Ok(FeedEnd::Interrupted);
            }
        };
        let Some(line) = line else {
            tracing::debug!("Event feed closed");
            return Ok(FeedEnd::Closed);
        };
        line_number += 1;

        let event = match parse_event_line(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(line = line_number, error = %e, "Skipping malformed host event");
                continue;
            }
        };
        tracing::debug!(line = line_number, event = event.name(), "Host event");

        match plugin.dispatch(game, &event) {
            HostAction::AttemptStarted => tracing::info!("Squelch attempt started"),
            HostAction::Unload => return Ok(FeedEnd::Unload),
            HostAction::Continue => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use autosquelch_engine::backend::{DesktopBackend, StubBackend};
    use autosquelch_game_model::{GameMode, GameStatus};
    use autosquelch_platform_core::ScreenRect;
    use tokio::io::AsyncWriteExt;

    fn plugin() -> (SquelchPlugin, Arc<StubBackend>, Arc<LiveGameStatus>) {
        let backend = Arc::new(StubBackend::new(ScreenRect::new(0, 0, 1024, 768)));
        let game = Arc::new(LiveGameStatus::new());
        let plugin = SquelchPlugin::from_config(
            &AppConfig::default(),
            backend.clone() as Arc<dyn DesktopBackend>,
            game.clone(),
            Handle::current(),
        );
        plugin.on_load();
        (plugin, backend, game)
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_dispatch_stops_an_open_feed() {
        let (plugin, _backend, game) = plugin();
        let (reader, mut writer) = tokio::io::duplex(1024);
        writer
            .write_all(b"{\"type\":\"game_start\",\"mode\":\"ranked\"}\n")
            .await
            .unwrap();

        // Resolves once the first event has been dispatched, while the feed
        // stays open with nothing more to read.
        let dispatched = game.clone();
        let shutdown = async move {
            while !dispatched.is_running() {
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            }
        };

        let end = pump_events(&plugin, &game, BufReader::new(reader), shutdown)
            .await
            .unwrap();

        assert_eq!(end, FeedEnd::Interrupted);
        assert_eq!(game.current_mode(), GameMode::Ranked);
        drop(writer);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_feed_and_unload_end_the_loop() {
        let (plugin, _backend, game) = plugin();
        let feed: &[u8] = b"{\"type\":\"game_start\",\"mode\":\"casual\"}\nnot json\n";
        let end = pump_events(&plugin, &game, feed, std::future::pending::<()>())
            .await
            .unwrap();
        assert_eq!(end, FeedEnd::Closed);

        let feed: &[u8] = b"{\"type\":\"unload\"}\n{\"type\":\"toggle\"}\n";
        let end = pump_events(&plugin, &game, feed, std::future::pending::<()>())
            .await
            .unwrap();
        assert_eq!(end, FeedEnd::Unload);
        assert!(!plugin.state().disabled_by_user);
    }
}
