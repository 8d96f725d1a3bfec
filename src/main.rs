mod action;
mod app;
mod catalog;
mod cli;
mod config;
mod error;
mod event;
mod grid;
mod loader;
mod sequencer;
mod shikimori;
mod tui;
mod types;
mod ui;
mod visibility;

use std::panic;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::catalog::Catalog;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::VaultError;
use crate::event::Event;
use crate::sequencer::FeedOptions;
use crate::shikimori::Shikimori;
use crate::tui::EventHandler;
use crate::types::RenderUnit;

const LOG_FILE: &str = "anivault.log";

/// The terminal belongs to the UI, so logs go to `LOG_FILE` inside `dir` when it can
/// be opened and to stderr otherwise. The guard flushes on drop.
fn log_writer(dir: Option<&Path>) -> (NonBlocking, WorkerGuard) {
    let appender = dir.and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(LOG_FILE)
            .build(dir)
            .ok()
    });

    match appender {
        Some(appender) => tracing_appender::non_blocking(appender),
        None => tracing_appender::non_blocking(std::io::stderr()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_dir = dirs::cache_dir().map(|dir| dir.join("anivault"));
    // Held until main returns so buffered log lines are written out
    let (writer, _log_guard) = log_writer(log_dir.as_deref());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("anivault=info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();

    let config = Config::resolve(&cli)?;
    if cli.show_config {
        let rendered =
            toml::to_string_pretty(&config).map_err(|e| VaultError::Config(e.to_string()))?;
        print!("{}", rendered);
        return Ok(());
    }

    let catalog: Arc<dyn Catalog> = Arc::new(Shikimori::new(&config.catalog)?);
    tracing::info!(catalog = catalog.name(), "starting");

    // Page 1 is on screen before the first frame; later pages come from the feed
    let first_page = loader::load_page(catalog.as_ref(), 1).await?;

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(catalog, first_page, FeedOptions::from(&config.feed)).await;

    tui::restore()?;

    result
}

async fn run(
    catalog: Arc<dyn Catalog>,
    first_page: Vec<RenderUnit>,
    options: FeedOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(catalog, first_page, options, action_tx.clone());

    // Lay out the grid before the first resize event arrives
    let size = terminal.size()?;
    action_tx.send(Action::Resize(size.width, size.height))?;

    let tick_rate = Duration::from_millis(100);
    let render_rate = Duration::from_millis(16);
    let mut events = EventHandler::new(tick_rate, render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
