//! Infinite scroll.
//!
//! The [`Sequencer`] turns visibility changes of the line below the card grid into an
//! ordered series of page fetches. Every fetch is debounced; the page cursor is read
//! when the debounce fires and advanced only once the page has been appended.
//!
//! Timers and fetches run as spawned tasks that report back through the app's action
//! channel, so all state changes happen on the app's update loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::action::{Action, FeedMsg};
use crate::catalog::Catalog;
use crate::config::FeedConfig;
use crate::loader;
use crate::types::RenderUnit;

/// Page 1 is loaded before the sequencer is mounted
pub const FIRST_PAGE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Debounce timer armed
    PendingVisible,
    Fetching,
    /// The last fetch appended a page
    Appended,
    /// The catalog has no pages left
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedOptions {
    pub debounce: Duration,
    pub guard_in_flight: bool,
}

impl Default for FeedOptions {
    fn default() -> Self {
        FeedOptions::from(&FeedConfig::default())
    }
}

impl From<&FeedConfig> for FeedOptions {
    fn from(config: &FeedConfig) -> Self {
        Self {
            debounce: config.debounce(),
            guard_in_flight: config.guard_in_flight,
        }
    }
}

struct PendingTimer {
    ticket: u64,
    cancel: CancellationToken,
}

pub struct Sequencer {
    catalog: Arc<dyn Catalog>,
    action_tx: mpsc::UnboundedSender<Action>,
    options: FeedOptions,
    cursor: u32,
    units: Vec<RenderUnit>,
    phase: Phase,
    visible: bool,
    loading: bool,
    in_flight: usize,
    exhausted: bool,
    timer: Option<PendingTimer>,
    next_ticket: u64,
    last_error: Option<String>,
}

impl Sequencer {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        action_tx: mpsc::UnboundedSender<Action>,
        options: FeedOptions,
    ) -> Self {
        Self {
            catalog,
            action_tx,
            options,
            cursor: FIRST_PAGE,
            units: Vec::new(),
            phase: Phase::Idle,
            visible: false,
            loading: false,
            in_flight: 0,
            exhausted: false,
            timer: None,
            next_ticket: 0,
            last_error: None,
        }
    }

    /// Next page to request
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Every card appended so far, in page order
    pub fn units(&self) -> &[RenderUnit] {
        &self.units
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn spinner_visible(&self) -> bool {
        self.visible && self.loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    /// Stop requesting pages, e.g. when the first page already came back short
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
        self.cancel_timer();
        self.settle(false);
    }

    pub fn on_visibility(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        tracing::trace!(visible, "sentinel visibility changed");

        if visible {
            self.arm();
        } else {
            self.cancel_timer();
            self.settle(false);
        }
    }

    /// Try again after a failed fetch, if the bottom of the grid is still in view
    pub fn retry(&mut self) {
        self.last_error = None;
        self.arm();
    }

    pub fn update(&mut self, msg: FeedMsg) {
        match msg {
            FeedMsg::DebounceElapsed(ticket) => self.on_debounce_elapsed(ticket),
            FeedMsg::PageLoaded { page, units } => self.on_page_loaded(page, units),
            FeedMsg::PageFailed { page, error } => self.on_page_failed(page, error),
        }
    }

    fn arm(&mut self) {
        if !self.visible || self.exhausted || self.timer.is_some() {
            return;
        }
        if self.options.guard_in_flight && self.in_flight > 0 {
            tracing::trace!("page request in flight, trigger deferred");
            return;
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let tx = self.action_tx.clone();
        let delay = self.options.debounce;
        tokio::spawn(async move {
            tokio::select! {
                _ = task_cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    tx.send(FeedMsg::DebounceElapsed(ticket).into()).ok();
                }
            }
        });

        self.timer = Some(PendingTimer { ticket, cancel });
        self.loading = true;
        self.phase = Phase::PendingVisible;
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel.cancel();
            tracing::trace!(ticket = timer.ticket, "debounce cancelled");
        }
    }

    fn on_debounce_elapsed(&mut self, ticket: u64) {
        match &self.timer {
            Some(timer) if timer.ticket == ticket => self.timer = None,
            _ => {
                tracing::trace!(ticket, "stale debounce ignored");
                return;
            }
        }
        self.start_fetch(self.cursor);
    }

    fn start_fetch(&mut self, page: u32) {
        self.in_flight += 1;
        self.loading = true;
        self.phase = Phase::Fetching;
        tracing::info!(page, in_flight = self.in_flight, "requesting page");

        let tx = self.action_tx.clone();
        let catalog = Arc::clone(&self.catalog);
        tokio::spawn(async move {
            let msg = match loader::load_page(catalog.as_ref(), page).await {
                Ok(units) => FeedMsg::PageLoaded { page, units },
                Err(e) => FeedMsg::PageFailed {
                    page,
                    error: e.to_string(),
                },
            };
            tx.send(msg.into()).ok();
        });
    }

    fn on_page_loaded(&mut self, page: u32, units: Vec<RenderUnit>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let count = units.len();

        if count == 0 {
            tracing::info!(page, "catalog exhausted");
            self.exhausted = true;
        } else {
            self.units.extend(units);
            self.cursor = self.cursor.max(page + 1);
            if count < self.catalog.page_size() {
                tracing::info!(page, count, "short page, catalog exhausted");
                self.exhausted = true;
            }
            tracing::debug!(
                page,
                count,
                total = self.units.len(),
                cursor = self.cursor,
                "page appended"
            );
        }

        if self.exhausted {
            self.cancel_timer();
        }
        self.settle(count > 0);
        // Keep filling while the bottom of the grid stays in view
        self.arm();
    }

    fn on_page_failed(&mut self, page: u32, error: String) {
        self.in_flight = self.in_flight.saturating_sub(1);
        tracing::warn!(page, %error, "page request failed");
        self.last_error = Some(format!("Failed to load page {}: {}", page, error));
        self.settle(false);
    }

    /// Recompute the loading flag and phase from what is still outstanding
    fn settle(&mut self, appended: bool) {
        self.loading = self.timer.is_some() || self.in_flight > 0;
        self.phase = if self.exhausted && self.in_flight == 0 {
            Phase::Exhausted
        } else if self.timer.is_some() {
            Phase::PendingVisible
        } else if self.in_flight > 0 {
            Phase::Fetching
        } else if appended {
            Phase::Appended
        } else {
            Phase::Idle
        };
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
