use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEventKind};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::catalog::Catalog;
use crate::event::Event;
use crate::grid::Grid;
use crate::sequencer::{FeedOptions, Sequencer};
use crate::types::RenderUnit;
use crate::visibility::VisibilitySignal;

pub struct App {
    /// Page 1, loaded before the first frame
    pub first_page: Vec<RenderUnit>,
    pub sequencer: Sequencer,
    pub grid: Grid,
    pub selected: usize,
    pub row_offset: usize,
    pub tick: u64,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub should_quit: bool,
    visibility: VisibilitySignal,
    catalog: Arc<dyn Catalog>,
}

impl App {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        first_page: Vec<RenderUnit>,
        options: FeedOptions,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        let mut sequencer = Sequencer::new(Arc::clone(&catalog), action_tx, options);
        if first_page.len() < catalog.page_size() {
            sequencer.mark_exhausted();
        }

        Self {
            first_page,
            sequencer,
            grid: Grid::default(),
            selected: 0,
            row_offset: 0,
            tick: 0,
            error: None,
            notice: None,
            should_quit: false,
            visibility: VisibilitySignal::default(),
            catalog,
        }
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    /// Number of cards on screen, first page included
    pub fn len(&self) -> usize {
        self.first_page.len() + self.sequencer.units().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cards(&self) -> impl Iterator<Item = &RenderUnit> {
        self.first_page.iter().chain(self.sequencer.units())
    }

    pub fn card(&self, index: usize) -> Option<&RenderUnit> {
        match index.checked_sub(self.first_page.len()) {
            None => self.first_page.get(index),
            Some(rest) => self.sequencer.units().get(rest),
        }
    }

    pub fn selected_card(&self) -> Option<&RenderUnit> {
        self.card(self.selected)
    }

    pub fn sentinel_visible(&self) -> bool {
        self.visibility.is_visible()
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Tick => Action::Tick,
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => Action::ScrollDown,
                MouseEventKind::ScrollUp => Action::ScrollUp,
                _ => Action::None,
            },
            Event::Resize(width, height) => Action::Resize(width, height),
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('d') if ctrl => Action::PageDown,
            KeyCode::Char('u') if ctrl => Action::PageUp,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('h') | KeyCode::Left => Action::ScrollLeft,
            KeyCode::Char('l') | KeyCode::Right => Action::ScrollRight,
            KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
            KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
            KeyCode::Char('o') | KeyCode::Enter => Action::OpenInBrowser,
            KeyCode::Char('y') => Action::YankUrl,
            KeyCode::Char('r') => Action::Retry,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if !matches!(
            action,
            Action::Tick | Action::Feed(_) | Action::Resize(..) | Action::None
        ) {
            self.error = None;
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
            }
            Action::ScrollDown => {
                let next = self.selected + self.grid.columns;
                if next < self.len() {
                    self.select(next);
                } else if self.grid.row_of(self.selected) + 1 < self.grid.card_rows(self.len()) {
                    // last row is shorter than this one
                    self.select(self.len() - 1);
                } else {
                    self.row_offset = (self.row_offset + 1).min(self.grid.max_offset(self.len()));
                }
            }
            Action::ScrollUp => {
                if self.selected >= self.grid.columns {
                    self.select(self.selected - self.grid.columns);
                } else {
                    self.row_offset = 0;
                }
            }
            Action::ScrollLeft => {
                self.select(self.selected.saturating_sub(1));
            }
            Action::ScrollRight => {
                if self.selected + 1 < self.len() {
                    self.select(self.selected + 1);
                }
            }
            Action::PageDown => {
                let last = self.len().saturating_sub(1);
                if self.selected == last {
                    self.row_offset = self.grid.max_offset(self.len());
                } else {
                    let step = self.grid.full_rows() * self.grid.columns;
                    self.select((self.selected + step).min(last));
                }
            }
            Action::PageUp => {
                let step = self.grid.full_rows() * self.grid.columns;
                self.select(self.selected.saturating_sub(step));
            }
            Action::GoToTop => {
                self.selected = 0;
                self.row_offset = 0;
            }
            Action::GoToBottom => {
                self.selected = self.len().saturating_sub(1);
                self.row_offset = self.grid.max_offset(self.len());
            }
            Action::Resize(width, height) => {
                self.grid = Grid::for_terminal(width, height);
                self.row_offset = self
                    .grid
                    .scroll_into_view(self.row_offset, self.selected)
                    .min(self.grid.max_offset(self.len()));
            }

            Action::OpenInBrowser => {
                if let Some(card) = self.selected_card() {
                    let url = self.catalog.web_url(&card.item);
                    match open::that(&url) {
                        Ok(()) => self.notice = Some(format!("Opened {}", url)),
                        Err(e) => self.error = Some(format!("Failed to open {}: {}", url, e)),
                    }
                }
            }
            Action::YankUrl => {
                if let Some(card) = self.selected_card() {
                    let url = self.catalog.image_url(&card.item);
                    let copied = arboard::Clipboard::new()
                        .and_then(|mut clipboard| clipboard.set_text(&url));
                    match copied {
                        Ok(()) => self.notice = Some(format!("Copied {}", url)),
                        Err(e) => self.error = Some(format!("Clipboard unavailable: {}", e)),
                    }
                }
            }
            Action::Retry => {
                self.sequencer.retry();
            }

            Action::Feed(msg) => {
                self.sequencer.update(msg);
                if let Some(error) = self.sequencer.take_error() {
                    self.error = Some(error);
                }
            }

            Action::None => {}
        }

        self.sync_visibility();
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
        self.row_offset = self.grid.scroll_into_view(self.row_offset, index);
    }

    fn sync_visibility(&mut self) {
        let visible = self.grid.sentinel_visible(self.len(), self.row_offset);
        if let Some(visible) = self.visibility.observe(visible) {
            self.sequencer.on_visibility(visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::FeedMsg;
    use crate::catalog::mock::{sample_page, MockCatalog};
    use crate::loader;
    use crate::sequencer::Phase;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    async fn mount(catalog: MockCatalog) -> (App, Arc<MockCatalog>, UnboundedReceiver<Action>) {
        let catalog = Arc::new(catalog);
        let first_page = loader::load_page(catalog.as_ref(), 1).await.unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(catalog.clone(), first_page, FeedOptions::default(), tx);
        (app, catalog, rx)
    }

    async fn pump(app: &mut App, rx: &mut UnboundedReceiver<Action>) -> Option<FeedMsg> {
        match tokio::time::timeout(Duration::from_secs(60), rx.recv()).await {
            Ok(Some(action)) => {
                let msg = match &action {
                    Action::Feed(msg) => Some(msg.clone()),
                    _ => None,
                };
                app.update(action);
                msg
            }
            _ => None,
        }
    }

    fn ids(app: &App) -> Vec<String> {
        app.cards().map(|u| u.item.id.clone()).collect()
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test(start_paused = true)]
    async fn first_page_renders_before_any_scroll() {
        let (app, catalog, _rx) =
            mount(MockCatalog::new().with_page(1, sample_page("a", 8))).await;

        assert_eq!(ids(&app), ["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8"]);
        assert_eq!(app.sequencer.cursor(), 2);
        assert_eq!(catalog.requests(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn scrolling_into_sentinel_appends_next_page() {
        let (mut app, catalog, mut rx) = mount(
            MockCatalog::new()
                .with_page(1, sample_page("a", 8))
                .with_page(2, sample_page("b", 8)),
        )
        .await;

        // 4 columns and plenty of room: the sentinel is on screen right away
        app.update(Action::Resize(160, 43));
        assert!(app.sentinel_visible());
        assert!(app.sequencer.spinner_visible());

        assert!(matches!(
            pump(&mut app, &mut rx).await,
            Some(FeedMsg::DebounceElapsed(_))
        ));
        assert!(matches!(
            pump(&mut app, &mut rx).await,
            Some(FeedMsg::PageLoaded { page: 2, .. })
        ));

        let expected: Vec<String> = sample_page("a", 8)
            .into_iter()
            .chain(sample_page("b", 8))
            .map(|item| item.id)
            .collect();
        assert_eq!(ids(&app), expected);
        assert_eq!(app.sequencer.cursor(), 3);
        assert_eq!(catalog.requests(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_page_keeps_first_page_and_reports() {
        let (mut app, _catalog, mut rx) = mount(
            MockCatalog::new()
                .with_page(1, sample_page("a", 8))
                .with_failure(2, "upstream down"),
        )
        .await;

        app.update(Action::Resize(160, 43));
        pump(&mut app, &mut rx).await;
        assert!(matches!(
            pump(&mut app, &mut rx).await,
            Some(FeedMsg::PageFailed { page: 2, .. })
        ));

        assert_eq!(app.len(), 8);
        assert_eq!(app.sequencer.cursor(), 2);
        assert!(!app.sequencer.spinner_visible());
        assert!(app.error.as_deref().unwrap().contains("upstream down"));
    }

    #[tokio::test(start_paused = true)]
    async fn sentinel_below_the_fold_waits_for_scroll() {
        let (mut app, catalog, mut rx) = mount(
            MockCatalog::new()
                .with_page(1, sample_page("a", 8))
                .with_page(2, sample_page("b", 8)),
        )
        .await;

        // single column, two card rows of room
        app.update(Action::Resize(60, 13));
        assert!(!app.sentinel_visible());
        assert!(pump(&mut app, &mut rx).await.is_none());
        assert_eq!(catalog.requests(), vec![1]);

        app.update(Action::GoToBottom);
        assert_eq!(app.selected, 7);
        assert!(app.sentinel_visible());
        assert_eq!(app.sequencer.phase(), Phase::PendingVisible);
    }

    #[tokio::test(start_paused = true)]
    async fn scrolling_back_up_cancels_pending_load() {
        let (mut app, catalog, mut rx) = mount(
            MockCatalog::new()
                .with_page(1, sample_page("a", 8))
                .with_page(2, sample_page("b", 8)),
        )
        .await;

        app.update(Action::Resize(60, 13));
        app.update(Action::GoToBottom);
        assert!(app.sentinel_visible());
        app.update(Action::GoToTop);
        assert!(!app.sentinel_visible());

        assert!(pump(&mut app, &mut rx).await.is_none());
        assert_eq!(catalog.requests(), vec![1]);
        assert_eq!(app.sequencer.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn short_first_page_never_loads_more() {
        let (mut app, catalog, mut rx) =
            mount(MockCatalog::new().with_page(1, sample_page("a", 3))).await;

        app.update(Action::Resize(160, 43));

        assert!(app.sentinel_visible());
        assert!(app.sequencer.is_exhausted());
        assert!(pump(&mut app, &mut rx).await.is_none());
        assert_eq!(catalog.requests(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn grid_navigation_moves_by_rows_and_cards() {
        let (mut app, _catalog, _rx) =
            mount(MockCatalog::new().with_page(1, sample_page("a", 8))).await;
        // 3 columns: rows [0 1 2] [3 4 5] [6 7]
        app.update(Action::Resize(120, 63));

        app.update(Action::ScrollDown);
        assert_eq!(app.selected, 3);
        app.update(Action::ScrollRight);
        app.update(Action::ScrollRight);
        assert_eq!(app.selected, 5);
        // no card below index 5, jump to the last one
        app.update(Action::ScrollDown);
        assert_eq!(app.selected, 7);
        app.update(Action::ScrollRight);
        assert_eq!(app.selected, 7);
        app.update(Action::ScrollUp);
        assert_eq!(app.selected, 4);
        app.update(Action::ScrollLeft);
        assert_eq!(app.selected, 3);
        app.update(Action::GoToTop);
        assert_eq!(app.selected, 0);
        assert_eq!(app.selected_card().unwrap().item.id, "a1");
    }

    #[tokio::test(start_paused = true)]
    async fn keys_map_to_actions() {
        let (app, _catalog, _rx) =
            mount(MockCatalog::new().with_page(1, sample_page("a", 8))).await;

        assert!(matches!(app.handle_event(key(KeyCode::Char('j'))), Action::ScrollDown));
        assert!(matches!(app.handle_event(key(KeyCode::Up)), Action::ScrollUp));
        assert!(matches!(app.handle_event(key(KeyCode::Char('G'))), Action::GoToBottom));
        assert!(matches!(app.handle_event(key(KeyCode::Char('r'))), Action::Retry));
        assert!(matches!(app.handle_event(key(KeyCode::Char('q'))), Action::Quit));
        assert!(matches!(
            app.handle_event(Event::Key(KeyEvent::new(
                KeyCode::Char('d'),
                KeyModifiers::CONTROL
            ))),
            Action::PageDown
        ));
        assert!(matches!(app.handle_event(key(KeyCode::Char('d'))), Action::None));
        assert!(matches!(app.handle_event(Event::Resize(80, 24)), Action::Resize(80, 24)));
    }

    #[tokio::test(start_paused = true)]
    async fn load_error_survives_resize_and_clears_on_next_input() {
        let (mut app, _catalog, mut rx) = mount(
            MockCatalog::new()
                .with_page(1, sample_page("a", 8))
                .with_failure(2, "upstream down"),
        )
        .await;

        app.update(Action::Resize(160, 43));
        pump(&mut app, &mut rx).await;
        pump(&mut app, &mut rx).await;
        assert!(app.error.is_some());

        app.update(Action::Tick);
        app.update(Action::Resize(120, 40));
        assert!(app.error.as_deref().unwrap().contains("page 2"));

        app.update(Action::ScrollDown);
        assert!(app.error.is_none());
    }
}
