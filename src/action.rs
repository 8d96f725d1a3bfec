use crate::types::RenderUnit;

/// Messages that drive the incremental feed
#[derive(Debug, Clone)]
pub enum FeedMsg {
    /// A debounce timer ran out without being cancelled
    DebounceElapsed(u64),
    PageLoaded { page: u32, units: Vec<RenderUnit> },
    PageFailed { page: u32, error: String },
}

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Tick,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    Resize(u16, u16),

    OpenInBrowser,
    YankUrl,
    Retry,

    Feed(FeedMsg),

    None,
}

impl From<FeedMsg> for Action {
    fn from(msg: FeedMsg) -> Self {
        Action::Feed(msg)
    }
}
