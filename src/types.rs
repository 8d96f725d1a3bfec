use std::time::{Duration, Instant};

/// Delay between the entrance of two neighbouring cards of the same page
pub const STAGGER: Duration = Duration::from_millis(250);

/// How long a single card takes to fade in once its delay has elapsed
pub const ENTRANCE: Duration = Duration::from_millis(500);

/// Image path of a title, relative to the catalog host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub original: String,
}

/// One anime as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub image: ImageRef,
    pub kind: Option<String>,
    pub episodes: u32,
    pub episodes_aired: u32,
    pub score: String,
}

impl CatalogItem {
    /// Planned episode count, or the aired count for titles without a plan yet
    pub fn episode_count(&self) -> u32 {
        if self.episodes > 0 {
            self.episodes
        } else {
            self.episodes_aired
        }
    }

    pub fn kind_label(&self) -> String {
        match self.kind.as_deref() {
            Some(kind) if !kind.is_empty() => {
                let mut chars = kind.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            _ => "?".to_string(),
        }
    }
}

/// A catalog item ready for display, tagged with its slot in the page it came from
#[derive(Debug, Clone)]
pub struct RenderUnit {
    pub item: CatalogItem,
    pub position: usize,
    pub loaded_at: Instant,
}

impl RenderUnit {
    pub fn new(item: CatalogItem, position: usize, loaded_at: Instant) -> Self {
        Self {
            item,
            position,
            loaded_at,
        }
    }

    pub fn entrance_delay(&self) -> Duration {
        STAGGER * self.position as u32
    }

    /// 0.0 until the card's delay has elapsed, 1.0 once it is fully shown
    pub fn reveal_progress(&self, now: Instant) -> f32 {
        let start = self.loaded_at + self.entrance_delay();
        let Some(elapsed) = now.checked_duration_since(start) else {
            return 0.0;
        };
        (elapsed.as_secs_f32() / ENTRANCE.as_secs_f32()).min(1.0)
    }
}
