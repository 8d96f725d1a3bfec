use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::catalog::Catalog;
use crate::config::CatalogConfig;
use crate::error::{Result, VaultError};
use crate::types::{CatalogItem, ImageRef};

const USER_AGENT: &str = concat!("anivault/", env!("CARGO_PKG_VERSION"));

pub struct Shikimori {
    client: Client,
    host: String,
    page_size: usize,
    order: String,
}

impl std::fmt::Debug for Shikimori {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shikimori")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl Shikimori {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| VaultError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            order: config.order.clone(),
        })
    }

    fn page_url(&self, page: u32) -> String {
        format!(
            "{}/api/animes?page={}&limit={}&order={}",
            self.host, page, self.page_size, self.order
        )
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| VaultError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(VaultError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        response
            .text()
            .await
            .map_err(|e| VaultError::Transport(e.to_string()))
    }
}

// Shikimori API response types

#[derive(Deserialize)]
#[serde(untagged)]
enum ShId {
    Number(u64),
    Text(String),
}

impl From<ShId> for String {
    fn from(id: ShId) -> Self {
        match id {
            ShId::Number(n) => n.to_string(),
            ShId::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
struct ShImage {
    original: String,
}

#[derive(Deserialize)]
struct ShAnime {
    id: ShId,
    name: String,
    image: ShImage,
    kind: Option<String>,
    #[serde(default)]
    episodes: u32,
    #[serde(default)]
    episodes_aired: u32,
    score: String,
}

impl From<ShAnime> for CatalogItem {
    fn from(a: ShAnime) -> Self {
        CatalogItem {
            id: a.id.into(),
            name: a.name,
            image: ImageRef {
                original: a.image.original,
            },
            kind: a.kind.filter(|k| !k.is_empty()),
            episodes: a.episodes,
            episodes_aired: a.episodes_aired,
            score: a.score,
        }
    }
}

fn parse_page(body: &str) -> Result<Vec<CatalogItem>> {
    let animes: Vec<ShAnime> =
        serde_json::from_str(body).map_err(|e| VaultError::Decode(e.to_string()))?;
    Ok(animes.into_iter().map(CatalogItem::from).collect())
}

#[async_trait]
impl Catalog for Shikimori {
    fn name(&self) -> &str {
        "Shikimori"
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn image_url(&self, item: &CatalogItem) -> String {
        format!("{}{}", self.host, item.image.original)
    }

    fn web_url(&self, item: &CatalogItem) -> String {
        format!("{}/animes/{}", self.host, item.id)
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<CatalogItem>> {
        let url = self.page_url(page);
        tracing::debug!(%url, "fetching catalog page");
        let body = self.get_text(&url).await?;
        parse_page(&body)
    }
}
