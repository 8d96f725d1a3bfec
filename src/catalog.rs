use async_trait::async_trait;

use crate::error::Result;
use crate::types::CatalogItem;

/// A paged, read-only anime catalog
#[async_trait]
pub trait Catalog: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Items requested per page; a page shorter than this is the last one
    fn page_size(&self) -> usize;

    fn image_url(&self, item: &CatalogItem) -> String;
    fn web_url(&self, item: &CatalogItem) -> String;

    /// Fetch one page, 1-based
    async fn fetch_page(&self, page: u32) -> Result<Vec<CatalogItem>>;
}
