use std::time::Instant;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::types::{CatalogItem, RenderUnit};

/// Fetch one catalog page and turn it into cards, in the order the catalog returned them.
/// Errors are passed through as-is.
pub async fn load_page(catalog: &dyn Catalog, page: u32) -> Result<Vec<RenderUnit>> {
    let items = catalog.fetch_page(page).await?;
    tracing::debug!(page, count = items.len(), "catalog page loaded");
    Ok(into_render_units(items, Instant::now()))
}

pub fn into_render_units(items: Vec<CatalogItem>, loaded_at: Instant) -> Vec<RenderUnit> {
    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| RenderUnit::new(item, position, loaded_at))
        .collect()
}
