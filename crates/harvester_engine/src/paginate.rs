use std::sync::Arc;
use std::time::Duration;

use harvest_logging::{harvest_debug, harvest_info};
use harvester_core::ListingSource;

use crate::links::anchor_urls;
use crate::render::{Readiness, Renderer};
use crate::RenderError;

/// A listing page that could not be loaded or read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("listing page {page} ({url}): {cause}")]
pub struct PageFailure {
    pub page: u32,
    pub url: String,
    pub cause: RenderError,
}

/// Reads the pagination control of a listing and the item links of each page.
pub struct ListingPaginator {
    renderer: Arc<dyn Renderer>,
    navigation_timeout: Duration,
}

impl ListingPaginator {
    pub fn new(renderer: Arc<dyn Renderer>, navigation_timeout: Duration) -> Self {
        Self {
            renderer,
            navigation_timeout,
        }
    }

    /// Highest page number linked from the listing's pagination control,
    /// or 1 when the listing has no control. Failing to load the listing
    /// itself is an error.
    pub async fn page_count(&self, source: &ListingSource) -> Result<u32, RenderError> {
        let mut page = self.renderer.open_page().await?;
        page.navigate(source.url(), &Readiness::Loaded, self.navigation_timeout)
            .await?;

        let links = page.query_all(&source.strategy().page_link_selector)?;
        let hrefs: Vec<&str> = links.iter().filter_map(|link| link.attr("href")).collect();
        if hrefs.is_empty() {
            harvest_info!("{}: no pagination control, single page", source.url());
        } else {
            harvest_debug!("{}: pagination links {:?}", source.url(), hrefs);
        }
        Ok(source.page_count(hrefs))
    }

    /// Absolute URLs of every listing card on 1-based page `page`.
    /// An empty page is not an error.
    pub async fn item_urls(
        &self,
        source: &ListingSource,
        page: u32,
    ) -> Result<Vec<String>, PageFailure> {
        let url = source.page_url(page);
        let fail = |cause: RenderError| PageFailure {
            page,
            url: url.clone(),
            cause,
        };

        let mut handle = self.renderer.open_page().await.map_err(fail)?;
        handle
            .navigate(&url, &Readiness::Loaded, self.navigation_timeout)
            .await
            .map_err(fail)?;
        let cards = handle
            .query_all(&source.strategy().card_selector)
            .map_err(fail)?;
        let base = handle.url().unwrap_or(url.as_str()).to_string();
        Ok(anchor_urls(&cards, &base))
    }
}
