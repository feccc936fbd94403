use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use harvest_logging::{harvest_error, harvest_info, harvest_warn};
use harvester_core::{
    update, Effect, ExtractionFailure, FailureStage, HarvestResult, HarvestState, ItemUrl,
    ListingSource, Msg, Record,
};

use crate::export::SinkError;
use crate::extract::{ExtractError, RecordExtractor};
use crate::paginate::ListingPaginator;
use crate::render::{Readiness, Renderer};
use crate::retry::{with_retries, RetryError, RetryPolicy};
use crate::{HarvestEvent, NoProgress, ProgressSink, RenderError};

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Bound on each navigation including its readiness wait.
    pub navigation_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

impl HarvestSettings {
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Failures that end a listing source's run.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// The listing itself could not be loaded.
    #[error("cannot start harvest of {url}: {cause}")]
    Setup { url: String, cause: RenderError },
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Drives one listing source through pagination, de-duplication and
/// extraction, one page at a time.
pub struct Harvester {
    renderer: Arc<dyn Renderer>,
    extractor: Arc<dyn RecordExtractor>,
    paginator: ListingPaginator,
    settings: HarvestSettings,
    progress: Arc<dyn ProgressSink>,
}

impl Harvester {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        extractor: Arc<dyn RecordExtractor>,
        settings: HarvestSettings,
    ) -> Self {
        Self {
            paginator: ListingPaginator::new(renderer.clone(), settings.navigation_timeout),
            renderer,
            extractor,
            settings,
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Harvests `source`. Page and item failures are recorded in the
    /// result; only a listing that cannot be loaded at all is an error.
    pub async fn run(&self, source: &ListingSource) -> Result<HarvestResult, HarvestError> {
        harvest_info!("Harvesting {} ({})", source.url(), self.extractor.site());
        let mut state = HarvestState::new(source.url());
        let mut pending = VecDeque::new();

        let (next, effects) = update(state, Msg::Start);
        state = next;
        pending.extend(effects);

        while let Some(effect) = pending.pop_front() {
            let Some(msg) = self.execute(source, effect).await? else {
                continue;
            };
            let (next, effects) = update(state, msg);
            state = next;
            pending.extend(effects);
        }

        let result = state.into_result();
        let stats = &result.stats;
        harvest_info!(
            "{}: {} of {} item(s) extracted, {} failed; {} page(s), {} failed, {} empty; {} duplicate and {} rejected URL(s)",
            result.source_url,
            stats.succeeded,
            stats.attempted,
            stats.failed,
            stats.pages_total,
            stats.pages_failed,
            stats.pages_empty,
            stats.urls_duplicate,
            stats.urls_rejected
        );
        Ok(result)
    }

    async fn execute(
        &self,
        source: &ListingSource,
        effect: Effect,
    ) -> Result<Option<Msg>, HarvestError> {
        let msg = match effect {
            Effect::ResolvePageCount => {
                let pages = self.paginator.page_count(source).await.map_err(|cause| {
                    harvest_error!("Cannot load listing {}: {}", source.url(), cause);
                    HarvestError::Setup {
                        url: source.url().to_string(),
                        cause,
                    }
                })?;
                harvest_info!("{}: {} page(s)", source.url(), pages);
                self.progress.emit(HarvestEvent::PageCount {
                    source: source.url().to_string(),
                    pages,
                });
                Some(Msg::PageCountResolved(pages))
            }
            Effect::ScanPage { page } => match self.paginator.item_urls(source, page).await {
                Ok(urls) => {
                    if urls.is_empty() {
                        harvest_warn!("{}: page {} has no listings", source.url(), page);
                    } else {
                        harvest_info!("{}: page {} has {} listing(s)", source.url(), page, urls.len());
                    }
                    self.progress.emit(HarvestEvent::PageScanned {
                        page,
                        urls: urls.len(),
                    });
                    Some(Msg::PageScanned { page, urls })
                }
                Err(failure) => {
                    harvest_warn!("Skipping {}", failure);
                    let cause = failure.to_string();
                    self.progress.emit(HarvestEvent::PageFailed {
                        page,
                        cause: cause.clone(),
                    });
                    Some(Msg::PageFailed { page, cause })
                }
            },
            Effect::UrlRejected { url, reason } => {
                harvest_info!("Skipping {}: {}", url, reason);
                self.progress.emit(HarvestEvent::UrlRejected { url, reason });
                None
            }
            Effect::ExtractItem { url } => match self.extract(&url).await {
                Ok(record) => {
                    self.progress.emit(HarvestEvent::ItemExtracted { url });
                    Some(Msg::ItemExtracted(record))
                }
                Err(failure) => {
                    harvest_error!("Giving up on {}", failure);
                    self.progress.emit(HarvestEvent::ItemFailed(failure.clone()));
                    Some(Msg::ItemFailed(failure))
                }
            },
            Effect::Finish => None,
        };
        Ok(msg)
    }

    /// Extracts one detail page, retrying with a fresh page each attempt.
    pub async fn extract(&self, url: &ItemUrl) -> Result<Record, ExtractionFailure> {
        harvest_info!("Extracting {}", url);
        let readiness = self.extractor.readiness();
        let readiness = &readiness;

        let outcome = with_retries(
            self.settings.retry,
            move |_| self.attempt(url, readiness),
            |attempt, err: &AttemptError| {
                harvest_warn!("Attempt {} for {} failed: {}", attempt, url, err);
            },
        )
        .await;

        outcome.map_err(|RetryError { attempts, last }| ExtractionFailure {
            url: url.clone(),
            stage: last.stage(),
            attempts,
            cause: last.to_string(),
        })
    }

    async fn attempt(&self, url: &ItemUrl, readiness: &Readiness) -> Result<Record, AttemptError> {
        let mut page = self
            .renderer
            .open_page()
            .await
            .map_err(AttemptError::Navigate)?;
        page.navigate(url.as_str(), readiness, self.settings.navigation_timeout)
            .await
            .map_err(AttemptError::Navigate)?;
        self.extractor
            .extract(page.as_ref(), url)
            .map_err(AttemptError::Extract)
    }
}

#[derive(Debug)]
enum AttemptError {
    Navigate(RenderError),
    Extract(ExtractError),
}

impl AttemptError {
    fn stage(&self) -> FailureStage {
        match self {
            AttemptError::Navigate(_) => FailureStage::Navigate,
            AttemptError::Extract(_) => FailureStage::Extract,
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Navigate(err) => write!(f, "{err}"),
            AttemptError::Extract(err) => write!(f, "{err}"),
        }
    }
}
