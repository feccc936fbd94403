use std::collections::VecDeque;
use std::fmt;

use crate::{Frontier, ItemUrl, Record};

/// Phases of a single listing harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Init,
    Paginating,
    Frontiering,
    Extracting,
    Done,
}

/// Where an item's last attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Navigate,
    Extract,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Navigate => write!(f, "navigate"),
            FailureStage::Extract => write!(f, "extract"),
        }
    }
}

/// An item that still failed after every retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    pub url: ItemUrl,
    pub stage: FailureStage,
    pub attempts: u32,
    pub cause: String,
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed at {} after {} attempt(s): {}",
            self.url, self.stage, self.attempts, self.cause
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestStats {
    pub pages_total: u32,
    pub pages_scanned: u32,
    pub pages_failed: u32,
    pub pages_empty: u32,
    pub urls_discovered: usize,
    pub urls_duplicate: usize,
    pub urls_rejected: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Records of one harvest run in discovery order, plus what went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestResult {
    pub source_url: String,
    pub records: Vec<Record>,
    pub failures: Vec<ExtractionFailure>,
    pub stats: HarvestStats,
}

impl HarvestResult {
    pub fn attempted(&self) -> usize {
        self.stats.attempted
    }

    pub fn succeeded(&self) -> usize {
        self.stats.succeeded
    }
}

/// State of one harvest. Owned by the driver for the duration of a run and
/// advanced only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestState {
    source_url: String,
    phase: Phase,
    /// `None` once the last representable page has been handed out.
    next_page: Option<u32>,
    frontier: Frontier,
    pending: VecDeque<ItemUrl>,
    records: Vec<Record>,
    failures: Vec<ExtractionFailure>,
    stats: HarvestStats,
}

impl HarvestState {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            phase: Phase::Init,
            next_page: Some(1),
            frontier: Frontier::new(),
            pending: VecDeque::new(),
            records: Vec::new(),
            failures: Vec::new(),
            stats: HarvestStats::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &HarvestStats {
        &self.stats
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn failures(&self) -> &[ExtractionFailure] {
        &self.failures
    }

    pub fn into_result(self) -> HarvestResult {
        HarvestResult {
            source_url: self.source_url,
            records: self.records,
            failures: self.failures,
            stats: self.stats,
        }
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn stats_mut(&mut self) -> &mut HarvestStats {
        &mut self.stats
    }

    pub(crate) fn frontier_mut(&mut self) -> &mut Frontier {
        &mut self.frontier
    }

    /// Returns the page to scan next and advances the cursor.
    pub(crate) fn take_next_page(&mut self) -> Option<u32> {
        let page = self
            .next_page
            .filter(|page| *page <= self.stats.pages_total)?;
        self.next_page = page.checked_add(1);
        Some(page)
    }

    pub(crate) fn queue_drained_frontier(&mut self) {
        let urls = self.frontier.drain();
        self.pending.extend(urls);
    }

    pub(crate) fn pop_pending(&mut self) -> Option<ItemUrl> {
        self.pending.pop_front()
    }

    pub(crate) fn push_record(&mut self, record: Record) {
        self.records.push(record);
    }

    pub(crate) fn push_failure(&mut self, failure: ExtractionFailure) {
        self.failures.push(failure);
    }
}
