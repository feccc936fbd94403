use std::collections::HashSet;

use crate::{ItemUrl, RejectReason};

/// Result of offering a URL to the [`Frontier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    Duplicate,
    Rejected(RejectReason),
}

/// De-duplicating working set of discovered item URLs.
///
/// Keeps first-seen order. Nothing is removed except by [`Frontier::drain`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontier {
    seen: HashSet<ItemUrl>,
    order: Vec<ItemUrl>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, raw: &str) -> AddOutcome {
        let url = match ItemUrl::parse(raw) {
            Ok(url) => url,
            Err(reason) => return AddOutcome::Rejected(reason),
        };
        if self.seen.contains(&url) {
            return AddOutcome::Duplicate;
        }
        self.seen.insert(url.clone());
        self.order.push(url);
        AddOutcome::Inserted
    }

    pub fn size(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Hands out every distinct URL seen so far, in first-seen order.
    ///
    /// URLs already drained still count as seen: offering one again reports
    /// [`AddOutcome::Duplicate`], so an item is never extracted twice.
    pub fn drain(&mut self) -> Vec<ItemUrl> {
        std::mem::take(&mut self.order)
    }
}
