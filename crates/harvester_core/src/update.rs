use crate::{AddOutcome, Effect, HarvestState, Msg, Phase};

/// Pure update function: applies a message to state and returns any effects.
///
/// The driver executes the effects in order and feeds each outcome back as a
/// message. Messages that do not belong to the current phase are ignored.
pub fn update(mut state: HarvestState, msg: Msg) -> (HarvestState, Vec<Effect>) {
    let effects = match (state.phase(), msg) {
        (Phase::Init, Msg::Start) => vec![Effect::ResolvePageCount],
        (Phase::Init, Msg::PageCountResolved(count)) => {
            state.stats_mut().pages_total = count.max(1);
            state.set_phase(Phase::Paginating);
            scan_next(&mut state)
        }
        (Phase::Paginating, Msg::PageScanned { page: _, urls }) => {
            let mut effects = offer_urls(&mut state, urls);
            effects.extend(scan_next(&mut state));
            effects
        }
        (Phase::Paginating, Msg::PageFailed { .. }) => {
            state.stats_mut().pages_failed += 1;
            scan_next(&mut state)
        }
        (Phase::Extracting, Msg::ItemExtracted(record)) => {
            state.stats_mut().succeeded += 1;
            state.push_record(record);
            next_item(&mut state)
        }
        (Phase::Extracting, Msg::ItemFailed(failure)) => {
            state.stats_mut().failed += 1;
            state.push_failure(failure);
            next_item(&mut state)
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn offer_urls(state: &mut HarvestState, urls: Vec<String>) -> Vec<Effect> {
    let stats = state.stats_mut();
    stats.pages_scanned += 1;
    if urls.is_empty() {
        stats.pages_empty += 1;
    }

    let mut effects = Vec::new();
    for url in urls {
        match state.frontier_mut().add(&url) {
            AddOutcome::Inserted => state.stats_mut().urls_discovered += 1,
            AddOutcome::Duplicate => state.stats_mut().urls_duplicate += 1,
            AddOutcome::Rejected(reason) => {
                state.stats_mut().urls_rejected += 1;
                effects.push(Effect::UrlRejected { url, reason });
            }
        }
    }
    effects
}

/// Pages are visited 1..=pages_total in order, including pages the
/// pagination control did not link to.
fn scan_next(state: &mut HarvestState) -> Vec<Effect> {
    match state.take_next_page() {
        Some(page) => vec![Effect::ScanPage { page }],
        None => {
            state.set_phase(Phase::Frontiering);
            state.queue_drained_frontier();
            state.set_phase(Phase::Extracting);
            next_item(state)
        }
    }
}

fn next_item(state: &mut HarvestState) -> Vec<Effect> {
    match state.pop_pending() {
        Some(url) => {
            state.stats_mut().attempted += 1;
            vec![Effect::ExtractItem { url }]
        }
        None => {
            state.set_phase(Phase::Done);
            vec![Effect::Finish]
        }
    }
}
