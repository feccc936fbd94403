use url::Url;

use crate::render::Element;

/// Absolute targets of the `href`s on `anchors`, in document order.
///
/// Relative references are resolved against `base`; fragments, bare query
/// strings and `javascript:` links are skipped. Duplicates are kept: the
/// frontier decides what is new.
pub fn anchor_urls(anchors: &[Element], base: &str) -> Vec<String> {
    let base = Url::parse(base).ok();
    anchors
        .iter()
        .filter_map(|anchor| anchor.attr("href"))
        .filter_map(|href| resolve_url(href, base.as_ref()))
        .map(String::from)
        .collect()
}

pub(crate) fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}
