use regex::Regex;
use url::Url;

/// How page N of a listing is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageUrlPattern {
    /// `{listing}/{prefix}{n}`, e.g. `/alquiler/pagina3`.
    PathSegment { prefix: String },
    /// `{listing}?{name}={n}`; an existing parameter of that name is replaced.
    QueryParam { name: String },
}

/// Site-specific knowledge needed to walk a listing.
#[derive(Debug, Clone)]
pub struct PaginationStrategy {
    /// Anchors inside the pagination control.
    pub page_link_selector: String,
    /// Applied to each pagination href; capture group 1 is the page number.
    pub page_number: Regex,
    pub page_url: PageUrlPattern,
    /// Anchors of the listing cards on a results page.
    pub card_selector: String,
}

/// A search/listing URL together with its pagination strategy.
#[derive(Debug, Clone)]
pub struct ListingSource {
    url: String,
    strategy: PaginationStrategy,
}

impl ListingSource {
    pub fn new(url: impl Into<String>, strategy: PaginationStrategy) -> Self {
        Self {
            url: url.into(),
            strategy,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn strategy(&self) -> &PaginationStrategy {
        &self.strategy
    }

    /// URL of 1-based page `page`.
    pub fn page_url(&self, page: u32) -> String {
        match &self.strategy.page_url {
            PageUrlPattern::PathSegment { prefix } => {
                format!("{}/{}{}", self.url.trim_end_matches('/'), prefix, page)
            }
            PageUrlPattern::QueryParam { name } => match Url::parse(&self.url) {
                Ok(mut url) => {
                    let kept: Vec<(String, String)> = url
                        .query_pairs()
                        .filter(|(key, _)| key != name.as_str())
                        .map(|(key, value)| (key.into_owned(), value.into_owned()))
                        .collect();
                    url.query_pairs_mut()
                        .clear()
                        .extend_pairs(kept)
                        .append_pair(name, &page.to_string());
                    url.into()
                }
                Err(_) => {
                    let sep = if self.url.contains('?') { '&' } else { '?' };
                    format!("{}{}{}={}", self.url, sep, name, page)
                }
            },
        }
    }

    /// Page number encoded in a pagination href, if any.
    pub fn page_number(&self, href: &str) -> Option<u32> {
        self.strategy
            .page_number
            .captures(href)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Highest page number among `hrefs`, or 1 when none encode one.
    ///
    /// The maximum is used rather than the link count: the control may skip
    /// intermediate pages, and the last page is what bounds iteration.
    pub fn page_count<'a>(&self, hrefs: impl IntoIterator<Item = &'a str>) -> u32 {
        hrefs
            .into_iter()
            .filter_map(|href| self.page_number(href))
            .max()
            .unwrap_or(1)
            .max(1)
    }
}
