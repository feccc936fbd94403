use std::fmt;

use url::{Host, Url};

/// Absolute URL of a single listing's detail page.
///
/// Equality is exact string equality: no trailing-slash or query
/// normalisation happens here. Whatever normalisation the renderer applied
/// when resolving the anchor is the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemUrl(String);

/// Why a discovered URL was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Not an absolute http(s) URL.
    Invalid,
    /// The host is a bare IP address (CDN or staging artifact).
    IpHost,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Invalid => write!(f, "not an absolute http(s) url"),
            RejectReason::IpHost => write!(f, "ip address host"),
        }
    }
}

impl ItemUrl {
    /// Validates `raw` as an item URL. Surrounding whitespace is dropped;
    /// nothing else about the string is changed.
    pub fn parse(raw: &str) -> Result<Self, RejectReason> {
        let trimmed = raw.trim();
        let parsed = Url::parse(trimmed).map_err(|_| RejectReason::Invalid)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RejectReason::Invalid);
        }
        match parsed.host() {
            Some(Host::Domain(_)) => Ok(Self(trimmed.to_string())),
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => Err(RejectReason::IpHost),
            None => Err(RejectReason::Invalid),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
