use std::collections::BTreeMap;
use std::fmt;

use crate::ItemUrl;

/// Sentinel written when a listing shows no price. Downstream consumers treat
/// it differently from an empty cell.
pub const PRICE_ON_REQUEST: &str = "ask";

/// Canonical price field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Price {
    Listed(String),
    OnRequest,
}

impl Price {
    /// Blank or missing price text becomes [`Price::OnRequest`].
    pub fn from_text(text: Option<&str>) -> Self {
        match text.map(str::trim) {
            Some(t) if !t.is_empty() => Price::Listed(t.to_string()),
            _ => Price::OnRequest,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Price::Listed(text) => text,
            Price::OnRequest => PRICE_ON_REQUEST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Sale,
    Rent,
}

impl TransactionType {
    /// `Sale` when `text` contains `sale_marker`, otherwise `Rent`.
    ///
    /// A missing marker element also resolves to `Rent`.
    pub fn from_marker(text: Option<&str>, sale_marker: &str) -> Self {
        match text {
            Some(t) if t.contains(sale_marker) => TransactionType::Sale,
            _ => TransactionType::Rent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Sale => "sale",
            TransactionType::Rent => "rent",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label/value pairs scraped from a detail page's characteristics region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFieldSet(BTreeMap<String, String>);

impl RawFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pair with the label and value trimmed. Pairs where either
    /// side is blank are ignored. A repeated label keeps the last value.
    pub fn insert(&mut self, label: &str, value: &str) -> bool {
        let label = label.trim();
        let value = value.trim();
        if label.is_empty() || value.is_empty() {
            return false;
        }
        self.0.insert(label.to_string(), value.to_string());
        true
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for RawFieldSet {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut set = RawFieldSet::new();
        for (label, value) in iter {
            set.insert(label, value);
        }
        set
    }
}

/// Composite value carried alongside the canonical fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

/// Normalised output of one detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub url: ItemUrl,
    pub name: String,
    pub description: String,
    pub address: String,
    pub price: Price,
    pub area: String,
    pub property_type: String,
    pub transaction_type: TransactionType,
    pub latitude: String,
    pub longitude: String,
    /// Characteristics region, merged in as extra columns on export.
    pub details: RawFieldSet,
    /// Site-specific composite fields (amenity lists and the like).
    pub extras: BTreeMap<String, FieldValue>,
}

impl Record {
    /// A record with every canonical field at its "known absent" value.
    pub fn empty(url: ItemUrl) -> Self {
        Self {
            url,
            name: String::new(),
            description: String::new(),
            address: String::new(),
            price: Price::OnRequest,
            area: String::new(),
            property_type: String::new(),
            transaction_type: TransactionType::Rent,
            latitude: String::new(),
            longitude: String::new(),
            details: RawFieldSet::new(),
            extras: BTreeMap::new(),
        }
    }
}
