//! Flattening of [`Record`]s into uniform rows for tabular export.
//!
//! Canonical fields come first in a fixed order, then the raw characteristics
//! in label order, then the composite extras. Lists are joined with
//! [`LIST_DELIMITER`]; maps become `key: value` pairs joined the same way.
//! The same record always flattens to the same row.

use std::collections::HashSet;

use crate::{FieldValue, Record};

pub const LIST_DELIMITER: &str = "; ";
pub const PAIR_SEPARATOR: &str = ": ";

/// Canonical columns as `(header, key)`.
pub const CANONICAL_COLUMNS: [(&str, &str); 10] = [
    ("URL", "url"),
    ("Name", "name"),
    ("Description", "description"),
    ("Address", "address"),
    ("Price", "price"),
    ("Property Type", "propertyType"),
    ("Area", "area"),
    ("Transaction Type", "transactionType"),
    ("Latitude", "latitude"),
    ("Longitude", "longitude"),
];

/// A flat, ordered `key -> cell` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Column header and the row key it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub header: String,
    pub key: String,
}

impl Column {
    pub fn new(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            key: key.into(),
        }
    }
}

pub fn flatten(record: &Record) -> Row {
    let mut builder = RowBuilder::default();

    let canonical = [
        record.url.as_str(),
        record.name.as_str(),
        record.description.as_str(),
        record.address.as_str(),
        record.price.as_str(),
        record.property_type.as_str(),
        record.area.as_str(),
        record.transaction_type.as_str(),
        record.latitude.as_str(),
        record.longitude.as_str(),
    ];
    for ((_, key), value) in CANONICAL_COLUMNS.iter().zip(canonical) {
        builder.push(key, value.to_string(), "");
    }

    for (label, value) in record.details.iter() {
        builder.push(label, value.to_string(), "detail");
    }

    for (name, value) in &record.extras {
        builder.push(name, flatten_value(value), "extra");
    }

    builder.finish()
}

pub fn flatten_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::List(items) => items.join(LIST_DELIMITER),
        FieldValue::Map(pairs) => pairs
            .iter()
            .map(|(k, v)| format!("{k}{PAIR_SEPARATOR}{v}"))
            .collect::<Vec<_>>()
            .join(LIST_DELIMITER),
    }
}

/// Canonical columns followed by every other key in first-seen order.
pub fn columns_for(rows: &[Row]) -> Vec<Column> {
    let mut columns: Vec<Column> = CANONICAL_COLUMNS
        .iter()
        .map(|(header, key)| Column::new(*header, *key))
        .collect();
    let mut known: HashSet<String> = columns.iter().map(|c| c.key.clone()).collect();

    for row in rows {
        for key in row.keys() {
            if known.insert(key.to_string()) {
                columns.push(Column::new(key, key));
            }
        }
    }
    columns
}

#[derive(Default)]
struct RowBuilder {
    cells: Vec<(String, String)>,
    taken: HashSet<String>,
}

impl RowBuilder {
    /// Adds a cell. Keys that clash with a canonical column (by key or
    /// header, case-insensitively) or with an earlier cell are renamed
    /// `"{key} ({origin})"`, so canonical values always win and nothing is
    /// overwritten.
    fn push(&mut self, key: &str, value: String, origin: &str) {
        let mut candidate = key.to_string();
        if !origin.is_empty() && self.clashes(&candidate) {
            candidate = format!("{key} ({origin})");
            let mut n = 2;
            while self.clashes(&candidate) {
                candidate = format!("{key} ({origin} {n})");
                n += 1;
            }
        }
        self.taken.insert(candidate.to_lowercase());
        self.cells.push((candidate, value));
    }

    fn clashes(&self, key: &str) -> bool {
        let lower = key.to_lowercase();
        self.taken.contains(&lower)
            || CANONICAL_COLUMNS
                .iter()
                .any(|(header, canonical)| header.to_lowercase() == lower || canonical.to_lowercase() == lower)
    }

    fn finish(self) -> Row {
        Row { cells: self.cells }
    }
}
