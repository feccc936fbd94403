//! infocasas.com.bo listings.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use harvester_core::{
    FieldValue, ItemUrl, ListingSource, PageUrlPattern, PaginationStrategy, Price, RawFieldSet,
    Record, TransactionType,
};
use regex::Regex;

use crate::extract::{
    meta_content, non_empty, text_of, ExtractError, RecordExtractor, StructuredData,
    LD_JSON_SELECTOR,
};
use crate::render::{PageHandle, Readiness};
use crate::RenderError;

const PAGE_LINKS: &str = "ul.search-results-pagination li a.ant-pagination-item-link";
const LISTING_CARDS: &str = "a.lc-cardCover";

const TITLE: &str = "h1";
const OG_TITLE: &str = r#"meta[property="og:title"]"#;
const DESCRIPTION: &str = ".ant-typography.property-description";
const OG_DESCRIPTION: &str = r#"meta[property="og:description"]"#;
const META_DESCRIPTION: &str = r#"meta[name="description"]"#;
const LOCATION_PARTS: &str = ".property-location-tag p";
const PRICE: &str = ".ant-typography.price strong";
const OPERATION_TYPE: &str = ".ant-typography.ant-typography-secondary.operation_type";
const SUMMARY_SPANS: &str =
    "span.ant-typography.ant-typography-ellipsis.ant-typography-ellipsis-single-line";
const TECHNICAL_ROWS: &str = ".technical-sheet .ant-row";
const ROW_LABEL: &str = ".ant-space-item span.ant-typography:not(.ant-typography-secondary)";
const ROW_VALUE: &str = "strong";
const ROW_VALUE_FALLBACK: &str = "span:not(.ant-typography-secondary)";

const SALE_MARKER: &str = "Venta";
const PROPERTY_TYPE_LABEL: &str = "Tipo de Propiedad";
/// Position of the floor area among the summary spans.
const AREA_SPAN_INDEX: usize = 2;
pub const AMENITIES_FIELD: &str = "Amenities";

static PAGE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pagina(\d+)").expect("valid page number pattern"));

/// Listing at `url`, paged as `{url}/pagina{n}`.
pub fn listing_source(url: &str) -> ListingSource {
    ListingSource::new(
        url,
        PaginationStrategy {
            page_link_selector: PAGE_LINKS.to_string(),
            page_number: PAGE_NUMBER.clone(),
            page_url: PageUrlPattern::PathSegment {
                prefix: "pagina".to_string(),
            },
            card_selector: LISTING_CARDS.to_string(),
        },
    )
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InfocasasExtractor;

impl InfocasasExtractor {
    pub fn new() -> Self {
        Self
    }

    fn details(&self, page: &dyn PageHandle) -> Result<RawFieldSet, RenderError> {
        let mut details = RawFieldSet::new();
        for row in page.query_all(TECHNICAL_ROWS)? {
            let Some(label) = row.query(ROW_LABEL)? else {
                continue;
            };
            let value = match row.query(ROW_VALUE)? {
                Some(value) => Some(value),
                None => row.query(ROW_VALUE_FALLBACK)?,
            };
            if let Some(value) = value {
                details.insert(label.text(), value.text());
            }
        }
        Ok(details)
    }
}

impl RecordExtractor for InfocasasExtractor {
    fn site(&self) -> &str {
        "infocasas"
    }

    fn readiness(&self) -> Readiness {
        Readiness::AnyOf(vec![
            LD_JSON_SELECTOR.to_string(),
            ".technical-sheet".to_string(),
            PRICE.to_string(),
            OG_TITLE.to_string(),
        ])
    }

    fn extract(&self, page: &dyn PageHandle, url: &ItemUrl) -> Result<Record, ExtractError> {
        let data = StructuredData::from_page(page)?;
        let details = self.details(page)?;

        // Selector, then structured data, then meta tags.
        let name = match text_of(page, TITLE)? {
            Some(name) => Some(name),
            None => data.first_text(&["object.name", "name"]),
        };
        let name = match name {
            Some(name) => Some(name),
            None => meta_content(page, OG_TITLE)?,
        };

        let description = match text_of(page, DESCRIPTION)? {
            Some(description) => Some(description),
            None => data.first_text(&["object.description", "description"]),
        };
        let description = match description {
            Some(description) => Some(description),
            None => match meta_content(page, OG_DESCRIPTION)? {
                Some(description) => Some(description),
                None => meta_content(page, META_DESCRIPTION)?,
            },
        };

        let address = page
            .query_all(LOCATION_PARTS)?
            .iter()
            .filter_map(|part| non_empty(part.text()))
            .collect::<Vec<_>>()
            .join(", ");

        let price_text = text_of(page, PRICE)?;
        let operation = text_of(page, OPERATION_TYPE)?;
        let area = page
            .query_all(SUMMARY_SPANS)?
            .get(AREA_SPAN_INDEX)
            .and_then(|span| non_empty(span.text()))
            .unwrap_or_default();

        if name.is_none() && price_text.is_none() && details.is_empty() && data.is_empty() {
            return Err(ExtractError::NoContent);
        }

        let mut extras = BTreeMap::new();
        let amenities = data.names("object.amenityFeature");
        let amenities = if amenities.is_empty() {
            data.names("amenityFeature")
        } else {
            amenities
        };
        if !amenities.is_empty() {
            extras.insert(AMENITIES_FIELD.to_string(), FieldValue::List(amenities));
        }

        Ok(Record {
            url: url.clone(),
            name: name.unwrap_or_default(),
            description: description.unwrap_or_default(),
            address,
            price: Price::from_text(price_text.as_deref()),
            area,
            property_type: details
                .get(PROPERTY_TYPE_LABEL)
                .unwrap_or_default()
                .to_string(),
            transaction_type: TransactionType::from_marker(operation.as_deref(), SALE_MARKER),
            latitude: data
                .first_text(&["object.geo.latitude", "geo.latitude"])
                .unwrap_or_default(),
            longitude: data
                .first_text(&["object.geo.longitude", "geo.longitude"])
                .unwrap_or_default(),
            details,
            extras,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_pages_use_pagina_segment() {
        let source = listing_source("https://www.infocasas.com.bo/alquiler");
        assert_eq!(
            source.page_url(3),
            "https://www.infocasas.com.bo/alquiler/pagina3"
        );
        assert_eq!(
            source.page_count(["/alquiler/pagina2", "/alquiler/pagina5", "/alquiler"]),
            5
        );
    }
}
