mod common;

use std::time::Duration;

use common::{init_logging, DetailPage, ScriptedFetcher};
use harvester_core::{FieldValue, ItemUrl, Price, Record, TransactionType, PRICE_ON_REQUEST};
use harvester_engine::sites::infocasas::AMENITIES_FIELD;
use harvester_engine::sites::InfocasasExtractor;
use harvester_engine::{ExtractError, FailureKind, RecordExtractor, Renderer, StaticRenderer};
use pretty_assertions::assert_eq;

const ITEM: &str = "https://listing.test/inmueble/191";

async fn extract(page: &DetailPage) -> Result<Record, ExtractError> {
    init_logging();
    let renderer = StaticRenderer::new(ScriptedFetcher::new().page(ITEM, page.render()));
    let extractor = InfocasasExtractor::new();
    let mut handle = renderer.open_page().await.unwrap();
    handle
        .navigate(ITEM, &extractor.readiness(), Duration::from_secs(5))
        .await
        .unwrap();
    extractor.extract(handle.as_ref(), &ItemUrl::parse(ITEM).unwrap())
}

#[tokio::test]
async fn full_page_yields_every_canonical_field() {
    let record = extract(&DetailPage::default()).await.unwrap();

    assert_eq!(record.url.as_str(), ITEM);
    assert_eq!(record.name, "Departamento amoblado en Equipetrol");
    assert_eq!(record.description, "Amplio departamento con vista a la ciudad.");
    assert_eq!(record.address, "Equipetrol, Santa Cruz de la Sierra");
    assert_eq!(record.price, Price::Listed("US$ 650".into()));
    assert_eq!(record.area, "95 m²");
    assert_eq!(record.property_type, "Departamento");
    assert_eq!(record.transaction_type, TransactionType::Rent);
    assert_eq!(record.latitude, "-17.7712");
    assert_eq!(record.longitude, "-63.1957");
    assert_eq!(record.details.get("Dormitorios"), Some("2"));
    assert_eq!(record.details.len(), 3);
    assert_eq!(
        record.extras.get(AMENITIES_FIELD),
        Some(&FieldValue::List(vec!["Piscina".into(), "Gimnasio".into()]))
    );
}

#[tokio::test]
async fn missing_price_becomes_sentinel() {
    let page = DetailPage {
        price: None,
        ..DetailPage::default()
    };
    let record = extract(&page).await.unwrap();
    assert_eq!(record.price, Price::OnRequest);
    assert_eq!(record.price.as_str(), PRICE_ON_REQUEST);

    let blank = DetailPage {
        price: Some("   ".into()),
        ..DetailPage::default()
    };
    assert_eq!(extract(&blank).await.unwrap().price.as_str(), PRICE_ON_REQUEST);
}

#[tokio::test]
async fn transaction_type_defaults_to_rent() {
    let missing = DetailPage {
        operation: None,
        ..DetailPage::default()
    };
    assert_eq!(
        extract(&missing).await.unwrap().transaction_type,
        TransactionType::Rent
    );

    let sale = DetailPage {
        operation: Some("Venta".into()),
        ..DetailPage::default()
    };
    assert_eq!(
        extract(&sale).await.unwrap().transaction_type,
        TransactionType::Sale
    );
}

#[tokio::test]
async fn name_falls_back_to_structured_data_then_meta() {
    let no_heading = DetailPage {
        title: None,
        ..DetailPage::default()
    };
    assert_eq!(extract(&no_heading).await.unwrap().name, "Departamento LD");

    let meta_only = DetailPage {
        title: None,
        ld_json: Some(r#"{"@type":"RentAction","object":{"geo":{"latitude":1,"longitude":2}}}"#.into()),
        ..DetailPage::default()
    };
    let record = extract(&meta_only).await.unwrap();
    assert_eq!(record.name, "Departamento en alquiler | Infocasas");
    assert_eq!(record.latitude, "1");

    let nothing = DetailPage {
        title: None,
        og_title: None,
        ld_json: None,
        ..DetailPage::default()
    };
    assert_eq!(extract(&nothing).await.unwrap().name, "");
}

#[tokio::test]
async fn description_falls_back_in_order() {
    let no_selector = DetailPage {
        description: None,
        ..DetailPage::default()
    };
    assert_eq!(
        extract(&no_selector).await.unwrap().description,
        "Descripcion LD"
    );

    let meta_only = DetailPage {
        description: None,
        ld_json: None,
        ..DetailPage::default()
    };
    assert_eq!(
        extract(&meta_only).await.unwrap().description,
        "Departamento en Equipetrol"
    );
}

#[tokio::test]
async fn malformed_structured_data_is_ignored() {
    let page = DetailPage {
        ld_json: Some("{ \"object\": ".into()),
        ..DetailPage::default()
    };
    let record = extract(&page).await.unwrap();
    assert_eq!(record.latitude, "");
    assert_eq!(record.longitude, "");
    assert!(record.extras.is_empty());
    assert_eq!(record.name, "Departamento amoblado en Equipetrol");
}

#[tokio::test]
async fn area_needs_three_summary_spans() {
    let page = DetailPage {
        summary: vec!["2 Dorm.".into(), "2 Baños".into()],
        ..DetailPage::default()
    };
    assert_eq!(extract(&page).await.unwrap().area, "");
}

#[tokio::test]
async fn extraction_is_idempotent() {
    let page = DetailPage::default();
    let first = extract(&page).await.unwrap();
    let second = extract(&page).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn page_without_listing_data_is_no_content() {
    // An empty technical sheet satisfies readiness but carries no data.
    let html = DetailPage::bare()
        .render()
        .replace("<body>", r#"<body><div class="technical-sheet"></div>"#);
    init_logging();
    let renderer = StaticRenderer::new(ScriptedFetcher::new().page(ITEM, html));
    let extractor = InfocasasExtractor::new();
    let mut handle = renderer.open_page().await.unwrap();
    handle
        .navigate(ITEM, &extractor.readiness(), Duration::from_secs(5))
        .await
        .unwrap();
    let err = extractor
        .extract(handle.as_ref(), &ItemUrl::parse(ITEM).unwrap())
        .unwrap_err();
    assert_eq!(err, ExtractError::NoContent);
}

#[tokio::test]
async fn detail_page_without_readiness_signal_is_not_ready() {
    init_logging();
    let renderer = StaticRenderer::new(
        ScriptedFetcher::new().page(ITEM, "<html><body><p>Cargando...</p></body></html>"),
    );
    let extractor = InfocasasExtractor::new();
    let mut handle = renderer.open_page().await.unwrap();
    let err = handle
        .navigate(ITEM, &extractor.readiness(), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NotReady);
    assert!(err.is_timeout());
}
