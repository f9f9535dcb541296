//! Mock API tests for the tally HTTP client.
//!
//! These tests use wiremock to simulate the billing API and check request
//! shapes, pagination and error mapping without network access.

use std::str::FromStr;
use std::time::Duration;

use futures_util::TryStreamExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tally_core::error::DataError;
use tally_core::models::{Cadence, UnitConfig, UnitPrice};
use tally_core::{
    ApiKey, BaseUrl, CustomerCreateParams, CustomerListParams, Error, Price, PriceListParams,
    Record,
};
use tally_http::{Client, ClientOptions};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a client pointed at a mock server.
fn mock_client(server: &MockServer) -> Client {
    let base = BaseUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap();
    let options = ClientOptions::default()
        .with_base_url(base)
        .with_api_key(ApiKey::new("sk_test_123").unwrap())
        .with_timeout(Duration::from_secs(5));
    Client::new(options).unwrap()
}

fn unit_price(id: &str) -> Value {
    json!({
        "id": id,
        "model_type": "unit",
        "name": format!("Price {id}"),
        "item_id": "it_1",
        "cadence": "monthly",
        "unit_config": {"unit_amount": "0.50"}
    })
}

fn list_body(items: Vec<Value>, cursor: Option<&str>) -> Value {
    json!({
        "data": items,
        "pagination_metadata": {"has_more": cursor.is_some(), "next_cursor": cursor}
    })
}

/// Mount P1 (c1) -> P2 (c2) -> P3 (none) on `/prices` with `limit=2`.
async fn mount_three_price_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/prices"))
        .and(query_param("limit", "2"))
        .and(query_param_is_missing("cursor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body(vec![unit_price("p1"), unit_price("p2")], Some("c1"))),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .and(query_param("limit", "2"))
        .and(query_param("cursor", "c1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body(vec![unit_price("p3"), unit_price("p4")], Some("c2"))),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .and(query_param("limit", "2"))
        .and(query_param("cursor", "c2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(list_body(vec![unit_price("p5")], None)),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn limit(n: i64) -> PriceListParams {
    let mut params = PriceListParams::new();
    params.set_limit(Some(n)).unwrap();
    params
}

// ============================================================================
// Pagination Tests
// ============================================================================

#[tokio::test]
async fn test_list_prices_follows_cursors() {
    let server = MockServer::start().await;
    mount_three_price_pages(&server).await;

    let client = mock_client(&server);
    let cancel = CancellationToken::new();

    let p1 = client.prices().list(limit(2), &cancel).await.unwrap();
    assert_eq!(p1.items().len(), 2);
    assert!(p1.has_next());

    let p2 = p1.next(&cancel).await.unwrap();
    assert_eq!(p2.items()[0].id().unwrap().as_deref(), Some("p3"));
    assert!(p2.has_next());

    let p3 = p2.next(&cancel).await.unwrap();
    assert_eq!(p3.items().len(), 1);
    assert!(!p3.has_next());
    assert!(matches!(
        p3.next(&cancel).await,
        Err(Error::InvalidOperation(_))
    ));
}

#[tokio::test]
async fn test_list_prices_stream_all() {
    let server = MockServer::start().await;
    mount_three_price_pages(&server).await;

    let client = mock_client(&server);
    let cancel = CancellationToken::new();

    let first = client.prices().list(limit(2), &cancel).await.unwrap();
    let prices: Vec<Price> = first.into_items(cancel).try_collect().await.unwrap();

    let ids: Vec<String> = prices
        .iter()
        .map(|price| price.id().unwrap().unwrap())
        .collect();
    assert_eq!(ids, ["p1", "p2", "p3", "p4", "p5"]);
}

#[tokio::test]
async fn test_list_keeps_unknown_models() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(
            vec![
                unit_price("p1"),
                json!({"id": "p2", "model_type": "grouped_allocation", "name": "New"}),
            ],
            None,
        )))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let page = client
        .prices()
        .list(PriceListParams::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(page.items()[0].as_unit().is_some());
    assert!(page.items()[1].is_unknown());
    assert_eq!(page.items()[1].discriminator(), Some("grouped_allocation"));
}

#[tokio::test]
async fn test_list_with_broken_known_model_keeps_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(
            vec![
                unit_price("p1"),
                json!({"id": "p2", "model_type": "unit", "name": "broken", "item_id": "it_2"}),
            ],
            Some("c1"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let page = client
        .prices()
        .list(PriceListParams::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.items().len(), 1);
    assert_eq!(page.items()[0].id().unwrap().as_deref(), Some("p1"));
    match page.decode_error() {
        Some(err @ DataError::VariantDecode { variant, .. }) => {
            assert_eq!(*variant, "unit");
            assert_eq!(err.field(), Some("unit_config"));
        }
        other => panic!("unexpected decode error: {other:?}"),
    }
    assert!(!page.has_next());
}

#[tokio::test]
async fn test_list_customers_with_created_at_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customers"))
        .and(query_param("created_at[gte]", "2024-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(
            vec![json!({
                "id": "cus_1",
                "name": "Acme",
                "email": "billing@acme.test",
                "external_customer_id": null,
                "currency": "USD"
            })],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut range = tally_core::models::TimeRange::new();
    range.set_gte(Some("2024-01-01T00:00:00Z".parse().unwrap())).unwrap();
    let mut params = CustomerListParams::new();
    params.set_created_at(Some(range)).unwrap();

    let client = mock_client(&server);
    let page = client
        .customers()
        .list(params, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.items()[0].name().unwrap(), "Acme");
    assert!(!page.has_next());
}

// ============================================================================
// Single Resource Tests
// ============================================================================

#[tokio::test]
async fn test_get_price_sends_bearer_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices/p1"))
        .and(header("authorization", "Bearer sk_test_123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(unit_price("p1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let price = client
        .prices()
        .get("p1", &CancellationToken::new())
        .await
        .unwrap();

    let unit = price.as_unit().unwrap();
    assert_eq!(unit.item_id().unwrap(), "it_1");
    assert_eq!(
        unit.unit_config().unwrap().unit_amount().unwrap(),
        Decimal::from_str("0.50").unwrap()
    );
}

#[tokio::test]
async fn test_get_price_with_broken_known_model() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p1",
            "model_type": "unit",
            "name": "Broken",
            "item_id": "it_1"
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client
        .prices()
        .get("p1", &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::Data(err @ DataError::VariantDecode { .. }) => {
            assert_eq!(err.field(), Some("unit_config"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_create_price_posts_encoded_body() {
    let server = MockServer::start().await;

    let expected = json!({
        "name": "API calls",
        "item_id": "it_9",
        "cadence": "monthly",
        "currency": "USD",
        "unit_config": {"unit_amount": "1.25"},
        "model_type": "unit"
    });

    let mut created = expected.clone();
    created["id"] = json!("price_new");

    Mock::given(method("POST"))
        .and(path("/prices"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(201).set_body_json(&created))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = UnitConfig::new();
    config
        .set_unit_amount(Decimal::from_str("1.25").unwrap())
        .unwrap();
    let mut unit = UnitPrice::new();
    unit.set_name("API calls")
        .unwrap()
        .set_item_id("it_9")
        .unwrap()
        .set_cadence(Some(Cadence::Monthly))
        .unwrap()
        .set_currency(Some("USD".to_string()))
        .unwrap()
        .set_unit_config(config)
        .unwrap();

    let client = mock_client(&server);
    let price = client
        .prices()
        .create(&Price::from(unit), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(price.id().unwrap().as_deref(), Some("price_new"));
}

#[tokio::test]
async fn test_create_unknown_price_is_refused_locally() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let price = Price::decode(json!({"model_type": "zzz_not_real", "name": "x"})).unwrap();
    let client = mock_client(&server);
    let err = client
        .prices()
        .create(&price, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Data(DataError::UnrecognizedVariant { .. })
    ));
}

#[tokio::test]
async fn test_create_and_delete_customer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/customers"))
        .and(body_json(json!({"name": "Acme", "email": "billing@acme.test"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cus_9",
            "name": "Acme",
            "email": "billing@acme.test",
            "external_customer_id": null,
            "currency": null,
            "portal_url": "https://portal.example/cus_9"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/customers/cus_9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut params = CustomerCreateParams::new();
    params
        .set_name("Acme")
        .unwrap()
        .set_email("billing@acme.test")
        .unwrap();

    let client = mock_client(&server);
    let cancel = CancellationToken::new();
    let customer = client.customers().create(&params, &cancel).await.unwrap();
    assert_eq!(customer.id().unwrap(), "cus_9");
    assert_eq!(
        customer.raw().get("portal_url"),
        Some(&json!("https://portal.example/cus_9"))
    );

    client.customers().delete("cus_9", &cancel).await.unwrap();
}

// ============================================================================
// Error Mapping Tests
// ============================================================================

#[tokio::test]
async fn test_not_found_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customers/cus_missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "type": "https://docs.withorb.com/reference/error-responses#404-not-found",
            "status": 404,
            "title": "Resource not found",
            "detail": "Customer cus_missing does not exist"
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client
        .customers()
        .get("cus_missing", &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::Api(api) => {
            assert!(api.is_not_found());
            assert_eq!(api.title.as_deref(), Some("Resource not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client
        .prices()
        .list(PriceListParams::new(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api(ref api) if api.is_auth_error()));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client
        .prices()
        .list(PriceListParams::new(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Serialization(_)));
}

#[tokio::test]
async fn test_invalid_id_never_reaches_the_server() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    let err = client
        .prices()
        .get("../customers", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

// ============================================================================
// Cancellation Tests
// ============================================================================

#[tokio::test]
async fn test_cancel_in_flight_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body(vec![], None))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = client
        .prices()
        .list(PriceListParams::new(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_cancel_between_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .and(query_param_is_missing("cursor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body(vec![unit_price("p1")], Some("c1"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .and(query_param("cursor", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(vec![], None)))
        .expect(0)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let cancel = CancellationToken::new();

    let page = client
        .prices()
        .list(PriceListParams::new(), &cancel)
        .await
        .unwrap();
    cancel.cancel();

    assert!(matches!(page.next(&cancel).await, Err(Error::Cancelled)));
}
