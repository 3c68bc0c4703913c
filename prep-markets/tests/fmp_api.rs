use prep_markets::{FmpClient, MarketsError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> FmpClient {
    FmpClient::with_base_url("demo-key".to_string(), &format!("{}/api/v3/", server.uri()))
        .unwrap()
}

#[tokio::test]
async fn search_returns_best_matching_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/search"))
        .and(query_param("query", "Volkswagen"))
        .and(query_param("limit", "1"))
        .and(query_param("apikey", "demo-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "symbol": "VWAGY", "name": "Volkswagen AG", "stockExchange": "OTC" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let symbol = client_for(&server)
        .search_ticker("Volkswagen")
        .await
        .unwrap();

    assert_eq!(symbol.as_deref(), Some("VWAGY"));
}

#[tokio::test]
async fn search_with_no_hits_is_none_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let symbol = client_for(&server)
        .search_ticker("Family Bakery")
        .await
        .unwrap();

    assert!(symbol.is_none());
}

#[tokio::test]
async fn profile_uppercases_the_symbol_and_unwraps_the_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/profile/VWAGY"))
        .and(query_param("apikey", "demo-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "companyName": "Volkswagen AG",
                "mktCap": 60000000000u64,
                "ceo": "",
                "description": "An automaker."
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let profile = client_for(&server).profile("vwagy").await.unwrap();

    assert_eq!(profile.description(), Some("An automaker."));
    let fields = profile.fields();
    assert!(fields.contains(&("companyName".to_string(), "Volkswagen AG".to_string())));
    assert!(fields.iter().all(|(k, _)| k != "ceo"));
}

#[tokio::test]
async fn empty_profile_payload_is_unknown_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/profile/NOPE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = client_for(&server).profile("nope").await.unwrap_err();

    match err {
        MarketsError::UnknownSymbol(sym) => assert_eq!(sym, "NOPE"),
        other => panic!("expected UnknownSymbol, got {other:?}"),
    }
}

#[tokio::test]
async fn upstream_failure_is_a_markets_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/profile/VWAGY"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "invalid api key"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).profile("VWAGY").await.unwrap_err();

    match err {
        MarketsError::Http(inner) => assert!(inner.to_string().contains("invalid api key")),
        other => panic!("expected Http, got {other:?}"),
    }
}
