//! Login, expiry recovery, and catalogue behavior against a mocked portal.

mod common;

use common::*;
use emt_sdk::prelude::*;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn login_extracts_the_validation_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Login/YZM"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(&b"\x89PNG"[..], "image/png"))
        .mount(&server)
        .await;
    // The login form must carry the identity, the obfuscated secret and the
    // solver's guess.
    Mock::given(method("POST"))
        .and(path("/Login/Authentication"))
        .and(body_string_contains("userId=540975189038"))
        .and(body_string_contains("obf%3A123731"))
        .and(body_string_contains("identifyCode=8244"))
        .and(body_string_contains("duration=180"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Status": 0})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Trade/Buy"))
        .respond_with(ResponseTemplate::new(200).set_body_string(landing_page(VALIDATE_KEY)))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let key = client.auth().login(USERNAME, PASSWORD).await.unwrap();

    assert_eq!(key, VALIDATE_KEY);
    assert_eq!(client.username().await, USERNAME);
}

#[tokio::test]
async fn login_without_key_on_landing_page_fails_naming_the_user() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Login/YZM"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(&b"\x89PNG"[..], "image/png"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/Login/Authentication"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Status": 0})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Trade/Buy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login page</html>"))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let err = client.auth().login(USERNAME, PASSWORD).await.unwrap_err();

    match &err {
        EmtError::Auth(AuthError::LoginFailed { username, .. }) => {
            assert_eq!(username, USERNAME);
        }
        other => panic!("expected LoginFailed, got {other:?}"),
    }
    assert!(err.to_string().contains(USERNAME));
    assert!(!err.to_string().contains(PASSWORD));
}

#[tokio::test]
async fn expired_session_triggers_exactly_one_relogin() {
    let server = MockServer::start().await;
    mount_login_mocks(&server, 2).await;

    // First call answers "session expired", every later one succeeds.
    Mock::given(method("POST"))
        .and(path("/Com/queryAssetAndPosV1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Status": -2})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/Com/queryAssetAndPosV1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"Status": 0, "Data": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    client.auth().login(USERNAME, PASSWORD).await.unwrap();

    let resp = client.account().asset_and_position().await.unwrap();
    assert_eq!(resp["Status"], 0);
    // MockServer verifies on drop: two logins, one successful retry.
}

#[tokio::test]
async fn second_expiry_propagates_without_a_third_attempt() {
    let server = MockServer::start().await;
    mount_login_mocks(&server, 2).await;

    Mock::given(method("POST"))
        .and(path("/Com/queryAssetAndPosV1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Status": -2})))
        .expect(2)
        .mount(&server)
        .await;

    let client = build_client(&server);
    client.auth().login(USERNAME, PASSWORD).await.unwrap();

    let err = client.account().asset_and_position().await.unwrap_err();
    assert!(matches!(err, EmtError::Http(HttpError::SessionExpired)));
}

#[tokio::test]
async fn api_rejection_is_not_retried() {
    let server = MockServer::start().await;
    mount_login_mocks(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/Search/GetOrdersData"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"Status": -1, "Message": "market closed"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    client.auth().login(USERNAME, PASSWORD).await.unwrap();

    let err = client.orders().open().await.unwrap_err();
    match err {
        EmtError::Http(HttpError::Api { message, .. }) => assert_eq!(message, "market closed"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn first_query_logs_in_lazily() {
    let server = MockServer::start().await;
    mount_login_mocks(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/Search/GetDealData"))
        .and(query_param("validatekey", VALIDATE_KEY))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"Status": 0, "Data": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    client.set_credentials(USERNAME, PASSWORD).await;

    // No explicit login: the request engine authenticates on first use.
    let resp = client.trades().today().await.unwrap();
    assert_eq!(resp["Status"], 0);
}

#[tokio::test]
async fn create_and_cancel_follow_the_portal_contract() {
    let server = MockServer::start().await;
    mount_login_mocks(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/Trade/SubmitTradeV2"))
        .and(body_string_contains("stockCode=000002"))
        .and(body_string_contains("tradeType=B"))
        .and(body_string_contains("market=SA"))
        .and(body_string_contains("price=5.01"))
        .and(body_string_contains("amount=100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"Status": 0, "Data": [{"Wtbh": "130662"}]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/Trade/RevokeOrders"))
        .and(body_string_contains("revokes=20240520_130662"))
        .respond_with(ResponseTemplate::new(200).set_body_string("130662 revoke request submitted"))
        .mount(&server)
        .await;

    let client = build_client(&server);
    client.auth().login(USERNAME, PASSWORD).await.unwrap();

    let receipt = client
        .orders()
        .create("000002", Direction::Buy, "SA", 5.01, 100)
        .await
        .unwrap();
    assert!(receipt["Status"] == 0 || receipt["Status"] == -1);

    let text = client.orders().cancel("20240520_130662").await.unwrap();
    assert!(text.starts_with("130662"));
}

#[tokio::test]
async fn last_price_is_nan_for_an_absent_symbol() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/SHSZQuoteSnapshot"))
        .and(query_param("id", "000001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 0,
            "realtimequote": {"currentPrice": "12.34"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/SHSZQuoteSnapshot"))
        .and(query_param("id", "999999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 1})))
        .mount(&server)
        .await;

    let client = build_client(&server);

    assert_eq!(client.quote().last_price("000001", "SA").await, 12.34);
    assert!(client.quote().last_price("999999", "SA").await.is_nan());
}
