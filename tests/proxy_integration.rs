mod common;

use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use mockito::{Matcher, Server};
use serde_json::json;
use std::io::Write;
use tower::ServiceExt;

use common::{build_app, header_value, json_body, logged_in, request, TOKEN};

#[tokio::test]
async fn test_data_is_passed_through() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/orders")
        .match_header("authorization", TOKEN)
        .with_status(200)
        .with_body(r#"{"Data": [{"id": 1}], "StatusCode": 200, "StatusMessage": "ok"}"#)
        .create_async()
        .await;

    let app = build_app(&server.url()).await;
    let response = app
        .oneshot(request(Method::GET, "/api/orders", Some(&logged_in()), Body::empty()))
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"data": [{"id": 1}]}));
}

#[tokio::test]
async fn test_null_data_warns_in_the_negotiated_locale() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/orders")
        .with_status(200)
        .with_body(r#"{"Data": null, "StatusCode": 200, "StatusMessage": "ok"}"#)
        .create_async()
        .await;

    let app = build_app(&server.url()).await;
    let mut req = request(
        Method::GET,
        "/api/orders",
        Some(&format!("{}; lang=pl-PL", logged_in())),
        Body::empty(),
    );
    req.headers_mut()
        .insert("x-empty-message-key", "NoOrdersFound".parse().unwrap());
    let response = app.oneshot(req).await.unwrap();

    m.assert_async().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(header_value(&response, header::SET_COOKIE).is_none());
    assert_eq!(
        json_body(response).await,
        json!({"warning": "Nie znaleziono zamówień"})
    );
}

#[tokio::test]
async fn test_default_empty_message_key() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/orders")
        .with_status(200)
        .with_body(r#"{"StatusCode": 200, "StatusMessage": "ok"}"#)
        .create_async()
        .await;

    let app = build_app(&server.url()).await;
    let response = app
        .oneshot(request(Method::GET, "/api/orders", Some(&logged_in()), Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({"warning": "Nothing to show"}));
}

#[tokio::test]
async fn test_expired_token_redirects_to_logout() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/orders")
        .with_status(401)
        .with_body("<html>expired</html>")
        .create_async()
        .await;

    let app = build_app(&server.url()).await;
    let response = app
        .oneshot(request(Method::GET, "/api/orders", Some(&logged_in()), Body::empty()))
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header_value(&response, header::LOCATION), Some("/account/logout"));
    assert_eq!(
        json_body(response).await,
        json!({"warning": "Your session has expired"})
    );
}

#[tokio::test]
async fn test_missing_session_redirects_to_login_without_calling_api() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let app = build_app(&server.url()).await;
    let response = app
        .oneshot(request(Method::GET, "/api/orders", None, Body::empty()))
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header_value(&response, header::LOCATION), Some("/account/login"));
}

#[tokio::test]
async fn test_unknown_session_redirects_to_login() {
    let server = Server::new_async().await;
    let app = build_app(&server.url()).await;
    let response = app
        .oneshot(request(Method::GET, "/api/orders", Some("sid=nobody"), Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header_value(&response, header::LOCATION), Some("/account/login"));
}

#[tokio::test]
async fn test_unreachable_api_is_an_error() {
    let app = build_app("http://127.0.0.1:9").await;
    let response = app
        .oneshot(request(Method::GET, "/api/orders", Some(&logged_in()), Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
}

#[tokio::test]
async fn test_query_is_forwarded_without_lang() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/orders")
        .match_query(Matcher::Exact("page=2".into()))
        .with_status(200)
        .with_body(r#"{"Data": [], "StatusCode": 200, "StatusMessage": "ok"}"#)
        .create_async()
        .await;

    let app = build_app(&server.url()).await;
    let response = app
        .oneshot(request(
            Method::GET,
            "/api/orders?page=2&lang=pl-PL",
            Some(&logged_in()),
            Body::empty(),
        ))
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, header::SET_COOKIE),
        Some("lang=pl-PL; Path=/; Max-Age=2147483647")
    );
}

#[tokio::test]
async fn test_named_endpoint_is_resolved() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/users/me")
        .with_status(200)
        .with_body(r#"{"Data": {"name": "Zofia"}, "StatusCode": 200, "StatusMessage": "ok"}"#)
        .create_async()
        .await;

    let app = build_app(&server.url()).await;
    let response = app
        .oneshot(request(
            Method::GET,
            "/api/user_details",
            Some(&logged_in()),
            Body::empty(),
        ))
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(json_body(response).await, json!({"data": {"name": "Zofia"}}));
}

#[tokio::test]
async fn test_public_route_sends_no_token() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/news")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"Data": ["a"], "StatusCode": 200, "StatusMessage": "ok"}"#)
        .create_async()
        .await;

    let app = build_app(&server.url()).await;
    let response = app
        .oneshot(request(Method::GET, "/public/news", Some(&logged_in()), Body::empty()))
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_post_body_round_trips() {
    let payload = json!({"name": "Zażółć", "items": [1, 2, 3], "nested": {"ok": true}});
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/orders")
        .match_header("authorization", TOKEN)
        .match_body(Matcher::Json(payload.clone()))
        .with_status(200)
        .with_body(json!({"Data": payload, "StatusCode": 200, "StatusMessage": "ok"}).to_string())
        .create_async()
        .await;

    let app = build_app(&server.url()).await;
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/orders",
            Some(&logged_in()),
            Body::from(payload.to_string()),
        ))
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"data": payload}));
}

#[tokio::test]
async fn test_empty_post_body_is_not_forwarded() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let app = build_app(&server.url()).await;
    let response = app
        .oneshot(request(Method::POST, "/api/orders", Some(&logged_in()), Body::empty()))
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({"warning": "Nothing to show"}));
}

#[tokio::test]
async fn test_invalid_json_body_is_rejected() {
    let server = Server::new_async().await;
    let app = build_app(&server.url()).await;
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/orders",
            Some(&logged_in()),
            Body::from("{not json"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unreadable_body_is_a_server_error() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let app = build_app(&server.url()).await;
    // larger than the configured body_limit_bytes
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/orders",
            Some(&logged_in()),
            Body::from(vec![b'x'; 1024]),
        ))
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_encoded_traversal_is_rejected_before_the_api() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let app = build_app(&format!("{}/api/v1", server.url())).await;
    for uri in ["/api/..%2F..%2Fadmin", "/api/orders%3Fall=1", "/api/%2E%2E/admin"] {
        let response = app
            .clone()
            .oneshot(request(Method::GET, uri, Some(&logged_in()), Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }

    m.assert_async().await;
}

#[tokio::test]
async fn test_path_stays_below_the_base_url() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/api/v1/orders/42")
        .match_header("authorization", TOKEN)
        .with_status(200)
        .with_body(r#"{"Data": {"id": 42}, "StatusCode": 200, "StatusMessage": "ok"}"#)
        .create_async()
        .await;

    let app = build_app(&format!("{}/api/v1", server.url())).await;
    let response = app
        .oneshot(request(
            Method::GET,
            "/api/orders/42",
            Some(&logged_in()),
            Body::empty(),
        ))
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_deadline_header_bounds_the_call() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/slow")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(std::time::Duration::from_millis(500));
            w.write_all(br#"{"Data": 1, "StatusCode": 200, "StatusMessage": "ok"}"#)
        })
        .create_async()
        .await;

    let app = build_app(&server.url()).await;
    let mut req = request(Method::GET, "/api/slow", Some(&logged_in()), Body::empty());
    req.headers_mut()
        .insert("x-request-timeout-ms", "50".parse().unwrap());
    let response = app.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
