//! Response-classification tests against a minimal fault-injection router.
//!
//! The mock server only answers well-formed API shapes, so the corner cases
//! the dispatcher must classify (204, zero-length JSON, JSON `null`,
//! syntactically broken JSON, header echo) are served by a local axum
//! router booted the same way.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use avatax_core::{ApiError, AvataxClient, Endpoint, ResponseBody};

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn empty_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], String::new())
}

async fn null_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "null".to_string())
}

async fn not_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "not-json".to_string())
}

/// Echo request headers and the raw query string back as JSON.
async fn echo(headers: HeaderMap, uri: axum::http::Uri) -> Json<Value> {
    let mut map = BTreeMap::new();
    for (name, value) in &headers {
        map.insert(name.as_str().to_string(), value.to_str().unwrap_or("").to_string());
    }
    Json(serde_json::json!({
        "headers": map,
        "query": uri.query().unwrap_or(""),
    }))
}

fn start_fault_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let app = Router::new()
                .route("/no-content", get(no_content))
                .route("/empty-json", get(empty_json))
                .route("/null-json", get(null_json))
                .route("/not-json", get(not_json))
                .route("/echo", get(echo));
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, app).await
        })
        .unwrap();
    });

    addr
}

fn client(addr: SocketAddr) -> AvataxClient {
    AvataxClient::new("DispatchTest", "1.0", "test-host", &format!("http://{addr}"))
        .unwrap()
        .with_username_password("bob", "secret")
}

#[test]
fn status_204_returns_the_no_content_marker() {
    let addr = start_fault_server();
    let body = client(addr).execute(Endpoint::get("/no-content")).unwrap();
    assert_eq!(body, ResponseBody::NoContent);
}

#[test]
fn zero_length_json_returns_the_no_content_marker() {
    let addr = start_fault_server();
    let body = client(addr).execute(Endpoint::get("/empty-json")).unwrap();
    assert_eq!(body, ResponseBody::NoContent);
}

#[test]
fn json_null_body_is_a_null_result_not_an_error() {
    let addr = start_fault_server();
    let body = client(addr).execute(Endpoint::get("/null-json")).unwrap();
    assert_eq!(body, ResponseBody::Json(Value::Null));
}

#[test]
fn malformed_json_body_is_captured_with_the_raw_bytes() {
    let addr = start_fault_server();
    let err = client(addr).execute(Endpoint::get("/not-json")).unwrap_err();
    match err {
        ApiError::UnexpectedFormat { message, body } => {
            assert!(message.contains("JSON"), "message was: {message}");
            assert_eq!(body, "not-json");
        }
        other => panic!("expected UnexpectedFormat, got {other:?}"),
    }
}

#[test]
fn standard_headers_reach_the_server() {
    let addr = start_fault_server();
    let body = client(addr).execute(Endpoint::get("/echo")).unwrap();
    let ResponseBody::Json(value) = body else {
        panic!("expected JSON echo");
    };
    let headers = &value["headers"];
    assert_eq!(headers["accept"], "application/json");
    assert!(headers["authorization"].as_str().unwrap().starts_with("Basic "));
    let banner = headers["x-avalara-client"].as_str().unwrap();
    assert!(banner.starts_with("DispatchTest; 1.0; RustRestClient;"));
    assert!(banner.ends_with("test-host"));
}

#[test]
fn caller_headers_override_rendered_ones() {
    let addr = start_fault_server();
    let endpoint = Endpoint::get("/echo").header("Accept", "text/csv");
    let body = client(addr).execute(endpoint).unwrap();
    let ResponseBody::Json(value) = body else {
        panic!("expected JSON echo");
    };
    assert_eq!(value["headers"]["accept"], "text/csv");
}

#[test]
fn none_and_empty_query_values_are_omitted() {
    let addr = start_fault_server();
    let endpoint = Endpoint::get("/echo")
        .query("$include", Some("Lines".to_string()))
        .query("$filter", None)
        .query("$top", Some(String::new()));
    let body = client(addr).execute(endpoint).unwrap();
    let ResponseBody::Json(value) = body else {
        panic!("expected JSON echo");
    };
    let query = value["query"].as_str().unwrap();
    assert!(query.contains("include"), "query was: {query}");
    assert!(!query.contains("filter"));
    assert!(!query.contains("top"));
}
