//--------------------------------------------------------------------------------------------------
// TEST MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module contains integration tests for the API. It drives the router directly with
// `tower::ServiceExt::oneshot`, without binding a real socket.
//--------------------------------------------------------------------------------------------------

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{from_slice, json, Value};
use std::net::SocketAddr;
use tower::ServiceExt;

use matching_engine::{Api, MatchingEngine, NoopStorage};

/// Sets up a test router over a fresh in-memory engine.
fn setup_test_router() -> Router {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let engine = MatchingEngine::new(Box::new(NoopStorage));
    let api = Api::new(addr, engine);
    api.routes()
}

async fn parse_json_response(response: axum::response::Response) -> Value {
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = setup_test_router();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn placing_an_order_returns_its_id() {
    let app = setup_test_router();

    let json_body = json!({ "side": "buy", "price": 100, "size": 5 });
    let response = app
        .oneshot(
            Request::post("/orders")
                .header("content-type", "application/json")
                .body(Body::from(json_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_json_response(response).await;
    assert!(body["order_id"].is_string());
    assert!(body["trades"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn crossing_orders_produce_a_trade() {
    let app = setup_test_router();

    let sell = json!({ "side": "sell", "price": 99, "size": 3 });
    app.clone()
        .oneshot(
            Request::post("/orders")
                .header("content-type", "application/json")
                .body(Body::from(sell.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let buy = json!({ "side": "buy", "price": 100, "size": 3 });
    let response = app
        .oneshot(
            Request::post("/orders")
                .header("content-type", "application/json")
                .body(Body::from(buy.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let body = parse_json_response(response).await;
    let trades = body["trades"].as_array().unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0]["price"], 99);
    assert_eq!(trades[0]["size"], 3);
}

#[tokio::test]
async fn cancel_then_get_book_reflects_it() {
    let app = setup_test_router();

    let place = json!({ "side": "buy", "price": 50, "size": 2 });
    let response = app
        .clone()
        .oneshot(
            Request::post("/orders")
                .header("content-type", "application/json")
                .body(Body::from(place.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = parse_json_response(response).await;
    let order_id = body["order_id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/orders/{order_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    assert_eq!(body["cancelled"], true);

    let response = app
        .oneshot(Request::get("/book").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = parse_json_response(response).await;
    assert!(body["bids"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reset_clears_the_book() {
    let app = setup_test_router();

    let place = json!({ "side": "buy", "price": 50, "size": 2 });
    app.clone()
        .oneshot(
            Request::post("/orders")
                .header("content-type", "application/json")
                .body(Body::from(place.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(Request::post("/admin/reset").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(Request::get("/book").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = parse_json_response(response).await;
    assert!(body["bids"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rejects_a_zero_size_order() {
    let app = setup_test_router();

    let json_body = json!({ "side": "buy", "price": 100, "size": 0 });
    let response = app
        .oneshot(
            Request::post("/orders")
                .header("content-type", "application/json")
                .body(Body::from(json_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
