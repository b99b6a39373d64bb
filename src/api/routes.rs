//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name           | Description                            | Return Type         |
// |----------------|----------------------------------------|---------------------|
// | health         | Health check endpoint                   | Response            |
// | place_order    | Place a new limit order                 | ApiResult<Response> |
// | cancel_order   | Cancel an existing resting order         | ApiResult<Response> |
// | get_book       | Snapshot the current order book          | ApiResult<Response> |
// | reset          | Wipe all state, in-memory and persisted  | ApiResult<Response> |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use super::{
    AppState, ApiError, ApiResult, BookResponse, CancelResponse, PlaceOrderRequest,
    PlaceOrderResponse,
};

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Places a new limit order and returns the id assigned to it plus any trades it generated.
pub async fn place_order(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<PlaceOrderRequest>,
) -> ApiResult<Response> {
    let mut engine = state.engine.lock().await;
    let outcome = engine.place(req.side, req.price, req.size).await?;
    let response = PlaceOrderResponse::from(outcome);
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Cancels a resting order by id. Cancelling an id that is not currently resting is not an error.
pub async fn cancel_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Response> {
    let mut engine = state.engine.lock().await;
    let cancelled = engine.cancel(order_id).await?;
    Ok((StatusCode::OK, Json(CancelResponse { cancelled })).into_response())
}

/// Returns a read-only snapshot of both ladders and the trade history.
pub async fn get_book(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Response> {
    let engine = state.engine.lock().await;
    let response = BookResponse::from(engine.snapshot());
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Wipes the in-memory book and trade history and clears persisted state.
pub async fn reset(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Response> {
    let mut engine = state.engine.lock().await;
    engine.reset().await.map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
