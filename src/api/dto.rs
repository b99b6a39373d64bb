//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name                 | Description                               | Key Methods         |
// |----------------------|-------------------------------------------|---------------------|
// | PlaceOrderRequest    | Request to place an order                 | validate            |
// | OrderResponse        | Order response with full details          | from                |
// | PlaceOrderResponse   | Response to a successful order placement  | from                |
// | BookResponse         | Full order book snapshot response         | from                |
//--------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::types::{Order, Side, Trade};
use crate::domain::services::matching_engine::PlaceOutcome;
use crate::domain::services::orderbook::{BookView, LevelView};

/// Request body for `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub side: Side,
    pub price: i64,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub side: Side,
    pub price: i64,
    pub size: u64,
    pub remaining: u64,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            side: order.side,
            price: order.price,
            size: order.size,
            remaining: order.remaining,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeResponse {
    pub id: Uuid,
    pub price: i64,
    pub size: u64,
    pub buy_order_id: Uuid,
    pub sell_order_id: Uuid,
}

impl From<&Trade> for TradeResponse {
    fn from(trade: &Trade) -> Self {
        Self {
            id: trade.id,
            price: trade.price,
            size: trade.size,
            buy_order_id: trade.buy_order_id,
            sell_order_id: trade.sell_order_id,
        }
    }
}

/// Response to a successful `POST /orders`: the id assigned to the new order and every trade it
/// generated, in match order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    pub order_id: Uuid,
    pub trades: Vec<TradeResponse>,
}

impl From<PlaceOutcome> for PlaceOrderResponse {
    fn from(outcome: PlaceOutcome) -> Self {
        Self {
            order_id: outcome.order_id,
            trades: outcome.trades.iter().map(TradeResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelResponse {
    pub price: i64,
    pub volume: u64,
    pub count: usize,
}

impl From<&LevelView> for LevelResponse {
    fn from(level: &LevelView) -> Self {
        Self {
            price: level.price,
            volume: level.volume,
            count: level.count,
        }
    }
}

/// Response for `GET /book`: both ladders plus trade history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub bids: Vec<LevelResponse>,
    pub asks: Vec<LevelResponse>,
    pub trades: Vec<TradeResponse>,
    pub host: String,
}

impl From<BookView> for BookResponse {
    fn from(view: BookView) -> Self {
        Self {
            bids: view.bids.iter().map(LevelResponse::from).collect(),
            asks: view.asks.iter().map(LevelResponse::from).collect(),
            trades: view.trades.iter().map(TradeResponse::from).collect(),
            host: view.host,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}
