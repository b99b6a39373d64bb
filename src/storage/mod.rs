//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The Storage Adapter contract: a narrow, object-safe trait the matching engine holds as
// `Box<dyn Storage>` and write-throughs to on every mutation. Three implementations are provided:
// a no-op, a JSON-file adapter grounded in the original source's read-whole-file/rewrite-whole-file
// `JsonStorage`, and a Postgres adapter (`sqlx`) matching the normative schema in the spec.
//
// | Component      | Description                                                  |
// |----------------|---------------------------------------------------------------|
// | Storage        | The adapter trait the engine depends on                       |
// | StorageError   | Error kinds surfaced by adapter failures                       |
// | OrderBookDto   | Wire/row format for a full book snapshot                       |
//--------------------------------------------------------------------------------------------------

pub mod json_file;
pub mod noop;
pub mod sql;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::types::{Order, Side, Trade};

pub use json_file::JsonFileStorage;
pub use noop::NoopStorage;
pub use sql::SqlStorage;

/// Errors an adapter can surface. `WriteFailed` and `RestoreFailed`/`CorruptedDto` map directly to
/// the policy table in the spec's error handling section; `Unavailable` is the connect-time
/// failure that the bootstrap layer treats as fatal.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage write failed: {0}")]
    WriteFailed(String),

    #[error("storage restore failed: {0}")]
    RestoreFailed(String),

    #[error("corrupted DTO: {0}")]
    CorruptedDto(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Row shape mirroring the normative `levels` schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDto {
    pub side: Side,
    pub price: i64,
    pub volume: u64,
    pub count: u32,
}

/// Row shape mirroring the normative `orders` schema (the `next_id`/`prev_id` columns of the
/// original schema described an intrusive chain; the in-memory book no longer needs them, so the
/// DTO keeps only the fields restore actually consumes — acceptance order is recovered by sorting
/// on `time`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDto {
    pub id: Uuid,
    pub side: Side,
    pub price: i64,
    pub size: u64,
    pub remaining: u64,
    pub time: DateTime<Utc>,
}

impl From<&Order> for OrderDto {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            side: order.side,
            price: order.price,
            size: order.size,
            remaining: order.remaining,
            time: order.placed_at,
        }
    }
}

impl From<OrderDto> for Order {
    fn from(dto: OrderDto) -> Self {
        Order {
            id: dto.id,
            side: dto.side,
            price: dto.price,
            size: dto.size,
            remaining: dto.remaining,
            placed_at: dto.time,
        }
    }
}

/// Row shape mirroring the normative `trades` schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeDto {
    pub id: Uuid,
    pub buy_order_id: Uuid,
    pub sell_order_id: Uuid,
    pub price: i64,
    pub size: u64,
    pub time: DateTime<Utc>,
}

impl From<&Trade> for TradeDto {
    fn from(trade: &Trade) -> Self {
        Self {
            id: trade.id,
            buy_order_id: trade.buy_order_id,
            sell_order_id: trade.sell_order_id,
            price: trade.price,
            size: trade.size,
            time: trade.time,
        }
    }
}

impl From<TradeDto> for Trade {
    fn from(dto: TradeDto) -> Self {
        Trade {
            id: dto.id,
            price: dto.price,
            size: dto.size,
            time: dto.time,
            buy_order_id: dto.buy_order_id,
            sell_order_id: dto.sell_order_id,
        }
    }
}

/// A full, consistent snapshot as returned by `restore()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderBookDto {
    pub levels: Vec<LevelDto>,
    pub orders: Vec<OrderDto>,
    pub trades: Vec<TradeDto>,
}

/// The contract the matching engine consumes to durably mirror book mutations. Every method is a
/// total function returning `Ok`/`Err` — the engine decides what an `Err` means (see `EngineError`
/// and the `degraded` flag in `MatchingEngine`), the adapter only reports success or failure.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn insert_level(&self, level: &LevelDto) -> Result<(), StorageError>;
    async fn update_level(&self, level: &LevelDto) -> Result<(), StorageError>;
    async fn insert_order(&self, order: &Order) -> Result<(), StorageError>;
    async fn update_order(&self, order: &Order) -> Result<(), StorageError>;
    async fn delete_order(&self, order: &Order, level_emptied: bool) -> Result<(), StorageError>;
    async fn insert_trade(&self, trade: &Trade) -> Result<(), StorageError>;
    async fn reset(&self) -> Result<(), StorageError>;
    async fn restore(&self) -> Result<OrderBookDto, StorageError>;
}
