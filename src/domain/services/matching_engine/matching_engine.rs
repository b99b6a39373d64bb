//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The matching engine: the public API (`place`, `cancel`, `snapshot`, `reset`, `restore`) and the
// price-time-priority match loop. The engine owns the order book and trade history directly (no
// internal locking — callers that share it across tasks wrap it in a `tokio::sync::Mutex`, see
// `crate::api`) and write-throughs every mutation to an injected `Storage` adapter.
//
// | Component      | Description                                       | Key Methods        |
// |----------------|----------------------------------------------------|--------------------|
// | MatchingEngine | Owns the book, trade history, storage, clock        | place, cancel, snapshot, reset, restore |
// | EngineError    | Errors surfaced by the engine's public API          |                    |
//--------------------------------------------------------------------------------------------------

use std::cmp::min;

use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::domain::models::types::{Order, Side, Trade};
use crate::storage::{LevelDto, OrderBookDto, Storage, StorageError};

use super::super::orderbook::{build_view, BookView, OrderBook};

/// Errors surfaced by the engine's public API. `InvalidInput` covers the non-positive price/size
/// rejection from §3/§7 of the spec; a failed storage call is wrapped in `Storage` rather than
/// silently swallowed, so the caller can decide what to do with it (it has already been logged).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("engine is in degraded mode after a prior storage failure; call reset() or restore() to re-sync")]
    Degraded,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The outcome of a single `place` call: the id assigned to the incoming order and every trade it
/// generated, in the order the matches occurred.
#[derive(Debug, Clone)]
pub struct PlaceOutcome {
    pub order_id: Uuid,
    pub trades: Vec<Trade>,
}

pub struct MatchingEngine {
    book: OrderBook,
    trades: Vec<Trade>,
    storage: Box<dyn Storage>,
    clock: Box<dyn Clock>,
    /// Set when a storage write fails mid-operation. While set, `place`/`cancel` refuse to mutate
    /// state until `reset()` or `restore()` clears it (§7, "storage-write-failed" policy).
    degraded: bool,
}

impl MatchingEngine {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self::with_clock(storage, Box::new(SystemClock))
    }

    pub fn with_clock(storage: Box<dyn Storage>, clock: Box<dyn Clock>) -> Self {
        Self {
            book: OrderBook::new(),
            trades: Vec::new(),
            storage,
            clock,
            degraded: false,
        }
    }

    fn check_not_degraded(&self) -> Result<(), EngineError> {
        if self.degraded {
            return Err(EngineError::Degraded);
        }
        Ok(())
    }

    fn mark_degraded_on_storage_error(&mut self, err: StorageError) -> EngineError {
        error!(%err, "storage write failed; engine entering degraded mode");
        self.degraded = true;
        EngineError::Storage(err)
    }

    /// Accepts one limit order, matching it against the opposite side and resting any residual.
    /// Returns the id assigned to the incoming order and the trades it generated, in match order.
    pub async fn place(&mut self, side: Side, price: i64, size: u64) -> Result<PlaceOutcome, EngineError> {
        self.check_not_degraded()?;
        if price <= 0 {
            return Err(EngineError::InvalidInput(format!("price must be positive, got {price}")));
        }
        if size == 0 {
            return Err(EngineError::InvalidInput("size must be positive".to_string()));
        }

        let mut incoming = Order::new(side, price, size, self.clock.now());
        let order_id = incoming.id;
        let mut trades = Vec::new();

        self.match_loop(&mut incoming, &mut trades).await?;

        if incoming.remaining > 0 {
            self.rest(incoming).await?;
        }

        debug!(%order_id, ?side, price, size, trades = trades.len(), "order placed");
        Ok(PlaceOutcome { order_id, trades })
    }

    /// Runs the match loop of §4.3.2: repeatedly takes the opposite side's head order at its best
    /// level until the incoming order is filled or the book no longer crosses.
    async fn match_loop(&mut self, incoming: &mut Order, trades: &mut Vec<Trade>) -> Result<(), EngineError> {
        let opposite = incoming.side.opposite();

        loop {
            if incoming.remaining == 0 {
                break;
            }
            let Some(best_price) = self.book.best_price(opposite) else {
                break;
            };
            if !crosses(incoming.side, incoming.price, best_price) {
                break;
            }

            let Some(resting) = self.book.best_level(opposite).and_then(|l| l.head().cloned()) else {
                break;
            };

            let matched = min(incoming.remaining, resting.remaining);
            let trade = self.make_trade(incoming.side, incoming, &resting, matched);

            if resting.remaining <= incoming.remaining {
                // Full fill of the resting order: unlink it entirely.
                incoming.remaining -= matched;
                let removed = self.book.remove_order(resting.id).map_err(|e| {
                    EngineError::Storage(StorageError::WriteFailed(e.to_string()))
                })?;
                let level_after = self.level_snapshot(removed.side, removed.price);
                self.storage
                    .delete_order(&removed, level_after.is_none())
                    .await
                    .map_err(|e| self.mark_degraded_on_storage_error(e))?;
                if let Some(level_dto) = level_after {
                    self.storage
                        .update_level(&level_dto)
                        .await
                        .map_err(|e| self.mark_degraded_on_storage_error(e))?;
                }
            } else {
                // Partial fill of the resting order: it stays at the head with less remaining.
                self.book.partially_fill_head(opposite, resting.price, matched);
                incoming.remaining = 0;
                let mut updated = resting.clone();
                updated.remaining -= matched;
                self.storage
                    .update_order(&updated)
                    .await
                    .map_err(|e| self.mark_degraded_on_storage_error(e))?;
                if let Some(level_dto) = self.level_snapshot(opposite, resting.price) {
                    self.storage
                        .update_level(&level_dto)
                        .await
                        .map_err(|e| self.mark_degraded_on_storage_error(e))?;
                }
            }

            self.storage
                .insert_trade(&trade)
                .await
                .map_err(|e| self.mark_degraded_on_storage_error(e))?;
            self.trades.push(trade.clone());
            trades.push(trade);
        }

        Ok(())
    }

    fn make_trade(&self, incoming_side: Side, incoming: &Order, resting: &Order, size: u64) -> Trade {
        let (buy_order_id, sell_order_id) = match incoming_side {
            Side::Buy => (incoming.id, resting.id),
            Side::Sell => (resting.id, incoming.id),
        };
        Trade {
            id: Uuid::new_v4(),
            // Passive-side price: the aggressor pays the resting order's price (§9 decision).
            price: resting.price,
            size,
            time: self.clock.now(),
            buy_order_id,
            sell_order_id,
        }
    }

    /// Rests the (possibly residual) order in its own side's ladder.
    async fn rest(&mut self, order: Order) -> Result<(), EngineError> {
        let is_new_level = self
            .book
            .levels_in_priority_order(order.side)
            .iter()
            .all(|l| l.price != order.price);

        self.storage
            .insert_order(&order)
            .await
            .map_err(|e| self.mark_degraded_on_storage_error(e))?;

        let (side, price) = (order.side, order.price);
        self.book.add_order(order);
        let level_dto = self
            .level_snapshot(side, price)
            .expect("level just received an order");

        if is_new_level {
            self.storage
                .insert_level(&level_dto)
                .await
                .map_err(|e| self.mark_degraded_on_storage_error(e))?;
        } else {
            self.storage
                .update_level(&level_dto)
                .await
                .map_err(|e| self.mark_degraded_on_storage_error(e))?;
        }

        Ok(())
    }

    /// The current persisted-aggregate view of the level at `(side, price)`, or `None` if no
    /// orders rest there. Used to keep the storage adapter's `levels` row in sync with the book on
    /// every mutation that leaves the level non-empty, rather than only at level creation.
    fn level_snapshot(&self, side: Side, price: i64) -> Option<LevelDto> {
        self.book
            .levels_in_priority_order(side)
            .into_iter()
            .find(|l| l.price == price)
            .map(|l| LevelDto {
                side,
                price,
                volume: l.volume,
                count: l.count() as u32,
            })
    }

    /// Cancels a resting order by id. Returns `false` (not an error) if the id is not currently
    /// resting, per §7's "cancel of an unknown order is not an error" rule.
    pub async fn cancel(&mut self, order_id: Uuid) -> Result<bool, EngineError> {
        self.check_not_degraded()?;

        if !self.book.contains_order(&order_id) {
            return Ok(false);
        }

        let removed = self
            .book
            .remove_order(order_id)
            .map_err(|e| EngineError::Storage(StorageError::WriteFailed(e.to_string())))?;

        let level_after = self.level_snapshot(removed.side, removed.price);

        self.storage
            .delete_order(&removed, level_after.is_none())
            .await
            .map_err(|e| self.mark_degraded_on_storage_error(e))?;

        if let Some(level_dto) = level_after {
            self.storage
                .update_level(&level_dto)
                .await
                .map_err(|e| self.mark_degraded_on_storage_error(e))?;
        }

        Ok(true)
    }

    /// A pure, read-only snapshot of the book and trade history. Never mutates state.
    pub fn snapshot(&self) -> BookView {
        build_view(&self.book, &self.trades)
    }

    /// Empties the in-memory book and trade history, then wipes persisted state.
    pub async fn reset(&mut self) -> Result<(), EngineError> {
        self.book.clear();
        self.trades.clear();
        self.degraded = false;
        self.storage.reset().await?;
        info!("engine reset");
        Ok(())
    }

    /// Rebuilds the in-memory book from storage. Called once, at process bootstrap (§9 decision
    /// on storage-engine drift: never re-invoked per-request). A storage failure or a corrupted
    /// DTO is logged and the engine simply starts empty, per §7's policy table — neither case is
    /// propagated as an error to the caller.
    pub async fn restore(&mut self) -> Result<(), EngineError> {
        let dto = match self.storage.restore().await {
            Ok(dto) => dto,
            Err(err) => {
                warn!(%err, "storage restore failed; starting with an empty book");
                self.book.clear();
                self.trades.clear();
                self.degraded = false;
                return Ok(());
            }
        };

        match rebuild_from_dto(dto) {
            Ok((book, trades)) => {
                self.book = book;
                self.trades = trades;
                self.degraded = false;
                info!(orders = self.book_order_count(), trades = self.trades.len(), "engine restored");
            }
            Err(reason) => {
                warn!(reason, "restore DTO failed validation; starting with an empty book");
                self.book.clear();
                self.trades.clear();
                self.degraded = false;
            }
        }

        Ok(())
    }

    fn book_order_count(&self) -> usize {
        [Side::Buy, Side::Sell]
            .into_iter()
            .flat_map(|side| self.book.levels_in_priority_order(side))
            .map(|level| level.count())
            .sum()
    }
}

fn crosses(incoming_side: Side, incoming_price: i64, opposite_best_price: i64) -> bool {
    match incoming_side {
        Side::Buy => incoming_price >= opposite_best_price,
        Side::Sell => incoming_price <= opposite_best_price,
    }
}

/// Rebuilds a book and trade history from a restored DTO, validating that every level's recorded
/// `count`/`volume` matches the orders that actually reference it (the `CorruptedDTO` case of §7).
fn rebuild_from_dto(dto: OrderBookDto) -> Result<(OrderBook, Vec<Trade>), &'static str> {
    let mut orders: Vec<Order> = dto.orders.into_iter().map(Order::from).collect();
    orders.sort_by_key(|o| o.placed_at);

    let mut book = OrderBook::new();
    for order in orders {
        if order.remaining == 0 || order.remaining > order.size {
            return Err("order has an invalid remaining quantity");
        }
        book.add_order(order);
    }

    for level in &dto.levels {
        let actual = book
            .levels_in_priority_order(level.side)
            .into_iter()
            .find(|l| l.price == level.price);
        match actual {
            Some(l) if l.count() as u32 == level.count && l.volume == level.volume => {}
            _ => return Err("level aggregate does not match its orders"),
        }
    }

    let trades = dto.trades.into_iter().map(Trade::from).collect();
    Ok((book, trades))
}
