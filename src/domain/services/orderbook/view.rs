//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The View Builder: a read-only, immutable projection of the order book for the HTTP surface.
// Pure over the engine's state at call time — never mutates the book, never touches storage.
//--------------------------------------------------------------------------------------------------

use std::env;

use serde::Serialize;

use crate::domain::models::types::{Side, Trade};

use super::orderbook::OrderBook;

/// One aggregated price level: total resting volume and order count at that price.
#[derive(Debug, Clone, Serialize)]
pub struct LevelView {
    pub price: i64,
    pub volume: u64,
    pub count: usize,
}

/// Both sides of the book, sorted by priority, plus the trade history and a host identifier.
#[derive(Debug, Clone, Serialize)]
pub struct BookView {
    /// Descending by price.
    pub bids: Vec<LevelView>,
    /// Ascending by price.
    pub asks: Vec<LevelView>,
    pub trades: Vec<Trade>,
    pub host: String,
}

/// Builds a `BookView` from the current book and trade history. Reads `HOSTNAME` from the
/// environment each call, per the source's informational host identifier (falls back to
/// `"unknown"` when unset, matching the original view builder's default).
pub fn build_view(book: &OrderBook, trades: &[Trade]) -> BookView {
    let host = env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string());

    BookView {
        bids: levels(book, Side::Buy),
        asks: levels(book, Side::Sell),
        trades: trades.to_vec(),
        host,
    }
}

fn levels(book: &OrderBook, side: Side) -> Vec<LevelView> {
    book.levels_in_priority_order(side)
        .into_iter()
        .map(|level| LevelView {
            price: level.price,
            volume: level.volume,
            count: level.count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::types::Order;
    use chrono::Utc;

    #[test]
    fn bids_descend_asks_ascend() {
        let mut book = OrderBook::new();
        book.add_order(Order::new(Side::Buy, 88, 1, Utc::now()));
        book.add_order(Order::new(Side::Buy, 92, 1, Utc::now()));
        book.add_order(Order::new(Side::Sell, 95, 1, Utc::now()));
        book.add_order(Order::new(Side::Sell, 93, 1, Utc::now()));

        let view = build_view(&book, &[]);
        let bid_prices: Vec<i64> = view.bids.iter().map(|l| l.price).collect();
        let ask_prices: Vec<i64> = view.asks.iter().map(|l| l.price).collect();
        assert_eq!(bid_prices, vec![92, 88]);
        assert_eq!(ask_prices, vec![93, 95]);
    }

    #[test]
    fn view_carries_full_trade_history() {
        let book = OrderBook::new();
        let trade = Trade {
            id: uuid::Uuid::new_v4(),
            price: 100,
            size: 1,
            time: Utc::now(),
            buy_order_id: uuid::Uuid::new_v4(),
            sell_order_id: uuid::Uuid::new_v4(),
        };
        let view = build_view(&book, std::slice::from_ref(&trade));
        assert_eq!(view.trades.len(), 1);
        assert_eq!(view.trades[0].id, trade.id);
    }
}
