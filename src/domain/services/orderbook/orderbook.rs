//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the order book for the single instrument this engine manages: the
// per-price FIFO (Level) and the per-side price-ordered index (the ladder) that tracks each
// side's best price.
//
// | Component | Description                                                       | Key Methods      |
// |-----------|--------------------------------------------------------------------|------------------|
// | Level     | All resting orders at one price, in acceptance order               | append, unlink    |
// | OrderBook | Both sides' ladders plus the order index                          | add_order, remove_order, best_buy, best_sell |
//--------------------------------------------------------------------------------------------------

use std::collections::{BTreeMap, HashMap, VecDeque};

use uuid::Uuid;

use crate::domain::models::types::{Order, Side};

use super::OrderbookError;

/// All resting orders at a single `(side, price)`. The FIFO is a `VecDeque` rather than an
/// intrusive doubly-linked list: `append` is `push_back`, the head is `front()`, and removing an
/// arbitrary order (cancellation from the middle) is a linear scan plus `remove(index)`. Orders
/// carry no prev/next back-references — the book is never deep enough per price for the scan to
/// matter, and it avoids the raw-pointer graph the design notes flag.
#[derive(Debug, Clone)]
pub struct Level {
    pub price: i64,
    orders: VecDeque<Order>,
    pub volume: u64,
}

impl Level {
    fn new(price: i64) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            volume: 0,
        }
    }

    /// Links the order at the tail of the FIFO.
    fn append(&mut self, order: Order) {
        self.volume += order.remaining;
        self.orders.push_back(order);
    }

    /// Removes the order with the given id from anywhere in the FIFO, preserving the relative
    /// order of the remaining orders. Returns it if present.
    fn unlink(&mut self, order_id: Uuid) -> Option<Order> {
        let index = self.orders.iter().position(|o| o.id == order_id)?;
        let order = self.orders.remove(index)?;
        self.volume -= order.remaining;
        Some(order)
    }

    /// Reduces the head order's `remaining` by `delta` after a partial fill, without unlinking it.
    fn decrement_head(&mut self, delta: u64) {
        if let Some(head) = self.orders.front_mut() {
            head.remaining -= delta;
        }
        self.volume -= delta;
    }

    pub fn head(&self) -> Option<&Order> {
        self.orders.front()
    }

    pub fn count(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}

/// One side's price ladder: a price-ordered map of Levels plus the order index entries it owns.
/// `BTreeMap` keeps levels sorted by price, so "the next-better level" and "the best level" are
/// just map-iteration operations rather than a hand-maintained singly-linked chain — removing a
/// level (even an interior, non-best one) can never leave a dangling chain pointer because there
/// is no separate chain to desync from the map.
#[derive(Debug, Clone, Default)]
struct Ladder {
    levels: BTreeMap<i64, Level>,
}

impl Ladder {
    /// Returns the existing level at `price`, or creates an empty one and inserts it.
    fn get_or_create(&mut self, price: i64) -> &mut Level {
        self.levels.entry(price).or_insert_with(|| Level::new(price))
    }

    fn destroy_if_empty(&mut self, price: i64) {
        if let Some(level) = self.levels.get(&price) {
            if level.is_empty() {
                self.levels.remove(&price);
            }
        }
    }

    fn best_price(&self, side: Side) -> Option<i64> {
        match side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    /// Levels in priority order (most aggressive first) for the View Builder.
    fn levels_in_priority_order(&self, side: Side) -> Vec<&Level> {
        match side {
            Side::Buy => self.levels.values().rev().collect(),
            Side::Sell => self.levels.values().collect(),
        }
    }
}

/// The full order book for this instrument: bid and ask ladders plus an index from order id to
/// its resting location, giving O(1) cancellation (Global Invariant 3).
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    bids: Ladder,
    asks: Ladder,
    /// Maps a resting order's id to the `(side, price)` of the Level that holds it.
    order_index: HashMap<Uuid, (Side, i64)>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn ladder(&self, side: Side) -> &Ladder {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn ladder_mut(&mut self, side: Side) -> &mut Ladder {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    pub fn best_price(&self, side: Side) -> Option<i64> {
        self.ladder(side).best_price(side)
    }

    pub fn best_level(&self, side: Side) -> Option<&Level> {
        let price = self.best_price(side)?;
        self.ladder(side).levels.get(&price)
    }

    /// Rests `order` in its side's ladder. Idempotent with respect to level creation: the first
    /// order at a price creates the Level, later ones join its FIFO.
    pub fn add_order(&mut self, order: Order) {
        let (side, price, id) = (order.side, order.price, order.id);
        self.ladder_mut(side).get_or_create(price).append(order);
        self.order_index.insert(id, (side, price));
    }

    /// Removes a resting order by id, tearing down its Level if it becomes empty. Returns the
    /// removed order, or an error if the id is not currently resting.
    pub fn remove_order(&mut self, order_id: Uuid) -> Result<Order, OrderbookError> {
        let (side, price) = self
            .order_index
            .remove(&order_id)
            .ok_or(OrderbookError::OrderNotFound(order_id))?;
        let ladder = self.ladder_mut(side);
        let level = ladder
            .levels
            .get_mut(&price)
            .ok_or(OrderbookError::OrderNotFound(order_id))?;
        let order = level
            .unlink(order_id)
            .ok_or(OrderbookError::OrderNotFound(order_id))?;
        ladder.destroy_if_empty(price);
        Ok(order)
    }

    /// Applies a partial fill to the head order at `(side, price)`: reduces its remaining by
    /// `fill_size` without unlinking it from the Level.
    pub fn partially_fill_head(&mut self, side: Side, price: i64, fill_size: u64) {
        if let Some(level) = self.ladder_mut(side).levels.get_mut(&price) {
            level.decrement_head(fill_size);
        }
    }

    pub fn levels_in_priority_order(&self, side: Side) -> Vec<&Level> {
        self.ladder(side).levels_in_priority_order(side)
    }

    pub fn contains_order(&self, order_id: &Uuid) -> bool {
        self.order_index.contains_key(order_id)
    }

    pub fn is_empty(&self) -> bool {
        self.order_index.is_empty()
    }

    /// Clears all resting orders and levels on both sides. Does not touch trade history.
    pub fn clear(&mut self) {
        self.bids = Ladder::default();
        self.asks = Ladder::default();
        self.order_index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn order(side: Side, price: i64, size: u64) -> Order {
        Order::new(side, price, size, Utc::now())
    }

    #[test]
    fn best_buy_is_highest_price() {
        let mut book = OrderBook::new();
        book.add_order(order(Side::Buy, 88, 1));
        book.add_order(order(Side::Buy, 92, 1));
        book.add_order(order(Side::Buy, 90, 1));
        assert_eq!(book.best_price(Side::Buy), Some(92));
    }

    #[test]
    fn best_sell_is_lowest_price() {
        let mut book = OrderBook::new();
        book.add_order(order(Side::Sell, 88, 1));
        book.add_order(order(Side::Sell, 85, 1));
        assert_eq!(book.best_price(Side::Sell), Some(85));
    }

    #[test]
    fn removing_sole_order_destroys_level() {
        let mut book = OrderBook::new();
        let o = order(Side::Buy, 90, 1);
        let id = o.id;
        book.add_order(o);
        book.remove_order(id).unwrap();
        assert_eq!(book.best_price(Side::Buy), None);
        assert!(book.is_empty());
    }

    #[test]
    fn removing_interior_level_does_not_disturb_other_levels() {
        // Regression test for the source engine's flagged non-best-Level-destruction bug:
        // destroying a level that is neither head nor tail of the priority chain must leave the
        // other levels' ordering intact. A BTreeMap has no separate chain to desync.
        let mut book = OrderBook::new();
        book.add_order(order(Side::Buy, 88, 1));
        let mid = order(Side::Buy, 90, 1);
        let mid_id = mid.id;
        book.add_order(mid);
        book.add_order(order(Side::Buy, 92, 1));

        book.remove_order(mid_id).unwrap();

        assert_eq!(book.best_price(Side::Buy), Some(92));
        let prices: Vec<i64> = book
            .levels_in_priority_order(Side::Buy)
            .iter()
            .map(|l| l.price)
            .collect();
        assert_eq!(prices, vec![92, 88]);
    }

    #[test]
    fn fifo_within_level_preserves_order_after_middle_cancel() {
        let mut book = OrderBook::new();
        let a = order(Side::Buy, 7331, 3);
        let b = order(Side::Buy, 7331, 1);
        let c = order(Side::Buy, 7331, 2);
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        book.add_order(a);
        book.add_order(b);
        book.add_order(c);

        book.remove_order(b_id).unwrap();

        let level = book.best_level(Side::Buy).unwrap();
        let remaining_ids: Vec<Uuid> = level.orders().map(|o| o.id).collect();
        assert_eq!(remaining_ids, vec![a_id, c_id]);
    }

    #[test]
    fn partial_fill_reduces_head_without_unlinking() {
        let mut book = OrderBook::new();
        book.add_order(order(Side::Sell, 85, 10));
        book.partially_fill_head(Side::Sell, 85, 6);
        let level = book.best_level(Side::Sell).unwrap();
        assert_eq!(level.head().unwrap().remaining, 4);
        assert_eq!(level.volume, 4);
    }
}
