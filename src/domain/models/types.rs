//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Plain data types for the order book: the side of an order, an accepted limit order, and an
// immutable trade record. Prices and quantities are integers (smallest tradable unit) rather than
// a decimal type, matching the single-instrument, fee-free scope this engine covers.
//
// | Component | Description                                              |
// |-----------|-----------------------------------------------------------|
// | Side      | Buy or Sell                                                |
// | Order     | An accepted limit order, resting or terminal               |
// | Trade     | An immutable fill record                                   |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the book an order or trade leg belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposite side, used to find the ladder an incoming order must cross against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// An accepted limit order.
///
/// Once constructed an `Order` never changes its `id`, `side`, `price`, or `size`; `remaining`
/// decreases monotonically to zero (full fill) or is retired early by cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub side: Side,
    /// Limit price, a positive integer. Never changes after placement.
    pub price: i64,
    /// Original size at placement, a positive integer. Never changes after placement.
    pub size: u64,
    /// Quantity not yet filled or cancelled. `0 < remaining <= size` while resting.
    pub remaining: u64,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    pub fn new(side: Side, price: i64, size: u64, placed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            side,
            price,
            size,
            remaining: size,
            placed_at,
        }
    }

    pub fn is_resting(&self) -> bool {
        self.remaining > 0
    }
}

/// An immutable fill record. Appended to the engine's trade history and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    /// The resting order's price — the aggressor always pays the passive side's price.
    pub price: i64,
    pub size: u64,
    pub time: DateTime<Utc>,
    pub buy_order_id: Uuid,
    pub sell_order_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(0, 0).unwrap()
    }

    #[test]
    fn opposite_side_flips() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn new_order_rests_at_full_size() {
        let order = Order::new(Side::Buy, 100, 5, now());
        assert_eq!(order.remaining, order.size);
        assert!(order.is_resting());
    }

    #[test]
    fn order_equality_ignores_nothing() {
        let a = Order::new(Side::Buy, 100, 5, now());
        let mut b = a.clone();
        b.remaining = 4;
        assert_ne!(a, b);
    }
}
