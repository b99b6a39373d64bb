use thiserror::Error;
use uuid::Uuid;

pub mod orderbook;
pub mod view;

pub use orderbook::OrderBook;
pub use view::{build_view, BookView, LevelView};

/// Errors that can occur within the orderbook service. `OrderNotFound` is the only variant the
/// matching engine's public contract ever surfaces (via `cancel`'s `false` return, per §7 of the
/// spec); the others guard invariants that internal callers must not be able to violate.
#[derive(Debug, Error)]
pub enum OrderbookError {
    /// Order not found in the orderbook
    #[error("Order {0} not found in the orderbook")]
    OrderNotFound(Uuid),
}
