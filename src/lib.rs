// Expose the modules
pub mod api;
pub mod clock;
pub mod config;
pub mod domain;
pub mod storage;

// Re-export key types for easier usage
pub use api::{Api, AppState};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, StorageBackend};
pub use domain::models::types::{Order, Side, Trade};
pub use domain::services::matching_engine::{EngineError, MatchingEngine, PlaceOutcome};
pub use domain::services::orderbook::{build_view, BookView, LevelView, OrderBook, OrderbookError};
pub use storage::{JsonFileStorage, NoopStorage, SqlStorage, Storage, StorageError};
