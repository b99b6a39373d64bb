pub mod types;

pub use types::{Order, Side, Trade};
