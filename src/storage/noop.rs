//--------------------------------------------------------------------------------------------------
// A storage adapter that satisfies the contract with no side effects, grounded in the original
// source's `NilStorage` (every method a no-op, `restore` returns an empty book).
//--------------------------------------------------------------------------------------------------

use async_trait::async_trait;

use crate::domain::models::types::{Order, Trade};

use super::{LevelDto, OrderBookDto, Storage, StorageError};

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

#[async_trait]
impl Storage for NoopStorage {
    async fn insert_level(&self, _level: &LevelDto) -> Result<(), StorageError> {
        Ok(())
    }

    async fn update_level(&self, _level: &LevelDto) -> Result<(), StorageError> {
        Ok(())
    }

    async fn insert_order(&self, _order: &Order) -> Result<(), StorageError> {
        Ok(())
    }

    async fn update_order(&self, _order: &Order) -> Result<(), StorageError> {
        Ok(())
    }

    async fn delete_order(&self, _order: &Order, _level_emptied: bool) -> Result<(), StorageError> {
        Ok(())
    }

    async fn insert_trade(&self, _trade: &Trade) -> Result<(), StorageError> {
        Ok(())
    }

    async fn reset(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn restore(&self) -> Result<OrderBookDto, StorageError> {
        Ok(OrderBookDto::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn restore_returns_empty_book() {
        let storage = NoopStorage;
        let dto = storage.restore().await.unwrap();
        assert!(dto.levels.is_empty());
        assert!(dto.orders.is_empty());
        assert!(dto.trades.is_empty());
    }
}
