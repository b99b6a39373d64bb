//--------------------------------------------------------------------------------------------------
// A storage adapter that round-trips the whole book through a single JSON file: every mutation
// reads the current file (if any), applies the change to the in-memory DTO, and rewrites the
// whole file. This is a direct port of the original source's `JsonStorage`, which reads and
// rewrites a single file on every operation rather than appending — the difference here is that
// failures are returned as `StorageError` instead of panicking.
//--------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::models::types::{Order, Trade};

use super::{LevelDto, OrderBookDto, OrderDto, Storage, StorageError, TradeDto};

pub struct JsonFileStorage {
    path: PathBuf,
    /// Serializes the read-modify-write cycle across concurrent callers. The engine's own
    /// single-writer mutex (see `MatchingEngine`) already prevents concurrent mutation, but an
    /// adapter must be safe to use standalone (e.g. from tests), so it does not rely on that.
    guard: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<OrderBookDto, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(OrderBookDto::default()),
            Ok(contents) => serde_json::from_str(&contents).map_err(StorageError::from),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(OrderBookDto::default()),
            Err(err) => Err(StorageError::from(err)),
        }
    }

    async fn save(&self, dto: &OrderBookDto) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(dto)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }

    fn upsert_level(dto: &mut OrderBookDto, level: LevelDto) {
        if let Some(existing) = dto
            .levels
            .iter_mut()
            .find(|l| l.side == level.side && l.price == level.price)
        {
            *existing = level;
        } else {
            dto.levels.push(level);
        }
    }

    fn remove_level(dto: &mut OrderBookDto, side: crate::domain::models::types::Side, price: i64) {
        dto.levels.retain(|l| !(l.side == side && l.price == price));
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn insert_level(&self, level: &LevelDto) -> Result<(), StorageError> {
        let _permit = self.guard.lock().await;
        let mut dto = self.load().await?;
        Self::upsert_level(&mut dto, level.clone());
        self.save(&dto).await?;
        debug!(price = level.price, ?level.side, "inserted level");
        Ok(())
    }

    async fn update_level(&self, level: &LevelDto) -> Result<(), StorageError> {
        let _permit = self.guard.lock().await;
        let mut dto = self.load().await?;
        Self::upsert_level(&mut dto, level.clone());
        self.save(&dto).await?;
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StorageError> {
        let _permit = self.guard.lock().await;
        let mut dto = self.load().await?;
        dto.orders.push(OrderDto::from(order));
        self.save(&dto).await?;
        Ok(())
    }

    async fn update_order(&self, order: &Order) -> Result<(), StorageError> {
        let _permit = self.guard.lock().await;
        let mut dto = self.load().await?;
        if let Some(existing) = dto.orders.iter_mut().find(|o| o.id == order.id) {
            *existing = OrderDto::from(order);
        } else {
            warn!(order_id = %order.id, "update_order: order missing from snapshot");
        }
        self.save(&dto).await?;
        Ok(())
    }

    async fn delete_order(&self, order: &Order, level_emptied: bool) -> Result<(), StorageError> {
        let _permit = self.guard.lock().await;
        let mut dto = self.load().await?;
        dto.orders.retain(|o| o.id != order.id);
        if level_emptied {
            Self::remove_level(&mut dto, order.side, order.price);
        }
        self.save(&dto).await?;
        Ok(())
    }

    async fn insert_trade(&self, trade: &Trade) -> Result<(), StorageError> {
        let _permit = self.guard.lock().await;
        let mut dto = self.load().await?;
        dto.trades.push(TradeDto::from(trade));
        self.save(&dto).await?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), StorageError> {
        let _permit = self.guard.lock().await;
        self.save(&OrderBookDto::default()).await
    }

    async fn restore(&self) -> Result<OrderBookDto, StorageError> {
        let _permit = self.guard.lock().await;
        self.load().await
    }
}
